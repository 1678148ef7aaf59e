//! Progress reporting (§4.9, §9): a synchronous callback invoked from the
//! caller's thread after each completed candidate evaluation. No channel or
//! background thread is involved — the evaluator simply calls the sink
//! inline, mirroring the Python generator's direct `progress_callback(...)`
//! calls in `generate_routes.py`.

/// Receives progress updates during route generation.
///
/// `percent` is a floor: implementations may assume it only grows, and the
/// evaluator itself only calls through when the floor has advanced by at
/// least 5 since the last call (§4.9), so every invocation is worth
/// surfacing to a user.
pub trait ProgressSink {
    fn on_progress(&mut self, percent: u8, message: &str);
}

/// Wraps a `ProgressSink` and enforces the "advance by at least 5" floor,
/// so evaluators can report candidly without re-deriving the threshold
/// logic themselves.
pub struct ThresholdProgress<'a> {
    inner: &'a mut dyn ProgressSink,
    last_reported: i16,
}

impl<'a> ThresholdProgress<'a> {
    pub fn new(inner: &'a mut dyn ProgressSink) -> Self {
        ThresholdProgress {
            inner,
            last_reported: -5,
        }
    }

    pub fn report(&mut self, percent: u8, message: &str) {
        if i16::from(percent) - self.last_reported >= 5 {
            self.inner.on_progress(percent, message);
            self.last_reported = i16::from(percent);
        }
    }
}

/// A sink that discards all updates, for callers that don't need progress.
pub struct NullProgress;

impl ProgressSink for NullProgress {
    fn on_progress(&mut self, _percent: u8, _message: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder(Vec<(u8, String)>);
    impl ProgressSink for Recorder {
        fn on_progress(&mut self, percent: u8, message: &str) {
            self.0.push((percent, message.to_string()));
        }
    }

    #[test]
    fn suppresses_updates_below_five_percent_advance() {
        let mut rec = Recorder(Vec::new());
        {
            let mut t = ThresholdProgress::new(&mut rec);
            t.report(10, "a");
            t.report(12, "b");
            t.report(15, "c");
        }
        assert_eq!(rec.0.len(), 2);
        assert_eq!(rec.0[0].0, 10);
        assert_eq!(rec.0[1].0, 15);
    }

    #[test]
    fn first_report_always_passes_through() {
        let mut rec = Recorder(Vec::new());
        {
            let mut t = ThresholdProgress::new(&mut rec);
            t.report(3, "start");
        }
        assert_eq!(rec.0.len(), 1);
    }

    #[test]
    fn null_progress_drops_everything() {
        let mut n = NullProgress;
        n.on_progress(50, "whatever");
    }
}
