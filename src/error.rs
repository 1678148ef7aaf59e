use thiserror::Error;

/// Top-level error taxonomy for the core pipeline.
///
/// Only these three are fatal to a `generate_routes` call. Per-candidate
/// evaluation failures and the empty-result condition are not represented
/// here — they degrade the candidate set instead (see module docs on
/// `candidate`).
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("road network fetch failed")]
    Upstream(#[source] anyhow::Error),

    #[error("request cancelled")]
    Cancelled,
}

pub type CoreResult<T> = Result<T, CoreError>;
