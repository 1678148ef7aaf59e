//! SVG-path-subset tokenizer and the canvas→geographic projection (§4.4).

/// A point in canvas pixel space.
pub type CanvasPoint = (f64, f64);

/// Tokenizes an `M`/`L` SVG path string into canvas points. The current
/// command letter persists across coordinate pairs until a new letter is
/// seen, so `"M x y x y"` parses as `M` then an implicit `L`. Any other
/// command letter terminates parsing at that token, keeping whatever prefix
/// was already accumulated (§4.4, §6 "SVG path dialect consumed").
pub fn parse_svg_path(svg_path: &str) -> Vec<CanvasPoint> {
    let tokens = tokenize(svg_path);
    let mut points = Vec::new();
    let mut i = 0;
    let mut cmd: Option<char> = None;

    while i < tokens.len() {
        match &tokens[i] {
            Token::Command(c) => {
                if *c != 'M' && *c != 'L' {
                    break;
                }
                cmd = Some(*c);
                i += 1;
            }
            Token::Number(_) => {
                if cmd.is_none() {
                    // Numbers before any command letter are meaningless; stop.
                    break;
                }
                if i + 1 < tokens.len() {
                    if let (Token::Number(x), Token::Number(y)) = (&tokens[i], &tokens[i + 1]) {
                        points.push((*x, *y));
                        i += 2;
                        continue;
                    }
                }
                break;
            }
        }
    }

    points
}

enum Token {
    Command(char),
    Number(f64),
}

fn tokenize(svg_path: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = svg_path.chars().collect();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == 'M' || c == 'L' {
            tokens.push(Token::Command(c));
            i += 1;
            continue;
        }
        if c.is_whitespace() || c == ',' {
            i += 1;
            continue;
        }
        if c == '-' || c == '+' || c.is_ascii_digit() || c == '.' {
            let start = i;
            i += 1;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            let slice: String = chars[start..i].iter().collect();
            if let Ok(n) = slice.parse::<f64>() {
                tokens.push(Token::Number(n));
            }
            continue;
        }
        // Any other command letter: stop tokenizing here, the caller will
        // hit the letter as an unrecognized Command and break.
        tokens.push(Token::Command(c));
        i += 1;
    }

    tokens
}

const CANVAS_SIZE_DEFAULT: f64 = 350.0;
const TEMP_SCALE_LAT: f64 = 0.01;

/// Projects canvas points to geographic `(lon, lat)` coordinates: center at
/// the canvas midpoint, normalize to `[-1, 1]`, shift so the first point
/// lands exactly on `(start_lon, start_lat)`, and apply a coarse degree
/// scale (§4.4). Exact sizing is left to the transformer.
pub fn canvas_to_geo(
    canvas_points: &[CanvasPoint],
    start_lat: f64,
    start_lon: f64,
    canvas_size: f64,
) -> Vec<(f64, f64)> {
    if canvas_points.is_empty() {
        return Vec::new();
    }

    let center = canvas_size / 2.0;
    let normalized: Vec<(f64, f64)> = canvas_points
        .iter()
        .map(|&(x, y)| ((x - center) / center, (y - center) / center))
        .collect();

    let (start_x, start_y) = normalized[0];
    let temp_scale_lon = TEMP_SCALE_LAT / start_lat.to_radians().cos();

    normalized
        .iter()
        .map(|&(x, y)| {
            let rel_x = x - start_x;
            let rel_y = y - start_y;
            (
                start_lon + rel_x * temp_scale_lon,
                start_lat + rel_y * TEMP_SCALE_LAT,
            )
        })
        .collect()
}

/// Convenience wrapper using the default 350px canvas.
pub fn canvas_to_geo_default(canvas_points: &[CanvasPoint], start_lat: f64, start_lon: f64) -> Vec<(f64, f64)> {
    canvas_to_geo(canvas_points, start_lat, start_lon, CANVAS_SIZE_DEFAULT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_square_path() {
        let pts = parse_svg_path("M 0 0 L 100 0 L 100 100 L 0 100 L 0 0");
        assert_eq!(
            pts,
            vec![(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0), (0.0, 0.0)]
        );
    }

    #[test]
    fn implicit_command_repeats() {
        // "M x y x y" -> M then implicit L for the second pair.
        let pts = parse_svg_path("M 0 0 10 10");
        assert_eq!(pts, vec![(0.0, 0.0), (10.0, 10.0)]);
    }

    #[test]
    fn unsupported_command_terminates_gracefully() {
        let pts = parse_svg_path("M 0 0 L 10 10 C 20 20 30 30");
        assert_eq!(pts, vec![(0.0, 0.0), (10.0, 10.0)]);
    }

    #[test]
    fn degenerate_single_point_path() {
        let pts = parse_svg_path("M 10 10");
        assert_eq!(pts, vec![(10.0, 10.0)]);
    }

    #[test]
    fn empty_path_returns_empty() {
        assert!(parse_svg_path("").is_empty());
    }

    #[test]
    fn canvas_to_geo_preserves_first_point_identity() {
        let canvas = vec![(175.0, 175.0), (200.0, 150.0)];
        let geo = canvas_to_geo_default(&canvas, 37.5007, 127.0369);
        assert!((geo[0].0 - 127.0369).abs() < 1e-12);
        assert!((geo[0].1 - 37.5007).abs() < 1e-12);
    }
}
