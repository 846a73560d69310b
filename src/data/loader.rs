use std::path::Path;

use anyhow::{Context, Result};

use super::model::Series;
use crate::error::ParseError;

/// File extensions offered by the open dialog.
pub const SCAN_EXTENSIONS: &[&str] = &["asr", "xy", "txt", "dat", "csv"];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a scan file from disk and normalise it for processing.
///
/// The returned series is sorted by 2θ.
pub fn load_file(path: &Path) -> Result<Series> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading scan file {}", path.display()))?;
    let series = parse_scan(&text)
        .with_context(|| format!("parsing scan file {}", path.display()))?;
    Ok(series.sorted_by_x())
}

/// Parse two-column scan text into a series, in file order.
///
/// Layout, one sample per line:
///
/// ```text
/// # comment lines start with '#'
/// 10.00  152
/// 10.02, 149
/// ```
///
/// Tokens are separated by any run of whitespace and/or commas; only the
/// first two are read. Lines that are blank, commented, too short or not
/// finite numbers are skipped. The result is not sorted.
pub fn parse_scan(text: &str) -> Result<Series, ParseError> {
    parse_scan_min(text, 1)
}

/// Like [`parse_scan`], but demand at least `min_points` samples.
pub fn parse_scan_min(text: &str, min_points: usize) -> Result<Series, ParseError> {
    let mut x = Vec::new();
    let mut y = Vec::new();

    for line in text.lines() {
        if let Some((a, b)) = parse_line(line) {
            x.push(a);
            y.push(b);
        }
    }

    if x.is_empty() {
        return Err(ParseError::Empty);
    }
    if x.len() < min_points {
        return Err(ParseError::InsufficientData {
            found: x.len(),
            required: min_points,
        });
    }
    log::debug!("parsed {} scan points", x.len());
    Series::new(x, y)
}

fn parse_line(line: &str) -> Option<(f64, f64)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }

    let mut tokens = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty());
    let a = parse_finite(tokens.next()?)?;
    let b = parse_finite(tokens.next()?)?;
    Some((a, b))
}

fn parse_finite(tok: &str) -> Option<f64> {
    tok.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn skips_comments_and_bad_lines() {
        let s = parse_scan("10 1\n20 2\n# comment\nbad line\n30 3").unwrap();
        assert_eq!(s.x, vec![10.0, 20.0, 30.0]);
        assert_eq!(s.y, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn accepts_commas_tabs_and_extra_columns() {
        let s = parse_scan("  5.0,\t7.5\n6.0 , 8.5, 99\n7.0\n").unwrap();
        assert_eq!(s.x, vec![5.0, 6.0]);
        assert_eq!(s.y, vec![7.5, 8.5]);
    }

    #[test]
    fn drops_non_finite_values() {
        let s = parse_scan("1 inf\nNaN 2\n3 4\r\n").unwrap();
        assert_eq!(s.x, vec![3.0]);
        assert_eq!(s.y, vec![4.0]);
    }

    #[test]
    fn keeps_encounter_order() {
        let s = parse_scan("30 3\n10 1\n20 2").unwrap();
        assert_eq!(s.x, vec![30.0, 10.0, 20.0]);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert_eq!(parse_scan("# only a comment\n\n"), Err(ParseError::Empty));
    }

    #[test]
    fn minimum_point_count_is_enforced() {
        let err = parse_scan_min("1 1\n2 2\n3 3", 5).unwrap_err();
        assert_eq!(
            err,
            ParseError::InsufficientData {
                found: 3,
                required: 5
            }
        );
    }

    #[test]
    fn load_file_sorts_by_angle() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# sample\n22.0 40\n20.0 10\n21.0 30").unwrap();
        let s = load_file(file.path()).unwrap();
        assert_eq!(s.x, vec![20.0, 21.0, 22.0]);
        assert_eq!(s.y, vec![10.0, 30.0, 40.0]);
    }

    #[test]
    fn load_file_reports_missing_path() {
        let err = load_file(Path::new("/definitely/not/here.asr")).unwrap_err();
        assert!(format!("{err:#}").contains("reading scan file"));
    }
}
