//! Parse raw HTTP response header lines into name/value pairs.

/// Parse collected header lines (`Name: value`) into pairs.
///
/// Status lines, blank lines and lines without a colon are skipped.
pub fn parse_header_lines(lines: &[String]) -> Vec<(String, String)> {
    let mut headers = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() || line.starts_with("HTTP/") {
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            headers.push((name.to_string(), value.trim().to_string()));
        }
    }
    headers
}
