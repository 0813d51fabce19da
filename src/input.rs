// src/input.rs
// =============================================================================
// Reads the list of URLs to check.
//
// One URL per line. Surrounding whitespace is trimmed; blank lines and lines
// starting with '#' are skipped. URLs are not validated or deduplicated: a bad
// URL simply shows up as a failed check.
// =============================================================================

use anyhow::{Context, Result};
use std::path::Path;

pub fn read_urls(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Error reading file {}", path.display()))?;
    Ok(parse_urls(&content))
}

fn parse_urls(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_skips_blank_and_comment_lines() {
        let urls = parse_urls("https://a.test\n\n  # staging\n  https://b.test  \r\nhttps://a.test\n");
        assert_eq!(urls, vec!["https://a.test", "https://b.test", "https://a.test"]);
    }

    #[test]
    fn test_read_from_file() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        writeln!(tmp, "https://example.com\nnot a url").unwrap();

        let urls = read_urls(tmp.path()).unwrap();
        assert_eq!(urls, vec!["https://example.com", "not a url"]);
    }

    #[test]
    fn test_missing_file() {
        assert!(read_urls(Path::new("/no/such/urls.txt")).is_err());
    }
}
