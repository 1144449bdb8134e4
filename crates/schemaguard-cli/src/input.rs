//! Input handling for file reading and stdin support.

use anyhow::{Context, Result};
use regex::Regex;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::OnceLock;

/// One SQL candidate and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub name: String,
    pub sql: String,
}

/// Read SQL candidates from files or stdin.
///
/// If no files are provided, reads a single candidate from stdin.
pub fn read_input(files: &[PathBuf]) -> Result<Vec<Candidate>> {
    if files.is_empty() {
        read_from_stdin()
    } else {
        read_from_files(files)
    }
}

/// Read SQL from stdin
fn read_from_stdin() -> Result<Vec<Candidate>> {
    let mut sql = String::new();
    io::stdin()
        .read_to_string(&mut sql)
        .context("Failed to read from stdin")?;

    Ok(vec![Candidate {
        name: "<stdin>".to_string(),
        sql,
    }])
}

/// Read SQL from multiple files
fn read_from_files(files: &[PathBuf]) -> Result<Vec<Candidate>> {
    files
        .iter()
        .map(|path| {
            let sql = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read file: {}", path.display()))?;

            Ok(Candidate {
                name: path.display().to_string(),
                sql,
            })
        })
        .collect()
}

/// Unwrap a candidate wrapped in a Markdown code fence (```` ```sql ... ``` ````).
///
/// Returns `None` when the text is not fenced.
pub fn strip_code_fence(sql: &str) -> Option<&str> {
    static FENCE: OnceLock<Regex> = OnceLock::new();
    let re = FENCE.get_or_init(|| {
        Regex::new(r"(?is)^\s*```(?:sql\b)?\s*(.*?)\s*```\s*$").expect("Invalid regex pattern")
    });

    re.captures(sql)
        .and_then(|caps| caps.get(1))
        .map(|body| body.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_read_single_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "SELECT * FROM users").unwrap();

        let candidates = read_from_files(&[file.path().to_path_buf()]).unwrap();
        assert_eq!(candidates.len(), 1);
        assert!(candidates[0].sql.contains("SELECT * FROM users"));
    }

    #[test]
    fn test_read_multiple_files() {
        let mut file1 = NamedTempFile::new().unwrap();
        let mut file2 = NamedTempFile::new().unwrap();
        writeln!(file1, "SELECT * FROM users").unwrap();
        writeln!(file2, "SELECT * FROM incidents").unwrap();

        let candidates =
            read_from_files(&[file1.path().to_path_buf(), file2.path().to_path_buf()]).unwrap();
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_read_missing_file() {
        let result = read_from_files(&[PathBuf::from("/nonexistent/file.sql")]);
        assert!(result.is_err());
    }

    #[test]
    fn test_strip_sql_fence() {
        let fenced = "```sql\nSELECT * FROM users\n```";
        assert_eq!(strip_code_fence(fenced), Some("SELECT * FROM users"));
    }

    #[test]
    fn test_strip_fence_case_and_whitespace() {
        let fenced = "  ```SQL\n  SELECT 1;\n```  \n";
        assert_eq!(strip_code_fence(fenced), Some("SELECT 1;"));
        assert_eq!(strip_code_fence("```\nSELECT 2\n```"), Some("SELECT 2"));
    }

    #[test]
    fn test_unfenced_input_is_untouched() {
        assert_eq!(strip_code_fence("SELECT * FROM users"), None);
        assert_eq!(strip_code_fence("SELECT '```' FROM t"), None);
    }
}
