//! Lexical safety gate.
//!
//! Rejects any statement that mentions a mutating or DDL keyword as a whole
//! word, before the statement is parsed. The scan runs over the raw text, so
//! a deny-listed word inside a string literal or a comment also trips it.

use crate::types::DeniedKeyword;
use regex::Regex;
use std::sync::OnceLock;

/// Result of the lexical safety gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Safety {
    Safe,
    Unsafe(DeniedKeyword),
}

impl Safety {
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Safe)
    }
}

fn deny_patterns() -> &'static [(DeniedKeyword, Regex)] {
    static PATTERNS: OnceLock<Vec<(DeniedKeyword, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        DeniedKeyword::ALL
            .iter()
            .map(|keyword| {
                let pattern = format!(r"\b{}\b", keyword.as_str());
                (
                    *keyword,
                    Regex::new(&pattern).expect("Invalid deny-list pattern"),
                )
            })
            .collect()
    })
}

/// Check `raw_sql` against the deny-list.
///
/// Keywords are tested in [`DeniedKeyword::ALL`] order and the first match is
/// returned, so `UPDATE t ...; DROP ...` reports `DROP`.
pub fn check_safety(raw_sql: &str) -> Safety {
    let upper = raw_sql.to_uppercase();
    deny_patterns()
        .iter()
        .find(|(_, pattern)| pattern.is_match(&upper))
        .map_or(Safety::Safe, |(keyword, _)| Safety::Unsafe(*keyword))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_is_safe() {
        assert_eq!(check_safety("SELECT * FROM users"), Safety::Safe);
    }

    #[test]
    fn test_lowercase_keyword_is_unsafe() {
        assert_eq!(
            check_safety("delete from users where user_id = 1"),
            Safety::Unsafe(DeniedKeyword::Delete)
        );
    }

    #[test]
    fn test_keyword_inside_identifier_is_safe() {
        assert!(check_safety("SELECT updated_on, created_by FROM logs").is_safe());
        assert!(check_safety("SELECT t.last_update FROM t").is_safe());
        assert!(check_safety("SELECT dropped FROM t").is_safe());
    }

    #[test]
    fn test_deny_list_order_wins_over_position() {
        assert_eq!(
            check_safety("UPDATE users SET name = 'x'; DROP TABLE users"),
            Safety::Unsafe(DeniedKeyword::Drop)
        );
        assert_eq!(
            check_safety("INSERT INTO a SELECT * FROM b; CREATE TABLE c (id INT)"),
            Safety::Unsafe(DeniedKeyword::Create)
        );
    }

    #[test]
    fn test_keyword_in_string_literal_is_unsafe() {
        assert_eq!(
            check_safety("SELECT * FROM incidents WHERE note = 'please delete'"),
            Safety::Unsafe(DeniedKeyword::Delete)
        );
    }

    #[test]
    fn test_keyword_next_to_punctuation_is_unsafe() {
        assert_eq!(
            check_safety("SELECT 1;TRUNCATE(users)"),
            Safety::Unsafe(DeniedKeyword::Truncate)
        );
    }
}
