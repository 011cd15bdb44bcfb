//! Step result entries
//!
//! A completed step reports results through its termination message: a JSON
//! array of `{"key": ..., "value": ...}` objects.

use serde::{Deserialize, Serialize};

/// Key/value pair emitted by a completed step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub key: String,
    pub value: String,
}

impl ResultEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Parses a step's termination message into result entries
pub fn parse_termination_message(message: &str) -> serde_json::Result<Vec<ResultEntry>> {
    serde_json::from_str(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_termination_message() {
        let entries =
            parse_termination_message(r#"[{"key":"a","value":"1"},{"key":"b","value":"2"}]"#)
                .unwrap();
        assert_eq!(entries, vec![ResultEntry::new("a", "1"), ResultEntry::new("b", "2")]);
    }

    #[test]
    fn test_parse_rejects_free_text() {
        assert!(parse_termination_message("step exited with code 1").is_err());
        assert!(parse_termination_message("").is_err());
    }
}
