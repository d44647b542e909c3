//! State name grammar and path markers
//!
//! Local names are single path segments owned by one controller. Full names
//! are the dot-joined path from the tree root. This module validates the
//! segment grammar and converts between joined and segmented forms.

use thiserror::Error;

/// Separator between segments of a full state name
pub const SEPARATOR: char = '.';

/// Prefix marking an absolute state name (resolved from the tree root)
pub const ROOT_MARKER: char = '/';

/// Prefix delegating resolution of the remainder to the parent controller
pub const PARENT_MARKER: &str = "../";

/// Errors produced when a state name fails the accepted grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("state name is empty")]
    Empty,

    #[error("state name '{name}' contains the path separator '{SEPARATOR}'")]
    ContainsSeparator { name: String },

    #[error("state name '{name}' contains invalid character '{ch}'")]
    InvalidCharacter { name: String, ch: char },
}

/// Validates a single local state name
///
/// Accepted grammar: one or more of `[A-Za-z0-9_-]`. The separator is
/// rejected explicitly so the error names the actual violation.
///
/// # Arguments
/// * `name` - Candidate local name (one path segment)
///
/// # Returns
/// Ok(()) if the name is a valid local segment, NameError otherwise
pub fn validate_local_name(name: &str) -> Result<(), NameError> {
    if name.is_empty() {
        return Err(NameError::Empty);
    }

    for ch in name.chars() {
        if ch == SEPARATOR {
            return Err(NameError::ContainsSeparator {
                name: name.to_string(),
            });
        }
        if !(ch.is_ascii_alphanumeric() || ch == '_' || ch == '-') {
            return Err(NameError::InvalidCharacter {
                name: name.to_string(),
                ch,
            });
        }
    }

    Ok(())
}

/// Splits a full state name into its local segments
///
/// Empty segments (leading, trailing, or doubled separators) are dropped,
/// so `""` yields no segments and `"a..b"` yields `["a", "b"]`.
pub fn split_full_name(full_name: &str) -> Vec<String> {
    full_name
        .split(SEPARATOR)
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect()
}

/// Joins local segments back into a full state name
pub fn join_segments(segments: &[String]) -> String {
    segments.join(&SEPARATOR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_names() {
        assert!(validate_local_name("home").is_ok());
        assert!(validate_local_name("item-list_2").is_ok());
        assert!(validate_local_name("X").is_ok());
    }

    #[test]
    fn rejects_empty_name() {
        assert_eq!(validate_local_name(""), Err(NameError::Empty));
    }

    #[test]
    fn rejects_separator_in_name() {
        assert_eq!(
            validate_local_name("foo.bar"),
            Err(NameError::ContainsSeparator {
                name: "foo.bar".to_string()
            })
        );
    }

    #[test]
    fn rejects_invalid_characters() {
        assert_eq!(
            validate_local_name("foo bar"),
            Err(NameError::InvalidCharacter {
                name: "foo bar".to_string(),
                ch: ' '
            })
        );
        assert!(validate_local_name("foo/bar").is_err());
        assert!(validate_local_name("foo(bar)").is_err());
    }

    #[test]
    fn split_drops_empty_segments() {
        assert_eq!(split_full_name("a.b.c"), vec!["a", "b", "c"]);
        assert_eq!(split_full_name(""), Vec::<String>::new());
        assert_eq!(split_full_name(".a..b."), vec!["a", "b"]);
    }

    #[test]
    fn join_round_trips_clean_names() {
        let segments = split_full_name("app.list.item");
        assert_eq!(join_segments(&segments), "app.list.item");
    }
}
