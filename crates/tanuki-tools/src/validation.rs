//! Structural checks applied to tool payloads before any request is sent.
//!
//! Unknown fields are already rejected when arguments are deserialized
//! (`deny_unknown_fields`) and categorical fields are closed enums, so what is
//! left here is length and count limits plus non-blank checks.

use tanuki_client::GitLabError;

pub const MAX_PROJECT_NAME_LENGTH: usize = 255;
pub const MAX_TITLE_LENGTH: usize = 500;
pub const MAX_DESCRIPTION_LENGTH: usize = 50_000;
pub const MAX_LABELS_LENGTH: usize = 1_000;
pub const MAX_BRANCH_LENGTH: usize = 255;
pub const MAX_ASSIGNEES: usize = 10;

/// Payload-level validation run after deserialization.
///
/// The default accepts everything; payloads with limits override it.
pub trait Validate {
    /// # Errors
    ///
    /// Returns [`GitLabError::Validation`] naming the offending field.
    fn validate(&self) -> Result<(), GitLabError> {
        Ok(())
    }
}

/// Require `min..=max` characters.
///
/// # Errors
///
/// Returns [`GitLabError::Validation`] when the length is out of range.
pub fn check_length(field: &str, value: &str, min: usize, max: usize) -> Result<(), GitLabError> {
    let len = value.chars().count();
    if len < min {
        return Err(GitLabError::validation(format!(
            "{field} must be at least {min} character{}",
            if min == 1 { "" } else { "s" }
        )));
    }
    if len > max {
        return Err(GitLabError::validation(format!(
            "{field} must be at most {max} characters (got {len})"
        )));
    }
    Ok(())
}

/// Like [`check_length`], but absent values pass.
///
/// # Errors
///
/// Returns [`GitLabError::Validation`] when a present value is out of range.
pub fn check_optional_length(
    field: &str,
    value: Option<&str>,
    min: usize,
    max: usize,
) -> Result<(), GitLabError> {
    value.map_or(Ok(()), |v| check_length(field, v, min, max))
}

/// Cap the number of entries in an optional list.
///
/// # Errors
///
/// Returns [`GitLabError::Validation`] when the list is too long.
pub fn check_max_items<T>(field: &str, items: Option<&[T]>, max: usize) -> Result<(), GitLabError> {
    match items {
        Some(items) if items.len() > max => Err(GitLabError::validation(format!(
            "{field} must contain at most {max} entries (got {})",
            items.len()
        ))),
        _ => Ok(()),
    }
}

/// Reject empty and whitespace-only text.
///
/// # Errors
///
/// Returns [`GitLabError::Validation`] for blank input.
pub fn check_not_blank(field: &str, value: &str) -> Result<(), GitLabError> {
    if value.trim().is_empty() {
        return Err(GitLabError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    #[test]
    fn test_check_length_bounds() {
        assert!(check_length("title", "a", 1, MAX_TITLE_LENGTH).is_ok());
        assert!(check_length("title", &"a".repeat(500), 1, MAX_TITLE_LENGTH).is_ok());

        let err = check_length("title", &"a".repeat(501), 1, MAX_TITLE_LENGTH).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: title must be at most 500 characters (got 501)"
        );

        let err = check_length("title", "", 1, MAX_TITLE_LENGTH).unwrap_err();
        assert_eq!(err.to_string(), "Validation error: title must be at least 1 character");
    }

    #[test]
    fn test_length_counts_characters() {
        assert!(check_length("name", &"ü".repeat(255), 1, MAX_PROJECT_NAME_LENGTH).is_ok());
    }

    #[test]
    fn test_optional_length() {
        assert!(check_optional_length("labels", None, 0, MAX_LABELS_LENGTH).is_ok());
        assert!(check_optional_length("labels", Some(&"x".repeat(1001)), 0, MAX_LABELS_LENGTH).is_err());
    }

    #[test]
    fn test_max_items() {
        let ids: Vec<u64> = (1..=10).collect();
        assert!(check_max_items("assignee_ids", Some(ids.as_slice()), MAX_ASSIGNEES).is_ok());
        let ids: Vec<u64> = (1..=11).collect();
        let err = check_max_items("assignee_ids", Some(ids.as_slice()), MAX_ASSIGNEES).unwrap_err();
        assert!(err.to_string().contains("assignee_ids"));
        assert!(check_max_items::<u64>("assignee_ids", None, MAX_ASSIGNEES).is_ok());
    }

    #[test]
    fn test_not_blank() {
        assert!(check_not_blank("body", "LGTM").is_ok());
        assert!(check_not_blank("body", "  \n\t").is_err());
    }
}
