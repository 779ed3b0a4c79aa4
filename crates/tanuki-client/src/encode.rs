//! Identifier encoding for URL path segments.
//!
//! GitLab accepts a project or group either by numeric ID or by its full
//! namespace path with every `/` escaped. Identifiers arrive as free text from
//! tool callers, so they are checked against a strict charset before anything
//! is spliced into a URL.

use std::sync::LazyLock;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;

use crate::error::GitLabError;

/// Everything except the RFC 3986 unreserved set is escaped, `/` included.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

#[allow(clippy::expect_used)]
static NUMERIC_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("numeric id pattern compiles"));

#[allow(clippy::expect_used)]
static NAMESPACE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9\-_./]+$").expect("namespace path pattern compiles"));

/// Validate and encode a project ID or `namespace/project` path.
///
/// # Errors
///
/// Returns [`GitLabError::Validation`] if the identifier is blank or contains
/// anything other than letters, digits, `-`, `_`, `.` and `/`.
pub fn encode_project_id(project_id: &str) -> Result<String, GitLabError> {
    encode_identifier(project_id, "project_id", "group/project")
}

/// Validate and encode a group ID or `parent/child` group path.
///
/// # Errors
///
/// Returns [`GitLabError::Validation`] under the same rules as
/// [`encode_project_id`].
pub fn encode_group_id(group_id: &str) -> Result<String, GitLabError> {
    encode_identifier(group_id, "group_id", "group/subgroup")
}

fn encode_identifier(raw: &str, field: &str, example: &str) -> Result<String, GitLabError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(GitLabError::validation(format!("{field} must not be empty")));
    }

    if NUMERIC_ID.is_match(trimmed) {
        return Ok(trimmed.to_string());
    }

    if !NAMESPACE_PATH.is_match(trimmed) {
        return Err(GitLabError::validation(format!(
            "{field} must be a numeric ID or a path like '{example}' \
             (alphanumeric, hyphens, underscores, dots, and slashes only)"
        )));
    }

    Ok(encode_path_segment(trimmed))
}

/// Percent-encode a value as a single path segment.
///
/// No character is treated as safe, so `/` becomes `%2F`. Used for file
/// paths, branch names, tags and wiki slugs as well as identifiers.
#[must_use]
pub fn encode_path_segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}
