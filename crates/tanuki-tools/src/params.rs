//! Shared parameter pieces: paging defaults, closed enums, serde helpers.
//!
//! Parameter structs double as the query string or JSON body of their
//! request. Path fields are marked `skip_serializing`, optional text that is
//! blank is dropped, and `false` flags that GitLab treats as "unset" are
//! omitted.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize, Serializer};

/// GitLab's hard ceiling on page size.
pub const MAX_PER_PAGE: u32 = 100;

pub const fn default_page() -> u32 {
    1
}

pub const fn default_per_page() -> u32 {
    20
}

pub const fn default_true() -> bool {
    true
}

/// Serialize `per_page` clamped to [`MAX_PER_PAGE`].
#[allow(clippy::trivially_copy_pass_by_ref)]
pub fn clamp_per_page<S: Serializer>(per_page: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u32((*per_page).min(MAX_PER_PAGE))
}

/// `skip_serializing_if` predicate for optional free text.
#[allow(clippy::ref_option)]
pub fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

/// `skip_serializing_if` predicate for flags only sent when set.
#[allow(clippy::trivially_copy_pass_by_ref)]
pub const fn is_false(value: &bool) -> bool {
    !*value
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    Internal,
    #[default]
    Private,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// State transition for issues and merge requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StateEvent {
    Close,
    Reopen,
}
