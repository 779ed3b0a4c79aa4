//! # tanuki-client
//!
//! Hardened async client for the GitLab REST v4 API.
//!
//! Every outbound call goes through [`GitLabClient::request`], which sends the
//! token in a `PRIVATE-TOKEN` header, bounds response size, and folds the
//! outcome into a [`GitLabResponse`] or a [`GitLabError`] whose message is safe
//! to show to an end user.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use tanuki_client::{Config, GitLabClient, encode_project_id};
//!
//! # async fn example() -> Result<(), tanuki_client::GitLabError> {
//! let config = Arc::new(Config::from_env()?);
//! let client = GitLabClient::new(config);
//!
//! let id = encode_project_id("gitlab-org/gitlab")?;
//! let project = client.get(&format!("/projects/{id}")).await?;
//! println!("{}", project.into_json());
//!
//! client.close().await;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod encode;
pub mod error;
pub mod response;

pub use client::{GitLabClient, MAX_RESPONSE_SIZE, REQUEST_TIMEOUT};
pub use config::{Config, TlsPolicy};
pub use encode::{encode_group_id, encode_path_segment, encode_project_id};
pub use error::GitLabError;
pub use response::{GitLabResponse, Pagination};
