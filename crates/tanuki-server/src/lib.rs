//! # tanuki-server
//!
//! Model Context Protocol server that exposes the GitLab REST API as tools.
//!
//! The binary reads its configuration from the environment, builds one
//! shared [`GitLabClient`](tanuki_client::GitLabClient), registers every
//! GitLab tool and serves them over stdio:
//!
//! ```bash
//! GITLAB_TOKEN=glpat-... GITLAB_URL=https://gitlab.example.com tanuki-server
//! ```
//!
//! `RUST_LOG` controls verbosity and `TANUKI_LOG_FORMAT=json` switches to
//! JSON logs. Logs always go to stderr.

pub mod error;
pub mod server;

pub use error::{Result, ServerError};
pub use server::TanukiServer;
