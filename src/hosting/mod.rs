//! Read access to the source-control hosting API.

mod client;
mod model;
mod repo_spec;

pub use client::{Client, PullRequestState, UNKNOWN_VERSION};
pub use model::{PullRequest, Release};
pub use repo_spec::RepoSpec;
