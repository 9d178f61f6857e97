pub mod client;
pub mod models;

pub use client::{BranchSource, GitHubClient, ListOptions, ProtectedFilter, DEFAULT_API_URL};
pub use models::{CommitInfo, ListedBranch, PrState, PullRequestSummary, RepoId};
