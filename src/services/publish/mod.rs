pub mod github;
pub mod publisher;

pub use github::{ContentsApi, GitHubContentsClient, PutFileBody, RepoFile};
pub use publisher::{publish_body, GitPublishBackend, Publisher};
