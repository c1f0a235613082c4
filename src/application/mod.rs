pub mod comments;
pub mod error;
pub mod likes;
pub mod pagination;
pub mod posts;
pub mod repos;
pub mod sessions;
