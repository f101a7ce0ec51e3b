//! Route handler modules for the minigram REST API.

pub mod admin;
pub mod comments;
pub mod health;
pub mod notifications;
pub mod posts;
pub mod users;
