use crate::api::{Comment, Post, User};
use crate::error::Error;

/// What a page receives for each call it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Started,
    Succeeded(T),
    Failed(String),
}

impl<T> Outcome<T> {
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Started)
    }
}

impl<T> From<Result<T, Error>> for Outcome<T> {
    fn from(result: Result<T, Error>) -> Self {
        match result {
            Ok(value) => Self::Succeeded(value),
            Err(err) => Self::Failed(err.to_string()),
        }
    }
}

/// A partial result surfaced by a multi-step flow as soon as it exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowEvent {
    UsersLoaded(Vec<User>),
    PostCreated(Post),
    CommentsLoaded(Vec<Comment>),
}

/// Progress of the scripted chain on one dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ChainState {
    #[default]
    Idle,
    Running,
    Succeeded,
    Failed(String),
}
