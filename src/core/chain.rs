//! The scripted API chain: list users, create a post as the first user,
//! then fetch the comments of the created post.
//!
//! The first failing step aborts the rest. Whatever was fetched or created
//! before the failure stays in the [`ChainReport`] and has already been
//! handed to the caller through `on_event`. Nothing is rolled back.

use std::fmt;

use thiserror::Error;
use tracing::{info, warn};

use crate::api::{Comment, Gateway, NewPost, Post, PostDraft, User};
use crate::core::outcome::FlowEvent;
use crate::error::Error;

pub const DEFAULT_TITLE: &str = "New Post";
pub const DEFAULT_BODY: &str = "This is a new post.";
pub const COMPLETED: &str = "API Chain Completed Successfully";
pub const NO_USERS: &str = "No users available to create a post.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainStep {
    FetchUsers,
    CreatePost,
    FetchComments,
}

impl ChainStep {
    pub const ALL: [Self; 3] = [Self::FetchUsers, Self::CreatePost, Self::FetchComments];

    pub const fn label(self) -> &'static str {
        match self {
            Self::FetchUsers => "Fetch Users List (GET)",
            Self::CreatePost => "Create Post with selected User ID (POST)",
            Self::FetchComments => "Fetch Comments for the created Post (GET)",
        }
    }
}

impl fmt::Display for ChainStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The error that stopped the chain, and the step it stopped at.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{error}")]
pub struct ChainError {
    pub step: ChainStep,
    pub error: Error,
}

impl ChainError {
    const fn new(step: ChainStep, error: Error) -> Self {
        Self { step, error }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChainReport {
    pub users: Option<Vec<User>>,
    pub post: Option<Post>,
    pub comments: Option<Vec<Comment>>,
    pub error: Option<ChainError>,
    /// Step labels in the order they started, then the final status line.
    pub trace: Vec<String>,
}

impl ChainReport {
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Build the post the chain creates for `author`.
///
/// Blank draft fields fall back to the defaults. The draft's own user id is
/// not used on this path.
pub fn post_for_author(draft: &PostDraft, author: &User) -> NewPost {
    let or_default = |value: &str, default: &str| {
        if value.is_empty() {
            default.to_string()
        } else {
            value.to_string()
        }
    };
    NewPost {
        title: or_default(&draft.title, DEFAULT_TITLE),
        body: or_default(&draft.body, DEFAULT_BODY),
        user_id: author.id,
    }
}

/// Run the three dependent calls, reporting partial results as they land.
pub async fn run_chain<G, F>(gateway: &G, draft: &PostDraft, mut on_event: F) -> ChainReport
where
    G: Gateway + ?Sized,
    F: FnMut(FlowEvent) + Send,
{
    let mut report = ChainReport::default();
    info!("Running API chain");

    match run_steps(gateway, draft, &mut report, &mut on_event).await {
        Ok(()) => {
            info!("API chain completed");
            report.trace.push(COMPLETED.to_string());
        }
        Err(err) => {
            warn!(step = %err.step, error = %err, "API chain aborted");
            report.trace.push(format!("Error: {err}"));
            report.error = Some(err);
        }
    }
    report
}

async fn run_steps<G, F>(
    gateway: &G,
    draft: &PostDraft,
    report: &mut ChainReport,
    on_event: &mut F,
) -> Result<(), ChainError>
where
    G: Gateway + ?Sized,
    F: FnMut(FlowEvent) + Send,
{
    report.trace.push(ChainStep::FetchUsers.label().to_string());
    let users = gateway
        .list_users()
        .await
        .map_err(|e| ChainError::new(ChainStep::FetchUsers, e))?;
    let author = users.first().cloned();
    on_event(FlowEvent::UsersLoaded(users.clone()));
    report.users = Some(users);

    report.trace.push(ChainStep::CreatePost.label().to_string());
    let author =
        author.ok_or_else(|| ChainError::new(ChainStep::CreatePost, Error::logic(NO_USERS)))?;
    let new_post = post_for_author(draft, &author);
    let post = gateway
        .create_post(&new_post)
        .await
        .map_err(|e| ChainError::new(ChainStep::CreatePost, e))?;
    info!(post_id = post.id, user_id = post.user_id, "Post created");
    let post_id = post.id;
    on_event(FlowEvent::PostCreated(post.clone()));
    report.post = Some(post);

    report.trace.push(ChainStep::FetchComments.label().to_string());
    let comments = gateway
        .list_comments(post_id)
        .await
        .map_err(|e| ChainError::new(ChainStep::FetchComments, e))?;
    on_event(FlowEvent::CommentsLoaded(comments.clone()));
    report.comments = Some(comments);

    Ok(())
}
