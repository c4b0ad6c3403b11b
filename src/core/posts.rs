//! Creating a post from the user's own draft, outside the scripted chain.

use tracing::{info, warn};

use crate::api::{Comment, Gateway, NewPost, Post, PostDraft};
use crate::core::outcome::FlowEvent;
use crate::error::{Error, Result};

pub const USER_ID_REQUIRED: &str = "User ID is required to create a post.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateReport {
    pub post: Post,
    /// Follow-up fetch of the new post's comments. A failure here leaves
    /// the post in place.
    pub comments: Result<Vec<Comment>>,
}

/// Validate the draft, create the post, then load its comments.
///
/// A draft without a user id fails before any request is made.
pub async fn create_independent<G, F>(
    gateway: &G,
    draft: &PostDraft,
    mut on_event: F,
) -> Result<CreateReport>
where
    G: Gateway + ?Sized,
    F: FnMut(FlowEvent) + Send,
{
    let user_id = draft
        .user_id
        .ok_or_else(|| Error::validation(USER_ID_REQUIRED))?;

    let new_post = NewPost {
        title: draft.title.clone(),
        body: draft.body.clone(),
        user_id,
    };
    let post = gateway.create_post(&new_post).await?;
    info!(post_id = post.id, user_id, "Post created");
    on_event(FlowEvent::PostCreated(post.clone()));

    let comments = gateway.list_comments(post.id).await;
    match &comments {
        Ok(comments) => on_event(FlowEvent::CommentsLoaded(comments.clone())),
        Err(err) => warn!(post_id = post.id, error = %err, "Failed to load comments for new post"),
    }

    Ok(CreateReport { post, comments })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::testing::{Call, FakeGateway, comment, user};

    #[tokio::test]
    async fn test_missing_user_id_makes_no_calls() {
        let gateway = FakeGateway::new(vec![user(1)]);
        let mut events = Vec::new();

        let result = create_independent(&gateway, &PostDraft::new("t", "b", None), |e| {
            events.push(e);
        })
        .await;

        assert_eq!(result, Err(Error::validation(USER_ID_REQUIRED)));
        assert!(gateway.calls().is_empty());
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn test_uses_the_full_draft() {
        let gateway = FakeGateway::new(Vec::new())
            .with_post_id(12)
            .with_comments(vec![comment(3, 12, "first")]);
        let mut events = Vec::new();

        let report = create_independent(&gateway, &PostDraft::new("", "body only", Some(5)), |e| {
            events.push(e);
        })
        .await
        .unwrap();

        assert_eq!(
            gateway.created(),
            vec![NewPost {
                title: String::new(),
                body: "body only".into(),
                user_id: 5,
            }]
        );
        assert_eq!(report.post.id, 12);
        assert_eq!(report.comments, Ok(vec![comment(3, 12, "first")]));
        assert_eq!(
            gateway.calls(),
            vec![Call::CreatePost, Call::ListComments(12)]
        );
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn test_comment_failure_keeps_post() {
        let gateway = FakeGateway::new(Vec::new())
            .with_post_id(8)
            .failing_comments(Error::Network("timed out".into()));
        let mut events = Vec::new();

        let report = create_independent(&gateway, &PostDraft::new("a", "b", Some(1)), |e| {
            events.push(e);
        })
        .await
        .unwrap();

        assert_eq!(report.post.id, 8);
        assert_eq!(report.comments, Err(Error::Network("timed out".into())));
        assert!(matches!(events.as_slice(), [FlowEvent::PostCreated(_)]));
    }

    #[tokio::test]
    async fn test_create_failure_is_returned() {
        let gateway = FakeGateway::new(Vec::new())
            .failing_create(Error::Validation("title is required".into()));

        let result = create_independent(&gateway, &PostDraft::new("", "", Some(1)), |_| {}).await;

        assert_eq!(result, Err(Error::Validation("title is required".into())));
        assert_eq!(gateway.calls(), vec![Call::CreatePost]);
    }
}
