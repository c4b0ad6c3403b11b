//! State of one dashboard, owned by the dashboard page.
//!
//! Every flow goes through [`DashboardSession::begin`], which rejects a
//! second flow while one is running. The `finish_*` methods settle the
//! loading, error and chain state once a flow is done.

use crate::api::{Comment, Post, User};
use crate::core::chain::ChainReport;
use crate::core::outcome::{ChainState, FlowEvent};
use crate::core::posts::CreateReport;
use crate::error::{Error, Result};

pub const BUSY: &str = "Another operation is already in progress.";
pub const USERS_FAILED: &str = "Failed to fetch users.";
pub const CREATE_FAILED: &str = "Failed to create post.";

#[derive(Debug, Default)]
pub struct DashboardSession {
    users: Vec<User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    chain_state: ChainState,
    error: Option<String>,
    trace: Vec<String>,
    busy: bool,
}

impl DashboardSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a flow as started. Fails if another flow has not finished yet.
    pub fn begin(&mut self) -> Result<()> {
        if self.busy {
            return Err(Error::validation(BUSY));
        }
        self.busy = true;
        self.error = None;
        self.chain_state = ChainState::Running;
        Ok(())
    }

    /// Like [`Self::begin`], also clearing the trace of the previous chain run.
    pub fn begin_chain(&mut self) -> Result<()> {
        self.begin()?;
        self.trace.clear();
        Ok(())
    }

    /// Record a failure detected before any flow started.
    pub fn reject(&mut self, err: &Error) {
        self.error = Some(err.to_string());
    }

    pub fn apply(&mut self, event: FlowEvent) {
        match event {
            FlowEvent::UsersLoaded(users) => self.users = users,
            FlowEvent::PostCreated(post) => self.posts.push(post),
            FlowEvent::CommentsLoaded(comments) => self.comments = comments,
        }
    }

    pub fn finish_users(&mut self, result: Result<Vec<User>>) {
        self.busy = false;
        match result {
            Ok(users) => {
                self.users = users;
                self.succeed(ChainState::Idle);
            }
            Err(err) => self.fail(format!("{USERS_FAILED} {err}")),
        }
    }

    pub fn finish_chain(&mut self, report: &ChainReport) {
        self.busy = false;
        self.trace.clone_from(&report.trace);
        match &report.error {
            None => self.succeed(ChainState::Succeeded),
            Some(err) => self.fail(err.to_string()),
        }
    }

    pub fn finish_create(&mut self, result: &Result<CreateReport>) {
        self.busy = false;
        match result {
            Ok(CreateReport {
                comments: Err(err), ..
            }) => self.fail(format!("Failed to fetch comments: {err}")),
            Ok(_) => self.succeed(ChainState::Succeeded),
            Err(err) => self.fail(format!("{CREATE_FAILED} {err}")),
        }
    }

    /// A finished flow supersedes anything rejected while it was running.
    fn succeed(&mut self, state: ChainState) {
        self.chain_state = state;
        self.error = None;
    }

    fn fail(&mut self, message: String) {
        self.chain_state = ChainState::Failed(message.clone());
        self.error = Some(message);
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub const fn chain_state(&self) -> &ChainState {
        &self.chain_state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn trace(&self) -> &[String] {
        &self.trace
    }

    pub const fn is_busy(&self) -> bool {
        self.busy
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::chain::{ChainError, ChainStep};
    use crate::core::testing::{comment, user};

    fn post(id: u64) -> Post {
        Post {
            id,
            title: "t".into(),
            body: "b".into(),
            user_id: 1,
        }
    }

    #[test]
    fn test_begin_rejects_reentry() {
        let mut session = DashboardSession::new();
        session.begin_chain().unwrap();

        assert_eq!(session.begin(), Err(Error::validation(BUSY)));
        assert!(session.is_busy());
        assert_eq!(session.chain_state(), &ChainState::Running);

        session.finish_chain(&ChainReport::default());
        assert!(!session.is_busy());
        assert!(session.begin().is_ok());
    }

    #[test]
    fn test_success_clears_busy_rejection() {
        let mut session = DashboardSession::new();
        session.begin_chain().unwrap();
        let err = session.begin().unwrap_err();
        session.reject(&err);
        assert_eq!(session.error(), Some(BUSY));

        session.finish_chain(&ChainReport::default());
        assert_eq!(session.error(), None);
        assert_eq!(session.chain_state(), &ChainState::Succeeded);

        session.begin().unwrap();
        let err = session.begin().unwrap_err();
        session.reject(&err);
        session.finish_users(Ok(vec![user(1)]));
        assert_eq!(session.error(), None);
    }

    #[test]
    fn test_begin_resets_error() {
        let mut session = DashboardSession::new();
        session.reject(&Error::validation("User ID is required to create a post."));
        assert!(session.error().is_some());

        session.begin().unwrap();
        assert_eq!(session.error(), None);
    }

    #[test]
    fn test_posts_append_and_comments_replace() {
        let mut session = DashboardSession::new();
        session.apply(FlowEvent::PostCreated(post(1)));
        session.apply(FlowEvent::CommentsLoaded(vec![comment(1, 1, "a"), comment(2, 1, "b")]));
        session.apply(FlowEvent::PostCreated(post(2)));
        session.apply(FlowEvent::CommentsLoaded(vec![comment(9, 2, "c")]));

        assert_eq!(session.posts().iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(session.comments(), &[comment(9, 2, "c")]);
    }

    #[test]
    fn test_failed_chain_keeps_partial_results() {
        let mut session = DashboardSession::new();
        session.begin_chain().unwrap();
        session.apply(FlowEvent::UsersLoaded(vec![user(1)]));

        let report = ChainReport {
            users: Some(vec![user(1)]),
            error: Some(ChainError {
                step: ChainStep::CreatePost,
                error: Error::Network("offline".into()),
            }),
            trace: vec![
                ChainStep::FetchUsers.label().into(),
                ChainStep::CreatePost.label().into(),
                "Error: Network error: offline".into(),
            ],
            ..ChainReport::default()
        };
        session.finish_chain(&report);

        assert_eq!(session.users(), &[user(1)]);
        assert!(session.posts().is_empty());
        assert_eq!(session.error(), Some("Network error: offline"));
        assert_eq!(
            session.chain_state(),
            &ChainState::Failed("Network error: offline".into())
        );
        assert_eq!(session.trace().len(), 3);
    }

    #[test]
    fn test_create_failure_messages() {
        let mut session = DashboardSession::new();
        session.begin().unwrap();
        session.finish_create(&Err(Error::Http {
            status: 500,
            message: "boom".into(),
        }));
        assert_eq!(
            session.error(),
            Some("Failed to create post. Request failed with status code 500: boom")
        );

        session.begin().unwrap();
        session.apply(FlowEvent::PostCreated(post(4)));
        session.finish_create(&Ok(CreateReport {
            post: post(4),
            comments: Err(Error::Network("reset".into())),
        }));
        assert_eq!(session.posts().len(), 1);
        assert_eq!(
            session.error(),
            Some("Failed to fetch comments: Network error: reset")
        );
    }

    #[test]
    fn test_users_failure_message() {
        let mut session = DashboardSession::new();
        session.begin().unwrap();
        session.finish_users(Err(Error::Network("offline".into())));
        assert_eq!(
            session.error(),
            Some("Failed to fetch users. Network error: offline")
        );
        assert!(!session.is_busy());
    }
}
