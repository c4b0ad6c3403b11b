//! In-memory gateway for flow tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::{Comment, Gateway, NewPost, Post, User};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    ListUsers,
    CreatePost,
    ListComments(u64),
}

/// Answers every call with a canned response and records what was asked.
pub struct FakeGateway {
    users: Result<Vec<User>>,
    create_error: Option<Error>,
    post_id: u64,
    comments: Result<Vec<Comment>>,
    calls: Mutex<Vec<Call>>,
    created: Mutex<Vec<NewPost>>,
}

impl FakeGateway {
    pub fn new(users: Vec<User>) -> Self {
        Self {
            users: Ok(users),
            create_error: None,
            post_id: 101,
            comments: Ok(Vec::new()),
            calls: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_users(mut self, err: Error) -> Self {
        self.users = Err(err);
        self
    }

    pub fn failing_create(mut self, err: Error) -> Self {
        self.create_error = Some(err);
        self
    }

    pub const fn with_post_id(mut self, id: u64) -> Self {
        self.post_id = id;
        self
    }

    pub fn with_comments(mut self, comments: Vec<Comment>) -> Self {
        self.comments = Ok(comments);
        self
    }

    pub fn failing_comments(mut self, err: Error) -> Self {
        self.comments = Err(err);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created(&self) -> Vec<NewPost> {
        self.created.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn list_users(&self) -> Result<Vec<User>> {
        self.record(Call::ListUsers);
        self.users.clone()
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post> {
        self.record(Call::CreatePost);
        self.created.lock().unwrap().push(post.clone());
        if let Some(err) = &self.create_error {
            return Err(err.clone());
        }
        Ok(Post {
            id: self.post_id,
            title: post.title.clone(),
            body: post.body.clone(),
            user_id: post.user_id,
        })
    }

    async fn list_comments(&self, post_id: u64) -> Result<Vec<Comment>> {
        self.record(Call::ListComments(post_id));
        self.comments.clone()
    }
}

pub fn user(id: u64) -> User {
    User {
        id,
        name: format!("User {id}"),
        email: format!("user{id}@example.com"),
    }
}

pub fn comment(id: u64, post_id: u64, body: &str) -> Comment {
    Comment {
        id,
        post_id,
        name: None,
        email: None,
        body: body.to_string(),
    }
}
