use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A user from the remote listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.email)
    }
}

/// A post as returned by the remote after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: u64,
    pub title: String,
    pub body: String,
    pub user_id: u64,
}

/// Request body for creating a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub title: String,
    pub body: String,
    pub user_id: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: u64,
    pub post_id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    pub body: String,
}

/// Post fields as typed by the user, before anything is sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub body: String,
    pub user_id: Option<u64>,
}

impl PostDraft {
    pub fn new(title: impl Into<String>, body: impl Into<String>, user_id: Option<u64>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            user_id,
        }
    }
}

/// Parse a user id typed into a form. Blank input means "not selected".
pub fn parse_user_id(input: &str) -> Result<Option<u64>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|_| Error::validation(format!("User ID must be a number, got '{trimmed}'.")))
}

/// Parse a post id typed into a form. The id is required.
pub fn parse_post_id(input: &str) -> Result<u64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Post ID is required."));
    }
    trimmed
        .parse()
        .map_err(|_| Error::validation(format!("Post ID must be a number, got '{trimmed}'.")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_ignores_extra_user_fields() {
        let json = r#"{
            "id": 1,
            "name": "Leanne Graham",
            "username": "Bret",
            "email": "Sincere@april.biz",
            "address": { "city": "Gwenborough" }
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.to_string(), "Leanne Graham (Sincere@april.biz)");
    }

    #[test]
    fn test_new_post_uses_remote_field_names() {
        let post = NewPost {
            title: "New Post".into(),
            body: "This is a new post.".into(),
            user_id: 7,
        };
        let value = serde_json::to_value(&post).unwrap();
        assert_eq!(value["userId"], 7);
        assert!(value.get("user_id").is_none());
    }

    #[test]
    fn test_comment_without_author_fields() {
        let comment: Comment = serde_json::from_str(r#"{"id":1,"postId":99,"body":"hi"}"#).unwrap();
        assert_eq!(comment.post_id, 99);
        assert_eq!(comment.name, None);
    }

    #[test]
    fn test_parse_user_id() {
        assert_eq!(parse_user_id("").unwrap(), None);
        assert_eq!(parse_user_id("  ").unwrap(), None);
        assert_eq!(parse_user_id(" 3 ").unwrap(), Some(3));
        assert!(matches!(parse_user_id("abc"), Err(Error::Validation(_))));
    }

    #[test]
    fn test_parse_post_id() {
        assert_eq!(parse_post_id("42").unwrap(), 42);
        assert_eq!(
            parse_post_id(""),
            Err(Error::validation("Post ID is required."))
        );
        assert!(matches!(parse_post_id("-1"), Err(Error::Validation(_))));
    }
}
