use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::api::Gateway;
use crate::api::model::{Comment, NewPost, Post, User};
use crate::config::ApiConfig;
use crate::error::{Error, Result};

/// Gateway backed by a `reqwest` client against one base address.
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: reqwest::Client,
    base_url: String,
}

impl HttpGateway {
    /// Create a gateway from the `[api]` config section.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    async fn send(request: RequestBuilder) -> Result<Response> {
        request
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                message: error_message(status, &text),
            });
        }

        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn list_users(&self) -> Result<Vec<User>> {
        let url = self.url("users");
        debug!(%url, "GET users");
        let response = Self::send(self.client.get(&url)).await?;
        Self::decode(response).await
    }

    async fn create_post(&self, post: &NewPost) -> Result<Post> {
        let url = self.url("posts");
        debug!(%url, user_id = post.user_id, "POST post");
        let response = Self::send(self.client.post(&url).json(post)).await?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNPROCESSABLE_ENTITY {
            let text = response.text().await.unwrap_or_default();
            let message = if text.trim().is_empty() {
                "The server rejected the post.".to_string()
            } else {
                text
            };
            return Err(Error::Validation(message));
        }

        Self::decode(response).await
    }

    async fn list_comments(&self, post_id: u64) -> Result<Vec<Comment>> {
        let url = self.url("comments");
        debug!(%url, post_id, "GET comments");
        let request = self.client.get(&url).query(&[("postId", post_id)]);
        let response = Self::send(request).await?;
        Self::decode(response).await
    }
}

fn error_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Unknown error")
            .to_string()
    } else {
        body.to_string()
    }
}
