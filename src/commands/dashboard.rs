//! Commands behind the dashboard page.
//!
//! Each command runs one flow and reports back through the page's message
//! channel. Partial results of multi-step flows are forwarded as they land.

use std::sync::Arc;

use async_trait::async_trait;
use color_eyre::Result;
use tokio::sync::mpsc::UnboundedSender;

use crate::api::{Gateway, PostDraft};
use crate::commands::Command;
use crate::core::{create_independent, run_chain};
use crate::pages::dashboard::DashboardMsg;

/// Fetch the user list once, without retrying.
pub struct FetchUsersCmd {
    gateway: Arc<dyn Gateway>,
    tx: UnboundedSender<DashboardMsg>,
}

impl FetchUsersCmd {
    pub fn new(gateway: Arc<dyn Gateway>, tx: UnboundedSender<DashboardMsg>) -> Self {
        Self { gateway, tx }
    }
}

#[async_trait]
impl Command for FetchUsersCmd {
    fn name(&self) -> String {
        "Loading users".to_string()
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        let result = self.gateway.list_users().await;
        let _ = self.tx.send(DashboardMsg::UsersFinished(result));
        Ok(())
    }
}

/// Run the scripted users → post → comments chain.
pub struct RunChainCmd {
    gateway: Arc<dyn Gateway>,
    draft: PostDraft,
    tx: UnboundedSender<DashboardMsg>,
}

impl RunChainCmd {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        draft: PostDraft,
        tx: UnboundedSender<DashboardMsg>,
    ) -> Self {
        Self { gateway, draft, tx }
    }
}

#[async_trait]
impl Command for RunChainCmd {
    fn name(&self) -> String {
        "Running API chain".to_string()
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        let tx = &self.tx;
        let report = run_chain(self.gateway.as_ref(), &self.draft, |event| {
            let _ = tx.send(DashboardMsg::Flow(event));
        })
        .await;
        let _ = self.tx.send(DashboardMsg::ChainFinished(report));
        Ok(())
    }
}

/// Create a post from the draft as typed, then load its comments.
pub struct CreatePostCmd {
    gateway: Arc<dyn Gateway>,
    draft: PostDraft,
    tx: UnboundedSender<DashboardMsg>,
}

impl CreatePostCmd {
    pub fn new(
        gateway: Arc<dyn Gateway>,
        draft: PostDraft,
        tx: UnboundedSender<DashboardMsg>,
    ) -> Self {
        Self { gateway, draft, tx }
    }
}

#[async_trait]
impl Command for CreatePostCmd {
    fn name(&self) -> String {
        match self.draft.user_id {
            Some(user_id) => format!("Creating post for user {user_id}"),
            None => "Creating post".to_string(),
        }
    }

    async fn execute(self: Box<Self>) -> Result<()> {
        let tx = &self.tx;
        let result = create_independent(self.gateway.as_ref(), &self.draft, |event| {
            let _ = tx.send(DashboardMsg::Flow(event));
        })
        .await;
        let _ = self.tx.send(DashboardMsg::CreateFinished(result));
        Ok(())
    }
}
