//! Flows built on top of the [`crate::api::Gateway`].
//!
//! - [`retry`] - bounded fixed-interval retry, awaitable or as a cancellable task
//! - [`chain`] - the scripted users → post → comments chain
//! - [`posts`] - creating a post from the user's draft
//! - [`session`] - the dashboard's explicit state
//! - [`outcome`] - what the pages receive from each call

pub mod chain;
pub mod outcome;
pub mod posts;
pub mod retry;
pub mod session;

#[cfg(test)]
pub mod testing;

pub use chain::{ChainReport, ChainStep, run_chain};
pub use outcome::{ChainState, FlowEvent, Outcome};
pub use posts::{CreateReport, create_independent};
pub use retry::{RetryPolicy, RetryTask, retry};
pub use session::DashboardSession;
