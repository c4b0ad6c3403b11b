//! The three pages of the client.
//!
//! - [`home`] - user list, fetched with retry
//! - [`dashboard`] - the API chain and independent post creation
//! - [`comments`] - comment lookup by post id, with retry

pub mod comments;
pub mod dashboard;
pub mod home;

pub use comments::CommentsPage;
pub use dashboard::DashboardPage;
pub use home::HomePage;
