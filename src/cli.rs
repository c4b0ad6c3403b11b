use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::page::PageId;

#[derive(Parser, Debug)]
#[command(
    name = "chainview",
    version,
    about = "Terminal client for chained calls against a REST test service"
)]
pub struct Args {
    /// Base URL of the remote service, overriding the config file
    #[arg(short, long)]
    pub base_url: Option<String>,

    /// Page to open on startup
    #[arg(short, long, value_enum, default_value_t = StartPage::Home)]
    pub page: StartPage,

    /// Post id to look up when the comments page opens
    #[arg(long)]
    pub post_id: Option<u64>,

    /// Path to the config file (e.g., "./chainview.toml")
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StartPage {
    Home,
    Dashboard,
    Comments,
}

impl From<StartPage> for PageId {
    fn from(page: StartPage) -> Self {
        match page {
            StartPage::Home => Self::Home,
            StartPage::Dashboard => Self::Dashboard,
            StartPage::Comments => Self::Comments,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["chainview"]);
        assert_eq!(args.page, StartPage::Home);
        assert!(args.base_url.is_none());
        assert!(args.post_id.is_none());
    }

    #[test]
    fn test_comments_page_with_post_id() {
        let args = Args::parse_from([
            "chainview",
            "--page",
            "comments",
            "--post-id",
            "7",
            "--base-url",
            "http://localhost:3000",
        ]);
        assert_eq!(PageId::from(args.page), PageId::Comments);
        assert_eq!(args.post_id, Some(7));
        assert_eq!(args.base_url.as_deref(), Some("http://localhost:3000"));
    }
}
