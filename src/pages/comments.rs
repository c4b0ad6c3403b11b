//! Comment lookup by post id, with retry.

use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, Paragraph, Wrap};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::info;

use crate::Theme;
use crate::api::Comment;
use crate::api::model::parse_post_id;
use crate::core::{Outcome, RetryTask};
use crate::error::Result as ApiResult;
use crate::page::{Page, PageContext, PageMsg};
use crate::ui::{Component, EventResult, Keybinding, Spinner, TextInput, TextInputEvent};

pub enum CommentsMsg {
    EditPostId,
    Lookup(String),
    Loaded {
        generation: u64,
        result: ApiResult<Vec<Comment>>,
    },
}

pub struct CommentsPage {
    ctx: PageContext,
    post_id_text: String,
    /// `None` until the first lookup.
    state: Option<Outcome<Vec<Comment>>>,
    /// Input rejected before any request was made.
    notice: Option<String>,
    input: Option<TextInput>,
    spinner: Spinner,
    task: Option<RetryTask>,
    /// Bumped on every spawned lookup. Results from older lookups are dropped.
    generation: u64,
    msg_tx: UnboundedSender<CommentsMsg>,
    msg_rx: UnboundedReceiver<CommentsMsg>,
}

impl CommentsPage {
    pub fn new(ctx: PageContext) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            ctx,
            post_id_text: String::new(),
            state: None,
            notice: None,
            input: None,
            spinner: Spinner::new("Loading comments..."),
            task: None,
            generation: 0,
            msg_tx,
            msg_rx,
        }
    }

    /// Start with a lookup for `post_id` as soon as the page opens.
    #[must_use]
    pub fn with_post_id(mut self, post_id: Option<u64>) -> Self {
        if let Some(id) = post_id {
            self.post_id_text = id.to_string();
        }
        self
    }

    fn queue(&self, msg: CommentsMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn lookup(&mut self, text: String) {
        self.post_id_text = text;

        // An invalid id leaves the last completed fetch, and any lookup in
        // flight, untouched.
        let post_id = match parse_post_id(&self.post_id_text) {
            Ok(id) => id,
            Err(err) => {
                self.notice = Some(err.to_string());
                return;
            }
        };

        info!(post_id, "Fetching comments with retry");
        self.notice = None;
        self.state = Some(Outcome::Started);
        self.generation += 1;
        let generation = self.generation;

        let gateway = Arc::clone(&self.ctx.gateway);
        let tx = self.msg_tx.clone();
        // Replacing the task cancels the previous lookup.
        self.task = Some(RetryTask::spawn(
            self.ctx.retry,
            move || {
                let gateway = Arc::clone(&gateway);
                async move { gateway.list_comments(post_id).await }
            },
            move |result| {
                let _ = tx.send(CommentsMsg::Loaded { generation, result });
            },
        ));
    }

    fn process_message(&mut self, msg: CommentsMsg) {
        match msg {
            CommentsMsg::EditPostId => {
                self.input = Some(
                    TextInput::new("Post ID")
                        .with_value(self.post_id_text.clone())
                        .with_placeholder("e.g. 1")
                        .digits_only(),
                );
            }
            CommentsMsg::Lookup(text) => self.lookup(text),
            CommentsMsg::Loaded { generation, result } => {
                if generation != self.generation {
                    return;
                }
                self.task = None;
                self.state = Some(result.into());
            }
        }
    }

    fn render_results(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        match &self.state {
            None => {
                let hint = Paragraph::new(Line::from(Span::styled(
                    "Press i to enter a post id.",
                    Style::default().fg(theme.overlay1()),
                )));
                frame.render_widget(hint, area);
            }
            Some(Outcome::Started) => self.spinner.render(frame, area, theme),
            Some(Outcome::Failed(message)) => {
                let paragraph = Paragraph::new(Line::from(Span::styled(
                    message.as_str(),
                    Style::default().fg(theme.error()),
                )))
                .wrap(Wrap { trim: true });
                frame.render_widget(paragraph, area);
            }
            Some(Outcome::Succeeded(comments)) if comments.is_empty() => {
                let empty = Paragraph::new(Line::from(Span::styled(
                    "No comments for this post.",
                    Style::default().fg(theme.overlay1()),
                )));
                frame.render_widget(empty, area);
            }
            Some(Outcome::Succeeded(comments)) => {
                let items: Vec<ListItem> = comments
                    .iter()
                    .map(|c| {
                        ListItem::new(c.body.replace('\n', " "))
                            .style(Style::default().fg(theme.text()))
                    })
                    .collect();
                let list = List::new(items).block(
                    Block::default()
                        .title(" Comments ")
                        .title_style(Style::default().fg(theme.lavender())),
                );
                frame.render_widget(list, area);
            }
        }
    }
}

impl Page for CommentsPage {
    fn init(&mut self) {
        if !self.post_id_text.is_empty() {
            self.queue(CommentsMsg::Lookup(self.post_id_text.clone()));
        }
    }

    fn destroy(&mut self) {
        self.task = None;
    }

    fn handle_tick(&mut self) {
        if matches!(self.state, Some(Outcome::Started)) {
            self.spinner.handle_tick();
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> EventResult<()> {
        if let Some(input) = &mut self.input {
            return match input.handle_key(key) {
                Ok(EventResult::Event(TextInputEvent::Submitted(value))) => {
                    self.input = None;
                    self.queue(CommentsMsg::Lookup(value));
                    EventResult::Consumed
                }
                Ok(EventResult::Event(TextInputEvent::Cancelled)) => {
                    self.input = None;
                    EventResult::Consumed
                }
                _ => EventResult::Consumed,
            };
        }

        match key.code {
            KeyCode::Char('i') | KeyCode::Enter => {
                self.queue(CommentsMsg::EditPostId);
                EventResult::Consumed
            }
            KeyCode::Char('r') => {
                self.queue(CommentsMsg::Lookup(self.post_id_text.clone()));
                EventResult::Consumed
            }
            _ => EventResult::Ignored,
        }
    }

    fn handle_paste(&mut self, text: &str) {
        if let Some(input) = &mut self.input {
            input.paste(text);
        }
    }

    fn update(&mut self) -> Result<PageMsg> {
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.process_message(msg);
        }
        Ok(PageMsg::Idle)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .title(" Comments by Post ")
            .title_style(
                Style::default()
                    .fg(theme.mauve())
                    .add_modifier(Modifier::BOLD),
            )
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.surface1()));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let [header, notice, body] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .areas(inner);

        let post_id = if self.post_id_text.is_empty() {
            Span::styled("none", Style::default().fg(theme.overlay0()))
        } else {
            Span::styled(self.post_id_text.as_str(), Style::default().fg(theme.text()))
        };
        let header_line = Line::from(vec![
            Span::styled("Post ID: ", Style::default().fg(theme.overlay1())),
            post_id,
        ]);
        frame.render_widget(Paragraph::new(header_line), header);

        if let Some(message) = &self.notice {
            let line = Line::from(Span::styled(
                message.as_str(),
                Style::default().fg(theme.warning()),
            ));
            frame.render_widget(Paragraph::new(line), notice);
        }

        self.render_results(frame, body, theme);

        if let Some(input) = &mut self.input {
            input.render(frame, area, theme);
        }
    }

    fn is_editing(&self) -> bool {
        self.input.is_some()
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        if self.input.is_some() {
            return vec![
                Keybinding::new("Enter", "Look up"),
                Keybinding::new("Esc", "Cancel"),
            ];
        }
        vec![
            Keybinding::new("i", "Enter post id"),
            Keybinding::new("r", "Retry lookup"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::core::RetryPolicy;
    use crate::core::testing::{Call, FakeGateway, comment};
    use crate::error::Error;

    fn page_with(gateway: Arc<FakeGateway>, retry: RetryPolicy) -> CommentsPage {
        CommentsPage::new(PageContext { gateway, retry })
    }

    async fn settle(page: &mut CommentsPage) {
        for _ in 0..50 {
            page.update().unwrap();
            if !matches!(page.state, Some(Outcome::Started)) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_missing_post_id_makes_no_calls() {
        let gateway = Arc::new(FakeGateway::new(Vec::new()));
        let mut page = page_with(Arc::clone(&gateway), RetryPolicy::default());

        page.queue(CommentsMsg::Lookup(String::new()));
        page.update().unwrap();

        assert_eq!(page.notice.as_deref(), Some("Post ID is required."));
        assert_eq!(page.state, None);
        assert!(page.task.is_none());
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_post_id_keeps_last_comments() {
        let gateway = Arc::new(
            FakeGateway::new(Vec::new()).with_comments(vec![comment(1, 4, "kept")]),
        );
        let mut page = page_with(Arc::clone(&gateway), RetryPolicy::default());

        page.queue(CommentsMsg::Lookup("4".into()));
        settle(&mut page).await;
        page.queue(CommentsMsg::Lookup("abc".into()));
        page.update().unwrap();

        assert_eq!(page.state, Some(Outcome::Succeeded(vec![comment(1, 4, "kept")])));
        assert!(page.notice.is_some());
        assert_eq!(gateway.calls(), vec![Call::ListComments(4)]);

        page.queue(CommentsMsg::Lookup("4".into()));
        page.update().unwrap();
        assert_eq!(page.notice, None);
    }

    #[tokio::test]
    async fn test_lookup_through_input() {
        let gateway = Arc::new(
            FakeGateway::new(Vec::new()).with_comments(vec![comment(1, 5, "hello")]),
        );
        let mut page = page_with(Arc::clone(&gateway), RetryPolicy::default());

        assert!(page.handle_key(key(KeyCode::Char('i'))).is_consumed());
        page.update().unwrap();
        assert!(page.is_editing());

        page.handle_key(key(KeyCode::Char('5')));
        page.handle_key(key(KeyCode::Enter));
        assert!(!page.is_editing());

        page.update().unwrap();
        settle(&mut page).await;

        assert_eq!(page.state, Some(Outcome::Succeeded(vec![comment(1, 5, "hello")])));
        assert_eq!(gateway.calls(), vec![Call::ListComments(5)]);
    }

    #[tokio::test]
    async fn test_initial_post_id_from_cli() {
        let gateway = Arc::new(FakeGateway::new(Vec::new()));
        let mut page =
            page_with(Arc::clone(&gateway), RetryPolicy::default()).with_post_id(Some(3));
        page.init();
        page.update().unwrap();
        settle(&mut page).await;

        assert_eq!(page.state, Some(Outcome::Succeeded(Vec::new())));
        assert_eq!(gateway.calls(), vec![Call::ListComments(3)]);
    }

    #[tokio::test]
    async fn test_retries_then_reports_failure() {
        let gateway = Arc::new(
            FakeGateway::new(Vec::new()).failing_comments(Error::Network("offline".into())),
        );
        let mut page = page_with(
            Arc::clone(&gateway),
            RetryPolicy::new(4, Duration::from_millis(1)),
        );

        page.queue(CommentsMsg::Lookup("9".into()));
        settle(&mut page).await;

        assert_eq!(
            page.state,
            Some(Outcome::Failed(
                "Fetch failed after 4 attempts: Network error: offline".into()
            ))
        );
        assert_eq!(gateway.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_older_result_keeps_newer_lookup() {
        let gateway = Arc::new(FakeGateway::new(Vec::new()).failing_comments(
            Error::Network("offline".into()),
        ));
        let mut page = page_with(gateway, RetryPolicy::default());

        page.queue(CommentsMsg::Lookup("1".into()));
        page.queue(CommentsMsg::Lookup("1".into()));
        page.update().unwrap();
        assert_eq!(page.generation, 2);

        // Same post id, but from the superseded lookup.
        page.queue(CommentsMsg::Loaded {
            generation: 1,
            result: Ok(vec![comment(1, 1, "old")]),
        });
        page.update().unwrap();

        assert_eq!(page.state, Some(Outcome::Started));
        assert!(page.task.is_some());
    }
}
