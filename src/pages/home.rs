//! Landing page: the user list, fetched with retry when the page opens.

use std::sync::Arc;

use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, Paragraph, Wrap};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::info;

use crate::Theme;
use crate::api::User;
use crate::core::{Outcome, RetryTask};
use crate::error::Result as ApiResult;
use crate::page::{Page, PageContext, PageMsg};
use crate::ui::{Component, EventResult, Keybinding, Spinner};

pub enum HomeMsg {
    Load,
    Loaded {
        generation: u64,
        result: ApiResult<Vec<User>>,
    },
}

pub struct HomePage {
    ctx: PageContext,
    state: Outcome<Vec<User>>,
    spinner: Spinner,
    task: Option<RetryTask>,
    /// Bumped on every fetch. Results from older fetches are dropped.
    generation: u64,
    msg_tx: UnboundedSender<HomeMsg>,
    msg_rx: UnboundedReceiver<HomeMsg>,
}

impl HomePage {
    pub fn new(ctx: PageContext) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            ctx,
            state: Outcome::Started,
            spinner: Spinner::new("Loading users..."),
            task: None,
            generation: 0,
            msg_tx,
            msg_rx,
        }
    }

    fn queue(&self, msg: HomeMsg) {
        let _ = self.msg_tx.send(msg);
    }

    fn fetch_users(&mut self) {
        info!("Fetching users with retry");
        self.state = Outcome::Started;
        self.generation += 1;
        let generation = self.generation;

        let gateway = Arc::clone(&self.ctx.gateway);
        let tx = self.msg_tx.clone();
        // Replacing the task cancels a fetch that is still retrying.
        self.task = Some(RetryTask::spawn(
            self.ctx.retry,
            move || {
                let gateway = Arc::clone(&gateway);
                async move { gateway.list_users().await }
            },
            move |result| {
                let _ = tx.send(HomeMsg::Loaded { generation, result });
            },
        ));
    }

    fn process_message(&mut self, msg: HomeMsg) {
        match msg {
            HomeMsg::Load => self.fetch_users(),
            HomeMsg::Loaded { generation, result } => {
                if generation != self.generation {
                    return;
                }
                self.task = None;
                self.state = result.into();
            }
        }
    }
}

impl Page for HomePage {
    fn init(&mut self) {
        self.queue(HomeMsg::Load);
    }

    fn destroy(&mut self) {
        self.task = None;
    }

    fn handle_tick(&mut self) {
        if self.state.is_loading() {
            self.spinner.handle_tick();
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> EventResult<()> {
        match key.code {
            KeyCode::Char('r') => {
                self.queue(HomeMsg::Load);
                EventResult::Consumed
            }
            _ => EventResult::Ignored,
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
            .title(" Home ")
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

        match &self.state {
            Outcome::Started => self.spinner.render(frame, inner, theme),
            Outcome::Failed(message) => {
                let paragraph = Paragraph::new(Line::from(Span::styled(
                    message.as_str(),
                    Style::default().fg(theme.error()),
                )))
                .wrap(Wrap { trim: true });
                frame.render_widget(paragraph, inner);
            }
            Outcome::Succeeded(users) => {
                let items: Vec<ListItem> = users
                    .iter()
                    .map(|user| {
                        ListItem::new(user.to_string()).style(Style::default().fg(theme.text()))
                    })
                    .collect();
                frame.render_widget(List::new(items), inner);
            }
        }
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        vec![Keybinding::new("r", "Reload users")]
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::core::RetryPolicy;
    use crate::core::testing::{FakeGateway, user};
    use crate::error::Error;

    fn page_with(gateway: FakeGateway, retry: RetryPolicy) -> HomePage {
        HomePage::new(PageContext {
            gateway: Arc::new(gateway),
            retry,
        })
    }

    async fn settle(page: &mut HomePage) {
        for _ in 0..50 {
            page.update().unwrap();
            if !page.state.is_loading() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_loads_users_on_init() {
        let mut page = page_with(FakeGateway::new(vec![user(1), user(2)]), RetryPolicy::default());
        page.init();
        page.update().unwrap();
        assert!(page.state.is_loading());

        settle(&mut page).await;

        assert_eq!(page.state, Outcome::Succeeded(vec![user(1), user(2)]));
        assert!(page.task.is_none());
    }

    #[tokio::test]
    async fn test_reports_exhausted_retries() {
        let gateway = FakeGateway::new(Vec::new()).failing_users(Error::Network("offline".into()));
        let mut page = page_with(gateway, RetryPolicy::new(2, Duration::from_millis(1)));
        page.init();

        settle(&mut page).await;

        assert_eq!(
            page.state,
            Outcome::Failed("Fetch failed after 2 attempts: Network error: offline".into())
        );
    }

    #[tokio::test]
    async fn test_result_of_replaced_fetch_is_dropped() {
        let gateway = FakeGateway::new(Vec::new()).failing_users(Error::Network("offline".into()));
        let mut page = page_with(gateway, RetryPolicy::default());
        page.init();
        page.queue(HomeMsg::Load);
        page.update().unwrap();

        page.queue(HomeMsg::Loaded {
            generation: 1,
            result: Ok(vec![user(9)]),
        });
        page.update().unwrap();

        assert!(page.state.is_loading());
        assert!(page.task.is_some());
    }

    #[tokio::test]
    async fn test_destroy_drops_pending_fetch() {
        let gateway = FakeGateway::new(Vec::new()).failing_users(Error::Network("offline".into()));
        let mut page = page_with(gateway, RetryPolicy::default());
        page.init();
        page.update().unwrap();
        assert!(page.task.is_some());

        page.destroy();
        assert!(page.task.is_none());
    }
}
