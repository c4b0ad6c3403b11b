//! Application shell: owns the active page, runs its commands, and routes
//! terminal events.

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, error, info, warn};

use crate::Theme;
use crate::commands::Command;
use crate::page::{Page, PageContext, PageId, PageMsg};
use crate::pages::{CommentsPage, DashboardPage, HomePage};
use crate::tui::{Event, Tui};
use crate::ui::{Component, ErrorDialog, ErrorDialogEvent, EventResult, StatusBar};

const STATUS_BAR_HEIGHT: u16 = 7;

/// Application-level messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppMessage {
    // === Lifecycle ===
    Tick,
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,

    // === Feedback ===
    DisplayError(String),
    /// A command finished; the page should drain its queue
    CommandCompleted { name: String, success: bool },

    // === Navigation ===
    SwitchPage(PageId),
}

pub struct App {
    ctx: PageContext,
    active: PageId,
    page: Box<dyn Page>,
    /// Post id handed to the comments page whenever it is opened
    post_id: Option<u64>,
    theme: Theme,
    status_bar: StatusBar,
    error_dialog: Option<ErrorDialog>,
    running_commands: usize,
    should_quit: bool,
    should_suspend: bool,
    message_tx: UnboundedSender<AppMessage>,
    message_rx: UnboundedReceiver<AppMessage>,
}

impl App {
    pub fn new(
        ctx: PageContext,
        theme: Theme,
        status_bar: StatusBar,
        start: PageId,
        post_id: Option<u64>,
    ) -> Self {
        let (message_tx, message_rx) = mpsc::unbounded_channel();
        let page = build_page(&ctx, start, post_id);
        Self {
            ctx,
            active: start,
            page,
            post_id,
            theme,
            status_bar,
            error_dialog: None,
            running_commands: 0,
            should_quit: false,
            should_suspend: false,
            message_tx,
            message_rx,
        }
    }

    pub async fn run(&mut self) -> color_eyre::Result<()> {
        let mut tui = Tui::new(30.0, 8.0)?;
        tui.enter()?;

        self.activate_page();

        loop {
            self.handle_events(&mut tui).await?;
            self.handle_messages(&mut tui)?;
            if self.should_suspend {
                tui.suspend()?;
                self.message_tx.send(AppMessage::Resume)?;
                tui.resume()?;
            } else if self.should_quit {
                break;
            }
        }

        self.page.destroy();
        tui.exit()?;
        info!("Shutting down");
        Ok(())
    }

    async fn handle_events(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        let Some(event) = tui.next_event().await else {
            return Ok(());
        };

        match event {
            Event::Quit => self.message_tx.send(AppMessage::Quit)?,
            Event::Suspend => self.message_tx.send(AppMessage::Suspend)?,
            Event::Tick => self.message_tx.send(AppMessage::Tick)?,
            Event::Render => self.message_tx.send(AppMessage::Render)?,
            Event::Resize(width, height) => {
                self.message_tx.send(AppMessage::Resize(width, height))?;
            }
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) => self.handle_paste(&text),
            Event::Error(err) => warn!("Terminal event error: {err}"),
            Event::Init => {}
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if let Some(dialog) = &mut self.error_dialog {
            if let Ok(EventResult::Event(ErrorDialogEvent::Dismissed)) = dialog.handle_key(key) {
                self.error_dialog = None;
            }
            return;
        }

        if !self.page.is_editing() {
            let global = match key.code {
                KeyCode::Char('q') => Some(AppMessage::Quit),
                KeyCode::Tab => Some(AppMessage::SwitchPage(self.active.next())),
                KeyCode::Char(c) => PageId::from_digit(c).map(AppMessage::SwitchPage),
                _ => None,
            };
            if let Some(msg) = global {
                let _ = self.message_tx.send(msg);
                return;
            }
        }

        if self.page.handle_key(key).is_consumed() {
            self.update_page();
        }
    }

    fn handle_paste(&mut self, text: &str) {
        if self.error_dialog.is_none() {
            self.page.handle_paste(text);
        }
    }

    fn handle_messages(&mut self, tui: &mut Tui) -> color_eyre::Result<()> {
        while let Ok(msg) = self.message_rx.try_recv() {
            match msg {
                AppMessage::Render => {
                    tui.draw(|frame| self.render(frame))?;
                }
                AppMessage::Resize(width, height) => {
                    tui.resize(Rect::new(0, 0, width, height))?;
                    tui.draw(|frame| self.render(frame))?;
                }
                msg => self.update(msg),
            }
        }
        Ok(())
    }

    /// Apply a message that does not touch the terminal.
    fn update(&mut self, msg: AppMessage) {
        if msg != AppMessage::Tick {
            debug!("Handling message: {msg:?}");
        }

        match msg {
            AppMessage::Tick => {
                self.page.handle_tick();
                // Retry tasks report through the page queue, not through commands.
                self.update_page();
            }
            AppMessage::Quit => self.should_quit = true,
            AppMessage::Suspend => self.should_suspend = true,
            AppMessage::Resume => self.should_suspend = false,
            AppMessage::DisplayError(message) => {
                self.error_dialog = Some(ErrorDialog::new(message));
            }
            AppMessage::CommandCompleted { name, success } => {
                self.running_commands = self.running_commands.saturating_sub(1);
                debug!(command = %name, success, "Command completed");
                self.update_page();
            }
            AppMessage::SwitchPage(id) => self.switch_page(id),
            AppMessage::Render | AppMessage::Resize(..) => {}
        }
    }

    fn switch_page(&mut self, id: PageId) {
        if id == self.active {
            return;
        }
        info!(from = %self.active, to = %id, "Switching page");
        self.page.destroy();
        self.active = id;
        self.page = build_page(&self.ctx, id, self.post_id);
        self.activate_page();
    }

    fn activate_page(&mut self) {
        self.page.init();
        self.update_page();
    }

    fn update_page(&mut self) {
        match self.page.update() {
            Ok(PageMsg::Idle) => {}
            Ok(PageMsg::Run(commands)) => {
                for cmd in commands {
                    self.spawn_command(cmd);
                }
            }
            Err(err) => {
                error!("Page update failed: {err}");
                let _ = self.message_tx.send(AppMessage::DisplayError(format!(
                    "Error encountered while updating page: {err}"
                )));
            }
        }
    }

    fn spawn_command(&mut self, cmd: Box<dyn Command>) {
        let name = cmd.name();
        info!(command = %name, "Spawning command");
        self.running_commands += 1;

        let tx = self.message_tx.clone();
        tokio::spawn(async move {
            let success = match cmd.execute().await {
                Ok(()) => true,
                Err(err) => {
                    error!(command = %name, "Command failed: {err}");
                    let _ = tx.send(AppMessage::DisplayError(format!("{name} failed: {err}")));
                    false
                }
            };
            let _ = tx.send(AppMessage::CommandCompleted { name, success });
        });
    }

    fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let [main, status] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(STATUS_BAR_HEIGHT)])
                .areas(area);

        self.page.render(frame, main, &self.theme);
        self.status_bar.render(
            frame,
            status,
            &self.theme,
            self.active,
            self.running_commands,
            &self.page.keybindings(),
        );

        if let Some(dialog) = &mut self.error_dialog {
            dialog.render(frame, area, &self.theme);
        }
    }
}

fn build_page(ctx: &PageContext, id: PageId, post_id: Option<u64>) -> Box<dyn Page> {
    let ctx = ctx.clone();
    match id {
        PageId::Home => Box::new(HomePage::new(ctx)),
        PageId::Dashboard => Box::new(DashboardPage::new(ctx)),
        PageId::Comments => Box::new(CommentsPage::new(ctx).with_post_id(post_id)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::core::RetryPolicy;
    use crate::core::testing::{FakeGateway, user};

    fn app(start: PageId) -> App {
        let ctx = PageContext {
            gateway: Arc::new(FakeGateway::new(vec![user(1)])),
            retry: RetryPolicy::default(),
        };
        let status_bar = StatusBar::new("http://localhost", ctx.retry);
        App::new(ctx, Theme::default(), status_bar, start, None)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
        while let Ok(msg) = app.message_rx.try_recv() {
            app.update(msg);
        }
    }

    #[tokio::test]
    async fn test_digit_and_tab_switch_pages() {
        let mut app = app(PageId::Home);

        press(&mut app, KeyCode::Char('3'));
        assert_eq!(app.active, PageId::Comments);

        press(&mut app, KeyCode::Tab);
        assert_eq!(app.active, PageId::Home);
    }

    #[tokio::test]
    async fn test_global_keys_ignored_while_editing() {
        let mut app = app(PageId::Comments);

        press(&mut app, KeyCode::Char('i'));
        assert!(app.page.is_editing());

        press(&mut app, KeyCode::Char('q'));
        press(&mut app, KeyCode::Char('2'));
        assert!(!app.should_quit);
        assert_eq!(app.active, PageId::Comments);
    }

    #[tokio::test]
    async fn test_paste_reaches_open_input() {
        let gateway = Arc::new(FakeGateway::new(Vec::new()));
        let ctx = PageContext {
            gateway: Arc::clone(&gateway) as Arc<dyn crate::api::Gateway>,
            retry: RetryPolicy::default(),
        };
        let status_bar = StatusBar::new("http://localhost", ctx.retry);
        let mut app = App::new(ctx, Theme::default(), status_bar, PageId::Comments, None);

        press(&mut app, KeyCode::Char('i'));
        app.handle_paste("17");
        press(&mut app, KeyCode::Enter);
        for _ in 0..50 {
            if !gateway.calls().is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }

        assert_eq!(gateway.calls(), vec![crate::core::testing::Call::ListComments(17)]);
    }

    #[tokio::test]
    async fn test_quit() {
        let mut app = app(PageId::Home);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_dashboard_commands_are_counted() {
        let mut app = app(PageId::Home);

        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.active, PageId::Dashboard);
        assert_eq!(app.running_commands, 1);

        let msg = app.message_rx.recv().await.unwrap();
        assert!(matches!(msg, AppMessage::CommandCompleted { success: true, .. }));
        app.update(msg);
        assert_eq!(app.running_commands, 0);
    }

    #[tokio::test]
    async fn test_error_dialog_captures_keys() {
        let mut app = app(PageId::Home);
        app.update(AppMessage::DisplayError("boom".into()));

        press(&mut app, KeyCode::Char('q'));
        assert!(!app.should_quit);

        press(&mut app, KeyCode::Esc);
        assert!(app.error_dialog.is_none());
    }
}
