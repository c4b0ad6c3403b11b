//! The dashboard: run the scripted API chain or create a post from the form.

use chrono::{DateTime, Local};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, List, ListItem, Paragraph, Wrap};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::Theme;
use crate::api::model::parse_user_id;
use crate::api::{PostDraft, User};
use crate::commands::{CreatePostCmd, FetchUsersCmd, RunChainCmd};
use crate::core::chain::ChainReport;
use crate::core::posts::{CreateReport, USER_ID_REQUIRED};
use crate::core::{ChainState, ChainStep, DashboardSession, FlowEvent};
use crate::error::{Error, Result as ApiResult};
use crate::page::{Page, PageContext, PageMsg};
use crate::ui::{Component, EventResult, Keybinding, Spinner, TextInput, TextInputEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Title,
    Body,
    UserId,
}

impl Field {
    const fn label(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Body => "Body",
            Self::UserId => "User ID",
        }
    }
}

/// Messages for the dashboard page.
pub enum DashboardMsg {
    // === Lifecycle ===
    Initialize,

    // === User actions ===
    ReloadUsers,
    RunChain,
    CreatePost,
    EditField(Field),
    FieldSubmitted(Field, String),

    // === Async results ===
    UsersFinished(ApiResult<Vec<User>>),
    /// A partial result from the chain or the create flow
    Flow(FlowEvent),
    ChainFinished(ChainReport),
    CreateFinished(ApiResult<CreateReport>),
}

pub struct DashboardPage {
    ctx: PageContext,
    session: DashboardSession,
    title: String,
    body: String,
    user_id: String,
    editing: Option<(Field, TextInput)>,
    last_run: Option<DateTime<Local>>,
    spinner: Spinner,
    msg_tx: UnboundedSender<DashboardMsg>,
    msg_rx: UnboundedReceiver<DashboardMsg>,
}

impl DashboardPage {
    pub fn new(ctx: PageContext) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();
        Self {
            ctx,
            session: DashboardSession::new(),
            title: String::new(),
            body: String::new(),
            user_id: String::new(),
            editing: None,
            last_run: None,
            spinner: Spinner::default(),
            msg_tx,
            msg_rx,
        }
    }

    fn queue(&self, msg: DashboardMsg) {
        let _ = self.msg_tx.send(msg);
    }

    /// The form as a draft. A malformed user id is an error.
    fn draft(&self) -> ApiResult<PostDraft> {
        Ok(PostDraft::new(
            self.title.clone(),
            self.body.clone(),
            parse_user_id(&self.user_id)?,
        ))
    }

    fn field_value(&self, field: Field) -> &str {
        match field {
            Field::Title => &self.title,
            Field::Body => &self.body,
            Field::UserId => &self.user_id,
        }
    }

    fn process_message(&mut self, msg: DashboardMsg) -> PageMsg {
        match msg {
            DashboardMsg::Initialize | DashboardMsg::ReloadUsers => self.fetch_users(),
            DashboardMsg::RunChain => self.run_chain(),
            DashboardMsg::CreatePost => self.create_post(),

            DashboardMsg::EditField(field) => {
                let mut input = TextInput::new(field.label()).with_value(self.field_value(field));
                if field == Field::UserId {
                    input = input.digits_only().with_placeholder("Select a user id");
                }
                self.editing = Some((field, input));
                PageMsg::Idle
            }
            DashboardMsg::FieldSubmitted(field, value) => {
                match field {
                    Field::Title => self.title = value,
                    Field::Body => self.body = value,
                    Field::UserId => self.user_id = value,
                }
                PageMsg::Idle
            }

            DashboardMsg::UsersFinished(result) => {
                self.session.finish_users(result);
                PageMsg::Idle
            }
            DashboardMsg::Flow(event) => {
                self.session.apply(event);
                PageMsg::Idle
            }
            DashboardMsg::ChainFinished(report) => {
                self.last_run = Some(Local::now());
                self.session.finish_chain(&report);
                PageMsg::Idle
            }
            DashboardMsg::CreateFinished(result) => {
                self.session.finish_create(&result);
                PageMsg::Idle
            }
        }
    }

    fn fetch_users(&mut self) -> PageMsg {
        if let Err(err) = self.session.begin() {
            self.session.reject(&err);
            return PageMsg::Idle;
        }
        self.spinner.set_label("Loading users...");
        FetchUsersCmd::new(self.ctx.gateway.clone(), self.msg_tx.clone()).into()
    }

    fn run_chain(&mut self) -> PageMsg {
        if let Err(err) = self.session.begin_chain() {
            self.session.reject(&err);
            return PageMsg::Idle;
        }
        // The chain posts as the first fetched user, so the form's user id
        // does not have to be valid here.
        let draft = PostDraft::new(self.title.clone(), self.body.clone(), None);
        self.spinner.set_label("Running API chain...");
        RunChainCmd::new(self.ctx.gateway.clone(), draft, self.msg_tx.clone()).into()
    }

    fn create_post(&mut self) -> PageMsg {
        let draft = match self.draft() {
            Ok(draft) if draft.user_id.is_none() => {
                self.session.reject(&Error::validation(USER_ID_REQUIRED));
                return PageMsg::Idle;
            }
            Ok(draft) => draft,
            Err(err) => {
                self.session.reject(&err);
                return PageMsg::Idle;
            }
        };
        if let Err(err) = self.session.begin() {
            self.session.reject(&err);
            return PageMsg::Idle;
        }
        self.spinner.set_label("Creating post...");
        CreatePostCmd::new(self.ctx.gateway.clone(), draft, self.msg_tx.clone()).into()
    }

    fn render_form(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let label_style = Style::default().fg(theme.overlay1());
        let key_style = Style::default().fg(theme.warning());

        let row = |key: &'static str, field: Field| {
            let value = self.field_value(field);
            let value = if value.is_empty() {
                Span::styled("(empty)", Style::default().fg(theme.overlay0()))
            } else {
                Span::styled(value.to_string(), Style::default().fg(theme.text()))
            };
            Line::from(vec![
                Span::styled(format!("[{key}] "), key_style),
                Span::styled(format!("{:<8}", field.label()), label_style),
                value,
            ])
        };

        let lines = vec![
            row("t", Field::Title),
            row("b", Field::Body),
            row("u", Field::UserId),
        ];

        let block = Block::default()
            .title(" Create New Post ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.surface1()));
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_status(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        if self.session.is_busy() {
            self.spinner.render(frame, area, theme);
            return;
        }

        let line = match (self.session.error(), self.session.chain_state()) {
            (Some(err), _) => Line::from(Span::styled(err, Style::default().fg(theme.error()))),
            (None, ChainState::Succeeded) => Line::from(Span::styled(
                "Done.",
                Style::default().fg(theme.success()),
            )),
            _ => Line::from(Span::styled(
                "Ready.",
                Style::default().fg(theme.overlay1()),
            )),
        };
        frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), area);
    }

    fn render_chain(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let mut lines: Vec<Line> = ChainStep::ALL
            .iter()
            .enumerate()
            .map(|(i, step)| {
                Line::from(Span::styled(
                    format!("{}. {}", i + 1, step.label()),
                    Style::default().fg(theme.text()),
                ))
            })
            .collect();

        if !self.session.trace().is_empty() {
            lines.push(Line::from(""));
            let heading = match self.last_run {
                Some(at) => format!("Last run at {}:", at.format("%H:%M:%S")),
                None => "Last run:".to_string(),
            };
            lines.push(Line::from(Span::styled(
                heading,
                Style::default().fg(theme.info()),
            )));
            for entry in self.session.trace() {
                let style = if entry.starts_with("Error:") {
                    Style::default().fg(theme.error())
                } else {
                    Style::default().fg(theme.subtext1())
                };
                lines.push(Line::from(Span::styled(format!("  {entry}"), style)));
            }
        }

        let block = Block::default()
            .title(" API Chaining Flow ")
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.surface1()));
        frame.render_widget(Paragraph::new(lines).block(block), area);
    }

    fn render_lists(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let [users_area, posts_area, comments_area] = Layout::horizontal([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .areas(area);

        let users = self.session.users().iter().map(ToString::to_string);
        let posts = self
            .session
            .posts()
            .iter()
            .map(|p| format!("#{} {} (user {})", p.id, p.title, p.user_id));
        let comments = self
            .session
            .comments()
            .iter()
            .map(|c| c.body.replace('\n', " "));

        render_list(frame, users_area, theme, " Users ", users);
        render_list(frame, posts_area, theme, " Posts ", posts);
        render_list(frame, comments_area, theme, " Comments ", comments);
    }
}

fn render_list(
    frame: &mut Frame,
    area: Rect,
    theme: &Theme,
    title: &'static str,
    rows: impl Iterator<Item = String>,
) {
    let items: Vec<ListItem> = rows
        .map(|row| ListItem::new(row).style(Style::default().fg(theme.text())))
        .collect();
    let block = Block::default()
        .title(title)
        .title_style(Style::default().fg(theme.lavender()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.surface1()));
    frame.render_widget(List::new(items).block(block), area);
}

impl Page for DashboardPage {
    fn init(&mut self) {
        self.queue(DashboardMsg::Initialize);
    }

    fn handle_tick(&mut self) {
        if self.session.is_busy() {
            self.spinner.handle_tick();
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> EventResult<()> {
        if let Some((field, input)) = &mut self.editing {
            let field = *field;
            return match input.handle_key(key) {
                Ok(EventResult::Event(TextInputEvent::Submitted(value))) => {
                    self.editing = None;
                    self.queue(DashboardMsg::FieldSubmitted(field, value));
                    EventResult::Consumed
                }
                Ok(EventResult::Event(TextInputEvent::Cancelled)) => {
                    self.editing = None;
                    EventResult::Consumed
                }
                _ => EventResult::Consumed,
            };
        }

        let msg = match key.code {
            KeyCode::Char('c') => DashboardMsg::RunChain,
            KeyCode::Char('p') => DashboardMsg::CreatePost,
            KeyCode::Char('r') => DashboardMsg::ReloadUsers,
            KeyCode::Char('t') => DashboardMsg::EditField(Field::Title),
            KeyCode::Char('b') => DashboardMsg::EditField(Field::Body),
            KeyCode::Char('u') => DashboardMsg::EditField(Field::UserId),
            _ => return EventResult::Ignored,
        };
        self.queue(msg);
        EventResult::Consumed
    }

    fn handle_paste(&mut self, text: &str) {
        if let Some((_, input)) = &mut self.editing {
            input.paste(text);
        }
    }

    fn update(&mut self) -> Result<PageMsg> {
        let mut commands = Vec::new();
        while let Ok(msg) = self.msg_rx.try_recv() {
            if let PageMsg::Run(cmds) = self.process_message(msg) {
                commands.extend(cmds);
            }
        }

        if commands.is_empty() {
            Ok(PageMsg::Idle)
        } else {
            Ok(PageMsg::Run(commands))
        }
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .title(" Dashboard ")
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

        let [top, status, lists] = Layout::vertical([
            Constraint::Length(10),
            Constraint::Length(2),
            Constraint::Min(5),
        ])
        .areas(inner);
        let [form, chain] =
            Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)])
                .areas(top);

        self.render_form(frame, form, theme);
        self.render_chain(frame, chain, theme);
        self.render_status(frame, status, theme);
        self.render_lists(frame, lists, theme);

        if let Some((_, input)) = &mut self.editing {
            input.render(frame, area, theme);
        }
    }

    fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    fn keybindings(&self) -> Vec<Keybinding> {
        if self.editing.is_some() {
            return vec![
                Keybinding::new("Enter", "Save field"),
                Keybinding::new("Esc", "Cancel"),
            ];
        }
        vec![
            Keybinding::new("c", "Run API chain"),
            Keybinding::new("p", "Create post"),
            Keybinding::new("t/b/u", "Edit title/body/user"),
            Keybinding::new("r", "Reload users"),
        ]
    }
}
