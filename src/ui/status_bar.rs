use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::Theme;
use crate::core::RetryPolicy;
use crate::page::PageId;
use crate::ui::Keybinding;

const GLOBAL_KEYBINDINGS: &[Keybinding] = &[
    Keybinding::new("1/2/3", "Switch page"),
    Keybinding::new("Tab", "Next page"),
    Keybinding::new("q", "Quit"),
];

/// Bottom bar: where we are, what we talk to, and which keys do what.
pub struct StatusBar {
    base_url: String,
    retry: RetryPolicy,
}

impl StatusBar {
    pub fn new(base_url: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            base_url: base_url.into(),
            retry,
        }
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        active: PageId,
        running_commands: usize,
        local_keybindings: &[Keybinding],
    ) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme.surface1()));

        let inner_area = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(48), Constraint::Min(20)])
            .split(inner_area);

        self.render_status_info(frame, chunks[0], theme, active, running_commands);
        Self::render_keybindings(frame, chunks[1], theme, local_keybindings);
    }

    fn render_status_info(
        &self,
        frame: &mut Frame,
        area: Rect,
        theme: &Theme,
        active: PageId,
        running_commands: usize,
    ) {
        let w = area.width as usize;
        let label_style = Style::default().fg(theme.overlay1());
        let value_style = Style::default().fg(theme.text());

        let tabs: Vec<Span> = PageId::ALL
            .iter()
            .enumerate()
            .flat_map(|(i, page)| {
                let style = if *page == active {
                    Style::default()
                        .fg(theme.lavender())
                        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                } else {
                    Style::default().fg(theme.overlay0())
                };
                [
                    Span::styled(format!("{} {}", i + 1, page.title()), style),
                    Span::raw("  "),
                ]
            })
            .collect();

        let retry = format!(
            "{} attempts, {} ms apart",
            self.retry.max_attempts(),
            self.retry.delay().as_millis()
        );
        let running = if running_commands == 0 {
            "idle".to_string()
        } else {
            format!("{running_commands} running")
        };

        let lines = vec![
            Line::from(tabs),
            Line::from(""),
            status_line("api", &self.base_url, w, label_style, value_style),
            status_line("retry", &retry, w, label_style, value_style),
            status_line("commands", &running, w, label_style, value_style),
        ];

        frame.render_widget(Paragraph::new(lines), area);
    }

    fn render_keybindings(frame: &mut Frame, area: Rect, theme: &Theme, local: &[Keybinding]) {
        let hints: Vec<&Keybinding> = local.iter().chain(GLOBAL_KEYBINDINGS).collect();
        if hints.is_empty() {
            return;
        }

        // Align the separator by the widest key and description.
        let max_key_w = hints.iter().map(|kb| kb.key.len()).max().unwrap_or(1);
        let max_desc_w = hints.iter().map(|kb| kb.description.len()).max().unwrap_or(1);
        let col_width = u16::try_from(max_key_w + 3 + max_desc_w + 2).unwrap_or(u16::MAX);
        let num_cols = (area.width / col_width).max(1) as usize;
        let num_rows = (area.height as usize).max(1);

        let mut columns: Vec<Vec<Line>> = vec![Vec::new(); num_cols];
        for (i, kb) in hints.iter().enumerate() {
            let col_idx = i / num_rows;
            if col_idx >= num_cols {
                break;
            }
            columns[col_idx].push(Line::from(vec![
                Span::styled(
                    format!("{:>width$}", kb.key, width = max_key_w),
                    Style::default().fg(theme.warning()),
                ),
                Span::styled(" │ ", Style::default().fg(theme.surface1())),
                Span::styled(kb.description, Style::default().fg(theme.subtext1())),
            ]));
        }

        let col_areas = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Length(col_width); num_cols])
            .split(area);

        for (col_lines, col_area) in columns.into_iter().zip(col_areas.iter()) {
            frame.render_widget(Paragraph::new(col_lines), *col_area);
        }
    }
}

/// Render a labelled status line: right-aligned label, then the value.
fn status_line<'a>(
    label: &'a str,
    value: &str,
    max_width: usize,
    label_style: Style,
    value_style: Style,
) -> Line<'a> {
    const LABEL_W: usize = 9;
    let available = max_width.saturating_sub(LABEL_W + 1);
    Line::from(vec![
        Span::styled(format!("{label:>LABEL_W$}"), label_style),
        Span::raw(" "),
        Span::styled(truncate_str(value, available), value_style),
    ])
}

/// Truncate a string to fit within a given width, adding "..." if truncated.
fn truncate_str(s: &str, max_width: usize) -> String {
    let len = s.chars().count();
    if len <= max_width {
        s.to_string()
    } else if max_width > 3 {
        let head: String = s.chars().take(max_width - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_width).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_str() {
        assert_eq!(truncate_str("short", 10), "short");
        assert_eq!(
            truncate_str("https://jsonplaceholder.typicode.com", 15),
            "https://json..."
        );
        assert_eq!(truncate_str("abcdef", 2), "ab");
    }
}
