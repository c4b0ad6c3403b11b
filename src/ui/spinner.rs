use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use throbber_widgets_tui::WhichUse::Spin;
use throbber_widgets_tui::{BRAILLE_SIX, Throbber, ThrobberState};

use crate::Theme;
use crate::ui::Component;

pub struct Spinner {
    throbber_state: ThrobberState,
    label: &'static str,
}

impl Spinner {
    pub fn new(label: &'static str) -> Self {
        Self {
            throbber_state: ThrobberState::default(),
            label,
        }
    }

    pub const fn set_label(&mut self, label: &'static str) {
        self.label = label;
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::new("Loading...")
    }
}

impl Component for Spinner {
    type Output = ();

    fn handle_tick(&mut self) {
        self.throbber_state.calc_next();
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let throbber = Throbber::default()
            .throbber_set(BRAILLE_SIX)
            .use_type(Spin)
            .throbber_style(Style::default().fg(theme.warning()))
            .style(Style::default().fg(theme.subtext1()))
            .label(self.label);

        // 1 for the throbber glyph, 1 for the gap before the label
        let width = u16::try_from(self.label.chars().count() + 2).unwrap_or(u16::MAX);
        let area = area.centered(Constraint::Length(width), Constraint::Length(1));

        frame.render_stateful_widget(throbber, area, &mut self.throbber_state);
    }
}
