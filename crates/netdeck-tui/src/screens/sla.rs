//! SLA screen — availability targets sorted worst standing first.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use netdeck_core::model::SlaTarget;
use netdeck_core::query::{sla_summary, sorted_sla_targets};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Row, Table, TableState};

use crate::action::Action;
use crate::component::Component;
use crate::theme::{StylePart, Theme};
use crate::widgets::fmt::{fmt_opt_ms, fmt_opt_pct, fmt_pct};

pub struct SlaScreen {
    focused: bool,
    targets: Arc<Vec<Arc<SlaTarget>>>,
    selected: usize,
    table_state: TableState,
}

impl SlaScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            targets: Arc::new(Vec::new()),
            selected: 0,
            table_state: TableState::default(),
        }
    }
}

impl Component for SlaScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = self.selected.saturating_add(1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::SlaTargetsUpdated(targets) = action {
            self.targets = targets.clone();
        }
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let summary = sla_summary(&self.targets);
        let sorted = sorted_sla_targets(&self.targets);
        if !sorted.is_empty() && self.selected >= sorted.len() {
            self.selected = sorted.len() - 1;
        }

        let title = format!(
            " SLA Targets ({} compliant, {} breached) ",
            fmt_pct(summary.compliance_pct()),
            summary.breached
        );
        let block = Block::default()
            .title(title)
            .title_style(theme.style(StylePart::Title))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme.style(StylePart::BorderFocused)
            } else {
                theme.style(StylePart::BorderDefault)
            });
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let header = Row::new(vec![
            "Standing",
            "Name",
            "Availability",
            "Target",
            "Latency",
            "Jitter",
            "Loss",
        ])
        .style(theme.style(StylePart::TableHeader));

        let rows: Vec<Row> = sorted
            .iter()
            .map(|t| {
                let standing = t.standing();
                Row::new(vec![
                    Cell::from(format!("{standing:?}")).style(theme.standing_style(standing)),
                    Cell::from(t.name.clone()),
                    Cell::from(fmt_pct(t.availability_pct)),
                    Cell::from(fmt_pct(t.availability_target_pct)),
                    Cell::from(fmt_opt_ms(t.latency_ms)),
                    Cell::from(fmt_opt_ms(t.jitter_ms)),
                    Cell::from(fmt_opt_pct(t.packet_loss_pct)),
                ])
                .style(theme.style(StylePart::TableRow))
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(9),
                Constraint::Min(20),
                Constraint::Length(12),
                Constraint::Length(8),
                Constraint::Length(9),
                Constraint::Length(9),
                Constraint::Length(7),
            ],
        )
        .header(header)
        .row_highlight_style(theme.style(StylePart::TableSelected));

        self.table_state.select(if sorted.is_empty() {
            None
        } else {
            Some(self.selected)
        });
        frame.render_stateful_widget(table, inner, &mut self.table_state);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn key_hints(&self) -> &'static str {
        "j/k select"
    }
}
