//! Security screen — alert list with severity filter and acknowledge.

use std::sync::Arc;

use chrono::Utc;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use netdeck_core::model::{AlertSeverity, SecurityAlert};
use netdeck_core::query::{AlertFilter, alert_summary, query_alerts};
use netdeck_core::Command;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::action::Action;
use crate::component::Component;
use crate::theme::{StylePart, Theme};
use crate::widgets::fmt::fmt_age;
use crate::widgets::status::severity_span;

/// Filter cycle order for the `f` key.
const FILTERS: [AlertFilter; 4] = [
    AlertFilter::All,
    AlertFilter::Unacknowledged,
    AlertFilter::MinSeverity(AlertSeverity::High),
    AlertFilter::MinSeverity(AlertSeverity::Critical),
];

pub struct SecurityScreen {
    focused: bool,
    alerts: Arc<Vec<Arc<SecurityAlert>>>,
    filter: AlertFilter,
    search: String,
    search_active: bool,
    selected: usize,
    table_state: TableState,
}

impl SecurityScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            alerts: Arc::new(Vec::new()),
            filter: AlertFilter::All,
            search: String::new(),
            search_active: false,
            selected: 0,
            table_state: TableState::default(),
        }
    }

    fn visible(&self) -> Vec<Arc<SecurityAlert>> {
        query_alerts(&self.alerts, self.filter, &self.search)
    }

    fn acknowledge_selected(&self) -> Option<Action> {
        let visible = self.visible();
        let alert = visible.get(self.selected)?;
        if alert.acknowledged {
            return None;
        }
        Some(Action::Dispatch(Command::AcknowledgeAlert {
            id: alert.id.clone(),
        }))
    }

    fn filter_label(&self) -> &'static str {
        match self.filter {
            AlertFilter::All => "all",
            AlertFilter::Unacknowledged => "unacknowledged",
            AlertFilter::MinSeverity(AlertSeverity::Critical) => "critical only",
            AlertFilter::MinSeverity(_) => "high and up",
        }
    }
}

impl Component for SecurityScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.search_active {
            match key.code {
                KeyCode::Esc => {
                    self.search_active = false;
                    self.search.clear();
                }
                KeyCode::Enter => self.search_active = false,
                KeyCode::Backspace => {
                    self.search.pop();
                }
                KeyCode::Char(c) => self.search.push(c),
                _ => {}
            }
            return Ok(None);
        }

        match key.code {
            KeyCode::Char('/') => self.search_active = true,
            KeyCode::Char('f') => {
                let idx = FILTERS.iter().position(|&f| f == self.filter).unwrap_or(0);
                self.filter = FILTERS[(idx + 1) % FILTERS.len()];
                self.selected = 0;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = self.selected.saturating_add(1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Char('a') | KeyCode::Enter => return Ok(self.acknowledge_selected()),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::AlertsUpdated(alerts) = action {
            self.alerts = alerts.clone();
        }
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let summary = alert_summary(&self.alerts);
        let visible = self.visible();
        if !visible.is_empty() && self.selected >= visible.len() {
            self.selected = visible.len() - 1;
        }

        let title = format!(
            " Security Alerts ({} unack, {} critical, {} high) ",
            summary.unacknowledged, summary.critical, summary.high
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

        let layout = Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).split(inner);

        let search_display = if self.search_active {
            format!("/{}_", self.search)
        } else if self.search.is_empty() {
            String::new()
        } else {
            format!("/{}", self.search)
        };
        let status = Line::from(vec![
            Span::styled("filter ", theme.style(StylePart::KeyHint)),
            Span::styled(self.filter_label(), theme.style(StylePart::KeyHintKey)),
            Span::styled(
                format!("  {search_display}"),
                theme.style(StylePart::TableRow),
            ),
        ]);
        frame.render_widget(Paragraph::new(status), layout[0]);

        let now = Utc::now();
        let header = Row::new(vec!["Sev", "Ack", "Category", "Message", "Source", "When"])
            .style(theme.style(StylePart::TableHeader));
        let rows: Vec<Row> = visible
            .iter()
            .map(|a| {
                let ack = if a.acknowledged {
                    Span::styled("✓", theme.style(StylePart::StatusGood))
                } else {
                    Span::styled("·", theme.style(StylePart::StatusIdle))
                };
                Row::new(vec![
                    Cell::from(severity_span(a.severity, theme)),
                    Cell::from(ack),
                    Cell::from(a.category.clone()),
                    Cell::from(a.message.clone()),
                    Cell::from(a.source.clone().unwrap_or_else(|| "—".to_owned())),
                    Cell::from(fmt_age(a.timestamp, now)),
                ])
                .style(theme.style(StylePart::TableRow))
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(4),
                Constraint::Length(3),
                Constraint::Length(14),
                Constraint::Min(24),
                Constraint::Length(16),
                Constraint::Length(14),
            ],
        )
        .header(header)
        .row_highlight_style(theme.style(StylePart::TableSelected));

        self.table_state.select(if visible.is_empty() {
            None
        } else {
            Some(self.selected)
        });
        frame.render_stateful_widget(table, layout[1], &mut self.table_state);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn wants_text_input(&self) -> bool {
        self.search_active
    }

    fn key_hints(&self) -> &'static str {
        "j/k select  a acknowledge  f filter  / search"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    fn press(screen: &mut SecurityScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent {
                code,
                modifiers: KeyModifiers::NONE,
                kind: KeyEventKind::Press,
                state: KeyEventState::NONE,
            })
            .unwrap()
    }

    fn alert(id: &str, severity: AlertSeverity, acknowledged: bool) -> Arc<SecurityAlert> {
        Arc::new(SecurityAlert {
            id: id.to_owned(),
            severity,
            category: "intrusion".to_owned(),
            message: format!("alert {id}"),
            source: None,
            acknowledged,
            timestamp: Utc::now(),
        })
    }

    #[test]
    fn acknowledge_dispatches_only_for_unacked_alerts() {
        let mut screen = SecurityScreen::new();
        screen
            .update(&Action::AlertsUpdated(Arc::new(vec![
                alert("a1", AlertSeverity::Critical, false),
                alert("a2", AlertSeverity::Low, true),
            ])))
            .unwrap();

        // Critical sorts first; it is unacked so a command goes out.
        match press(&mut screen, KeyCode::Char('a')) {
            Some(Action::Dispatch(Command::AcknowledgeAlert { id })) => assert_eq!(id, "a1"),
            other => panic!("unexpected action: {other:?}"),
        }

        // The acked alert produces nothing.
        press(&mut screen, KeyCode::Char('j'));
        assert!(press(&mut screen, KeyCode::Char('a')).is_none());
    }

    #[test]
    fn severity_filter_cycles_and_narrows() {
        let mut screen = SecurityScreen::new();
        screen
            .update(&Action::AlertsUpdated(Arc::new(vec![
                alert("a1", AlertSeverity::Critical, false),
                alert("a2", AlertSeverity::Info, false),
            ])))
            .unwrap();

        assert_eq!(screen.visible().len(), 2);
        press(&mut screen, KeyCode::Char('f')); // unacknowledged
        assert_eq!(screen.visible().len(), 2);
        press(&mut screen, KeyCode::Char('f')); // high and up
        assert_eq!(screen.visible().len(), 1);
        press(&mut screen, KeyCode::Char('f')); // critical only
        assert_eq!(screen.visible().len(), 1);
        press(&mut screen, KeyCode::Char('f')); // back to all
        assert_eq!(screen.visible().len(), 2);
    }
}
