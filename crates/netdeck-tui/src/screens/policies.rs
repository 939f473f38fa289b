//! Policies screen — QoS policy table with filter, sort, search, and the
//! optimistic enable toggle.

use std::collections::HashMap;
use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use netdeck_core::model::{QosPolicy, TrafficClass};
use netdeck_core::query::{PolicyFilter, PolicySort, policy_summary, query_policies};
use netdeck_core::Command;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState};

use crate::action::Action;
use crate::component::Component;
use crate::theme::{StylePart, Theme};
use crate::widgets::fmt::fmt_rate_limit;

/// Filter cycle order for the `f` key.
const FILTERS: [PolicyFilter; 5] = [
    PolicyFilter::All,
    PolicyFilter::Enabled,
    PolicyFilter::Disabled,
    PolicyFilter::Class(TrafficClass::Voice),
    PolicyFilter::Class(TrafficClass::Critical),
];

const SORTS: [PolicySort; 3] = [
    PolicySort::Name,
    PolicySort::MatchedSessions,
    PolicySort::Class,
];

pub struct PoliciesScreen {
    focused: bool,
    policies: Arc<Vec<Arc<QosPolicy>>>,
    filter: PolicyFilter,
    sort: PolicySort,
    search: String,
    search_active: bool,
    selected: usize,
    table_state: TableState,
    /// Optimistic enabled-state overrides, keyed by policy id. Applied on
    /// top of the snapshot at render time and dropped when the next
    /// snapshot arrives.
    pending: HashMap<String, bool>,
}

impl PoliciesScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            policies: Arc::new(Vec::new()),
            filter: PolicyFilter::All,
            sort: PolicySort::Name,
            search: String::new(),
            search_active: false,
            selected: 0,
            table_state: TableState::default(),
            pending: HashMap::new(),
        }
    }

    fn visible(&self) -> Vec<Arc<QosPolicy>> {
        query_policies(&self.policies, self.filter, &self.search, self.sort)
    }

    fn effective_enabled(&self, policy: &QosPolicy) -> bool {
        self.pending
            .get(&policy.id)
            .copied()
            .unwrap_or(policy.enabled)
    }

    fn toggle_selected(&mut self) -> Option<Action> {
        let visible = self.visible();
        let policy = visible.get(self.selected)?;
        let enabled = !self.effective_enabled(policy);
        self.pending.insert(policy.id.clone(), enabled);
        Some(Action::Dispatch(Command::SetPolicyEnabled {
            id: policy.id.clone(),
            enabled,
        }))
    }

    fn clamp_selection(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    fn filter_label(&self) -> String {
        match self.filter {
            PolicyFilter::Class(class) => format!("class:{class}"),
            other => other.label().to_owned(),
        }
    }

    fn sort_label(&self) -> &'static str {
        match self.sort {
            PolicySort::Name => "name",
            PolicySort::MatchedSessions => "sessions",
            PolicySort::Class => "class",
        }
    }
}

impl Component for PoliciesScreen {
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
            KeyCode::Char('s') => {
                let idx = SORTS.iter().position(|&s| s == self.sort).unwrap_or(0);
                self.sort = SORTS[(idx + 1) % SORTS.len()];
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.selected = self.selected.saturating_add(1);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Enter | KeyCode::Char(' ') => return Ok(self.toggle_selected()),
            KeyCode::Esc if !self.search.is_empty() => self.search.clear(),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        if let Action::PoliciesUpdated(policies) = action {
            self.policies = policies.clone();
            // Fresh server truth supersedes optimistic overrides.
            self.pending.clear();
        }
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let summary = policy_summary(&self.policies);
        let visible = self.visible();
        self.clamp_selection(visible.len());

        let title = format!(
            " QoS Policies ({}/{} enabled, {} sessions) ",
            summary.enabled, summary.total, summary.matched_sessions
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

        let rows_area =
            Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).split(inner);

        // Filter / sort / search status line
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
            Span::styled("  sort ", theme.style(StylePart::KeyHint)),
            Span::styled(self.sort_label(), theme.style(StylePart::KeyHintKey)),
            Span::styled(
                format!("  {search_display}"),
                theme.style(StylePart::TableRow),
            ),
        ]);
        frame.render_widget(Paragraph::new(status), rows_area[0]);

        let header = Row::new(vec![
            "", "Name", "Class", "Dir", "Rate Limit", "Sessions",
        ])
        .style(theme.style(StylePart::TableHeader));

        let rows: Vec<Row> = visible
            .iter()
            .map(|p| {
                let enabled = self.effective_enabled(p);
                let toggle = if enabled {
                    Span::styled("[on] ", theme.style(StylePart::StatusGood))
                } else {
                    Span::styled("[off]", theme.style(StylePart::StatusIdle))
                };
                Row::new(vec![
                    Cell::from(toggle),
                    Cell::from(p.name.clone()),
                    Cell::from(p.class.to_string()),
                    Cell::from(p.direction.to_string()),
                    Cell::from(fmt_rate_limit(p.rate_limit_kbps)),
                    Cell::from(p.matched_sessions.to_string()),
                ])
                .style(theme.style(StylePart::TableRow))
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(5),
                Constraint::Min(20),
                Constraint::Length(12),
                Constraint::Length(9),
                Constraint::Length(12),
                Constraint::Length(9),
            ],
        )
        .header(header)
        .row_highlight_style(theme.style(StylePart::TableSelected));

        self.table_state.select(if visible.is_empty() {
            None
        } else {
            Some(self.selected)
        });
        frame.render_stateful_widget(table, rows_area[1], &mut self.table_state);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn wants_text_input(&self) -> bool {
        self.search_active
    }

    fn key_hints(&self) -> &'static str {
        "j/k select  enter toggle  f filter  s sort  / search"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};
    use netdeck_core::model::Direction;
    use pretty_assertions::assert_eq;

    fn press(screen: &mut PoliciesScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent {
                code,
                modifiers: KeyModifiers::NONE,
                kind: KeyEventKind::Press,
                state: KeyEventState::NONE,
            })
            .unwrap()
    }

    fn policy(id: &str, name: &str, enabled: bool) -> Arc<QosPolicy> {
        Arc::new(QosPolicy {
            id: id.to_owned(),
            name: name.to_owned(),
            direction: Direction::Outbound,
            class: TrafficClass::Voice,
            rate_limit_kbps: Some(1_000),
            matched_sessions: 3,
            enabled,
            description: None,
        })
    }

    #[test]
    fn toggle_is_optimistic_until_next_snapshot() {
        let mut screen = PoliciesScreen::new();
        let snapshot = Arc::new(vec![policy("p1", "voip", false)]);
        screen
            .update(&Action::PoliciesUpdated(snapshot.clone()))
            .unwrap();

        let action = press(&mut screen, KeyCode::Enter).unwrap();
        match action {
            Action::Dispatch(Command::SetPolicyEnabled { id, enabled }) => {
                assert_eq!(id, "p1");
                assert!(enabled);
            }
            other => panic!("unexpected action: {other:?}"),
        }
        // Override applies immediately, before any refresh lands.
        assert!(screen.effective_enabled(&snapshot[0]));

        // A new snapshot is authoritative and clears the override.
        screen.update(&Action::PoliciesUpdated(snapshot)).unwrap();
        assert!(screen.pending.is_empty());
    }

    #[test]
    fn search_input_narrows_the_table() {
        let mut screen = PoliciesScreen::new();
        screen
            .update(&Action::PoliciesUpdated(Arc::new(vec![
                policy("p1", "voip-uplink", true),
                policy("p2", "bulk-backup", true),
            ])))
            .unwrap();

        press(&mut screen, KeyCode::Char('/'));
        for c in "voip".chars() {
            press(&mut screen, KeyCode::Char(c));
        }
        press(&mut screen, KeyCode::Enter);

        let visible = screen.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "voip-uplink");
    }
}
