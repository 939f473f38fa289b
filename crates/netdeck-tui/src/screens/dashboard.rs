//! Dashboard screen — monitoring widgets over the latest store snapshots.

use std::sync::Arc;

use chrono::Utc;
use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use netdeck_core::model::{ComputeServer, Link, Node, Project, SecurityAlert, SlaTarget};
use netdeck_core::query::{alert_summary, sla_summary};
use netdeck_core::Command;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Gauge, Paragraph, Row, Table};

use crate::action::Action;
use crate::component::Component;
use crate::theme::{StylePart, Theme};
use crate::widgets::fmt::{fmt_age, fmt_opt_pct, fmt_pct};
use crate::widgets::status::{compute_status_span, severity_span};

pub struct DashboardScreen {
    focused: bool,
    selected_project: usize,
    projects: Arc<Vec<Arc<Project>>>,
    computes: Arc<Vec<Arc<ComputeServer>>>,
    nodes: Arc<Vec<Arc<Node>>>,
    links: Arc<Vec<Arc<Link>>>,
    sla_targets: Arc<Vec<Arc<SlaTarget>>>,
    alerts: Arc<Vec<Arc<SecurityAlert>>>,
}

impl DashboardScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            selected_project: 0,
            projects: Arc::new(Vec::new()),
            computes: Arc::new(Vec::new()),
            nodes: Arc::new(Vec::new()),
            links: Arc::new(Vec::new()),
            sla_targets: Arc::new(Vec::new()),
            alerts: Arc::new(Vec::new()),
        }
    }

    fn panel_block(&self, title: &str, theme: &Theme) -> Block<'static> {
        Block::default()
            .title(format!(" {title} "))
            .title_style(theme.style(StylePart::Title))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme.style(StylePart::BorderFocused)
            } else {
                theme.style(StylePart::BorderDefault)
            })
    }

    fn open_selected_project(&self) -> Option<Action> {
        let project = self.projects.get(self.selected_project)?;
        if project.is_open() {
            return None;
        }
        Some(Action::Dispatch(Command::OpenProject { id: project.id }))
    }

    fn render_projects(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let running_nodes = self
            .nodes
            .iter()
            .filter(|n| n.status.is_running())
            .count();
        let title = format!(
            "Projects · {} nodes ({running_nodes} up) · {} links",
            self.nodes.len(),
            self.links.len()
        );
        let block = self.panel_block(&title, theme);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.projects.is_empty() {
            frame.render_widget(
                Paragraph::new("no projects").style(theme.style(StylePart::KeyHint)),
                inner,
            );
            return;
        }

        let lines: Vec<Line> = self
            .projects
            .iter()
            .enumerate()
            .take(usize::from(inner.height))
            .map(|(i, project)| {
                let selected = i == self.selected_project;
                let marker = if selected { "▶ " } else { "  " };
                let state = if project.is_open() { "open" } else { "closed" };
                let style = if selected {
                    theme.style(StylePart::TableSelected)
                } else {
                    theme.style(StylePart::TableRow)
                };
                Line::from(vec![
                    Span::styled(format!("{marker}{} ", project.name), style),
                    Span::styled(
                        format!("({state})"),
                        if project.is_open() {
                            theme.style(StylePart::StatusGood)
                        } else {
                            theme.style(StylePart::KeyHint)
                        },
                    ),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn render_computes(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = self.panel_block("Compute Servers", theme);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.computes.is_empty() {
            frame.render_widget(
                Paragraph::new("no compute servers").style(theme.style(StylePart::KeyHint)),
                inner,
            );
            return;
        }

        let header = Row::new(vec!["", "Name", "Host", "CPU", "Mem"])
            .style(theme.style(StylePart::TableHeader));
        let rows: Vec<Row> = self
            .computes
            .iter()
            .map(|c| {
                Row::new(vec![
                    Cell::from(compute_status_span(c.connected, theme)),
                    Cell::from(c.name.clone()),
                    Cell::from(format!("{}:{}", c.host, c.port)),
                    Cell::from(fmt_opt_pct(c.cpu_usage_pct)),
                    Cell::from(fmt_opt_pct(c.memory_usage_pct)),
                ])
                .style(theme.style(StylePart::TableRow))
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Length(1),
                Constraint::Min(12),
                Constraint::Min(16),
                Constraint::Length(6),
                Constraint::Length(6),
            ],
        )
        .header(header);
        frame.render_widget(table, inner);
    }

    fn render_sla(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = self.panel_block("SLA Compliance", theme);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let summary = sla_summary(&self.sla_targets);
        let layout = Layout::vertical([Constraint::Length(1), Constraint::Min(1)]).split(inner);

        let ratio = (summary.compliance_pct() / 100.0).clamp(0.0, 1.0);
        let gauge = Gauge::default()
            .gauge_style(theme.style(StylePart::GaugeFill))
            .ratio(ratio)
            .label(fmt_pct(summary.compliance_pct()));
        frame.render_widget(gauge, layout[0]);

        let detail = Line::from(vec![
            Span::styled(
                format!("{} met", summary.met),
                theme.style(StylePart::StatusGood),
            ),
            Span::styled("  ", theme.style(StylePart::TableRow)),
            Span::styled(
                format!("{} at risk", summary.at_risk),
                theme.style(StylePart::StatusWarn),
            ),
            Span::styled("  ", theme.style(StylePart::TableRow)),
            Span::styled(
                format!("{} breached", summary.breached),
                theme.style(StylePart::StatusBad),
            ),
            Span::styled(
                format!("  avg {}", fmt_pct(summary.avg_availability_pct)),
                theme.style(StylePart::KeyHint),
            ),
        ]);
        frame.render_widget(Paragraph::new(detail), layout[1]);
    }

    fn render_alerts(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let summary = alert_summary(&self.alerts);
        let title = format!(
            "Recent Alerts ({} unack, {} critical)",
            summary.unacknowledged, summary.critical
        );
        let block = self.panel_block(&title, theme);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let now = Utc::now();
        let mut recent: Vec<&Arc<SecurityAlert>> = self.alerts.iter().collect();
        recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

        let lines: Vec<Line> = recent
            .iter()
            .take(usize::from(inner.height))
            .map(|alert| {
                Line::from(vec![
                    severity_span(alert.severity, theme),
                    Span::styled(
                        format!(" {} ", alert.message),
                        theme.style(StylePart::TableRow),
                    ),
                    Span::styled(fmt_age(alert.timestamp, now), theme.style(StylePart::KeyHint)),
                ])
            })
            .collect();

        if lines.is_empty() {
            frame.render_widget(
                Paragraph::new("no alerts").style(theme.style(StylePart::KeyHint)),
                inner,
            );
        } else {
            frame.render_widget(Paragraph::new(lines), inner);
        }
    }
}

impl Component for DashboardScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected_project + 1 < self.projects.len() {
                    self.selected_project += 1;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected_project = self.selected_project.saturating_sub(1);
            }
            KeyCode::Enter => return Ok(self.open_selected_project()),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ProjectsUpdated(p) => {
                self.projects = p.clone();
                if self.selected_project >= self.projects.len() {
                    self.selected_project = self.projects.len().saturating_sub(1);
                }
            }
            Action::ComputesUpdated(c) => self.computes = c.clone(),
            Action::NodesUpdated(n) => self.nodes = n.clone(),
            Action::LinksUpdated(l) => self.links = l.clone(),
            Action::SlaTargetsUpdated(s) => self.sla_targets = s.clone(),
            Action::AlertsUpdated(a) => self.alerts = a.clone(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let rows = Layout::vertical([Constraint::Length(7), Constraint::Min(5)]).split(area);
        let top = Layout::horizontal([
            Constraint::Length(40),
            Constraint::Min(30),
            Constraint::Min(30),
        ])
        .split(rows[0]);

        self.render_projects(frame, top[0], theme);
        self.render_computes(frame, top[1], theme);
        self.render_sla(frame, top[2], theme);
        self.render_alerts(frame, rows[1], theme);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn key_hints(&self) -> &'static str {
        "j/k project  enter open"
    }
}
