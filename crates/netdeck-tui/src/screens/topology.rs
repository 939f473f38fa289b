//! Topology screen — interactive graph editor over [`TopologyEditor`].
//!
//! The editor is a local working copy of the open project's graph. Server
//! snapshots load once on first arrival and afterwards only on explicit
//! reload, so in-progress edits are never clobbered by a refresh.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use netdeck_core::model::{Link, LinkId, Node, NodeId, NodeKind, NodeStatus, Position};
use netdeck_core::topology::{GRID_SIZE, TopologyEditor};
use netdeck_core::Command;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::action::Action;
use crate::component::Component;
use crate::theme::{StylePart, Theme};
use crate::widgets::status::{link_status_span, node_status_span};

/// Keyboard interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Mode {
    #[default]
    Select,
    /// Arrow keys move the selected node; one undo entry per session.
    Move,
    /// A connect source is armed; `c` on another node completes the link.
    Connect,
}

pub struct TopologyScreen {
    focused: bool,
    editor: TopologyEditor,
    server_nodes: Arc<Vec<Arc<Node>>>,
    server_links: Arc<Vec<Arc<Link>>>,
    loaded: bool,
    mode: Mode,
    selected: Option<NodeId>,
    selected_link: Option<LinkId>,
    connect_source: Option<NodeId>,
    /// Node kind placed by `a`, cycled with `t`.
    add_kind: NodeKind,
    /// Where the next added node lands.
    cursor: Position,
}

impl TopologyScreen {
    pub fn new() -> Self {
        Self {
            focused: false,
            editor: TopologyEditor::new(),
            server_nodes: Arc::new(Vec::new()),
            server_links: Arc::new(Vec::new()),
            loaded: false,
            mode: Mode::Select,
            selected: None,
            selected_link: None,
            connect_source: None,
            add_kind: NodeKind::Router,
            cursor: Position { x: 0.0, y: 0.0 },
        }
    }

    /// Replace the working copy with the latest server snapshot.
    fn load_from_server(&mut self) {
        let nodes: Vec<Node> = self.server_nodes.iter().map(|n| (**n).clone()).collect();
        let links: Vec<Link> = self.server_links.iter().map(|l| (**l).clone()).collect();
        self.editor.load(nodes, links);
        self.loaded = true;
        self.mode = Mode::Select;
        self.connect_source = None;
        self.selected = self.editor.nodes().next().map(|n| n.id);
        self.selected_link = self.editor.links().first().map(|l| l.id);
    }

    fn node_ids(&self) -> Vec<NodeId> {
        self.editor.nodes().map(|n| n.id).collect()
    }

    fn select_step(&mut self, forward: bool) {
        let ids = self.node_ids();
        if ids.is_empty() {
            self.selected = None;
            return;
        }
        let current = self
            .selected
            .and_then(|id| ids.iter().position(|&n| n == id))
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % ids.len()
        } else {
            (current + ids.len() - 1) % ids.len()
        };
        self.selected = Some(ids[next]);
    }

    fn select_link_step(&mut self, forward: bool) {
        let links = self.editor.links();
        if links.is_empty() {
            self.selected_link = None;
            return;
        }
        let current = self
            .selected_link
            .and_then(|id| links.iter().position(|l| l.id == id))
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % links.len()
        } else {
            (current + links.len() - 1) % links.len()
        };
        self.selected_link = Some(links[next].id);
    }

    fn add_node(&mut self) {
        let id = self.editor.add_node(self.add_kind, self.cursor);
        self.selected = Some(id);
        // Stagger the cursor so repeated adds don't stack.
        self.cursor.x += GRID_SIZE * 3.0;
        if self.cursor.x > GRID_SIZE * 24.0 {
            self.cursor.x = 0.0;
            self.cursor.y += GRID_SIZE * 3.0;
        }
    }

    fn delete_selected(&mut self) {
        if let Some(id) = self.selected.take() {
            if self.mode == Mode::Move {
                self.editor.end_move(id);
                self.mode = Mode::Select;
            }
            self.editor.remove_node(id);
            self.selected = self.node_ids().first().copied();
            if self
                .selected_link
                .is_some_and(|lid| !self.editor.links().iter().any(|l| l.id == lid))
            {
                self.selected_link = self.editor.links().first().map(|l| l.id);
            }
        }
    }

    fn nudge_selected(&mut self, dx: f64, dy: f64) {
        let Some(id) = self.selected else { return };
        let Some(node) = self.editor.node(id) else {
            return;
        };
        let position = Position {
            x: node.position.x + dx,
            y: node.position.y + dy,
        };
        self.editor.move_node(id, position);
    }

    fn toggle_move_mode(&mut self) {
        let Some(id) = self.selected else { return };
        if self.mode == Mode::Move {
            self.editor.end_move(id);
            self.mode = Mode::Select;
        } else {
            self.editor.begin_move(id);
            self.mode = Mode::Move;
        }
    }

    fn handle_connect_key(&mut self) {
        let Some(selected) = self.selected else { return };
        match self.connect_source {
            None => {
                self.connect_source = Some(selected);
                self.mode = Mode::Connect;
            }
            Some(source) => {
                if let Some(link_id) = self.editor.connect(source, selected) {
                    self.selected_link = Some(link_id);
                }
                self.connect_source = None;
                self.mode = Mode::Select;
            }
        }
    }

    /// Toggle run state locally and mirror it to the lab server when the
    /// node came from a fetched snapshot.
    fn toggle_status(&mut self) -> Option<Action> {
        let id = self.selected?;
        let node = self.editor.node(id)?;
        let (next, command) = if node.status.is_running() {
            (NodeStatus::Stopped, Command::StopNode { id })
        } else {
            (NodeStatus::Started, Command::StartNode { id })
        };
        self.editor.set_status(id, next);
        self.server_nodes
            .iter()
            .any(|n| n.id == id)
            .then_some(Action::Dispatch(command))
    }

    fn suspend_selected(&mut self) -> Option<Action> {
        let id = self.selected?;
        self.editor.set_status(id, NodeStatus::Suspended);
        self.server_nodes
            .iter()
            .any(|n| n.id == id)
            .then_some(Action::Dispatch(Command::SuspendNode { id }))
    }

    fn cancel_mode(&mut self) -> bool {
        match self.mode {
            Mode::Select => false,
            Mode::Move => {
                if let Some(id) = self.selected {
                    self.editor.end_move(id);
                }
                self.mode = Mode::Select;
                true
            }
            Mode::Connect => {
                self.connect_source = None;
                self.mode = Mode::Select;
                true
            }
        }
    }

    // ── Rendering ────────────────────────────────────────────────────

    /// Canvas bounds with a margin, covering every node and the cursor.
    fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let mut min_x = self.cursor.x;
        let mut max_x = self.cursor.x;
        let mut min_y = self.cursor.y;
        let mut max_y = self.cursor.y;
        for node in self.editor.nodes() {
            min_x = min_x.min(node.position.x);
            max_x = max_x.max(node.position.x);
            min_y = min_y.min(node.position.y);
            max_y = max_y.max(node.position.y);
        }
        let margin = GRID_SIZE * 4.0;
        (
            [min_x - margin, max_x + margin],
            // Screen y grows down, canvas y grows up.
            [-(max_y + margin), -(min_y - margin)],
        )
    }

    fn render_canvas(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let snap = if self.editor.snap_enabled() {
            "snap on"
        } else {
            "snap off"
        };
        let mode = match self.mode {
            Mode::Select => String::new(),
            Mode::Move => " [moving]".to_owned(),
            Mode::Connect => " [connect: pick target]".to_owned(),
        };
        let title = format!(
            " Topology ({} nodes, {} links, {snap}){mode} ",
            self.editor.node_count(),
            self.editor.links().len(),
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

        let (x_bounds, y_bounds) = self.bounds();
        let canvas = Canvas::default()
            .block(block)
            .x_bounds(x_bounds)
            .y_bounds(y_bounds)
            .paint(|ctx| {
                for link in self.editor.links() {
                    let (Some(a), Some(b)) = (
                        self.editor.node(link.source.node),
                        self.editor.node(link.target.node),
                    ) else {
                        continue;
                    };
                    let color = if Some(link.id) == self.selected_link {
                        theme.accent_color()
                    } else if link.status == netdeck_core::LinkStatus::Up {
                        theme.good_color()
                    } else {
                        theme.dim_color()
                    };
                    ctx.draw(&CanvasLine {
                        x1: a.position.x,
                        y1: -a.position.y,
                        x2: b.position.x,
                        y2: -b.position.y,
                        color,
                    });
                }

                ctx.layer();

                for node in self.editor.nodes() {
                    let selected = Some(node.id) == self.selected;
                    let color = if selected {
                        theme.accent_color()
                    } else if node.status.is_running() {
                        theme.good_color()
                    } else {
                        theme.text_color()
                    };
                    let style = ratatui::style::Style::default().fg(color);
                    let marker = if selected { "▶" } else { " " };
                    let label = format!("{marker}{} {}", node.kind.glyph(), node.name);
                    ctx.print(
                        node.position.x,
                        -node.position.y,
                        Line::styled(label, style),
                    );
                }

                // Placement cursor
                ctx.print(
                    self.cursor.x,
                    -self.cursor.y,
                    Line::styled("+", ratatui::style::Style::default().fg(theme.dim_color())),
                );
            });

        frame.render_widget(canvas, area);
    }

    fn render_sidebar(&self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let block = Block::default()
            .title(" Detail ")
            .title_style(theme.style(StylePart::Title))
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme.style(StylePart::BorderDefault));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let row = theme.style(StylePart::TableRow);
        let hint = theme.style(StylePart::KeyHint);
        let mut lines: Vec<Line> = Vec::new();

        lines.push(Line::from(vec![
            Span::styled("add kind: ", hint),
            Span::styled(
                format!("{} {}", self.add_kind.glyph(), self.add_kind.label()),
                row,
            ),
        ]));
        lines.push(Line::from(Span::styled(
            format!(
                "history: undo {}  redo {}",
                if self.editor.can_undo() { "✓" } else { "–" },
                if self.editor.can_redo() { "✓" } else { "–" },
            ),
            hint,
        )));
        lines.push(Line::default());

        if let Some(node) = self.selected.and_then(|id| self.editor.node(id)) {
            lines.push(Line::from(vec![
                node_status_span(node.status, theme),
                Span::styled(format!(" {} ", node.name), theme.style(StylePart::Title)),
                Span::styled(node.kind.label(), hint),
            ]));
            lines.push(Line::from(Span::styled(
                format!(
                    "at ({:.0}, {:.0})  {} free ports",
                    node.position.x,
                    node.position.y,
                    node.free_port_count()
                ),
                row,
            )));
            for port in &node.ports {
                let used = if port.connected { "●" } else { "○" };
                lines.push(Line::from(Span::styled(
                    format!("  {used} {}", port.name),
                    if port.connected { row } else { hint },
                )));
            }
            lines.push(Line::default());
        }

        if let Some(link) = self
            .selected_link
            .and_then(|id| self.editor.links().iter().find(|l| l.id == id))
        {
            let name_of = |id: NodeId| {
                self.editor
                    .node(id)
                    .map_or_else(|| "?".to_owned(), |n| n.name.clone())
            };
            lines.push(Line::from(vec![
                link_status_span(link.status, theme),
                Span::styled(
                    format!(
                        " {} ⇄ {} ({})",
                        name_of(link.source.node),
                        name_of(link.target.node),
                        link.kind.label()
                    ),
                    row,
                ),
            ]));
        }

        frame.render_widget(Paragraph::new(lines), inner);
    }
}

impl Component for TopologyScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match key.code {
            KeyCode::Esc if self.cancel_mode() => return Ok(None),
            KeyCode::Char('n') => self.select_step(true),
            KeyCode::Char('p') => self.select_step(false),
            KeyCode::Char(']') => self.select_link_step(true),
            KeyCode::Char('[') => self.select_link_step(false),
            KeyCode::Char('a') => self.add_node(),
            KeyCode::Char('t') => {
                let all = NodeKind::ALL;
                let idx = all.iter().position(|&k| k == self.add_kind).unwrap_or(0);
                self.add_kind = all[(idx + 1) % all.len()];
            }
            KeyCode::Char('m') => self.toggle_move_mode(),
            KeyCode::Char('c') => self.handle_connect_key(),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            KeyCode::Char('x') => {
                if let Some(link_id) = self.selected_link.take() {
                    self.editor.disconnect(link_id);
                    self.selected_link = self.editor.links().first().map(|l| l.id);
                }
            }
            KeyCode::Char('s') => return Ok(self.toggle_status()),
            KeyCode::Char('S') => return Ok(self.suspend_selected()),
            KeyCode::Char('u') => {
                self.editor.undo();
            }
            KeyCode::Char('r') => {
                self.editor.redo();
            }
            KeyCode::Char('g') => {
                let snap = self.editor.snap_enabled();
                self.editor.set_snap(!snap);
            }
            KeyCode::Char('R') => self.load_from_server(),
            KeyCode::Up | KeyCode::Char('k') if self.mode == Mode::Move => {
                self.nudge_selected(0.0, -GRID_SIZE);
            }
            KeyCode::Down | KeyCode::Char('j') if self.mode == Mode::Move => {
                self.nudge_selected(0.0, GRID_SIZE);
            }
            KeyCode::Left | KeyCode::Char('h') if self.mode == Mode::Move => {
                self.nudge_selected(-GRID_SIZE, 0.0);
            }
            KeyCode::Right | KeyCode::Char('l') if self.mode == Mode::Move => {
                self.nudge_selected(GRID_SIZE, 0.0);
            }
            KeyCode::Up => self.cursor.y -= GRID_SIZE,
            KeyCode::Down => self.cursor.y += GRID_SIZE,
            KeyCode::Left => self.cursor.x -= GRID_SIZE,
            KeyCode::Right => self.cursor.x += GRID_SIZE,
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::NodesUpdated(nodes) => {
                self.server_nodes = nodes.clone();
                if !self.loaded && !self.server_nodes.is_empty() {
                    self.load_from_server();
                }
            }
            Action::LinksUpdated(links) => {
                self.server_links = links.clone();
                if self.loaded
                    && self.mode == Mode::Select
                    && !self.editor.can_undo()
                    && !self.editor.can_redo()
                {
                    // No local edits yet; keep tracking the server.
                    self.load_from_server();
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, theme: &Theme) {
        let cols =
            Layout::horizontal([Constraint::Min(40), Constraint::Length(32)]).split(area);
        self.render_canvas(frame, cols[0], theme);
        self.render_sidebar(frame, cols[1], theme);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn key_hints(&self) -> &'static str {
        "a add  t kind  n/p select  m move  c connect  d delete  x unlink  s start/stop  u/r undo/redo  g snap  R reload"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};

    fn press(screen: &mut TopologyScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent {
                code,
                modifiers: KeyModifiers::NONE,
                kind: KeyEventKind::Press,
                state: KeyEventState::NONE,
            })
            .unwrap()
    }

    #[test]
    fn add_connect_and_undo_via_keys() {
        let mut screen = TopologyScreen::new();

        press(&mut screen, KeyCode::Char('a'));
        press(&mut screen, KeyCode::Char('a'));
        assert_eq!(screen.editor.node_count(), 2);

        // Arm connect on the second node, complete on the first.
        press(&mut screen, KeyCode::Char('c'));
        press(&mut screen, KeyCode::Char('p'));
        press(&mut screen, KeyCode::Char('c'));
        assert_eq!(screen.editor.links().len(), 1);

        press(&mut screen, KeyCode::Char('u'));
        assert_eq!(screen.editor.links().len(), 0);
        press(&mut screen, KeyCode::Char('r'));
        assert_eq!(screen.editor.links().len(), 1);
    }

    #[test]
    fn move_mode_coalesces_nudges_into_one_undo_entry() {
        let mut screen = TopologyScreen::new();
        press(&mut screen, KeyCode::Char('a'));
        let id = screen.selected.unwrap();
        let start = screen.editor.node(id).unwrap().position;

        press(&mut screen, KeyCode::Char('m'));
        press(&mut screen, KeyCode::Right);
        press(&mut screen, KeyCode::Right);
        press(&mut screen, KeyCode::Down);
        press(&mut screen, KeyCode::Char('m'));

        let moved = screen.editor.node(id).unwrap().position;
        assert!((moved.x - start.x).abs() > f64::EPSILON);

        // One undo restores the pre-drag position entirely.
        press(&mut screen, KeyCode::Char('u'));
        let restored = screen.editor.node(id).unwrap().position;
        assert!((restored.x - start.x).abs() < f64::EPSILON);
        assert!((restored.y - start.y).abs() < f64::EPSILON);
    }

    #[test]
    fn status_toggle_only_dispatches_for_server_known_nodes() {
        let mut screen = TopologyScreen::new();
        press(&mut screen, KeyCode::Char('a'));

        // Locally added node: status flips but no command goes out.
        let action = press(&mut screen, KeyCode::Char('s'));
        assert!(action.is_none());
        let id = screen.selected.unwrap();
        assert!(screen.editor.node(id).unwrap().status.is_running());
    }

    #[test]
    fn escape_cancels_connect_mode() {
        let mut screen = TopologyScreen::new();
        press(&mut screen, KeyCode::Char('a'));
        press(&mut screen, KeyCode::Char('c'));
        assert_eq!(screen.mode, Mode::Connect);
        press(&mut screen, KeyCode::Esc);
        assert_eq!(screen.mode, Mode::Select);
        assert!(screen.connect_source.is_none());
    }
}
