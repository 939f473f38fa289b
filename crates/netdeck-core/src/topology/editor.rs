use indexmap::IndexMap;
use tracing::debug;
use uuid::Uuid;

use crate::model::{
    Endpoint, Link, LinkId, LinkKind, LinkStatus, Node, NodeId, NodeKind, NodeStatus, Port,
    PortStatus, Position,
};

/// Canvas grid pitch in project units.
pub const GRID_SIZE: f64 = 20.0;

/// Undo depth; the oldest snapshot is dropped past this.
pub const MAX_HISTORY: usize = 100;

/// Deep copy of the graph at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub nodes: IndexMap<NodeId, Node>,
    pub links: Vec<Link>,
}

/// Editable topology graph with linear undo/redo.
///
/// Insertion order of nodes is preserved (IndexMap) so renders and
/// auto-naming are deterministic across undo round-trips.
#[derive(Debug, Default)]
pub struct TopologyEditor {
    nodes: IndexMap<NodeId, Node>,
    links: Vec<Link>,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
    snap_to_grid: bool,
    /// Pre-drag snapshot captured by `begin_move`, committed by `end_move`.
    drag: Option<(NodeId, Snapshot)>,
}

impl TopologyEditor {
    pub fn new() -> Self {
        Self {
            snap_to_grid: true,
            ..Self::default()
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Index of the first unconnected port on `id`, in declared order.
    pub fn free_port(&self, id: NodeId) -> Option<usize> {
        self.nodes.get(&id).and_then(Node::first_free_port)
    }

    pub fn links_of(&self, id: NodeId) -> impl Iterator<Item = &Link> {
        self.links.iter().filter(move |l| l.touches(id))
    }

    pub fn snap_enabled(&self) -> bool {
        self.snap_to_grid
    }

    pub fn set_snap(&mut self, enabled: bool) {
        self.snap_to_grid = enabled;
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Add a node of `kind` at `position` with its default port set and
    /// an auto-generated name (`R1`, `SW2`, …). Always succeeds.
    pub fn add_node(&mut self, kind: NodeKind, position: Position) -> NodeId {
        self.push_snapshot();

        let id = Uuid::new_v4();
        let name = self.next_name(kind);
        let node = Node {
            id,
            name,
            kind,
            position: self.snapped(position),
            status: NodeStatus::Stopped,
            ports: kind.default_ports(),
        };
        debug!(node = %node.name, ?kind, "add node");
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node and every link touching it, freeing the far-end
    /// ports. Returns false (no mutation) for an unknown id.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        if !self.nodes.contains_key(&id) {
            return false;
        }
        self.push_snapshot();

        let incident: Vec<Link> = self.links.iter().filter(|l| l.touches(id)).cloned().collect();
        self.links.retain(|l| !l.touches(id));
        for link in &incident {
            for end in [link.source, link.target] {
                if end.node != id {
                    self.release_port(end);
                }
            }
        }
        self.nodes.shift_remove(&id);
        debug!(%id, cascaded = incident.len(), "remove node");
        true
    }

    /// Connect the first free port of `source` to the first free port of
    /// `target` with an Ethernet link. Returns `None` without mutating
    /// when either node is unknown, is the same node, or has no free port.
    pub fn connect(&mut self, source: NodeId, target: NodeId) -> Option<LinkId> {
        if source == target {
            return None;
        }
        let src_port = self.free_port(source)?;
        let dst_port = self.free_port(target)?;
        self.push_snapshot();

        let id = Uuid::new_v4();
        let link = Link {
            id,
            source: Endpoint::new(source, src_port),
            target: Endpoint::new(target, dst_port),
            kind: LinkKind::Ethernet,
            status: self.link_status_between(source, target),
        };
        self.claim_port(link.source);
        self.claim_port(link.target);
        debug!(%source, %target, src_port, dst_port, "connect");
        self.links.push(link);
        Some(id)
    }

    /// Remove a link and revert both of its ports to free and down.
    pub fn disconnect(&mut self, link_id: LinkId) -> bool {
        let Some(idx) = self.links.iter().position(|l| l.id == link_id) else {
            return false;
        };
        self.push_snapshot();

        let link = self.links.remove(idx);
        self.release_port(link.source);
        self.release_port(link.target);
        debug!(%link_id, "disconnect");
        true
    }

    /// Reposition a node, grid-snapping when enabled. Never pushes a
    /// snapshot: drags call this per frame and commit via `end_move`.
    pub fn move_node(&mut self, id: NodeId, position: Position) {
        let snapped = self.snapped(position);
        if let Some(node) = self.nodes.get_mut(&id) {
            node.position = snapped;
        }
    }

    /// Capture the pre-drag state. Pairs with `end_move`; a second
    /// `begin_move` before `end_move` replaces the pending capture.
    pub fn begin_move(&mut self, id: NodeId) {
        if self.nodes.contains_key(&id) {
            self.drag = Some((id, self.snapshot()));
        }
    }

    /// Commit a drag as a single undo entry. No entry is pushed if the
    /// node never actually moved.
    pub fn end_move(&mut self, id: NodeId) {
        let Some((drag_id, before)) = self.drag.take() else {
            return;
        };
        if drag_id != id {
            return;
        }
        let moved = before.nodes.get(&id).map(|n| n.position)
            != self.nodes.get(&id).map(|n| n.position);
        if moved {
            self.commit(before);
        }
    }

    /// Set a node's lifecycle status and propagate it to connected
    /// ports and incident links.
    pub fn set_status(&mut self, id: NodeId, status: NodeStatus) -> bool {
        if !self.nodes.contains_key(&id) {
            return false;
        }
        self.push_snapshot();

        if let Some(node) = self.nodes.get_mut(&id) {
            node.status = status;
            let port_status = if status.is_running() {
                PortStatus::Up
            } else {
                PortStatus::Down
            };
            for port in node.ports.iter_mut().filter(|p| p.connected) {
                port.status = port_status;
            }
        }
        for i in 0..self.links.len() {
            if self.links[i].touches(id) {
                let (a, b) = (self.links[i].source.node, self.links[i].target.node);
                self.links[i].status = self.link_status_between(a, b);
            }
        }
        true
    }

    pub fn rename_node(&mut self, id: NodeId, name: impl Into<String>) -> bool {
        let name = name.into();
        if name.is_empty() || !self.nodes.contains_key(&id) {
            return false;
        }
        self.push_snapshot();
        if let Some(node) = self.nodes.get_mut(&id) {
            node.name = name;
        }
        true
    }

    // ── History ──────────────────────────────────────────────────────

    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(self.snapshot());
        self.restore(previous);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(self.snapshot());
        self.restore(next);
        true
    }

    /// Replace the whole graph from a server fetch, clearing history.
    pub fn load(&mut self, nodes: Vec<Node>, links: Vec<Link>) {
        self.nodes = nodes.into_iter().map(|n| (n.id, n)).collect();
        self.links = links;
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.drag = None;
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            nodes: self.nodes.clone(),
            links: self.links.clone(),
        }
    }

    // ── Internals ────────────────────────────────────────────────────

    fn push_snapshot(&mut self) {
        let before = self.snapshot();
        self.commit(before);
    }

    /// Record `before` as the undo point for the mutation in progress.
    fn commit(&mut self, before: Snapshot) {
        self.undo_stack.push(before);
        if self.undo_stack.len() > MAX_HISTORY {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.nodes = snapshot.nodes;
        self.links = snapshot.links;
        self.drag = None;
    }

    fn snapped(&self, position: Position) -> Position {
        if self.snap_to_grid {
            position.snapped(GRID_SIZE)
        } else {
            position
        }
    }

    fn claim_port(&mut self, end: Endpoint) {
        if let Some(port) = self.port_mut(end) {
            port.connected = true;
        }
    }

    fn release_port(&mut self, end: Endpoint) {
        if let Some(port) = self.port_mut(end) {
            port.connected = false;
            port.status = PortStatus::Down;
        }
    }

    fn port_mut(&mut self, end: Endpoint) -> Option<&mut Port> {
        self.nodes.get_mut(&end.node)?.ports.get_mut(end.port)
    }

    fn link_status_between(&self, a: NodeId, b: NodeId) -> LinkStatus {
        let running = |id| {
            self.nodes
                .get(&id)
                .is_some_and(|n| n.status.is_running())
        };
        if running(a) && running(b) {
            LinkStatus::Up
        } else {
            LinkStatus::Down
        }
    }

    /// Smallest `prefix{n}` not already taken by a node of this kind.
    fn next_name(&self, kind: NodeKind) -> String {
        let prefix = kind.name_prefix();
        let taken: Vec<u32> = self
            .nodes
            .values()
            .filter(|n| n.kind == kind)
            .filter_map(|n| n.name.strip_prefix(prefix)?.parse().ok())
            .collect();
        let mut n = 1;
        while taken.contains(&n) {
            n += 1;
        }
        format!("{prefix}{n}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn editor() -> TopologyEditor {
        let mut ed = TopologyEditor::new();
        ed.set_snap(false);
        ed
    }

    #[test]
    fn add_node_assigns_default_ports_and_name() {
        let mut ed = editor();
        let r1 = ed.add_node(NodeKind::Router, Position::new(10.0, 10.0));
        let r2 = ed.add_node(NodeKind::Router, Position::new(50.0, 10.0));

        assert_eq!(ed.node(r1).unwrap().name, "R1");
        assert_eq!(ed.node(r2).unwrap().name, "R2");
        assert_eq!(ed.node(r1).unwrap().ports.len(), 4);
        assert_eq!(ed.node(r1).unwrap().status, NodeStatus::Stopped);
    }

    #[test]
    fn auto_names_skip_taken_numbers() {
        let mut ed = editor();
        let r1 = ed.add_node(NodeKind::Router, Position::default());
        ed.add_node(NodeKind::Router, Position::default());
        ed.remove_node(r1);

        let again = ed.add_node(NodeKind::Router, Position::default());
        assert_eq!(ed.node(again).unwrap().name, "R1");
    }

    #[test]
    fn connect_uses_first_free_ports_in_declared_order() {
        let mut ed = editor();
        let a = ed.add_node(NodeKind::Router, Position::default());
        let b = ed.add_node(NodeKind::Switch, Position::default());

        ed.connect(a, b).unwrap();
        let second = ed.connect(a, b).unwrap();

        let link = ed.links().iter().find(|l| l.id == second).unwrap();
        assert_eq!(link.source.port, 1); // Gi0/1
        assert_eq!(link.target.port, 1); // e1
        assert!(ed.node(a).unwrap().ports[0].connected);
        assert!(ed.node(a).unwrap().ports[1].connected);
        assert!(!ed.node(a).unwrap().ports[2].connected);
    }

    #[test]
    fn connect_refuses_self_and_exhausted_nodes() {
        let mut ed = editor();
        let host = ed.add_node(NodeKind::Host, Position::default());
        let sw = ed.add_node(NodeKind::Switch, Position::default());

        assert!(ed.connect(host, host).is_none());
        assert!(ed.connect(host, sw).is_some());
        // Host's single port is now taken.
        assert!(ed.connect(host, sw).is_none());
        assert_eq!(ed.links().len(), 1);
    }

    #[test]
    fn no_port_is_used_by_two_links() {
        let mut ed = editor();
        let a = ed.add_node(NodeKind::Switch, Position::default());
        let b = ed.add_node(NodeKind::Switch, Position::default());
        for _ in 0..8 {
            ed.connect(a, b);
        }
        assert_eq!(ed.links().len(), 8);
        for port in 0..8 {
            let users = ed
                .links()
                .iter()
                .filter(|l| l.uses_port(a, port))
                .count();
            assert_eq!(users, 1, "port {port} on a");
        }
        assert!(ed.connect(a, b).is_none());
    }

    #[test]
    fn disconnect_frees_both_ports() {
        let mut ed = editor();
        let a = ed.add_node(NodeKind::Router, Position::default());
        let b = ed.add_node(NodeKind::Router, Position::default());
        let link = ed.connect(a, b).unwrap();

        assert!(ed.disconnect(link));
        assert!(ed.links().is_empty());
        assert!(!ed.node(a).unwrap().ports[0].connected);
        assert!(!ed.node(b).unwrap().ports[0].connected);
        assert!(!ed.disconnect(link));
    }

    #[test]
    fn deleting_router_frees_switch_port() {
        // Router + switch, connect, delete the router: the switch's
        // port must revert to free/down and no links remain.
        let mut ed = editor();
        let router = ed.add_node(NodeKind::Router, Position::default());
        let switch = ed.add_node(NodeKind::Switch, Position::default());
        ed.connect(router, switch).unwrap();

        assert!(ed.remove_node(router));

        assert!(ed.links().is_empty());
        let port = &ed.node(switch).unwrap().ports[0];
        assert!(!port.connected);
        assert_eq!(port.status, PortStatus::Down);
    }

    #[test]
    fn remove_node_cascades_only_incident_links() {
        let mut ed = editor();
        let a = ed.add_node(NodeKind::Router, Position::default());
        let b = ed.add_node(NodeKind::Router, Position::default());
        let c = ed.add_node(NodeKind::Router, Position::default());
        ed.connect(a, b);
        let bc = ed.connect(b, c).unwrap();

        ed.remove_node(a);

        assert_eq!(ed.links().len(), 1);
        assert_eq!(ed.links()[0].id, bc);
    }

    #[test]
    fn undo_restores_prior_state_exactly() {
        let mut ed = editor();
        let a = ed.add_node(NodeKind::Router, Position::default());
        let b = ed.add_node(NodeKind::Switch, Position::default());
        ed.connect(a, b).unwrap();
        let before = ed.snapshot();

        ed.remove_node(a);
        assert!(ed.undo());

        assert_eq!(ed.snapshot(), before);
    }

    #[test]
    fn redo_reapplies_and_new_mutation_clears_redo() {
        let mut ed = editor();
        ed.add_node(NodeKind::Router, Position::default());
        let after_add = ed.snapshot();

        assert!(ed.undo());
        assert_eq!(ed.node_count(), 0);
        assert!(ed.redo());
        assert_eq!(ed.snapshot(), after_add);

        assert!(ed.undo());
        ed.add_node(NodeKind::Switch, Position::default());
        assert!(!ed.redo(), "new mutation must clear the redo tail");
    }

    #[test]
    fn move_node_does_not_push_history() {
        let mut ed = editor();
        let id = ed.add_node(NodeKind::Host, Position::default());
        assert!(ed.undo());
        assert!(ed.redo());

        ed.move_node(id, Position::new(300.0, 120.0));
        ed.move_node(id, Position::new(310.0, 130.0));

        // Only the add is undoable.
        assert!(ed.undo());
        assert_eq!(ed.node_count(), 0);
        assert!(!ed.undo());
    }

    #[test]
    fn drag_coalesces_into_one_undo_entry() {
        let mut ed = editor();
        let id = ed.add_node(NodeKind::Host, Position::default());

        ed.begin_move(id);
        for step in 1..=10 {
            let x = f64::from(step) * 7.0;
            ed.move_node(id, Position::new(x, 0.0));
        }
        ed.end_move(id);

        assert_eq!(ed.node(id).unwrap().position, Position::new(70.0, 0.0));
        assert!(ed.undo());
        assert_eq!(ed.node(id).unwrap().position, Position::default());
        // Next undo removes the add, not another drag frame.
        assert!(ed.undo());
        assert_eq!(ed.node_count(), 0);
    }

    #[test]
    fn stationary_drag_pushes_nothing() {
        let mut ed = editor();
        let id = ed.add_node(NodeKind::Host, Position::default());

        ed.begin_move(id);
        ed.end_move(id);

        assert!(ed.undo()); // the add
        assert!(!ed.undo());
    }

    #[test]
    fn grid_snapping_applies_when_enabled() {
        let mut ed = TopologyEditor::new();
        assert!(ed.snap_enabled());
        let id = ed.add_node(NodeKind::Host, Position::new(33.0, 47.0));
        assert_eq!(ed.node(id).unwrap().position, Position::new(40.0, 40.0));

        ed.set_snap(false);
        ed.move_node(id, Position::new(33.0, 47.0));
        assert_eq!(ed.node(id).unwrap().position, Position::new(33.0, 47.0));
    }

    #[test]
    fn set_status_propagates_to_ports_and_links() {
        let mut ed = editor();
        let a = ed.add_node(NodeKind::Router, Position::default());
        let b = ed.add_node(NodeKind::Router, Position::default());
        ed.connect(a, b).unwrap();

        ed.set_status(a, NodeStatus::Started);
        assert_eq!(ed.links()[0].status, LinkStatus::Down);

        ed.set_status(b, NodeStatus::Started);
        assert_eq!(ed.links()[0].status, LinkStatus::Up);
        assert_eq!(ed.node(a).unwrap().ports[0].status, PortStatus::Up);
        assert!(!ed.node(a).unwrap().ports[1].connected);

        ed.set_status(a, NodeStatus::Suspended);
        assert_eq!(ed.links()[0].status, LinkStatus::Down);
    }

    #[test]
    fn rename_rejects_empty_and_unknown() {
        let mut ed = editor();
        let id = ed.add_node(NodeKind::Server, Position::default());

        assert!(ed.rename_node(id, "db-primary"));
        assert_eq!(ed.node(id).unwrap().name, "db-primary");
        assert!(!ed.rename_node(id, ""));
        assert!(!ed.rename_node(Uuid::new_v4(), "ghost"));
    }

    #[test]
    fn load_replaces_graph_and_clears_history() {
        let mut ed = editor();
        ed.add_node(NodeKind::Router, Position::default());

        let node = Node {
            id: Uuid::new_v4(),
            name: "R9".into(),
            kind: NodeKind::Router,
            position: Position::default(),
            status: NodeStatus::Started,
            ports: NodeKind::Router.default_ports(),
        };
        ed.load(vec![node.clone()], vec![]);

        assert_eq!(ed.node_count(), 1);
        assert_eq!(ed.node(node.id).unwrap().name, "R9");
        assert!(!ed.can_undo());
        assert!(!ed.can_redo());
    }

    #[test]
    fn history_depth_is_bounded() {
        let mut ed = editor();
        for _ in 0..(MAX_HISTORY + 20) {
            ed.add_node(NodeKind::Host, Position::default());
        }
        let mut undone = 0;
        while ed.undo() {
            undone += 1;
        }
        assert_eq!(undone, MAX_HISTORY);
    }
}
