//! Layered layout for the family diagram.
//!
//! Ranks members by generation over the parent→child subgraph only (spouse
//! edges never affect ranking, they only nudge in-rank ordering), then
//! places each rank as a centered row. Members with a persisted position are
//! authoritative: the computed coordinate is discarded for them.

use std::collections::{BTreeMap, HashMap};

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::warn;
use uuid::Uuid;

use super::builder::FamilyGraph;
use crate::model::{Member, Position};

/// Layout configuration constants. Node box and separations match the
/// original diagram (256×100 boxes, 50 within a rank, 100 between ranks).
pub struct LayoutConfig {
    /// Fixed node width.
    pub node_width: f32,
    /// Fixed node height.
    pub node_height: f32,
    /// Minimum horizontal gap between nodes in a rank.
    pub node_sep: f32,
    /// Vertical gap between ranks.
    pub rank_sep: f32,
    /// Canvas width used to center each row.
    pub canvas_width: f32,
    /// Side length of the marriage junction dot.
    pub junction_size: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 256.0,
            node_height: 100.0,
            node_sep: 50.0,
            rank_sep: 100.0,
            canvas_width: 1200.0,
            junction_size: 24.0,
        }
    }
}

/// Computes member coordinates; junction positions are always derived from
/// the spouses' final positions, never laid out independently.
pub struct LayoutEngine {
    config: LayoutConfig,
}

impl LayoutEngine {
    pub fn new() -> Self {
        Self {
            config: LayoutConfig::default(),
        }
    }

    pub fn with_config(config: LayoutConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Compute a position for every member. Persisted positions win over
    /// freshly computed ones, so re-running after an unrelated edit never
    /// moves a member the user has dragged.
    pub fn layout(&self, members: &[Member], graph: &FamilyGraph) -> HashMap<Uuid, Position> {
        let ranks = self.assign_ranks(members, graph);

        // Group into rows, preserving member input order within a rank.
        let mut rows: BTreeMap<i32, Vec<Uuid>> = BTreeMap::new();
        for member in members {
            let rank = ranks.get(&member.id).copied().unwrap_or(0);
            rows.entry(rank).or_default().push(member.id);
        }

        let mut positions = HashMap::with_capacity(members.len());
        for (rank, row) in &rows {
            let row = self.nudge_spouses_adjacent(row, graph);
            let y = *rank as f32 * (self.config.node_height + self.config.rank_sep);
            let step = self.config.node_width + self.config.node_sep;
            let total_width = row.len() as f32 * step - self.config.node_sep;
            let start_x = (self.config.canvas_width - total_width) / 2.0;
            for (i, id) in row.iter().enumerate() {
                positions.insert(*id, Position::new(start_x + i as f32 * step, y));
            }
        }

        // Merge: explicit positions are authoritative.
        for member in members {
            if let Some(saved) = member.position {
                positions.insert(member.id, saved);
            }
        }

        positions
    }

    /// Midpoint of the two spouses' boxes, shifted by half a box so the dot
    /// sits between the nodes regardless of which is left/right.
    pub fn junction_position(&self, a: Position, b: Position) -> Position {
        Position::new(
            (a.x + b.x) / 2.0 + (self.config.node_width - self.config.junction_size) / 2.0,
            (a.y + b.y) / 2.0 + (self.config.node_height - self.config.junction_size) / 2.0,
        )
    }

    /// Longest-path generation ranking: rank(child) = max(rank(parent)) + 1.
    /// Guarantees rank(child) > rank(parent) for every parent edge in an
    /// acyclic graph; cycle participants fall back to insertion order.
    fn assign_ranks(&self, members: &[Member], graph: &FamilyGraph) -> HashMap<Uuid, i32> {
        let mut dag: DiGraph<Uuid, ()> = DiGraph::new();
        let mut index: HashMap<Uuid, NodeIndex> = HashMap::with_capacity(members.len());
        for member in members {
            index.insert(member.id, dag.add_node(member.id));
        }
        for member in members {
            for child in graph.children(member.id) {
                if let (Some(&from), Some(&to)) = (index.get(&member.id), index.get(child)) {
                    dag.add_edge(from, to, ());
                }
            }
        }

        let order: Vec<NodeIndex> = match toposort(&dag, None) {
            Ok(order) => order,
            Err(_) => {
                warn!("cycle in parent edges; ranking in insertion order");
                dag.node_indices().collect()
            }
        };

        let mut ranks: HashMap<Uuid, i32> = HashMap::with_capacity(members.len());
        for idx in order {
            let id = dag[idx];
            let rank = graph
                .parents(id)
                .iter()
                .filter_map(|p| ranks.get(p))
                .max()
                .map(|r| r + 1)
                .unwrap_or(0);
            ranks.insert(id, rank);
        }
        ranks
    }

    /// Reorder a row so spouses sit next to each other where possible.
    fn nudge_spouses_adjacent(&self, row: &[Uuid], graph: &FamilyGraph) -> Vec<Uuid> {
        let mut ordered = Vec::with_capacity(row.len());
        for id in row {
            if ordered.contains(id) {
                continue;
            }
            ordered.push(*id);
            for spouse in graph.spouses(*id) {
                if row.contains(spouse) && !ordered.contains(spouse) {
                    ordered.push(*spouse);
                }
            }
        }
        ordered
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}
