//! UI-ready diagram model: member nodes, synthetic marriage junctions, and
//! visual edges tagged with the stored edges they represent.
//!
//! Node identity is a tagged union — a junction is `NodeKey::Marriage(a, b)`
//! with a sorted pair, so no string parsing is ever needed to recover what a
//! node means.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::builder::FamilyGraph;
use super::layout::LayoutEngine;
use crate::model::edge::{RelationshipEdge, SpousePair};
use crate::model::{Member, Position};

/// Identity of a diagram node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NodeKey {
    Person(Uuid),
    /// Sorted spouse pair; use [`NodeKey::marriage`] to construct.
    Marriage(Uuid, Uuid),
}

impl NodeKey {
    pub fn marriage(x: Uuid, y: Uuid) -> Self {
        let pair = SpousePair::new(x, y);
        NodeKey::Marriage(pair.a(), pair.b())
    }

    pub fn is_junction(&self) -> bool {
        matches!(self, NodeKey::Marriage(_, _))
    }
}

impl From<SpousePair> for NodeKey {
    fn from(pair: SpousePair) -> Self {
        NodeKey::Marriage(pair.a(), pair.b())
    }
}

/// Payload of a diagram node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DiagramNodeKind {
    Person(Member),
    /// Junction dot for a couple with shared children.
    Marriage { spouses: (Uuid, Uuid) },
}

/// A positioned node in the diagram.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramNode {
    pub key: NodeKey,
    pub kind: DiagramNodeKind,
    pub position: Position,
    pub width: f32,
    pub height: f32,
}

/// Semantic kind of a visual edge.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VisualEdgeKind {
    /// Direct parent→child line (co-parent not a spouse, or no co-parent).
    ParentSingle,
    /// Junction→child line collapsing two parent edges, one per spouse.
    MarriageChild,
    /// Spouse→junction half-link; the pair of halves draws the couple line
    /// through the dot.
    SpouseHalf,
    /// Direct spouse line for a couple without shared children.
    SpouseDirect,
}

/// A renderable edge plus the stored edges it represents. Deleting a visual
/// edge means deleting every underlying stored edge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisualEdge {
    pub source: NodeKey,
    pub target: NodeKey,
    pub kind: VisualEdgeKind,
    pub underlying: Vec<RelationshipEdge>,
}

/// The derived `{nodes, edges}` model handed to the rendering collaborator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TreeDiagram {
    pub nodes: Vec<DiagramNode>,
    pub edges: Vec<VisualEdge>,
}

impl TreeDiagram {
    pub fn get_node(&self, key: NodeKey) -> Option<&DiagramNode> {
        self.nodes.iter().find(|n| n.key == key)
    }

    pub fn has_node(&self, key: NodeKey) -> bool {
        self.nodes.iter().any(|n| n.key == key)
    }

    pub fn edges_of_kind(&self, kind: VisualEdgeKind) -> Vec<&VisualEdge> {
        self.edges.iter().filter(|e| e.kind == kind).collect()
    }
}

/// Assemble the diagram: lay out member nodes, synthesize junctions for
/// couples with shared children, and emit visual edges with their
/// underlying stored-edge references.
pub fn build_diagram(
    members: &[Member],
    graph: &FamilyGraph,
    engine: &LayoutEngine,
) -> TreeDiagram {
    let positions = engine.layout(members, graph);
    let config = engine.config();
    let mut diagram = TreeDiagram::default();

    for member in members {
        let position = positions.get(&member.id).copied().unwrap_or_default();
        diagram.nodes.push(DiagramNode {
            key: NodeKey::Person(member.id),
            kind: DiagramNodeKind::Person(member.clone()),
            position,
            width: config.node_width,
            height: config.node_height,
        });
    }

    for couple in graph.couples() {
        let (a, b) = (couple.pair.a(), couple.pair.b());
        if !couple.has_junction() {
            // Childless couple: plain spouse line, no junction node.
            diagram.edges.push(VisualEdge {
                source: NodeKey::Person(a),
                target: NodeKey::Person(b),
                kind: VisualEdgeKind::SpouseDirect,
                underlying: vec![RelationshipEdge::spouse(a, b)],
            });
            continue;
        }

        let junction = NodeKey::from(couple.pair);
        let (pos_a, pos_b) = match (positions.get(&a), positions.get(&b)) {
            (Some(pa), Some(pb)) => (*pa, *pb),
            // Couple referencing a missing member: skip the junction.
            _ => continue,
        };
        diagram.nodes.push(DiagramNode {
            key: junction,
            kind: DiagramNodeKind::Marriage { spouses: (a, b) },
            position: engine.junction_position(pos_a, pos_b),
            width: config.junction_size,
            height: config.junction_size,
        });

        // Both halves of the couple line carry the same stored spouse edge:
        // deleting either half deletes the marriage link.
        for spouse in [a, b] {
            diagram.edges.push(VisualEdge {
                source: NodeKey::Person(spouse),
                target: junction,
                kind: VisualEdgeKind::SpouseHalf,
                underlying: vec![RelationshipEdge::spouse(a, b)],
            });
        }

        for child in &couple.shared_children {
            diagram.edges.push(VisualEdge {
                source: junction,
                target: NodeKey::Person(*child),
                kind: VisualEdgeKind::MarriageChild,
                underlying: vec![
                    RelationshipEdge::parent(a, *child),
                    RelationshipEdge::parent(b, *child),
                ],
            });
        }
    }

    // Parent edges not collapsed into a junction render as direct lines.
    for member in members {
        for child in graph.children(member.id) {
            if graph.covering_couple(member.id, *child).is_some() {
                continue;
            }
            diagram.edges.push(VisualEdge {
                source: NodeKey::Person(member.id),
                target: NodeKey::Person(*child),
                kind: VisualEdgeKind::ParentSingle,
                underlying: vec![RelationshipEdge::parent(member.id, *child)],
            });
        }
    }

    diagram
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::edge::EdgeKind;

    fn members(n: usize) -> Vec<Member> {
        (0..n)
            .map(|i| Member::new(format!("P{i}"), "Test"))
            .collect()
    }

    fn diagram_for(m: &[Member], edges: &[RelationshipEdge]) -> TreeDiagram {
        let graph = FamilyGraph::derive(m, edges);
        build_diagram(m, &graph, &LayoutEngine::new())
    }

    #[test]
    fn junction_synthesized_only_with_shared_child() {
        let m = members(3);
        let spouse = RelationshipEdge::spouse(m[0].id, m[1].id);
        let key = NodeKey::marriage(m[0].id, m[1].id);

        // No shared child yet: direct spouse line, no junction node.
        let diagram = diagram_for(&m, &[spouse]);
        assert!(!diagram.has_node(key));
        assert_eq!(diagram.edges_of_kind(VisualEdgeKind::SpouseDirect).len(), 1);

        // With a shared child: junction node plus collapsed child edge.
        let diagram = diagram_for(
            &m,
            &[
                spouse,
                RelationshipEdge::parent(m[0].id, m[2].id),
                RelationshipEdge::parent(m[1].id, m[2].id),
            ],
        );
        assert!(diagram.has_node(key));
        assert_eq!(diagram.edges_of_kind(VisualEdgeKind::SpouseHalf).len(), 2);
        assert_eq!(diagram.edges_of_kind(VisualEdgeKind::MarriageChild).len(), 1);
        // The collapsed edges replace the two direct parent lines.
        assert!(diagram.edges_of_kind(VisualEdgeKind::ParentSingle).is_empty());
    }

    #[test]
    fn collapsed_child_edge_references_two_parent_edges() {
        let m = members(3);
        let diagram = diagram_for(
            &m,
            &[
                RelationshipEdge::spouse(m[0].id, m[1].id),
                RelationshipEdge::parent(m[0].id, m[2].id),
                RelationshipEdge::parent(m[1].id, m[2].id),
            ],
        );

        let collapsed = diagram.edges_of_kind(VisualEdgeKind::MarriageChild);
        assert_eq!(collapsed.len(), 1);
        let underlying = &collapsed[0].underlying;
        assert_eq!(underlying.len(), 2);
        assert!(underlying.iter().all(|e| e.kind == EdgeKind::Parent));
        assert!(underlying.iter().all(|e| e.to == m[2].id));
    }

    #[test]
    fn removing_last_shared_child_keeps_spouse_link() {
        let m = members(2);
        let diagram = diagram_for(&m, &[RelationshipEdge::spouse(m[0].id, m[1].id)]);

        assert!(!diagram.has_node(NodeKey::marriage(m[0].id, m[1].id)));
        let direct = diagram.edges_of_kind(VisualEdgeKind::SpouseDirect);
        assert_eq!(direct.len(), 1);
        assert_eq!(direct[0].underlying[0].kind, EdgeKind::Spouse);
    }

    #[test]
    fn non_spouse_co_parent_renders_direct_line() {
        let m = members(4);
        let diagram = diagram_for(
            &m,
            &[
                RelationshipEdge::spouse(m[0].id, m[1].id),
                RelationshipEdge::parent(m[0].id, m[3].id),
                RelationshipEdge::parent(m[1].id, m[3].id),
                RelationshipEdge::parent(m[2].id, m[3].id),
            ],
        );

        assert_eq!(diagram.edges_of_kind(VisualEdgeKind::MarriageChild).len(), 1);
        let singles = diagram.edges_of_kind(VisualEdgeKind::ParentSingle);
        assert_eq!(singles.len(), 1);
        assert_eq!(singles[0].source, NodeKey::Person(m[2].id));
    }

    #[test]
    fn junction_position_derived_from_spouses() {
        let mut m = members(3);
        m[0].position = Some(Position::new(0.0, 0.0));
        m[1].position = Some(Position::new(400.0, 0.0));

        let diagram = diagram_for(
            &m,
            &[
                RelationshipEdge::spouse(m[0].id, m[1].id),
                RelationshipEdge::parent(m[0].id, m[2].id),
                RelationshipEdge::parent(m[1].id, m[2].id),
            ],
        );

        let junction = diagram
            .get_node(NodeKey::marriage(m[0].id, m[1].id))
            .expect("junction node");
        // Midpoint x of the two boxes, independent of which spouse is left.
        let engine = LayoutEngine::new();
        let expected =
            engine.junction_position(Position::new(0.0, 0.0), Position::new(400.0, 0.0));
        assert_eq!(junction.position, expected);
    }

    #[test]
    fn co_parents_without_spouse_edge_get_no_junction() {
        let m = members(3);
        let diagram = diagram_for(
            &m,
            &[
                RelationshipEdge::parent(m[0].id, m[2].id),
                RelationshipEdge::parent(m[1].id, m[2].id),
            ],
        );

        assert!(diagram.edges_of_kind(VisualEdgeKind::MarriageChild).is_empty());
        assert_eq!(diagram.edges_of_kind(VisualEdgeKind::ParentSingle).len(), 2);
    }
}
