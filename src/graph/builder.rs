//! Derives per-member relationship views from the normalized edge set.
//!
//! The `parents` / `children` / `spouses` arrays a UI works with are never
//! stored — they are recomputed here on every edge-set change so they cannot
//! drift from the authoritative edges.

use std::collections::{HashMap, HashSet};

use tracing::warn;
use uuid::Uuid;

use crate::model::edge::{EdgeKind, RelationshipEdge, SpousePair};
use crate::model::Member;

/// Derived relationship view for one member. Insertion-ordered, no
/// duplicates.
#[derive(Debug, Clone, Default)]
pub struct MemberView {
    pub parents: Vec<Uuid>,
    pub children: Vec<Uuid>,
    pub spouses: Vec<Uuid>,
}

/// A spouse pair plus the members who have both as parents.
#[derive(Debug, Clone)]
pub struct Couple {
    pub pair: SpousePair,
    pub shared_children: Vec<Uuid>,
}

impl Couple {
    /// Only couples with at least one shared child get a marriage junction
    /// in the diagram; a childless couple renders as a direct spouse line.
    pub fn has_junction(&self) -> bool {
        !self.shared_children.is_empty()
    }
}

/// Full derivation output: views for every member plus couple detection.
#[derive(Debug, Clone, Default)]
pub struct FamilyGraph {
    views: HashMap<Uuid, MemberView>,
    couples: Vec<Couple>,
    member_order: Vec<Uuid>,
}

impl FamilyGraph {
    /// Derive all views from scratch. Dangling edges (an endpoint missing
    /// from the member list, e.g. a race with a delete) are skipped, never
    /// an error.
    pub fn derive(members: &[Member], edges: &[RelationshipEdge]) -> Self {
        let known: HashSet<Uuid> = members.iter().map(|m| m.id).collect();
        let member_order: Vec<Uuid> = members.iter().map(|m| m.id).collect();

        let mut views: HashMap<Uuid, MemberView> = member_order
            .iter()
            .map(|id| (*id, MemberView::default()))
            .collect();
        let mut pairs: Vec<SpousePair> = Vec::new();

        for edge in edges {
            if !known.contains(&edge.from) || !known.contains(&edge.to) {
                warn!(from = %edge.from, to = %edge.to, kind = edge.kind.as_str(),
                    "skipping dangling relationship edge");
                continue;
            }
            match edge.kind {
                EdgeKind::Parent => {
                    if let Some(view) = views.get_mut(&edge.from) {
                        push_unique(&mut view.children, edge.to);
                    }
                    if let Some(view) = views.get_mut(&edge.to) {
                        push_unique(&mut view.parents, edge.from);
                    }
                }
                EdgeKind::Spouse => {
                    if let Some(view) = views.get_mut(&edge.from) {
                        push_unique(&mut view.spouses, edge.to);
                    }
                    if let Some(view) = views.get_mut(&edge.to) {
                        push_unique(&mut view.spouses, edge.from);
                    }
                    let pair = SpousePair::new(edge.from, edge.to);
                    if !pairs.contains(&pair) {
                        pairs.push(pair);
                    }
                }
            }
        }

        // Shared children: members whose derived parents contain both halves
        // of the pair, in member order for determinism.
        let couples = pairs
            .into_iter()
            .map(|pair| {
                let shared_children = member_order
                    .iter()
                    .filter(|id| {
                        views
                            .get(id)
                            .map(|v| v.parents.contains(&pair.a()) && v.parents.contains(&pair.b()))
                            .unwrap_or(false)
                    })
                    .copied()
                    .collect();
                Couple {
                    pair,
                    shared_children,
                }
            })
            .collect();

        Self {
            views,
            couples,
            member_order,
        }
    }

    pub fn view(&self, id: Uuid) -> Option<&MemberView> {
        self.views.get(&id)
    }

    pub fn parents(&self, id: Uuid) -> &[Uuid] {
        self.views.get(&id).map(|v| v.parents.as_slice()).unwrap_or(&[])
    }

    pub fn children(&self, id: Uuid) -> &[Uuid] {
        self.views.get(&id).map(|v| v.children.as_slice()).unwrap_or(&[])
    }

    pub fn spouses(&self, id: Uuid) -> &[Uuid] {
        self.views.get(&id).map(|v| v.spouses.as_slice()).unwrap_or(&[])
    }

    /// Every detected couple (spouse pair), with or without shared children.
    pub fn couples(&self) -> &[Couple] {
        &self.couples
    }

    /// Member ids in input order.
    pub fn member_order(&self) -> &[Uuid] {
        &self.member_order
    }

    /// The junction-bearing couple covering a given parent→child edge, if
    /// any: the parent must be in the pair and the child shared by both.
    pub fn covering_couple(&self, parent: Uuid, child: Uuid) -> Option<&Couple> {
        self.couples.iter().find(|c| {
            c.has_junction() && c.pair.contains(parent) && c.shared_children.contains(&child)
        })
    }
}

fn push_unique(list: &mut Vec<Uuid>, id: Uuid) {
    if !list.contains(&id) {
        list.push(id);
    }
}
