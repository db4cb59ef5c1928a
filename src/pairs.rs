//! Same-side neighbour pairing.
//!
//! Two rectangles that share a complete side form a larger rectangle, and the
//! two halves can be swapped without changing anything else about the tiling.
//! The pair tree keeps such unions as virtual tiles and only accepts the order
//! in which the half holding the smaller tile index comes first (below or to
//! the left). With [`NeighborCheck::Full`] unions keep merging with their own
//! neighbours.
//!
//! This identifies tilings that differ by such swaps, so it shrinks the
//! reported solution set rather than only speeding up the search.

use crate::config::NeighborCheck;
use crate::geometry::Rect;

/// A placed tile or a union of two virtual tiles sharing a full side.
#[derive(Clone, Debug, PartialEq, Eq)]
struct VirtualTile {
    rect: Rect,
    /// Smallest tile index inside the union.
    min_index: usize,
    parent: Option<usize>,
    children: Option<(usize, usize)>,
    /// 0 for a tile, 1 + the deeper child for a union.
    level: u32,
}

/// Arena of virtual tiles with per-placement undo records.
#[derive(Clone, Debug)]
pub struct PairTree {
    mode: NeighborCheck,
    nodes: Vec<Option<VirtualTile>>,
    free: Vec<usize>,
    /// Nodes created by each placement, innermost last.
    undo: Vec<Vec<usize>>,
}

impl PairTree {
    pub fn new(mode: NeighborCheck, capacity: usize) -> Self {
        Self {
            mode,
            nodes: Vec::with_capacity(capacity * 2),
            free: Vec::new(),
            undo: Vec::with_capacity(capacity),
        }
    }

    pub const fn mode(&self) -> NeighborCheck {
        self.mode
    }

    /// Registers a freshly placed tile and merges it with its neighbours.
    ///
    /// Returns `false` (leaving the tree untouched) if a merge would put the
    /// halves in the wrong order.
    pub fn try_attach(&mut self, index: usize, rect: Rect) -> bool {
        let mut created = vec![self.alloc(VirtualTile {
            rect,
            min_index: index,
            parent: None,
            children: None,
            level: 0,
        })];

        if self.mode != NeighborCheck::Off {
            let mut current = created[0];
            while let Some(partner) = self.find_partner(current) {
                let nodes = (&self.nodes[partner], &self.nodes[current]);
                let (partner_node, current_node) = match nodes {
                    (Some(p), Some(c)) => (p.clone(), c.clone()),
                    _ => break,
                };
                if partner_node.min_index > current_node.min_index {
                    for id in created.into_iter().rev() {
                        self.release(id);
                    }
                    return false;
                }

                let merged = self.alloc(VirtualTile {
                    rect: partner_node.rect.union(&current_node.rect),
                    min_index: partner_node.min_index.min(current_node.min_index),
                    parent: None,
                    children: Some((partner, current)),
                    level: partner_node.level.max(current_node.level) + 1,
                });
                self.set_parent(partner, Some(merged));
                self.set_parent(current, Some(merged));
                created.push(merged);
                current = merged;

                if self.mode == NeighborCheck::Pairs {
                    break;
                }
            }
        }

        self.undo.push(created);
        true
    }

    /// Reverts the most recent successful [`PairTree::try_attach`].
    pub fn detach_last(&mut self) {
        if let Some(created) = self.undo.pop() {
            for id in created.into_iter().rev() {
                self.release(id);
            }
        }
    }

    /// Rectangles of the top-level virtual tiles with their smallest index, sorted.
    pub fn roots(&self) -> Vec<(Rect, usize)> {
        let mut roots: Vec<(Rect, usize)> = self
            .nodes
            .iter()
            .flatten()
            .filter(|node| node.parent.is_none())
            .map(|node| (node.rect, node.min_index))
            .collect();
        roots.sort_unstable();
        roots
    }

    /// Top-level virtual tile that `current` rests on or leans on.
    fn find_partner(&self, current: usize) -> Option<usize> {
        let rect = self.nodes[current].as_ref()?.rect;
        self.mergeable_roots(current)
            .find(|(_, other)| rect.rests_on(other))
            .or_else(|| self.mergeable_roots(current).find(|(_, other)| rect.leans_on(other)))
            .map(|(id, _)| id)
    }

    fn mergeable_roots(&self, current: usize) -> impl Iterator<Item = (usize, Rect)> + '_ {
        let pairs_only = self.mode == NeighborCheck::Pairs;
        self.nodes.iter().enumerate().filter_map(move |(id, node)| {
            let node = node.as_ref()?;
            let mergeable = !pairs_only || node.level == 0;
            (id != current && node.parent.is_none() && mergeable).then_some((id, node.rect))
        })
    }

    fn alloc(&mut self, node: VirtualTile) -> usize {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, id: usize) {
        if let Some(node) = self.nodes[id].take() {
            if let Some((a, b)) = node.children {
                self.set_parent(a, None);
                self.set_parent(b, None);
            }
            self.free.push(id);
        }
    }

    fn set_parent(&mut self, id: usize, parent: Option<usize>) {
        if let Some(node) = self.nodes[id].as_mut() {
            node.parent = parent;
        }
    }
}
