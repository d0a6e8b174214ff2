//! Arena-backed scene tree.
//!
//! Nodes are stored in a slab and refer to each other by index. A node's parent
//! is fixed at insertion; removing a node removes its whole subtree, so no index
//! held by a live node can dangle.

use crate::entity::{Entity, EntityId};
use log::warn;
use slab::Slab;

struct Node {
    parent: Option<EntityId>,
    children: Vec<EntityId>,
    entity: Entity,
}

#[derive(Default)]
pub struct Scene {
    nodes: Slab<Node>,
}

impl Scene {
    pub fn new() -> Self {
        Self { nodes: Slab::new() }
    }

    /// Inserts `entity` under `parent`, or at the top level when `parent` is
    /// `None`. A parent that no longer exists also yields a top-level node.
    pub fn insert(&mut self, parent: Option<EntityId>, entity: Entity) -> EntityId {
        let parent = parent.filter(|id| {
            let exists = self.nodes.contains(*id);
            if !exists {
                warn!("Parent entity {} vanished, inserting at top level", id);
            }
            exists
        });

        let id = self.nodes.insert(Node {
            parent,
            children: Vec::new(),
            entity,
        });
        if let Some(parent) = parent {
            self.nodes[parent].children.push(id);
        }
        id
    }

    /// Removes `id` and all of its descendants. Returns the removed ids, the
    /// requested node first.
    pub fn remove(&mut self, id: EntityId) -> Vec<EntityId> {
        if !self.nodes.contains(id) {
            return Vec::new();
        }

        if let Some(parent) = self.nodes[id].parent {
            if let Some(node) = self.nodes.get_mut(parent) {
                node.children.retain(|child| *child != id);
            }
        }

        let mut removed = Vec::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.try_remove(next) {
                pending.extend(node.children);
                removed.push(next);
            }
        }
        removed
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.nodes.contains(id)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.nodes.get(id).map(|node| &node.entity)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.nodes.get_mut(id).map(|node| &mut node.entity)
    }

    pub fn parent(&self, id: EntityId) -> Option<EntityId> {
        self.nodes.get(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: EntityId) -> &[EntityId] {
        self.nodes
            .get(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Advances every entity. Iterates over a snapshot of the ids so the set
    /// can never change underneath the pass.
    pub fn update_all(&mut self, elapsed_ms: f32) {
        let ids: Vec<EntityId> = self.nodes.iter().map(|(id, _)| id).collect();
        for id in ids {
            if let Some(node) = self.nodes.get_mut(id) {
                node.entity.as_updateable_mut().update(elapsed_ms);
            }
        }
    }
}
