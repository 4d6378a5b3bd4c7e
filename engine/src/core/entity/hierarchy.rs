//! Structural scene graph operations: creating nodes, linking children,
//! detaching and destroying subtrees.

use super::components::{Children, Node, NodeKind, Parent};
use super::transform::{reparent, Transform2D};
use super::world::EntityStore;
use crate::components::slot::{self, ComponentSlot};
use crate::error::{SceneError, SceneResult};
use hecs::Entity;
use std::collections::HashSet;
use tracing::{debug, error};

/// Spawn a detached node of the given kind
pub fn create_node(store: &mut EntityStore, kind: NodeKind) -> Entity {
    let entity = store.spawn((Node { kind }, Children::default(), ComponentSlot::default()));
    if kind.is_spatial() {
        let _ = store.insert_one(entity, Transform2D::default());
    }
    debug!(entity = ?entity, kind = kind.as_str(), "Created node");
    entity
}

/// Kind of a live node
pub fn node_kind(store: &EntityStore, entity: Entity) -> SceneResult<NodeKind> {
    if !store.contains(entity) {
        return Err(SceneError::StaleReference(entity));
    }
    store
        .get::<Node>(entity)
        .map(|node| node.kind)
        .map_err(|_| SceneError::InvalidArgument(format!("{entity:?} is not a scene node")))
}

pub fn parent_of(store: &EntityStore, entity: Entity) -> Option<Entity> {
    store.get::<Parent>(entity).ok().map(|parent| parent.0)
}

/// Children in processing order; empty for unknown entities
pub fn children_of(store: &EntityStore, entity: Entity) -> Vec<Entity> {
    store
        .get::<Children>(entity)
        .map(|children| children.0.clone())
        .unwrap_or_default()
}

/// Whether `ancestor` appears on the parent chain of `node` (or is `node`)
pub fn is_ancestor(store: &EntityStore, ancestor: Entity, node: Entity) -> bool {
    let mut visited = HashSet::new();
    let mut cursor = Some(node);
    while let Some(current) = cursor {
        if current == ancestor {
            return true;
        }
        if !visited.insert(current) {
            error!(entity = ?node, "Cycle detected in node hierarchy");
            return false;
        }
        cursor = parent_of(store, current);
    }
    false
}

/// Make `child` the last child of `parent`.
///
/// A child that already belongs to another parent is detached from it first
/// and keeps its global position. A parentless child keeps its local position.
pub fn add_child(store: &mut EntityStore, parent: Entity, child: Entity) -> SceneResult<()> {
    if parent == child {
        return Err(SceneError::InvalidArgument(format!(
            "{parent:?} cannot be its own child"
        )));
    }
    node_kind(store, parent)?;
    node_kind(store, child)?;

    if store
        .get::<Children>(parent)
        .map(|children| children.contains(child))
        .unwrap_or(false)
    {
        return Err(SceneError::Conflict(format!(
            "{child:?} is already a child of {parent:?}"
        )));
    }
    if is_ancestor(store, child, parent) {
        return Err(SceneError::InvalidArgument(format!(
            "adding {child:?} under {parent:?} would create a cycle"
        )));
    }

    unlink_from_parent(store, child);
    reparent(store, child, Some(parent))?;
    match store.get_mut::<Children>(parent) {
        Some(children) => children.0.push(child),
        None => {
            let _ = store.insert_one(parent, Children(vec![child]));
        }
    }
    debug!(parent = ?parent, child = ?child, "Added child");
    Ok(())
}

/// Turn `child` into a root, returning its former parent
pub fn detach_from_parent(store: &mut EntityStore, child: Entity) -> SceneResult<Option<Entity>> {
    node_kind(store, child)?;
    let old = unlink_from_parent(store, child);
    if old.is_some() {
        reparent(store, child, None)?;
    }
    Ok(old)
}

fn unlink_from_parent(store: &mut EntityStore, child: Entity) -> Option<Entity> {
    let old = parent_of(store, child)?;
    if let Some(children) = store.get_mut::<Children>(old) {
        children.remove(child);
    }
    Some(old)
}

/// Destroy a node, its descendants and every component attached to them
pub fn destroy_node(store: &mut EntityStore, entity: Entity) -> SceneResult<()> {
    node_kind(store, entity)?;
    unlink_from_parent(store, entity);

    let mut stack = vec![entity];
    let mut doomed = Vec::new();
    while let Some(node) = stack.pop() {
        stack.extend(children_of(store, node));
        doomed.push(node);
    }

    for node in doomed {
        slot::destroy_components(store, node);
        let _ = store.despawn(node);
    }
    debug!(entity = ?entity, "Destroyed node");
    Ok(())
}

/// Check parent links against child lists, logging every mismatch.
///
/// Returns the number of problems found.
pub fn validate_hierarchy(store: &EntityStore) -> usize {
    let mut problems = 0;

    for (entity, parent) in store.query::<&Parent>().iter() {
        if !store.contains(parent.0) {
            error!(entity = ?entity, parent = ?parent.0, "Parent handle is stale");
            problems += 1;
            continue;
        }
        let listed = store
            .get::<Children>(parent.0)
            .map(|children| children.contains(entity))
            .unwrap_or(false);
        if !listed {
            error!(entity = ?entity, parent = ?parent.0, "Child missing from parent's child list");
            problems += 1;
        }
    }

    for (entity, children) in store.query::<&Children>().iter() {
        for child in &children.0 {
            if parent_of(store, *child) != Some(entity) {
                error!(entity = ?entity, child = ?child, "Listed child points at a different parent");
                problems += 1;
            }
        }
    }

    problems
}
