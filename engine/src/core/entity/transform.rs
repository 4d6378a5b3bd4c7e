//! Lazy 2D transform propagation.
//!
//! Each spatial node stores a local and a global position. Only one of them is
//! authoritative at a time: writing one marks the other stale, and reading a
//! stale value recomputes it from the parent chain and caches it. Moving a
//! node also marks the cached globals of its spatial descendants stale, so a
//! read never observes a global that disagrees with `local + parent.global`.
//!
//! A node whose parent is missing, stale or not spatial is a coordinate root:
//! its local and global positions coincide.

use super::components::{Children, Parent};
use super::world::EntityStore;
use crate::error::{SceneError, SceneResult};
use glam::Vec2;
use hecs::Entity;
use std::collections::HashSet;
use tracing::{error, trace, warn};

/// Position state of a spatial node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    local: Vec2,
    global: Vec2,
    local_dirty: bool,
    global_dirty: bool,
}

impl Default for Transform2D {
    fn default() -> Self {
        Self::new(Vec2::ZERO)
    }
}

impl Transform2D {
    /// A transform whose local position is authoritative
    pub fn new(local: Vec2) -> Self {
        Self {
            local,
            global: Vec2::ZERO,
            local_dirty: false,
            global_dirty: true,
        }
    }

    pub fn is_local_dirty(&self) -> bool {
        self.local_dirty
    }

    pub fn is_global_dirty(&self) -> bool {
        self.global_dirty
    }
}

fn transform(store: &EntityStore, entity: Entity) -> SceneResult<Transform2D> {
    if !store.contains(entity) {
        return Err(SceneError::StaleReference(entity));
    }
    store
        .get::<Transform2D>(entity)
        .map(|t| *t)
        .map_err(|_| SceneError::InvalidArgument(format!("{entity:?} is not a spatial node")))
}

fn transform_mut(store: &mut EntityStore, entity: Entity) -> SceneResult<&mut Transform2D> {
    if !store.contains(entity) {
        return Err(SceneError::StaleReference(entity));
    }
    store
        .get_mut::<Transform2D>(entity)
        .ok_or_else(|| SceneError::InvalidArgument(format!("{entity:?} is not a spatial node")))
}

/// The parent whose global position this node is relative to, if any
pub fn spatial_parent(store: &EntityStore, entity: Entity) -> Option<Entity> {
    let parent = store.get::<Parent>(entity).ok()?.0;
    if !store.contains(parent) {
        warn!(entity = ?entity, parent = ?parent, "Parent handle is stale, treating node as root");
        return None;
    }
    store.has::<Transform2D>(parent).then_some(parent)
}

fn spatial_children(store: &EntityStore, entity: Entity) -> Vec<Entity> {
    match store.get::<Children>(entity) {
        Ok(children) => children
            .0
            .iter()
            .copied()
            .filter(|child| store.has::<Transform2D>(*child))
            .collect(),
        Err(_) => Vec::new(),
    }
}

/// Resolve the global position, caching it on every stale ancestor on the way
pub fn global_position(store: &mut EntityStore, entity: Entity) -> SceneResult<Vec2> {
    let own = transform(store, entity)?;
    if !own.global_dirty {
        return Ok(own.global);
    }

    // Walk up until an ancestor with a clean global (or a root) is found
    let mut chain = vec![entity];
    let mut visited = HashSet::from([entity]);
    let mut base = Vec2::ZERO;
    let mut cursor = spatial_parent(store, entity);
    while let Some(node) = cursor {
        if !visited.insert(node) {
            error!(entity = ?entity, ancestor = ?node, "Cycle detected in node hierarchy");
            break;
        }
        let Ok(t) = store.get::<Transform2D>(node).map(|t| *t) else {
            break;
        };
        if !t.global_dirty {
            base = t.global;
            break;
        }
        chain.push(node);
        cursor = spatial_parent(store, node);
    }

    // Resolve top-down
    for node in chain.into_iter().rev() {
        if let Some(t) = store.get_mut::<Transform2D>(node) {
            t.global = t.local + base;
            t.global_dirty = false;
            base = t.global;
        }
    }
    Ok(base)
}

/// Resolve the local position, recomputing it from the parent's global if stale
pub fn local_position(store: &mut EntityStore, entity: Entity) -> SceneResult<Vec2> {
    let own = transform(store, entity)?;
    if !own.local_dirty {
        return Ok(own.local);
    }
    let parent_global = match spatial_parent(store, entity) {
        Some(parent) => global_position(store, parent)?,
        None => Vec2::ZERO,
    };
    let t = transform_mut(store, entity)?;
    t.local = t.global - parent_global;
    t.local_dirty = false;
    Ok(t.local)
}

pub fn set_local_position(store: &mut EntityStore, entity: Entity, position: Vec2) -> SceneResult<()> {
    let own = transform(store, entity)?;
    if !own.local_dirty && own.local == position {
        return Ok(());
    }
    settle_pinned_descendants(store, entity)?;

    let t = transform_mut(store, entity)?;
    t.local = position;
    t.local_dirty = false;
    t.global_dirty = true;
    invalidate_descendants(store, entity);
    trace!(entity = ?entity, x = position.x, y = position.y, "Set local position");
    Ok(())
}

pub fn set_global_position(store: &mut EntityStore, entity: Entity, position: Vec2) -> SceneResult<()> {
    let own = transform(store, entity)?;
    if !own.global_dirty && own.global == position {
        return Ok(());
    }
    settle_pinned_descendants(store, entity)?;

    let t = transform_mut(store, entity)?;
    t.global = position;
    t.global_dirty = false;
    t.local_dirty = true;
    invalidate_descendants(store, entity);
    trace!(entity = ?entity, x = position.x, y = position.y, "Set global position");
    Ok(())
}

/// Point `entity` at a new parent (or none).
///
/// A node moving away from a previous parent keeps its global position. A
/// parentless node being attached keeps its local position, so its offset is
/// applied relative to the new parent.
///
/// Only the `Parent` link is written; child lists are the caller's business.
/// Non-spatial nodes just get the link updated.
pub fn reparent(store: &mut EntityStore, entity: Entity, new_parent: Option<Entity>) -> SceneResult<()> {
    if !store.contains(entity) {
        return Err(SceneError::StaleReference(entity));
    }
    let spatial = store.has::<Transform2D>(entity);
    let moving = store.has::<Parent>(entity);
    if spatial {
        if moving {
            global_position(store, entity)?;
        } else {
            local_position(store, entity)?;
            settle_pinned_descendants(store, entity)?;
        }
    }

    match new_parent {
        Some(parent) => store
            .insert_one(entity, Parent(parent))
            .map_err(|_| SceneError::StaleReference(entity))?,
        None => {
            let _ = store.remove_one::<Parent>(entity);
        }
    }

    if spatial {
        let t = transform_mut(store, entity)?;
        if moving {
            t.local_dirty = true;
        } else {
            t.global_dirty = true;
            invalidate_descendants(store, entity);
        }
    }
    Ok(())
}

/// Resolve both positions so neither flag stays set
pub fn settle(store: &mut EntityStore, entity: Entity) -> SceneResult<()> {
    global_position(store, entity)?;
    local_position(store, entity)?;
    Ok(())
}

// Descendants holding an authoritative global must turn it into a local
// against the parent positions from before the move.
fn settle_pinned_descendants(store: &mut EntityStore, entity: Entity) -> SceneResult<()> {
    let mut stack = spatial_children(store, entity);
    while let Some(node) = stack.pop() {
        if transform(store, node)?.local_dirty {
            local_position(store, node)?;
        }
        stack.extend(spatial_children(store, node));
    }
    Ok(())
}

fn invalidate_descendants(store: &mut EntityStore, entity: Entity) {
    let mut stack = spatial_children(store, entity);
    while let Some(node) = stack.pop() {
        if let Some(t) = store.get_mut::<Transform2D>(node) {
            if !t.local_dirty {
                t.global_dirty = true;
            }
        }
        stack.extend(spatial_children(store, node));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::components::NodeKind;
    use crate::core::entity::hierarchy::{add_child, create_node};

    fn spatial(store: &mut EntityStore, x: f32, y: f32) -> Entity {
        let node = create_node(store, NodeKind::Spatial2D);
        set_local_position(store, node, Vec2::new(x, y)).unwrap();
        node
    }

    #[test]
    fn test_root_local_equals_global() {
        let mut store = EntityStore::new();
        let root = spatial(&mut store, 3.0, 4.0);
        assert_eq!(global_position(&mut store, root).unwrap(), Vec2::new(3.0, 4.0));

        set_global_position(&mut store, root, Vec2::new(-1.0, 2.0)).unwrap();
        assert_eq!(local_position(&mut store, root).unwrap(), Vec2::new(-1.0, 2.0));
    }

    #[test]
    fn test_set_local_marks_global_stale() {
        let mut store = EntityStore::new();
        let node = create_node(&mut store, NodeKind::Spatial2D);
        settle(&mut store, node).unwrap();

        set_local_position(&mut store, node, Vec2::new(1.0, 1.0)).unwrap();
        let t = *store.get::<Transform2D>(node).unwrap();
        assert!(t.is_global_dirty());
        assert!(!t.is_local_dirty());

        global_position(&mut store, node).unwrap();
        assert!(!store.get::<Transform2D>(node).unwrap().is_global_dirty());
    }

    #[test]
    fn test_set_global_marks_local_stale() {
        let mut store = EntityStore::new();
        let parent = spatial(&mut store, 10.0, 0.0);
        let child = create_node(&mut store, NodeKind::Spatial2D);
        add_child(&mut store, parent, child).unwrap();

        set_global_position(&mut store, child, Vec2::new(15.0, 5.0)).unwrap();
        let t = *store.get::<Transform2D>(child).unwrap();
        assert!(t.is_local_dirty());
        assert!(!t.is_global_dirty());

        assert_eq!(local_position(&mut store, child).unwrap(), Vec2::new(5.0, 5.0));
    }

    #[test]
    fn test_unchanged_local_is_noop() {
        let mut store = EntityStore::new();
        let node = spatial(&mut store, 1.0, 2.0);
        global_position(&mut store, node).unwrap();

        set_local_position(&mut store, node, Vec2::new(1.0, 2.0)).unwrap();
        assert!(!store.get::<Transform2D>(node).unwrap().is_global_dirty());
    }

    #[test]
    fn test_pinned_child_keeps_global_when_parent_moves_later() {
        let mut store = EntityStore::new();
        let parent = spatial(&mut store, 0.0, 0.0);
        let child = create_node(&mut store, NodeKind::Spatial2D);
        add_child(&mut store, parent, child).unwrap();

        // child pinned at (20, 20) while parent sits at the origin
        set_global_position(&mut store, child, Vec2::new(20.0, 20.0)).unwrap();
        set_local_position(&mut store, parent, Vec2::new(5.0, 0.0)).unwrap();

        assert_eq!(local_position(&mut store, child).unwrap(), Vec2::new(20.0, 20.0));
        assert_eq!(global_position(&mut store, child).unwrap(), Vec2::new(25.0, 20.0));
    }

    #[test]
    fn test_generic_parent_is_origin() {
        let mut store = EntityStore::new();
        let group = create_node(&mut store, NodeKind::Generic);
        let child = spatial(&mut store, 7.0, 8.0);
        add_child(&mut store, group, child).unwrap();

        assert_eq!(spatial_parent(&store, child), None);
        assert_eq!(global_position(&mut store, child).unwrap(), Vec2::new(7.0, 8.0));
    }

    #[test]
    fn test_stale_parent_falls_back_to_local() {
        let mut store = EntityStore::new();
        let parent = spatial(&mut store, 100.0, 100.0);
        let child = create_node(&mut store, NodeKind::Spatial2D);
        add_child(&mut store, parent, child).unwrap();
        set_local_position(&mut store, child, Vec2::new(1.0, 1.0)).unwrap();
        store.despawn(parent).unwrap();

        assert_eq!(global_position(&mut store, child).unwrap(), Vec2::new(1.0, 1.0));
    }

    #[test]
    fn test_errors_for_non_spatial_and_stale() {
        let mut store = EntityStore::new();
        let generic = create_node(&mut store, NodeKind::Generic);
        assert!(matches!(
            global_position(&mut store, generic),
            Err(SceneError::InvalidArgument(_))
        ));

        let gone = spatial(&mut store, 0.0, 0.0);
        store.despawn(gone).unwrap();
        assert!(matches!(
            set_local_position(&mut store, gone, Vec2::ONE),
            Err(SceneError::StaleReference(_))
        ));
    }

    #[test]
    fn test_first_attach_keeps_local_offset() {
        let mut store = EntityStore::new();
        let parent = spatial(&mut store, 10.0, 0.0);
        let child = spatial(&mut store, 1.0, 1.0);
        let grandchild = spatial(&mut store, 2.0, 0.0);
        add_child(&mut store, child, grandchild).unwrap();
        assert_eq!(global_position(&mut store, grandchild).unwrap(), Vec2::new(3.0, 1.0));

        add_child(&mut store, parent, child).unwrap();
        assert!(store.get::<Transform2D>(child).unwrap().is_global_dirty());
        assert_eq!(local_position(&mut store, child).unwrap(), Vec2::new(1.0, 1.0));
        assert_eq!(global_position(&mut store, child).unwrap(), Vec2::new(11.0, 1.0));
        assert_eq!(global_position(&mut store, grandchild).unwrap(), Vec2::new(13.0, 1.0));
    }

    #[test]
    fn test_reparent_preserves_global() {
        let mut store = EntityStore::new();
        let a = spatial(&mut store, 10.0, 0.0);
        let b = spatial(&mut store, 0.0, 50.0);
        let child = spatial(&mut store, 1.0, 1.0);
        add_child(&mut store, a, child).unwrap();
        assert_eq!(global_position(&mut store, child).unwrap(), Vec2::new(11.0, 1.0));

        reparent(&mut store, child, Some(b)).unwrap();
        assert!(store.get::<Transform2D>(child).unwrap().is_local_dirty());
        assert_eq!(global_position(&mut store, child).unwrap(), Vec2::new(11.0, 1.0));
        assert_eq!(local_position(&mut store, child).unwrap(), Vec2::new(11.0, -49.0));
    }
}
