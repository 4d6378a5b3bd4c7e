//! One-instance-per-kind component ownership

use super::camera::{self, ActivateOnAttach};
use super::{Attachment, ComponentData, ComponentKind};
use crate::core::entity::hierarchy::node_kind;
use crate::core::entity::EntityStore;
use crate::error::{SceneError, SceneResult};
use hecs::Entity;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Per-node table of attached components, keyed by kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentSlot {
    slots: BTreeMap<ComponentKind, Entity>,
}

impl ComponentSlot {
    pub fn get(&self, kind: ComponentKind) -> Option<Entity> {
        self.slots.get(&kind).copied()
    }

    pub fn contains(&self, kind: ComponentKind) -> bool {
        self.slots.contains_key(&kind)
    }

    /// Attached kinds in a stable order
    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.slots.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

fn attachment(store: &EntityStore, component: Entity) -> SceneResult<Attachment> {
    if !store.contains(component) {
        return Err(SceneError::StaleReference(component));
    }
    store
        .get::<Attachment>(component)
        .map(|a| *a)
        .map_err(|_| SceneError::InvalidArgument(format!("{component:?} is not a component")))
}

/// Attach `component` to `owner`.
///
/// Fails with `Conflict` when the owner already has a component of the same
/// kind, or when the component already belongs to a node. Nothing changes on
/// failure.
pub fn attach(store: &mut EntityStore, owner: Entity, component: Entity) -> SceneResult<()> {
    node_kind(store, owner)?;
    let record = attachment(store, component)?;

    if let Some(current) = record.owner {
        return Err(SceneError::Conflict(format!(
            "{} component {component:?} is already owned by {current:?}",
            record.kind
        )));
    }
    let occupied = store
        .get::<ComponentSlot>(owner)
        .map(|slot| slot.contains(record.kind))
        .unwrap_or(false);
    if occupied {
        return Err(SceneError::Conflict(format!(
            "{owner:?} already has a {} component",
            record.kind
        )));
    }

    if let Some(a) = store.get_mut::<Attachment>(component) {
        a.owner = Some(owner);
    }
    match store.get_mut::<ComponentSlot>(owner) {
        Some(slot) => {
            slot.slots.insert(record.kind, component);
        }
        None => {
            let mut slot = ComponentSlot::default();
            slot.slots.insert(record.kind, component);
            let _ = store.insert_one(owner, slot);
        }
    }
    if store.remove_one::<ActivateOnAttach>(component).is_ok() {
        camera::make_current(store, component);
    }
    debug!(owner = ?owner, component = ?component, kind = record.kind.as_str(), "Attached component");
    Ok(())
}

/// The component of `kind` attached to `owner`
pub fn get(store: &EntityStore, owner: Entity, kind: ComponentKind) -> SceneResult<Entity> {
    node_kind(store, owner)?;
    store
        .get::<ComponentSlot>(owner)
        .ok()
        .and_then(|slot| slot.get(kind))
        .ok_or_else(|| SceneError::NotFound(format!("{owner:?} has no {kind} component")))
}

/// Remove the component of `kind` from `owner` and hand it back unowned
pub fn detach(store: &mut EntityStore, owner: Entity, kind: ComponentKind) -> SceneResult<Entity> {
    let component = get(store, owner, kind)?;
    if let Some(slot) = store.get_mut::<ComponentSlot>(owner) {
        slot.slots.remove(&kind);
    }
    if let Some(a) = store.get_mut::<Attachment>(component) {
        a.owner = None;
    }
    debug!(owner = ?owner, component = ?component, kind = kind.as_str(), "Detached component");
    Ok(component)
}

/// Attached kinds of `owner`; empty for anything that is not a live node
pub fn kinds(store: &EntityStore, owner: Entity) -> Vec<ComponentKind> {
    store
        .get::<ComponentSlot>(owner)
        .map(|slot| slot.kinds().collect())
        .unwrap_or_default()
}

/// Live owner of a component
pub fn owner_of(store: &EntityStore, component: Entity) -> Option<Entity> {
    let owner = store.get::<Attachment>(component).ok()?.owner?;
    store.contains(owner).then_some(owner)
}

/// The `T` component attached to `owner`, if any
pub fn find<T: ComponentData>(store: &EntityStore, owner: Entity) -> Option<Entity> {
    store
        .get::<ComponentSlot>(owner)
        .ok()
        .and_then(|slot| slot.get(T::KIND))
}

/// Another component on the same owner as `component`
pub fn sibling(store: &EntityStore, component: Entity, kind: ComponentKind) -> Option<Entity> {
    let owner = owner_of(store, component)?;
    store.get::<ComponentSlot>(owner).ok()?.get(kind)
}

/// Despawn every component attached to `owner`
pub fn destroy_components(store: &mut EntityStore, owner: Entity) {
    let Some(slot) = store.get_mut::<ComponentSlot>(owner) else {
        return;
    };
    let attached: Vec<Entity> = std::mem::take(&mut slot.slots).into_values().collect();
    for component in attached {
        if store.despawn(component).is_err() {
            warn!(owner = ?owner, component = ?component, "Attached component was already gone");
        }
    }
}
