//! Entity store wrapping hecs::World, plus the shared handle scripts use

use hecs::Entity;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::trace;

/// Wrapper around hecs::World providing helper methods for scene entities
pub struct EntityStore {
    inner: hecs::World,
}

impl Default for EntityStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self {
            inner: hecs::World::new(),
        }
    }

    /// Spawn a new entity with the given attachments
    pub fn spawn(&mut self, components: impl hecs::DynamicBundle) -> Entity {
        self.inner.spawn(components)
    }

    /// Get a reference to an attachment on an entity
    pub fn get<T: hecs::Component>(
        &self,
        entity: Entity,
    ) -> Result<hecs::Ref<'_, T>, hecs::ComponentError> {
        self.inner.get::<&T>(entity)
    }

    /// Get a mutable reference to an attachment on an entity
    pub fn get_mut<T: hecs::Component>(&mut self, entity: Entity) -> Option<&mut T> {
        self.inner.query_one_mut::<&mut T>(entity).ok()
    }

    /// Insert an attachment into an entity, replacing one of the same type
    pub fn insert_one(
        &mut self,
        entity: Entity,
        component: impl hecs::Component,
    ) -> Result<(), hecs::NoSuchEntity> {
        self.inner.insert_one(entity, component)
    }

    /// Remove and return an attachment
    pub fn remove_one<T: hecs::Component>(
        &mut self,
        entity: Entity,
    ) -> Result<T, hecs::ComponentError> {
        self.inner.remove_one::<T>(entity)
    }

    /// Whether the entity is live and carries a `T`
    pub fn has<T: hecs::Component>(&self, entity: Entity) -> bool {
        self.inner
            .entity(entity)
            .map(|entity_ref| entity_ref.has::<T>())
            .unwrap_or(false)
    }

    /// Query entities with specific attachments
    pub fn query<Q: hecs::Query>(&self) -> hecs::QueryBorrow<'_, Q> {
        self.inner.query()
    }

    /// Query entities with specific attachments (mutable)
    pub fn query_mut<Q: hecs::Query>(&mut self) -> hecs::QueryMut<'_, Q> {
        self.inner.query_mut()
    }

    /// Despawn an entity and all its attachments
    pub fn despawn(&mut self, entity: Entity) -> Result<(), hecs::NoSuchEntity> {
        trace!(entity = ?entity, "Despawning entity");
        self.inner.despawn(entity)
    }

    /// Check if an entity exists
    pub fn contains(&self, entity: Entity) -> bool {
        self.inner.contains(entity)
    }

    /// Number of live entities
    pub fn len(&self) -> u32 {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

/// Store handle shared between the frame loop and script bindings.
///
/// Locks recover from poisoning: a panicking script binding must not take the
/// whole scene down with it.
#[derive(Clone, Default)]
pub struct SharedStore(Arc<RwLock<EntityStore>>);

impl SharedStore {
    pub fn new(store: EntityStore) -> Self {
        Self(Arc::new(RwLock::new(store)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, EntityStore> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, EntityStore> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Pack an entity into the integer form handed to scripts
pub fn entity_to_id(entity: Entity) -> i64 {
    entity.to_bits().get() as i64
}

/// Inverse of [`entity_to_id`]; `None` for values no entity can have
pub fn entity_from_id(id: i64) -> Option<Entity> {
    Entity::from_bits(id as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::entity::components::{Name, Node, NodeKind, Parent};

    #[test]
    fn test_store_spawn() {
        let mut store = EntityStore::new();
        let entity = store.spawn((Node {
            kind: NodeKind::Generic,
        },));
        assert!(store.contains(entity));
        assert!(store.has::<Node>(entity));
        assert!(!store.has::<Parent>(entity));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_despawn_removes_attachments() {
        let mut store = EntityStore::new();
        let entity = store.spawn((Name::new("gone"),));
        store.despawn(entity).unwrap();

        assert!(!store.contains(entity));
        assert!(store.get::<Name>(entity).is_err());
        assert!(!store.has::<Name>(entity));
        assert!(store.despawn(entity).is_err());
    }

    #[test]
    fn test_recycled_handle_is_not_live() {
        let mut store = EntityStore::new();
        let first = store.spawn((Name::new("first"),));
        store.despawn(first).unwrap();
        let second = store.spawn((Name::new("second"),));

        assert!(!store.contains(first));
        assert!(store.contains(second));
        assert_ne!(first, second);
    }

    #[test]
    fn test_get_mut_and_remove_one() {
        let mut store = EntityStore::new();
        let entity = store.spawn((Name::new("a"),));

        store.get_mut::<Name>(entity).unwrap().0.push('b');
        assert_eq!(store.get::<Name>(entity).unwrap().0, "ab");

        let removed = store.remove_one::<Name>(entity).unwrap();
        assert_eq!(removed.0, "ab");
        assert!(store.get_mut::<Name>(entity).is_none());
    }

    #[test]
    fn test_entity_id_round_trip() {
        let mut store = EntityStore::new();
        let entity = store.spawn(());
        assert_eq!(entity_from_id(entity_to_id(entity)), Some(entity));
        assert_eq!(entity_from_id(0), None);
    }

    #[test]
    fn test_shared_store_clones_share_state() {
        let shared = SharedStore::default();
        let other = shared.clone();
        let entity = shared.write().spawn((Name::new("shared"),));

        assert!(other.read().contains(entity));
        other.write().despawn(entity).unwrap();
        assert!(!shared.read().contains(entity));
    }
}
