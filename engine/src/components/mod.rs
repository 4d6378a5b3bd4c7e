//! Components attachable to scene nodes.
//!
//! Every component instance lives on its own entity carrying an
//! [`Attachment`] plus exactly one payload type. A node owns at most one
//! component per [`ComponentKind`]; see [`slot`].

pub mod animation;
pub mod camera;
pub mod input;
pub mod script;
pub mod slot;
pub mod sprite;

use crate::core::entity::EntityStore;
use hecs::Entity;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

pub use animation::{Animation, AnimationFrame};
pub use camera::Camera;
pub use input::{ActionBinding, InputMap};
pub use script::ScriptSet;
pub use slot::ComponentSlot;
pub use sprite::Sprite;

/// The closed set of component kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    Sprite,
    Input,
    Script,
    Camera,
    Animation,
}

impl ComponentKind {
    pub const ALL: [ComponentKind; 5] = [
        ComponentKind::Sprite,
        ComponentKind::Input,
        ComponentKind::Script,
        ComponentKind::Camera,
        ComponentKind::Animation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ComponentKind::Sprite => "Sprite",
            ComponentKind::Input => "Input",
            ComponentKind::Script => "Script",
            ComponentKind::Camera => "Camera",
            ComponentKind::Animation => "Animation",
        }
    }

    /// Parse a kind name, ignoring case
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ownership record carried by every component entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attachment {
    pub kind: ComponentKind,
    pub owner: Option<Entity>,
}

/// Payload types with a fixed kind
pub trait ComponentData: hecs::Component {
    const KIND: ComponentKind;
}

impl ComponentData for Sprite {
    const KIND: ComponentKind = ComponentKind::Sprite;
}

impl ComponentData for InputMap {
    const KIND: ComponentKind = ComponentKind::Input;
}

impl ComponentData for ScriptSet {
    const KIND: ComponentKind = ComponentKind::Script;
}

impl ComponentData for Camera {
    const KIND: ComponentKind = ComponentKind::Camera;
}

impl ComponentData for Animation {
    const KIND: ComponentKind = ComponentKind::Animation;
}

/// A component payload before it is spawned
#[derive(Debug)]
pub enum Component {
    Sprite(Sprite),
    Input(InputMap),
    Script(ScriptSet),
    Camera(Camera),
    Animation(Animation),
}

impl Component {
    pub fn kind(&self) -> ComponentKind {
        match self {
            Component::Sprite(_) => ComponentKind::Sprite,
            Component::Input(_) => ComponentKind::Input,
            Component::Script(_) => ComponentKind::Script,
            Component::Camera(_) => ComponentKind::Camera,
            Component::Animation(_) => ComponentKind::Animation,
        }
    }
}

/// Spawn an unowned component entity.
///
/// A camera spawned as current does not take over until it is attached.
pub fn spawn_component(store: &mut EntityStore, component: Component) -> Entity {
    let kind = component.kind();
    let attachment = Attachment { kind, owner: None };
    let entity = match component {
        Component::Sprite(sprite) => store.spawn((attachment, sprite)),
        Component::Input(input) => store.spawn((attachment, input)),
        Component::Script(scripts) => store.spawn((attachment, scripts)),
        Component::Camera(mut camera) => {
            if camera.take_current() {
                store.spawn((attachment, camera, camera::ActivateOnAttach))
            } else {
                store.spawn((attachment, camera))
            }
        }
        Component::Animation(animation) => store.spawn((attachment, animation)),
    };
    debug!(entity = ?entity, kind = kind.as_str(), "Spawned component");
    entity
}

/// Kind of a live component entity
pub fn component_kind(store: &EntityStore, entity: Entity) -> Option<ComponentKind> {
    store.get::<Attachment>(entity).ok().map(|a| a.kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse() {
        assert_eq!(ComponentKind::parse("camera"), Some(ComponentKind::Camera));
        assert_eq!(ComponentKind::parse("Sprite"), Some(ComponentKind::Sprite));
        assert_eq!(ComponentKind::parse("rigidbody"), None);
        assert_eq!(ComponentKind::Animation.to_string(), "Animation");
    }

    #[test]
    fn test_spawn_component_is_unowned() {
        let mut store = EntityStore::new();
        let entity = spawn_component(&mut store, Component::Sprite(Sprite::new("hero.png")));

        let attachment = *store.get::<Attachment>(entity).unwrap();
        assert_eq!(attachment.kind, ComponentKind::Sprite);
        assert_eq!(attachment.owner, None);
        assert!(store.has::<Sprite>(entity));
        assert_eq!(component_kind(&store, entity), Some(ComponentKind::Sprite));
    }

    #[test]
    fn test_current_camera_activates_on_attach() {
        use crate::core::entity::{create_node, NodeKind};

        let mut store = EntityStore::new();
        let node = create_node(&mut store, NodeKind::Spatial2D);
        let first = spawn_component(&mut store, Component::Camera(Camera::new(true)));
        slot::attach(&mut store, node, first).unwrap();
        assert_eq!(camera::current_camera(&store), Some(first));

        let second = spawn_component(&mut store, Component::Camera(Camera::new(true)));
        assert_eq!(camera::current_camera(&store), Some(first));
        assert!(camera::is_current_or_pending(&store, second));

        assert!(slot::attach(&mut store, node, second).is_err());
        assert_eq!(camera::current_camera(&store), Some(first));
        assert!(store.has::<camera::ActivateOnAttach>(second));
    }
}
