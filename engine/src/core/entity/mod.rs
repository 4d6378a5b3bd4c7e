//! Entity store and scene node structure
//!
//! Nodes and components are both hecs entities. Node entities carry the
//! attachments in [`components`], spatial ones also a [`Transform2D`].

pub mod components;
pub mod hierarchy;
pub mod transform;
pub mod world;

// Re-export commonly used types
pub use components::{Children, Name, Node, NodeKind, Parent};
pub use hierarchy::{add_child, create_node, destroy_node, detach_from_parent};
pub use transform::Transform2D;
pub use world::{entity_from_id, entity_to_id, EntityStore, SharedStore};

// Re-export hecs types that users will need
pub use hecs::Entity;
