//! Attachments carried by scene node entities

use hecs::Entity;
use serde::{Deserialize, Serialize};

/// The two node flavours a scene can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Plain node: no position, acts as the coordinate origin for its children
    Generic,
    /// Node with a 2D transform
    Spatial2D,
}

impl NodeKind {
    pub fn is_spatial(self) -> bool {
        matches!(self, NodeKind::Spatial2D)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::Generic => "Node",
            NodeKind::Spatial2D => "Node2D",
        }
    }
}

/// Marks an entity as a scene node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
}

/// Parent component establishing a parent-child relationship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parent(pub Entity);

/// Ordered child list of a node. Order is processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Children(pub Vec<Entity>);

impl Children {
    pub fn contains(&self, entity: Entity) -> bool {
        self.0.contains(&entity)
    }

    /// Remove `entity` from the list, returning whether it was present
    pub fn remove(&mut self, entity: Entity) -> bool {
        let before = self.0.len();
        self.0.retain(|child| *child != entity);
        self.0.len() != before
    }
}

/// Name component for user-friendly entity identification
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name(pub String);

impl Name {
    /// Create a new name component
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}
