//! Core scene data: entity store, node hierarchy and transforms

pub mod entity;
