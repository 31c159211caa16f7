//! Trash use-case services.
//!
//! # Responsibility
//! - Dispatch lifecycle verbs to the matching entity store by kind.
//! - Coordinate multi-row units (folder cascade, empty trash) in one
//!   transaction.
//! - Aggregate per-kind trash listings into one catalog.
//!
//! # Invariants
//! - Dispatch is an exhaustive `match` over `EntityRef`.
//! - Every entry point requires an explicit, non-blank owner id.

pub mod catalog;
pub mod error;
pub mod purge;
pub mod recovery;
pub mod trash_service;
