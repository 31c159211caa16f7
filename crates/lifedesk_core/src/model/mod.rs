//! Domain model for trash-aware entities.
//!
//! # Responsibility
//! - Define the four entity kinds and the tagged reference used for dispatch.
//! - Define the per-kind read models and the shared lifecycle fields.
//! - Define the polymorphic trash listing record.
//!
//! # Invariants
//! - Every entity carries an owner id; no model exists without one.
//! - `deleted_at` is present iff `is_deleted` is true.

pub mod entity;
pub mod records;
pub mod trash;
