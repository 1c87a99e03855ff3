//! Fabula Core Types and Definitions
//!
//! This crate provides the foundational types for the Fabula authoring
//! model. It includes:
//!
//! - **Identifiers**: 64-bit entity identifiers and the allocator that
//!   mints and reclaims them ([`identifier`] module)
//! - **Geometry**: Basic geometric types in pixel space ([`geometry`]
//!   module)

pub mod geometry;
pub mod identifier;
