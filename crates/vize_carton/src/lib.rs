//! Carton - The artist's toolbox for Vize.
//!
//! This crate provides the foundational utilities shared by Vize crates,
//! much like a carton (artist's portfolio case) holds all the essential tools
//! and materials an artist needs for their work.
//!
//! # Modules
//!
//! - **Collections**: Fast hash maps/sets and compile-time perfect hash sets
//! - **Hashing**: xxHash3 content hashing for cache invalidation

pub mod hash;

// Re-export bitflags for flag types
pub use bitflags::bitflags;

// Re-export rustc-hash for fast hash maps/sets
pub use rustc_hash::{FxHashMap, FxHashSet};

// Re-export phf for compile-time perfect hash functions
pub use phf::{phf_set, Set as PhfSet};
