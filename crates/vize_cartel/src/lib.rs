//! # vize_cartel
//!
//! Cartel - Component meta extraction for Vize.
//!
//! ## Name Origin
//!
//! **Cartel** (/kaʁ.tɛl/) is the French term for the small label hung next to
//! a work in a museum: title, medium, dimensions. `vize_cartel` writes that
//! label for Vue components, describing their props, events, slots and
//! exposed members without rendering them.
//!
//! ## Purpose
//!
//! Given a project of `.vue`/`.ts`/`.tsx`/`.js`/`.jsx` files and a TypeScript
//! type service, this crate answers:
//!
//! - **Exports**: Which component exports a file has
//! - **Props**: Name, type, requiredness, default, global flag, schema
//! - **Events**: Name, payload type, signature, schema
//! - **Slots / Exposed**: Name, type, schema
//!
//! ## Architecture
//!
//! ```text
//! ProjectHost (files, synthesized meta files, version)
//!        ↓
//! TypeServiceProvider → TypeService (per project version)
//!        ↓
//! ComponentMetaChecker → ComponentMeta (lazy, memoized facets)
//!        ↓
//! PropertyMeta / EventMeta / MemberMeta (lazy schema and declarations)
//! ```
//!
//! Default values are read from component syntax (`withDefaults`,
//! `defineProps`, `defineModel`, the `props` option) with `oxc_parser`.

mod checker;
mod component;
mod error;
mod exports;
mod graph;
mod options;
mod schema;
mod service;
mod session;
mod sfc;
mod shape;
mod types;

pub mod defaults;
pub mod project;

pub use checker::{create_checker_from_config, create_checker_from_config_file, ComponentMetaChecker};
pub use component::ComponentMeta;
pub use error::{CartelError, CartelResult};
pub use graph::{SignatureNode, SymbolNode, TypeGraph, TypeNode};
pub use options::{IgnorePredicate, IgnoreRule, MetaCheckerOptions, PrinterOptions, SchemaOptions};
pub use project::{meta_file_name, ConfigSource, ProjectConfig, ProjectHost};
pub use service::{
    DeclarationKind, DeclarationNode, NoSourceMap, SignatureId, SourceMapper, SymbolFlags,
    SymbolId, TypeFlags, TypeId, TypeService, TypeServiceProvider,
};
pub use types::{
    Declaration, DocTag, EventMeta, ExposeMeta, MemberMeta, PropertyMeta, PropertyMetaSchema,
    SlotMeta, TypeClassification,
};
