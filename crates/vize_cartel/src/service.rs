//! Interfaces to the external collaborators of the engine.
//!
//! Cartel never builds a type graph itself. It queries a [`TypeService`]
//! (a TypeScript checker session such as tsgo, or a recorded [`crate::TypeGraph`])
//! through opaque handles, and optionally translates declaration locations
//! with a [`SourceMapper`].

use std::rc::Rc;

use serde::{Deserialize, Serialize};
use vize_carton::bitflags;

use crate::project::ProjectHost;
use crate::types::DocTag;

/// Handle of a type owned by the type service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeId(u32);

impl TypeId {
    /// Create a new type ID
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// Handle of a symbol owned by the type service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolId(u32);

impl SymbolId {
    /// Create a new symbol ID
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

/// Handle of a call or construct signature owned by the type service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignatureId(u32);

impl SignatureId {
    /// Create a new signature ID
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index
    #[inline]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

bitflags! {
    /// Structural classification of a type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct TypeFlags: u32 {
        /// `any`
        const ANY = 1 << 0;
        /// String literal type (`'click'`)
        const STRING_LITERAL = 1 << 1;
        /// Number literal type (`1`)
        const NUMBER_LITERAL = 1 << 2;
        /// `A | B`
        const UNION = 1 << 3;
        /// `A & B`
        const INTERSECTION = 1 << 4;
        /// Object type of any sort
        const OBJECT = 1 << 5;
        /// Class or interface declaration
        const CLASS_OR_INTERFACE = 1 << 6;
        /// Anonymous object type (type literal, object literal)
        const ANONYMOUS = 1 << 7;
    }
}

bitflags! {
    /// Symbol properties the engine cares about.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct SymbolFlags: u32 {
        /// Declared with `?`
        const OPTIONAL = 1 << 0;
        /// Property member
        const PROPERTY = 1 << 1;
        /// Method member
        const METHOD = 1 << 2;
    }
}

/// Syntactic shape of a declaration, as far as the engine needs to know it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DeclarationKind {
    /// `name: <initializer>` inside an object literal.
    PropertyAssignment {
        /// Source text of the initializer expression.
        initializer: String,
    },
    /// `name: T` inside an interface or type literal.
    PropertySignature,
    /// Function parameter.
    Parameter {
        /// Declared with `...`
        #[serde(default)]
        rest: bool,
    },
    #[default]
    Other,
}

/// A declaration node as reported by the type service.
///
/// Offsets are byte offsets into `file`, which may be a generated file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationNode {
    pub file: String,
    pub start: u32,
    pub end: u32,
    #[serde(default)]
    pub kind: DeclarationKind,
    /// Name of the nearest enclosing interface or type alias.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
}

impl DeclarationNode {
    /// Create a declaration of kind [`DeclarationKind::Other`].
    pub fn new(file: impl Into<String>, start: u32, end: u32) -> Self {
        Self {
            file: file.into(),
            start,
            end,
            kind: DeclarationKind::Other,
            container: None,
        }
    }

    /// Set the declaration kind.
    pub fn with_kind(mut self, kind: DeclarationKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the enclosing interface or type alias name.
    pub fn in_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    /// Whether this is a `...rest` parameter.
    pub fn is_rest_parameter(&self) -> bool {
        matches!(self.kind, DeclarationKind::Parameter { rest: true })
    }
}

/// Read-only view of a type checker session.
///
/// Every method is a query; the engine never mutates the service.
pub trait TypeService {
    /// Module symbol of a source file, if the file was resolved.
    fn module_symbol(&self, file: &str) -> Option<SymbolId>;

    /// Exported symbols of a module.
    fn exports_of_module(&self, module: SymbolId) -> Vec<SymbolId>;

    fn symbol_name(&self, symbol: SymbolId) -> String;

    fn symbol_flags(&self, symbol: SymbolId) -> SymbolFlags;

    fn type_of_symbol(&self, symbol: SymbolId) -> TypeId;

    fn type_flags(&self, ty: TypeId) -> TypeFlags;

    /// Apparent properties of a type, in declaration order.
    fn properties(&self, ty: TypeId) -> Vec<SymbolId>;

    /// Look up a single property by name.
    fn property(&self, ty: TypeId, name: &str) -> Option<SymbolId> {
        self.properties(ty)
            .into_iter()
            .find(|&symbol| self.symbol_name(symbol) == name)
    }

    fn call_signatures(&self, ty: TypeId) -> Vec<SignatureId>;

    fn construct_signatures(&self, ty: TypeId) -> Vec<SignatureId>;

    fn signature_parameters(&self, signature: SignatureId) -> Vec<SymbolId>;

    fn signature_return_type(&self, signature: SignatureId) -> TypeId;

    /// Display form of a signature, e.g. `(e: "change", value: string): void`.
    fn signature_to_string(&self, signature: SignatureId) -> String;

    fn signature_declaration(&self, signature: SignatureId) -> Option<DeclarationNode>;

    /// Documentation comment attached to a signature.
    fn signature_documentation(&self, _signature: SignatureId) -> String {
        String::new()
    }

    fn signature_jsdoc_tags(&self, _signature: SignatureId) -> Vec<DocTag> {
        Vec::new()
    }

    /// Members of a union or intersection, in checker order.
    fn constituent_types(&self, ty: TypeId) -> Vec<TypeId>;

    fn is_array_like(&self, ty: TypeId) -> bool;

    fn type_arguments(&self, ty: TypeId) -> Vec<TypeId>;

    /// Fully qualified display name, never truncated.
    fn type_to_string(&self, ty: TypeId) -> String;

    /// Value of a string or number literal type.
    fn literal_value(&self, ty: TypeId) -> Option<String>;

    fn documentation(&self, symbol: SymbolId) -> String;

    fn jsdoc_tags(&self, symbol: SymbolId) -> Vec<DocTag>;

    fn declarations(&self, symbol: SymbolId) -> Vec<DeclarationNode>;

    fn value_declaration(&self, symbol: SymbolId) -> Option<DeclarationNode>;
}

/// Translation of generated-code locations back to original files.
pub trait SourceMapper {
    /// Whether `file` is generated (virtual) code.
    fn is_generated(&self, file: &str) -> bool;

    /// Map a generated range to `(original file, start, end)`.
    fn to_source(&self, file: &str, start: u32, end: u32) -> Option<(String, u32, u32)>;
}

/// Mapper for projects without generated code.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSourceMap;

impl SourceMapper for NoSourceMap {
    fn is_generated(&self, _file: &str) -> bool {
        false
    }

    fn to_source(&self, _file: &str, _start: u32, _end: u32) -> Option<(String, u32, u32)> {
        None
    }
}

/// Creates checker sessions for a given project state.
///
/// Called lazily by the checker the first time a query runs after the
/// project version changed.
pub trait TypeServiceProvider {
    fn create_service(&mut self, host: &ProjectHost) -> Rc<dyn TypeService>;

    fn create_source_mapper(&mut self, _host: &ProjectHost) -> Option<Rc<dyn SourceMapper>> {
        None
    }
}

impl<F, S> TypeServiceProvider for F
where
    F: FnMut(&ProjectHost) -> S,
    S: TypeService + 'static,
{
    fn create_service(&mut self, host: &ProjectHost) -> Rc<dyn TypeService> {
        Rc::new(self(host))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declaration_node_json() {
        let json = serde_json::json!({
            "file": "/src/Foo.vue",
            "start": 10,
            "end": 20,
            "kind": {
                "type": "propertyAssignment",
                "initializer": "{ type: Number, default: 1 }"
            },
            "container": "VNodeProps"
        });
        let node: DeclarationNode = serde_json::from_value(json).unwrap();
        assert_eq!(
            node.kind,
            DeclarationKind::PropertyAssignment {
                initializer: "{ type: Number, default: 1 }".to_string()
            }
        );
        assert_eq!(node.container.as_deref(), Some("VNodeProps"));
    }

    #[test]
    fn test_declaration_kind_defaults_to_other() {
        let json = serde_json::json!({ "file": "a.ts", "start": 0, "end": 1 });
        let node: DeclarationNode = serde_json::from_value(json).unwrap();
        assert_eq!(node.kind, DeclarationKind::Other);
        assert!(!node.is_rest_parameter());
    }

    #[test]
    fn test_rest_parameter() {
        let node = DeclarationNode::new("a.ts", 0, 1)
            .with_kind(DeclarationKind::Parameter { rest: true });
        assert!(node.is_rest_parameter());
    }

    #[test]
    fn test_no_source_map() {
        let mapper = NoSourceMap;
        assert!(!mapper.is_generated("a.ts"));
        assert!(mapper.to_source("a.ts", 0, 1).is_none());
    }
}
