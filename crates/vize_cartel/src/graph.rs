//! In-memory type graph.
//!
//! [`TypeGraph`] is a recorded [`TypeService`]: a plain table of types,
//! symbols and signatures that can be built in code or loaded from JSON
//! (for example a dump produced by a TypeScript checker session). It backs
//! tests and offline tooling.
//!
//! Unknown handles behave like `any`, so a partial graph never panics.

use serde::{Deserialize, Serialize};
use vize_carton::FxHashMap;

use crate::error::CartelResult;
use crate::project::meta_file_name;
use crate::service::{
    DeclarationKind, DeclarationNode, SignatureId, SymbolFlags, SymbolId, TypeFlags, TypeId,
    TypeService,
};
use crate::types::{DocTag, TypeClassification};

const MISSING: TypeId = TypeId::new(u32::MAX);

/// A type in the graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TypeNode {
    /// Fully qualified display name.
    pub display: String,
    pub flags: TypeFlags,
    pub properties: Vec<SymbolId>,
    pub call_signatures: Vec<SignatureId>,
    pub construct_signatures: Vec<SignatureId>,
    /// Union or intersection members.
    pub constituents: Vec<TypeId>,
    pub type_arguments: Vec<TypeId>,
    pub array_like: bool,
    /// Value of a literal type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub literal: Option<String>,
}

/// A symbol in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolNode {
    pub name: String,
    #[serde(default)]
    pub flags: SymbolFlags,
    #[serde(rename = "type")]
    pub ty: TypeId,
    #[serde(default)]
    pub documentation: String,
    #[serde(default)]
    pub tags: Vec<DocTag>,
    #[serde(default)]
    pub declarations: Vec<DeclarationNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_declaration: Option<DeclarationNode>,
    /// Exports, for module symbols.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exports: Vec<SymbolId>,
}

/// A call or construct signature in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureNode {
    pub display: String,
    #[serde(default)]
    pub parameters: Vec<SymbolId>,
    pub return_type: TypeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declaration: Option<DeclarationNode>,
    #[serde(default)]
    pub documentation: String,
    #[serde(default)]
    pub tags: Vec<DocTag>,
}

/// Recorded type information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeGraph {
    pub types: Vec<TypeNode>,
    pub symbols: Vec<SymbolNode>,
    pub signatures: Vec<SignatureNode>,
    /// Module symbols by file name.
    pub modules: FxHashMap<String, SymbolId>,
}

impl TypeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a graph from JSON.
    pub fn from_json(json: &str) -> CartelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn add_type(&mut self, node: TypeNode) -> TypeId {
        self.types.push(node);
        TypeId::new(self.types.len() as u32 - 1)
    }

    pub fn add_symbol(&mut self, node: SymbolNode) -> SymbolId {
        self.symbols.push(node);
        SymbolId::new(self.symbols.len() as u32 - 1)
    }

    pub fn add_signature(&mut self, node: SignatureNode) -> SignatureId {
        self.signatures.push(node);
        SignatureId::new(self.signatures.len() as u32 - 1)
    }

    pub fn type_node(&self, id: TypeId) -> Option<&TypeNode> {
        self.types.get(id.as_u32() as usize)
    }

    pub fn type_node_mut(&mut self, id: TypeId) -> Option<&mut TypeNode> {
        self.types.get_mut(id.as_u32() as usize)
    }

    pub fn symbol_node(&self, id: SymbolId) -> Option<&SymbolNode> {
        self.symbols.get(id.as_u32() as usize)
    }

    pub fn symbol_node_mut(&mut self, id: SymbolId) -> Option<&mut SymbolNode> {
        self.symbols.get_mut(id.as_u32() as usize)
    }

    pub fn signature_node(&self, id: SignatureId) -> Option<&SignatureNode> {
        self.signatures.get(id.as_u32() as usize)
    }

    /// A type without structure, such as `string` or `boolean`.
    pub fn primitive(&mut self, display: &str) -> TypeId {
        self.add_type(TypeNode {
            display: display.to_string(),
            ..TypeNode::default()
        })
    }

    pub fn any(&mut self) -> TypeId {
        self.add_type(TypeNode {
            display: "any".to_string(),
            flags: TypeFlags::ANY,
            ..TypeNode::default()
        })
    }

    /// `"value"`
    pub fn string_literal(&mut self, value: &str) -> TypeId {
        self.add_type(TypeNode {
            display: format!("\"{value}\""),
            flags: TypeFlags::STRING_LITERAL,
            literal: Some(value.to_string()),
            ..TypeNode::default()
        })
    }

    pub fn number_literal(&mut self, value: u32) -> TypeId {
        self.add_type(TypeNode {
            display: value.to_string(),
            flags: TypeFlags::NUMBER_LITERAL,
            literal: Some(value.to_string()),
            ..TypeNode::default()
        })
    }

    /// Anonymous object type (type literal).
    pub fn object(&mut self, display: &str, properties: Vec<SymbolId>) -> TypeId {
        self.add_type(TypeNode {
            display: display.to_string(),
            flags: TypeFlags::OBJECT | TypeFlags::ANONYMOUS,
            properties,
            ..TypeNode::default()
        })
    }

    /// Interface or class instance type.
    pub fn interface(&mut self, display: &str, properties: Vec<SymbolId>) -> TypeId {
        self.add_type(TypeNode {
            display: display.to_string(),
            flags: TypeFlags::OBJECT | TypeFlags::CLASS_OR_INTERFACE,
            properties,
            ..TypeNode::default()
        })
    }

    pub fn union(&mut self, display: &str, members: Vec<TypeId>) -> TypeId {
        self.add_type(TypeNode {
            display: display.to_string(),
            flags: TypeFlags::UNION,
            constituents: members,
            ..TypeNode::default()
        })
    }

    /// Intersection type; its properties are the members' properties.
    pub fn intersection(&mut self, display: &str, members: Vec<TypeId>) -> TypeId {
        let properties = members
            .iter()
            .filter_map(|&member| self.type_node(member))
            .flat_map(|node| node.properties.iter().copied())
            .collect();
        self.add_type(TypeNode {
            display: display.to_string(),
            flags: TypeFlags::INTERSECTION,
            properties,
            constituents: members,
            ..TypeNode::default()
        })
    }

    /// `T[]`
    pub fn array(&mut self, display: &str, element: TypeId) -> TypeId {
        self.add_type(TypeNode {
            display: display.to_string(),
            flags: TypeFlags::OBJECT | TypeFlags::CLASS_OR_INTERFACE,
            type_arguments: vec![element],
            array_like: true,
            ..TypeNode::default()
        })
    }

    /// `[A, B]`
    pub fn tuple(&mut self, display: &str, elements: Vec<TypeId>) -> TypeId {
        self.add_type(TypeNode {
            display: display.to_string(),
            flags: TypeFlags::OBJECT,
            type_arguments: elements,
            array_like: true,
            ..TypeNode::default()
        })
    }

    /// Replace the properties of an object type.
    pub fn set_properties(&mut self, ty: TypeId, properties: Vec<SymbolId>) {
        if let Some(node) = self.type_node_mut(ty) {
            node.properties = properties;
        }
    }

    pub fn symbol(&mut self, name: &str, ty: TypeId, flags: SymbolFlags) -> SymbolId {
        self.add_symbol(SymbolNode {
            name: name.to_string(),
            flags,
            ty,
            documentation: String::new(),
            tags: Vec::new(),
            declarations: Vec::new(),
            value_declaration: None,
            exports: Vec::new(),
        })
    }

    /// Required property.
    pub fn required_property(&mut self, name: &str, ty: TypeId) -> SymbolId {
        self.symbol(name, ty, SymbolFlags::PROPERTY)
    }

    /// Property declared with `?`.
    pub fn optional_property(&mut self, name: &str, ty: TypeId) -> SymbolId {
        self.symbol(name, ty, SymbolFlags::PROPERTY | SymbolFlags::OPTIONAL)
    }

    /// Attach documentation to a symbol.
    pub fn document(&mut self, symbol: SymbolId, documentation: &str, tags: Vec<DocTag>) {
        if let Some(node) = self.symbol_node_mut(symbol) {
            node.documentation = documentation.to_string();
            node.tags = tags;
        }
    }

    /// Add a declaration to a symbol.
    pub fn declare(&mut self, symbol: SymbolId, declaration: DeclarationNode) {
        if let Some(node) = self.symbol_node_mut(symbol) {
            node.declarations.push(declaration);
        }
    }

    /// Set the value declaration of a symbol.
    pub fn set_value_declaration(&mut self, symbol: SymbolId, declaration: DeclarationNode) {
        if let Some(node) = self.symbol_node_mut(symbol) {
            node.value_declaration = Some(declaration);
        }
    }

    pub fn parameter(&mut self, name: &str, ty: TypeId) -> SymbolId {
        let symbol = self.symbol(name, ty, SymbolFlags::empty());
        self.set_value_declaration(
            symbol,
            DeclarationNode::new("", 0, 0).with_kind(DeclarationKind::Parameter { rest: false }),
        );
        symbol
    }

    /// `...name: T`
    pub fn rest_parameter(&mut self, name: &str, ty: TypeId) -> SymbolId {
        let symbol = self.symbol(name, ty, SymbolFlags::empty());
        self.set_value_declaration(
            symbol,
            DeclarationNode::new("", 0, 0).with_kind(DeclarationKind::Parameter { rest: true }),
        );
        symbol
    }

    pub fn signature(
        &mut self,
        display: &str,
        parameters: Vec<SymbolId>,
        return_type: TypeId,
    ) -> SignatureId {
        self.add_signature(SignatureNode {
            display: display.to_string(),
            parameters,
            return_type,
            declaration: None,
            documentation: String::new(),
            tags: Vec::new(),
        })
    }

    /// Function type with the given call signatures.
    pub fn function(&mut self, display: &str, signatures: Vec<SignatureId>) -> TypeId {
        self.add_type(TypeNode {
            display: display.to_string(),
            flags: TypeFlags::OBJECT | TypeFlags::ANONYMOUS,
            call_signatures: signatures,
            ..TypeNode::default()
        })
    }

    /// Constructor type with the given construct signatures.
    pub fn constructor(&mut self, display: &str, signatures: Vec<SignatureId>) -> TypeId {
        self.add_type(TypeNode {
            display: display.to_string(),
            flags: TypeFlags::OBJECT | TypeFlags::ANONYMOUS,
            construct_signatures: signatures,
            ..TypeNode::default()
        })
    }

    /// Register a module symbol for `file`.
    pub fn module(&mut self, file: &str, exports: Vec<SymbolId>) -> SymbolId {
        let ty = self.primitive(&format!("typeof import(\"{file}\")"));
        let module = self.symbol(&format!("\"{file}\""), ty, SymbolFlags::empty());
        if let Some(node) = self.symbol_node_mut(module) {
            node.exports = exports;
        }
        self.modules.insert(file.to_string(), module);
        module
    }

    /// The object type a meta file gives one component export.
    pub fn meta_object(
        &mut self,
        kind: TypeClassification,
        props: Option<TypeId>,
        emit: Option<TypeId>,
        slots: Option<TypeId>,
        exposed: Option<TypeId>,
    ) -> TypeId {
        let kind_ty = self.number_literal(kind as u32);
        let mut members = vec![self.required_property("type", kind_ty)];
        for (name, ty) in [("props", props), ("emit", emit), ("slots", slots), ("exposed", exposed)] {
            if let Some(ty) = ty {
                members.push(self.required_property(name, ty));
            }
        }
        self.object("ComponentMeta<T>", members)
    }

    /// Register the meta module of `component` with the given exports.
    pub fn meta_module(&mut self, component: &str, exports: &[(&str, TypeId)]) -> SymbolId {
        let members = exports
            .iter()
            .map(|&(name, ty)| self.required_property(name, ty))
            .collect();
        let default_ty = self.object("{}", members);
        let default = self.symbol("default", default_ty, SymbolFlags::empty());
        self.module(&meta_file_name(component), vec![default])
    }
}

impl TypeService for TypeGraph {
    fn module_symbol(&self, file: &str) -> Option<SymbolId> {
        self.modules.get(file).copied()
    }

    fn exports_of_module(&self, module: SymbolId) -> Vec<SymbolId> {
        self.symbol_node(module)
            .map(|node| node.exports.clone())
            .unwrap_or_default()
    }

    fn symbol_name(&self, symbol: SymbolId) -> String {
        self.symbol_node(symbol)
            .map(|node| node.name.clone())
            .unwrap_or_default()
    }

    fn symbol_flags(&self, symbol: SymbolId) -> SymbolFlags {
        self.symbol_node(symbol)
            .map(|node| node.flags)
            .unwrap_or_default()
    }

    fn type_of_symbol(&self, symbol: SymbolId) -> TypeId {
        self.symbol_node(symbol).map_or(MISSING, |node| node.ty)
    }

    fn type_flags(&self, ty: TypeId) -> TypeFlags {
        self.type_node(ty).map_or(TypeFlags::ANY, |node| node.flags)
    }

    fn properties(&self, ty: TypeId) -> Vec<SymbolId> {
        self.type_node(ty)
            .map(|node| node.properties.clone())
            .unwrap_or_default()
    }

    fn call_signatures(&self, ty: TypeId) -> Vec<SignatureId> {
        self.type_node(ty)
            .map(|node| node.call_signatures.clone())
            .unwrap_or_default()
    }

    fn construct_signatures(&self, ty: TypeId) -> Vec<SignatureId> {
        self.type_node(ty)
            .map(|node| node.construct_signatures.clone())
            .unwrap_or_default()
    }

    fn signature_parameters(&self, signature: SignatureId) -> Vec<SymbolId> {
        self.signature_node(signature)
            .map(|node| node.parameters.clone())
            .unwrap_or_default()
    }

    fn signature_return_type(&self, signature: SignatureId) -> TypeId {
        self.signature_node(signature)
            .map_or(MISSING, |node| node.return_type)
    }

    fn signature_to_string(&self, signature: SignatureId) -> String {
        self.signature_node(signature)
            .map(|node| node.display.clone())
            .unwrap_or_default()
    }

    fn signature_declaration(&self, signature: SignatureId) -> Option<DeclarationNode> {
        self.signature_node(signature)
            .and_then(|node| node.declaration.clone())
    }

    fn signature_documentation(&self, signature: SignatureId) -> String {
        self.signature_node(signature)
            .map(|node| node.documentation.clone())
            .unwrap_or_default()
    }

    fn signature_jsdoc_tags(&self, signature: SignatureId) -> Vec<DocTag> {
        self.signature_node(signature)
            .map(|node| node.tags.clone())
            .unwrap_or_default()
    }

    fn constituent_types(&self, ty: TypeId) -> Vec<TypeId> {
        self.type_node(ty)
            .map(|node| node.constituents.clone())
            .unwrap_or_default()
    }

    fn is_array_like(&self, ty: TypeId) -> bool {
        self.type_node(ty).is_some_and(|node| node.array_like)
    }

    fn type_arguments(&self, ty: TypeId) -> Vec<TypeId> {
        self.type_node(ty)
            .map(|node| node.type_arguments.clone())
            .unwrap_or_default()
    }

    fn type_to_string(&self, ty: TypeId) -> String {
        self.type_node(ty)
            .map_or_else(|| "any".to_string(), |node| node.display.clone())
    }

    fn literal_value(&self, ty: TypeId) -> Option<String> {
        self.type_node(ty).and_then(|node| node.literal.clone())
    }

    fn documentation(&self, symbol: SymbolId) -> String {
        self.symbol_node(symbol)
            .map(|node| node.documentation.clone())
            .unwrap_or_default()
    }

    fn jsdoc_tags(&self, symbol: SymbolId) -> Vec<DocTag> {
        self.symbol_node(symbol)
            .map(|node| node.tags.clone())
            .unwrap_or_default()
    }

    fn declarations(&self, symbol: SymbolId) -> Vec<DeclarationNode> {
        self.symbol_node(symbol)
            .map(|node| node.declarations.clone())
            .unwrap_or_default()
    }

    fn value_declaration(&self, symbol: SymbolId) -> Option<DeclarationNode> {
        self.symbol_node(symbol)
            .and_then(|node| node.value_declaration.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_handles_behave_like_any() {
        let graph = TypeGraph::new();
        let ty = TypeId::new(42);
        assert_eq!(graph.type_to_string(ty), "any");
        assert!(graph.type_flags(ty).contains(TypeFlags::ANY));
        assert!(graph.properties(ty).is_empty());
        assert_eq!(graph.type_of_symbol(SymbolId::new(7)), MISSING);
    }

    #[test]
    fn test_property_lookup() {
        let mut graph = TypeGraph::new();
        let string = graph.primitive("string");
        let foo = graph.required_property("foo", string);
        let bar = graph.optional_property("bar", string);
        let obj = graph.object("{ foo: string; bar?: string; }", vec![foo, bar]);
        assert_eq!(TypeService::property(&graph, obj, "bar"), Some(bar));
        assert!(graph.symbol_flags(bar).contains(SymbolFlags::OPTIONAL));
        assert_eq!(TypeService::property(&graph, obj, "baz"), None);
    }

    #[test]
    fn test_intersection_collects_properties() {
        let mut graph = TypeGraph::new();
        let string = graph.primitive("string");
        let a = graph.required_property("a", string);
        let b = graph.required_property("b", string);
        let left = graph.object("{ a: string; }", vec![a]);
        let right = graph.object("{ b: string; }", vec![b]);
        let both = graph.intersection("{ a: string; } & { b: string; }", vec![left, right]);
        assert_eq!(graph.properties(both), vec![a, b]);
    }

    #[test]
    fn test_meta_module() {
        let mut graph = TypeGraph::new();
        let props = graph.object("{}", vec![]);
        let meta = graph.meta_object(TypeClassification::Function, Some(props), None, None, None);
        let module = graph.meta_module("/src/Foo.vue", &[("default", meta)]);
        assert_eq!(graph.module_symbol("/src/Foo.vue.meta.ts"), Some(module));
        let exports = graph.exports_of_module(module);
        assert_eq!(graph.symbol_name(exports[0]), "default");
    }

    #[test]
    fn test_json_round_trip_keeps_lookup() {
        let mut graph = TypeGraph::new();
        let click = graph.string_literal("click");
        let event = graph.parameter("event", click);
        let rest_ty = graph.tuple("[MouseEvent]", vec![]);
        let rest = graph.rest_parameter("args", rest_ty);
        let void = graph.primitive("void");
        graph.signature("(event: \"click\", ...args: [MouseEvent]): void", vec![event, rest], void);

        let json = serde_json::to_string(&graph).unwrap();
        let loaded = TypeGraph::from_json(&json).unwrap();
        assert_eq!(loaded, graph);
        assert_eq!(loaded.literal_value(click).as_deref(), Some("click"));
        assert!(loaded
            .value_declaration(rest)
            .is_some_and(|node| node.is_rest_parameter()));
    }
}
