//! Component meta data model.
//!
//! Every meta is plain data except for its lazily computed members
//! (`schema`, `declarations`), which are resolved on first access and
//! memoized. Serializing a meta forces them.

use std::rc::Rc;

use once_cell::unsync::OnceCell;
use serde::ser::{SerializeMap, SerializeStruct};
use serde::{Deserialize, Serialize, Serializer};

use crate::schema::SchemaResolver;
use crate::service::{SignatureId, SymbolId, TypeId, TypeService};
use crate::session::Session;

/// How a component is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum TypeClassification {
    #[default]
    Unknown = 0,
    /// Constructed; the instance carries `$props`, `$slots` and `$emit`.
    Class = 1,
    /// Called as `(props, ctx, expose)`.
    Function = 2,
}

impl TypeClassification {
    /// Parse the numeric literal produced by the `ComponentType<T>` helper.
    pub fn from_display(display: &str) -> Self {
        match display.trim() {
            "1" => Self::Class,
            "2" => Self::Function,
            _ => Self::Unknown,
        }
    }
}

impl Serialize for TypeClassification {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// A JSDoc tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocTag {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl DocTag {
    pub fn new(name: impl Into<String>, text: Option<String>) -> Self {
        Self {
            name: name.into(),
            text,
        }
    }
}

/// Location of a declaration in an original source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    pub file: String,
    pub range: [u32; 2],
}

impl Declaration {
    pub fn new(file: impl Into<String>, start: u32, end: u32) -> Self {
        Self {
            file: file.into(),
            range: [start, end],
        }
    }
}

/// Serializable description of a type.
#[derive(Debug, Clone)]
pub enum PropertyMetaSchema {
    /// Expansion stopped; the display name of the type.
    Type(String),
    /// Union members in checker order.
    Enum {
        type_name: String,
        schema: Vec<PropertyMetaSchema>,
    },
    /// Element types of an array-like type.
    Array {
        type_name: String,
        schema: Vec<PropertyMetaSchema>,
    },
    /// Single call signature; absent schema means no parameters.
    Event {
        type_name: String,
        schema: Option<Vec<PropertyMetaSchema>>,
    },
    /// Members keyed by name, in first-insertion order.
    Object {
        type_name: String,
        schema: Vec<PropertyMeta>,
    },
}

impl PropertyMetaSchema {
    /// Display name of the described type.
    pub fn type_name(&self) -> &str {
        match self {
            Self::Type(name) => name,
            Self::Enum { type_name, .. }
            | Self::Array { type_name, .. }
            | Self::Event { type_name, .. }
            | Self::Object { type_name, .. } => type_name,
        }
    }

    /// `"enum"`, `"array"`, `"event"`, `"object"`, or `None` for a leaf.
    pub fn kind(&self) -> Option<&'static str> {
        match self {
            Self::Type(_) => None,
            Self::Enum { .. } => Some("enum"),
            Self::Array { .. } => Some("array"),
            Self::Event { .. } => Some("event"),
            Self::Object { .. } => Some("object"),
        }
    }

    /// Whether expansion stopped at this node.
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Type(_))
    }

    /// Nested schemas of an enum, array or event node.
    pub fn items(&self) -> &[PropertyMetaSchema] {
        match self {
            Self::Enum { schema, .. } | Self::Array { schema, .. } => schema,
            Self::Event {
                schema: Some(schema),
                ..
            } => schema,
            _ => &[],
        }
    }

    /// Members of an object node.
    pub fn members(&self) -> &[PropertyMeta] {
        match self {
            Self::Object { schema, .. } => schema,
            _ => &[],
        }
    }

    /// Look up an object member by name.
    pub fn member(&self, name: &str) -> Option<&PropertyMeta> {
        self.members().iter().find(|member| member.name == name)
    }
}

impl Serialize for PropertyMetaSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Type(name) => serializer.serialize_str(name),
            Self::Enum { type_name, schema } | Self::Array { type_name, schema } => {
                let mut state = serializer.serialize_struct("PropertyMetaSchema", 3)?;
                state.serialize_field("kind", &self.kind())?;
                state.serialize_field("type", type_name)?;
                state.serialize_field("schema", schema)?;
                state.end()
            }
            Self::Event { type_name, schema } => {
                let mut state = serializer.serialize_struct("PropertyMetaSchema", 3)?;
                state.serialize_field("kind", "event")?;
                state.serialize_field("type", type_name)?;
                match schema {
                    Some(schema) => state.serialize_field("schema", schema)?,
                    None => state.skip_field("schema")?,
                }
                state.end()
            }
            Self::Object { type_name, schema } => {
                let mut state = serializer.serialize_struct("PropertyMetaSchema", 3)?;
                state.serialize_field("kind", "object")?;
                state.serialize_field("type", type_name)?;
                state.serialize_field("schema", &ObjectSchema(schema))?;
                state.end()
            }
        }
    }
}

struct ObjectSchema<'a>(&'a [PropertyMeta]);

impl Serialize for ObjectSchema<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for member in self.0 {
            map.serialize_entry(&member.name, member)?;
        }
        map.end()
    }
}

/// Lazily resolved parts of a property, slot or exposed member.
#[derive(Debug, Clone)]
pub(crate) struct LazyMember {
    session: Rc<Session>,
    symbol: SymbolId,
    ty: TypeId,
    schema: OnceCell<PropertyMetaSchema>,
    declarations: OnceCell<Vec<Declaration>>,
}

impl LazyMember {
    pub(crate) fn new(session: Rc<Session>, symbol: SymbolId, ty: TypeId) -> Self {
        Self {
            session,
            symbol,
            ty,
            schema: OnceCell::new(),
            declarations: OnceCell::new(),
        }
    }

    /// Create with the schema already resolved by an enclosing pass.
    pub(crate) fn resolved(
        session: Rc<Session>,
        symbol: SymbolId,
        ty: TypeId,
        schema: PropertyMetaSchema,
    ) -> Self {
        let member = Self::new(session, symbol, ty);
        let _ = member.schema.set(schema);
        member
    }

    fn schema(&self) -> &PropertyMetaSchema {
        self.schema
            .get_or_init(|| SchemaResolver::new(&self.session).resolve_schema(self.ty))
    }

    fn declarations(&self) -> &[Declaration] {
        self.declarations.get_or_init(|| {
            let nodes = self.session.service().declarations(self.symbol);
            self.session.resolve_declarations(nodes)
        })
    }
}

/// A component prop.
#[derive(Debug, Clone)]
pub struct PropertyMeta {
    pub name: String,
    /// Contributed by the framework rather than the component.
    pub global: bool,
    pub description: String,
    pub tags: Vec<DocTag>,
    pub required: bool,
    /// Fully qualified type.
    pub type_name: String,
    /// Default value expression.
    pub default: Option<String>,
    /// Checker handle, set when `includeRawType` is on.
    pub raw_type: Option<TypeId>,
    pub(crate) lazy: LazyMember,
}

impl PropertyMeta {
    /// Resolved schema of the property type.
    pub fn schema(&self) -> &PropertyMetaSchema {
        self.lazy.schema()
    }

    /// Declaration locations in original source files.
    pub fn declarations(&self) -> &[Declaration] {
        self.lazy.declarations()
    }

    /// Symbol handle of the property.
    pub fn symbol(&self) -> SymbolId {
        self.lazy.symbol
    }
}

impl Serialize for PropertyMeta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("PropertyMeta", 9)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("global", &self.global)?;
        state.serialize_field("description", &self.description)?;
        state.serialize_field("tags", &self.tags)?;
        state.serialize_field("required", &self.required)?;
        state.serialize_field("type", &self.type_name)?;
        match &self.default {
            Some(default) => state.serialize_field("default", default)?,
            None => state.skip_field("default")?,
        }
        state.serialize_field("declarations", self.declarations())?;
        state.serialize_field("schema", self.schema())?;
        state.end()
    }
}

/// A slot or an exposed instance member.
#[derive(Debug, Clone)]
pub struct MemberMeta {
    pub name: String,
    pub type_name: String,
    pub description: String,
    pub tags: Vec<DocTag>,
    pub raw_type: Option<TypeId>,
    lazy: LazyMember,
}

/// A component slot.
pub type SlotMeta = MemberMeta;

/// A member exposed on the component instance.
pub type ExposeMeta = MemberMeta;

impl MemberMeta {
    pub fn schema(&self) -> &PropertyMetaSchema {
        self.lazy.schema()
    }

    pub fn declarations(&self) -> &[Declaration] {
        self.lazy.declarations()
    }
}

impl From<PropertyMeta> for MemberMeta {
    fn from(prop: PropertyMeta) -> Self {
        Self {
            name: prop.name,
            type_name: prop.type_name,
            description: prop.description,
            tags: prop.tags,
            raw_type: prop.raw_type,
            lazy: prop.lazy,
        }
    }
}

impl Serialize for MemberMeta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("MemberMeta", 6)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("type", &self.type_name)?;
        state.serialize_field("description", &self.description)?;
        state.serialize_field("tags", &self.tags)?;
        state.serialize_field("declarations", self.declarations())?;
        state.serialize_field("schema", self.schema())?;
        state.end()
    }
}

/// Payload parameters of an emit signature.
#[derive(Debug, Clone)]
pub(crate) enum EventPayload {
    /// `(e: 'x', ...args: [a: A, b: B])`
    Variadic(TypeId),
    /// `(e: 'x', a: A, b: B)`
    Parameters(Vec<TypeId>),
}

impl EventPayload {
    /// Payload types in order; a rest tuple contributes its elements.
    pub(crate) fn types(&self, service: &dyn TypeService) -> Vec<TypeId> {
        match self {
            Self::Variadic(ty) => service.type_arguments(*ty),
            Self::Parameters(types) => types.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct LazyEvent {
    session: Rc<Session>,
    signature: SignatureId,
    payload: EventPayload,
    schema: OnceCell<Vec<PropertyMetaSchema>>,
    declarations: OnceCell<Vec<Declaration>>,
}

impl LazyEvent {
    pub(crate) fn new(session: Rc<Session>, signature: SignatureId, payload: EventPayload) -> Self {
        Self {
            session,
            signature,
            payload,
            schema: OnceCell::new(),
            declarations: OnceCell::new(),
        }
    }
}

/// An event the component emits.
#[derive(Debug, Clone)]
pub struct EventMeta {
    pub name: String,
    pub description: String,
    pub tags: Vec<DocTag>,
    /// Payload types, e.g. `[string, number]`.
    pub type_name: String,
    /// Full emit signature.
    pub signature: String,
    /// Payload type handles, one per entry of `type_name`. Empty unless
    /// `includeRawType` is on.
    pub raw_types: Vec<TypeId>,
    pub(crate) lazy: LazyEvent,
}

impl EventMeta {
    /// One schema per payload type.
    pub fn schema(&self) -> &[PropertyMetaSchema] {
        self.lazy.schema.get_or_init(|| {
            let session = &self.lazy.session;
            let mut resolver = SchemaResolver::new(session);
            self.lazy
                .payload
                .types(session.service())
                .into_iter()
                .map(|ty| resolver.resolve_schema(ty))
                .collect()
        })
    }

    pub fn declarations(&self) -> &[Declaration] {
        self.lazy.declarations.get_or_init(|| {
            let session = &self.lazy.session;
            let node = session.service().signature_declaration(self.lazy.signature);
            session.resolve_declarations(node)
        })
    }
}

impl Serialize for EventMeta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("EventMeta", 7)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("description", &self.description)?;
        state.serialize_field("tags", &self.tags)?;
        state.serialize_field("type", &self.type_name)?;
        state.serialize_field("signature", &self.signature)?;
        state.serialize_field("declarations", self.declarations())?;
        state.serialize_field("schema", self.schema())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_classification_from_display() {
        assert_eq!(TypeClassification::from_display("1"), TypeClassification::Class);
        assert_eq!(
            TypeClassification::from_display("2"),
            TypeClassification::Function
        );
        assert_eq!(
            TypeClassification::from_display("0"),
            TypeClassification::Unknown
        );
        assert_eq!(
            TypeClassification::from_display("never"),
            TypeClassification::Unknown
        );
    }

    #[test]
    fn test_type_classification_serializes_as_number() {
        let json = serde_json::to_string(&TypeClassification::Function).unwrap();
        assert_eq!(json, "2");
    }

    #[test]
    fn test_leaf_schema_serializes_as_string() {
        let schema = PropertyMetaSchema::Type("string".to_string());
        assert_eq!(serde_json::to_value(&schema).unwrap(), "string");
        assert!(schema.is_leaf());
        assert_eq!(schema.kind(), None);
    }

    #[test]
    fn test_enum_schema_json() {
        let schema = PropertyMetaSchema::Enum {
            type_name: "string | number".to_string(),
            schema: vec![
                PropertyMetaSchema::Type("string".to_string()),
                PropertyMetaSchema::Type("number".to_string()),
            ],
        };
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            serde_json::json!({
                "kind": "enum",
                "type": "string | number",
                "schema": ["string", "number"]
            })
        );
    }

    #[test]
    fn test_event_schema_without_parameters_omits_schema() {
        let schema = PropertyMetaSchema::Event {
            type_name: "() => void".to_string(),
            schema: None,
        };
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            serde_json::json!({ "kind": "event", "type": "() => void" })
        );
        assert!(schema.items().is_empty());
    }

    #[test]
    fn test_doc_tag_without_text() {
        let tag = DocTag::new("deprecated", None);
        assert_eq!(
            serde_json::to_value(&tag).unwrap(),
            serde_json::json!({ "name": "deprecated" })
        );
    }
}
