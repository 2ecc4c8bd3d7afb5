//! Schema resolution.
//!
//! Converts checker types into [`PropertyMetaSchema`] trees. One
//! [`SchemaResolver`] is one resolution pass: every type is expanded at most
//! once per pass, and a type reached again (directly or through a cycle) is
//! emitted as its bare display name.

use std::rc::Rc;

use vize_carton::{phf_set, FxHashSet, PhfSet};

use crate::defaults;
use crate::service::{DeclarationKind, SignatureId, SymbolFlags, SymbolId, TypeFlags, TypeId};
use crate::session::Session;
use crate::types::{
    EventMeta, EventPayload, LazyEvent, LazyMember, PropertyMeta, PropertyMetaSchema,
};

/// Interfaces whose members the framework adds to every component.
static PUBLIC_PROP_BAGS: PhfSet<&'static str> = phf_set! {
    "PublicProps",
    "VNodeProps",
    "AllowedComponentProps",
    "ComponentCustomProps",
};

/// Display name of the universal `any` type.
const ANY: &str = "any";

/// A single schema resolution pass.
pub(crate) struct SchemaResolver<'a> {
    session: &'a Rc<Session>,
    visited: FxHashSet<TypeId>,
}

impl<'a> SchemaResolver<'a> {
    pub(crate) fn new(session: &'a Rc<Session>) -> Self {
        Self {
            session,
            visited: FxHashSet::default(),
        }
    }

    /// Resolve `ty` into a schema tree.
    pub(crate) fn resolve_schema(&mut self, ty: TypeId) -> PropertyMetaSchema {
        let session = self.session;
        let service = session.service();
        let type_name = service.type_to_string(ty);

        if !session.options.schema.is_enabled() || self.should_ignore(&type_name, ty) {
            return PropertyMetaSchema::Type(type_name);
        }
        self.visited.insert(ty);

        let flags = service.type_flags(ty);
        if flags.contains(TypeFlags::UNION) {
            let schema = service
                .constituent_types(ty)
                .into_iter()
                .map(|member| self.resolve_schema(member))
                .collect();
            return PropertyMetaSchema::Enum { type_name, schema };
        }

        if service.is_array_like(ty) {
            let schema = service
                .type_arguments(ty)
                .into_iter()
                .map(|arg| self.resolve_schema(arg))
                .collect();
            return PropertyMetaSchema::Array { type_name, schema };
        }

        let call_signatures = service.call_signatures(ty);
        if call_signatures.is_empty() && is_object_like(flags) {
            let mut schema: Vec<PropertyMeta> = Vec::new();
            for symbol in service.properties(ty) {
                let property = self.resolve_eager_property(symbol);
                match schema.iter_mut().find(|p| p.name == property.name) {
                    Some(existing) => *existing = property,
                    None => schema.push(property),
                }
            }
            return PropertyMetaSchema::Object { type_name, schema };
        }

        if let [signature] = call_signatures.as_slice() {
            let parameters = service.signature_parameters(*signature);
            let schema = if parameters.is_empty() {
                None
            } else {
                Some(
                    parameters
                        .into_iter()
                        .map(|param| self.resolve_schema(service.type_of_symbol(param)))
                        .collect(),
                )
            };
            return PropertyMetaSchema::Event { type_name, schema };
        }

        PropertyMetaSchema::Type(type_name)
    }

    /// Whether expansion stops at `ty`. Ignored types are not marked visited.
    fn should_ignore(&self, type_name: &str, ty: TypeId) -> bool {
        let service = self.session.service();
        if type_name == ANY || service.type_flags(ty).contains(TypeFlags::ANY) {
            return true;
        }
        if self.visited.contains(&ty) {
            return true;
        }
        for rule in self.session.options.schema.ignore_rules() {
            if let Some(ignored) = rule.evaluate(type_name, ty, service) {
                return ignored;
            }
        }
        false
    }

    /// Nested property whose schema belongs to this pass.
    fn resolve_eager_property(&mut self, symbol: SymbolId) -> PropertyMeta {
        let mut property = resolve_nested_properties(self.session, symbol);
        let ty = self.session.service().type_of_symbol(symbol);
        let schema = self.resolve_schema(ty);
        property.lazy = LazyMember::resolved(Rc::clone(self.session), symbol, ty, schema);
        property
    }
}

/// Object types that expand into a member map.
fn is_object_like(flags: TypeFlags) -> bool {
    flags.intersects(TypeFlags::CLASS_OR_INTERFACE | TypeFlags::INTERSECTION)
        || flags.contains(TypeFlags::OBJECT | TypeFlags::ANONYMOUS)
}

/// Build the metadata of one property symbol.
///
/// `required` starts from the optional flag and `global` from the property
/// bags its declarations live in. Declarations written as an options object
/// (`foo: { type: Number, default: 1 }`) contribute `default` and `required`.
pub(crate) fn resolve_nested_properties(session: &Rc<Session>, symbol: SymbolId) -> PropertyMeta {
    let service = session.service();
    let ty = service.type_of_symbol(symbol);
    let declarations = service.declarations(symbol);

    let mut required = !service.symbol_flags(symbol).contains(SymbolFlags::OPTIONAL);
    let mut default = None;
    let global = declarations.iter().any(|node| {
        node.container
            .as_deref()
            .is_some_and(|container| PUBLIC_PROP_BAGS.contains(container))
    });

    let printer = session.options.printer_options.as_ref();
    for node in &declarations {
        let DeclarationKind::PropertyAssignment { initializer } = &node.kind else {
            continue;
        };
        let option = defaults::read_prop_option_source(initializer, printer);
        if let Some(value) = option.default {
            default = Some(value);
        }
        if let Some(value) = option.required {
            required = value;
        }
    }
    if default.is_some() {
        required = false;
    }

    PropertyMeta {
        name: service.symbol_name(symbol),
        global,
        description: service.documentation(symbol),
        tags: service.jsdoc_tags(symbol),
        required,
        type_name: service.type_to_string(ty),
        default,
        raw_type: session.options.include_raw_type.then_some(ty),
        lazy: LazyMember::new(Rc::clone(session), symbol, ty),
    }
}

/// Build the metadata of one emit overload, `(event: 'name', ...payload)`.
pub(crate) fn resolve_event_signature(session: &Rc<Session>, signature: SignatureId) -> EventMeta {
    let service = session.service();
    let parameters = service.signature_parameters(signature);

    let name = parameters
        .first()
        .and_then(|&event| service.literal_value(service.type_of_symbol(event)))
        .unwrap_or_default();

    let (type_name, payload) = match parameters.get(1) {
        Some(&first) if is_rest_parameter(session, first) => {
            let ty = service.type_of_symbol(first);
            (service.type_to_string(ty), EventPayload::Variadic(ty))
        }
        Some(_) => {
            let types: Vec<TypeId> = parameters[1..]
                .iter()
                .map(|&param| service.type_of_symbol(param))
                .collect();
            let names: Vec<String> = types.iter().map(|&ty| service.type_to_string(ty)).collect();
            (format!("[{}]", names.join(", ")), EventPayload::Parameters(types))
        }
        None => ("[]".to_string(), EventPayload::Parameters(Vec::new())),
    };

    let raw_types = if session.options.include_raw_type {
        payload.types(service)
    } else {
        Vec::new()
    };

    EventMeta {
        name,
        description: service.signature_documentation(signature),
        tags: service.signature_jsdoc_tags(signature),
        type_name,
        signature: service.signature_to_string(signature),
        raw_types,
        lazy: LazyEvent::new(Rc::clone(session), signature, payload),
    }
}

fn is_rest_parameter(session: &Session, param: SymbolId) -> bool {
    session
        .service()
        .value_declaration(param)
        .is_some_and(|node| node.is_rest_parameter())
}
