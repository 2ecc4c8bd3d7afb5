//! Component metadata.
//!
//! A [`ComponentMeta`] is created per `get_component_meta` call and resolves
//! each facet on first access.

use std::rc::Rc;

use once_cell::sync::Lazy;
use once_cell::unsync::OnceCell;
use oxc_span::SourceType;
use regex::Regex;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use vize_carton::FxHashSet;

use crate::defaults::{self, ComponentSyntax};
use crate::exports::{resolve_export, ResolvedExport};
use crate::schema::{resolve_event_signature, resolve_nested_properties};
use crate::session::Session;
use crate::shape::{resolve_shape, ComponentShape};
use crate::types::{
    EventMeta, ExposeMeta, MemberMeta, PropertyMeta, SlotMeta, TypeClassification,
};

/// Vnode lifecycle hooks, e.g. `onVnodeMounted`.
static VNODE_EVENT_PROP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^onVnode[A-Z]").expect("valid pattern"));

static HYPHEN_CHAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"-(\w)").expect("valid pattern"));

/// `on-update:model-value` -> `onUpdate:modelValue`
fn camelize(name: &str) -> String {
    HYPHEN_CHAR
        .replace_all(name, |caps: &regex::Captures<'_>| caps[1].to_uppercase())
        .into_owned()
}

/// Prop names of the global pseudo-component, resolved once per session.
#[derive(Debug)]
pub(crate) struct GlobalProps {
    session: Rc<Session>,
    file: String,
    names: OnceCell<Vec<String>>,
}

impl GlobalProps {
    pub(crate) fn new(session: Rc<Session>, file: String) -> Self {
        Self {
            session,
            file,
            names: OnceCell::new(),
        }
    }

    pub(crate) fn names(&self) -> &[String] {
        self.names.get_or_init(|| {
            let service = self.session.service();
            let export = match resolve_export(service, &self.file, "default") {
                Ok(export) => export,
                Err(err) => {
                    tracing::warn!("global component unavailable: {}", err);
                    return Vec::new();
                }
            };
            let Some(props) = resolve_shape(service, export.ty).props else {
                return Vec::new();
            };
            service
                .properties(props)
                .into_iter()
                .map(|symbol| service.symbol_name(symbol))
                .filter(|name| !VNODE_EVENT_PROP.is_match(name))
                .collect()
        })
    }
}

/// Source of the component file, for syntax-based mining.
#[derive(Debug, Clone)]
pub(crate) struct ComponentSource {
    pub path: String,
    pub export_name: String,
    pub text: Option<Rc<str>>,
    pub force_typed: bool,
}

impl ComponentSource {
    fn read_syntax(&self, session: &Session) -> ComponentSyntax {
        let Some(text) = &self.text else {
            return ComponentSyntax::default();
        };
        let printer = session.options.printer_options.as_ref();
        if self.path.ends_with(".vue") {
            // Setup macros and the `<script>` options describe the default export only.
            if self.export_name != "default" {
                return ComponentSyntax::default();
            }
            return defaults::read_vue_component(text, self.force_typed, printer);
        }
        let source_type = SourceType::from_path(&self.path).unwrap_or_else(|_| SourceType::ts());
        defaults::read_script_component(text, source_type, &self.export_name, printer)
    }
}

/// Public contract of one component export.
#[derive(Debug)]
pub struct ComponentMeta {
    session: Rc<Session>,
    source: ComponentSource,
    export: ResolvedExport,
    /// `None` for the global pseudo-component itself.
    global_props: Option<Rc<GlobalProps>>,
    shape: OnceCell<ComponentShape>,
    syntax: OnceCell<ComponentSyntax>,
    description: OnceCell<Option<String>>,
    props: OnceCell<Vec<PropertyMeta>>,
    events: OnceCell<Vec<EventMeta>>,
    slots: OnceCell<Vec<SlotMeta>>,
    exposed: OnceCell<Vec<ExposeMeta>>,
}

impl ComponentMeta {
    pub(crate) fn new(
        session: Rc<Session>,
        source: ComponentSource,
        export: ResolvedExport,
        global_props: Option<Rc<GlobalProps>>,
    ) -> Self {
        Self {
            session,
            source,
            export,
            global_props,
            shape: OnceCell::new(),
            syntax: OnceCell::new(),
            description: OnceCell::new(),
            props: OnceCell::new(),
            events: OnceCell::new(),
            slots: OnceCell::new(),
            exposed: OnceCell::new(),
        }
    }

    /// Component name from the `name` option or `defineOptions`.
    pub fn name(&self) -> Option<&str> {
        self.syntax().name.as_deref()
    }

    /// Documentation comment of the export.
    pub fn description(&self) -> Option<&str> {
        self.description
            .get_or_init(|| {
                let symbol = self.export.component_symbol?;
                let docs = self.session.service().documentation(symbol);
                (!docs.is_empty()).then_some(docs)
            })
            .as_deref()
    }

    pub fn r#type(&self) -> TypeClassification {
        self.shape().kind
    }

    pub fn props(&self) -> &[PropertyMeta] {
        self.props.get_or_init(|| self.resolve_props())
    }

    pub fn events(&self) -> &[EventMeta] {
        self.events.get_or_init(|| {
            let Some(emit) = self.shape().emit else {
                return Vec::new();
            };
            self.session
                .service()
                .call_signatures(emit)
                .into_iter()
                .map(|signature| resolve_event_signature(&self.session, signature))
                .filter(|event| !event.name.is_empty())
                .collect()
        })
    }

    pub fn slots(&self) -> &[SlotMeta] {
        self.slots.get_or_init(|| {
            let Some(slots) = self.shape().slots else {
                return Vec::new();
            };
            self.session
                .service()
                .properties(slots)
                .into_iter()
                .map(|symbol| MemberMeta::from(resolve_nested_properties(&self.session, symbol)))
                .collect()
        })
    }

    /// Instance members declared through `defineExpose` / `expose`.
    pub fn exposed(&self) -> &[ExposeMeta] {
        self.exposed.get_or_init(|| {
            let Some(exposed) = self.shape().exposed else {
                return Vec::new();
            };
            let service = self.session.service();
            service
                .properties(exposed)
                .into_iter()
                .filter(|&symbol| service.value_declaration(symbol).is_none())
                .map(|symbol| MemberMeta::from(resolve_nested_properties(&self.session, symbol)))
                .collect()
        })
    }

    /// Project version this meta was computed against.
    pub fn version(&self) -> u64 {
        self.session.version
    }

    fn shape(&self) -> &ComponentShape {
        self.shape
            .get_or_init(|| resolve_shape(self.session.service(), self.export.ty))
    }

    fn syntax(&self) -> &ComponentSyntax {
        self.syntax
            .get_or_init(|| self.source.read_syntax(&self.session))
    }

    fn resolve_props(&self) -> Vec<PropertyMeta> {
        let Some(props_ty) = self.shape().props else {
            return Vec::new();
        };

        let event_props: FxHashSet<String> = self
            .events()
            .iter()
            .map(|event| camelize(&format!("on-{}", event.name)))
            .collect();

        let mut props: Vec<PropertyMeta> = self
            .session
            .service()
            .properties(props_ty)
            .into_iter()
            .map(|symbol| resolve_nested_properties(&self.session, symbol))
            .filter(|prop| {
                !VNODE_EVENT_PROP.is_match(&prop.name) && !event_props.contains(&prop.name)
            })
            .collect();

        if let Some(global_props) = &self.global_props {
            let names = global_props.names();
            for prop in &mut props {
                if names.contains(&prop.name) {
                    prop.global = true;
                }
            }
        }

        let syntax = self.syntax();
        for prop in &mut props {
            let Some(option) = syntax.props.get(&prop.name) else {
                continue;
            };
            if prop.default.is_none() {
                prop.default = option.default.clone();
            }
            if let Some(required) = option.required {
                prop.required = required;
            }
            if prop.default.is_some() {
                prop.required = false;
            }
        }

        props
    }
}

impl Serialize for ComponentMeta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ComponentMeta", 7)?;
        match self.name() {
            Some(name) => state.serialize_field("name", name)?,
            None => state.skip_field("name")?,
        }
        match self.description() {
            Some(description) => state.serialize_field("description", description)?,
            None => state.skip_field("description")?,
        }
        state.serialize_field("type", &self.r#type())?;
        state.serialize_field("props", self.props())?;
        state.serialize_field("events", self.events())?;
        state.serialize_field("slots", self.slots())?;
        state.serialize_field("exposed", self.exposed())?;
        state.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camelize_event_props() {
        assert_eq!(camelize("on-change"), "onChange");
        assert_eq!(camelize("on-update:modelValue"), "onUpdate:modelValue");
        assert_eq!(camelize("on-my-event"), "onMyEvent");
    }

    #[test]
    fn test_vnode_event_props() {
        assert!(VNODE_EVENT_PROP.is_match("onVnodeMounted"));
        assert!(!VNODE_EVENT_PROP.is_match("onVnode"));
        assert!(!VNODE_EVENT_PROP.is_match("onClick"));
    }
}
