//! Component type shapes.
//!
//! Extracts the facet types of a component: props, emit, slots and exposed.
//! Meta file members are used when present; otherwise the component type is
//! matched against the two invocation styles:
//!
//! - `new (...) => { $props, $slots, $emit }` for class-like components
//! - `(props, { slots, emit }, expose) => ...` for functional components

use crate::service::{TypeFlags, TypeId, TypeService};
use crate::types::TypeClassification;

/// Facet types of a component. Absent facets are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ComponentShape {
    pub kind: TypeClassification,
    pub props: Option<TypeId>,
    pub emit: Option<TypeId>,
    pub slots: Option<TypeId>,
    pub exposed: Option<TypeId>,
}

/// Resolve the shape of an export type.
pub(crate) fn resolve_shape(service: &dyn TypeService, ty: TypeId) -> ComponentShape {
    if let Some(shape) = resolve_meta_object(service, ty) {
        return shape;
    }
    resolve_signatures(service, ty).unwrap_or_default()
}

/// `{ type: 0 | 1 | 2, props, emit, slots, exposed }` from a meta file.
fn resolve_meta_object(service: &dyn TypeService, ty: TypeId) -> Option<ComponentShape> {
    let kind_ty = member_type(service, ty, "type")?;
    let display = service.type_to_string(kind_ty);
    if !matches!(display.as_str(), "0" | "1" | "2") {
        return None;
    }
    Some(ComponentShape {
        kind: TypeClassification::from_display(&display),
        props: member_type(service, ty, "props"),
        emit: member_type(service, ty, "emit"),
        slots: member_type(service, ty, "slots"),
        exposed: member_type(service, ty, "exposed"),
    })
}

fn resolve_signatures(service: &dyn TypeService, ty: TypeId) -> Option<ComponentShape> {
    if let Some(&construct) = service.construct_signatures(ty).first() {
        let instance = service.signature_return_type(construct);
        return Some(ComponentShape {
            kind: TypeClassification::Class,
            props: member_type(service, instance, "$props"),
            emit: member_type(service, instance, "$emit"),
            slots: member_type(service, instance, "$slots"),
            exposed: Some(instance),
        });
    }

    if let Some(&call) = service.call_signatures(ty).first() {
        let params = service.signature_parameters(call);
        let param_type = |index: usize| params.get(index).map(|&p| service.type_of_symbol(p));

        let context = param_type(1);
        let exposed = param_type(2).and_then(|expose| {
            let setter = *service.call_signatures(expose).first()?;
            let param = *service.signature_parameters(setter).first()?;
            Some(service.type_of_symbol(param))
        });
        return Some(ComponentShape {
            kind: TypeClassification::Function,
            props: param_type(0),
            emit: context.and_then(|ctx| member_type(service, ctx, "emit")),
            slots: context.and_then(|ctx| member_type(service, ctx, "slots")),
            exposed,
        });
    }

    // Overloaded or wrapped components: the first member with a signature wins.
    if is_union_or_intersection(service, ty) {
        return service
            .constituent_types(ty)
            .into_iter()
            .find_map(|member| resolve_signatures(service, member));
    }
    None
}

/// Type of property `name`, searching union and intersection members when
/// the type itself does not have it.
pub(crate) fn member_type(service: &dyn TypeService, ty: TypeId, name: &str) -> Option<TypeId> {
    if let Some(symbol) = service.property(ty, name) {
        return Some(service.type_of_symbol(symbol));
    }
    if is_union_or_intersection(service, ty) {
        return service
            .constituent_types(ty)
            .into_iter()
            .find_map(|member| member_type(service, member, name));
    }
    None
}

fn is_union_or_intersection(service: &dyn TypeService, ty: TypeId) -> bool {
    service
        .type_flags(ty)
        .intersects(TypeFlags::UNION | TypeFlags::INTERSECTION)
}
