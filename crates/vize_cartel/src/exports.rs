//! Export resolution through meta files.

use crate::error::{CartelError, CartelResult};
use crate::project::meta_file_name;
use crate::service::{SymbolId, TypeId, TypeService};

/// A component export located through its meta file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResolvedExport {
    /// Member of the meta file's default export.
    pub symbol: SymbolId,
    /// Type of that member.
    pub ty: TypeId,
    /// The export symbol in the component module itself, when resolvable.
    pub component_symbol: Option<SymbolId>,
}

/// Members of the meta file's default export, one per component export.
///
/// `None` when the meta module cannot be resolved.
fn meta_exports(service: &dyn TypeService, component: &str) -> Option<Vec<SymbolId>> {
    let meta = meta_file_name(component);
    let module = service.module_symbol(&meta)?;
    let default = service
        .exports_of_module(module)
        .into_iter()
        .find(|&symbol| service.symbol_name(symbol) == "default")?;
    Some(service.properties(service.type_of_symbol(default)))
}

/// Export names of a component file, empty when it cannot be resolved.
pub(crate) fn export_names(service: &dyn TypeService, component: &str) -> Vec<String> {
    match meta_exports(service, component) {
        Some(exports) => exports
            .into_iter()
            .map(|symbol| service.symbol_name(symbol))
            .collect(),
        None => {
            tracing::debug!("no meta module for {}", component);
            Vec::new()
        }
    }
}

/// Locate `export_name` of `component`.
pub(crate) fn resolve_export(
    service: &dyn TypeService,
    component: &str,
    export_name: &str,
) -> CartelResult<ResolvedExport> {
    let exports = meta_exports(service, component).ok_or_else(|| CartelError::ModuleNotResolved {
        file: component.to_string(),
    })?;
    let symbol = exports
        .into_iter()
        .find(|&symbol| service.symbol_name(symbol) == export_name)
        .ok_or_else(|| CartelError::MissingExport {
            file: component.to_string(),
            export: export_name.to_string(),
        })?;

    let component_symbol = service.module_symbol(component).and_then(|module| {
        service
            .exports_of_module(module)
            .into_iter()
            .find(|&export| service.symbol_name(export) == export_name)
    });

    Ok(ResolvedExport {
        symbol,
        ty: service.type_of_symbol(symbol),
        component_symbol,
    })
}
