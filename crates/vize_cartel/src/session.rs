//! A checker session: one type service instance bound to one project version.

use std::fmt;
use std::rc::Rc;

use crate::options::MetaCheckerOptions;
use crate::service::{DeclarationNode, SourceMapper, TypeService};
use crate::types::Declaration;

/// Shared state behind every lazily computed meta.
///
/// Metas keep their session alive, so a meta obtained before a project
/// mutation keeps answering from the state it was created with.
pub(crate) struct Session {
    pub(crate) version: u64,
    pub(crate) service: Rc<dyn TypeService>,
    pub(crate) mapper: Option<Rc<dyn SourceMapper>>,
    pub(crate) options: Rc<MetaCheckerOptions>,
}

impl Session {
    pub(crate) fn new(
        version: u64,
        service: Rc<dyn TypeService>,
        mapper: Option<Rc<dyn SourceMapper>>,
        options: Rc<MetaCheckerOptions>,
    ) -> Self {
        Self {
            version,
            service,
            mapper,
            options,
        }
    }

    pub(crate) fn service(&self) -> &dyn TypeService {
        self.service.as_ref()
    }

    /// Resolve declaration nodes to original-file locations.
    ///
    /// Nodes inside generated code that do not map back are dropped.
    pub(crate) fn resolve_declarations(
        &self,
        nodes: impl IntoIterator<Item = DeclarationNode>,
    ) -> Vec<Declaration> {
        if self.options.skip_declaration_lookup {
            return Vec::new();
        }
        nodes
            .into_iter()
            .filter_map(|node| self.resolve_declaration(node))
            .collect()
    }

    fn resolve_declaration(&self, node: DeclarationNode) -> Option<Declaration> {
        if let Some(mapper) = &self.mapper {
            if mapper.is_generated(&node.file) {
                let mapped = mapper.to_source(&node.file, node.start, node.end);
                if mapped.is_none() {
                    tracing::debug!(
                        "untraceable declaration {}:{}-{}",
                        node.file,
                        node.start,
                        node.end
                    );
                }
                return mapped.map(|(file, start, end)| Declaration::new(file, start, end));
            }
        }
        Some(Declaration::new(node.file, node.start, node.end))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("version", &self.version)
            .field("has_mapper", &self.mapper.is_some())
            .finish_non_exhaustive()
    }
}
