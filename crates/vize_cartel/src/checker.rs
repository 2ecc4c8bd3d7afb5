//! The component meta checker.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::component::{ComponentMeta, ComponentSource, GlobalProps};
use crate::error::CartelResult;
use crate::exports::{export_names, resolve_export};
use crate::options::MetaCheckerOptions;
use crate::project::{ConfigSource, ProjectHost};
use crate::service::TypeServiceProvider;
use crate::session::Session;

/// Per-version state, recreated lazily after project mutations.
#[derive(Debug, Clone)]
struct CheckerState {
    session: Rc<Session>,
    global_props: Rc<GlobalProps>,
}

/// Answers component meta queries over a [`ProjectHost`].
///
/// Mutations only touch the host and bump its version. The next query
/// notices the version change and asks the provider for a new type service.
pub struct ComponentMetaChecker<P: TypeServiceProvider> {
    host: ProjectHost,
    provider: RefCell<P>,
    options: Rc<MetaCheckerOptions>,
    state: RefCell<Option<CheckerState>>,
}

impl<P: TypeServiceProvider> ComponentMetaChecker<P> {
    pub fn new(host: ProjectHost, provider: P, options: MetaCheckerOptions) -> Self {
        Self {
            host,
            provider: RefCell::new(provider),
            options: Rc::new(options),
            state: RefCell::new(None),
        }
    }

    pub fn host(&self) -> &ProjectHost {
        &self.host
    }

    pub fn options(&self) -> &MetaCheckerOptions {
        &self.options
    }

    /// Export names of a component file; empty when the file cannot be resolved.
    pub fn get_export_names(&self, path: &str) -> Vec<String> {
        let path = self.host.resolve_path(path);
        let state = self.state();
        export_names(state.session.service(), &path)
    }

    /// Metadata of one export of a component file (usually `"default"`).
    pub fn get_component_meta(&self, path: &str, export_name: &str) -> CartelResult<ComponentMeta> {
        let path = self.host.resolve_path(path);
        let state = self.state();
        let export = resolve_export(state.session.service(), &path, export_name)?;

        let source = ComponentSource {
            text: self.host.read_file(&path),
            path,
            export_name: export_name.to_string(),
            force_typed: self.options.force_treat_as_typed,
        };
        let global_props = if source.path == self.host.global_component_file() {
            None
        } else {
            Some(state.global_props)
        };
        Ok(ComponentMeta::new(state.session, source, export, global_props))
    }

    /// Register or replace a file's content.
    pub fn update_file(&mut self, path: &str, text: impl Into<String>) {
        self.host.update_file(path, text);
    }

    /// Remove a file from the project.
    pub fn delete_file(&mut self, path: &str) {
        self.host.delete_file(path);
    }

    /// Re-read the project configuration and clear caches.
    pub fn reload(&mut self) -> CartelResult<()> {
        self.host.reload()
    }

    /// Drop cached snapshots; the next query starts a new session.
    pub fn clear_cache(&mut self) {
        self.host.clear_cache();
    }

    fn state(&self) -> CheckerState {
        let version = self.host.version();
        let mut state = self.state.borrow_mut();
        if let Some(current) = state.as_ref() {
            if current.session.version == version {
                return current.clone();
            }
        }

        tracing::debug!("creating checker session for project version {}", version);
        let mut provider = self.provider.borrow_mut();
        let service = provider.create_service(&self.host);
        let mapper = provider.create_source_mapper(&self.host);
        let session = Rc::new(Session::new(
            version,
            service,
            mapper,
            Rc::clone(&self.options),
        ));
        let global_props = Rc::new(GlobalProps::new(
            Rc::clone(&session),
            self.host.global_component_file(),
        ));
        let current = CheckerState {
            session,
            global_props,
        };
        *state = Some(current.clone());
        current
    }
}

/// Create a checker from an inline project configuration.
pub fn create_checker_from_config<P: TypeServiceProvider>(
    root_dir: impl Into<PathBuf>,
    config: &serde_json::Value,
    provider: P,
    options: MetaCheckerOptions,
) -> CartelResult<ComponentMetaChecker<P>> {
    let host = ProjectHost::new(
        root_dir,
        ConfigSource::Inline(config.clone()),
        options.force_treat_as_typed,
    )?;
    Ok(ComponentMetaChecker::new(host, provider, options))
}

/// Create a checker from a project configuration file.
///
/// The project root is the directory containing the file.
pub fn create_checker_from_config_file<P: TypeServiceProvider>(
    config_path: impl AsRef<Path>,
    provider: P,
    options: MetaCheckerOptions,
) -> CartelResult<ComponentMetaChecker<P>> {
    let config_path = config_path.as_ref();
    let root_dir = config_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();
    let host = ProjectHost::new(
        root_dir,
        ConfigSource::File(config_path.to_path_buf()),
        options.force_treat_as_typed,
    )?;
    Ok(ComponentMetaChecker::new(host, provider, options))
}
