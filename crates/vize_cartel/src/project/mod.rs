//! Incremental in-memory project.
//!
//! The [`ProjectHost`] is the file system a type service sees: the
//! configured component files, in-memory edits, one synthesized meta file
//! per component, and the global pseudo-component. Every mutation bumps the
//! project version; nothing is recomputed until a query needs it.

mod config;
mod meta_file;

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use vize_carton::hash::hash_str;
use vize_carton::{FxHashMap, FxHashSet};

pub use config::{ConfigSource, ProjectConfig};
pub use meta_file::{
    collect_export_names, meta_file_name, meta_file_text, GLOBAL_COMPONENT_FILE,
    GLOBAL_COMPONENT_TEXT, META_SUFFIX,
};

use crate::error::CartelResult;
use config::normalize_path;
use meta_file::component_candidates;

/// A synthesized meta file, addressed by the hash of its export list.
#[derive(Debug, Clone)]
struct MetaFile {
    exports_hash: u64,
    text: Rc<str>,
}

/// File snapshots, meta files and the project version.
#[derive(Debug)]
pub struct ProjectHost {
    root_dir: PathBuf,
    config_source: ConfigSource,
    force_typed: bool,
    /// Referenced component files.
    files: FxHashSet<String>,
    /// Contents set through `update_file`.
    overrides: FxHashMap<String, Rc<str>>,
    /// Disk reads, `None` for unreadable files.
    snapshots: RefCell<FxHashMap<String, Option<Rc<str>>>>,
    meta_files: RefCell<FxHashMap<String, MetaFile>>,
    version: u64,
}

impl ProjectHost {
    /// Create a host and resolve the configured file list.
    pub fn new(
        root_dir: impl Into<PathBuf>,
        config_source: ConfigSource,
        force_typed: bool,
    ) -> CartelResult<Self> {
        let root_dir = root_dir.into();
        let config = ProjectConfig::load(&config_source)?;
        let files = config.resolve_files(&root_dir)?.into_iter().collect();
        Ok(Self {
            root_dir,
            config_source,
            force_typed,
            files,
            overrides: FxHashMap::default(),
            snapshots: RefCell::new(FxHashMap::default()),
            meta_files: RefCell::new(FxHashMap::default()),
            version: 0,
        })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Monotonically increasing project version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether scripts without `lang` are parsed as TypeScript.
    pub fn force_typed(&self) -> bool {
        self.force_typed
    }

    /// Path of the global pseudo-component.
    pub fn global_component_file(&self) -> String {
        normalize_path(&self.root_dir.join(GLOBAL_COMPONENT_FILE))
    }

    /// Absolute, forward-slash form of `path`.
    pub fn resolve_path(&self, path: &str) -> String {
        let path = Path::new(path);
        if path.is_absolute() {
            normalize_path(path)
        } else {
            normalize_path(&self.root_dir.join(path))
        }
    }

    /// Component files, sorted, including the global pseudo-component.
    pub fn component_files(&self) -> Vec<String> {
        let mut files: Vec<String> = self.files.iter().cloned().collect();
        files.push(self.global_component_file());
        files.sort();
        files.dedup();
        files
    }

    /// Every file a type service should load: components and their meta files.
    pub fn script_file_names(&self) -> Vec<String> {
        let components = self.component_files();
        let mut names = Vec::with_capacity(components.len() * 2);
        for component in components {
            names.push(meta_file_name(&component));
            names.push(component);
        }
        names
    }

    /// Whether `path` is referenced by the project.
    pub fn is_referenced(&self, path: &str) -> bool {
        let path = self.resolve_path(path);
        self.files.contains(&path) || path == self.global_component_file()
    }

    /// Content of a file as the type service sees it.
    pub fn read_file(&self, path: &str) -> Option<Rc<str>> {
        let path = self.resolve_path(path);
        if path == self.global_component_file() {
            return Some(Rc::from(GLOBAL_COMPONENT_TEXT));
        }
        if let Some(text) = self.overrides.get(&path) {
            return Some(Rc::clone(text));
        }
        if !self.files.contains(&path) {
            if let Some(component) = self.component_of_meta(&path) {
                return self.meta_file(&path, &component);
            }
        }
        self.read_snapshot(&path)
    }

    /// Whether [`ProjectHost::read_file`] would return content.
    pub fn file_exists(&self, path: &str) -> bool {
        self.read_file(path).is_some()
    }

    /// Export names of a component file.
    pub fn export_names(&self, component: &str) -> Vec<String> {
        let component = self.resolve_path(component);
        match self.read_file(&component) {
            Some(source) => collect_export_names(&component, &source, self.force_typed),
            None => Vec::new(),
        }
    }

    /// Register or replace a file's content.
    pub fn update_file(&mut self, path: &str, text: impl Into<String>) {
        let path = self.resolve_path(path);
        tracing::debug!("update {}", path);
        self.snapshots.get_mut().remove(&path);
        self.overrides.insert(path.clone(), Rc::from(text.into()));
        self.files.insert(path);
        self.version += 1;
    }

    /// Remove a file from the project.
    pub fn delete_file(&mut self, path: &str) {
        let path = self.resolve_path(path);
        tracing::debug!("delete {}", path);
        self.files.remove(&path);
        self.overrides.remove(&path);
        self.snapshots.get_mut().remove(&path);
        self.meta_files.get_mut().remove(&meta_file_name(&path));
        self.version += 1;
    }

    /// Re-read the configuration and file list, then clear caches.
    ///
    /// Files updated in memory stay referenced.
    pub fn reload(&mut self) -> CartelResult<()> {
        let config = ProjectConfig::load(&self.config_source).inspect_err(|err| {
            tracing::warn!("could not reload project config: {}", err);
        })?;
        let mut files: FxHashSet<String> = config.resolve_files(&self.root_dir)?.into_iter().collect();
        files.extend(self.overrides.keys().cloned());
        self.files = files;
        self.clear_cache();
        Ok(())
    }

    /// Drop cached snapshots and meta files.
    ///
    /// In-memory contents from `update_file` are kept.
    pub fn clear_cache(&mut self) {
        self.snapshots.get_mut().clear();
        self.meta_files.get_mut().clear();
        self.version += 1;
    }

    fn read_snapshot(&self, path: &str) -> Option<Rc<str>> {
        if let Some(snapshot) = self.snapshots.borrow().get(path) {
            return snapshot.clone();
        }
        let snapshot = match std::fs::read_to_string(path) {
            Ok(text) => Some(Rc::from(text)),
            Err(err) => {
                tracing::debug!("could not read {}: {}", path, err);
                None
            }
        };
        self.snapshots
            .borrow_mut()
            .insert(path.to_string(), snapshot.clone());
        snapshot
    }

    /// Component file a meta file name belongs to.
    fn component_of_meta(&self, meta: &str) -> Option<String> {
        component_candidates(meta)
            .into_iter()
            .find(|candidate| self.is_referenced(candidate))
    }

    fn meta_file(&self, meta: &str, component: &str) -> Option<Rc<str>> {
        let source = self.read_file(component)?;
        let exports = collect_export_names(component, &source, self.force_typed);
        let exports_hash = hash_str(&exports.join("\n"));

        if let Some(cached) = self.meta_files.borrow().get(meta) {
            if cached.exports_hash == exports_hash {
                return Some(Rc::clone(&cached.text));
            }
        }

        tracing::debug!("synthesize {} ({} exports)", meta, exports.len());
        let text: Rc<str> = Rc::from(meta_file_text(component, &exports));
        self.meta_files.borrow_mut().insert(
            meta.to_string(),
            MetaFile {
                exports_hash,
                text: Rc::clone(&text),
            },
        );
        Some(text)
    }
}
