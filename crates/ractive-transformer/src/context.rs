//! Per-unit accumulator threaded through the rewrite passes.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use smol_str::SmolStr;
use std::fmt;

/// What an import binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBinding {
    /// `import name from 'module'`
    Default(SmolStr),
    /// `import { a, b } from 'module'`
    Named(Vec<SmolStr>),
}

/// A request to import `binding` from `module`.
///
/// Two requests are equal when they name the same module path.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    /// The bound name(s).
    pub binding: ImportBinding,
    /// The module path, without quotes.
    pub module: SmolStr,
}

impl ImportRequest {
    /// Creates a default-import request.
    pub fn default_import(name: impl Into<SmolStr>, module: impl Into<SmolStr>) -> Self {
        Self {
            binding: ImportBinding::Default(name.into()),
            module: module.into(),
        }
    }

    /// Creates a named-import request.
    pub fn named(name: impl Into<SmolStr>, module: impl Into<SmolStr>) -> Self {
        Self {
            binding: ImportBinding::Named(vec![name.into()]),
            module: module.into(),
        }
    }
}

impl PartialEq for ImportRequest {
    fn eq(&self, other: &Self) -> bool {
        self.module == other.module
    }
}

impl Eq for ImportRequest {}

impl fmt::Display for ImportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.binding {
            ImportBinding::Default(name) => write!(f, "import {} from '{}'", name, self.module),
            ImportBinding::Named(names) => {
                write!(f, "import {{ {} }} from '{}'", names.join(", "), self.module)
            }
        }
    }
}

/// Ordered, de-duplicated import requests keyed by module path.
#[derive(Debug, Clone, Default)]
pub struct ImportSet {
    requests: IndexMap<SmolStr, ImportRequest>,
}

impl ImportSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a request. The first registration of a module path wins; a later
    /// named import for the same module merges its names into the earlier
    /// named import.
    pub fn insert(&mut self, request: ImportRequest) {
        match self.requests.get_mut(&request.module) {
            None => {
                self.requests.insert(request.module.clone(), request);
            }
            Some(existing) => {
                if let (ImportBinding::Named(names), ImportBinding::Named(new_names)) =
                    (&mut existing.binding, request.binding)
                {
                    for name in new_names {
                        if !names.contains(&name) {
                            names.push(name);
                        }
                    }
                }
            }
        }
    }

    /// Returns whether a request for `module` exists.
    pub fn contains(&self, module: &str) -> bool {
        self.requests.contains_key(module)
    }

    /// Iterates requests in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ImportRequest> {
        self.requests.values()
    }

    /// Number of distinct module paths.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }
}

impl<'a> IntoIterator for &'a ImportSet {
    type Item = &'a ImportRequest;
    type IntoIter = indexmap::map::Values<'a, SmolStr, ImportRequest>;

    fn into_iter(self) -> Self::IntoIter {
        self.requests.values()
    }
}

impl FromIterator<ImportRequest> for ImportSet {
    fn from_iter<T: IntoIterator<Item = ImportRequest>>(iter: T) -> Self {
        let mut set = ImportSet::new();
        for request in iter {
            set.insert(request);
        }
        set
    }
}

/// A non-fatal condition raised while transforming a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransformWarning {
    /// The pass that raised the warning.
    pub pass: &'static str,
    /// What happened.
    pub message: String,
}

impl fmt::Display for TransformWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.pass, self.message)
    }
}

/// State accumulated while one unit runs through the pipeline.
///
/// Created fresh for every unit and never shared between units.
#[derive(Debug, Clone, Default)]
pub struct TransformContext {
    imports: ImportSet,
    shared_keys: IndexSet<SmolStr>,
    warnings: Vec<TransformWarning>,
}

impl TransformContext {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests `import name from 'module'`.
    pub fn import_default(&mut self, name: impl Into<SmolStr>, module: impl Into<SmolStr>) {
        self.imports
            .insert(ImportRequest::default_import(name, module));
    }

    /// Requests `import { name } from 'module'`.
    pub fn import_named(&mut self, name: impl Into<SmolStr>, module: impl Into<SmolStr>) {
        self.imports.insert(ImportRequest::named(name, module));
    }

    /// Records a reference to a shared-state key.
    pub fn reference_shared(&mut self, key: impl Into<SmolStr>) {
        self.shared_keys.insert(key.into());
    }

    /// Records a non-fatal warning.
    pub fn warn(&mut self, pass: &'static str, message: impl Into<String>) {
        self.warnings.push(TransformWarning {
            pass,
            message: message.into(),
        });
    }

    /// Pending import requests.
    pub fn imports(&self) -> &ImportSet {
        &self.imports
    }

    /// Referenced shared-state keys, in first-seen order.
    pub fn shared_keys(&self) -> &IndexSet<SmolStr> {
        &self.shared_keys
    }

    /// Warnings raised so far.
    pub fn warnings(&self) -> &[TransformWarning] {
        &self.warnings
    }

    /// Consumes the context, returning its parts.
    pub fn into_parts(self) -> (ImportSet, IndexSet<SmolStr>, Vec<TransformWarning>) {
        (self.imports, self.shared_keys, self.warnings)
    }
}
