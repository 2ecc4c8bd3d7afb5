//! Checker options.
//!
//! Options are usually read from JSON (`vize.config.json`, tool settings) and
//! use camelCase keys:
//!
//! ```json
//! {
//!   "forceTreatAsTyped": false,
//!   "schema": { "ignore": ["HTMLElement", "MouseEvent"] },
//!   "printerOptions": { "singleQuote": true },
//!   "includeRawType": false,
//!   "skipDeclarationLookup": false
//! }
//! ```

use std::fmt;
use std::rc::Rc;

use serde::Deserialize;

use crate::service::{TypeId, TypeService};

/// Options for [`crate::ComponentMetaChecker`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetaCheckerOptions {
    /// Parse component scripts without a `lang` attribute as TypeScript.
    pub force_treat_as_typed: bool,
    /// Schema expansion settings.
    pub schema: SchemaOptions,
    /// Re-print default expressions instead of keeping their source text.
    pub printer_options: Option<PrinterOptions>,
    /// Attach the raw type handle to each property.
    pub include_raw_type: bool,
    /// Never resolve declaration locations.
    pub skip_declaration_lookup: bool,
}

impl MetaCheckerOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set schema options.
    pub fn with_schema(mut self, schema: SchemaOptions) -> Self {
        self.schema = schema;
        self
    }

    /// Set printer options.
    pub fn with_printer(mut self, printer: PrinterOptions) -> Self {
        self.printer_options = Some(printer);
        self
    }

    /// Enable or disable raw type handles.
    pub fn with_raw_type(mut self, include: bool) -> Self {
        self.include_raw_type = include;
        self
    }

    /// Enable or disable declaration lookup.
    pub fn with_skip_declaration_lookup(mut self, skip: bool) -> Self {
        self.skip_declaration_lookup = skip;
        self
    }
}

/// `schema: true | false | { ignore: [...] }`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SchemaOptions {
    Enabled(bool),
    Ignore {
        #[serde(default)]
        ignore: Vec<IgnoreRule>,
    },
}

impl Default for SchemaOptions {
    fn default() -> Self {
        Self::Enabled(true)
    }
}

impl SchemaOptions {
    /// Whether types are expanded at all.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Enabled(false))
    }

    /// Ignore rules, empty unless configured.
    pub fn ignore_rules(&self) -> &[IgnoreRule] {
        match self {
            Self::Enabled(_) => &[],
            Self::Ignore { ignore } => ignore,
        }
    }
}

/// Predicate deciding whether a type stays unexpanded.
///
/// Returning `None` defers to the remaining rules.
pub type IgnorePredicate = Rc<dyn Fn(&str, TypeId, &dyn TypeService) -> Option<bool>>;

/// A rule that stops schema expansion for matching types.
#[derive(Clone, Deserialize)]
#[serde(from = "String")]
pub enum IgnoreRule {
    /// Exact fully qualified type name.
    Name(String),
    Predicate(IgnorePredicate),
}

impl IgnoreRule {
    /// Create a predicate rule.
    pub fn predicate(
        predicate: impl Fn(&str, TypeId, &dyn TypeService) -> Option<bool> + 'static,
    ) -> Self {
        Self::Predicate(Rc::new(predicate))
    }

    /// Evaluate the rule. `None` means the rule has no opinion.
    pub fn evaluate(&self, name: &str, ty: TypeId, service: &dyn TypeService) -> Option<bool> {
        match self {
            Self::Name(ignored) => (ignored == name).then_some(true),
            Self::Predicate(predicate) => predicate(name, ty, service),
        }
    }
}

impl From<String> for IgnoreRule {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

impl From<&str> for IgnoreRule {
    fn from(name: &str) -> Self {
        Self::Name(name.to_string())
    }
}

impl fmt::Debug for IgnoreRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(name) => f.debug_tuple("Name").field(name).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Printing of default value expressions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrinterOptions {
    /// Prefer single quotes for string literals.
    pub single_quote: bool,
    /// Print without whitespace.
    pub minify: bool,
}
