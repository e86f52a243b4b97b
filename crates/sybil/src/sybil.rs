//! The orchestrator: which files to parse, with which parsers, and what a
//! host must do around each document.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use sybil_script::Namespace;

use crate::document::Document;
use crate::errors::DocumentError;
use crate::parsers::{CodeBlockParser, Parser, SkipParser};

/// Hook run against a document's namespace.
pub type NamespaceHook = Box<dyn Fn(&Namespace) + Send + Sync>;

/// Parser list plus file selection, setup/teardown hooks and fixture names.
///
/// A `Sybil` is shared by every worker of a host, so everything it holds is
/// `Send + Sync`.
///
/// ```text
/// let sybil = Sybil::new(vec![Arc::new(CodeBlockParser::script())])
///     .pattern("*.rst")?
///     .setup(|ns| { ns.insert("x", Value::Int(0)); })
///     .fixtures(["tmp_dir"]);
/// ```
pub struct Sybil {
    parsers: Vec<Arc<dyn Parser>>,
    pattern: Option<glob::Pattern>,
    filenames: FxHashSet<String>,
    setup: Option<NamespaceHook>,
    teardown: Option<NamespaceHook>,
    fixtures: Vec<String>,
}

impl Sybil {
    pub fn new(parsers: Vec<Arc<dyn Parser>>) -> Self {
        Sybil {
            parsers,
            pattern: None,
            filenames: FxHashSet::default(),
            setup: None,
            teardown: None,
            fixtures: Vec::new(),
        }
    }

    /// Script code blocks and skip directives.
    pub fn with_default_parsers() -> Self {
        Sybil::new(vec![
            Arc::new(CodeBlockParser::script()),
            Arc::new(SkipParser::new()),
        ])
    }

    /// Parse files whose name matches the glob `pattern`.
    pub fn pattern(mut self, pattern: &str) -> Result<Self, glob::PatternError> {
        self.pattern = Some(glob::Pattern::new(pattern)?);
        Ok(self)
    }

    /// Parse files with exactly these names.
    #[must_use]
    pub fn filenames<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filenames.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn setup(mut self, hook: impl Fn(&Namespace) + Send + Sync + 'static) -> Self {
        self.setup = Some(Box::new(hook));
        self
    }

    #[must_use]
    pub fn teardown(mut self, hook: impl Fn(&Namespace) + Send + Sync + 'static) -> Self {
        self.teardown = Some(Box::new(hook));
        self
    }

    /// Names a host must resolve and bind in the namespace before each
    /// example. Duplicates are dropped; order is kept.
    #[must_use]
    pub fn fixtures<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            let name = name.into();
            if !self.fixtures.contains(&name) {
                self.fixtures.push(name);
            }
        }
        self
    }

    pub fn parsers(&self) -> &[Arc<dyn Parser>] {
        &self.parsers
    }

    pub fn fixture_names(&self) -> &[String] {
        &self.fixtures
    }

    /// Whether the file at `path` should be turned into a document.
    pub fn should_parse(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.filenames.contains(name) || self.pattern.as_ref().is_some_and(|p| p.matches(name))
    }

    pub fn parse(&self, path: &Path) -> Result<Document, DocumentError> {
        Document::parse(path, &self.parsers)
    }

    /// Parse in-memory `text` as if it were the file at `path`.
    pub fn parse_text(
        &self,
        path: impl AsRef<Path>,
        text: impl Into<String>,
    ) -> Result<Document, DocumentError> {
        Document::from_text(path.as_ref(), text, &self.parsers)
    }

    pub fn run_setup(&self, namespace: &Namespace) {
        if let Some(setup) = &self.setup {
            setup(namespace);
        }
    }

    pub fn run_teardown(&self, namespace: &Namespace) {
        if let Some(teardown) = &self.teardown {
            teardown(namespace);
        }
    }
}

impl Default for Sybil {
    fn default() -> Self {
        Self::with_default_parsers()
    }
}

impl fmt::Debug for Sybil {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sybil")
            .field("parsers", &self.parsers.len())
            .field("pattern", &self.pattern.as_ref().map(glob::Pattern::as_str))
            .field("filenames", &self.filenames)
            .field("fixtures", &self.fixtures)
            .finish_non_exhaustive()
    }
}
