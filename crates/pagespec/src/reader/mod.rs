//! Page spec compiler.
//!
//! [`PageSpecReader`] turns spec text into a [`PageSpec`]. One call to
//! [`PageSpecReader::read`] is one compilation: it owns its own import
//! resolver, variable table and section list, so a reader can be shared
//! between independent compilations.
//!
//! # Example
//!
//! ```
//! use pagespec::reader::{MemorySource, PageSpecReader};
//!
//! let source = MemorySource::new().with_file(
//!     "/specs/home.spec",
//!     "===\nmenu id menu\n===\n@ Main | desktop\nmenu\n    width: 100px\n",
//! );
//! let spec = PageSpecReader::new()
//!     .with_source(source)
//!     .read("/specs/home.spec", None)
//!     .unwrap();
//! assert_eq!(spec.sections[0].name, "Main");
//! ```

mod directives;
pub mod grammar;
pub mod imports;
pub mod lines;
pub mod params;
pub mod template;

pub use imports::{FileSource, FsSource, ImportResolver, MemorySource};

use crate::config::ReaderConfig;
use crate::eval::{BasicEvaluator, ExpressionEvaluator, Scope, Value};
use crate::locator::Locator;
use crate::model::{PageSection, PageSpec};
use crate::page::Page;
use crate::place::Place;
use crate::result::{SpecError, SpecResult};
use directives::FileReader;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Spec compiler with its collaborators
pub struct PageSpecReader {
    config: ReaderConfig,
    properties: BTreeMap<String, String>,
    evaluator: Box<dyn ExpressionEvaluator>,
    source: Box<dyn FileSource>,
}

impl fmt::Debug for PageSpecReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageSpecReader")
            .field("config", &self.config)
            .field("properties", &self.properties)
            .field("source", &self.source)
            .finish()
    }
}

impl Default for PageSpecReader {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSpecReader {
    /// Reader over the filesystem with the built-in evaluator
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: ReaderConfig::default(),
            properties: BTreeMap::new(),
            evaluator: Box::new(BasicEvaluator::new()),
            source: Box::new(FsSource),
        }
    }

    /// Set reader configuration
    #[must_use]
    pub fn with_config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the initial property set
    #[must_use]
    pub fn with_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.properties = properties;
        self
    }

    /// Add one property
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Use another expression engine
    #[must_use]
    pub fn with_evaluator(mut self, evaluator: impl ExpressionEvaluator + 'static) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    /// Use another file source
    #[must_use]
    pub fn with_source(mut self, source: impl FileSource + 'static) -> Self {
        self.source = Box::new(source);
        self
    }

    /// Reader configuration
    #[must_use]
    pub const fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// Compile a spec file.
    ///
    /// `page` is consulted for `name-*` object groups and page functions in
    /// expressions; without it such groups declare nothing.
    ///
    /// # Errors
    ///
    /// Returns the first syntax, indentation, import or evaluation error
    pub fn read(&self, path: impl AsRef<Path>, page: Option<&dyn Page>) -> SpecResult<PageSpec> {
        let requested = path.as_ref().to_string_lossy().into_owned();
        let mut compilation = Compilation::new(self, page);
        compilation.process_file(&requested, None)?;
        Ok(compilation.finish())
    }

    /// Compile spec text; `label` names it in places and anchors relative
    /// imports
    ///
    /// # Errors
    ///
    /// Returns the first syntax, indentation, import or evaluation error
    pub fn read_text(
        &self,
        text: &str,
        label: &str,
        page: Option<&dyn Page>,
    ) -> SpecResult<PageSpec> {
        let mut compilation = Compilation::new(self, page);
        let path = imports::normalize_path(label);
        compilation
            .imports
            .mark_loaded(imports::file_id(&path, text));
        compilation.process_text(text, &path)?;
        Ok(compilation.finish())
    }
}

/// Mutable state of one compilation
pub(crate) struct Compilation<'r> {
    pub(crate) reader: &'r PageSpecReader,
    pub(crate) page: Option<&'r dyn Page>,
    pub(crate) imports: ImportResolver,
    pub(crate) variables: BTreeMap<String, Value>,
    pub(crate) spec: PageSpec,
}

impl<'r> Compilation<'r> {
    fn new(reader: &'r PageSpecReader, page: Option<&'r dyn Page>) -> Self {
        Self {
            reader,
            page,
            imports: ImportResolver::new(),
            variables: BTreeMap::new(),
            spec: PageSpec::new(),
        }
    }

    fn read_source(&self, path: &Path, origin: Option<&Place>) -> SpecResult<String> {
        self.reader.source.read(path).map_err(|e| SpecError::Import {
            path: path.display().to_string(),
            reason: e.to_string(),
            place: origin.cloned(),
        })
    }

    /// Compile an imported (or the root) spec file unless already loaded
    pub(crate) fn process_file(&mut self, requested: &str, origin: Option<&Place>) -> SpecResult<()> {
        let path = self.imports.resolve(requested);
        let content = self.read_source(&path, origin)?;
        if !self.imports.mark_loaded(imports::file_id(&path, &content)) {
            tracing::debug!(path = %path.display(), "skipping already loaded spec");
            return Ok(());
        }
        tracing::debug!(path = %path.display(), "reading spec");
        self.process_text(&content, &path)
    }

    fn process_text(&mut self, text: &str, path: &Path) -> SpecResult<()> {
        let label = path.display().to_string();
        let lines = lines::tokenize(text, &label, 0)?;
        self.imports.push_file(path);
        let result = FileReader::new(self).run(lines);
        self.imports.pop();
        result
    }

    /// Run an auxiliary script unless already loaded
    pub(crate) fn load_script(&mut self, requested: &str, origin: &Place) -> SpecResult<()> {
        let path = self.imports.resolve(requested);
        let content = self.read_source(&path, Some(origin))?;
        if !self.imports.mark_loaded(imports::file_id(&path, &content)) {
            tracing::debug!(path = %path.display(), "skipping already loaded script");
            return Ok(());
        }
        let definitions = {
            let scope = Scope::new(&self.variables, &self.spec.objects, self.page);
            self.reader
                .evaluator
                .load_script(&path, &content, &scope)
                .map_err(|e| {
                    SpecError::evaluation(
                        format!("Error loading script {}: {e}", path.display()),
                        origin,
                    )
                })?
        };
        tracing::debug!(path = %path.display(), count = definitions.len(), "loaded script");
        self.variables.extend(definitions);
        Ok(())
    }

    /// Apply index, property and expression substitution to one line
    pub(crate) fn substitute(
        &self,
        text: &str,
        place: &Place,
        index: Option<i64>,
    ) -> SpecResult<String> {
        let text = match index {
            Some(index) => Cow::Owned(params::substitute_index(text, index, place)?),
            None => Cow::Borrowed(text),
        };
        let text = template::expand_properties(&text, &self.reader.properties);
        let variables = match index {
            Some(index) => {
                let mut variables = self.variables.clone();
                variables.insert("index".to_string(), Value::Number(index as f64));
                Cow::Owned(variables)
            }
            None => Cow::Borrowed(&self.variables),
        };
        let scope = Scope::new(&variables, &self.spec.objects, self.page);
        template::substitute_expressions(&text, place, self.reader.evaluator.as_ref(), &scope)
    }

    /// Declare an object; names are unique across the compilation
    pub(crate) fn declare_object(
        &mut self,
        name: &str,
        locator: Locator,
        place: &Place,
    ) -> SpecResult<()> {
        if self.spec.objects.contains_key(name) {
            return Err(SpecError::syntax(
                format!("Object \"{name}\" is already defined"),
                place,
            ));
        }
        tracing::trace!(name, %locator, "declared object");
        self.spec.objects.insert(name.to_string(), locator);
        Ok(())
    }

    pub(crate) fn push_section(&mut self, section: PageSection) -> usize {
        tracing::debug!(name = %section.name, tags = ?section.tags, "section");
        self.spec.sections.push(section);
        self.spec.sections.len() - 1
    }

    fn finish(mut self) -> PageSpec {
        if self.reader.config.drop_empty_sections {
            self.spec.sections.retain(|section| !section.is_empty());
        }
        self.spec
    }
}
