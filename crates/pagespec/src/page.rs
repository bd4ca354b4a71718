//! Page capability consumed by the compiler and the validation engine.
//!
//! Driving a real browser is the job of whoever implements [`Page`]. The
//! crate ships [`JsonPage`], a page backed by a JSON snapshot of element
//! geometry, which the CLI and the tests use.

use crate::locator::{Locator, LocatorKind, Rect};
use crate::result::{SpecError, SpecResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Upper bound on positional probing in [`Page::count`]
const MAX_PROBED_ELEMENTS: usize = 10_000;

/// A resolved element on the page
pub trait PageElement {
    /// Current area of the element
    fn rect(&self) -> Rect;

    /// Visible text, if the element has any
    fn text(&self) -> Option<String>;

    /// Whether the element is rendered
    fn is_visible(&self) -> bool;
}

/// One rendering session.
///
/// Implementations own all flakiness handling; the engine never retries.
pub trait Page {
    /// Resolve a locator to an element
    fn find_element(&self, locator: &Locator) -> Option<Box<dyn PageElement + '_>>;

    /// Area of the viewport, used for the implicit `screen` object
    fn screen(&self) -> Option<Rect> {
        None
    }

    /// Page view restricted to the element matched by `parent`
    fn within(&self, parent: &Locator) -> Option<Box<dyn Page + '_>>;

    /// Number of elements matched by the locator, ignoring its index
    fn count(&self, locator: &Locator) -> usize {
        let base = locator.without_index();
        (1..=MAX_PROBED_ELEMENTS)
            .take_while(|index| self.find_element(&base.clone().with_index(*index)).is_some())
            .count()
    }
}

/// Element entry of a page snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonElement {
    /// Matcher kind this element answers to
    pub kind: LocatorKind,
    /// Selector this element answers to
    pub selector: String,
    /// Element area
    pub rect: Rect,
    /// Element text
    #[serde(default)]
    pub text: Option<String>,
    /// Rendered flag
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Elements nested inside, addressed when a component is scoped here
    #[serde(default)]
    pub children: Vec<JsonElement>,
}

const fn default_visible() -> bool {
    true
}

impl JsonElement {
    /// Create a visible element without text
    #[must_use]
    pub fn new(locator: &Locator, rect: Rect) -> Self {
        Self {
            kind: locator.kind,
            selector: locator.selector.clone(),
            rect,
            text: None,
            visible: true,
            children: Vec::new(),
        }
    }

    /// Set the text
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set visibility
    #[must_use]
    pub const fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Add a nested element
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    fn answers_to(&self, locator: &Locator) -> bool {
        self.kind == locator.kind && self.selector == locator.selector
    }
}

impl PageElement for &JsonElement {
    fn rect(&self) -> Rect {
        self.rect
    }

    fn text(&self) -> Option<String> {
        self.text.clone()
    }

    fn is_visible(&self) -> bool {
        self.visible
    }
}

/// Page snapshot loaded from JSON
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JsonPage {
    /// Viewport area
    #[serde(default)]
    pub screen: Option<Rect>,
    /// Top-level elements; several entries may share a selector
    #[serde(default)]
    pub elements: Vec<JsonElement>,
}

impl JsonPage {
    /// Create an empty page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the viewport area
    #[must_use]
    pub const fn with_screen(mut self, screen: Rect) -> Self {
        self.screen = Some(screen);
        self
    }

    /// Add an element
    #[must_use]
    pub fn with_element(mut self, element: JsonElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Parse a snapshot from JSON text
    ///
    /// # Errors
    ///
    /// Returns error if the JSON does not describe a page
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load a snapshot file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn load(path: &Path) -> SpecResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| SpecError::Import {
            path: path.display().to_string(),
            reason: e.to_string(),
            place: None,
        })?;
        Self::from_json(&text).map_err(|e| SpecError::Import {
            path: path.display().to_string(),
            reason: e.to_string(),
            place: None,
        })
    }

    fn view(&self) -> ElementsView<'_> {
        ElementsView {
            screen: self.screen,
            elements: &self.elements,
        }
    }
}

impl Page for JsonPage {
    fn find_element(&self, locator: &Locator) -> Option<Box<dyn PageElement + '_>> {
        self.view().lookup(locator).map(boxed)
    }

    fn screen(&self) -> Option<Rect> {
        self.screen
    }

    fn within(&self, parent: &Locator) -> Option<Box<dyn Page + '_>> {
        self.view().scoped(parent)
    }

    fn count(&self, locator: &Locator) -> usize {
        Page::count(&self.view(), locator)
    }
}

fn boxed(element: &JsonElement) -> Box<dyn PageElement + '_> {
    Box::new(element)
}

/// Borrowed slice of snapshot elements acting as a page
#[derive(Debug, Clone, Copy)]
struct ElementsView<'a> {
    screen: Option<Rect>,
    elements: &'a [JsonElement],
}

impl<'a> ElementsView<'a> {
    fn lookup(&self, locator: &Locator) -> Option<&'a JsonElement> {
        let position = locator.index.unwrap_or(1).checked_sub(1)?;
        self.elements
            .iter()
            .filter(|e| e.answers_to(locator))
            .nth(position)
    }

    fn scoped(&self, parent: &Locator) -> Option<Box<dyn Page + 'a>> {
        let element = self.lookup(parent)?;
        Some(Box::new(ElementsView {
            screen: self.screen,
            elements: &element.children,
        }))
    }
}

impl Page for ElementsView<'_> {
    fn find_element(&self, locator: &Locator) -> Option<Box<dyn PageElement + '_>> {
        self.lookup(locator).map(boxed)
    }

    fn screen(&self) -> Option<Rect> {
        self.screen
    }

    fn within(&self, parent: &Locator) -> Option<Box<dyn Page + '_>> {
        self.scoped(parent)
    }

    fn count(&self, locator: &Locator) -> usize {
        self.elements.iter().filter(|e| e.answers_to(locator)).count()
    }
}
