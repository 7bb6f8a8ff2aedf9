//! Element handles and typed components.
//!
//! An [`Element`] wraps a raw node handle together with its driver. It is a
//! lightweight reference: cloning is cheap, nothing is cached, and every
//! read goes back to the live tree. Multiple elements (and multiple typed
//! components) may wrap the same node concurrently; none of them owns it.
//!
//! Reinterpreting a generic handle as a typed widget is an explicit tagged
//! conversion ([`Element::reinterpret`]) keyed by the component's name and
//! a design-system configuration. There is no runtime downcasting.

use crate::config::DesignConfig;
use crate::driver::{Driver, Key, KeyInput, NodeId, Rect};
use crate::query::QueryExpr;
use crate::result::ManejarResult;
use std::sync::Arc;

/// A live handle to one element in the automated tree
#[derive(Clone)]
pub struct Element {
    driver: Arc<dyn Driver>,
    id: NodeId,
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element").field("id", &self.id).finish()
    }
}

impl Element {
    /// Wrap a node handle
    #[must_use]
    pub fn new(driver: Arc<dyn Driver>, id: NodeId) -> Self {
        Self { driver, id }
    }

    /// The underlying node id
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// The driver this element reads through
    #[must_use]
    pub fn driver(&self) -> &Arc<dyn Driver> {
        &self.driver
    }

    /// Tag name, read live
    pub fn tag_name(&self) -> ManejarResult<String> {
        self.driver.tag_name(self.id)
    }

    /// Attribute value, read live; `None` when absent
    pub fn attribute(&self, name: &str) -> ManejarResult<Option<String>> {
        self.driver.attribute(self.id, name)
    }

    /// Raw text content, read live
    pub fn text(&self) -> ManejarResult<String> {
        self.driver.text(self.id)
    }

    /// Text as rendered: leading/trailing whitespace normalized
    pub fn visible_text(&self) -> ManejarResult<String> {
        Ok(self.text()?.trim().to_string())
    }

    /// Geometry rectangle, read live
    pub fn rect(&self) -> ManejarResult<Rect> {
        self.driver.rect(self.id)
    }

    /// Whether the element is currently visible
    pub fn is_visible(&self) -> ManejarResult<bool> {
        self.driver.is_visible(self.id)
    }

    /// Whether the space-separated `class` attribute contains the token
    pub fn has_class(&self, token: &str) -> ManejarResult<bool> {
        Ok(self
            .attribute("class")?
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == token)))
    }

    /// Simulate a click
    pub fn click(&self) -> ManejarResult<()> {
        self.driver.click(self.id)
    }

    /// Simulate typing literal text
    pub fn type_text(&self, text: impl Into<String>) -> ManejarResult<()> {
        self.driver.send_keys(self.id, &KeyInput::text(text))
    }

    /// Simulate pressing a special key
    pub fn press_key(&self, key: Key) -> ManejarResult<()> {
        self.driver.send_keys(self.id, &KeyInput::special(key))
    }

    /// Find the first match of `expr` relative to this element
    pub fn find(&self, expr: &QueryExpr) -> ManejarResult<Option<Element>> {
        Ok(self
            .driver
            .find(expr, Some(self.id))?
            .map(|id| Element::new(Arc::clone(&self.driver), id)))
    }

    /// Find all matches of `expr` relative to this element, document order
    pub fn find_all(&self, expr: &QueryExpr) -> ManejarResult<Vec<Element>> {
        Ok(self
            .driver
            .find_all(expr, Some(self.id))?
            .into_iter()
            .map(|id| Element::new(Arc::clone(&self.driver), id))
            .collect())
    }

    /// Reinterpret this handle as a typed component.
    ///
    /// This is a view conversion, not a cast: the returned wrapper shares
    /// the node non-exclusively and carries the design configuration that
    /// decodes its semantics. Use [`Component::validate`] afterwards when
    /// the tag is unverified.
    #[must_use]
    pub fn reinterpret<C: Component>(&self, design: &Arc<DesignConfig>) -> C {
        tracing::debug!(
            node = %self.id,
            component = C::component_name(),
            design = design.name(),
            "reinterpreting handle as typed component"
        );
        C::attach(self.clone(), Arc::clone(design))
    }
}

/// A typed view over an [`Element`] for one widget kind of a design system.
///
/// Implementations are thin records: the widget's behavior comes from the
/// shared protocols and the injected [`DesignConfig`], not from the type.
pub trait Component: Sized {
    /// The component-name tag used for construction and structural checks
    /// (e.g. `"select"`, `"slider"`)
    fn component_name() -> &'static str;

    /// Construct the typed view. Infallible by design; structural mismatch
    /// is reported by [`Component::validate`], not at attach time.
    fn attach(element: Element, design: Arc<DesignConfig>) -> Self;

    /// The wrapped element
    fn element(&self) -> &Element;

    /// The design configuration in effect
    fn design(&self) -> &Arc<DesignConfig>;

    /// Structural type check: does the wrapped node actually look like this
    /// component in this design system? The default checks for the
    /// `{prefix}-{component_name}` class.
    fn validate(&self) -> ManejarResult<bool> {
        let marker = format!("{}-{}", self.design().prefix(), Self::component_name());
        self.element().has_class(&marker)
    }
}
