//! Design-system configuration.
//!
//! A design system is opaque data to the component layer: class-name
//! prefixes, the locator expressions for its overlay surfaces and options,
//! and the predicates that decode widget state from attributes. Behavior
//! that varies per design system (how an overlay opens, how it closes) is
//! injected as plain function-valued fields rather than virtual dispatch
//! through an inheritance tree, so a new design system is a new
//! [`DesignConfig`] value, not a new type hierarchy.

use crate::element::Element;
use crate::query::{Query, QueryExpr, Tag};
use crate::result::ManejarResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Side-effect strategy, e.g. an open or close trigger
pub type TriggerFn = Arc<dyn Fn(&Element) -> ManejarResult<()> + Send + Sync>;

/// Per-element predicate decoded from the live tree
pub type ElementPredicate = Arc<dyn Fn(&Element) -> ManejarResult<bool> + Send + Sync>;

/// How an option is addressed by the generic selection entry points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OptionIdentity {
    /// Zero-based position in document order
    Index,
    /// Match against the configured value attribute
    Value,
    /// Exact visible-text match
    VisibleText,
}

/// Selection semantics for an option-bearing widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Identity strategy used by the generic `select`/`deselect` entry
    /// points
    pub identity: OptionIdentity,
    /// Whether multiple concurrent selections are permitted. The state
    /// machine never enforces exclusivity itself; this only documents the
    /// widget's native semantics.
    pub multiple: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            identity: OptionIdentity::VisibleText,
            multiple: false,
        }
    }
}

impl SelectionConfig {
    /// Single-select with visible-text identity
    #[must_use]
    pub fn single() -> Self {
        Self::default()
    }

    /// Multi-select with visible-text identity
    #[must_use]
    pub const fn multi() -> Self {
        Self {
            identity: OptionIdentity::VisibleText,
            multiple: true,
        }
    }

    /// Set the identity strategy
    #[must_use]
    pub const fn with_identity(mut self, identity: OptionIdentity) -> Self {
        self.identity = identity;
        self
    }

    /// Set whether multiple selections are permitted
    #[must_use]
    pub const fn with_multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }
}

/// Configuration for one design system.
///
/// The defaults decode conventional ARIA markup: overlays carry a
/// `{prefix}-overlay` class, options carry `role="option"`, selection and
/// disablement live in `aria-selected` / `aria-disabled`. Real design
/// systems override whichever pieces differ.
#[derive(Clone)]
pub struct DesignConfig {
    name: String,
    prefix: String,
    overlay_root: QueryExpr,
    option_locator: QueryExpr,
    value_attribute: String,
    selected_pred: ElementPredicate,
    disabled_pred: ElementPredicate,
    opener: TriggerFn,
    closer: TriggerFn,
}

impl std::fmt::Debug for DesignConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesignConfig")
            .field("name", &self.name)
            .field("prefix", &self.prefix)
            .field("overlay_root", &self.overlay_root)
            .field("option_locator", &self.option_locator)
            .field("value_attribute", &self.value_attribute)
            .finish_non_exhaustive()
    }
}

impl DesignConfig {
    /// Create a configuration with ARIA-conventional defaults for the given
    /// design system name and class prefix.
    ///
    /// Default triggers: opening clicks the owning component, closing sends
    /// it an Escape key.
    #[must_use]
    pub fn new(name: impl Into<String>, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        Self {
            name: name.into(),
            overlay_root: Query::anywhere()
                .attr_contains("class", format!("{prefix}-overlay"))
                .build(),
            option_locator: Query::from_context()
                .descendant(Tag::Any)
                .attr_eq("role", "option")
                .build(),
            value_attribute: "data-value".to_string(),
            selected_pred: Arc::new(|el: &Element| {
                Ok(el.attribute("aria-selected")?.as_deref() == Some("true"))
            }),
            disabled_pred: Arc::new(|el: &Element| {
                Ok(el.attribute("aria-disabled")?.as_deref() == Some("true"))
            }),
            opener: Arc::new(|el: &Element| el.click()),
            closer: Arc::new(|el: &Element| el.press_key(crate::driver::Key::Escape)),
            prefix,
        }
    }

    /// Override the overlay-root expression (anchored at the document root)
    #[must_use]
    pub fn with_overlay_root(mut self, expr: QueryExpr) -> Self {
        self.overlay_root = expr;
        self
    }

    /// Override the option expression (anchored at the overlay container)
    #[must_use]
    pub fn with_option_locator(mut self, expr: QueryExpr) -> Self {
        self.option_locator = expr;
        self
    }

    /// Override the declared value attribute of options
    #[must_use]
    pub fn with_value_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.value_attribute = attribute.into();
        self
    }

    /// Override the selected-state predicate
    #[must_use]
    pub fn with_is_selected<F>(mut self, pred: F) -> Self
    where
        F: Fn(&Element) -> ManejarResult<bool> + Send + Sync + 'static,
    {
        self.selected_pred = Arc::new(pred);
        self
    }

    /// Override the disabled-state predicate
    #[must_use]
    pub fn with_is_disabled<F>(mut self, pred: F) -> Self
    where
        F: Fn(&Element) -> ManejarResult<bool> + Send + Sync + 'static,
    {
        self.disabled_pred = Arc::new(pred);
        self
    }

    /// Override the open-trigger strategy
    #[must_use]
    pub fn with_open_trigger<F>(mut self, trigger: F) -> Self
    where
        F: Fn(&Element) -> ManejarResult<()> + Send + Sync + 'static,
    {
        self.opener = Arc::new(trigger);
        self
    }

    /// Override the close-trigger strategy
    #[must_use]
    pub fn with_close_trigger<F>(mut self, trigger: F) -> Self
    where
        F: Fn(&Element) -> ManejarResult<()> + Send + Sync + 'static,
    {
        self.closer = Arc::new(trigger);
        self
    }

    /// Design system name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Class prefix of the design system
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Expression resolving all overlay surfaces from the document root
    #[must_use]
    pub fn overlay_root(&self) -> &QueryExpr {
        &self.overlay_root
    }

    /// Expression resolving options inside an overlay container
    #[must_use]
    pub fn option_locator(&self) -> &QueryExpr {
        &self.option_locator
    }

    /// Name of the declared value attribute of options
    #[must_use]
    pub fn value_attribute(&self) -> &str {
        &self.value_attribute
    }

    /// Whether the element reports itself as selected
    pub fn is_selected(&self, element: &Element) -> ManejarResult<bool> {
        (self.selected_pred)(element)
    }

    /// Whether the element reports itself as disabled (locked in)
    pub fn is_disabled(&self, element: &Element) -> ManejarResult<bool> {
        (self.disabled_pred)(element)
    }

    /// Run the open trigger against the owning component
    pub fn open(&self, element: &Element) -> ManejarResult<()> {
        (self.opener)(element)
    }

    /// Run the close trigger against the owning component
    pub fn close(&self, element: &Element) -> ManejarResult<()> {
        (self.closer)(element)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod selection_config_tests {
        use super::*;

        #[test]
        fn test_default_is_single_visible_text() {
            let config = SelectionConfig::default();
            assert_eq!(config.identity, OptionIdentity::VisibleText);
            assert!(!config.multiple);
        }

        #[test]
        fn test_multi() {
            assert!(SelectionConfig::multi().multiple);
        }

        #[test]
        fn test_with_identity() {
            let config = SelectionConfig::single().with_identity(OptionIdentity::Index);
            assert_eq!(config.identity, OptionIdentity::Index);
        }
    }

    mod design_config_tests {
        use super::*;

        #[test]
        fn test_default_overlay_root_uses_prefix() {
            let config = DesignConfig::new("aurora", "au");
            let expected = Query::anywhere()
                .attr_contains("class", "au-overlay")
                .build();
            assert_eq!(config.overlay_root(), &expected);
        }

        #[test]
        fn test_default_option_locator_is_relative() {
            let config = DesignConfig::new("aurora", "au");
            let expected = Query::from_context()
                .descendant(Tag::Any)
                .attr_eq("role", "option")
                .build();
            assert_eq!(config.option_locator(), &expected);
        }

        #[test]
        fn test_overrides() {
            let overlay = Query::anywhere().attr_eq("data-panel", "true").build();
            let config = DesignConfig::new("aurora", "au")
                .with_overlay_root(overlay.clone())
                .with_value_attribute("data-key");
            assert_eq!(config.overlay_root(), &overlay);
            assert_eq!(config.value_attribute(), "data-key");
        }

        #[test]
        fn test_debug_does_not_require_fn_fields() {
            let config = DesignConfig::new("aurora", "au");
            let rendered = format!("{config:?}");
            assert!(rendered.contains("aurora"));
        }
    }
}
