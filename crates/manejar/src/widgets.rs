//! Typed widget wrappers.
//!
//! Every widget here is a thin data record over the shared protocols: an
//! [`OptionHost`] plus a component-name tag. Behavior differences between
//! design systems live in the injected [`DesignConfig`], not in per-widget
//! type hierarchies, so adding a widget kind is a few lines of delegation.

use crate::config::{DesignConfig, SelectionConfig};
use crate::element::{Component, Element};
use crate::overlay;
use crate::result::{ManejarError, ManejarResult};
use crate::selection::{OptionHost, OptionItem};
use crate::wait::{self, WaitOptions};
use std::sync::Arc;

/// Attribute marking an expanded (submenu-bearing) item
const EXPANDED_ATTR: &str = "aria-expanded";

/// A single-select dropdown
#[derive(Debug, Clone)]
pub struct SelectBox {
    host: OptionHost,
}

impl Component for SelectBox {
    fn component_name() -> &'static str {
        "select"
    }

    fn attach(element: Element, design: Arc<DesignConfig>) -> Self {
        Self {
            host: OptionHost::new(element, design).with_selection(SelectionConfig::single()),
        }
    }

    fn element(&self) -> &Element {
        self.host.element()
    }

    fn design(&self) -> &Arc<DesignConfig> {
        self.host.design()
    }
}

impl SelectBox {
    /// Set the wait budget for open/close verification
    #[must_use]
    pub fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.host = self.host.with_wait(wait);
        self
    }

    /// The underlying protocol driver
    #[must_use]
    pub const fn host(&self) -> &OptionHost {
        &self.host
    }

    /// Open the options overlay (idempotent)
    pub fn open_options(&self) -> ManejarResult<Element> {
        self.host.ensure_open()
    }

    /// Close the options overlay (idempotent)
    pub fn close_options(&self) -> ManejarResult<()> {
        self.host.ensure_closed()
    }

    /// Fresh snapshot of all options
    pub fn options(&self) -> ManejarResult<Vec<OptionItem>> {
        self.host.options()
    }

    /// The currently selected option, if any
    pub fn selected_option(&self) -> ManejarResult<Option<OptionItem>> {
        Ok(self.host.selected_options()?.into_iter().next())
    }

    /// Select by zero-based index
    pub fn select_by_index(&self, index: usize) -> ManejarResult<()> {
        self.host.select_by_index(index)
    }

    /// Select by the configured value attribute
    pub fn select_by_value(&self, value: &str) -> ManejarResult<()> {
        self.host.select_by_value(value)
    }

    /// Select by exact visible text
    pub fn select_by_visible_text(&self, text: &str) -> ManejarResult<()> {
        self.host.select_by_visible_text(text)
    }
}

/// A multi-select widget
#[derive(Debug, Clone)]
pub struct MultiSelect {
    host: OptionHost,
}

impl Component for MultiSelect {
    fn component_name() -> &'static str {
        "multiselect"
    }

    fn attach(element: Element, design: Arc<DesignConfig>) -> Self {
        Self {
            host: OptionHost::new(element, design).with_selection(SelectionConfig::multi()),
        }
    }

    fn element(&self) -> &Element {
        self.host.element()
    }

    fn design(&self) -> &Arc<DesignConfig> {
        self.host.design()
    }
}

impl MultiSelect {
    /// Set the wait budget for open/close verification
    #[must_use]
    pub fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.host = self.host.with_wait(wait);
        self
    }

    /// The underlying protocol driver
    #[must_use]
    pub const fn host(&self) -> &OptionHost {
        &self.host
    }

    /// Open the options overlay (idempotent)
    pub fn open_options(&self) -> ManejarResult<Element> {
        self.host.ensure_open()
    }

    /// Close the options overlay (idempotent)
    pub fn close_options(&self) -> ManejarResult<()> {
        self.host.ensure_closed()
    }

    /// Fresh snapshot of all options
    pub fn options(&self) -> ManejarResult<Vec<OptionItem>> {
        self.host.options()
    }

    /// All currently selected options, in snapshot order
    pub fn selected_options(&self) -> ManejarResult<Vec<OptionItem>> {
        self.host.selected_options()
    }

    /// Select by zero-based index
    pub fn select_by_index(&self, index: usize) -> ManejarResult<()> {
        self.host.select_by_index(index)
    }

    /// Select by the configured value attribute
    pub fn select_by_value(&self, value: &str) -> ManejarResult<()> {
        self.host.select_by_value(value)
    }

    /// Select by exact visible text
    pub fn select_by_visible_text(&self, text: &str) -> ManejarResult<()> {
        self.host.select_by_visible_text(text)
    }

    /// Deselect by zero-based index
    pub fn deselect_by_index(&self, index: usize) -> ManejarResult<()> {
        self.host.deselect_by_index(index)
    }

    /// Deselect by the configured value attribute
    pub fn deselect_by_value(&self, value: &str) -> ManejarResult<()> {
        self.host.deselect_by_value(value)
    }

    /// Deselect by exact visible text
    pub fn deselect_by_visible_text(&self, text: &str) -> ManejarResult<()> {
        self.host.deselect_by_visible_text(text)
    }

    /// Deselect everything except locked-in options
    pub fn deselect_all(&self) -> ManejarResult<()> {
        self.host.deselect_all()
    }
}

/// A drill-down menu.
///
/// Items live in overlay surfaces; expanding an item attaches a submenu
/// surface after the current one, and the overlay tie-break (newest visible
/// surface wins) makes that submenu the current container for subsequent
/// item queries.
#[derive(Debug, Clone)]
pub struct Menu {
    host: OptionHost,
}

impl Component for Menu {
    fn component_name() -> &'static str {
        "menu"
    }

    fn attach(element: Element, design: Arc<DesignConfig>) -> Self {
        Self {
            host: OptionHost::new(element, design),
        }
    }

    fn element(&self) -> &Element {
        self.host.element()
    }

    fn design(&self) -> &Arc<DesignConfig> {
        self.host.design()
    }
}

impl Menu {
    /// Set the wait budget for open/close verification
    #[must_use]
    pub fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.host = self.host.with_wait(wait);
        self
    }

    /// Open the menu surface (idempotent)
    pub fn open(&self) -> ManejarResult<Element> {
        self.host.ensure_open()
    }

    /// Items of the current (top-most) menu surface
    pub fn items(&self) -> ManejarResult<Vec<OptionItem>> {
        self.host.options()
    }

    /// Expand the item at `index` into its submenu and return the submenu
    /// surface.
    ///
    /// Waits for a surface different from the current one to become the
    /// top visible container.
    ///
    /// # Errors
    ///
    /// [`ManejarError::NotFound`] when the index addresses no item or no
    /// submenu appears within the wait budget.
    pub fn expand(&self, index: usize) -> ManejarResult<Element> {
        let current = self.host.ensure_open()?;
        let item = self
            .host
            .options()?
            .into_iter()
            .nth(index)
            .ok_or_else(|| ManejarError::NotFound {
                what: format!("menu item {index}"),
            })?;

        tracing::debug!(index, "expanding menu item");
        item.element().click()?;

        let current_id = current.id();
        let driver = self.host.element().driver();
        let design = self.host.design();
        match wait::poll_until(self.host.wait(), || {
            Ok(overlay::find_top_visible_container(driver, design)?
                .filter(|surface| surface.id() != current_id))
        }) {
            Ok(surface) => Ok(surface),
            Err(ManejarError::Timeout { .. }) => Err(ManejarError::NotFound {
                what: format!("submenu of item {index}"),
            }),
            Err(other) => Err(other),
        }
    }

    /// The most recently expanded item across all stacked surfaces, if any
    pub fn expanded_item(&self) -> ManejarResult<Option<Element>> {
        let driver = self.host.element().driver();
        let design = self.host.design();
        let mut last = None;
        for surface in overlay::find_visible_containers(driver, design)? {
            for item in surface.find_all(design.option_locator())? {
                if item.attribute(EXPANDED_ATTR)?.as_deref() == Some("true") {
                    last = Some(item);
                }
            }
        }
        Ok(last)
    }

    /// All currently visible menu surfaces, in stack order
    pub fn surfaces(&self) -> ManejarResult<Vec<Element>> {
        overlay::find_visible_containers(self.host.element().driver(), self.host.design())
    }

    /// Close the menu, verifying that every stacked surface is gone.
    ///
    /// # Errors
    ///
    /// [`ManejarError::NotClosed`] when any surface survives the close
    /// trigger.
    pub fn close(&self) -> ManejarResult<()> {
        self.host.ensure_closed()
    }
}

/// A modal dialog surface
#[derive(Debug, Clone)]
pub struct Dialog {
    host: OptionHost,
}

impl Component for Dialog {
    fn component_name() -> &'static str {
        "dialog"
    }

    fn attach(element: Element, design: Arc<DesignConfig>) -> Self {
        Self {
            host: OptionHost::new(element, design),
        }
    }

    fn element(&self) -> &Element {
        self.host.element()
    }

    fn design(&self) -> &Arc<DesignConfig> {
        self.host.design()
    }
}

impl Dialog {
    /// Set the wait budget for open/close verification
    #[must_use]
    pub fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.host = self.host.with_wait(wait);
        self
    }

    /// Whether the dialog surface currently resolves
    pub fn is_open(&self) -> ManejarResult<bool> {
        self.host.is_open()
    }

    /// Open the dialog (idempotent) and return its surface
    pub fn open(&self) -> ManejarResult<Element> {
        self.host.ensure_open()
    }

    /// The dialog surface, if currently open
    pub fn surface(&self) -> ManejarResult<Option<Element>> {
        overlay::find_top_visible_container(self.host.element().driver(), self.host.design())
    }

    /// Dismiss the dialog, verifying it actually went away
    pub fn dismiss(&self) -> ManejarResult<()> {
        self.host.ensure_closed()
    }
}
