//! The option-selection protocol.
//!
//! [`OptionHost`] drives the two-state machine behind every option-bearing
//! widget: `Closed` (no overlay resolves) and `Open` (a visible overlay
//! resolves). Opening and closing are configured side effects verified
//! through the bounded wait; option mutation uses toggle semantics, acting
//! only when the desired state differs from the widget-reported one.
//!
//! Two disciplines hold throughout:
//!
//! - **Nothing is cached.** The overlay is re-resolved for every operation
//!   and an [`OptionItem`] snapshot is valid only until the next open/close
//!   transition; state-changing operations fetch fresh snapshots rather
//!   than reusing one.
//! - **Unsatisfiable intent is not an error.** Selecting a target that
//!   matches no option, or re-applying an already-satisfied toggle, is a
//!   defined no-op. Automation flows fail on broken structure (`NotFound`,
//!   `NotClosed`), not on permissive selection intent.

use crate::config::{DesignConfig, OptionIdentity, SelectionConfig};
use crate::element::Element;
use crate::overlay;
use crate::result::{ManejarError, ManejarResult};
use crate::wait::{self, WaitOptions};
use std::sync::Arc;

/// One option inside an open overlay, captured at a point in time.
///
/// The wrapped element stays live (reads re-query the tree), but the
/// membership and ordering of a snapshot are only meaningful until the next
/// open/close transition.
#[derive(Debug, Clone)]
pub struct OptionItem {
    element: Element,
    index: usize,
    design: Arc<DesignConfig>,
}

impl OptionItem {
    /// Zero-based position in document order at snapshot time
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The underlying element
    #[must_use]
    pub const fn element(&self) -> &Element {
        &self.element
    }

    /// Rendered text of the option
    pub fn visible_text(&self) -> ManejarResult<String> {
        self.element.visible_text()
    }

    /// Declared value of the option, from the configured value attribute
    pub fn value(&self) -> ManejarResult<Option<String>> {
        self.element.attribute(self.design.value_attribute())
    }

    /// Widget-reported selection state
    pub fn is_selected(&self) -> ManejarResult<bool> {
        self.design.is_selected(&self.element)
    }

    /// Widget-reported disabled (locked-in) state
    pub fn is_disabled(&self) -> ManejarResult<bool> {
        self.design.is_disabled(&self.element)
    }

    /// Perform the toggle action (a click) on this option
    pub fn toggle(&self) -> ManejarResult<()> {
        tracing::debug!(index = self.index, "toggling option");
        self.element.click()
    }
}

/// How a single option is addressed
enum Target<'a> {
    Index(usize),
    Value(&'a str),
    VisibleText(&'a str),
}

impl std::fmt::Display for Target<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Index(i) => write!(f, "index {i}"),
            Self::Value(v) => write!(f, "value {v:?}"),
            Self::VisibleText(t) => write!(f, "text {t:?}"),
        }
    }
}

/// Protocol driver for an option-bearing widget.
///
/// Holds the owning element, the design configuration, selection semantics,
/// and the wait budget used when verifying open/close transitions. A
/// timeout of `0` selects the synchronous single-query fast path.
#[derive(Debug, Clone)]
pub struct OptionHost {
    element: Element,
    design: Arc<DesignConfig>,
    selection: SelectionConfig,
    wait: WaitOptions,
}

impl OptionHost {
    /// Create a protocol driver for the owning element
    #[must_use]
    pub fn new(element: Element, design: Arc<DesignConfig>) -> Self {
        Self {
            element,
            design,
            selection: SelectionConfig::default(),
            wait: WaitOptions::default(),
        }
    }

    /// Set the selection semantics
    #[must_use]
    pub fn with_selection(mut self, selection: SelectionConfig) -> Self {
        self.selection = selection;
        self
    }

    /// Set the wait budget for open/close verification
    #[must_use]
    pub fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// The owning element
    #[must_use]
    pub const fn element(&self) -> &Element {
        &self.element
    }

    /// The design configuration in effect
    #[must_use]
    pub const fn design(&self) -> &Arc<DesignConfig> {
        &self.design
    }

    /// The selection semantics in effect
    #[must_use]
    pub const fn selection(&self) -> &SelectionConfig {
        &self.selection
    }

    /// The wait budget in effect
    #[must_use]
    pub const fn wait(&self) -> &WaitOptions {
        &self.wait
    }

    fn resolve_overlay(&self) -> ManejarResult<Option<Element>> {
        overlay::find_top_visible_container(self.element.driver(), &self.design)
    }

    /// Whether the options overlay currently resolves
    pub fn is_open(&self) -> ManejarResult<bool> {
        Ok(self.resolve_overlay()?.is_some())
    }

    /// Transition to `Open`, returning the resolved overlay container.
    ///
    /// Idempotent: when already open, the open trigger is not run again.
    /// Otherwise the configured trigger fires and the overlay is awaited
    /// within the wait budget (one synchronous query when the budget is
    /// zero).
    ///
    /// # Errors
    ///
    /// [`ManejarError::NotFound`] when no overlay resolves after the
    /// trigger and wait. Fatal to the calling operation.
    pub fn ensure_open(&self) -> ManejarResult<Element> {
        if let Some(container) = self.resolve_overlay()? {
            tracing::trace!("overlay already open");
            return Ok(container);
        }

        tracing::debug!(design = self.design.name(), "running open trigger");
        self.design.open(&self.element)?;

        match wait::poll_until(&self.wait, || self.resolve_overlay()) {
            Ok(container) => Ok(container),
            Err(ManejarError::Timeout { .. }) => Err(ManejarError::NotFound {
                what: format!("options overlay ({})", self.design.name()),
            }),
            Err(other) => Err(other),
        }
    }

    /// Transition to `Closed`.
    ///
    /// Idempotent: when already closed, the close trigger is not run.
    /// Otherwise the configured trigger fires and absence is verified
    /// within the wait budget (one synchronous query when the budget is
    /// zero).
    ///
    /// # Errors
    ///
    /// [`ManejarError::NotClosed`] when the overlay is still visible after
    /// the trigger ran. Distinct from `NotFound`: the close action executed
    /// but had no visible effect, which points at an intercepted or
    /// mis-targeted close trigger rather than timing.
    pub fn ensure_closed(&self) -> ManejarResult<()> {
        if self.resolve_overlay()?.is_none() {
            tracing::trace!("overlay already closed");
            return Ok(());
        }

        tracing::debug!(design = self.design.name(), "running close trigger");
        self.design.close(&self.element)?;

        match wait::wait_for(&self.wait, || Ok(self.resolve_overlay()?.is_none())) {
            Ok(()) => Ok(()),
            Err(ManejarError::Timeout { .. }) => Err(ManejarError::NotClosed {
                what: format!("options overlay ({})", self.design.name()),
            }),
            Err(other) => Err(other),
        }
    }

    /// Fetch a fresh snapshot of the options in the open overlay.
    ///
    /// Ensures the overlay is open first, then queries the configured
    /// option expression against the freshly resolved container. Never
    /// cached across calls.
    pub fn options(&self) -> ManejarResult<Vec<OptionItem>> {
        let container = self.ensure_open()?;
        let found = container.find_all(self.design.option_locator())?;
        Ok(found
            .into_iter()
            .enumerate()
            .map(|(index, element)| OptionItem {
                element,
                index,
                design: Arc::clone(&self.design),
            })
            .collect())
    }

    /// The options currently reporting themselves selected, in snapshot
    /// order
    pub fn selected_options(&self) -> ManejarResult<Vec<OptionItem>> {
        let mut selected = Vec::new();
        for option in self.options()? {
            if option.is_selected()? {
                selected.push(option);
            }
        }
        Ok(selected)
    }

    /// Select the option at the zero-based index
    pub fn select_by_index(&self, index: usize) -> ManejarResult<()> {
        self.apply(&Target::Index(index), true)
    }

    /// Select the option whose value attribute equals `value`
    pub fn select_by_value(&self, value: &str) -> ManejarResult<()> {
        self.apply(&Target::Value(value), true)
    }

    /// Select the option whose visible text equals `text` exactly (not a
    /// substring match)
    pub fn select_by_visible_text(&self, text: &str) -> ManejarResult<()> {
        self.apply(&Target::VisibleText(text), true)
    }

    /// Deselect the option at the zero-based index
    pub fn deselect_by_index(&self, index: usize) -> ManejarResult<()> {
        self.apply(&Target::Index(index), false)
    }

    /// Deselect the option whose value attribute equals `value`
    pub fn deselect_by_value(&self, value: &str) -> ManejarResult<()> {
        self.apply(&Target::Value(value), false)
    }

    /// Deselect the option whose visible text equals `text` exactly
    pub fn deselect_by_visible_text(&self, text: &str) -> ManejarResult<()> {
        self.apply(&Target::VisibleText(text), false)
    }

    /// Select by the configured identity strategy. Under `Index` identity a
    /// non-numeric key addresses nothing and is the usual silent no-op.
    pub fn select(&self, key: &str) -> ManejarResult<()> {
        match self.keyed_target(key) {
            Some(target) => self.apply(&target, true),
            None => Ok(()),
        }
    }

    /// Deselect by the configured identity strategy
    pub fn deselect(&self, key: &str) -> ManejarResult<()> {
        match self.keyed_target(key) {
            Some(target) => self.apply(&target, false),
            None => Ok(()),
        }
    }

    fn keyed_target<'a>(&self, key: &'a str) -> Option<Target<'a>> {
        match self.selection.identity {
            OptionIdentity::Index => key.parse().ok().map(Target::Index),
            OptionIdentity::Value => Some(Target::Value(key)),
            OptionIdentity::VisibleText => Some(Target::VisibleText(key)),
        }
    }

    /// Deselect every currently selected option, skipping disabled
    /// (locked-in) ones.
    ///
    /// The selected set is re-fetched after every toggle because a snapshot
    /// is single-use; the loop is bounded by the initially observed count
    /// so a widget that ignores the toggles cannot spin forever.
    pub fn deselect_all(&self) -> ManejarResult<()> {
        let mut budget = self.selected_options()?.len();
        while budget > 0 {
            let mut next = None;
            for option in self.selected_options()? {
                if !option.is_disabled()? {
                    next = Some(option);
                    break;
                }
            }
            let Some(option) = next else {
                // Only fixed options remain.
                break;
            };
            option.toggle()?;
            budget -= 1;
        }
        Ok(())
    }

    /// Reconcile one option against the desired selection state.
    ///
    /// Fetches a fresh snapshot, resolves the target, and toggles only when
    /// the observed state differs. No match, an already-satisfied state, or
    /// a disabled option are all silent no-ops.
    fn apply(&self, target: &Target<'_>, want_selected: bool) -> ManejarResult<()> {
        let options = self.options()?;

        let mut found = None;
        for option in options {
            let hit = match target {
                Target::Index(i) => option.index() == *i,
                Target::Value(v) => option.value()?.as_deref() == Some(*v),
                Target::VisibleText(t) => option.visible_text()? == *t,
            };
            if hit {
                found = Some(option);
                break;
            }
        }

        let Some(option) = found else {
            tracing::debug!(%target, "no option matches, selection intent dropped");
            return Ok(());
        };

        if option.is_selected()? == want_selected {
            tracing::trace!(%target, "state already satisfied");
            return Ok(());
        }
        if option.is_disabled()? {
            tracing::debug!(%target, "option is disabled, leaving as-is");
            return Ok(());
        }

        option.toggle()
    }
}
