//! Detached-root overlay resolution.
//!
//! Transient surfaces (dropdown panels, menus, dialogs) are rendered at a
//! detached root of the tree, outside the triggering component's subtree,
//! and design systems commonly keep stale surfaces mounted but hidden for
//! exit animations. Resolution therefore works top-down from the document
//! root and filters by live visibility.
//!
//! Overlay references are ephemeral: a resolved container becomes stale the
//! instant the UI removes or hides it, so callers re-resolve instead of
//! holding one across a wait boundary. There is no cached "current overlay"
//! anywhere in this crate.

use crate::config::DesignConfig;
use crate::driver::Driver;
use crate::element::Element;
use crate::result::ManejarResult;
use std::sync::Arc;

/// Resolve every currently visible overlay surface, in document order
/// (attachment order for append-on-attach overlay stacks).
///
/// Emptiness is the normal "closed" state, not an error.
pub fn find_visible_containers(
    driver: &Arc<dyn Driver>,
    design: &DesignConfig,
) -> ManejarResult<Vec<Element>> {
    let candidates = driver.find_all(design.overlay_root(), None)?;
    let total = candidates.len();

    let mut visible = Vec::new();
    for id in candidates {
        if driver.is_visible(id)? {
            visible.push(Element::new(Arc::clone(driver), id));
        }
    }

    tracing::debug!(
        design = design.name(),
        candidates = total,
        visible = visible.len(),
        "resolved overlay surfaces"
    );
    Ok(visible)
}

/// Resolve the single currently meaningful overlay surface.
///
/// When several surfaces are visible at once, the most recently attached
/// one wins: overlay stacks append new surfaces after old ones, so the last
/// match in document order is the top of the stack. This tie-break is
/// deliberate and load-bearing for nested menus.
pub fn find_top_visible_container(
    driver: &Arc<dyn Driver>,
    design: &DesignConfig,
) -> ManejarResult<Option<Element>> {
    Ok(find_visible_containers(driver, design)?.pop())
}
