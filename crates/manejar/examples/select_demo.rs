//! End-to-end walk of the selection protocol against the mock tree.
//!
//! Run with `cargo run --example select_demo` (add
//! `RUST_LOG=manejar=debug` to watch the state machine).

use manejar::{
    Component, DesignConfig, Driver, Element, ManejarResult, MockTree, MultiSelect, WaitOptions,
};
use std::sync::Arc;

fn build_surface(tree: &MockTree) -> manejar::NodeId {
    let root = tree.root();

    let trigger = tree.add_node(root, "button");
    tree.set_attr(trigger, "class", "au-multiselect");
    tree.set_attr(trigger, "data-opens", "tag-panel");
    tree.set_attr(trigger, "data-escape-closes", "tag-panel");
    tree.set_text(trigger, "Tags");

    let panel = tree.add_node(root, "div");
    tree.set_attr(panel, "id", "tag-panel");
    tree.set_attr(panel, "class", "au-overlay");
    tree.set_visible(panel, false);

    for (label, value) in [("Urgente", "urgent"), ("Revisar", "review"), ("Listo", "done")] {
        let option = tree.add_node(panel, "li");
        tree.set_attr(option, "role", "option");
        tree.set_attr(option, "data-value", value);
        tree.set_attr(option, "data-toggles", "aria-selected");
        tree.set_text(option, label);
    }

    trigger
}

fn main() -> ManejarResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "manejar=debug".into()),
        )
        .init();

    let tree = Arc::new(MockTree::new());
    let trigger = build_surface(&tree);

    let design = Arc::new(DesignConfig::new("aurora", "au"));
    let driver: Arc<dyn Driver> = tree.clone();
    let select: MultiSelect = Element::new(driver, trigger).reinterpret(&design);
    let select = select.with_wait(WaitOptions::new().with_timeout(250));

    println!("valid structure: {}", select.validate()?);

    select.select_by_visible_text("Urgente")?;
    select.select_by_value("review")?;
    // Re-applying an already-satisfied selection is a defined no-op.
    select.select_by_visible_text("Urgente")?;

    let selected: Vec<String> = select
        .selected_options()?
        .iter()
        .map(|option| option.visible_text())
        .collect::<ManejarResult<_>>()?;
    println!("selected after toggles: {selected:?}");

    select.deselect_by_value("review")?;
    let selected: Vec<String> = select
        .selected_options()?
        .iter()
        .map(|option| option.visible_text())
        .collect::<ManejarResult<_>>()?;
    println!("selected after deselect: {selected:?}");

    select.close_options()?;
    println!("open after close: {}", select.host().is_open()?);

    Ok(())
}
