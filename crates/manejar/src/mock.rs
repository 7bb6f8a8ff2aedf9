//! In-memory mock tree for testing components without a real surface.
//!
//! [`MockTree`] implements [`Driver`] over a controllable element tree so
//! that the selection and drag protocols can be exercised against actual
//! component code. Interaction semantics are declarative, driven by
//! attributes on the clicked/keyed node:
//!
//! - `data-opens="id ..."`: clicking makes the listed nodes visible
//! - `data-closes="id ..."`: clicking hides the listed nodes, in order
//! - `data-toggles="attr"`: clicking flips `attr` between `"true"` and
//!   `"false"`, unless the node carries `aria-disabled="true"`
//! - `data-escape-closes="id ..."`: an Escape key hides the listed nodes,
//!   in order
//!
//! A released drag on a `role="slider"` thumb resolves the pointer position
//! against the parent track's rectangle (honoring `data-vertical`,
//! `data-inverted`, and `data-scale="log10"` on the track) and writes the
//! exact resulting value to `aria-valuenow`. There is no pixel
//! quantization, so value round-trips through the mock are deterministic.
//!
//! Every interaction is logged (clicks per node, press points, hide order)
//! for exactly-once and fail-fast assertions.

use crate::driver::{Driver, Key, KeyInput, NodeId, Point, Rect};
use crate::query::{Anchor, Axis, Pred, QueryExpr, Step, Tag};
use crate::result::{ManejarError, ManejarResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::Mutex;

struct NodeData {
    tag: String,
    attrs: BTreeMap<String, String>,
    text: String,
    rect: Rect,
    visible: bool,
    parent: Option<usize>,
    children: Vec<usize>,
    removed: bool,
}

impl NodeData {
    fn new(tag: &str, parent: Option<usize>) -> Self {
        Self {
            tag: tag.to_string(),
            attrs: BTreeMap::new(),
            text: String::new(),
            rect: Rect::new(0.0, 0.0, 0.0, 0.0),
            visible: true,
            parent,
            children: Vec::new(),
            removed: false,
        }
    }
}

#[derive(Default)]
struct InteractionLog {
    clicks: Vec<NodeId>,
    presses: Vec<Point>,
    hidden: Vec<NodeId>,
}

struct TreeState {
    nodes: Vec<NodeData>,
    pointer: Point,
    pressed: Option<usize>,
    log: InteractionLog,
}

/// An in-memory element tree implementing [`Driver`]
pub struct MockTree {
    state: Mutex<TreeState>,
}

impl Default for MockTree {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("MockTree")
            .field("nodes", &state.nodes.len())
            .finish_non_exhaustive()
    }
}

/// Node description for [`MockTree::from_json`]
#[derive(Deserialize)]
struct JsonNode {
    tag: String,
    #[serde(default)]
    attrs: BTreeMap<String, String>,
    #[serde(default)]
    text: String,
    #[serde(default)]
    rect: Option<Rect>,
    #[serde(default = "default_visible")]
    visible: bool,
    #[serde(default)]
    children: Vec<JsonNode>,
}

fn default_visible() -> bool {
    true
}

impl MockTree {
    /// Create a tree containing only the root element
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TreeState {
                nodes: vec![NodeData::new("root", None)],
                pointer: Point::new(0.0, 0.0),
                pressed: None,
                log: InteractionLog::default(),
            }),
        }
    }

    /// Build a tree from a JSON array of node descriptions (attached under
    /// the root)
    pub fn from_json(json: &str) -> ManejarResult<Self> {
        let described: Vec<JsonNode> = serde_json::from_str(json)?;
        let tree = Self::new();
        let root = tree.root();
        for child in described {
            tree.insert_json(root, child);
        }
        Ok(tree)
    }

    fn insert_json(&self, parent: NodeId, described: JsonNode) {
        let id = self.add_node(parent, &described.tag);
        for (name, value) in described.attrs {
            self.set_attr(id, &name, value);
        }
        if !described.text.is_empty() {
            self.set_text(id, described.text);
        }
        if let Some(rect) = described.rect {
            self.set_rect(id, rect);
        }
        self.set_visible(id, described.visible);
        for child in described.children {
            self.insert_json(id, child);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, TreeState> {
        self.state.lock().expect("mock tree lock poisoned")
    }

    /// The root element
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Attach a new node as the last child of `parent`
    pub fn add_node(&self, parent: NodeId, tag: &str) -> NodeId {
        let mut state = self.lock();
        let idx = state.nodes.len();
        state.nodes.push(NodeData::new(tag, Some(parent.0 as usize)));
        let parent_idx = parent.0 as usize;
        state.nodes[parent_idx].children.push(idx);
        NodeId(idx as u64)
    }

    /// Set an attribute
    pub fn set_attr(&self, id: NodeId, name: &str, value: impl Into<String>) {
        self.lock().nodes[id.0 as usize]
            .attrs
            .insert(name.to_string(), value.into());
    }

    /// Remove an attribute
    pub fn remove_attr(&self, id: NodeId, name: &str) {
        self.lock().nodes[id.0 as usize].attrs.remove(name);
    }

    /// Set the own text of a node
    pub fn set_text(&self, id: NodeId, text: impl Into<String>) {
        self.lock().nodes[id.0 as usize].text = text.into();
    }

    /// Set the geometry rectangle
    pub fn set_rect(&self, id: NodeId, rect: Rect) {
        self.lock().nodes[id.0 as usize].rect = rect;
    }

    /// Set the visibility flag
    pub fn set_visible(&self, id: NodeId, visible: bool) {
        self.lock().nodes[id.0 as usize].visible = visible;
    }

    /// Detach a node: handles pointing at it become stale
    pub fn remove(&self, id: NodeId) {
        let mut state = self.lock();
        let idx = id.0 as usize;
        state.nodes[idx].removed = true;
        if let Some(parent) = state.nodes[idx].parent {
            state.nodes[parent].children.retain(|c| *c != idx);
        }
    }

    /// All clicks so far, in order
    #[must_use]
    pub fn clicks(&self) -> Vec<NodeId> {
        self.lock().log.clicks.clone()
    }

    /// How many times a node was clicked
    #[must_use]
    pub fn click_count(&self, id: NodeId) -> usize {
        self.lock().log.clicks.iter().filter(|c| **c == id).count()
    }

    /// Press points of all drags started so far
    #[must_use]
    pub fn drag_log(&self) -> Vec<Point> {
        self.lock().log.presses.clone()
    }

    /// Nodes hidden by interaction effects, in the order they disappeared
    #[must_use]
    pub fn hide_order(&self) -> Vec<NodeId> {
        self.lock().log.hidden.clone()
    }

    /// Raw visibility flag of a node (test introspection)
    #[must_use]
    pub fn is_node_visible(&self, id: NodeId) -> bool {
        self.lock().nodes[id.0 as usize].visible
    }

    /// Raw attribute of a node (test introspection)
    #[must_use]
    pub fn node_attr(&self, id: NodeId, name: &str) -> Option<String> {
        self.lock().nodes[id.0 as usize].attrs.get(name).cloned()
    }
}

// =============================================================================
// TREE INTERNALS
// =============================================================================

fn check(state: &TreeState, id: NodeId) -> ManejarResult<usize> {
    let idx = id.0 as usize;
    if idx >= state.nodes.len() || state.nodes[idx].removed {
        return Err(ManejarError::StaleNode { id: id.0 });
    }
    Ok(idx)
}

/// Pre-order document traversal from the root
fn doc_order(state: &TreeState) -> Vec<usize> {
    let mut order = Vec::with_capacity(state.nodes.len());
    let mut stack = vec![0usize];
    while let Some(idx) = stack.pop() {
        if state.nodes[idx].removed {
            continue;
        }
        order.push(idx);
        for child in state.nodes[idx].children.iter().rev() {
            stack.push(*child);
        }
    }
    order
}

fn text_content(state: &TreeState, idx: usize) -> String {
    let mut out = state.nodes[idx].text.clone();
    for child in &state.nodes[idx].children {
        if !state.nodes[*child].removed {
            out.push_str(&text_content(state, *child));
        }
    }
    out
}

fn effective_visible(state: &TreeState, idx: usize) -> bool {
    let mut cursor = Some(idx);
    while let Some(i) = cursor {
        if state.nodes[i].removed || !state.nodes[i].visible {
            return false;
        }
        cursor = state.nodes[i].parent;
    }
    true
}

fn ancestors(state: &TreeState, idx: usize) -> Vec<usize> {
    let mut out = Vec::new();
    let mut cursor = state.nodes[idx].parent;
    while let Some(i) = cursor {
        out.push(i);
        cursor = state.nodes[i].parent;
    }
    out
}

fn subtree(state: &TreeState, idx: usize) -> Vec<usize> {
    let mut out = Vec::new();
    let mut stack: Vec<usize> = state.nodes[idx].children.clone();
    while let Some(i) = stack.pop() {
        if state.nodes[i].removed {
            continue;
        }
        out.push(i);
        stack.extend(state.nodes[i].children.iter().copied());
    }
    out
}

fn find_by_id_attr(state: &TreeState, id_value: &str) -> Option<usize> {
    doc_order(state)
        .into_iter()
        .find(|idx| state.nodes[*idx].attrs.get("id").map(String::as_str) == Some(id_value))
}

fn hide(state: &mut TreeState, idx: usize) {
    if state.nodes[idx].visible {
        state.nodes[idx].visible = false;
        state.log.hidden.push(NodeId(idx as u64));
    }
}

fn apply_click(state: &mut TreeState, idx: usize) {
    state.log.clicks.push(NodeId(idx as u64));
    let attrs = state.nodes[idx].attrs.clone();
    let disabled = attrs.get("aria-disabled").map(String::as_str) == Some("true");

    if let Some(toggled) = attrs.get("data-toggles") {
        if !disabled {
            let on = attrs.get(toggled).map(String::as_str) == Some("true");
            state.nodes[idx]
                .attrs
                .insert(toggled.clone(), (!on).to_string());
        }
    }
    if let Some(opens) = attrs.get("data-opens") {
        for token in opens.split_whitespace() {
            if let Some(target) = find_by_id_attr(state, token) {
                state.nodes[target].visible = true;
            }
        }
    }
    if let Some(closes) = attrs.get("data-closes") {
        for token in closes.split_whitespace() {
            if let Some(target) = find_by_id_attr(state, token) {
                hide(state, target);
            }
        }
    }
}

fn apply_release(state: &mut TreeState, idx: usize) {
    if state.nodes[idx].attrs.get("role").map(String::as_str) != Some("slider") {
        return;
    }
    let parse =
        |name: &str| -> Option<f64> { state.nodes[idx].attrs.get(name)?.parse().ok() };
    let (Some(min), Some(max)) = (parse("aria-valuemin"), parse("aria-valuemax")) else {
        return;
    };
    let Some(track) = state.nodes[idx].parent else {
        return;
    };

    let rect = state.nodes[track].rect;
    let track_attr =
        |name: &str| state.nodes[track].attrs.get(name).map(String::as_str);
    let vertical = track_attr("data-vertical") == Some("true");
    let inverted = track_attr("data-inverted") == Some("true");

    let mut fraction = if vertical {
        (state.pointer.y - rect.y) / rect.height
    } else {
        (state.pointer.x - rect.x) / rect.width
    };
    fraction = fraction.clamp(0.0, 1.0);
    if inverted {
        fraction = 1.0 - fraction;
    }

    let value = if track_attr("data-scale") == Some("log10") {
        let lo = min.log10();
        let hi = max.log10();
        10f64.powf(lo + fraction * (hi - lo))
    } else {
        min + fraction * (max - min)
    };
    state.nodes[idx]
        .attrs
        .insert("aria-valuenow".to_string(), format!("{value}"));
}

/// Deepest visible node containing the point; later siblings win ties
fn hit_test(state: &TreeState, point: Point) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for idx in doc_order(state) {
        if !effective_visible(state, idx) || !state.nodes[idx].rect.contains(&point) {
            continue;
        }
        let depth = ancestors(state, idx).len();
        if best.map_or(true, |(d, _)| depth >= d) {
            best = Some((depth, idx));
        }
    }
    best.map(|(_, idx)| idx)
}

// =============================================================================
// EXPRESSION EVALUATION
// =============================================================================

fn tag_matches(state: &TreeState, idx: usize, tag: &Tag) -> bool {
    match tag {
        Tag::Any => true,
        Tag::Named(name) => state.nodes[idx].tag == *name,
    }
}

fn matches_pred(state: &TreeState, idx: usize, pred: &Pred) -> ManejarResult<bool> {
    let attr = |name: &str| state.nodes[idx].attrs.get(name);
    Ok(match pred {
        Pred::AttrEq { name, value } => attr(name).map(String::as_str) == Some(value.as_str()),
        Pred::AttrContains { name, value } => {
            attr(name).is_some_and(|v| v.contains(value.as_str()))
        }
        Pred::AttrMatches { name, pattern } => {
            let re = regex::Regex::new(pattern).map_err(|e| {
                ManejarError::InvalidExpression {
                    message: e.to_string(),
                }
            })?;
            attr(name).is_some_and(|v| re.is_match(v))
        }
        Pred::TextEq { value } => text_content(state, idx).trim() == value.as_str(),
        Pred::TextContains { value } => text_content(state, idx).contains(value.as_str()),
        Pred::Named { tag } => state.nodes[idx].tag == *tag,
        Pred::Not(inner) => !matches_pred(state, idx, inner)?,
    })
}

fn axis_nodes(state: &TreeState, idx: usize, axis: Axis) -> Vec<usize> {
    let live = |indices: Vec<usize>| -> Vec<usize> {
        indices
            .into_iter()
            .filter(|i| !state.nodes[*i].removed)
            .collect()
    };
    match axis {
        Axis::Child => live(state.nodes[idx].children.clone()),
        Axis::Parent => live(state.nodes[idx].parent.into_iter().collect()),
        Axis::Ancestor => ancestors(state, idx),
        Axis::Descendant => subtree(state, idx),
        Axis::FollowingSibling | Axis::PrecedingSibling => {
            let Some(parent) = state.nodes[idx].parent else {
                return Vec::new();
            };
            let siblings = &state.nodes[parent].children;
            let at = siblings.iter().position(|s| *s == idx);
            let Some(at) = at else { return Vec::new() };
            let picked = if axis == Axis::FollowingSibling {
                siblings[at + 1..].to_vec()
            } else {
                siblings[..at].to_vec()
            };
            live(picked)
        }
        Axis::Following | Axis::Preceding => {
            let order = doc_order(state);
            let at = order.iter().position(|i| *i == idx);
            let Some(at) = at else { return Vec::new() };
            if axis == Axis::Following {
                let skip: Vec<usize> = subtree(state, idx);
                order[at + 1..]
                    .iter()
                    .copied()
                    .filter(|i| !skip.contains(i))
                    .collect()
            } else {
                let skip = ancestors(state, idx);
                order[..at]
                    .iter()
                    .copied()
                    .filter(|i| !skip.contains(i))
                    .collect()
            }
        }
    }
}

fn eval(state: &TreeState, expr: &QueryExpr, context: Option<NodeId>) -> ManejarResult<Vec<usize>> {
    let ctx = match context {
        Some(id) => check(state, id)?,
        None => 0,
    };
    let order = doc_order(state);
    let position = |idx: usize| order.iter().position(|i| *i == idx);

    let mut current: Vec<usize> = match expr.anchor() {
        Anchor::Root => vec![0],
        Anchor::Anywhere => order.clone(),
        Anchor::Context => vec![ctx],
        Anchor::Bare => state.nodes[ctx]
            .children
            .iter()
            .copied()
            .filter(|i| !state.nodes[*i].removed)
            .collect(),
    };

    for step in expr.steps() {
        match step {
            Step::Where(pred) => {
                let mut kept = Vec::with_capacity(current.len());
                for idx in current {
                    if matches_pred(state, idx, pred)? {
                        kept.push(idx);
                    }
                }
                current = kept;
            }
            Step::Traverse { axis, tag } => {
                // Node-set semantics: dedupe, document order.
                let mut positions: Vec<usize> = Vec::new();
                for idx in &current {
                    for reached in axis_nodes(state, *idx, *axis) {
                        if tag_matches(state, reached, tag) {
                            if let Some(pos) = position(reached) {
                                if !positions.contains(&pos) {
                                    positions.push(pos);
                                }
                            }
                        }
                    }
                }
                positions.sort_unstable();
                current = positions.into_iter().map(|pos| order[pos]).collect();
            }
        }
    }

    Ok(current)
}

// =============================================================================
// DRIVER IMPLEMENTATION
// =============================================================================

impl Driver for MockTree {
    fn find(&self, expr: &QueryExpr, context: Option<NodeId>) -> ManejarResult<Option<NodeId>> {
        let state = self.lock();
        Ok(eval(&state, expr, context)?
            .first()
            .map(|idx| NodeId(*idx as u64)))
    }

    fn find_all(&self, expr: &QueryExpr, context: Option<NodeId>) -> ManejarResult<Vec<NodeId>> {
        let state = self.lock();
        Ok(eval(&state, expr, context)?
            .into_iter()
            .map(|idx| NodeId(idx as u64))
            .collect())
    }

    fn tag_name(&self, node: NodeId) -> ManejarResult<String> {
        let state = self.lock();
        let idx = check(&state, node)?;
        Ok(state.nodes[idx].tag.clone())
    }

    fn attribute(&self, node: NodeId, name: &str) -> ManejarResult<Option<String>> {
        let state = self.lock();
        let idx = check(&state, node)?;
        Ok(state.nodes[idx].attrs.get(name).cloned())
    }

    fn text(&self, node: NodeId) -> ManejarResult<String> {
        let state = self.lock();
        let idx = check(&state, node)?;
        Ok(text_content(&state, idx))
    }

    fn rect(&self, node: NodeId) -> ManejarResult<Rect> {
        let state = self.lock();
        let idx = check(&state, node)?;
        Ok(state.nodes[idx].rect)
    }

    fn is_visible(&self, node: NodeId) -> ManejarResult<bool> {
        let state = self.lock();
        let idx = check(&state, node)?;
        Ok(effective_visible(&state, idx))
    }

    fn click(&self, node: NodeId) -> ManejarResult<()> {
        let mut state = self.lock();
        let idx = check(&state, node)?;
        apply_click(&mut state, idx);
        Ok(())
    }

    fn send_keys(&self, node: NodeId, input: &KeyInput) -> ManejarResult<()> {
        let mut state = self.lock();
        let idx = check(&state, node)?;
        match input {
            KeyInput::Text(text) => {
                let mut value = state.nodes[idx]
                    .attrs
                    .get("value")
                    .cloned()
                    .unwrap_or_default();
                value.push_str(text);
                state.nodes[idx].attrs.insert("value".to_string(), value);
            }
            KeyInput::Special(Key::Escape) => {
                if let Some(closes) = state.nodes[idx].attrs.get("data-escape-closes").cloned() {
                    for token in closes.split_whitespace() {
                        if let Some(target) = find_by_id_attr(&state, token) {
                            hide(&mut state, target);
                        }
                    }
                }
            }
            KeyInput::Special(_) => {}
        }
        Ok(())
    }

    fn press_at(&self, point: Point) -> ManejarResult<()> {
        let mut state = self.lock();
        state.pointer = point;
        state.pressed = hit_test(&state, point);
        state.log.presses.push(point);
        Ok(())
    }

    fn move_by(&self, dx: f64, dy: f64) -> ManejarResult<()> {
        let mut state = self.lock();
        if state.pressed.is_none() {
            return Err(ManejarError::InputError {
                message: "pointer moved without a press".to_string(),
            });
        }
        state.pointer.x += dx;
        state.pointer.y += dy;
        Ok(())
    }

    fn release(&self) -> ManejarResult<()> {
        let mut state = self.lock();
        let Some(idx) = state.pressed.take() else {
            return Err(ManejarError::InputError {
                message: "pointer released without a press".to_string(),
            });
        };
        apply_release(&mut state, idx);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::query::Query;

    fn sample() -> MockTree {
        // root
        //   section
        //     h2 "Colors"
        //     ul
        //       li.option "Red"   (data-value=r)
        //       li.option "Green" (data-value=g)
        //       li "plain"
        //   aside
        let tree = MockTree::new();
        let root = tree.root();
        let section = tree.add_node(root, "section");
        let h2 = tree.add_node(section, "h2");
        tree.set_text(h2, "Colors");
        let ul = tree.add_node(section, "ul");
        for (label, value) in [("Red", "r"), ("Green", "g")] {
            let li = tree.add_node(ul, "li");
            tree.set_attr(li, "class", "option");
            tree.set_attr(li, "data-value", value);
            tree.set_text(li, label);
        }
        let plain = tree.add_node(ul, "li");
        tree.set_text(plain, "plain");
        tree.add_node(root, "aside");
        tree
    }

    mod eval_tests {
        use super::*;

        #[test]
        fn test_anywhere_matches_in_document_order() {
            let tree = sample();
            let expr = Query::anywhere().named("li").build();
            let found = tree.find_all(&expr, None).unwrap();
            assert_eq!(found.len(), 3);
            assert!(found.windows(2).all(|w| w[0] < w[1]));
        }

        #[test]
        fn test_attr_predicates() {
            let tree = sample();
            let eq = Query::anywhere().attr_eq("data-value", "g").build();
            assert_eq!(tree.find_all(&eq, None).unwrap().len(), 1);

            let contains = Query::anywhere().attr_contains("class", "opt").build();
            assert_eq!(tree.find_all(&contains, None).unwrap().len(), 2);
        }

        #[test]
        fn test_regex_predicate() {
            let tree = sample();
            let expr = Query::anywhere().attr_matches("data-value", "^[rg]$").build();
            assert_eq!(tree.find_all(&expr, None).unwrap().len(), 2);
        }

        #[test]
        fn test_invalid_regex_surfaces_at_evaluation() {
            let tree = sample();
            let expr = Query::anywhere().attr_matches("data-value", "[").build();
            assert!(matches!(
                tree.find_all(&expr, None),
                Err(ManejarError::InvalidExpression { .. })
            ));
        }

        #[test]
        fn test_text_eq_is_exact_and_trimmed() {
            let tree = sample();
            let hit = Query::anywhere().named("li").text_eq("Red").build();
            assert_eq!(tree.find_all(&hit, None).unwrap().len(), 1);

            let miss = Query::anywhere().named("li").text_eq("Re").build();
            assert!(tree.find_all(&miss, None).unwrap().is_empty());
        }

        #[test]
        fn test_text_content_includes_descendants() {
            let tree = sample();
            let expr = Query::anywhere().named("section").text_contains("Green").build();
            assert_eq!(tree.find_all(&expr, None).unwrap().len(), 1);
        }

        #[test]
        fn test_negated_predicate() {
            let tree = sample();
            let expr = Query::anywhere()
                .named("li")
                .filter(Pred::attr_contains("class", "option").negate())
                .build();
            let found = tree.find_all(&expr, None).unwrap();
            assert_eq!(found.len(), 1);
        }

        #[test]
        fn test_bare_anchor_means_children_of_context() {
            let tree = sample();
            let section = tree.find(&Query::anywhere().named("section").build(), None)
                .unwrap()
                .unwrap();
            let expr = Query::bare().build();
            let children = tree.find_all(&expr, Some(section)).unwrap();
            // h2 and ul, not their descendants
            assert_eq!(children.len(), 2);
        }
    }

    mod axis_tests {
        use super::*;

        fn li_context(tree: &MockTree) -> NodeId {
            tree.find(
                &Query::anywhere().attr_eq("data-value", "r").build(),
                None,
            )
            .unwrap()
            .unwrap()
        }

        #[test]
        fn test_child_and_descendant() {
            let tree = sample();
            let child_li = Query::from_context().child("ul").child("li").build();
            let section = tree
                .find(&Query::anywhere().named("section").build(), None)
                .unwrap()
                .unwrap();
            assert_eq!(tree.find_all(&child_li, Some(section)).unwrap().len(), 3);

            let descendant_li = Query::from_context().descendant("li").build();
            assert_eq!(tree.find_all(&descendant_li, Some(section)).unwrap().len(), 3);
        }

        #[test]
        fn test_parent_and_ancestor() {
            let tree = sample();
            let li = li_context(&tree);

            let parent = Query::from_context().parent(Tag::Any).build();
            let found = tree.find_all(&parent, Some(li)).unwrap();
            assert_eq!(found.len(), 1);
            assert_eq!(tree.tag_name(found[0]).unwrap(), "ul");

            let ancestors = Query::from_context().ancestor(Tag::Any).build();
            // ul, section, root
            assert_eq!(tree.find_all(&ancestors, Some(li)).unwrap().len(), 3);
        }

        #[test]
        fn test_sibling_axes() {
            let tree = sample();
            let li = li_context(&tree);

            let following = Query::from_context().following_sibling("li").build();
            assert_eq!(tree.find_all(&following, Some(li)).unwrap().len(), 2);

            let preceding = Query::from_context().preceding_sibling(Tag::Any).build();
            assert!(tree.find_all(&preceding, Some(li)).unwrap().is_empty());
        }

        #[test]
        fn test_following_excludes_descendants() {
            let tree = sample();
            let section = tree
                .find(&Query::anywhere().named("section").build(), None)
                .unwrap()
                .unwrap();
            let following = Query::from_context().following(Tag::Any).build();
            let found = tree.find_all(&following, Some(section)).unwrap();
            // Only the aside; the section's own subtree does not count.
            assert_eq!(found.len(), 1);
            assert_eq!(tree.tag_name(found[0]).unwrap(), "aside");
        }

        #[test]
        fn test_preceding_excludes_ancestors() {
            let tree = sample();
            let li = li_context(&tree);
            let preceding = Query::from_context().preceding(Tag::Any).build();
            let found = tree.find_all(&preceding, Some(li)).unwrap();
            // h2 only: ul/section/root are ancestors.
            assert_eq!(found.len(), 1);
            assert_eq!(tree.tag_name(found[0]).unwrap(), "h2");
        }

        #[test]
        fn test_traverse_deduplicates_in_document_order() {
            let tree = sample();
            // Both li.option nodes share the same parent; the parent axis
            // must yield it once.
            let expr = Query::anywhere()
                .attr_contains("class", "option")
                .parent(Tag::Any)
                .build();
            assert_eq!(tree.find_all(&expr, None).unwrap().len(), 1);
        }
    }

    mod interaction_tests {
        use super::*;

        #[test]
        fn test_click_toggle_flips_and_honors_disabled() {
            let tree = MockTree::new();
            let node = tree.add_node(tree.root(), "li");
            tree.set_attr(node, "data-toggles", "aria-selected");

            tree.click(node).unwrap();
            assert_eq!(tree.node_attr(node, "aria-selected").unwrap(), "true");
            tree.click(node).unwrap();
            assert_eq!(tree.node_attr(node, "aria-selected").unwrap(), "false");

            tree.set_attr(node, "aria-selected", "true");
            tree.set_attr(node, "aria-disabled", "true");
            tree.click(node).unwrap();
            assert_eq!(tree.node_attr(node, "aria-selected").unwrap(), "true");
        }

        #[test]
        fn test_click_opens_and_closes_by_id() {
            let tree = MockTree::new();
            let button = tree.add_node(tree.root(), "button");
            tree.set_attr(button, "data-opens", "panel");
            let panel = tree.add_node(tree.root(), "div");
            tree.set_attr(panel, "id", "panel");
            tree.set_visible(panel, false);

            tree.click(button).unwrap();
            assert!(tree.is_node_visible(panel));

            tree.set_attr(button, "data-closes", "panel");
            tree.remove_attr(button, "data-opens");
            tree.click(button).unwrap();
            assert!(!tree.is_node_visible(panel));
            assert_eq!(tree.hide_order(), vec![panel]);
        }

        #[test]
        fn test_stale_node_after_removal() {
            let tree = sample();
            let li = tree
                .find(&Query::anywhere().named("li").build(), None)
                .unwrap()
                .unwrap();
            tree.remove(li);
            assert!(matches!(
                tree.text(li),
                Err(ManejarError::StaleNode { .. })
            ));
            // And queries no longer see it.
            assert_eq!(
                tree.find_all(&Query::anywhere().named("li").build(), None)
                    .unwrap()
                    .len(),
                2
            );
        }

        #[test]
        fn test_visibility_is_effective_through_ancestors() {
            let tree = MockTree::new();
            let outer = tree.add_node(tree.root(), "div");
            let inner = tree.add_node(outer, "span");
            assert!(tree.is_visible(inner).unwrap());

            tree.set_visible(outer, false);
            assert!(!tree.is_visible(inner).unwrap());
            // The raw flag on the child is untouched.
            assert!(tree.is_node_visible(inner));
        }

        #[test]
        fn test_release_without_press_is_an_input_error() {
            let tree = MockTree::new();
            assert!(matches!(
                tree.release(),
                Err(ManejarError::InputError { .. })
            ));
        }

        #[test]
        fn test_inverted_track_decodes_pointer() {
            let tree = MockTree::new();
            let track = tree.add_node(tree.root(), "div");
            tree.set_rect(track, Rect::new(0.0, 0.0, 100.0, 10.0));
            tree.set_attr(track, "data-inverted", "true");
            let thumb = tree.add_node(track, "span");
            tree.set_attr(thumb, "role", "slider");
            tree.set_attr(thumb, "aria-valuemin", "0");
            tree.set_attr(thumb, "aria-valuemax", "10");
            tree.set_attr(thumb, "aria-valuenow", "10");
            tree.set_rect(thumb, Rect::new(0.0, 0.0, 4.0, 4.0));

            // Dropping the thumb near the left edge of an inverted track
            // means a high value.
            tree.press_at(Point::new(2.0, 2.0)).unwrap();
            tree.move_by(8.0, 0.0).unwrap();
            tree.release().unwrap();
            assert_eq!(tree.node_attr(thumb, "aria-valuenow").unwrap(), "9");
        }
    }

    mod fixture_tests {
        use super::*;

        #[test]
        fn test_from_json_builds_a_queryable_tree() {
            let tree = MockTree::from_json(
                r#"[
                    {
                        "tag": "div",
                        "attrs": {"class": "au-overlay", "id": "panel"},
                        "visible": false,
                        "children": [
                            {"tag": "li", "attrs": {"role": "option"}, "text": "Uno"},
                            {"tag": "li", "attrs": {"role": "option"}, "text": "Dos"}
                        ]
                    }
                ]"#,
            )
            .unwrap();

            let options = Query::anywhere().attr_eq("role", "option").build();
            assert_eq!(tree.find_all(&options, None).unwrap().len(), 2);

            let panel = tree
                .find(&Query::anywhere().attr_eq("id", "panel").build(), None)
                .unwrap()
                .unwrap();
            assert!(!tree.is_node_visible(panel));
        }

        #[test]
        fn test_from_json_rejects_malformed_input() {
            assert!(matches!(
                MockTree::from_json("{not json"),
                Err(ManejarError::Json(_))
            ));
        }
    }
}
