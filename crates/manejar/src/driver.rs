//! Driver abstraction: tree queries and input simulation.
//!
//! The harness never talks to a UI surface directly. Everything goes through
//! the [`Driver`] trait, which a backend implements over whatever substrate
//! it automates (a browser session, an accessibility bridge, or the
//! in-memory [`crate::mock::MockTree`] used by this crate's own tests).
//! The abstraction protects the component layer against backend churn:
//! swapping automation stacks must never touch widget code.
//!
//! Node handles are lightweight ids owned by the driver. Every read is a
//! live re-query; nothing at this layer is cached, because the tree mutates
//! asynchronously with respect to the automation thread.

use crate::query::QueryExpr;
use crate::result::ManejarResult;
use serde::{Deserialize, Serialize};

/// Opaque handle to one element in the live tree.
///
/// Handles are cheap references, not owners: the driver may invalidate one
/// at any time, in which case reads surface
/// [`crate::ManejarError::StaleNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// A point in 2D screen space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Geometry rectangle of an element, in screen coordinates with the origin
/// at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// X position of the top-left corner
    pub x: f64,
    /// Y position of the top-left corner
    pub y: f64,
    /// Width in pixels
    pub width: f64,
    /// Height in pixels
    pub height: f64,
}

impl Rect {
    /// Create a new rectangle
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Get the center point
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Check if a point is inside this rectangle
    #[must_use]
    pub fn contains(&self, point: &Point) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

/// Special keys for [`Driver::send_keys`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Escape key
    Escape,
    /// Enter key
    Enter,
    /// Tab key
    Tab,
    /// Arrow up
    ArrowUp,
    /// Arrow down
    ArrowDown,
    /// Arrow left
    ArrowLeft,
    /// Arrow right
    ArrowRight,
}

impl Key {
    /// Get the key name string
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Escape => "Escape",
            Self::Enter => "Enter",
            Self::Tab => "Tab",
            Self::ArrowUp => "ArrowUp",
            Self::ArrowDown => "ArrowDown",
            Self::ArrowLeft => "ArrowLeft",
            Self::ArrowRight => "ArrowRight",
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Keyboard input for [`Driver::send_keys`]: literal text or a single
/// special key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyInput {
    /// Literal text typed character by character
    Text(String),
    /// A single special key
    Special(Key),
}

impl KeyInput {
    /// Create a text input
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Create a special-key input
    #[must_use]
    pub const fn special(key: Key) -> Self {
        Self::Special(key)
    }
}

/// Abstract automation backend: structural queries against a live, mutating
/// tree plus user-input simulation.
///
/// All query results are in document order; callers rely on that for
/// zero-based index semantics ("first", "Nth option"). Reads are live:
/// implementations must not cache attribute, text, geometry, or visibility
/// values across calls.
pub trait Driver: Send + Sync {
    /// Find the first node matching `expr`, relative to `context` (the
    /// document root when `None`). Emptiness is a valid result, not an
    /// error.
    fn find(&self, expr: &QueryExpr, context: Option<NodeId>) -> ManejarResult<Option<NodeId>>;

    /// Find all nodes matching `expr` in document order
    fn find_all(&self, expr: &QueryExpr, context: Option<NodeId>) -> ManejarResult<Vec<NodeId>>;

    /// Tag name of the node
    fn tag_name(&self, node: NodeId) -> ManejarResult<String>;

    /// Read an attribute, `None` when absent
    fn attribute(&self, node: NodeId, name: &str) -> ManejarResult<Option<String>>;

    /// Text content of the node (own text plus descendants)
    fn text(&self, node: NodeId) -> ManejarResult<String>;

    /// Geometry rectangle of the node
    fn rect(&self, node: NodeId) -> ManejarResult<Rect>;

    /// Whether the node is currently visible
    fn is_visible(&self, node: NodeId) -> ManejarResult<bool>;

    /// Simulate a click on the node
    fn click(&self, node: NodeId) -> ManejarResult<()>;

    /// Simulate keyboard input targeted at the node
    fn send_keys(&self, node: NodeId, input: &KeyInput) -> ManejarResult<()>;

    /// Press the pointer at a screen point (start of a drag)
    fn press_at(&self, point: Point) -> ManejarResult<()>;

    /// Move the pressed pointer by a delta
    fn move_by(&self, dx: f64, dy: f64) -> ManejarResult<()>;

    /// Release the pressed pointer (end of a drag)
    fn release(&self) -> ManejarResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    mod point_tests {
        use super::*;

        #[test]
        fn test_point_new() {
            let p = Point::new(100.0, 200.0);
            assert!((p.x - 100.0).abs() < f64::EPSILON);
            assert!((p.y - 200.0).abs() < f64::EPSILON);
        }
    }

    mod rect_tests {
        use super::*;

        #[test]
        fn test_rect_center() {
            let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
            let center = rect.center();
            assert!((center.x - 50.0).abs() < f64::EPSILON);
            assert!((center.y - 25.0).abs() < f64::EPSILON);
        }

        #[test]
        fn test_rect_contains() {
            let rect = Rect::new(10.0, 10.0, 100.0, 100.0);
            assert!(rect.contains(&Point::new(50.0, 50.0)));
            assert!(rect.contains(&Point::new(10.0, 10.0)));
            assert!(rect.contains(&Point::new(110.0, 110.0)));
            assert!(!rect.contains(&Point::new(111.0, 50.0)));
            assert!(!rect.contains(&Point::new(9.0, 50.0)));
        }
    }

    mod key_tests {
        use super::*;

        #[test]
        fn test_key_names() {
            assert_eq!(Key::Escape.as_str(), "Escape");
            assert_eq!(Key::Enter.as_str(), "Enter");
            assert_eq!(Key::ArrowDown.as_str(), "ArrowDown");
        }

        #[test]
        fn test_key_input_constructors() {
            assert_eq!(
                KeyInput::text("hola"),
                KeyInput::Text("hola".to_string())
            );
            assert_eq!(KeyInput::special(Key::Escape), KeyInput::Special(Key::Escape));
        }
    }

    mod node_id_tests {
        use super::*;

        #[test]
        fn test_display() {
            assert_eq!(NodeId(7).to_string(), "node#7");
        }
    }
}
