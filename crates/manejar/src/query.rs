//! Structural locator expressions.
//!
//! A [`QueryExpr`] is an immutable, composable value describing how to find
//! zero, one, or many nodes relative to a context node or the tree root.
//! Building an expression never touches the live tree; evaluation happens
//! in the [`crate::driver::Driver`].
//!
//! # Design
//!
//! - **Pure value construction**: [`Query`] builder methods take `&self` and
//!   return a fresh builder, so a partial chain can be shared and branched
//!   without ever mutating an already-returned value.
//! - **Value equality**: two independently built expressions with identical
//!   step sequences compare equal ([`PartialEq`]/[`Eq`]/[`Hash`]), which the
//!   overlay-identity tests depend on.
//! - **Deferred failure**: there are no build-time errors. Even a malformed
//!   regex pattern is carried as a string and only surfaces
//!   ([`crate::ManejarError::InvalidExpression`]) when evaluated.
//!
//! For backends that speak XPath, [`QueryExpr::to_xpath`] compiles the
//! expression to an XPath 2.0 string (`matches()` is used for regex
//! predicates).

use serde::{Deserialize, Serialize};

/// Where an expression starts evaluating
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Anchor {
    /// Absolute: the document root element
    Root,
    /// Relative: the context node itself (`.`)
    Context,
    /// Anywhere: every node in the document, at any depth
    Anywhere,
    /// Bare: the children of the context node (a bare tag/predicate form)
    Bare,
}

/// Tag filter for traversal steps
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// Match any element name
    Any,
    /// Match one element name exactly
    Named(String),
}

impl Tag {
    fn as_xpath(&self) -> String {
        match self {
            Self::Any => "*".to_string(),
            Self::Named(name) => name.clone(),
        }
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for Tag {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

/// A predicate over a single node.
///
/// Every form is combinable with logical negation via [`Pred::negate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pred {
    /// Attribute exact match
    AttrEq {
        /// Attribute name
        name: String,
        /// Expected value
        value: String,
    },
    /// Attribute substring containment
    AttrContains {
        /// Attribute name
        name: String,
        /// Substring to find
        value: String,
    },
    /// Attribute regex match. The pattern is held uncompiled so that
    /// expression construction stays infallible.
    AttrMatches {
        /// Attribute name
        name: String,
        /// Regex pattern
        pattern: String,
    },
    /// Text content exact match (leading/trailing whitespace normalized,
    /// as rendered text)
    TextEq {
        /// Expected text
        value: String,
    },
    /// Text content substring containment
    TextContains {
        /// Substring to find
        value: String,
    },
    /// Element-name match
    Named {
        /// Expected tag name
        tag: String,
    },
    /// Logical negation of the inner predicate
    Not(Box<Pred>),
}

impl Pred {
    /// Attribute exact match
    #[must_use]
    pub fn attr_eq(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::AttrEq {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Attribute substring containment
    #[must_use]
    pub fn attr_contains(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::AttrContains {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Attribute regex match
    #[must_use]
    pub fn attr_matches(name: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::AttrMatches {
            name: name.into(),
            pattern: pattern.into(),
        }
    }

    /// Text content exact match
    #[must_use]
    pub fn text_eq(value: impl Into<String>) -> Self {
        Self::TextEq {
            value: value.into(),
        }
    }

    /// Text content substring containment
    #[must_use]
    pub fn text_contains(value: impl Into<String>) -> Self {
        Self::TextContains {
            value: value.into(),
        }
    }

    /// Element-name match
    #[must_use]
    pub fn named(tag: impl Into<String>) -> Self {
        Self::Named { tag: tag.into() }
    }

    /// Negate this predicate. Negating twice yields the original.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Self::Not(inner) => *inner,
            other => Self::Not(Box::new(other)),
        }
    }

    fn to_xpath(&self) -> String {
        match self {
            Self::AttrEq { name, value } => {
                format!("@{name}={}", xpath_literal(value))
            }
            Self::AttrContains { name, value } => {
                format!("contains(@{name}, {})", xpath_literal(value))
            }
            Self::AttrMatches { name, pattern } => {
                format!("matches(@{name}, {})", xpath_literal(pattern))
            }
            Self::TextEq { value } => {
                format!("normalize-space(.)={}", xpath_literal(value))
            }
            Self::TextContains { value } => {
                format!("contains(., {})", xpath_literal(value))
            }
            Self::Named { tag } => format!("self::{tag}"),
            Self::Not(inner) => format!("not({})", inner.to_xpath()),
        }
    }
}

/// Traversal axes between nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Direct children
    Child,
    /// Direct parent
    Parent,
    /// All ancestors, nearest first
    Ancestor,
    /// All descendants
    Descendant,
    /// All nodes after this one in document order, excluding descendants
    Following,
    /// All nodes before this one in document order, excluding ancestors
    Preceding,
    /// Siblings after this node
    FollowingSibling,
    /// Siblings before this node
    PrecedingSibling,
}

impl Axis {
    /// XPath name of the axis
    #[must_use]
    pub const fn as_xpath(&self) -> &'static str {
        match self {
            Self::Child => "child",
            Self::Parent => "parent",
            Self::Ancestor => "ancestor",
            Self::Descendant => "descendant",
            Self::Following => "following",
            Self::Preceding => "preceding",
            Self::FollowingSibling => "following-sibling",
            Self::PrecedingSibling => "preceding-sibling",
        }
    }
}

/// One step of an expression: either a predicate filtering the current node
/// set, or a traversal moving it along an axis.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Step {
    /// Keep only nodes satisfying the predicate
    Where(Pred),
    /// Move along an axis, optionally filtered by element name
    Traverse {
        /// The axis to traverse
        axis: Axis,
        /// Tag filter applied to the reached nodes
        tag: Tag,
    },
}

/// An immutable, resolvable locator expression.
///
/// Obtained from [`Query::build`]. Structurally equal expressions compare
/// equal regardless of how their builders were shared or branched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueryExpr {
    anchor: Anchor,
    steps: Vec<Step>,
}

impl QueryExpr {
    /// The anchor this expression starts from
    #[must_use]
    pub const fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// The ordered steps of this expression
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Compile to an XPath 2.0 string.
    ///
    /// Regex predicates compile to `matches()`, so the output targets
    /// XPath 2.0 engines. The mock driver interprets expressions directly
    /// and does not go through this form.
    #[must_use]
    pub fn to_xpath(&self) -> String {
        let mut out = match self.anchor {
            Anchor::Root => "/*",
            Anchor::Anywhere => "//*",
            Anchor::Context => ".",
            Anchor::Bare => "*",
        }
        .to_string();

        for step in &self.steps {
            match step {
                Step::Where(pred) => {
                    out.push('[');
                    out.push_str(&pred.to_xpath());
                    out.push(']');
                }
                Step::Traverse { axis, tag } => {
                    out.push('/');
                    out.push_str(axis.as_xpath());
                    out.push_str("::");
                    out.push_str(&tag.as_xpath());
                }
            }
        }

        out
    }
}

/// Fluent builder for [`QueryExpr`].
///
/// Every method takes `&self` and returns a new builder, so partial chains
/// can be stored and branched safely:
///
/// ```
/// use manejar::query::{Query, Tag};
///
/// let options = Query::anywhere().attr_eq("role", "listbox").child(Tag::Any);
/// let enabled = options.attr_eq("aria-disabled", "false").build();
/// let selected = options.attr_eq("aria-selected", "true").build();
/// assert_ne!(enabled, selected);
/// // and the shared prefix was never mutated:
/// assert_eq!(options.build(), options.build());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    anchor: Anchor,
    steps: Vec<Step>,
}

impl Query {
    /// Start an absolute expression at the document root element
    #[must_use]
    pub fn from_root() -> Self {
        Self::with_anchor(Anchor::Root)
    }

    /// Start a relative expression at the context node (`.`)
    #[must_use]
    pub fn from_context() -> Self {
        Self::with_anchor(Anchor::Context)
    }

    /// Start an expression matching anywhere in the document, at any depth
    #[must_use]
    pub fn anywhere() -> Self {
        Self::with_anchor(Anchor::Anywhere)
    }

    /// Start a bare expression over the children of the context node
    #[must_use]
    pub fn bare() -> Self {
        Self::with_anchor(Anchor::Bare)
    }

    const fn with_anchor(anchor: Anchor) -> Self {
        Self {
            anchor,
            steps: Vec::new(),
        }
    }

    fn appended(&self, step: Step) -> Self {
        let mut steps = self.steps.clone();
        steps.push(step);
        Self {
            anchor: self.anchor,
            steps,
        }
    }

    /// Keep only nodes satisfying an arbitrary predicate (use this for
    /// negated forms built with [`Pred::negate`])
    #[must_use]
    pub fn filter(&self, pred: Pred) -> Self {
        self.appended(Step::Where(pred))
    }

    /// Keep only nodes whose attribute equals the value exactly
    #[must_use]
    pub fn attr_eq(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter(Pred::attr_eq(name, value))
    }

    /// Keep only nodes whose attribute contains the value as a substring
    #[must_use]
    pub fn attr_contains(&self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.filter(Pred::attr_contains(name, value))
    }

    /// Keep only nodes whose attribute matches the regex pattern
    #[must_use]
    pub fn attr_matches(&self, name: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.filter(Pred::attr_matches(name, pattern))
    }

    /// Keep only nodes whose text equals the value exactly
    #[must_use]
    pub fn text_eq(&self, value: impl Into<String>) -> Self {
        self.filter(Pred::text_eq(value))
    }

    /// Keep only nodes whose text contains the value as a substring
    #[must_use]
    pub fn text_contains(&self, value: impl Into<String>) -> Self {
        self.filter(Pred::text_contains(value))
    }

    /// Keep only nodes with the given element name
    #[must_use]
    pub fn named(&self, tag: impl Into<String>) -> Self {
        self.filter(Pred::named(tag))
    }

    /// Continue from the direct children of the matched nodes
    #[must_use]
    pub fn child(&self, tag: impl Into<Tag>) -> Self {
        self.traverse(Axis::Child, tag)
    }

    /// Continue from the parent of the matched nodes
    #[must_use]
    pub fn parent(&self, tag: impl Into<Tag>) -> Self {
        self.traverse(Axis::Parent, tag)
    }

    /// Continue from all ancestors of the matched nodes
    #[must_use]
    pub fn ancestor(&self, tag: impl Into<Tag>) -> Self {
        self.traverse(Axis::Ancestor, tag)
    }

    /// Continue from all descendants of the matched nodes
    #[must_use]
    pub fn descendant(&self, tag: impl Into<Tag>) -> Self {
        self.traverse(Axis::Descendant, tag)
    }

    /// Continue from all nodes after the matched nodes in document order
    #[must_use]
    pub fn following(&self, tag: impl Into<Tag>) -> Self {
        self.traverse(Axis::Following, tag)
    }

    /// Continue from all nodes before the matched nodes in document order
    #[must_use]
    pub fn preceding(&self, tag: impl Into<Tag>) -> Self {
        self.traverse(Axis::Preceding, tag)
    }

    /// Continue from the siblings after the matched nodes
    #[must_use]
    pub fn following_sibling(&self, tag: impl Into<Tag>) -> Self {
        self.traverse(Axis::FollowingSibling, tag)
    }

    /// Continue from the siblings before the matched nodes
    #[must_use]
    pub fn preceding_sibling(&self, tag: impl Into<Tag>) -> Self {
        self.traverse(Axis::PrecedingSibling, tag)
    }

    /// Continue along an arbitrary axis
    #[must_use]
    pub fn traverse(&self, axis: Axis, tag: impl Into<Tag>) -> Self {
        self.appended(Step::Traverse {
            axis,
            tag: tag.into(),
        })
    }

    /// Produce the immutable expression. Idempotent and side-effect free:
    /// the same builder state always yields a structurally equal
    /// expression.
    #[must_use]
    pub fn build(&self) -> QueryExpr {
        QueryExpr {
            anchor: self.anchor,
            steps: self.steps.clone(),
        }
    }
}

fn xpath_literal(s: &str) -> String {
    if !s.contains('\'') {
        format!("'{s}'")
    } else if !s.contains('"') {
        format!("\"{s}\"")
    } else {
        // Both quote kinds present: split on single quotes and rejoin
        let parts: Vec<String> = s.split('\'').map(|p| format!("'{p}'")).collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}
