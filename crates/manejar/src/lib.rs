//! Manejar: typed widget harness for design-system UI automation.
//!
//! Manejar (Spanish: "to handle, to operate") wraps raw element handles of
//! a live, mutating UI tree into typed, semantically named components and
//! gives automation code the synchronization primitives that dynamically
//! rendered, animated, overlay-based widgets demand.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                      MANEJAR Architecture                        │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌─────────────┐   ┌──────────────────────────┐  │
//! │  │ Typed     │   │ Selection / │   │ Overlay resolution       │  │
//! │  │ widgets   │──►│ drag        │──►│ + bounded waits          │  │
//! │  │ (thin)    │   │ protocols   │   │ (re-resolve, never cache)│  │
//! │  └───────────┘   └─────────────┘   └──────────────────────────┘  │
//! │        │                │                      │                 │
//! │        └────────────────┴──────────┬───────────┘                 │
//! │                                    ▼                             │
//! │   structural QueryExpr ──────► Driver trait (live tree + input)  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything executes on the calling thread, synchronously: the only form
//! of waiting is the bounded polling loop in [`wait`], and every read is a
//! live re-query because the tree mutates out-of-band. Design-system
//! specifics (class prefixes, state predicates, open/close triggers) are
//! injected as plain data through [`config::DesignConfig`].

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

pub mod config;
pub mod driver;
pub mod element;
pub mod mock;
pub mod overlay;
pub mod query;
pub mod result;
pub mod selection;
pub mod slider;
pub mod wait;
pub mod widgets;

pub use config::{DesignConfig, OptionIdentity, SelectionConfig};
pub use driver::{Driver, Key, KeyInput, NodeId, Point, Rect};
pub use element::{Component, Element};
pub use mock::MockTree;
pub use overlay::{find_top_visible_container, find_visible_containers};
pub use query::{Axis, Pred, Query, QueryExpr, Tag};
pub use result::{ManejarError, ManejarResult};
pub use selection::{OptionHost, OptionItem};
pub use slider::{Scale, Slider, SliderOptions, Thumb};
pub use wait::{poll_until, wait_for, WaitOptions};
pub use widgets::{Dialog, Menu, MultiSelect, SelectBox};
