//! Continuous-value drag components.
//!
//! A slider encodes a numeric value in the position of a draggable thumb
//! along the host's primary axis, optionally through a monotonic scale /
//! inverse-scale pair (logarithmic volume controls and the like). Writing a
//! value computes the target fractional position through the inverse scale,
//! then issues a press-move-release drag to the corresponding pixel.
//!
//! # Precision
//!
//! Positioning on a real surface is pixel-quantized: when the value range
//! is much larger than the track's pixel width, the value that lands may
//! differ slightly from the one requested. That is inherent to dragging,
//! not a defect to compensate for; assertions against real surfaces should
//! tolerate a small delta. (The in-crate mock resolves drags exactly, so
//! its round-trips are equality-checked.)

use crate::config::DesignConfig;
use crate::driver::{Driver, Point};
use crate::element::{Component, Element};
use crate::query::{Query, QueryExpr, Tag};
use crate::result::{ManejarError, ManejarResult};
use std::sync::Arc;

/// Attribute carrying a thumb's current value
pub const VALUE_NOW_ATTR: &str = "aria-valuenow";
/// Attribute carrying the lower bound
pub const VALUE_MIN_ATTR: &str = "aria-valuemin";
/// Attribute carrying the upper bound
pub const VALUE_MAX_ATTR: &str = "aria-valuemax";

/// Monotonic value scale for non-linear sliders
#[derive(Clone)]
pub enum Scale {
    /// Identity scale
    Linear,
    /// Custom monotonic pair; `inverse` must invert `forward`
    Custom {
        /// Maps scale space back to value space
        forward: Arc<dyn Fn(f64) -> f64 + Send + Sync>,
        /// Maps value space into scale space
        inverse: Arc<dyn Fn(f64) -> f64 + Send + Sync>,
    },
}

impl std::fmt::Debug for Scale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Linear => f.write_str("Scale::Linear"),
            Self::Custom { .. } => f.write_str("Scale::Custom"),
        }
    }
}

impl Scale {
    /// Create a custom scale from a monotonic function pair
    #[must_use]
    pub fn custom<F, I>(forward: F, inverse: I) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
        I: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::Custom {
            forward: Arc::new(forward),
            inverse: Arc::new(inverse),
        }
    }

    /// Apply the forward mapping (scale space to value space)
    #[must_use]
    pub fn apply(&self, v: f64) -> f64 {
        match self {
            Self::Linear => v,
            Self::Custom { forward, .. } => forward(v),
        }
    }

    /// Apply the inverse mapping (value space to scale space)
    #[must_use]
    pub fn invert(&self, v: f64) -> f64 {
        match self {
            Self::Linear => v,
            Self::Custom { inverse, .. } => inverse(v),
        }
    }
}

/// Orientation and scale options for a slider
#[derive(Debug, Clone)]
pub struct SliderOptions {
    /// Primary axis is vertical instead of horizontal
    pub vertical: bool,
    /// Direction is flipped (max at the left/top end)
    pub inverted: bool,
    /// Value scale
    pub scale: Scale,
    /// Expression resolving thumbs inside the host
    pub thumb_locator: QueryExpr,
}

impl Default for SliderOptions {
    fn default() -> Self {
        Self {
            vertical: false,
            inverted: false,
            scale: Scale::Linear,
            thumb_locator: Query::from_context()
                .descendant(Tag::Any)
                .attr_eq("role", "slider")
                .build(),
        }
    }
}

impl SliderOptions {
    /// Create options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set vertical orientation
    #[must_use]
    pub fn with_vertical(mut self, vertical: bool) -> Self {
        self.vertical = vertical;
        self
    }

    /// Set inverted direction
    #[must_use]
    pub fn with_inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self
    }

    /// Set the value scale
    #[must_use]
    pub fn with_scale(mut self, scale: Scale) -> Self {
        self.scale = scale;
        self
    }

    /// Override the thumb expression
    #[must_use]
    pub fn with_thumb_locator(mut self, expr: QueryExpr) -> Self {
        self.thumb_locator = expr;
        self
    }
}

/// One thumb of a slider, captured with its value at fetch time.
///
/// Thumb references are snapshots: after any mutation the index-to-thumb
/// mapping may have reordered, so callers re-fetch via [`Slider::thumbs`]
/// rather than reusing references across mutations.
#[derive(Debug, Clone)]
pub struct Thumb {
    element: Element,
    value: f64,
}

impl Thumb {
    /// The thumb element
    #[must_use]
    pub const fn element(&self) -> &Element {
        &self.element
    }

    /// The thumb's value at fetch time
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }
}

/// A continuous-value drag component
#[derive(Debug, Clone)]
pub struct Slider {
    element: Element,
    design: Arc<DesignConfig>,
    options: SliderOptions,
}

impl Component for Slider {
    fn component_name() -> &'static str {
        "slider"
    }

    fn attach(element: Element, design: Arc<DesignConfig>) -> Self {
        Self {
            element,
            design,
            options: SliderOptions::default(),
        }
    }

    fn element(&self) -> &Element {
        &self.element
    }

    fn design(&self) -> &Arc<DesignConfig> {
        &self.design
    }
}

impl Slider {
    /// Replace the orientation/scale options
    #[must_use]
    pub fn with_options(mut self, options: SliderOptions) -> Self {
        self.options = options;
        self
    }

    /// The options in effect
    #[must_use]
    pub const fn options(&self) -> &SliderOptions {
        &self.options
    }

    /// Fetch the thumbs, ordered by ascending value.
    ///
    /// Both index-based addressing (through [`Slider::set_thumb_value`] /
    /// [`Slider::move_thumb_at`]) and reference-based addressing (through
    /// [`Slider::drag_thumb`]) work against this ordering. Re-fetch after
    /// any mutation.
    pub fn thumbs(&self) -> ManejarResult<Vec<Thumb>> {
        let mut thumbs = Vec::new();
        for element in self.element.find_all(&self.options.thumb_locator)? {
            let value = read_f64_attr(&element, VALUE_NOW_ATTR)?;
            thumbs.push(Thumb { element, value });
        }
        thumbs.sort_by(|a, b| a.value.total_cmp(&b.value));
        Ok(thumbs)
    }

    /// Declared value bounds, read from the first thumb
    pub fn bounds(&self) -> ManejarResult<(f64, f64)> {
        let thumb = self.first_thumb()?;
        let min = read_f64_attr(&thumb.element, VALUE_MIN_ATTR)?;
        let max = read_f64_attr(&thumb.element, VALUE_MAX_ATTR)?;
        Ok((min, max))
    }

    /// Current value of the (first) thumb, a direct attribute read
    pub fn value(&self) -> ManejarResult<f64> {
        Ok(self.first_thumb()?.value)
    }

    /// Current values of all thumbs, ascending
    pub fn values(&self) -> ManejarResult<Vec<f64>> {
        Ok(self.thumbs()?.iter().map(Thumb::value).collect())
    }

    /// Drag the (first) thumb so that it encodes `value`.
    ///
    /// # Errors
    ///
    /// [`ManejarError::OutOfRange`] when `value` lies outside the declared
    /// bounds, raised before any UI interaction.
    pub fn set_value(&self, value: f64) -> ManejarResult<()> {
        self.set_thumb_value(0, value)
    }

    /// Drag the thumb at `index` (in ascending-value order) so that it
    /// encodes `value`
    pub fn set_thumb_value(&self, index: usize, value: f64) -> ManejarResult<()> {
        let (min, max) = self.bounds()?;
        if !(min..=max).contains(&value) {
            return Err(ManejarError::OutOfRange { value, min, max });
        }

        let scale = &self.options.scale;
        let span = scale.invert(max) - scale.invert(min);
        let fraction = if span == 0.0 {
            0.0
        } else {
            (scale.invert(value) - scale.invert(min)) / span
        };

        tracing::debug!(index, value, fraction, "dragging thumb to value");
        let thumb = self.thumb_at(index)?;
        self.drag_thumb(&thumb, fraction)
    }

    /// Drag the (first) thumb to a fractional position along the track.
    ///
    /// # Errors
    ///
    /// [`ManejarError::OutOfRange`] when `fraction` lies outside `[0, 1]`,
    /// raised before any UI interaction.
    pub fn move_thumb(&self, fraction: f64) -> ManejarResult<()> {
        self.move_thumb_at(0, fraction)
    }

    /// Drag the thumb at `index` to a fractional position along the track
    pub fn move_thumb_at(&self, index: usize, fraction: f64) -> ManejarResult<()> {
        validate_fraction(fraction)?;
        let thumb = self.thumb_at(index)?;
        self.drag_thumb(&thumb, fraction)
    }

    /// Drag a previously fetched thumb to a fractional position.
    ///
    /// The reference-based addressing mode: valid only until the next
    /// mutation reorders the thumbs.
    pub fn drag_thumb(&self, thumb: &Thumb, fraction: f64) -> ManejarResult<()> {
        validate_fraction(fraction)?;

        let track = self.element.rect()?;
        let f = if self.options.inverted {
            1.0 - fraction
        } else {
            fraction
        };
        let target = if self.options.vertical {
            Point::new(track.x + track.width / 2.0, track.y + f * track.height)
        } else {
            Point::new(track.x + f * track.width, track.y + track.height / 2.0)
        };

        let from = thumb.element.rect()?.center();
        let driver = self.element.driver();
        driver.press_at(from)?;
        driver.move_by(target.x - from.x, target.y - from.y)?;
        driver.release()
    }

    fn first_thumb(&self) -> ManejarResult<Thumb> {
        self.thumb_at(0)
    }

    fn thumb_at(&self, index: usize) -> ManejarResult<Thumb> {
        self.thumbs()?
            .into_iter()
            .nth(index)
            .ok_or_else(|| ManejarError::NotFound {
                what: format!("slider thumb {index}"),
            })
    }
}

fn validate_fraction(fraction: f64) -> ManejarResult<()> {
    if (0.0..=1.0).contains(&fraction) {
        Ok(())
    } else {
        Err(ManejarError::OutOfRange {
            value: fraction,
            min: 0.0,
            max: 1.0,
        })
    }
}

fn read_f64_attr(element: &Element, name: &str) -> ManejarResult<f64> {
    let raw = element
        .attribute(name)?
        .ok_or_else(|| ManejarError::NotFound {
            what: format!("attribute {name} on {}", element.id()),
        })?;
    raw.parse().map_err(|_| ManejarError::InputError {
        message: format!("attribute {name}={raw:?} is not a number"),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::driver::{NodeId, Rect};
    use crate::mock::MockTree;

    /// A horizontal 200px track spanning values [100, 300], one thumb.
    fn slider_fixture() -> (Arc<MockTree>, Slider, NodeId) {
        let tree = Arc::new(MockTree::new());
        let root = tree.root();

        let track = tree.add_node(root, "div");
        tree.set_attr(track, "class", "au-slider");
        tree.set_rect(track, Rect::new(0.0, 0.0, 200.0, 20.0));

        let thumb = tree.add_node(track, "span");
        tree.set_attr(thumb, "role", "slider");
        tree.set_attr(thumb, VALUE_MIN_ATTR, "100");
        tree.set_attr(thumb, VALUE_MAX_ATTR, "300");
        tree.set_attr(thumb, VALUE_NOW_ATTR, "100");
        tree.set_rect(thumb, Rect::new(0.0, 5.0, 10.0, 10.0));

        let design = Arc::new(DesignConfig::new("aurora", "au"));
        let driver: Arc<dyn crate::driver::Driver> = tree.clone();
        let slider: Slider = Element::new(driver, track).reinterpret(&design);
        (tree, slider, thumb)
    }

    fn add_thumb(tree: &MockTree, track: NodeId, value: &str, x: f64) -> NodeId {
        let thumb = tree.add_node(track, "span");
        tree.set_attr(thumb, "role", "slider");
        tree.set_attr(thumb, VALUE_MIN_ATTR, "0");
        tree.set_attr(thumb, VALUE_MAX_ATTR, "100");
        tree.set_attr(thumb, VALUE_NOW_ATTR, value);
        tree.set_rect(thumb, Rect::new(x, 0.0, 4.0, 4.0));
        thumb
    }

    mod scale_tests {
        use super::*;

        #[test]
        fn test_linear_is_identity() {
            assert_eq!(Scale::Linear.apply(7.5), 7.5);
            assert_eq!(Scale::Linear.invert(7.5), 7.5);
        }

        #[test]
        fn test_custom_pair_round_trips() {
            let scale = Scale::custom(|v| 10f64.powf(v), f64::log10);
            let v = 250.0;
            assert!((scale.apply(scale.invert(v)) - v).abs() < 1e-9);
        }
    }

    mod round_trip_tests {
        use super::*;

        #[test]
        fn test_set_value_round_trips_exactly() {
            let (_tree, slider, _thumb) = slider_fixture();
            for target in [160.0, 240.0, 100.0, 300.0] {
                slider.set_value(target).unwrap();
                assert_eq!(slider.value().unwrap(), target);
            }
        }

        #[test]
        fn test_set_value_validates_before_interaction() {
            let (tree, slider, _thumb) = slider_fixture();
            assert!(matches!(
                slider.set_value(99.9),
                Err(ManejarError::OutOfRange { .. })
            ));
            assert!(matches!(
                slider.set_value(300.1),
                Err(ManejarError::OutOfRange { .. })
            ));
            // Fail-fast: no drag was ever issued.
            assert!(tree.drag_log().is_empty());
        }

        #[test]
        fn test_log_scale_set_value() {
            let tree = Arc::new(MockTree::new());
            let root = tree.root();
            let track = tree.add_node(root, "div");
            tree.set_attr(track, "class", "au-slider");
            tree.set_rect(track, Rect::new(0.0, 0.0, 300.0, 20.0));
            tree.set_attr(track, "data-scale", "log10");

            let thumb = tree.add_node(track, "span");
            tree.set_attr(thumb, "role", "slider");
            tree.set_attr(thumb, VALUE_MIN_ATTR, "1");
            tree.set_attr(thumb, VALUE_MAX_ATTR, "1000");
            tree.set_attr(thumb, VALUE_NOW_ATTR, "1");
            tree.set_rect(thumb, Rect::new(0.0, 5.0, 6.0, 6.0));

            let design = Arc::new(DesignConfig::new("aurora", "au"));
            let driver: Arc<dyn crate::driver::Driver> = tree.clone();
            let slider: Slider = Element::new(driver, track).reinterpret(&design);
            let slider =
                slider.with_options(SliderOptions::new().with_scale(Scale::custom(
                    |v| 10f64.powf(v),
                    f64::log10,
                )));

            // log10(10) is a third of the way through [log10(1), log10(1000)],
            // and the mock inverts through the same scale.
            slider.set_value(10.0).unwrap();
            assert!((slider.value().unwrap() - 10.0).abs() < 1e-9);
        }
    }

    mod move_thumb_tests {
        use super::*;

        #[test]
        fn test_move_thumb_fraction_bounds() {
            let (_tree, slider, _thumb) = slider_fixture();
            assert!(matches!(
                slider.move_thumb(-0.01),
                Err(ManejarError::OutOfRange { .. })
            ));
            assert!(matches!(
                slider.move_thumb(1.01),
                Err(ManejarError::OutOfRange { .. })
            ));
            slider.move_thumb(0.0).unwrap();
            slider.move_thumb(1.0).unwrap();
        }

        #[test]
        fn test_move_thumb_half_way() {
            let (_tree, slider, _thumb) = slider_fixture();
            slider.move_thumb(0.5).unwrap();
            assert_eq!(slider.value().unwrap(), 200.0);
        }

        #[test]
        fn test_inverted_flips_direction() {
            let (_tree, slider, _thumb) = slider_fixture();
            let slider = slider.with_options(SliderOptions::new().with_inverted(true));
            slider.move_thumb(0.0).unwrap();
            // Fraction 0 lands at the far (max) end of an inverted track.
            assert_eq!(slider.value().unwrap(), 300.0);
        }

        #[test]
        fn test_vertical_uses_the_other_axis() {
            let tree = Arc::new(MockTree::new());
            let root = tree.root();
            let track = tree.add_node(root, "div");
            tree.set_attr(track, "class", "au-slider");
            tree.set_attr(track, "data-vertical", "true");
            tree.set_rect(track, Rect::new(0.0, 0.0, 20.0, 100.0));

            let thumb = tree.add_node(track, "span");
            tree.set_attr(thumb, "role", "slider");
            tree.set_attr(thumb, VALUE_MIN_ATTR, "0");
            tree.set_attr(thumb, VALUE_MAX_ATTR, "10");
            tree.set_attr(thumb, VALUE_NOW_ATTR, "0");
            tree.set_rect(thumb, Rect::new(5.0, 0.0, 10.0, 10.0));

            let design = Arc::new(DesignConfig::new("aurora", "au"));
            let driver: Arc<dyn crate::driver::Driver> = tree.clone();
            let slider: Slider = Element::new(driver, track).reinterpret(&design);
            let slider = slider.with_options(SliderOptions::new().with_vertical(true));

            slider.move_thumb(0.5).unwrap();
            assert_eq!(slider.value().unwrap(), 5.0);
        }
    }

    mod multi_thumb_tests {
        use super::*;

        #[test]
        fn test_thumbs_order_by_ascending_value() {
            let tree = Arc::new(MockTree::new());
            let track = tree.add_node(tree.root(), "div");
            tree.set_attr(track, "class", "au-slider");
            tree.set_rect(track, Rect::new(0.0, 0.0, 100.0, 10.0));
            // Attached in descending order on purpose.
            add_thumb(&tree, track, "80", 80.0);
            add_thumb(&tree, track, "20", 20.0);

            let design = Arc::new(DesignConfig::new("aurora", "au"));
            let driver: Arc<dyn crate::driver::Driver> = tree.clone();
            let slider: Slider = Element::new(driver, track).reinterpret(&design);

            assert_eq!(slider.values().unwrap(), vec![20.0, 80.0]);
        }

        #[test]
        fn test_index_mapping_reorders_after_mutation() {
            let tree = Arc::new(MockTree::new());
            let track = tree.add_node(tree.root(), "div");
            tree.set_attr(track, "class", "au-slider");
            tree.set_rect(track, Rect::new(0.0, 0.0, 100.0, 10.0));
            let low = add_thumb(&tree, track, "20", 20.0);
            let high = add_thumb(&tree, track, "80", 80.0);

            let design = Arc::new(DesignConfig::new("aurora", "au"));
            let driver: Arc<dyn crate::driver::Driver> = tree.clone();
            let slider: Slider = Element::new(driver, track).reinterpret(&design);

            // Drag the low thumb past the high one.
            slider.set_thumb_value(0, 95.0).unwrap();

            let thumbs = slider.thumbs().unwrap();
            assert_eq!(thumbs[0].element().id(), high);
            assert_eq!(thumbs[1].element().id(), low);
            assert_eq!(slider.values().unwrap(), vec![80.0, 95.0]);
        }

        #[test]
        fn test_missing_thumb_index_is_not_found() {
            let (_tree, slider, _thumb) = slider_fixture();
            assert!(matches!(
                slider.set_thumb_value(3, 150.0),
                Err(ManejarError::NotFound { .. })
            ));
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn prop_linear_fraction_stays_in_unit_interval(v in 100.0f64..=300.0) {
                let scale = Scale::Linear;
                let span = scale.invert(300.0) - scale.invert(100.0);
                let fraction = (scale.invert(v) - scale.invert(100.0)) / span;
                prop_assert!((0.0..=1.0).contains(&fraction));
            }

            #[test]
            fn prop_log_fraction_stays_in_unit_interval(v in 1.0f64..=1000.0) {
                let scale = Scale::custom(|x| 10f64.powf(x), f64::log10);
                let span = scale.invert(1000.0) - scale.invert(1.0);
                let fraction = (scale.invert(v) - scale.invert(1.0)) / span;
                prop_assert!((-1e-12..=1.0 + 1e-12).contains(&fraction));
            }
        }
    }
}
