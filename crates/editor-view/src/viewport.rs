//! Viewport virtualization.
//!
//! Given the host's scroll metrics, compute the half-open range of lines that must be
//! materialized. The range is padded with an *adaptive* overscan: at least
//! [`ViewportConfig::min_overscan`] lines on each side, growing with the number of lines that fit
//! in the viewport so tall viewports do not pop in during fast scrolling.
//!
//! Everything here is a pure function of its inputs. Hosts call it on every scroll frame and are
//! responsible for throttling the scroll events themselves.

use serde::Deserialize;

/// Default minimum number of overscan lines on each side of the visible range.
pub const DEFAULT_MIN_OVERSCAN: u32 = 10;
/// Default overscan as a fraction of the strictly visible line count.
pub const DEFAULT_OVERSCAN_RATIO: f64 = 0.75;
/// Default number of blank lines of scrollable space after the last line.
pub const DEFAULT_PAD_LINES: u32 = 20;

/// A half-open range of line (or row) indices: `start..end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct VisibleRange {
    /// First line to materialize (inclusive).
    pub start: u32,
    /// One past the last line to materialize.
    pub end: u32,
}

impl VisibleRange {
    /// The empty range at the top of the document.
    pub const EMPTY: Self = Self { start: 0, end: 0 };

    /// Number of lines in the range.
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` if the range contains no lines.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Returns `true` if `line` falls inside the range.
    pub fn contains(&self, line: u32) -> bool {
        self.start <= line && line < self.end
    }

    /// The range as a `usize` range, for slicing line arrays.
    pub fn as_usize_range(&self) -> std::ops::Range<usize> {
        self.start as usize..self.end as usize
    }
}

/// Tunables for [`Viewport`].
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Minimum overscan lines applied on each side.
    pub min_overscan: u32,
    /// Overscan as a fraction of the visible line count (rounded up).
    pub overscan_ratio: f64,
    /// Trailing blank lines included in the scrollable height.
    pub pad_lines: u32,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            min_overscan: DEFAULT_MIN_OVERSCAN,
            overscan_ratio: DEFAULT_OVERSCAN_RATIO,
            pad_lines: DEFAULT_PAD_LINES,
        }
    }
}

/// Stateless virtualizer parameterized by a [`ViewportConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    config: ViewportConfig,
}

impl Viewport {
    /// Create a virtualizer with the given configuration.
    pub fn new(config: ViewportConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &ViewportConfig {
        &self.config
    }

    /// Compute the lines to materialize for the given scroll metrics.
    ///
    /// The result always satisfies `0 <= start <= end <= line_count`. A non-positive or
    /// non-finite `line_height` yields [`VisibleRange::EMPTY`]; negative scroll offsets and
    /// viewport heights are treated as zero.
    pub fn visible_range(
        &self,
        scroll_top: f64,
        line_height: f64,
        viewport_height: f64,
        line_count: u32,
    ) -> VisibleRange {
        if !(line_height.is_finite() && line_height > 0.0) {
            return VisibleRange::EMPTY;
        }
        let scroll_top = non_negative(scroll_top);
        let viewport_height = non_negative(viewport_height);

        let first = (scroll_top / line_height).floor();
        let last = ((scroll_top + viewport_height) / line_height).ceil();
        let overscan = self.overscan_for((last - first).max(0.0));

        let count = f64::from(line_count);
        let end = (last + overscan).clamp(0.0, count);
        let start = (first - overscan).clamp(0.0, end);

        // Both values are clamped to `[0, line_count]`, so the casts are exact.
        VisibleRange {
            start: start as u32,
            end: end as u32,
        }
    }

    /// Overscan lines for a viewport that strictly shows `visible` lines.
    pub fn overscan_for(&self, visible: f64) -> f64 {
        let ratio = non_negative(self.config.overscan_ratio);
        (visible * ratio)
            .ceil()
            .max(f64::from(self.config.min_overscan))
    }

    /// Total scrollable height, including the trailing pad lines.
    pub fn scroll_height(&self, line_count: u32, line_height: f64) -> f64 {
        let rows = f64::from(line_count) + f64::from(self.config.pad_lines);
        rows * non_negative(line_height)
    }

    /// Largest valid `scroll_top` for the given content and viewport.
    pub fn max_scroll_top(&self, line_count: u32, line_height: f64, viewport_height: f64) -> f64 {
        (self.scroll_height(line_count, line_height) - non_negative(viewport_height)).max(0.0)
    }

    /// The smallest scroll adjustment that brings `line` fully into view.
    ///
    /// Returns `scroll_top` unchanged when the line is already visible.
    pub fn scroll_top_to_reveal(
        &self,
        line: u32,
        scroll_top: f64,
        line_height: f64,
        viewport_height: f64,
    ) -> f64 {
        let scroll_top = non_negative(scroll_top);
        if !(line_height.is_finite() && line_height > 0.0) {
            return scroll_top;
        }
        let viewport_height = non_negative(viewport_height);

        let top = f64::from(line) * line_height;
        let bottom = top + line_height;
        if top < scroll_top {
            top
        } else if bottom > scroll_top + viewport_height {
            (bottom - viewport_height).max(0.0)
        } else {
            scroll_top
        }
    }
}

/// [`Viewport::visible_range`] with the default configuration.
pub fn visible_range(
    scroll_top: f64,
    line_height: f64,
    viewport_height: f64,
    line_count: u32,
) -> VisibleRange {
    Viewport::default().visible_range(scroll_top, line_height, viewport_height, line_count)
}

/// [`Viewport::scroll_height`] with the default configuration.
pub fn scroll_height(line_count: u32, line_height: f64) -> f64 {
    Viewport::default().scroll_height(line_count, line_height)
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_of_document_uses_min_overscan() {
        // 10 visible lines -> ceil(10 * 0.75) = 8 < 10, so overscan is 10.
        let range = visible_range(0.0, 20.0, 200.0, 1_000);
        assert_eq!(range, VisibleRange { start: 0, end: 20 });
    }

    #[test]
    fn test_tall_viewport_grows_overscan() {
        // 40 visible lines -> overscan 30.
        let range = visible_range(2_000.0, 10.0, 400.0, 10_000);
        assert_eq!(
            range,
            VisibleRange {
                start: 170,
                end: 270
            }
        );
    }

    #[test]
    fn test_partial_line_rounds_outward() {
        // scroll_top 15 with height 10 -> first = 1, last = ceil(65 / 10) = 7.
        let range = visible_range(15.0, 10.0, 50.0, 100);
        assert_eq!(range, VisibleRange { start: 0, end: 17 });
    }

    #[test]
    fn test_clamps_to_line_count() {
        let range = visible_range(0.0, 20.0, 600.0, 5);
        assert_eq!(range, VisibleRange { start: 0, end: 5 });

        let range = visible_range(1e9, 20.0, 600.0, 5);
        assert_eq!(range, VisibleRange { start: 5, end: 5 });
        assert!(range.is_empty());
    }

    #[test]
    fn test_degenerate_inputs() {
        assert_eq!(visible_range(0.0, 0.0, 100.0, 10), VisibleRange::EMPTY);
        assert_eq!(visible_range(0.0, f64::NAN, 100.0, 10), VisibleRange::EMPTY);
        assert_eq!(
            visible_range(-50.0, 10.0, 100.0, 100),
            visible_range(0.0, 10.0, 100.0, 100)
        );
        assert_eq!(visible_range(0.0, 10.0, 100.0, 0), VisibleRange::EMPTY);
    }

    #[test]
    fn test_custom_config() {
        let viewport = Viewport::new(ViewportConfig {
            min_overscan: 0,
            overscan_ratio: 0.0,
            pad_lines: 0,
        });
        let range = viewport.visible_range(100.0, 10.0, 50.0, 100);
        assert_eq!(range, VisibleRange { start: 10, end: 15 });
        assert_eq!(viewport.scroll_height(100, 10.0), 1_000.0);
    }

    #[test]
    fn test_scroll_height_includes_padding() {
        assert_eq!(scroll_height(100, 18.0), 120.0 * 18.0);
        assert_eq!(
            Viewport::default().max_scroll_top(10, 10.0, 100.0),
            (30.0 * 10.0) - 100.0
        );
    }

    #[test]
    fn test_scroll_top_to_reveal() {
        let viewport = Viewport::default();
        // Already visible.
        assert_eq!(viewport.scroll_top_to_reveal(5, 0.0, 10.0, 100.0), 0.0);
        // Above the viewport: align to top.
        assert_eq!(viewport.scroll_top_to_reveal(2, 50.0, 10.0, 100.0), 20.0);
        // Below the viewport: align to bottom.
        assert_eq!(viewport.scroll_top_to_reveal(20, 0.0, 10.0, 100.0), 110.0);
    }
}
