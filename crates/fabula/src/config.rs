//! Configuration types for the chart and timeline models.
//!
//! This module provides configuration structures controlling grid snapping,
//! default element sizes, and timeline layout spacing. All types implement
//! [`serde::Deserialize`] for flexible loading from external sources.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining chart and timeline settings.
//! - [`ChartConfig`] - Node sizing and gesture snapping for the relationship chart.
//! - [`TimelineConfig`] - Spacing and minimum extent for timeline layout.
//!
//! # Example
//!
//! ```
//! # use fabula::config::AppConfig;
//! let config = AppConfig::default();
//! assert_eq!(config.chart().node_grid(), 10.0);
//! assert_eq!(config.timeline().spacing(), 20.0);
//! ```

use serde::Deserialize;

use fabula_core::geometry::Size;

/// Top-level configuration combining chart and timeline settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Relationship chart configuration section.
    #[serde(default)]
    chart: ChartConfig,

    /// Timeline configuration section.
    #[serde(default)]
    timeline: TimelineConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] with the specified chart and timeline
    /// configurations.
    pub fn new(chart: ChartConfig, timeline: TimelineConfig) -> Self {
        Self { chart, timeline }
    }

    /// Returns the chart configuration.
    pub fn chart(&self) -> &ChartConfig {
        &self.chart
    }

    /// Returns the timeline configuration.
    pub fn timeline(&self) -> &TimelineConfig {
        &self.timeline
    }
}

/// Node sizing and gesture snapping for the relationship chart.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartConfig {
    /// Size given to a node when it is added; the host may overwrite it
    /// after measuring the rendered text.
    #[serde(default = "default_node_size")]
    node_size: Size,

    /// Grid interval in pixels for node drags.
    #[serde(default = "default_node_grid")]
    node_grid: f64,

    /// Grid interval in pixels for label drags.
    #[serde(default = "default_label_grid")]
    label_grid: f64,

    /// Fraction of a node rectangle's extent forming the edge snap band on
    /// each side.
    #[serde(default = "default_snap_band")]
    snap_band: f64,
}

impl ChartConfig {
    /// Returns the default size for newly added nodes.
    pub fn node_size(&self) -> Size {
        self.node_size
    }

    /// Returns the grid interval for node drags, in pixels.
    pub fn node_grid(&self) -> f64 {
        self.node_grid
    }

    /// Returns the grid interval for label drags, in pixels.
    pub fn label_grid(&self) -> f64 {
        self.label_grid
    }

    /// Returns the snap band ratio for endpoint attachment.
    pub fn snap_band(&self) -> f64 {
        self.snap_band
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            node_size: default_node_size(),
            node_grid: default_node_grid(),
            label_grid: default_label_grid(),
            snap_band: default_snap_band(),
        }
    }
}

/// Spacing and minimum extent for timeline layout.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineConfig {
    /// Minimum total width of the timeline in pixels; the layout never
    /// shrinks below this even as items are removed.
    #[serde(default = "default_min_width")]
    min_width: f64,

    /// Horizontal spacing between laid-out items, in pixels.
    #[serde(default = "default_spacing")]
    spacing: f64,
}

impl TimelineConfig {
    /// Creates a new [`TimelineConfig`] with the specified minimum width
    /// and spacing.
    pub fn new(min_width: f64, spacing: f64) -> Self {
        Self { min_width, spacing }
    }

    /// Returns the minimum total width in pixels.
    pub fn min_width(&self) -> f64 {
        self.min_width
    }

    /// Returns the spacing between items in pixels.
    pub fn spacing(&self) -> f64 {
        self.spacing
    }
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            min_width: default_min_width(),
            spacing: default_spacing(),
        }
    }
}

fn default_node_size() -> Size {
    Size::new(120.0, 60.0)
}

fn default_node_grid() -> f64 {
    10.0
}

fn default_label_grid() -> f64 {
    5.0
}

fn default_snap_band() -> f64 {
    0.2
}

fn default_min_width() -> f64 {
    300.0
}

fn default_spacing() -> f64 {
    20.0
}
