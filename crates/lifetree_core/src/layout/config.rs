//! Layout configuration.
//!
//! Every field has a default so hosts can pass partial JSON.

use serde::{Deserialize, Serialize};

/// How a person's generation tier is derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierStrategy {
    /// Role offset when the role is known, birth-year bucket otherwise.
    #[default]
    RolePreferred,
    /// Birth-year bucket when a year parses, role offset otherwise.
    BirthYearPreferred,
    /// Role offset only.
    RoleOnly,
    /// Birth-year bucket only.
    BirthYearOnly,
}

/// Vertical stacking of tier rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Lowest (oldest) tier at `y = 0`.
    #[default]
    OldestOnTop,
    /// Lowest (oldest) tier at the largest `y`.
    OldestAtBottom,
}

/// Geometry and tiering options for the family layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub strategy: TierStrategy,
    pub orientation: Orientation,
    pub node_width: f64,
    pub node_height: f64,
    /// Gap between neighbouring slots (singles or couples) in one row.
    pub horizontal_gap: f64,
    /// Gap between the two nodes of a couple.
    pub couple_gap: f64,
    /// Gap between tier rows.
    pub vertical_gap: f64,
    /// First birth year of tier 0.
    pub anchor_year: i32,
    pub generation_span_years: i32,
    pub min_tier: i32,
    pub max_tier: i32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            strategy: TierStrategy::default(),
            orientation: Orientation::default(),
            node_width: 180.0,
            node_height: 80.0,
            horizontal_gap: 60.0,
            couple_gap: 24.0,
            vertical_gap: 120.0,
            anchor_year: 1975,
            generation_span_years: 25,
            min_tier: -4,
            max_tier: 3,
        }
    }
}

impl LayoutConfig {
    /// Distance between the tops of two consecutive rows.
    pub fn row_pitch(&self) -> f64 {
        self.node_height.max(0.0) + self.vertical_gap.max(0.0)
    }

    /// Inclusive tier range with reversed bounds repaired.
    pub fn tier_bounds(&self) -> (i32, i32) {
        if self.min_tier <= self.max_tier {
            (self.min_tier, self.max_tier)
        } else {
            (self.max_tier, self.min_tier)
        }
    }
}
