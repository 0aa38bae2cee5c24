//! Decision thresholds for the diagnostic rules.
//!
//! Factors are percentages stored as plain numbers (92.3 means 92.3 %).

/// Current consumption above `average * HIGH_CONSUMPTION_RATIO` is flagged.
pub const HIGH_CONSUMPTION_RATIO: f64 = 1.10;
/// Current consumption below `average * LOW_CONSUMPTION_RATIO` is good performance.
pub const LOW_CONSUMPTION_RATIO: f64 = 0.90;
/// Mean month-over-month change (percent) beyond which consumption is trending.
pub const MONTHLY_TREND_PCT: f64 = 5.0;

/// Utility penalty limit for power factor.
pub const POWER_FACTOR_LIMIT: f64 = 90.0;
/// Power factor below this is borderline even when above the limit.
pub const POWER_FACTOR_TARGET: f64 = 95.0;
pub const POWER_FACTOR_DETERIORATION_RATIO: f64 = 0.98;
pub const POWER_FACTOR_IMPROVEMENT_RATIO: f64 = 1.02;

pub const LOAD_FACTOR_MIN: f64 = 20.0;
pub const LOAD_FACTOR_LOW: f64 = 30.0;
pub const LOAD_FACTOR_GOOD: f64 = 70.0;
pub const LOAD_FACTOR_DETERIORATION_RATIO: f64 = 0.9;
pub const LOAD_FACTOR_IMPROVEMENT_RATIO: f64 = 1.1;

/// Peak-hour share (percent) above which the distribution is flagged.
pub const PEAK_SHARE_MAX_PCT: f64 = 40.0;
/// Base-hour share (percent) below which the distribution is flagged.
pub const BASE_SHARE_MIN_PCT: f64 = 30.0;

/// First-to-last consumption change (percent) considered significant.
pub const TREND_CONSUMPTION_PCT: f64 = 10.0;
/// First-to-last factor change (points) considered significant.
pub const TREND_FACTOR_POINTS: f64 = 3.0;
