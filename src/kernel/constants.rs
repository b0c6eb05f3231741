//! Backtest-fixed constants. Must be reproduced bit-exactly: the fusion
//! pipeline's output is compared against a historical backtest that pins
//! these values.

use crate::models::SourceName;

/// Sources in the fixed order every weight array below assumes.
pub const SOURCES: [SourceName; 4] = SourceName::ALL;

/// Per-source softmax temperature, same order as `SOURCES`.
pub const BETAS: [f64; 4] = [0.052082, 0.072791, 0.006745, 0.070031];

/// Log-opinion-pool weights for the win branch, same order as `SOURCES`.
pub const WIN_WEIGHTS: [f64; 4] = [0.401, 0.035, 0.251, 0.313];

/// Log-opinion-pool weights for the place/wide/quinella/exacta branch.
pub const PLACE_WEIGHTS: [f64; 4] = [0.314, 0.214, 0.309, 0.164];

pub const WIN_EDGE_MIN: f64 = 0.03;
pub const WIN_EDGE_MAX: f64 = 0.05;
pub const WIN_EDGE_TILT_CENTER: f64 = 0.035;
pub const WIN_KELLY_FRACTION: f64 = 0.10;

pub const PLACE_TOP_N: usize = 4;
pub const PLACE_AGREE_MIN: u32 = 2;
pub const PLACE_MID_MIN: f64 = 3.0;
pub const PLACE_MID_MAX: f64 = 8.0;

pub const WIDE_TOP_N: usize = 5;
pub const WIDE_AGREE_MIN: u32 = 2;
pub const WIDE_ODDS_MIN: f64 = 10.0;

pub const QUINELLA_TOP_N: usize = 3;
pub const QUINELLA_AGREE_MIN: u32 = 3;
pub const QUINELLA_ODDS_MIN: f64 = 15.0;

pub const EXACTA_TOP_N: usize = 3;
pub const EXACTA_AGREE_MIN: u32 = 3;
/// Exacta reuses the quinella odds slice — same key, order-independent.
pub const EXACTA_ODDS_MIN: f64 = 15.0;

/// Minimum number of present sources for the pipeline to proceed at all.
/// Weights are renormalized against the present subset, but at least two
/// sources are required.
pub const MIN_SOURCES: usize = 2;

/// Top-N used by `agreement::compute_agree_counts` across the pipeline.
pub const AGREEMENT_TOP_N: usize = 4;
