// Single source of truth for all default values.

// --- Scoring ---
pub const DEFAULT_MAX_CALIBRATION_BATCHES: usize = 8;

// --- Waves ---
pub const DEFAULT_PER_WAVE_CAP: f64 = 0.10;
pub const DEFAULT_INITIAL_WAVE_FRACTION: f64 = 0.05;
pub const DEFAULT_MIN_WAVE_FRACTION: f64 = 0.005;
pub const DEFAULT_TOTAL_BUDGET: f64 = 0.70;
pub const DEFAULT_STABILITY_WINDOW: usize = 3;
pub const DEFAULT_GROWTH_FACTOR: f64 = 1.5;
pub const DEFAULT_BACKOFF_FACTOR: f64 = 0.5;
pub const DEFAULT_MAX_CONSECUTIVE_ROLLBACKS: usize = 6;
pub const DEFAULT_MAX_CYCLES: u64 = 1_000;

// --- Healing ---
pub const DEFAULT_HEALING_STEP_BUDGET: usize = 50;
pub const DEFAULT_LEARNING_RATE: f64 = 1e-4;
pub const DEFAULT_CONVERGENCE_EPSILON: f64 = 1e-4;
pub const DEFAULT_CONVERGENCE_WINDOW: usize = 3;
pub const DEFAULT_RETAIN_DELTAS: bool = false;

// --- Guardrail ---
pub const DEFAULT_METRIC: &str = "perplexity";
pub const DEFAULT_ROLLBACK_TOLERANCE: f64 = 0.03;

// --- Engine ---
pub const DEFAULT_MAX_APPLY_RETRIES: usize = 2;

// --- Storage ---
pub const DEFAULT_DB_FILENAME: &str = "birdbone.db";
pub const DEFAULT_WAL_MODE: bool = true;
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5_000;

// --- Observability ---
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const DEFAULT_JSON_LOGS: bool = false;
