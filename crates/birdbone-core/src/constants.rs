/// birdbone version string.
pub const BIRDBONE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Slack added before flooring `fraction * unit_count` so that fractions such as
/// `0.05 * 100` land on the intended integer despite binary rounding.
pub const FRACTION_EPSILON: f64 = 1e-9;

/// Environment variable prefix for config overrides.
pub const ENV_PREFIX: &str = "BIRDBONE_";

/// Project config file looked up in the working root.
pub const PROJECT_CONFIG_FILE: &str = "birdbone.toml";

/// Number of units covered by `fraction` of `total`, floored.
pub fn units_for_fraction(fraction: f64, total: usize) -> usize {
    if fraction <= 0.0 || total == 0 {
        return 0;
    }
    let raw = (fraction * total as f64 + FRACTION_EPSILON).floor();
    (raw as usize).min(total)
}
