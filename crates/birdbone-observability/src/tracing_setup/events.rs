//! Structured log events for the compression loop.
//!
//! Each function emits a `tracing` event with an `event` field naming it.

/// Log the start of a cycle.
pub fn cycle_started(cycle: u64, active_units: usize, remaining_budget: f64) {
    tracing::debug!(
        event = "cycle_started",
        cycle = cycle,
        active_units = active_units,
        remaining_budget = remaining_budget,
        "cycle started"
    );
}

/// Log a fresh importance record and, when available, how far the
/// candidate set moved since the previous one.
pub fn record_produced(cycle: u64, mode: &str, units: usize, candidate_overlap: Option<f64>) {
    tracing::debug!(
        event = "record_produced",
        cycle = cycle,
        mode = %mode,
        units = units,
        candidate_overlap = ?candidate_overlap,
        "importance record produced"
    );
}

/// Log a proposed wave.
pub fn wave_proposed(cycle: u64, wave_id: &str, units: usize, target_fraction: f64) {
    tracing::debug!(
        event = "wave_proposed",
        cycle = cycle,
        wave_id = %wave_id,
        units = units,
        target_fraction = target_fraction,
        "wave proposed"
    );
}

/// Log an applied wave.
pub fn wave_applied(cycle: u64, wave_id: &str, units: usize) {
    tracing::debug!(
        event = "wave_applied",
        cycle = cycle,
        wave_id = %wave_id,
        units = units,
        "wave applied"
    );
}

/// Log a failed apply that will be retried with a fresh wave.
pub fn apply_retried(cycle: u64, attempt: usize, error: &str) {
    tracing::warn!(
        event = "apply_retried",
        cycle = cycle,
        attempt = attempt,
        error = %error,
        "wave apply failed, re-scoring"
    );
}

/// Log a committed wave.
pub fn wave_committed(cycle: u64, wave_id: &str, units: usize, baseline: f64) {
    tracing::info!(
        event = "wave_committed",
        cycle = cycle,
        wave_id = %wave_id,
        units = units,
        baseline = baseline,
        "wave committed"
    );
}

/// Log a rolled-back wave. Forced rollbacks come from failures rather
/// than the threshold check and log at `warn`.
pub fn wave_rolled_back(cycle: u64, wave_id: &str, reason: &str, forced: bool) {
    if forced {
        tracing::warn!(
            event = "wave_rolled_back",
            cycle = cycle,
            wave_id = %wave_id,
            reason = %reason,
            forced = true,
            "wave rolled back"
        );
    } else {
        tracing::info!(
            event = "wave_rolled_back",
            cycle = cycle,
            wave_id = %wave_id,
            reason = %reason,
            forced = false,
            "wave rolled back"
        );
    }
}

/// Log a pace change.
pub fn pacing_adjusted(cycle: u64, change: &str, old_fraction: f64, new_fraction: f64) {
    tracing::info!(
        event = "pacing_adjusted",
        cycle = cycle,
        change = %change,
        old_fraction = old_fraction,
        new_fraction = new_fraction,
        "pacing adjusted"
    );
}

/// Log the end of compression.
pub fn compression_terminated(cycle: u64, reason: &str, removed_fraction: f64) {
    tracing::info!(
        event = "compression_terminated",
        cycle = cycle,
        reason = %reason,
        removed_fraction = removed_fraction,
        "compression terminated"
    );
}
