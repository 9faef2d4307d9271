// src/planning/config.rs

/// Relative slack the invariant checks allow regardless of the configured tolerance.
pub const MIN_CHECK_TOLERANCE: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    /// Relative tolerance for "remaining ≈ 0" checks in the engine and for
    /// the capacity/demand invariant checks on the result.
    pub tolerance: f64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self { tolerance: 1e-9 }
    }
}

impl PlannerConfig {
    /// True when `remaining` is indistinguishable from zero relative to `initial`.
    pub fn is_exhausted(&self, remaining: f64, initial: f64) -> bool {
        remaining <= self.tolerance * initial
    }

    /// Upper bound accepted by the invariant checks for a ceiling of `limit`.
    /// Never tighter than [`MIN_CHECK_TOLERANCE`], so a zero tolerance still
    /// absorbs the rounding of `time * rate / rate`.
    pub fn ceiling(&self, limit: f64) -> f64 {
        limit + self.tolerance.max(MIN_CHECK_TOLERANCE) * limit.max(1.0)
    }
}
