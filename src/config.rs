//! Search inputs and tunable limits

use crate::error::{CalcError, Result};

/// Largest exponent searched when matching a float back to a ratio.
pub const MAX_EXPONENT: u32 = 10;

/// Numeric inputs of one search, as entered by the player.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    /// Total power the network has to provide.
    pub target: f64,
    /// Power already available without auxiliary batteries.
    pub base_power: f64,
    /// Fuel supplied on the main line per unit time.
    pub supply_rate: f64,
    /// Maximum splitter stages per battery branch.
    pub max_depth: u32,
}

impl SearchParams {
    pub fn new(target: f64, base_power: f64, supply_rate: f64, max_depth: u32) -> Self {
        Self {
            target,
            base_power,
            supply_rate,
            max_depth,
        }
    }

    /// Power the batteries have to cover.
    pub fn deficit(&self) -> f64 {
        self.target - self.base_power
    }

    /// Rejects inputs the search is not defined for. The search itself
    /// assumes this has been called.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("target", self.target),
            ("base power", self.base_power),
            ("supply rate", self.supply_rate),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CalcError::InvalidInput(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.supply_rate == 0.0 {
            return Err(CalcError::InvalidInput(
                "supply rate must be greater than zero".to_string(),
            ));
        }
        if self.max_depth > MAX_EXPONENT {
            return Err(CalcError::InvalidInput(format!(
                "max depth {} exceeds {}",
                self.max_depth, MAX_EXPONENT
            )));
        }
        Ok(())
    }
}

/// Search caps and ranking thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchLimits {
    /// Absolute cap on batteries per solution.
    pub max_batteries: usize,
    /// Batteries searched above the minimum count.
    pub extra_batteries: usize,
    /// Batteries allowed above what the fuel flow sustains at full duty.
    pub fuel_slack: usize,
    /// Shortfall tolerated when checking a solution covers the target.
    pub feasibility_tolerance: f64,
    /// Tolerance on total flow above 1.
    pub flow_tolerance: f64,
    /// Excess budget for the simple pick, as a fraction of the target.
    pub simple_excess_fraction: f64,
    /// Lower bound of the simple pick's excess budget.
    pub simple_excess_floor: f64,
    /// Excess difference that makes a pick count as a distinct alternative.
    pub balanced_excess_delta: f64,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            max_batteries: 8,
            extra_batteries: 3,
            fuel_slack: 2,
            feasibility_tolerance: 0.01,
            flow_tolerance: 1e-10,
            simple_excess_fraction: 0.05,
            simple_excess_floor: 100.0,
            balanced_excess_delta: 1.0,
        }
    }
}

impl SearchLimits {
    pub fn simple_excess_budget(&self, target: f64) -> f64 {
        (target * self.simple_excess_fraction).max(self.simple_excess_floor)
            + self.feasibility_tolerance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_accepts_normal_input() {
        assert!(SearchParams::new(1100.0, 0.0, 1.0, 5).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert!(SearchParams::new(-1.0, 0.0, 1.0, 5).validate().is_err());
        assert!(SearchParams::new(f64::NAN, 0.0, 1.0, 5).validate().is_err());
        assert!(SearchParams::new(100.0, 0.0, 0.0, 5).validate().is_err());
        assert!(SearchParams::new(100.0, 0.0, 1.0, 11).validate().is_err());
    }

    #[test]
    fn test_simple_budget_floor() {
        let limits = SearchLimits::default();
        assert!((limits.simple_excess_budget(1000.0) - 100.01).abs() < 1e-9);
        assert!((limits.simple_excess_budget(10_000.0) - 500.01).abs() < 1e-9);
    }
}
