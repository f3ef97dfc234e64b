//! Catalog of flow ratios reachable with 2- and 3-outlet splitters

use tracing::warn;

use crate::config::MAX_EXPONENT;
use crate::error::{CalcError, Result};
use crate::models::Ratio;

const MATCH_TOLERANCE: f64 = 1e-10;

/// Every ratio `2^-a * 3^-b` with `a + b <= max_depth`, largest first.
///
/// The unit ratio is always first. Distinct exponent pairs never collide,
/// so the result has no duplicate values.
pub fn generate_valid_ratios(max_depth: u32) -> Vec<Ratio> {
    let mut ratios = Vec::new();
    for halves in 0..=max_depth {
        for thirds in 0..=(max_depth - halves) {
            ratios.push(Ratio::new(halves, thirds));
        }
    }

    ratios.sort_by(|a, b| b.value().total_cmp(&a.value()));
    ratios
}

impl Ratio {
    /// Recover the exponents of a float ratio coming from outside the catalog.
    pub fn from_value(value: f64) -> Result<Ratio> {
        for halves in 0..=MAX_EXPONENT {
            for thirds in 0..=MAX_EXPONENT {
                let candidate = Ratio::new(halves, thirds);
                if (candidate.value() - value).abs() < MATCH_TOLERANCE {
                    return Ok(candidate);
                }
            }
        }
        Err(CalcError::UnrepresentableRatio { value })
    }
}

/// `"1/N"` for a representable ratio, otherwise the value with 6 decimals.
pub fn to_fraction(value: f64) -> String {
    match Ratio::from_value(value) {
        Ok(ratio) => ratio.fraction(),
        Err(e) => {
            warn!("{}; falling back to decimal", e);
            format!("{:.6}", value)
        }
    }
}

/// Splitter stages for a float ratio, infinite when it cannot be built.
pub fn get_depth(value: f64) -> f64 {
    match Ratio::from_value(value) {
        Ok(ratio) => ratio.depth() as f64,
        Err(e) => {
            warn!("{}; depth is unbounded", e);
            f64::INFINITY
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_depth_zero_is_unit_only() {
        assert_eq!(generate_valid_ratios(0), vec![Ratio::UNIT]);
    }

    #[test]
    fn test_catalog_size_and_order() {
        let ratios = generate_valid_ratios(2);
        // (0,0) (1,0) (0,1) (2,0) (1,1) (0,2)
        assert_eq!(ratios.len(), 6);
        let fractions: Vec<String> = ratios.iter().map(|r| r.fraction()).collect();
        assert_eq!(fractions, vec!["1/1", "1/2", "1/3", "1/4", "1/6", "1/9"]);
    }

    #[test]
    fn test_to_fraction_and_depth() {
        assert_eq!(to_fraction(1.0), "1/1");
        assert_eq!(to_fraction(1.0 / 12.0), "1/12");
        assert_eq!(get_depth(1.0 / 12.0), 3.0);
        assert_eq!(get_depth(1.0), 0.0);
    }

    #[test]
    fn test_unrepresentable_ratio_degrades() {
        assert_eq!(to_fraction(0.2), "0.200000");
        assert!(get_depth(0.2).is_infinite());
        assert_eq!(
            Ratio::from_value(0.2),
            Err(CalcError::UnrepresentableRatio { value: 0.2 })
        );
    }
}
