//! Bounded search over ratio combinations

use tracing::{debug, trace, warn};

use crate::assignment::best_assignment;
use crate::config::{SearchLimits, SearchParams};
use crate::error::{CalcError, Result};
use crate::models::{BatteryType, RankedSolution, Ratio, Solution};
use crate::ranker;
use crate::ratio::generate_valid_ratios;

/// Inputs shared by every combination searched for one request.
#[derive(Debug, Clone, Copy)]
pub struct SearchContext<'a> {
    pub battery_types: &'a [BatteryType],
    /// Power the batteries must cover (the deficit).
    pub target: f64,
    pub supply_rate: f64,
    pub limits: &'a SearchLimits,
}

/// Search the configured battery counts and rank what was found.
pub fn search_optimal_combination(
    params: &SearchParams,
    battery_types: &[BatteryType],
) -> Result<Vec<RankedSolution>> {
    search_with_limits(params, battery_types, &SearchLimits::default())
}

pub fn search_with_limits(
    params: &SearchParams,
    battery_types: &[BatteryType],
    limits: &SearchLimits,
) -> Result<Vec<RankedSolution>> {
    let deficit = params.deficit();
    if deficit <= 0.0 {
        debug!(
            "base power {:.1}W covers target {:.1}W",
            params.base_power, params.target
        );
        return Ok(vec![ranker::base_solution(params.base_power, params.target)]);
    }

    let (min_batteries, max_batteries) =
        battery_count_range(deficit, battery_types, params.supply_rate, limits);
    let catalog = generate_valid_ratios(params.max_depth);
    let usable = usable_ratios(&catalog, battery_types, params.supply_rate, limits);
    debug!(
        "deficit {:.1}W, {} of {} ratios usable, searching {}..={} batteries",
        deficit,
        usable.len(),
        catalog.len(),
        min_batteries,
        max_batteries
    );

    let ctx = SearchContext {
        battery_types,
        target: deficit,
        supply_rate: params.supply_rate,
        limits,
    };

    let mut candidates = Vec::new();
    for n in min_batteries..=max_batteries {
        let found = search_for_count(n, &usable, &ctx);
        debug!("{} batteries: {} candidates", n, found.len());
        candidates.extend(found);
    }

    if candidates.is_empty() {
        return Err(CalcError::NoFeasibleSolution {
            target: deficit,
            min_batteries,
            max_batteries,
        });
    }

    Ok(ranker::rank_solutions(&candidates, deficit, limits))
}

/// Battery counts worth searching: from the fewest that could cover the
/// deficit to what the fuel flow can sustain, capped absolutely.
///
/// Returns an empty range (`min > max`) when nothing can be searched.
pub fn battery_count_range(
    deficit: f64,
    battery_types: &[BatteryType],
    supply_rate: f64,
    limits: &SearchLimits,
) -> (usize, usize) {
    if battery_types.is_empty() {
        return (1, 0);
    }

    let max_power = battery_types.iter().map(|b| b.power).fold(0.0, f64::max);
    let min_consume = battery_types
        .iter()
        .map(|b| b.consume_rate)
        .fold(f64::INFINITY, f64::min);

    if max_power <= 0.0 {
        return (1, 0);
    }

    let min_batteries = ((deficit / max_power).ceil() as usize).max(1);
    // float casts saturate, so the additions must too
    let sustainable =
        ((supply_rate / min_consume).floor() as usize).saturating_add(limits.fuel_slack);
    let max_batteries = min_batteries
        .saturating_add(limits.extra_batteries)
        .min(sustainable)
        .min(limits.max_batteries);

    (min_batteries, max_batteries)
}

/// Ratios no larger than the biggest share any battery type can burn at
/// full duty. Larger shares only waste fuel on a capped battery.
pub fn usable_ratios(
    catalog: &[Ratio],
    battery_types: &[BatteryType],
    supply_rate: f64,
    limits: &SearchLimits,
) -> Vec<Ratio> {
    let threshold = battery_types
        .iter()
        .map(|b| b.full_load_ratio(supply_rate))
        .fold(0.0, f64::max);

    catalog
        .iter()
        .copied()
        .filter(|r| r.value() <= threshold + limits.flow_tolerance)
        .collect()
}

/// All feasible solutions using exactly `n` batteries, in discovery order.
///
/// Ratios are chosen as multisets (indices never decrease) whose total flow
/// stays within the supply line.
pub fn search_for_count(n: usize, usable: &[Ratio], ctx: &SearchContext<'_>) -> Vec<Solution> {
    let mut found = Vec::new();
    if n == 0 || usable.is_empty() {
        return found;
    }
    if n > ctx.limits.max_batteries {
        warn!(
            "battery count {} exceeds limit {}",
            n, ctx.limits.max_batteries
        );
        return found;
    }

    let mut picked = Vec::with_capacity(n);
    extend_combination(n, usable, 0, 0.0, &mut picked, ctx, &mut found);
    found
}

fn extend_combination(
    n: usize,
    usable: &[Ratio],
    start: usize,
    flow: f64,
    picked: &mut Vec<Ratio>,
    ctx: &SearchContext<'_>,
    found: &mut Vec<Solution>,
) {
    if picked.len() == n {
        if let Some(solution) = best_assignment(
            picked,
            ctx.battery_types,
            ctx.target,
            ctx.supply_rate,
            ctx.limits.feasibility_tolerance,
        ) {
            trace!("candidate: {}", solution.summary_line());
            found.push(solution);
        }
        return;
    }

    for (i, ratio) in usable.iter().enumerate().skip(start) {
        let next = flow + ratio.value();
        if next > 1.0 + ctx.limits.flow_tolerance {
            continue;
        }
        picked.push(*ratio);
        extend_combination(n, usable, i, next, picked, ctx, found);
        picked.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator() -> Vec<BatteryType> {
        vec![BatteryType::new("Generator", 1100.0, 0.025)]
    }

    #[test]
    fn test_count_range() {
        let limits = SearchLimits::default();
        assert_eq!(battery_count_range(1100.0, &generator(), 0.025, &limits), (1, 3));
        assert_eq!(battery_count_range(2000.0, &generator(), 1.0, &limits), (2, 5));
        assert_eq!(battery_count_range(20_000.0, &generator(), 1.0, &limits), (19, 8));
        assert_eq!(battery_count_range(100.0, &[], 1.0, &limits), (1, 0));
    }

    #[test]
    fn test_count_range_extreme_rates_saturate() {
        let limits = SearchLimits::default();
        let frugal = vec![BatteryType::new("Frugal", 100.0, 1e-30)];
        assert_eq!(battery_count_range(100.0, &frugal, 1.0, &limits), (1, 4));
        assert_eq!(battery_count_range(100.0, &generator(), 1e300, &limits), (1, 4));

        let feeble = vec![BatteryType::new("Feeble", 1e-300, 0.025)];
        let (min, max) = battery_count_range(1e10, &feeble, 1.0, &limits);
        assert_eq!(min, usize::MAX);
        assert_eq!(max, 8);

        let params = SearchParams::new(100.0, 0.0, 1.0, 5);
        assert!(matches!(
            search_optimal_combination(&params, &frugal),
            Err(CalcError::NoFeasibleSolution { .. })
        ));
    }

    #[test]
    fn test_usable_ratios_threshold() {
        let limits = SearchLimits::default();
        let catalog = generate_valid_ratios(3);
        // full load at a quarter of the line
        let usable = usable_ratios(&catalog, &generator(), 0.1, &limits);
        assert!(usable.iter().all(|r| r.value() <= 0.25 + 1e-10));
        assert!(usable.contains(&Ratio::new(2, 0)));
        assert!(!usable.contains(&Ratio::new(0, 1)));
    }

    #[test]
    fn test_no_usable_ratios_is_empty_not_error() {
        let limits = SearchLimits::default();
        let ctx = SearchContext {
            battery_types: &generator(),
            target: 500.0,
            supply_rate: 1.0,
            limits: &limits,
        };
        assert!(search_for_count(2, &[], &ctx).is_empty());
    }

    #[test]
    fn test_flow_never_exceeds_supply() {
        let limits = SearchLimits::default();
        let types = vec![BatteryType::new("Gen", 100.0, 0.5)];
        let ctx = SearchContext {
            battery_types: &types,
            target: 150.0,
            supply_rate: 1.0,
            limits: &limits,
        };
        let catalog = generate_valid_ratios(3);
        let found = search_for_count(3, &catalog, &ctx);
        assert!(!found.is_empty());
        for s in &found {
            assert_eq!(s.battery_count, 3);
            assert!(s.total_ratio <= 1.0 + 1e-9);
            assert!(s.total_power >= 150.0 - 0.01);
        }
    }

    #[test]
    fn test_base_power_short_circuits() {
        let params = SearchParams::new(100.0, 200.0, 1.0, 5);
        let ranked = search_optimal_combination(&params, &generator()).unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].solution.battery_count, 0);
        assert!((ranked[0].solution.excess - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_unreachable_target_fails() {
        let params = SearchParams::new(100_000.0, 0.0, 1.0, 3);
        let err = search_optimal_combination(&params, &generator()).unwrap_err();
        assert!(matches!(err, CalcError::NoFeasibleSolution { .. }));
    }
}
