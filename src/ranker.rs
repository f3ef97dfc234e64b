//! Picks up to three labeled solutions from the search candidates

use std::cmp::Ordering;

use tracing::info;

use crate::config::SearchLimits;
use crate::models::{RankedSolution, Solution, SolutionKind};

/// Choose the precision, simple and balanced picks from `candidates`.
///
/// `candidates` must be in discovery order; ties are resolved in favor of
/// earlier entries. The simple pick may repeat the precision pick when no
/// other candidate qualifies.
pub fn rank_solutions(
    candidates: &[Solution],
    target: f64,
    limits: &SearchLimits,
) -> Vec<RankedSolution> {
    let mut ranked = Vec::new();

    let Some(precision) = precision_pick(candidates) else {
        return ranked;
    };
    let simple = simple_pick(candidates, precision, target, limits);
    let balanced = balanced_pick(candidates, precision, simple, limits);

    ranked.push(labeled(SolutionKind::Precision, &candidates[precision]));
    if let Some(i) = simple {
        ranked.push(labeled(SolutionKind::Simple, &candidates[i]));
    }
    if let Some(i) = balanced {
        ranked.push(labeled(SolutionKind::Balanced, &candidates[i]));
    }

    info!(
        "{} candidates ranked into {} solutions",
        candidates.len(),
        ranked.len()
    );
    ranked
}

/// The single solution used when base power already covers the target.
pub fn base_solution(base_power: f64, target: f64) -> RankedSolution {
    labeled(SolutionKind::Base, &Solution::base(base_power, target))
}

fn precision_pick(candidates: &[Solution]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, s) in candidates.iter().enumerate() {
        if best.is_none_or(|b| s.excess < candidates[b].excess) {
            best = Some(i);
        }
    }
    best
}

fn by_simplicity(a: &Solution, b: &Solution) -> Ordering {
    a.complexity
        .cmp(&b.complexity)
        .then_with(|| a.excess.total_cmp(&b.excess))
}

fn simple_pick(
    candidates: &[Solution],
    precision: usize,
    target: f64,
    limits: &SearchLimits,
) -> Option<usize> {
    let budget = limits.simple_excess_budget(target);
    let mut pool: Vec<usize> = (0..candidates.len())
        .filter(|&i| candidates[i].excess <= budget)
        .collect();
    let qualified = !pool.is_empty();
    if !qualified {
        pool = (0..candidates.len()).collect();
    }
    // stable: equal keys keep discovery order
    pool.sort_by(|&a, &b| by_simplicity(&candidates[a], &candidates[b]));

    // the precision pick stays when nothing else qualifies
    let first = *pool.first()?;
    if first == precision && qualified && pool.len() > 1 {
        Some(pool[1])
    } else {
        Some(first)
    }
}

fn balanced_pick(
    candidates: &[Solution],
    precision: usize,
    simple: Option<usize>,
    limits: &SearchLimits,
) -> Option<usize> {
    let p = &candidates[precision];
    (0..candidates.len()).find(|&i| {
        if i == precision || Some(i) == simple {
            return false;
        }
        let s = &candidates[i];
        (s.excess - p.excess).abs() > limits.balanced_excess_delta
            || s.battery_count != p.battery_count
    })
}

fn labeled(kind: SolutionKind, solution: &Solution) -> RankedSolution {
    let (name, desc) = match kind {
        SolutionKind::Precision => (
            "Precision",
            "Smallest surplus over the power deficit.".to_string(),
        ),
        SolutionKind::Simple => (
            "Simple",
            "Fewest batteries and splitter stages within the excess budget.".to_string(),
        ),
        SolutionKind::Balanced => (
            "Balanced",
            "A materially different alternative to the precision pick.".to_string(),
        ),
        SolutionKind::Base => (
            "Base power",
            format!(
                "Base power already covers the target with {:.1}W to spare.",
                solution.excess
            ),
        ),
    };

    RankedSolution {
        kind,
        name: name.to_string(),
        desc,
        solution: solution.clone(),
    }
}
