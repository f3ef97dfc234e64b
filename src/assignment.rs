//! Battery type assignment for a fixed set of ratios

use tracing::warn;

use crate::models::{Assignment, BatteryType, Ratio, Solution};

/// Deepest ratio list the exhaustive assignment will walk.
const MAX_ASSIGNMENT_DEPTH: usize = 16;

/// Pick one battery type per ratio so the total power meets `target`
/// with the smallest excess.
///
/// Every combination of types is considered (types may repeat). Ties keep
/// the first combination found, walking types in the order given. Returns
/// `None` if no combination reaches `target - tolerance`.
pub fn best_assignment(
    ratios: &[Ratio],
    battery_types: &[BatteryType],
    target: f64,
    supply_rate: f64,
    tolerance: f64,
) -> Option<Solution> {
    if battery_types.is_empty() {
        return None;
    }
    if ratios.len() > MAX_ASSIGNMENT_DEPTH {
        warn!(
            "refusing to assign {} ratios (limit {})",
            ratios.len(),
            MAX_ASSIGNMENT_DEPTH
        );
        return None;
    }

    let power: Vec<Vec<f64>> = ratios
        .iter()
        .map(|&ratio| {
            battery_types
                .iter()
                .map(|b| b.power * b.duty_cycle(ratio, supply_rate))
                .collect()
        })
        .collect();

    // reach[i]: most power ratios i.. can still add
    let mut reach = vec![0.0; ratios.len() + 1];
    for i in (0..ratios.len()).rev() {
        let best = power[i].iter().copied().fold(0.0, f64::max);
        reach[i] = reach[i + 1] + best;
    }

    let mut walk = AssignmentWalk {
        power: &power,
        reach: &reach,
        floor: target - tolerance,
        target,
        choice: Vec::with_capacity(ratios.len()),
        best: None,
    };
    walk.visit(0, 0.0);

    let (_, choice) = walk.best?;
    let batteries = ratios
        .iter()
        .zip(choice)
        .map(|(&ratio, t)| Assignment::new(ratio, battery_types[t].clone(), supply_rate))
        .collect();

    Some(Solution::from_assignments(batteries, target))
}

struct AssignmentWalk<'a> {
    power: &'a [Vec<f64>],
    reach: &'a [f64],
    floor: f64,
    target: f64,
    choice: Vec<usize>,
    best: Option<(f64, Vec<usize>)>,
}

impl AssignmentWalk<'_> {
    fn visit(&mut self, index: usize, total: f64) {
        if index == self.power.len() {
            if total >= self.floor {
                let excess = total - self.target;
                if self.best.as_ref().is_none_or(|(e, _)| excess < *e) {
                    self.best = Some((excess, self.choice.clone()));
                }
            }
            return;
        }

        // Cannot reach the target any more
        if total + self.reach[index] < self.floor {
            return;
        }
        // Power only grows, so excess cannot beat the incumbent
        if let Some((e, _)) = &self.best {
            if total - self.target >= *e {
                return;
            }
        }

        for t in 0..self.power[index].len() {
            self.choice.push(t);
            self.visit(index + 1, total + self.power[index][t]);
            self.choice.pop();
        }
    }
}
