//! Data models for batteries, flow ratios, solutions and splitter networks

use std::fmt;

/// A flow fraction reachable with splitters: `(1/2)^halves * (1/3)^thirds`.
///
/// Kept as exponents so that no tolerance matching is needed once a ratio
/// has been produced by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ratio {
    pub halves: u32,
    pub thirds: u32,
}

impl Ratio {
    /// The whole supply line, no splitting needed.
    pub const UNIT: Ratio = Ratio {
        halves: 0,
        thirds: 0,
    };

    pub fn new(halves: u32, thirds: u32) -> Self {
        Self { halves, thirds }
    }

    pub fn value(&self) -> f64 {
        0.5f64.powi(self.halves as i32) * (1.0f64 / 3.0).powi(self.thirds as i32)
    }

    /// Number of splitter stages needed to produce this ratio from a full line.
    pub fn depth(&self) -> u32 {
        self.halves + self.thirds
    }

    /// `2^halves * 3^thirds`, saturating for absurd exponents.
    pub fn denominator(&self) -> u64 {
        2u64.saturating_pow(self.halves)
            .saturating_mul(3u64.saturating_pow(self.thirds))
    }

    pub fn fraction(&self) -> String {
        format!("1/{}", self.denominator())
    }

    /// True if this ratio can be cut out of `flow` using further splitters.
    pub fn is_within(&self, flow: Ratio) -> bool {
        self.halves >= flow.halves && self.thirds >= flow.thirds
    }

    /// Stages still missing between `flow` and this ratio.
    pub fn residual(&self, flow: Ratio) -> Ratio {
        Ratio {
            halves: self.halves.saturating_sub(flow.halves),
            thirds: self.thirds.saturating_sub(flow.thirds),
        }
    }

    /// The flow on one outlet of a splitter with `outlets` outlets fed by `self`.
    pub fn split(&self, outlets: u8) -> Ratio {
        match outlets {
            3 => Ratio::new(self.halves, self.thirds + 1),
            _ => Ratio::new(self.halves + 1, self.thirds),
        }
    }
}

impl fmt::Display for Ratio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.fraction())
    }
}

/// A generator/battery the player can build.
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryType {
    pub name: String,
    pub power: f64,
    /// Fraction of one supply unit consumed per unit time at full duty.
    pub consume_rate: f64,
}

impl BatteryType {
    pub fn new(name: impl Into<String>, power: f64, consume_rate: f64) -> Self {
        Self {
            name: name.into(),
            power,
            consume_rate,
        }
    }

    pub fn from_duration(name: impl Into<String>, power: f64, duration: f64) -> Self {
        Self::new(name, power, 1.0 / duration)
    }

    /// How long one supply unit lasts at full duty.
    pub fn duration(&self) -> f64 {
        1.0 / self.consume_rate
    }

    /// Ratio of the supply line at which this battery runs at 100% duty.
    pub fn full_load_ratio(&self, supply_rate: f64) -> f64 {
        self.consume_rate / supply_rate
    }

    pub fn duty_cycle(&self, ratio: Ratio, supply_rate: f64) -> f64 {
        (supply_rate * ratio.value() / self.consume_rate).min(1.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub ratio: Ratio,
    pub battery: BatteryType,
    pub duty_cycle: f64,
    pub power: f64,
}

impl Assignment {
    pub fn new(ratio: Ratio, battery: BatteryType, supply_rate: f64) -> Self {
        let duty_cycle = battery.duty_cycle(ratio, supply_rate);
        let power = battery.power * duty_cycle;
        Self {
            ratio,
            battery,
            duty_cycle,
            power,
        }
    }
}

/// A candidate battery set covering a power deficit.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub battery_count: usize,
    pub batteries: Vec<Assignment>,
    pub total_power: f64,
    /// `total_power - target`
    pub excess: f64,
    pub total_ratio: f64,
    pub complexity: u32,
}

impl Solution {
    pub fn from_assignments(batteries: Vec<Assignment>, target: f64) -> Self {
        let total_power: f64 = batteries.iter().map(|a| a.power).sum();
        let total_ratio: f64 = batteries.iter().map(|a| a.ratio.value()).sum();
        let depth: u32 = batteries.iter().map(|a| a.ratio.depth()).sum();
        let battery_count = batteries.len();

        Self {
            battery_count,
            batteries,
            total_power,
            excess: total_power - target,
            total_ratio,
            complexity: battery_count as u32 * 10 + depth,
        }
    }

    /// Zero-battery solution used when base power already covers the target.
    pub fn base(base_power: f64, target: f64) -> Self {
        Self {
            battery_count: 0,
            batteries: Vec::new(),
            total_power: base_power,
            excess: base_power - target,
            total_ratio: 0.0,
            complexity: 0,
        }
    }

    pub fn summary_line(&self) -> String {
        let ratios: Vec<String> = self
            .batteries
            .iter()
            .map(|a| format!("{} {}", a.battery.name, a.ratio))
            .collect();
        format!(
            "{} batteries, {:.1}W (+{:.1}W), flow {:.4} [{}]",
            self.battery_count,
            self.total_power,
            self.excess,
            self.total_ratio,
            ratios.join(", ")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionKind {
    Precision,
    Simple,
    Balanced,
    Base,
}

impl SolutionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolutionKind::Precision => "precision",
            SolutionKind::Simple => "simple",
            SolutionKind::Balanced => "balanced",
            SolutionKind::Base => "base",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedSolution {
    pub kind: SolutionKind,
    pub name: String,
    pub desc: String,
    pub solution: Solution,
}

impl fmt::Display for RankedSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.solution;
        writeln!(f, "=== {} ({}) ===", self.name, self.kind.as_str())?;
        writeln!(f, "{}", self.desc)?;
        writeln!(f)?;

        if s.batteries.is_empty() {
            writeln!(f, "No batteries required")?;
        } else {
            writeln!(
                f,
                "{:<24} {:>8} {:>6} {:>8} {:>10}",
                "Battery", "Ratio", "Depth", "Duty", "Power (W)"
            )?;
            writeln!(f, "{}", "-".repeat(60))?;
            for a in &s.batteries {
                writeln!(
                    f,
                    "{:<24} {:>8} {:>6} {:>7.1}% {:>10.1}",
                    a.battery.name,
                    a.ratio.fraction(),
                    a.ratio.depth(),
                    a.duty_cycle * 100.0,
                    a.power
                )?;
            }
        }
        writeln!(f)?;

        writeln!(f, "Total power: {:.1}W", s.total_power)?;
        writeln!(f, "Excess:      {:.1}W", s.excess)?;
        writeln!(f, "Flow used:   {:.2}%", s.total_ratio * 100.0)?;
        writeln!(f, "Complexity:  {}", s.complexity)?;

        Ok(())
    }
}

/// Physical splitter topology fed from the main supply line.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkNode {
    Main {
        output: Box<NetworkNode>,
    },
    /// `children.len() == outlets as usize`, in physical outlet order.
    Splitter {
        outlets: u8,
        children: Vec<NetworkNode>,
    },
    Battery {
        ratio: Ratio,
        battery: String,
    },
    /// Unused outlet, flow goes back to the main line.
    Return,
}

impl NetworkNode {
    /// Battery leaves in outlet order.
    pub fn batteries(&self) -> Vec<(&Ratio, &str)> {
        let mut out = Vec::new();
        self.collect_batteries(&mut out);
        out
    }

    fn collect_batteries<'a>(&'a self, out: &mut Vec<(&'a Ratio, &'a str)>) {
        match self {
            NetworkNode::Main { output } => output.collect_batteries(out),
            NetworkNode::Splitter { children, .. } => {
                for child in children {
                    child.collect_batteries(out);
                }
            }
            NetworkNode::Battery { ratio, battery } => out.push((ratio, battery.as_str())),
            NetworkNode::Return => {}
        }
    }

    pub fn splitter_count(&self) -> usize {
        match self {
            NetworkNode::Main { output } => output.splitter_count(),
            NetworkNode::Splitter { children, .. } => {
                1 + children.iter().map(|c| c.splitter_count()).sum::<usize>()
            }
            NetworkNode::Battery { .. } | NetworkNode::Return => 0,
        }
    }

    pub fn return_count(&self) -> usize {
        match self {
            NetworkNode::Main { output } => output.return_count(),
            NetworkNode::Splitter { children, .. } => {
                children.iter().map(|c| c.return_count()).sum()
            }
            NetworkNode::Battery { .. } => 0,
            NetworkNode::Return => 1,
        }
    }
}

/// A synthesized network together with its human-readable build trace.
#[derive(Debug, Clone, PartialEq)]
pub struct SplitterNetwork {
    pub tree: NetworkNode,
    pub description: String,
}

impl fmt::Display for SplitterNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)
    }
}
