//! Splitter network synthesis for a chosen solution
//!
//! The tree and its text trace are produced by the same recursion, so every
//! line of the trace corresponds to one node (or outlet) of the tree in the
//! same order.

use tracing::{debug, warn};

use crate::models::{Assignment, NetworkNode, Ratio, Solution, SplitterNetwork};

/// Bound on nested groups; real solutions stay far below it.
const MAX_GROUP_DEPTH: usize = 32;

/// Build the splitter topology realizing the solution's ratios.
pub fn construct_splitter_network(solution: &Solution) -> SplitterNetwork {
    let leaves: Vec<&Assignment> = solution.batteries.iter().collect();
    let mut builder = NetworkBuilder::default();

    builder.line(0, "", "Main supply line");
    let output = builder.build_tree(&leaves, Ratio::UNIT, 1, 0, "");
    let tree = NetworkNode::Main {
        output: Box::new(output),
    };

    debug!(
        "network for {} batteries: {} splitters, {} returns",
        solution.battery_count,
        tree.splitter_count(),
        tree.return_count()
    );

    SplitterNetwork {
        tree,
        description: builder.trace,
    }
}

#[derive(Default)]
struct NetworkBuilder {
    trace: String,
}

impl NetworkBuilder {
    fn line(&mut self, indent: usize, prefix: &str, text: &str) {
        self.trace.push_str(&"  ".repeat(indent));
        self.trace.push_str(prefix);
        self.trace.push_str(text);
        self.trace.push('\n');
    }

    fn return_leaf(&mut self, indent: usize, prefix: &str) -> NetworkNode {
        self.line(indent, prefix, "return to main line");
        NetworkNode::Return
    }

    /// Feed `leaves` from a node carrying `flow` of the main line.
    fn build_tree(
        &mut self,
        leaves: &[&Assignment],
        flow: Ratio,
        indent: usize,
        level: usize,
        prefix: &str,
    ) -> NetworkNode {
        if level > MAX_GROUP_DEPTH {
            warn!("splitter grouping nested beyond {} levels", MAX_GROUP_DEPTH);
            return self.return_leaf(indent, prefix);
        }

        match leaves.len() {
            0 => self.return_leaf(indent, prefix),
            1 => self.build_branch(leaves[0], flow, indent, prefix),
            2 | 3 => {
                let groups: Vec<&[&Assignment]> = leaves.chunks(1).collect();
                self.build_splitter(&groups, flow, indent, level, prefix)
            }
            n => {
                let size = n.div_ceil(3);
                let groups: Vec<&[&Assignment]> = leaves.chunks(size).collect();
                self.build_splitter(&groups, flow, indent, level, prefix)
            }
        }
    }

    /// One splitter with a group behind each outlet; spare outlets return.
    fn build_splitter(
        &mut self,
        groups: &[&[&Assignment]],
        flow: Ratio,
        indent: usize,
        level: usize,
        prefix: &str,
    ) -> NetworkNode {
        let outlets = choose_outlets(groups, flow);
        let share = flow.split(outlets);
        self.line(
            indent,
            prefix,
            &format!("{}-way splitter, {} per outlet", outlets, share),
        );

        let mut children = Vec::with_capacity(outlets as usize);
        for outlet in 0..outlets as usize {
            let label = format!("outlet {} -> ", outlet + 1);
            let child = match groups.get(outlet) {
                Some(group) => self.build_tree(group, share, indent + 1, level + 1, &label),
                None => self.return_leaf(indent + 1, &label),
            };
            children.push(child);
        }

        NetworkNode::Splitter { outlets, children }
    }

    /// Chain of single-purpose stages cutting `flow` down to the battery's
    /// ratio: thirds first, then halves.
    fn build_branch(
        &mut self,
        leaf: &Assignment,
        flow: Ratio,
        indent: usize,
        prefix: &str,
    ) -> NetworkNode {
        if !leaf.ratio.is_within(flow) {
            warn!(
                "{} cannot be cut from a {} branch; battery gets a smaller share",
                leaf.ratio, flow
            );
        }

        let residual = leaf.ratio.residual(flow);
        let stages: Vec<u8> = std::iter::repeat_n(3, residual.thirds as usize)
            .chain(std::iter::repeat_n(2, residual.halves as usize))
            .collect();

        self.build_stages(leaf, &stages, flow, indent, prefix)
    }

    fn build_stages(
        &mut self,
        leaf: &Assignment,
        stages: &[u8],
        flow: Ratio,
        indent: usize,
        prefix: &str,
    ) -> NetworkNode {
        let Some((&outlets, rest)) = stages.split_first() else {
            // grouping can leave a battery on a smaller share than its ratio
            let delivered = if flow == leaf.ratio {
                String::new()
            } else {
                format!("receives {}, ", flow)
            };
            self.line(
                indent,
                prefix,
                &format!(
                    "battery {} @ {} ({}{:.1}% duty, {:.1}W)",
                    leaf.battery.name,
                    leaf.ratio,
                    delivered,
                    leaf.duty_cycle * 100.0,
                    leaf.power
                ),
            );
            return NetworkNode::Battery {
                ratio: leaf.ratio,
                battery: leaf.battery.name.clone(),
            };
        };

        let share = flow.split(outlets);
        self.line(
            indent,
            prefix,
            &format!("{}-way splitter, {} per outlet", outlets, share),
        );

        let mut children = Vec::with_capacity(outlets as usize);
        children.push(self.build_stages(leaf, rest, share, indent + 1, "outlet 1 -> "));
        for outlet in 2..=outlets {
            children.push(self.return_leaf(indent + 1, &format!("outlet {} -> ", outlet)));
        }

        NetworkNode::Splitter { outlets, children }
    }
}

/// Three groups need a 3-way splitter. Two groups use halves unless only
/// thirds divide their ratios, leaving the third outlet to return.
fn choose_outlets(groups: &[&[&Assignment]], flow: Ratio) -> u8 {
    if groups.len() >= 3 {
        return 3;
    }
    let fits = |outlets: u8| {
        let share = flow.split(outlets);
        groups
            .iter()
            .flat_map(|g| g.iter())
            .all(|a| a.ratio.is_within(share))
    };
    if !fits(2) && fits(3) { 3 } else { 2 }
}
