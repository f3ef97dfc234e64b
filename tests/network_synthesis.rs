//! Splitter networks built from real search results.

use splitter_calculator::{
    BatteryType, NetworkNode, SearchParams, construct_splitter_network,
    search_optimal_combination,
};

fn assert_outlets_exact(node: &NetworkNode) {
    match node {
        NetworkNode::Main { output } => assert_outlets_exact(output),
        NetworkNode::Splitter { outlets, children } => {
            assert!(*outlets == 2 || *outlets == 3, "bad outlet count {}", outlets);
            assert_eq!(children.len(), *outlets as usize);
            children.iter().for_each(assert_outlets_exact);
        }
        NetworkNode::Battery { .. } | NetworkNode::Return => {}
    }
}

#[test]
fn networks_match_their_solutions() {
    let types = vec![
        BatteryType::from_duration("Fuel Generator", 1100.0, 40.0),
        BatteryType::from_duration("Biomass Burner", 300.0, 10.0),
    ];
    let params = SearchParams::new(2000.0, 0.0, 0.1, 3);
    let ranked = search_optimal_combination(&params, &types).unwrap();

    for r in &ranked {
        let net = construct_splitter_network(&r.solution);
        assert_outlets_exact(&net.tree);

        let mut tree_fractions: Vec<String> = net
            .tree
            .batteries()
            .iter()
            .map(|(ratio, _)| ratio.fraction())
            .collect();
        let mut solution_fractions: Vec<String> = r
            .solution
            .batteries
            .iter()
            .map(|a| a.ratio.fraction())
            .collect();
        tree_fractions.sort();
        solution_fractions.sort();
        assert_eq!(tree_fractions, solution_fractions);

        let trace_returns = net
            .description
            .lines()
            .filter(|l| l.ends_with("return to main line"))
            .count();
        assert_eq!(trace_returns, net.tree.return_count());
    }
}

#[test]
fn quarter_and_half_share_a_splitter() {
    let types = vec![BatteryType::new("Fuel Generator", 1100.0, 0.025)];
    // 825W from a 0.025 line: one battery on 1/2, one on 1/4
    let params = SearchParams::new(825.0, 0.0, 0.025, 2);
    let ranked = search_optimal_combination(&params, &types).unwrap();
    let exact = ranked
        .iter()
        .find(|r| r.solution.battery_count == 2 && r.solution.excess.abs() < 1e-9)
        .expect("two battery exact solution");

    let net = construct_splitter_network(&exact.solution);
    let expected = "\
Main supply line
  2-way splitter, 1/2 per outlet
    outlet 1 -> battery Fuel Generator @ 1/2 (50.0% duty, 550.0W)
    outlet 2 -> 2-way splitter, 1/4 per outlet
      outlet 1 -> battery Fuel Generator @ 1/4 (25.0% duty, 275.0W)
      outlet 2 -> return to main line
";
    assert_eq!(net.description, expected);
    assert_eq!(net.tree.splitter_count(), 2);
}
