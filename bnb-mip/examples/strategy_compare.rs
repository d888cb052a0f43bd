//! Compare branching and search strategies on a small multi-row knapsack.
//!
//! Run with: cargo run --release -p bnb-mip --example strategy_compare
//! Pass `--verbose` to print progress after every node (with RUST_LOG=info),
//! or set RUST_LOG=debug to follow the search node by node.

use bnb_mip::{solve_mip, BranchingRule, MipProblem, MipSettings, NodeSelection};

fn main() {
    env_logger::init();
    let verbose = std::env::args().any(|a| a == "--verbose");

    // max sum(c_j x_j) over two capacity rows, x binary
    let prob = MipProblem::new(
        vec![12.0, 10.0, 9.0, 8.0, 7.0, 7.0, 5.0, 4.0, 3.0, 2.0],
        vec![
            ("weight", vec![6.0, 5.0, 5.0, 4.0, 4.0, 3.0, 3.0, 2.0, 2.0, 1.0]),
            ("volume", vec![2.0, 4.0, 3.0, 5.0, 1.0, 4.0, 2.0, 3.0, 1.0, 2.0]),
        ],
        vec![17.0, 12.0],
    )
    .expect("valid model");

    let rules = [
        BranchingRule::FixedOrder,
        BranchingRule::MostFractional,
        BranchingRule::Pseudocost,
        BranchingRule::reliability(),
        BranchingRule::Hybrid,
    ];
    let selections = [
        NodeSelection::DepthFirst,
        NodeSelection::BestFirst,
        NodeSelection::BestEstimate,
    ];

    println!(
        "{:<36} {:<14} {:>8} {:>7} {:>6} {:>8}",
        "branching", "search", "obj", "nodes", "LPs", "time ms"
    );
    for rule in rules {
        for selection in selections {
            let base = if verbose {
                MipSettings::verbose()
            } else {
                MipSettings::default()
            };
            let settings = base
                .with_branching(rule)
                .with_node_selection(selection);
            match solve_mip(&prob, &settings) {
                Ok(sol) => println!(
                    "{:<36} {:<14} {:>8.1} {:>7} {:>6} {:>8}",
                    rule.to_string(),
                    selection.to_string(),
                    sol.obj_val,
                    sol.stats.nodes_created,
                    sol.stats.lp_solves,
                    sol.stats.solve_time_ms
                ),
                Err(e) => println!("{} / {}: {}", rule, selection, e),
            }
        }
    }
}
