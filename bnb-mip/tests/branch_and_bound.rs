//! Integration tests for the branch-and-bound search.

use bnb_mip::search::{NodeStatus, TreeEvent};
use bnb_mip::{
    solve_mip, solve_mip_with, BranchAndBound, BranchingRule, MipError, MipProblem, MipSettings,
    MipStatus, NodeSelection, NoopObserver, SimplexMasterBackend, VarType,
};

fn all_rules() -> Vec<BranchingRule> {
    vec![
        BranchingRule::FixedOrder,
        BranchingRule::MostFractional,
        BranchingRule::Pseudocost,
        BranchingRule::reliability(),
        BranchingRule::Hybrid,
    ]
}

fn all_selections() -> Vec<NodeSelection> {
    vec![
        NodeSelection::DepthFirst,
        NodeSelection::BestFirst,
        NodeSelection::BestEstimate,
    ]
}

/// max 3x0 + 2x1 s.t. 2x0 + x1 <= 4, x0 + 2x1 <= 4, x binary
fn two_var_scenario() -> MipProblem {
    MipProblem::new(
        vec![3.0, 2.0],
        vec![("c0", vec![2.0, 1.0]), ("c1", vec![1.0, 2.0])],
        vec![4.0, 4.0],
    )
    .unwrap()
}

/// Knapsack whose LP relaxation is fractional, so every rule has to branch.
///
/// max 8x0 + 11x1 + 6x2 + 4x3 s.t. 5x0 + 7x1 + 4x2 + 3x3 <= 14, x binary
/// Optimum: x = (0, 1, 1, 1), objective 21.
fn knapsack() -> MipProblem {
    MipProblem::from_dense(
        vec![8.0, 11.0, 6.0, 4.0],
        &[vec![5.0, 7.0, 4.0, 3.0]],
        vec![14.0],
    )
    .unwrap()
}

fn settings(rule: BranchingRule, selection: NodeSelection) -> MipSettings {
    MipSettings::default()
        .with_branching(rule)
        .with_node_selection(selection)
}

#[test]
fn test_scenario_every_strategy() {
    let prob = two_var_scenario();
    for rule in all_rules() {
        for selection in all_selections() {
            let sol = solve_mip(&prob, &settings(rule, selection)).unwrap();
            assert_eq!(sol.status, MipStatus::Optimal, "{} / {}", rule, selection);
            assert!((sol.obj_val - 5.0).abs() < 1e-6);
            assert_eq!(sol.x, vec![1.0, 1.0]);
            assert!(sol.stats.nodes_created >= 1);
        }
    }
}

#[test]
fn test_knapsack_every_strategy() {
    let prob = knapsack();
    for rule in all_rules() {
        for selection in all_selections() {
            let sol = solve_mip(&prob, &settings(rule, selection)).unwrap();
            assert_eq!(sol.status, MipStatus::Optimal, "{} / {}", rule, selection);
            assert!((sol.obj_val - 21.0).abs() < 1e-6, "{} / {}", rule, selection);
            assert_eq!(sol.x, vec![0.0, 1.0, 1.0, 1.0]);
            assert!(sol.stats.nodes_created > 1);
            assert!(sol.stats.lp_solves >= sol.stats.nodes_processed);
        }
    }
}

#[test]
fn test_infeasible_model() {
    // x0 >= 2 written as -x0 <= -2, with x0 binary
    let prob = MipProblem::from_dense(vec![1.0], &[vec![-1.0]], vec![-2.0]).unwrap();
    let sol = solve_mip(&prob, &MipSettings::default()).unwrap();

    assert_eq!(sol.status, MipStatus::Infeasible);
    assert_eq!(sol.obj_val, f64::NEG_INFINITY);
    assert!(sol.x.is_empty());
    assert!(!sol.has_solution());
    assert_eq!(sol.stats.nodes_created, 1);
    assert_eq!(sol.stats.nodes_processed, 1);
}

#[test]
fn test_no_integer_variables() {
    let prob = MipProblem::from_dense(vec![1.0, 1.0], &[vec![2.0, 2.0]], vec![3.0])
        .unwrap()
        .with_var_types(vec![VarType::Continuous, VarType::Continuous])
        .unwrap();

    let mut events: Vec<TreeEvent> = Vec::new();
    let settings = MipSettings::default().general_integer();
    let sol = solve_mip_with(&prob, &settings, SimplexMasterBackend::default(), &mut events).unwrap();

    assert_eq!(sol.status, MipStatus::Optimal);
    assert!((sol.obj_val - 1.5).abs() < 1e-6);
    assert_eq!(sol.stats.nodes_created, 1);
    assert_eq!(sol.stats.lp_solves, 1);
    assert!(events.iter().any(|e| matches!(
        e,
        TreeEvent::NodeUpdated {
            id: 0,
            status: NodeStatus::Integer,
            ..
        }
    )));
}

#[test]
fn test_general_integer_domain() {
    // max 5x0 + 4x1 s.t. 6x0 + 4x1 <= 24, x0 + 2x1 <= 6, x integer >= 0
    // LP optimum (3, 1.5) = 21, integer optimum (4, 0) = 20
    let prob = MipProblem::from_dense(
        vec![5.0, 4.0],
        &[vec![6.0, 4.0], vec![1.0, 2.0]],
        vec![24.0, 6.0],
    )
    .unwrap();

    for rule in all_rules() {
        let settings = settings(rule, NodeSelection::BestFirst).general_integer();
        let sol = solve_mip(&prob, &settings).unwrap();
        assert_eq!(sol.status, MipStatus::Optimal, "{}", rule);
        assert!((sol.obj_val - 20.0).abs() < 1e-6, "{}", rule);
        assert!(prob.is_feasible(&sol.x, 1e-6));
    }
}

#[test]
fn test_determinism() {
    let prob = knapsack();
    for rule in all_rules() {
        let settings = settings(rule, NodeSelection::BestEstimate);
        let mut first: Vec<TreeEvent> = Vec::new();
        let mut second: Vec<TreeEvent> = Vec::new();
        let a = solve_mip_with(&prob, &settings, SimplexMasterBackend::default(), &mut first)
            .unwrap();
        let b = solve_mip_with(&prob, &settings, SimplexMasterBackend::default(), &mut second)
            .unwrap();

        assert_eq!(a.stats.nodes_created, b.stats.nodes_created);
        assert_eq!(a.stats.lp_solves, b.stats.lp_solves);
        assert_eq!(a.x, b.x);
        assert_eq!(a.obj_val, b.obj_val);
        assert_eq!(first, second);
    }
}

#[test]
fn test_incumbent_monotone_and_pruning_sound() {
    let prob = knapsack();
    for rule in all_rules() {
        for selection in all_selections() {
            let mut events: Vec<TreeEvent> = Vec::new();
            solve_mip_with(
                &prob,
                &settings(rule, selection),
                SimplexMasterBackend::default(),
                &mut events,
            )
            .unwrap();

            let mut lb = f64::NEG_INFINITY;
            for event in &events {
                match *event {
                    TreeEvent::IncumbentUpdated { objective, .. } => {
                        assert!(objective > lb);
                        lb = objective;
                    }
                    TreeEvent::NodeUpdated {
                        status: NodeStatus::Candidate,
                        bound,
                        ..
                    } => {
                        // Only nodes that can still beat the incumbent branch
                        assert!(bound > lb, "{} / {}", rule, selection);
                    }
                    _ => {}
                }
            }
            assert!((lb - 21.0).abs() < 1e-6);
        }
    }
}

#[test]
fn test_children_follow_parents() {
    let prob = knapsack();
    let mut events: Vec<TreeEvent> = Vec::new();
    solve_mip_with(
        &prob,
        &MipSettings::default(),
        SimplexMasterBackend::default(),
        &mut events,
    )
    .unwrap();

    let mut next_id = 0;
    for event in &events {
        if let TreeEvent::NodeCreated { id, parent, branch, .. } = event {
            assert_eq!(*id, next_id);
            next_id += 1;
            assert_eq!(parent.is_none(), branch.is_none());
            if let Some(p) = parent {
                assert!(p < id);
            }
        }
    }
}

#[test]
fn test_unbranched_pseudocosts_keep_seed() {
    // x3 uses no capacity, so it sits at its upper bound in every relaxation
    let prob = MipProblem::from_dense(
        vec![8.0, 11.0, 6.0, 1.0],
        &[vec![5.0, 7.0, 4.0, 0.0]],
        vec![14.0],
    )
    .unwrap();
    let settings = MipSettings::default().with_branching(BranchingRule::Pseudocost);
    let mut events: Vec<TreeEvent> = Vec::new();
    let mut bb = BranchAndBound::new(&prob, settings, SimplexMasterBackend::default(), &mut events);
    let sol = bb.solve().unwrap();
    assert!((sol.obj_val - 20.0).abs() < 1e-6);

    let branched: Vec<usize> = bb
        .state()
        .arena
        .iter()
        .filter_map(|n| n.branch.map(|b| b.var))
        .collect();
    assert!(!branched.contains(&3));

    let pc = &bb.state().pseudocosts;
    assert_eq!(pc.down(3).estimate, 1.0);
    assert_eq!(pc.down(3).count, 0);
    assert_eq!(pc.up(3).estimate, 1.0);
    assert_eq!(pc.up(3).count, 0);
}

#[test]
fn test_complete_enumeration() {
    let prob = knapsack();
    let pruned = solve_mip(&prob, &MipSettings::default()).unwrap();
    let settings = MipSettings::default().complete_enumeration();
    let full = solve_mip(&prob, &settings).unwrap();

    assert_eq!(full.status, MipStatus::Optimal);
    assert!((full.obj_val - 21.0).abs() < 1e-6);
    assert_eq!(full.stats.nodes_pruned, 0);
    assert!(full.stats.nodes_created >= pruned.stats.nodes_created);
}

#[test]
fn test_node_limit_reports_bound() {
    let prob = knapsack();
    let settings = MipSettings::default().with_max_nodes(1);
    let sol = solve_mip_with(&prob, &settings, SimplexMasterBackend::default(), NoopObserver)
        .unwrap();

    assert_eq!(sol.status, MipStatus::NodeLimit);
    assert_eq!(sol.stats.nodes_processed, 1);
    assert_eq!(sol.stats.nodes_created, 3);
    assert!(sol.bound >= 21.0);
}

#[test]
fn test_reliability_statistics() {
    let prob = knapsack();
    let settings = MipSettings::default().with_branching(BranchingRule::reliability());
    let sol = solve_mip(&prob, &settings).unwrap();

    let stats = &sol.stats;
    assert!(stats.full_resolves + stats.partial_resolves > 0);
    assert_eq!(
        stats.bound_lp_solves(),
        stats.lp_solves - stats.full_resolves
    );
    assert!(stats.bound_lp_solves() >= stats.nodes_processed);
}

#[test]
fn test_invalid_settings_rejected_before_search() {
    let prob = two_var_scenario();
    let settings = MipSettings {
        int_feas_tol: 0.0,
        ..MipSettings::default()
    };
    let mut events: Vec<TreeEvent> = Vec::new();
    let err = solve_mip_with(&prob, &settings, SimplexMasterBackend::default(), &mut events)
        .unwrap_err();
    assert!(matches!(err, MipError::InvalidConfig(_)));
    assert!(events.is_empty());
}

#[test]
fn test_settings_from_json() {
    let json = r#"{
        "branching_rule": "pseudocost",
        "node_selection": "best_estimate",
        "complete_enumeration": false,
        "max_nodes": 500
    }"#;
    let settings: MipSettings = serde_json::from_str(json).unwrap();
    assert_eq!(settings.branching_rule, BranchingRule::Pseudocost);
    assert_eq!(settings.node_selection, NodeSelection::BestEstimate);
    assert_eq!(settings.max_nodes, 500);
    assert_eq!(settings.int_feas_tol, 1e-3);

    let json = r#"{ "branching_rule": { "reliability": {
        "reliability_count": 2, "max_sb_iters": 10, "score_weight": 0.25, "lookahead": 3
    } } }"#;
    let settings: MipSettings = serde_json::from_str(json).unwrap();
    assert!(matches!(
        settings.branching_rule,
        BranchingRule::Reliability { reliability_count: 2, lookahead: 3, .. }
    ));
    let sol = solve_mip(&knapsack(), &settings).unwrap();
    assert!((sol.obj_val - 21.0).abs() < 1e-6);

    let json = r#"{ "branching_rule": "strong_branching" }"#;
    assert!(serde_json::from_str::<MipSettings>(json).is_err());
    let json = r#"{ "node_selection": "breadth_first" }"#;
    assert!(serde_json::from_str::<MipSettings>(json).is_err());
}
