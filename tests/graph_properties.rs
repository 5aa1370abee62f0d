//! Property tests over randomly wired graphs

mod common;

use common::builders::{id, GraphBuilder};
use common::mock_helpers::{ProbeCounters, ProbeRole, ProbeType};
use framegraph::pipeline::{Pipeline, UnitType};
use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;

/// One node: whether it is a sink, and up to two earlier nodes it reads from.
#[derive(Debug, Clone)]
struct NodePlan {
    sink: bool,
    inputs: [Option<usize>; 2],
}

fn plans() -> impl Strategy<Value = Vec<NodePlan>> {
    (1usize..12).prop_flat_map(|n| {
        (0..n)
            .map(|i| {
                let source = if i == 0 {
                    Just(None).boxed()
                } else {
                    proptest::option::of(0..i).boxed()
                };
                (any::<bool>(), source.clone(), source).prop_map(|(sink, a, b)| NodePlan {
                    sink,
                    inputs: [a, b],
                })
            })
            .collect::<Vec<_>>()
    })
}

fn build(plans: &[NodePlan]) -> (Pipeline, Vec<Arc<ProbeCounters>>) {
    let mut builder = GraphBuilder::new();
    let mut counters = Vec::with_capacity(plans.len());

    for (i, plan) in plans.iter().enumerate() {
        let role = if plan.sink { ProbeRole::Sink } else { ProbeRole::Join };
        let (kind, c) = ProbeType::new(role);
        let slots: Vec<&'static str> = kind.inputs().iter().map(|p| p.name).collect();
        let wiring: Vec<(&str, u128, &str)> = plan
            .inputs
            .iter()
            .zip(slots)
            .filter_map(|(src, slot)| src.map(|s| (slot, s as u128, "value")))
            // Sinks have no outputs, so nothing may read from them.
            .filter(|(_, s, _)| !plans[*s as usize].sink)
            .collect();
        builder = builder.unit(i as u128, kind, &wiring);
        counters.push(c);
    }
    (builder.build(), counters)
}

/// Nodes upstream of (or equal to) some sink.
fn reachable(plans: &[NodePlan]) -> HashSet<usize> {
    let mut seen = HashSet::new();
    let mut stack: Vec<usize> = (0..plans.len()).filter(|&i| plans[i].sink).collect();
    while let Some(i) = stack.pop() {
        if !seen.insert(i) {
            continue;
        }
        for src in plans[i].inputs.iter().flatten() {
            if !plans[*src].sink {
                stack.push(*src);
            }
        }
    }
    seen
}

proptest! {
    #[test]
    fn prop_each_reachable_node_runs_once_per_frame(plans in plans(), frames in 1usize..4) {
        let (mut pipeline, counters) = build(&plans);
        let live = reachable(&plans);

        for _ in 0..frames {
            pipeline.run().unwrap();
        }

        for (i, c) in counters.iter().enumerate() {
            let expected = if live.contains(&i) { frames } else { 0 };
            prop_assert_eq!(c.runs(), expected, "node {}", i);
            prop_assert!(c.starts() <= 1);
        }
    }

    #[test]
    fn prop_prune_keeps_exactly_the_kept_set(
        plans in plans(),
        keep_mask in proptest::collection::vec(any::<bool>(), 12),
    ) {
        let (mut pipeline, counters) = build(&plans);
        pipeline.run().unwrap();

        let keep: Vec<usize> = (0..plans.len()).filter(|&i| keep_mask[i]).collect();
        let removed = pipeline.prune_nodetree(keep.iter().map(|&i| id(i as u128)));

        prop_assert_eq!(pipeline.graph().len(), keep.len());
        prop_assert_eq!(removed.len(), plans.len() - keep.len());
        prop_assert!(pipeline.graph().links().is_empty());

        for (i, c) in counters.iter().enumerate() {
            let was_live = c.starts() == 1;
            let expected = if !keep_mask[i] && was_live { 1 } else { 0 };
            prop_assert_eq!(c.disposes(), expected, "node {}", i);
        }

        // Survivors still evaluate, now with null inputs.
        pipeline.run().unwrap();
    }
}
