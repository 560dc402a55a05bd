use crate::constants::TIP_LENGTH_FACTOR;
use crate::graph::DbgGraph;
use crate::types::*;
use fxhash::FxHashSet;
use std::collections::VecDeque;

/// Remove short dead-end branches. A node qualifies when one of its sides
/// has no edges (an isolated singleton qualifies too) and its label is
/// shorter than TIP_LENGTH_FACTOR * k. Edge weights are not consulted.
///
/// Each round identifies every qualifying node first and deletes them
/// afterwards; deleting a tip can expose a new dead end behind it, so
/// rounds repeat until none qualifies.
pub fn clip_tips(graph: &mut DbgGraph) {
    let min_keep = TIP_LENGTH_FACTOR * graph.k;
    let mut round = 0;
    loop {
        let tips: Vec<NodeIndex> = graph
            .nodes
            .iter()
            .filter(|(_, node)| node.is_dead_end() && node.label.len() < min_keep)
            .map(|(&idx, _)| idx)
            .collect();
        if tips.is_empty() {
            break;
        }
        round += 1;
        log::trace!("Tip clipping round {}: removing {} tips", round, tips.len());
        graph.remove_nodes(&tips);
    }
}

/// Collapse every maximal non-branching path into a single merged node
/// (unitig compaction). An edge (x, y) lies on such a path when x has
/// out-degree <= 1 and y has in-degree <= 1; chains are extended in both
/// directions from a seed node until a degree constraint breaks or the
/// chain would revisit one of its own members (self-contained cycles stop
/// there and end up as one node with a self-loop). Running this on a graph
/// with no qualifying chains is an exact no-op.
pub fn collapse_chains(graph: &mut DbgGraph) {
    let chains = find_chains(graph);
    let num_chains = chains.len();
    for chain in chains {
        graph.merge_chain(&chain);
    }
    log::trace!(
        "Collapsed {} non-branching chains; {} nodes remain",
        num_chains,
        graph.num_nodes()
    );
}

/// The canonical simplification pipeline: collapsing before and after tip
/// removal, so tip lengths are judged on compacted unitigs and clipping
/// is followed by a recompaction of the paths it linearized.
pub fn simplify(graph: &mut DbgGraph) {
    collapse_chains(graph);
    clip_tips(graph);
    collapse_chains(graph);
}

fn find_chains(graph: &DbgGraph) -> Vec<Vec<NodeIndex>> {
    let mut in_chain: FxHashSet<NodeIndex> = FxHashSet::default();
    let mut chains = Vec::new();
    let node_ids: Vec<NodeIndex> = graph.nodes.keys().copied().collect();

    for seed in node_ids {
        if in_chain.contains(&seed) {
            continue;
        }
        let mut chain: VecDeque<NodeIndex> = VecDeque::from([seed]);
        let mut members = FxHashSet::default();
        members.insert(seed);

        // Extend backward while the edge into the head qualifies.
        loop {
            let head = *chain.front().unwrap();
            let node = &graph.nodes[&head];
            if node.in_degree() != 1 {
                break;
            }
            let prev = graph.edge(node.in_edges()[0]).from;
            if members.contains(&prev) || in_chain.contains(&prev) {
                break;
            }
            if graph.nodes[&prev].out_degree() > 1 {
                break;
            }
            chain.push_front(prev);
            members.insert(prev);
        }

        // Extend forward while the edge out of the tail qualifies.
        loop {
            let tail = *chain.back().unwrap();
            let node = &graph.nodes[&tail];
            if node.out_degree() != 1 {
                break;
            }
            let next = graph.edge(node.out_edges()[0]).to;
            if members.contains(&next) || in_chain.contains(&next) {
                break;
            }
            if graph.nodes[&next].in_degree() > 1 {
                break;
            }
            chain.push_back(next);
            members.insert(next);
        }

        if chain.len() >= 2 {
            in_chain.extend(members);
            chains.push(chain.into());
        }
    }

    chains
}
