use crate::graph::DbgGraph;
use crate::types::*;
use fxhash::FxHashMap;
use fxhash::FxHashSet;
use std::collections::BTreeSet;

/// Walk the (optionally simplified) graph and assemble one contig per
/// maximal traced path, guided by read provenance: from each node the walk
/// prefers a neighbor belonging to the read it is currently following, then
/// a neighbor that lets it adopt a not-yet-consumed read, and stops
/// otherwise. Reads are consumed in ascending id order (lexicographic,
/// since `ReadSet` is sorted) and every read is consumed exactly once; a
/// read whose nodes are all covered by earlier contigs consumes silently.
///
/// Every step marks its node visited before continuing and the remaining
/// read set only shrinks, so tracing terminates even on cyclic graphs.
pub fn trace_contigs(graph: &DbgGraph, reads: &ReadSet) -> Vec<String> {
    let overlap = graph.k - 2;

    // Provenance index: read -> nodes carrying it, in ascending node order.
    let mut read_nodes: FxHashMap<ReadId, Vec<NodeIndex>> = FxHashMap::default();
    for (&idx, node) in graph.nodes.iter() {
        for &read_id in node.reads.iter() {
            read_nodes.entry(read_id).or_default().push(idx);
        }
    }
    for nodes in read_nodes.values_mut() {
        nodes.sort_unstable();
    }

    let mut remaining: BTreeSet<ReadId> = reads.ids().collect();
    let mut visited: FxHashSet<NodeIndex> = FxHashSet::default();
    let mut contigs = Vec::new();

    loop {
        let seed_read = match remaining.iter().next() {
            Some(&read_id) => read_id,
            None => break,
        };
        remaining.remove(&seed_read);

        let candidates = match read_nodes.get(&seed_read) {
            Some(candidates) => candidates,
            // The read produced no nodes (shorter than k, or everything it
            // touched was simplified away).
            None => continue,
        };
        let seed = match seed_node(graph, reads.get(seed_read), candidates, &visited) {
            Some(seed) => seed,
            None => continue,
        };
        visited.insert(seed);

        let mut forward_tail = String::new();
        let mut current = seed;
        let mut current_read = seed_read;
        while let Some((next, adopted)) = next_step(
            graph,
            current,
            current_read,
            &remaining,
            &visited,
            Direction::Outgoing,
        ) {
            if let Some(read_id) = adopted {
                remaining.remove(&read_id);
                current_read = read_id;
            }
            let label = &graph.nodes[&next].label;
            forward_tail.push_str(&label[overlap..]);
            visited.insert(next);
            current = next;
        }

        let mut backward_pieces: Vec<&str> = Vec::new();
        current = seed;
        current_read = seed_read;
        while let Some((next, adopted)) = next_step(
            graph,
            current,
            current_read,
            &remaining,
            &visited,
            Direction::Incoming,
        ) {
            if let Some(read_id) = adopted {
                remaining.remove(&read_id);
                current_read = read_id;
            }
            let label = &graph.nodes[&next].label;
            backward_pieces.push(&label[..label.len() - overlap]);
            visited.insert(next);
            current = next;
        }

        let mut contig = String::new();
        for piece in backward_pieces.iter().rev() {
            contig.push_str(piece);
        }
        contig.push_str(&graph.nodes[&seed].label);
        contig.push_str(&forward_tail);
        contigs.push(contig);
    }

    log::debug!("Traced {} contigs from {} reads", contigs.len(), reads.len());
    contigs
}

// The contig for a read starts at the first of the read's (k-1)-mers, taken
// left to right, that survives in the graph unvisited; on an unsimplified
// graph that is literally the read's first node, and after collapsing it is
// the merged node whose label absorbed it. Falls back to the read's first
// unvisited provenance node when no window matches.
fn seed_node(
    graph: &DbgGraph,
    read: &str,
    candidates: &[NodeIndex],
    visited: &FxHashSet<NodeIndex>,
) -> Option<NodeIndex> {
    let window_len = graph.k - 1;
    let bytes = read.as_bytes();
    if bytes.len() >= window_len {
        for window in bytes.windows(window_len) {
            let window = String::from_utf8_lossy(window);
            let hit = candidates
                .iter()
                .copied()
                .filter(|idx| !visited.contains(idx))
                .find(|idx| graph.nodes[idx].label.contains(&*window));
            if hit.is_some() {
                return hit;
            }
        }
    }
    candidates
        .iter()
        .copied()
        .find(|idx| !visited.contains(idx))
}

// One step of the walk. Among unvisited neighbors in the given direction:
// (a) a neighbor on the current read wins, else (b) a neighbor whose
// provenance still intersects the remaining reads wins and the smallest
// such read is adopted, else (c) the walk stops. Ties in both classes go
// to the lexicographically smallest label so results are reproducible.
fn next_step(
    graph: &DbgGraph,
    current: NodeIndex,
    current_read: ReadId,
    remaining: &BTreeSet<ReadId>,
    visited: &FxHashSet<NodeIndex>,
    direction: Direction,
) -> Option<(NodeIndex, Option<ReadId>)> {
    let neighbors = match direction {
        Direction::Outgoing => graph.out_neighbors(current),
        Direction::Incoming => graph.in_neighbors(current),
    };
    let mut candidates: Vec<NodeIndex> = neighbors
        .into_iter()
        .filter(|idx| !visited.contains(idx))
        .collect();
    candidates.sort_by(|a, b| {
        graph.nodes[a]
            .label
            .cmp(&graph.nodes[b].label)
            .then(a.cmp(b))
    });

    for &candidate in &candidates {
        if graph.nodes[&candidate].reads.contains(&current_read) {
            return Some((candidate, None));
        }
    }
    for &candidate in &candidates {
        let adopted = graph.nodes[&candidate]
            .reads
            .iter()
            .copied()
            .filter(|read_id| remaining.contains(read_id))
            .min();
        if let Some(read_id) = adopted {
            return Some((candidate, Some(read_id)));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kmer_comp::index_kmers;

    fn trace(rs: &[&str], k: usize) -> Vec<String> {
        let reads = ReadSet::new(rs.iter().map(|r| r.to_string()).collect());
        let index = index_kmers(&reads, k).unwrap();
        let graph = DbgGraph::from_kmer_index(&index, k);
        trace_contigs(&graph, &reads)
    }

    #[test]
    fn overlapping_reads_trace_to_one_contig() {
        // The walk follows ATGC, then adopts TGCA at the branch-free handoff.
        assert_eq!(trace(&["ATGC", "TGCA"], 3), vec!["ATGCA"]);
    }

    #[test]
    fn backward_phase_extends_before_the_seed() {
        // GCAT seeds first; its predecessors come from TTGC and are found
        // by the backward walk.
        assert_eq!(trace(&["GCAT", "TTGC"], 3), vec!["TTGCAT"]);
    }

    #[test]
    fn disjoint_reads_produce_independent_contigs() {
        let contigs = trace(&["AAAA", "TTTT"], 3);
        assert_eq!(contigs, vec!["AA", "TT"]);
    }

    #[test]
    fn same_read_continuation_beats_fresh_branches() {
        // At GT the walk can continue on its own read (TT) or branch onto
        // GTAA's TA, which sorts first; staying on the read must win.
        let contigs = trace(&["CGTT", "GTAA"], 3);
        assert_eq!(contigs, vec!["CGTT", "TAA"]);
    }

    #[test]
    fn fully_covered_read_is_consumed_without_a_contig() {
        let contigs = trace(&["ATGCA", "GCA"], 3);
        assert_eq!(contigs, vec!["ATGCA"]);
    }

    #[test]
    fn every_reachable_node_is_covered_by_some_contig() {
        let reads = ReadSet::new(vec!["ATCGG".to_string(), "ATCGT".to_string()]);
        let index = index_kmers(&reads, 3).unwrap();
        let graph = DbgGraph::from_kmer_index(&index, 3);
        let contigs = trace_contigs(&graph, &reads);
        assert_eq!(contigs, vec!["ATCGG", "GT"]);

        // Every node label appears in some contig.
        for node in graph.nodes.values() {
            assert!(
                contigs.iter().any(|c| c.contains(&node.label)),
                "node {} not covered",
                node.label
            );
        }
    }

    #[test]
    fn contigs_grow_by_one_character_per_plain_node() {
        // Substring-consistent overlap chain: with unmerged nodes the
        // contig length is (k-1) + number of forward/backward steps.
        let contigs = trace(&["ATGC", "TGCA"], 3);
        assert_eq!(contigs[0].len(), 2 + 3);
    }

    #[test]
    fn tracing_an_empty_graph_yields_nothing() {
        let reads = ReadSet::new(vec![]);
        let graph = DbgGraph::new(3);
        assert!(trace_contigs(&graph, &reads).is_empty());
    }
}
