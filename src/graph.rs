use crate::kmer_comp::KmerIndex;
use crate::types::*;
use fxhash::FxHashMap;
use fxhash::FxHashSet;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DbgNode {
    pub label: String,
    // Reads this node's label occurs in, unioned from every k-mer that
    // produced the node and from every chain member merged into it.
    pub reads: FxHashSet<ReadId>,
    in_edges: Vec<EdgeIndex>,
    out_edges: Vec<EdgeIndex>,
}

impl DbgNode {
    fn new(label: String) -> Self {
        DbgNode {
            label,
            ..Default::default()
        }
    }

    pub fn in_edges(&self) -> &[EdgeIndex] {
        &self.in_edges
    }

    pub fn out_edges(&self) -> &[EdgeIndex] {
        &self.out_edges
    }

    pub fn in_degree(&self) -> usize {
        self.in_edges.len()
    }

    pub fn out_degree(&self) -> usize {
        self.out_edges.len()
    }

    // A self-loop counts toward both degrees, so a lone circular node is
    // not a dead end.
    pub fn is_dead_end(&self) -> bool {
        self.in_edges.is_empty() || self.out_edges.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbgEdge {
    pub from: NodeIndex,
    pub to: NodeIndex,
    pub weight: u32,
}

/// De Bruijn graph over (k-1)-mer node labels. Nodes live in a `NodeMap`
/// keyed by creation index so iteration order is deterministic; edges live
/// in a slab and are tombstoned on deletion. All mutation goes through
/// `remove_nodes` and `merge_chain`, which keep the node-owned adjacency
/// lists consistent with the slab.
#[derive(Debug, Clone, Default)]
pub struct DbgGraph {
    pub k: usize,
    pub nodes: NodeMap<NodeIndex, DbgNode>,
    pub edges: Vec<Option<DbgEdge>>,
    next_node: NodeIndex,
}

impl DbgGraph {
    pub fn new(k: usize) -> Self {
        DbgGraph {
            k,
            ..Default::default()
        }
    }

    /// Build the graph from an ordered k-mer index: each k-mer contributes
    /// its prefix and suffix as nodes (interned idempotently), one unit of
    /// weight on the edge between them, and its read provenance to both
    /// endpoints.
    pub fn from_kmer_index(index: &KmerIndex, k: usize) -> Self {
        let mut graph = DbgGraph::new(k);
        let mut label_to_node: FxHashMap<String, NodeIndex> = FxHashMap::default();
        let mut pair_to_edge: FxHashMap<(NodeIndex, NodeIndex), EdgeIndex> = FxHashMap::default();

        for kmer in &index.kmers {
            let left = &kmer[..kmer.len() - 1];
            let right = &kmer[1..];
            let left_idx = graph.intern_node(left, &mut label_to_node);
            let right_idx = graph.intern_node(right, &mut label_to_node);
            graph.bump_edge(left_idx, right_idx, &mut pair_to_edge);

            let sources = &index.provenance[kmer.as_str()];
            for node_idx in [left_idx, right_idx] {
                let node = graph.nodes.get_mut(&node_idx).unwrap();
                node.reads.extend(sources.iter().copied());
            }
        }

        log::debug!(
            "Built de Bruijn graph: {} nodes, {} edges",
            graph.num_nodes(),
            graph.num_edges()
        );
        graph
    }

    fn intern_node(&mut self, label: &str, label_to_node: &mut FxHashMap<String, NodeIndex>) -> NodeIndex {
        if let Some(&idx) = label_to_node.get(label) {
            return idx;
        }
        let idx = self.add_node(label.to_string());
        label_to_node.insert(label.to_string(), idx);
        idx
    }

    fn add_node(&mut self, label: String) -> NodeIndex {
        let idx = self.next_node;
        self.next_node += 1;
        self.nodes.insert(idx, DbgNode::new(label));
        idx
    }

    // At most one edge per ordered pair; multiplicities accumulate.
    fn bump_edge(
        &mut self,
        from: NodeIndex,
        to: NodeIndex,
        pair_to_edge: &mut FxHashMap<(NodeIndex, NodeIndex), EdgeIndex>,
    ) {
        if let Some(&edge_idx) = pair_to_edge.get(&(from, to)) {
            self.edges[edge_idx].as_mut().unwrap().weight += 1;
            return;
        }
        let edge_idx = self.edges.len();
        self.edges.push(Some(DbgEdge { from, to, weight: 1 }));
        pair_to_edge.insert((from, to), edge_idx);
        self.nodes.get_mut(&from).unwrap().out_edges.push(edge_idx);
        self.nodes.get_mut(&to).unwrap().in_edges.push(edge_idx);
    }

    pub fn edge(&self, edge_idx: EdgeIndex) -> &DbgEdge {
        self.edges[edge_idx].as_ref().unwrap()
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_edges(&self) -> usize {
        self.edges.iter().flatten().count()
    }

    pub fn out_neighbors(&self, node_idx: NodeIndex) -> Vec<NodeIndex> {
        self.nodes[&node_idx]
            .out_edges
            .iter()
            .map(|&e| self.edge(e).to)
            .collect()
    }

    pub fn in_neighbors(&self, node_idx: NodeIndex) -> Vec<NodeIndex> {
        self.nodes[&node_idx]
            .in_edges
            .iter()
            .map(|&e| self.edge(e).from)
            .collect()
    }

    pub fn node_by_label(&self, label: &str) -> Option<NodeIndex> {
        self.nodes
            .iter()
            .find(|(_, node)| node.label == label)
            .map(|(&idx, _)| idx)
    }

    /// Delete nodes and every edge incident to them, then repair the edge
    /// lists of the surviving neighbors.
    pub fn remove_nodes(&mut self, nodes_to_remove: &[NodeIndex]) {
        let remove_set: FxHashSet<NodeIndex> = nodes_to_remove.iter().copied().collect();
        let mut touched_nodes = FxHashSet::default();

        for &node_idx in nodes_to_remove {
            let node = match self.nodes.get(&node_idx) {
                Some(node) => node,
                None => continue,
            };
            for &edge_idx in node.in_edges.iter().chain(node.out_edges.iter()) {
                if let Some(edge) = self.edges[edge_idx] {
                    touched_nodes.insert(edge.from);
                    touched_nodes.insert(edge.to);
                    self.edges[edge_idx] = None;
                }
            }
        }

        for node_idx in touched_nodes {
            if remove_set.contains(&node_idx) {
                continue;
            }
            let node = self.nodes.get_mut(&node_idx).unwrap();
            let edges = &self.edges;
            node.in_edges.retain(|&e| edges[e].is_some());
            node.out_edges.retain(|&e| edges[e].is_some());
        }

        for node_idx in nodes_to_remove {
            self.nodes.remove(node_idx);
        }
    }

    /// Collapse a maximal non-branching chain of nodes into one merged node.
    ///
    /// The merged label is the first member's label followed by each
    /// subsequent member's novel suffix (everything past the k-2 overlap;
    /// exactly the last character for plain k-1 labels). The merged node
    /// takes over the redirected in-edges of the chain head, the redirected
    /// out-edges of the chain tail, and the union of member provenance. A
    /// cycle-closing tail-to-head edge becomes a self-loop. Internal edges
    /// and member nodes are deleted.
    pub fn merge_chain(&mut self, chain: &[NodeIndex]) -> NodeIndex {
        debug_assert!(chain.len() >= 2);
        let overlap = self.k - 2;

        let mut label = self.nodes[&chain[0]].label.clone();
        let mut reads = self.nodes[&chain[0]].reads.clone();
        for &member in &chain[1..] {
            let node = &self.nodes[&member];
            label.push_str(&node.label[overlap..]);
            reads.extend(node.reads.iter().copied());
        }

        let mut internal_edges = FxHashSet::default();
        for pair in chain.windows(2) {
            let edge_idx = self.nodes[&pair[0]]
                .out_edges
                .iter()
                .copied()
                .find(|&e| self.edge(e).to == pair[1])
                .unwrap();
            internal_edges.insert(edge_idx);
        }

        let head = chain[0];
        let tail = *chain.last().unwrap();
        let merged_in: Vec<EdgeIndex> = self.nodes[&head]
            .in_edges
            .iter()
            .copied()
            .filter(|e| !internal_edges.contains(e))
            .collect();
        let merged_out: Vec<EdgeIndex> = self.nodes[&tail]
            .out_edges
            .iter()
            .copied()
            .filter(|e| !internal_edges.contains(e))
            .collect();

        let merged_idx = self.add_node(label);
        for &edge_idx in &merged_in {
            self.edges[edge_idx].as_mut().unwrap().to = merged_idx;
        }
        for &edge_idx in &merged_out {
            self.edges[edge_idx].as_mut().unwrap().from = merged_idx;
        }
        let merged = self.nodes.get_mut(&merged_idx).unwrap();
        merged.reads = reads;
        merged.in_edges = merged_in;
        merged.out_edges = merged_out;

        for edge_idx in internal_edges {
            self.edges[edge_idx] = None;
        }
        for member in chain {
            self.nodes.remove(member);
        }
        merged_idx
    }

    /// Snapshot as a Graphviz digraph: one declaration line per node, one
    /// arc per edge annotated with its weight. Diagnostic output only.
    pub fn write_dot<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "digraph assembly {{")?;
        for node in self.nodes.values() {
            writeln!(writer, "    \"{}\";", node.label)?;
        }
        for (_, node) in self.nodes.iter() {
            for &edge_idx in node.out_edges.iter() {
                let edge = self.edge(edge_idx);
                writeln!(
                    writer,
                    "    \"{}\" -> \"{}\" [label=\"{}\"];",
                    self.nodes[&edge.from].label,
                    self.nodes[&edge.to].label,
                    edge.weight
                )?;
            }
        }
        writeln!(writer, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kmer_comp::index_kmers;

    fn build(rs: &[&str], k: usize) -> DbgGraph {
        let reads = ReadSet::new(rs.iter().map(|r| r.to_string()).collect());
        let index = index_kmers(&reads, k).unwrap();
        DbgGraph::from_kmer_index(&index, k)
    }

    fn weight_between(graph: &DbgGraph, from: &str, to: &str) -> Option<u32> {
        let from_idx = graph.node_by_label(from)?;
        let to_idx = graph.node_by_label(to)?;
        graph.nodes[&from_idx]
            .out_edges()
            .iter()
            .map(|&e| graph.edge(e))
            .find(|edge| edge.to == to_idx)
            .map(|edge| edge.weight)
    }

    #[test]
    fn builds_nodes_from_kmer_ends() {
        let graph = build(&["ATGC", "TGCA"], 3);
        for label in ["AT", "TG", "GC", "CA"] {
            assert!(graph.node_by_label(label).is_some(), "missing {}", label);
        }
        assert_eq!(graph.num_nodes(), 4);
    }

    #[test]
    fn edge_weight_counts_kmer_occurrences() {
        // TGC occurs in both reads, so TG -> GC carries weight 2.
        let graph = build(&["ATGC", "TGCA"], 3);
        assert_eq!(weight_between(&graph, "AT", "TG"), Some(1));
        assert_eq!(weight_between(&graph, "TG", "GC"), Some(2));
        assert_eq!(weight_between(&graph, "GC", "CA"), Some(1));
        assert_eq!(graph.num_edges(), 3);
    }

    #[test]
    fn repeated_kmer_in_one_read_makes_a_weighted_self_loop() {
        let graph = build(&["AAAA"], 3);
        assert_eq!(graph.num_nodes(), 1);
        let aa = graph.node_by_label("AA").unwrap();
        assert_eq!(graph.nodes[&aa].in_degree(), 1);
        assert_eq!(graph.nodes[&aa].out_degree(), 1);
        assert_eq!(weight_between(&graph, "AA", "AA"), Some(2));
        assert!(!graph.nodes[&aa].is_dead_end());
    }

    #[test]
    fn provenance_lands_on_both_endpoints() {
        let graph = build(&["ATGC", "TGCA"], 3);
        let tg = graph.node_by_label("TG").unwrap();
        assert_eq!(graph.nodes[&tg].reads.len(), 2);
        let at = graph.node_by_label("AT").unwrap();
        assert_eq!(graph.nodes[&at].reads.len(), 1);
        let ca = graph.node_by_label("CA").unwrap();
        assert!(graph.nodes[&ca].reads.contains(&1));
    }

    #[test]
    fn remove_nodes_drops_incident_edges() {
        let mut graph = build(&["ATGC", "TGCA"], 3);
        let tg = graph.node_by_label("TG").unwrap();
        graph.remove_nodes(&[tg]);

        assert_eq!(graph.num_nodes(), 3);
        assert_eq!(graph.num_edges(), 1);
        let at = graph.node_by_label("AT").unwrap();
        assert_eq!(graph.nodes[&at].out_degree(), 0);
        let gc = graph.node_by_label("GC").unwrap();
        assert_eq!(graph.nodes[&gc].in_degree(), 0);
        assert_eq!(weight_between(&graph, "GC", "CA"), Some(1));
    }

    #[test]
    fn merge_chain_concatenates_and_unions() {
        let mut graph = build(&["ATGC", "TGCA"], 3);
        let chain: Vec<NodeIndex> = ["AT", "TG", "GC", "CA"]
            .iter()
            .map(|l| graph.node_by_label(l).unwrap())
            .collect();
        let merged = graph.merge_chain(&chain);

        assert_eq!(graph.num_nodes(), 1);
        assert_eq!(graph.num_edges(), 0);
        let node = &graph.nodes[&merged];
        assert_eq!(node.label, "ATGCA");
        assert_eq!(node.reads.len(), 2);
    }

    #[test]
    fn merge_chain_turns_cycle_edge_into_self_loop() {
        let mut graph = build(&["AATAA"], 3);
        let chain: Vec<NodeIndex> = ["AA", "AT", "TA"]
            .iter()
            .map(|l| graph.node_by_label(l).unwrap())
            .collect();
        let merged = graph.merge_chain(&chain);

        assert_eq!(graph.num_nodes(), 1);
        assert_eq!(graph.num_edges(), 1);
        let node = &graph.nodes[&merged];
        assert_eq!(node.label, "AATA");
        assert_eq!(node.in_degree(), 1);
        assert_eq!(node.out_degree(), 1);
        let edge = graph.edge(node.out_edges()[0]);
        assert_eq!((edge.from, edge.to), (merged, merged));
    }

    #[test]
    fn dot_snapshot_declares_nodes_and_arcs() {
        let graph = build(&["AAAA"], 3);
        let mut out = Vec::new();
        graph.write_dot(&mut out).unwrap();
        let dot = String::from_utf8(out).unwrap();
        assert!(dot.starts_with("digraph assembly {"));
        assert!(dot.contains("\"AA\";"));
        assert!(dot.contains("\"AA\" -> \"AA\" [label=\"2\"];"));
        assert!(dot.trim_end().ends_with('}'));
    }
}
