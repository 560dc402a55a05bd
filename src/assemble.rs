use crate::graph::DbgGraph;
use crate::kmer_comp;
use crate::trace;
use crate::types::*;
use crate::unitig;

/// Which simplification passes the driver runs between graph construction
/// and tracing. Both default on; the canonical order is collapse, clip,
/// collapse (tip lengths are judged on compacted unitigs).
#[derive(Debug, Clone, Copy)]
pub struct AssembleOpts {
    pub collapse: bool,
    pub clip_tips: bool,
}

impl Default for AssembleOpts {
    fn default() -> Self {
        AssembleOpts {
            collapse: true,
            clip_tips: true,
        }
    }
}

/// The driver's output: contigs in completion order, plus the final graph
/// so diagnostic consumers (dot export) can snapshot the node/edge state
/// the contigs were traced from.
#[derive(Debug)]
pub struct Assembly {
    pub contigs: Vec<String>,
    pub graph: DbgGraph,
}

/// Assemble a collection of reads into contigs: index k-mers, build the de
/// Bruijn graph, simplify it per `opts`, and trace read-guided contigs.
/// Zero reads is a valid degenerate case yielding zero contigs; k <= 1, or
/// a k no read can accommodate, is an `InvalidParameter` error.
pub fn assemble(reads: Vec<String>, k: usize, opts: &AssembleOpts) -> Result<Assembly, AsmError> {
    let reads = ReadSet::new(reads);
    let index = kmer_comp::index_kmers(&reads, k)?;
    let mut graph = DbgGraph::from_kmer_index(&index, k);
    drop(index);

    if opts.collapse {
        unitig::collapse_chains(&mut graph);
    }
    if opts.clip_tips {
        unitig::clip_tips(&mut graph);
    }
    if opts.collapse {
        unitig::collapse_chains(&mut graph);
    }

    let contigs = trace::trace_contigs(&graph, &reads);
    log::info!(
        "Assembled {} contigs from {} reads (k = {})",
        contigs.len(),
        reads.len(),
        k
    );
    Ok(Assembly { contigs, graph })
}
