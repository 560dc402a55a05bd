use memory_stats::memory_stats;

pub fn log_memory_usage(info: bool, message: &str) {
    if let Some(usage) = memory_stats() {
        if info {
            log::info!(
                "{} --- Memory usage: {:.2} GB",
                message,
                usage.physical_mem as f64 / 1_000_000_000.
            );
        } else {
            log::debug!(
                "{} --- Memory usage: {:.2} GB",
                message,
                usage.physical_mem as f64 / 1_000_000_000.
            );
        }
    } else {
        log::info!("Memory usage: unknown (WARNING)");
    }
}

/// N50 of a contig list: the length of the contig at which, taking contigs
/// from longest to shortest, the cumulative length first reaches half the
/// total. 0 for an empty list.
pub fn n50(contigs: &[String]) -> usize {
    if contigs.is_empty() {
        return 0;
    }

    let mut lengths: Vec<usize> = contigs.iter().map(|c| c.len()).collect();
    lengths.sort_unstable_by(|a, b| b.cmp(a));
    let total: usize = lengths.iter().sum();

    let mut cumulative = 0;
    for length in lengths {
        cumulative += length;
        if 2 * cumulative >= total {
            return length;
        }
    }
    0
}
