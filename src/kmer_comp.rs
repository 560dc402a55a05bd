use crate::constants::MIN_KMER_SIZE;
use crate::types::*;
use fxhash::FxHashMap;
use fxhash::FxHashSet;
use rayon::prelude::*;

/// All k-mers across the read set, in read-major insertion order, plus the
/// set of reads each distinct k-mer occurred in.
#[derive(Debug, Clone, Default)]
pub struct KmerIndex {
    pub kmers: Vec<String>,
    pub provenance: FxHashMap<String, FxHashSet<ReadId>>,
}

/// Slide a window of length k over every read. A read of length L yields
/// exactly L - k + 1 k-mers; reads shorter than k contribute nothing and
/// raise no error. Extraction is per-read independent, so it runs on the
/// rayon pool; the merge is sequential and preserves read order.
pub fn index_kmers(reads: &ReadSet, k: usize) -> Result<KmerIndex, AsmError> {
    if k < MIN_KMER_SIZE {
        return Err(AsmError::InvalidParameter(format!(
            "k must be at least {} (got {})",
            MIN_KMER_SIZE, k
        )));
    }

    let read_list: Vec<(ReadId, &str)> = reads.iter().collect();
    let per_read: Vec<(ReadId, Vec<String>)> = read_list
        .into_par_iter()
        .map(|(id, read)| (id, kmers_of_read(read, k)))
        .collect();

    let mut kmers = Vec::new();
    let mut provenance: FxHashMap<String, FxHashSet<ReadId>> = FxHashMap::default();
    for (id, read_kmers) in per_read {
        for kmer in read_kmers {
            provenance.entry(kmer.clone()).or_default().insert(id);
            kmers.push(kmer);
        }
    }

    if !reads.is_empty() && kmers.is_empty() {
        return Err(AsmError::InvalidParameter(format!(
            "k = {} exceeds the length of every read; no k-mers can be produced",
            k
        )));
    }

    log::debug!(
        "Indexed {} k-mers ({} distinct) from {} reads at k = {}",
        kmers.len(),
        provenance.len(),
        reads.len(),
        k
    );

    Ok(KmerIndex { kmers, provenance })
}

fn kmers_of_read(read: &str, k: usize) -> Vec<String> {
    let bytes = read.as_bytes();
    if bytes.len() < k {
        return vec![];
    }
    bytes
        .windows(k)
        .map(|w| String::from_utf8_lossy(w).into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reads(rs: &[&str]) -> ReadSet {
        ReadSet::new(rs.iter().map(|r| r.to_string()).collect())
    }

    #[test]
    fn kmer_count_is_len_minus_k_plus_one() {
        let set = reads(&["ATGCG"]);
        let index = index_kmers(&set, 3).unwrap();
        assert_eq!(index.kmers, vec!["ATG", "TGC", "GCG"]);

        let index = index_kmers(&set, 5).unwrap();
        assert_eq!(index.kmers.len(), 1);
    }

    #[test]
    fn insertion_order_is_read_major() {
        // ReadSet sorts reads, so ATGC comes before TGCA.
        let set = reads(&["TGCA", "ATGC"]);
        let index = index_kmers(&set, 3).unwrap();
        assert_eq!(index.kmers, vec!["ATG", "TGC", "TGC", "GCA"]);
    }

    #[test]
    fn provenance_tracks_every_containing_read() {
        let set = reads(&["ATGC", "TGCA"]);
        let index = index_kmers(&set, 3).unwrap();
        let tgc = &index.provenance["TGC"];
        assert_eq!(tgc.len(), 2);
        assert!(tgc.contains(&0) && tgc.contains(&1));
        assert_eq!(index.provenance["ATG"].len(), 1);
    }

    #[test]
    fn reads_shorter_than_k_are_skipped_silently() {
        let set = reads(&["ATGCG", "AT"]);
        let index = index_kmers(&set, 3).unwrap();
        assert_eq!(index.kmers.len(), 3);
    }

    #[test]
    fn k_of_one_is_invalid() {
        let set = reads(&["ATGCG"]);
        assert!(matches!(
            index_kmers(&set, 1),
            Err(AsmError::InvalidParameter(_))
        ));
        assert!(matches!(
            index_kmers(&set, 0),
            Err(AsmError::InvalidParameter(_))
        ));
    }

    #[test]
    fn k_longer_than_every_read_is_invalid() {
        let set = reads(&["ATG", "GCA"]);
        assert!(matches!(
            index_kmers(&set, 10),
            Err(AsmError::InvalidParameter(_))
        ));
    }

    #[test]
    fn empty_read_set_is_a_valid_degenerate_case() {
        let set = reads(&[]);
        let index = index_kmers(&set, 3).unwrap();
        assert!(index.kmers.is_empty());
        assert!(index.provenance.is_empty());
    }
}
