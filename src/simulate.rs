use crate::constants::NUCLEOTIDES;
use rand::prelude::*;

/// Simulate a noisy read set from a reference sequence: coverage * G /
/// read_length reads of at most read_length bases, each starting at a
/// uniformly random position (reads running past the sequence end are cut
/// short), with every base replaced by a different nucleotide with
/// probability error_rate.
pub fn simulate_reads<R: Rng>(
    sequence: &str,
    coverage: usize,
    read_length: usize,
    error_rate: f64,
    rng: &mut R,
) -> Vec<String> {
    let genome = sequence.as_bytes();
    let g = genome.len();
    let mut reads = Vec::new();
    if g == 0 || read_length == 0 {
        return reads;
    }

    let num_reads = coverage * g / read_length;
    for _ in 0..num_reads {
        let start = rng.gen_range(0..g);
        let end = (start + read_length).min(g);
        let mut read = Vec::with_capacity(end - start);
        for &base in &genome[start..end] {
            if rng.gen::<f64>() < error_rate {
                read.push(replacement_base(base, rng));
            } else {
                read.push(base);
            }
        }
        reads.push(String::from_utf8_lossy(&read).into_owned());
    }

    log::debug!(
        "Simulated {} reads over a {} bp reference (coverage {}, read length {}, error rate {})",
        reads.len(),
        g,
        coverage,
        read_length,
        error_rate
    );
    reads
}

// A substitution error never reproduces the original base.
fn replacement_base<R: Rng>(base: u8, rng: &mut R) -> u8 {
    let options: Vec<u8> = NUCLEOTIDES.iter().copied().filter(|&b| b != base).collect();
    options[rng.gen_range(0..options.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;

    const REFERENCE: &str = "ATGCGTGCATTACGGATCCA";

    #[test]
    fn read_count_follows_coverage() {
        let mut rng = StdRng::seed_from_u64(42);
        let reads = simulate_reads(REFERENCE, 10, 5, 0.0, &mut rng);
        assert_eq!(reads.len(), 10 * REFERENCE.len() / 5);
    }

    #[test]
    fn error_free_reads_are_reference_substrings() {
        let mut rng = StdRng::seed_from_u64(42);
        let reads = simulate_reads(REFERENCE, 5, 6, 0.0, &mut rng);
        for read in &reads {
            assert!(read.len() <= 6);
            assert!(REFERENCE.contains(read), "{} not in reference", read);
        }
    }

    #[test]
    fn same_seed_reproduces_the_same_reads() {
        let mut rng_a = StdRng::seed_from_u64(7);
        let mut rng_b = StdRng::seed_from_u64(7);
        let reads_a = simulate_reads(REFERENCE, 3, 8, 0.1, &mut rng_a);
        let reads_b = simulate_reads(REFERENCE, 3, 8, 0.1, &mut rng_b);
        assert_eq!(reads_a, reads_b);
    }

    #[test]
    fn certain_errors_still_yield_valid_bases() {
        let mut rng = StdRng::seed_from_u64(42);
        let reads = simulate_reads(REFERENCE, 2, 5, 1.0, &mut rng);
        for read in &reads {
            assert!(read.bytes().all(|b| NUCLEOTIDES.contains(&b)));
        }
        // With error rate 1.0 no base survives, so no read of length >= 2
        // can match the reference at its own position.
        assert!(!reads.is_empty());
    }

    #[test]
    fn empty_reference_yields_no_reads() {
        let mut rng = StdRng::seed_from_u64(42);
        assert!(simulate_reads("", 5, 10, 0.0, &mut rng).is_empty());
    }
}
