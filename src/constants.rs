pub const NUCLEOTIDES: [u8; 4] = [b'A', b'C', b'G', b'T'];

pub const TS_DASHES_BLANK_COLONS_DOT_BLANK: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub const MIN_KMER_SIZE: usize = 2;

// Dead ends shorter than TIP_LENGTH_FACTOR * k are presumed sequencing
// artifacts rather than genuine sequence boundaries.
pub const TIP_LENGTH_FACTOR: usize = 2;

pub const DEFAULT_CONTIGS_NAME: &str = "contigs.txt";
pub const DEFAULT_READS_NAME: &str = "reads.txt";
pub const DEFAULT_SIM_SEED: u64 = 42;

pub const CLI_HEADINGS: [&str; 2] = ["Graph Parameters", "Miscellaneous Options"];
