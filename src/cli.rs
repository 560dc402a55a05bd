use crate::constants::CLI_HEADINGS;
use crate::constants::DEFAULT_SIM_SEED;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "kontig",
    about = "kontig - de Bruijn graph assembly of short noisy reads into contigs",
    version,
    author,
    disable_help_subcommand = true,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Logging verbosity level
    #[arg(short, long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Assemble a set of reads into contigs using a de Bruijn graph
    #[command(name = "assemble")]
    Assemble(AssembleArgs),

    /// Simulate a noisy set of reads from a reference genome in FASTA format
    #[command(name = "simulate")]
    Simulate(SimulateArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct AssembleArgs {
    /// Input read file: plain text with one read per line, or FASTA/FASTQ (detected automatically)
    #[arg(required = true, value_name = "READS")]
    pub input_file: String,

    /// Output directory for contigs and logs (created if it does not exist)
    #[arg(short, long, default_value = "kontig-out")]
    pub output_dir: String,

    /// K-mer size used to build the de Bruijn graph
    #[arg(short, long, default_value = "17", help_heading = CLI_HEADINGS[0])]
    pub kmer_size: usize,

    /// Skip collapsing of maximal non-branching paths into unitigs
    #[arg(long, help_heading = CLI_HEADINGS[0])]
    pub no_collapse: bool,

    /// Skip clipping of short dead-end branches
    #[arg(long, help_heading = CLI_HEADINGS[0])]
    pub no_tip_clip: bool,

    /// Write the simplified graph as a Graphviz dot file inside the output directory
    #[arg(long, value_name = "FILE", help_heading = CLI_HEADINGS[1])]
    pub dot: Option<String>,

    /// Number of threads to use for k-mer indexing
    #[arg(short, long, default_value = "8")]
    pub threads: usize,
}

#[derive(Parser, Debug, Clone)]
pub struct SimulateArgs {
    /// Reference genome in FASTA format
    #[arg(required = true, value_name = "FASTA")]
    pub fasta: String,

    /// Average number of times each base is covered by a read
    #[arg(required = true)]
    pub coverage: usize,

    /// Maximum read length; reads running past the genome end are cut short
    #[arg(required = true)]
    pub read_length: usize,

    /// Per-base probability of replacing a base with a different one
    #[arg(required = true)]
    pub error_rate: f64,

    /// Output file for the simulated reads, one read per line
    #[arg(short, long, default_value = crate::constants::DEFAULT_READS_NAME)]
    pub output: String,

    /// Seed for the random number generator
    #[arg(long, default_value_t = DEFAULT_SIM_SEED)]
    pub seed: u64,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Default for LogLevel {
    fn default() -> Self {
        LogLevel::Info
    }
}

impl Cli {
    pub fn log_level_filter(&self) -> log::LevelFilter {
        match self.log_level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}
