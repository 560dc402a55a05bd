use clap::Parser;
use flexi_logger::style;
use flexi_logger::{DeferredNow, Duplicate, FileSpec, Record};
use kontig::assemble::{assemble, AssembleOpts};
use kontig::cli;
use kontig::constants::*;
use kontig::seq_parse;
use kontig::simulate;
use kontig::utils::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

fn main() {
    let total_start_time = Instant::now();
    let args = cli::Cli::parse();

    match args.command {
        cli::Commands::Assemble(ref asm_args) => {
            let asm_args = asm_args.clone();
            run_assemble(&args, asm_args, total_start_time);
        }
        cli::Commands::Simulate(ref sim_args) => {
            let sim_args = sim_args.clone();
            run_simulate(&args, sim_args);
        }
    }
}

fn my_own_format_colored(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    let mut paintlevel = record.level();
    if paintlevel == log::Level::Info {
        paintlevel = log::Level::Debug;
    }
    write!(
        w,
        "({}) {} [{}] {}",
        now.format(TS_DASHES_BLANK_COLONS_DOT_BLANK),
        style(paintlevel).paint(record.level().to_string()),
        record.module_path().unwrap_or(""),
        &record.args()
    )
}

fn my_own_format(
    w: &mut dyn std::io::Write,
    now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "({}) {} [{}] {}",
        now.format(TS_DASHES_BLANK_COLONS_DOT_BLANK),
        record.level(),
        record.module_path().unwrap_or(""),
        &record.args()
    )
}

fn initialize_setup(args: &cli::Cli, asm_args: &cli::AssembleArgs) -> PathBuf {
    if !Path::new(&asm_args.input_file).exists() {
        eprintln!(
            "ERROR [kontig] Input file {} does not exist. Exiting.",
            asm_args.input_file
        );
        std::process::exit(1);
    }

    let output_dir = Path::new(asm_args.output_dir.as_str());
    if !output_dir.exists() {
        std::fs::create_dir_all(output_dir).expect("Could not create output directory. Exiting.");
    } else if !output_dir.is_dir() {
        eprintln!("ERROR [kontig] Output directory specified by `-o` exists and is not a directory.");
        std::process::exit(1);
    }

    let filespec = FileSpec::default().directory(output_dir).basename("kontig");
    flexi_logger::Logger::try_with_str(args.log_level_filter().to_string())
        .expect("Something went wrong with logging")
        .log_to_file(filespec)
        .duplicate_to_stderr(Duplicate::Info)
        .format(my_own_format_colored)
        .format_for_files(my_own_format)
        .start()
        .expect("Something went wrong with creating log file");

    let cli_args: Vec<String> = std::env::args().collect();
    log::info!("COMMAND: {}", cli_args.join(" "));
    log::info!("VERSION: {}", env!("CARGO_PKG_VERSION"));

    if asm_args.kmer_size < MIN_KMER_SIZE {
        log::error!("K-mer size must be at least {}", MIN_KMER_SIZE);
        std::process::exit(1);
    }

    rayon::ThreadPoolBuilder::new()
        .num_threads(asm_args.threads)
        .build_global()
        .unwrap();

    output_dir.to_path_buf()
}

fn run_assemble(args: &cli::Cli, asm_args: cli::AssembleArgs, total_start_time: Instant) {
    let output_dir = initialize_setup(args, &asm_args);

    log::info!("Starting assembly...");
    let start = Instant::now();
    let reads = match seq_parse::read_input_reads(&asm_args.input_file) {
        Ok(reads) => reads,
        Err(e) => {
            log::error!("Could not read {}: {}", asm_args.input_file, e);
            std::process::exit(1);
        }
    };
    log::info!(
        "Parsed {} reads in {:?}",
        reads.len(),
        start.elapsed()
    );
    log_memory_usage(false, "STAGE 1: Parsed reads");

    let opts = AssembleOpts {
        collapse: !asm_args.no_collapse,
        clip_tips: !asm_args.no_tip_clip,
    };
    let start = Instant::now();
    let assembly = match assemble(reads, asm_args.kmer_size, &opts) {
        Ok(assembly) => assembly,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    log::info!("Time elapsed for assembly: {:?}", start.elapsed());
    log_memory_usage(true, "STAGE 2: Assembled contigs");

    let contigs_path = output_dir.join(DEFAULT_CONTIGS_NAME);
    let mut writer =
        BufWriter::new(File::create(&contigs_path).expect("Could not create contigs file. Exiting."));
    for contig in &assembly.contigs {
        writeln!(writer, "{}", contig).expect("Could not write contigs file. Exiting.");
    }
    log::info!(
        "Wrote {} contigs to {}",
        assembly.contigs.len(),
        contigs_path.display()
    );
    log::info!("N50 score: {}", n50(&assembly.contigs));

    if let Some(dot_name) = &asm_args.dot {
        let dot_path = output_dir.join(dot_name);
        let mut writer =
            BufWriter::new(File::create(&dot_path).expect("Could not create dot file. Exiting."));
        assembly
            .graph
            .write_dot(&mut writer)
            .expect("Could not write dot file. Exiting.");
        log::info!("Wrote graph snapshot to {}", dot_path.display());
    }

    log::info!("Total time elapsed: {:?}", total_start_time.elapsed());
}

fn run_simulate(args: &cli::Cli, sim_args: cli::SimulateArgs) {
    flexi_logger::Logger::try_with_str(args.log_level_filter().to_string())
        .expect("Something went wrong with logging")
        .format(my_own_format_colored)
        .start()
        .expect("Something went wrong with starting the logger");

    if !(0.0..=1.0).contains(&sim_args.error_rate) {
        log::error!("Error rate must be between 0 and 1");
        std::process::exit(1);
    }

    let reference = match seq_parse::fasta_reference(&sim_args.fasta) {
        Ok(reference) => reference,
        Err(e) => {
            log::error!("Could not read {}: {}", sim_args.fasta, e);
            std::process::exit(1);
        }
    };
    if reference.is_empty() {
        log::error!("Reference {} contains no sequence", sim_args.fasta);
        std::process::exit(1);
    }

    let mut rng = StdRng::seed_from_u64(sim_args.seed);
    let reads = simulate::simulate_reads(
        &reference,
        sim_args.coverage,
        sim_args.read_length,
        sim_args.error_rate,
        &mut rng,
    );

    let mut writer =
        BufWriter::new(File::create(&sim_args.output).expect("Could not create read file. Exiting."));
    for read in &reads {
        writeln!(writer, "{}", read).expect("Could not write read file. Exiting.");
    }
    log::info!(
        "Simulated {} reads from a {} bp reference into {}",
        reads.len(),
        reference.len(),
        sim_args.output
    );
}
