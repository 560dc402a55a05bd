use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::{self};
use std::path::Path;

/// Read the input read collection. FASTA/FASTQ files are detected from the
/// leading record marker and parsed with needletail; anything else is
/// treated as plain text with one read per line.
pub fn read_input_reads<P: AsRef<Path>>(path: P) -> io::Result<Vec<String>> {
    let mut first = [0u8; 1];
    let n = File::open(path.as_ref())?.read(&mut first)?;
    if n == 1 && (first[0] == b'>' || first[0] == b'@') {
        let file = File::open(path.as_ref())?;
        fastx_sequences(file)
    } else {
        plain_reads(BufReader::new(File::open(path.as_ref())?))
    }
}

/// One read per line, trimmed and upper-cased; empty lines are skipped.
pub fn plain_reads<R: BufRead>(reader: R) -> io::Result<Vec<String>> {
    let mut reads = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let read = line.trim();
        if !read.is_empty() {
            reads.push(read.to_uppercase());
        }
    }
    Ok(reads)
}

/// All record sequences of a FASTA/FASTQ stream, upper-cased.
pub fn fastx_sequences<R: Read + Send + 'static>(reader: R) -> io::Result<Vec<String>> {
    let mut fastx_reader = needletail::parse_fastx_reader(reader)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
    let mut sequences = Vec::new();
    while let Some(record) = fastx_reader.next() {
        let record = record.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        sequences.push(String::from_utf8_lossy(&record.seq()).to_uppercase());
    }
    Ok(sequences)
}

/// A reference genome from a FASTA file: every record's sequence
/// concatenated into one string, as the read simulator consumes it.
pub fn fasta_reference<P: AsRef<Path>>(path: P) -> io::Result<String> {
    let file = File::open(path.as_ref())?;
    Ok(fastx_sequences(file)?.concat())
}
