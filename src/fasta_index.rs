use crate::error::FetchError;
use bio::io::fasta::IndexedReader;
use serde::Serialize;
use std::ffi::OsString;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ScaffoldInfo {
    pub name: String,
    pub length: u64,
}

/// Open random-access handle over one FASTA file. Dropping it closes the
/// underlying file.
pub struct ScaffoldIndex {
    path: PathBuf,
    reader: IndexedReader<File>,
}

impl ScaffoldIndex {
    /// Opens `fasta_path` through its `.fai` sidecar, building the sidecar
    /// first when it does not exist yet.
    pub fn open(fasta_path: &Path) -> Result<Self, FetchError> {
        let load_failed = |reason: String| FetchError::IndexLoadFailed {
            path: fasta_path.display().to_string(),
            reason,
        };
        if !fasta_path.is_file() {
            return Err(load_failed("FASTA file does not exist".to_string()));
        }
        let fai_path = fai_path_for(fasta_path);
        if !fai_path.exists() {
            let records = build_fasta_index(fasta_path, &fai_path).map_err(load_failed)?;
            info!(fasta = %fasta_path.display(), records, "built missing FASTA index");
        }
        let reader =
            IndexedReader::from_file(&fasta_path).map_err(|e| load_failed(format!("{e:#}")))?;
        debug!(fasta = %fasta_path.display(), "loaded FASTA index");
        Ok(Self {
            path: fasta_path.to_path_buf(),
            reader,
        })
    }

    /// Reads the complete sequence of `scaffold_name`.
    pub fn fetch(&mut self, scaffold_name: &str) -> Result<Vec<u8>, FetchError> {
        let not_found = |reason: String| FetchError::ScaffoldNotFound {
            path: self.path.display().to_string(),
            scaffold: scaffold_name.to_string(),
            reason,
        };
        let length = self
            .reader
            .index
            .sequences()
            .into_iter()
            .find(|s| s.name == scaffold_name)
            .map(|s| s.len)
            .ok_or_else(|| not_found("no such sequence in the index".to_string()))?;
        let mut seq = Vec::new();
        // zero-length records have no line geometry to seek with
        if length > 0 {
            self.reader
                .fetch_all(scaffold_name)
                .map_err(|e| not_found(e.to_string()))?;
            self.reader
                .read(&mut seq)
                .map_err(|e| not_found(e.to_string()))?;
        }
        debug!(scaffold = scaffold_name, seq_len = seq.len(), "fetched scaffold");
        Ok(seq)
    }

    pub fn scaffolds(&self) -> Vec<ScaffoldInfo> {
        self.reader
            .index
            .sequences()
            .into_iter()
            .map(|s| ScaffoldInfo {
                name: s.name,
                length: s.len,
            })
            .collect()
    }
}

pub fn fai_path_for(fasta_path: &Path) -> PathBuf {
    let mut os: OsString = fasta_path.as_os_str().to_os_string();
    os.push(".fai");
    PathBuf::from(os)
}

/// One `.fai` row while its record is being scanned.
#[derive(Debug, Clone, PartialEq, Eq)]
struct FaiRow {
    name: String,
    length: u64,
    offset: u64,
    line_bases: u64,
    line_bytes: u64,
    /// A short or blank line was seen; no more bases may follow.
    closed: bool,
}

impl FaiRow {
    /// `body_start` is where the record's bases would begin. Records that
    /// never see a base keep it, with zero line geometry, as samtools does.
    fn new(name: String, body_start: u64) -> Self {
        Self {
            name,
            length: 0,
            offset: body_start,
            line_bases: 0,
            line_bytes: 0,
            closed: false,
        }
    }

    fn push_line(&mut self, bases: u64, bytes: u64, at: u64) -> Result<(), String> {
        if bases == 0 {
            self.closed |= self.line_bases > 0;
            return Ok(());
        }
        if self.closed {
            return Err(format!(
                "record '{}' continues after a short line",
                self.name
            ));
        }
        if self.line_bases == 0 {
            self.offset = at;
            self.line_bases = bases;
            self.line_bytes = bytes;
        } else if bases > self.line_bases {
            return Err(format!(
                "record '{}' has a line longer than its first ({} > {} bases)",
                self.name, bases, self.line_bases
            ));
        } else if bases < self.line_bases {
            self.closed = true;
        }
        self.length += bases;
        Ok(())
    }
}

impl fmt::Display for FaiRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.name, self.length, self.offset, self.line_bases, self.line_bytes
        )
    }
}

fn trim_line_end(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn scan_fasta(fasta_path: &Path) -> Result<Vec<FaiRow>, String> {
    let file = File::open(fasta_path).map_err(|e| format!("could not open FASTA: {e}"))?;
    let mut reader = BufReader::new(file);
    let mut raw = Vec::new();
    let mut pos: u64 = 0;
    let mut rows: Vec<FaiRow> = Vec::new();
    loop {
        raw.clear();
        let bytes = reader
            .read_until(b'\n', &mut raw)
            .map_err(|e| format!("could not read FASTA: {e}"))? as u64;
        if bytes == 0 {
            break;
        }
        let content = trim_line_end(&raw);
        if let Some(header) = content.strip_prefix(b">") {
            let name = String::from_utf8_lossy(header)
                .split_whitespace()
                .next()
                .map(str::to_string)
                .ok_or_else(|| format!("header line at byte {pos} has no name"))?;
            rows.push(FaiRow::new(name, pos + bytes));
        } else if let Some(row) = rows.last_mut() {
            row.push_line(content.len() as u64, bytes, pos)?;
        } else if !content.is_empty() {
            return Err("sequence data before the first header".to_string());
        }
        pos += bytes;
    }
    if rows.is_empty() {
        return Err("no sequence records".to_string());
    }
    Ok(rows)
}

/// Writes a samtools-compatible `.fai` for `fasta_path` and returns how many
/// records it lists. The index is staged next to `index_path` and renamed
/// into place, so readers never see a partial file.
pub fn build_fasta_index(fasta_path: &Path, index_path: &Path) -> Result<usize, String> {
    let rows = scan_fasta(fasta_path)?;
    let dir = index_path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let write_failed = |e: std::io::Error| {
        format!("could not write index '{}': {e}", index_path.display())
    };
    // dropping the staged file on any error removes it
    let mut staged = NamedTempFile::new_in(dir).map_err(write_failed)?;
    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        for row in &rows {
            writeln!(writer, "{row}").map_err(write_failed)?;
        }
        writer.flush().map_err(write_failed)?;
    }
    staged
        .persist(index_path)
        .map_err(|e| write_failed(e.error))?;
    Ok(rows.len())
}
