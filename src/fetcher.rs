use crate::error::FetchError;
use crate::fasta_index::ScaffoldIndex;
use std::path::Path;
use tracing::debug;

/// Growable output buffer with an optional hard size limit.
#[derive(Debug, Default)]
pub struct RecordBuffer {
    data: Vec<u8>,
    limit: Option<usize>,
}

impl RecordBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(limit: Option<usize>) -> Self {
        Self {
            data: Vec::new(),
            limit,
        }
    }

    pub fn append(&mut self, bytes: &[u8]) -> Result<(), FetchError> {
        if let Some(limit) = self.limit {
            let needed = self.data.len().saturating_add(bytes.len());
            if needed > limit {
                return Err(FetchError::BufferWriteFailed { needed, limit });
            }
        }
        self.data.extend_from_slice(bytes);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    fn into_record(self, scaffold_name: &str) -> FormattedRecord {
        FormattedRecord {
            scaffold_name: scaffold_name.to_string(),
            bytes: self.data,
        }
    }
}

/// A complete FASTA record: header line plus the (possibly wrapped) body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedRecord {
    scaffold_name: String,
    bytes: Vec<u8>,
}

impl FormattedRecord {
    pub fn scaffold_name(&self) -> &str {
        &self.scaffold_name
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }

    /// Body lines without their terminating newlines.
    pub fn body_lines(&self) -> impl Iterator<Item = &[u8]> {
        self.bytes
            .split(|b| *b == b'\n')
            .skip(1)
            .filter(|line| !line.is_empty())
    }
}

pub fn write_header(buffer: &mut RecordBuffer, scaffold_name: &str) -> Result<(), FetchError> {
    buffer.append(b">")?;
    buffer.append(scaffold_name.as_bytes())?;
    buffer.append(b"\n")
}

/// Appends `seq` in lines of `wrap_width` bytes, each ending in a newline.
/// Only the last line may be shorter, and never empty. A width of 0 puts the
/// whole sequence on one line; an empty sequence appends nothing.
pub fn write_body(
    buffer: &mut RecordBuffer,
    seq: &[u8],
    wrap_width: usize,
) -> Result<(), FetchError> {
    if seq.is_empty() {
        return Ok(());
    }
    let width = if wrap_width == 0 { seq.len() } else { wrap_width };
    for line in seq.chunks(width) {
        buffer.append(line)?;
        buffer.append(b"\n")?;
    }
    Ok(())
}

/// Opens the index over `fasta_path`, fetches `scaffold_name` and renders
/// it. The index handle is released before this returns, on every path, and
/// a failed build never hands out its partial buffer.
pub fn fetch_scaffold(
    fasta_path: &Path,
    scaffold_name: &str,
    wrap_width: u32,
    max_record_bytes: Option<usize>,
) -> Result<FormattedRecord, FetchError> {
    let mut index = ScaffoldIndex::open(fasta_path)?;
    let mut buffer = RecordBuffer::with_limit(max_record_bytes);
    write_header(&mut buffer, scaffold_name)?;
    let seq = index.fetch(scaffold_name)?;
    drop(index);

    debug!(
        scaffold = scaffold_name,
        seq_len = seq.len(),
        wrap_width,
        "wrapping scaffold"
    );
    write_body(&mut buffer, &seq, wrap_width as usize)?;
    Ok(buffer.into_record(scaffold_name))
}
