//! Reading and writing cut manifests.
//!
//! Two layouts are supported, chosen by file extension:
//!
//! - `.jsonl`: one cut object per line (blank lines are skipped)
//! - anything else: a single JSON array of cut objects

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::{Cut, CutSet, DatasetError};

/// Loads a manifest from `path`.
pub fn load(path: impl AsRef<Path>) -> Result<CutSet, DatasetError> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let cuts = if is_jsonl(path) {
        read_jsonl(reader)?
    } else {
        let cuts: Vec<Cut> = serde_json::from_reader(reader)?;
        CutSet::from_cuts(cuts)?
    };
    debug!(path = %path.display(), cuts = cuts.len(), "loaded manifest");
    Ok(cuts)
}

/// Writes `cuts` to `path`.
pub fn save(cuts: &CutSet, path: impl AsRef<Path>) -> Result<(), DatasetError> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    if is_jsonl(path) {
        write_jsonl(cuts, &mut writer)?;
    } else {
        let all: Vec<&Cut> = cuts.iter().collect();
        serde_json::to_writer_pretty(&mut writer, &all)?;
    }
    writer.flush()?;
    Ok(())
}

/// Reads JSON Lines from any buffered reader.
pub fn read_jsonl(reader: impl BufRead) -> Result<CutSet, DatasetError> {
    let mut cuts = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        cuts.push(serde_json::from_str::<Cut>(&line)?);
    }
    CutSet::from_cuts(cuts)
}

/// Writes JSON Lines to any writer.
pub fn write_jsonl(cuts: &CutSet, mut writer: impl Write) -> Result<(), DatasetError> {
    for cut in cuts {
        serde_json::to_writer(&mut writer, cut)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

fn is_jsonl(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("jsonl")
}
