//! Packaging processed outputs for download.
//!
//! One output is passed through as-is. Several outputs are packed into a
//! single deflate-compressed zip. Entry names that collide inside the archive
//! get a ` (n)` suffix before the extension so nothing is overwritten:
//!
//! ```text
//! a.png, a.jpg  --jpeg-->  a.jpg, a.jpg  --archive-->  a.jpg, a (2).jpg
//! ```

use crate::imaging::ProcessedOutput;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("there are no processed files to package")]
    Empty,
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A downloadable artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// The only output, unchanged.
    Single { name: String, bytes: Vec<u8> },
    /// A zip of every output.
    Archive {
        name: String,
        bytes: Vec<u8>,
        entries: Vec<String>,
    },
}

impl Artifact {
    pub fn name(&self) -> &str {
        match self {
            Artifact::Single { name, .. } | Artifact::Archive { name, .. } => name,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        match self {
            Artifact::Single { bytes, .. } | Artifact::Archive { bytes, .. } => bytes,
        }
    }

    pub fn is_archive(&self) -> bool {
        matches!(self, Artifact::Archive { .. })
    }

    /// Write the artifact into `dir`, creating it if needed.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, ArchiveError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(self.name());
        std::fs::write(&path, self.bytes())?;
        Ok(path)
    }
}

/// Package `outputs` into a single artifact.
pub fn package(outputs: &[ProcessedOutput], archive_name: &str) -> Result<Artifact, ArchiveError> {
    match outputs {
        [] => Err(ArchiveError::Empty),
        [single] => Ok(Artifact::Single {
            name: single.name.clone(),
            bytes: single.bytes.clone(),
        }),
        many => {
            let entries = entry_names(many);
            let bytes = zip_outputs(many, &entries)?;
            debug!(entries = entries.len(), bytes = bytes.len(), "built archive");
            Ok(Artifact::Archive {
                name: archive_name.to_string(),
                bytes,
                entries,
            })
        }
    }
}

/// Archive entry names for `outputs`, disambiguating duplicates.
pub fn entry_names(outputs: &[ProcessedOutput]) -> Vec<String> {
    let mut used = HashSet::new();
    outputs
        .iter()
        .map(|output| {
            let mut candidate = output.name.clone();
            let mut n = 2;
            while used.contains(&candidate) {
                candidate = numbered(&output.name, n);
                n += 1;
            }
            used.insert(candidate.clone());
            candidate
        })
        .collect()
}

/// `a.jpg` + 2 → `a (2).jpg`; names without an extension get the suffix at the end.
fn numbered(name: &str, n: usize) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem} ({n}).{ext}"),
        _ => format!("{name} ({n})"),
    }
}

fn zip_outputs(outputs: &[ProcessedOutput], entries: &[String]) -> Result<Vec<u8>, ArchiveError> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (output, entry) in outputs.iter().zip(entries) {
        writer.start_file(entry.as_str(), options)?;
        writer.write_all(&output.bytes)?;
    }

    Ok(writer.finish()?.into_inner())
}
