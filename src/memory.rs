//! Persistent record of surfaced opportunities.
//!
//! A single JSON file, written atomically (tmp file + rename) so a crashed
//! run never leaves a half-written memory behind.

use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::deals::types::Opportunity;

pub struct OpportunityMemory {
    path: PathBuf,
    entries: Vec<Opportunity>,
}

impl OpportunityMemory {
    /// Load from `path`; a missing file starts an empty memory.
    pub fn load(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(s) => serde_json::from_str(&s)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e),
        };
        Ok(Self { path, entries })
    }

    pub fn entries(&self) -> &[Opportunity] {
        &self.entries
    }

    /// URLs of every deal already surfaced; used to skip rescans.
    pub fn seen_urls(&self) -> HashSet<String> {
        self.entries
            .iter()
            .map(|o| o.deal.url.clone())
            .collect()
    }

    /// Append and persist. The in-memory list is only extended after the
    /// file write succeeded.
    pub fn record(&mut self, new: &[Opportunity]) -> io::Result<()> {
        if new.is_empty() {
            return Ok(());
        }
        let mut next = self.entries.clone();
        next.extend(new.iter().cloned());
        write_atomic(&self.path, &next)?;
        self.entries = next;
        Ok(())
    }
}

fn write_atomic(path: &Path, entries: &[Opportunity]) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(entries)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    let mut f = fs::File::create(&tmp)?;
    f.write_all(json.as_bytes())?;
    fs::rename(tmp, path)?;
    Ok(())
}
