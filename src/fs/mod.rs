// src/fs/mod.rs

//! Filesystem access used by the controller and the completion monitor.

use std::fmt::Debug;
use std::path::Path;

use anyhow::{Context, Result};

pub mod mock;

/// The two questions the engine asks of the disk: is this a usable working
/// directory, and what does the output artifact say right now.
pub trait FileSystem: Send + Sync + Debug {
    /// Read a text file. Invalid UTF-8 is replaced, never an error.
    fn read_text(&self, path: &Path) -> Result<String>;
    fn is_dir(&self, path: &Path) -> bool;
}

/// Implementation backed by `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_text(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path).with_context(|| format!("reading artifact {:?}", path))?;
        Ok(decode_lossy(bytes))
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

/// Decode command output, substituting U+FFFD for invalid sequences.
pub fn decode_lossy(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
    }
}
