//! Save/Load of builds.
//!
//! Uses bincode for a small binary file holding a label and the active
//! nodes. Share codes cover the URL case; save files let a host keep named
//! builds around.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::node::{ActiveSet, NodeId};

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// A named build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSnapshot {
    pub label: String,
    pub nodes: Vec<NodeId>,
}

impl BuildSnapshot {
    pub fn new(label: impl Into<String>, active: &ActiveSet) -> Self {
        Self {
            label: label.into(),
            nodes: active.iter().collect(),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct SaveData {
    version: u32,
    build: BuildSnapshot,
}

/// Errors that can occur during save/load
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Bincode(#[from] Box<bincode::ErrorKind>),
    #[error("Save version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Write a build to a writer.
pub fn save_build<W: Write>(writer: W, build: &BuildSnapshot) -> Result<(), SaveError> {
    let data = SaveData {
        version: SAVE_VERSION,
        build: build.clone(),
    };
    bincode::serialize_into(writer, &data)?;
    Ok(())
}

/// Read a build from a reader.
///
/// Node ids are checked against the tree shape by the builder on restore,
/// not here.
pub fn load_build<R: Read>(reader: R) -> Result<BuildSnapshot, SaveError> {
    let data: SaveData = bincode::deserialize_from(reader)?;

    if data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: data.version,
        });
    }

    Ok(data.build)
}
