// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Identification of supported file types.

use std::path::Path;

/// Types of files supported by `hbond_occurrence`.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum FileType {
    Unknown,
    GRO,
    PDB,
    DCD,
}

impl FileType {
    /// Identify file type from the name of the file (based on file extension).
    /// The extension is matched case-insensitively.
    pub fn from_name(filename: impl AsRef<Path>) -> FileType {
        let extension = match filename.as_ref().extension().and_then(|x| x.to_str()) {
            Some(x) => x.to_ascii_lowercase(),
            None => return FileType::Unknown,
        };

        match extension.as_str() {
            "gro" => FileType::GRO,
            "pdb" => FileType::PDB,
            "dcd" => FileType::DCD,
            _ => FileType::Unknown,
        }
    }

    /// Returns `true` if a `System` structure can be constructed from this file type.
    pub fn is_structure(&self) -> bool {
        matches!(self, FileType::GRO | FileType::PDB)
    }
}
