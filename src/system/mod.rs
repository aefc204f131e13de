// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of the System structure and its methods.

use std::error::Error;
use std::path::Path;

use crate::errors::{ParseFileError, SelectError};
use crate::files::FileType;
use crate::io::{gro_io, pdb_io};
use crate::select::{AmbiguityPolicy, Select};
use crate::structures::atom::Atom;

/// Molecular system: topology and coordinates of the current frame.
#[derive(Debug, Clone)]
pub struct System {
    /// Name of the molecular system.
    name: String,
    /// Vector of atoms in the system.
    atoms: Vec<Atom>,
    /// Current simulation step.
    simulation_step: u64,
    /// Current simulation time in picoseconds.
    simulation_time: f32,
}

/// ## Methods for creating `System` structures and accessing their properties.
impl System {
    /// Create new System structure with a given name from the provided vector of atoms.
    ///
    /// ## Example
    /// ```
    /// use hbond_occurrence::prelude::*;
    ///
    /// let atoms = vec![
    ///     Atom::new(15, "LYS", 228, "NZ").with_position([1.0, 1.0, 1.0].into()),
    ///     Atom::new(15, "LYS", 229, "HZ1").with_position([1.1, 1.0, 1.0].into()),
    /// ];
    ///
    /// let system = System::new("Lysine", atoms);
    /// assert_eq!(system.get_n_atoms(), 2);
    /// ```
    pub fn new(name: &str, atoms: Vec<Atom>) -> Self {
        System {
            name: name.to_string(),
            atoms,
            simulation_step: 0,
            simulation_time: 0.0,
        }
    }

    /// Create new System structure from a gro or pdb file.
    /// The type of the file is recognized based on its extension.
    ///
    /// ## Returns
    /// `System` if the file was successfully read.
    /// `ParseFileError` if the file format is not supported.
    /// `ParseGroError` or `ParsePdbError` if the file could not be read.
    ///
    /// ## Example
    /// ```no_run
    /// use hbond_occurrence::prelude::*;
    ///
    /// let system = match System::from_file("system.gro") {
    ///     Ok(x) => x,
    ///     Err(e) => {
    ///         eprintln!("{}", e);
    ///         return;
    ///     }
    /// };
    /// ```
    ///
    /// ## Notes
    /// - Box dimensions present in the file are read and discarded.
    pub fn from_file(filename: impl AsRef<Path>) -> Result<Self, Box<dyn Error + Send + Sync>> {
        match FileType::from_name(&filename) {
            FileType::GRO => gro_io::read_gro(filename).map_err(Box::from),
            FileType::PDB => pdb_io::read_pdb(filename).map_err(Box::from),
            FileType::Unknown => Err(Box::from(ParseFileError::UnknownExtension(Box::from(
                filename.as_ref(),
            )))),
            other => Err(Box::from(ParseFileError::UnsupportedFileType(other))),
        }
    }

    /// Get the name of the molecular system.
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Get immutable reference to the atoms in the system.
    pub fn get_atoms(&self) -> &[Atom] {
        &self.atoms
    }

    /// Get mutable reference to the atoms in the system.
    pub fn get_atoms_mut(&mut self) -> &mut [Atom] {
        &mut self.atoms
    }

    /// Get atom with the given index (0-based). Returns `None` if the atom does not exist.
    pub fn get_atom(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    /// Get the number of atoms in the system.
    pub fn get_n_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// Get the current simulation step.
    pub fn get_simulation_step(&self) -> u64 {
        self.simulation_step
    }

    /// Get the current simulation time in picoseconds.
    pub fn get_simulation_time(&self) -> f32 {
        self.simulation_time
    }

    /// Set the simulation step.
    pub fn set_simulation_step(&mut self, step: u64) {
        self.simulation_step = step;
    }

    /// Set the simulation time (in ps).
    pub fn set_simulation_time(&mut self, time: f32) {
        self.simulation_time = time;
    }
}

/// ## Methods for selecting atoms.
impl System {
    /// Get indices of all atoms matching the query. Indices are sorted in ascending order.
    ///
    /// ## Example
    /// ```no_run
    /// use hbond_occurrence::prelude::*;
    ///
    /// let system = System::from_file("system.pdb").unwrap();
    /// let oxygens = system.select_atoms("resid 111 and name r'^OE'").unwrap();
    /// ```
    pub fn select_atoms(&self, query: &str) -> Result<Vec<usize>, SelectError> {
        let select = Select::parse_query(query)?;

        Ok(self
            .atoms
            .iter()
            .enumerate()
            .filter(|(index, atom)| select.matches(atom, *index))
            .map(|(index, _)| index)
            .collect())
    }

    /// Get index of the single atom matching the query.
    ///
    /// ## Returns
    /// - Index of the matching atom.
    /// - `SelectError::NoMatch` if no atom matches the query.
    /// - `SelectError::Ambiguous` if several atoms match the query and the policy is `AmbiguityPolicy::Error`.
    ///
    /// ## Notes
    /// - With `AmbiguityPolicy::First`, a warning is printed to standard error output
    ///   and the first matching atom is used.
    pub fn select_single_atom(
        &self,
        query: &str,
        policy: AmbiguityPolicy,
    ) -> Result<usize, SelectError> {
        let indices = self.select_atoms(query)?;

        match (indices.as_slice(), policy) {
            ([], _) => Err(SelectError::NoMatch(query.to_string())),
            ([index], _) => Ok(*index),
            (_, AmbiguityPolicy::Error) => {
                Err(SelectError::Ambiguous(query.to_string(), indices.len()))
            }
            ([first, ..], AmbiguityPolicy::First) => {
                eprintln!(
                    "{}",
                    SelectError::AmbiguousWarning(query.to_string(), indices.len())
                );
                Ok(*first)
            }
        }
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
