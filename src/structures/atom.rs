// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of the Atom structure and its methods.

use crate::structures::vector3d::Vector3D;

/// Single atom of the molecular system.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    residue_number: usize,
    residue_name: String,
    atom_number: usize,
    atom_name: String,
    chain: Option<char>,
    position: Vector3D,
}

impl Atom {
    /// Create new Atom structure with the specified properties.
    ///
    /// ## Notes
    /// - The atom is positioned at the origin of the coordinate system.
    ///   Use `Atom::with_position` to provide its position.
    /// - Chain is set to `None`. Use `Atom::with_chain` to provide it.
    ///
    /// ## Example
    /// ```
    /// use hbond_occurrence::prelude::*;
    ///
    /// let atom = Atom::new(15, "LYS", 228, "NZ")
    ///     .with_position([1.4, 1.5, 1.7].into())
    ///     .with_chain('A');
    ///
    /// assert_eq!(atom.get_residue_number(), 15);
    /// assert_eq!(atom.get_atom_name(), "NZ");
    /// assert_eq!(atom.get_chain(), Some('A'));
    /// ```
    pub fn new(
        residue_number: usize,
        residue_name: &str,
        atom_number: usize,
        atom_name: &str,
    ) -> Self {
        Atom {
            residue_number,
            residue_name: residue_name.to_string(),
            atom_number,
            atom_name: atom_name.to_string(),
            chain: None,
            position: Vector3D::default(),
        }
    }

    /// Add position to target atom.
    pub fn with_position(mut self, position: Vector3D) -> Self {
        self.position = position;
        self
    }

    /// Add chain information to target atom.
    pub fn with_chain(mut self, chain: char) -> Self {
        self.chain = Some(chain);
        self
    }

    /// Get the number of the residue to which the atom belongs.
    pub fn get_residue_number(&self) -> usize {
        self.residue_number
    }

    /// Get the name of the residue to which the atom belongs.
    pub fn get_residue_name(&self) -> &str {
        &self.residue_name
    }

    /// Get the number of the atom as presented in the structure file.
    pub fn get_atom_number(&self) -> usize {
        self.atom_number
    }

    /// Get the name of the atom.
    pub fn get_atom_name(&self) -> &str {
        &self.atom_name
    }

    /// Get the chain this atom is part of.
    pub fn get_chain(&self) -> Option<char> {
        self.chain
    }

    /// Get the coordinates of the atom (in nm).
    pub fn get_position(&self) -> &Vector3D {
        &self.position
    }

    /// Set the coordinates of the atom (in nm).
    pub fn set_position(&mut self, position: Vector3D) {
        self.position = position;
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
