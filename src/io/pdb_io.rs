// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of functions for reading pdb files as structures and as trajectories.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::marker::PhantomData;
use std::path::Path;

use crate::errors::{ParsePdbError, ReadTrajError};
use crate::io::traj_io::{FrameData, TrajFile, TrajRead, TrajReader};
use crate::structures::{atom::Atom, vector3d::Vector3D};
use crate::system::System;

/// Read a pdb file and construct a `System` structure.
///
/// ## Notes
/// - Only the first model is read; reading stops at the first `END` or `ENDMDL` line.
/// - Coordinates are converted from Å to nm.
/// - The `CRYST1` line is ignored.
pub fn read_pdb(filename: impl AsRef<Path>) -> Result<System, ParsePdbError> {
    let file = File::open(filename.as_ref())
        .map_err(|_| ParsePdbError::FileNotFound(Box::from(filename.as_ref())))?;

    let reader = BufReader::new(file);

    let mut atoms: Vec<Atom> = Vec::new();
    let mut title = "Unknown".to_string();

    for raw_line in reader.lines() {
        let line =
            raw_line.map_err(|_| ParsePdbError::LineNotFound(Box::from(filename.as_ref())))?;

        if is_atom_line(&line) {
            atoms.push(line_as_atom(&line)?);
        } else if line.starts_with("TITLE") {
            title = line_as_title(&line);
        } else if line.starts_with("END") {
            break;
        }
    }

    if atoms.is_empty() {
        return Err(ParsePdbError::NoAtoms(Box::from(filename.as_ref())));
    }

    Ok(System::new(&title, atoms))
}

#[inline]
fn is_atom_line(line: &str) -> bool {
    line.starts_with("ATOM") || line.starts_with("HETATM")
}

fn line_as_title(line: &str) -> String {
    match line.get(5..).map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => "Unknown".to_string(),
    }
}

/// Parse the position of an atom from a pdb atom line and convert it to nm.
fn line_as_position(line: &str) -> Option<Vector3D> {
    let mut position = [0.0f32; 3];
    for (i, item) in position.iter_mut().enumerate() {
        let curr = 30 + i * 8;
        *item = line.get(curr..curr + 8)?.trim().parse::<f32>().ok()? / 10.0;
    }

    Some(position.into())
}

fn line_as_atom(line: &str) -> Result<Atom, ParsePdbError> {
    let error = || ParsePdbError::ParseAtomLineErr(line.to_string());

    if line.len() < 54 || !line.is_ascii() {
        return Err(error());
    }

    let atom_number = line[6..11].trim().parse::<usize>().map_err(|_| error())?;

    let atom_name = line[12..16].trim();
    if atom_name.is_empty() {
        return Err(error());
    }

    let residue_name = line[17..21].trim();
    if residue_name.is_empty() {
        return Err(error());
    }

    let chain = line.chars().nth(21).filter(|x| !x.is_whitespace());

    let residue_number = line[22..26].trim().parse::<usize>().map_err(|_| error())?;

    let position = line_as_position(line).ok_or_else(error)?;

    let atom = Atom::new(residue_number, residue_name, atom_number, atom_name)
        .with_position(position);

    Ok(match chain {
        Some(c) => atom.with_chain(c),
        None => atom,
    })
}

/**************************/
/*      READING PDB       */
/**************************/

/// Reader of multi-model pdb files.
#[derive(Debug)]
pub struct PdbReader<'a> {
    system: *mut System,
    pdb: PdbFile,
    phantom: PhantomData<&'a mut System>,
}

/// Opened pdb trajectory file.
#[derive(Debug)]
pub struct PdbFile {
    buffer: BufReader<File>,
    filename: Box<Path>,
}

impl TrajFile for PdbFile {}

/// Data of a single pdb model.
#[derive(Debug)]
pub struct PdbFrameData {
    positions: Vec<Vector3D>,
}

impl FrameData for PdbFrameData {
    type TrajFile = PdbFile;

    /// Read atoms until `ENDMDL` or `END`. Models containing no atoms are skipped.
    fn from_frame(traj_file: &mut Self::TrajFile, system: &System) -> Option<Result<Self, ReadTrajError>>
    where
        Self: Sized,
    {
        let mut positions = Vec::with_capacity(system.get_n_atoms());
        let mut line = String::new();

        loop {
            line.clear();
            match traj_file.buffer.read_line(&mut line) {
                Ok(0) if positions.is_empty() => return None,
                // file ends inside a model
                Ok(0) => break,
                Ok(_) => (),
                Err(_) => return Some(Err(ReadTrajError::FrameNotFound)),
            }

            if is_atom_line(&line) {
                match line_as_position(&line) {
                    Some(x) => positions.push(x),
                    None => return Some(Err(ReadTrajError::FrameNotFound)),
                }
            } else if line.starts_with("END") && !positions.is_empty() {
                break;
            }
        }

        if positions.len() != system.get_n_atoms() {
            return Some(Err(ReadTrajError::AtomsNumberMismatch(
                traj_file.filename.clone(),
            )));
        }

        Some(Ok(PdbFrameData { positions }))
    }

    fn update_system(self, system: &mut System) {
        for (atom, position) in system.get_atoms_mut().iter_mut().zip(self.positions) {
            atom.set_position(position);
        }
    }
}

impl<'a> TrajRead<'a> for PdbReader<'a> {
    type FrameData = PdbFrameData;

    fn new(system: &'a mut System, filename: impl AsRef<Path>) -> Result<Self, ReadTrajError>
    where
        Self: Sized,
    {
        let file = File::open(&filename)
            .map_err(|_| ReadTrajError::FileNotFound(Box::from(filename.as_ref())))?;

        Ok(PdbReader {
            system: system as *mut System,
            pdb: PdbFile {
                buffer: BufReader::new(file),
                filename: Box::from(filename.as_ref()),
            },
            phantom: PhantomData,
        })
    }

    fn get_system(&mut self) -> *mut System {
        self.system
    }

    fn get_file_handle(
        &mut self,
    ) -> &mut <<Self as TrajRead<'a>>::FrameData as FrameData>::TrajFile {
        &mut self.pdb
    }
}

/// ## Methods for reading pdb trajectories.
impl System {
    /// Create a `PdbReader` structure which is an iterator over the models of a pdb file.
    ///
    /// ## Returns
    /// `TrajReader<PdbReader>` if the pdb file exists and can be opened.
    /// `ReadTrajError::FileNotFound` if the file does not exist.
    ///
    /// ## Notes
    /// - Coordinates are converted from Å to nm.
    /// - Simulation step and time are not available in pdb files and are not modified.
    pub fn pdb_iter(
        &mut self,
        filename: impl AsRef<Path>,
    ) -> Result<TrajReader<PdbReader>, ReadTrajError> {
        Ok(TrajReader::wrap_traj(PdbReader::new(self, filename)?))
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn read_pdb_structure() {
        let system = read_pdb("test_files/hbond.pdb").unwrap();

        assert_eq!(system.get_name(), "Lysine-glutamate salt bridge");
        assert_eq!(system.get_n_atoms(), 6);

        let atom = system.get_atom(3).unwrap();
        assert_eq!(atom.get_residue_number(), 111);
        assert_eq!(atom.get_residue_name(), "GLU");
        assert_eq!(atom.get_atom_number(), 4);
        assert_eq!(atom.get_atom_name(), "CD");
        assert_eq!(atom.get_chain(), Some('A'));
        assert_approx_eq!(f32, atom.get_position().x, 1.4);
        assert_approx_eq!(f32, atom.get_position().y, 1.0);
        assert_approx_eq!(f32, atom.get_position().z, 1.0);
    }

    #[test]
    fn read_pdb_first_model() {
        let system = read_pdb("test_files/hbond_traj.pdb").unwrap();
        assert_eq!(system.get_n_atoms(), 6);
        assert_approx_eq!(f32, system.get_atom(4).unwrap().get_position().x, 1.3);
    }

    #[test]
    fn read_pdb_nonexistent() {
        match read_pdb("test_files/nonexistent.pdb") {
            Err(ParsePdbError::FileNotFound(_)) => (),
            other => panic!("Unexpected result `{:?}`.", other),
        }
    }

    #[test]
    fn read_pdb_no_atoms() {
        match read_pdb("test_files/hbond_empty.pdb") {
            Err(ParsePdbError::NoAtoms(_)) => (),
            other => panic!("Unexpected result `{:?}`.", other),
        }
    }

    #[test]
    fn atom_line() {
        let line = "ATOM      5  OE1 GLU B 111      13.000  10.000  -5.000  1.00  0.00           O";
        let atom = line_as_atom(line).unwrap();

        assert_eq!(atom.get_atom_number(), 5);
        assert_eq!(atom.get_atom_name(), "OE1");
        assert_eq!(atom.get_residue_name(), "GLU");
        assert_eq!(atom.get_chain(), Some('B'));
        assert_eq!(atom.get_residue_number(), 111);
        assert_approx_eq!(f32, atom.get_position().x, 1.3);
        assert_approx_eq!(f32, atom.get_position().y, 1.0);
        assert_approx_eq!(f32, atom.get_position().z, -0.5);
    }

    #[test]
    fn atom_line_no_chain() {
        let line = "HETATM    5  OE1 GLU   111      13.000  10.000  -5.000  1.00  0.00           O";
        let atom = line_as_atom(line).unwrap();
        assert_eq!(atom.get_chain(), None);
    }

    #[test]
    fn atom_line_invalid() {
        assert!(line_as_atom("ATOM      5  OE1 GLU B 111      13.000  10.000").is_err());
        assert!(line_as_atom(
            "ATOM      5  OE1 GLU B 11x      13.000  10.000  -5.000  1.00  0.00           O"
        )
        .is_err());
    }

    #[test]
    fn title_line() {
        assert_eq!(line_as_title("TITLE     Salt bridge"), "Salt bridge");
        assert_eq!(line_as_title("TITLE"), "Unknown");
    }

    #[test]
    fn pdb_iter() {
        let mut system = System::from_file("test_files/hbond.pdb").unwrap();

        let expected_oe1_x = [1.3, 1.5, 1.3];
        let expected_cd = [[1.4, 1.0], [1.6, 1.0], [1.2, 1.05]];

        let mut n_frames = 0;
        for (i, raw_frame) in system.pdb_iter("test_files/hbond_traj.pdb").unwrap().enumerate() {
            let frame = raw_frame.unwrap();
            let oe1 = frame.get_atom(4).unwrap().get_position();
            let cd = frame.get_atom(3).unwrap().get_position();

            assert_approx_eq!(f32, oe1.x, expected_oe1_x[i]);
            assert_approx_eq!(f32, cd.x, expected_cd[i][0]);
            assert_approx_eq!(f32, cd.y, expected_cd[i][1]);
            n_frames += 1;
        }

        assert_eq!(n_frames, 3);
    }

    #[test]
    fn pdb_iter_mismatch() {
        let mut system = System::from_file("test_files/hbond.pdb").unwrap();

        let mut iterator = system.pdb_iter("test_files/hbond_traj_mismatch.pdb").unwrap();
        assert!(iterator.next().unwrap().is_ok());
        match iterator.next() {
            Some(Err(ReadTrajError::AtomsNumberMismatch(_))) => (),
            other => panic!("Unexpected result `{:?}`.", other.map(|r| r.map(|_| ()))),
        }
        assert!(iterator.next().is_none());
    }
}
