// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of functions for reading binary dcd trajectories (CHARMM, NAMD, OpenMM).
//!
//! A dcd file consists of Fortran unformatted records, each enclosed by
//! two markers holding the length of the record in bytes. The byte order of the file
//! is detected from the first marker which must be equal to 84.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::marker::PhantomData;
use std::path::Path;

use crate::errors::ReadTrajError;
use crate::io::traj_io::{FrameData, TrajFile, TrajRead, TrajReader};
use crate::structures::vector3d::Vector3D;
use crate::system::System;

/// AKMA time unit in picoseconds.
const AKMA_TIME_PS: f32 = 0.048_888_21;

/// Length of the first record of a dcd file.
const HEADER_RECORD_LENGTH: u32 = 84;

/// Length of the unit cell record (six doubles).
const UNIT_CELL_RECORD_LENGTH: u32 = 48;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endianness {
    Little,
    Big,
}

/// Reader of dcd trajectory files.
#[derive(Debug)]
pub struct DcdReader<'a> {
    system: *mut System,
    dcd: DcdFile,
    phantom: PhantomData<&'a mut System>,
}

/// Opened dcd trajectory file with its parsed header.
#[derive(Debug)]
pub struct DcdFile {
    buffer: BufReader<File>,
    filename: Box<Path>,
    endianness: Endianness,
    /// Number of atoms in each frame.
    n_atoms: usize,
    /// Number of frames declared in the header. Not trusted while reading.
    n_frames_header: usize,
    /// Simulation step of the first frame.
    first_step: u64,
    /// Number of simulation steps between frames.
    step_interval: u64,
    /// Integration time step in AKMA units.
    delta: f32,
    has_unit_cell: bool,
    has_fourth_dimension: bool,
    /// Index of the next frame to read.
    frame: u64,
}

impl TrajFile for DcdFile {}

/// Data of a single dcd frame.
#[derive(Debug)]
pub struct DcdFrameData {
    step: u64,
    time: f32,
    positions: Vec<Vector3D>,
}

/// Outcome of trying to fill a buffer from the file.
enum ReadStatus {
    Complete,
    /// Nothing could be read because the file ended.
    Eof,
    /// The file ended in the middle of the buffer.
    Partial,
}

impl DcdFile {
    /// Open a dcd file and parse its header.
    fn open(filename: impl AsRef<Path>) -> Result<Self, ReadTrajError> {
        let path: Box<Path> = Box::from(filename.as_ref());
        let invalid = || ReadTrajError::InvalidDcdHeader(path.clone());

        let file = File::open(&path).map_err(|_| ReadTrajError::FileNotFound(path.clone()))?;
        let mut buffer = BufReader::new(file);

        // first marker decides the byte order
        let mut marker = [0u8; 4];
        buffer.read_exact(&mut marker).map_err(|_| invalid())?;
        let endianness = if u32::from_le_bytes(marker) == HEADER_RECORD_LENGTH {
            Endianness::Little
        } else if u32::from_be_bytes(marker) == HEADER_RECORD_LENGTH {
            Endianness::Big
        } else {
            return Err(invalid());
        };

        let mut header = [0u8; HEADER_RECORD_LENGTH as usize];
        buffer.read_exact(&mut header).map_err(|_| invalid())?;

        if &header[0..4] != b"CORD" {
            return Err(invalid());
        }

        let int_at = |offset: usize| -> i32 {
            let bytes = [
                header[offset],
                header[offset + 1],
                header[offset + 2],
                header[offset + 3],
            ];
            match endianness {
                Endianness::Little => i32::from_le_bytes(bytes),
                Endianness::Big => i32::from_be_bytes(bytes),
            }
        };

        // control integers start after the magic string
        let icntrl = |index: usize| int_at(4 + 4 * index);

        let n_frames_header = icntrl(0);
        let first_step = icntrl(1);
        let step_interval = icntrl(2);
        let n_fixed = icntrl(8);
        let delta = f32::from_bits(icntrl(9) as u32);
        let charmm_version = icntrl(19);

        if n_fixed != 0 {
            return Err(ReadTrajError::DcdFixedAtoms(path.clone()));
        }

        // X-PLOR files (version 0) never contain unit cells or the fourth dimension
        let has_unit_cell = charmm_version != 0 && icntrl(10) == 1;
        let has_fourth_dimension = charmm_version != 0 && icntrl(11) == 1;

        let mut dcd = DcdFile {
            buffer,
            filename: path.clone(),
            endianness,
            n_atoms: 0,
            n_frames_header: n_frames_header.max(0) as usize,
            first_step: first_step.max(0) as u64,
            step_interval: step_interval.max(0) as u64,
            delta,
            has_unit_cell,
            has_fourth_dimension,
            frame: 0,
        };

        if dcd.read_marker().map_err(|_| invalid())? != HEADER_RECORD_LENGTH {
            return Err(invalid());
        }

        // title record
        let title_length = dcd.read_marker().map_err(|_| invalid())?;
        dcd.skip(title_length as u64).map_err(|_| invalid())?;
        if dcd.read_marker().map_err(|_| invalid())? != title_length {
            return Err(invalid());
        }

        // number of atoms record
        let natom_record = dcd.read_record(4).map_err(|_| invalid())?;
        let n_atoms = dcd.int_from_bytes(&natom_record);
        if n_atoms <= 0 {
            return Err(invalid());
        }
        dcd.n_atoms = n_atoms as usize;

        Ok(dcd)
    }

    fn int_from_bytes(&self, bytes: &[u8]) -> i32 {
        let array = [bytes[0], bytes[1], bytes[2], bytes[3]];
        match self.endianness {
            Endianness::Little => i32::from_le_bytes(array),
            Endianness::Big => i32::from_be_bytes(array),
        }
    }

    fn float_from_bytes(&self, bytes: &[u8]) -> f32 {
        let array = [bytes[0], bytes[1], bytes[2], bytes[3]];
        match self.endianness {
            Endianness::Little => f32::from_le_bytes(array),
            Endianness::Big => f32::from_be_bytes(array),
        }
    }

    /// Try to completely fill the buffer.
    fn fill(&mut self, buf: &mut [u8]) -> Result<ReadStatus, ReadTrajError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.buffer.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(_) => return Err(ReadTrajError::FrameNotFound),
            }
        }

        Ok(match filled {
            0 if !buf.is_empty() => ReadStatus::Eof,
            n if n == buf.len() => ReadStatus::Complete,
            _ => ReadStatus::Partial,
        })
    }

    fn read_marker(&mut self) -> Result<u32, ReadTrajError> {
        let mut marker = [0u8; 4];
        match self.fill(&mut marker)? {
            ReadStatus::Complete => Ok(self.int_from_bytes(&marker) as u32),
            _ => Err(ReadTrajError::FrameNotFound),
        }
    }

    fn skip(&mut self, n_bytes: u64) -> Result<(), ReadTrajError> {
        let skipped = std::io::copy(
            &mut (&mut self.buffer).take(n_bytes),
            &mut std::io::sink(),
        )
        .map_err(|_| ReadTrajError::FrameNotFound)?;

        if skipped != n_bytes {
            return Err(ReadTrajError::FrameNotFound);
        }

        Ok(())
    }

    /// Read the body and the closing marker of a record whose opening marker has already been read.
    fn read_record_body(&mut self, length: u32) -> Result<Vec<u8>, ReadTrajError> {
        let mut body = vec![0u8; length as usize];
        match self.fill(&mut body)? {
            ReadStatus::Complete => (),
            _ => return Err(ReadTrajError::FrameNotFound),
        }

        if self.read_marker()? != length {
            return Err(ReadTrajError::FrameNotFound);
        }

        Ok(body)
    }

    /// Read a complete record with the expected length.
    fn read_record(&mut self, expected_length: u32) -> Result<Vec<u8>, ReadTrajError> {
        if self.read_marker()? != expected_length {
            return Err(ReadTrajError::FrameNotFound);
        }

        self.read_record_body(expected_length)
    }

    /// Read a record of coordinates and convert them from Å to nm.
    fn read_coordinates(&mut self, length: u32) -> Result<Vec<f32>, ReadTrajError> {
        let body = self.read_record_body(length)?;

        Ok(body
            .chunks_exact(4)
            .map(|chunk| self.float_from_bytes(chunk) / 10.0)
            .collect())
    }

    /// Read the opening marker of a coordinate record and check the number of atoms.
    fn read_coordinate_marker(&mut self) -> Result<u32, ReadTrajError> {
        let length = self.read_marker()?;
        self.check_coordinate_length(length)?;
        Ok(length)
    }

    fn check_coordinate_length(&self, length: u32) -> Result<(), ReadTrajError> {
        if length as usize != 4 * self.n_atoms {
            if length % 4 == 0 {
                return Err(ReadTrajError::AtomsNumberMismatch(self.filename.clone()));
            } else {
                return Err(ReadTrajError::FrameNotFound);
            }
        }

        Ok(())
    }
}

impl FrameData for DcdFrameData {
    type TrajFile = DcdFile;

    /// Read the next frame. The number of frames declared in the header is ignored
    /// and the file is read until it ends.
    fn from_frame(traj_file: &mut Self::TrajFile, system: &System) -> Option<Result<Self, ReadTrajError>>
    where
        Self: Sized,
    {
        if traj_file.n_atoms != system.get_n_atoms() {
            return Some(Err(ReadTrajError::AtomsNumberMismatch(
                traj_file.filename.clone(),
            )));
        }

        // the first marker of a frame decides whether the file has ended cleanly
        let mut marker = [0u8; 4];
        match traj_file.fill(&mut marker) {
            Ok(ReadStatus::Eof) => return None,
            Ok(ReadStatus::Partial) => return Some(Err(ReadTrajError::FrameNotFound)),
            Ok(ReadStatus::Complete) => (),
            Err(e) => return Some(Err(e)),
        }
        let first_length = traj_file.int_from_bytes(&marker) as u32;

        Some(read_frame_body(traj_file, first_length))
    }

    fn update_system(self, system: &mut System) {
        for (atom, position) in system.get_atoms_mut().iter_mut().zip(self.positions) {
            atom.set_position(position);
        }

        system.set_simulation_step(self.step);
        system.set_simulation_time(self.time);
    }
}

/// Read the rest of a frame after its first marker has been read.
fn read_frame_body(traj_file: &mut DcdFile, first_length: u32) -> Result<DcdFrameData, ReadTrajError> {
    // unit cell is read and discarded
    let x_length = if traj_file.has_unit_cell {
        if first_length != UNIT_CELL_RECORD_LENGTH {
            return Err(ReadTrajError::FrameNotFound);
        }
        traj_file.read_record_body(UNIT_CELL_RECORD_LENGTH)?;
        traj_file.read_coordinate_marker()?
    } else {
        traj_file.check_coordinate_length(first_length)?;
        first_length
    };

    let x = traj_file.read_coordinates(x_length)?;
    let y_length = traj_file.read_coordinate_marker()?;
    let y = traj_file.read_coordinates(y_length)?;
    let z_length = traj_file.read_coordinate_marker()?;
    let z = traj_file.read_coordinates(z_length)?;

    if traj_file.has_fourth_dimension {
        let length = traj_file.read_marker()?;
        traj_file.read_record_body(length)?;
    }

    let positions = x
        .into_iter()
        .zip(y)
        .zip(z)
        .map(|((x, y), z)| Vector3D::new(x, y, z))
        .collect();

    let step = traj_file.first_step + traj_file.frame * traj_file.step_interval;
    let time = step as f32 * traj_file.delta * AKMA_TIME_PS;
    traj_file.frame += 1;

    Ok(DcdFrameData {
        step,
        time,
        positions,
    })
}

impl<'a> TrajRead<'a> for DcdReader<'a> {
    type FrameData = DcdFrameData;

    fn new(system: &'a mut System, filename: impl AsRef<Path>) -> Result<Self, ReadTrajError>
    where
        Self: Sized,
    {
        Ok(DcdReader {
            system: system as *mut System,
            dcd: DcdFile::open(filename)?,
            phantom: PhantomData,
        })
    }

    fn get_system(&mut self) -> *mut System {
        self.system
    }

    fn get_file_handle(
        &mut self,
    ) -> &mut <<Self as TrajRead<'a>>::FrameData as FrameData>::TrajFile {
        &mut self.dcd
    }
}

impl<'a> DcdReader<'a> {
    /// Number of atoms declared in the header of the dcd file.
    pub fn get_n_atoms(&self) -> usize {
        self.dcd.n_atoms
    }

    /// Number of frames declared in the header of the dcd file.
    /// This number is unreliable for trajectories that were not closed properly.
    pub fn get_n_frames_header(&self) -> usize {
        self.dcd.n_frames_header
    }
}

/// ## Methods for reading dcd trajectories.
impl System {
    /// Create a `DcdReader` structure which is an iterator over a dcd file.
    ///
    /// ## Returns
    /// `TrajReader<DcdReader>` if the dcd file exists and has a valid header.
    /// `ReadTrajError` if the file does not exist, has an invalid header or contains fixed atoms.
    ///
    /// ## Example
    /// ```no_run
    /// use hbond_occurrence::prelude::*;
    ///
    /// let mut system = System::from_file("topology.pdb").unwrap();
    ///
    /// for raw_frame in system.dcd_iter("trajectory.dcd").unwrap() {
    ///     let frame = raw_frame.unwrap();
    ///     println!("{:?}", frame.get_atom(0).map(|atom| atom.get_position()));
    /// }
    /// ```
    ///
    /// ## Notes
    /// - Coordinates are converted from Å to nm.
    /// - Unit cell information is read and discarded.
    /// - Simulation time is calculated from the integration time step stored in the header.
    pub fn dcd_iter(
        &mut self,
        filename: impl AsRef<Path>,
    ) -> Result<TrajReader<DcdReader>, ReadTrajError> {
        Ok(TrajReader::wrap_traj(DcdReader::new(self, filename)?))
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
