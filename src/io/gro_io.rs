// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of functions for reading gro files as structures and as trajectories.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::marker::PhantomData;
use std::path::Path;
use std::str::FromStr;

use regex::Regex;

use crate::errors::{ParseGroError, ReadTrajError};
use crate::io::traj_io::{FrameData, TrajFile, TrajRead, TrajReader};
use crate::structures::{atom::Atom, vector3d::Vector3D};
use crate::system::System;

/// Read a gro file and construct a `System` structure.
///
/// Only the first frame is read. The box line is parsed and discarded.
///
/// ## Example
/// ```no_run
/// use hbond_occurrence::io::gro_io;
///
/// let system = match gro_io::read_gro("system.gro") {
///     Ok(x) => x,
///     Err(e) => {
///         eprintln!("{}", e);
///         return;
///     }
/// };
/// ```
pub fn read_gro(filename: impl AsRef<Path>) -> Result<System, ParseGroError> {
    let file = File::open(filename.as_ref())
        .map_err(|_| ParseGroError::FileNotFound(Box::from(filename.as_ref())))?;

    let mut buffer = BufReader::new(file);

    let title = get_title(&mut buffer, filename.as_ref())?;
    let n_atoms = get_natoms(&mut buffer, filename.as_ref())?;

    let mut atoms: Vec<Atom> = Vec::with_capacity(n_atoms);
    let mut lines = buffer.lines();

    for _ in 0..n_atoms {
        let line = match lines.next() {
            Some(Ok(x)) => x,
            _ => return Err(ParseGroError::LineNotFound(Box::from(filename.as_ref()))),
        };

        atoms.push(line_as_atom(&line)?);
    }

    match lines.next() {
        Some(Ok(line)) => line_as_box(&line)?,
        _ => return Err(ParseGroError::LineNotFound(Box::from(filename.as_ref()))),
    }

    Ok(System::new(&title, atoms))
}

fn get_title(
    buffer: &mut BufReader<File>,
    filename: impl AsRef<Path>,
) -> Result<String, ParseGroError> {
    let mut title = String::new();
    match buffer.read_line(&mut title) {
        Ok(0) | Err(_) => Err(ParseGroError::LineNotFound(Box::from(filename.as_ref()))),
        Ok(_) => Ok(title.trim().to_string()),
    }
}

fn get_natoms(
    buffer: &mut BufReader<File>,
    filename: impl AsRef<Path>,
) -> Result<usize, ParseGroError> {
    let mut line = String::new();
    match buffer.read_line(&mut line) {
        Ok(0) | Err(_) => Err(ParseGroError::LineNotFound(Box::from(filename.as_ref()))),
        Ok(_) => line
            .trim()
            .parse::<usize>()
            .map_err(|_| ParseGroError::ParseLineErr(line.trim().to_string())),
    }
}

/// Parse the position of an atom from a gro atom line.
fn line_as_position(line: &str) -> Option<Vector3D> {
    let mut position = [0.0f32; 3];
    for (i, item) in position.iter_mut().enumerate() {
        let curr = 20 + i * 8;
        *item = line.get(curr..curr + 8)?.trim().parse::<f32>().ok()?;
    }

    Some(position.into())
}

fn line_as_atom(line: &str) -> Result<Atom, ParseGroError> {
    let error = || ParseGroError::ParseAtomLineErr(line.to_string());

    if line.len() < 44 || !line.is_ascii() {
        return Err(error());
    }

    let resid = line[0..5].trim().parse::<usize>().map_err(|_| error())?;

    let resname = line[5..10].trim();
    if resname.is_empty() {
        return Err(error());
    }

    let atomname = line[10..15].trim();
    if atomname.is_empty() {
        return Err(error());
    }

    let atomid = line[15..20].trim().parse::<usize>().map_err(|_| error())?;

    let position = line_as_position(line).ok_or_else(error)?;

    Ok(Atom::new(resid, resname, atomid, atomname).with_position(position))
}

/// Check that the line contains valid box dimensions (3 or 9 numbers). The box is not stored.
fn line_as_box(line: &str) -> Result<(), ParseGroError> {
    let mut n_items = 0usize;
    for split in line.split_whitespace() {
        split
            .parse::<f32>()
            .map_err(|_| ParseGroError::ParseBoxLineErr(line.to_string()))?;
        n_items += 1;
    }

    if n_items != 3 && n_items != 9 {
        return Err(ParseGroError::ParseBoxLineErr(line.to_string()));
    }

    Ok(())
}

/**************************/
/*      READING GRO       */
/**************************/

/// Reader of multi-frame gro files.
#[derive(Debug)]
pub struct GroReader<'a> {
    system: *mut System,
    gro: GroFile,
    phantom: PhantomData<&'a mut System>,
}

/// Opened gro trajectory file.
#[derive(Debug)]
pub struct GroFile {
    buffer: BufReader<File>,
    filename: Box<Path>,
}

impl TrajFile for GroFile {}

/// Data of a single gro frame.
#[derive(Debug)]
pub struct GroFrameData {
    time: Option<f32>,
    step: Option<u64>,
    positions: Vec<Vector3D>,
}

/// Extract simulation time and step from the title of a gro frame.
/// Expects the format written by `gmx trjconv`: `... t= 10.00000 step= 5000`.
fn extract_time_step(string: &str) -> Option<(f32, u64)> {
    let re = Regex::new(r"t=\s*([\d\.\-]+)\s+step=\s*(\d+)").expect(
        "FATAL HBOND ERROR | gro_io::extract_time_step | Could not construct regular expression.",
    );

    let caps = re.captures(string)?;
    let time = f32::from_str(caps.get(1)?.as_str()).ok()?;
    let step = u64::from_str(caps.get(2)?.as_str()).ok()?;

    Some((time, step))
}

impl GroFile {
    fn read_line(&mut self) -> Result<String, ReadTrajError> {
        let mut line = String::new();
        match self.buffer.read_line(&mut line) {
            Ok(0) | Err(_) => Err(ReadTrajError::FrameNotFound),
            Ok(_) => Ok(line),
        }
    }
}

impl FrameData for GroFrameData {
    type TrajFile = GroFile;

    fn from_frame(traj_file: &mut Self::TrajFile, system: &System) -> Option<Result<Self, ReadTrajError>>
    where
        Self: Sized,
    {
        // read title; end of file at this point is a clean end of the trajectory
        let mut title = String::new();
        match traj_file.buffer.read_line(&mut title) {
            Ok(0) => return None,
            Ok(_) => (),
            Err(_) => return Some(Err(ReadTrajError::FrameNotFound)),
        }

        let (time, step) = match extract_time_step(&title) {
            Some((x, y)) => (Some(x), Some(y)),
            None => (None, None),
        };

        let n_atoms = match get_natoms(&mut traj_file.buffer, traj_file.filename.clone()) {
            Ok(x) => x,
            Err(_) => return Some(Err(ReadTrajError::FrameNotFound)),
        };

        if n_atoms != system.get_n_atoms() {
            return Some(Err(ReadTrajError::AtomsNumberMismatch(
                traj_file.filename.clone(),
            )));
        }

        let mut positions = Vec::with_capacity(n_atoms);
        for _ in 0..n_atoms {
            let line = match traj_file.read_line() {
                Ok(x) => x,
                Err(e) => return Some(Err(e)),
            };

            match line_as_position(&line) {
                Some(x) => positions.push(x),
                None => return Some(Err(ReadTrajError::FrameNotFound)),
            }
        }

        let box_line = match traj_file.read_line() {
            Ok(x) => x,
            Err(e) => return Some(Err(e)),
        };

        if line_as_box(&box_line).is_err() {
            return Some(Err(ReadTrajError::FrameNotFound));
        }

        Some(Ok(GroFrameData {
            time,
            step,
            positions,
        }))
    }

    fn update_system(self, system: &mut System) {
        for (atom, position) in system.get_atoms_mut().iter_mut().zip(self.positions) {
            atom.set_position(position);
        }

        if let Some(x) = self.step {
            system.set_simulation_step(x);
        }

        if let Some(x) = self.time {
            system.set_simulation_time(x);
        }
    }
}

impl<'a> TrajRead<'a> for GroReader<'a> {
    type FrameData = GroFrameData;

    fn new(system: &'a mut System, filename: impl AsRef<Path>) -> Result<Self, ReadTrajError>
    where
        Self: Sized,
    {
        let file = File::open(&filename)
            .map_err(|_| ReadTrajError::FileNotFound(Box::from(filename.as_ref())))?;

        Ok(GroReader {
            system: system as *mut System,
            gro: GroFile {
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
        &mut self.gro
    }
}

/// ## Methods for reading gro trajectories.
impl System {
    /// Create a `GroReader` structure which is an iterator over a multi-frame gro file.
    ///
    /// ## Returns
    /// `TrajReader<GroReader>` if the gro file exists and can be opened.
    /// `ReadTrajError::FileNotFound` if the file does not exist.
    ///
    /// ## Example
    /// ```no_run
    /// use hbond_occurrence::prelude::*;
    ///
    /// let mut system = System::from_file("system.gro").unwrap();
    ///
    /// for raw_frame in system.gro_iter("trajectory.gro").unwrap() {
    ///     let frame = raw_frame.unwrap();
    ///     println!("{}", frame.get_simulation_time());
    /// }
    /// ```
    ///
    /// ## Notes
    /// - Simulation time and step are read from the title of each frame, if present.
    /// - Box dimensions are read and discarded.
    pub fn gro_iter(
        &mut self,
        filename: impl AsRef<Path>,
    ) -> Result<TrajReader<GroReader>, ReadTrajError> {
        Ok(TrajReader::wrap_traj(GroReader::new(self, filename)?))
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
