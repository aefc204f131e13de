// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Aggregation of per-frame hydrogen bond states and writing of the occurrence report.

use std::fmt;
use std::io::{BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::errors::OccurrenceError;

/// State of the hydrogen bond in a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameState {
    /// All criteria are satisfied.
    Bonded,
    /// At least one criterion is not satisfied.
    NotBonded,
    /// Geometry of the frame is undefined (two atoms share the same position).
    Undefined,
}

impl From<bool> for FrameState {
    #[inline]
    fn from(value: bool) -> Self {
        if value {
            FrameState::Bonded
        } else {
            FrameState::NotBonded
        }
    }
}

impl fmt::Display for FrameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameState::Bonded => write!(f, "1"),
            FrameState::NotBonded => write!(f, "0"),
            FrameState::Undefined => write!(f, "NA"),
        }
    }
}

/// Ordered sequence of hydrogen bond states, one per trajectory frame.
/// Always contains at least one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccurrenceSeries {
    states: Vec<FrameState>,
}

impl OccurrenceSeries {
    /// Create a new series from per-frame states.
    ///
    /// ## Returns
    /// - `OccurrenceSeries` if at least one state is provided.
    /// - `OccurrenceError::EmptyTrajectory` if `states` is empty.
    pub fn new(states: Vec<FrameState>) -> Result<Self, OccurrenceError> {
        if states.is_empty() {
            return Err(OccurrenceError::EmptyTrajectory);
        }

        Ok(OccurrenceSeries { states })
    }

    /// Create a new series from a boolean hydrogen bond signal.
    ///
    /// ## Example
    /// ```
    /// use hbond_occurrence::prelude::*;
    /// use float_cmp::assert_approx_eq;
    ///
    /// let series = OccurrenceSeries::from_bools(&[true, false, false, true]).unwrap();
    /// assert_approx_eq!(f64, series.fraction(), 50.0);
    /// ```
    pub fn from_bools(states: &[bool]) -> Result<Self, OccurrenceError> {
        OccurrenceSeries::new(states.iter().map(|&x| FrameState::from(x)).collect())
    }

    /// Get the states of the hydrogen bond in individual frames.
    pub fn get_states(&self) -> &[FrameState] {
        &self.states
    }

    /// Get the number of frames in the series.
    pub fn get_n_frames(&self) -> usize {
        self.states.len()
    }

    /// Get the number of frames in which the hydrogen bond exists.
    pub fn get_n_bonded(&self) -> usize {
        self.count(FrameState::Bonded)
    }

    /// Get the number of frames with undefined geometry.
    pub fn get_n_undefined(&self) -> usize {
        self.count(FrameState::Undefined)
    }

    fn count(&self, state: FrameState) -> usize {
        self.states.iter().filter(|&&x| x == state).count()
    }

    /// Percentage of frames in which the hydrogen bond exists.
    /// Undefined frames count as frames without the hydrogen bond.
    pub fn fraction(&self) -> f64 {
        100.0 * self.get_n_bonded() as f64 / self.get_n_frames() as f64
    }

    /// Write the occurrence report into the provided stream.
    ///
    /// The report consists of a header line followed by one line per frame
    /// containing the 1-based frame number and the state of the hydrogen bond.
    pub fn write_report(&self, writer: &mut impl Write) -> Result<(), OccurrenceError> {
        writeln!(writer, "##Frame\th(t)").map_err(|_| OccurrenceError::CouldNotWrite)?;

        for (i, state) in self.states.iter().enumerate() {
            writeln!(writer, "{}\t{}", i + 1, state).map_err(|_| OccurrenceError::CouldNotWrite)?;
        }

        writer.flush().map_err(|_| OccurrenceError::CouldNotWrite)
    }

    /// Write the occurrence report into a file. Any existing file is overwritten.
    ///
    /// ## Notes
    /// - The report is first written into a temporary file in the target directory
    ///   which then replaces the target. If writing fails, the target is left untouched.
    pub fn write_report_file(&self, filename: impl AsRef<Path>) -> Result<(), OccurrenceError> {
        let path = filename.as_ref();
        let directory = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };

        let mut temporary = NamedTempFile::new_in(directory)
            .map_err(|_| OccurrenceError::CouldNotCreate(Box::from(path)))?;

        {
            let mut writer = BufWriter::new(temporary.as_file_mut());
            self.write_report(&mut writer)?;
        }

        temporary
            .persist(path)
            .map_err(|_| OccurrenceError::CouldNotCreate(Box::from(path)))?;

        Ok(())
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/
