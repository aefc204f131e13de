// Released under MIT License.
// Copyright (c) 2024-2025 Ladislav Bartos

//! Error types returned by the `hbond_occurrence` library.

use colored::{ColoredString, Colorize};
use std::path::Path;
use thiserror::Error;

use crate::files::FileType;
use crate::hbonds::HBondRole;

/// Convert path to a yellow colored string.
fn path_to_yellow(path: &Path) -> ColoredString {
    path.to_str().unwrap_or("<path not valid UTF-8>").yellow()
}

/// Errors that can occur when reading a structure file of unknown or unsupported type.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseFileError {
    #[error("{} file '{}' has an unknown or unsupported file extension", "error:".red().bold(), path_to_yellow(.0))]
    UnknownExtension(Box<Path>),
    #[error("{} file type '{}' can not be used to construct a system", "error:".red().bold(), format!("{:?}", .0).yellow())]
    UnsupportedFileType(FileType),
}

/// Errors that can occur when reading and parsing a gro file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseGroError {
    #[error("{} file '{}' was not found or could not be read", "error:".red().bold(), path_to_yellow(.0))]
    FileNotFound(Box<Path>),
    #[error("{} file '{}' ended unexpectedly", "error:".red().bold(), path_to_yellow(.0))]
    LineNotFound(Box<Path>),
    #[error("{} could not parse line '{}'", "error:".red().bold(), .0.yellow())]
    ParseLineErr(String),
    #[error("{} could not parse line '{}' as atom", "error:".red().bold(), .0.yellow())]
    ParseAtomLineErr(String),
    #[error("{} could not parse line '{}' as box dimensions", "error:".red().bold(), .0.yellow())]
    ParseBoxLineErr(String),
}

/// Errors that can occur when reading and parsing a pdb file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParsePdbError {
    #[error("{} file '{}' was not found or could not be read", "error:".red().bold(), path_to_yellow(.0))]
    FileNotFound(Box<Path>),
    #[error("{} file '{}' ended unexpectedly", "error:".red().bold(), path_to_yellow(.0))]
    LineNotFound(Box<Path>),
    #[error("{} could not parse line '{}' as atom", "error:".red().bold(), .0.yellow())]
    ParseAtomLineErr(String),
    #[error("{} file '{}' contains no atoms", "error:".red().bold(), path_to_yellow(.0))]
    NoAtoms(Box<Path>),
}

/// Errors that can occur when reading a trajectory file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ReadTrajError {
    #[error("{} trajectory file '{}' was not found or could not be read", "error:".red().bold(), path_to_yellow(.0))]
    FileNotFound(Box<Path>),
    #[error("{} trajectory file '{}' has an unknown or unsupported file extension", "error:".red().bold(), path_to_yellow(.0))]
    UnsupportedFormat(Box<Path>),
    #[error("{} could not read a frame of the trajectory file (the frame may be incomplete or corrupted)", "error:".red().bold())]
    FrameNotFound,
    #[error("{} number of atoms in the trajectory file '{}' does not match the number of atoms in the system", "error:".red().bold(), path_to_yellow(.0))]
    AtomsNumberMismatch(Box<Path>),
    #[error("{} file '{}' does not start with a valid dcd header", "error:".red().bold(), path_to_yellow(.0))]
    InvalidDcdHeader(Box<Path>),
    #[error("{} dcd file '{}' uses fixed atoms which are not supported", "error:".red().bold(), path_to_yellow(.0))]
    DcdFixedAtoms(Box<Path>),
}

/// Errors that can occur when parsing or evaluating an atom selection query.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SelectError {
    #[error("{} the provided selection query is empty", "error:".red().bold())]
    EmptyQuery,
    #[error("{} unbalanced parentheses in selection query '{}'", "error:".red().bold(), .0.yellow())]
    InvalidParentheses(String),
    #[error("{} unbalanced quotes in selection query '{}'", "error:".red().bold(), .0.yellow())]
    InvalidQuotes(String),
    #[error("{} invalid operator in selection query '{}'", "error:".red().bold(), .0.yellow())]
    InvalidOperator(String),
    #[error("{} missing argument for a binary operator in selection query '{}'", "error:".red().bold(), .0.yellow())]
    MissingArgument(String),
    #[error("{} missing argument for a keyword in selection query '{}'", "error:".red().bold(), .0.yellow())]
    EmptyArgument(String),
    #[error("{} invalid number or range in selection query '{}'", "error:".red().bold(), .0.yellow())]
    InvalidNumber(String),
    #[error("{} invalid chain identifier in selection query '{}'", "error:".red().bold(), .0.yellow())]
    InvalidChainId(String),
    #[error("{} invalid regular expression '{}'", "error:".red().bold(), .0.yellow())]
    InvalidRegex(String),
    #[error("{} parentheses can not be placed inside a keyword token in selection query '{}'", "error:".red().bold(), .0.yellow())]
    InvalidTokenParentheses(String),
    #[error("{} unknown keyword '{}' in selection query", "error:".red().bold(), .0.yellow())]
    UnknownKeyword(String),
    #[error("{} selection query '{}' could not be understood", "error:".red().bold(), .0.yellow())]
    UnknownError(String),
    #[error("{} selection query '{}' matches no atoms", "error:".red().bold(), .0.yellow())]
    NoMatch(String),
    #[error("{} selection query '{}' matches {} atoms but exactly one atom is required", "error:".red().bold(), .0.yellow(), .1.to_string().yellow())]
    Ambiguous(String, usize),
    #[error("{} selection query '{}' matches {} atoms; using the first matching atom", "warning:".yellow().bold(), .0.yellow(), .1.to_string().yellow())]
    AmbiguousWarning(String, usize),
}

/// Errors that can occur when calculating the geometry of a hydrogen bond.
#[derive(Error, Debug, PartialEq, Eq, Clone, Copy)]
pub enum GeometryError {
    #[error("{} atoms '{}' and '{}' share the same position in frame {}; angle and distance are undefined", "error:".red().bold(), .from.to_string().yellow(), .to.to_string().yellow(), .frame.to_string().yellow())]
    Degenerate {
        frame: usize,
        from: HBondRole,
        to: HBondRole,
    },
}

/// Errors that can occur when constructing geometric criteria for hydrogen bonds.
#[derive(Error, Debug, PartialEq, Clone, Copy)]
pub enum CriteriaError {
    #[error("{} distance cutoff '{}' nm must be a positive finite number", "error:".red().bold(), .0.to_string().yellow())]
    InvalidDistance(f32),
    #[error("{} angle range '{}'-'{}' is invalid (expected 0 <= min <= max <= 180 degrees)", "error:".red().bold(), .0.to_string().yellow(), .1.to_string().yellow())]
    InvalidAngleRange(f32, f32),
}

/// Errors that can occur when calculating or writing the hydrogen bond occurrence.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum OccurrenceError {
    #[error("{} trajectory contains no frames; occurrence of the hydrogen bond is undefined", "error:".red().bold())]
    EmptyTrajectory,
    #[error("{} output file '{}' could not be created", "error:".red().bold(), path_to_yellow(.0))]
    CouldNotCreate(Box<Path>),
    #[error("{} could not write the occurrence report", "error:".red().bold())]
    CouldNotWrite,
}

/// Errors that can occur when reading the configuration file.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{} configuration file '{}' was not found or could not be read", "error:".red().bold(), path_to_yellow(.0))]
    FileNotFound(Box<Path>),
    #[error("{} could not parse configuration file '{}': {}", "error:".red().bold(), path_to_yellow(.0), .1)]
    CouldNotParse(Box<Path>, String),
    #[error("{} required option '{}' is missing", "error:".red().bold(), .0.yellow())]
    MissingOption(String),
    #[error("{0}")]
    InvalidCriteria(CriteriaError),
    #[error("{} number of threads must be at least 1", "error:".red().bold())]
    InvalidThreads,
}

/// Errors that can occur when analyzing a trajectory using a frame analyzer.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TrajAnalysisError<E: std::error::Error> {
    #[error("{0}")]
    ReadingError(ReadTrajError),
    #[error("{0}")]
    AnalysisError(E),
}

/// Errors that can occur during the hydrogen bond occurrence analysis.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum HBondError {
    #[error("{0}")]
    TopologyError(String),
    #[error("{0}")]
    SelectError(SelectError),
    #[error("{0}")]
    ReadTrajError(ReadTrajError),
    #[error("{0}")]
    GeometryError(GeometryError),
    #[error("{0}")]
    OccurrenceError(OccurrenceError),
    #[error("{} coordinates of atom roles have different numbers of frames (donor: {}, hydrogen: {}, acceptor: {}, pre-acceptor: {})", "error:".red().bold(), .0, .1, .2, .3)]
    LengthMismatch(usize, usize, usize, usize),
    #[error("{} atom with index '{}' does not exist in the current frame", "error:".red().bold(), .0.to_string().yellow())]
    IndexOutOfRange(usize),
    #[error("{} frame {} is marked as undefined ({} and {} share the same position)", "warning:".yellow().bold(), .0.to_string().yellow(), .1.to_string().yellow(), .2.to_string().yellow())]
    UndefinedFrameWarning(usize, HBondRole, HBondRole),
}

impl<E: std::error::Error + Into<HBondError>> From<TrajAnalysisError<E>> for HBondError {
    fn from(e: TrajAnalysisError<E>) -> Self {
        match e {
            TrajAnalysisError::ReadingError(x) => HBondError::ReadTrajError(x),
            TrajAnalysisError::AnalysisError(x) => x.into(),
        }
    }
}

impl From<GeometryError> for HBondError {
    fn from(e: GeometryError) -> Self {
        HBondError::GeometryError(e)
    }
}
