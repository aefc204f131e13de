// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! # hbond_occurrence: Occurrence of a single hydrogen bond in MD trajectories
//!
//! Rust library (and command line tool) for calculating the presence or absence
//! of one specific hydrogen bond in every frame of a molecular dynamics trajectory.
//!
//! ## Usage
//!
//! Run
//!
//! ```bash
//! $ cargo add hbond_occurrence
//! ```
//!
//! Import the crate in your Rust code:
//! ```
//! use hbond_occurrence::prelude::*;
//! ```
//!
//! ## Hydrogen bond definition
//!
//! The hydrogen bond between a donor (D), a hydrogen (H), an acceptor (A),
//! and a pre-acceptor (PA, an atom covalently bound to the acceptor) exists in a frame iff
//! - the distance H-A is lower than 0.25 nm,
//! - the angle D-H-A lies between 120° and 180° (inclusive),
//! - the angle H-A-PA lies between 90° and 180° (inclusive).
//!
//! The thresholds can be changed using [`HBondCriteria`](crate::hbonds::criteria::HBondCriteria).
//! Periodic boundary conditions are **not** taken into account.
//!
//! ## Examples
//!
//! #### Calculating the occurrence of a hydrogen bond
//!
//! ```no_run
//! use hbond_occurrence::prelude::*;
//! use std::error::Error;
//!
//! fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
//!     // read the structure of the system
//!     let mut system = System::from_file("topology.pdb")?;
//!
//!     // select the atoms of the hydrogen bond
//!     let queries = RoleQueries::new(
//!         "resSeq 15 and name NZ",
//!         "resSeq 15 and name HZ1",
//!         "resSeq 111 and name OE1",
//!         "resSeq 111 and name CD",
//!     );
//!     let analysis = OccurrenceAnalysis::new(&system, &queries, AmbiguityPolicy::Error)?;
//!
//!     // read the trajectory and classify each frame
//!     let series = analysis.run(&mut system, "trajectory.dcd", Some(ProgressPrinter::new()))?;
//!
//!     println!("Occurrence is [%]: {}", series.fraction());
//!     series.write_report_file("hbond_occurrence.dat")?;
//!
//!     Ok(())
//! }
//! ```
//!
//! #### Reading a trajectory
//!
//! Trajectory readers update the `System` structure in place.
//! Supported trajectory formats are `dcd`, multi-frame `gro`, and multi-model `pdb`.
//!
//! ```no_run
//! use hbond_occurrence::prelude::*;
//!
//! let mut system = System::from_file("topology.pdb").unwrap();
//! let acceptor = system.select_single_atom("resSeq 111 and name OE1", AmbiguityPolicy::Error).unwrap();
//!
//! for raw_frame in system.dcd_iter("trajectory.dcd").unwrap() {
//!     let frame = raw_frame.unwrap();
//!     println!("{:?}", frame.get_atom(acceptor).unwrap().get_position());
//! }
//! ```
//!
//! ## Selection language
//! Atoms are selected using a VMD-like selection language.
//!
//! - `resname LYS GLU` selects atoms of residues named LYS or GLU.
//! - `name NZ HZ1` (or `atomname`) selects atoms named NZ or HZ1.
//! - `resid 15` (or `resnum`, `resSeq`) selects atoms of residue number 15.
//! - `serial 1 to 5` selects the first five atoms of the structure.
//! - `atomid 10-12` (or `atomnum`) selects atoms by the numbers written in the structure file.
//! - `index 0` selects the first atom of the structure.
//! - `chain A` selects atoms of chain A.
//! - `all` and `none`.
//!
//! Names can be specified using regular expressions, e.g. `name r'^HZ'`.
//! Numbers can be specified using open ranges, e.g. `resid >= 100`.
//! Selections can be combined using `and` (`&&`), `or` (`||`), `not` (`!`), and parentheses.
//!
//! ## Error handling
//! The individual error types are not exported into the `prelude` module.
//! Include them explicitly from the `errors` module:
//! ```
//! use hbond_occurrence::errors::HBondError;
//! ```
//!
//! ## Features
//! - `parallel` (default): multi-threaded calculation of the hydrogen bond geometry.
//!
//! ## License
//! This library is released under the MIT License.

/// Current version of the `hbond_occurrence` library.
pub const HBOND_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod errors;
pub mod files;
pub mod hbonds;
pub mod io;
pub mod progress;
pub mod select;
pub mod structures;
pub mod system;

mod test_utilities;

/// Reexported basic `hbond_occurrence` structures and traits.
pub mod prelude {
    pub use crate::config::{ConfigBuilder, CriteriaConfig, HBondConfig};
    pub use crate::files::FileType;
    pub use crate::hbonds::criteria::HBondCriteria;
    pub use crate::hbonds::geometry::{compute_geometry, GeometrySample};
    pub use crate::hbonds::occurrence::{FrameState, OccurrenceSeries};
    #[cfg(feature = "parallel")]
    pub use crate::hbonds::parallel::compute_geometry_parallel;
    pub use crate::hbonds::{
        DegeneratePolicy, HBondRole, HBondRolesRead, OccurrenceAnalysis, RoleIndices,
        RolePositions, RoleQueries, RoleTrajectory,
    };
    pub use crate::io::dcd_io::DcdReader;
    pub use crate::io::gro_io::GroReader;
    pub use crate::io::pdb_io::PdbReader;
    pub use crate::io::traj_io::{TrajMasterRead, TrajRead, TrajReader};
    pub use crate::progress::ProgressPrinter;
    pub use crate::select::AmbiguityPolicy;
    pub use crate::structures::atom::Atom;
    pub use crate::structures::traj_convert::{ConvertableTrajRead, FrameAnalyze};
    pub use crate::structures::vector3d::Vector3D;
    pub use crate::system::System;
}
