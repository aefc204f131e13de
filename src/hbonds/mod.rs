// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of the occurrence analysis of a single hydrogen bond.
//!
//! The analysis follows a linear pipeline:
//! 1. atoms playing the roles of the donor, hydrogen, acceptor, and pre-acceptor are selected,
//! 2. positions of these atoms are collected from every frame of the trajectory,
//! 3. the hydrogen-acceptor distance and the donor-hydrogen-acceptor and
//!    hydrogen-acceptor-pre-acceptor angles are calculated for each frame,
//! 4. each frame is classified using [`HBondCriteria`],
//! 5. the states are aggregated into an [`OccurrenceSeries`] and written out.

pub mod criteria;
pub mod geometry;
pub mod occurrence;
#[cfg(feature = "parallel")]
pub mod parallel;

use std::fmt;
use std::path::Path;

use getset::{CopyGetters, Getters};
use serde::{Deserialize, Serialize};

use crate::config::HBondConfig;
use crate::errors::{GeometryError, HBondError, OccurrenceError, ReadTrajError};
use crate::files::FileType;
use crate::progress::ProgressPrinter;
use crate::select::AmbiguityPolicy;
use crate::structures::traj_convert::{ConvertableTrajRead, FrameAnalyze, TrajAnalyzer};
use crate::structures::vector3d::Vector3D;
use crate::system::System;

use criteria::HBondCriteria;
use geometry::GeometrySample;
use occurrence::{FrameState, OccurrenceSeries};

/**************************/
/*       ATOM ROLES       */
/**************************/

/// Role of an atom in the hydrogen bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HBondRole {
    Donor,
    Hydrogen,
    Acceptor,
    /// Atom covalently bound to the acceptor.
    PreAcceptor,
}

impl fmt::Display for HBondRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HBondRole::Donor => write!(f, "donor"),
            HBondRole::Hydrogen => write!(f, "hydrogen"),
            HBondRole::Acceptor => write!(f, "acceptor"),
            HBondRole::PreAcceptor => write!(f, "pre-acceptor"),
        }
    }
}

/// Selection queries identifying the atoms of the hydrogen bond.
#[derive(Debug, Clone, Getters)]
pub struct RoleQueries {
    #[getset(get = "pub")]
    donor: String,
    #[getset(get = "pub")]
    hydrogen: String,
    #[getset(get = "pub")]
    acceptor: String,
    #[getset(get = "pub")]
    pre_acceptor: String,
}

impl RoleQueries {
    /// Define the atoms of the hydrogen bond using selection queries.
    /// Each query must select exactly one atom of the system.
    pub fn new(donor: &str, hydrogen: &str, acceptor: &str, pre_acceptor: &str) -> Self {
        RoleQueries {
            donor: donor.to_owned(),
            hydrogen: hydrogen.to_owned(),
            acceptor: acceptor.to_owned(),
            pre_acceptor: pre_acceptor.to_owned(),
        }
    }
}

/// Indices of the atoms of the hydrogen bond. Atoms are indexed starting from 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, CopyGetters)]
pub struct RoleIndices {
    #[getset(get_copy = "pub")]
    donor: usize,
    #[getset(get_copy = "pub")]
    hydrogen: usize,
    #[getset(get_copy = "pub")]
    acceptor: usize,
    #[getset(get_copy = "pub")]
    pre_acceptor: usize,
}

impl RoleIndices {
    /// Create the structure from already known atom indices.
    pub fn new(donor: usize, hydrogen: usize, acceptor: usize, pre_acceptor: usize) -> Self {
        RoleIndices {
            donor,
            hydrogen,
            acceptor,
            pre_acceptor,
        }
    }

    /// Resolve the selection queries into atom indices.
    ///
    /// ## Returns
    /// - `RoleIndices` if each query matches exactly one atom
    ///   (or at least one atom when using `AmbiguityPolicy::First`).
    /// - `HBondError::SelectError` if any query is invalid, matches no atoms,
    ///   or is ambiguous under `AmbiguityPolicy::Error`.
    ///
    /// ## Example
    /// ```no_run
    /// use hbond_occurrence::prelude::*;
    ///
    /// let system = System::from_file("topology.pdb").unwrap();
    /// let queries = RoleQueries::new(
    ///     "resSeq 15 and name NZ",
    ///     "resSeq 15 and name HZ1",
    ///     "resSeq 111 and name OE1",
    ///     "resSeq 111 and name CD",
    /// );
    ///
    /// let indices = RoleIndices::resolve(&system, &queries, AmbiguityPolicy::Error).unwrap();
    /// ```
    pub fn resolve(
        system: &System,
        queries: &RoleQueries,
        policy: AmbiguityPolicy,
    ) -> Result<Self, HBondError> {
        let select = |query: &str| {
            system
                .select_single_atom(query, policy)
                .map_err(HBondError::SelectError)
        };

        Ok(RoleIndices {
            donor: select(queries.donor())?,
            hydrogen: select(queries.hydrogen())?,
            acceptor: select(queries.acceptor())?,
            pre_acceptor: select(queries.pre_acceptor())?,
        })
    }
}

/**************************/
/*    COLLECTING FRAMES   */
/**************************/

/// Positions of the atoms of the hydrogen bond in a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Getters)]
pub struct RolePositions {
    #[getset(get = "pub")]
    donor: Vector3D,
    #[getset(get = "pub")]
    hydrogen: Vector3D,
    #[getset(get = "pub")]
    acceptor: Vector3D,
    #[getset(get = "pub")]
    pre_acceptor: Vector3D,
}

impl RolePositions {
    pub fn new(
        donor: Vector3D,
        hydrogen: Vector3D,
        acceptor: Vector3D,
        pre_acceptor: Vector3D,
    ) -> Self {
        RolePositions {
            donor,
            hydrogen,
            acceptor,
            pre_acceptor,
        }
    }
}

/// Frame analyzer extracting positions of the atoms of the hydrogen bond.
#[derive(Debug, Clone)]
pub struct RoleCollector {
    indices: RoleIndices,
}

impl RoleCollector {
    pub fn new(indices: RoleIndices) -> Self {
        RoleCollector { indices }
    }

    #[inline(always)]
    fn position(system: &System, index: usize) -> Result<Vector3D, HBondError> {
        system
            .get_atom(index)
            .map(|atom| *atom.get_position())
            .ok_or(HBondError::IndexOutOfRange(index))
    }
}

impl FrameAnalyze for RoleCollector {
    type Error = HBondError;
    type AnalysisResult = RolePositions;

    fn analyze(&mut self, system: &System) -> Result<Self::AnalysisResult, Self::Error> {
        Ok(RolePositions {
            donor: Self::position(system, self.indices.donor)?,
            hydrogen: Self::position(system, self.indices.hydrogen)?,
            acceptor: Self::position(system, self.indices.acceptor)?,
            pre_acceptor: Self::position(system, self.indices.pre_acceptor)?,
        })
    }
}

/// Iterator over a trajectory returning positions of the atoms of the hydrogen bond.
pub type RoleIterator<'a, Reader> = TrajAnalyzer<'a, Reader, RoleCollector>;

/// Trait implemented by all trajectory readers allowing them to collect
/// positions of the atoms of the hydrogen bond.
pub trait HBondRolesRead<'a>: ConvertableTrajRead<'a> {
    /// Turn the trajectory reader into an iterator returning [`RolePositions`] for each frame.
    ///
    /// ## Example
    /// ```no_run
    /// use hbond_occurrence::prelude::*;
    ///
    /// let mut system = System::from_file("topology.pdb").unwrap();
    /// let indices = RoleIndices::new(0, 1, 4, 3);
    ///
    /// for positions in system.dcd_iter("trajectory.dcd").unwrap().hbond_roles(indices) {
    ///     let positions = positions.unwrap();
    ///     println!("{:?}", positions.hydrogen());
    /// }
    /// ```
    fn hbond_roles(self, indices: RoleIndices) -> RoleIterator<'a, Self> {
        self.analyze(RoleCollector::new(indices))
    }
}

impl<'a, T> HBondRolesRead<'a> for T where T: ConvertableTrajRead<'a> {}

/// Positions of the atoms of the hydrogen bond in all frames of a trajectory.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RoleTrajectory {
    frames: Vec<RolePositions>,
}

impl RoleTrajectory {
    /// Construct the trajectory from separate position sequences for each role.
    ///
    /// ## Returns
    /// - `RoleTrajectory` if all sequences have the same length.
    /// - `HBondError::LengthMismatch` otherwise.
    pub fn new(
        donor: &[Vector3D],
        hydrogen: &[Vector3D],
        acceptor: &[Vector3D],
        pre_acceptor: &[Vector3D],
    ) -> Result<Self, HBondError> {
        let n = donor.len();
        if hydrogen.len() != n || acceptor.len() != n || pre_acceptor.len() != n {
            return Err(HBondError::LengthMismatch(
                donor.len(),
                hydrogen.len(),
                acceptor.len(),
                pre_acceptor.len(),
            ));
        }

        let frames = (0..n)
            .map(|i| RolePositions::new(donor[i], hydrogen[i], acceptor[i], pre_acceptor[i]))
            .collect();

        Ok(RoleTrajectory { frames })
    }

    /// Construct the trajectory from per-frame positions.
    pub fn from_frames(frames: Vec<RolePositions>) -> Self {
        RoleTrajectory { frames }
    }

    #[inline(always)]
    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    /// Get positions in the frame with the given 0-based index.
    #[inline(always)]
    pub fn frame(&self, index: usize) -> Option<&RolePositions> {
        self.frames.get(index)
    }

    #[inline(always)]
    pub fn get_frames(&self) -> &[RolePositions] {
        &self.frames
    }
}

/**************************/
/*    OCCURRENCE ANALYSIS */
/**************************/

/// Handling of frames in which two consecutive atoms of the hydrogen bond share the same position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DegeneratePolicy {
    /// Abort the analysis with an error.
    #[default]
    Fail,
    /// Mark the frame as undefined and continue. Undefined frames count as
    /// frames without the hydrogen bond.
    Mark,
}

/// Structure storing information needed for the occurrence analysis of a single hydrogen bond.
#[derive(Debug, Clone, CopyGetters)]
pub struct OccurrenceAnalysis {
    #[getset(get_copy = "pub")]
    indices: RoleIndices,
    #[getset(get_copy = "pub")]
    criteria: HBondCriteria,
    #[getset(get_copy = "pub")]
    degenerate: DegeneratePolicy,
    /// Number of threads used to calculate the geometry.
    #[getset(get_copy = "pub")]
    n_threads: usize,
}

impl OccurrenceAnalysis {
    /// Prepare the analysis by selecting the atoms of the hydrogen bond.
    /// Default criteria, `DegeneratePolicy::Fail`, and a single thread are used
    /// unless specified otherwise using the `with_*` methods.
    ///
    /// ## Example
    /// ```no_run
    /// use hbond_occurrence::prelude::*;
    ///
    /// let mut system = System::from_file("topology.pdb").unwrap();
    /// let queries = RoleQueries::new(
    ///     "resSeq 15 and name NZ",
    ///     "resSeq 15 and name HZ1",
    ///     "resSeq 111 and name OE1",
    ///     "resSeq 111 and name CD",
    /// );
    ///
    /// let analysis = OccurrenceAnalysis::new(&system, &queries, AmbiguityPolicy::Error)
    ///     .unwrap()
    ///     .with_degenerate(DegeneratePolicy::Mark);
    ///
    /// let series = analysis.run(&mut system, "trajectory.dcd", None).unwrap();
    /// println!("Occurrence is [%]: {}", series.fraction());
    /// ```
    pub fn new(
        system: &System,
        queries: &RoleQueries,
        ambiguity: AmbiguityPolicy,
    ) -> Result<Self, HBondError> {
        Ok(OccurrenceAnalysis::from_indices(RoleIndices::resolve(
            system, queries, ambiguity,
        )?))
    }

    /// Prepare the analysis for atoms with the given indices.
    pub fn from_indices(indices: RoleIndices) -> Self {
        OccurrenceAnalysis {
            indices,
            criteria: HBondCriteria::default(),
            degenerate: DegeneratePolicy::default(),
            n_threads: 1,
        }
    }

    pub fn with_criteria(mut self, criteria: HBondCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    pub fn with_degenerate(mut self, policy: DegeneratePolicy) -> Self {
        self.degenerate = policy;
        self
    }

    /// Values lower than 1 are treated as 1.
    pub fn with_threads(mut self, n_threads: usize) -> Self {
        self.n_threads = n_threads.max(1);
        self
    }

    /// Read the trajectory and collect positions of the atoms of the hydrogen bond.
    /// The format of the trajectory is identified from the file extension (`dcd`, `gro`, or `pdb`).
    ///
    /// ## Returns
    /// - `RoleTrajectory` containing one entry per trajectory frame.
    /// - `HBondError::ReadTrajError` if the trajectory could not be read.
    /// - `HBondError::IndexOutOfRange` if an atom of the hydrogen bond is missing in a frame.
    ///
    /// ## Notes
    /// - `system` is updated in place and corresponds to the last frame read.
    pub fn read_trajectory(
        &self,
        system: &mut System,
        trajectory: impl AsRef<Path>,
        progress: Option<ProgressPrinter>,
    ) -> Result<RoleTrajectory, HBondError> {
        let path = trajectory.as_ref();

        match FileType::from_name(path) {
            FileType::DCD => self.collect(
                system.dcd_iter(path).map_err(HBondError::ReadTrajError)?,
                progress,
            ),
            FileType::GRO => self.collect(
                system.gro_iter(path).map_err(HBondError::ReadTrajError)?,
                progress,
            ),
            FileType::PDB => self.collect(
                system.pdb_iter(path).map_err(HBondError::ReadTrajError)?,
                progress,
            ),
            FileType::Unknown => Err(HBondError::ReadTrajError(
                ReadTrajError::UnsupportedFormat(Box::from(path)),
            )),
        }
    }

    fn collect<'a, Reader>(
        &self,
        reader: Reader,
        progress: Option<ProgressPrinter>,
    ) -> Result<RoleTrajectory, HBondError>
    where
        Reader: ConvertableTrajRead<'a> + 'a,
    {
        let reader = match progress {
            Some(printer) => reader.print_progress(printer),
            None => reader,
        };

        let frames = reader
            .hbond_roles(self.indices)
            .collect::<Result<Vec<RolePositions>, _>>()?;

        Ok(RoleTrajectory::from_frames(frames))
    }

    /// Calculate the geometry of each frame and classify it.
    ///
    /// ## Returns
    /// - `OccurrenceSeries` with one state per frame.
    /// - `HBondError::OccurrenceError` if the trajectory contains no frames.
    /// - `HBondError::GeometryError` if the geometry of any frame is undefined
    ///   and `DegeneratePolicy::Fail` is used.
    pub fn evaluate(&self, trajectory: &RoleTrajectory) -> Result<OccurrenceSeries, HBondError> {
        if trajectory.n_frames() == 0 {
            return Err(HBondError::OccurrenceError(
                OccurrenceError::EmptyTrajectory,
            ));
        }

        let mut states = Vec::with_capacity(trajectory.n_frames());
        for sample in self.compute_geometry(trajectory) {
            states.push(self.classify(sample)?);
        }

        OccurrenceSeries::new(states).map_err(HBondError::OccurrenceError)
    }

    fn classify(
        &self,
        sample: Result<GeometrySample, GeometryError>,
    ) -> Result<FrameState, HBondError> {
        match (sample, self.degenerate) {
            (Ok(sample), _) => Ok(FrameState::from(self.criteria.is_hbond(&sample))),
            (Err(e), DegeneratePolicy::Fail) => Err(e.into()),
            (Err(GeometryError::Degenerate { frame, from, to }), DegeneratePolicy::Mark) => {
                eprintln!("{}", HBondError::UndefinedFrameWarning(frame, from, to));
                Ok(FrameState::Undefined)
            }
        }
    }

    #[cfg(feature = "parallel")]
    #[inline(always)]
    fn compute_geometry(
        &self,
        trajectory: &RoleTrajectory,
    ) -> Vec<Result<GeometrySample, GeometryError>> {
        parallel::compute_geometry_parallel(trajectory, self.n_threads)
    }

    #[cfg(not(feature = "parallel"))]
    #[inline(always)]
    fn compute_geometry(
        &self,
        trajectory: &RoleTrajectory,
    ) -> Vec<Result<GeometrySample, GeometryError>> {
        geometry::compute_geometry(trajectory)
    }

    /// Read the trajectory and calculate the occurrence of the hydrogen bond.
    pub fn run(
        &self,
        system: &mut System,
        trajectory: impl AsRef<Path>,
        progress: Option<ProgressPrinter>,
    ) -> Result<OccurrenceSeries, HBondError> {
        let roles = self.read_trajectory(system, trajectory, progress)?;
        self.evaluate(&roles)
    }
}

/// Perform the complete occurrence analysis as described by the configuration
/// and write the report into the output file.
///
/// Selections are resolved before the trajectory is read.
/// The output file is only created if the analysis succeeds.
pub fn run(config: &HBondConfig) -> Result<OccurrenceSeries, HBondError> {
    let mut system = System::from_file(config.topology())
        .map_err(|e| HBondError::TopologyError(e.to_string()))?;

    let queries = RoleQueries::new(
        config.donor(),
        config.hydrogen(),
        config.acceptor(),
        config.pre_acceptor(),
    );

    let analysis = OccurrenceAnalysis::new(&system, &queries, config.ambiguity())?
        .with_criteria(config.criteria())
        .with_degenerate(config.degenerate())
        .with_threads(config.n_threads());

    let progress = if config.progress() {
        Some(ProgressPrinter::new())
    } else {
        None
    };

    let series = analysis.run(&mut system, config.trajectory(), progress)?;

    series
        .write_report_file(config.output())
        .map_err(HBondError::OccurrenceError)?;

    Ok(series)
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::errors::SelectError;
    use float_cmp::assert_approx_eq;
    use std::fs::File;
    use tempfile::NamedTempFile;

    fn queries() -> RoleQueries {
        RoleQueries::new(
            "resSeq 15 and name NZ",
            "resSeq 15 and name HZ1",
            "resSeq 111 and name OE1",
            "resSeq 111 and name CD",
        )
    }

    #[test]
    fn role_display() {
        assert_eq!(HBondRole::Donor.to_string(), "donor");
        assert_eq!(HBondRole::Hydrogen.to_string(), "hydrogen");
        assert_eq!(HBondRole::Acceptor.to_string(), "acceptor");
        assert_eq!(HBondRole::PreAcceptor.to_string(), "pre-acceptor");
    }

    #[test]
    fn resolve_roles() {
        let system = System::from_file("test_files/hbond.gro").unwrap();
        let indices = RoleIndices::resolve(&system, &queries(), AmbiguityPolicy::Error).unwrap();

        assert_eq!(indices, RoleIndices::new(0, 1, 4, 3));
    }

    #[test]
    fn resolve_roles_no_match() {
        let system = System::from_file("test_files/hbond.gro").unwrap();
        let queries = RoleQueries::new(
            "resSeq 15 and name NZ",
            "resSeq 15 and name HZ3",
            "resSeq 111 and name OE1",
            "resSeq 111 and name CD",
        );

        assert_eq!(
            RoleIndices::resolve(&system, &queries, AmbiguityPolicy::Error),
            Err(HBondError::SelectError(SelectError::NoMatch(
                "resSeq 15 and name HZ3".to_string()
            )))
        );
    }

    #[test]
    fn resolve_roles_ambiguous() {
        let system = System::from_file("test_files/hbond.gro").unwrap();
        let queries = RoleQueries::new(
            "resSeq 15 and name NZ",
            "resSeq 15 and name r'^HZ'",
            "resSeq 111 and name OE1",
            "resSeq 111 and name CD",
        );

        assert_eq!(
            RoleIndices::resolve(&system, &queries, AmbiguityPolicy::Error),
            Err(HBondError::SelectError(SelectError::Ambiguous(
                "resSeq 15 and name r'^HZ'".to_string(),
                2
            )))
        );

        let indices = RoleIndices::resolve(&system, &queries, AmbiguityPolicy::First).unwrap();
        assert_eq!(indices.hydrogen(), 1);
    }

    #[test]
    fn collector_out_of_range() {
        let system = System::from_file("test_files/hbond.gro").unwrap();
        let mut collector = RoleCollector::new(RoleIndices::new(0, 1, 4, 10));

        assert_eq!(
            collector.analyze(&system),
            Err(HBondError::IndexOutOfRange(10))
        );
    }

    #[test]
    fn collect_roles_gro() {
        let mut system = System::from_file("test_files/hbond.gro").unwrap();

        let frames = system
            .gro_iter("test_files/hbond_traj.gro")
            .unwrap()
            .hbond_roles(RoleIndices::new(0, 1, 4, 3))
            .collect::<Result<Vec<_>, _>>()
            .unwrap();

        assert_eq!(frames.len(), 3);
        let expected_acceptor_x = [1.3, 1.5, 1.3];
        for (positions, expected) in frames.iter().zip(expected_acceptor_x) {
            assert_approx_eq!(f32, positions.acceptor().x, expected);
            assert_approx_eq!(f32, positions.donor().x, 1.0);
            assert_approx_eq!(f32, positions.hydrogen().x, 1.1);
        }
    }

    #[test]
    fn role_trajectory_mismatch() {
        let points = vec![Vector3D::default(); 3];
        let fewer = vec![Vector3D::default(); 2];

        assert_eq!(
            RoleTrajectory::new(&points, &points, &fewer, &points),
            Err(HBondError::LengthMismatch(3, 3, 2, 3))
        );
    }

    #[test]
    fn role_trajectory_new() {
        let donor = vec![Vector3D::new(1.0, 1.0, 1.0); 2];
        let hydrogen = vec![Vector3D::new(1.1, 1.0, 1.0); 2];
        let acceptor = vec![Vector3D::new(1.3, 1.0, 1.0), Vector3D::new(1.5, 1.0, 1.0)];
        let pre_acceptor = vec![Vector3D::new(1.4, 1.0, 1.0), Vector3D::new(1.6, 1.0, 1.0)];

        let trajectory = RoleTrajectory::new(&donor, &hydrogen, &acceptor, &pre_acceptor).unwrap();
        assert_eq!(trajectory.n_frames(), 2);
        assert_approx_eq!(f32, trajectory.frame(1).unwrap().acceptor().x, 1.5);
        assert!(trajectory.frame(2).is_none());
    }

    #[test]
    fn evaluate_synthetic() {
        let trajectory = RoleTrajectory::from_frames(vec![
            // all criteria pass
            RolePositions::new(
                Vector3D::new(1.0, 1.0, 1.0),
                Vector3D::new(1.1, 1.0, 1.0),
                Vector3D::new(1.3, 1.0, 1.0),
                Vector3D::new(1.4, 1.0, 1.0),
            ),
            // distance fails
            RolePositions::new(
                Vector3D::new(1.0, 1.0, 1.0),
                Vector3D::new(1.1, 1.0, 1.0),
                Vector3D::new(1.5, 1.0, 1.0),
                Vector3D::new(1.6, 1.0, 1.0),
            ),
            // hydrogen-acceptor-pre-acceptor angle fails
            RolePositions::new(
                Vector3D::new(1.0, 1.0, 1.0),
                Vector3D::new(1.1, 1.0, 1.0),
                Vector3D::new(1.3, 1.0, 1.0),
                Vector3D::new(1.2, 1.05, 1.0),
            ),
        ]);

        let series = OccurrenceAnalysis::from_indices(RoleIndices::new(0, 1, 2, 3))
            .evaluate(&trajectory)
            .unwrap();

        assert_eq!(
            series.get_states(),
            &[FrameState::Bonded, FrameState::NotBonded, FrameState::NotBonded]
        );
        assert_approx_eq!(f64, series.fraction(), 100.0 / 3.0);
    }

    #[test]
    fn evaluate_empty() {
        let analysis = OccurrenceAnalysis::from_indices(RoleIndices::new(0, 1, 2, 3));
        assert_eq!(
            analysis.evaluate(&RoleTrajectory::default()),
            Err(HBondError::OccurrenceError(OccurrenceError::EmptyTrajectory))
        );
    }

    #[test]
    fn run_gro() {
        let mut system = System::from_file("test_files/hbond.gro").unwrap();
        let analysis = OccurrenceAnalysis::new(&system, &queries(), AmbiguityPolicy::Error).unwrap();

        let series = analysis
            .run(&mut system, "test_files/hbond_traj.gro", None)
            .unwrap();

        assert_eq!(series.get_n_frames(), 3);
        assert_eq!(series.get_n_bonded(), 1);
        assert_approx_eq!(f64, series.fraction(), 100.0 / 3.0);
    }

    #[test]
    fn read_trajectory_with_progress() {
        let output = NamedTempFile::new().unwrap();
        let path_to_output = output.path().to_owned();
        let handle = output.reopen().unwrap();

        let printer = ProgressPrinter::new()
            .with_output(Box::from(handle))
            .with_colored(false)
            .with_print_freq(1)
            .with_terminating("\n");

        let mut system = System::from_file("test_files/hbond.gro").unwrap();
        let analysis = OccurrenceAnalysis::new(&system, &queries(), AmbiguityPolicy::Error).unwrap();

        let trajectory = analysis
            .read_trajectory(&mut system, "test_files/hbond_traj.gro", Some(printer))
            .unwrap();
        assert_eq!(trajectory.n_frames(), 3);

        let mut result = File::open(path_to_output).unwrap();
        let mut expected = File::open("test_files/progress_traj_expected.txt").unwrap();
        assert!(file_diff::diff_files(&mut result, &mut expected));
    }

    #[test]
    fn formats_agree() {
        let mut system = System::from_file("test_files/hbond.pdb").unwrap();
        let analysis = OccurrenceAnalysis::new(&system, &queries(), AmbiguityPolicy::Error).unwrap();

        let gro = analysis
            .run(&mut system, "test_files/hbond_traj.gro", None)
            .unwrap();
        let pdb = analysis
            .run(&mut system, "test_files/hbond_traj.pdb", None)
            .unwrap();
        let dcd = analysis
            .run(&mut system, "test_files/hbond_traj.dcd", None)
            .unwrap();

        assert_eq!(gro, pdb);
        assert_eq!(gro, dcd);
    }

    #[test]
    fn run_multithreaded() {
        let mut system = System::from_file("test_files/hbond.gro").unwrap();
        let analysis = OccurrenceAnalysis::new(&system, &queries(), AmbiguityPolicy::Error)
            .unwrap()
            .with_threads(4);

        let series = analysis
            .run(&mut system, "test_files/hbond_traj.dcd", None)
            .unwrap();

        assert_eq!(
            series.get_states(),
            &[FrameState::Bonded, FrameState::NotBonded, FrameState::NotBonded]
        );
    }

    #[test]
    fn run_degenerate_fail() {
        let mut system = System::from_file("test_files/hbond.gro").unwrap();
        let analysis = OccurrenceAnalysis::new(&system, &queries(), AmbiguityPolicy::Error).unwrap();

        assert_eq!(
            analysis.run(&mut system, "test_files/hbond_degenerate.gro", None),
            Err(HBondError::GeometryError(GeometryError::Degenerate {
                frame: 2,
                from: HBondRole::Donor,
                to: HBondRole::Hydrogen,
            }))
        );
    }

    #[test]
    fn run_degenerate_mark() {
        let mut system = System::from_file("test_files/hbond.gro").unwrap();
        let analysis = OccurrenceAnalysis::new(&system, &queries(), AmbiguityPolicy::Error)
            .unwrap()
            .with_degenerate(DegeneratePolicy::Mark);

        let series = analysis
            .run(&mut system, "test_files/hbond_degenerate.gro", None)
            .unwrap();

        assert_eq!(
            series.get_states(),
            &[FrameState::Bonded, FrameState::Undefined, FrameState::Bonded]
        );
        assert_eq!(series.get_n_undefined(), 1);
        assert_approx_eq!(f64, series.fraction(), 200.0 / 3.0);
    }

    #[test]
    fn run_empty_trajectory() {
        let mut system = System::from_file("test_files/hbond.pdb").unwrap();
        let analysis = OccurrenceAnalysis::new(&system, &queries(), AmbiguityPolicy::Error).unwrap();

        assert_eq!(
            analysis.run(&mut system, "test_files/hbond_empty.dcd", None),
            Err(HBondError::OccurrenceError(OccurrenceError::EmptyTrajectory))
        );
    }

    #[test]
    fn run_unknown_format() {
        let mut system = System::from_file("test_files/hbond.gro").unwrap();
        let analysis = OccurrenceAnalysis::new(&system, &queries(), AmbiguityPolicy::Error).unwrap();

        match analysis.run(&mut system, "test_files/hbond_traj.xtc", None) {
            Err(HBondError::ReadTrajError(ReadTrajError::UnsupportedFormat(_))) => (),
            other => panic!("Unexpected result `{:?}`.", other),
        }
    }

    #[test]
    fn run_mismatch() {
        let mut system = System::from_file("test_files/hbond.gro").unwrap();
        let analysis = OccurrenceAnalysis::new(&system, &queries(), AmbiguityPolicy::Error).unwrap();

        match analysis.run(&mut system, "test_files/hbond_traj_mismatch.gro", None) {
            Err(HBondError::ReadTrajError(ReadTrajError::AtomsNumberMismatch(_))) => (),
            other => panic!("Unexpected result `{:?}`.", other),
        }
    }

    fn config(trajectory: &str, output: &Path) -> ConfigBuilder {
        ConfigBuilder {
            trajectory: Some(trajectory.into()),
            topology: Some("test_files/hbond.pdb".into()),
            output: Some(output.to_path_buf()),
            donor: Some("resSeq 15 and name NZ".to_owned()),
            hydrogen: Some("resSeq 15 and name HZ1".to_owned()),
            acceptor: Some("resSeq 111 and name OE1".to_owned()),
            pre_acceptor: Some("resSeq 111 and name CD".to_owned()),
            ..Default::default()
        }
    }

    #[test]
    fn run_config() {
        let output = NamedTempFile::new().unwrap();
        let config = config("test_files/hbond_traj.dcd", output.path())
            .build()
            .unwrap();

        let series = run(&config).unwrap();
        assert_approx_eq!(f64, series.fraction(), 100.0 / 3.0);

        let mut result = File::open(output.path()).unwrap();
        let mut expected = File::open("test_files/occurrence_expected.dat").unwrap();
        assert!(file_diff::diff_files(&mut result, &mut expected));
    }

    #[test]
    fn run_config_degenerate_mark() {
        let output = NamedTempFile::new().unwrap();
        let mut builder = config("test_files/hbond_degenerate.gro", output.path());
        builder.degenerate = Some(DegeneratePolicy::Mark);

        run(&builder.build().unwrap()).unwrap();

        let mut result = File::open(output.path()).unwrap();
        let mut expected = File::open("test_files/occurrence_degenerate_expected.dat").unwrap();
        assert!(file_diff::diff_files(&mut result, &mut expected));
    }

    #[test]
    fn run_config_no_output_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.dat");

        let config = config("test_files/hbond_degenerate.gro", &output)
            .build()
            .unwrap();

        assert!(run(&config).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn run_config_selection_before_reading() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.dat");

        let mut builder = config("test_files/nonexistent.dcd", &output);
        builder.acceptor = Some("resname ARG".to_owned());

        assert_eq!(
            run(&builder.build().unwrap()),
            Err(HBondError::SelectError(SelectError::NoMatch(
                "resname ARG".to_owned()
            )))
        );
        assert!(!output.exists());
    }

    #[test]
    fn run_config_missing_topology() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("report.dat");

        let mut builder = config("test_files/hbond_traj.dcd", &output);
        builder.topology = Some("test_files/nonexistent.pdb".into());

        match run(&builder.build().unwrap()) {
            Err(HBondError::TopologyError(_)) => (),
            other => panic!("Unexpected result `{:?}`.", other),
        }
    }
}
