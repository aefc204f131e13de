// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Calculation of the hydrogen bond geometry: hydrogen-acceptor distance
//! and donor-hydrogen-acceptor and hydrogen-acceptor-pre-acceptor angles.

use getset::CopyGetters;

use crate::errors::GeometryError;
use crate::structures::vector3d::Vector3D;

use super::{HBondRole, RolePositions, RoleTrajectory};

/// Geometric properties of a hydrogen bond in a single frame.
#[derive(Debug, Clone, Copy, PartialEq, CopyGetters)]
pub struct GeometrySample {
    /// Distance between the hydrogen and the acceptor (in nm).
    #[getset(get_copy = "pub")]
    distance: f32,
    /// Donor-hydrogen-acceptor angle (in degrees).
    #[getset(get_copy = "pub")]
    dha_angle: f32,
    /// Hydrogen-acceptor-pre-acceptor angle (in degrees).
    #[getset(get_copy = "pub")]
    hapa_angle: f32,
}

impl GeometrySample {
    /// Create a new sample from already calculated values.
    pub fn new(distance: f32, dha_angle: f32, hapa_angle: f32) -> Self {
        GeometrySample {
            distance,
            dha_angle,
            hapa_angle,
        }
    }

    /// Calculate the geometry of the hydrogen bond from positions of the atoms.
    /// `frame` is the 1-based number of the frame used in error reporting.
    ///
    /// ## Returns
    /// - `GeometrySample` with the distance in nm and the angles in degrees.
    /// - `GeometryError::Degenerate` if any two consecutive atoms of the
    ///   donor-hydrogen-acceptor-pre-acceptor chain share the same position.
    ///
    /// ## Example
    /// ```
    /// use hbond_occurrence::prelude::*;
    /// use float_cmp::assert_approx_eq;
    ///
    /// let positions = RolePositions::new(
    ///     Vector3D::new(1.0, 1.0, 1.0),
    ///     Vector3D::new(1.1, 1.0, 1.0),
    ///     Vector3D::new(1.3, 1.0, 1.0),
    ///     Vector3D::new(1.4, 1.0, 1.0),
    /// );
    ///
    /// let sample = GeometrySample::from_positions(&positions, 1).unwrap();
    /// assert_approx_eq!(f32, sample.distance(), 0.2, epsilon = 1e-6);
    /// assert_approx_eq!(f32, sample.dha_angle(), 180.0);
    /// assert_approx_eq!(f32, sample.hapa_angle(), 180.0);
    /// ```
    pub fn from_positions(positions: &RolePositions, frame: usize) -> Result<Self, GeometryError> {
        let donor = positions.donor();
        let hydrogen = positions.hydrogen();
        let acceptor = positions.acceptor();
        let pre_acceptor = positions.pre_acceptor();

        let degenerate = |from, to| GeometryError::Degenerate { frame, from, to };

        let hydrogen_donor = nonzero(hydrogen.vector_to(donor))
            .ok_or_else(|| degenerate(HBondRole::Donor, HBondRole::Hydrogen))?;
        let hydrogen_acceptor = nonzero(hydrogen.vector_to(acceptor))
            .ok_or_else(|| degenerate(HBondRole::Hydrogen, HBondRole::Acceptor))?;
        let acceptor_pre_acceptor = nonzero(acceptor.vector_to(pre_acceptor))
            .ok_or_else(|| degenerate(HBondRole::Acceptor, HBondRole::PreAcceptor))?;
        let acceptor_hydrogen = Vector3D::new(
            -hydrogen_acceptor.x,
            -hydrogen_acceptor.y,
            -hydrogen_acceptor.z,
        );

        let dha_angle = hydrogen_donor.angle(&hydrogen_acceptor).expect(
            "FATAL HBOND ERROR | GeometrySample::from_positions | Angle between normalizable vectors is undefined.",
        );
        let hapa_angle = acceptor_hydrogen.angle(&acceptor_pre_acceptor).expect(
            "FATAL HBOND ERROR | GeometrySample::from_positions | Angle between normalizable vectors is undefined.",
        );

        Ok(GeometrySample {
            distance: hydrogen_acceptor.len(),
            dha_angle,
            hapa_angle,
        })
    }
}

/// Returns `None` if the vector cannot be normalized, including vectors
/// whose length underflows to zero.
#[inline(always)]
fn nonzero(vector: Vector3D) -> Option<Vector3D> {
    vector.to_unit().map(|_| vector)
}

/// Calculate the geometry of the hydrogen bond for every frame of the trajectory.
/// The result for each frame is independent of the other frames.
pub fn compute_geometry(trajectory: &RoleTrajectory) -> Vec<Result<GeometrySample, GeometryError>> {
    compute_geometry_range(trajectory, 0, trajectory.n_frames())
}

/// Calculate the geometry for frames with indices `start..end`.
pub(super) fn compute_geometry_range(
    trajectory: &RoleTrajectory,
    start: usize,
    end: usize,
) -> Vec<Result<GeometrySample, GeometryError>> {
    trajectory.get_frames()[start..end]
        .iter()
        .enumerate()
        .map(|(i, positions)| GeometrySample::from_positions(positions, start + i + 1))
        .collect()
}

/******************************/
/*         UNIT TESTS         */
/******************************/
