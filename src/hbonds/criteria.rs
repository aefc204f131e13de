// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Geometric criteria for deciding whether a hydrogen bond exists.

use getset::CopyGetters;

use crate::errors::CriteriaError;

use super::geometry::GeometrySample;

/// Thresholds of the three-criterion hydrogen bond definition.
///
/// A hydrogen bond exists iff
/// - the hydrogen-acceptor distance is strictly lower than `max_distance`,
/// - the donor-hydrogen-acceptor angle lies in the inclusive range `dha_angle`,
/// - the hydrogen-acceptor-pre-acceptor angle lies in the inclusive range `hapa_angle`.
#[derive(Debug, Clone, Copy, PartialEq, CopyGetters)]
pub struct HBondCriteria {
    /// Distance cutoff in nm. Default: 0.25 nm.
    #[getset(get_copy = "pub")]
    max_distance: f32,
    /// Allowed donor-hydrogen-acceptor angles in degrees. Default: 120-180.
    #[getset(get_copy = "pub")]
    dha_angle: (f32, f32),
    /// Allowed hydrogen-acceptor-pre-acceptor angles in degrees. Default: 90-180.
    #[getset(get_copy = "pub")]
    hapa_angle: (f32, f32),
}

impl Default for HBondCriteria {
    fn default() -> Self {
        HBondCriteria {
            max_distance: 0.25,
            dha_angle: (120.0, 180.0),
            hapa_angle: (90.0, 180.0),
        }
    }
}

impl HBondCriteria {
    /// Construct new criteria.
    ///
    /// ## Returns
    /// - `HBondCriteria` if the thresholds are valid.
    /// - `CriteriaError::InvalidDistance` if the distance cutoff is not a positive finite number.
    /// - `CriteriaError::InvalidAngleRange` if any angle range does not satisfy `0 <= min <= max <= 180`.
    ///
    /// ## Example
    /// ```
    /// use hbond_occurrence::prelude::*;
    ///
    /// let criteria = HBondCriteria::new(0.3, (130.0, 180.0), (90.0, 180.0)).unwrap();
    /// assert!(criteria.is_hbond(&GeometrySample::new(0.29, 150.0, 100.0)));
    ///
    /// assert!(HBondCriteria::new(-0.3, (130.0, 180.0), (90.0, 180.0)).is_err());
    /// ```
    pub fn new(
        max_distance: f32,
        dha_angle: (f32, f32),
        hapa_angle: (f32, f32),
    ) -> Result<Self, CriteriaError> {
        if !max_distance.is_finite() || max_distance <= 0.0 {
            return Err(CriteriaError::InvalidDistance(max_distance));
        }

        for (min, max) in [dha_angle, hapa_angle] {
            if !(0.0..=180.0).contains(&min) || !(0.0..=180.0).contains(&max) || min > max {
                return Err(CriteriaError::InvalidAngleRange(min, max));
            }
        }

        Ok(HBondCriteria {
            max_distance,
            dha_angle,
            hapa_angle,
        })
    }

    /// Returns `true` if the sample satisfies all three criteria.
    #[inline]
    pub fn is_hbond(&self, sample: &GeometrySample) -> bool {
        sample.distance() < self.max_distance
            && in_range(sample.dha_angle(), self.dha_angle)
            && in_range(sample.hapa_angle(), self.hapa_angle)
    }

    /// Classify each sample. The output has the same length and order as the input.
    pub fn classify(&self, samples: &[GeometrySample]) -> Vec<bool> {
        samples.iter().map(|sample| self.is_hbond(sample)).collect()
    }
}

#[inline(always)]
fn in_range(value: f32, (min, max): (f32, f32)) -> bool {
    value >= min && value <= max
}

/******************************/
/*         UNIT TESTS         */
/******************************/
