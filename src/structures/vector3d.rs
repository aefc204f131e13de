// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of methods for three-dimensional vector.

use std::ops::{Deref, DerefMut};

use nalgebra::base::Vector3;

/// Describes length and orientation of a vector in space or a position of a point in space.
/// Implemented using `nalgebra`'s Vector3.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct Vector3D(pub(crate) Vector3<f32>);

impl From<[f32; 3]> for Vector3D {
    #[inline]
    fn from(arr: [f32; 3]) -> Self {
        Vector3D(Vector3::new(arr[0], arr[1], arr[2]))
    }
}

impl Default for Vector3D {
    /// Null vector.
    #[inline]
    fn default() -> Self {
        Vector3D(Vector3::zeros())
    }
}

/// Allows accessing fields of `Vector3D` as `.x`, `.y`, and `.z`.
#[repr(C)]
pub struct Vector3Raw {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Deref for Vector3D {
    type Target = Vector3Raw;

    #[inline]
    fn deref(&self) -> &Self::Target {
        unsafe { &*(self.0.as_ptr() as *const Vector3Raw) }
    }
}

impl DerefMut for Vector3D {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        unsafe { &mut *(self.0.as_mut_ptr() as *mut Vector3Raw) }
    }
}

impl Vector3D {
    /// Create a new `Vector3D` structure.
    #[inline]
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Vector3D(Vector3::new(x, y, z))
    }

    /// Calculate length of the vector.
    ///
    /// ## Example
    /// ```
    /// # use hbond_occurrence::prelude::*;
    /// # use float_cmp::assert_approx_eq;
    /// #
    /// let vector = Vector3D::new(1.0, 2.0, 3.0);
    /// assert_approx_eq!(f32, vector.len(), 3.741657);
    /// ```
    #[inline]
    pub fn len(&self) -> f32 {
        self.0.magnitude()
    }

    /// Returns `true` if all components of the vector are exactly zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// Convert vector to unit vector.
    ///
    /// ## Notes
    /// - Returns `None` for a null vector, for which the direction is undefined.
    ///
    /// ## Example
    /// ```
    /// # use hbond_occurrence::prelude::*;
    /// # use float_cmp::assert_approx_eq;
    /// #
    /// let vector = Vector3D::new(1.0, 2.0, 3.0).to_unit().unwrap();
    ///
    /// assert_approx_eq!(f32, vector.x, 0.2672612);
    /// assert_approx_eq!(f32, vector.y, 0.5345225);
    /// assert_approx_eq!(f32, vector.z, 0.8017837);
    /// assert_approx_eq!(f32, vector.len(), 1.0);
    ///
    /// assert!(Vector3D::new(0.0, 0.0, 0.0).to_unit().is_none());
    /// ```
    #[inline]
    pub fn to_unit(self) -> Option<Vector3D> {
        if self.is_zero() {
            return None;
        }

        self.0.try_normalize(0.0).map(Vector3D)
    }

    /// Calculate the dot product of two vectors.
    ///
    /// ## Example
    /// ```
    /// # use hbond_occurrence::prelude::*;
    /// # use float_cmp::assert_approx_eq;
    /// #
    /// let vector1 = Vector3D::new(4.0, 2.0, -1.0);
    /// let vector2 = Vector3D::new(1.0, -3.0, 2.0);
    ///
    /// assert_approx_eq!(f32, vector1.dot(&vector2), -4.0);
    /// ```
    #[inline]
    pub fn dot(&self, vector: &Vector3D) -> f32 {
        self.0.dot(&vector.0)
    }

    /// Calculate the angle between two vectors. Returns angle in degrees.
    ///
    /// The vectors are converted to unit vectors and the arccosine of their dot product is taken.
    /// The dot product is clamped to [-1, 1] first, so (anti)parallel vectors
    /// never produce NaN due to rounding.
    ///
    /// ## Returns
    /// - Angle between 0 and 180 degrees.
    /// - `None` if any of the vectors is a null vector.
    ///
    /// ## Example
    /// ```
    /// # use hbond_occurrence::prelude::*;
    /// # use float_cmp::assert_approx_eq;
    /// #
    /// let vector1 = Vector3D::new(1.0, 0.0, 0.0);
    /// let vector2 = Vector3D::new(0.0, 2.0, 0.0);
    ///
    /// assert_approx_eq!(f32, vector1.angle(&vector2).unwrap(), 90.0);
    /// ```
    #[inline]
    pub fn angle(&self, vector: &Vector3D) -> Option<f32> {
        let unit1 = self.to_unit()?;
        let unit2 = vector.to_unit()?;

        let cos = unit1.dot(&unit2).clamp(-1.0, 1.0);
        Some(cos.acos().to_degrees().clamp(0.0, 180.0))
    }

    /// Calculate the vector pointing from `self` to `point`.
    /// Periodic boundary conditions are not taken into account.
    ///
    /// ## Example
    /// ```
    /// # use hbond_occurrence::prelude::*;
    /// # use float_cmp::assert_approx_eq;
    /// #
    /// let point1 = Vector3D::new(1.0, 2.0, 3.0);
    /// let point2 = Vector3D::new(1.5, 1.0, 3.0);
    ///
    /// let vector = point1.vector_to(&point2);
    /// assert_approx_eq!(f32, vector.x, 0.5);
    /// assert_approx_eq!(f32, vector.y, -1.0);
    /// assert_approx_eq!(f32, vector.z, 0.0);
    /// ```
    #[inline]
    pub fn vector_to(&self, point: &Vector3D) -> Vector3D {
        Vector3D(point.0 - self.0)
    }

    /// Calculate the Euclidean distance between two points.
    /// Periodic boundary conditions are not taken into account.
    #[inline]
    pub fn distance_naive(&self, point: &Vector3D) -> f32 {
        self.vector_to(point).len()
    }
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rand::Rng;

    #[test]
    fn new() {
        let vec = Vector3D::new(0.5, 1.2, -3.4);

        assert_eq!(vec.x, 0.5);
        assert_eq!(vec.y, 1.2);
        assert_eq!(vec.z, -3.4);
    }

    #[test]
    fn from_array() {
        let vec = Vector3D::from([0.5, 1.2, -3.4]);
        assert_eq!(vec, Vector3D::new(0.5, 1.2, -3.4));
    }

    #[test]
    fn default_is_zero() {
        let vec = Vector3D::default();
        assert!(vec.is_zero());
        assert_eq!(vec.len(), 0.0);
    }

    #[test]
    fn deref_mut() {
        let mut vec = Vector3D::new(0.5, 1.2, -3.4);
        vec.x = 4.0;
        vec.z += 1.0;

        assert_approx_eq!(f32, vec.x, 4.0);
        assert_approx_eq!(f32, vec.y, 1.2);
        assert_approx_eq!(f32, vec.z, -2.4);
    }

    #[test]
    fn len() {
        let vec = Vector3D::new(0.5, 1.2, -3.4);
        assert_approx_eq!(f32, vec.len(), 3.6400549);
    }

    #[test]
    fn to_unit() {
        let vec = Vector3D::new(0.0, -4.0, 0.0).to_unit().unwrap();

        assert_approx_eq!(f32, vec.x, 0.0);
        assert_approx_eq!(f32, vec.y, -1.0);
        assert_approx_eq!(f32, vec.z, 0.0);
    }

    #[test]
    fn to_unit_null() {
        assert!(Vector3D::default().to_unit().is_none());
    }

    #[test]
    fn dot() {
        let vec1 = Vector3D::new(0.5, 1.2, -3.4);
        let vec2 = Vector3D::new(-1.0, 2.0, 0.5);

        assert_approx_eq!(f32, vec1.dot(&vec2), 0.2);
    }

    #[test]
    fn angle_identical() {
        let vec1 = Vector3D::new(0.0, 0.0, 1.0);
        let vec2 = Vector3D::new(0.0, 0.0, 3.5);

        assert_eq!(vec1.angle(&vec2).unwrap(), 0.0);
    }

    #[test]
    fn angle_antiparallel() {
        let vec1 = Vector3D::new(0.2, 0.0, 0.0);
        let vec2 = Vector3D::new(-0.7, 0.0, 0.0);

        assert_eq!(vec1.angle(&vec2).unwrap(), 180.0);
    }

    #[test]
    fn angle_general() {
        let vec1 = Vector3D::new(1.0, 2.0, 3.0);
        let vec2 = Vector3D::new(3.0, 2.0, 1.0);

        assert_approx_eq!(f32, vec1.angle(&vec2).unwrap(), 44.415308, epsilon = 1e-4);
    }

    #[test]
    fn angle_null() {
        let vec1 = Vector3D::new(1.0, 2.0, 3.0);
        let vec2 = Vector3D::default();

        assert!(vec1.angle(&vec2).is_none());
        assert!(vec2.angle(&vec1).is_none());
    }

    #[test]
    fn angle_never_nan() {
        let mut rng = rand::thread_rng();

        for _ in 0..1000 {
            let vec = Vector3D::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
            );

            let scaled = Vector3D::new(vec.x * 3.7, vec.y * 3.7, vec.z * 3.7);
            let inverted = Vector3D::new(-vec.x, -vec.y, -vec.z);

            let parallel = vec.angle(&scaled).unwrap();
            let antiparallel = vec.angle(&inverted).unwrap();

            assert!(!parallel.is_nan());
            assert!(!antiparallel.is_nan());
            assert!((0.0..=180.0).contains(&parallel));
            assert!((0.0..=180.0).contains(&antiparallel));
        }
    }

    #[test]
    fn vector_to() {
        let point1 = Vector3D::new(1.0, 2.0, 3.0);
        let point2 = Vector3D::new(-1.0, 2.5, 4.0);

        let vec = point1.vector_to(&point2);
        assert_approx_eq!(f32, vec.x, -2.0);
        assert_approx_eq!(f32, vec.y, 0.5);
        assert_approx_eq!(f32, vec.z, 1.0);
    }

    #[test]
    fn distance_naive_symmetric() {
        let mut rng = rand::thread_rng();

        for _ in 0..100 {
            let point1 = Vector3D::new(
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
            );
            let point2 = Vector3D::new(
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
            );

            assert_eq!(
                point1.distance_naive(&point2),
                point2.distance_naive(&point1)
            );
        }
    }
}
