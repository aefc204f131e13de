// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Multi-threaded calculation of the hydrogen bond geometry.

use crate::errors::GeometryError;

use super::geometry::{compute_geometry_range, GeometrySample};
use super::RoleTrajectory;

/// Calculate the geometry of the hydrogen bond for every frame of the trajectory
/// using `n_threads` threads.
///
/// Frames are split into contiguous blocks of (nearly) equal size, each processed
/// by one scoped thread. Results are concatenated in block order, so the output
/// is identical to the output of `compute_geometry`.
///
/// ## Notes
/// - `n_threads` equal to 0 is treated as 1.
/// - No more threads than frames are spawned.
///
/// ## Panics
/// Panics if any of the spawned threads panics.
pub fn compute_geometry_parallel(
    trajectory: &RoleTrajectory,
    n_threads: usize,
) -> Vec<Result<GeometrySample, GeometryError>> {
    let n_frames = trajectory.n_frames();
    let n_threads = n_threads.clamp(1, n_frames.max(1));

    if n_threads == 1 {
        return compute_geometry_range(trajectory, 0, n_frames);
    }

    let block_size = n_frames.div_ceil(n_threads);

    std::thread::scope(|s| {
        let handles = (0..n_threads)
            .map(|n| {
                let start = (n * block_size).min(n_frames);
                let end = ((n + 1) * block_size).min(n_frames);
                s.spawn(move || compute_geometry_range(trajectory, start, end))
            })
            .collect::<Vec<_>>();

        let mut samples = Vec::with_capacity(n_frames);
        for handle in handles {
            samples.extend(handle.join().expect(
                "FATAL HBOND ERROR | compute_geometry_parallel | A thread panicked!",
            ));
        }

        samples
    })
}

/******************************/
/*         UNIT TESTS         */
/******************************/

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hbonds::geometry::compute_geometry;
    use crate::hbonds::RolePositions;
    use crate::structures::vector3d::Vector3D;
    use rand::Rng;

    fn random_trajectory(n_frames: usize) -> RoleTrajectory {
        let mut rng = rand::thread_rng();
        let mut random_point =
            || Vector3D::new(rng.gen_range(0.0..2.0), rng.gen_range(0.0..2.0), rng.gen_range(0.0..2.0));

        let frames = (0..n_frames)
            .map(|_| RolePositions::new(random_point(), random_point(), random_point(), random_point()))
            .collect();

        RoleTrajectory::from_frames(frames)
    }

    #[test]
    fn parallel_matches_serial() {
        let trajectory = random_trajectory(1001);
        let serial = compute_geometry(&trajectory);

        for n_threads in [1, 2, 3, 4, 7, 16] {
            assert_eq!(compute_geometry_parallel(&trajectory, n_threads), serial);
        }
    }

    #[test]
    fn parallel_more_threads_than_frames() {
        let trajectory = random_trajectory(3);
        assert_eq!(
            compute_geometry_parallel(&trajectory, 8),
            compute_geometry(&trajectory)
        );
    }

    #[test]
    fn parallel_zero_threads() {
        let trajectory = random_trajectory(10);
        assert_eq!(
            compute_geometry_parallel(&trajectory, 0),
            compute_geometry(&trajectory)
        );
    }

    #[test]
    fn parallel_empty() {
        let trajectory = RoleTrajectory::from_frames(Vec::new());
        assert!(compute_geometry_parallel(&trajectory, 4).is_empty());
    }

    #[test]
    fn parallel_degenerate_frame_order() {
        let valid = RolePositions::new(
            Vector3D::new(1.0, 1.0, 1.0),
            Vector3D::new(1.1, 1.0, 1.0),
            Vector3D::new(1.3, 1.0, 1.0),
            Vector3D::new(1.4, 1.0, 1.0),
        );
        let degenerate = RolePositions::new(
            Vector3D::new(1.0, 1.0, 1.0),
            Vector3D::new(1.1, 1.0, 1.0),
            Vector3D::new(1.3, 1.0, 1.0),
            Vector3D::new(1.3, 1.0, 1.0),
        );

        let mut frames = vec![valid; 9];
        frames[6] = degenerate;
        let trajectory = RoleTrajectory::from_frames(frames);

        let samples = compute_geometry_parallel(&trajectory, 4);
        assert_eq!(samples.len(), 9);
        for (i, sample) in samples.iter().enumerate() {
            if i == 6 {
                assert_eq!(
                    *sample,
                    Err(GeometryError::Degenerate {
                        frame: 7,
                        from: crate::hbonds::HBondRole::Acceptor,
                        to: crate::hbonds::HBondRole::PreAcceptor,
                    })
                );
            } else {
                assert!(sample.is_ok());
            }
        }
    }
}
