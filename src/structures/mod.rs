// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of various structures used in the `hbond_occurrence` library.

pub mod atom;
pub mod traj_convert;
pub mod vector3d;
