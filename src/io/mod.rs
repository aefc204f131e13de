// Released under MIT License.
// Copyright (c) 2023-2025 Ladislav Bartos

//! Implementation of functions for reading structure and trajectory files.

pub mod dcd_io;
pub mod gro_io;
pub mod pdb_io;
pub mod traj_io;
