//! # Voxel Task System
//!
//! This module contains tasks related to voxel world generation. They run on the
//! worker pool so that filling a zone never stalls the coordinator's tick.

pub mod chunk_generation_task;
