//! Rendering-related tasks for the terrain pipeline.
//!
//! This module contains task implementations that build renderable geometry on
//! worker threads.

pub mod chunk_mesh_generation_task;
