//! # Voxel Terrain Core
//!
//! This module contains the terrain data model and everything that writes to it.
//!
//! ## Architecture
//!
//! * **Block**: Block kinds, their faces, and their texture atlas cells
//! * **Chunk**: Dense 16x256x16 columns of blocks, the unit of meshing and upload
//! * **Zone**: 64x64 groups of 16 chunks, the unit of generation
//! * **Terrain**: Owns every chunk, the set of created zones and the stage mailboxes
//! * **Generation**: The height field fill and the river and cave carvers
//! * **Ray**: Grid ray marching for block picking
//! * **Tasks**: The zone generation task run on the worker pool
//!
//! ## Data Flow
//!
//! 1. The coordinator allocates a zone's chunks and dispatches a generation task
//! 2. The task fills the zone and appends its chunks to the block-data mailbox
//! 3. Block edits write through the terrain and re-queue the affected chunks
//!
//! ## Thread Safety
//!
//! * Every chunk sits behind its own read-write lock
//! * Code holds at most one chunk lock at a time
//! * Mailboxes are appended from any thread and drained by the coordinator only

pub mod block;
pub mod chunk;
pub mod generation;
pub mod ray;
pub mod tasks;
pub mod terrain;
pub mod zone;
