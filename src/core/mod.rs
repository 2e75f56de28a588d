//! # Core Module
//!
//! Concurrency primitives shared by every stage of the terrain pipeline.
//!
//! ## Key Components
//! - `MtResource`: Thread-safe reference-counted value with read-write locking,
//!   used for every chunk and for the terrain's chunk map
//! - `Mailbox`: Lock-guarded append/drain list used to hand work between stages
//!
//! ## Usage
//! ```rust
//! use voxel_terrain::core::{Mailbox, MtResource};
//!
//! let counter = MtResource::new(0);
//! *counter.get_mut() += 1;
//! assert_eq!(*counter.get(), 1);
//!
//! let mailbox = Mailbox::new();
//! mailbox.push(counter.clone());
//! assert_eq!(mailbox.drain().len(), 1);
//! ```

pub mod mailbox;
pub mod mt_resource;

pub use mailbox::Mailbox;
pub use mt_resource::MtResource;
