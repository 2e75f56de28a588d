//! # Voxel Terrain Entry Point
//!
//! Runs the terrain pipeline headless. It calls into the library's `run()` function,
//! which reads `terrain_settings.json` from the working directory when present.
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info cargo run --release
//! ```

fn main() {
    voxel_terrain::run();
}
