//! # Pinball
//!
//! Umbrella crate for the pinball workspace. The binary in `main.rs` wires
//! the pieces together; this library re-exports them so downstream tools and
//! docs can reach every layer from one place:
//!
//! - [`physics`]: rigid-body world, bodies, shapes and fixed-step stepping
//! - [`render`]: scene graph, camera and the optional wgpu window
//! - [`table`]: table assembly, actuators, transform sync and the frame loop

pub use physics;
pub use render;
pub use table;
