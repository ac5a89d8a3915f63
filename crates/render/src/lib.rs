#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Table Rendering
//!
//! The visual side of the pinball table: a scene graph of positioned,
//! oriented and scaled nodes, a perspective camera, and CPU triangulation of
//! the primitive shapes. With the `window` feature a `winit` + `wgpu`
//! [`Renderer`] draws the scene and reports key presses.

pub mod camera;
pub mod gpu_types;
pub mod mesh;
#[cfg(feature = "window")]
pub mod renderer;
pub mod scene;

pub use camera::Camera;
pub use gpu_types::{CameraUniform, Vertex};
pub use mesh::triangulate;
#[cfg(feature = "window")]
pub use renderer::{FrameInput, KeyEdge, Renderer};
pub use scene::{rgb, Geometry, Node, NodeId, SceneGraph};
