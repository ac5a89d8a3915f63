#![deny(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! # Pinball Table
//!
//! The table's own logic on top of the [`physics`] world and the [`render`]
//! scene: which nodes own which bodies, how the two are kept in step every
//! frame, and the actuators the player drives.
//!
//! ## Key Components
//!
//! -   **[`Simulation`]:** the context that owns all table state and runs a
//!     frame: attach loaded models, advance actuators, step physics, sync.
//! -   **Registry and factory:** [`RigidBodyRegistry`] binds nodes to bodies
//!     and lists the dynamic ones; [`create_body`] is the only way bodies are
//!     made.
//! -   **Transform sync:** [`sync_transforms`] reads dynamic bodies into the
//!     scene and pushes [`Actuator`] poses into kinematic bodies.
//! -   **Actuators:** a [`Flipper`] per side and the [`Plunger`].
//! -   **Assembly:** [`assemble`] lays out the playfield, walls, curved
//!     corners and decorations described by a [`TableConfig`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use table::{Gesture, InputEvent, Simulation, TableConfig};
//!
//! let mut sim = Simulation::new(TableConfig::default())?;
//! sim.handle_input(InputEvent::press(Gesture::Charge))?;
//! for _ in 0..60 {
//!     sim.frame(1.0 / 60.0)?;
//! }
//! let shot = sim.handle_input(InputEvent::release(Gesture::Charge))?;
//! ```

pub mod assembly;
pub mod assets;
pub mod config;
pub mod curved;
pub mod error;
pub mod factory;
pub mod flipper;
pub mod input;
pub mod plunger;
pub mod registry;
pub mod simulation;
pub mod sync;
pub mod tween;

pub use assembly::{assemble, spawn_ball, Ball, Layout, Stage};
pub use assets::{AssetLoader, AssetRequest, LoadedAsset, Placement, SceneFragment};
pub use config::TableConfig;
pub use error::{AssetError, ConfigError, InputError, TableError};
pub use factory::{create_body, BodySpec};
pub use flipper::{Flipper, FlipperSide};
pub use input::{Edge, Gesture, InputEvent, InputScript, KeyBindings};
pub use plunger::{Plunger, PlungerState, PlungerTunables, Shot};
pub use registry::RigidBodyRegistry;
pub use simulation::{FrameReport, Simulation};
pub use sync::{sync_transforms, Actuator, SyncReport};
pub use tween::{Animated, Ease, Tween, TweenStep};
