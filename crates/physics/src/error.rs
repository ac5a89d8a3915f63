use thiserror::Error;

use crate::body::BodyHandle;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    #[error("no body registered for {0:?}")]
    UnknownBody(BodyHandle),
    #[error("mass must be zero or positive, got {0}")]
    InvalidMass(f32),
    #[error("triangle mesh shape has no triangles")]
    EmptyTriangleMesh,
    #[error("timestep must be positive and finite, got {0}")]
    InvalidTimestep(f32),
}
