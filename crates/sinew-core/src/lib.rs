//! Sinew Core - Foundational types for the Sinew animation runtime
//!
//! This crate provides the types that every other Sinew crate depends on:
//! - `InstanceId` - Identifiers for animated model instances
//! - `Transform` - Translation/rotation/scale decomposition
//! - Error types and Result alias

mod error;
mod id;
mod types;

pub use error::{Result, SinewError};
pub use id::InstanceId;
pub use types::Transform;
