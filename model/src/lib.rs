//! Typed in-memory map model for mapsync.
//!
//! A [`Map`] is built once from a bundle (or created blank), edited in place,
//! and written back to a bundle on save. Groups own their layers; images are
//! referenced by index.
//!
//! # Invariants
//!
//! - A map has exactly one game layer. Its group is the physics group.
//! - Every tile-bearing layer holds exactly `width * height` cells.
//! - Image references are in range.

mod blank;
mod error;
mod layer;
mod load;
mod map;
mod save;

pub use error::{MapError, MapResult};
pub use layer::{Layer, PhysicsLayer, QuadsLayer, TilesLayer};
pub use map::{Group, Image, Map};
