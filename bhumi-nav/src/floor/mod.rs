//! Floor detection and normalization.
//!
//! Finds the dominant horizontal plane with RANSAC and re-frames the cloud so
//! that plane is z = 0 with +Z pointing up.

mod normalize;
mod plane;
mod ransac;

pub use normalize::{FloorAlignment, FloorConfig, FloorNormalizer, percentile, rotation_to_z};
pub use plane::PlaneModel;
pub use ransac::{RansacConfig, RansacPass, RansacResult, fit_plane};
