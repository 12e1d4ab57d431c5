//! Core traits for GeoFlow.
//!
//! - [`Resolver`] - IP-to-geolocation lookup backend
//! - [`Transform`] - batch processor invoked by the host

mod resolver;
mod transform;

pub use resolver::Resolver;
pub use transform::Transform;
