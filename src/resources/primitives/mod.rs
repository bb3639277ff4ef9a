//! Parametric primitive generators.
//!
//! Every generator returns a [`Geometry`](crate::resources::Geometry) with
//! `position`, `normal` and `uv` attributes, a `u32` index list and computed
//! bounding volumes. Conventions are Y-up and counter-clockwise front faces.

pub mod box_shape;
pub mod cylinder;
pub mod plane;
pub mod shape;
pub mod sphere;
pub mod torus;

pub use box_shape::create_box;
pub use cylinder::{CylinderOptions, create_cone, create_cylinder};
pub use plane::{PlaneOptions, create_plane};
pub use shape::{create_heart, create_shape, create_triangle};
pub use sphere::{SphereOptions, create_sphere};
pub use torus::{TorusOptions, create_torus};
