pub mod curve;
pub mod surface;

pub use curve::{Arc, Curve, CurveDomain, Line, Polyline};
pub use surface::{Cone, Cylinder, Plane, Sphere, Surface, Torus};
