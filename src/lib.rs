//! Process planning for machined parts.
//!
//! A part document is loaded into a B-rep [`kernel`], classified as
//! rotational or prismatic, cut into a section profile, checked for deep
//! pockets and thin walls, and turned into a time estimate, an ordered list
//! of setups and a machine recommendation. [`pipeline::plan_part`] runs the
//! whole chain for one part.

pub mod classify;
pub mod constraints;
pub mod error;
pub mod estimate;
pub mod features;
pub mod geometry;
pub mod kernel;
pub mod machine;
pub mod math;
pub mod pipeline;
pub mod profile;
pub mod reference;
pub mod setup;
pub mod topology;

pub use error::{PlanError, Result};
