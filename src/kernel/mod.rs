//! Geometry kernel adapter.
//!
//! The planning stages see solids only through [`GeometryKernel`]: a handful
//! of read-only queries returning plain value records. [`BrepKernel`] is the
//! boundary-representation implementation shipped with the crate.

mod bounds;
mod brep;
pub mod builder;
pub mod document;
mod distance;
mod mass;
mod region;
mod section;

pub use brep::{BrepKernel, BrepShape};
pub use builder::{HoleEntry, HoleSpec, PocketSpec, Prism, Revolve};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::KernelResult;
use crate::features::DeclaredFeature;
use crate::geometry::curve::{Arc, Curve, CurveDomain, Line, Polyline};
use crate::math::{Point3, Vector3};

/// Position of a face in a shape's face iteration order.
pub type FaceIndex = usize;

/// Surface type of a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceKind {
    Plane,
    Cylinder,
    Cone,
    Torus,
    Sphere,
}

/// Surface type and parameters of a face, in model coordinates.
///
/// Normals and axes are unit vectors. Plane normals are the natural surface
/// normal; combine with [`FaceInfo::reversed`] for the outward direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SurfaceInfo {
    Plane {
        origin: Point3,
        normal: Vector3,
    },
    Cylinder {
        location: Point3,
        axis: Vector3,
        radius: f64,
    },
    Cone {
        apex: Point3,
        axis: Vector3,
        half_angle: f64,
    },
    Torus {
        center: Point3,
        axis: Vector3,
        major_radius: f64,
        minor_radius: f64,
    },
    Sphere {
        center: Point3,
        radius: f64,
    },
}

impl SurfaceInfo {
    #[must_use]
    pub fn kind(&self) -> SurfaceKind {
        match self {
            Self::Plane { .. } => SurfaceKind::Plane,
            Self::Cylinder { .. } => SurfaceKind::Cylinder,
            Self::Cone { .. } => SurfaceKind::Cone,
            Self::Torus { .. } => SurfaceKind::Torus,
            Self::Sphere { .. } => SurfaceKind::Sphere,
        }
    }

    /// Axis line (a point on it and its direction) of cylinders, cones and tori.
    #[must_use]
    pub fn rotation_axis(&self) -> Option<(Point3, Vector3)> {
        match *self {
            Self::Cylinder { location, axis, .. } => Some((location, axis)),
            Self::Cone { apex, axis, .. } => Some((apex, axis)),
            Self::Torus { center, axis, .. } => Some((center, axis)),
            Self::Plane { .. } | Self::Sphere { .. } => None,
        }
    }

    /// Cylinder radius, zero for every other surface type.
    #[must_use]
    pub fn cylinder_radius(&self) -> f64 {
        match *self {
            Self::Cylinder { radius, .. } => radius,
            _ => 0.0,
        }
    }
}

/// One face of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FaceInfo {
    pub index: FaceIndex,
    pub surface: SurfaceInfo,
    /// Outward normal opposes the natural surface normal. Internal
    /// cylinders (holes, bores) are reversed.
    pub reversed: bool,
}

impl FaceInfo {
    /// Outward unit normal of a planar face.
    #[must_use]
    pub fn outward_plane_normal(&self) -> Option<Vector3> {
        match self.surface {
            SurfaceInfo::Plane { normal, .. } => Some(if self.reversed { -normal } else { normal }),
            _ => None,
        }
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    /// An inverted box that any point will grow.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY),
            max: Point3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn include(&mut self, p: &Point3) {
        self.min = self.min.inf(p);
        self.max = self.max.sup(p);
    }

    pub fn merge(&mut self, other: &Self) {
        if !other.is_empty() {
            self.include(&other.min);
            self.include(&other.max);
        }
    }

    #[must_use]
    pub fn extent(&self) -> Vector3 {
        self.max - self.min
    }

    #[must_use]
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    #[must_use]
    pub fn volume(&self) -> f64 {
        let e = self.extent();
        e.x * e.y * e.z
    }
}

/// Volume and centroid of a solid, assuming unit density.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MassProperties {
    /// Cubic millimetres.
    pub volume: f64,
    pub center_of_mass: Point3,
}

/// A cutting plane through `origin` with unit `normal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CutPlane {
    pub origin: Point3,
    pub normal: Vector3,
}

impl CutPlane {
    /// Creates a cutting plane, normalizing `normal`.
    #[must_use]
    pub fn new(origin: Point3, normal: Vector3) -> Self {
        Self {
            origin,
            normal: normal.normalize(),
        }
    }
}

/// Coarse curve classification used to choose a sampling density.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurveKind {
    Line,
    Circle,
    Other,
}

/// Curve of a section edge.
#[derive(Debug, Clone)]
pub enum SectionCurve {
    Line(Line),
    Arc(Arc),
    /// Sampled intersection with a cone, torus or sphere.
    Polyline(Polyline),
}

/// One edge of a planar section, bounded by a parameter domain.
#[derive(Debug, Clone)]
pub struct SectionEdge {
    pub curve: SectionCurve,
    pub domain: CurveDomain,
}

impl SectionEdge {
    pub(crate) fn line(line: Line, length: f64) -> Self {
        Self {
            curve: SectionCurve::Line(line),
            domain: CurveDomain::new(0.0, length),
        }
    }

    pub(crate) fn arc(arc: Arc, start: f64, end: f64) -> Self {
        Self {
            curve: SectionCurve::Arc(arc),
            domain: CurveDomain::new(start, end),
        }
    }

    pub(crate) fn polyline(polyline: Polyline) -> Self {
        let domain = polyline.domain();
        Self {
            curve: SectionCurve::Polyline(polyline),
            domain,
        }
    }

    #[must_use]
    pub fn kind(&self) -> CurveKind {
        match self.curve {
            SectionCurve::Line(_) => CurveKind::Line,
            SectionCurve::Arc(_) => CurveKind::Circle,
            SectionCurve::Polyline(_) => CurveKind::Other,
        }
    }

    /// Evaluates the edge's curve at `t`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3 {
        match &self.curve {
            SectionCurve::Line(c) => c.evaluate(t),
            SectionCurve::Arc(c) => c.evaluate(t),
            SectionCurve::Polyline(c) => c.evaluate(t),
        }
    }
}

/// Read-only queries the planning pipeline needs from a solid modeler.
///
/// A `Shape` is owned by the caller that loaded it and released when dropped.
/// Implementations must return faces in a deterministic order.
pub trait GeometryKernel {
    type Shape;

    /// Loads a solid from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not describe a valid solid.
    fn load(&self, path: &Path) -> KernelResult<Self::Shape>;

    /// All faces with their surface type and parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the shape's topology is inconsistent.
    fn faces(&self, shape: &Self::Shape) -> KernelResult<Vec<FaceInfo>>;

    /// Axis-aligned bounding box of the whole shape.
    ///
    /// # Errors
    ///
    /// Returns an error if the shape's topology is inconsistent.
    fn bounding_box(&self, shape: &Self::Shape) -> KernelResult<Aabb>;

    /// Axis-aligned bounding box of one face.
    ///
    /// # Errors
    ///
    /// Returns an error if `face` is out of range.
    fn face_bounding_box(&self, shape: &Self::Shape, face: FaceIndex) -> KernelResult<Aabb>;

    /// Volume and center of mass.
    ///
    /// # Errors
    ///
    /// Returns an error if the solid encloses no volume.
    fn mass_properties(&self, shape: &Self::Shape) -> KernelResult<MassProperties>;

    /// Intersects the shape's boundary with a plane.
    ///
    /// # Errors
    ///
    /// Returns an error if the section cannot be computed.
    fn section(&self, shape: &Self::Shape, plane: &CutPlane) -> KernelResult<Vec<SectionEdge>>;

    /// Evaluates a section edge at the given parameters.
    fn sample_curve(&self, edge: &SectionEdge, params: &[f64]) -> Vec<Point3>;

    /// Minimum distance between two faces.
    ///
    /// # Errors
    ///
    /// Returns an error if either face is out of range.
    fn face_distance(&self, shape: &Self::Shape, a: FaceIndex, b: FaceIndex) -> KernelResult<f64>;

    /// Machining features declared by the shape's source document, if any.
    fn declared_features(&self, _shape: &Self::Shape) -> Vec<DeclaredFeature> {
        Vec::new()
    }
}
