use std::path::Path;

use tracing::debug;

use crate::error::{GeometryError, KernelResult, TopologyError};
use crate::features::DeclaredFeature;
use crate::math::Point3;
use crate::topology::{FaceData, FaceSurface, SolidId, TopologyStore};

use super::{bounds, distance, document, mass, section};
use super::{Aabb, CutPlane, FaceIndex, FaceInfo, GeometryKernel, MassProperties, SectionEdge, SurfaceInfo};

/// The boundary-representation kernel. Stateless; every loaded shape owns
/// its own topology arena.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrepKernel;

/// A loaded solid. Dropping it releases its topology.
#[derive(Debug)]
pub struct BrepShape {
    name: String,
    store: TopologyStore,
    solid: SolidId,
    declared: Vec<DeclaredFeature>,
}

impl BrepShape {
    pub(crate) fn new(name: &str, store: TopologyStore, solid: SolidId) -> Self {
        Self {
            name: name.to_owned(),
            store,
            solid,
            declared: Vec::new(),
        }
    }

    pub(crate) fn with_declared_features(mut self, features: Vec<DeclaredFeature>) -> Self {
        self.declared = features;
        self
    }

    /// Part name from the source document.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    fn face_data(&self) -> KernelResult<Vec<&FaceData>> {
        let solid = self.store.solid(self.solid)?;
        let mut faces = Vec::with_capacity(solid.faces.len());
        for &id in &solid.faces {
            faces.push(self.store.face(id)?);
        }
        Ok(faces)
    }

    fn face(&self, index: FaceIndex) -> KernelResult<&FaceData> {
        let solid = self.store.solid(self.solid)?;
        let id = solid
            .faces
            .get(index)
            .ok_or_else(|| TopologyError::EntityNotFound(format!("face {index}")))?;
        Ok(self.store.face(*id)?)
    }
}

fn surface_info(surface: &FaceSurface) -> SurfaceInfo {
    match surface {
        FaceSurface::Plane(s) => SurfaceInfo::Plane {
            origin: *s.origin(),
            normal: *s.plane_normal(),
        },
        FaceSurface::Cylinder(s) => SurfaceInfo::Cylinder {
            location: *s.location(),
            axis: *s.axis(),
            radius: s.radius(),
        },
        FaceSurface::Cone(s) => SurfaceInfo::Cone {
            apex: *s.apex(),
            axis: *s.axis(),
            half_angle: s.half_angle(),
        },
        FaceSurface::Torus(s) => SurfaceInfo::Torus {
            center: *s.center(),
            axis: *s.axis(),
            major_radius: s.major_radius(),
            minor_radius: s.minor_radius(),
        },
        FaceSurface::Sphere(s) => SurfaceInfo::Sphere {
            center: *s.center(),
            radius: s.radius(),
        },
    }
}

impl GeometryKernel for BrepKernel {
    type Shape = BrepShape;

    fn load(&self, path: &Path) -> KernelResult<BrepShape> {
        let shape = document::load_part(path)?;
        debug!(path = %path.display(), part = shape.name(), "loaded part document");
        Ok(shape)
    }

    fn faces(&self, shape: &BrepShape) -> KernelResult<Vec<FaceInfo>> {
        Ok(shape
            .face_data()?
            .into_iter()
            .enumerate()
            .map(|(index, face)| FaceInfo {
                index,
                surface: surface_info(&face.surface),
                reversed: face.reversed,
            })
            .collect())
    }

    fn bounding_box(&self, shape: &BrepShape) -> KernelResult<Aabb> {
        let mut bbox = Aabb::empty();
        for face in shape.face_data()? {
            bbox.merge(&bounds::face_bounds(&shape.store, face)?);
        }
        if bbox.is_empty() {
            return Err(GeometryError::Degenerate("shape has no faces".into()).into());
        }
        Ok(bbox)
    }

    fn face_bounding_box(&self, shape: &BrepShape, face: FaceIndex) -> KernelResult<Aabb> {
        bounds::face_bounds(&shape.store, shape.face(face)?)
    }

    fn mass_properties(&self, shape: &BrepShape) -> KernelResult<MassProperties> {
        mass::mass_properties(&shape.store, &shape.face_data()?)
    }

    fn section(&self, shape: &BrepShape, plane: &CutPlane) -> KernelResult<Vec<SectionEdge>> {
        let mut edges = Vec::new();
        for face in shape.face_data()? {
            edges.extend(section::section_face(&shape.store, face, plane)?);
        }
        Ok(edges)
    }

    fn sample_curve(&self, edge: &SectionEdge, params: &[f64]) -> Vec<Point3> {
        params.iter().map(|&t| edge.point_at(t)).collect()
    }

    fn face_distance(&self, shape: &BrepShape, a: FaceIndex, b: FaceIndex) -> KernelResult<f64> {
        distance::face_distance(&shape.store, shape.face(a)?, shape.face(b)?)
    }

    fn declared_features(&self, shape: &BrepShape) -> Vec<DeclaredFeature> {
        shape.declared.clone()
    }
}
