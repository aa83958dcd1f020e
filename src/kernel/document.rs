//! JSON part documents: the on-disk solid format [`BrepKernel`](super::BrepKernel) loads.
//!
//! ```json
//! {
//!   "name": "spindle",
//!   "body": {
//!     "type": "revolve",
//!     "axis": { "origin": [0, 0, 0], "direction": [0, 0, 1] },
//!     "start": [0, 0],
//!     "segments": [
//!       { "kind": "line", "to": [20, 0] },
//!       { "kind": "line", "to": [20, 60] },
//!       { "kind": "arc", "to": [18, 62], "center": [18, 60] },
//!       { "kind": "line", "to": [0, 62] }
//!     ]
//!   },
//!   "features": [{ "kind": "radial_drill", "position": [20, 0, 30] }]
//! }
//! ```
//!
//! Revolve profiles are `(r, z)` pairs and close back to `start` with a
//! straight line when the last segment ends elsewhere.

use std::f64::consts::TAU;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DocumentError, KernelResult};
use crate::features::DeclaredFeature;
use crate::math::polygon_2d::BoundarySegment;
use crate::math::{Point2, Point3, Vector3, LINEAR_TOLERANCE};

use super::builder::{HoleSpec, PocketSpec, Prism, Revolve};
use super::BrepShape;

/// A part file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartDocument {
    /// Defaults to the file stem.
    #[serde(default)]
    pub name: Option<String>,
    pub body: BodySpec,
    #[serde(default)]
    pub features: Vec<DeclaredFeature>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BodySpec {
    Revolve {
        #[serde(default)]
        axis: AxisSpec,
        start: Point2,
        segments: Vec<ProfileStep>,
    },
    Prism {
        outline: Vec<Point2>,
        height: f64,
        #[serde(default)]
        holes: Vec<HoleSpec>,
        #[serde(default)]
        pockets: Vec<PocketSpec>,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AxisSpec {
    pub origin: Point3,
    pub direction: Vector3,
}

impl Default for AxisSpec {
    fn default() -> Self {
        Self {
            origin: Point3::origin(),
            direction: Vector3::z(),
        }
    }
}

/// One step of a revolve profile, continuing from the previous end point.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProfileStep {
    Line {
        to: Point2,
    },
    /// Counter-clockwise in `(r, z)` unless `clockwise` is set. An arc that
    /// ends where it starts is a full circle.
    Arc {
        to: Point2,
        center: Point2,
        #[serde(default)]
        clockwise: bool,
    },
}

/// Reads and builds a part file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not a valid document, or
/// describes an invalid solid.
pub fn load_part(path: &Path) -> KernelResult<BrepShape> {
    let text = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("part");
    parse_part(&text, stem)
}

/// Builds a part from document text.
///
/// # Errors
///
/// Returns an error if the text is not a valid document or describes an
/// invalid solid.
pub fn parse_part(text: &str, default_name: &str) -> KernelResult<BrepShape> {
    let doc: PartDocument = serde_json::from_str(text).map_err(DocumentError::from)?;
    doc.build(default_name)
}

impl PartDocument {
    /// Builds the solid and attaches the declared features.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is invalid.
    pub fn build(&self, default_name: &str) -> KernelResult<BrepShape> {
        let name = self.name.as_deref().unwrap_or(default_name);
        let shape = match &self.body {
            BodySpec::Revolve { axis, start, segments } => {
                let profile = profile_segments(*start, segments)?;
                Revolve::new(axis.origin, axis.direction, profile)?.build(name)?
            }
            BodySpec::Prism {
                outline,
                height,
                holes,
                pockets,
            } => {
                let prism = holes.iter().cloned().fold(Prism::new(outline.clone(), *height), Prism::with_hole);
                pockets.iter().cloned().fold(prism, Prism::with_pocket).build(name)?
            }
        };
        Ok(shape.with_declared_features(self.features.clone()))
    }
}

fn profile_segments(start: Point2, steps: &[ProfileStep]) -> KernelResult<Vec<BoundarySegment>> {
    let mut segments = Vec::with_capacity(steps.len() + 1);
    let mut current = start;
    for (i, step) in steps.iter().enumerate() {
        match *step {
            ProfileStep::Line { to } => {
                segments.push(BoundarySegment::Line { a: current, b: to });
                current = to;
            }
            ProfileStep::Arc { to, center, clockwise } => {
                let radius = (current - center).norm();
                let radius_to = (to - center).norm();
                if (radius - radius_to).abs() > LINEAR_TOLERANCE * radius.max(1.0) {
                    return Err(DocumentError::Invalid(format!(
                        "arc step {i}: end points are {radius} and {radius_to} from the centre"
                    ))
                    .into());
                }
                let begin = (current.y - center.y).atan2(current.x - center.x);
                let mut end = (to.y - center.y).atan2(to.x - center.x);
                if clockwise {
                    while end >= begin - 1e-12 {
                        end -= TAU;
                    }
                } else {
                    while end <= begin + 1e-12 {
                        end += TAU;
                    }
                }
                segments.push(BoundarySegment::Arc {
                    center,
                    radius,
                    start: begin,
                    end,
                });
                current = to;
            }
        }
    }
    if (current - start).norm() > LINEAR_TOLERANCE {
        segments.push(BoundarySegment::Line { a: current, b: start });
    }
    Ok(segments)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::KernelError;
    use crate::features::FeatureKind;
    use crate::kernel::{BrepKernel, GeometryKernel, SurfaceKind};

    #[test]
    fn revolve_document_closes_profile() {
        let text = r#"{
            "name": "spindle",
            "body": {
                "type": "revolve",
                "start": [0, 0],
                "segments": [
                    { "kind": "line", "to": [20, 0] },
                    { "kind": "line", "to": [20, 60] },
                    { "kind": "arc", "to": [18, 62], "center": [18, 60] },
                    { "kind": "line", "to": [0, 62] }
                ]
            },
            "features": [{ "kind": "radial_drill", "position": [20, 0, 30] }]
        }"#;
        let shape = parse_part(text, "fallback").unwrap();
        assert_eq!(shape.name(), "spindle");
        let faces = BrepKernel.faces(&shape).unwrap();
        assert_eq!(faces.iter().filter(|f| f.surface.kind() == SurfaceKind::Torus).count(), 2);
        let declared = BrepKernel.declared_features(&shape);
        assert_eq!(declared.len(), 1);
        assert_eq!(declared[0].kind, FeatureKind::RadialDrill);
    }

    #[test]
    fn prism_document_with_hole() {
        let text = r#"{
            "body": {
                "type": "prism",
                "outline": [[0, 0], [50, 0], [50, 30], [0, 30]],
                "height": 12,
                "holes": [{ "center": [25, 15], "diameter": 8 }]
            }
        }"#;
        let shape = parse_part(text, "bracket").unwrap();
        assert_eq!(shape.name(), "bracket");
        assert_eq!(BrepKernel.faces(&shape).unwrap().len(), 8);
    }

    #[test]
    fn mismatched_arc_is_rejected() {
        let text = r#"{
            "body": {
                "type": "revolve",
                "start": [0, 0],
                "segments": [
                    { "kind": "line", "to": [10, 0] },
                    { "kind": "arc", "to": [0, 20], "center": [0, 0] }
                ]
            }
        }"#;
        let err = parse_part(text, "bad").unwrap_err();
        assert!(matches!(err, KernelError::Document(DocumentError::Invalid(_))));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = parse_part("{ \"body\": ", "bad").unwrap_err();
        assert!(matches!(err, KernelError::Document(DocumentError::Parse(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_part(Path::new("/nonexistent/part.json")).unwrap_err();
        assert!(matches!(err, KernelError::Document(DocumentError::Io { .. })));
    }
}
