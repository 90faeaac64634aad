//! Geometry variants shared by input entities
//!
//! Wire codes: file `0`, polygon `1`, polyline `2`, point `3`, landscape `4`.

use crate::geo::LatLon;
use crate::validation::Checks;
use crate::wire::Record;

/// Append `<n>|lat|lon|...` for a point list
fn points(record: Record, pts: &[LatLon]) -> Record {
    record.list(pts, |r, p| r.raw(p.to_wire()))
}

fn check_points(checks: &mut Checks<'_>, field: &str, pts: &[LatLon], min: usize) {
    if pts.len() < min {
        checks.fail(field, format!("at least {} points are required", min));
    }
    if let Some(i) = pts.iter().position(|p| !p.is_valid()) {
        checks.fail(field, format!("point {} is out of range", i));
    }
}

/// Shape of a fuel break
#[derive(Debug, Clone, PartialEq)]
pub enum FuelBreakShape {
    File(String),
    Polygon(Vec<LatLon>),
    /// Line with a width in metres
    Polyline { points: Vec<LatLon>, width: Option<f64> },
}

impl FuelBreakShape {
    pub(crate) fn check(&self, checks: &mut Checks<'_>) {
        match self {
            FuelBreakShape::File(path) => checks.file("filename", Some(path.as_str())),
            FuelBreakShape::Polygon(pts) => check_points(checks, "polygon", pts, 3),
            FuelBreakShape::Polyline { points, width } => {
                check_points(checks, "polyline", points, 2);
                if checks.require("width", width) {
                    if let Some(w) = width.filter(|w| *w <= 0.0) {
                        checks.fail("width", format!("{} must be greater than 0", w));
                    }
                }
            },
        }
    }

    pub(crate) fn width(&self) -> Option<f64> {
        match self {
            FuelBreakShape::Polyline { width, .. } => *width,
            _ => None,
        }
    }

    pub(crate) fn append(&self, record: Record) -> Record {
        match self {
            FuelBreakShape::File(path) => record.raw("0").raw(path.as_str()),
            FuelBreakShape::Polygon(pts) => points(record.raw("1"), pts),
            FuelBreakShape::Polyline { points: pts, .. } => points(record.raw("2"), pts),
        }
    }
}

/// Area covered by a fuel or weather patch
#[derive(Debug, Clone, PartialEq)]
pub enum PatchShape {
    File(String),
    Polygon(Vec<LatLon>),
    /// The whole landscape
    Landscape,
}

impl PatchShape {
    pub(crate) fn check(&self, checks: &mut Checks<'_>) {
        match self {
            PatchShape::File(path) => checks.file("filename", Some(path.as_str())),
            PatchShape::Polygon(pts) => check_points(checks, "polygon", pts, 3),
            PatchShape::Landscape => {},
        }
    }

    pub(crate) fn append(&self, record: Record) -> Record {
        match self {
            PatchShape::File(path) => record.raw("0").raw(path.as_str()),
            PatchShape::Polygon(pts) => points(record.raw("1"), pts),
            PatchShape::Landscape => record.raw("4"),
        }
    }
}

/// Geometry of an ignition, asset or target
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureShape {
    File(String),
    Point(LatLon),
    Polyline(Vec<LatLon>),
    Polygon(Vec<LatLon>),
}

impl FeatureShape {
    pub(crate) fn check(&self, checks: &mut Checks<'_>) {
        match self {
            FeatureShape::File(path) => checks.file("filename", Some(path.as_str())),
            FeatureShape::Point(p) => check_points(checks, "point", std::slice::from_ref(p), 1),
            FeatureShape::Polyline(pts) => check_points(checks, "polyline", pts, 2),
            FeatureShape::Polygon(pts) => check_points(checks, "polygon", pts, 3),
        }
    }

    pub(crate) fn append(&self, record: Record) -> Record {
        match self {
            FeatureShape::File(path) => record.raw("0").raw(path.as_str()),
            FeatureShape::Polygon(pts) => points(record.raw("1"), pts),
            FeatureShape::Polyline(pts) => points(record.raw("2"), pts),
            FeatureShape::Point(p) => record.raw("3").raw(p.to_wire()),
        }
    }
}
