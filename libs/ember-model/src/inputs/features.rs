//! Ignitions, assets and targets

use crate::geo::parse_time;
use crate::ident::{identified, next_id, IdKind};
use crate::shape::FeatureShape;
use crate::validation::{Checks, Validate, ValidationContext, ValidationError};
use crate::wire::{Record, Streamable, WireSink};

/// Where and when a fire starts
#[derive(Debug, Clone, PartialEq)]
pub struct Ignition {
    id: String,
    pub start_time: Option<String>,
    pub shape: FeatureShape,
    pub comments: String,
}

identified!(Ignition);

impl Ignition {
    pub fn new(start_time: &str, shape: FeatureShape) -> Self {
        Self {
            id: next_id(IdKind::Ignition),
            start_time: Some(start_time.to_string()),
            shape,
            comments: String::new(),
        }
    }
}

impl Validate for Ignition {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        match &self.start_time {
            Some(t) => {
                if let Err(e) = parse_time(t) {
                    checks.fail("startTime", e.to_string());
                }
            },
            None => checks.fail("startTime", "is required"),
        }
        self.shape.check(&mut checks);
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        Some(format!("Ignition({})", self.id))
    }
}

impl Streamable for Ignition {
    fn stream(&self, sink: &mut dyn WireSink) {
        let record = Record::new()
            .raw(self.id.as_str())
            .opt_str(self.start_time.as_deref())
            .text(&self.comments);
        sink.write_message("ignition", &self.shape.append(record).build());
    }
}

/// Something the fire should be tracked against
#[derive(Debug, Clone, PartialEq)]
pub struct AssetFile {
    id: String,
    pub shape: FeatureShape,
    /// Buffer distance around the asset in metres
    pub buffer: Option<f64>,
    pub comments: String,
}

identified!(AssetFile);

impl AssetFile {
    pub fn new(shape: FeatureShape) -> Self {
        Self {
            id: next_id(IdKind::Asset),
            shape,
            buffer: None,
            comments: String::new(),
        }
    }
}

impl Validate for AssetFile {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        self.shape.check(&mut checks);
        if let Some(b) = self.buffer {
            checks.at_least("buffer", b, 0.0);
        }
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        Some(format!("AssetFile({})", self.id))
    }
}

impl Streamable for AssetFile {
    fn stream(&self, sink: &mut dyn WireSink) {
        let record = Record::new()
            .raw(self.id.as_str())
            .opt_num(self.buffer)
            .text(&self.comments);
        sink.write_message("assetfile", &self.shape.append(record).build());
    }
}

/// Points or lines that wind or vector targets point at
#[derive(Debug, Clone, PartialEq)]
pub struct TargetFile {
    id: String,
    pub shape: FeatureShape,
    pub comments: String,
}

identified!(TargetFile);

impl TargetFile {
    pub fn new(shape: FeatureShape) -> Self {
        Self {
            id: next_id(IdKind::Target),
            shape,
            comments: String::new(),
        }
    }
}

impl Validate for TargetFile {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        self.shape.check(&mut checks);
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        Some(format!("TargetFile({})", self.id))
    }
}

impl Streamable for TargetFile {
    fn stream(&self, sink: &mut dyn WireSink) {
        let record = Record::new().raw(self.id.as_str()).text(&self.comments);
        sink.write_message("targetfile", &self.shape.append(record).build());
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::geo::LatLon;

    fn encode(item: &dyn Streamable) -> String {
        let mut out = Vec::new();
        item.stream(&mut out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_ignition_record() {
        let mut ign =
            Ignition::new("2024-06-01T13:00:00", FeatureShape::Point(LatLon::new(54.0, -115.5)));
        ign.set_id("i1");
        ign.comments = "lightning|strike".into();
        assert!(ign.is_valid());
        assert_eq!(
            encode(&ign),
            "ignition\ni1|2024-06-01T13:00:00|lightning strike|3|54|-115.5\n"
        );
    }

    #[test]
    fn test_ignition_bad_time() {
        let ign = Ignition::new("yesterday", FeatureShape::File("ign.shp".into()));
        let errors = ign.check_valid();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field_name(), Some("startTime"));
    }

    #[test]
    fn test_asset_buffer_sentinel() {
        let mut asset = AssetFile::new(FeatureShape::File("town.shp".into()));
        asset.set_id("a1");
        assert_eq!(encode(&asset), "assetfile\na1|-1||0|town.shp\n");
        asset.buffer = Some(-5.0);
        assert!(!asset.is_valid());
    }

    #[test]
    fn test_target_polyline_points() {
        let target = TargetFile::new(FeatureShape::Polyline(vec![LatLon::new(1.0, 1.0)]));
        let errors = target.check_valid();
        assert_eq!(errors[0].field_name(), Some("polyline"));
    }
}
