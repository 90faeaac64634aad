//! Fire perimeter exports

use std::collections::HashSet;

use crate::geo::{parse_time, TimeRange};
use crate::units::{AreaUnit, DistanceUnit};
use crate::validation::{validate_collection, Checks, Validate, ValidationContext, ValidationError};
use crate::wire::{Record, Streamable, WireSink};

const EXTENSIONS: &[&str] = &[".kml", ".kmz", ".shp"];

/// Attributes written alongside each perimeter
#[derive(Debug, Clone, PartialEq)]
pub struct VectorMetadata {
    pub version: bool,
    pub scen_name: bool,
    pub job_name: bool,
    pub ign_name: bool,
    pub sim_date: bool,
    pub fire_size: bool,
    pub perim_total: bool,
    pub perim_active: bool,
    pub area_unit: Option<AreaUnit>,
    pub perim_unit: Option<DistanceUnit>,
}

impl Default for VectorMetadata {
    fn default() -> Self {
        Self {
            version: true,
            scen_name: true,
            job_name: true,
            ign_name: true,
            sim_date: true,
            fire_size: true,
            perim_total: true,
            perim_active: true,
            area_unit: None,
            perim_unit: None,
        }
    }
}

/// Per sub-scenario perimeter window
#[derive(Debug, Clone, PartialEq)]
pub struct PerimeterTimeOverride {
    pub sub_name: String,
    pub enabled: bool,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl PerimeterTimeOverride {
    pub fn new(sub_name: &str) -> Self {
        Self {
            sub_name: sub_name.to_string(),
            enabled: true,
            start_time: None,
            end_time: None,
        }
    }
}

impl Validate for PerimeterTimeOverride {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        checks.require_text("subName", Some(&self.sub_name));
        for (field, value) in [("startTime", &self.start_time), ("endTime", &self.end_time)] {
            if let Some(Err(e)) = value.as_deref().map(parse_time) {
                checks.fail(field, e.to_string());
            }
        }
        checks.finish()
    }
}

/// Perimeter file (KML, KMZ or shapefile)
#[derive(Debug, Clone, PartialEq)]
pub struct VectorFile {
    pub scenario_name: Option<String>,
    pub filename: Option<String>,
    pub perimeter_time: Option<TimeRange>,
    pub multiple_perimeters: bool,
    pub perimeter_active: bool,
    pub merge_contact: bool,
    pub remove_islands: bool,
    pub should_stream: bool,
    pub description: String,
    pub metadata: VectorMetadata,
    pub sub_scenario_overrides: Vec<PerimeterTimeOverride>,
}

impl VectorFile {
    pub fn new(scenario_name: &str, filename: &str, perimeter_time: TimeRange) -> Self {
        Self {
            scenario_name: Some(scenario_name.to_string()),
            filename: Some(filename.to_string()),
            perimeter_time: Some(perimeter_time),
            multiple_perimeters: false,
            perimeter_active: false,
            merge_contact: true,
            remove_islands: true,
            should_stream: false,
            description: String::new(),
            metadata: VectorMetadata::default(),
            sub_scenario_overrides: Vec::new(),
        }
    }

    pub fn add_override(&mut self, sub_name: &str) -> &mut PerimeterTimeOverride {
        self.sub_scenario_overrides.push(PerimeterTimeOverride::new(sub_name));
        let last = self.sub_scenario_overrides.len() - 1;
        &mut self.sub_scenario_overrides[last]
    }
}

pub(crate) fn check_extension(checks: &mut Checks<'_>, filename: Option<&str>, allowed: &[&str]) {
    if let Some(name) = filename.filter(|n| !n.trim().is_empty()) {
        let lower = name.to_ascii_lowercase();
        if !allowed.iter().any(|ext| lower.ends_with(ext)) {
            checks.fail(
                "filename",
                format!("'{}' must end with one of {}", name, allowed.join(", ")),
            );
        }
    }
}

impl Validate for VectorFile {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        checks.require_text("scenarioName", self.scenario_name.as_deref());
        if checks.require_text("filename", self.filename.as_deref()) {
            check_extension(&mut checks, self.filename.as_deref(), EXTENSIONS);
        }
        if checks.require("perimeterTime", &self.perimeter_time) {
            if self.perimeter_time.as_ref().is_some_and(|t| !t.is_valid()) {
                checks.fail(
                    "perimeterTime",
                    "start and end must be times with start not after end",
                );
            }
        }
        checks.extend(validate_collection(
            "subScenarioOverrides",
            &self.sub_scenario_overrides,
            ctx,
            "subName",
            |o| Some(o.sub_name.clone()),
            &mut HashSet::new(),
        ));
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        self.filename.as_ref().map(|f| format!("VectorFile({})", f))
    }
}

impl Streamable for VectorFile {
    fn stream(&self, sink: &mut dyn WireSink) {
        let (start, end) = match &self.perimeter_time {
            Some(range) => (Some(range.start.as_str()), Some(range.end.as_str())),
            None => (None, None),
        };
        let m = &self.metadata;
        let value = Record::new()
            .opt_str(self.scenario_name.as_deref())
            .opt_str(self.filename.as_deref())
            .opt_str(start)
            .opt_str(end)
            .bool(self.multiple_perimeters)
            .bool(self.perimeter_active)
            .bool(self.merge_contact)
            .bool(self.remove_islands)
            .bool(self.should_stream)
            .text(&self.description)
            .bool(m.version)
            .bool(m.scen_name)
            .bool(m.job_name)
            .bool(m.ign_name)
            .bool(m.sim_date)
            .bool(m.fire_size)
            .bool(m.perim_total)
            .bool(m.perim_active)
            .opt_code(m.area_unit.map(AreaUnit::code))
            .opt_code(m.perim_unit.map(DistanceUnit::code))
            .list(&self.sub_scenario_overrides, |r, o| {
                r.raw(o.sub_name.as_str())
                    .bool(o.enabled)
                    .opt_str(o.start_time.as_deref())
                    .opt_str(o.end_time.as_deref())
            })
            .build();
        sink.write_message("vectorfile", &value);
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn perimeter() -> TimeRange {
        TimeRange::new("2024-06-01T13:00:00", "2024-06-02T13:00:00")
    }

    #[test]
    fn test_vector_record() {
        let mut file = VectorFile::new("scen0", "perim.kml", perimeter());
        file.metadata.area_unit = Some(AreaUnit::Hectare);
        file.add_override("east").start_time = Some("2024-06-01T18:00:00".into());
        let mut out = Vec::new();
        file.stream(&mut out);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "vectorfile\nscen0|perim.kml|2024-06-01T13:00:00|2024-06-02T13:00:00|\
             false|false|true|true|false||true|true|true|true|true|true|true|true|1|-1|\
             1|east|true|2024-06-01T18:00:00|null\n"
        );
    }

    #[test]
    fn test_vector_extension_and_window() {
        let mut file = VectorFile::new("scen0", "perim.tif", perimeter());
        file.perimeter_time = Some(TimeRange::new("2024-06-02T13:00:00", "2024-06-01T13:00:00"));
        let errors = file.check_valid();
        let fields: Vec<_> = errors.iter().filter_map(|e| e.field_name()).collect();
        assert_eq!(fields, vec!["filename", "perimeterTime"]);
    }

    #[test]
    fn test_override_names_unique() {
        let mut file = VectorFile::new("scen0", "perim.shp", perimeter());
        file.add_override("east");
        file.add_override("East");
        let errors = file.check_valid();
        assert_eq!(errors[0].field_name(), Some("subScenarioOverrides"));
    }
}
