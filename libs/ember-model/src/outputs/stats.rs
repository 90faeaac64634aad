//! Tabular statistics exports

use std::collections::HashSet;

use crate::geo::LatLon;
use crate::units::{GlobalStatistic, StatsFileType};
use crate::validation::{Checks, Validate, ValidationContext, ValidationError};
use crate::wire::{Record, Streamable, WireSink};

/// What the statistics are gathered for
#[derive(Debug, Clone, PartialEq)]
pub enum StatsSource {
    /// The whole fire
    Fire,
    /// A single location
    Location(LatLon),
    /// A named weather stream
    Stream(String),
}

impl StatsSource {
    fn append(&self, record: Record) -> Record {
        match self {
            StatsSource::Fire => record.raw("0").opt_str(None).opt_str(None),
            StatsSource::Location(p) => record.raw("1").raw(p.to_wire()),
            StatsSource::Stream(name) => record.raw("2").opt_str(Some(name.as_str())).opt_str(None),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatsFile {
    pub scenario_name: Option<String>,
    pub filename: Option<String>,
    pub file_type: Option<StatsFileType>,
    pub source: StatsSource,
    pub columns: Vec<GlobalStatistic>,
    pub discretize: Option<i32>,
}

impl StatsFile {
    /// Fire statistics with the file type taken from the extension
    pub fn new(scenario_name: &str, filename: &str) -> Self {
        Self {
            scenario_name: Some(scenario_name.to_string()),
            filename: Some(filename.to_string()),
            file_type: StatsFileType::from_filename(filename),
            source: StatsSource::Fire,
            columns: Vec::new(),
            discretize: None,
        }
    }

    pub fn add_column(&mut self, column: GlobalStatistic) -> &mut Self {
        self.columns.push(column);
        self
    }
}

impl Validate for StatsFile {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        checks.require_text("scenarioName", self.scenario_name.as_deref());
        checks.require_text("filename", self.filename.as_deref());
        if checks.require("fileType", &self.file_type) {
            if let (Some(t), Some(name)) = (self.file_type, self.filename.as_deref()) {
                if !name.to_ascii_lowercase().ends_with(t.extension()) {
                    checks.fail(
                        "fileType",
                        format!("'{}' does not have the {} extension", name, t.extension()),
                    );
                }
            }
        }
        match &self.source {
            StatsSource::Location(p) if !p.is_valid() => {
                checks.fail("location", "latitude or longitude is out of range")
            },
            StatsSource::Stream(name) => {
                checks.require_text("streamName", Some(name));
            },
            _ => {},
        }
        if self.columns.is_empty() {
            checks.fail("columns", "at least one column is required");
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.columns.iter().find(|c| !seen.insert(**c)) {
            checks.fail("columns", format!("{:?} is listed more than once", dup));
        }
        if let Some(d) = self.discretize {
            checks.int_range("discretize", d, 1, 1000);
        }
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        self.filename.as_ref().map(|f| format!("StatsFile({})", f))
    }
}

impl Streamable for StatsFile {
    fn stream(&self, sink: &mut dyn WireSink) {
        let record = Record::new()
            .opt_str(self.scenario_name.as_deref())
            .opt_str(self.filename.as_deref())
            .opt_code(self.file_type.map(StatsFileType::code))
            .opt_int(self.discretize);
        let value = self
            .source
            .append(record)
            .list(&self.columns, |r, c| r.code(c.code()))
            .build();
        sink.write_message("statsfile", &value);
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_stats_record() {
        let mut stats = StatsFile::new("scen0", "stats.json");
        stats
            .add_column(GlobalStatistic::DateTime)
            .add_column(GlobalStatistic::TotalArea);
        assert_eq!(stats.file_type, Some(StatsFileType::Json));
        assert!(stats.is_valid());
        let mut out = Vec::new();
        stats.stream(&mut out);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "statsfile\nscen0|stats.json|1|-1|0|null|null|2|0|20\n"
        );

        stats.source = StatsSource::Location(LatLon::new(54.0, -115.0));
        let mut out = Vec::new();
        stats.stream(&mut out);
        assert!(String::from_utf8(out).unwrap().contains("|1|54|-115|2|"));
    }

    #[test]
    fn test_stats_type_must_match_extension() {
        let mut stats = StatsFile::new("scen0", "stats.csv");
        stats.add_column(GlobalStatistic::Fwi).add_column(GlobalStatistic::Fwi);
        stats.file_type = Some(StatsFileType::Xml);
        let errors = stats.check_valid();
        let fields: Vec<_> = errors.iter().filter_map(|e| e.field_name()).collect();
        assert_eq!(fields, vec!["fileType", "columns"]);
    }
}
