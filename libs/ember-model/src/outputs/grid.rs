//! Gridded statistic exports

use crate::geo::parse_time;
use crate::outputs::vector::check_extension;
use crate::units::{Compression, GridStatistic, InterpolationMethod};
use crate::validation::{Checks, Validate, ValidationContext, ValidationError};
use crate::wire::{Record, Streamable, WireSink};

const EXTENSIONS: &[&str] = &[".tif", ".tiff", ".asc"];

/// Raster of one statistic at one output time
#[derive(Debug, Clone, PartialEq)]
pub struct OutputGridFile {
    pub scenario_name: Option<String>,
    pub filename: Option<String>,
    pub output_time: Option<String>,
    /// Accumulate from this time instead of the scenario start
    pub start_output_time: Option<String>,
    pub statistic: Option<GridStatistic>,
    pub interpolation: Option<InterpolationMethod>,
    pub discretize: Option<i32>,
    pub compression: Compression,
    pub should_stream: bool,
    pub minimize_output: bool,
}

impl OutputGridFile {
    pub fn new(
        scenario_name: &str,
        filename: &str,
        output_time: &str,
        statistic: GridStatistic,
    ) -> Self {
        Self {
            scenario_name: Some(scenario_name.to_string()),
            filename: Some(filename.to_string()),
            output_time: Some(output_time.to_string()),
            start_output_time: None,
            statistic: Some(statistic),
            interpolation: Some(InterpolationMethod::Idw),
            discretize: None,
            compression: Compression::default(),
            should_stream: false,
            minimize_output: false,
        }
    }
}

impl Validate for OutputGridFile {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        checks.require_text("scenarioName", self.scenario_name.as_deref());
        if checks.require_text("filename", self.filename.as_deref()) {
            check_extension(&mut checks, self.filename.as_deref(), EXTENSIONS);
        }
        let output = match &self.output_time {
            Some(t) => parse_time(t).map_err(|e| checks.fail("outputTime", e.to_string())).ok(),
            None => {
                checks.fail("outputTime", "is required");
                None
            },
        };
        if let Some(start) = &self.start_output_time {
            match parse_time(start) {
                Ok(s) if output.is_some_and(|o| s > o) => {
                    checks.fail("startOutputTime", "is after the output time")
                },
                Ok(_) => {},
                Err(e) => checks.fail("startOutputTime", e.to_string()),
            }
        }
        checks.require("statistic", &self.statistic);
        checks.require("interpolation", &self.interpolation);
        if self.interpolation == Some(InterpolationMethod::Discretized) {
            checks.require("discretize", &self.discretize);
        }
        if let Some(d) = self.discretize {
            checks.int_range("discretize", d, 1, 1000);
        }
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        self.filename.as_ref().map(|f| format!("OutputGridFile({})", f))
    }
}

impl Streamable for OutputGridFile {
    fn stream(&self, sink: &mut dyn WireSink) {
        let value = Record::new()
            .opt_str(self.scenario_name.as_deref())
            .opt_str(self.filename.as_deref())
            .opt_str(self.output_time.as_deref())
            .opt_str(self.start_output_time.as_deref())
            .opt_code(self.statistic.map(GridStatistic::code))
            .opt_code(self.interpolation.map(InterpolationMethod::code))
            .opt_int(self.discretize)
            .code(self.compression.code())
            .bool(self.should_stream)
            .bool(self.minimize_output)
            .build();
        sink.write_message("outputgridfile", &value);
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_grid_record() {
        let grid =
            OutputGridFile::new("scen0", "ros.tif", "2024-06-02T13:00:00", GridStatistic::MaxRos);
        assert!(grid.is_valid());
        let mut out = Vec::new();
        grid.stream(&mut out);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "outputgridfile\nscen0|ros.tif|2024-06-02T13:00:00|null|12|1|-1|0|false|false\n"
        );
    }

    #[test]
    fn test_discretized_needs_cell_count() {
        let mut grid =
            OutputGridFile::new("scen0", "ros.asc", "2024-06-02T13:00:00", GridStatistic::MaxRos);
        grid.interpolation = Some(InterpolationMethod::Discretized);
        grid.start_output_time = Some("2024-06-03T00:00:00".into());
        let errors = grid.check_valid();
        let fields: Vec<_> = errors.iter().filter_map(|e| e.field_name()).collect();
        assert_eq!(fields, vec!["startOutputTime", "discretize"]);

        grid.start_output_time = None;
        grid.discretize = Some(2000);
        assert_eq!(grid.check_valid().len(), 1);
        grid.discretize = Some(10);
        assert!(grid.is_valid());
    }
}
