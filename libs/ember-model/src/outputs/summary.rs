//! Plain-text run summaries

use crate::outputs::vector::check_extension;
use crate::validation::{Checks, Validate, ValidationContext, ValidationError};
use crate::wire::{Record, Streamable, WireSink};

/// Sections included in a summary file; unset sections use the builder default
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryOutputs {
    pub application: Option<bool>,
    pub geo_data: Option<bool>,
    pub score_data: Option<bool>,
    pub inputs: Option<bool>,
    pub landscape: Option<bool>,
    pub fbp_patches: Option<bool>,
    pub wx_patches: Option<bool>,
    pub ignitions: Option<bool>,
    pub wx_streams: Option<bool>,
    pub fbp: Option<bool>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryFile {
    pub scenario_name: Option<String>,
    pub filename: Option<String>,
    pub outputs: SummaryOutputs,
}

impl SummaryFile {
    pub fn new(scenario_name: &str, filename: &str) -> Self {
        Self {
            scenario_name: Some(scenario_name.to_string()),
            filename: Some(filename.to_string()),
            outputs: SummaryOutputs::default(),
        }
    }
}

impl Validate for SummaryFile {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        checks.require_text("scenarioName", self.scenario_name.as_deref());
        if checks.require_text("filename", self.filename.as_deref()) {
            check_extension(&mut checks, self.filename.as_deref(), &[".txt"]);
        }
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        self.filename.as_ref().map(|f| format!("SummaryFile({})", f))
    }
}

impl Streamable for SummaryFile {
    fn stream(&self, sink: &mut dyn WireSink) {
        let o = &self.outputs;
        let value = Record::new()
            .opt_str(self.scenario_name.as_deref())
            .opt_str(self.filename.as_deref())
            .opt_bool(o.application)
            .opt_bool(o.geo_data)
            .opt_bool(o.score_data)
            .opt_bool(o.inputs)
            .opt_bool(o.landscape)
            .opt_bool(o.fbp_patches)
            .opt_bool(o.wx_patches)
            .opt_bool(o.ignitions)
            .opt_bool(o.wx_streams)
            .opt_bool(o.fbp)
            .build();
        sink.write_message("summaryfile", &value);
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_summary_record() {
        let mut summary = SummaryFile::new("scen0", "summary.txt");
        summary.outputs.inputs = Some(true);
        summary.outputs.fbp = Some(false);
        let mut out = Vec::new();
        summary.stream(&mut out);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "summaryfile\nscen0|summary.txt|null|null|null|true|null|null|null|null|null|false\n"
        );
    }

    #[test]
    fn test_summary_extension() {
        assert!(!SummaryFile::new("scen0", "summary.csv").is_valid());
        assert!(!SummaryFile::new("", "summary.txt").is_valid());
    }
}
