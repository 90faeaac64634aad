//! Everything a job writes

pub mod grid;
pub mod stats;
pub mod stream;
pub mod summary;
pub mod vector;

use std::collections::HashSet;

use crate::validation::{
    validate_all, validate_collection, Validate, ValidationContext, ValidationError,
};
use crate::wire::{Streamable, WireSink};

pub use grid::OutputGridFile;
pub use stats::{StatsFile, StatsSource};
pub use stream::OutputStream;
pub use summary::{SummaryFile, SummaryOutputs};
pub use vector::{PerimeterTimeOverride, VectorFile, VectorMetadata};

/// Output half of a job
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Outputs {
    pub grid_files: Vec<OutputGridFile>,
    pub vector_files: Vec<VectorFile>,
    pub summary_files: Vec<SummaryFile>,
    pub stats_files: Vec<StatsFile>,
    pub streams: Vec<OutputStream>,
}

impl Outputs {
    pub fn add_grid_file(&mut self, file: OutputGridFile) -> &mut OutputGridFile {
        self.grid_files.push(file);
        let last = self.grid_files.len() - 1;
        &mut self.grid_files[last]
    }

    pub fn add_vector_file(&mut self, file: VectorFile) -> &mut VectorFile {
        self.vector_files.push(file);
        let last = self.vector_files.len() - 1;
        &mut self.vector_files[last]
    }

    pub fn add_summary_file(&mut self, file: SummaryFile) -> &mut SummaryFile {
        self.summary_files.push(file);
        let last = self.summary_files.len() - 1;
        &mut self.summary_files[last]
    }

    pub fn add_stats_file(&mut self, file: StatsFile) -> &mut StatsFile {
        self.stats_files.push(file);
        let last = self.stats_files.len() - 1;
        &mut self.stats_files[last]
    }

    pub fn add_stream(&mut self, stream: OutputStream) -> &mut OutputStream {
        self.streams.push(stream);
        let last = self.streams.len() - 1;
        &mut self.streams[last]
    }

    /// One subtree per output kind; filenames are unique across all kinds
    pub(crate) fn concerns(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut filenames = HashSet::new();
        [
            validate_collection(
                "gridOutputs",
                &self.grid_files,
                ctx,
                "filename",
                |f| f.filename.clone(),
                &mut filenames,
            ),
            validate_collection(
                "vectorOutputs",
                &self.vector_files,
                ctx,
                "filename",
                |f| f.filename.clone(),
                &mut filenames,
            ),
            validate_collection(
                "summaryOutputs",
                &self.summary_files,
                ctx,
                "filename",
                |f| f.filename.clone(),
                &mut filenames,
            ),
            validate_collection(
                "statsOutputs",
                &self.stats_files,
                ctx,
                "filename",
                |f| f.filename.clone(),
                &mut filenames,
            ),
            validate_all("streams", &self.streams, ctx),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

impl Validate for Outputs {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        self.concerns(ctx)
    }
}

impl Streamable for Outputs {
    fn stream(&self, sink: &mut dyn WireSink) {
        for file in &self.grid_files {
            file.stream(sink);
        }
        for file in &self.vector_files {
            file.stream(sink);
        }
        for file in &self.summary_files {
            file.stream(sink);
        }
        for file in &self.stats_files {
            file.stream(sink);
        }
        for stream in &self.streams {
            stream.stream(sink);
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::geo::TimeRange;
    use crate::units::{GlobalStatistic, GridStatistic};

    #[test]
    fn test_filenames_unique_across_kinds() {
        let mut outputs = Outputs::default();
        outputs.add_grid_file(OutputGridFile::new(
            "scen0",
            "out/Fire.tif",
            "2024-06-02T13:00:00",
            GridStatistic::BurnGrid,
        ));
        outputs.add_vector_file(VectorFile::new(
            "scen0",
            "out/fire.kml",
            TimeRange::new("2024-06-01T13:00:00", "2024-06-02T13:00:00"),
        ));
        outputs
            .add_stats_file(StatsFile::new("scen0", "OUT/FIRE.TIF"))
            .add_column(GlobalStatistic::TotalArea);

        let errors = outputs.check_valid();
        let fields: Vec<_> = errors.iter().filter_map(|e| e.field_name()).collect();
        assert_eq!(fields, vec!["statsOutputs"]);
        let stats = errors[0].child_at(0).unwrap();
        assert!(stats.child("filename").is_some());
    }

    #[test]
    fn test_stream_order() {
        let mut outputs = Outputs::default();
        outputs.add_stream(OutputStream::Mqtt { scenario_name: None });
        outputs.add_summary_file(SummaryFile::new("scen0", "s.txt"));
        let mut out = Vec::new();
        outputs.stream(&mut out);
        let text = String::from_utf8(out).unwrap();
        assert!(text.find("summaryfile").unwrap() < text.find("mqttstream").unwrap());
    }
}
