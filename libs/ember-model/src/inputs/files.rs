//! Landscape files and spatial modifiers

use crate::ident::{identified, next_id, IdKind};
use crate::inputs::fuel::{FuelBreak, FuelPatch};
use crate::inputs::weather::{WeatherGrid, WeatherPatch};
use crate::units::GridFileType;
use crate::validation::{validate_identified, Checks, Validate, ValidationContext, ValidationError};
use crate::wire::{Record, Streamable, WireSink};

/// Supplementary input grid (curing, green-up, fuel load, ...)
#[derive(Debug, Clone, PartialEq)]
pub struct GridFile {
    id: String,
    pub grid_type: Option<GridFileType>,
    pub filename: Option<String>,
    pub proj_filename: Option<String>,
    pub comments: String,
}

identified!(GridFile);

impl GridFile {
    pub fn new(grid_type: GridFileType, filename: &str, proj_filename: &str) -> Self {
        Self {
            id: next_id(IdKind::GridFile),
            grid_type: Some(grid_type),
            filename: Some(filename.to_string()),
            proj_filename: Some(proj_filename.to_string()),
            comments: String::new(),
        }
    }
}

impl Validate for GridFile {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        checks.require("type", &self.grid_type);
        checks.file("filename", self.filename.as_deref());
        checks.file("projection", self.proj_filename.as_deref());
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        Some(format!("GridFile({})", self.id))
    }
}

impl Streamable for GridFile {
    fn stream(&self, sink: &mut dyn WireSink) {
        let value = Record::new()
            .raw(self.id.as_str())
            .opt_code(self.grid_type.map(GridFileType::code))
            .opt_str(self.filename.as_deref())
            .opt_str(self.proj_filename.as_deref())
            .text(&self.comments)
            .build();
        sink.write_message("inputgridfile", &value);
    }
}

/// Projection, lookup table, fuel map and elevation, plus the spatial
/// inputs layered on top of them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputFiles {
    pub proj_file: Option<String>,
    pub lut_file: Option<String>,
    pub fuelmap_file: Option<String>,
    pub elevation_file: Option<String>,
    pub grid_files: Vec<GridFile>,
    pub fuel_breaks: Vec<FuelBreak>,
    pub fuel_patches: Vec<FuelPatch>,
    pub weather_patches: Vec<WeatherPatch>,
    pub weather_grids: Vec<WeatherGrid>,
}

impl InputFiles {
    pub fn new(proj_file: &str, lut_file: &str, fuelmap_file: &str) -> Self {
        Self {
            proj_file: Some(proj_file.to_string()),
            lut_file: Some(lut_file.to_string()),
            fuelmap_file: Some(fuelmap_file.to_string()),
            ..Self::default()
        }
    }

    pub fn add_grid_file(&mut self, grid: GridFile) -> &mut GridFile {
        self.grid_files.push(grid);
        let last = self.grid_files.len() - 1;
        &mut self.grid_files[last]
    }

    pub fn add_fuel_break(&mut self, fuel_break: FuelBreak) -> &mut FuelBreak {
        self.fuel_breaks.push(fuel_break);
        let last = self.fuel_breaks.len() - 1;
        &mut self.fuel_breaks[last]
    }

    pub fn add_fuel_patch(&mut self, patch: FuelPatch) -> &mut FuelPatch {
        self.fuel_patches.push(patch);
        let last = self.fuel_patches.len() - 1;
        &mut self.fuel_patches[last]
    }

    pub fn add_weather_patch(&mut self, patch: WeatherPatch) -> &mut WeatherPatch {
        self.weather_patches.push(patch);
        let last = self.weather_patches.len() - 1;
        &mut self.weather_patches[last]
    }

    pub fn add_weather_grid(&mut self, grid: WeatherGrid) -> &mut WeatherGrid {
        self.weather_grids.push(grid);
        let last = self.weather_grids.len() - 1;
        &mut self.weather_grids[last]
    }
}

impl Validate for InputFiles {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        checks.file("projFile", self.proj_file.as_deref());
        checks.file("lutFile", self.lut_file.as_deref());
        checks.file("fuelmapFile", self.fuelmap_file.as_deref());
        checks.opt_file("elevationFile", self.elevation_file.as_deref());
        checks.extend(validate_identified("gridFiles", &self.grid_files, ctx));
        checks.extend(validate_identified("fuelBreaks", &self.fuel_breaks, ctx));
        checks.extend(validate_identified("fuelPatches", &self.fuel_patches, ctx));
        checks.extend(validate_identified("weatherPatches", &self.weather_patches, ctx));
        checks.extend(validate_identified("weatherGrids", &self.weather_grids, ctx));
        checks.finish()
    }
}

impl Streamable for InputFiles {
    fn stream(&self, sink: &mut dyn WireSink) {
        if let Some(path) = &self.proj_file {
            sink.write_message("projfile", path);
        }
        if let Some(path) = &self.lut_file {
            sink.write_message("lutfile", path);
        }
        if let Some(path) = &self.fuelmap_file {
            sink.write_message("fuelmapfile", path);
        }
        if let Some(path) = self.elevation_file.as_deref().filter(|p| !p.is_empty()) {
            sink.write_message("elevationfile", path);
        }
        for grid in &self.grid_files {
            grid.stream(sink);
        }
        for fuel_break in &self.fuel_breaks {
            fuel_break.stream(sink);
        }
        for patch in &self.fuel_patches {
            patch.stream(sink);
        }
        for patch in &self.weather_patches {
            patch.stream(sink);
        }
        for grid in &self.weather_grids {
            grid.stream(sink);
        }
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::wire::WireBuffer;

    #[test]
    fn test_missing_required_files() {
        let files = InputFiles::default();
        let fields: Vec<_> = files
            .check_valid()
            .iter()
            .filter_map(|e| e.field_name().map(str::to_string))
            .collect();
        assert_eq!(fields, vec!["projFile", "lutFile", "fuelmapFile"]);
    }

    #[test]
    fn test_duplicate_grid_ids() {
        let mut files = InputFiles::new("a.prj", "a.lut", "fuel.asc");
        files
            .add_grid_file(GridFile::new(GridFileType::DegreeCuring, "c.asc", "c.prj"))
            .set_id("Curing");
        files
            .add_grid_file(GridFile::new(GridFileType::GreenUp, "g.asc", "g.prj"))
            .set_id("curing");
        let errors = files.check_valid();
        assert_eq!(errors.len(), 1);
        let group = &errors[0];
        assert_eq!(group.field_name(), Some("gridFiles"));
        assert!(group.child_at(1).unwrap().child("id").is_some());
    }

    #[test]
    fn test_stream_order() {
        let mut files = InputFiles::new("a.prj", "a.lut", "fuel.asc");
        files
            .add_grid_file(GridFile::new(GridFileType::DegreeCuring, "c.asc", "c.prj"))
            .set_id("grid|1");
        let mut buf = WireBuffer::new();
        files.stream(&mut buf);
        assert_eq!(
            buf.lines(),
            vec![
                "projfile", "a.prj", "lutfile", "a.lut", "fuelmapfile", "fuel.asc",
                "inputgridfile", "grid1|1|c.asc|c.prj|",
            ]
        );
    }
}
