//! Weather stations, streams, patches and grids

use std::collections::HashSet;

use crate::duration::Duration;
use crate::geo::{parse_date, parse_time, LatLon};
use crate::ident::{identified, next_id, sanitize_id, IdKind, Identified};
use crate::shape::PatchShape;
use crate::units::{
    HffmcMethod, WeatherGridSector, WeatherGridType, WeatherPatchOperation, WeatherQuantity,
};
use crate::validation::{
    validate_collection, validate_identified, Checks, Validate, ValidationContext, ValidationError,
};
use crate::wire::{Record, Streamable, WireSink};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Start/end date plus time of day shared by patches and grids
fn check_window(
    checks: &mut Checks<'_>,
    start: Option<&str>,
    start_tod: &Duration,
    end: Option<&str>,
    end_tod: &Duration,
) {
    let start_date = match start {
        Some(s) => parse_time(s).map_err(|e| checks.fail("startTime", e.to_string())).ok(),
        None => {
            checks.fail("startTime", "is required");
            None
        },
    };
    let end_date = match end {
        Some(s) => parse_time(s).map_err(|e| checks.fail("endTime", e.to_string())).ok(),
        None => {
            checks.fail("endTime", "is required");
            None
        },
    };
    let start_ok = check_time_of_day(checks, "startTimeOfDay", start_tod);
    let end_ok = check_time_of_day(checks, "endTimeOfDay", end_tod);

    if let (Some(s), Some(e), true, true) = (start_date, end_date, start_ok, end_ok) {
        let span = (e - s).num_seconds() as f64 + end_tod.to_seconds_approx()
            - start_tod.to_seconds_approx();
        if span < 0.0 {
            checks.fail("endTime", "the end time is before the start time");
        }
    }
}

fn check_time_of_day(checks: &mut Checks<'_>, field: &str, value: &Duration) -> bool {
    if value.is_unset() {
        checks.fail(field, "is required");
        return false;
    }
    if !value.is_valid() || value.is_negative || value.to_seconds_approx() >= SECONDS_PER_DAY {
        checks.fail(field, format!("{} is not a time of day", value));
        return false;
    }
    true
}

/// Diurnal curve parameters for temperature and wind
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiurnalParameters {
    pub temperature_alpha: f64,
    pub temperature_beta: f64,
    pub temperature_gamma: f64,
    pub wind_alpha: f64,
    pub wind_beta: f64,
    pub wind_gamma: f64,
}

impl DiurnalParameters {
    fn values(&self) -> [f64; 6] {
        [
            self.temperature_alpha,
            self.temperature_beta,
            self.temperature_gamma,
            self.wind_alpha,
            self.wind_beta,
            self.wind_gamma,
        ]
    }
}

/// One weather file attached to a station
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherStream {
    id: String,
    pub parent_id: String,
    pub filename: Option<String>,
    pub hffmc_value: Option<f64>,
    pub hffmc_hour: Option<i32>,
    pub hffmc_method: Option<HffmcMethod>,
    pub starting_ffmc: Option<f64>,
    pub starting_dmc: Option<f64>,
    pub starting_dc: Option<f64>,
    pub starting_precip: Option<f64>,
    pub starting_bui: Option<f64>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub diurnal: Option<DiurnalParameters>,
    pub comments: String,
}

identified!(WeatherStream);

impl WeatherStream {
    fn new(parent_id: &str, filename: &str) -> Self {
        Self {
            id: next_id(IdKind::WeatherStream),
            parent_id: parent_id.to_string(),
            filename: Some(filename.to_string()),
            hffmc_value: None,
            hffmc_hour: None,
            hffmc_method: None,
            starting_ffmc: None,
            starting_dmc: None,
            starting_dc: None,
            starting_precip: None,
            starting_bui: None,
            start_time: None,
            end_time: None,
            diurnal: None,
            comments: String::new(),
        }
    }

    /// Hourly FFMC starting point
    pub fn set_hffmc(&mut self, value: f64, hour: i32, method: HffmcMethod) -> &mut Self {
        self.hffmc_value = Some(value);
        self.hffmc_hour = Some(hour);
        self.hffmc_method = Some(method);
        self
    }

    /// Starting codes: FFMC, DMC, DC and precipitation
    pub fn set_starting_codes(&mut self, ffmc: f64, dmc: f64, dc: f64, precip: f64) -> &mut Self {
        self.starting_ffmc = Some(ffmc);
        self.starting_dmc = Some(dmc);
        self.starting_dc = Some(dc);
        self.starting_precip = Some(precip);
        self
    }

    pub fn set_dates(&mut self, start: &str, end: &str) -> &mut Self {
        self.start_time = Some(start.to_string());
        self.end_time = Some(end.to_string());
        self
    }

    fn record(&self, station_id: &str) -> String {
        let mut record = Record::new()
            .raw(self.id.as_str())
            .raw(station_id)
            .opt_str(self.filename.as_deref())
            .opt_num(self.hffmc_value)
            .opt_int(self.hffmc_hour)
            .opt_code(self.hffmc_method.map(HffmcMethod::code))
            .opt_num(self.starting_ffmc)
            .opt_num(self.starting_dmc)
            .opt_num(self.starting_dc)
            .opt_num(self.starting_precip)
            .opt_str(self.start_time.as_deref())
            .opt_str(self.end_time.as_deref())
            .opt_num(self.starting_bui);
        match &self.diurnal {
            Some(d) => {
                for v in d.values() {
                    record = record.num(v);
                }
            },
            None => {
                for _ in 0..6 {
                    record = record.opt_num(None);
                }
            },
        }
        record.text(&self.comments).build()
    }
}

impl Validate for WeatherStream {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        checks.file("filename", self.filename.as_deref());
        if checks.require("hffmcValue", &self.hffmc_value) {
            checks.opt_range("hffmcValue", self.hffmc_value, 0.0, 101.0);
        }
        if checks.require("hffmcHour", &self.hffmc_hour) {
            if let Some(h) = self.hffmc_hour {
                checks.int_range("hffmcHour", h, -1, 23);
            }
        }
        checks.require("hffmcMethod", &self.hffmc_method);
        for (field, value, max) in [
            ("startingFfmc", self.starting_ffmc, 101.0),
            ("startingDmc", self.starting_dmc, 500.0),
            ("startingDc", self.starting_dc, 1500.0),
        ] {
            if checks.require(field, &value) {
                checks.opt_range(field, value, 0.0, max);
            }
        }
        if checks.require("startingPrecip", &self.starting_precip) {
            if let Some(p) = self.starting_precip {
                checks.at_least("startingPrecip", p, 0.0);
            }
        }
        if let Some(bui) = self.starting_bui {
            checks.at_least("startingBui", bui, 0.0);
        }

        let start = match &self.start_time {
            Some(s) => parse_date(s).map_err(|e| checks.fail("startTime", e.to_string())).ok(),
            None => {
                checks.fail("startTime", "is required");
                None
            },
        };
        let end = match &self.end_time {
            Some(s) => parse_date(s).map_err(|e| checks.fail("endTime", e.to_string())).ok(),
            None => {
                checks.fail("endTime", "is required");
                None
            },
        };
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                checks.fail("endTime", "the end date is before the start date");
            }
        }

        if let Some(d) = &self.diurnal {
            if d.values().iter().any(|v| !v.is_finite()) {
                checks.fail("diurnal", "parameters must be finite numbers");
            }
        }
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        Some(format!("WeatherStream({})", self.id))
    }
}

impl Streamable for WeatherStream {
    fn stream(&self, sink: &mut dyn WireSink) {
        sink.write_message("weatherstream", &self.record(&self.parent_id));
    }
}

/// Point weather source with one or more streams
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherStation {
    id: String,
    pub location: Option<LatLon>,
    /// Metres above sea level
    pub elevation: Option<f64>,
    pub streams: Vec<WeatherStream>,
    pub comments: String,
}

impl Identified for WeatherStation {
    fn id(&self) -> &str {
        &self.id
    }
}

impl WeatherStation {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Override the generated identifier; `|` is stripped and the streams
    /// already attached are re-parented
    pub fn set_id(&mut self, id: &str) -> &mut Self {
        self.id = sanitize_id(id);
        for stream in &mut self.streams {
            stream.parent_id = self.id.clone();
        }
        self
    }

    pub fn new(location: LatLon, elevation: f64) -> Self {
        Self {
            id: next_id(IdKind::WeatherStation),
            location: Some(location),
            elevation: Some(elevation),
            streams: Vec::new(),
            comments: String::new(),
        }
    }

    /// Attach a new stream reading from `filename`
    pub fn add_weather_stream(&mut self, filename: &str) -> &mut WeatherStream {
        let stream = WeatherStream::new(&self.id, filename);
        self.streams.push(stream);
        let last = self.streams.len() - 1;
        &mut self.streams[last]
    }

    pub fn stream_by_id(&self, id: &str) -> Option<&WeatherStream> {
        self.streams.iter().find(|s| s.id.eq_ignore_ascii_case(id))
    }
}

impl Validate for WeatherStation {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        if checks.require("location", &self.location) {
            if self.location.is_some_and(|l| !l.is_valid()) {
                checks.fail("location", "latitude or longitude is out of range");
            }
        }
        if checks.require("elevation", &self.elevation) {
            checks.opt_range("elevation", self.elevation, -500.0, 9000.0);
        }
        checks.extend(validate_identified("streams", &self.streams, ctx));
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        Some(format!("WeatherStation({})", self.id))
    }
}

impl Streamable for WeatherStation {
    fn stream(&self, sink: &mut dyn WireSink) {
        let record = Record::new().raw(self.id.as_str());
        let record = match &self.location {
            Some(l) => record.raw(l.to_wire()),
            None => record.opt_str(None).opt_str(None),
        };
        let value = record.opt_num(self.elevation).text(&self.comments).build();
        sink.write_message("weatherstation", &value);
        for stream in &self.streams {
            sink.write_message("weatherstream", &stream.record(&self.id));
        }
    }
}

/// One modification applied by a weather patch
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherPatchDetails {
    pub quantity: WeatherQuantity,
    pub operation: WeatherPatchOperation,
    pub value: f64,
}

impl WeatherPatchDetails {
    pub fn new(quantity: WeatherQuantity, operation: WeatherPatchOperation, value: f64) -> Self {
        Self {
            quantity,
            operation,
            value,
        }
    }
}

impl Validate for WeatherPatchDetails {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        match (self.operation, self.quantity) {
            (WeatherPatchOperation::Divide, _) if self.value == 0.0 => {
                checks.fail("value", "cannot divide by zero")
            },
            (WeatherPatchOperation::Equal, WeatherQuantity::RelativeHumidity) => {
                checks.range("value", self.value, 0.0, 100.0)
            },
            (WeatherPatchOperation::Equal, WeatherQuantity::WindDirection) => {
                if !(self.value >= 0.0 && self.value < 360.0) {
                    checks.fail("value", format!("{} is not a wind direction", self.value));
                }
            },
            (WeatherPatchOperation::Equal, WeatherQuantity::WindSpeed) => {
                checks.range("value", self.value, 0.0, 250.0)
            },
            (WeatherPatchOperation::Equal, WeatherQuantity::Precipitation) => {
                checks.at_least("value", self.value, 0.0)
            },
            _ => {},
        }
        checks.finish()
    }
}

/// Temporary weather modification over an area
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherPatch {
    id: String,
    pub shape: PatchShape,
    pub start_time: Option<String>,
    pub start_time_of_day: Duration,
    pub end_time: Option<String>,
    pub end_time_of_day: Duration,
    pub details: Vec<WeatherPatchDetails>,
    pub comments: String,
}

identified!(WeatherPatch);

impl WeatherPatch {
    pub fn new(shape: PatchShape) -> Self {
        Self {
            id: next_id(IdKind::WeatherPatch),
            shape,
            start_time: None,
            start_time_of_day: Duration::default(),
            end_time: None,
            end_time_of_day: Duration::default(),
            details: Vec::new(),
            comments: String::new(),
        }
    }

    pub fn set_window(
        &mut self,
        start: &str,
        start_tod: Duration,
        end: &str,
        end_tod: Duration,
    ) -> &mut Self {
        self.start_time = Some(start.to_string());
        self.start_time_of_day = start_tod;
        self.end_time = Some(end.to_string());
        self.end_time_of_day = end_tod;
        self
    }

    pub fn add_detail(&mut self, detail: WeatherPatchDetails) -> &mut Self {
        self.details.push(detail);
        self
    }
}

impl Validate for WeatherPatch {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        self.shape.check(&mut checks);
        check_window(
            &mut checks,
            self.start_time.as_deref(),
            &self.start_time_of_day,
            self.end_time.as_deref(),
            &self.end_time_of_day,
        );
        if self.details.is_empty() {
            checks.fail("details", "at least one modification is required");
        }
        checks.extend(validate_collection(
            "details",
            &self.details,
            ctx,
            "quantity",
            |d| Some(d.quantity.code().to_string()),
            &mut HashSet::new(),
        ));
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        Some(format!("WeatherPatch({})", self.id))
    }
}

impl Streamable for WeatherPatch {
    fn stream(&self, sink: &mut dyn WireSink) {
        let record = Record::new()
            .raw(self.id.as_str())
            .opt_str(self.start_time.as_deref())
            .raw(self.start_time_of_day.to_string())
            .opt_str(self.end_time.as_deref())
            .raw(self.end_time_of_day.to_string())
            .text(&self.comments)
            .list(&self.details, |r, d| {
                r.code(d.quantity.code()).code(d.operation.code()).num(d.value)
            });
        sink.write_message("weatherpatch", &self.shape.append(record).build());
    }
}

/// Gridded wind data for one sector
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherGridGridFile {
    pub sector: WeatherGridSector,
    pub speed: f64,
    pub filename: String,
    pub proj_filename: String,
}

impl WeatherGridGridFile {
    pub fn new(sector: WeatherGridSector, speed: f64, filename: &str, proj_filename: &str) -> Self {
        Self {
            sector,
            speed,
            filename: filename.to_string(),
            proj_filename: proj_filename.to_string(),
        }
    }
}

impl Validate for WeatherGridGridFile {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        checks.range("speed", self.speed, 0.0, 250.0);
        checks.file("filename", Some(self.filename.as_str()));
        checks.file("projection", Some(self.proj_filename.as_str()));
        checks.finish()
    }
}

/// Gridded wind speed or direction override
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherGrid {
    id: String,
    pub grid_type: Option<WeatherGridType>,
    pub start_time: Option<String>,
    pub start_time_of_day: Duration,
    pub end_time: Option<String>,
    pub end_time_of_day: Duration,
    pub default_value: Option<f64>,
    pub grid_data: Vec<WeatherGridGridFile>,
    pub comments: String,
}

identified!(WeatherGrid);

impl WeatherGrid {
    pub fn new(grid_type: WeatherGridType) -> Self {
        Self {
            id: next_id(IdKind::WeatherGrid),
            grid_type: Some(grid_type),
            start_time: None,
            start_time_of_day: Duration::default(),
            end_time: None,
            end_time_of_day: Duration::default(),
            default_value: None,
            grid_data: Vec::new(),
            comments: String::new(),
        }
    }

    pub fn set_window(
        &mut self,
        start: &str,
        start_tod: Duration,
        end: &str,
        end_tod: Duration,
    ) -> &mut Self {
        self.start_time = Some(start.to_string());
        self.start_time_of_day = start_tod;
        self.end_time = Some(end.to_string());
        self.end_time_of_day = end_tod;
        self
    }

    pub fn add_grid_data(&mut self, data: WeatherGridGridFile) -> &mut Self {
        self.grid_data.push(data);
        self
    }
}

impl Validate for WeatherGrid {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        checks.require("type", &self.grid_type);
        check_window(
            &mut checks,
            self.start_time.as_deref(),
            &self.start_time_of_day,
            self.end_time.as_deref(),
            &self.end_time_of_day,
        );
        match (self.grid_type, self.default_value) {
            (Some(WeatherGridType::Direction), Some(v)) if !(v >= 0.0 && v < 360.0) => {
                checks.fail("defaultValue", format!("{} is not a wind direction", v))
            },
            (Some(WeatherGridType::Speed), Some(v)) => checks.range("defaultValue", v, 0.0, 250.0),
            _ => {},
        }
        if self.grid_data.is_empty() {
            checks.fail("gridData", "at least one grid file is required");
        }
        checks.extend(validate_collection(
            "gridData",
            &self.grid_data,
            ctx,
            "sector",
            |g| Some(g.sector.code().to_string()),
            &mut HashSet::new(),
        ));
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        Some(format!("WeatherGrid({})", self.id))
    }
}

impl Streamable for WeatherGrid {
    fn stream(&self, sink: &mut dyn WireSink) {
        let value = Record::new()
            .raw(self.id.as_str())
            .opt_code(self.grid_type.map(WeatherGridType::code))
            .opt_str(self.start_time.as_deref())
            .raw(self.start_time_of_day.to_string())
            .opt_str(self.end_time.as_deref())
            .raw(self.end_time_of_day.to_string())
            .opt_num(self.default_value)
            .text(&self.comments)
            .list(&self.grid_data, |r, g| {
                r.code(g.sector.code())
                    .num(g.speed)
                    .raw(g.filename.as_str())
                    .raw(g.proj_filename.as_str())
            })
            .build();
        sink.write_message("weathergrid", &value);
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::wire::WireBuffer;

    fn fields(errors: &[ValidationError]) -> Vec<&str> {
        errors.iter().filter_map(|e| e.field_name()).collect()
    }

    fn station() -> WeatherStation {
        let mut station = WeatherStation::new(LatLon::new(53.5, -113.5), 680.0);
        station.set_id("s1");
        station
            .add_weather_stream("wx.txt")
            .set_id("w1")
            .set_hffmc(85.0, 13, HffmcMethod::Lawson)
            .set_starting_codes(89.0, 58.0, 480.0, 0.0)
            .set_dates("2024-06-01", "2024-06-03");
        station
    }

    #[test]
    fn test_station_stream_records() {
        let mut buf = WireBuffer::new();
        station().stream(&mut buf);
        assert_eq!(
            buf.lines(),
            vec![
                "weatherstation",
                "s1|53.5|-113.5|680|",
                "weatherstream",
                "w1|s1|wx.txt|85|13|1|89|58|480|0|2024-06-01|2024-06-03|-1|-1|-1|-1|-1|-1|-1|",
            ]
        );
        assert_eq!(buf.messages(), 2);
    }

    #[test]
    fn test_stream_parent_follows_station() {
        let s = station();
        assert_eq!(s.streams[0].parent_id, "s1");
        assert!(s.stream_by_id("W1").is_some());
        assert!(s.is_valid());
    }

    #[test]
    fn test_renamed_station_reparents_streams() {
        let mut s = WeatherStation::new(LatLon::new(53.5, -113.5), 680.0);
        s.add_weather_stream("wx.txt").set_id("w1");
        s.set_id("renamed");
        assert_eq!(s.streams[0].parent_id, "renamed");

        let mut buf = WireBuffer::new();
        s.streams[0].stream(&mut buf);
        assert!(buf.lines()[1].starts_with("w1|renamed|wx.txt|"));
    }

    #[test]
    fn test_stream_ranges() {
        let mut s = station();
        s.elevation = Some(9500.0);
        s.streams[0].starting_dc = Some(2000.0);
        s.streams[0].end_time = Some("2024-05-01".into());
        let errors = s.check_valid();
        assert_eq!(fields(&errors), vec!["elevation", "streams"]);
        let wrapper = errors[1].child_at(0).unwrap();
        assert_eq!(wrapper.object.as_deref(), Some("WeatherStream(w1)"));
        assert_eq!(fields(&wrapper.children), vec!["startingDc", "endTime"]);
    }

    #[test]
    fn test_patch_window_and_details() {
        let mut patch = WeatherPatch::new(PatchShape::Landscape);
        patch.set_id("p1").set_window(
            "2024-06-01",
            Duration::from_hours(13),
            "2024-06-01",
            Duration::from_hours(12),
        );
        patch
            .add_detail(WeatherPatchDetails::new(
                WeatherQuantity::WindSpeed,
                WeatherPatchOperation::Equal,
                300.0,
            ))
            .add_detail(WeatherPatchDetails::new(
                WeatherQuantity::WindSpeed,
                WeatherPatchOperation::Plus,
                5.0,
            ));
        let errors = patch.check_valid();
        assert_eq!(fields(&errors), vec!["endTime", "details"]);
        let details = &errors[1];
        assert_eq!(details.children.len(), 2);
        assert!(details.child_at(1).unwrap().child("quantity").is_some());
    }

    #[test]
    fn test_patch_record() {
        let mut patch = WeatherPatch::new(PatchShape::Landscape);
        patch.set_id("p1").set_window(
            "2024-06-01",
            Duration::from_hours(13),
            "2024-06-02",
            Duration::from_hm(6, 30),
        );
        patch.add_detail(WeatherPatchDetails::new(
            WeatherQuantity::Temperature,
            WeatherPatchOperation::Plus,
            2.5,
        ));
        assert!(patch.is_valid());
        let mut out = Vec::new();
        patch.stream(&mut out);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "weatherpatch\np1|2024-06-01|PT13H|2024-06-02|PT6H30M||1|0|1|2.5|4\n"
        );
    }

    #[test]
    fn test_grid_sectors_unique() {
        let mut grid = WeatherGrid::new(WeatherGridType::Direction);
        grid.set_id("g1").set_window(
            "2024-06-01",
            Duration::from_hours(0),
            "2024-06-01",
            Duration::from_hours(23),
        );
        grid.default_value = Some(360.0);
        let north = WeatherGridSector::North;
        grid.add_grid_data(WeatherGridGridFile::new(north, 10.0, "n.asc", "n.prj"))
            .add_grid_data(WeatherGridGridFile::new(north, 20.0, "n2.asc", "n2.prj"));
        let errors = grid.check_valid();
        assert_eq!(fields(&errors), vec!["defaultValue", "gridData"]);

        grid.default_value = None;
        grid.grid_data.pop();
        let mut out = Vec::new();
        grid.stream(&mut out);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "weathergrid\ng1|0|2024-06-01|PT0S|2024-06-01|PT23H|-1||1|0|10|n.asc|n.prj\n"
        );
    }
}
