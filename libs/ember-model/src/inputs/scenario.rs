//! Scenarios and the references they hold into the input collections
//!
//! A scenario refers to stations, streams, ignitions, assets and targets by
//! id only. Whether those ids exist is left to the builder.

use std::collections::HashSet;

use crate::duration::Duration;
use crate::geo::{parse_date, parse_time, LatLon};
use crate::ident::{identified, next_id, IdKind};
use crate::options::{FbpOptions, FgmOptions, FmcOptions, FwiOptions, OptionMode};
use crate::units::AssetOperation;
use crate::validation::{
    breaks_framing, group, validate_all, validate_collection, Checks, Validate, ValidationContext,
    ValidationError,
};
use crate::wire::{sanitize_text, Record, Streamable, WireSink};

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Fresh scenario with its own time window, or a copy of another scenario
#[derive(Debug, Clone, PartialEq)]
pub enum ScenarioMode {
    Fresh {
        start_time: Option<String>,
        end_time: Option<String>,
    },
    /// Unset values are inherited from `scen_to_copy`
    CopyOf {
        scen_to_copy: String,
        start_time: Option<String>,
        end_time: Option<String>,
    },
}

impl ScenarioMode {
    pub fn is_copy(&self) -> bool {
        matches!(self, ScenarioMode::CopyOf { .. })
    }

    pub fn option_mode(&self) -> OptionMode {
        match self {
            ScenarioMode::Fresh { .. } => OptionMode::Fresh,
            ScenarioMode::CopyOf { .. } => OptionMode::Copy,
        }
    }

    pub fn start_time(&self) -> Option<&str> {
        match self {
            ScenarioMode::Fresh { start_time, .. } | ScenarioMode::CopyOf { start_time, .. } => {
                start_time.as_deref()
            },
        }
    }

    pub fn end_time(&self) -> Option<&str> {
        match self {
            ScenarioMode::Fresh { end_time, .. } | ScenarioMode::CopyOf { end_time, .. } => {
                end_time.as_deref()
            },
        }
    }
}

/// Daily window in which the fire is allowed to burn
#[derive(Debug, Clone, PartialEq)]
pub struct BurningConditions {
    pub date: Option<String>,
    pub start_time: Duration,
    pub end_time: Duration,
    pub fwi_greater: f64,
    pub ws_greater: f64,
    pub rh_less: f64,
    pub isi_greater: f64,
}

impl BurningConditions {
    /// All-day window with the builder's usual thresholds
    pub fn new(date: &str) -> Self {
        Self {
            date: Some(date.to_string()),
            start_time: Duration::from_hours(0),
            end_time: Duration::from_hours(24),
            fwi_greater: 19.0,
            ws_greater: 0.0,
            rh_less: 95.0,
            isi_greater: 0.0,
        }
    }
}

impl Validate for BurningConditions {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        match &self.date {
            Some(d) => {
                if let Err(e) = parse_date(d) {
                    checks.fail("date", e.to_string());
                }
            },
            None => checks.fail("date", "is required"),
        }
        let mut window_ok = true;
        for (field, tod) in [("startTime", &self.start_time), ("endTime", &self.end_time)] {
            let secs = tod.to_seconds_approx();
            if tod.is_unset() || !tod.is_valid() || tod.is_negative || secs > SECONDS_PER_DAY {
                checks.fail(field, format!("{} is not within one day", tod));
                window_ok = false;
            }
        }
        if window_ok && self.start_time.compare(&self.end_time).is_gt() {
            checks.fail("endTime", "the end time is before the start time");
        }
        checks.at_least("fwiGreater", self.fwi_greater, 0.0);
        checks.range("wsGreater", self.ws_greater, 0.0, 200.0);
        checks.range("rhLess", self.rh_less, 0.0, 100.0);
        checks.at_least("isiGreater", self.isi_greater, 0.0);
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        self.date.as_ref().map(|d| format!("BurningConditions({})", d))
    }
}

impl BurningConditions {
    fn record(&self) -> String {
        Record::new()
            .opt_str(self.date.as_deref())
            .raw(self.start_time.to_string())
            .raw(self.end_time.to_string())
            .num(self.fwi_greater)
            .num(self.ws_greater)
            .num(self.rh_less)
            .num(self.isi_greater)
            .build()
    }
}

/// Reference to a weather stream, optionally narrowing its time range
#[derive(Debug, Clone, PartialEq)]
pub struct StationStream {
    pub station_id: String,
    pub stream_id: String,
    pub primary: bool,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

impl StationStream {
    pub fn new(station_id: &str, stream_id: &str) -> Self {
        Self {
            station_id: station_id.to_string(),
            stream_id: stream_id.to_string(),
            primary: false,
            start_time: None,
            end_time: None,
        }
    }

    fn key(&self) -> String {
        format!("{}|{}", self.station_id, self.stream_id)
    }
}

impl Validate for StationStream {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        checks.require_text("stationId", Some(&self.station_id));
        checks.require_text("streamId", Some(&self.stream_id));
        for (field, value) in [("startTime", &self.start_time), ("endTime", &self.end_time)] {
            if let Some(Err(e)) = value.as_deref().map(parse_time) {
                checks.fail(field, e.to_string());
            }
        }
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        Some(format!("StationStream({})", self.key()))
    }
}

/// Sub-scenario split along the vertices of a polyline ignition
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PolylineIgnitionOptions {
    pub name: String,
    pub point_spacing: f64,
    pub poly_index: i32,
    pub point_index: i32,
}

/// Sub-scenario per point of a multi-point ignition
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiPointIgnitionOptions {
    pub name: String,
    pub point_spacing: f64,
    pub index: i32,
}

/// Sub-scenario for a single point, optionally moved
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SinglePointIgnitionOptions {
    pub name: String,
    pub index: i32,
    pub point: Option<LatLon>,
}

/// How an ignition reference is split into sub-scenarios
#[derive(Debug, Clone, PartialEq)]
pub enum IgnitionSubOptions {
    Polyline(PolylineIgnitionOptions),
    MultiPoint(MultiPointIgnitionOptions),
    SinglePoint(SinglePointIgnitionOptions),
}

impl IgnitionSubOptions {
    /// Fold three independently optional variants into one
    ///
    /// More than one populated variant is an error on `subOptions`,
    /// whatever the variants contain.
    pub fn from_variants(
        polyline: Option<PolylineIgnitionOptions>,
        multi_point: Option<MultiPointIgnitionOptions>,
        single_point: Option<SinglePointIgnitionOptions>,
    ) -> Result<Option<Self>, ValidationError> {
        match (polyline, multi_point, single_point) {
            (None, None, None) => Ok(None),
            (Some(p), None, None) => Ok(Some(IgnitionSubOptions::Polyline(p))),
            (None, Some(m), None) => Ok(Some(IgnitionSubOptions::MultiPoint(m))),
            (None, None, Some(s)) => Ok(Some(IgnitionSubOptions::SinglePoint(s))),
            _ => Err(ValidationError::field(
                "subOptions",
                "only one of polyline, multi-point or single-point options may be set",
            )),
        }
    }

    fn check(&self, checks: &mut Checks<'_>) {
        let min_index = |checks: &mut Checks<'_>, field: &str, v: i32| {
            if v < -1 {
                checks.fail(field, format!("{} is less than -1", v));
            }
        };
        match self {
            IgnitionSubOptions::Polyline(p) => {
                checks.unframed("name", &p.name);
                checks.at_least("pointSpacing", p.point_spacing, 0.0);
                min_index(checks, "polyIndex", p.poly_index);
                min_index(checks, "pointIndex", p.point_index);
            },
            IgnitionSubOptions::MultiPoint(m) => {
                checks.unframed("name", &m.name);
                checks.at_least("pointSpacing", m.point_spacing, 0.0);
                min_index(checks, "index", m.index);
            },
            IgnitionSubOptions::SinglePoint(s) => {
                checks.unframed("name", &s.name);
                min_index(checks, "index", s.index);
                if s.point.is_some_and(|p| !p.is_valid()) {
                    checks.fail("point", "latitude or longitude is out of range");
                }
            },
        }
    }

    fn append(&self, record: Record) -> Record {
        match self {
            IgnitionSubOptions::Polyline(p) => record
                .raw("1")
                .opt_str(Some(p.name.as_str()))
                .num(p.point_spacing)
                .int(i64::from(p.poly_index))
                .int(i64::from(p.point_index)),
            IgnitionSubOptions::MultiPoint(m) => record
                .raw("2")
                .opt_str(Some(m.name.as_str()))
                .num(m.point_spacing)
                .int(i64::from(m.index)),
            IgnitionSubOptions::SinglePoint(s) => {
                let record = record
                    .raw("3")
                    .opt_str(Some(s.name.as_str()))
                    .int(i64::from(s.index));
                match &s.point {
                    Some(p) => record.raw(p.to_wire()),
                    None => record.opt_str(None).opt_str(None),
                }
            },
        }
    }
}

/// Reference to an ignition used by a scenario
#[derive(Debug, Clone, PartialEq)]
pub struct IgnitionReference {
    pub ignition_id: String,
    pub sub_options: Option<IgnitionSubOptions>,
}

impl IgnitionReference {
    pub fn new(ignition_id: &str) -> Self {
        Self {
            ignition_id: ignition_id.to_string(),
            sub_options: None,
        }
    }
}

impl Validate for IgnitionReference {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        checks.require_text("ignitionId", Some(&self.ignition_id));
        if let Some(sub) = &self.sub_options {
            let mut inner = Checks::new(ctx);
            sub.check(&mut inner);
            checks.nested("subOptions", inner.finish());
        }
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        Some(format!("IgnitionReference({})", self.ignition_id))
    }
}

impl IgnitionReference {
    fn record(&self) -> String {
        let record = Record::new().raw(self.ignition_id.as_str());
        match &self.sub_options {
            Some(sub) => sub.append(record).build(),
            None => record.raw("0").build(),
        }
    }
}

/// Grid or patch layered into a scenario at a given index
#[derive(Debug, Clone, PartialEq)]
pub struct LayerInfo {
    pub name: String,
    pub index: i32,
    pub sub_names: Vec<String>,
}

impl LayerInfo {
    pub fn new(name: &str, index: i32) -> Self {
        Self {
            name: name.to_string(),
            index,
            sub_names: Vec::new(),
        }
    }
}

impl Validate for LayerInfo {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        checks.require_text("name", Some(&self.name));
        if self.index < 0 {
            checks.fail("index", format!("{} must not be negative", self.index));
        }
        if self.sub_names.iter().any(|n| n.trim().is_empty()) {
            checks.fail("subNames", "sub-scenario names must not be empty");
        }
        for name in &self.sub_names {
            checks.unframed("subNames", name);
        }
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        Some(format!("LayerInfo({})", self.name))
    }
}

/// Asset tracked by a scenario and what happens when the fire reaches it
#[derive(Debug, Clone, PartialEq)]
pub struct AssetReference {
    pub name: String,
    pub operation: AssetOperation,
    /// Number of assets to reach before stopping; `-1` unless `StopAfterX`
    pub collision_count: i32,
}

impl AssetReference {
    pub fn new(name: &str, operation: AssetOperation) -> Self {
        Self {
            name: name.to_string(),
            operation,
            collision_count: -1,
        }
    }
}

impl Validate for AssetReference {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        checks.require_text("name", Some(&self.name));
        match self.operation {
            AssetOperation::StopAfterX if self.collision_count < 1 => {
                checks.fail("collisionCount", "at least one collision is required")
            },
            AssetOperation::StopAfterX => {},
            _ if self.collision_count != -1 => checks.fail(
                "collisionCount",
                "only used when stopping after a number of collisions",
            ),
            _ => {},
        }
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        Some(format!("AssetReference({})", self.name))
    }
}

/// Point of a target file that wind or vectors are directed at
#[derive(Debug, Clone, PartialEq)]
pub struct TargetReference {
    pub name: String,
    pub geometry_index: i32,
    pub point_index: i32,
}

impl TargetReference {
    pub fn new(name: &str, geometry_index: i32, point_index: i32) -> Self {
        Self {
            name: name.to_string(),
            geometry_index,
            point_index,
        }
    }

    fn record(&self) -> String {
        Record::new()
            .raw(self.name.as_str())
            .int(i64::from(self.geometry_index))
            .int(i64::from(self.point_index))
            .build()
    }
}

impl Validate for TargetReference {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        checks.require_text("name", Some(&self.name));
        if self.geometry_index < 0 {
            checks.fail("geometryIndex", "must not be negative");
        }
        if self.point_index < 0 {
            checks.fail("pointIndex", "must not be negative");
        }
        checks.finish()
    }
}

/// One simulation run within a job
#[derive(Debug, Clone, PartialEq)]
pub struct Scenario {
    id: String,
    pub mode: ScenarioMode,
    pub display_interval: Duration,
    pub comments: String,
    pub fgm_options: FgmOptions,
    pub fbp_options: FbpOptions,
    pub fmc_options: FmcOptions,
    pub fwi_options: FwiOptions,
    pub burning_conditions: Vec<BurningConditions>,
    pub vector_refs: Vec<String>,
    pub station_streams: Vec<StationStream>,
    pub ignition_refs: Vec<IgnitionReference>,
    pub layer_info: Vec<LayerInfo>,
    pub asset_refs: Vec<AssetReference>,
    pub wind_target: Option<TargetReference>,
    pub vector_target: Option<TargetReference>,
}

identified!(Scenario);

impl Scenario {
    /// Fresh scenario with the recommended option bundles
    pub fn new(start_time: &str, end_time: &str) -> Self {
        Self::with_mode(ScenarioMode::Fresh {
            start_time: Some(start_time.to_string()),
            end_time: Some(end_time.to_string()),
        })
    }

    /// Scenario inheriting everything unset from `scen_to_copy`
    pub fn copy_of(scen_to_copy: &str) -> Self {
        Self::with_mode(ScenarioMode::CopyOf {
            scen_to_copy: scen_to_copy.to_string(),
            start_time: None,
            end_time: None,
        })
    }

    fn with_mode(mode: ScenarioMode) -> Self {
        let fresh = !mode.is_copy();
        Self {
            id: next_id(IdKind::Scenario),
            mode,
            display_interval: if fresh {
                Duration::from_hours(1)
            } else {
                Duration::default()
            },
            comments: String::new(),
            fgm_options: if fresh {
                FgmOptions::recommended()
            } else {
                FgmOptions::default()
            },
            fbp_options: if fresh {
                FbpOptions::recommended()
            } else {
                FbpOptions::default()
            },
            fmc_options: if fresh {
                FmcOptions::recommended()
            } else {
                FmcOptions::default()
            },
            fwi_options: if fresh {
                FwiOptions::recommended()
            } else {
                FwiOptions::default()
            },
            burning_conditions: Vec::new(),
            vector_refs: Vec::new(),
            station_streams: Vec::new(),
            ignition_refs: Vec::new(),
            layer_info: Vec::new(),
            asset_refs: Vec::new(),
            wind_target: None,
            vector_target: None,
        }
    }

    pub fn add_burning_condition(
        &mut self,
        condition: BurningConditions,
    ) -> &mut BurningConditions {
        self.burning_conditions.push(condition);
        let last = self.burning_conditions.len() - 1;
        &mut self.burning_conditions[last]
    }

    pub fn add_vector_ref(&mut self, fuel_break_id: &str) -> &mut Self {
        self.vector_refs.push(fuel_break_id.to_string());
        self
    }

    pub fn add_station_stream(&mut self, station_id: &str, stream_id: &str) -> &mut StationStream {
        self.station_streams.push(StationStream::new(station_id, stream_id));
        let last = self.station_streams.len() - 1;
        &mut self.station_streams[last]
    }

    pub fn add_ignition_ref(&mut self, ignition_id: &str) -> &mut IgnitionReference {
        self.ignition_refs.push(IgnitionReference::new(ignition_id));
        let last = self.ignition_refs.len() - 1;
        &mut self.ignition_refs[last]
    }

    pub fn add_layer_info(&mut self, name: &str, index: i32) -> &mut LayerInfo {
        self.layer_info.push(LayerInfo::new(name, index));
        let last = self.layer_info.len() - 1;
        &mut self.layer_info[last]
    }

    pub fn add_asset_ref(&mut self, name: &str, operation: AssetOperation) -> &mut AssetReference {
        self.asset_refs.push(AssetReference::new(name, operation));
        let last = self.asset_refs.len() - 1;
        &mut self.asset_refs[last]
    }

    fn check_times(&self, checks: &mut Checks<'_>) {
        let fresh = !self.mode.is_copy();
        let mut parsed = [None, None];
        for (slot, (field, value)) in [
            ("startTime", self.mode.start_time()),
            ("endTime", self.mode.end_time()),
        ]
        .into_iter()
        .enumerate()
        {
            match value {
                Some(v) => match parse_time(v) {
                    Ok(t) => parsed[slot] = Some(t),
                    Err(e) => checks.fail(field, e.to_string()),
                },
                None if fresh => checks.fail(field, "is required"),
                None => {},
            }
        }
        if let [Some(start), Some(end)] = parsed {
            if start > end {
                checks.fail("endTime", "the end time is before the start time");
            }
        }
    }

    fn check_vector_refs(&self) -> Option<ValidationError> {
        let mut seen = HashSet::new();
        let errors = self
            .vector_refs
            .iter()
            .enumerate()
            .filter_map(|(i, name)| {
                if name.trim().is_empty() {
                    Some(ValidationError::index(i, "fuel break id must not be empty"))
                } else if breaks_framing(name) {
                    Some(ValidationError::index(i, "fuel break id contains '|' or a line break"))
                } else if !seen.insert(name.to_lowercase()) {
                    Some(ValidationError::index(i, format!("duplicate fuel break '{}'", name)))
                } else {
                    None
                }
            })
            .collect();
        group("vectorRefs", errors)
    }
}

impl Validate for Scenario {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mode = self.mode.option_mode();
        let mut checks = Checks::new(ctx);

        if let ScenarioMode::CopyOf { scen_to_copy, .. } = &self.mode {
            checks.require_text("scenToCopy", Some(scen_to_copy));
        }
        self.check_times(&mut checks);

        match mode {
            OptionMode::Fresh => {
                if self.display_interval.is_unset() {
                    checks.fail("displayInterval", "is required");
                } else if !self.display_interval.is_valid() {
                    checks.fail("displayInterval", "is not a valid duration");
                }
            },
            OptionMode::Copy => {
                if !self.display_interval.is_unset() && !self.display_interval.is_valid() {
                    checks.fail("displayInterval", "is not a valid duration");
                }
            },
        }

        checks.nested("fgmOptions", self.fgm_options.validate_for(mode, ctx));
        checks.nested("fbpOptions", self.fbp_options.validate_for(mode, ctx));
        checks.nested("fmcOptions", self.fmc_options.validate_for(mode, ctx));
        checks.nested("fwiOptions", self.fwi_options.validate_for(mode, ctx));

        if mode == OptionMode::Fresh {
            if self.station_streams.is_empty() {
                checks.fail("stationStreams", "at least one weather stream is required");
            }
            if self.ignition_refs.is_empty() {
                checks.fail("ignitionRefs", "at least one ignition is required");
            }
        }
        let primaries = self.station_streams.iter().filter(|s| s.primary).count();
        if primaries > 1 || (self.station_streams.len() > 1 && primaries == 0) {
            checks.fail("stationStreams", "exactly one weather stream must be primary");
        }

        checks.extend(validate_all("burningConditions", &self.burning_conditions, ctx));
        checks.extend(self.check_vector_refs());
        checks.extend(validate_collection(
            "stationStreams",
            &self.station_streams,
            ctx,
            "streamId",
            |s| Some(s.key()),
            &mut HashSet::new(),
        ));
        checks.extend(validate_collection(
            "ignitionRefs",
            &self.ignition_refs,
            ctx,
            "ignitionId",
            |r| Some(r.ignition_id.clone()),
            &mut HashSet::new(),
        ));
        checks.extend(validate_collection(
            "layerInfo",
            &self.layer_info,
            ctx,
            "name",
            |l| Some(l.name.clone()),
            &mut HashSet::new(),
        ));
        checks.extend(validate_collection(
            "assetRefs",
            &self.asset_refs,
            ctx,
            "name",
            |a| Some(a.name.clone()),
            &mut HashSet::new(),
        ));
        if let Some(target) = &self.wind_target {
            checks.nested("windTarget", target.validate(ctx));
        }
        if let Some(target) = &self.vector_target {
            checks.nested("vectorTarget", target.validate(ctx));
        }
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        Some(format!("Scenario({})", self.id))
    }
}

impl Streamable for Scenario {
    fn stream(&self, sink: &mut dyn WireSink) {
        let mode = self.mode.option_mode();
        sink.write_message("scenariobegin", &self.id);
        if let ScenarioMode::CopyOf { scen_to_copy, .. } = &self.mode {
            sink.write_message("scenariotocopy", scen_to_copy);
        }
        if let Some(start) = self.mode.start_time() {
            sink.write_message("starttime", start);
        }
        if let Some(end) = self.mode.end_time() {
            sink.write_message("endtime", end);
        }
        if mode == OptionMode::Fresh || !self.display_interval.is_unset() {
            sink.write_message("displayinterval", &self.display_interval.to_string());
        }
        if !self.comments.is_empty() {
            sink.write_message("comments", &sanitize_text(&self.comments));
        }

        self.fgm_options.stream_for(mode, sink);
        self.fbp_options.stream_for(mode, sink);
        self.fmc_options.stream_for(mode, sink);
        self.fwi_options.stream(sink);

        for condition in &self.burning_conditions {
            sink.write_message("burningcondition", &condition.record());
        }
        for vector in &self.vector_refs {
            sink.write_message("vectorref", vector);
        }
        for stream in &self.station_streams {
            let value = Record::new()
                .raw(stream.station_id.as_str())
                .raw(stream.stream_id.as_str())
                .bool(stream.primary)
                .opt_str(stream.start_time.as_deref())
                .opt_str(stream.end_time.as_deref())
                .build();
            sink.write_message("stationstream", &value);
        }
        for ignition in &self.ignition_refs {
            sink.write_message("ignitionref", &ignition.record());
        }
        for layer in &self.layer_info {
            let value = Record::new()
                .raw(layer.name.as_str())
                .int(i64::from(layer.index))
                .list(&layer.sub_names, |r, n| r.raw(n.as_str()))
                .build();
            sink.write_message("layerinfo", &value);
        }
        for asset in &self.asset_refs {
            let value = Record::new()
                .raw(asset.name.as_str())
                .code(asset.operation.code())
                .int(i64::from(asset.collision_count))
                .build();
            sink.write_message("assetref", &value);
        }
        if let Some(target) = &self.wind_target {
            sink.write_message("windtarget", &target.record());
        }
        if let Some(target) = &self.vector_target {
            sink.write_message("vectortarget", &target.record());
        }
        sink.write_message("scenarioend", &self.id);
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

    fn fresh() -> Scenario {
        let mut scen = Scenario::new("2024-06-01T13:00:00", "2024-06-02T13:00:00");
        scen.set_id("scen0");
        scen.add_station_stream("s1", "w1").primary = true;
        scen.add_ignition_ref("i1");
        scen
    }

    #[test]
    fn test_fresh_scenario_valid() {
        assert!(fresh().is_valid());
    }

    #[test]
    fn test_fresh_scenario_requires_start() {
        let mut scen = fresh();
        scen.mode = ScenarioMode::Fresh {
            start_time: None,
            end_time: Some("2024-06-02T13:00:00".into()),
        };
        assert_eq!(fields(&scen.check_valid()), vec!["startTime"]);
    }

    #[test]
    fn test_copy_scenario() {
        let scen = Scenario::copy_of("scen0");
        assert!(scen.is_valid());
        let empty = Scenario::copy_of("  ");
        assert_eq!(fields(&empty.check_valid()), vec!["scenToCopy"]);
    }

    #[test]
    fn test_copy_scenario_streams_only_set_options() {
        let mut scen = Scenario::copy_of("scen0");
        scen.set_id("scen1");
        scen.fgm_options.set_spotting(false);
        let mut buf = WireBuffer::new();
        scen.stream(&mut buf);
        assert_eq!(
            buf.lines(),
            vec![
                "scenariobegin", "scen1",
                "scenariotocopy", "scen0",
                "spotting", "false",
                "fwispacinterp", "false",
                "fwifromspacweather", "false",
                "historyonfwi", "false",
                "fwitemporalinterp", "false",
                "scenarioend", "scen1",
            ]
        );
    }

    #[test]
    fn test_sub_options_exclusive() {
        let err = IgnitionSubOptions::from_variants(
            Some(PolylineIgnitionOptions::default()),
            None,
            Some(SinglePointIgnitionOptions::default()),
        )
        .unwrap_err();
        assert_eq!(err.field_name(), Some("subOptions"));
        assert!(err.children.is_empty());

        let one = IgnitionSubOptions::from_variants(
            None,
            Some(MultiPointIgnitionOptions {
                name: "east".into(),
                point_spacing: 50.0,
                index: 2,
            }),
            None,
        )
        .unwrap();
        let mut reference = IgnitionReference::new("i1");
        reference.sub_options = one;
        assert!(reference.is_valid());
        assert_eq!(reference.record(), "i1|2|east|50|2");
        assert!(IgnitionSubOptions::from_variants(None, None, None).unwrap().is_none());
    }

    #[test]
    fn test_single_point_without_point() {
        let mut reference = IgnitionReference::new("i1");
        reference.sub_options = Some(IgnitionSubOptions::SinglePoint(SinglePointIgnitionOptions {
            name: String::new(),
            index: -1,
            point: None,
        }));
        assert_eq!(reference.record(), "i1|3|null|-1|null|null");
    }

    #[test]
    fn test_primary_stream_rule() {
        let mut scen = fresh();
        scen.add_station_stream("s1", "w2");
        assert!(scen.is_valid());
        scen.station_streams[1].primary = true;
        assert_eq!(fields(&scen.check_valid()), vec!["stationStreams"]);
        scen.station_streams[0].primary = false;
        scen.station_streams[1].primary = false;
        assert_eq!(fields(&scen.check_valid()), vec!["stationStreams"]);
    }

    #[test]
    fn test_station_stream_keys_do_not_collide() {
        let mut scen = Scenario::new("2024-06-01T13:00:00", "2024-06-02T13:00:00");
        scen.set_id("scen0");
        scen.add_station_stream("a/b", "c").primary = true;
        scen.add_station_stream("a", "b/c");
        scen.add_ignition_ref("i1");
        assert!(scen.is_valid());

        scen.add_station_stream("A/B", "C");
        let errors = scen.check_valid();
        assert_eq!(fields(&errors), vec!["stationStreams"]);
        assert!(errors[0].child_at(2).is_some());
    }

    #[test]
    fn test_references_reject_framing_characters() {
        let mut scen = fresh();
        scen.add_station_stream("s|2", "w1");
        scen.add_vector_ref("fb\n1");
        scen.add_layer_info("layer", 0).sub_names.push("east|west".into());
        let errors = scen.check_valid();
        assert_eq!(fields(&errors), vec!["vectorRefs", "stationStreams", "layerInfo"]);
        let stream = errors[1].child_at(1).unwrap();
        assert!(stream.child("stationId").is_some());
        assert!(errors[2].child_at(0).unwrap().child("subNames").is_some());

        let mut reference = IgnitionReference::new("i1");
        reference.sub_options = Some(IgnitionSubOptions::MultiPoint(MultiPointIgnitionOptions {
            name: "north\r".into(),
            point_spacing: 50.0,
            index: 0,
        }));
        let errors = reference.check_valid();
        assert!(errors[0].child("name").is_some());
    }

    #[test]
    fn test_duplicate_references() {
        let mut scen = fresh();
        scen.add_ignition_ref("I1");
        scen.add_vector_ref("fb1").add_vector_ref("FB1");
        let errors = scen.check_valid();
        assert_eq!(fields(&errors), vec!["vectorRefs", "ignitionRefs"]);
        assert!(errors[1].child_at(1).unwrap().child("ignitionId").is_some());
    }

    #[test]
    fn test_burning_condition_record() {
        let mut scen = fresh();
        let cond = scen.add_burning_condition(BurningConditions::new("2024-06-01"));
        cond.start_time = Duration::from_hours(10);
        cond.end_time = Duration::from_hours(21);
        assert_eq!(cond.record(), "2024-06-01|PT10H|PT21H|19|0|95|0");
        cond.rh_less = 120.0;
        let errors = scen.check_valid();
        assert_eq!(fields(&errors), vec!["burningConditions"]);
    }

    #[test]
    fn test_asset_collision_count() {
        let mut asset = AssetReference::new("town", AssetOperation::StopAfterX);
        assert!(!asset.is_valid());
        asset.collision_count = 2;
        assert!(asset.is_valid());
        let mut other = AssetReference::new("road", AssetOperation::NoEffect);
        assert!(other.is_valid());
        other.collision_count = 3;
        assert!(!other.is_valid());
    }
}
