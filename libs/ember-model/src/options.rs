//! Per-scenario option bundles
//!
//! Each bundle has two wire encodings. A fresh scenario streams every key,
//! falling back to the builder's recommended value for unset required
//! fields. A scenario copied from another one streams only the fields that
//! were set, so everything else is inherited.

use crate::duration::Duration;
use crate::units::AssetOperation;
use crate::validation::{Checks, Validate, ValidationContext, ValidationError};
use crate::wire::{format_number, WireSink};

/// Which encoding and rule set applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionMode {
    /// Required fields must be set
    Fresh,
    /// Only range checks; unset fields are inherited
    Copy,
}

fn write_bool(sink: &mut dyn WireSink, key: &str, value: bool) {
    sink.write_message(key, if value { "true" } else { "false" });
}

fn write_num(sink: &mut dyn WireSink, key: &str, value: f64) {
    sink.write_message(key, &format_number(value));
}

fn opt_bool(sink: &mut dyn WireSink, key: &str, value: Option<bool>) {
    if let Some(v) = value {
        write_bool(sink, key, v);
    }
}

fn opt_num(sink: &mut dyn WireSink, key: &str, value: Option<f64>) {
    if let Some(v) = value {
        write_num(sink, key, v);
    }
}

fn opt_int(sink: &mut dyn WireSink, key: &str, value: Option<i32>) {
    if let Some(v) = value {
        sink.write_message(key, &v.to_string());
    }
}

fn opt_duration(sink: &mut dyn WireSink, key: &str, value: Option<Duration>) {
    if let Some(v) = value {
        sink.write_message(key, &v.to_string());
    }
}

/// Fire growth model options
///
/// Fields are private: several of them are coupled and the setters keep
/// the couplings consistent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FgmOptions {
    pub(crate) max_acc_ts: Option<Duration>,
    pub(crate) dist_res: Option<f64>,
    pub(crate) perim_res: Option<f64>,
    pub(crate) minimum_spreading_ros: Option<f64>,
    pub(crate) stop_at_grid_end: Option<bool>,
    pub(crate) breaching: Option<bool>,
    pub(crate) dynamic_spatial_threshold: Option<bool>,
    pub(crate) spotting: Option<bool>,
    pub(crate) purge_non_displayable: Option<bool>,
    pub(crate) dx: Option<f64>,
    pub(crate) dy: Option<f64>,
    pub(crate) dt: Option<Duration>,
    pub(crate) dwd: Option<f64>,
    pub(crate) owd: Option<f64>,
    pub(crate) dvd: Option<f64>,
    pub(crate) growth_percentile_applied: Option<bool>,
    pub(crate) growth_percentile: Option<f64>,
    pub(crate) suppress_tight_concave: Option<bool>,
    pub(crate) non_fuels_as_vector_breaks: Option<bool>,
    pub(crate) non_fuels_to_vector_breaks: Option<bool>,
    pub(crate) use_independent_timesteps: Option<bool>,
    pub(crate) perimeter_spacing: Option<f64>,
    pub(crate) initial_vertex_count: Option<i32>,
    pub(crate) ignition_size: Option<f64>,
    pub(crate) global_asset_operation: Option<AssetOperation>,
    pub(crate) asset_collision_count: Option<i32>,
}

/// Recommended maximum time step
pub fn default_max_acc_ts() -> Duration {
    Duration::from_minutes(2)
}

impl FgmOptions {
    /// Options pre-filled with the builder's recommended values
    pub fn recommended() -> Self {
        Self {
            max_acc_ts: Some(default_max_acc_ts()),
            dist_res: Some(1.0),
            perim_res: Some(1.0),
            stop_at_grid_end: Some(true),
            breaching: Some(true),
            dynamic_spatial_threshold: Some(true),
            spotting: Some(true),
            purge_non_displayable: Some(false),
            ..Self::default()
        }
    }

    pub fn max_acc_ts(&self) -> Option<Duration> {
        self.max_acc_ts
    }

    /// Set the maximum time step. Clears the distance resolution, which the
    /// builder derives from the time step unless it is set again.
    pub fn set_max_acc_ts(&mut self, value: Duration) -> &mut Self {
        self.max_acc_ts = Some(value);
        self.dist_res = None;
        self
    }

    pub fn dist_res(&self) -> Option<f64> {
        self.dist_res
    }

    pub fn set_dist_res(&mut self, value: f64) -> &mut Self {
        self.dist_res = Some(value);
        self
    }

    pub fn perim_res(&self) -> Option<f64> {
        self.perim_res
    }

    pub fn set_perim_res(&mut self, value: f64) -> &mut Self {
        self.perim_res = Some(value);
        self
    }

    pub fn minimum_spreading_ros(&self) -> Option<f64> {
        self.minimum_spreading_ros
    }

    pub fn set_minimum_spreading_ros(&mut self, value: f64) -> &mut Self {
        self.minimum_spreading_ros = Some(value);
        self
    }

    pub fn stop_at_grid_end(&self) -> Option<bool> {
        self.stop_at_grid_end
    }

    pub fn set_stop_at_grid_end(&mut self, value: bool) -> &mut Self {
        self.stop_at_grid_end = Some(value);
        self
    }

    pub fn breaching(&self) -> Option<bool> {
        self.breaching
    }

    pub fn set_breaching(&mut self, value: bool) -> &mut Self {
        self.breaching = Some(value);
        self
    }

    pub fn dynamic_spatial_threshold(&self) -> Option<bool> {
        self.dynamic_spatial_threshold
    }

    pub fn set_dynamic_spatial_threshold(&mut self, value: bool) -> &mut Self {
        self.dynamic_spatial_threshold = Some(value);
        self
    }

    pub fn spotting(&self) -> Option<bool> {
        self.spotting
    }

    pub fn set_spotting(&mut self, value: bool) -> &mut Self {
        self.spotting = Some(value);
        self
    }

    pub fn purge_non_displayable(&self) -> Option<bool> {
        self.purge_non_displayable
    }

    pub fn set_purge_non_displayable(&mut self, value: bool) -> &mut Self {
        self.purge_non_displayable = Some(value);
        self
    }

    /// Weather offsets applied during the simulation
    pub fn set_perturbation(
        &mut self,
        dx: Option<f64>,
        dy: Option<f64>,
        dt: Option<Duration>,
        dwd: Option<f64>,
    ) -> &mut Self {
        self.dx = dx;
        self.dy = dy;
        self.dt = dt;
        self.dwd = dwd;
        self
    }

    pub fn dx(&self) -> Option<f64> {
        self.dx
    }

    pub fn dy(&self) -> Option<f64> {
        self.dy
    }

    pub fn dt(&self) -> Option<Duration> {
        self.dt
    }

    pub fn dwd(&self) -> Option<f64> {
        self.dwd
    }

    pub fn set_owd(&mut self, value: f64) -> &mut Self {
        self.owd = Some(value);
        self
    }

    pub fn owd(&self) -> Option<f64> {
        self.owd
    }

    pub fn set_dvd(&mut self, value: f64) -> &mut Self {
        self.dvd = Some(value);
        self
    }

    pub fn dvd(&self) -> Option<f64> {
        self.dvd
    }

    pub fn growth_percentile_applied(&self) -> Option<bool> {
        self.growth_percentile_applied
    }

    /// Turning the growth percentile off drops any configured percentile
    pub fn set_growth_percentile_applied(&mut self, value: bool) -> &mut Self {
        self.growth_percentile_applied = Some(value);
        if !value {
            self.growth_percentile = None;
        }
        self
    }

    pub fn growth_percentile(&self) -> Option<f64> {
        self.growth_percentile
    }

    pub fn set_growth_percentile(&mut self, value: f64) -> &mut Self {
        self.growth_percentile = Some(value);
        self
    }

    pub fn suppress_tight_concave(&self) -> Option<bool> {
        self.suppress_tight_concave
    }

    pub fn set_suppress_tight_concave(&mut self, value: bool) -> &mut Self {
        self.suppress_tight_concave = Some(value);
        self
    }

    pub fn non_fuels_as_vector_breaks(&self) -> Option<bool> {
        self.non_fuels_as_vector_breaks
    }

    /// Turning this off also clears `non_fuels_to_vector_breaks`
    pub fn set_non_fuels_as_vector_breaks(&mut self, value: bool) -> &mut Self {
        self.non_fuels_as_vector_breaks = Some(value);
        if !value {
            self.non_fuels_to_vector_breaks = None;
        }
        self
    }

    pub fn non_fuels_to_vector_breaks(&self) -> Option<bool> {
        self.non_fuels_to_vector_breaks
    }

    pub fn set_non_fuels_to_vector_breaks(&mut self, value: bool) -> &mut Self {
        self.non_fuels_to_vector_breaks = Some(value);
        self
    }

    pub fn use_independent_timesteps(&self) -> Option<bool> {
        self.use_independent_timesteps
    }

    pub fn set_use_independent_timesteps(&mut self, value: bool) -> &mut Self {
        self.use_independent_timesteps = Some(value);
        self
    }

    pub fn perimeter_spacing(&self) -> Option<f64> {
        self.perimeter_spacing
    }

    pub fn set_perimeter_spacing(&mut self, value: f64) -> &mut Self {
        self.perimeter_spacing = Some(value);
        self
    }

    pub fn initial_vertex_count(&self) -> Option<i32> {
        self.initial_vertex_count
    }

    pub fn set_initial_vertex_count(&mut self, value: i32) -> &mut Self {
        self.initial_vertex_count = Some(value);
        self
    }

    pub fn ignition_size(&self) -> Option<f64> {
        self.ignition_size
    }

    pub fn set_ignition_size(&mut self, value: f64) -> &mut Self {
        self.ignition_size = Some(value);
        self
    }

    pub fn global_asset_operation(&self) -> Option<AssetOperation> {
        self.global_asset_operation
    }

    pub fn set_global_asset_operation(&mut self, value: AssetOperation) -> &mut Self {
        self.global_asset_operation = Some(value);
        self
    }

    pub fn asset_collision_count(&self) -> Option<i32> {
        self.asset_collision_count
    }

    pub fn set_asset_collision_count(&mut self, value: i32) -> &mut Self {
        self.asset_collision_count = Some(value);
        self
    }

    pub fn validate_for(&self, mode: OptionMode, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);

        if mode == OptionMode::Fresh {
            checks.require("maxAccTS", &self.max_acc_ts);
            checks.require("distRes", &self.dist_res);
            checks.require("perimRes", &self.perim_res);
            checks.require("stopAtGridEnd", &self.stop_at_grid_end);
            checks.require("breaching", &self.breaching);
            checks.require("dynamicSpatialThreshold", &self.dynamic_spatial_threshold);
            checks.require("spotting", &self.spotting);
            checks.require("purgeNonDisplayable", &self.purge_non_displayable);
        }

        if let Some(ts) = self.max_acc_ts {
            let secs = ts.to_seconds_approx();
            if !ts.is_valid() || secs <= 0.0 || secs > 300.0 {
                checks.fail(
                    "maxAccTS",
                    format!("{} must be greater than 0 and at most 5 minutes", ts),
                );
            }
        }
        checks.opt_range("distRes", self.dist_res, 0.2, 10.0);
        checks.opt_range("perimRes", self.perim_res, 0.2, 10.0);
        checks.opt_range("minimumSpreadingROS", self.minimum_spreading_ros, 0.0000001, 1.0);
        checks.opt_range("dx", self.dx, -250.0, 250.0);
        checks.opt_range("dy", self.dy, -250.0, 250.0);
        if self.dt.is_some_and(|dt| !dt.is_valid()) {
            checks.fail("dt", "is not a valid duration");
        }
        checks.opt_range("dwd", self.dwd, -360.0, 360.0);
        checks.opt_range("owd", self.owd, -360.0, 360.0);
        checks.opt_range("dvd", self.dvd, -360.0, 360.0);

        if let Some(p) = self.growth_percentile {
            if !(p > 0.0 && p < 100.0) {
                checks.fail("growthPercentile", format!("{} must be between 0 and 100", p));
            }
        } else if self.growth_percentile_applied == Some(true) {
            checks.fail("growthPercentile", "is required when the growth percentile is applied");
        }

        if let Some(v) = self.perimeter_spacing {
            checks.at_least("perimeterSpacing", v, 0.0);
        }
        if let Some(v) = self.initial_vertex_count {
            checks.int_range("initialVertexCount", v, 6, 64);
        }
        if let Some(v) = self.ignition_size {
            if !(v > 0.0 && v <= 25.0) {
                checks.fail("ignitionSize", format!("{} must be in (0, 25]", v));
            }
        }
        if let Some(v) = self.asset_collision_count {
            if v < -1 {
                checks.fail("assetCollisionCount", format!("{} is less than -1", v));
            }
        }
        checks.finish()
    }

    pub fn stream_for(&self, mode: OptionMode, sink: &mut dyn WireSink) {
        match mode {
            OptionMode::Fresh => {
                sink.write_message(
                    "maxaccts",
                    &self.max_acc_ts.unwrap_or_else(default_max_acc_ts).to_string(),
                );
                write_num(sink, "distres", self.dist_res.unwrap_or(1.0));
                write_num(sink, "perimres", self.perim_res.unwrap_or(1.0));
                opt_num(sink, "minspreadros", self.minimum_spreading_ros);
                write_bool(sink, "stopatgridend", self.stop_at_grid_end.unwrap_or(true));
                write_bool(sink, "breaching", self.breaching.unwrap_or(true));
                write_bool(
                    sink,
                    "dynamicspatialthreshold",
                    self.dynamic_spatial_threshold.unwrap_or(true),
                );
                write_bool(sink, "spotting", self.spotting.unwrap_or(true));
                write_bool(
                    sink,
                    "purgenondisplayable",
                    self.purge_non_displayable.unwrap_or(false),
                );
            },
            OptionMode::Copy => {
                opt_duration(sink, "maxaccts", self.max_acc_ts);
                opt_num(sink, "distres", self.dist_res);
                opt_num(sink, "perimres", self.perim_res);
                opt_num(sink, "minspreadros", self.minimum_spreading_ros);
                opt_bool(sink, "stopatgridend", self.stop_at_grid_end);
                opt_bool(sink, "breaching", self.breaching);
                opt_bool(sink, "dynamicspatialthreshold", self.dynamic_spatial_threshold);
                opt_bool(sink, "spotting", self.spotting);
                opt_bool(sink, "purgenondisplayable", self.purge_non_displayable);
            },
        }

        opt_num(sink, "dx", self.dx);
        opt_num(sink, "dy", self.dy);
        opt_duration(sink, "dt", self.dt);
        opt_num(sink, "dwd", self.dwd);
        opt_num(sink, "owd", self.owd);
        opt_num(sink, "dvd", self.dvd);
        opt_bool(sink, "growthpercentileapplied", self.growth_percentile_applied);
        opt_num(sink, "growthpercentile", self.growth_percentile);
        opt_bool(sink, "suppresstightconcave", self.suppress_tight_concave);
        opt_bool(sink, "nonfuelsasvectorbreaks", self.non_fuels_as_vector_breaks);
        opt_bool(sink, "nonfuelstovectorbreaks", self.non_fuels_to_vector_breaks);
        opt_bool(sink, "useindependenttimesteps", self.use_independent_timesteps);
        opt_num(sink, "perimeterspacing", self.perimeter_spacing);
        opt_int(sink, "initialvertexcount", self.initial_vertex_count);
        opt_num(sink, "ignitionsize", self.ignition_size);
        opt_int(
            sink,
            "globalassetoperation",
            self.global_asset_operation.map(AssetOperation::code),
        );
        opt_int(sink, "assetcollisioncount", self.asset_collision_count);
    }
}

impl Validate for FgmOptions {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        self.validate_for(OptionMode::Fresh, ctx)
    }
}

/// Fire behaviour prediction options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FbpOptions {
    pub terrain_effect: Option<bool>,
    pub wind_effect: Option<bool>,
}

impl FbpOptions {
    pub fn recommended() -> Self {
        Self {
            terrain_effect: Some(true),
            wind_effect: None,
        }
    }

    pub fn validate_for(&self, mode: OptionMode, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        if mode == OptionMode::Fresh {
            checks.require("terrainEffect", &self.terrain_effect);
        }
        checks.finish()
    }

    pub fn stream_for(&self, mode: OptionMode, sink: &mut dyn WireSink) {
        match mode {
            OptionMode::Fresh => {
                write_bool(sink, "terraineffect", self.terrain_effect.unwrap_or(true))
            },
            OptionMode::Copy => opt_bool(sink, "terraineffect", self.terrain_effect),
        }
        opt_bool(sink, "windeffect", self.wind_effect);
    }
}

/// Foliar moisture content options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FmcOptions {
    /// Percent override, [0, 300]
    pub per_override: Option<f64>,
    /// Elevation used where the grid has no data; `-1` uses the grid default
    pub nodata_elev: Option<f64>,
    pub terrain: Option<bool>,
    pub accurate_location: Option<bool>,
}

impl FmcOptions {
    pub fn recommended() -> Self {
        Self {
            nodata_elev: Some(-1.0),
            ..Self::default()
        }
    }

    pub fn validate_for(&self, mode: OptionMode, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        if mode == OptionMode::Fresh {
            checks.require("nodataElev", &self.nodata_elev);
        }
        checks.opt_range("perOverride", self.per_override, 0.0, 300.0);
        if let Some(v) = self.nodata_elev {
            if v != -1.0 {
                checks.range("nodataElev", v, 0.0, 7000.0);
            }
        }
        checks.finish()
    }

    pub fn stream_for(&self, mode: OptionMode, sink: &mut dyn WireSink) {
        match mode {
            OptionMode::Fresh => {
                write_num(sink, "peroverride", self.per_override.unwrap_or(-1.0));
                write_num(sink, "nodataelev", self.nodata_elev.unwrap_or(-1.0));
            },
            OptionMode::Copy => {
                opt_num(sink, "peroverride", self.per_override);
                opt_num(sink, "nodataelev", self.nodata_elev);
            },
        }
        opt_bool(sink, "terrain", self.terrain);
        opt_bool(sink, "accuratelocation", self.accurate_location);
    }
}

/// Fire weather index options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FwiOptions {
    pub fwi_spac_interp: Option<bool>,
    pub fwi_from_spac_weather: Option<bool>,
    pub history_on_effected_fwi: Option<bool>,
    pub fwi_temporal_interp: Option<bool>,
    pub burning_conditions_on: Option<bool>,
}

impl FwiOptions {
    pub fn recommended() -> Self {
        Self {
            fwi_spac_interp: Some(false),
            fwi_from_spac_weather: Some(false),
            history_on_effected_fwi: Some(false),
            fwi_temporal_interp: Some(false),
            burning_conditions_on: None,
        }
    }

    pub fn validate_for(&self, mode: OptionMode, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        if mode == OptionMode::Fresh {
            checks.require("fwiSpacInterp", &self.fwi_spac_interp);
            checks.require("fwiFromSpacWeather", &self.fwi_from_spac_weather);
            checks.require("historyOnEffectedFWI", &self.history_on_effected_fwi);
            checks.require("fwiTemporalInterp", &self.fwi_temporal_interp);
        }
        if self.fwi_spac_interp == Some(false) && self.fwi_from_spac_weather == Some(true) {
            checks.fail(
                "fwiFromSpacWeather",
                "cannot be used without spatial interpolation",
            );
        }
        checks.finish()
    }

    /// Same encoding in both modes
    pub fn stream(&self, sink: &mut dyn WireSink) {
        write_bool(sink, "fwispacinterp", self.fwi_spac_interp.unwrap_or(false));
        write_bool(
            sink,
            "fwifromspacweather",
            self.fwi_from_spac_weather.unwrap_or(false),
        );
        write_bool(sink, "historyonfwi", self.history_on_effected_fwi.unwrap_or(false));
        write_bool(sink, "fwitemporalinterp", self.fwi_temporal_interp.unwrap_or(false));
        opt_bool(sink, "burningconditionson", self.burning_conditions_on);
    }
}
