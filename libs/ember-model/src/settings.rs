//! Job-wide settings: timestep statistics, export units and job options

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::units::{
    AngleUnit, AreaUnit, CoordinateUnit, DistanceUnit, EnergyUnit, GlobalStatistic, IntensityUnit,
    LoadBalancing, MassUnit, TemperatureUnit, VelocityUnit, VolumeUnit,
};
use crate::validation::{Checks, Validate, ValidationContext, ValidationError};
use crate::wire::{Record, Streamable, WireSink};

/// Statistics the builder reports after each timestep
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimestepSettings {
    pub statistics: Vec<GlobalStatistic>,
    pub discretize: Option<i32>,
}

impl TimestepSettings {
    pub fn add_statistic(&mut self, statistic: GlobalStatistic) -> &mut Self {
        self.statistics.push(statistic);
        self
    }
}

impl Validate for TimestepSettings {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        let mut seen = HashSet::new();
        if let Some(dup) = self.statistics.iter().find(|s| !seen.insert(**s)) {
            checks.fail("statistics", format!("{:?} is listed more than once", dup));
        }
        if let Some(d) = self.discretize {
            checks.int_range("discretize", d, 1, 1000);
        }
        checks.finish()
    }
}

impl Streamable for TimestepSettings {
    fn stream(&self, sink: &mut dyn WireSink) {
        if self.statistics.is_empty() {
            return;
        }
        let value = Record::new()
            .opt_int(self.discretize)
            .list(&self.statistics, |r, s| r.code(s.code()))
            .build();
        sink.write_message("timestepsettings", &value);
    }
}

/// Units used in exported files; unset units use the builder default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitSettings {
    pub small_measure: Option<DistanceUnit>,
    pub small_distance: Option<DistanceUnit>,
    pub distance: Option<DistanceUnit>,
    pub alt_distance: Option<DistanceUnit>,
    pub coordinates: Option<CoordinateUnit>,
    pub area: Option<AreaUnit>,
    pub volume: Option<VolumeUnit>,
    pub temperature: Option<TemperatureUnit>,
    pub mass: Option<MassUnit>,
    pub energy: Option<EnergyUnit>,
    pub angle: Option<AngleUnit>,
    pub velocity: Option<VelocityUnit>,
    pub alt_velocity: Option<VelocityUnit>,
    pub intensity: Option<IntensityUnit>,
}

impl UnitSettings {
    fn codes(&self) -> [Option<i32>; 14] {
        [
            self.small_measure.map(DistanceUnit::code),
            self.small_distance.map(DistanceUnit::code),
            self.distance.map(DistanceUnit::code),
            self.alt_distance.map(DistanceUnit::code),
            self.coordinates.map(CoordinateUnit::code),
            self.area.map(AreaUnit::code),
            self.volume.map(VolumeUnit::code),
            self.temperature.map(TemperatureUnit::code),
            self.mass.map(MassUnit::code),
            self.energy.map(EnergyUnit::code),
            self.angle.map(AngleUnit::code),
            self.velocity.map(VelocityUnit::code),
            self.alt_velocity.map(VelocityUnit::code),
            self.intensity.map(IntensityUnit::code),
        ]
    }
}

impl Validate for UnitSettings {
    fn validate(&self, _ctx: &ValidationContext) -> Vec<ValidationError> {
        Vec::new()
    }
}

impl Streamable for UnitSettings {
    fn stream(&self, sink: &mut dyn WireSink) {
        let codes = self.codes();
        if codes.iter().all(Option::is_none) {
            return;
        }
        let value = codes
            .iter()
            .fold(Record::new(), |r, c| r.opt_code(*c))
            .build();
        sink.write_message("exportunits", &value);
    }
}

/// Scheduling options for the job as a whole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobOptions {
    pub priority: i32,
    /// Ask the builder to validate without running
    pub validate: bool,
    pub load_balancing: LoadBalancing,
    pub emit_statistics: bool,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            priority: 0,
            validate: false,
            load_balancing: LoadBalancing::None,
            emit_statistics: false,
        }
    }
}

impl Validate for JobOptions {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        checks.int_range("priority", self.priority, 0, 65535);
        checks.finish()
    }
}

impl Streamable for JobOptions {
    fn stream(&self, sink: &mut dyn WireSink) {
        let value = Record::new()
            .int(i64::from(self.priority))
            .bool(self.validate)
            .code(self.load_balancing.code())
            .bool(self.emit_statistics)
            .build();
        sink.write_message("joboptions", &value);
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    fn encode(item: &dyn Streamable) -> String {
        let mut out = Vec::new();
        item.stream(&mut out);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_timestep_settings_omitted_when_empty() {
        let mut settings = TimestepSettings::default();
        assert_eq!(encode(&settings), "");
        settings
            .add_statistic(GlobalStatistic::DateTime)
            .add_statistic(GlobalStatistic::TotalArea);
        assert_eq!(encode(&settings), "timestepsettings\n-1|2|0|20\n");
        settings.add_statistic(GlobalStatistic::DateTime);
        assert_eq!(settings.check_valid()[0].field_name(), Some("statistics"));
    }

    #[test]
    fn test_export_units() {
        let mut units = UnitSettings::default();
        assert_eq!(encode(&units), "");
        units.area = Some(AreaUnit::Hectare);
        units.intensity = Some(IntensityUnit::KilowattPerMetre);
        assert_eq!(
            encode(&units),
            "exportunits\n-1|-1|-1|-1|-1|1|-1|-1|-1|-1|-1|-1|-1|0\n"
        );
    }

    #[test]
    fn test_job_options() {
        let mut options = JobOptions::default();
        assert_eq!(encode(&options), "joboptions\n0|false|0|false\n");
        options.priority = 70000;
        assert!(!options.is_valid());
    }
}
