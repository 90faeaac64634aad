//! Decoding of the builder's recommended option values
//!
//! The builder answers a defaults request with alternating key and value
//! lines using the same keys a scenario streams. Values are stored as sent;
//! range checks and setter couplings do not apply here.

use tracing::warn;

use crate::duration::Duration;
use crate::error::{ModelError, Result};
use crate::inputs::Scenario;
use crate::options::{FbpOptions, FgmOptions, FmcOptions, FwiOptions};
use crate::units::AssetOperation;

/// Option values recommended by the builder
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobDefaults {
    pub fgm: FgmOptions,
    pub fbp: FbpOptions,
    pub fmc: FmcOptions,
    pub fwi: FwiOptions,
    /// Keys with no known setter, in the order received
    pub unknown: Vec<(String, String)>,
}

type Setter = fn(&mut JobDefaults, &str) -> Result<()>;

fn boolean(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(ModelError::value(key, value)),
    }
}

fn number(key: &str, value: &str) -> Result<f64> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|_| ModelError::value(key, value))
}

fn integer(key: &str, value: &str) -> Result<i32> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| ModelError::value(key, value))
}

fn duration(key: &str, value: &str) -> Result<Duration> {
    value
        .parse::<Duration>()
        .map_err(|_| ModelError::value(key, value))
}

static SETTERS: &[(&str, Setter)] = &[
    ("maxaccts", |d, v| {
        d.fgm.max_acc_ts = Some(duration("maxaccts", v)?);
        Ok(())
    }),
    ("distres", |d, v| {
        d.fgm.dist_res = Some(number("distres", v)?);
        Ok(())
    }),
    ("perimres", |d, v| {
        d.fgm.perim_res = Some(number("perimres", v)?);
        Ok(())
    }),
    ("minspreadros", |d, v| {
        d.fgm.minimum_spreading_ros = Some(number("minspreadros", v)?);
        Ok(())
    }),
    ("stopatgridend", |d, v| {
        d.fgm.stop_at_grid_end = Some(boolean("stopatgridend", v)?);
        Ok(())
    }),
    ("breaching", |d, v| {
        d.fgm.breaching = Some(boolean("breaching", v)?);
        Ok(())
    }),
    ("dynamicspatialthreshold", |d, v| {
        d.fgm.dynamic_spatial_threshold = Some(boolean("dynamicspatialthreshold", v)?);
        Ok(())
    }),
    ("spotting", |d, v| {
        d.fgm.spotting = Some(boolean("spotting", v)?);
        Ok(())
    }),
    ("purgenondisplayable", |d, v| {
        d.fgm.purge_non_displayable = Some(boolean("purgenondisplayable", v)?);
        Ok(())
    }),
    ("dx", |d, v| {
        d.fgm.dx = Some(number("dx", v)?);
        Ok(())
    }),
    ("dy", |d, v| {
        d.fgm.dy = Some(number("dy", v)?);
        Ok(())
    }),
    ("dt", |d, v| {
        d.fgm.dt = Some(duration("dt", v)?);
        Ok(())
    }),
    ("dwd", |d, v| {
        d.fgm.dwd = Some(number("dwd", v)?);
        Ok(())
    }),
    ("owd", |d, v| {
        d.fgm.owd = Some(number("owd", v)?);
        Ok(())
    }),
    ("dvd", |d, v| {
        d.fgm.dvd = Some(number("dvd", v)?);
        Ok(())
    }),
    ("growthpercentileapplied", |d, v| {
        d.fgm.growth_percentile_applied = Some(boolean("growthpercentileapplied", v)?);
        Ok(())
    }),
    ("growthpercentile", |d, v| {
        d.fgm.growth_percentile = Some(number("growthpercentile", v)?);
        Ok(())
    }),
    ("suppresstightconcave", |d, v| {
        d.fgm.suppress_tight_concave = Some(boolean("suppresstightconcave", v)?);
        Ok(())
    }),
    ("nonfuelsasvectorbreaks", |d, v| {
        d.fgm.non_fuels_as_vector_breaks = Some(boolean("nonfuelsasvectorbreaks", v)?);
        Ok(())
    }),
    ("nonfuelstovectorbreaks", |d, v| {
        d.fgm.non_fuels_to_vector_breaks = Some(boolean("nonfuelstovectorbreaks", v)?);
        Ok(())
    }),
    ("useindependenttimesteps", |d, v| {
        d.fgm.use_independent_timesteps = Some(boolean("useindependenttimesteps", v)?);
        Ok(())
    }),
    ("perimeterspacing", |d, v| {
        d.fgm.perimeter_spacing = Some(number("perimeterspacing", v)?);
        Ok(())
    }),
    ("initialvertexcount", |d, v| {
        d.fgm.initial_vertex_count = Some(integer("initialvertexcount", v)?);
        Ok(())
    }),
    ("ignitionsize", |d, v| {
        d.fgm.ignition_size = Some(number("ignitionsize", v)?);
        Ok(())
    }),
    ("globalassetoperation", |d, v| {
        let code = integer("globalassetoperation", v)?;
        d.fgm.global_asset_operation = Some(AssetOperation::try_from_code(code)?);
        Ok(())
    }),
    ("assetcollisioncount", |d, v| {
        d.fgm.asset_collision_count = Some(integer("assetcollisioncount", v)?);
        Ok(())
    }),
    ("terraineffect", |d, v| {
        d.fbp.terrain_effect = Some(boolean("terraineffect", v)?);
        Ok(())
    }),
    ("windeffect", |d, v| {
        d.fbp.wind_effect = Some(boolean("windeffect", v)?);
        Ok(())
    }),
    ("peroverride", |d, v| {
        d.fmc.per_override = Some(number("peroverride", v)?);
        Ok(())
    }),
    ("nodataelev", |d, v| {
        d.fmc.nodata_elev = Some(number("nodataelev", v)?);
        Ok(())
    }),
    ("terrain", |d, v| {
        d.fmc.terrain = Some(boolean("terrain", v)?);
        Ok(())
    }),
    ("accuratelocation", |d, v| {
        d.fmc.accurate_location = Some(boolean("accuratelocation", v)?);
        Ok(())
    }),
    ("fwispacinterp", |d, v| {
        d.fwi.fwi_spac_interp = Some(boolean("fwispacinterp", v)?);
        Ok(())
    }),
    ("fwifromspacweather", |d, v| {
        d.fwi.fwi_from_spac_weather = Some(boolean("fwifromspacweather", v)?);
        Ok(())
    }),
    ("historyonfwi", |d, v| {
        d.fwi.history_on_effected_fwi = Some(boolean("historyonfwi", v)?);
        Ok(())
    }),
    ("fwitemporalinterp", |d, v| {
        d.fwi.fwi_temporal_interp = Some(boolean("fwitemporalinterp", v)?);
        Ok(())
    }),
    ("burningconditionson", |d, v| {
        d.fwi.burning_conditions_on = Some(boolean("burningconditionson", v)?);
        Ok(())
    }),
];

impl JobDefaults {
    /// Keys with a typed setter
    pub fn known_keys() -> impl Iterator<Item = &'static str> {
        SETTERS.iter().map(|(key, _)| *key)
    }

    /// Apply one key/value pair
    ///
    /// Returns `Ok(false)` for keys without a setter; those are kept in
    /// [`JobDefaults::unknown`].
    pub fn set(&mut self, key: &str, value: &str) -> Result<bool> {
        let key_lower = key.trim().to_ascii_lowercase();
        match SETTERS.iter().find(|(k, _)| *k == key_lower) {
            Some((_, setter)) => {
                setter(self, value)?;
                Ok(true)
            },
            None => {
                self.unknown.push((key.to_string(), value.to_string()));
                Ok(false)
            },
        }
    }

    /// Decode alternating key and value lines
    ///
    /// Unparseable values are skipped with a warning.
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut defaults = Self::default();
        let mut lines = lines.into_iter();
        while let Some(key) = lines.next() {
            let key = key.as_ref();
            if key.trim().is_empty() {
                continue;
            }
            let Some(value) = lines.next() else {
                warn!("Defaults key '{}' has no value", key);
                break;
            };
            if let Err(e) = defaults.set(key, value.as_ref()) {
                warn!("Skipping default: {}", e);
            }
        }
        defaults
    }

    /// Replace a scenario's option bundles with these values
    pub fn apply_to(&self, scenario: &mut Scenario) {
        scenario.fgm_options = self.fgm.clone();
        scenario.fbp_options = self.fbp.clone();
        scenario.fmc_options = self.fmc.clone();
        scenario.fwi_options = self.fwi.clone();
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_decode_known_keys() {
        let defaults = JobDefaults::from_lines([
            "maxaccts", "PT2M",
            "distres", "1.5",
            "spotting", "false",
            "globalassetoperation", "2",
            "peroverride", "-1",
            "historyonfwi", "true",
        ]);
        assert_eq!(defaults.fgm.max_acc_ts(), Some(Duration::from_minutes(2)));
        assert_eq!(defaults.fgm.dist_res(), Some(1.5));
        assert_eq!(defaults.fgm.spotting(), Some(false));
        assert_eq!(
            defaults.fgm.global_asset_operation(),
            Some(AssetOperation::StopAfterX)
        );
        assert_eq!(defaults.fmc.per_override, Some(-1.0));
        assert_eq!(defaults.fwi.history_on_effected_fwi, Some(true));
        assert!(defaults.unknown.is_empty());
    }

    #[test]
    fn test_coupling_does_not_fire() {
        // distres arrives before maxaccts; the setter would clear it
        let defaults = JobDefaults::from_lines(["distres", "2", "maxaccts", "PT1M"]);
        assert_eq!(defaults.fgm.dist_res(), Some(2.0));
    }

    #[test]
    #[traced_test]
    fn test_bad_values_are_skipped() {
        let defaults = JobDefaults::from_lines(["distres", "fine", "perimres", "3", "dangling"]);
        assert_eq!(defaults.fgm.dist_res(), None);
        assert_eq!(defaults.fgm.perim_res(), Some(3.0));
        assert!(logs_contain("Skipping default"));
        assert!(logs_contain("has no value"));
    }

    #[test]
    fn test_unknown_keys_kept() {
        let defaults = JobDefaults::from_lines(["newoption", "42", "Spotting", "true"]);
        assert_eq!(defaults.unknown, vec![("newoption".to_string(), "42".to_string())]);
        assert_eq!(defaults.fgm.spotting(), Some(true));
    }

    #[test]
    fn test_apply_to_scenario() {
        let defaults = JobDefaults::from_lines(["perimres", "0.5", "terraineffect", "false"]);
        let mut scenario = Scenario::new("2024-06-01T13:00:00", "2024-06-02T13:00:00");
        defaults.apply_to(&mut scenario);
        assert_eq!(scenario.fgm_options.perim_res(), Some(0.5));
        assert_eq!(scenario.fbp_options.terrain_effect, Some(false));
    }

    #[test]
    fn test_known_keys_cover_scenario_options() {
        let keys: Vec<_> = JobDefaults::known_keys().collect();
        assert_eq!(keys.len(), 37);
        assert!(keys.contains(&"burningconditionson"));
    }
}
