//! Everything a job reads: landscape, weather, ignitions and scenarios

pub mod features;
pub mod files;
pub mod fuel;
pub mod scenario;
pub mod weather;

use std::collections::HashSet;

use crate::timezone::Timezone;
use crate::validation::{
    validate_collection, validate_identified, Checks, Validate, ValidationContext, ValidationError,
};
use crate::wire::{Streamable, WireSink};

pub use features::{AssetFile, Ignition, TargetFile};
pub use files::{GridFile, InputFiles};
pub use fuel::{FromFuel, FuelBreak, FuelOption, FuelPatch, ToFuel};
pub use scenario::{
    AssetReference, BurningConditions, IgnitionReference, IgnitionSubOptions, LayerInfo,
    MultiPointIgnitionOptions, PolylineIgnitionOptions, Scenario, ScenarioMode,
    SinglePointIgnitionOptions, StationStream, TargetReference,
};
pub use weather::{
    DiurnalParameters, WeatherGrid, WeatherGridGridFile, WeatherPatch, WeatherPatchDetails,
    WeatherStation, WeatherStream,
};

/// Input half of a job
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs {
    pub timezone: Option<Timezone>,
    pub files: InputFiles,
    pub weather_stations: Vec<WeatherStation>,
    pub ignitions: Vec<Ignition>,
    pub scenarios: Vec<Scenario>,
    pub fuel_options: Vec<FuelOption>,
    pub asset_files: Vec<AssetFile>,
    pub target_files: Vec<TargetFile>,
}

impl Inputs {
    pub fn add_weather_station(&mut self, station: WeatherStation) -> &mut WeatherStation {
        self.weather_stations.push(station);
        let last = self.weather_stations.len() - 1;
        &mut self.weather_stations[last]
    }

    pub fn add_ignition(&mut self, ignition: Ignition) -> &mut Ignition {
        self.ignitions.push(ignition);
        let last = self.ignitions.len() - 1;
        &mut self.ignitions[last]
    }

    pub fn add_scenario(&mut self, scenario: Scenario) -> &mut Scenario {
        self.scenarios.push(scenario);
        let last = self.scenarios.len() - 1;
        &mut self.scenarios[last]
    }

    pub fn add_fuel_option(&mut self, option: FuelOption) -> &mut FuelOption {
        self.fuel_options.push(option);
        let last = self.fuel_options.len() - 1;
        &mut self.fuel_options[last]
    }

    pub fn add_asset_file(&mut self, asset: AssetFile) -> &mut AssetFile {
        self.asset_files.push(asset);
        let last = self.asset_files.len() - 1;
        &mut self.asset_files[last]
    }

    pub fn add_target_file(&mut self, target: TargetFile) -> &mut TargetFile {
        self.target_files.push(target);
        let last = self.target_files.len() - 1;
        &mut self.target_files[last]
    }

    pub fn scenario_by_id(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id().eq_ignore_ascii_case(id))
    }

    /// One subtree per concern, in job report order
    pub(crate) fn concerns(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        match &self.timezone {
            Some(tz) => checks.nested("timezone", tz.validate(ctx)),
            None => checks.fail("timezone", "is required"),
        }
        checks.nested("files", self.files.validate(ctx));

        if self.weather_stations.is_empty() {
            checks.fail("weatherStations", "at least one weather station is required");
        }
        checks.extend(validate_identified("weatherStations", &self.weather_stations, ctx));
        if self.ignitions.is_empty() {
            checks.fail("ignitions", "at least one ignition is required");
        }
        checks.extend(validate_identified("ignitions", &self.ignitions, ctx));
        checks.extend(validate_identified("assetFiles", &self.asset_files, ctx));
        checks.extend(validate_identified("targetFiles", &self.target_files, ctx));
        checks.extend(validate_collection(
            "fuelOptions",
            &self.fuel_options,
            ctx,
            "fuelType",
            |o| Some(format!("{}/{}", o.fuel_type, o.option_type.code())),
            &mut HashSet::new(),
        ));
        if self.scenarios.is_empty() {
            checks.fail("scenarios", "at least one scenario is required");
        }
        checks.extend(validate_identified("scenarios", &self.scenarios, ctx));
        checks.finish()
    }
}

impl Validate for Inputs {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        self.concerns(ctx)
    }
}

impl Streamable for Inputs {
    fn stream(&self, sink: &mut dyn WireSink) {
        if let Some(tz) = &self.timezone {
            tz.stream(sink);
        }
        self.files.stream(sink);
        for station in &self.weather_stations {
            station.stream(sink);
        }
        for ignition in &self.ignitions {
            ignition.stream(sink);
        }
        for asset in &self.asset_files {
            asset.stream(sink);
        }
        for target in &self.target_files {
            target.stream(sink);
        }
        for option in &self.fuel_options {
            option.stream(sink);
        }
        for scenario in &self.scenarios {
            scenario.stream(sink);
        }
    }
}
