//! Unit and option enumerations
//!
//! Every enumeration travels on the wire as a fixed integer code.

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident = $code:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every variant in code order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Integer code used on the wire
            pub fn code(self) -> i32 {
                match self {
                    $($name::$variant => $code),+
                }
            }

            pub fn from_code(code: i32) -> Option<Self> {
                match code {
                    $($code => Some($name::$variant),)+
                    _ => None,
                }
            }

            pub fn try_from_code(code: i32) -> Result<Self, ModelError> {
                Self::from_code(code).ok_or(ModelError::UnknownCode {
                    kind: stringify!($name),
                    code,
                })
            }
        }
    };
}

wire_enum!(DistanceUnit {
    Millimetre = 0,
    Centimetre = 1,
    Metre = 2,
    Kilometre = 3,
    Inch = 4,
    Foot = 5,
    Yard = 6,
    Chain = 7,
    Mile = 8,
});

wire_enum!(AreaUnit {
    SquareMetre = 0,
    Hectare = 1,
    SquareKilometre = 2,
    SquareFoot = 3,
    Acre = 4,
    SquareMile = 5,
});

wire_enum!(VolumeUnit {
    CubicMetre = 0,
    Litre = 1,
    CubicFoot = 2,
    Gallon = 3,
});

wire_enum!(TemperatureUnit {
    Celsius = 0,
    Fahrenheit = 1,
    Kelvin = 2,
});

wire_enum!(MassUnit {
    Gram = 0,
    Kilogram = 1,
    Tonne = 2,
    Pound = 3,
    Ton = 4,
});

wire_enum!(EnergyUnit {
    Joule = 0,
    Kilojoule = 1,
    Megajoule = 2,
    Kilocalorie = 3,
    Btu = 4,
});

wire_enum!(AngleUnit {
    Degree = 0,
    Radian = 1,
    CompassDegree = 2,
});

wire_enum!(VelocityUnit {
    MetresPerSecond = 0,
    KilometresPerHour = 1,
    MilesPerHour = 2,
    MetresPerMinute = 3,
    FeetPerMinute = 4,
    ChainsPerHour = 5,
});

wire_enum!(CoordinateUnit {
    DecimalDegree = 0,
    DegreeMinute = 1,
    DegreeMinuteSecond = 2,
    Utm = 3,
});

wire_enum!(IntensityUnit {
    KilowattPerMetre = 0,
    BtuPerFootSecond = 1,
});

wire_enum!(
    /// Hourly FFMC calculation method
    HffmcMethod {
        VanWagner = 0,
        Lawson = 1,
    }
);

wire_enum!(
    /// Kind of data held by an input grid file
    GridFileType {
        FuelGrid = 0,
        DegreeCuring = 1,
        GreenUp = 2,
        PercentConifer = 3,
        PercentDeadFir = 4,
        CrownBaseHeight = 5,
        TreeHeight = 6,
        FuelLoad = 7,
        FbpVector = 8,
    }
);

wire_enum!(
    /// Fuel selection rule for a fuel patch
    FromFuelRule {
        NoData = 0,
        All = 1,
        AllCombustible = 2,
    }
);

wire_enum!(WeatherQuantity {
    Temperature = 0,
    RelativeHumidity = 1,
    Precipitation = 2,
    WindSpeed = 3,
    WindDirection = 4,
});

wire_enum!(WeatherPatchOperation {
    Equal = 0,
    Plus = 1,
    Minus = 2,
    Multiply = 3,
    Divide = 4,
});

wire_enum!(WeatherGridType {
    Direction = 0,
    Speed = 1,
});

wire_enum!(WeatherGridSector {
    North = 0,
    Northeast = 1,
    East = 2,
    Southeast = 3,
    South = 4,
    Southwest = 5,
    West = 6,
    Northwest = 7,
    Default = 8,
});

wire_enum!(FuelOptionType {
    GrassFuelLoad = 0,
    GrassCuring = 1,
    PercentConifer = 2,
    PercentDeadFir = 3,
    CrownBaseHeight = 4,
});

wire_enum!(
    /// What the simulation does when a fire reaches an asset
    AssetOperation {
        StopImmediately = 0,
        StopAfterAll = 1,
        StopAfterX = 2,
        NoEffect = 3,
    }
);

wire_enum!(
    /// Statistics available for timestep summaries and stats files
    GlobalStatistic {
        DateTime = 0,
        ElapsedTime = 1,
        TimestepDuration = 2,
        Temperature = 3,
        DewPoint = 4,
        RelativeHumidity = 5,
        WindSpeed = 6,
        WindDirection = 7,
        Precipitation = 8,
        Hffmc = 9,
        Hisi = 10,
        Dmc = 11,
        Dc = 12,
        Hfwi = 13,
        Bui = 14,
        Ffmc = 15,
        Isi = 16,
        Fwi = 17,
        TimestepArea = 18,
        TimestepBurningArea = 19,
        TotalArea = 20,
        BurningArea = 21,
        AreaGrowthRate = 22,
        ExteriorPerimeter = 23,
        ActivePerimeter = 24,
        TotalPerimeter = 25,
        NumVertices = 26,
        NumActiveVertices = 27,
        NumFronts = 28,
        MaxRos = 29,
        MaxFi = 30,
        MaxFl = 31,
        MaxCfb = 32,
        MaxSfc = 33,
        MaxTfc = 34,
        SimulationTime = 35,
    }
);

wire_enum!(
    /// Statistic exported by an output grid
    GridStatistic {
        Temperature = 0,
        DewPoint = 1,
        RelativeHumidity = 2,
        WindDirection = 3,
        WindSpeed = 4,
        Precipitation = 5,
        Ffmc = 6,
        Isi = 7,
        Fwi = 8,
        Bui = 9,
        MaxFi = 10,
        MaxFl = 11,
        MaxRos = 12,
        MaxSfc = 13,
        MaxCfc = 14,
        MaxTfc = 15,
        MaxCfb = 16,
        BurnGrid = 17,
        FireArrivalTime = 18,
        HrosMax = 19,
        FrosMax = 20,
        BrosMax = 21,
        RazMap = 22,
        TotalFuelConsumed = 23,
        CriticalPathMeanRos = 24,
    }
);

wire_enum!(InterpolationMethod {
    Closest = 0,
    Idw = 1,
    AreaWeighting = 2,
    Calculate = 3,
    Discretized = 4,
});

wire_enum!(Compression {
    None = 0,
    Jpeg = 1,
    Lzw = 2,
    Packbits = 3,
    Deflate = 4,
});

wire_enum!(StatsFileType {
    Csv = 0,
    Json = 1,
    Xml = 2,
});

wire_enum!(
    /// How the builder distributes sub-scenarios between workers
    LoadBalancing {
        None = 0,
        ExternalCounter = 1,
        LocalFile = 2,
    }
);

impl Default for Compression {
    fn default() -> Self {
        Compression::None
    }
}

impl Default for LoadBalancing {
    fn default() -> Self {
        LoadBalancing::None
    }
}

impl StatsFileType {
    /// File extension, including the dot
    pub fn extension(self) -> &'static str {
        match self {
            StatsFileType::Csv => ".csv",
            StatsFileType::Json => ".json",
            StatsFileType::Xml => ".xml",
        }
    }

    /// Guess the file type from a filename
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|t| lower.ends_with(t.extension()))
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(DistanceUnit::Mile.code(), 8);
        assert_eq!(GlobalStatistic::SimulationTime.code(), 35);
        assert_eq!(GridStatistic::CriticalPathMeanRos.code(), 24);
        assert_eq!(WeatherGridSector::from_code(8), Some(WeatherGridSector::Default));
        assert_eq!(Compression::from_code(5), None);
    }

    #[test]
    fn test_codes_match_position() {
        for (i, stat) in GlobalStatistic::ALL.iter().enumerate() {
            assert_eq!(stat.code() as usize, i);
        }
    }

    #[test]
    fn test_unknown_code() {
        let err = AssetOperation::try_from_code(9).unwrap_err();
        assert_eq!(
            err,
            ModelError::UnknownCode {
                kind: "AssetOperation",
                code: 9
            }
        );
    }

    #[test]
    fn test_stats_extension() {
        assert_eq!(StatsFileType::from_filename("out/stats.JSON"), Some(StatsFileType::Json));
        assert_eq!(StatsFileType::from_filename("stats.txt"), None);
    }
}
