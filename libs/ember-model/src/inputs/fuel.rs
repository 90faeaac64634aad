//! Fuel breaks, fuel patches and fuel options

use crate::ident::{identified, next_id, IdKind};
use crate::shape::{FuelBreakShape, PatchShape};
use crate::units::{FromFuelRule, FuelOptionType};
use crate::validation::{Checks, Validate, ValidationContext, ValidationError};
use crate::wire::{Record, Streamable, WireSink};

/// Barrier the fire cannot cross
#[derive(Debug, Clone, PartialEq)]
pub struct FuelBreak {
    id: String,
    pub shape: FuelBreakShape,
    pub comments: String,
}

identified!(FuelBreak);

impl FuelBreak {
    pub fn new(shape: FuelBreakShape) -> Self {
        Self {
            id: next_id(IdKind::FuelBreak),
            shape,
            comments: String::new(),
        }
    }
}

impl Validate for FuelBreak {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        self.shape.check(&mut checks);
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        Some(format!("FuelBreak({})", self.id))
    }
}

impl Streamable for FuelBreak {
    fn stream(&self, sink: &mut dyn WireSink) {
        let record = Record::new()
            .raw(self.id.as_str())
            .opt_num(self.shape.width())
            .text(&self.comments);
        sink.write_message("fuelbreak", &self.shape.append(record).build());
    }
}

/// Fuel type a patch replaces
#[derive(Debug, Clone, PartialEq)]
pub enum FromFuel {
    Rule(FromFuelRule),
    Name(String),
    Index(i32),
}

/// Fuel type a patch applies
#[derive(Debug, Clone, PartialEq)]
pub enum ToFuel {
    Name(String),
    Index(i32),
}

/// Area where one fuel type is replaced with another
#[derive(Debug, Clone, PartialEq)]
pub struct FuelPatch {
    id: String,
    pub from_fuel: Option<FromFuel>,
    pub to_fuel: Option<ToFuel>,
    pub shape: PatchShape,
    pub comments: String,
}

identified!(FuelPatch);

impl FuelPatch {
    pub fn new(shape: PatchShape) -> Self {
        Self {
            id: next_id(IdKind::FuelPatch),
            from_fuel: None,
            to_fuel: None,
            shape,
            comments: String::new(),
        }
    }
}

impl Validate for FuelPatch {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        match &self.from_fuel {
            None => checks.fail("fromFuel", "is required"),
            Some(FromFuel::Name(name)) if name.trim().is_empty() => {
                checks.fail("fromFuel", "fuel name must not be empty")
            },
            Some(FromFuel::Index(i)) if *i < 0 => {
                checks.fail("fromFuel", "fuel index must not be negative")
            },
            Some(_) => {},
        }
        match &self.to_fuel {
            None => checks.fail("toFuel", "is required"),
            Some(ToFuel::Name(name)) if name.trim().is_empty() => {
                checks.fail("toFuel", "fuel name must not be empty")
            },
            Some(ToFuel::Index(i)) if *i < 0 => {
                checks.fail("toFuel", "fuel index must not be negative")
            },
            Some(_) => {},
        }
        self.shape.check(&mut checks);
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        Some(format!("FuelPatch({})", self.id))
    }
}

impl Streamable for FuelPatch {
    fn stream(&self, sink: &mut dyn WireSink) {
        let (rule, from_name, from_index) = match &self.from_fuel {
            Some(FromFuel::Rule(rule)) => (Some(rule.code()), None, None),
            Some(FromFuel::Name(name)) => (None, Some(name.as_str()), None),
            Some(FromFuel::Index(i)) => (None, None, Some(*i)),
            None => (None, None, None),
        };
        let (to_name, to_index) = match &self.to_fuel {
            Some(ToFuel::Name(name)) => (Some(name.as_str()), None),
            Some(ToFuel::Index(i)) => (None, Some(*i)),
            None => (None, None),
        };
        let record = Record::new()
            .raw(self.id.as_str())
            .opt_code(rule)
            .opt_str(from_name)
            .opt_int(from_index)
            .opt_str(to_name)
            .opt_int(to_index)
            .text(&self.comments);
        sink.write_message("fuelpatch", &self.shape.append(record).build());
    }
}

/// Landscape-wide override of a fuel type parameter
#[derive(Debug, Clone, PartialEq)]
pub struct FuelOption {
    pub fuel_type: String,
    pub option_type: FuelOptionType,
    pub value: f64,
}

impl FuelOption {
    pub fn new(fuel_type: &str, option_type: FuelOptionType, value: f64) -> Self {
        Self {
            fuel_type: fuel_type.to_string(),
            option_type,
            value,
        }
    }
}

impl Validate for FuelOption {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        checks.require_text("fuelType", Some(&self.fuel_type));
        let max = match self.option_type {
            FuelOptionType::GrassFuelLoad => 5.0,
            FuelOptionType::CrownBaseHeight => 25.0,
            FuelOptionType::GrassCuring
            | FuelOptionType::PercentConifer
            | FuelOptionType::PercentDeadFir => 100.0,
        };
        checks.range("value", self.value, 0.0, max);
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        Some(format!("FuelOption({})", self.fuel_type))
    }
}

impl Streamable for FuelOption {
    fn stream(&self, sink: &mut dyn WireSink) {
        let value = Record::new()
            .raw(self.fuel_type.as_str())
            .code(self.option_type.code())
            .num(self.value)
            .build();
        sink.write_message("fueloption", &value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LatLon;

    fn stream_one(item: &dyn Streamable) -> String {
        let mut out = Vec::new();
        item.stream(&mut out);
        String::from_utf8_lossy(&out).into_owned()
    }

    #[test]
    fn test_fuel_break_width_sentinel() {
        let mut polygon = FuelBreak::new(FuelBreakShape::Polygon(vec![
            LatLon::new(1.0, 1.0),
            LatLon::new(1.0, 2.0),
            LatLon::new(2.0, 2.0),
        ]));
        polygon.set_id("fb");
        assert_eq!(stream_one(&polygon), "fuelbreak\nfb|-1||1|3|1|1|1|2|2|2\n");

        let mut line = FuelBreak::new(FuelBreakShape::Polyline {
            points: vec![LatLon::new(1.0, 1.0), LatLon::new(1.0, 2.0)],
            width: Some(12.5),
        });
        line.set_id("fb2");
        line.comments = "road".into();
        assert_eq!(stream_one(&line), "fuelbreak\nfb2|12.5|road|2|2|1|1|1|2\n");
    }

    #[test]
    fn test_fuel_patch_record() {
        let mut patch = FuelPatch::new(PatchShape::Landscape);
        patch.set_id("fp");
        patch.from_fuel = Some(FromFuel::Rule(FromFuelRule::AllCombustible));
        patch.to_fuel = Some(ToFuel::Name("C-2".into()));
        assert_eq!(stream_one(&patch), "fuelpatch\nfp|2|null|-1|C-2|-1||4\n");
    }

    #[test]
    fn test_fuel_patch_requires_fuels() {
        let mut patch = FuelPatch::new(PatchShape::Landscape);
        patch.from_fuel = Some(FromFuel::Index(-2));
        let fields: Vec<_> = patch
            .check_valid()
            .iter()
            .filter_map(|e| e.field_name().map(str::to_string))
            .collect();
        assert_eq!(fields, vec!["fromFuel", "toFuel"]);
    }

    #[test]
    fn test_fuel_option_ranges() {
        assert!(FuelOption::new("O-1a", FuelOptionType::GrassCuring, 60.0).is_valid());
        assert!(!FuelOption::new("O-1a", FuelOptionType::GrassFuelLoad, 6.0).is_valid());
        assert!(!FuelOption::new("", FuelOptionType::PercentConifer, 50.0).is_valid());
        assert_eq!(
            stream_one(&FuelOption::new("M-1", FuelOptionType::PercentConifer, 50.0)),
            "fueloption\nM-1|2|50\n"
        );
    }
}
