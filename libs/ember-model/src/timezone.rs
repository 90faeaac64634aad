//! Job timezone

use crate::duration::Duration;
use crate::validation::{Checks, Validate, ValidationContext, ValidationError};
use crate::wire::{Record, Streamable, WireSink};

const MAX_OFFSET_SECONDS: f64 = 14.0 * 3600.0;

/// Timezone used to interpret local times in the job
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Timezone {
    /// Index into the builder's timezone list
    Named(i32),
    /// Explicit UTC offset
    Offset { offset: Duration, dst: bool },
}

impl Timezone {
    pub fn offset_hours(hours: i32, dst: bool) -> Self {
        Timezone::Offset {
            offset: Duration::from_hours(hours),
            dst,
        }
    }
}

impl Validate for Timezone {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        match self {
            Timezone::Named(value) => {
                if *value < 0 {
                    checks.fail("value", "timezone index must not be negative");
                }
            },
            Timezone::Offset { offset, .. } => {
                if !offset.is_valid() {
                    checks.fail("offset", "offset is not a valid duration");
                } else if offset.to_seconds_approx().abs() > MAX_OFFSET_SECONDS {
                    checks.fail("offset", format!("offset {} is more than 14 hours", offset));
                }
            },
        }
        checks.finish()
    }
}

impl Streamable for Timezone {
    fn stream(&self, sink: &mut dyn WireSink) {
        match self {
            Timezone::Named(value) => sink.write_message("timezone_id", &value.to_string()),
            Timezone::Offset { offset, dst } => sink.write_message(
                "timezone",
                &Record::new().raw(offset.to_string()).bool(*dst).build(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_limits() {
        assert!(Timezone::offset_hours(-6, true).is_valid());
        assert!(Timezone::offset_hours(14, false).is_valid());
        assert!(!Timezone::offset_hours(15, false).is_valid());
        assert!(!Timezone::offset_hours(-15, false).is_valid());
        assert!(!Timezone::Named(-1).is_valid());
    }

    #[test]
    fn test_stream() {
        let mut out = Vec::new();
        Timezone::offset_hours(-6, true).stream(&mut out);
        Timezone::Named(135).stream(&mut out);
        assert_eq!(
            String::from_utf8_lossy(&out),
            "timezone\n-PT6H|true\ntimezone_id\n135\n"
        );
    }
}
