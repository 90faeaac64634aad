//! Entity identifiers
//!
//! Every referenceable entity gets `<prefix><counter>` at construction. Each
//! entity type has its own process-wide counter.

use std::sync::atomic::{AtomicU64, Ordering};

/// Entity types that carry a generated identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    GridFile,
    FuelBreak,
    FuelPatch,
    WeatherPatch,
    WeatherGrid,
    WeatherStation,
    WeatherStream,
    Ignition,
    Asset,
    Target,
    Scenario,
}

impl IdKind {
    /// Identifier prefix for this entity type
    pub fn prefix(self) -> &'static str {
        match self {
            IdKind::GridFile => "gridfile",
            IdKind::FuelBreak => "fuelbreak",
            IdKind::FuelPatch => "fuelpatch",
            IdKind::WeatherPatch => "wxpatch",
            IdKind::WeatherGrid => "wxgrid",
            IdKind::WeatherStation => "wxstn",
            IdKind::WeatherStream => "wxstrm",
            IdKind::Ignition => "ign",
            IdKind::Asset => "asset",
            IdKind::Target => "target",
            IdKind::Scenario => "scen",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

#[allow(clippy::declare_interior_mutable_const)]
const ZERO: AtomicU64 = AtomicU64::new(0);
static COUNTERS: [AtomicU64; 11] = [ZERO; 11];

/// Generate the next identifier for an entity type
pub fn next_id(kind: IdKind) -> String {
    let n = COUNTERS[kind.slot()].fetch_add(1, Ordering::Relaxed);
    format!("{}{}", kind.prefix(), n)
}

/// Strip characters that would break the pipe-delimited wire format
pub fn sanitize_id(value: &str) -> String {
    value.replace('|', "")
}

/// Entities addressable by identifier
pub trait Identified {
    fn id(&self) -> &str;
}

/// Implement [`Identified`] plus `id`/`set_id` for a struct with an `id` field
macro_rules! identified {
    ($ty:ty) => {
        impl $crate::ident::Identified for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        }

        impl $ty {
            pub fn id(&self) -> &str {
                &self.id
            }

            /// Override the generated identifier; `|` is stripped
            pub fn set_id(&mut self, id: &str) -> &mut Self {
                self.id = $crate::ident::sanitize_id(id);
                self
            }
        }
    };
}
pub(crate) use identified;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_prefixed_and_increase() {
        let a = next_id(IdKind::WeatherStream);
        let b = next_id(IdKind::WeatherStream);
        assert!(a.starts_with("wxstrm"));
        let na: u64 = a.trim_start_matches("wxstrm").parse().unwrap_or(0);
        let nb: u64 = b.trim_start_matches("wxstrm").parse().unwrap_or(0);
        assert!(nb > na);
    }

    #[test]
    fn test_sanitize_id() {
        assert_eq!(sanitize_id("a|b||c"), "abc");
        assert_eq!(sanitize_id("plain"), "plain");
    }
}
