//! Ember Model - job graph for fire-growth simulation jobs
//!
//! Builds a complete job description in memory, validates it into one error
//! tree and encodes it as the line-oriented messages the job builder reads.
//!
//! ```no_run
//! use ember_model::Job;
//!
//! let job = Job::new();
//! if let Some(report) = job.validation_report() {
//!     eprintln!("{}", report);
//! }
//! let bytes = job.encode_submission();
//! # let _ = bytes;
//! ```

pub mod attachment;
pub mod defaults;
pub mod duration;
pub mod error;
pub mod geo;
pub mod ident;
pub mod inputs;
pub mod job;
pub mod options;
pub mod outputs;
pub mod settings;
pub mod shape;
pub mod timezone;
pub mod units;
pub mod validation;
pub mod wire;

pub use attachment::{is_attachment_url, Attachment, AttachmentContent};
pub use defaults::JobDefaults;
pub use duration::Duration;
pub use error::{ModelError, Result};
pub use geo::{LatLon, TimeRange};
pub use ident::{IdKind, Identified};
pub use inputs::*;
pub use job::Job;
pub use options::{FbpOptions, FgmOptions, FmcOptions, FwiOptions, OptionMode};
pub use outputs::*;
pub use settings::{JobOptions, TimestepSettings, UnitSettings};
pub use shape::{FeatureShape, FuelBreakShape, PatchShape};
pub use timezone::Timezone;
pub use units::*;
pub use validation::{FieldRef, Validate, ValidationContext, ValidationError};
pub use wire::{Streamable, WireBuffer, WireSink};
