//! Job aggregate
//!
//! A job owns every input, output and setting of one submission and knows
//! how to validate and encode itself as a whole.

use std::collections::HashSet;

use tracing::debug;

use crate::attachment::{Attachment, AttachmentContent};
use crate::inputs::Inputs;
use crate::outputs::Outputs;
use crate::settings::{JobOptions, TimestepSettings, UnitSettings};
use crate::validation::{validate_collection, Validate, ValidationContext, ValidationError};
use crate::wire::{
    sanitize_text, Streamable, WireBuffer, WireSink, BEGINDATA, ENDDATA, GLOBALCOMMENTS, STARTJOB,
    STARTUP,
};

/// One complete simulation request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Job {
    pub comments: String,
    pub inputs: Inputs,
    pub outputs: Outputs,
    pub timestep_settings: TimestepSettings,
    pub export_units: UnitSettings,
    pub job_options: JobOptions,
    attachments: Vec<Attachment>,
}

impl Job {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an in-memory file and return the URL to use in its place
    pub fn add_attachment(&mut self, filename: &str, content: AttachmentContent) -> String {
        let attachment = Attachment::new(self.attachments.len(), filename, content);
        let url = attachment.url().to_string();
        debug!("Added attachment {} as {}", filename, url);
        self.attachments.push(attachment);
        url
    }

    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Validate with an explicit context; `None` when the job is valid
    pub fn validation_report_with(&self, ctx: &ValidationContext) -> Option<ValidationError> {
        let mut concerns = self.inputs.concerns(ctx);
        concerns.extend(self.outputs.concerns(ctx));
        for (name, errors) in [
            ("timestepSettings", self.timestep_settings.validate(ctx)),
            ("exportUnits", self.export_units.validate(ctx)),
            ("jobOptions", self.job_options.validate(ctx)),
        ] {
            if !errors.is_empty() {
                concerns.push(
                    ValidationError::field(name, "contains invalid values").with_children(errors),
                );
            }
        }
        concerns.extend(validate_collection(
            "attachments",
            &self.attachments,
            ctx,
            "filename",
            |a| Some(a.filename().to_string()),
            &mut HashSet::new(),
        ));

        if concerns.is_empty() {
            None
        } else {
            Some(
                ValidationError::new("the job is not valid")
                    .with_object("Job")
                    .with_children(concerns),
            )
        }
    }

    /// Full validation tree rooted at the job; `None` when the job is valid
    pub fn validation_report(&self) -> Option<ValidationError> {
        self.validation_report_with(&ValidationContext::default())
    }

    /// Write the whole submission, framing included
    pub fn encode_into(&self, sink: &mut dyn WireSink) {
        sink.write_line(STARTUP);
        sink.write_line(BEGINDATA);
        sink.write_message(GLOBALCOMMENTS, &sanitize_text(&self.comments));
        for attachment in &self.attachments {
            attachment.stream(sink);
        }
        self.inputs.stream(sink);
        self.outputs.stream(sink);
        self.timestep_settings.stream(sink);
        self.export_units.stream(sink);
        self.job_options.stream(sink);
        sink.write_line(ENDDATA);
        sink.write_line(STARTJOB);
    }

    /// Bytes sent to the builder for this job
    pub fn encode_submission(&self) -> Vec<u8> {
        let mut buffer = WireBuffer::new();
        self.encode_into(&mut buffer);
        debug!(
            "Encoded job: {} messages, {} bytes",
            buffer.messages(),
            buffer.len()
        );
        buffer.into_bytes()
    }
}

impl Validate for Job {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        self.validation_report_with(ctx).into_iter().collect()
    }

    fn describe(&self) -> Option<String> {
        Some("Job".to_string())
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;

    #[test]
    fn test_empty_job_concern_order() {
        let job = Job::new();
        let root = job.validation_report().unwrap();
        let names: Vec<_> = root.children.iter().filter_map(|e| e.field_name()).collect();
        assert_eq!(
            names,
            vec!["timezone", "files", "weatherStations", "ignitions", "scenarios"]
        );
        assert_eq!(job.check_valid().len(), 1);
    }

    #[test]
    fn test_attachment_urls_follow_insertion_order() {
        let mut job = Job::new();
        let first = job.add_attachment("a.prj", AttachmentContent::Text("PROJ".into()));
        let second = job.add_attachment("fuel map.asc", AttachmentContent::Binary(vec![0, 1]));
        assert_eq!(first, "attachment:/0/a.prj");
        assert_eq!(second, "attachment:/1/fuel%20map.asc");
        assert_eq!(job.attachments().len(), 2);
    }

    #[test]
    fn test_duplicate_attachment_names() {
        let mut job = Job::new();
        job.add_attachment("a.prj", AttachmentContent::Text("x".into()));
        job.add_attachment("A.PRJ", AttachmentContent::Text("y".into()));
        let root = job.validation_report().unwrap();
        assert!(root.child("attachments").is_some());
    }

    #[test]
    fn test_framing() {
        let mut job = Job::new();
        job.comments = "two\nlines".into();
        let mut buf = WireBuffer::new();
        job.encode_into(&mut buf);
        let lines = buf.lines();
        assert_eq!(&lines[..4], &["STARTUP", "BEGINDATA", "GLOBALCOMMENTS", "two lines"]);
        assert_eq!(&lines[lines.len() - 2..], &["ENDDATA", "STARTJOB"]);
    }
}
