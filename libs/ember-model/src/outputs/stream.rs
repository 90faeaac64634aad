//! Live output destinations

use crate::validation::{Checks, Validate, ValidationContext, ValidationError};
use crate::wire::{Record, Streamable, WireSink};

/// Where the builder pushes outputs while a job runs
#[derive(Debug, Clone, PartialEq)]
pub enum OutputStream {
    /// MQTT broker configured on the builder; `None` streams every scenario
    Mqtt { scenario_name: Option<String> },
    GeoServer {
        url: String,
        username: String,
        password: String,
        workspace: String,
        coverage_store: String,
        declared_srs: Option<String>,
        scenario_name: Option<String>,
    },
}

impl Validate for OutputStream {
    fn validate(&self, ctx: &ValidationContext) -> Vec<ValidationError> {
        let mut checks = Checks::new(ctx);
        if let OutputStream::GeoServer {
            url,
            username,
            password,
            workspace,
            coverage_store,
            ..
        } = self
        {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                checks.fail("url", format!("'{}' is not an http(s) URL", url));
            }
            checks.unframed("url", url);
            checks.require_text("username", Some(username));
            checks.unframed("password", password);
            checks.require_text("workspace", Some(workspace));
            checks.require_text("coverageStore", Some(coverage_store));
        }
        checks.finish()
    }

    fn describe(&self) -> Option<String> {
        Some(
            match self {
                OutputStream::Mqtt { .. } => "MqttStream",
                OutputStream::GeoServer { .. } => "GeoServerStream",
            }
            .to_string(),
        )
    }
}

impl Streamable for OutputStream {
    fn stream(&self, sink: &mut dyn WireSink) {
        match self {
            OutputStream::Mqtt { scenario_name } => {
                let value = Record::new().opt_str(scenario_name.as_deref()).build();
                sink.write_message("mqttstream", &value);
            },
            OutputStream::GeoServer {
                url,
                username,
                password,
                workspace,
                coverage_store,
                declared_srs,
                scenario_name,
            } => {
                let value = Record::new()
                    .opt_str(scenario_name.as_deref())
                    .raw(url.as_str())
                    .raw(username.as_str())
                    .raw(password.as_str())
                    .raw(workspace.as_str())
                    .raw(coverage_store.as_str())
                    .opt_str(declared_srs.as_deref())
                    .build();
                sink.write_message("geoserverstream", &value);
            },
        }
    }
}
