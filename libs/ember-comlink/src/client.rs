//! Simple builder commands
//!
//! Each call opens its own connection, sends `STARTUP` and one directive,
//! collects the response lines and closes again.

use std::sync::Arc;

use common::BuilderEndpoint;
use ember_model::JobDefaults;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::protocol::{Directive, JobListKind, ResponseLines, SHUTDOWN};
use crate::transport::{TcpTransportFactory, Transport, TransportFactory};

const RECEIVE_BUFFER: usize = 4096;

/// A timezone the builder knows, as offered by `LIST_TIMEZONES`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimezoneInfo {
    /// Identifier to use with a named timezone
    pub value: i32,
    pub name: String,
}

/// Third-party license reported by the builder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LicenseInfo {
    pub name: String,
    pub version: String,
    pub license: String,
    pub url: String,
}

/// Client for the builder's request/response commands
#[derive(Debug, Clone)]
pub struct BuilderClient {
    factory: Arc<dyn TransportFactory>,
}

impl BuilderClient {
    pub fn new(factory: Arc<dyn TransportFactory>) -> Self {
        Self { factory }
    }

    /// Client talking TCP to `endpoint`
    pub fn connect_to(endpoint: &BuilderEndpoint) -> Result<Self> {
        endpoint.validate()?;
        Ok(Self::new(Arc::new(TcpTransportFactory::for_endpoint(endpoint)?)))
    }

    /// Recommended option values
    pub async fn get_defaults(&self) -> Result<JobDefaults> {
        let lines = self.request(Directive::GetDefaults).await?;
        Ok(JobDefaults::from_lines(lines))
    }

    pub async fn list_timezones(&self) -> Result<Vec<TimezoneInfo>> {
        let lines = self.request(Directive::ListTimezones).await?;
        Ok(lines.iter().filter_map(|l| parse_timezone(l)).collect())
    }

    pub async fn get_licenses(&self) -> Result<Vec<LicenseInfo>> {
        let lines = self.request(Directive::GetLicenses).await?;
        Ok(lines.iter().filter_map(|l| parse_license(l)).collect())
    }

    /// Ask the builder to pack a job's files as a tar archive
    pub async fn archive_tar(&self, job: &str) -> Result<Vec<String>> {
        self.request(Directive::Tar(job)).await
    }

    /// Ask the builder to pack a job's files as a zip archive
    pub async fn archive_zip(&self, job: &str) -> Result<Vec<String>> {
        self.request(Directive::Zip(job)).await
    }

    pub async fn delete_job(&self, job: &str) -> Result<Vec<String>> {
        self.request(Directive::Delete(job)).await
    }

    pub async fn stop_job(&self, job: &str, priority: u16) -> Result<Vec<String>> {
        self.request(Directive::StopJob { job, priority }).await
    }

    /// Names of the jobs in one builder queue
    pub async fn list_jobs(&self, kind: JobListKind) -> Result<Vec<String>> {
        let lines = self.request(Directive::ListJobs(kind)).await?;
        Ok(lines
            .into_iter()
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty())
            .collect())
    }

    async fn request(&self, directive: Directive<'_>) -> Result<Vec<String>> {
        directive.check()?;
        let mut transport = self.factory.create()?;
        transport.connect().await?;
        debug!("Sending directive {}", directive);

        let result = read_response(transport.as_mut(), &directive).await;
        if let Err(e) = transport.disconnect().await {
            warn!("Error while disconnecting: {}", e);
        }
        let lines = result?;
        debug!("{} answered with {} lines", directive, lines.len());
        Ok(lines)
    }
}

async fn read_response(
    transport: &mut dyn Transport,
    directive: &Directive<'_>,
) -> Result<Vec<String>> {
    transport.send(directive.request().as_bytes()).await?;

    let mut response = ResponseLines::new();
    let mut buffer = [0u8; RECEIVE_BUFFER];
    loop {
        let n = transport.receive(&mut buffer).await?;
        if n == 0 || response.push(&buffer[..n]) {
            break;
        }
    }

    // the builder may already have closed; a failed goodbye is not an error
    if let Err(e) = transport.send(format!("{}\n", SHUTDOWN).as_bytes()).await {
        debug!("SHUTDOWN not delivered: {}", e);
    }
    Ok(response.finish())
}

fn parse_timezone(line: &str) -> Option<TimezoneInfo> {
    if line.trim().is_empty() {
        return None;
    }
    let parsed = line
        .split_once('|')
        .and_then(|(value, name)| Some((value.trim().parse::<i32>().ok()?, name.trim())))
        .filter(|(_, name)| !name.is_empty());
    match parsed {
        Some((value, name)) => Some(TimezoneInfo {
            value,
            name: name.to_string(),
        }),
        None => {
            warn!("Skipping malformed timezone line: {}", line);
            None
        },
    }
}

fn parse_license(line: &str) -> Option<LicenseInfo> {
    if line.trim().is_empty() {
        return None;
    }
    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    match fields.as_slice() {
        [name, version, license, url] if !name.is_empty() => Some(LicenseInfo {
            name: name.to_string(),
            version: version.to_string(),
            license: license.to_string(),
            url: url.to_string(),
        }),
        _ => {
            warn!("Skipping malformed license line: {}", line);
            None
        },
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::error::ComlinkError;
    use crate::transport::MockTransportFactory;
    use ember_model::Duration;
    use tracing_test::traced_test;

    fn client(factory: &MockTransportFactory) -> BuilderClient {
        BuilderClient::new(Arc::new(factory.clone()))
    }

    #[tokio::test]
    #[traced_test]
    async fn test_list_timezones_skips_malformed_lines() {
        let factory = MockTransportFactory::default().with_script([
            "0|UTC\n-300|Eastern Standard",
            " Time\nnot a timezone\n",
            "60|CET\nCOMPLETE\n",
        ]);
        let zones = client(&factory).list_timezones().await.unwrap();
        assert_eq!(
            zones,
            vec![
                TimezoneInfo { value: 0, name: "UTC".into() },
                TimezoneInfo { value: -300, name: "Eastern Standard Time".into() },
                TimezoneInfo { value: 60, name: "CET".into() },
            ]
        );
        assert!(logs_contain("Skipping malformed timezone line: not a timezone"));
        assert_eq!(
            factory.sent_bytes().await,
            b"STARTUP\nLIST_TIMEZONES\nSHUTDOWN\n"
        );
    }

    #[tokio::test]
    async fn test_get_licenses() {
        let factory = MockTransportFactory::default().with_script([
            "GDAL|3.8.1|MIT|https://gdal.org\nbroken|line\nCOMPLETE\n",
        ]);
        let licenses = client(&factory).get_licenses().await.unwrap();
        assert_eq!(licenses.len(), 1);
        assert_eq!(licenses[0].name, "GDAL");
        assert_eq!(licenses[0].url, "https://gdal.org");
    }

    #[tokio::test]
    async fn test_get_defaults_until_end_of_stream() {
        let factory = MockTransportFactory::default()
            .with_script(["maxaccts\nPT1M\nspotting\nfalse\nfancy\n1\n"]);
        let defaults = client(&factory).get_defaults().await.unwrap();
        assert_eq!(defaults.fgm.max_acc_ts(), Some(Duration::from_minutes(1)));
        assert_eq!(defaults.fgm.spotting(), Some(false));
        assert_eq!(defaults.unknown.len(), 1);
    }

    #[tokio::test]
    async fn test_admin_command_lines() {
        let factory = MockTransportFactory::default().with_script(["OK\nCOMPLETE\n"]);
        let client = client(&factory);

        assert_eq!(client.archive_tar("job_1").await.unwrap(), vec!["OK"]);
        client.archive_zip("job_1").await.unwrap();
        client.delete_job("job_1").await.unwrap();
        client.stop_job("job_1", 5).await.unwrap();

        let sent = String::from_utf8(factory.sent_bytes().await).unwrap();
        assert_eq!(
            sent,
            "STARTUP\nTAR job_1\nSHUTDOWN\n\
             STARTUP\nZIP job_1\nSHUTDOWN\n\
             STARTUP\nDELETE job_1\nSHUTDOWN\n\
             STARTUP\nSTOP_JOB job_1|5\nSHUTDOWN\n"
        );
        assert_eq!(factory.connections(), 4);
    }

    #[tokio::test]
    async fn test_bad_job_name_never_connects() {
        let factory = MockTransportFactory::default();
        let err = client(&factory).delete_job("a\nb").await.unwrap_err();
        assert!(matches!(err, ComlinkError::InvalidArgument(_)));
        assert_eq!(factory.connections(), 0);
    }

    #[tokio::test]
    async fn test_list_jobs() {
        let factory =
            MockTransportFactory::default().with_script(["job_1\n\njob_2 \nCOMPLETE\n"]);
        let jobs = client(&factory).list_jobs(JobListKind::Running).await.unwrap();
        assert_eq!(jobs, vec!["job_1", "job_2"]);
        assert!(String::from_utf8(factory.sent_bytes().await)
            .unwrap()
            .contains("LIST_OPTIONS_RUNNING"));
    }
}
