//! Job submission session
//!
//! A session submits one job at a time. The fetch state lives in an atomic so
//! a second submission on the same session is refused without touching the
//! network, even from another task.

use std::fmt;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use common::{BuilderEndpoint, ClientConfig};
use ember_model::{Job, ValidationContext};
use tracing::{debug, error, info, warn};

use crate::error::{ComlinkError, Result};
use crate::protocol::SHUTDOWN;
use crate::transport::{TcpTransportFactory, Transport, TransportFactory};

const RECEIVE_BUFFER: usize = 4096;

/// Progress of the most recent submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum FetchState {
    Idle = 0,
    InFlight = -1,
    Completed = 1,
    Failed = 2,
}

impl FetchState {
    fn from_raw(value: i32) -> Self {
        match value {
            -1 => FetchState::InFlight,
            1 => FetchState::Completed,
            2 => FetchState::Failed,
            _ => FetchState::Idle,
        }
    }
}

/// Name the builder assigned to a submitted job
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobName(String);

impl JobName {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for JobName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Single-flight job submitter
#[derive(Debug)]
pub struct JobSession {
    factory: Arc<dyn TransportFactory>,
    validation: ValidationContext,
    state: AtomicI32,
}

impl JobSession {
    pub fn new(factory: Arc<dyn TransportFactory>) -> Self {
        Self {
            factory,
            validation: ValidationContext::default(),
            state: AtomicI32::new(FetchState::Idle as i32),
        }
    }

    /// Session talking TCP to `endpoint`
    pub fn connect_to(endpoint: &BuilderEndpoint) -> Result<Self> {
        endpoint.validate()?;
        Ok(Self::new(Arc::new(TcpTransportFactory::for_endpoint(endpoint)?)))
    }

    /// Session for the configured builder, honouring `validation.verify_files`
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let validation = ValidationContext {
            verify_files: config.validation.verify_files,
        };
        Ok(Self::connect_to(&config.builder)?.with_validation(validation))
    }

    /// Options used when validating a job before it is sent
    pub fn with_validation(mut self, validation: ValidationContext) -> Self {
        self.validation = validation;
        self
    }

    pub fn state(&self) -> FetchState {
        FetchState::from_raw(self.state.load(Ordering::SeqCst))
    }

    fn set_state(&self, state: FetchState) {
        self.state.store(state as i32, Ordering::SeqCst);
    }

    /// Validate and submit `job`, returning the builder's name for it
    ///
    /// Fails with [`ComlinkError::Busy`] while another submission on this
    /// session is in flight. Nothing is retried.
    pub async fn begin_job(&self, job: &Job) -> Result<JobName> {
        let claimed = self
            .state
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |s| {
                (s != FetchState::InFlight as i32).then_some(FetchState::InFlight as i32)
            });
        if claimed.is_err() {
            warn!("Job submission refused: a request is already in flight");
            return Err(ComlinkError::Busy);
        }

        if let Some(root) = job.validation_report_with(&self.validation) {
            self.set_state(FetchState::Failed);
            info!("Job not submitted: validation failed");
            return Err(ComlinkError::Invalid(Box::new(root)));
        }

        match self.submit(job).await {
            Ok(name) => {
                self.set_state(FetchState::Completed);
                info!("Job submitted as {}", name);
                Ok(name)
            },
            Err(e) => {
                self.set_state(FetchState::Failed);
                error!("Job submission failed: {}", e);
                Err(e)
            },
        }
    }

    async fn submit(&self, job: &Job) -> Result<JobName> {
        let mut transport = self.factory.create()?;
        transport.connect().await?;
        let result = exchange(transport.as_mut(), job).await;

        let stats = transport.stats().await;
        debug!(
            "Job exchange finished ({:?}): {} bytes sent, {} bytes received",
            stats.connection_state, stats.bytes_sent, stats.bytes_received
        );
        if let Err(e) = transport.disconnect().await {
            warn!("Error while disconnecting: {}", e);
        }
        result
    }
}

/// Write the submission and read the builder's answer to the end
async fn exchange(transport: &mut dyn Transport, job: &Job) -> Result<JobName> {
    transport.send(&job.encode_submission()).await?;

    let mut payload = Vec::new();
    let mut buffer = [0u8; RECEIVE_BUFFER];
    let mut write_closed = false;
    loop {
        let n = transport.receive(&mut buffer).await?;
        if n == 0 {
            break;
        }
        if !write_closed {
            transport.send(format!("{}\n", SHUTDOWN).as_bytes()).await?;
            transport.shutdown_write().await?;
            write_closed = true;
        }
        payload.extend_from_slice(&buffer[..n]);
    }

    let text = String::from_utf8_lossy(&payload);
    let name = text.trim();
    if name.is_empty() {
        return Err(ComlinkError::protocol(
            "builder closed the connection without naming the job",
        ));
    }
    Ok(JobName(name.to_string()))
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use crate::transport::{MockTransportConfig, MockTransportFactory, TransportError};
    use ember_model::{
        FeatureShape, HffmcMethod, Ignition, InputFiles, LatLon, Scenario, Timezone, WeatherStation,
    };
    use tracing_test::traced_test;

    fn valid_job() -> Job {
        let mut job = Job::new();
        job.inputs.timezone = Some(Timezone::offset_hours(-6, true));
        job.inputs.files = InputFiles::new("elev.prj", "fbp.lut", "fuel.asc");
        let station = job
            .inputs
            .add_weather_station(WeatherStation::new(LatLon::new(51.65, -115.0), 1000.0));
        station.set_id("stn");
        station
            .add_weather_stream("wx.txt")
            .set_id("strm")
            .set_hffmc(89.0, 13, HffmcMethod::VanWagner)
            .set_starting_codes(87.0, 45.0, 250.0, 0.0)
            .set_dates("2024-06-01", "2024-06-03");
        job.inputs
            .add_ignition(Ignition::new(
                "2024-06-01T13:00:00",
                FeatureShape::Point(LatLon::new(51.6, -115.1)),
            ))
            .set_id("ign");
        let scenario = job
            .inputs
            .add_scenario(Scenario::new("2024-06-01T13:00:00", "2024-06-02T13:00:00"));
        scenario.add_station_stream("stn", "strm");
        scenario.add_ignition_ref("ign");
        job
    }

    fn session(factory: &MockTransportFactory) -> JobSession {
        JobSession::new(Arc::new(factory.clone()))
    }

    #[tokio::test]
    async fn test_submission_bytes_and_job_name() {
        let factory = MockTransportFactory::default().with_script(["job_2024", "0601\n"]);
        let session = session(&factory);
        let job = valid_job();

        let name = session.begin_job(&job).await.unwrap();
        assert_eq!(name.as_str(), "job_20240601");
        assert_eq!(session.state(), FetchState::Completed);

        let mut expected = job.encode_submission();
        expected.extend_from_slice(b"SHUTDOWN\n");
        assert_eq!(factory.sent_bytes().await, expected);
    }

    #[tokio::test]
    async fn test_second_request_while_in_flight_is_busy() {
        let factory = MockTransportFactory::default().with_script(["job_a\n"]);
        let session = session(&factory);
        let job = valid_job();

        let (first, second) = tokio::join!(session.begin_job(&job), session.begin_job(&job));
        assert_eq!(first.unwrap().as_str(), "job_a");
        assert_eq!(second.unwrap_err(), ComlinkError::Busy);
        assert_eq!(factory.connections(), 1);

        // a finished session accepts a new request
        assert!(session.begin_job(&job).await.is_ok());
        assert_eq!(factory.connections(), 2);
    }

    #[tokio::test]
    async fn test_invalid_job_never_connects() {
        let factory = MockTransportFactory::default();
        let session = session(&factory);

        let err = session.begin_job(&Job::new()).await.unwrap_err();
        let root = err.validation().unwrap();
        assert_eq!(root.message, "the job is not valid");
        assert!(root.child("scenarios").is_some());
        assert_eq!(session.state(), FetchState::Failed);
        assert_eq!(factory.connections(), 0);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_transport_error_is_returned_verbatim() {
        let factory = MockTransportFactory::new(MockTransportConfig {
            should_fail_connection: true,
            ..MockTransportConfig::default()
        });
        let session = session(&factory);

        let err = session.begin_job(&valid_job()).await.unwrap_err();
        assert_eq!(
            err,
            ComlinkError::Transport(TransportError::ConnectionFailed(
                "Mock connection failure".to_string()
            ))
        );
        assert_eq!(session.state(), FetchState::Failed);
        assert!(logs_contain("Job submission failed"));
    }

    #[tokio::test]
    async fn test_receive_failure_fails_session() {
        let factory = MockTransportFactory::new(MockTransportConfig {
            should_fail_receive: true,
            ..MockTransportConfig::default()
        });
        let session = session(&factory);

        let err = session.begin_job(&valid_job()).await.unwrap_err();
        assert!(matches!(
            err,
            ComlinkError::Transport(TransportError::ReceiveFailed(_))
        ));
        assert_eq!(session.state(), FetchState::Failed);
    }

    #[tokio::test]
    async fn test_empty_response_is_protocol_error() {
        let factory = MockTransportFactory::default().with_script(["  \n"]);
        let session = session(&factory);

        let err = session.begin_job(&valid_job()).await.unwrap_err();
        assert!(matches!(err, ComlinkError::Protocol(_)));

        // closed without any payload: SHUTDOWN is never written
        let factory = MockTransportFactory::default();
        let session = JobSession::new(Arc::new(factory.clone()));
        assert!(session.begin_job(&valid_job()).await.is_err());
        assert!(!factory.sent_bytes().await.ends_with(b"SHUTDOWN\n"));
    }

    #[test]
    fn test_connect_to_rejects_bad_endpoint() {
        let endpoint = BuilderEndpoint::new("127.0.0.1", 0);
        assert!(matches!(
            JobSession::connect_to(&endpoint),
            Err(ComlinkError::Config(_))
        ));
        let session = JobSession::connect_to(&BuilderEndpoint::default()).unwrap();
        assert_eq!(session.state(), FetchState::Idle);
    }

    #[tokio::test]
    async fn test_file_checks_follow_config() {
        let mut config = ClientConfig::default();
        config.validation.verify_files = true;
        let session = JobSession::from_config(&config).unwrap();

        // the input files of the fixture job do not exist here
        let err = session.begin_job(&valid_job()).await.unwrap_err();
        assert!(err
            .validation()
            .unwrap()
            .iter()
            .any(|e| e.message.contains("does not exist")));
        assert_eq!(session.state(), FetchState::Failed);
    }
}
