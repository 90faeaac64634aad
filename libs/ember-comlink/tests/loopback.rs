//! Builder conversations over a real TCP socket

#![allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable

use common::BuilderEndpoint;
use ember_comlink::{BuilderClient, FetchState, JobSession};
use ember_model::{
    FeatureShape, HffmcMethod, Ignition, InputFiles, Job, LatLon, Scenario, Timezone,
    WeatherStation,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

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

/// Accept one connection, answer once `trigger` has arrived, then read to EOF
async fn fake_builder(trigger: &'static str, reply: &'static str) -> (u16, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        let mut buffer = [0u8; 1024];
        while !String::from_utf8_lossy(&received).ends_with(trigger) {
            let n = socket.read(&mut buffer).await.unwrap();
            assert!(n > 0, "client closed before sending {trigger:?}");
            received.extend_from_slice(&buffer[..n]);
        }
        socket.write_all(reply.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        socket.read_to_end(&mut received).await.unwrap();
        String::from_utf8(received).unwrap()
    });
    (port, handle)
}

#[tokio::test]
async fn test_job_submission_over_tcp() {
    let (port, builder) = fake_builder("STARTJOB\n", "job_20240601\n").await;
    let session = JobSession::connect_to(&BuilderEndpoint::new("127.0.0.1", port)).unwrap();
    let job = valid_job();

    let name = session.begin_job(&job).await.unwrap();
    assert_eq!(name.as_str(), "job_20240601");
    assert_eq!(session.state(), FetchState::Completed);

    let received = builder.await.unwrap();
    let submission = String::from_utf8(job.encode_submission()).unwrap();
    assert!(received.starts_with("STARTUP\nBEGINDATA\n"));
    assert_eq!(received, format!("{submission}SHUTDOWN\n"));
}

#[tokio::test]
async fn test_timezones_over_tcp() {
    let (port, builder) =
        fake_builder("LIST_TIMEZONES\n", "0|UTC\r\n-360|Mountain Daylight\r\nCOMPLETE\r\n").await;
    let client = BuilderClient::connect_to(&BuilderEndpoint::new("127.0.0.1", port)).unwrap();

    let zones = client.list_timezones().await.unwrap();
    assert_eq!(zones.len(), 2);
    assert_eq!(zones[1].value, -360);
    assert_eq!(zones[1].name, "Mountain Daylight");

    let received = builder.await.unwrap();
    assert_eq!(received, "STARTUP\nLIST_TIMEZONES\nSHUTDOWN\n");
}

#[tokio::test]
async fn test_refused_connection_fails_session() {
    // bind then drop to find a port nobody listens on
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    let session = JobSession::connect_to(&BuilderEndpoint::new("127.0.0.1", port)).unwrap();

    let err = session.begin_job(&valid_job()).await.unwrap_err();
    assert!(matches!(err, ember_comlink::ComlinkError::Transport(_)));
    assert_eq!(session.state(), FetchState::Failed);
}
