use std::time::{ Duration, Instant };
use volley::{ AttackConfig, Commander, Error };

fn commander(attackers: usize) -> Commander {
    Commander::with_config(AttackConfig {
        attackers,
        threads: 2,
        timeout: Some(Duration::from_secs(5)),
        connect_timeout: Some(Duration::from_secs(1)),
    }).unwrap()
}

#[test]
fn healthy_target_is_fully_available() {
    let mut server = mockito::Server::new();
    let mock = server.mock("GET", "/").with_status(200).with_body("hello").expect_at_least(3).create();

    let mut commander = commander(3);
    let summary = commander.assault(&server.url(), "0s", "1s").unwrap();

    assert!(summary.total_requests >= 3);
    assert_eq!(summary.total_errors, 0);
    assert_eq!(summary.availability_pct, 100.0);
    assert!(summary.requests_per_second > 0.0);
    assert!(summary.elapsed >= Duration::from_secs(1));
    for report in commander.reports() {
        assert!(report.request_count >= 1);
        assert!(report.error_count <= report.request_count);
    }
    mock.assert();
}

#[test]
fn failing_target_is_fully_unavailable() {
    let mut server = mockito::Server::new();
    let _mock = server.mock("GET", "/").with_status(500).create();

    let mut commander = commander(2);
    let summary = commander.assault(&server.url(), "", "500ms").unwrap();

    assert!(summary.total_requests > 0);
    assert_eq!(summary.total_errors, summary.total_requests);
    assert_eq!(summary.availability_pct, 0.0);
    assert!(summary.to_string().contains("0.00%"));
}

#[test]
fn client_errors_count_as_errors() {
    let mut server = mockito::Server::new();
    let _mock = server.mock("GET", "/missing").with_status(404).create();

    let mut commander = commander(1);
    let summary = commander.assault(&format!("{}/missing", server.url()), "10ms", "300ms").unwrap();

    assert!(summary.total_requests > 0);
    assert_eq!(summary.total_errors, summary.total_requests);
}

#[test]
fn unreachable_target_is_counted_not_fatal() {
    let mut commander = commander(2);
    let summary = commander.assault("http://127.0.0.1:1/", "20ms", "300ms").unwrap();

    assert!(summary.total_requests > 0);
    assert_eq!(summary.total_errors, summary.total_requests);
    assert_eq!(summary.availability_pct, 0.0);
}

#[test]
fn malformed_time_span_is_a_configuration_error() {
    let mut server = mockito::Server::new();
    let mock = server.mock("GET", "/").expect(0).create();

    let mut commander = commander(3);
    let result = commander.assault(&server.url(), "", "abc");

    assert!(matches!(result, Err(Error::InvalidTimeSpan { .. })));
    assert!(commander.reports().iter().all(|r| r.request_count == 0));
    mock.assert();
}

#[test]
fn delay_bounds_the_request_rate() {
    let mut server = mockito::Server::new();
    let _mock = server.mock("GET", "/").with_status(200).create();

    let mut commander = commander(1);
    let summary = commander.assault(&server.url(), "100ms", "1s").unwrap();

    // ten paced requests per second, plus at most one of overshoot
    assert!(summary.total_requests >= 2);
    assert!(summary.total_requests <= 13);
}

#[test]
fn sequential_assaults_do_not_leak_reports() {
    let mut failing = mockito::Server::new();
    let _fail = failing.mock("GET", "/").with_status(503).create();
    let mut healthy = mockito::Server::new();
    let _ok = healthy.mock("GET", "/").with_status(200).create();

    let mut commander = commander(2);

    let first = commander.assault(&failing.url(), "", "300ms").unwrap();
    assert!(first.total_errors > 0);

    let second = commander.assault(&healthy.url(), "", "300ms").unwrap();
    assert!(second.total_requests > 0);
    assert_eq!(second.total_errors, 0);
    assert_eq!(second.availability_pct, 100.0);
    assert!(commander.reports().iter().all(|r| r.error_count == 0));
}

#[test]
fn long_delay_does_not_stretch_the_assault() {
    let mut server = mockito::Server::new();
    let mock = server.mock("GET", "/").with_status(200).expect(2).create();

    let mut commander = commander(2);
    let started = Instant::now();
    let summary = commander.assault(&server.url(), "5s", "300ms").unwrap();
    let wall = started.elapsed();

    assert!(wall < Duration::from_secs(2), "assault took {:?}", wall);
    assert!(summary.elapsed >= Duration::from_millis(300));
    // one request each, then halted mid-sleep with no further request
    assert_eq!(summary.total_requests, 2);
    mock.assert();
}

#[test]
fn early_stop_during_long_delay_returns_promptly() {
    let mut server = mockito::Server::new();
    let _mock = server.mock("GET", "/").with_status(200).create();

    let mut commander = commander(3);
    let stop = commander.stop_handle();
    let stopper = std::thread::spawn(move || {
        std::thread::sleep(Duration::from_millis(200));
        stop.stop();
    });

    let started = Instant::now();
    let summary = commander.siege(&server.url(), "1m").unwrap();
    stopper.join().unwrap();

    assert!(started.elapsed() < Duration::from_secs(2));
    assert_eq!(summary.total_requests, 3);
}
