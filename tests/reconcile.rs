//! End-to-end reconciliation through the public API: a channel-fed app for
//! the full startup sequence, and the dashboard directly for the store rules.

use metricwatch::data::{HistoryQuery, DEFAULT_LOOKBACK};
use metricwatch::{
    App, ChannelSource, ClientRequest, Dashboard, FeedEvent, Measurement, MetricHistory, Phase,
    RawMeasurement, SnapshotHydrator, Theme,
};

/// Wall clock used by these tests, in epoch milliseconds.
const NOW: i64 = 1_800_500;

fn hydrator() -> SnapshotHydrator {
    SnapshotHydrator::anchored_at(NOW - DEFAULT_LOOKBACK.as_millis() as i64)
}

fn history(metric: &str, points: &[(i64, f64)]) -> MetricHistory {
    MetricHistory {
        metric: metric.into(),
        measurements: points
            .iter()
            .map(|&(at, value)| Measurement::new(metric, at, value, "%"))
            .collect(),
    }
}

fn live(metric: &str, at: i64, value: f64) -> FeedEvent {
    FeedEvent::Measurement(Measurement::new(metric, at, value, "%").into())
}

fn hydrated(catalog: &[&str], histories: Vec<MetricHistory>) -> Dashboard {
    let mut dash = Dashboard::with_hydrator(hydrator());
    dash.start();
    dash.handle(FeedEvent::Catalog(Ok(catalog.iter().map(|m| m.to_string()).collect())));
    dash.handle(FeedEvent::History(Ok(histories)));
    assert_eq!(dash.phase(), &Phase::Ready);
    dash
}

fn ats(dash: &Dashboard, metric: &str) -> Vec<i64> {
    dash.store()
        .get(metric)
        .map(|s| s.as_slice().iter().map(|m| m.at).collect())
        .unwrap_or_default()
}

#[test]
fn cpu_and_mem_session() {
    let (mut handle, source) = ChannelSource::create("e2e");
    let mut app = App::new(Box::new(source), Dashboard::with_hydrator(hydrator()), Theme::dark());
    app.start();
    assert_eq!(handle.try_next_request(), Some(ClientRequest::GetMetrics));

    handle.respond_catalog(["cpu", "mem"]);
    app.reload_data().unwrap();
    assert_eq!(app.dashboard.phase(), &Phase::Hydrating);

    let after = NOW - 30 * 60 * 1000;
    assert_eq!(
        handle.try_next_request(),
        Some(ClientRequest::GetMultipleMeasurements {
            input: vec![
                HistoryQuery { metric_name: "cpu".into(), after },
                HistoryQuery { metric_name: "mem".into(), after },
            ],
        })
    );

    handle.respond_history(vec![history("cpu", &[(1000, 10.0)]), history("mem", &[])]);
    app.reload_data().unwrap();
    assert_eq!(app.dashboard.phase(), &Phase::Ready);

    assert!(app.dashboard.select("cpu"));
    handle.push_measurement(Measurement::new("cpu", 2000, 20.0, "%"));
    handle.push_measurement(Measurement::new("disk", 2000, 5.0, "GB"));
    app.reload_data().unwrap();

    let cpu = app.dashboard.store().get("cpu").unwrap().as_slice();
    assert_eq!(
        cpu,
        &[
            Measurement::new("cpu", 1000, 10.0, "%"),
            Measurement::new("cpu", 2000, 20.0, "%"),
        ]
    );
    assert!(!app.dashboard.store().is_enrolled("disk"));
    assert_eq!(app.dashboard.stats().unenrolled, 1);

    let views = app.dashboard.visible_series();
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].unit, Some("%"));
    assert_eq!(views[0].latest().map(|m| m.value), Some(20.0));
}

#[test]
fn second_history_answer_is_ignored() {
    let mut dash = hydrated(&["cpu", "mem"], vec![history("cpu", &[(1000, 10.0)])]);
    let before: Vec<_> = dash
        .store()
        .iter()
        .map(|(k, s)| (k.clone(), s.as_slice().to_vec()))
        .collect();

    dash.handle(FeedEvent::History(Ok(vec![
        history("cpu", &[(1500, 99.0)]),
        history("mem", &[(1500, 1.0)]),
    ])));

    let after: Vec<_> = dash
        .store()
        .iter()
        .map(|(k, s)| (k.clone(), s.as_slice().to_vec()))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn live_data_for_unknown_metric_changes_nothing() {
    let mut dash = hydrated(&["cpu", "mem"], vec![history("cpu", &[(1000, 10.0)])]);

    dash.handle(live("mem", 2000, 1.0));
    dash.handle(live("net", 2000, 1.0));

    assert_eq!(dash.store().len(), 1);
    assert!(!dash.store().is_enrolled("mem"));
    assert!(!dash.store().is_enrolled("net"));
    assert_eq!(dash.store().total_measurements(), 1);
}

#[test]
fn live_data_appends_in_arrival_order() {
    let mut dash = hydrated(&["cpu"], vec![history("cpu", &[(1000, 1.0), (1100, 2.0)])]);

    for at in [5000, 3000, 900, 3000] {
        dash.handle(live("cpu", at, at as f64));
    }

    assert_eq!(ats(&dash, "cpu"), vec![1000, 1100, 5000, 3000, 900, 3000]);
}

#[test]
fn malformed_events_are_skipped() {
    let mut dash = hydrated(&["cpu"], vec![history("cpu", &[(1000, 1.0)])]);

    dash.handle(FeedEvent::Measurement(RawMeasurement {
        metric: Some("cpu".into()),
        at: None,
        value: Some(3.0),
        unit: Some("%".into()),
    }));
    dash.handle(live("cpu", 2000, 2.0));

    assert_eq!(ats(&dash, "cpu"), vec![1000, 2000]);
    assert_eq!(dash.stats().malformed, 1);
    assert_eq!(dash.stats().accepted, 1);
}

#[test]
fn reselecting_is_a_no_op() {
    let mut dash = hydrated(&["cpu", "mem"], vec![]);

    assert!(dash.select("cpu"));
    assert!(!dash.select("cpu"));
    assert!(dash.select("mem"));
    assert!(!dash.select("cpu"));

    assert_eq!(dash.selection().as_slice(), &["cpu".to_string(), "mem".to_string()]);
}

#[test]
fn selecting_after_hydration_starts_empty() {
    let mut dash = hydrated(&["cpu", "disk"], vec![history("cpu", &[(1000, 1.0)])]);
    assert!(!dash.store().is_enrolled("disk"));

    assert!(dash.select("disk"));
    assert!(dash.store().get("disk").unwrap().is_empty());
    let views = dash.visible_series();
    assert_eq!(views[0].unit, None);
    assert!(views[0].points().is_empty());

    dash.handle(live("disk", 4000, 7.0));
    assert_eq!(ats(&dash, "disk"), vec![4000]);
}

#[test]
fn refreshed_catalog_metric_has_no_backfill() {
    let mut dash = hydrated(&["cpu"], vec![history("cpu", &[(1000, 1.0)])]);

    assert_eq!(dash.handle(FeedEvent::Catalog(Ok(vec!["cpu".into(), "gpu".into()]))), None);
    assert!(dash.select("gpu"));
    assert!(dash.store().get("gpu").unwrap().is_empty());
    assert!(dash.color_of("gpu").is_some());
}

#[test]
fn deselected_metric_keeps_growing() {
    let mut dash = hydrated(&["cpu"], vec![history("cpu", &[(1000, 1.0)])]);

    dash.select("cpu");
    dash.deselect("cpu");
    dash.handle(live("cpu", 2000, 2.0));
    dash.handle(live("cpu", 3000, 3.0));

    assert!(dash.visible_series().is_empty());
    assert_eq!(ats(&dash, "cpu"), vec![1000, 2000, 3000]);
}

#[test]
fn synthetic_server_thread_drives_app_to_live() {
    use std::thread;
    use std::time::{Duration, Instant};

    let (mut handle, source) = ChannelSource::create("synthetic");
    let server = thread::spawn(move || {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut answered = 0;
        while answered < 2 && Instant::now() < deadline {
            match handle.try_next_request() {
                Some(ClientRequest::GetMetrics) => {
                    handle.respond_catalog(["cpu", "mem"]);
                    answered += 1;
                }
                Some(ClientRequest::GetMultipleMeasurements { input }) => {
                    let histories = input
                        .iter()
                        .map(|q| history(&q.metric_name, &[(q.after + 1, 1.0)]))
                        .collect();
                    handle.respond_history(histories);
                    answered += 1;
                }
                None => thread::sleep(Duration::from_millis(5)),
            }
        }
        handle.push_measurement(Measurement::new("cpu", NOW + 1, 2.0, "%"));
        handle
    });

    let mut app = App::new(Box::new(source), Dashboard::with_hydrator(hydrator()), Theme::dark());
    app.start();
    let deadline = Instant::now() + Duration::from_secs(5);
    while app.dashboard.store().total_measurements() < 3 && Instant::now() < deadline {
        app.reload_data().unwrap();
        thread::sleep(Duration::from_millis(5));
    }
    let _handle = server.join().unwrap();

    assert_eq!(app.dashboard.phase(), &Phase::Ready);
    assert_eq!(app.dashboard.store().get("cpu").unwrap().len(), 2);
    assert_eq!(app.dashboard.store().get("mem").unwrap().len(), 1);
}
