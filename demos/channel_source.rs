//! Example: Feeding the dashboard through a channel
//!
//! This example demonstrates how to embed metricwatch in your own
//! application by answering its queries and pushing live measurements
//! through a channel.
//!
//! This is useful when you want to:
//! - Bridge from a transport metricwatch does not speak
//! - Generate synthetic data for testing
//! - Try the dashboard without a running measurement server
//!
//! # Usage
//!
//! ```bash
//! cargo run --example channel_source
//! ```

use std::thread;
use std::time::Duration;

use metricwatch::data::measurement::now_millis;
use metricwatch::{
    ChannelSource, ClientRequest, Dashboard, DataSource, Measurement, MetricHistory, Phase,
};

const METRICS: [&str; 2] = ["cpu", "mem"];

fn unit(metric: &str) -> &'static str {
    if metric == "cpu" {
        "%"
    } else {
        "MB"
    }
}

fn synthetic(metric: &str, step: i64) -> f64 {
    let base = if metric == "cpu" { 40.0 } else { 2048.0 };
    base + (step % 7) as f64 * 3.5
}

fn main() {
    println!("Channel source example");
    println!("Serving synthetic cpu/mem measurements...\n");

    // Create a channel source - the handle plays the server's part
    let (mut handle, mut source) = ChannelSource::create("synthetic-data");

    // Spawn a thread that answers queries and emits one measurement per metric per second
    thread::spawn(move || {
        let mut step = 0i64;

        loop {
            while let Some(request) = handle.try_next_request() {
                match request {
                    ClientRequest::GetMetrics => {
                        handle.respond_catalog(METRICS);
                    }
                    ClientRequest::GetMultipleMeasurements { input } => {
                        let now = now_millis();
                        let histories = input
                            .iter()
                            .map(|q| MetricHistory {
                                metric: q.metric_name.clone(),
                                measurements: (1..=3i64)
                                    .rev()
                                    .map(|i| {
                                        Measurement::new(
                                            q.metric_name.as_str(),
                                            now - i * 60_000,
                                            synthetic(&q.metric_name, -i),
                                            unit(&q.metric_name),
                                        )
                                    })
                                    .collect(),
                            })
                            .collect();
                        handle.respond_history(histories);
                    }
                }
            }

            step += 1;
            for metric in METRICS {
                let m = Measurement::new(metric, now_millis(), synthetic(metric, step), unit(metric));
                if !handle.push_measurement(m) {
                    return; // Source dropped
                }
            }

            thread::sleep(Duration::from_secs(1));
        }
    });

    // Drive the dashboard from the main thread
    let mut dashboard = Dashboard::default();
    if let Some(request) = dashboard.start() {
        source.request(request);
    }

    println!("Receiving measurements (press Ctrl+C to stop):\n");

    loop {
        while let Some(event) = source.poll() {
            if let Some(request) = dashboard.handle(event) {
                source.request(request);
            }
        }

        if *dashboard.phase() == Phase::Ready && dashboard.selection().is_empty() {
            dashboard.select("cpu");
            println!("Selected cpu; mem keeps filling in the background but is not shown\n");
        }

        for view in dashboard.visible_series() {
            if let Some(latest) = view.latest() {
                println!(
                    "  {}: {} points, latest {:.1} {}",
                    view.metric,
                    view.measurements.len(),
                    latest.value,
                    latest.unit
                );
            }
        }

        thread::sleep(Duration::from_secs(1));
    }
}
