use crate::engine::tracker::StatsSnapshot;
use std::net::IpAddr;
use std::time::{Duration, Instant};
use tracing::info;

/// Counts spawns in the current window. A window closes once `target`
/// flows have been spawned in it.
#[derive(Debug)]
pub struct ReportWindow {
    target: u32,
    started: Instant,
    spawned: u32,
    first_port: Option<u16>,
    last_port: u16,
}

/// Summary of a closed window.
#[derive(Debug, Clone)]
pub struct WindowReport {
    pub spawned: u32,
    pub first_port: u16,
    pub last_port: u16,
    pub elapsed: Duration,
}

impl ReportWindow {
    pub fn new(target: u32) -> Self {
        Self {
            target: target.max(1),
            started: Instant::now(),
            spawned: 0,
            first_port: None,
            last_port: 0,
        }
    }

    pub fn restart(&mut self) {
        self.started = Instant::now();
        self.spawned = 0;
        self.first_port = None;
    }

    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    /// Records one spawn aimed at `port`. Returns the window summary when
    /// this spawn filled it; the caller restarts the window afterwards.
    pub fn record(&mut self, port: u16) -> Option<WindowReport> {
        self.spawned += 1;
        self.first_port.get_or_insert(port);
        self.last_port = port;

        if self.spawned < self.target {
            return None;
        }
        Some(WindowReport {
            spawned: self.spawned,
            first_port: self.first_port.unwrap_or(port),
            last_port: self.last_port,
            elapsed: self.started.elapsed(),
        })
    }
}

pub fn log_report(
    report: &WindowReport,
    client: Option<IpAddr>,
    server: &str,
    live: usize,
    totals: StatsSnapshot,
) {
    let client = client.map_or_else(|| "<any>".to_string(), |ip| ip.to_string());
    info!(
        spawned = report.spawned,
        client = %client,
        server = %server,
        ports = %format!("{}-{}", report.first_port, report.last_port),
        elapsed = ?report.elapsed,
        live = live,
        started = totals.started,
        completed = totals.completed,
        dial_failures = totals.dial_failures,
        write_failures = totals.write_failures,
        read_failures = totals.read_failures,
        peer_closed = totals.peer_closed,
        "Spawn window closed"
    );
}
