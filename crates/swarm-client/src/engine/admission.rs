//! The spawn loop.
//!
//! A single task owns the endpoint cycler and the report window. Each
//! iteration reserves a slot against the concurrency ceiling, picks the
//! next endpoint, launches a detached worker and sleeps a fixed pacing
//! delay. Every `new_flows_per_sec` spawns it logs a report and, if the
//! window took less than a second, sleeps out the rest of it.

use crate::engine::cycler::EndpointCycler;
use crate::engine::report::{log_report, ReportWindow};
use crate::engine::tracker::FlowTracker;
use crate::engine::worker::{run_flow, FlowOutcome};
use std::sync::Arc;
use std::time::Duration;
use swarm_common::Config;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// How long the loop waits when every slot is taken.
pub const SATURATED_BACKOFF: Duration = Duration::from_secs(1);

/// Minimum length of one reporting window.
pub const WINDOW_FLOOR: Duration = Duration::from_secs(1);

/// Spreads one second of spawns over three times the target count, so the
/// loop on its own runs ahead of the target and the window floor trims it.
pub fn pacing_delay(new_flows_per_sec: u32) -> Duration {
    Duration::from_secs(1) / new_flows_per_sec.max(1).saturating_mul(3)
}

pub struct AdmissionController {
    config: Arc<Config>,
    tracker: Arc<FlowTracker>,
    cycler: EndpointCycler,
    window: ReportWindow,
    pacing: Duration,
}

impl AdmissionController {
    pub fn new(config: Arc<Config>, tracker: Arc<FlowTracker>) -> Self {
        Self {
            cycler: EndpointCycler::from_config(&config),
            window: ReportWindow::new(config.load.new_flows_per_sec),
            pacing: pacing_delay(config.load.new_flows_per_sec),
            config,
            tracker,
        }
    }

    pub fn tracker(&self) -> &Arc<FlowTracker> {
        &self.tracker
    }

    /// Spawns counted in the current reporting window.
    pub fn window_spawned(&self) -> u32 {
        self.window.spawned()
    }

    /// Runs the spawn loop forever.
    pub async fn run(mut self) {
        info!(
            max_concurrent = self.config.max_concurrent,
            new_flows_per_sec = self.config.load.new_flows_per_sec,
            ports = %format!("{}-{}", self.config.load.min_port, self.config.load.max_port),
            "Spawn loop started"
        );
        loop {
            self.step().await;
        }
    }

    /// One iteration of the loop. Returns the worker's handle when a flow
    /// was launched, or `None` after backing off at the ceiling. Dropping
    /// the handle leaves the worker running.
    pub async fn step(&mut self) -> Option<JoinHandle<FlowOutcome>> {
        let Some(slot) = self.tracker.try_acquire(self.config.max_concurrent) else {
            debug!(live = self.tracker.live(), "At capacity, backing off");
            tokio::time::sleep(SATURATED_BACKOFF).await;
            self.window.restart();
            return None;
        };

        let advance = self.cycler.next();
        if advance.client_rotated || advance.server_rotated {
            debug!(
                client = ?advance.target.local,
                server = %advance.target.endpoint.ip,
                client_rotated = advance.client_rotated,
                server_rotated = advance.server_rotated,
                "Port range exhausted, rotating addresses"
            );
        }
        let port = advance.target.endpoint.port;

        let config = Arc::clone(&self.config);
        let handle = tokio::spawn(async move { run_flow(advance.target, &config.flow, slot).await });

        tokio::time::sleep(self.pacing).await;

        if let Some(report) = self.window.record(port) {
            log_report(
                &report,
                self.cycler.client_address(),
                self.cycler.server_address(),
                self.tracker.live(),
                self.tracker.stats.snapshot(),
            );
            if report.elapsed < WINDOW_FLOOR {
                tokio::time::sleep(WINDOW_FLOOR - report.elapsed).await;
            }
            self.window.restart();
        }

        Some(handle)
    }
}
