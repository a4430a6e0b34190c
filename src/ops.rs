//! Periodic process metrics reporter.

use std::time::Duration;

use sysinfo::{Pid, System};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::metrics;

/// One sample of process resource usage.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpsSample {
    /// Resident memory in bytes.
    pub rss_bytes: u64,
    /// Virtual memory in bytes.
    pub virtual_bytes: u64,
    /// CPU usage since the previous refresh, in percent.
    pub cpu_percent: f32,
    /// Seconds since the process started.
    pub uptime_secs: u64,
    /// One-minute system load average.
    pub load_one: f64,
}

/// Samples the current process through `sysinfo`.
pub struct OpsSampler {
    system: System,
    pid: Pid,
}

impl OpsSampler {
    /// Sampler for the current process, if its pid can be resolved.
    pub fn current() -> Option<Self> {
        match sysinfo::get_current_pid() {
            Ok(pid) => Some(Self {
                system: System::new(),
                pid,
            }),
            Err(e) => {
                warn!(error = e, "cannot resolve current pid, process metrics disabled");
                None
            }
        }
    }

    /// Take a fresh sample. `None` if the process is not visible.
    pub fn sample(&mut self) -> Option<OpsSample> {
        if !self.system.refresh_process(self.pid) {
            return None;
        }
        let process = self.system.process(self.pid)?;

        Some(OpsSample {
            rss_bytes: process.memory(),
            virtual_bytes: process.virtual_memory(),
            cpu_percent: process.cpu_usage(),
            uptime_secs: process.run_time(),
            load_one: System::load_average().one,
        })
    }
}

impl OpsSample {
    /// Publish this sample as gauges.
    pub fn record(&self) {
        metrics::record_process(
            self.rss_bytes,
            self.virtual_bytes,
            self.cpu_percent,
            self.uptime_secs,
        );
        metrics::record_load_average(self.load_one);
    }
}

/// Sample process metrics every `every` until `shutdown` is cancelled.
pub async fn run_reporter(every: Duration, shutdown: CancellationToken) {
    let Some(mut sampler) = OpsSampler::current() else {
        return;
    };

    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                if let Some(sample) = sampler.sample() {
                    sample.record();
                    debug!(
                        rss_bytes = sample.rss_bytes,
                        cpu_percent = sample.cpu_percent,
                        uptime_secs = sample.uptime_secs,
                        load_one = sample.load_one,
                        "ops"
                    );
                }
            }
        }
    }

    info!("Ops reporter stopped");
}
