use crate::attacker::{ AttackOrder, Attacker };
use crate::config::AttackConfig;
use crate::error::{ Error, Result };
use crate::report::{ Report, Summary };

use std::sync::Arc;
use std::time::Duration;
use isahc::{ HttpClient, HttpClientBuilder, config::Configurable };
use tokio::{ sync::Notify, runtime::{ Builder, Runtime }, task::JoinHandle, time::{ sleep, Instant } };
use tracing::{ debug, info, warn };

/// Ends a running assault before its time span elapses.
///
/// Only the assault in progress is affected: a stop left over from an
/// earlier assault, or issued between two, is discarded when the next one
/// starts.
#[derive(Debug, Clone)]
pub struct StopHandle {
    notify: Arc<Notify>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.notify.notify_one();
    }
}

/// Owns a fixed pool of attackers and runs assaults with it.
#[derive(Debug)]
pub struct Commander {
    attackers: Vec<Attacker>,
    client: HttpClient,
    runtime: Runtime,
    stop: Arc<Notify>,
    last_reports: Vec<Report>, // snapshot taken at halt
}

impl Commander {
    /*------------------==| Public Functions |==-------------------------*/
    /// Enlist `attacker_count` attackers with default settings
    ///
    /// # Panics
    ///
    /// The commander owns a tokio runtime, so dropping it from inside an
    /// async context panics. The same holds for every constructor.
    pub fn new(attacker_count: usize) -> Result<Self> {
        Self::with_config(AttackConfig {
            attackers: attacker_count,
            ..AttackConfig::default()
        })
    }

    /// Enlist attackers and build the HTTP client from `config`
    pub fn with_config(config: AttackConfig) -> Result<Self> {
        let mut builder = HttpClientBuilder::new();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(connect_timeout) = config.connect_timeout {
            builder = builder.connect_timeout(connect_timeout);
        }
        let client = builder.build()?;

        Self::with_client(config, client)
    }

    /// Enlist attackers that share the given client; its timeouts apply and
    /// those in `config` are ignored.
    pub fn with_client(config: AttackConfig, client: HttpClient) -> Result<Self> {
        if config.attackers == 0 {
            return Err(Error::NoAttackers);
        }

        let runtime = Builder::new_multi_thread()
            .worker_threads(config.threads.max(1))
            .enable_all()
            .build()?;

        Ok(Self {
            attackers: (0..config.attackers).map(Attacker::enlist).collect(),
            client,
            runtime,
            stop: Arc::new(Notify::new()),
            last_reports: vec![Report::default(); config.attackers],
        })
    }

    pub fn attackers(&self) -> &[Attacker] {
        &self.attackers
    }

    /// Per-attacker reports of the last assault, as read at halt.
    ///
    /// These are exactly the reports its [`Summary`] was reduced from;
    /// requests that finished after halt are not included.
    pub fn reports(&self) -> Vec<Report> {
        self.last_reports.clone()
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle { notify: Arc::clone(&self.stop) }
    }

    /// Attack `target_url` with every attacker for `time_span`, then halt
    /// them and summarize.
    ///
    /// An empty `attack_unit_rate` means no delay between requests. Both
    /// durations are parsed before any attacker starts; a bad one is
    /// returned as an error and nothing is sent.
    ///
    /// # Panics
    ///
    /// Blocks on the commander's own runtime, so it panics when called
    /// from inside an async context.
    pub fn assault(
        &mut self,
        target_url: &str,
        attack_unit_rate: &str,
        time_span: &str
    ) -> Result<Summary> {
        let delay = parse_attack_unit_rate(attack_unit_rate)?;
        let time_span = parse_time_span(time_span)?;

        Ok(self.run(AttackOrder::new(target_url, delay), Some(time_span)))
    }

    /// Like [`Commander::assault`] without a time span: runs until the
    /// [`StopHandle`] fires.
    ///
    /// # Panics
    ///
    /// Same as [`Commander::assault`].
    pub fn siege(&mut self, target_url: &str, attack_unit_rate: &str) -> Result<Summary> {
        let delay = parse_attack_unit_rate(attack_unit_rate)?;

        Ok(self.run(AttackOrder::new(target_url, delay), None))
    }

    /*-------------------==| Private/Helpers |==----------------------- */

    fn run(&mut self, order: AttackOrder, time_span: Option<Duration>) -> Summary {
        for attacker in &self.attackers {
            attacker.clear_report();
        }

        info!(
            target_url = %order.target_url,
            attackers = self.attackers.len(),
            delay = ?order.inter_request_delay,
            time_span = ?time_span,
            "assault started"
        );

        let attackers = &self.attackers;
        let client = &self.client;
        let stop = &self.stop;
        let order = Arc::new(order);

        let (summary, reports) = self.runtime.block_on(async move {
            // stale stop requests are dropped before anything is launched
            tokio::select! {
                biased;
                _ = stop.notified() => { debug!("discarded a stop request left from an earlier assault"); }
                _ = std::future::ready(()) => {}
            }

            let handles: Vec<JoinHandle<()>> = attackers
                .iter()
                .map(|attacker| tokio::spawn(attacker.attack(Arc::clone(&order), client.clone())))
                .collect();
            let start = Instant::now();

            match time_span {
                Some(span) => {
                    tokio::select! {
                        _ = sleep(span) => {}
                        _ = stop.notified() => { info!("stop requested, ending assault early"); }
                    }
                }
                None => stop.notified().await,
            }

            let elapsed = start.elapsed();
            Self::end_assault(attackers);

            // counters are read right after halt; attackers still finishing a request are not waited for
            let reports: Vec<Report> = attackers.iter().map(Attacker::give_report).collect();
            let summary = Summary::reduce(&reports, elapsed);
            info!(
                elapsed = ?elapsed,
                requests = summary.total_requests,
                errors = summary.total_errors,
                "assault halted"
            );

            // let the pool go quiet before the next assault clears it
            for handle in handles {
                if let Err(err) = handle.await {
                    warn!(error = %err, "attacker task did not finish cleanly");
                }
            }

            (summary, reports)
        });

        self.last_reports = reports;
        summary
    }

    fn end_assault(attackers: &[Attacker]) {
        for attacker in attackers {
            attacker.halt();
        }
    }
}

// Empty rate means no delay
fn parse_attack_unit_rate(rate: &str) -> Result<Duration> {
    if rate.trim().is_empty() {
        return Ok(Duration::ZERO);
    }
    humantime::parse_duration(rate.trim()).map_err(|source| Error::InvalidAttackUnitRate {
        value: rate.to_string(),
        source,
    })
}

fn parse_time_span(span: &str) -> Result<Duration> {
    humantime::parse_duration(span.trim()).map_err(|source| Error::InvalidTimeSpan {
        value: span.to_string(),
        source,
    })
}
