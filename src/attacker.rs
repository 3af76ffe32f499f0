use crate::report::Report;

use std::future::Future;
use std::sync::{ Arc, atomic::{ AtomicBool, AtomicI64, AtomicU64, Ordering } };
use std::time::Duration;
use isahc::{ AsyncReadResponseExt, HttpClient };
use tokio::{ sync::Notify, time::{ sleep, Instant } };
use tracing::{ debug, warn };

/// What every attacker of one assault does: hit `target_url`, then wait
/// `inter_request_delay` (zero means no wait) before the next request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttackOrder {
    pub target_url: String,
    pub inter_request_delay: Duration,
}

impl AttackOrder {
    pub fn new(target_url: impl Into<String>, inter_request_delay: Duration) -> Self {
        Self {
            target_url: target_url.into(),
            inter_request_delay,
        }
    }
}

// Live counters, written only by the attack loop.
#[derive(Debug, Default)]
struct Counters {
    request_count: AtomicU64,
    error_count: AtomicU64,
    response_time_ms_total: AtomicI64,
}

impl Counters {
    fn record(&self, elapsed_ms: i64, failed: bool) {
        // request_count before error_count, so a snapshot never sees more errors than requests
        self.response_time_ms_total.fetch_add(elapsed_ms, Ordering::Release);
        self.request_count.fetch_add(1, Ordering::Release);
        if failed {
            self.error_count.fetch_add(1, Ordering::Release);
        }
    }

    fn snapshot(&self) -> Report {
        let error_count = self.error_count.load(Ordering::Acquire);
        let response_time_ms_total = self.response_time_ms_total.load(Ordering::Acquire);
        let request_count = self.request_count.load(Ordering::Acquire);
        Report { request_count, error_count, response_time_ms_total }
    }

    fn clear(&self) {
        self.request_count.store(0, Ordering::Release);
        self.error_count.store(0, Ordering::Release);
        self.response_time_ms_total.store(0, Ordering::Release);
    }
}

/// One unit of load: a request loop that runs until halted.
#[derive(Debug)]
pub struct Attacker {
    id: usize,
    running: Arc<AtomicBool>,
    wake: Arc<Notify>, // cuts the inter-request sleep short on halt
    counters: Arc<Counters>,
}

impl Attacker {
    /// Create an idle attacker with an empty report
    pub fn enlist(id: usize) -> Self {
        Self {
            id,
            running: Arc::new(AtomicBool::new(false)),
            wake: Arc::new(Notify::new()),
            counters: Arc::new(Counters::default()),
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Zero the report. Must not overlap with a running attack.
    pub fn clear_report(&self) {
        self.counters.clear();
    }

    /// Arm the attacker and return its request loop.
    ///
    /// The attacker is marked running as soon as this is called, so a
    /// `halt` issued before the future is first polled still stops it.
    /// `running` is checked at the top of every iteration and again before
    /// the inter-request sleep. `halt` wakes a sleeping loop, which then
    /// exits at the top without another request. An in-flight request is
    /// never interrupted, so one more request may complete after `halt`.
    pub fn attack(
        &self,
        order: Arc<AttackOrder>,
        client: HttpClient
    ) -> impl Future<Output = ()> + Send + 'static {
        self.running.store(true, Ordering::Release);

        let id = self.id;
        let running = Arc::clone(&self.running);
        let wake = Arc::clone(&self.wake);
        let counters = Arc::clone(&self.counters);

        async move {
            loop {
                if !running.load(Ordering::Acquire) {
                    debug!(attacker = id, "halted");
                    return;
                }

                let start = Instant::now();
                let response = client.get_async(order.target_url.as_str()).await;
                let elapsed_ms = start.elapsed().as_millis() as i64;

                let failed = match response {
                    Ok(mut res) => {
                        // drain the body so the connection can be reused
                        if let Err(err) = res.consume().await {
                            debug!(attacker = id, error = %err, "failed to drain response body");
                        }
                        res.status().as_u16() >= 400
                    }
                    Err(err) => {
                        warn!(attacker = id, url = %order.target_url, error = %err, "request failed");
                        true
                    }
                };
                counters.record(elapsed_ms, failed);

                if order.inter_request_delay.is_zero() {
                    continue;
                }

                // registered before the flag check so a halt in between is not missed
                let halted = wake.notified();
                tokio::pin!(halted);
                halted.as_mut().enable();

                if running.load(Ordering::Acquire) {
                    tokio::select! {
                        _ = sleep(order.inter_request_delay) => {}
                        _ = halted => { debug!(attacker = id, "woken from sleep by halt"); }
                    }
                }
            }
        }
    }

    /// Ask the attack loop to stop. Takes effect at the loop's next check,
    /// or right away if the loop is sleeping between requests.
    pub fn halt(&self) {
        self.running.store(false, Ordering::Release);
        self.wake.notify_waiters();
    }

    /// Copy of the current counters
    pub fn give_report(&self) -> Report {
        self.counters.snapshot()
    }
}
