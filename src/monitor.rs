use crate::config::WatchConfig;
use crate::market::MarketData;
use crate::sink::PresentationSink;
use crate::store::LevelStore;
use chrono::{DateTime, Timelike, Utc};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{info, warn};

/// Poll cadence while waiting for the session to open
const WAITING_POLL: Duration = Duration::from_secs(1);

/// Wall-clock seam so session gating and alert pacing stay testable
pub trait Clock {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Production clock
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Live monitor: watches current prices against the stored levels during
/// session hours and raises throttled proximity alerts.
pub struct Monitor<'a> {
    market: &'a dyn MarketData,
    store: &'a LevelStore,
    config: &'a WatchConfig,
    last_alert: Option<DateTime<Utc>>,
}

impl<'a> Monitor<'a> {
    pub fn new(
        market: &'a dyn MarketData,
        store: &'a LevelStore,
        config: &'a WatchConfig,
    ) -> Self {
        Self {
            market,
            store,
            config,
            last_alert: None,
        }
    }

    /// Doze until the session opens, then tick until it closes or the sink
    /// goes away.
    pub fn run(&mut self, sink: &mut dyn PresentationSink, clock: &dyn Clock) {
        while sink.is_open() && !self.session_open_now(clock) {
            std::thread::sleep(WAITING_POLL);
        }
        if !sink.is_open() {
            info!("Sink closed before the session opened");
            return;
        }

        info!(
            "Session open; monitoring {} instrument(s)",
            self.store.instruments().len()
        );

        while sink.is_open() && self.session_open_now(clock) {
            self.tick(sink, clock);
            std::thread::sleep(sink.frame_interval());
        }

        info!("Monitor stopped");
    }

    /// One pass over every stored instrument: refresh the quote panel, flag
    /// levels inside the proximity band, alert if the cooldown allows.
    fn tick(&mut self, sink: &mut dyn PresentationSink, clock: &dyn Clock) {
        let now = clock.now_utc();
        let mut quotes = Vec::new();
        let mut active = BTreeSet::new();

        for instrument in self.store.instruments() {
            let price = match self.market.current_price(&instrument) {
                Ok(price) => price,
                Err(e) => {
                    warn!("QUOTE failed: {}", e);
                    continue;
                }
            };

            quotes.push(format!(
                "[{}] price: {:.2} delta: {:.2} limit: {:.2}",
                instrument,
                price,
                price * self.config.price_deviation,
                price * self.config.price_limit
            ));

            if let Some(snapshot) = self.store.snapshot(&instrument) {
                for levels in snapshot.values() {
                    for level in levels {
                        if (level.price - price).abs() / price <= self.config.price_deviation {
                            active.insert(format!("[{}] {}", instrument, level.format_at(now)));
                        }
                    }
                }
            }
        }

        // Highest lines first; identical lines from different frames collapse
        let level_text = active.iter().rev().cloned().collect::<Vec<_>>().join("\n");
        sink.draw_levels(&level_text);
        sink.draw_quotes(&quotes.join("\n"));

        if should_alert(self.last_alert, now, !active.is_empty(), self.cooldown()) {
            self.last_alert = Some(now);
            info!("ALERT {} level(s) in range", active.len());
            sink.raise_alert();
        }
    }

    fn session_open_now(&self, clock: &dyn Clock) -> bool {
        let local = clock.now_utc().with_timezone(&self.config.session_tz);
        self.config.is_session_open(local.hour(), local.minute())
    }

    fn cooldown(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.config.alert_cooldown_secs as i64)
    }
}

/// An alert fires on the first qualifying tick and then again only once the
/// cooldown has fully elapsed.
fn should_alert(
    last_alert: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    any_active: bool,
    cooldown: chrono::Duration,
) -> bool {
    if !any_active {
        return false;
    }
    match last_alert {
        None => true,
        Some(last) => now - last >= cooldown,
    }
}
