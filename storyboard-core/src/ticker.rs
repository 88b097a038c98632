//! Periodic header updates.
//!
//! Clocks refresh every second. The date refreshes on a one-shot timer armed
//! for the exact next local midnight and re-armed after each fire, so a
//! skipped tick never skips a date change.

use crate::clock::{Clock, ClockReading, LocalZone};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Period of the clock refresh.
pub const CLOCK_PERIOD: Duration = Duration::from_secs(1);

/// An update for the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickEvent {
    Clock(ClockReading),
    Date(String),
}

/// Drives clock and date refreshes onto a channel.
pub struct Ticker {
    clock: Arc<dyn Clock>,
    zone: LocalZone,
    period: Duration,
}

impl Ticker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            zone: LocalZone::default(),
            period: CLOCK_PERIOD,
        }
    }

    /// Use a specific zone for the date line.
    pub fn with_zone(mut self, zone: LocalZone) -> Self {
        self.zone = zone;
        self
    }

    /// Change the clock refresh period.
    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    /// Spawn the ticker. It stops once the receiver is dropped.
    pub fn spawn(self) -> (mpsc::Receiver<TickEvent>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(16);
        let handle = tokio::spawn(self.run(tx));
        (rx, handle)
    }

    /// Run until the receiving side goes away.
    pub async fn run(self, tx: mpsc::Sender<TickEvent>) {
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut current_date = self.zone.long_date(self.clock.now());
        if tx.send(TickEvent::Date(current_date.clone())).await.is_err() {
            return;
        }

        let midnight = time::sleep(self.zone.until_next_midnight(self.clock.now()));
        tokio::pin!(midnight);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let reading = ClockReading::at(self.clock.now());
                    if tx.send(TickEvent::Clock(reading)).await.is_err() {
                        break;
                    }
                }
                () = &mut midnight => {
                    let now = self.clock.now();
                    let date = self.zone.long_date(now);
                    if date != current_date {
                        log::debug!("date rolled over to {date}");
                        current_date = date.clone();
                        if tx.send(TickEvent::Date(date)).await.is_err() {
                            break;
                        }
                    }
                    let wait = self.zone.until_next_midnight(now);
                    midnight.as_mut().reset(Instant::now() + wait);
                }
            }
        }
    }
}
