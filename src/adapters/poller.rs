//! Sensor poll worker.
//!
//! Runs on its own thread so the blocking HTTP request never stalls the
//! control loop. Each attempt is stamped with the clock and published to
//! the [`EventQueue`]; failures are logged and published too, so the
//! control loop can count them, but they never touch the controller.
//!
//! The first poll happens immediately. Afterwards every attempt sleeps a
//! fixed interval before the next one, regardless of outcome.

use core::sync::atomic::{AtomicBool, Ordering};
use core::time::Duration;

use log::{info, warn};

use crate::app::model::Reading;
use crate::app::ports::{Clock, SensorPort};
use crate::events::{Event, EventQueue};

pub struct SensorPoller<S, C> {
    sensor: S,
    clock: C,
    interval: Duration,
    attempts: u32,
    failures: u32,
}

impl<S: SensorPort, C: Clock> SensorPoller<S, C> {
    pub fn new(sensor: S, clock: C, interval_ms: u64) -> Self {
        Self {
            sensor,
            clock,
            interval: Duration::from_millis(interval_ms),
            attempts: 0,
            failures: 0,
        }
    }

    /// One poll attempt, translated into a queue event.
    pub fn poll_once(&mut self) -> Event {
        self.attempts = self.attempts.wrapping_add(1);
        match self.sensor.poll() {
            Ok(measurement) => {
                let reading = Reading::new(measurement, self.clock.now_ms());
                info!(
                    "Sensor: {:.1}\u{00b0}C {:.1}%",
                    reading.temperature_c, reading.humidity_pct
                );
                Event::ReadingReceived(reading)
            }
            Err(e) => {
                self.failures = self.failures.wrapping_add(1);
                warn!("Sensor: poll failed: {} ({} failures)", e, self.failures);
                Event::PollFailed(e)
            }
        }
    }

    /// Poll once and publish the outcome. Returns `false` if the queue was full.
    pub fn poll_and_publish(&mut self, queue: &EventQueue) -> bool {
        let event = self.poll_once();
        let pushed = queue.push(event);
        if !pushed {
            warn!("Sensor: event queue full, outcome dropped");
        }
        pushed
    }

    /// Worker loop: poll, publish, sleep, until `stop` is set.
    pub fn run(mut self, queue: &EventQueue, stop: &AtomicBool) {
        info!("Sensor poller: every {}s", self.interval.as_secs());
        while !stop.load(Ordering::Acquire) {
            self.poll_and_publish(queue);
            std::thread::sleep(self.interval);
        }
        info!("Sensor poller: stopped after {} attempts", self.attempts);
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }
}
