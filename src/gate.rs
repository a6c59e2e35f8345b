// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Throttles outbound requests.
//!
//! Reddit's API rules ask clients to wait a minimum amount of time between
//! requests. A [`RequestGate`] enforces that interval and also ensures that
//! only one request is in flight at a time, no matter how many tasks share
//! the same client.
//!
//! # Examples
//!
//! ```
//! use snoogate::gate::RequestGate;
//! use std::time::Duration;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let gate = RequestGate::new(Duration::from_millis(10));
//! let permit = gate.acquire().await;
//! // ... make a request ...
//! permit.release();
//! # }
//! ```

use log::{debug, trace};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// The delay Reddit asks clients to observe between requests.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(2);

#[derive(Debug, Default)]
struct Timestamps {
    last_access: Option<Instant>,
    last_release: Option<Instant>,
}

/// Serializes requests and spaces them at least a fixed interval apart.
///
/// Callers take turns on a fair mutex, so they are admitted roughly in the
/// order they arrived. The timestamps sit behind their own lock and can be
/// read without waiting for a turn.
#[derive(Debug)]
pub struct RequestGate {
    min_interval: Duration,
    turn: tokio::sync::Mutex<()>,
    times: Mutex<Timestamps>,
    in_flight: AtomicBool,
}

impl RequestGate {
    /// Creates a gate that spaces requests at least `min_interval` apart.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            turn: tokio::sync::Mutex::new(()),
            times: Mutex::new(Timestamps::default()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// The minimum time between the end of one request and the start of
    /// the next.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until no other request holds the gate and the minimum interval
    /// has passed since the last request completed.
    ///
    /// Acquisition cannot fail and never times out. The returned [`Permit`]
    /// keeps the gate closed until it is released or dropped.
    pub async fn acquire(&self) -> Permit<'_> {
        let turn = self.turn.lock().await;

        let last_release = self.times().last_release;
        if let Some(last_release) = last_release {
            let elapsed = last_release.elapsed();
            if elapsed < self.min_interval {
                let wait = self.min_interval - elapsed;
                debug!("throttling request for {wait:?}");
                sleep(wait).await;
            }
        }

        let now = Instant::now();
        self.times().last_access = Some(now);
        self.in_flight.store(true, Ordering::Release);
        trace!("gate acquired at {now:?}");
        Permit { gate: self, _turn: turn }
    }

    /// The time the most recent request was let through the gate, if any.
    pub fn last_access(&self) -> Option<Instant> {
        self.times().last_access
    }

    /// True while a request holds a permit. Callers still waiting out the
    /// interval do not count.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn times(&self) -> MutexGuard<'_, Timestamps> {
        self.times.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for RequestGate {
    fn default() -> Self {
        Self::new(DEFAULT_INTERVAL)
    }
}

/// Exclusive permission to make one request.
///
/// The gate reopens when the permit is dropped, and the next request is
/// timed from that moment.
#[must_use = "the gate reopens as soon as the permit is dropped"]
#[derive(Debug)]
pub struct Permit<'a> {
    gate: &'a RequestGate,
    _turn: tokio::sync::MutexGuard<'a, ()>,
}

impl Permit<'_> {
    /// Releases the gate for the next waiter.
    pub fn release(self) {
        drop(self)
    }
}

impl Drop for Permit<'_> {
    fn drop(&mut self) {
        let now = Instant::now();
        self.gate.times().last_release = Some(now);
        self.gate.in_flight.store(false, Ordering::Release);
        trace!("gate released at {now:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn it_lets_the_first_request_through_immediately() {
        let gate = RequestGate::default();
        let start = Instant::now();
        let _permit = gate.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn it_spaces_consecutive_requests() {
        let gate = RequestGate::default();

        let first = gate.acquire().await;
        let first_at = Instant::now();
        first.release();

        let second = gate.acquire().await;
        let second_at = Instant::now();
        second.release();

        assert!(second_at - first_at >= DEFAULT_INTERVAL);
    }

    #[tokio::test(start_paused = true)]
    async fn it_times_the_interval_from_the_end_of_the_last_request() {
        let gate = RequestGate::new(Duration::from_secs(2));

        let first = gate.acquire().await;
        sleep(Duration::from_secs(5)).await;
        let released_at = Instant::now();
        first.release();

        let _second = gate.acquire().await;
        assert!(Instant::now() - released_at >= Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn it_does_not_wait_if_the_interval_has_already_passed() {
        let gate = RequestGate::new(Duration::from_secs(2));
        gate.acquire().await.release();

        sleep(Duration::from_secs(3)).await;
        let start = Instant::now();
        let _permit = gate.acquire().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn it_records_the_last_access_time() {
        let gate = RequestGate::default();
        assert!(gate.last_access().is_none());

        let permit = gate.acquire().await;
        let acquired_at = Instant::now();
        permit.release();

        assert_eq!(gate.last_access(), Some(acquired_at));
    }

    #[tokio::test(start_paused = true)]
    async fn it_is_busy_while_a_permit_is_held() {
        let gate = RequestGate::default();
        assert!(!gate.is_busy());

        let permit = gate.acquire().await;
        assert!(gate.is_busy());

        permit.release();
        assert!(!gate.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn it_is_not_busy_while_a_caller_waits_out_the_interval() {
        let gate = Arc::new(RequestGate::new(Duration::from_secs(2)));
        gate.acquire().await.release();

        let waiter = {
            let gate = Arc::clone(&gate);
            tokio::spawn(async move { gate.acquire().await.release() })
        };
        sleep(Duration::from_secs(1)).await;
        assert!(!gate.is_busy());

        waiter.await.unwrap();
        assert!(!gate.is_busy());
    }

    #[tokio::test(start_paused = true)]
    async fn it_reads_the_last_access_time_without_waiting_for_a_turn() {
        let gate = Arc::new(RequestGate::new(Duration::from_secs(2)));
        let first = gate.acquire().await;
        let first_at = Instant::now();

        let waiters: Vec<_> = (0..3)
            .map(|_| {
                let gate = Arc::clone(&gate);
                tokio::spawn(async move { gate.acquire().await.release() })
            })
            .collect();
        tokio::task::yield_now().await;

        let start = Instant::now();
        assert_eq!(gate.last_access(), Some(first_at));
        assert!(gate.is_busy());
        assert_eq!(start.elapsed(), Duration::ZERO);

        first.release();
        for waiter in waiters {
            waiter.await.unwrap();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn it_reopens_when_a_permit_is_dropped() {
        let gate = RequestGate::new(Duration::from_millis(100));
        {
            let _permit = gate.acquire().await;
        }
        assert!(!gate.is_busy());
        let _permit = gate.acquire().await;
    }

    #[tokio::test(start_paused = true)]
    async fn it_serializes_concurrent_callers() {
        let gate = Arc::new(RequestGate::new(Duration::from_secs(2)));
        let spans = Arc::new(std::sync::Mutex::new(Vec::new()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let gate = Arc::clone(&gate);
                let spans = Arc::clone(&spans);
                tokio::spawn(async move {
                    let permit = gate.acquire().await;
                    let start = Instant::now();
                    sleep(Duration::from_millis(500)).await;
                    let end = Instant::now();
                    permit.release();
                    spans.lock().unwrap().push((start, end));
                })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap();
        }

        let mut spans = spans.lock().unwrap().clone();
        spans.sort();
        assert_eq!(spans.len(), 4);
        for pair in spans.windows(2) {
            let (_, prev_end) = pair[0];
            let (next_start, _) = pair[1];
            assert!(next_start >= prev_end, "requests overlapped");
            assert!(next_start - prev_end >= Duration::from_secs(2));
        }
    }
}
