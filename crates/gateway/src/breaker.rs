//! Per-analyzer circuit breakers (component C3).
//!
//! One [`CircuitBreaker`] guards one analyzer. State transitions and
//! the sliding failure window are protected by a `parking_lot::Mutex`
//! that is held only across the short bookkeeping in [`CircuitBreaker::admit`]
//! and [`CircuitBreaker::record`] — never across the outbound HTTP call
//! itself, so the registry never blocks the fan-out on a lock.

use mg_domain::config::BreakerConfig;
use mg_domain::trace::TraceEvent;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    pub fn label(self) -> &'static str {
        match self {
            BreakerState::Closed => "closed",
            BreakerState::Open => "open",
            BreakerState::HalfOpen => "half_open",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum CallOutcome {
    Success,
    Failure,
}

/// Admission receipt. Only [`CircuitBreaker::record`] can consume it,
/// which keeps callers from recording an outcome without first asking
/// for admission.
pub struct Ticket {
    is_probe: bool,
}

pub enum Admission {
    Admitted(Ticket),
    ShortCircuited,
}

/// Wraps an admitted [`Ticket`] so it is always recorded exactly once.
/// Callers that hold a ticket across an `.await` risk losing it to
/// cancellation (e.g. a surrounding `tokio::time::timeout`) before
/// `success()`/`failure()` ever runs; an unrecorded probe ticket would
/// leave the breaker stuck in `HalfOpen` forever. `Drop` treats an
/// unconsumed guard as a failure so cancellation can't leak an
/// admission.
pub struct TicketGuard<'a> {
    breaker: &'a CircuitBreaker,
    ticket: Option<Ticket>,
}

impl<'a> TicketGuard<'a> {
    pub fn success(mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.breaker.record(ticket, CallOutcome::Success);
        }
    }

    pub fn failure(mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.breaker.record(ticket, CallOutcome::Failure);
        }
    }
}

impl Drop for TicketGuard<'_> {
    fn drop(&mut self) {
        if let Some(ticket) = self.ticket.take() {
            self.breaker.record(ticket, CallOutcome::Failure);
        }
    }
}

struct Inner {
    state: BreakerState,
    window: VecDeque<bool>,
    opened_at: Option<Instant>,
    probe_in_flight: bool,
}

pub struct CircuitBreaker {
    name: String,
    config: BreakerConfig,
    inner: Mutex<Inner>,
}

impl CircuitBreaker {
    pub fn new(name: impl Into<String>, config: BreakerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            inner: Mutex::new(Inner {
                state: BreakerState::Closed,
                window: VecDeque::new(),
                opened_at: None,
                probe_in_flight: false,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Wraps an admitted ticket in a [`TicketGuard`] so the caller can
    /// hold it across `.await` points without risking a leaked
    /// admission if the surrounding future is cancelled.
    pub fn guard(&self, ticket: Ticket) -> TicketGuard<'_> {
        TicketGuard {
            breaker: self,
            ticket: Some(ticket),
        }
    }

    /// Requests permission to call the analyzer. Transitions `Open` to
    /// `HalfOpen` lazily, on the first `admit()` after the cooldown has
    /// elapsed — there is no background timer.
    pub fn admit(&self) -> Admission {
        let mut inner = self.inner.lock();
        match inner.state {
            BreakerState::Closed => Admission::Admitted(Ticket { is_probe: false }),
            BreakerState::Open => {
                let cooled_down = inner
                    .opened_at
                    .map(|t| t.elapsed() >= self.config.cooldown)
                    .unwrap_or(true);
                if cooled_down {
                    self.transition(&mut inner, BreakerState::HalfOpen);
                    inner.probe_in_flight = true;
                    Admission::Admitted(Ticket { is_probe: true })
                } else {
                    Admission::ShortCircuited
                }
            }
            BreakerState::HalfOpen => {
                if inner.probe_in_flight {
                    Admission::ShortCircuited
                } else {
                    inner.probe_in_flight = true;
                    Admission::Admitted(Ticket { is_probe: true })
                }
            }
        }
    }

    /// Records the outcome of an admitted call and applies transitions.
    pub fn record(&self, ticket: Ticket, outcome: CallOutcome) {
        let mut inner = self.inner.lock();
        let success = matches!(outcome, CallOutcome::Success);

        match inner.state {
            BreakerState::Closed => {
                push_window(&mut inner.window, success, self.config.window);
                if should_open(&inner.window, &self.config) {
                    inner.opened_at = Some(Instant::now());
                    self.transition(&mut inner, BreakerState::Open);
                }
            }
            BreakerState::HalfOpen => {
                debug_assert!(ticket.is_probe);
                inner.probe_in_flight = false;
                if success {
                    inner.window.clear();
                    self.transition(&mut inner, BreakerState::Closed);
                } else {
                    inner.opened_at = Some(Instant::now());
                    self.transition(&mut inner, BreakerState::Open);
                }
            }
            BreakerState::Open => {
                // A ticket admitted just before the state was flipped by a
                // racing caller; there is nothing useful left to update.
            }
        }
    }

    pub fn state(&self) -> BreakerState {
        self.inner.lock().state
    }

    fn transition(&self, inner: &mut Inner, to: BreakerState) {
        if inner.state == to {
            return;
        }
        TraceEvent::BreakerTransition {
            analyzer: self.name.clone(),
            from: inner.state.label().to_string(),
            to: to.label().to_string(),
        }
        .emit();
        inner.state = to;
    }
}

fn push_window(window: &mut VecDeque<bool>, success: bool, max_len: usize) {
    window.push_back(success);
    while window.len() > max_len {
        window.pop_front();
    }
}

fn should_open(window: &VecDeque<bool>, config: &BreakerConfig) -> bool {
    let failures = window.iter().filter(|s| !**s).count();
    let len = window.len();
    if failures >= config.failure_threshold as usize {
        return true;
    }
    if len >= config.minimum_samples {
        let ratio = failures as f64 / len as f64;
        if ratio > config.ratio_threshold {
            return true;
        }
    }
    false
}

/// Owns one breaker per configured analyzer. Shared across all requests
/// behind an `Arc`; each breaker synchronizes itself independently, so
/// there is no single registry-wide lock to contend on.
pub struct BreakerRegistry {
    breakers: HashMap<String, CircuitBreaker>,
}

impl BreakerRegistry {
    pub fn new(analyzer_names: impl IntoIterator<Item = String>, config: BreakerConfig) -> Self {
        let breakers = analyzer_names
            .into_iter()
            .map(|name| {
                let breaker = CircuitBreaker::new(name.clone(), config.clone());
                (name, breaker)
            })
            .collect();
        Self { breakers }
    }

    pub fn get(&self, name: &str) -> Option<&CircuitBreaker> {
        self.breakers.get(name)
    }

    /// Best-effort snapshot for `/health`. May be a few nanoseconds
    /// stale with respect to in-flight admit/record calls, which is an
    /// accepted tradeoff for an observability endpoint.
    pub fn snapshot(&self) -> HashMap<String, &'static str> {
        self.breakers
            .iter()
            .map(|(name, b)| (name.clone(), b.state().label()))
            .collect()
    }
}
