//! Time slicing for long scene walks.
//!
//! SPDX-FileCopyrightText: 2025 `CyberDeco`
//!
//! SPDX-License-Identifier: MIT
//!
//! The exporter asks its [`DeferAgent`] after every completed node whether it
//! should hand control back to the caller. Agents never see partial nodes.

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Source of monotonic time.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall clock measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock for deterministic scheduling. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Decides when a walk should yield.
pub trait DeferAgent {
    /// Called when a quantum of work starts (scene start and every resume).
    fn begin_quantum(&mut self);

    /// Called after each completed node; `true` requests a yield.
    fn should_defer(&mut self) -> bool;
}

/// Never yields.
#[derive(Debug, Clone, Copy, Default)]
pub struct UninterruptedAgent;

impl DeferAgent for UninterruptedAgent {
    fn begin_quantum(&mut self) {}

    fn should_defer(&mut self) -> bool {
        false
    }
}

/// Yields once the elapsed time in the current quantum reaches the budget.
#[derive(Debug, Clone)]
pub struct TimeBudgetAgent<C: Clock = SystemClock> {
    clock: C,
    budget: Duration,
    quantum_start: Duration,
}

impl TimeBudgetAgent<SystemClock> {
    #[must_use]
    pub fn new(budget: Duration) -> Self {
        Self::with_clock(budget, SystemClock::new())
    }
}

impl<C: Clock> TimeBudgetAgent<C> {
    #[must_use]
    pub fn with_clock(budget: Duration, clock: C) -> Self {
        let quantum_start = clock.now();
        Self {
            clock,
            budget,
            quantum_start,
        }
    }

    #[must_use]
    pub fn budget(&self) -> Duration {
        self.budget
    }
}

impl<C: Clock> DeferAgent for TimeBudgetAgent<C> {
    fn begin_quantum(&mut self) {
        self.quantum_start = self.clock.now();
    }

    fn should_defer(&mut self) -> bool {
        self.clock.now().saturating_sub(self.quantum_start) >= self.budget
    }
}
