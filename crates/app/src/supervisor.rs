//! Connection supervisor state.
//!
//! Tracks the lifecycle of the controller connection: phase, idle watchdog
//! counter, and the dry-run flag used while resynchronising after a
//! reconnection. The bridge loop drives the transitions and performs the
//! IO they call for.

use std::time::Duration;

/// Interval between two watchdog ticks.
pub const WATCHDOG_PERIOD: Duration = Duration::from_secs(60 * 60);

/// Consecutive idle ticks after which the connection is reset.
pub const WATCHDOG_LIMIT: u32 = 24;

/// Delay before retrying a connect attempt that failed synchronously.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Disconnected,
    Connecting,
    Connected,
}

/// What a successful connection calls for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// First connection: enumerate and register every circuit.
    First,
    /// Reconnection: replay the device list in dry-run mode.
    Reconnection,
}

/// Outcome of one watchdog tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Watchdog {
    Quiet,
    /// Idle for too long: tear down and reconnect.
    Reset,
}

#[derive(Debug, Default)]
pub struct ConnectionState {
    phase: Phase,
    idle_ticks: u32,
    dry_run: bool,
    initialized: bool,
}

impl ConnectionState {
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.phase == Phase::Connected
    }

    #[must_use]
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    #[must_use]
    pub fn idle_ticks(&self) -> u32 {
        self.idle_ticks
    }

    pub fn connecting(&mut self) {
        self.phase = Phase::Connecting;
    }

    pub fn connected(&mut self) -> ConnectOutcome {
        self.phase = Phase::Connected;
        self.idle_ticks = 0;
        if self.initialized {
            ConnectOutcome::Reconnection
        } else {
            self.initialized = true;
            ConnectOutcome::First
        }
    }

    pub fn disconnected(&mut self) {
        self.phase = Phase::Disconnected;
    }

    /// A raw event went through: the link is alive.
    pub fn record_activity(&mut self) {
        self.idle_ticks = 0;
    }

    /// Count one watchdog period. Only counts while connected.
    pub fn tick(&mut self) -> Watchdog {
        if !self.is_connected() {
            return Watchdog::Quiet;
        }
        self.idle_ticks += 1;
        if self.idle_ticks >= WATCHDOG_LIMIT {
            self.idle_ticks = 0;
            Watchdog::Reset
        } else {
            Watchdog::Quiet
        }
    }

    pub fn begin_replay(&mut self) {
        self.dry_run = true;
    }

    pub fn end_replay(&mut self) {
        self.dry_run = false;
    }
}
