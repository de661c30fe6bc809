//! Gesture — click pattern detection on digital inputs.
//!
//! A digital input moves between three phases. Two deadline timers compete:
//! the long-click timer runs while the button is held, the double-click
//! timer runs after a short press. Timers are owned by the caller through
//! the [`Timers`] trait; the phase only remembers the id of the armed one,
//! so a firing whose id no longer matches is stale and gets ignored.
//!
//! ```text
//!            press / click           release
//!   Idle ─────────────────▶ PressHeld ────────▶ ReleaseWindow
//!    ▲                        │                   │   │
//!    │   long-click timer     │                   │   │ press / click, doubleclick
//!    ├──── longclick ◀────────┘                   │   │
//!    ├──── singleclick ◀── double-click timer ────┘   │
//!    └────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::alias::Alias;

/// How long a press must be held to count as a long click.
pub const LONG_CLICK_DELAY: Duration = Duration::from_millis(1000);

/// How long after a release a second press still counts as a double click.
pub const DOUBLE_CLICK_DELAY: Duration = Duration::from_millis(500);

/// Semantic events derived from press/release transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gesture {
    Click,
    DoubleClick,
    LongClick,
    SingleClick,
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Click => "click",
            Self::DoubleClick => "doubleclick",
            Self::LongClick => "longclick",
            Self::SingleClick => "singleclick",
        })
    }
}

/// What an armed timer is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    LongClick,
    DoubleClick,
    /// Delayed switch-off of a relay.
    RelayOff,
}

/// Unique handle of one armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Deadline timers, provided by the runtime.
///
/// When a timer elapses the runtime reports `(alias, kind, id)` back to the
/// owner of the circuit. Cancelling guarantees the firing is never reported,
/// or, if it already raced into the queue, that the id is no longer held by
/// the circuit.
pub trait Timers {
    fn arm(&mut self, alias: &Alias, kind: TimerKind, delay: Duration) -> TimerId;

    fn cancel(&mut self, timer: TimerId);
}

/// Where an input stands in the click pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GesturePhase {
    #[default]
    Idle,
    PressHeld {
        long_click: TimerId,
    },
    ReleaseWindow {
        double_click: TimerId,
    },
}

/// State of a digital input circuit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DigitalInput {
    pub pressed: bool,
    pub phase: GesturePhase,
}

impl DigitalInput {
    /// Store a new reading, returning `false` when it repeats the current one.
    pub fn update(&mut self, pressed: bool) -> bool {
        if self.pressed == pressed {
            return false;
        }
        self.pressed = pressed;
        true
    }

    /// Advance the click pattern for a press (`true`) or release (`false`).
    pub fn transition<T>(&mut self, pressed: bool, alias: &Alias, timers: &mut T) -> Vec<Gesture>
    where
        T: Timers + ?Sized,
    {
        if pressed {
            self.press(alias, timers)
        } else {
            self.release(alias, timers);
            Vec::new()
        }
    }

    fn press<T: Timers + ?Sized>(&mut self, alias: &Alias, timers: &mut T) -> Vec<Gesture> {
        match self.phase {
            GesturePhase::ReleaseWindow { double_click } => {
                timers.cancel(double_click);
                self.phase = GesturePhase::Idle;
                vec![Gesture::Click, Gesture::DoubleClick]
            }
            GesturePhase::PressHeld { long_click } => {
                timers.cancel(long_click);
                self.hold(alias, timers);
                vec![Gesture::Click]
            }
            GesturePhase::Idle => {
                self.hold(alias, timers);
                vec![Gesture::Click]
            }
        }
    }

    fn hold<T: Timers + ?Sized>(&mut self, alias: &Alias, timers: &mut T) {
        let long_click = timers.arm(alias, TimerKind::LongClick, LONG_CLICK_DELAY);
        self.phase = GesturePhase::PressHeld { long_click };
    }

    fn release<T: Timers + ?Sized>(&mut self, alias: &Alias, timers: &mut T) {
        if let GesturePhase::PressHeld { long_click } = self.phase {
            timers.cancel(long_click);
            let double_click = timers.arm(alias, TimerKind::DoubleClick, DOUBLE_CLICK_DELAY);
            self.phase = GesturePhase::ReleaseWindow { double_click };
        }
    }

    /// React to an elapsed timer. Ids that are no longer held are stale.
    pub fn on_timer(&mut self, kind: TimerKind, timer: TimerId) -> Option<Gesture> {
        match (self.phase, kind) {
            (GesturePhase::PressHeld { long_click }, TimerKind::LongClick)
                if long_click == timer =>
            {
                self.pressed = false;
                self.phase = GesturePhase::Idle;
                Some(Gesture::LongClick)
            }
            (GesturePhase::ReleaseWindow { double_click }, TimerKind::DoubleClick)
                if double_click == timer =>
            {
                self.phase = GesturePhase::Idle;
                Some(Gesture::SingleClick)
            }
            _ => None,
        }
    }
}
