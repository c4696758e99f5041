// THEORY:
// The `UploadGate` is the decision heart of the engine: it converts the noisy
// per-frame occupancy verdict into a debounced, rate-limited "publish this
// frame" signal. Two pieces of state drive it:
//
//   - `last_upload`: the wall-clock instant of the most recent upload (seeded
//     with the process start, so the very first upload also waits out one
//     full cooldown),
//   - `consecutive_motion_frames`: how many qualifying Occupied frames have
//     been seen in a row since the streak last reset.
//
// The transition rules, in priority order:
//   1. An Unoccupied frame resets the streak. Debouncing demands
//      *consecutive* motion; a single quiet frame anywhere wipes progress.
//   2. An Occupied frame inside the cooldown window is ignored entirely; it
//      neither uploads nor counts toward the streak. The streak can only
//      accumulate once the rate limit has already cleared.
//   3. An Occupied frame past the cooldown increments the streak; when the
//      streak reaches the configured depth the gate fires, the streak resets
//      and the cooldown clock restarts at the frame's timestamp.
//
// The whole table lives in a pure function from (state, verdict, now) to
// (next state, decision) with no I/O, so every row is unit-testable on its
// own. The `UploadGate` struct is only a thin owner of the current state.
//
// The gate fires *decisions*, not uploads: whether the publish that follows
// succeeds or fails, the state has already advanced. A failed upload still
// consumes the debounce window (at-most-once-attempt, no retry queue).

use crate::core_modules::classifier::OccupancyVerdict;
use crate::core_modules::frame::Timestamp;
use chrono::Duration;

/// The two state variables the transition table runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateState {
    /// Instant of the last fired upload (process start before the first one).
    pub last_upload: Timestamp,
    /// Qualifying Occupied frames seen in a row since the last reset.
    pub consecutive_motion_frames: u32,
}

/// Per-frame output of the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadDecision {
    pub should_upload: bool,
}

/// Pure transition function for the gate state machine.
///
/// Precondition: `now` is monotonically non-decreasing across successive
/// calls for the same state lineage (frame capture order).
pub fn transition(
    state: GateState,
    verdict: OccupancyVerdict,
    now: Timestamp,
    min_upload_interval: Duration,
    min_motion_frames: u32,
) -> (GateState, UploadDecision) {
    let no_upload = UploadDecision {
        should_upload: false,
    };

    match verdict {
        OccupancyVerdict::Unoccupied => (
            GateState {
                consecutive_motion_frames: 0,
                ..state
            },
            no_upload,
        ),
        OccupancyVerdict::Occupied => {
            if now - state.last_upload < min_upload_interval {
                // Still cooling down: the frame does not count toward the
                // streak either.
                return (state, no_upload);
            }

            let streak = state.consecutive_motion_frames + 1;
            if streak >= min_motion_frames {
                (
                    GateState {
                        last_upload: now,
                        consecutive_motion_frames: 0,
                    },
                    UploadDecision {
                        should_upload: true,
                    },
                )
            } else {
                (
                    GateState {
                        consecutive_motion_frames: streak,
                        ..state
                    },
                    no_upload,
                )
            }
        }
    }
}

/// Owner of the gate state across the frame stream.
pub struct UploadGate {
    state: GateState,
    min_upload_interval: Duration,
    min_motion_frames: u32,
}

impl UploadGate {
    /// `started_at` seeds the cooldown clock; the first upload can fire no
    /// earlier than one full interval after it.
    pub fn new(
        min_upload_interval_seconds: i64,
        min_motion_frames: u32,
        started_at: Timestamp,
    ) -> Self {
        Self {
            state: GateState {
                last_upload: started_at,
                consecutive_motion_frames: 0,
            },
            min_upload_interval: Duration::seconds(min_upload_interval_seconds),
            min_motion_frames,
        }
    }

    pub fn evaluate(&mut self, verdict: OccupancyVerdict, now: Timestamp) -> UploadDecision {
        let (next, decision) = transition(
            self.state,
            verdict,
            now,
            self.min_upload_interval,
            self.min_motion_frames,
        );
        self.state = next;
        decision
    }

    pub fn state(&self) -> GateState {
        self.state
    }
}
