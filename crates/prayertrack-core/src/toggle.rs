//! Drag-to-confirm toggle for marking the active prayer as performed.
//!
//! The gesture is reduced to a one-dimensional offset along a track: the
//! host reports the horizontal translation since the gesture started and
//! when the finger lifts. No UI framework types are involved.
//!
//! ```text
//! Resting(Left) --drag--> Dragging --release near right--> Committed
//!        ^                    |
//!        +---release early----+
//! ```
//!
//! With [`CommitRule::ReturnLeft`] reaching the right edge only arms the
//! toggle (`Resting(Right)`); dragging back to the left edge commits.

use serde::{Deserialize, Serialize};

use crate::period::Period;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ToggleState {
    Resting { side: Side },
    Dragging { origin: Side, offset: f64 },
    Committed,
}

/// Which gesture marks the prayer as performed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitRule {
    /// Releasing at the right edge commits.
    #[default]
    ReachRight,
    /// Releasing at the right edge arms; returning to the left edge commits.
    ReturnLeft,
}

/// What a released drag did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Ignored,
    SnappedBack,
    Armed,
    Completed,
}

/// Track dimensions in host units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackGeometry {
    pub track_length: f64,
    pub diameter: f64,
    /// Distance from an edge within which a release snaps to that edge.
    #[serde(default = "default_commit_threshold")]
    pub commit_threshold: f64,
}

fn default_commit_threshold() -> f64 {
    10.0
}

impl TrackGeometry {
    pub fn new(track_length: f64, diameter: f64) -> Self {
        Self {
            track_length,
            diameter,
            commit_threshold: default_commit_threshold(),
        }
    }

    /// Largest offset the knob can travel.
    pub fn max_offset(&self) -> f64 {
        (self.track_length - self.diameter).max(0.0)
    }
}

impl Default for TrackGeometry {
    fn default() -> Self {
        Self::new(300.0, 70.0)
    }
}

/// Framework-independent gesture callbacks.
pub trait DragSink {
    /// Horizontal translation since the gesture started.
    fn on_drag_delta(&mut self, dx: f64);

    fn on_drag_end(&mut self) -> DragOutcome;
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrayerToggle {
    state: ToggleState,
    offset: f64,
    completed: bool,
    locked: bool,
    rule: CommitRule,
    geometry: TrackGeometry,
}

impl PrayerToggle {
    pub fn new(geometry: TrackGeometry, rule: CommitRule) -> Self {
        Self {
            state: ToggleState::Resting { side: Side::Left },
            offset: 0.0,
            completed: false,
            locked: false,
            rule,
            geometry,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> ToggleState {
        self.state
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn locked(&self) -> bool {
        self.locked
    }

    pub fn rule(&self) -> CommitRule {
        self.rule
    }

    pub fn geometry(&self) -> TrackGeometry {
        self.geometry
    }

    /// Shown only during actionable periods until the prayer is marked.
    pub fn is_visible(&self, active: Period) -> bool {
        active.is_actionable() && !self.completed
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Resize the track. A resting or committed knob keeps its edge.
    pub fn set_geometry(&mut self, geometry: TrackGeometry) {
        self.geometry = geometry;
        self.offset = match self.state {
            ToggleState::Resting { side: Side::Left } => 0.0,
            ToggleState::Resting { side: Side::Right } => geometry.max_offset(),
            _ => self.offset.clamp(0.0, geometry.max_offset()),
        };
    }

    /// Move the knob for a gesture `delta` units from its start.
    ///
    /// The offset stays within `[0, track_length - toggle_diameter]` and
    /// cannot move backward past the edge the gesture started from.
    pub fn on_drag_changed(&mut self, delta: f64, track_length: f64, toggle_diameter: f64) {
        if self.locked || !delta.is_finite() {
            return;
        }
        let origin = match self.state {
            ToggleState::Resting { side } => side,
            ToggleState::Dragging { origin, .. } => origin,
            ToggleState::Committed => return,
        };
        let max = (track_length - toggle_diameter).max(0.0);
        let offset = match origin {
            Side::Left => delta.clamp(0.0, max),
            Side::Right => (max + delta).clamp(0.0, max),
        };
        self.offset = offset;
        self.state = ToggleState::Dragging { origin, offset };
    }

    /// Settle the knob after release: commit to the far edge when within the
    /// threshold of it, snap back otherwise.
    pub fn on_drag_ended(&mut self, track_length: f64, toggle_diameter: f64) -> DragOutcome {
        let (origin, offset) = match self.state {
            ToggleState::Dragging { origin, offset } if !self.locked => (origin, offset),
            _ => return DragOutcome::Ignored,
        };
        let max = (track_length - toggle_diameter).max(0.0);
        let threshold = self.geometry.commit_threshold;
        match origin {
            Side::Left if offset > max - threshold => match self.rule {
                CommitRule::ReachRight => self.commit(max),
                CommitRule::ReturnLeft => {
                    self.rest(Side::Right, max);
                    DragOutcome::Armed
                }
            },
            Side::Left => {
                self.rest(Side::Left, 0.0);
                DragOutcome::SnappedBack
            }
            Side::Right if offset < threshold => match self.rule {
                CommitRule::ReturnLeft => self.commit(0.0),
                CommitRule::ReachRight => {
                    self.rest(Side::Left, 0.0);
                    DragOutcome::SnappedBack
                }
            },
            Side::Right => {
                self.rest(Side::Right, max);
                DragOutcome::SnappedBack
            }
        }
    }

    /// Restore a completion recorded earlier in the same window.
    pub fn restore_completed(&mut self) {
        let edge = match self.rule {
            CommitRule::ReachRight => self.geometry.max_offset(),
            CommitRule::ReturnLeft => 0.0,
        };
        self.commit(edge);
    }

    /// Back to an unmarked, left-resting toggle. Called on every rollover.
    pub fn reset(&mut self) {
        self.state = ToggleState::Resting { side: Side::Left };
        self.offset = 0.0;
        self.completed = false;
        self.locked = false;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn rest(&mut self, side: Side, offset: f64) {
        self.state = ToggleState::Resting { side };
        self.offset = offset;
    }

    fn commit(&mut self, offset: f64) -> DragOutcome {
        self.state = ToggleState::Committed;
        self.offset = offset;
        self.completed = true;
        self.locked = true;
        DragOutcome::Completed
    }
}

impl Default for PrayerToggle {
    fn default() -> Self {
        Self::new(TrackGeometry::default(), CommitRule::default())
    }
}

impl DragSink for PrayerToggle {
    fn on_drag_delta(&mut self, dx: f64) {
        let g = self.geometry;
        self.on_drag_changed(dx, g.track_length, g.diameter);
    }

    fn on_drag_end(&mut self) -> DragOutcome {
        let g = self.geometry;
        self.on_drag_ended(g.track_length, g.diameter)
    }
}
