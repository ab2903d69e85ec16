//! Per-entity animation state.
//!
//! [`AnimationController`] tracks which [`AnimState`] an entity is showing,
//! which frame of it, and how long that frame has been on screen. The
//! [`animation_system`](crate::systems::animation::animation_system) advances
//! it every tick; [`AnimationRequest`] lets game logic ask for a new state.

use std::fmt;

use bevy_ecs::prelude::Component;
use serde::{Deserialize, Serialize};

/// Milliseconds per frame for the run cycle.
pub const ANIM_SPEED_RUN: f32 = 100.0;
/// Milliseconds per frame for idle poses.
pub const ANIM_SPEED_IDLE: f32 = 150.0;
/// Milliseconds per frame for every other state.
pub const ANIM_SPEED_DEFAULT: f32 = 150.0;

/// Number of frames in the logical run cycle (`run_1`..`run_3`).
pub const RUN_FRAME_COUNT: usize = 3;

/// Named animation state.
///
/// Known states are closed variants; anything else is kept verbatim in
/// [`AnimState::Unknown`] so imported configurations can use their own names
/// and lookups on them simply miss.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnimState {
    IdleSit,
    IdleSitFront,
    /// Logical run state, resolved to `Run1`..`Run3` by frame index.
    Run,
    Run1,
    Run2,
    Run3,
    JumpUp,
    FallDown,
    Crouch,
    DodgeRoll,
    /// NPC idle pose.
    Idle,
    Unknown(String),
}

/// States every pet configuration must map.
pub const REQUIRED_ANIMATIONS: [AnimState; 9] = [
    AnimState::IdleSit,
    AnimState::Run1,
    AnimState::Run2,
    AnimState::Run3,
    AnimState::JumpUp,
    AnimState::FallDown,
    AnimState::Crouch,
    AnimState::DodgeRoll,
    AnimState::IdleSitFront,
];

impl AnimState {
    pub fn as_str(&self) -> &str {
        match self {
            AnimState::IdleSit => "idle_sit",
            AnimState::IdleSitFront => "idle_sit_front",
            AnimState::Run => "run",
            AnimState::Run1 => "run_1",
            AnimState::Run2 => "run_2",
            AnimState::Run3 => "run_3",
            AnimState::JumpUp => "jump_up",
            AnimState::FallDown => "fall_down",
            AnimState::Crouch => "crouch",
            AnimState::DodgeRoll => "dodge_roll",
            AnimState::Idle => "idle",
            AnimState::Unknown(name) => name,
        }
    }

    /// Milliseconds each frame of this state stays on screen.
    pub fn speed_ms(&self) -> f32 {
        match self {
            AnimState::Run => ANIM_SPEED_RUN,
            AnimState::IdleSit | AnimState::IdleSitFront | AnimState::Idle => ANIM_SPEED_IDLE,
            _ => ANIM_SPEED_DEFAULT,
        }
    }

    /// Frames in this state's loop. Unknown states count as one frame.
    pub fn frame_count(&self) -> usize {
        match self {
            AnimState::Run => RUN_FRAME_COUNT,
            _ => 1,
        }
    }

    /// Cell state to look up for a logical state at a given frame.
    ///
    /// Only `Run` is expanded; every other state maps to itself.
    pub fn cell_for_frame(&self, frame_index: usize) -> AnimState {
        match self {
            AnimState::Run => match frame_index % RUN_FRAME_COUNT {
                0 => AnimState::Run1,
                1 => AnimState::Run2,
                _ => AnimState::Run3,
            },
            other => other.clone(),
        }
    }
}

impl From<&str> for AnimState {
    fn from(name: &str) -> Self {
        match name {
            "idle_sit" => AnimState::IdleSit,
            "idle_sit_front" => AnimState::IdleSitFront,
            "run" => AnimState::Run,
            "run_1" => AnimState::Run1,
            "run_2" => AnimState::Run2,
            "run_3" => AnimState::Run3,
            "jump_up" => AnimState::JumpUp,
            "fall_down" => AnimState::FallDown,
            "crouch" => AnimState::Crouch,
            "dodge_roll" => AnimState::DodgeRoll,
            "idle" => AnimState::Idle,
            other => AnimState::Unknown(other.to_string()),
        }
    }
}

impl From<String> for AnimState {
    fn from(name: String) -> Self {
        AnimState::from(name.as_str())
    }
}

impl From<AnimState> for String {
    fn from(state: AnimState) -> Self {
        match state {
            AnimState::Unknown(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for AnimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plain record of an [`AnimationController`], used for snapshots and clones.
///
/// Every field is optional on input; missing ones fall back to the initial
/// controller state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationSnapshot {
    #[serde(default)]
    pub anim_frame: usize,
    #[serde(default)]
    pub anim_timer: f32,
    #[serde(default = "default_state")]
    pub current_state: AnimState,
    #[serde(default)]
    pub previous_state: Option<AnimState>,
}

fn default_state() -> AnimState {
    AnimState::IdleSit
}

/// Frame timing and state tracking for one sprite-animated entity.
#[derive(Debug, Clone, PartialEq, Component)]
pub struct AnimationController {
    frame_index: usize,
    timer_ms: f32,
    current_state: AnimState,
    previous_state: Option<AnimState>,
}

impl Default for AnimationController {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationController {
    /// Fresh controller sitting idle on frame 0.
    pub fn new() -> Self {
        Self {
            frame_index: 0,
            timer_ms: 0.0,
            current_state: default_state(),
            previous_state: None,
        }
    }

    /// Fresh controller switched to `initial`.
    ///
    /// Switching away from `idle_sit` records it as the previous state, the
    /// same as a regular [`set_state`](Self::set_state).
    pub fn with_state(initial: impl Into<AnimState>) -> Self {
        let mut controller = Self::new();
        controller.set_state(initial.into(), true);
        controller
    }

    /// Advance the animation by `delta_ms`.
    ///
    /// A differing `new_state` is applied before the elapsed time, so the
    /// first frame of a new state starts counting from zero. When the timer
    /// reaches the state's speed it resets to zero and the frame steps
    /// forward, looping at the frame count. Single-frame states still reset
    /// the timer.
    pub fn update(&mut self, delta_ms: f32, new_state: Option<AnimState>) {
        if let Some(state) = new_state {
            if state != self.current_state {
                self.set_state(state, true);
            }
        }

        self.timer_ms += delta_ms;

        if self.timer_ms >= self.current_state.speed_ms() {
            self.timer_ms = 0.0;
            self.frame_index += 1;
            if self.frame_index >= self.current_state.frame_count() {
                self.frame_index = 0;
            }
        }
    }

    /// Switch to `state`. Re-setting the current state does nothing.
    pub fn set_state(&mut self, state: AnimState, reset_frame: bool) {
        if state == self.current_state {
            return;
        }
        let previous = std::mem::replace(&mut self.current_state, state);
        self.previous_state = Some(previous);
        if reset_frame {
            self.frame_index = 0;
            self.timer_ms = 0.0;
        }
    }

    pub fn current_frame(&self) -> usize {
        self.frame_index
    }

    pub fn current_state(&self) -> &AnimState {
        &self.current_state
    }

    pub fn previous_state(&self) -> Option<&AnimState> {
        self.previous_state.as_ref()
    }

    pub fn timer_ms(&self) -> f32 {
        self.timer_ms
    }

    /// Back to the freshly constructed state.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Force a frame, clamped to the current state's range.
    pub fn set_frame(&mut self, frame: usize) {
        let last = self.current_state.frame_count().saturating_sub(1);
        self.frame_index = frame.min(last);
    }

    /// True right after the loop wrapped back to frame 0.
    pub fn has_looped(&self) -> bool {
        self.frame_index == 0 && self.timer_ms < 50.0
    }

    /// Fraction of the whole loop played so far.
    pub fn progress(&self) -> f32 {
        let count = self.current_state.frame_count() as f32;
        let speed = self.current_state.speed_ms();
        self.frame_index as f32 / count + (self.timer_ms / speed) / count
    }

    pub fn snapshot(&self) -> AnimationSnapshot {
        AnimationSnapshot {
            anim_frame: self.frame_index,
            anim_timer: self.timer_ms,
            current_state: self.current_state.clone(),
            previous_state: self.previous_state.clone(),
        }
    }

    pub fn restore(&mut self, snapshot: &AnimationSnapshot) {
        self.frame_index = snapshot.anim_frame;
        self.timer_ms = snapshot.anim_timer;
        self.current_state = snapshot.current_state.clone();
        self.previous_state = snapshot.previous_state.clone();
    }

    pub fn from_snapshot(snapshot: &AnimationSnapshot) -> Self {
        let mut controller = Self::new();
        controller.restore(snapshot);
        controller
    }
}

/// State the entity wants to show this tick.
///
/// Written by [`select_animation_state`](crate::systems::animation::select_animation_state)
/// or by game logic; consumed by the animation system.
#[derive(Debug, Clone, PartialEq, Component)]
pub struct AnimationRequest {
    pub state: AnimState,
}

impl AnimationRequest {
    pub fn new(state: impl Into<AnimState>) -> Self {
        Self {
            state: state.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_controller_is_idle() {
        let c = AnimationController::new();
        assert_eq!(c.current_state(), &AnimState::IdleSit);
        assert_eq!(c.current_frame(), 0);
        assert_eq!(c.timer_ms(), 0.0);
        assert!(c.previous_state().is_none());
    }

    #[test]
    fn test_run_cycles_three_frames() {
        let mut c = AnimationController::with_state(AnimState::Run);
        let mut frames = vec![c.current_frame()];
        for _ in 0..3 {
            c.update(100.0, None);
            frames.push(c.current_frame());
        }
        assert_eq!(frames, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_single_frame_state_resets_timer_without_advancing() {
        let mut c = AnimationController::with_state(AnimState::JumpUp);
        c.update(100.0, None);
        assert_eq!(c.timer_ms(), 100.0);
        assert_eq!(c.current_frame(), 0);
        c.update(50.0, None);
        assert_eq!(c.timer_ms(), 0.0);
        assert_eq!(c.current_frame(), 0);
        for _ in 0..10 {
            c.update(75.0, None);
            assert_eq!(c.current_frame(), 0);
        }
    }

    #[test]
    fn test_state_change_applies_before_elapsed_time() {
        let mut c = AnimationController::with_state(AnimState::Run);
        c.update(100.0, None);
        c.update(60.0, None);
        assert_eq!(c.current_frame(), 1);

        c.update(40.0, Some(AnimState::Crouch));
        assert_eq!(c.current_state(), &AnimState::Crouch);
        assert_eq!(c.previous_state(), Some(&AnimState::Run));
        assert_eq!(c.current_frame(), 0);
        assert_eq!(c.timer_ms(), 40.0);
    }

    #[test]
    fn test_same_state_update_keeps_progress() {
        let mut c = AnimationController::with_state(AnimState::Run);
        c.update(100.0, Some(AnimState::Run));
        c.update(30.0, Some(AnimState::Run));
        assert_eq!(c.current_frame(), 1);
        assert_eq!(c.timer_ms(), 30.0);
    }

    #[test]
    fn test_redundant_set_state_is_noop() {
        let mut c = AnimationController::with_state(AnimState::Run);
        c.update(100.0, None);
        c.update(20.0, None);
        c.set_state(AnimState::Run, true);
        assert_eq!(c.current_frame(), 1);
        assert_eq!(c.timer_ms(), 20.0);
        assert_eq!(c.previous_state(), Some(&AnimState::IdleSit));
    }

    #[test]
    fn test_set_state_without_reset_keeps_frame() {
        let mut c = AnimationController::with_state(AnimState::Run);
        c.update(100.0, None);
        c.set_state(AnimState::FallDown, false);
        assert_eq!(c.current_frame(), 1);
    }

    #[test]
    fn test_unknown_state_defaults_to_single_frame_idle_speed() {
        let state = AnimState::from("swim");
        assert_eq!(state, AnimState::Unknown("swim".to_string()));
        assert_eq!(state.frame_count(), 1);
        assert_eq!(state.speed_ms(), ANIM_SPEED_DEFAULT);

        let mut c = AnimationController::with_state(state);
        c.update(149.0, None);
        assert_eq!(c.timer_ms(), 149.0);
        c.update(1.0, None);
        assert_eq!(c.timer_ms(), 0.0);
        assert_eq!(c.current_frame(), 0);
    }

    #[test]
    fn test_cell_for_frame_wraps_run() {
        assert_eq!(AnimState::Run.cell_for_frame(0), AnimState::Run1);
        assert_eq!(AnimState::Run.cell_for_frame(1), AnimState::Run2);
        assert_eq!(AnimState::Run.cell_for_frame(2), AnimState::Run3);
        assert_eq!(AnimState::Run.cell_for_frame(3), AnimState::Run1);
        assert_eq!(AnimState::Crouch.cell_for_frame(7), AnimState::Crouch);
    }

    #[test]
    fn test_set_frame_clamps() {
        let mut c = AnimationController::with_state(AnimState::Run);
        c.set_frame(10);
        assert_eq!(c.current_frame(), 2);
        c.set_state(AnimState::Crouch, true);
        c.set_frame(5);
        assert_eq!(c.current_frame(), 0);
    }

    #[test]
    fn test_progress_and_has_looped() {
        let mut c = AnimationController::with_state(AnimState::Run);
        assert!(c.has_looped());
        c.update(100.0, None);
        c.update(50.0, None);
        let expected = 1.0 / 3.0 + (50.0 / 100.0) / 3.0;
        assert!((c.progress() - expected).abs() < 1e-6);
        assert!(!c.has_looped());
    }

    #[test]
    fn test_snapshot_restores_independent_copy() {
        let mut c = AnimationController::with_state(AnimState::Run);
        c.update(100.0, None);
        c.update(42.0, None);

        let snap = c.snapshot();
        let mut copy = AnimationController::from_snapshot(&snap);
        assert_eq!(copy, c);

        copy.update(100.0, None);
        assert_ne!(copy.current_frame(), c.current_frame());
    }

    #[test]
    fn test_snapshot_json_defaults_missing_fields() {
        let snap: AnimationSnapshot = serde_json::from_str(r#"{"animFrame": 2}"#).unwrap();
        assert_eq!(snap.anim_frame, 2);
        assert_eq!(snap.anim_timer, 0.0);
        assert_eq!(snap.current_state, AnimState::IdleSit);
        assert_eq!(snap.previous_state, None);

        let json = serde_json::to_string(&AnimationController::with_state(AnimState::Run).snapshot())
            .unwrap();
        assert!(json.contains(r#""currentState":"run""#));
        assert!(json.contains(r#""previousState":"idle_sit""#));
    }

    #[test]
    fn test_reset_returns_to_initial() {
        let mut c = AnimationController::with_state(AnimState::DodgeRoll);
        c.update(10.0, None);
        c.reset();
        assert_eq!(c, AnimationController::new());
    }
}
