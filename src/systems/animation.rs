//! Animation systems.
//!
//! - [`select_animation_state`] picks the state an entity should show from
//!   its body motion and writes it into [`AnimationRequest`].
//! - [`animation_system`] advances every [`AnimationController`] by the tick
//!   delta, switching to the requested state first.
//!
//! # Animation Flow
//!
//! 1. Physics leaves velocity and `is_grounded` on the [`Body`]
//! 2. `select_animation_state` maps that motion to an [`AnimState`]
//! 3. `animation_system` feeds the request and the delta (in ms) to the controller
//! 4. The render pass asks the [`SpriteSystem`](crate::resources::spritesystem::SpriteSystem)
//!    for the cell of `(state, frame)`
//!
//! Entities without a [`Body`] keep whatever request game logic wrote.

use bevy_ecs::prelude::*;

use crate::components::animation::{AnimState, AnimationController, AnimationRequest};
use crate::components::body::Body;
use crate::components::spriteappearance::SpriteAppearance;
use crate::resources::worldtime::WorldTime;

/// Horizontal speed (px/s) above which a grounded entity runs.
pub const RUN_SPEED_THRESHOLD: f32 = 10.0;

/// State that matches a body's motion.
///
/// Airborne bodies jump while rising and fall otherwise; grounded ones run
/// above [`RUN_SPEED_THRESHOLD`] and sit below it.
pub fn state_for_motion(body: &Body) -> AnimState {
    if !body.is_grounded {
        if body.vy < 0.0 {
            AnimState::JumpUp
        } else {
            AnimState::FallDown
        }
    } else if body.vx.abs() > RUN_SPEED_THRESHOLD {
        AnimState::Run
    } else {
        AnimState::IdleSit
    }
}

/// Write the motion-derived state into each body's [`AnimationRequest`] and
/// turn its [`SpriteAppearance`] to face the direction of travel.
pub fn select_animation_state(
    mut query: Query<(&Body, &mut AnimationRequest, Option<&mut SpriteAppearance>)>,
) {
    for (body, mut request, appearance) in query.iter_mut() {
        let state = state_for_motion(body);
        if request.state != state {
            request.state = state;
        }
        if let Some(mut appearance) = appearance {
            let facing = appearance.facing.from_velocity(body.vx);
            if appearance.facing != facing {
                appearance.facing = facing;
            }
        }
    }
}

/// Advance animation playback.
///
/// Contract
/// - Reads [`WorldTime`] for the scaled delta (seconds, converted to ms).
/// - Switches to the entity's [`AnimationRequest`] when present.
/// - Mutates [`AnimationController`] frame, timer and state.
pub fn animation_system(
    mut query: Query<(&mut AnimationController, Option<&AnimationRequest>)>,
    time: Res<WorldTime>,
) {
    let delta_ms = time.delta_ms();
    for (mut controller, request) in query.iter_mut() {
        controller.update(delta_ms, request.map(|r| r.state.clone()));
    }
}
