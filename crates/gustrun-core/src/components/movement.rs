use serde::{Deserialize, Serialize};

use crate::entity::{Component, ComponentContext};

use super::RenderComponent;

/// Movement tuning and facing of a controllable or patrolling entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementComponent {
    /// Run speed in m/s before effect multipliers.
    pub base_speed: f32,
    /// Upward speed in m/s applied by a jump.
    pub jump_speed: f32,
    /// `1.0` when facing right, `-1.0` when facing left.
    pub facing: f32,
    /// Seconds until the next shot is allowed.
    pub fire_cooldown: f32,
}

impl MovementComponent {
    /// Faces right with no cooldown pending.
    #[must_use]
    pub const fn new(base_speed: f32, jump_speed: f32) -> Self {
        Self {
            base_speed,
            jump_speed,
            facing: 1.0,
            fire_cooldown: 0.0,
        }
    }

    /// Turns toward the sign of `axis`; zero keeps the current facing.
    pub fn face(&mut self, axis: f32) {
        if axis > 0.0 {
            self.facing = 1.0;
        } else if axis < 0.0 {
            self.facing = -1.0;
        }
    }
}

impl Component for MovementComponent {
    fn update(&mut self, ctx: &mut ComponentContext<'_>, dt: f32) {
        self.fire_cooldown = (self.fire_cooldown - dt).max(0.0);
        if let Some(render) = ctx.sibling_mut::<RenderComponent>() {
            render.flip_x = self.facing < 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn face_ignores_zero_axis() {
        let mut movement = MovementComponent::new(6.0, 11.0);
        movement.face(-1.0);
        movement.face(0.0);
        assert!((movement.facing + 1.0).abs() < f32::EPSILON);
        movement.face(0.5);
        assert!((movement.facing - 1.0).abs() < f32::EPSILON);
    }
}
