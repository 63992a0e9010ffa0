//! Abstract player input for one frame.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Buttons held during a frame.
    ///
    /// # Example
    ///
    /// ```
    /// use gustrun_core::input::InputState;
    ///
    /// let input = InputState::LEFT | InputState::JUMP;
    /// assert!((input.horizontal() + 1.0).abs() < f32::EPSILON);
    /// assert_eq!(input.mirrored(), InputState::RIGHT | InputState::JUMP);
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct InputState: u8 {
        /// Run left.
        const LEFT = 1 << 0;
        /// Run right.
        const RIGHT = 1 << 1;
        /// Jump (only acts while grounded).
        const JUMP = 1 << 2;
        /// Fire a projectile in the facing direction.
        const FIRE = 1 << 3;
    }
}

impl InputState {
    /// Horizontal axis in `{-1, 0, 1}`. Holding both directions cancels out.
    #[must_use]
    pub fn horizontal(self) -> f32 {
        let mut axis = 0.0;
        if self.contains(Self::LEFT) {
            axis -= 1.0;
        }
        if self.contains(Self::RIGHT) {
            axis += 1.0;
        }
        axis
    }

    /// Returns the same input with left and right swapped.
    #[must_use]
    pub fn mirrored(self) -> Self {
        let mut out = self - (Self::LEFT | Self::RIGHT);
        if self.contains(Self::LEFT) {
            out |= Self::RIGHT;
        }
        if self.contains(Self::RIGHT) {
            out |= Self::LEFT;
        }
        out
    }
}
