//! Directional input for the hole
//!
//! The platform layer feeds raw key names in; the simulation only ever sees a
//! ground-plane direction.

use glam::Vec2;

/// One of the four movement directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Away from the camera (-Z)
    Up,
    /// Toward the camera (+Z)
    Down,
    /// -X
    Left,
    /// +X
    Right,
}

impl Direction {
    /// Map a `KeyboardEvent.key` value to a direction (WASD and arrow keys)
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" => Some(Direction::Up),
            "ArrowDown" => Some(Direction::Down),
            "ArrowLeft" => Some(Direction::Left),
            "ArrowRight" => Some(Direction::Right),
            _ if key.len() == 1 => match key.to_ascii_lowercase().as_str() {
                "w" => Some(Direction::Up),
                "s" => Some(Direction::Down),
                "a" => Some(Direction::Left),
                "d" => Some(Direction::Right),
                _ => None,
            },
            _ => None,
        }
    }

    /// Unit vector on the ground plane, as (x, z)
    pub fn vector(self) -> Vec2 {
        match self {
            Direction::Up => Vec2::new(0.0, -1.0),
            Direction::Down => Vec2::new(0.0, 1.0),
            Direction::Left => Vec2::new(-1.0, 0.0),
            Direction::Right => Vec2::new(1.0, 0.0),
        }
    }

    fn bit(self) -> u8 {
        match self {
            Direction::Up => 1,
            Direction::Down => 2,
            Direction::Left => 4,
            Direction::Right => 8,
        }
    }
}

/// Arrow keys are tracked in the high nibble, letter keys (and direct
/// presses) in the low one, so `w` and `ArrowUp` release independently.
const ARROW_SHIFT: u8 = 4;

/// The set of directions currently held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirectionalInput {
    held: u8,
}

impl DirectionalInput {
    /// Input with the given directions held
    pub fn holding(directions: &[Direction]) -> Self {
        let mut input = Self::default();
        for &d in directions {
            input.press(d);
        }
        input
    }

    pub fn press(&mut self, direction: Direction) {
        self.held |= direction.bit();
    }

    /// Release a direction no matter which key is holding it
    pub fn release(&mut self, direction: Direction) {
        self.held &= !(direction.bit() | direction.bit() << ARROW_SHIFT);
    }

    /// Drop every held key (window blur, tab hidden)
    pub fn clear(&mut self) {
        self.held = 0;
    }

    pub fn is_held(&self, direction: Direction) -> bool {
        self.held & (direction.bit() | direction.bit() << ARROW_SHIFT) != 0
    }

    /// Handle a keydown/keyup by key name. Returns true if the key was a
    /// movement key.
    pub fn apply_key(&mut self, key: &str, pressed: bool) -> bool {
        let Some(direction) = Direction::from_key(key) else {
            return false;
        };
        let bit = if key.starts_with("Arrow") {
            direction.bit() << ARROW_SHIFT
        } else {
            direction.bit()
        };
        if pressed {
            self.held |= bit;
        } else {
            self.held &= !bit;
        }
        true
    }

    /// Normalized movement direction; zero when nothing (or only opposing
    /// keys) is held
    pub fn axis(&self) -> Vec2 {
        let mut axis = Vec2::ZERO;
        for d in [
            Direction::Up,
            Direction::Down,
            Direction::Left,
            Direction::Right,
        ] {
            if self.is_held(d) {
                axis += d.vector();
            }
        }
        axis.normalize_or_zero()
    }
}
