use crate::scene::camera::CameraInput;
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window};
use nalgebra::Point2;

/// Keys that trigger a one-shot action on press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    ToggleBackend,
    CycleSampler,
    CycleCullMode,
    ToggleTransparency,
    Screenshot,
}

impl Action {
    const BINDINGS: [(Key, Action); 5] = [
        (Key::R, Action::ToggleBackend),
        (Key::F, Action::CycleSampler),
        (Key::C, Action::CycleCullMode),
        (Key::T, Action::ToggleTransparency),
        (Key::P, Action::Screenshot),
    ];
}

pub const CONTROLS: &str = "\
Controls:
  W/S          move forward/back
  A/D          strafe left/right
  Q/E          move down/up
  Left/Right   narrow/widen field of view
  Right drag   look around
  Left drag    turn and move forward/back
  Both drag    move up/down
  R            toggle software/accelerated backend
  F            cycle sampler state
  C            cycle cull mode
  T            toggle transparency
  P            save screenshot
  Esc          quit";

/// `1.0`, `-1.0` or `0.0` for a pair of opposing keys.
fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

/// Samples the window's held keys and mouse into one frame of camera input.
pub fn camera_input(window: &Window) -> CameraInput {
    let down = |key| window.is_key_down(key);
    CameraInput {
        forward: axis(down(Key::W), down(Key::S)),
        strafe: axis(down(Key::D), down(Key::A)),
        vertical: axis(down(Key::E), down(Key::Q)),
        fov: axis(down(Key::Right), down(Key::Left)),
        pointer: window
            .get_mouse_pos(MouseMode::Pass)
            .map(|(x, y)| Point2::new(x, y)),
        look: window.get_mouse_down(MouseButton::Right),
        drag: window.get_mouse_down(MouseButton::Left),
    }
}

/// Actions whose key went down this frame, in binding order.
pub fn pressed_actions(window: &Window) -> Vec<Action> {
    Action::BINDINGS
        .iter()
        .filter(|(key, _)| window.is_key_pressed(*key, KeyRepeat::No))
        .map(|&(_, action)| action)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposing_keys_cancel() {
        assert_eq!(axis(true, false), 1.0);
        assert_eq!(axis(false, true), -1.0);
        assert_eq!(axis(true, true), 0.0);
        assert_eq!(axis(false, false), 0.0);
    }

    #[test]
    fn every_action_has_one_key() {
        for (i, (key, action)) in Action::BINDINGS.iter().enumerate() {
            for (other_key, other_action) in &Action::BINDINGS[i + 1..] {
                assert_ne!(*key as u32, *other_key as u32);
                assert_ne!(action, other_action);
            }
        }
    }
}
