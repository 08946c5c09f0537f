use std::fmt;

use crate::input::{InputEvent, InputFrame, Key, ButtonState};

/// Draw path used for the frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum RenderMode {
    /// A single textured quad; exercises the geometry path alone.
    TexturedQuad,
    /// Every entity drawn straight to the surface.
    Meshes,
    /// Entities drawn to an offscreen target, then composited on a quad.
    #[default]
    FrameBufferPass,
}

impl RenderMode {
    pub const ALL: [RenderMode; 3] = [Self::TexturedQuad, Self::Meshes, Self::FrameBufferPass];

    /// Digit keys `0`, `1` and `2` map to the three modes.
    pub fn from_key(key: Key) -> Option<Self> {
        match key {
            Key::Digit0 => Some(Self::TexturedQuad),
            Key::Digit1 => Some(Self::Meshes),
            Key::Digit2 => Some(Self::FrameBufferPass),
            _ => None,
        }
    }

    /// Applies this frame's mode key presses in arrival order; the last one wins.
    pub fn select(self, frame: &InputFrame) -> Self {
        frame
            .events
            .iter()
            .filter_map(|ev| match ev {
                InputEvent::Key { key, state: ButtonState::Pressed, repeat: false, .. } => {
                    Self::from_key(*key)
                }
                _ => None,
            })
            .last()
            .unwrap_or(self)
    }

    pub fn index(self) -> u32 {
        match self {
            Self::TexturedQuad => 0,
            Self::Meshes => 1,
            Self::FrameBufferPass => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::TexturedQuad => "textured quad",
            Self::Meshes => "direct mesh rendering",
            Self::FrameBufferPass => "framebuffer rendering",
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.index(), self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;

    fn press(key: Key, repeat: bool) -> InputEvent {
        InputEvent::Key {
            key,
            state: ButtonState::Pressed,
            modifiers: Modifiers::default(),
            code: 0,
            repeat,
        }
    }

    fn frame(events: Vec<InputEvent>) -> InputFrame {
        let mut f = InputFrame::default();
        for ev in events {
            f.push_event(ev);
        }
        f
    }

    #[test]
    fn digits_select_modes() {
        assert_eq!(RenderMode::from_key(Key::Digit0), Some(RenderMode::TexturedQuad));
        assert_eq!(RenderMode::from_key(Key::Digit1), Some(RenderMode::Meshes));
        assert_eq!(RenderMode::from_key(Key::Digit2), Some(RenderMode::FrameBufferPass));
        assert_eq!(RenderMode::from_key(Key::Digit3), None);
    }

    #[test]
    fn no_press_keeps_mode() {
        let f = frame(vec![press(Key::A, false)]);
        assert_eq!(RenderMode::Meshes.select(&f), RenderMode::Meshes);
    }

    #[test]
    fn last_press_wins() {
        let f = frame(vec![press(Key::Digit1, false), press(Key::Digit0, false)]);
        assert_eq!(RenderMode::FrameBufferPass.select(&f), RenderMode::TexturedQuad);
    }

    #[test]
    fn repeats_are_ignored() {
        let f = frame(vec![press(Key::Digit1, false), press(Key::Digit2, true)]);
        assert_eq!(RenderMode::TexturedQuad.select(&f), RenderMode::Meshes);
    }

    #[test]
    fn display_includes_index() {
        assert_eq!(RenderMode::Meshes.to_string(), "1: direct mesh rendering");
    }
}
