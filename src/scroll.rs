// Virtual page scrolling for Starfield-3D
//
// The window stands in for a tall page. The offset reported is the page top
// relative to the viewport top: 0 at rest, negative once scrolled down.

use winit::event::MouseScrollDelta;
use winit::keyboard::{KeyCode, PhysicalKey};

/// One unit of user scrolling, already normalised away from winit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollInput {
    /// Wheel notches, positive towards the page top
    Lines(f32),
    /// Logical pixels, positive towards the page top
    Pixels(f32),
    /// Whole viewports, positive towards the page top
    Pages(f32),
    Top,
    Bottom,
}

impl ScrollInput {
    /// Converts a wheel or touchpad event. Pixel deltas arrive in physical pixels.
    pub fn from_wheel(delta: MouseScrollDelta, scale_factor: f64) -> Self {
        match delta {
            MouseScrollDelta::LineDelta(_, y) => ScrollInput::Lines(y),
            MouseScrollDelta::PixelDelta(position) => {
                ScrollInput::Pixels((position.y / scale_factor) as f32)
            }
        }
    }

    /// Keys a browser would scroll the page with.
    pub fn from_key(key: PhysicalKey) -> Option<Self> {
        let PhysicalKey::Code(code) = key else {
            return None;
        };
        match code {
            KeyCode::ArrowUp => Some(ScrollInput::Lines(1.0)),
            KeyCode::ArrowDown => Some(ScrollInput::Lines(-1.0)),
            KeyCode::PageUp => Some(ScrollInput::Pages(1.0)),
            KeyCode::PageDown | KeyCode::Space => Some(ScrollInput::Pages(-1.0)),
            KeyCode::Home => Some(ScrollInput::Top),
            KeyCode::End => Some(ScrollInput::Bottom),
            _ => None,
        }
    }
}

/// Scroll position of a page taller than the window.
#[derive(Debug, Clone)]
pub struct PageScroll {
    top: f32,
    page_height: f32,
    viewport_height: f32,
    line_height: f32,
}

impl PageScroll {
    pub fn new(page_height: f32, viewport_height: f32, line_height: f32) -> Self {
        Self {
            top: 0.0,
            page_height,
            viewport_height,
            line_height,
        }
    }

    /// Current page top offset, always in `[-max_scroll, 0]`.
    pub fn top(&self) -> f32 {
        self.top
    }

    pub fn max_scroll(&self) -> f32 {
        (self.page_height - self.viewport_height).max(0.0)
    }

    /// A taller viewport can pull the page back down.
    pub fn set_viewport_height(&mut self, viewport_height: f32) {
        self.viewport_height = viewport_height;
        self.top = self.clamp(self.top);
    }

    /// Applies one input. Returns the new offset only if the page moved,
    /// mirroring a browser which fires no scroll event at the ends.
    pub fn apply(&mut self, input: ScrollInput) -> Option<f32> {
        let target = match input {
            ScrollInput::Lines(lines) => self.top + lines * self.line_height,
            ScrollInput::Pixels(pixels) => self.top + pixels,
            ScrollInput::Pages(pages) => self.top + pages * self.viewport_height,
            ScrollInput::Top => 0.0,
            ScrollInput::Bottom => -self.max_scroll(),
        };
        let target = self.clamp(target);
        if target == self.top {
            return None;
        }
        self.top = target;
        Some(target)
    }

    fn clamp(&self, top: f32) -> f32 {
        if top.is_nan() {
            return self.top;
        }
        top.clamp(-self.max_scroll(), 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    fn page() -> PageScroll {
        PageScroll::new(5000.0, 1000.0, 40.0)
    }

    #[test]
    fn starts_at_top() {
        assert_eq!(page().top(), 0.0);
        assert_eq!(page().max_scroll(), 4000.0);
    }

    #[test]
    fn scrolling_down_goes_negative() {
        let mut page = page();
        assert_eq!(page.apply(ScrollInput::Lines(-3.0)), Some(-120.0));
        assert_eq!(page.apply(ScrollInput::Pixels(-80.0)), Some(-200.0));
        assert_eq!(page.apply(ScrollInput::Pages(-1.0)), Some(-1200.0));
        assert_eq!(page.apply(ScrollInput::Lines(1.0)), Some(-1160.0));
    }

    #[test]
    fn no_event_when_pinned_at_either_end() {
        let mut page = page();
        assert_eq!(page.apply(ScrollInput::Lines(5.0)), None);
        assert_eq!(page.apply(ScrollInput::Top), None);
        assert_eq!(page.apply(ScrollInput::Bottom), Some(-4000.0));
        assert_eq!(page.apply(ScrollInput::Pages(-10.0)), None);
        assert_eq!(page.top(), -4000.0);
    }

    #[test]
    fn short_page_never_scrolls() {
        let mut page = PageScroll::new(500.0, 1000.0, 40.0);
        assert_eq!(page.apply(ScrollInput::Lines(-1.0)), None);
        assert_eq!(page.apply(ScrollInput::Bottom), None);
    }

    #[test]
    fn growing_viewport_reclamps() {
        let mut page = page();
        page.apply(ScrollInput::Bottom);
        page.set_viewport_height(2000.0);
        assert_eq!(page.top(), -3000.0);
    }

    #[test]
    fn wheel_pixels_are_converted_to_logical() {
        let delta = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -200.0));
        assert_eq!(ScrollInput::from_wheel(delta, 2.0), ScrollInput::Pixels(-100.0));
        let lines = MouseScrollDelta::LineDelta(0.0, -2.0);
        assert_eq!(ScrollInput::from_wheel(lines, 2.0), ScrollInput::Lines(-2.0));
    }

    #[test]
    fn scroll_keys() {
        let key = |code| ScrollInput::from_key(PhysicalKey::Code(code));
        assert_eq!(key(KeyCode::PageDown), Some(ScrollInput::Pages(-1.0)));
        assert_eq!(key(KeyCode::Home), Some(ScrollInput::Top));
        assert_eq!(key(KeyCode::KeyW), None);
    }
}
