// Frame and scroll drivers for Starfield-3D
//
// Write ownership:
//   frame_tick  -> torus.rotation (x, y, z), moon.rotation.x        (additive)
//   scroll_tick -> moon.rotation (x, y, z), avatar.rotation (y, z)  (additive)
//                  camera.position (x, z), camera.rotation.y        (absolute)
// Both ticks add to moon.rotation, so neither may overwrite it.

use crate::error::Result;
use crate::showcase::Showcase;
use glam::Vec3;

/// Torus spin per frame
pub const TORUS_SPIN: Vec3 = Vec3::new(0.01, 0.005, 0.01);
/// Moon spin per frame (x only)
pub const MOON_FRAME_SPIN: f32 = 0.005;

/// Moon spin per scroll event
pub const MOON_SCROLL_SPIN: Vec3 = Vec3::new(0.05, 0.075, 0.05);
/// Avatar spin per scroll event (y and z)
pub const AVATAR_SCROLL_SPIN: Vec3 = Vec3::new(0.0, 0.01, 0.01);

/// Camera position.z per unit of scroll offset
pub const CAMERA_DOLLY: f32 = -0.01;
/// Camera position.x per unit of scroll offset
pub const CAMERA_TRUCK: f32 = -0.0002;
/// Camera rotation.y per unit of scroll offset
pub const CAMERA_YAW: f32 = -0.0002;

impl Showcase {
    /// Startup sequence: one scroll tick at the initial offset `top`, then the
    /// first render. Runs before any frame tick.
    pub fn start<F>(&mut self, top: f32, render: F) -> Result<()>
    where
        F: FnOnce(&Showcase) -> Result<()>,
    {
        self.scroll_tick(top);
        render(self)
    }

    /// One display refresh worth of animation. The caller renders afterwards.
    pub fn frame_tick(&mut self) {
        if let Some(torus) = self.scene.get_mut(self.handles.torus) {
            torus.transform.rotation += TORUS_SPIN;
        }
        if let Some(moon) = self.scene.get_mut(self.handles.moon) {
            moon.transform.rotation.x += MOON_FRAME_SPIN;
        }
    }

    /// Reacts to the page top sitting `top` logical pixels from the viewport top
    /// (zero or negative). Does not render.
    pub fn scroll_tick(&mut self, top: f32) {
        if let Some(moon) = self.scene.get_mut(self.handles.moon) {
            moon.transform.rotation += MOON_SCROLL_SPIN;
        }
        if let Some(avatar) = self.scene.get_mut(self.handles.avatar) {
            avatar.transform.rotation += AVATAR_SCROLL_SPIN;
        }

        let camera = &mut self.camera.transform;
        camera.position.z = top * CAMERA_DOLLY;
        camera.position.x = top * CAMERA_TRUCK;
        camera.rotation.y = top * CAMERA_YAW;
    }
}
