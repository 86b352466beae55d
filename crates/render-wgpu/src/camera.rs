//! Damped orbit camera.
//!
//! The camera rides a sphere around a focus point. Pointer input moves the
//! *goal* spherical coordinates; [`OrbitCamera::update`] eases the live
//! coordinates toward the goals with an exponential decay, so motion keeps
//! gliding briefly after the pointer stops regardless of frame rate.

use glam::{Mat4, Vec3};

/// Pitch is kept just shy of the poles so the view direction never becomes
/// parallel to the up vector.
const PITCH_LIMIT: f32 = std::f32::consts::FRAC_PI_2 - 0.02;

/// Orbit camera with smoothed (damped) motion.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    pub aspect: f32,
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
    /// Decay rate for the easing, in 1/seconds. Higher is snappier.
    pub smoothing: f32,
    pub rotate_speed: f32,
    pub pan_speed: f32,
    pub zoom_speed: f32,
    pub min_radius: f32,
    pub max_radius: f32,
    yaw: f32,
    pitch: f32,
    radius: f32,
    focus: Vec3,
    yaw_goal: f32,
    pitch_goal: f32,
    radius_goal: f32,
    focus_goal: Vec3,
    home_yaw: f32,
    home_pitch: f32,
    home_radius: f32,
    home_focus: Vec3,
}

impl OrbitCamera {
    /// Camera parked at `eye`, orbiting `focus`.
    pub fn from_eye(eye: Vec3, focus: Vec3, aspect: f32) -> Self {
        let offset = eye - focus;
        let radius = offset.length().max(1e-4);
        let pitch = (offset.y / radius).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);
        Self {
            aspect,
            fov_y: 75.0_f32.to_radians(),
            near: 0.1,
            far: 100.0,
            smoothing: 12.0,
            rotate_speed: 0.005,
            pan_speed: 0.001,
            zoom_speed: 0.1,
            min_radius: 0.5,
            max_radius: 50.0,
            yaw,
            pitch,
            radius,
            focus,
            yaw_goal: yaw,
            pitch_goal: pitch,
            radius_goal: radius,
            focus_goal: focus,
            home_yaw: yaw,
            home_pitch: pitch,
            home_radius: radius,
            home_focus: focus,
        }
    }

    /// Standard viewpoint: slightly above and to the right of the scene,
    /// looking at the origin.
    pub fn new(aspect: f32) -> Self {
        Self::from_eye(Vec3::new(1.0, 1.0, 2.0), Vec3::ZERO, aspect)
    }

    /// Apply a pointer drag, in pixels, to the orbit angles.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        self.yaw_goal -= dx * self.rotate_speed;
        self.pitch_goal =
            (self.pitch_goal - dy * self.rotate_speed).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Slide the focus point across the current view plane.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let right = Vec3::new(cos_yaw, 0.0, -sin_yaw);
        let forward = self.focus - self.position();
        let up = right.cross(forward).normalize_or_zero();
        let step = self.pan_speed * self.radius;
        self.focus_goal += right * (-dx * step) + up * (-dy * step);
    }

    /// Dolly in or out. Positive `amount` moves the camera closer.
    pub fn zoom(&mut self, amount: f32) {
        let factor = 1.0 - amount * self.zoom_speed;
        self.radius_goal =
            (self.radius_goal * factor.max(0.01)).clamp(self.min_radius, self.max_radius);
    }

    /// Advance the easing by `dt` seconds.
    pub fn update(&mut self, dt: f32) {
        let t = 1.0 - (-self.smoothing * dt.max(0.0)).exp();
        self.yaw += (self.yaw_goal - self.yaw) * t;
        self.pitch += (self.pitch_goal - self.pitch) * t;
        self.radius += (self.radius_goal - self.radius) * t;
        self.focus += (self.focus_goal - self.focus) * t;
    }

    /// Snap back to the viewpoint the camera was constructed with.
    pub fn reset(&mut self) {
        self.yaw_goal = self.home_yaw;
        self.pitch_goal = self.home_pitch;
        self.radius_goal = self.home_radius;
        self.focus_goal = self.home_focus;
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Current camera position in world space.
    pub fn position(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.focus
            + self.radius * Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw)
    }

    pub fn focus(&self) -> Vec3 {
        self.focus
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.focus, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_viewpoint_matches_eye() {
        let camera = OrbitCamera::new(16.0 / 9.0);
        let pos = camera.position();
        assert!((pos - Vec3::new(1.0, 1.0, 2.0)).length() < 1e-4);

        let vp = camera.view_projection();
        assert!(!vp.to_cols_array().iter().any(|v| v.is_nan()));
    }

    #[test]
    fn update_eases_toward_goal() {
        let mut camera = OrbitCamera::new(1.0);
        let start = camera.position();
        camera.rotate(200.0, 0.0);

        camera.update(1.0 / 60.0);
        let after_one = camera.position();
        assert!((after_one - start).length() > 1e-4, "camera should start moving");

        for _ in 0..600 {
            camera.update(1.0 / 60.0);
        }
        let settled = camera.position();
        camera.update(1.0 / 60.0);
        assert!((camera.position() - settled).length() < 1e-4, "camera should settle");
    }

    #[test]
    fn easing_is_frame_rate_independent() {
        let mut coarse = OrbitCamera::new(1.0);
        let mut fine = coarse.clone();
        coarse.rotate(150.0, 40.0);
        fine.rotate(150.0, 40.0);

        coarse.update(0.1);
        fine.update(0.05);
        fine.update(0.05);

        assert!((coarse.position() - fine.position()).length() < 1e-3);
    }

    #[test]
    fn pitch_stays_off_the_poles() {
        let mut camera = OrbitCamera::new(1.0);
        camera.rotate(0.0, -1e6);
        for _ in 0..1000 {
            camera.update(1.0 / 60.0);
        }
        assert!(camera.pitch <= PITCH_LIMIT + 1e-6);
        let vp = camera.view_projection();
        assert!(!vp.to_cols_array().iter().any(|v| v.is_nan()));
    }

    #[test]
    fn zoom_respects_radius_limits() {
        let mut camera = OrbitCamera::new(1.0);
        for _ in 0..500 {
            camera.zoom(10.0);
        }
        assert!(camera.radius_goal >= camera.min_radius);

        for _ in 0..500 {
            camera.zoom(-10.0);
        }
        assert!(camera.radius_goal <= camera.max_radius);
    }

    #[test]
    fn reset_returns_home_after_wandering() {
        let mut camera = OrbitCamera::new(1.0);
        let home = camera.position();
        camera.rotate(300.0, -120.0);
        camera.pan(50.0, 30.0);
        camera.zoom(-3.0);
        for _ in 0..300 {
            camera.update(1.0 / 60.0);
        }
        assert!((camera.position() - home).length() > 0.1);

        camera.reset();
        for _ in 0..600 {
            camera.update(1.0 / 60.0);
        }
        assert!((camera.position() - home).length() < 1e-3);
    }

    #[test]
    fn zero_height_resize_keeps_aspect() {
        let mut camera = OrbitCamera::new(2.0);
        camera.set_aspect(800, 0);
        assert_eq!(camera.aspect, 2.0);
        camera.set_aspect(800, 400);
        assert_eq!(camera.aspect, 2.0);
        camera.set_aspect(800, 800);
        assert_eq!(camera.aspect, 1.0);
    }
}
