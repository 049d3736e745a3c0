use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform};
use crate::config::CameraConfig;
use cgmath::*;

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: cgmath::Matrix4<f32> = cgmath::Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Perspective camera orbiting a target point, Y up.
///
/// `pitch` is the elevation above the ground plane and `yaw` the rotation
/// about the vertical axis, both in radians.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    pub distance: f32,
    pub pitch: f32,
    pub yaw: f32,
    pub eye: Vector3<f32>,
    pub target: Vector3<f32>,
    pub up: Vector3<f32>,
    pub bounds: OrbitCameraBounds,
    pub aspect: f32,
    pub fovy: Rad<f32>,
    pub znear: f32,
    pub zfar: f32,
    pub uniform: CameraUniform,
    home: (f32, f32, f32, Vector3<f32>),
}

impl Camera for OrbitCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        let eye = Point3::from_vec(self.eye);
        let target = Point3::from_vec(self.target);
        let view = Matrix4::look_at_rh(eye, target, self.up);
        let proj =
            OPENGL_TO_WGPU_MATRIX * perspective(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }
}

impl OrbitCamera {
    pub fn new(distance: f32, pitch: f32, yaw: f32, target: Vector3<f32>, aspect: f32) -> Self {
        let mut camera = Self {
            distance,
            pitch,
            yaw,
            eye: Vector3::zero(), // Will be auto-calculted in `update()` nevertheless.
            target,
            up: Vector3::unit_y(),
            bounds: OrbitCameraBounds::default(),
            aspect,
            fovy: Rad(std::f32::consts::PI / 4.0),
            znear: 0.1,
            zfar: 1000.0,
            uniform: CameraUniform::default(),
            home: (distance, pitch, yaw, target),
        };
        camera.update();
        camera
    }

    /// Builds a camera whose eye sits at `config.position`, looking at
    /// `config.target`, with the configured distance and angle limits.
    pub fn from_config(config: &CameraConfig, aspect: f32) -> Self {
        let target = Vector3::from(config.target);
        let offset = Vector3::from(config.position) - target;
        let distance = offset.magnitude().max(f32::EPSILON);
        let pitch = (offset.y / distance).clamp(-1.0, 1.0).asin();
        let yaw = offset.x.atan2(offset.z);

        let mut camera = Self::new(distance, pitch, yaw, target, aspect);
        camera.fovy = Deg(config.fovy_degrees).into();
        camera.znear = config.near;
        camera.zfar = config.far;
        camera.bounds = OrbitCameraBounds::from_config(config);
        camera
    }

    pub fn reset_to_default(&mut self) {
        let (distance, pitch, yaw, target) = self.home;
        self.distance = distance;
        self.pitch = pitch;
        self.yaw = yaw;
        self.target = target;

        self.update(); // Recalculate eye position
    }

    pub fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(
            self.bounds.min_distance.unwrap_or(f32::EPSILON),
            self.bounds.max_distance.unwrap_or(f32::MAX),
        );
        self.update();
    }

    pub fn add_distance(&mut self, delta: f32) {
        let corrected_zoom = f32::log10(self.distance) * delta;
        self.set_distance(self.distance + corrected_zoom);
    }

    pub fn set_pitch(&mut self, pitch: f32) {
        self.pitch = pitch.clamp(self.bounds.min_pitch, self.bounds.max_pitch);
        self.update();
    }

    pub fn add_pitch(&mut self, delta: f32) {
        self.set_pitch(self.pitch + delta);
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        let mut bounded_yaw = yaw;
        if let Some(min_yaw) = self.bounds.min_yaw {
            bounded_yaw = bounded_yaw.clamp(min_yaw, f32::MAX);
        }
        if let Some(max_yaw) = self.bounds.max_yaw {
            bounded_yaw = bounded_yaw.clamp(f32::MIN, max_yaw);
        }
        self.yaw = bounded_yaw;
        self.update();
    }

    pub fn add_yaw(&mut self, delta: f32) {
        self.set_yaw(self.yaw + delta);
    }

    /// Pans the camera relative to the current view direction
    /// delta.0 = horizontal pan (left/right relative to camera view)
    /// delta.1 = vertical pan (up/down relative to camera view)
    pub fn pan(&mut self, delta: (f32, f32)) {
        let forward = (self.target - self.eye).normalize();
        let right = forward.cross(self.up).normalize();
        let up = right.cross(forward).normalize();

        // Scale pan movement by distance for consistent feel at all zoom levels
        let pan_scale = self.distance * 0.1;

        let total_movement = right * delta.0 * pan_scale + up * delta.1 * pan_scale;

        self.target += total_movement;
        self.update();
    }

    /// Height of the eye above the ground plane.
    pub fn height(&self) -> f32 {
        self.eye.y
    }

    /// Updates the camera after changing `distance`, `pitch` or `yaw`.
    fn update(&mut self) {
        self.eye =
            calculate_cartesian_eye_position(self.pitch, self.yaw, self.distance, self.target);
    }

    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn update_view_proj(&mut self) {
        self.uniform.view_position = [self.eye.x, self.eye.y, self.eye.z, 1.0];
        self.uniform.view_proj = convert_matrix4_to_array(self.build_view_projection_matrix());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct OrbitCameraBounds {
    pub min_distance: Option<f32>,
    pub max_distance: Option<f32>,
    pub min_pitch: f32,
    pub max_pitch: f32,
    pub min_yaw: Option<f32>,
    pub max_yaw: Option<f32>,
}

impl Default for OrbitCameraBounds {
    fn default() -> Self {
        Self {
            min_distance: None,
            max_distance: None,
            min_pitch: -std::f32::consts::PI / 2.0 + f32::EPSILON,
            max_pitch: std::f32::consts::PI / 2.0 - f32::EPSILON,
            min_yaw: None,
            max_yaw: None,
        }
    }
}

impl OrbitCameraBounds {
    /// The polar limit is measured from straight up, so it bounds the
    /// lowest elevation the camera may reach.
    pub fn from_config(config: &CameraConfig) -> Self {
        Self {
            min_distance: Some(config.min_distance),
            max_distance: Some(config.max_distance),
            min_pitch: std::f32::consts::FRAC_PI_2 - config.max_polar_angle,
            ..Default::default()
        }
    }
}

fn calculate_cartesian_eye_position(
    pitch: f32,
    yaw: f32,
    distance: f32,
    target: Vector3<f32>,
) -> Vector3<f32> {
    Vector3::new(
        distance * yaw.sin() * pitch.cos(),
        distance * pitch.sin(),
        distance * yaw.cos() * pitch.cos(),
    ) + target
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn config_position_is_reproduced() {
        let camera = OrbitCamera::from_config(&CameraConfig::default(), 1.5);
        assert!(approx(camera.eye.x, 0.0));
        assert!(approx(camera.eye.y, 500.0));
        assert!(approx(camera.eye.z, 500.0));
        assert!(approx(camera.pitch, std::f32::consts::FRAC_PI_4));
        assert!(approx(camera.height(), 500.0));
    }

    #[test]
    fn distance_is_clamped_to_bounds() {
        let mut camera = OrbitCamera::from_config(&CameraConfig::default(), 1.0);
        camera.set_distance(10.0);
        assert_eq!(camera.distance, 200.0);
        camera.set_distance(5000.0);
        assert_eq!(camera.distance, 1000.0);
    }

    #[test]
    fn camera_stays_above_polar_limit() {
        let mut camera = OrbitCamera::from_config(&CameraConfig::default(), 1.0);
        camera.set_pitch(-1.0);
        let min_elevation = std::f32::consts::PI * 0.05;
        assert!(approx(camera.pitch, min_elevation));
        assert!(camera.eye.y > 0.0);
    }

    #[test]
    fn reset_restores_initial_view() {
        let mut camera = OrbitCamera::from_config(&CameraConfig::default(), 1.0);
        camera.add_yaw(1.0);
        camera.pan((0.5, 0.5));
        camera.reset_to_default();
        assert!(approx(camera.eye.z, 500.0));
        assert!(approx(camera.target.magnitude(), 0.0));
    }

    #[test]
    fn depth_runs_from_zero_at_near_to_one_at_far() {
        let camera = OrbitCamera::from_config(&CameraConfig::default(), 1.0);
        let view_proj = camera.build_view_projection_matrix();
        let forward = (camera.target - camera.eye).normalize();
        let depth = |d: f32| {
            let p = camera.eye + forward * d;
            let clip = view_proj * p.extend(1.0);
            clip.z / clip.w
        };

        assert!(depth(camera.znear).abs() < 1e-3);
        assert!((depth(camera.zfar) - 1.0).abs() < 1e-3);
        let mid = depth(camera.distance);
        assert!(mid > 0.0 && mid < 1.0);
    }
}
