use cgmath::*;

use super::camera_utils::{convert_matrix4_to_array, Camera, CameraUniform, OPENGL_TO_WGPU_MATRIX};
use crate::config::SceneConfig;

/// Fixed perspective camera looking at a target point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveCamera {
    pub eye: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fovy: Deg<f32>,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera for PerspectiveCamera {
    fn build_view_projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * self.projection_matrix() * self.view_matrix()
    }
}

impl PerspectiveCamera {
    pub fn new(config: &SceneConfig, aspect: f32) -> Self {
        Self {
            eye: Point3::from(config.camera_position),
            target: Point3::from(config.camera_target),
            up: Vector3::unit_y(),
            fovy: Deg(config.fov),
            aspect,
            znear: config.near,
            zfar: config.far,
        }
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(self.eye, self.target, self.up)
    }

    /// OpenGL-convention projection (clip depth -1..1)
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        perspective(self.fovy, self.aspect, self.znear, self.zfar)
    }

    /// Updates the aspect ratio after a window resize
    pub fn resize_projection(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    pub fn uniform(&self) -> CameraUniform {
        CameraUniform {
            view_position: self.eye.to_homogeneous().into(),
            view_proj: convert_matrix4_to_array(self.build_view_projection_matrix()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_projects_to_screen_center() {
        let camera = PerspectiveCamera::new(&SceneConfig::default(), 1.5);
        let clip = camera.build_view_projection_matrix() * Vector4::new(0.0, 0.0, 0.0, 1.0);
        let ndc = clip.truncate() / clip.w;

        assert!(ndc.x.abs() < 1e-5);
        assert!(ndc.y.abs() < 1e-5);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_resize_ignores_zero_size() {
        let mut camera = PerspectiveCamera::new(&SceneConfig::default(), 1.0);
        camera.resize_projection(1200, 800);
        assert_eq!(camera.aspect, 1.5);
        camera.resize_projection(0, 800);
        assert_eq!(camera.aspect, 1.5);
    }

    #[test]
    fn test_uniform_carries_eye() {
        let camera = PerspectiveCamera::new(&SceneConfig::default(), 1.0);
        assert_eq!(camera.uniform().view_position, [0.0, 8.0, 12.0, 1.0]);
    }
}
