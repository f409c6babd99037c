//! Position, Euler rotation and scale of a scene node

use cgmath::{Matrix4, Rad, Vector3};

use crate::animation::{Animatable, Channel};

/// Translation, XYZ Euler rotation (radians) and per-axis scale
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn at(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Vector3::new(x, y, z);
        self
    }

    pub fn with_scale(mut self, x: f32, y: f32, z: f32) -> Self {
        self.scale = Vector3::new(x, y, z);
        self
    }

    pub fn with_uniform_scale(self, scale: f32) -> Self {
        self.with_scale(scale, scale, scale)
    }

    /// Local-to-parent matrix: translate · Rx · Ry · Rz · scale
    pub fn matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_z(Rad(self.rotation.z))
            * Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }
}

impl Animatable for Transform {
    fn channel(&self, channel: Channel) -> Option<f32> {
        Some(match channel {
            Channel::PositionX => self.position.x,
            Channel::PositionY => self.position.y,
            Channel::PositionZ => self.position.z,
            Channel::RotationX => self.rotation.x,
            Channel::RotationY => self.rotation.y,
            Channel::RotationZ => self.rotation.z,
            Channel::ScaleX => self.scale.x,
            Channel::ScaleY => self.scale.y,
            Channel::ScaleZ => self.scale.z,
        })
    }

    fn set_channel(&mut self, channel: Channel, value: f32) {
        match channel {
            Channel::PositionX => self.position.x = value,
            Channel::PositionY => self.position.y = value,
            Channel::PositionZ => self.position.z = value,
            Channel::RotationX => self.rotation.x = value,
            Channel::RotationY => self.rotation.y = value,
            Channel::RotationZ => self.rotation.z = value,
            Channel::ScaleX => self.scale.x = value,
            Channel::ScaleY => self.scale.y = value,
            Channel::ScaleZ => self.scale.z = value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::Vector4;

    #[test]
    fn test_matrix_scales_then_translates() {
        let transform = Transform::at(1.0, 0.0, -2.0).with_uniform_scale(2.0);
        let p = transform.matrix() * Vector4::new(1.0, 1.0, 1.0, 1.0);
        assert_eq!(p, Vector4::new(3.0, 2.0, 0.0, 1.0));
    }

    #[test]
    fn test_quarter_turn_about_y() {
        let transform = Transform::default().with_rotation(0.0, std::f32::consts::FRAC_PI_2, 0.0);
        let p = transform.matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        assert!(p.x.abs() < 1e-6);
        assert!((p.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_channels_round_trip() {
        let mut transform = Transform::default();
        transform.set_channel(Channel::ScaleY, 0.1);
        transform.set_channel(Channel::RotationZ, 0.5);
        assert_eq!(transform.channel(Channel::ScaleY), Some(0.1));
        assert_eq!(transform.rotation.z, 0.5);
    }
}
