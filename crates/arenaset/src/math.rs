//! Small value types for positions, velocities and orientations.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

/// Three-component vector in arena units (uu).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length_sq(self) -> f32 {
        self.dot(self)
    }

    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    pub fn dist(self, other: Vec3) -> f32 {
        (self - other).length()
    }

    /// Unit vector in the same direction, or zero for a zero vector.
    pub fn normalized(self) -> Vec3 {
        let len = self.length();
        if len > f32::EPSILON {
            self / len
        } else {
            Vec3::ZERO
        }
    }

    /// Mirror through the field center (the orange team's point of view).
    pub fn inverted(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, self.z)
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Vec3) {
        *self = *self + rhs;
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl SubAssign for Vec3 {
    fn sub_assign(&mut self, rhs: Vec3) {
        *self = *self - rhs;
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f32> for Vec3 {
    type Output = Vec3;
    fn div(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

/// Orientation as three orthonormal basis vectors.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotMat {
    pub forward: Vec3,
    pub right: Vec3,
    pub up: Vec3,
}

impl RotMat {
    pub const IDENTITY: RotMat = RotMat {
        forward: Vec3::new(1.0, 0.0, 0.0),
        right: Vec3::new(0.0, 1.0, 0.0),
        up: Vec3::new(0.0, 0.0, 1.0),
    };

    pub fn inverted(self) -> RotMat {
        RotMat {
            forward: self.forward.inverted(),
            right: self.right.inverted(),
            up: self.up.inverted(),
        }
    }
}

impl Default for RotMat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Euler orientation in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Angle {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl Angle {
    pub const fn new(yaw: f32, pitch: f32, roll: f32) -> Self {
        Self { yaw, pitch, roll }
    }

    pub fn to_rot_mat(self) -> RotMat {
        let (sy, cy) = self.yaw.sin_cos();
        let (sp, cp) = self.pitch.sin_cos();
        let (sr, cr) = self.roll.sin_cos();

        RotMat {
            forward: Vec3::new(cp * cy, cp * sy, sp),
            right: Vec3::new(cy * sp * sr - cr * sy, sy * sp * sr + cr * cy, -cp * sr),
            up: Vec3::new(-cr * cy * sp - sr * sy, -cr * sy * sp + sr * cy, cp * cr),
        }
    }

    pub fn from_rot_mat(mat: RotMat) -> Angle {
        let f = mat.forward;
        let yaw = f.y.atan2(f.x);
        let pitch = f.z.atan2((f.x * f.x + f.y * f.y).sqrt());
        let roll = (-mat.right.z).atan2(mat.up.z);
        Angle::new(yaw, pitch, roll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn test_zero_angle_is_identity() {
        let mat = Angle::default().to_rot_mat();
        assert!(approx(mat.forward, RotMat::IDENTITY.forward));
        assert!(approx(mat.right, RotMat::IDENTITY.right));
        assert!(approx(mat.up, RotMat::IDENTITY.up));
    }

    #[test]
    fn test_rot_mat_is_orthonormal() {
        let mat = Angle::new(0.7, -0.3, 1.1).to_rot_mat();
        assert!((mat.forward.length() - 1.0).abs() < 1e-5);
        assert!(mat.forward.dot(mat.right).abs() < 1e-5);
        assert!(mat.forward.dot(mat.up).abs() < 1e-5);
        assert!(mat.right.dot(mat.up).abs() < 1e-5);
    }

    #[test]
    fn test_angle_recovered_from_rot_mat() {
        let angle = Angle::new(0.4, 0.2, -0.5);
        let back = Angle::from_rot_mat(angle.to_rot_mat());
        assert!((back.yaw - angle.yaw).abs() < 1e-4);
        assert!((back.pitch - angle.pitch).abs() < 1e-4);
        assert!((back.roll - angle.roll).abs() < 1e-4);
    }

    #[test]
    fn test_normalized_zero() {
        assert_eq!(Vec3::ZERO.normalized(), Vec3::ZERO);
        let v = Vec3::new(3.0, 0.0, 4.0).normalized();
        assert!((v.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_inverted_keeps_height() {
        let v = Vec3::new(1.0, -2.0, 3.0).inverted();
        assert_eq!(v, Vec3::new(-1.0, 2.0, 3.0));
    }
}
