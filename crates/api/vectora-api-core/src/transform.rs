//! Pose transforms for scene objects.

use serde::{Deserialize, Serialize};

use crate::value::Vec2;

/// Translate / rotate / scale about `origin`. Rotation is in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translate: Vec2,
    pub rotate: f64,
    pub scale: Vec2,
    pub origin: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Transform::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        translate: Vec2::ZERO,
        rotate: 0.0,
        scale: Vec2::ONE,
        origin: Vec2::ZERO,
    };

    pub fn new(translate: Vec2, rotate: f64, scale: Vec2, origin: Vec2) -> Self {
        Transform {
            translate,
            rotate,
            scale,
            origin,
        }
    }

    pub fn from_translate(translate: Vec2) -> Self {
        Transform {
            translate,
            ..Transform::IDENTITY
        }
    }

    /// Layer `other` on top of `self`: translations, rotations and origins add,
    /// scales multiply.
    pub fn add_pose(&self, other: &Transform) -> Transform {
        Transform {
            translate: self.translate.add(other.translate),
            rotate: self.rotate + other.rotate,
            scale: self.scale.mul(other.scale),
            origin: self.origin.add(other.origin),
        }
    }

    /// Remove `other` from `self`; the inverse of [`Transform::add_pose`].
    /// A zero scale component on `other` leaves that component untouched.
    pub fn sub_pose(&self, other: &Transform) -> Transform {
        let div = |a: f64, b: f64| if b != 0.0 { a / b } else { a };
        Transform {
            translate: self.translate.sub(other.translate),
            rotate: self.rotate - other.rotate,
            scale: Vec2::new(div(self.scale.x, other.scale.x), div(self.scale.y, other.scale.y)),
            origin: self.origin.sub(other.origin),
        }
    }

    pub fn lerp(&self, other: &Transform, t: f64) -> Transform {
        Transform {
            translate: self.translate.lerp(other.translate, t),
            rotate: self.rotate + (other.rotate - self.rotate) * t,
            scale: self.scale.lerp(other.scale, t),
            origin: self.origin.lerp(other.origin, t),
        }
    }

    /// Compose a stack of poses left to right.
    pub fn add_poses<'a>(poses: impl IntoIterator<Item = &'a Transform>) -> Transform {
        poses
            .into_iter()
            .fold(Transform::IDENTITY, |acc, t| acc.add_pose(t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_pose_adds_translation_and_rotation_and_multiplies_scale() {
        let a = Transform::new(Vec2::new(1.0, 2.0), 30.0, Vec2::new(2.0, 2.0), Vec2::ZERO);
        let b = Transform::new(Vec2::new(3.0, -1.0), 15.0, Vec2::new(0.5, 3.0), Vec2::ZERO);
        let c = a.add_pose(&b);
        assert_eq!(c.translate, Vec2::new(4.0, 1.0));
        assert_eq!(c.rotate, 45.0);
        assert_eq!(c.scale, Vec2::new(1.0, 6.0));
    }

    #[test]
    fn sub_pose_undoes_add_pose() {
        let a = Transform::new(Vec2::new(1.0, 2.0), 30.0, Vec2::new(2.0, 4.0), Vec2::new(1.0, 1.0));
        let b = Transform::new(Vec2::new(3.0, -1.0), 15.0, Vec2::new(0.5, 2.0), Vec2::ZERO);
        assert_eq!(a.add_pose(&b).sub_pose(&b), a);
    }

    #[test]
    fn identity_is_neutral() {
        let a = Transform::new(Vec2::new(5.0, 6.0), 90.0, Vec2::new(3.0, 1.0), Vec2::ZERO);
        assert_eq!(a.add_pose(&Transform::IDENTITY), a);
        assert_eq!(Transform::add_poses([&a, &Transform::IDENTITY]), a);
    }
}
