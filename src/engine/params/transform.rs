//! ### English
//! Model transform (rotation in degrees + scale) and the MVP matrix built from it.
//!
//! ### 中文
//! 模型变换（角度制旋转 + 缩放）及由其构建的 MVP 矩阵。

use dpi::PhysicalSize;
use glam::{Mat4, Vec3};

const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;
const EYE_Z: f32 = 4.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub rotate_x: f32,
    pub rotate_y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        rotate_x: 0.0,
        rotate_y: 0.0,
        scale_x: 1.0,
        scale_y: 1.0,
    };

    pub const fn new(rotate_x: f32, rotate_y: f32, scale_x: f32, scale_y: f32) -> Self {
        Self {
            rotate_x,
            rotate_y,
            scale_x,
            scale_y,
        }
    }

    /// ### English
    /// Model-view-projection matrix: orthographic projection, camera at `z = 4` looking at the
    /// origin, then scale, then rotation about X and Y (angles taken modulo 360°).
    ///
    /// ### 中文
    /// 模型-视图-投影矩阵：正交投影，相机位于 `z = 4` 看向原点，随后依次应用缩放、
    /// 绕 X 与 Y 轴旋转（角度对 360° 取模）。
    pub fn mvp(&self) -> Mat4 {
        let projection = Mat4::orthographic_rh_gl(-1.0, 1.0, -1.0, 1.0, NEAR, FAR);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, EYE_Z), Vec3::ZERO, Vec3::Y);
        let model = Mat4::from_scale(Vec3::new(self.scale_x, self.scale_y, 1.0))
            * Mat4::from_rotation_x(wrap_degrees(self.rotate_x).to_radians())
            * Mat4::from_rotation_y(wrap_degrees(self.rotate_y).to_radians());
        projection * view * model
    }
}

fn wrap_degrees(degrees: f32) -> f32 {
    if degrees.is_finite() {
        degrees % 360.0
    } else {
        0.0
    }
}

/// ### English
/// Scale that fits an image of `image` size into `viewport` while keeping its aspect ratio.
/// Returns `(1, 1)` for degenerate sizes.
///
/// ### 中文
/// 在保持宽高比的前提下把 `image` 尺寸的图像放入 `viewport` 所需的缩放；
/// 尺寸退化时返回 `(1, 1)`。
pub fn aspect_fit(image: PhysicalSize<u32>, viewport: PhysicalSize<u32>) -> (f32, f32) {
    if image.width == 0 || image.height == 0 || viewport.width == 0 || viewport.height == 0 {
        return (1.0, 1.0);
    }
    let image_ratio = image.width as f32 / image.height as f32;
    let viewport_ratio = viewport.width as f32 / viewport.height as f32;
    if image_ratio > viewport_ratio {
        (1.0, viewport_ratio / image_ratio)
    } else {
        (image_ratio / viewport_ratio, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    fn project(m: Mat4, x: f32, y: f32) -> Vec4 {
        m * Vec4::new(x, y, 0.0, 1.0)
    }

    #[test]
    fn identity_maps_quad_corners_to_clip_corners() {
        let m = Transform::IDENTITY.mvp();
        let p = project(m, 1.0, 1.0);
        assert!((p.x - 1.0).abs() < 1e-5);
        assert!((p.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn scale_is_applied() {
        let m = Transform::new(0.0, 0.0, 0.5, 2.0).mvp();
        let p = project(m, 1.0, 1.0);
        assert!((p.x - 0.5).abs() < 1e-5);
        assert!((p.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn full_turns_are_equivalent_to_none() {
        let a = Transform::new(30.0, 0.0, 1.0, 1.0).mvp();
        let b = Transform::new(390.0, 0.0, 1.0, 1.0).mvp();
        assert!(a.abs_diff_eq(b, 1e-4));
    }

    #[test]
    fn non_finite_angles_are_ignored() {
        let m = Transform::new(f32::NAN, f32::INFINITY, 1.0, 1.0).mvp();
        assert!(m.abs_diff_eq(Transform::IDENTITY.mvp(), 1e-6));
    }

    #[test]
    fn aspect_fit_letterboxes_wide_images() {
        let fit = aspect_fit(PhysicalSize::new(200, 100), PhysicalSize::new(100, 100));
        assert_eq!(fit, (1.0, 0.5));
        let fit = aspect_fit(PhysicalSize::new(100, 200), PhysicalSize::new(100, 100));
        assert_eq!(fit, (0.5, 1.0));
        assert_eq!(
            aspect_fit(PhysicalSize::new(0, 1), PhysicalSize::new(1, 1)),
            (1.0, 1.0)
        );
    }
}
