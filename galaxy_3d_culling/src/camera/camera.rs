/// Camera: view and projection, plus the derived world-space frustum.
///
/// The frustum is cached and only rebuilt on the first `world_frustum()`
/// call after the view or the projection changed.

use std::cell::Cell;
use glam::{Mat4, Vec3};
use crate::bounds::Frustum;

/// Projection parameters (right-handed, `[0, 1]` depth)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        /// Vertical field of view, radians
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
}

impl Projection {
    /// Whether `matrix()` would produce a usable (non-zero) matrix
    pub fn is_valid(&self) -> bool {
        match *self {
            Projection::Perspective { fov_y, aspect, near, far } => {
                [fov_y, aspect, near, far].iter().all(|v| v.is_finite())
                    && fov_y > 0.0
                    && fov_y < std::f32::consts::PI
                    && aspect > 0.0
                    && near > 0.0
                    && far > 0.0
                    && near != far
            }
            Projection::Orthographic { left, right, bottom, top, near, far } => {
                [left, right, bottom, top, near, far].iter().all(|v| v.is_finite())
                    && left != right
                    && bottom != top
                    && near != far
            }
        }
    }

    /// Projection matrix, or `Mat4::ZERO` for degenerate parameters
    /// (zero aspect or extent, `near == far`, non-finite values)
    pub fn matrix(&self) -> Mat4 {
        if !self.is_valid() {
            return Mat4::ZERO;
        }
        match *self {
            Projection::Perspective { fov_y, aspect, near, far } => {
                Mat4::perspective_rh(fov_y, aspect, near, far)
            }
            Projection::Orthographic { left, right, bottom, top, near, far } => {
                Mat4::orthographic_rh(left, right, bottom, top, near, far)
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    view_matrix: Mat4,
    projection: Projection,
    projection_matrix: Mat4,
    frustum: Cell<Option<Frustum>>,
}

impl Camera {
    pub fn new(view: Mat4, projection: Projection) -> Self {
        let camera = Self {
            view_matrix: view,
            projection,
            projection_matrix: projection.matrix(),
            frustum: Cell::new(None),
        };
        camera.warn_if_degenerate();
        camera
    }

    /// Perspective camera at the origin looking down -Z
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(Mat4::IDENTITY, Projection::Perspective { fov_y, aspect, near, far })
    }

    // ===== GETTERS =====

    /// View matrix (inverse of the camera's world transform).
    pub fn view_matrix(&self) -> &Mat4 {
        &self.view_matrix
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Projection matrix (zero when the parameters are degenerate).
    pub fn projection_matrix(&self) -> &Mat4 {
        &self.projection_matrix
    }

    /// Combined view-projection matrix (projection * view).
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }

    /// Eye position in world space
    pub fn position(&self) -> Vec3 {
        let det = self.view_matrix.determinant();
        if det == 0.0 || !det.is_finite() {
            return Vec3::ZERO;
        }
        self.view_matrix.inverse().w_axis.truncate()
    }

    /// World-space view frustum, rebuilt lazily after a view or
    /// projection change.
    ///
    /// May be degenerate (see `Frustum::is_degenerate`).
    pub fn world_frustum(&self) -> Frustum {
        if let Some(frustum) = self.frustum.get() {
            return frustum;
        }
        let frustum = Frustum::from_view_projection(&self.view_projection_matrix());
        if frustum.is_degenerate() {
            crate::engine_warn!("galaxy3d::Camera", "Camera frustum is degenerate, nothing will be culled in");
        }
        self.frustum.set(Some(frustum));
        frustum
    }

    // ===== SETTERS =====

    pub fn set_view(&mut self, matrix: Mat4) {
        self.view_matrix = matrix;
        self.frustum.set(None);
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
        self.projection_matrix = projection.matrix();
        self.frustum.set(None);
        self.warn_if_degenerate();
    }

    /// Point the camera at `target` from `eye`.
    ///
    /// Ignored (with a warning) when `eye == target` or `up` is parallel
    /// to the view direction.
    pub fn look_at(&mut self, eye: Vec3, target: Vec3, up: Vec3) {
        let dir = target - eye;
        if dir.length_squared() == 0.0 || dir.cross(up).length_squared() == 0.0 {
            crate::engine_warn!(
                "galaxy3d::Camera",
                "Ignoring look_at with no usable direction (eye {}, target {}, up {})",
                eye, target, up
            );
            return;
        }
        self.set_view(Mat4::look_at_rh(eye, target, up));
    }

    fn warn_if_degenerate(&self) {
        if !self.projection.is_valid() {
            crate::engine_warn!(
                "galaxy3d::Camera",
                "Degenerate projection {:?}, using a zero matrix",
                self.projection
            );
        }
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
