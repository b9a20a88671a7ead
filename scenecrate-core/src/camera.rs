//! Cameras mapping world space onto image space
//!
//! Both cameras build an orthonormal frame `(u, v, n)` from three world-space
//! inputs: the eye `position`, an `up` hint and a `direction`. Note that
//! `direction` is the world-space point the camera looks *at*, not a direction
//! vector. `n` points from that target back towards the eye, so visible points
//! have a negative view-space depth.

use nalgebra::Vector3;
use tracing::trace;

use crate::error::MathError;
use crate::math::{matrix_from_rows, perspective_divide, transform_point, Matrix4d, Vector3d, VectorExt};

/// A point in image space, before discretization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePoint {
    pub x: f64,
    pub y: f64,
}

impl ImagePoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Projection from world space to image space
pub trait Camera {
    /// Rebuild the cached projection matrix from the current camera parameters
    fn update(&mut self) -> Result<(), MathError>;

    /// The cached projection matrix, `None` until [`Camera::update`] succeeded
    fn projection_matrix(&self) -> Option<&Matrix4d>;

    /// Project a world-space point: multiply by the projection matrix, then divide by `w`
    fn project(&self, point: &Vector3d) -> Result<ImagePoint, MathError> {
        let projection = self
            .projection_matrix()
            .ok_or(MathError::DegenerateCamera("update() has not been called"))?;
        let p = perspective_divide(&transform_point(projection, point))?;
        Ok(ImagePoint::new(p.x, p.y))
    }
}

/// The eye, up hint and target shared by the orthographic and perspective cameras
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub position: Vector3d,
    pub up: Vector3d,
    /// The world-space point the camera aims at
    pub direction: Vector3d,
}

/// The orthonormal camera basis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub u: Vector3d,
    pub v: Vector3d,
    pub n: Vector3d,
}

impl CameraFrame {
    pub fn new(position: Vector3d, up: Vector3d, direction: Vector3d) -> Self {
        Self {
            position,
            up,
            direction,
        }
    }

    /// Derive `n = -(direction - position)`, `u = up x n`, `v = n x u`, all normalized
    pub fn basis(&self) -> Result<Basis, MathError> {
        let n = ((self.direction - self.position) * -1.0)
            .try_normalized()
            .map_err(|_| MathError::DegenerateCamera("target coincides with the camera position"))?;
        let u = self
            .up
            .cross(&n)
            .try_normalized()
            .map_err(|_| MathError::DegenerateCamera("up vector is parallel to the viewing axis"))?;
        let v = n.cross(&u).try_normalized()?;
        Ok(Basis { u, v, n })
    }

    /// The world-to-camera matrix: rotate into `(u, v, n)` after moving the eye to the origin
    pub fn view_matrix(&self) -> Result<Matrix4d, MathError> {
        let Basis { u, v, n } = self.basis()?;
        let e = self.position;
        Ok(matrix_from_rows([
            [u.x, u.y, u.z, -e.dot(&u)],
            [v.x, v.y, v.z, -e.dot(&v)],
            [n.x, n.y, n.z, -e.dot(&n)],
            [0.0, 0.0, 0.0, 1.0],
        ]))
    }
}

impl Default for CameraFrame {
    fn default() -> Self {
        Self::new(Vector3::new(0.0, 0.0, 10.0), Vector3::y(), Vector3::zeros())
    }
}

macro_rules! frame_accessors {
    ($camera:ty) => {
        impl $camera {
            pub fn frame(&self) -> &CameraFrame {
                &self.frame
            }

            pub fn position(&self) -> Vector3d {
                self.frame.position
            }

            pub fn up(&self) -> Vector3d {
                self.frame.up
            }

            /// The world-space target point
            pub fn direction(&self) -> Vector3d {
                self.frame.direction
            }

            pub fn set_position(&mut self, position: Vector3d) {
                self.frame.position = position;
                self.projection = None;
            }

            pub fn set_up(&mut self, up: Vector3d) {
                self.frame.up = up;
                self.projection = None;
            }

            pub fn set_direction(&mut self, direction: Vector3d) {
                self.frame.direction = direction;
                self.projection = None;
            }

            /// Point the camera at a new world-space target
            pub fn aim_at(&mut self, target: Vector3d) {
                self.set_direction(target);
            }
        }
    };
}

/// Parallel projection that discards depth entirely
#[derive(Debug, Clone)]
pub struct OrthographicCamera {
    frame: CameraFrame,
    projection: Option<Matrix4d>,
}

impl OrthographicCamera {
    pub fn new(position: Vector3d, up: Vector3d, direction: Vector3d) -> Self {
        Self {
            frame: CameraFrame::new(position, up, direction),
            projection: None,
        }
    }
}

frame_accessors!(OrthographicCamera);

impl Camera for OrthographicCamera {
    fn update(&mut self) -> Result<(), MathError> {
        let collapse = Matrix4d::from_diagonal(&nalgebra::Vector4::new(1.0, 1.0, 0.0, 1.0));
        self.projection = Some(collapse * self.frame.view_matrix()?);
        trace!(position = ?self.frame.position, target = ?self.frame.direction, "orthographic camera updated");
        Ok(())
    }

    fn projection_matrix(&self) -> Option<&Matrix4d> {
        self.projection.as_ref()
    }
}

/// Central projection onto an image plane through the eye.
///
/// `destination` is the distance `d` between the image plane and the center of
/// projection, which sits behind the eye. A point at view depth `z` gets
/// `w = 1 - z / d`, so points nearer the eye project larger and points in the
/// image plane keep their size.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    frame: CameraFrame,
    destination: f64,
    projection: Option<Matrix4d>,
}

impl PerspectiveCamera {
    pub fn new(position: Vector3d, up: Vector3d, direction: Vector3d, destination: f64) -> Self {
        Self {
            frame: CameraFrame::new(position, up, direction),
            destination,
            projection: None,
        }
    }

    pub fn destination(&self) -> f64 {
        self.destination
    }

    pub fn set_destination(&mut self, destination: f64) {
        self.destination = destination;
        self.projection = None;
    }
}

frame_accessors!(PerspectiveCamera);

impl Camera for PerspectiveCamera {
    fn update(&mut self) -> Result<(), MathError> {
        let d = self.destination;
        if !d.is_finite() || d.abs() < crate::math::EPSILON {
            return Err(MathError::DegenerateCamera("destination must be finite and non-zero"));
        }

        let collapse = matrix_from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, -1.0 / d, 1.0],
        ]);
        self.projection = Some(collapse * self.frame.view_matrix()?);
        trace!(
            position = ?self.frame.position,
            target = ?self.frame.direction,
            destination = d,
            "perspective camera updated"
        );
        Ok(())
    }

    fn projection_matrix(&self) -> Option<&Matrix4d> {
        self.projection.as_ref()
    }
}

/// A camera whose projection is the identity: world `(x, y, z)` lands on image `(x, y)`
#[derive(Debug, Clone)]
pub struct IdentityCamera {
    projection: Matrix4d,
}

impl IdentityCamera {
    pub fn new() -> Self {
        Self {
            projection: Matrix4d::identity(),
        }
    }
}

impl Default for IdentityCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera for IdentityCamera {
    fn update(&mut self) -> Result<(), MathError> {
        Ok(())
    }

    fn projection_matrix(&self) -> Option<&Matrix4d> {
        Some(&self.projection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn v(x: f64, y: f64, z: f64) -> Vector3d {
        Vector3d::new(x, y, z)
    }

    #[test]
    fn basis_is_orthonormal() {
        let frame = CameraFrame::new(v(3.0, 4.0, 5.0), v(0.0, 1.0, 0.0), v(-1.0, 0.5, 2.0));
        let Basis { u, v, n } = frame.basis().unwrap();
        for axis in [u, v, n] {
            assert_relative_eq!(axis.norm(), 1.0, epsilon = 1e-12);
        }
        assert_relative_eq!(u.dot(&v), 0.0, epsilon = 1e-12);
        assert_relative_eq!(u.dot(&n), 0.0, epsilon = 1e-12);
        assert_relative_eq!(v.dot(&n), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn orthographic_at_origin_keeps_xy_for_any_depth() {
        let mut camera = OrthographicCamera::new(v(0.0, 0.0, 0.0), v(0.0, 1.0, 0.0), v(0.0, 0.0, -1.0));
        camera.update().unwrap();

        for z in [-100.0, -1.0, 0.0, 3.5, 42.0] {
            let p = camera.project(&v(2.5, -7.0, z)).unwrap();
            assert_relative_eq!(p.x, 2.5, epsilon = 1e-12);
            assert_relative_eq!(p.y, -7.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn orthographic_moves_with_the_eye() {
        let mut camera = OrthographicCamera::new(v(5.0, 0.0, 10.0), v(0.0, 1.0, 0.0), v(5.0, 0.0, 0.0));
        camera.update().unwrap();
        let p = camera.project(&v(5.0, 2.0, 0.0)).unwrap();
        assert_relative_eq!(p.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(p.y, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn perspective_magnifies_closer_points() {
        let mut camera = PerspectiveCamera::new(v(0.0, 0.0, 10.0), v(0.0, 1.0, 0.0), v(0.0, 0.0, 0.0), 10.0);
        camera.update().unwrap();

        let far = camera.project(&v(4.0, 0.0, 0.0)).unwrap();
        let near = camera.project(&v(4.0, 0.0, 5.0)).unwrap();
        assert_relative_eq!(far.x, 2.0, epsilon = 1e-12);
        assert!(near.x > far.x);

        // points in the plane of the eye are not scaled
        let at_eye = camera.project(&v(4.0, 3.0, 10.0)).unwrap();
        assert_relative_eq!(at_eye.x, 4.0, epsilon = 1e-12);
        assert_relative_eq!(at_eye.y, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn perspective_divide_by_zero_is_reported() {
        let mut camera = PerspectiveCamera::new(v(0.0, 0.0, 10.0), v(0.0, 1.0, 0.0), v(0.0, 0.0, 0.0), 10.0);
        camera.update().unwrap();
        // view depth +d puts w at zero
        let err = camera.project(&v(1.0, 1.0, 20.0)).unwrap_err();
        assert!(matches!(err, MathError::DivisionByZero { .. }));
    }

    #[test]
    fn degenerate_frames_fail_update() {
        let mut same_point = OrthographicCamera::new(v(1.0, 1.0, 1.0), v(0.0, 1.0, 0.0), v(1.0, 1.0, 1.0));
        assert!(matches!(same_point.update(), Err(MathError::DegenerateCamera(_))));

        let mut parallel_up = OrthographicCamera::new(v(0.0, 5.0, 0.0), v(0.0, 1.0, 0.0), v(0.0, 0.0, 0.0));
        assert!(matches!(parallel_up.update(), Err(MathError::DegenerateCamera(_))));

        let mut no_distance = PerspectiveCamera::new(v(0.0, 0.0, 10.0), v(0.0, 1.0, 0.0), v(0.0, 0.0, 0.0), 0.0);
        assert!(no_distance.update().is_err());
    }

    #[test]
    fn mutation_requires_a_new_update() {
        let mut camera = PerspectiveCamera::new(v(0.0, 0.0, 10.0), v(0.0, 1.0, 0.0), v(0.0, 0.0, 0.0), 10.0);
        assert!(camera.project(&v(0.0, 0.0, 0.0)).is_err());

        camera.update().unwrap();
        assert!(camera.project(&v(0.0, 0.0, 0.0)).is_ok());

        camera.aim_at(v(1.0, 0.0, 0.0));
        assert!(camera.projection_matrix().is_none());
        camera.update().unwrap();
        assert_eq!(camera.direction(), v(1.0, 0.0, 0.0));
    }

    #[test]
    fn identity_camera_drops_depth() {
        let camera = IdentityCamera::new();
        let p = camera.project(&v(3.0, 0.0, -1.0)).unwrap();
        assert_eq!(p, ImagePoint::new(3.0, 0.0));
    }
}
