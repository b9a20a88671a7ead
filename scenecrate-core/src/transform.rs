//! Affine node transformations

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::{matrix_from_rows, Matrix4d, Vector3d};

/// A named affine transformation that produces its 4x4 matrix on demand.
///
/// A scene node carries exactly one of these. Compositions over several axes are
/// expressed by chaining nodes, so the order of application is always visible in
/// the hierarchy. Angles are in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Transform {
    Translate { tx: f64, ty: f64, tz: f64 },
    Scale { sx: f64, sy: f64, sz: f64 },
    RotateX(f64),
    RotateY(f64),
    RotateZ(f64),
}

impl Transform {
    /// Create a translation
    pub fn translate(tx: f64, ty: f64, tz: f64) -> Self {
        Transform::Translate { tx, ty, tz }
    }

    /// Create a non-uniform scaling
    pub fn scale(sx: f64, sy: f64, sz: f64) -> Self {
        Transform::Scale { sx, sy, sz }
    }

    /// Create a uniform scaling
    pub fn uniform_scale(factor: f64) -> Self {
        Transform::Scale {
            sx: factor,
            sy: factor,
            sz: factor,
        }
    }

    /// The identity, expressed as a zero translation
    pub fn identity() -> Self {
        Transform::translate(0.0, 0.0, 0.0)
    }

    /// Build the homogeneous matrix of this transformation
    pub fn matrix(&self) -> Matrix4d {
        match *self {
            Transform::Translate { tx, ty, tz } => {
                Matrix4d::new_translation(&Vector3d::new(tx, ty, tz))
            }
            Transform::Scale { sx, sy, sz } => {
                Matrix4d::new_nonuniform_scaling(&Vector3d::new(sx, sy, sz))
            }
            Transform::RotateX(theta) => {
                let (s, c) = theta.sin_cos();
                matrix_from_rows([
                    [1.0, 0.0, 0.0, 0.0],
                    [0.0, c, -s, 0.0],
                    [0.0, s, c, 0.0],
                    [0.0, 0.0, 0.0, 1.0],
                ])
            }
            Transform::RotateY(theta) => {
                let (s, c) = theta.sin_cos();
                matrix_from_rows([
                    [c, 0.0, s, 0.0],
                    [0.0, 1.0, 0.0, 0.0],
                    [-s, 0.0, c, 0.0],
                    [0.0, 0.0, 0.0, 1.0],
                ])
            }
            Transform::RotateZ(theta) => {
                let (s, c) = theta.sin_cos();
                matrix_from_rows([
                    [c, -s, 0.0, 0.0],
                    [s, c, 0.0, 0.0],
                    [0.0, 0.0, 1.0, 0.0],
                    [0.0, 0.0, 0.0, 1.0],
                ])
            }
        }
    }

    /// Check if this transformation leaves every point where it is
    pub fn is_identity(&self) -> bool {
        match *self {
            Transform::Translate { tx, ty, tz } => tx == 0.0 && ty == 0.0 && tz == 0.0,
            Transform::Scale { sx, sy, sz } => sx == 1.0 && sy == 1.0 && sz == 1.0,
            Transform::RotateX(theta) | Transform::RotateY(theta) | Transform::RotateZ(theta) => {
                theta == 0.0
            }
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transform::Translate { tx, ty, tz } => write!(f, "Translate({tx}, {ty}, {tz})"),
            Transform::Scale { sx, sy, sz } => write!(f, "Scale({sx}, {sy}, {sz})"),
            Transform::RotateX(theta) => write!(f, "RotateX({theta})"),
            Transform::RotateY(theta) => write!(f, "RotateY({theta})"),
            Transform::RotateZ(theta) => write!(f, "RotateZ({theta})"),
        }
    }
}

impl From<Transform> for Matrix4d {
    fn from(transform: Transform) -> Self {
        transform.matrix()
    }
}
