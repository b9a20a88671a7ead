//! Math kernel
//!
//! Vectors and matrices are plain nalgebra types. Everything in the pipeline is a
//! 4x4 homogeneous matrix applied to column vectors on the right (`p' = M * p`),
//! so composition is a single `*` and projection is a multiply followed by a
//! perspective divide.

use nalgebra::{Matrix4, Vector3, Vector4};

use crate::error::MathError;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// A homogeneous column vector
pub type Vector4d = Vector4<f64>;

/// A 4x4 homogeneous matrix
pub type Matrix4d = Matrix4<f64>;

/// Values of `w` (and vector lengths) below this are treated as zero
pub const EPSILON: f64 = 1e-12;

/// Fallible and homogeneous operations missing from nalgebra's vector type
pub trait VectorExt {
    /// Normalize the vector, failing on a zero-length input instead of producing NaNs
    fn try_normalized(&self) -> Result<Vector3d, MathError>;

    /// Extend to the homogeneous column `(x, y, z, 1)`
    fn to_point4(&self) -> Vector4d;
}

impl VectorExt for Vector3d {
    fn try_normalized(&self) -> Result<Vector3d, MathError> {
        let length = self.norm();
        if !length.is_finite() || length < EPSILON {
            return Err(MathError::ZeroLengthVector);
        }
        Ok(self / length)
    }

    fn to_point4(&self) -> Vector4d {
        Vector4d::new(self.x, self.y, self.z, 1.0)
    }
}

/// Build a matrix from rows, the way the formulas are written on paper
#[rustfmt::skip]
pub fn matrix_from_rows(rows: [[f64; 4]; 4]) -> Matrix4d {
    Matrix4d::new(
        rows[0][0], rows[0][1], rows[0][2], rows[0][3],
        rows[1][0], rows[1][1], rows[1][2], rows[1][3],
        rows[2][0], rows[2][1], rows[2][2], rows[2][3],
        rows[3][0], rows[3][1], rows[3][2], rows[3][3],
    )
}

/// Apply `m` to the point `p` (with `w = 1`) and return the homogeneous result
pub fn transform_point(m: &Matrix4d, p: &Vector3d) -> Vector4d {
    m * p.to_point4()
}

/// Divide a homogeneous vector by its `w` component
pub fn perspective_divide(h: &Vector4d) -> Result<Vector3d, MathError> {
    let w = h.w;
    if !w.is_finite() || w.abs() < EPSILON {
        return Err(MathError::DivisionByZero { w });
    }
    Ok(Vector3d::new(h.x / w, h.y / w, h.z / w))
}
