#[allow(unused_imports)]
use crate::core::prelude::*;

use crate::util::gg_float;
use num_traits::{One, Zero};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::iter::Sum;
use std::{
    fmt,
    fmt::Formatter,
    ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign},
};
use thiserror::Error;

/// Degenerate geometry that would otherwise produce non-finite values.
///
/// These are recoverable: the caller decides the fallback, usually skipping physics for the
/// affected node this frame.
#[derive(Error, Debug, Copy, Clone, PartialEq)]
pub enum GeometryError {
    #[error("cannot normalise a zero-length vector")]
    ZeroLengthVector,
    #[error("matrix is singular (det = {det})")]
    SingularMatrix { det: f32 },
}

/// Normalises an angle in radians into the half-open interval (-π, π].
///
/// # Examples
/// ```
/// use tank_arena::util::linalg::normalize_angle;
/// use std::f32::consts::PI;
/// assert!((normalize_angle(3.0 * PI / 2.0) + PI / 2.0).abs() < 1e-5);
/// assert_eq!(normalize_angle(-PI), PI);
/// ```
pub fn normalize_angle(radians: f32) -> f32 {
    let mut rv = radians % (2.0 * PI);
    if rv <= -PI {
        rv += 2.0 * PI;
    } else if rv > PI {
        rv -= 2.0 * PI;
    }
    rv
}

/// A 2D vector using 32-bit floating point coordinates.
///
/// The world is y-up: [`Vec2::up`] is `(0, 1)`. Equality is approximate, with tolerance
/// [`EPSILON`](crate::core::config::EPSILON).
#[derive(Default, Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl PartialEq for Vec2 {
    fn eq(&self, other: &Self) -> bool {
        (self.x - other.x).abs() < EPSILON && (self.y - other.y).abs() < EPSILON
    }
}

impl Vec2 {
    #[must_use]
    pub fn new(x: f32, y: f32) -> Vec2 {
        Vec2 { x, y }
    }
    #[must_use]
    pub fn right() -> Vec2 {
        Vec2 { x: 1.0, y: 0.0 }
    }
    #[must_use]
    pub fn up() -> Vec2 {
        Vec2 { x: 0.0, y: 1.0 }
    }
    #[must_use]
    pub fn left() -> Vec2 {
        Vec2 { x: -1.0, y: 0.0 }
    }
    #[must_use]
    pub fn down() -> Vec2 {
        Vec2 { x: 0.0, y: -1.0 }
    }
    #[must_use]
    pub fn one() -> Vec2 {
        Vec2 { x: 1.0, y: 1.0 }
    }
    #[must_use]
    pub fn zero() -> Vec2 {
        Vec2 { x: 0.0, y: 0.0 }
    }
    #[must_use]
    pub fn splat(v: f32) -> Vec2 {
        Vec2 { x: v, y: v }
    }

    /// Returns the squared length of the vector.
    ///
    /// Use this instead of [`len`](Vec2::len) when comparing lengths to avoid the square root.
    #[must_use]
    pub fn len_squared(&self) -> f32 {
        self.dot(*self)
    }
    #[must_use]
    pub fn len(&self) -> f32 {
        self.len_squared().sqrt()
    }

    /// Returns a unit vector in the same direction, or the zero vector if this vector has zero
    /// length. Prefer [`try_normed`](Vec2::try_normed) where a zero vector indicates a bug.
    #[must_use]
    pub fn normed(&self) -> Vec2 {
        self.try_normed().unwrap_or_else(|_| Vec2::zero())
    }
    pub fn try_normed(&self) -> Result<Vec2, GeometryError> {
        let len = self.len();
        if len < EPSILON || !gg_float::is_finite(len) {
            Err(GeometryError::ZeroLengthVector)
        } else {
            Ok(*self / len)
        }
    }
    /// Normalises in place. On error the vector is left unchanged.
    pub fn normalise(&mut self) -> Result<(), GeometryError> {
        *self = self.try_normed()?;
        Ok(())
    }

    #[must_use]
    pub fn component_wise(&self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x * other.x,
            y: self.y * other.y,
        }
    }
    #[must_use]
    pub fn abs(&self) -> Vec2 {
        Vec2 {
            x: self.x.abs(),
            y: self.y.abs(),
        }
    }

    #[must_use]
    pub fn dot(&self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }
    /// The z-component of the 3D cross product of `(self, 0)` and `(other, 0)`.
    #[must_use]
    pub fn cross(&self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }
    /// Returns a perpendicular vector of the same length, rotated a quarter turn clockwise.
    #[must_use]
    pub fn orthog(&self) -> Vec2 {
        Vec2 {
            x: self.y,
            y: -self.x,
        }
    }

    /// Rotates by `radians` using the same convention as [`Mat3x3::rotation`]: positive angles
    /// turn clockwise in the y-up world.
    #[must_use]
    pub fn rotated(&self, radians: f32) -> Vec2 {
        *self * Mat3x3::rotation(radians)
    }
    /// The angle `φ` such that `Vec2::right().rotated(φ)` points along this vector.
    ///
    /// # Examples
    /// ```
    /// use tank_arena::util::linalg::Vec2;
    /// let v = Vec2 { x: 0.0, y: 2.0 };
    /// assert!(Vec2::right().rotated(v.bearing()).almost_eq(v.normed()));
    /// ```
    #[must_use]
    pub fn bearing(&self) -> f32 {
        (-self.y).atan2(self.x)
    }

    /// Reflects this vector about a surface with the given unit normal.
    #[must_use]
    pub fn reflect(&self, normal: Vec2) -> Vec2 {
        *self - 2.0 * self.dot(normal) * normal
    }

    #[must_use]
    pub fn dist(&self, other: Vec2) -> f32 {
        (*self - other).len()
    }
    #[must_use]
    pub fn dist_squared(&self, other: Vec2) -> f32 {
        (*self - other).len_squared()
    }
    /// Perpendicular distance from this point to the infinite line through `start` and `end`.
    /// Falls back to the distance to `start` when the line is degenerate.
    #[must_use]
    pub fn dist_to_line(&self, start: Vec2, end: Vec2) -> f32 {
        let dir = end - start;
        match dir.try_normed() {
            Ok(dir) => (*self - start).cross(dir).abs(),
            Err(_) => self.dist(start),
        }
    }

    #[must_use]
    pub fn almost_eq(&self, rhs: Vec2) -> bool {
        (*self - rhs).len() < EPSILON
    }
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    #[must_use]
    pub fn extend(&self, z: f32) -> Vec3 {
        Vec3 {
            x: self.x,
            y: self.y,
            z,
        }
    }
}

impl Zero for Vec2 {
    fn zero() -> Self {
        Vec2::zero()
    }

    fn is_zero(&self) -> bool {
        self.almost_eq(Vec2::zero())
    }
}

impl From<[f32; 2]> for Vec2 {
    fn from(value: [f32; 2]) -> Self {
        Vec2 {
            x: value[0],
            y: value[1],
        }
    }
}
impl From<Vec2> for [f32; 2] {
    fn from(value: Vec2) -> Self {
        [value.x, value.y]
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if let Some(precision) = f.precision() {
            write!(f, "vec({:.*}, {:.*})", precision, self.x, precision, self.y)
        } else {
            write!(f, "vec({}, {})", self.x, self.y)
        }
    }
}

impl Add<Vec2> for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Self::Output {
        Vec2 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
        }
    }
}
impl AddAssign<Vec2> for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}
impl Sub<Vec2> for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Self::Output {
        Vec2 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
        }
    }
}
impl SubAssign<Vec2> for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}
impl Sum<Vec2> for Vec2 {
    fn sum<I: Iterator<Item = Vec2>>(iter: I) -> Self {
        iter.fold(Vec2::zero(), |acc, v| acc + v)
    }
}
impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Self::Output {
        rhs * self
    }
}
impl Mul<Vec2> for f32 {
    type Output = Vec2;

    fn mul(self, rhs: Vec2) -> Self::Output {
        Vec2 {
            x: self * rhs.x,
            y: self * rhs.y,
        }
    }
}
impl MulAssign<f32> for Vec2 {
    fn mul_assign(&mut self, rhs: f32) {
        self.x *= rhs;
        self.y *= rhs;
    }
}
impl Div<f32> for Vec2 {
    type Output = Vec2;

    fn div(self, rhs: f32) -> Self::Output {
        Vec2 {
            x: self.x / rhs,
            y: self.y / rhs,
        }
    }
}
impl DivAssign<f32> for Vec2 {
    fn div_assign(&mut self, rhs: f32) {
        self.x /= rhs;
        self.y /= rhs;
    }
}
impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Self::Output {
        Vec2 {
            x: -self.x,
            y: -self.y,
        }
    }
}

/// A 3D vector, used mostly as a homogeneous 2D point `(x, y, 1)` or direction `(x, y, 0)`.
#[derive(Default, Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl PartialEq for Vec3 {
    fn eq(&self, other: &Self) -> bool {
        (self.x - other.x).abs() < EPSILON
            && (self.y - other.y).abs() < EPSILON
            && (self.z - other.z).abs() < EPSILON
    }
}

impl Vec3 {
    #[must_use]
    pub fn new(x: f32, y: f32, z: f32) -> Vec3 {
        Vec3 { x, y, z }
    }
    #[must_use]
    pub fn zero() -> Vec3 {
        Vec3::new(0.0, 0.0, 0.0)
    }
    #[must_use]
    pub fn unit_z() -> Vec3 {
        Vec3::new(0.0, 0.0, 1.0)
    }

    #[must_use]
    pub fn dot(&self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
    #[must_use]
    pub fn cross(&self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }
    #[must_use]
    pub fn magnitude_squared(&self) -> f32 {
        self.dot(*self)
    }
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        self.magnitude_squared().sqrt()
    }
    /// Normalises in place. On error the vector is left unchanged.
    pub fn normalise(&mut self) -> Result<(), GeometryError> {
        let magnitude = self.magnitude();
        if magnitude < EPSILON || !gg_float::is_finite(magnitude) {
            return Err(GeometryError::ZeroLengthVector);
        }
        *self = *self / magnitude;
        Ok(())
    }
    #[must_use]
    pub fn xy(&self) -> Vec2 {
        Vec2 {
            x: self.x,
            y: self.y,
        }
    }
}

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "vec({}, {}, {})", self.x, self.y, self.z)
    }
}

impl Add<Vec3> for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Self::Output {
        Vec3 {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            z: self.z + rhs.z,
        }
    }
}
/// Adds `rhs` to every component.
impl Add<f32> for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: f32) -> Self::Output {
        Vec3 {
            x: self.x + rhs,
            y: self.y + rhs,
            z: self.z + rhs,
        }
    }
}
impl Sub<Vec3> for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Self::Output {
        Vec3 {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}
impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Self::Output {
        rhs * self
    }
}
impl Mul<Vec3> for f32 {
    type Output = Vec3;

    fn mul(self, rhs: Vec3) -> Self::Output {
        Vec3 {
            x: self * rhs.x,
            y: self * rhs.y,
            z: self * rhs.z,
        }
    }
}
impl Div<f32> for Vec3 {
    type Output = Vec3;

    fn div(self, rhs: f32) -> Self::Output {
        Vec3 {
            x: self.x / rhs,
            y: self.y / rhs,
            z: self.z / rhs,
        }
    }
}
impl Neg for Vec3 {
    type Output = Vec3;

    fn neg(self) -> Self::Output {
        Vec3 {
            x: -self.x,
            y: -self.y,
            z: -self.z,
        }
    }
}

/// A row-major 3x3 matrix representing a homogeneous 2D affine transform.
///
/// Points are row vectors multiplied on the left, `p' = p * M`:
/// ```text
///               | xx xy xw |
/// (x, y, 1)  *  | yx yy yw |
///               | wx wy ww |
/// ```
/// The first two rows hold the rotation and scale; the third row holds the translation
/// `(tx, ty, 1)`. Transforms therefore compose left to right: `scale * rotation * translation`
/// scales first, then rotates, then translates, and a child's world matrix is
/// `child.local * parent.world`.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[must_use]
pub struct Mat3x3 {
    pub xx: f32,
    pub xy: f32,
    pub xw: f32,
    pub yx: f32,
    pub yy: f32,
    pub yw: f32,
    pub wx: f32,
    pub wy: f32,
    pub ww: f32,
}

impl Mat3x3 {
    pub fn one() -> Mat3x3 {
        Mat3x3::from_rows(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        )
    }
    pub fn zero() -> Mat3x3 {
        Mat3x3::from_rows(Vec3::zero(), Vec3::zero(), Vec3::zero())
    }
    pub fn from_rows(row1: Vec3, row2: Vec3, row3: Vec3) -> Mat3x3 {
        Mat3x3 {
            xx: row1.x,
            xy: row1.y,
            xw: row1.z,
            yx: row2.x,
            yy: row2.y,
            yw: row2.z,
            wx: row3.x,
            wy: row3.y,
            ww: row3.z,
        }
    }
    #[must_use]
    pub fn row1(&self) -> Vec3 {
        Vec3::new(self.xx, self.xy, self.xw)
    }
    #[must_use]
    pub fn row2(&self) -> Vec3 {
        Vec3::new(self.yx, self.yy, self.yw)
    }
    #[must_use]
    pub fn row3(&self) -> Vec3 {
        Vec3::new(self.wx, self.wy, self.ww)
    }

    /// Creates a translation matrix, with the offset in the third row.
    pub fn translation(dx: f32, dy: f32) -> Mat3x3 {
        Mat3x3 {
            wx: dx,
            wy: dy,
            ..Mat3x3::one()
        }
    }
    pub fn translation_vec2(vec2: Vec2) -> Mat3x3 {
        Self::translation(vec2.x, vec2.y)
    }
    pub fn scale(sx: f32, sy: f32) -> Mat3x3 {
        Mat3x3 {
            xx: sx,
            yy: sy,
            ..Mat3x3::one()
        }
    }
    pub fn scale_vec2(vec2: Vec2) -> Mat3x3 {
        Self::scale(vec2.x, vec2.y)
    }

    /// Creates a rotation matrix:
    /// ```text
    /// |  cos(θ)  -sin(θ)  0 |
    /// |  sin(θ)   cos(θ)  0 |
    /// |  0        0       1 |
    /// ```
    /// Applied to row vectors, a positive angle turns clockwise in the y-up world.
    ///
    /// # Examples
    /// ```
    /// use tank_arena::util::linalg::{Mat3x3, Vec2};
    /// let rotated = Vec2::up() * Mat3x3::rotation(std::f32::consts::FRAC_PI_2);
    /// assert!(rotated.almost_eq(Vec2::right()));
    /// ```
    pub fn rotation(radians: f32) -> Mat3x3 {
        let (sin, cos) = radians.sin_cos();
        Mat3x3 {
            xx: cos,
            xy: -sin,
            yx: sin,
            yy: cos,
            ..Mat3x3::one()
        }
    }

    /// Creates the rotation by `radians` about an arbitrary `axis` (Rodrigues' formula).
    /// About the z-axis this agrees with [`Mat3x3::rotation`].
    pub fn from_axis_angle(mut axis: Vec3, radians: f32) -> Result<Mat3x3, GeometryError> {
        axis.normalise()?;
        let (sin, cos) = radians.sin_cos();
        let t = 1.0 - cos;
        let Vec3 { x, y, z } = axis;
        Ok(Mat3x3 {
            xx: cos + t * x * x,
            xy: t * x * y - sin * z,
            xw: t * x * z + sin * y,
            yx: t * x * y + sin * z,
            yy: cos + t * y * y,
            yw: t * y * z - sin * x,
            wx: t * x * z - sin * y,
            wy: t * y * z + sin * x,
            ww: cos + t * z * z,
        })
    }

    #[must_use]
    pub fn det(&self) -> f32 {
        self.xx * (self.yy * self.ww - self.yw * self.wy)
            - self.xy * (self.yx * self.ww - self.yw * self.wx)
            + self.xw * (self.yx * self.wy - self.yy * self.wx)
    }

    /// Returns the inverse via the adjugate, or [`GeometryError::SingularMatrix`] if the
    /// determinant is negligible next to the product of the row lengths (its largest possible
    /// magnitude). Uniformly small matrices therefore still invert.
    pub fn inverse(&self) -> Result<Mat3x3, GeometryError> {
        let det = self.det();
        let bound = self.row1().magnitude() * self.row2().magnitude() * self.row3().magnitude();
        if !det.is_finite() || det.abs() <= EPSILON * bound {
            return Err(GeometryError::SingularMatrix { det });
        }
        let adjugate = Mat3x3 {
            xx: self.yy * self.ww - self.yw * self.wy,
            xy: self.xw * self.wy - self.xy * self.ww,
            xw: self.xy * self.yw - self.xw * self.yy,
            yx: self.yw * self.wx - self.yx * self.ww,
            yy: self.xx * self.ww - self.xw * self.wx,
            yw: self.xw * self.yx - self.xx * self.yw,
            wx: self.yx * self.wy - self.yy * self.wx,
            wy: self.xy * self.wx - self.xx * self.wy,
            ww: self.xx * self.yy - self.xy * self.yx,
        };
        Ok(adjugate / det)
    }

    pub fn transposed(&self) -> Mat3x3 {
        Mat3x3 {
            xx: self.xx,
            xy: self.yx,
            xw: self.wx,
            yx: self.xy,
            yy: self.yy,
            yw: self.wy,
            wx: self.xw,
            wy: self.yw,
            ww: self.ww,
        }
    }

    /// The translation held in the third row.
    #[must_use]
    pub fn translation_part(&self) -> Vec2 {
        Vec2 {
            x: self.wx,
            y: self.wy,
        }
    }
    /// Recovers the rotation angle from the first row, ignoring any scale.
    #[must_use]
    pub fn world_rotation(&self) -> f32 {
        (-self.xy).atan2(self.xx)
    }
    /// The first two rows as 2D basis vectors, scaled.
    #[must_use]
    pub fn basis(&self) -> (Vec2, Vec2) {
        (self.row1().xy(), self.row2().xy())
    }

    #[must_use]
    pub fn almost_eq(&self, rhs: Mat3x3) -> bool {
        f32::abs(self.xx - rhs.xx) < EPSILON
            && f32::abs(self.xy - rhs.xy) < EPSILON
            && f32::abs(self.xw - rhs.xw) < EPSILON
            && f32::abs(self.yx - rhs.yx) < EPSILON
            && f32::abs(self.yy - rhs.yy) < EPSILON
            && f32::abs(self.yw - rhs.yw) < EPSILON
            && f32::abs(self.wx - rhs.wx) < EPSILON
            && f32::abs(self.wy - rhs.wy) < EPSILON
            && f32::abs(self.ww - rhs.ww) < EPSILON
    }
    #[must_use]
    pub fn is_finite(&self) -> bool {
        [
            self.xx, self.xy, self.xw, self.yx, self.yy, self.yw, self.wx, self.wy, self.ww,
        ]
        .iter()
        .all(|x| x.is_finite())
    }
}

impl Default for Mat3x3 {
    fn default() -> Self {
        Self::one()
    }
}

impl One for Mat3x3 {
    fn one() -> Self {
        Self::one()
    }
}

impl Zero for Mat3x3 {
    fn zero() -> Self {
        Self::zero()
    }

    fn is_zero(&self) -> bool {
        self.almost_eq(Self::zero())
    }
}

impl fmt::Display for Mat3x3 {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "mat[{}, {}, {}; {}, {}, {}; {}, {}, {}]",
            self.xx, self.xy, self.xw, self.yx, self.yy, self.yw, self.wx, self.wy, self.ww
        )
    }
}

impl Add<Mat3x3> for Mat3x3 {
    type Output = Mat3x3;

    fn add(self, rhs: Mat3x3) -> Self::Output {
        Mat3x3 {
            xx: self.xx + rhs.xx,
            xy: self.xy + rhs.xy,
            xw: self.xw + rhs.xw,
            yx: self.yx + rhs.yx,
            yy: self.yy + rhs.yy,
            yw: self.yw + rhs.yw,
            wx: self.wx + rhs.wx,
            wy: self.wy + rhs.wy,
            ww: self.ww + rhs.ww,
        }
    }
}
impl AddAssign<Mat3x3> for Mat3x3 {
    fn add_assign(&mut self, rhs: Mat3x3) {
        *self = *self + rhs;
    }
}

impl Mul<f32> for Mat3x3 {
    type Output = Mat3x3;

    fn mul(self, rhs: f32) -> Self::Output {
        rhs * self
    }
}
impl Mul<Mat3x3> for f32 {
    type Output = Mat3x3;

    fn mul(self, rhs: Mat3x3) -> Self::Output {
        Mat3x3 {
            xx: self * rhs.xx,
            xy: self * rhs.xy,
            xw: self * rhs.xw,
            yx: self * rhs.yx,
            yy: self * rhs.yy,
            yw: self * rhs.yw,
            wx: self * rhs.wx,
            wy: self * rhs.wy,
            ww: self * rhs.ww,
        }
    }
}
impl Div<f32> for Mat3x3 {
    type Output = Mat3x3;

    fn div(self, rhs: f32) -> Self::Output {
        (1.0 / rhs) * self
    }
}

impl Mul<Mat3x3> for Mat3x3 {
    type Output = Mat3x3;

    fn mul(self, rhs: Mat3x3) -> Self::Output {
        Mat3x3 {
            xx: self.xx * rhs.xx + self.xy * rhs.yx + self.xw * rhs.wx,
            xy: self.xx * rhs.xy + self.xy * rhs.yy + self.xw * rhs.wy,
            xw: self.xx * rhs.xw + self.xy * rhs.yw + self.xw * rhs.ww,
            yx: self.yx * rhs.xx + self.yy * rhs.yx + self.yw * rhs.wx,
            yy: self.yx * rhs.xy + self.yy * rhs.yy + self.yw * rhs.wy,
            yw: self.yx * rhs.xw + self.yy * rhs.yw + self.yw * rhs.ww,
            wx: self.wx * rhs.xx + self.wy * rhs.yx + self.ww * rhs.wx,
            wy: self.wx * rhs.xy + self.wy * rhs.yy + self.ww * rhs.wy,
            ww: self.wx * rhs.xw + self.wy * rhs.yw + self.ww * rhs.ww,
        }
    }
}
impl MulAssign<Mat3x3> for Mat3x3 {
    fn mul_assign(&mut self, rhs: Mat3x3) {
        *self = *self * rhs;
    }
}

impl Mul<Mat3x3> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: Mat3x3) -> Self::Output {
        Vec3 {
            x: self.x * rhs.xx + self.y * rhs.yx + self.z * rhs.wx,
            y: self.x * rhs.xy + self.y * rhs.yy + self.z * rhs.wy,
            z: self.x * rhs.xw + self.y * rhs.yw + self.z * rhs.ww,
        }
    }
}

/// Treats the vector as the homogeneous point `(x, y, 1)`.
impl Mul<Mat3x3> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: Mat3x3) -> Self::Output {
        (self.extend(1.0) * rhs).xy()
    }
}
impl MulAssign<Mat3x3> for Vec2 {
    fn mul_assign(&mut self, rhs: Mat3x3) {
        *self = *self * rhs;
    }
}
