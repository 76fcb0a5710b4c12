//! Points on a short Weierstrass curve `y² = x³ + ax + b`.
//!
//! A point is either the identity (`Infinity`) or an affine coordinate
//! pair satisfying the curve equation. Both variants carry the curve
//! coefficients `a, b` so that addition can check two points lie on the
//! same curve before combining them — the same check the field layer
//! makes for order, applied one level up.

use std::fmt;

use crate::bigint::Int;
use crate::field::FieldElement;

/// A point on an elliptic curve `y² = x³ + ax + b` over some field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Point {
    Infinity { a: FieldElement, b: FieldElement },
    Affine {
        a: FieldElement,
        b: FieldElement,
        x: FieldElement,
        y: FieldElement,
    },
}

/// A coordinate pair does not satisfy the curve equation, or two points
/// being combined live on different curves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointError {
    NotOnCurve,
    CurveMismatch,
}

impl fmt::Display for PointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PointError::NotOnCurve => write!(f, "point is not on the curve"),
            PointError::CurveMismatch => write!(f, "points belong to different curves"),
        }
    }
}

impl std::error::Error for PointError {}

impl Point {
    pub fn infinity(a: FieldElement, b: FieldElement) -> Point {
        Point::Infinity { a, b }
    }

    /// Builds an affine point, checking it satisfies `y² = x³ + ax + b`.
    pub fn affine(
        a: FieldElement,
        b: FieldElement,
        x: FieldElement,
        y: FieldElement,
    ) -> Result<Point, PointError> {
        let lhs = y.mul(&y).map_err(|_| PointError::CurveMismatch)?;
        let x_cubed = x.mul(&x).and_then(|x2| x2.mul(&x)).map_err(|_| PointError::CurveMismatch)?;
        let ax = a.mul(&x).map_err(|_| PointError::CurveMismatch)?;
        let rhs = x_cubed
            .add(&ax)
            .and_then(|v| v.add(&b))
            .map_err(|_| PointError::CurveMismatch)?;
        if lhs != rhs {
            return Err(PointError::NotOnCurve);
        }
        Ok(Point::Affine { a, b, x, y })
    }

    fn coeffs(&self) -> (&FieldElement, &FieldElement) {
        match self {
            Point::Infinity { a, b } => (a, b),
            Point::Affine { a, b, .. } => (a, b),
        }
    }

    fn same_curve(&self, other: &Point) -> bool {
        self.coeffs() == other.coeffs()
    }

    pub fn is_infinity(&self) -> bool {
        matches!(self, Point::Infinity { .. })
    }

    pub fn x(&self) -> Option<&FieldElement> {
        match self {
            Point::Affine { x, .. } => Some(x),
            Point::Infinity { .. } => None,
        }
    }

    pub fn y(&self) -> Option<&FieldElement> {
        match self {
            Point::Affine { y, .. } => Some(y),
            Point::Infinity { .. } => None,
        }
    }

    /// Adds two points on the same curve.
    ///
    /// `∞ + Q = Q`; a point added to its own reflection (`P + (-P)`)
    /// yields `∞`; doubling uses the tangent slope (giving `∞` when
    /// `y = 0`); otherwise the chord slope through the two distinct
    /// points.
    pub fn add(&self, other: &Point) -> Result<Point, PointError> {
        if !self.same_curve(other) {
            return Err(PointError::CurveMismatch);
        }
        match (self, other) {
            (Point::Infinity { .. }, _) => Ok(other.clone()),
            (_, Point::Infinity { .. }) => Ok(self.clone()),
            (
                Point::Affine { a, b, x: x1, y: y1 },
                Point::Affine { x: x2, y: y2, .. },
            ) => {
                if x1 == x2 && y1 != y2 {
                    return Ok(Point::Infinity { a: a.clone(), b: b.clone() });
                }
                if x1 == x2 && y1 == y2 {
                    if y1.is_zero() {
                        return Ok(Point::Infinity { a: a.clone(), b: b.clone() });
                    }
                    // Tangent slope: (3x1^2 + a) / (2y1)
                    let three = FieldElement::new(y1.order().clone(), Int::from(3u8));
                    let two = FieldElement::new(y1.order().clone(), Int::from(2u8));
                    let x1_sq = x1.mul(x1).unwrap();
                    let numerator = three.mul(&x1_sq).unwrap().add(a).unwrap();
                    let denominator = two.mul(y1).unwrap();
                    let slope = numerator.div(&denominator).unwrap();
                    let x3 = slope
                        .mul(&slope)
                        .unwrap()
                        .sub(&x1.add(x1).unwrap())
                        .unwrap();
                    let y3 = slope
                        .mul(&x1.sub(&x3).unwrap())
                        .unwrap()
                        .sub(y1)
                        .unwrap();
                    return Ok(Point::Affine { a: a.clone(), b: b.clone(), x: x3, y: y3 });
                }
                // Chord slope through two distinct points.
                let slope = y2.sub(y1).unwrap().div(&x2.sub(x1).unwrap()).unwrap();
                let x3 = slope
                    .mul(&slope)
                    .unwrap()
                    .sub(x1)
                    .unwrap()
                    .sub(x2)
                    .unwrap();
                let y3 = slope.mul(&x1.sub(&x3).unwrap()).unwrap().sub(y1).unwrap();
                Ok(Point::Affine { a: a.clone(), b: b.clone(), x: x3, y: y3 })
            }
        }
    }

    /// Scalar multiplication by double-and-add over the binary expansion
    /// of `scalar`.
    pub fn scalar_mul(&self, scalar: &Int) -> Point {
        let (a, b) = self.coeffs();
        let mut result = Point::Infinity { a: a.clone(), b: b.clone() };
        let mut addend = self.clone();
        let mut coefficient = scalar.clone();
        let zero = Int::from(0u8);
        let two = Int::from(2u8);
        while coefficient > zero {
            if &coefficient % &two == Int::from(1u8) {
                result = result.add(&addend).expect("same curve by construction");
            }
            addend = addend.add(&addend).expect("same curve by construction");
            coefficient /= &two;
        }
        result
    }
}
