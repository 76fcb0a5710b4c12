//! Finite field elements.
//!
//! A [`FieldElement`] pairs a value with the prime order of the field it
//! lives in, and every arithmetic operation checks that both operands
//! share an order before combining them. This mirrors the original
//! `FieldElement` type this crate's curve arithmetic is ported from: an
//! order/value pair with reduction enforced on construction, not bolted on
//! after the fact.

use std::fmt;

use crate::bigint::{mod_inverse_prime, mod_pow, Int};

/// An element of the finite field `Z/pZ` for some prime order `p`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldElement {
    order: Int,
    value: Int,
}

/// Two field elements were combined but belong to fields of different order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MismatchedOrder;

impl fmt::Display for MismatchedOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot combine field elements of different order")
    }
}

impl std::error::Error for MismatchedOrder {}

impl FieldElement {
    /// Creates a field element, reducing `value` modulo `order`.
    pub fn new(order: Int, value: Int) -> Self {
        let value = value % &order;
        FieldElement { order, value }
    }

    pub fn order(&self) -> &Int {
        &self.order
    }

    pub fn value(&self) -> &Int {
        &self.value
    }

    fn check_order(&self, other: &FieldElement) -> Result<(), MismatchedOrder> {
        if self.order != other.order {
            Err(MismatchedOrder)
        } else {
            Ok(())
        }
    }

    pub fn add(&self, other: &FieldElement) -> Result<FieldElement, MismatchedOrder> {
        self.check_order(other)?;
        Ok(FieldElement::new(
            self.order.clone(),
            &self.value + &other.value,
        ))
    }

    pub fn sub(&self, other: &FieldElement) -> Result<FieldElement, MismatchedOrder> {
        self.check_order(other)?;
        // Keep the subtraction non-negative before reducing: Int is unsigned.
        let sum = &self.value + &self.order - &other.value;
        Ok(FieldElement::new(self.order.clone(), sum))
    }

    pub fn mul(&self, other: &FieldElement) -> Result<FieldElement, MismatchedOrder> {
        self.check_order(other)?;
        Ok(FieldElement::new(
            self.order.clone(),
            &self.value * &other.value,
        ))
    }

    /// Raises this element to the power `exponent`, reduced modulo `order`.
    ///
    /// `exponent` may be any non-negative integer; callers that need a
    /// negative exponent (e.g. `p - 2` for an inverse) must pre-reduce it
    /// into `[0, order)` themselves, since [`crate::bigint::Int`] is
    /// unsigned.
    pub fn pow(&self, exponent: &Int) -> FieldElement {
        FieldElement::new(self.order.clone(), mod_pow(&self.value, exponent, &self.order))
    }

    /// The Fermat inverse: `value^(order - 2) mod order`.
    ///
    /// Valid only when `order` is prime, which holds for every field this
    /// crate constructs (the secp256k1 base field and scalar field).
    pub fn inverse(&self) -> FieldElement {
        FieldElement::new(self.order.clone(), mod_inverse_prime(&self.value, &self.order))
    }

    pub fn div(&self, other: &FieldElement) -> Result<FieldElement, MismatchedOrder> {
        self.mul(&other.inverse())
    }

    pub fn is_zero(&self) -> bool {
        self.value == Int::from(0u8)
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldElement_{}({})", self.order, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fe(order: u32, value: u32) -> FieldElement {
        FieldElement::new(Int::from(order), Int::from(value))
    }

    #[test]
    fn add_wraps_around_order() {
        let a = fe(7, 5);
        let b = fe(7, 4);
        assert_eq!(a.add(&b).unwrap(), fe(7, 2));
    }

    #[test]
    fn sub_wraps_around_order() {
        let a = fe(7, 2);
        let b = fe(7, 5);
        assert_eq!(a.sub(&b).unwrap(), fe(7, 4));
    }

    #[test]
    fn mul_reduces() {
        let a = fe(13, 5);
        let b = fe(13, 6);
        assert_eq!(a.mul(&b).unwrap(), fe(13, 4));
    }

    #[test]
    fn division_matches_inverse_multiplication() {
        let a = fe(19, 7);
        let b = fe(19, 5);
        let direct = a.div(&b).unwrap();
        let via_inverse = a.mul(&b.inverse()).unwrap();
        assert_eq!(direct, via_inverse);
    }

    #[test]
    fn mismatched_order_is_rejected() {
        let a = fe(7, 1);
        let b = fe(11, 1);
        assert!(a.add(&b).is_err());
    }

    #[test]
    fn pow_of_zero_exponent_is_one() {
        let a = fe(13, 9);
        assert_eq!(a.pow(&Int::from(0u8)), fe(13, 1));
    }
}
