//! Numeric values produced by the calculator.
//!
//! Arithmetic follows the classic dynamic-language numeric tower: integers are
//! arbitrary precision and stay integers under `+ - * // %` and non-negative
//! `**`; true division always produces a float; mixing in a float promotes
//! the whole operation to floating point.

use super::errors::{EvalError, EvalResult};
use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};
use std::fmt;

/// Upper bound on the estimated size of an integer power result.
pub const MAX_POWER_BITS: u64 = 32_768;

/// Integers with more decimal digits than this are refused.
pub const MAX_INTEGER_DIGITS: usize = 4_300;

// Anything at or below this many bits has fewer than MAX_INTEGER_DIGITS digits.
const DIGIT_CHECK_BITS: u64 = 14_000;

/// A calculator value.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    Integer(BigInt),
    Float(f64),
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Integer(BigInt::from(value))
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl From<BigInt> for Number {
    fn from(value: BigInt) -> Self {
        Number::Integer(value)
    }
}

impl Number {
    /// Converts to `f64`, failing when an integer is too large to be represented.
    pub fn to_f64(&self) -> EvalResult<f64> {
        match self {
            Number::Integer(n) => n
                .to_f64()
                .filter(|f| f.is_finite())
                .ok_or(EvalError::Overflow("integer too large to convert to float")),
            Number::Float(f) => Ok(*f),
        }
    }

    pub fn add(&self, rhs: &Number) -> EvalResult<Number> {
        self.combine(rhs, |a, b| Ok(a + b), |a, b| Ok(a + b))
    }

    pub fn subtract(&self, rhs: &Number) -> EvalResult<Number> {
        self.combine(rhs, |a, b| Ok(a - b), |a, b| Ok(a - b))
    }

    pub fn multiply(&self, rhs: &Number) -> EvalResult<Number> {
        self.combine(rhs, |a, b| Ok(a * b), |a, b| Ok(a * b))
    }

    /// True division. Always yields a float.
    pub fn divide(&self, rhs: &Number) -> EvalResult<Number> {
        let divisor = rhs.to_f64()?;
        if rhs.is_zero() {
            return Err(EvalError::DivisionByZero);
        }
        Ok(Number::Float(self.to_f64()? / divisor))
    }

    /// Division rounded toward negative infinity.
    pub fn floor_divide(&self, rhs: &Number) -> EvalResult<Number> {
        self.combine(
            rhs,
            |a, b| integer_div_mod_floor(a, b).map(|(q, _)| q),
            |a, b| float_div_mod(a, b).map(|(q, _)| q),
        )
    }

    /// Remainder of floor division; takes the sign of the divisor.
    pub fn modulo(&self, rhs: &Number) -> EvalResult<Number> {
        self.combine(
            rhs,
            |a, b| integer_div_mod_floor(a, b).map(|(_, r)| r),
            |a, b| float_div_mod(a, b).map(|(_, r)| r),
        )
    }

    pub fn power(&self, rhs: &Number) -> EvalResult<Number> {
        match (self, rhs) {
            (Number::Integer(base), Number::Integer(exponent)) if !exponent.is_negative() => {
                integer_power(base, exponent)
            }
            _ => float_power(self.to_f64()?, rhs.to_f64()?).map(Number::Float),
        }
    }

    fn is_zero(&self) -> bool {
        match self {
            Number::Integer(n) => n.is_zero(),
            Number::Float(f) => *f == 0.0,
        }
    }

    fn combine(
        &self,
        rhs: &Number,
        integer_op: impl FnOnce(&BigInt, &BigInt) -> EvalResult<BigInt>,
        float_op: impl FnOnce(f64, f64) -> EvalResult<f64>,
    ) -> EvalResult<Number> {
        match (self, rhs) {
            (Number::Integer(a), Number::Integer(b)) => integer_op(a, b).and_then(checked_integer),
            _ => float_op(self.to_f64()?, rhs.to_f64()?).map(Number::Float),
        }
    }
}

impl std::ops::Neg for Number {
    type Output = Number;

    fn neg(self) -> Number {
        match self {
            Number::Integer(n) => Number::Integer(-n),
            Number::Float(f) => Number::Float(-f),
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(n) => write!(f, "{n}"),
            Number::Float(value) => f.write_str(&format_float(*value)),
        }
    }
}

fn checked_integer(n: BigInt) -> EvalResult<Number> {
    if n.bits() > DIGIT_CHECK_BITS && n.magnitude().to_string().len() > MAX_INTEGER_DIGITS {
        return Err(EvalError::Overflow("integer result has too many digits"));
    }
    Ok(Number::Integer(n))
}

fn integer_div_mod_floor(a: &BigInt, b: &BigInt) -> EvalResult<(BigInt, BigInt)> {
    if b.is_zero() {
        return Err(EvalError::DivisionByZero);
    }
    let quotient = a / b;
    let remainder = a % b;
    if !remainder.is_zero() && remainder.is_negative() != b.is_negative() {
        Ok((quotient - BigInt::one(), remainder + b))
    } else {
        Ok((quotient, remainder))
    }
}

/// Floor quotient and remainder of two floats, computed from `fmod` so the
/// pair stays consistent (`q * b + r == a` up to rounding).
fn float_div_mod(a: f64, b: f64) -> EvalResult<(f64, f64)> {
    if b == 0.0 {
        return Err(EvalError::DivisionByZero);
    }

    let mut remainder = a % b;
    let mut quotient = (a - remainder) / b;
    if remainder != 0.0 {
        if (b < 0.0) != (remainder < 0.0) {
            remainder += b;
            quotient -= 1.0;
        }
    } else {
        remainder = 0.0_f64.copysign(b);
    }

    let floor_quotient = if quotient != 0.0 {
        let mut floored = quotient.floor();
        if quotient - floored > 0.5 {
            floored += 1.0;
        }
        floored
    } else {
        0.0_f64.copysign(a / b)
    };

    Ok((floor_quotient, remainder))
}

fn integer_power(base: &BigInt, exponent: &BigInt) -> EvalResult<Number> {
    if exponent.is_zero() {
        return Ok(Number::Integer(BigInt::one()));
    }
    if base.is_zero() || base.is_one() {
        return Ok(Number::Integer(base.clone()));
    }
    if *base == -BigInt::one() {
        let odd = !(exponent % 2u32).is_zero();
        return Ok(Number::Integer(if odd { base.clone() } else { BigInt::one() }));
    }

    let exponent = exponent
        .to_u32()
        .filter(|e| u64::from(*e).saturating_mul(base.bits()) <= MAX_POWER_BITS)
        .ok_or(EvalError::Overflow("integer power too large"))?;
    checked_integer(base.pow(exponent))
}

fn float_power(base: f64, exponent: f64) -> EvalResult<f64> {
    if exponent == 0.0 {
        return Ok(1.0);
    }
    if base.is_nan() || exponent.is_nan() || base.is_infinite() || exponent.is_infinite() {
        return Ok(base.powf(exponent));
    }
    if base == 0.0 && exponent < 0.0 {
        return Err(EvalError::DivisionByZero);
    }
    if base < 0.0 && exponent.fract() != 0.0 {
        return Err(EvalError::NotReal);
    }

    let result = base.powf(exponent);
    if result.is_infinite() {
        return Err(EvalError::Overflow("float power out of range"));
    }
    Ok(result)
}

/// Shortest round-trip rendering of a float, always marked as a float:
/// `2.5`, `8.0`, `1e-05`, `1e+16`.
pub fn format_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value < 0.0 { "-inf" } else { "inf" }.to_string();
    }

    // `{:e}` yields the shortest digits that round-trip, e.g. "-1.2345e3".
    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let (sign, mantissa) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa),
    };

    if !(-4..16).contains(&exponent) {
        let exponent_sign = if exponent < 0 { '-' } else { '+' };
        return format!("{sign}{mantissa}e{exponent_sign}{:02}", exponent.abs());
    }

    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let point = exponent + 1;
    let body = if point <= 0 {
        format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
    } else {
        let point = point as usize;
        if point >= digits.len() {
            format!("{digits}{}.0", "0".repeat(point - digits.len()))
        } else {
            format!("{}.{}", &digits[..point], &digits[point..])
        }
    };
    format!("{sign}{body}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn int(value: i64) -> Number {
        Number::from(value)
    }

    fn float(value: f64) -> Number {
        Number::from(value)
    }

    #[test]
    fn test_float_display() {
        assert_eq!(format_float(2.5), "2.5");
        assert_eq!(format_float(8.0), "8.0");
        assert_eq!(format_float(-0.0), "-0.0");
        assert_eq!(format_float(0.0), "0.0");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(0.00001), "1e-05");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1234567890123456.0), "1234567890123456.0");
        assert_eq!(format_float(1.5e300), "1.5e+300");
        assert_eq!(format_float(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_float(-123.456), "-123.456");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_float(f64::NEG_INFINITY), "-inf");
        assert_eq!(format_float(f64::NAN), "nan");
    }

    #[test]
    fn test_integer_display() {
        assert_eq!(int(8).to_string(), "8");
        assert_eq!(int(-42).to_string(), "-42");
        assert_eq!(float(8.0).to_string(), "8.0");
    }

    #[test]
    fn test_integer_arithmetic_stays_integer() {
        assert_eq!(int(2).add(&int(3)).unwrap(), int(5));
        assert_eq!(int(2).subtract(&int(3)).unwrap(), int(-1));
        assert_eq!(int(4).multiply(&int(5)).unwrap(), int(20));
        assert_eq!(int(7).floor_divide(&int(2)).unwrap(), int(3));
        assert_eq!(int(7).modulo(&int(2)).unwrap(), int(1));
        assert_eq!(int(2).power(&int(3)).unwrap(), int(8));
    }

    #[test]
    fn test_true_division_is_float() {
        assert_eq!(int(10).divide(&int(4)).unwrap(), float(2.5));
        assert_eq!(int(15).divide(&int(3)).unwrap(), float(5.0));
    }

    #[test]
    fn test_mixed_operands_promote_to_float() {
        assert_eq!(int(1).add(&float(0.5)).unwrap(), float(1.5));
        assert_eq!(float(7.0).floor_divide(&int(2)).unwrap(), float(3.0));
        assert_eq!(int(2).power(&int(-1)).unwrap(), float(0.5));
    }

    #[test]
    fn test_floor_semantics_for_negative_operands() {
        assert_eq!(int(-7).floor_divide(&int(2)).unwrap(), int(-4));
        assert_eq!(int(-7).modulo(&int(2)).unwrap(), int(1));
        assert_eq!(int(7).modulo(&int(-2)).unwrap(), int(-1));
        assert_eq!(int(7).floor_divide(&int(-2)).unwrap(), int(-4));
        assert_eq!(float(7.5).floor_divide(&int(2)).unwrap(), float(3.0));
        assert_eq!(float(-7.5).modulo(&int(2)).unwrap(), float(0.5));

        let Number::Float(r) = int(-1).modulo(&float(0.3)).unwrap() else {
            panic!("expected float remainder");
        };
        assert!((r - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(int(5).divide(&int(0)), Err(EvalError::DivisionByZero));
        assert_eq!(int(5).modulo(&int(0)), Err(EvalError::DivisionByZero));
        assert_eq!(int(5).floor_divide(&int(0)), Err(EvalError::DivisionByZero));
        assert_eq!(float(5.0).divide(&float(0.0)), Err(EvalError::DivisionByZero));
        assert_eq!(float(5.0).modulo(&float(-0.0)), Err(EvalError::DivisionByZero));
        assert_eq!(int(0).power(&int(-1)), Err(EvalError::DivisionByZero));
    }

    #[test]
    fn test_big_integer_power() {
        let Number::Integer(n) = int(2).power(&int(100)).unwrap() else {
            panic!("expected integer");
        };
        assert_eq!(n.to_string(), "1267650600228229401496703205376");
    }

    #[test]
    fn test_trivial_bases_with_huge_exponents() {
        assert_eq!(int(1).power(&int(1_000_000_000)).unwrap(), int(1));
        assert_eq!(int(0).power(&int(1_000_000_000)).unwrap(), int(0));
        assert_eq!(int(-1).power(&int(1_000_000_001)).unwrap(), int(-1));
        assert_eq!(int(-1).power(&int(1_000_000_000)).unwrap(), int(1));
    }

    #[test]
    fn test_overflow_guards() {
        assert!(matches!(int(9).power(&int(1_000_000)), Err(EvalError::Overflow(_))));
        assert!(matches!(float(10.0).power(&int(400)), Err(EvalError::Overflow(_))));
        // 10**5000 fits the power guard but not the digit limit.
        assert!(matches!(int(10).power(&int(5000)), Err(EvalError::Overflow(_))));

        let huge = int(10).power(&int(400)).unwrap();
        assert!(matches!(huge.to_f64(), Err(EvalError::Overflow(_))));
        assert!(matches!(huge.add(&float(1.0)), Err(EvalError::Overflow(_))));
    }

    #[test]
    fn test_negative_base_fractional_exponent_is_not_real() {
        assert_eq!(int(-8).power(&float(0.5)), Err(EvalError::NotReal));
        assert_eq!(int(-8).power(&float(2.0)).unwrap(), float(64.0));
    }

    #[test]
    fn test_negation() {
        assert_eq!(-int(5), int(-5));
        assert_eq!(-float(2.5), float(-2.5));
        assert_eq!((-float(0.0)).to_string(), "-0.0");
    }
}
