//! Exact grades
//!
//! Grade comparisons drive every combinatorial decision in the engine
//! (grid placement, anchors, arrangement geometry), so grades are kept as
//! exact rationals. Floating point only appears when a result is reported.

use num::{BigInt, BigRational, One, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BipersError, Result};

/// Exact rational number
pub type Exact = BigRational;

/// Convert an exact value to the nearest `f64`
pub fn exact_to_f64(value: &Exact) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// Parse a decimal (`-1.25`, `3e-2`) or fraction (`7/4`) literal exactly
pub fn parse_exact(text: &str) -> Result<Exact> {
    let text = text.trim();
    let bad = || BipersError::input(format!("cannot parse '{}' as an exact number", text));

    if text.contains('/') {
        return text.parse::<Exact>().map_err(|_| bad());
    }

    let (mantissa, exponent) = match text.find(|c| c == 'e' || c == 'E') {
        Some(pos) => {
            let exp: i32 = text[pos + 1..].parse().map_err(|_| bad())?;
            (&text[..pos], exp)
        }
        None => (text, 0),
    };

    let (negative, digits) = match mantissa.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, mantissa.strip_prefix('+').unwrap_or(mantissa)),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, f),
        None => (digits, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(bad());
    }
    if !int_part.chars().chain(frac_part.chars()).all(|c| c.is_ascii_digit()) {
        return Err(bad());
    }

    let all_digits = format!("{}{}", int_part, frac_part);
    let mut numer: BigInt = all_digits.parse().map_err(|_| bad())?;
    if negative {
        numer = -numer;
    }
    let scale = exponent - frac_part.len() as i32;
    let ten = BigInt::from(10u32);
    let value = if scale >= 0 {
        Exact::from_integer(numer * ten.pow(scale as u32))
    } else {
        Exact::new(numer, ten.pow((-scale) as u32))
    };
    Ok(value)
}

/// One coordinate of a grade: a finite rational or +∞
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Coordinate {
    Finite(Exact),
    Infinite,
}

impl Coordinate {
    pub fn from_f64(value: f64) -> Result<Self> {
        if value == f64::INFINITY {
            return Ok(Coordinate::Infinite);
        }
        Exact::from_float(value)
            .map(Coordinate::Finite)
            .ok_or_else(|| BipersError::input(format!("grade value {} is not a finite number or +inf", value)))
    }

    /// Parse `inf`/`+inf`/`infinity` or an exact literal
    pub fn parse(text: &str) -> Result<Self> {
        match text.trim().to_ascii_lowercase().as_str() {
            "inf" | "+inf" | "infinity" | "+infinity" => Ok(Coordinate::Infinite),
            _ => parse_exact(text).map(Coordinate::Finite),
        }
    }

    pub fn finite(&self) -> Option<&Exact> {
        match self {
            Coordinate::Finite(v) => Some(v),
            Coordinate::Infinite => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, Coordinate::Finite(_))
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Coordinate::Finite(v) => exact_to_f64(v),
            Coordinate::Infinite => f64::INFINITY,
        }
    }
}

impl From<Exact> for Coordinate {
    fn from(value: Exact) -> Self {
        Coordinate::Finite(value)
    }
}

impl From<i64> for Coordinate {
    fn from(value: i64) -> Self {
        Coordinate::Finite(Exact::from_integer(BigInt::from(value)))
    }
}

impl From<i32> for Coordinate {
    fn from(value: i32) -> Self {
        Coordinate::from(value as i64)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coordinate::Finite(v) if v.is_integer() => write!(f, "{}", v.numer()),
            Coordinate::Finite(v) => write!(f, "{}", exact_to_f64(v)),
            Coordinate::Infinite => write!(f, "inf"),
        }
    }
}

/// A bigrade (x, y), partially ordered coordinatewise
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grade {
    pub x: Coordinate,
    pub y: Coordinate,
}

impl Grade {
    pub fn new(x: impl Into<Coordinate>, y: impl Into<Coordinate>) -> Self {
        Self { x: x.into(), y: y.into() }
    }

    pub fn from_f64(x: f64, y: f64) -> Result<Self> {
        Ok(Self { x: Coordinate::from_f64(x)?, y: Coordinate::from_f64(y)? })
    }

    /// Parse both coordinates from text, e.g. `Grade::parse("0.5", "inf")`
    pub fn parse(x: &str, y: &str) -> Result<Self> {
        Ok(Self { x: Coordinate::parse(x)?, y: Coordinate::parse(y)? })
    }

    pub fn origin() -> Self {
        Self::new(Exact::zero(), Exact::zero())
    }

    /// Coordinatewise ≤
    pub fn le(&self, other: &Grade) -> bool {
        self.x <= other.x && self.y <= other.y
    }

    /// Least upper bound
    pub fn join(&self, other: &Grade) -> Grade {
        Grade {
            x: self.x.clone().max(other.x.clone()),
            y: self.y.clone().max(other.y.clone()),
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn to_f64(&self) -> (f64, f64) {
        (self.x.to_f64(), self.y.to_f64())
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Exact midpoint of two values
pub(crate) fn midpoint(a: &Exact, b: &Exact) -> Exact {
    (a + b) / Exact::from_integer(BigInt::one() + BigInt::one())
}
