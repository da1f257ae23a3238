use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Sub};

/// A computed or supplied value. Integer arithmetic stays integral until it
/// overflows `i64`, at which point it falls back to `f64`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int(value) => value as f64,
            Self::Float(value) => value,
        }
    }

    /// `None` for NaN and infinities, which reports treat as non-numeric.
    pub fn finite_f64(self) -> Option<f64> {
        let value = self.as_f64();
        value.is_finite().then_some(value)
    }

    pub fn is_zero(self) -> bool {
        match self {
            Self::Int(value) => value == 0,
            Self::Float(value) => value == 0.0,
        }
    }

    pub fn is_negative(self) -> bool {
        match self {
            Self::Int(value) => value < 0,
            Self::Float(value) => value < 0.0,
        }
    }

    fn combine(
        self,
        other: Number,
        int_op: fn(i64, i64) -> Option<i64>,
        float_op: fn(f64, f64) -> f64,
    ) -> Number {
        match (self, other) {
            (Self::Int(lhs), Self::Int(rhs)) => match int_op(lhs, rhs) {
                Some(value) => Self::Int(value),
                None => Self::Float(float_op(lhs as f64, rhs as f64)),
            },
            (lhs, rhs) => Self::Float(float_op(lhs.as_f64(), rhs.as_f64())),
        }
    }
}

impl Add for Number {
    type Output = Number;

    fn add(self, rhs: Number) -> Number {
        self.combine(rhs, i64::checked_add, |a, b| a + b)
    }
}

impl Sub for Number {
    type Output = Number;

    fn sub(self, rhs: Number) -> Number {
        self.combine(rhs, i64::checked_sub, |a, b| a - b)
    }
}

impl Mul for Number {
    type Output = Number;

    fn mul(self, rhs: Number) -> Number {
        self.combine(rhs, i64::checked_mul, |a, b| a * b)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) if value.is_nan() => f.write_str("nan"),
            Self::Float(value) if value.is_infinite() => {
                f.write_str(if value > 0.0 { "inf" } else { "-inf" })
            }
            Self::Float(value) if value.fract() == 0.0 && value.abs() < 1e16 => {
                write!(f, "{value:.1}")
            }
            Self::Float(value) if value.abs() < 1e-4 || value.abs() >= 1e16 => {
                write_exponent(f, value)
            }
            Self::Float(value) => write!(f, "{value}"),
        }
    }
}

/// Scientific form with a signed, at least two-digit exponent (`1e-05`).
fn write_exponent(f: &mut fmt::Formatter<'_>, value: f64) -> fmt::Result {
    let formatted = format!("{value:e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            write!(f, "{mantissa}e{sign}{digits:0>2}")
        }
        None => f.write_str(&formatted),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Power,
    SquareRoot,
    Factorial,
}

impl OperationKind {
    pub const ALL: [OperationKind; 7] = [
        Self::Addition,
        Self::Subtraction,
        Self::Multiplication,
        Self::Division,
        Self::Power,
        Self::SquareRoot,
        Self::Factorial,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Addition => "addition",
            Self::Subtraction => "subtraction",
            Self::Multiplication => "multiplication",
            Self::Division => "division",
            Self::Power => "power",
            Self::SquareRoot => "square_root",
            Self::Factorial => "factorial",
        }
    }

    /// First character upper-cased, e.g. `Square_root`.
    pub fn label(self) -> String {
        let mut chars = self.as_str().chars();
        match chars.next() {
            Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
            None => String::new(),
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs of one operation call. The variant decides which operand fields exist.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum Operands {
    Addition { a: Number, b: Number },
    Subtraction { a: Number, b: Number },
    Multiplication { a: Number, b: Number },
    Division { a: Number, b: Number },
    Power { base: Number, exponent: Number },
    SquareRoot { number: Number },
    Factorial { n: i64 },
}

impl Operands {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Addition { .. } => OperationKind::Addition,
            Self::Subtraction { .. } => OperationKind::Subtraction,
            Self::Multiplication { .. } => OperationKind::Multiplication,
            Self::Division { .. } => OperationKind::Division,
            Self::Power { .. } => OperationKind::Power,
            Self::SquareRoot { .. } => OperationKind::SquareRoot,
            Self::Factorial { .. } => OperationKind::Factorial,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OperationRecord {
    #[serde(flatten)]
    pub operands: Operands,
    pub result: Number,
}

impl OperationRecord {
    pub fn kind(&self) -> OperationKind {
        self.operands.kind()
    }
}
