use crate::errors::DomainError;
use crate::types::{Number, OperationRecord, Operands};

/// Records and counter for one program run. Append-only.
#[derive(Debug, Clone, Default)]
pub struct Session {
    records: Vec<OperationRecord>,
    operations_performed: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[OperationRecord] {
        &self.records
    }

    pub fn operations_performed(&self) -> u64 {
        self.operations_performed
    }

    fn push(&mut self, record: OperationRecord) {
        self.records.push(record);
        self.operations_performed += 1;
    }
}

/// Executes one operation at a time and records every successful call in its
/// session. Calls that fail a domain check leave the session untouched.
#[derive(Debug, Default)]
pub struct OperationEngine {
    session: Session,
}

impl OperationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_session(self) -> Session {
        self.session
    }

    pub fn add(&mut self, a: impl Into<Number>, b: impl Into<Number>) -> Number {
        let (a, b) = (a.into(), b.into());
        self.record(Operands::Addition { a, b }, a + b)
    }

    pub fn subtract(&mut self, a: impl Into<Number>, b: impl Into<Number>) -> Number {
        let (a, b) = (a.into(), b.into());
        self.record(Operands::Subtraction { a, b }, a - b)
    }

    pub fn multiply(&mut self, a: impl Into<Number>, b: impl Into<Number>) -> Number {
        let (a, b) = (a.into(), b.into());
        self.record(Operands::Multiplication { a, b }, a * b)
    }

    pub fn divide(
        &mut self,
        a: impl Into<Number>,
        b: impl Into<Number>,
    ) -> Result<Number, DomainError> {
        let (a, b) = (a.into(), b.into());
        if b.is_zero() {
            return Err(DomainError::DivisionByZero);
        }
        Ok(self.record(Operands::Division { a, b }, Number::Float(a.as_f64() / b.as_f64())))
    }

    pub fn power(&mut self, base: impl Into<Number>, exponent: impl Into<Number>) -> Number {
        let (base, exponent) = (base.into(), exponent.into());
        self.record(Operands::Power { base, exponent }, raise(base, exponent))
    }

    pub fn square_root(&mut self, number: impl Into<Number>) -> Result<Number, DomainError> {
        let number = number.into();
        if number.is_negative() {
            return Err(DomainError::NegativeSquareRoot);
        }
        Ok(self.record(Operands::SquareRoot { number }, Number::Float(number.as_f64().sqrt())))
    }

    pub fn factorial(&mut self, n: i64) -> Result<Number, DomainError> {
        if n < 0 {
            return Err(DomainError::NegativeFactorial);
        }
        Ok(self.record(Operands::Factorial { n }, factorial_of(n)))
    }

    /// Runs the operation described by `operands`.
    pub fn perform(&mut self, operands: Operands) -> Result<Number, DomainError> {
        match operands {
            Operands::Addition { a, b } => Ok(self.add(a, b)),
            Operands::Subtraction { a, b } => Ok(self.subtract(a, b)),
            Operands::Multiplication { a, b } => Ok(self.multiply(a, b)),
            Operands::Division { a, b } => self.divide(a, b),
            Operands::Power { base, exponent } => Ok(self.power(base, exponent)),
            Operands::SquareRoot { number } => self.square_root(number),
            Operands::Factorial { n } => self.factorial(n),
        }
    }

    fn record(&mut self, operands: Operands, result: Number) -> Number {
        self.session.push(OperationRecord { operands, result });
        result
    }
}

fn raise(base: Number, exponent: Number) -> Number {
    match (base, exponent) {
        (Number::Int(b), Number::Int(e)) if e >= 0 => u32::try_from(e)
            .ok()
            .and_then(|e| b.checked_pow(e))
            .map(Number::Int)
            .unwrap_or_else(|| Number::Float((b as f64).powf(e as f64))),
        (b, Number::Int(e)) => match i32::try_from(e) {
            Ok(e) => Number::Float(b.as_f64().powi(e)),
            Err(_) => Number::Float(b.as_f64().powf(e as f64)),
        },
        (b, e) => Number::Float(b.as_f64().powf(e.as_f64())),
    }
}

fn factorial_of(n: i64) -> Number {
    let mut acc = Number::Int(1);
    for k in 2..=n {
        acc = acc * Number::Int(k);
        if matches!(acc, Number::Float(v) if v.is_infinite()) {
            break;
        }
    }
    acc
}
