use crate::engine::OperationEngine;
use crate::errors::DomainError;
use crate::logging::append_run_log;
use crate::types::{Number, OperationKind, OperationRecord, Operands};
use rand::Rng;
use serde::Serialize;
use serde_json::json;

pub const DEFAULT_TRIALS: usize = 10;

/// Divisors closer to zero than this are replaced with 1.0 before the call.
pub const NEAR_ZERO_DIVISOR: f64 = 0.001;

const OPERAND_SPAN: f64 = 100.0;
const POWER_BASE_SPAN: f64 = 10.0;
const MAX_POWER_EXPONENT: i64 = 5;
const SQUARE_ROOT_CEILING: f64 = 100.0;
const MAX_FACTORIAL_INPUT: i64 = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TrialOutcome {
    Recorded(OperationRecord),
    Skipped {
        operation: OperationKind,
        error: DomainError,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GenerationSummary {
    pub attempted: usize,
    pub recorded: usize,
    pub skipped: usize,
}

/// Picks one of the seven operations uniformly and draws its arguments.
pub fn draw_operands<R: Rng + ?Sized>(rng: &mut R) -> Operands {
    let kind = OperationKind::ALL[rng.gen_range(0..OperationKind::ALL.len())];
    draw_operands_for(kind, rng)
}

pub fn draw_operands_for<R: Rng + ?Sized>(kind: OperationKind, rng: &mut R) -> Operands {
    match kind {
        OperationKind::Addition => Operands::Addition {
            a: wide_operand(rng),
            b: wide_operand(rng),
        },
        OperationKind::Subtraction => Operands::Subtraction {
            a: wide_operand(rng),
            b: wide_operand(rng),
        },
        OperationKind::Multiplication => Operands::Multiplication {
            a: wide_operand(rng),
            b: wide_operand(rng),
        },
        OperationKind::Division => {
            let a = wide_operand(rng);
            let b = guard_divisor(rng.gen_range(-OPERAND_SPAN..=OPERAND_SPAN));
            Operands::Division {
                a,
                b: Number::Float(b),
            }
        }
        OperationKind::Power => Operands::Power {
            base: Number::Float(rng.gen_range(-POWER_BASE_SPAN..=POWER_BASE_SPAN)),
            exponent: Number::Int(rng.gen_range(0..=MAX_POWER_EXPONENT)),
        },
        OperationKind::SquareRoot => Operands::SquareRoot {
            number: Number::Float(rng.gen_range(0.0..SQUARE_ROOT_CEILING)),
        },
        OperationKind::Factorial => Operands::Factorial {
            n: rng.gen_range(0..=MAX_FACTORIAL_INPUT),
        },
    }
}

pub fn guard_divisor(b: f64) -> f64 {
    if b.abs() < NEAR_ZERO_DIVISOR {
        1.0
    } else {
        b
    }
}

fn wide_operand<R: Rng + ?Sized>(rng: &mut R) -> Number {
    Number::Float(rng.gen_range(-OPERAND_SPAN..=OPERAND_SPAN))
}

/// One trial: draw, then call the engine once. A domain failure abandons the
/// trial; nothing is retried.
pub fn run_trial<R: Rng + ?Sized>(engine: &mut OperationEngine, rng: &mut R) -> TrialOutcome {
    let operands = draw_operands(rng);
    match engine.perform(operands) {
        Ok(result) => {
            let record = OperationRecord { operands, result };
            append_run_log(
                "debug",
                "generator.trial.recorded",
                json!({
                    "index": engine.session().operations_performed(),
                    "record": record,
                }),
            );
            TrialOutcome::Recorded(record)
        }
        Err(error) => {
            append_run_log(
                "debug",
                "generator.trial.skipped",
                json!({
                    "operands": operands,
                    "error": error.to_string(),
                }),
            );
            TrialOutcome::Skipped {
                operation: operands.kind(),
                error,
            }
        }
    }
}

/// Attempts exactly `count` trials; fewer than `count` records may result.
pub fn generate_random_operations<R: Rng + ?Sized>(
    engine: &mut OperationEngine,
    rng: &mut R,
    count: usize,
) -> GenerationSummary {
    let mut summary = GenerationSummary::default();
    for _ in 0..count {
        summary.attempted += 1;
        match run_trial(engine, rng) {
            TrialOutcome::Recorded(_) => summary.recorded += 1,
            TrialOutcome::Skipped { .. } => summary.skipped += 1,
        }
    }
    append_run_log(
        "info",
        "generator.run.completed",
        json!({
            "attempted": summary.attempted,
            "recorded": summary.recorded,
            "skipped": summary.skipped,
            "operations_performed": engine.session().operations_performed(),
        }),
    );
    summary
}
