use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use crate::error::{BenchError, Result};
use crate::params;
use crate::request::Thunk;

/// Batch threshold used by the self-calibrating harness unless overridden.
pub const DEFAULT_MIN_DURATION: Duration = Duration::from_millis(200);

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Measured {
    pub repeat_count: u64,
    #[serde(rename = "elapsed_s", serialize_with = "as_secs_f64")]
    pub elapsed: Duration,
    /// Store calls behind one repetition. Only the nested sweep makes this
    /// more than one.
    pub calls_per_repeat: u64,
}

impl Measured {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }

    pub fn total_calls(&self) -> u64 {
        self.repeat_count.saturating_mul(self.calls_per_repeat)
    }

    pub fn secs_per_call(&self) -> f64 {
        self.elapsed_secs() / self.total_calls().max(1) as f64
    }
}

fn as_secs_f64<S: serde::Serializer>(d: &Duration, s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_secs_f64())
}

/// One calibration batch.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Trial {
    pub repeat_count: u64,
    #[serde(rename = "elapsed_s", serialize_with = "as_secs_f64")]
    pub elapsed: Duration,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Growth {
    /// 1, 2, 5, 10, 20, 50, ...
    #[default]
    OneTwoFive,
    /// Multiply by a fixed factor (at least 2).
    Factor(u64),
}

impl Growth {
    /// The batch size after `n`. Saturates at `u64::MAX`.
    pub fn next(self, n: u64) -> u64 {
        match self {
            Growth::Factor(f) => n.saturating_mul(f.max(2)),
            Growth::OneTwoFive => {
                let mut mag = 1u64;
                while n / mag >= 10 {
                    mag *= 10;
                }
                match n / mag {
                    1 => mag.saturating_mul(2),
                    2..=4 => mag.saturating_mul(5),
                    _ => mag.saturating_mul(10),
                }
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Calibration {
    pub min_duration: Duration,
    pub growth: Growth,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            min_duration: DEFAULT_MIN_DURATION,
            growth: Growth::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Timing {
    Fixed(u64),
    Auto(Calibration),
}

impl Timing {
    pub fn fixed(repeat_count: u64) -> Result<Self> {
        if repeat_count == 0 {
            return Err(BenchError::config(
                params::LOOP_CNT.name,
                "0",
                "at least one repetition is required",
            ));
        }
        Ok(Timing::Fixed(repeat_count))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timing::Fixed(_) => "fixed",
            Timing::Auto(_) => "auto",
        }
    }
}

/// A finished measurement with the calibration batches that led to it.
#[derive(Clone, Debug, PartialEq)]
pub struct Outcome {
    pub measured: Measured,
    pub trials: Vec<Trial>,
}

pub fn measure<T: Thunk + ?Sized>(timing: &Timing, thunk: &mut T) -> Result<Outcome> {
    match timing {
        Timing::Fixed(n) => Ok(Outcome {
            measured: measure_fixed(*n, thunk)?,
            trials: Vec::new(),
        }),
        Timing::Auto(calibration) => autorange(thunk, calibration),
    }
}

fn run_batch<T: Thunk + ?Sized>(repeat_count: u64, thunk: &mut T) -> Result<Duration> {
    let start = Instant::now();
    for _ in 0..repeat_count {
        thunk.invoke()?;
    }
    Ok(start.elapsed())
}

/// Invokes `thunk` exactly `repeat_count` times back to back and times the
/// whole batch.
pub fn measure_fixed<T: Thunk + ?Sized>(repeat_count: u64, thunk: &mut T) -> Result<Measured> {
    if repeat_count == 0 {
        return Err(BenchError::config(
            params::LOOP_CNT.name,
            "0",
            "at least one repetition is required",
        ));
    }
    let elapsed = run_batch(repeat_count, thunk)?;
    Ok(Measured {
        repeat_count,
        elapsed,
        calls_per_repeat: thunk.calls_per_invoke(),
    })
}

/// Runs growing batches until one takes at least `min_duration`, and returns
/// that batch.
///
/// The returned repeat count is whatever it took to cross the threshold, so a
/// faster store reports a larger one.
pub fn autorange<T: Thunk + ?Sized>(thunk: &mut T, calibration: &Calibration) -> Result<Outcome> {
    let mut trials = Vec::new();
    let mut repeat_count = 1u64;
    loop {
        let elapsed = run_batch(repeat_count, thunk)?;
        debug!(repeat_count, elapsed_s = elapsed.as_secs_f64(), "calibration batch");
        trials.push(Trial {
            repeat_count,
            elapsed,
        });

        let next = calibration.growth.next(repeat_count);
        if elapsed >= calibration.min_duration || next == repeat_count {
            return Ok(Outcome {
                measured: Measured {
                    repeat_count,
                    elapsed,
                    calls_per_repeat: thunk.calls_per_invoke(),
                },
                trials,
            });
        }
        repeat_count = next;
    }
}
