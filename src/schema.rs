use serde::Serialize;

use crate::harness::{Measured, Trial};
use crate::params::BenchParams;

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub schema_version: u32,
    pub bench_version: String,
    pub operation: String,
    pub store_call: String,
    pub target_key: String,
    pub addr: String,
    pub timing: String,
    pub params: BenchParams,
    pub value_seed: f64,
    pub payload_bytes: u64,
    pub timestamp_utc: String,
    pub git_sha: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Measurement {
    #[serde(flatten)]
    pub measured: Measured,
    pub total_calls: u64,
    pub s_per_call: f64,
    pub calls_per_s: f64,
}

impl From<Measured> for Measurement {
    fn from(measured: Measured) -> Self {
        let s_per_call = measured.secs_per_call();
        let calls_per_s = if s_per_call <= 0.0 {
            0.0
        } else {
            1.0 / s_per_call
        };
        Self {
            measured,
            total_calls: measured.total_calls(),
            s_per_call,
            calls_per_s,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BenchReport {
    pub run: RunMeta,
    pub measurement: Measurement,
    /// Calibration batches, oldest first. Empty for fixed timing.
    pub trials: Vec<Trial>,
}
