use serde::Serialize;

use crate::error::{BenchError, Result};
use crate::params::{self, BenchParams};
use crate::request::Repetition;
use crate::OperationKind;

/// Store call used by the scalar operation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ScalarVerb {
    /// Overwrite the key with the number.
    #[default]
    Set,
    /// Append the number to the queue at the key.
    Push,
}

/// Everything one run needs to know about what it sends. Built once.
#[derive(Clone, Debug, PartialEq)]
pub struct BenchmarkConfig {
    pub target_key: Vec<u8>,
    pub operation: OperationKind,
    pub size_param: u64,
    pub value_seed: f64,
    pub scalar_verb: ScalarVerb,
    /// Push at the head of the queue. Read by list appends only; every other
    /// operation, including scalar push, ignores it.
    pub front: bool,
}

impl BenchmarkConfig {
    pub fn new(target_key: impl Into<Vec<u8>>, operation: OperationKind, size_param: u64) -> Self {
        Self {
            target_key: target_key.into(),
            operation,
            size_param,
            value_seed: 42.0,
            scalar_verb: ScalarVerb::Set,
            front: false,
        }
    }

    /// Picks the size parameter that governs `operation`.
    pub fn from_params(
        target_key: impl Into<Vec<u8>>,
        operation: OperationKind,
        params: &BenchParams,
    ) -> Result<Self> {
        let size_param = match operation {
            OperationKind::Scalar => 1,
            OperationKind::ListAppend => params.list_size,
            OperationKind::ByteString => params.byte_size,
            OperationKind::NestedField => {
                if params.dkey_cnt == 0 {
                    return Err(BenchError::config(
                        params::DKEY_CNT.name,
                        "0",
                        "each repetition must write at least one field",
                    ));
                }
                params.dkey_cnt
            }
        };
        Ok(Self::new(target_key, operation, size_param))
    }

    pub fn with_seed(mut self, seed: f64) -> Self {
        self.value_seed = seed;
        self
    }

    pub fn with_scalar_verb(mut self, verb: ScalarVerb) -> Self {
        self.scalar_verb = verb;
        self
    }

    pub fn with_front(mut self, front: bool) -> Self {
        self.front = front;
        self
    }

    pub fn repetition(&self) -> Repetition {
        match self.operation {
            OperationKind::NestedField => Repetition::FieldSweep(self.size_param),
            _ => Repetition::SingleRequest,
        }
    }

    pub fn key_display(&self) -> String {
        String::from_utf8_lossy(&self.target_key).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_param_follows_operation() {
        let params = BenchParams {
            loop_cnt: 10,
            list_size: 5,
            byte_size: 128,
            dkey_cnt: 3,
        };
        let size = |op| BenchmarkConfig::from_params("k", op, &params).unwrap().size_param;
        assert_eq!(size(OperationKind::ListAppend), 5);
        assert_eq!(size(OperationKind::ByteString), 128);
        assert_eq!(size(OperationKind::NestedField), 3);
        assert_eq!(size(OperationKind::Scalar), 1);
    }

    #[test]
    fn test_zero_fields_rejected_for_nested() {
        let params = BenchParams {
            dkey_cnt: 0,
            ..BenchParams::default()
        };
        let err = BenchmarkConfig::from_params("k", OperationKind::NestedField, &params).unwrap_err();
        assert!(err.is_config());

        // Only the nested operation cares.
        assert!(BenchmarkConfig::from_params("k", OperationKind::ListAppend, &params).is_ok());
    }

    #[test]
    fn test_repetition_strategy() {
        let cfg = BenchmarkConfig::new("k", OperationKind::NestedField, 8);
        assert_eq!(cfg.repetition(), Repetition::FieldSweep(8));
        let cfg = BenchmarkConfig::new("k", OperationKind::ByteString, 8);
        assert_eq!(cfg.repetition(), Repetition::SingleRequest);
    }
}
