//! One benchmark run: payload, request, reset, timing.

use tracing::info;

use crate::config::{BenchmarkConfig, ScalarVerb};
use crate::error::Result;
use crate::harness::{self, Calibration, Outcome, Timing};
use crate::params::BenchParams;
use crate::payload;
use crate::request::{self, Request};
use crate::reset;
use crate::store::Store;
use crate::OperationKind;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Read the key back after the reset and fail if it is still there.
    pub verify_reset: bool,
}

/// What was sent, next to how long it took.
#[derive(Clone, Debug, PartialEq)]
pub struct RunResult {
    pub outcome: Outcome,
    pub store_call: &'static str,
    pub payload_bytes: u64,
}

/// How the repeat count of a run is chosen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TimingMode {
    /// `ENV_LOOP_CNT` repetitions.
    Fixed,
    Auto(Calibration),
}

/// What the caller asked for, before any parameter is resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSpec {
    pub key: Vec<u8>,
    pub operation: OperationKind,
    pub seed: f64,
    pub scalar_verb: ScalarVerb,
    pub front: bool,
    pub timing: TimingMode,
}

impl RunSpec {
    pub fn new(key: impl Into<Vec<u8>>, operation: OperationKind) -> Self {
        Self {
            key: key.into(),
            operation,
            seed: 42.0,
            scalar_verb: ScalarVerb::Set,
            front: false,
            timing: TimingMode::Auto(Calibration::default()),
        }
    }
}

/// A fully resolved run.
#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    pub params: BenchParams,
    pub config: BenchmarkConfig,
    pub timing: Timing,
}

/// Resolves parameters, config and timing. Touches no store.
pub fn prepare<F>(lookup: F, spec: &RunSpec) -> Result<Plan>
where
    F: Fn(&str) -> Result<Option<String>>,
{
    let params = BenchParams::try_from_lookup(lookup)?;
    let config = BenchmarkConfig::from_params(spec.key.clone(), spec.operation, &params)?
        .with_seed(spec.seed)
        .with_scalar_verb(spec.scalar_verb)
        .with_front(spec.front);
    let timing = match spec.timing {
        TimingMode::Fixed => Timing::fixed(params.loop_cnt)?,
        TimingMode::Auto(calibration) => Timing::Auto(calibration),
    };
    Ok(Plan {
        params,
        config,
        timing,
    })
}

/// Prepares the run and only then calls `connect`, so a bad parameter never
/// reaches the store.
pub fn launch<F, S, C>(
    lookup: F,
    spec: &RunSpec,
    options: RunOptions,
    connect: C,
) -> Result<(Plan, S, RunResult)>
where
    F: Fn(&str) -> Result<Option<String>>,
    S: Store,
    C: FnOnce() -> Result<S>,
{
    let plan = prepare(lookup, spec)?;
    let mut store = connect()?;
    let result = run(&mut store, &plan.config, &plan.timing, options)?;
    Ok((plan, store, result))
}

/// Builds the request, resets the target key and times the thunk.
///
/// The request is built and checked before the reset, so a shape error never
/// touches the store. Any failure ends the run without a measurement.
pub fn run<S: Store + ?Sized>(
    store: &mut S,
    config: &BenchmarkConfig,
    timing: &Timing,
    options: RunOptions,
) -> Result<RunResult> {
    let payload = payload::build(config.operation, config.size_param, config.value_seed)?;
    let payload_bytes = payload.data_len();
    let request: Request = request::make_request(config, payload)?;
    let store_call = request.op_name();
    request::check_repetition(&request, config.repetition())?;

    if options.verify_reset {
        reset::reset_verified(store, &config.target_key)?;
    } else {
        reset::reset(store, &config.target_key)?;
    }

    let mut thunk = request::make_thunk(store, request, config.repetition())?;
    info!(
        operation = ?config.operation,
        store_call,
        size = config.size_param,
        timing = timing.as_str(),
        "starting measurement"
    );
    let outcome = harness::measure(timing, &mut thunk)?;
    info!(
        repeat_count = outcome.measured.repeat_count,
        elapsed_s = outcome.measured.elapsed_secs(),
        calls_per_repeat = outcome.measured.calls_per_repeat,
        "measurement finished"
    );

    Ok(RunResult {
        outcome,
        store_call,
        payload_bytes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BenchError;
    use crate::harness::Growth;
    use crate::payload::number;
    use crate::proto::SetRequest;
    use crate::store::MemoryStore;
    use std::time::Duration;

    fn quick() -> Timing {
        Timing::Auto(Calibration {
            min_duration: Duration::from_millis(5),
            growth: Growth::Factor(4),
        })
    }

    #[test]
    fn test_fixed_list_run_starts_from_clean_key() {
        let mut store = MemoryStore::new();
        let cfg = BenchmarkConfig::new("bench", OperationKind::ListAppend, 5);

        let first = run(&mut store, &cfg, &Timing::Fixed(10), RunOptions::default()).unwrap();
        assert_eq!(first.store_call, "Push");
        assert_eq!(first.payload_bytes, 40);
        assert_eq!(store.queue_len(b"bench"), Some(10));

        // A second run does not see the first run's queue.
        run(&mut store, &cfg, &Timing::Fixed(3), RunOptions::default()).unwrap();
        assert_eq!(store.queue_len(b"bench"), Some(3));
    }

    #[test]
    fn test_auto_nested_run_reports_sweep_width() {
        let mut store = MemoryStore::new();
        let cfg = BenchmarkConfig::new("map", OperationKind::NestedField, 8);
        let res = run(&mut store, &cfg, &quick(), RunOptions::default()).unwrap();

        let m = res.outcome.measured;
        assert_eq!(res.store_call, "DSet");
        assert_eq!(m.calls_per_repeat, 8);
        assert!(m.repeat_count >= 1);
        assert_eq!(store.field_count(b"map"), Some(8));

        // One Del, then every trial batch times eight DSet calls per repetition.
        let repeats: u64 = res.outcome.trials.iter().map(|t| t.repeat_count).sum();
        assert_eq!(store.calls(), 1 + repeats * 8);
    }

    #[test]
    fn test_scalar_push_and_verified_reset() {
        let mut store = MemoryStore::new();
        let cfg = BenchmarkConfig::new("single", OperationKind::Scalar, 1)
            .with_scalar_verb(ScalarVerb::Push);
        let options = RunOptions { verify_reset: true };

        run(&mut store, &cfg, &Timing::Fixed(10), options).unwrap();
        assert_eq!(store.queue_len(b"single"), Some(10));
        run(&mut store, &cfg, &Timing::Fixed(10), options).unwrap();
        assert_eq!(store.queue_len(b"single"), Some(10));
    }

    #[test]
    fn test_byte_string_overwrites() {
        let mut store = MemoryStore::new();
        let cfg = BenchmarkConfig::new("blob", OperationKind::ByteString, 0);
        let res = run(&mut store, &cfg, &quick(), RunOptions::default()).unwrap();
        assert_eq!(res.store_call, "Set");
        assert_eq!(res.payload_bytes, 0);
        assert!(store.contains_key(b"blob"));
    }

    #[test]
    fn test_stale_shape_is_cleared_by_reset() {
        let mut store = MemoryStore::new();
        let cfg = BenchmarkConfig::new("k", OperationKind::ListAppend, 1);

        // A scalar left at the key would make every push fail.
        store
            .set(SetRequest {
                key: b"k".to_vec(),
                value: Some(number(1.0)),
            })
            .unwrap();
        run(&mut store, &cfg, &Timing::Fixed(2), RunOptions::default()).unwrap();
        assert_eq!(store.queue_len(b"k"), Some(2));
    }

    #[test]
    fn test_shape_error_never_touches_store() {
        let mut store = MemoryStore::new();
        let cfg = BenchmarkConfig::new("k", OperationKind::NestedField, 0);
        let err = run(&mut store, &cfg, &Timing::Fixed(1), RunOptions::default()).unwrap_err();
        assert!(matches!(err, BenchError::Request(_)));
        assert_eq!(store.calls(), 0);
    }

    fn lookup_from(
        pairs: &'static [(&'static str, &'static str)],
    ) -> impl Fn(&str) -> Result<Option<String>> {
        move |name| {
            Ok(pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string()))
        }
    }

    #[test]
    fn test_prepare_applies_spec() {
        let spec = RunSpec {
            front: true,
            seed: 1.5,
            timing: TimingMode::Fixed,
            ..RunSpec::new("q", OperationKind::ListAppend)
        };
        let plan = prepare(lookup_from(&[("ENV_LIST_SIZE", "4"), ("ENV_LOOP_CNT", "7")]), &spec)
            .unwrap();
        assert_eq!(plan.config.size_param, 4);
        assert!(plan.config.front);
        assert_eq!(plan.config.value_seed, 1.5);
        assert_eq!(plan.timing, Timing::Fixed(7));
        assert_eq!(plan.params.loop_cnt, 7);
    }

    #[test]
    fn test_bad_parameter_fails_before_connecting() {
        let spec = RunSpec::new("k", OperationKind::ListAppend);
        let cases: [&'static [(&str, &str)]; 3] = [
            &[("ENV_LIST_SIZE", "abc")],
            &[("ENV_LOOP_CNT", "abc")],
            &[("ENV_DKEY_CNT", "-1")],
        ];
        for pairs in cases {
            let mut connects = 0;
            let err = launch(lookup_from(pairs), &spec, RunOptions::default(), || {
                connects += 1;
                Ok(MemoryStore::new())
            })
            .unwrap_err();
            assert!(err.is_config(), "unexpected error: {err}");
            assert_eq!(connects, 0);
        }

        // Fixed timing with no repetitions is rejected just as early.
        let spec = RunSpec {
            timing: TimingMode::Fixed,
            ..spec
        };
        let mut connects = 0;
        let err = launch(lookup_from(&[("ENV_LOOP_CNT", "0")]), &spec, RunOptions::default(), || {
            connects += 1;
            Ok(MemoryStore::new())
        })
        .unwrap_err();
        assert!(err.is_config());
        assert_eq!(connects, 0);
    }

    #[test]
    fn test_unallocatable_size_never_touches_store() {
        let spec = RunSpec {
            timing: TimingMode::Fixed,
            ..RunSpec::new("k", OperationKind::ByteString)
        };
        let (plan, store, _) =
            launch(lookup_from(&[]), &spec, RunOptions::default(), || Ok(MemoryStore::new()))
                .unwrap();
        assert_eq!(plan.config.size_param, 1);
        assert!(store.calls() > 0);

        let mut store = MemoryStore::new();
        let cfg = BenchmarkConfig::new("k", OperationKind::ByteString, u64::MAX);
        let err = run(&mut store, &cfg, &Timing::Fixed(1), RunOptions::default()).unwrap_err();
        assert!(err.is_config());
        assert_eq!(store.calls(), 0);
    }
}
