//! Request envelopes and the thunks that replay them.
//!
//! A request is built once, before the reset and before timing starts. The
//! thunk only sends it; building it is never part of a timed batch.

use crate::config::{BenchmarkConfig, ScalarVerb};
use crate::error::{BenchError, Result};
use crate::payload::{self, Payload};
use crate::proto::{DSetRequest, PushRequest, SetRequest};
use crate::store::Store;
use crate::OperationKind;

#[derive(Clone, Debug, PartialEq)]
pub enum Request {
    Set(SetRequest),
    Push(PushRequest),
    DSet(DSetRequest),
}

impl Request {
    pub fn op_name(&self) -> &'static str {
        match self {
            Request::Set(_) => "Set",
            Request::Push(_) => "Push",
            Request::DSet(_) => "DSet",
        }
    }

    fn send<S: Store + ?Sized>(&self, store: &mut S) -> Result<()> {
        let op = self.op_name();
        let res = match self {
            Request::Set(r) => store.set(r.clone()).map(drop),
            Request::Push(r) => store.push(r.clone()).map(drop),
            Request::DSet(r) => store.dset(r.clone()).map(drop),
        };
        res.map_err(|status| BenchError::from_status(op, status))
    }
}

/// Wraps `payload` into the envelope for `config.operation`.
pub fn make_request(config: &BenchmarkConfig, payload: Payload) -> Result<Request> {
    if payload.kind() != config.operation {
        return Err(BenchError::Request(format!(
            "{:?} payload does not fit a {:?} operation",
            payload.kind(),
            config.operation
        )));
    }

    let key = config.target_key.clone();
    let req = match (config.operation, payload) {
        (OperationKind::NestedField, Payload::Field { field, value }) => {
            Request::DSet(DSetRequest {
                key,
                dkey: field,
                value: Some(payload::number(value)),
            })
        }
        (OperationKind::Scalar, p) if config.scalar_verb == ScalarVerb::Push => {
            Request::Push(PushRequest {
                key,
                value: Some(p.into_value()?),
                front: false,
            })
        }
        (OperationKind::ListAppend, p) => Request::Push(PushRequest {
            key,
            value: Some(p.into_value()?),
            front: config.front,
        }),
        (_, p) => Request::Set(SetRequest {
            key,
            value: Some(p.into_value()?),
        }),
    };
    Ok(req)
}

/// How one invocation of a thunk maps onto store calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Repetition {
    /// Every invocation sends the same prebuilt request once.
    SingleRequest,
    /// Every invocation writes fields `"0"..n` of the nested map, one call
    /// each. A timed repetition therefore stands for `n` store calls.
    FieldSweep(u64),
}

/// A deferred benchmarked call.
pub trait Thunk {
    fn invoke(&mut self) -> Result<()>;

    /// Store calls performed by one `invoke`.
    fn calls_per_invoke(&self) -> u64 {
        1
    }
}

impl<F> Thunk for F
where
    F: FnMut() -> Result<()>,
{
    fn invoke(&mut self) -> Result<()> {
        self()
    }
}

pub enum StoreThunk<'s, S: ?Sized> {
    Replay {
        store: &'s mut S,
        request: Request,
    },
    Sweep {
        store: &'s mut S,
        template: DSetRequest,
        fields: u64,
    },
}

impl<S: Store + ?Sized> Thunk for StoreThunk<'_, S> {
    fn invoke(&mut self) -> Result<()> {
        match self {
            StoreThunk::Replay { store, request } => request.send(&mut **store),
            StoreThunk::Sweep {
                store,
                template,
                fields,
            } => {
                for i in 0..*fields {
                    let req = DSetRequest {
                        key: template.key.clone(),
                        dkey: i.to_string().into_bytes(),
                        value: template.value.clone(),
                    };
                    (**store)
                        .dset(req)
                        .map_err(|status| BenchError::from_status("DSet", status))?;
                }
                Ok(())
            }
        }
    }

    fn calls_per_invoke(&self) -> u64 {
        match self {
            StoreThunk::Replay { .. } => 1,
            StoreThunk::Sweep { fields, .. } => *fields,
        }
    }
}

/// Checks that `repetition` can be applied to `request`.
pub fn check_repetition(request: &Request, repetition: Repetition) -> Result<()> {
    match (repetition, request) {
        (Repetition::SingleRequest, _) => Ok(()),
        (Repetition::FieldSweep(0), _) => Err(BenchError::Request(
            "a field sweep needs at least one field".to_string(),
        )),
        (Repetition::FieldSweep(_), Request::DSet(_)) => Ok(()),
        (Repetition::FieldSweep(_), other) => Err(BenchError::Request(format!(
            "a field sweep needs a DSet request, got {}",
            other.op_name()
        ))),
    }
}

/// Binds `request` to `store`. Performs no I/O.
pub fn make_thunk<S: Store + ?Sized>(
    store: &mut S,
    request: Request,
    repetition: Repetition,
) -> Result<StoreThunk<'_, S>> {
    check_repetition(&request, repetition)?;
    let thunk = match (repetition, request) {
        (Repetition::FieldSweep(fields), Request::DSet(template)) => StoreThunk::Sweep {
            store,
            template,
            fields,
        },
        (_, request) => StoreThunk::Replay { store, request },
    };
    Ok(thunk)
}
