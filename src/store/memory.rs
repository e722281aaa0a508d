//! In-process store with the same observable semantics as the remote one.
//!
//! Backs the `--store memory` dry run, the unit tests and the criterion
//! benches, so the harness can be exercised without a server.

use std::collections::{BTreeMap, VecDeque};
use std::time::SystemTime;

use prost_types::Value;
use tonic::Status;

use super::Store;
use crate::proto::{
    DSetRequest, DSetResponse, DelRequest, DelResponse, GetRequest, GetResponse, PushRequest,
    PushResponse, SetRequest, SetResponse,
};

#[derive(Clone, Debug)]
enum Entry {
    Var(Value),
    Map(BTreeMap<Vec<u8>, Value>),
    Deq(VecDeque<Value>),
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    kv: BTreeMap<Vec<u8>, Entry>,
    calls: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calls served so far, of any kind.
    pub fn calls(&self) -> u64 {
        self.calls
    }

    pub fn contains_key(&self, key: &[u8]) -> bool {
        self.kv.contains_key(key)
    }

    pub fn queue_len(&self, key: &[u8]) -> Option<usize> {
        match self.kv.get(key)? {
            Entry::Deq(q) => Some(q.len()),
            _ => None,
        }
    }

    pub fn field_count(&self, key: &[u8]) -> Option<usize> {
        match self.kv.get(key)? {
            Entry::Map(m) => Some(m.len()),
            _ => None,
        }
    }
}

impl Store for MemoryStore {
    fn del(&mut self, request: DelRequest) -> Result<DelResponse, Status> {
        self.calls += 1;
        self.kv.remove(&request.key);
        Ok(DelResponse {
            del_time: Some(SystemTime::now().into()),
        })
    }

    fn set(&mut self, request: SetRequest) -> Result<SetResponse, Status> {
        self.calls += 1;
        let value = request
            .value
            .ok_or_else(|| Status::invalid_argument("no value specified"))?;
        self.kv.insert(request.key, Entry::Var(value));
        Ok(SetResponse {
            set_time: Some(SystemTime::now().into()),
        })
    }

    fn get(&mut self, request: GetRequest) -> Result<GetResponse, Status> {
        self.calls += 1;
        match self.kv.get(&request.key) {
            None => Err(Status::not_found("no value found")),
            Some(Entry::Var(v)) => Ok(GetResponse {
                value: Some(v.clone()),
            }),
            Some(_) => Err(Status::invalid_argument("invalid type")),
        }
    }

    fn push(&mut self, request: PushRequest) -> Result<PushResponse, Status> {
        self.calls += 1;
        let entry = self
            .kv
            .entry(request.key)
            .or_insert_with(|| Entry::Deq(VecDeque::new()));
        let Entry::Deq(q) = entry else {
            return Err(Status::invalid_argument("not a queue"));
        };
        let value = request
            .value
            .ok_or_else(|| Status::invalid_argument("the value missing"))?;
        if request.front {
            q.push_front(value);
        } else {
            q.push_back(value);
        }
        Ok(PushResponse {
            count: q.len() as u64,
            push_time: Some(SystemTime::now().into()),
        })
    }

    fn dset(&mut self, request: DSetRequest) -> Result<DSetResponse, Status> {
        self.calls += 1;
        let entry = self
            .kv
            .entry(request.key)
            .or_insert_with(|| Entry::Map(BTreeMap::new()));
        let Entry::Map(m) = entry else {
            return Err(Status::invalid_argument("the key is not a map"));
        };
        let value = request
            .value
            .ok_or_else(|| Status::invalid_argument("the value missing"))?;
        m.insert(request.dkey, value);
        Ok(DSetResponse {
            count: m.len() as u64,
            dset_time: Some(SystemTime::now().into()),
        })
    }
}
