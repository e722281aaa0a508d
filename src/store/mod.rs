//! The store under test, seen through its request/response contract.

use tonic::Status;

use crate::proto::{
    DSetRequest, DSetResponse, DelRequest, DelResponse, GetRequest, GetResponse, PushRequest,
    PushResponse, SetRequest, SetResponse,
};

pub mod grpc;
pub mod memory;

pub use grpc::GrpcStore;
pub use memory::MemoryStore;

/// Blocking access to a key-value store. Every call completes before it
/// returns; there is never more than one call in flight.
pub trait Store {
    fn del(&mut self, request: DelRequest) -> Result<DelResponse, Status>;
    fn set(&mut self, request: SetRequest) -> Result<SetResponse, Status>;
    fn get(&mut self, request: GetRequest) -> Result<GetResponse, Status>;
    fn push(&mut self, request: PushRequest) -> Result<PushResponse, Status>;
    fn dset(&mut self, request: DSetRequest) -> Result<DSetResponse, Status>;
}

impl<S: Store + ?Sized> Store for &mut S {
    fn del(&mut self, request: DelRequest) -> Result<DelResponse, Status> {
        (**self).del(request)
    }

    fn set(&mut self, request: SetRequest) -> Result<SetResponse, Status> {
        (**self).set(request)
    }

    fn get(&mut self, request: GetRequest) -> Result<GetResponse, Status> {
        (**self).get(request)
    }

    fn push(&mut self, request: PushRequest) -> Result<PushResponse, Status> {
        (**self).push(request)
    }

    fn dset(&mut self, request: DSetRequest) -> Result<DSetResponse, Status> {
        (**self).dset(request)
    }
}
