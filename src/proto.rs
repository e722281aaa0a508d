//! Wire contract of the `memdatabase.v1.MemoryDatabaseService` store.
//!
//! Only the unary calls the harness drives are declared. Field values use
//! `google.protobuf.Value`, so numbers, strings and lists share one envelope.

use prost::Message;
use prost_types::{Timestamp, Value};
use tonic::client::Grpc;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::Status;

#[derive(Clone, PartialEq, Message)]
pub struct DelRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub key: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct DelResponse {
    #[prost(message, optional, tag = "1")]
    pub del_time: Option<Timestamp>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SetRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub key: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub value: Option<Value>,
}

#[derive(Clone, PartialEq, Message)]
pub struct SetResponse {
    #[prost(message, optional, tag = "1")]
    pub set_time: Option<Timestamp>,
}

#[derive(Clone, PartialEq, Message)]
pub struct GetRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub key: Vec<u8>,
}

#[derive(Clone, PartialEq, Message)]
pub struct GetResponse {
    #[prost(message, optional, tag = "1")]
    pub value: Option<Value>,
}

#[derive(Clone, PartialEq, Message)]
pub struct PushRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub key: Vec<u8>,
    #[prost(message, optional, tag = "2")]
    pub value: Option<Value>,
    /// Push at the head instead of the tail.
    #[prost(bool, tag = "3")]
    pub front: bool,
}

#[derive(Clone, PartialEq, Message)]
pub struct PushResponse {
    /// Queue length after the push.
    #[prost(uint64, tag = "1")]
    pub count: u64,
    #[prost(message, optional, tag = "2")]
    pub push_time: Option<Timestamp>,
}

#[derive(Clone, PartialEq, Message)]
pub struct DSetRequest {
    #[prost(bytes = "vec", tag = "1")]
    pub key: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub dkey: Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub value: Option<Value>,
}

#[derive(Clone, PartialEq, Message)]
pub struct DSetResponse {
    /// Number of fields in the map after the insert.
    #[prost(uint64, tag = "1")]
    pub count: u64,
    #[prost(message, optional, tag = "2")]
    pub dset_time: Option<Timestamp>,
}

const DEL: &str = "/memdatabase.v1.MemoryDatabaseService/Del";
const SET: &str = "/memdatabase.v1.MemoryDatabaseService/Set";
const GET: &str = "/memdatabase.v1.MemoryDatabaseService/Get";
const PUSH: &str = "/memdatabase.v1.MemoryDatabaseService/Push";
const DSET: &str = "/memdatabase.v1.MemoryDatabaseService/DSet";

/// Async client for the store service.
#[derive(Clone, Debug)]
pub struct MemoryDatabaseClient {
    inner: Grpc<Channel>,
}

impl MemoryDatabaseClient {
    pub fn new(channel: Channel) -> Self {
        Self {
            inner: Grpc::new(channel),
        }
    }

    /// Eagerly connects, so an unreachable store fails here and not on the
    /// first timed call.
    pub async fn connect(endpoint: Endpoint) -> Result<Self, tonic::transport::Error> {
        let channel = endpoint.connect().await?;
        Ok(Self::new(channel))
    }

    async fn unary<Q, R>(&mut self, path: &'static str, request: Q) -> Result<R, Status>
    where
        Q: Message + Send + Sync + 'static,
        R: Message + Default + Send + Sync + 'static,
    {
        self.inner
            .ready()
            .await
            .map_err(|e| Status::unavailable(format!("service was not ready: {e}")))?;
        let codec: ProstCodec<Q, R> = ProstCodec::default();
        let response = self
            .inner
            .unary(
                tonic::Request::new(request),
                PathAndQuery::from_static(path),
                codec,
            )
            .await?;
        Ok(response.into_inner())
    }

    pub async fn del(&mut self, request: DelRequest) -> Result<DelResponse, Status> {
        self.unary(DEL, request).await
    }

    pub async fn set(&mut self, request: SetRequest) -> Result<SetResponse, Status> {
        self.unary(SET, request).await
    }

    pub async fn get(&mut self, request: GetRequest) -> Result<GetResponse, Status> {
        self.unary(GET, request).await
    }

    pub async fn push(&mut self, request: PushRequest) -> Result<PushResponse, Status> {
        self.unary(PUSH, request).await
    }

    pub async fn d_set(&mut self, request: DSetRequest) -> Result<DSetResponse, Status> {
        self.unary(DSET, request).await
    }
}
