use tokio::runtime::{Builder, Runtime};
use tonic::transport::Endpoint;
use tonic::Status;
use tracing::info;

use super::Store;
use crate::error::{BenchError, Result};
use crate::proto::{
    DSetRequest, DSetResponse, DelRequest, DelResponse, GetRequest, GetResponse,
    MemoryDatabaseClient, PushRequest, PushResponse, SetRequest, SetResponse,
};

pub const DEFAULT_ADDR: &str = "http://localhost:50051";

/// Blocking handle on a remote store.
///
/// Owns a current-thread runtime and drives each call to completion before
/// returning, so calls are strictly sequential. Dropping the handle closes the
/// channel.
pub struct GrpcStore {
    // Dropped before the runtime that serves it.
    client: MemoryDatabaseClient,
    rt: Runtime,
    addr: String,
}

impl GrpcStore {
    pub fn connect(addr: &str) -> Result<Self> {
        let addr = normalize_addr(addr);
        let endpoint =
            Endpoint::from_shared(addr.clone()).map_err(|e| BenchError::connect(&addr, e))?;

        let rt = Builder::new_current_thread().enable_all().build()?;
        let client = rt
            .block_on(MemoryDatabaseClient::connect(endpoint))
            .map_err(|e| BenchError::connect(&addr, e))?;
        info!(%addr, "connected to store");

        Ok(Self { client, rt, addr })
    }

    pub fn addr(&self) -> &str {
        &self.addr
    }
}

/// `host:port` gets an `http://` scheme; anything with a scheme is kept.
pub fn normalize_addr(addr: &str) -> String {
    if addr.contains("://") {
        addr.to_string()
    } else {
        format!("http://{addr}")
    }
}

impl Store for GrpcStore {
    fn del(&mut self, request: DelRequest) -> Result<DelResponse, Status> {
        self.rt.block_on(self.client.del(request))
    }

    fn set(&mut self, request: SetRequest) -> Result<SetResponse, Status> {
        self.rt.block_on(self.client.set(request))
    }

    fn get(&mut self, request: GetRequest) -> Result<GetResponse, Status> {
        self.rt.block_on(self.client.get(request))
    }

    fn push(&mut self, request: PushRequest) -> Result<PushResponse, Status> {
        self.rt.block_on(self.client.push(request))
    }

    fn dset(&mut self, request: DSetRequest) -> Result<DSetResponse, Status> {
        self.rt.block_on(self.client.d_set(request))
    }
}
