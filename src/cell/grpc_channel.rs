use crate::cell::{LogMutationsRequest, LogMutationsResponse, PeerChannel};
use crate::committer::{MutationRequest, MutationResponse, RpcError};
use crate::grpc::grpc_hydra_client::GrpcHydraClient;
use crate::grpc::{ProtoCommitMutationReq, ProtoLogMutationsReq};
use bytes::Bytes;
use std::net::SocketAddr;
use tonic::codegen::http::uri;
use tonic::transport::{Channel, Endpoint};

/// GrpcPeerChannel talks to one peer over tonic. The connection is established lazily and
/// re-established by tonic on failure, so creating one never blocks on the peer being up.
#[derive(Clone)]
pub struct GrpcPeerChannel {
    inner: GrpcHydraClient<Channel>,
}

impl GrpcPeerChannel {
    pub fn connect_lazy(addr: SocketAddr) -> Result<Self, ConnectError> {
        let url = format!("http://{}", addr);
        let channel = Endpoint::from_shared(url)?.connect_lazy()?;

        Ok(GrpcPeerChannel {
            inner: GrpcHydraClient::new(channel),
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("Invalid peer uri: {0}")]
    InvalidUri(#[from] uri::InvalidUri),
    #[error("Failed to create channel: {0}")]
    Transport(#[from] tonic::transport::Error),
}

#[async_trait::async_trait]
impl PeerChannel for GrpcPeerChannel {
    async fn log_mutations(&self, request: LogMutationsRequest) -> Result<LogMutationsResponse, RpcError> {
        let rpc_request = ProtoLogMutationsReq {
            epoch_id: request.epoch_id.0,
            start_revision: request.start_version.to_revision(),
            committed_revision: request.committed_version.to_revision(),
            records: request.records.into_iter().map(|r| r.to_vec()).collect(),
        };

        // Clients are cheap to clone and need `&mut self`.
        let mut client = self.inner.clone();
        let reply = client.log_mutations(rpc_request).await?.into_inner();

        Ok(LogMutationsResponse { logged: reply.logged })
    }

    async fn commit_mutation(&self, request: MutationRequest) -> Result<MutationResponse, RpcError> {
        let rpc_request = ProtoCommitMutationReq {
            mutation_type: request.mutation_type,
            data: request.data.to_vec(),
            mutation_id: request
                .mutation_id
                .map(|id| id.0.to_be_bytes().to_vec())
                .unwrap_or_default(),
        };

        let mut client = self.inner.clone();
        let reply = client.commit_mutation(rpc_request).await?.into_inner();

        Ok(MutationResponse {
            data: Bytes::from(reply.response_data),
        })
    }
}
