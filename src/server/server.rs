use crate::committer::{CommitError, EpochId, MutationId, MutationRequest, Version};
use crate::grpc::grpc_hydra_server::{GrpcHydra, GrpcHydraServer};
use crate::grpc::{ProtoCommitMutationReq, ProtoCommitMutationResult, ProtoLogMutationsReq, ProtoLogMutationsResult};
use crate::server::{ActiveCommitter, CommitterRouter, RpcServerShutdownSignal};
use bytes::Bytes;
use std::convert::TryFrom;
use std::net::SocketAddr;
use tonic::transport::Server;
use tonic::{Request, Response, Status};

/// RpcServer is the type that implements the Hydra gRPC interface. It hands each request to
/// whichever committer the router currently holds.
pub struct RpcServer {
    logger: slog::Logger,
    router: CommitterRouter,
}

impl RpcServer {
    pub fn new(logger: slog::Logger, router: CommitterRouter) -> Self {
        RpcServer { logger, router }
    }

    pub async fn run(self, socket_addr: SocketAddr, shutdown_signal: RpcServerShutdownSignal) {
        let logger = self.logger.clone();
        slog::info!(logger, "Listening on '{:?}'", socket_addr);

        let result = Server::builder()
            .add_service(GrpcHydraServer::new(self))
            .serve_with_shutdown(socket_addr, shutdown_signal.wait())
            .await;

        slog::info!(logger, "Server run() has exited: {:?}", result);
    }

    async fn handle_log_mutations(&self, rpc_request: ProtoLogMutationsReq) -> Result<ProtoLogMutationsResult, Status> {
        let follower = match self.router.current() {
            ActiveCommitter::Follower(follower) => follower,
            ActiveCommitter::Leader(_) => return Err(Status::failed_precondition("Peer is leading, not following")),
            ActiveCommitter::None => return Err(Status::unavailable("No active committer")),
        };

        let epoch_id = EpochId(rpc_request.epoch_id);
        let start_version = Version::from_revision(rpc_request.start_revision);
        let committed_version = Version::from_revision(rpc_request.committed_revision);
        let records = rpc_request.records.into_iter().map(Bytes::from).collect();

        let outcome = follower.log_mutations(epoch_id, start_version, records).await;
        if outcome.queued {
            // Replayed on resume. The leader must not count this peer yet.
            return Ok(ProtoLogMutationsResult { logged: false });
        }

        outcome.result.await.map_err(convert_commit_error)?;
        follower
            .commit_mutations(committed_version)
            .await
            .map_err(convert_commit_error)?;

        Ok(ProtoLogMutationsResult { logged: true })
    }

    async fn handle_commit_mutation(
        &self,
        rpc_request: ProtoCommitMutationReq,
    ) -> Result<ProtoCommitMutationResult, Status> {
        let mut request = MutationRequest::new(rpc_request.mutation_type, rpc_request.data);
        if !rpc_request.mutation_id.is_empty() {
            let id_bytes = <[u8; 16]>::try_from(rpc_request.mutation_id.as_slice())
                .map_err(|_| Status::invalid_argument("Mutation id must be 16 bytes"))?;
            request = request.with_mutation_id(MutationId(u128::from_be_bytes(id_bytes)));
        }

        let result = match self.router.current() {
            ActiveCommitter::Leader(leader) => leader.commit(request).await,
            ActiveCommitter::Follower(follower) => follower.forward(request).await,
            ActiveCommitter::None => return Err(Status::unavailable("No active committer")),
        };

        let response = result.map_err(convert_commit_error)?;
        Ok(ProtoCommitMutationResult {
            response_data: response.data.to_vec(),
        })
    }
}

fn convert_commit_error(error: CommitError) -> Status {
    let message = error.to_string();
    match error {
        CommitError::LocalFlushFailed | CommitError::QuorumNotReached { .. } => Status::unknown(message),
        CommitError::OutOfOrderMutations { .. } | CommitError::EpochMismatch { .. } => {
            Status::failed_precondition(message)
        }
        CommitError::InvalidMutation(_) => Status::invalid_argument(message),
        CommitError::Forwarding(_) | CommitError::NoLeaderChannel | CommitError::CommitterExited => {
            Status::unavailable(message)
        }
    }
}

#[async_trait::async_trait]
impl GrpcHydra for RpcServer {
    async fn log_mutations(
        &self,
        rpc_request_wrapped: Request<ProtoLogMutationsReq>,
    ) -> Result<Response<ProtoLogMutationsResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(
            self.logger,
            "ServerWire - LogMutations epoch={} start={} committed={} records={}",
            rpc_request.epoch_id,
            Version::from_revision(rpc_request.start_revision),
            Version::from_revision(rpc_request.committed_revision),
            rpc_request.records.len()
        );
        let rpc_result = self.handle_log_mutations(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }

    async fn commit_mutation(
        &self,
        rpc_request_wrapped: Request<ProtoCommitMutationReq>,
    ) -> Result<Response<ProtoCommitMutationResult>, Status> {
        let rpc_request = rpc_request_wrapped.into_inner();

        slog::debug!(self.logger, "ServerWire - CommitMutation type={}", rpc_request.mutation_type);
        let rpc_result = self.handle_commit_mutation(rpc_request).await;
        slog::debug!(self.logger, "ServerWire - {:?}", rpc_result);

        rpc_result.map(Response::new)
    }
}
