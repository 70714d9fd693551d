#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoLogMutationsReq {
    #[prost(uint64, tag = "1")]
    pub epoch_id: u64,
    /// (segment_id << 32) | record_id of the first record in `records`.
    #[prost(uint64, tag = "2")]
    pub start_revision: u64,
    /// Leader's applied version at the time the request was built.
    #[prost(uint64, tag = "3")]
    pub committed_revision: u64,
    #[prost(bytes = "vec", repeated, tag = "4")]
    pub records: ::prost::alloc::vec::Vec<::prost::alloc::vec::Vec<u8>>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoLogMutationsResult {
    /// true: records are durable on the follower. false: received and queued only.
    #[prost(bool, tag = "1")]
    pub logged: bool,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoCommitMutationReq {
    #[prost(string, tag = "1")]
    pub mutation_type: ::prost::alloc::string::String,
    #[prost(bytes = "vec", tag = "2")]
    pub data: ::prost::alloc::vec::Vec<u8>,
    /// Empty, or the 16 byte big endian mutation id.
    #[prost(bytes = "vec", tag = "3")]
    pub mutation_id: ::prost::alloc::vec::Vec<u8>,
}
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ProtoCommitMutationResult {
    #[prost(bytes = "vec", tag = "1")]
    pub response_data: ::prost::alloc::vec::Vec<u8>,
}
#[doc = r" Generated client implementations."]
pub mod grpc_hydra_client {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;
    #[doc = " Peer-to-peer RPCs of the mutation commit pipeline."]
    pub struct GrpcHydraClient<T> {
        inner: tonic::client::Grpc<T>,
    }
    impl GrpcHydraClient<tonic::transport::Channel> {
        #[doc = r" Attempt to create a new client by connecting to a given endpoint."]
        pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
        where
            D: std::convert::TryInto<tonic::transport::Endpoint>,
            D::Error: Into<StdError>,
        {
            let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
            Ok(Self::new(conn))
        }
    }
    impl<T> GrpcHydraClient<T>
    where
        T: tonic::client::GrpcService<tonic::body::BoxBody>,
        T::ResponseBody: Body + HttpBody + Send + 'static,
        T::Error: Into<StdError>,
        <T::ResponseBody as HttpBody>::Error: Into<StdError> + Send,
    {
        pub fn new(inner: T) -> Self {
            let inner = tonic::client::Grpc::new(inner);
            Self { inner }
        }
        pub fn with_interceptor(inner: T, interceptor: impl Into<tonic::Interceptor>) -> Self {
            let inner = tonic::client::Grpc::with_interceptor(inner, interceptor);
            Self { inner }
        }
        #[doc = " Leader -> follower: replicate a contiguous batch of serialized mutation records."]
        pub async fn log_mutations(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoLogMutationsReq>,
        ) -> Result<tonic::Response<super::ProtoLogMutationsResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/hydra.GrpcHydra/LogMutations");
            self.inner.unary(request.into_request(), path, codec).await
        }
        #[doc = " Any peer -> leader: commit a mutation on behalf of a peer that is not leading."]
        pub async fn commit_mutation(
            &mut self,
            request: impl tonic::IntoRequest<super::ProtoCommitMutationReq>,
        ) -> Result<tonic::Response<super::ProtoCommitMutationResult>, tonic::Status> {
            self.inner.ready().await.map_err(|e| {
                tonic::Status::new(
                    tonic::Code::Unknown,
                    format!("Service was not ready: {}", e.into()),
                )
            })?;
            let codec = tonic::codec::ProstCodec::default();
            let path = http::uri::PathAndQuery::from_static("/hydra.GrpcHydra/CommitMutation");
            self.inner.unary(request.into_request(), path, codec).await
        }
    }
    impl<T: Clone> Clone for GrpcHydraClient<T> {
        fn clone(&self) -> Self {
            Self {
                inner: self.inner.clone(),
            }
        }
    }
    impl<T> std::fmt::Debug for GrpcHydraClient<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "GrpcHydraClient {{ ... }}")
        }
    }
}
#[doc = r" Generated server implementations."]
pub mod grpc_hydra_server {
    #![allow(unused_variables, dead_code, missing_docs)]
    use tonic::codegen::*;
    #[doc = "Generated trait containing gRPC methods that should be implemented for use with GrpcHydraServer."]
    #[async_trait]
    pub trait GrpcHydra: Send + Sync + 'static {
        #[doc = " Leader -> follower: replicate a contiguous batch of serialized mutation records."]
        async fn log_mutations(
            &self,
            request: tonic::Request<super::ProtoLogMutationsReq>,
        ) -> Result<tonic::Response<super::ProtoLogMutationsResult>, tonic::Status>;
        #[doc = " Any peer -> leader: commit a mutation on behalf of a peer that is not leading."]
        async fn commit_mutation(
            &self,
            request: tonic::Request<super::ProtoCommitMutationReq>,
        ) -> Result<tonic::Response<super::ProtoCommitMutationResult>, tonic::Status>;
    }
    #[doc = " Peer-to-peer RPCs of the mutation commit pipeline."]
    #[derive(Debug)]
    pub struct GrpcHydraServer<T: GrpcHydra> {
        inner: _Inner<T>,
    }
    struct _Inner<T>(Arc<T>, Option<tonic::Interceptor>);
    impl<T: GrpcHydra> GrpcHydraServer<T> {
        pub fn new(inner: T) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner, None);
            Self { inner }
        }
        pub fn with_interceptor(inner: T, interceptor: impl Into<tonic::Interceptor>) -> Self {
            let inner = Arc::new(inner);
            let inner = _Inner(inner, Some(interceptor.into()));
            Self { inner }
        }
    }
    impl<T, B> Service<http::Request<B>> for GrpcHydraServer<T>
    where
        T: GrpcHydra,
        B: HttpBody + Send + Sync + 'static,
        B::Error: Into<StdError> + Send + 'static,
    {
        type Response = http::Response<tonic::body::BoxBody>;
        type Error = Never;
        type Future = BoxFuture<Self::Response, Self::Error>;
        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
            Poll::Ready(Ok(()))
        }
        fn call(&mut self, req: http::Request<B>) -> Self::Future {
            let inner = self.inner.clone();
            match req.uri().path() {
                "/hydra.GrpcHydra/LogMutations" => {
                    #[allow(non_camel_case_types)]
                    struct LogMutationsSvc<T: GrpcHydra>(pub Arc<T>);
                    impl<T: GrpcHydra> tonic::server::UnaryService<super::ProtoLogMutationsReq> for LogMutationsSvc<T> {
                        type Response = super::ProtoLogMutationsResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoLogMutationsReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).log_mutations(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = LogMutationsSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                "/hydra.GrpcHydra/CommitMutation" => {
                    #[allow(non_camel_case_types)]
                    struct CommitMutationSvc<T: GrpcHydra>(pub Arc<T>);
                    impl<T: GrpcHydra> tonic::server::UnaryService<super::ProtoCommitMutationReq>
                        for CommitMutationSvc<T>
                    {
                        type Response = super::ProtoCommitMutationResult;
                        type Future = BoxFuture<tonic::Response<Self::Response>, tonic::Status>;
                        fn call(
                            &mut self,
                            request: tonic::Request<super::ProtoCommitMutationReq>,
                        ) -> Self::Future {
                            let inner = self.0.clone();
                            let fut = async move { (*inner).commit_mutation(request).await };
                            Box::pin(fut)
                        }
                    }
                    let inner = self.inner.clone();
                    let fut = async move {
                        let interceptor = inner.1.clone();
                        let inner = inner.0;
                        let method = CommitMutationSvc(inner);
                        let codec = tonic::codec::ProstCodec::default();
                        let mut grpc = if let Some(interceptor) = interceptor {
                            tonic::server::Grpc::with_interceptor(codec, interceptor)
                        } else {
                            tonic::server::Grpc::new(codec)
                        };
                        let res = grpc.unary(method, req).await;
                        Ok(res)
                    };
                    Box::pin(fut)
                }
                _ => Box::pin(async move {
                    Ok(http::Response::builder()
                        .status(200)
                        .header("grpc-status", "12")
                        .header("content-type", "application/grpc")
                        .body(tonic::body::BoxBody::empty())
                        .unwrap())
                }),
            }
        }
    }
    impl<T: GrpcHydra> Clone for GrpcHydraServer<T> {
        fn clone(&self) -> Self {
            let inner = self.inner.clone();
            Self { inner }
        }
    }
    impl<T: GrpcHydra> Clone for _Inner<T> {
        fn clone(&self) -> Self {
            Self(self.0.clone(), self.1.clone())
        }
    }
    impl<T: std::fmt::Debug> std::fmt::Debug for _Inner<T> {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{:?}", self.0)
        }
    }
    impl<T: GrpcHydra> tonic::transport::NamedService for GrpcHydraServer<T> {
        const NAME: &'static str = "hydra.GrpcHydra";
    }
}
