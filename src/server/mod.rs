mod router;
mod server;
mod shutdown;

pub use router::ActiveCommitter;
pub use router::CommitterRouter;
pub use server::RpcServer;
pub use shutdown::shutdown_signal;
pub use shutdown::RpcServerShutdownHandle;
pub use shutdown::RpcServerShutdownSignal;
