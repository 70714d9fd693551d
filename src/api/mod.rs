//! Client-facing construction of committers: options, wiring and loggers.
mod logging;
mod options;
mod wiring;

pub use logging::create_discard_logger;
pub use logging::create_root_logger_for_stdout;
pub use options::HydraOptions;
pub use wiring::create_follower_committer;
pub use wiring::create_leader_committer;
pub use wiring::CommitterCreationError;
pub use wiring::CommitterSetup;
