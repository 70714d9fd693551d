use slog::Drain;

/// Root logger writing to stdout through an async drain, tagged with the peer's name.
pub fn create_root_logger_for_stdout(peer_name: String) -> slog::Logger {
    let decorator = slog_term::TermDecorator::new().build();
    let drain = slog_term::FullFormat::new(decorator).use_file_location().build().fuse();
    let drain = slog_async::Async::new(drain).build().fuse();

    slog::Logger::root(drain, slog::o!("Peer" => peer_name))
}

pub fn create_discard_logger() -> slog::Logger {
    slog::Logger::root(slog::Discard, slog::o!())
}
