use crate::committer::{MutationRequest, MutationResponse, Version};

/// Everything a state machine sees of one committed mutation. The timestamp and seed come from
/// the leader's record header, so every peer applies the mutation identically.
#[derive(Debug)]
pub struct MutationContext<'a> {
    pub version: Version,
    pub timestamp_millis: i64,
    pub random_seed: u64,
    pub request: &'a MutationRequest,
}

/// Automaton is the application specific state machine, fed mutations in version order.
pub trait Automaton: Send {
    /// Called only for mutations that reached quorum, so applying never needs to be reversible.
    /// Must be deterministic given the context.
    fn apply_mutation(&mut self, context: &MutationContext<'_>) -> MutationResponse;
}

pub struct NoOpAutomaton;

impl Automaton for NoOpAutomaton {
    fn apply_mutation(&mut self, _: &MutationContext<'_>) -> MutationResponse {
        MutationResponse::default()
    }
}
