mod auto_checkpoint;
mod batch_flush;
mod cancel;
mod time;

#[cfg(test)]
mod test_utils;

pub(crate) use auto_checkpoint::AutoCheckpointTimer;
pub(crate) use batch_flush::BatchFlushTimer;
