use crate::committer::LocalFlushFuture;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::future;
use std::io;
use std::sync::{Arc, Mutex};

/// Changelog is one segment of the mutation log: an append only sequence of records.
pub trait Changelog: Send {
    /// Appends a record after every previously appended one. The returned future resolves once
    /// this record is durable. Dropping the future does not cancel the append.
    fn append(&mut self, record: Bytes) -> LocalFlushFuture;

    fn record_count(&self) -> u32;

    fn data_size(&self) -> u64;
}

/// ChangelogStore creates changelog segments.
pub trait ChangelogStore: Send {
    fn create_changelog(&mut self, segment_id: u32) -> Result<Box<dyn Changelog>, io::Error>;
}

// Durability is only modeled here. Every append is "durable" as soon as it's in memory.
#[derive(Clone, Default)]
pub struct InMemoryChangelogStore {
    segments: Arc<Mutex<BTreeMap<u32, Vec<Bytes>>>>,
}

impl InMemoryChangelogStore {
    pub fn new() -> Self {
        InMemoryChangelogStore::default()
    }

    /// Snapshot of the records in `segment_id`, in append order.
    pub fn records(&self, segment_id: u32) -> Vec<Bytes> {
        self.segments
            .lock()
            .expect("InMemoryChangelogStore lock poisoned")
            .get(&segment_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl ChangelogStore for InMemoryChangelogStore {
    fn create_changelog(&mut self, segment_id: u32) -> Result<Box<dyn Changelog>, io::Error> {
        let mut segments = self.segments.lock().expect("InMemoryChangelogStore lock poisoned");
        if segments.contains_key(&segment_id) {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("Changelog segment {} already exists", segment_id),
            ));
        }
        segments.insert(segment_id, vec![]);

        Ok(Box::new(InMemoryChangelog {
            segment_id,
            segments: self.segments.clone(),
            record_count: 0,
            data_size: 0,
        }))
    }
}

struct InMemoryChangelog {
    segment_id: u32,
    segments: Arc<Mutex<BTreeMap<u32, Vec<Bytes>>>>,
    record_count: u32,
    data_size: u64,
}

impl Changelog for InMemoryChangelog {
    fn append(&mut self, record: Bytes) -> LocalFlushFuture {
        self.record_count += 1;
        self.data_size += record.len() as u64;
        self.segments
            .lock()
            .expect("InMemoryChangelogStore lock poisoned")
            .entry(self.segment_id)
            .or_default()
            .push(record);

        Box::pin(future::ready(Ok(())))
    }

    fn record_count(&self) -> u32 {
        self.record_count
    }

    fn data_size(&self) -> u64 {
        self.data_size
    }
}
