// src/ring_buffer.rs
//! Ring buffer sink for recent log records.
//!
//! A [`tracing_subscriber::Layer`] that keeps the last N records in memory
//! with FIFO eviction. Paired with a regular output layer it gives operators
//! (and tests) a way to pull up the full record behind a correlation
//! identifier a user reported.
//!
//! # Design Principles
//!
//! - **Bounded memory**: fixed number of entries regardless of log volume
//! - **FIFO eviction**: oldest entries dropped first
//! - **Per-entry size caps**: no single record can dominate the buffer
//! - **RwLock-based**: concurrent readers, exclusive writers
//!
//! # Example
//!
//! ```rust
//! use common_logger::{log_error, ring_buffer::RingBufferLayer};
//! use tracing::Dispatch;
//! use tracing_subscriber::layer::SubscriberExt;
//!
//! let recent = RingBufferLayer::new(1000, 2048);
//! let logger = Dispatch::new(tracing_subscriber::registry().with(recent.clone()));
//!
//! let result = log_error(Some(&logger), Some("10000;(db) timeout"), "", "op", &[]).unwrap();
//! let entry = recent.find_by_identifier(result.identifier().as_str()).unwrap();
//! assert_eq!(entry.field("error.code"), Some("10000"));
//! ```

use smallvec::SmallVec;
use std::borrow::Cow;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Field name under which error records carry their correlation identifier.
pub const IDENTIFIER_FIELD: &str = "error.identifier";

const TRUNCATION_INDICATOR: &str = "...[TRUNC]";

/// One captured log record, size bounded.
///
/// Strings are `Arc<str>` so `get_recent()` clones are refcount bumps.
#[derive(Clone, Debug)]
pub struct LogEntry {
    /// Unix timestamp (seconds) at capture
    pub timestamp: u64,
    pub level: Level,
    pub target: Arc<str>,
    /// Primary record text (the `message` field)
    pub message: Arc<str>,
    /// Remaining fields in emission order
    pub fields: Arc<[(Arc<str>, Arc<str>)]>,
    /// Approximate payload size in bytes
    pub size_bytes: usize,
}

impl LogEntry {
    /// Value of the field called `name`, if the record carried it.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_ref())
    }
}

/// Fixed-size ring with exact allocation (no growth).
struct RingBuffer {
    entries: Box<[Option<LogEntry>]>,
    tail: usize,
    head: usize,
    len: usize,
}

impl RingBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            entries: std::iter::repeat_with(|| None)
                .take(capacity)
                .collect::<Box<[Option<LogEntry>]>>(),
            tail: 0,
            head: 0,
            len: 0,
        }
    }

    fn push(&mut self, entry: LogEntry) -> Option<LogEntry> {
        let evicted = self.entries[self.tail].replace(entry);
        self.tail = (self.tail + 1) % self.entries.len();

        if self.len < self.entries.len() {
            self.len += 1;
        } else {
            self.head = (self.head + 1) % self.entries.len();
        }

        evicted
    }

    #[inline]
    fn len(&self) -> usize {
        self.len
    }

    fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> {
        let head = self.head;
        let cap = self.entries.len();

        (0..self.len).filter_map(move |i| self.entries[(head + i) % cap].as_ref())
    }

    fn clear(&mut self) {
        for entry in self.entries.iter_mut() {
            *entry = None;
        }
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }
}

/// Collects an event's fields as strings.
#[derive(Default)]
struct FieldCollector {
    message: String,
    fields: SmallVec<[(&'static str, String); 8]>,
}

impl Visit for FieldCollector {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_owned();
        } else {
            self.fields.push((field.name(), value.to_owned()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{:?}", value);
        } else {
            self.fields.push((field.name(), format!("{:?}", value)));
        }
    }
}

/// Bounded in-memory log sink.
///
/// Clones share the same buffer, so keep one clone for queries and hand the
/// other to the subscriber.
#[derive(Clone)]
pub struct RingBufferLayer {
    buffer: Arc<RwLock<RingBuffer>>,
    max_entries: usize,
    max_entry_bytes: usize,
    eviction_count: Arc<AtomicU64>,
}

impl RingBufferLayer {
    /// Create a sink holding at most `max_entries` records of roughly
    /// `max_entry_bytes` each. A zero capacity is bumped to one.
    pub fn new(max_entries: usize, max_entry_bytes: usize) -> Self {
        let bounded_entries = max_entries.max(1);
        Self {
            buffer: Arc::new(RwLock::new(RingBuffer::new(bounded_entries))),
            max_entries: bounded_entries,
            max_entry_bytes,
            eviction_count: Arc::new(AtomicU64::new(0)),
        }
    }

    #[inline]
    fn read_buffer(&self) -> RwLockReadGuard<'_, RingBuffer> {
        match self.buffer.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    #[inline]
    fn write_buffer(&self) -> RwLockWriteGuard<'_, RingBuffer> {
        match self.buffer.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn record(&self, entry: LogEntry) {
        let mut buffer = self.write_buffer();
        if buffer.push(entry).is_some() {
            self.eviction_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Build a bounded entry. The message gets up to half the budget, the
    /// rest goes to fields in order; values are capped at 512 bytes each.
    fn create_entry(&self, level: Level, target: &str, collected: FieldCollector) -> LogEntry {
        let mut size = 0usize;
        let mut remaining = self.max_entry_bytes;

        let message = truncate_to_bytes(&collected.message, remaining / 2);
        size += message.len();
        remaining = remaining.saturating_sub(message.len());

        let mut fields: SmallVec<[(Arc<str>, Arc<str>); 8]> = SmallVec::new();
        for (key, value) in &collected.fields {
            let key_len = key.len();
            if key_len >= remaining {
                break;
            }
            let value = truncate_to_bytes(value, (remaining - key_len).min(512));
            let used = key_len + value.len();
            size += used;
            remaining -= used;

            fields.push((Arc::from(*key), Arc::from(value.as_ref())));
        }

        LogEntry {
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_or(0, |d| d.as_secs()),
            level,
            target: Arc::from(target),
            message: Arc::from(message.as_ref()),
            fields: fields.into_vec().into_boxed_slice().into(),
            size_bytes: size,
        }
    }

    /// The `count` most recent entries, newest first.
    pub fn get_recent(&self, count: usize) -> Vec<LogEntry> {
        let buffer = self.read_buffer();
        buffer.iter().rev().take(count).cloned().collect()
    }

    /// All entries, newest first.
    pub fn get_all(&self) -> Vec<LogEntry> {
        let buffer = self.read_buffer();
        buffer.iter().rev().cloned().collect()
    }

    /// Entries matching `predicate`, oldest first.
    pub fn get_filtered<F>(&self, predicate: F) -> Vec<LogEntry>
    where
        F: Fn(&LogEntry) -> bool,
    {
        let buffer = self.read_buffer();
        buffer.iter().filter(|e| predicate(e)).cloned().collect()
    }

    /// Most recent record whose `error.identifier` equals `identifier`.
    pub fn find_by_identifier(&self, identifier: &str) -> Option<LogEntry> {
        let buffer = self.read_buffer();
        buffer
            .iter()
            .rev()
            .find(|e| e.field(IDENTIFIER_FIELD) == Some(identifier))
            .cloned()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.read_buffer().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total payload bytes (lower-bound estimate).
    pub fn payload_bytes(&self) -> usize {
        let buffer = self.read_buffer();
        buffer.iter().map(|e| e.size_bytes).sum()
    }

    /// Entries dropped to make room since creation.
    #[inline]
    pub fn eviction_count(&self) -> u64 {
        self.eviction_count.load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        self.write_buffer().clear();
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    pub fn is_full(&self) -> bool {
        self.len() >= self.max_entries
    }
}

impl fmt::Debug for RingBufferLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBufferLayer")
            .field("len", &self.len())
            .field("capacity", &self.max_entries)
            .field("max_entry_bytes", &self.max_entry_bytes)
            .field("evictions", &self.eviction_count())
            .finish()
    }
}

impl<S: Subscriber> Layer<S> for RingBufferLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut collected = FieldCollector::default();
        event.record(&mut collected);

        let metadata = event.metadata();
        let entry = self.create_entry(*metadata.level(), metadata.target(), collected);
        self.record(entry);
    }
}

/// Truncate to at most `max_bytes`, on a UTF-8 boundary, marking the cut.
fn truncate_to_bytes(s: &str, max_bytes: usize) -> Cow<'_, str> {
    if s.len() <= max_bytes {
        return Cow::Borrowed(s);
    }
    if max_bytes <= TRUNCATION_INDICATOR.len() {
        return Cow::Borrowed(&TRUNCATION_INDICATOR[..max_bytes]);
    }

    let mut idx = max_bytes - TRUNCATION_INDICATOR.len();
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }
    if idx == 0 {
        return Cow::Borrowed(TRUNCATION_INDICATOR);
    }

    let mut out = String::with_capacity(idx + TRUNCATION_INDICATOR.len());
    out.push_str(&s[..idx]);
    out.push_str(TRUNCATION_INDICATOR);
    Cow::Owned(out)
}
