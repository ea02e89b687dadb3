// src/ring_buffer.rs
//! Bounded in-memory log of raised diagnostics.
//!
//! A device that loses its adapter can fail every call in a tight loop. The
//! failure log keeps the most recent failures for post-mortem inspection
//! without growing: a fixed number of entries, a byte cap per entry, and FIFO
//! eviction once full.
//!
//! # Properties
//!
//! - **Bounded memory**: capacity and per-entry size are fixed at creation
//! - **FIFO eviction**: the oldest failure is dropped first
//! - **Shared**: clones share one buffer, so a device and the contexts,
//!   kernels and buffers it creates all record into the same log
//! - **RwLock-based**: concurrent readers, exclusive writers
//!
//! # Example
//!
//! ```rust
//! use dx_status::{check, definitions, FailureLog};
//!
//! let log = FailureLog::new(64, 1024);
//!
//! let err = check(definitions::DXGI_ERROR_DEVICE_REMOVED).unwrap_err();
//! log.record(&err, "device");
//!
//! let recent = log.get_recent(10);
//! assert_eq!(recent[0].label, "DXGI_ERROR_DEVICE_REMOVED");
//! assert_eq!(recent[0].component.as_ref(), "device");
//! ```

use crate::{Diagnostic, StatusCode};
use smallvec::SmallVec;
use std::borrow::Cow;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{SystemTime, UNIX_EPOCH};

/// Capacity and per-entry byte cap of a [`FailureLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureLogConfig {
    /// Entries kept before FIFO eviction. Zero is raised to one.
    pub max_entries: usize,
    /// Cap on the variable-length text stored per entry.
    pub max_entry_bytes: usize,
}

impl Default for FailureLogConfig {
    fn default() -> Self {
        Self {
            max_entries: 256,
            max_entry_bytes: 1024,
        }
    }
}

/// One recorded failure.
///
/// Text fields are `Arc<str>` so reading entries back clones refcounts only.
#[derive(Clone, Debug)]
pub struct FailureEntry {
    /// Unix timestamp (seconds) at which the failure was recorded.
    pub timestamp: u64,
    /// Originating status code.
    pub code: StatusCode,
    /// Label of the code.
    pub label: &'static str,
    /// Source file of the failing check.
    pub file: &'static str,
    /// Source line of the failing check.
    pub line: u32,
    /// Collaborator that recorded the failure (`"device"`, `"buffer"`, ...).
    pub component: Arc<str>,
    /// Operation attached to the Diagnostic, if any.
    pub operation: Option<Arc<str>>,
    /// Formatted Diagnostic message, possibly truncated.
    pub message: Arc<str>,
    /// Collaborator metadata that fit within the byte cap.
    pub metadata: Arc<[(Arc<str>, Arc<str>)]>,
    /// Bytes of variable-length text stored in this entry.
    pub size_bytes: usize,
}

struct RingBuffer {
    entries: Box<[Option<FailureEntry>]>,
    tail: usize,
    head: usize,
    len: usize,
}

impl RingBuffer {
    fn new(capacity: usize) -> Self {
        Self {
            entries: std::iter::repeat_with(|| None)
                .take(capacity)
                .collect::<Box<[Option<FailureEntry>]>>(),
            tail: 0,
            head: 0,
            len: 0,
        }
    }

    fn push(&mut self, entry: FailureEntry) -> Option<FailureEntry> {
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

    fn iter(&self) -> impl DoubleEndedIterator<Item = &FailureEntry> {
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

/// Bounded, shareable log of raised diagnostics.
pub struct FailureLog {
    buffer: Arc<RwLock<RingBuffer>>,
    max_entries: usize,
    max_entry_bytes: usize,
    eviction_count: Arc<AtomicU64>,
}

impl FailureLog {
    /// Create a log holding at most `max_entries` entries of at most
    /// `max_entry_bytes` text each.
    pub fn new(max_entries: usize, max_entry_bytes: usize) -> Self {
        Self::with_config(FailureLogConfig {
            max_entries,
            max_entry_bytes,
        })
    }

    /// Create a log from a [`FailureLogConfig`].
    pub fn with_config(config: FailureLogConfig) -> Self {
        let bounded_entries = config.max_entries.max(1);
        Self {
            buffer: Arc::new(RwLock::new(RingBuffer::new(bounded_entries))),
            max_entries: bounded_entries,
            max_entry_bytes: config.max_entry_bytes,
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

    /// Record `err` on behalf of `component`, evicting the oldest entry when
    /// full. The Diagnostic is only read.
    pub fn record(&self, err: &Diagnostic, component: &str) {
        let entry = self.create_entry(err, component);

        if self.write_buffer().push(entry).is_some() {
            self.eviction_count.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn create_entry(&self, err: &Diagnostic, component: &str) -> FailureEntry {
        err.with_log(|log| {
            let mut size = 0usize;
            let mut remaining = self.max_entry_bytes;

            let component = truncate_to_bytes(component, remaining.min(64));
            size += component.len();
            remaining = remaining.saturating_sub(component.len());

            let operation = log.operation().map(|op| {
                let op = truncate_to_bytes(op, remaining.min(256));
                size += op.len();
                remaining = remaining.saturating_sub(op.len());
                Arc::<str>::from(op.as_ref())
            });

            let message = truncate_to_bytes(err.message(), remaining.min(512));
            size += message.len();
            remaining = remaining.saturating_sub(message.len());

            let mut metadata: SmallVec<[(Arc<str>, Arc<str>); 4]> = SmallVec::new();
            for (key, value) in log.metadata() {
                if key.len() >= remaining {
                    break;
                }
                let value = truncate_to_bytes(value.as_str(), (remaining - key.len()).min(128));
                let used = key.len() + value.len();
                size += used;
                remaining -= used;

                metadata.push((Arc::from(*key), Arc::from(value.as_ref())));
            }

            FailureEntry {
                timestamp: SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map_or(0, |d| d.as_secs()),
                code: log.code(),
                label: log.label(),
                file: log.file(),
                line: log.line(),
                component: Arc::from(component.as_ref()),
                operation,
                message: Arc::from(message.as_ref()),
                metadata: metadata.into_vec().into(),
                size_bytes: size,
            }
        })
    }

    /// The `count` most recent entries, newest first.
    pub fn get_recent(&self, count: usize) -> Vec<FailureEntry> {
        self.read_buffer().iter().rev().take(count).cloned().collect()
    }

    /// All entries, newest first.
    pub fn get_all(&self) -> Vec<FailureEntry> {
        self.read_buffer().iter().rev().cloned().collect()
    }

    /// Entries matching `predicate`, oldest first.
    ///
    /// ```rust
    /// # use dx_status::{check, definitions, FailureLog};
    /// # let log = FailureLog::new(16, 1024);
    /// # log.record(&check(definitions::E_OUTOFMEMORY).unwrap_err(), "buffer");
    /// let oom = log.get_filtered(|e| e.code == definitions::E_OUTOFMEMORY);
    /// assert_eq!(oom.len(), 1);
    /// ```
    pub fn get_filtered<F>(&self, predicate: F) -> Vec<FailureEntry>
    where
        F: Fn(&FailureEntry) -> bool,
    {
        self.read_buffer().iter().filter(|e| predicate(e)).cloned().collect()
    }

    /// Number of stored entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.read_buffer().len()
    }

    /// Whether no entries are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of `size_bytes` over the stored entries.
    pub fn payload_bytes(&self) -> usize {
        self.read_buffer().iter().map(|e| e.size_bytes).sum()
    }

    /// Entries evicted since creation.
    #[inline]
    pub fn eviction_count(&self) -> u64 {
        self.eviction_count.load(Ordering::Relaxed)
    }

    /// Drop every stored entry. The eviction count is kept.
    pub fn clear(&self) {
        self.write_buffer().clear();
    }

    /// Maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.max_entries
    }

    /// Whether the next record will evict.
    pub fn is_full(&self) -> bool {
        self.len() >= self.max_entries
    }
}

impl Default for FailureLog {
    fn default() -> Self {
        Self::with_config(FailureLogConfig::default())
    }
}

impl Clone for FailureLog {
    fn clone(&self) -> Self {
        Self {
            buffer: Arc::clone(&self.buffer),
            max_entries: self.max_entries,
            max_entry_bytes: self.max_entry_bytes,
            eviction_count: Arc::clone(&self.eviction_count),
        }
    }
}

impl std::fmt::Debug for FailureLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FailureLog")
            .field("len", &self.len())
            .field("capacity", &self.max_entries)
            .field("max_entry_bytes", &self.max_entry_bytes)
            .field("evictions", &self.eviction_count())
            .finish()
    }
}

/// Truncate to at most `max_bytes`, on a UTF-8 boundary.
fn truncate_to_bytes(s: &str, max_bytes: usize) -> Cow<'_, str> {
    if s.len() <= max_bytes {
        return Cow::Borrowed(s);
    }

    let indicator = "...[TRUNC]";
    if max_bytes <= indicator.len() {
        return Cow::Borrowed(&indicator[..max_bytes]);
    }
    let max_content = max_bytes - indicator.len();

    let mut idx = max_content;
    while idx > 0 && !s.is_char_boundary(idx) {
        idx -= 1;
    }

    if idx == 0 {
        return Cow::Borrowed(indicator);
    }

    let mut out = String::with_capacity(idx + indicator.len());
    out.push_str(&s[..idx]);
    out.push_str(indicator);
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{check, definitions, ResultExt};

    fn failure(code: StatusCode, operation: &'static str) -> Diagnostic {
        check(code).context(operation).unwrap_err()
    }

    #[test]
    fn evicts_oldest() {
        let log = FailureLog::new(3, 1024);

        for i in 0..5 {
            let err = check(definitions::E_FAIL)
                .with_metadata("attempt", i.to_string())
                .unwrap_err();
            log.record(&err, "device");
        }

        assert_eq!(log.len(), 3);
        assert_eq!(log.eviction_count(), 2);
        assert!(log.is_full());

        let entries = log.get_all();
        assert_eq!(entries[0].metadata[0].1.as_ref(), "4");
        assert_eq!(entries[2].metadata[0].1.as_ref(), "2");
    }

    #[test]
    fn entry_mirrors_diagnostic() {
        let log = FailureLog::default();
        let err = failure(definitions::DXGI_ERROR_DEVICE_HUNG, "synchronize");
        log.record(&err, "context");

        let entry = &log.get_recent(1)[0];
        assert_eq!(entry.code, definitions::DXGI_ERROR_DEVICE_HUNG);
        assert_eq!(entry.label, "DXGI_ERROR_DEVICE_HUNG");
        assert_eq!(entry.file, err.file());
        assert_eq!(entry.line, err.line());
        assert_eq!(entry.operation.as_deref(), Some("synchronize"));
        assert_eq!(entry.message.as_ref(), err.message());
    }

    #[test]
    fn respects_size_limit() {
        let log = FailureLog::new(100, 128);

        let err = check(definitions::E_INVALIDARG)
            .context("x".repeat(10_000))
            .with_metadata("entry", "y".repeat(10_000))
            .unwrap_err();
        log.record(&err, "kernel");

        let entry = &log.get_recent(1)[0];
        assert!(entry.size_bytes <= 128);
        assert!(entry.operation.as_deref().is_some_and(|op| op.contains("TRUNC")));
    }

    #[test]
    fn zero_capacity_is_raised_to_one() {
        let log = FailureLog::with_config(FailureLogConfig {
            max_entries: 0,
            max_entry_bytes: 64,
        });
        assert_eq!(log.capacity(), 1);

        log.record(&failure(definitions::E_FAIL, "a"), "device");
        log.record(&failure(definitions::E_ABORT, "b"), "device");
        assert_eq!(log.len(), 1);
        assert_eq!(log.get_all()[0].code, definitions::E_ABORT);
    }

    #[test]
    fn filtering_by_component() {
        let log = FailureLog::new(100, 1024);

        for i in 0..10 {
            let component = if i % 2 == 0 { "buffer" } else { "kernel" };
            log.record(&failure(definitions::E_OUTOFMEMORY, "create"), component);
        }

        let buffers = log.get_filtered(|e| e.component.as_ref() == "buffer");
        assert_eq!(buffers.len(), 5);
    }

    #[test]
    fn clone_shares_state() {
        let log1 = FailureLog::new(100, 1024);
        let log2 = log1.clone();

        log1.record(&failure(definitions::E_FAIL, "op"), "device");

        assert_eq!(log1.len(), 1);
        assert_eq!(log2.len(), 1);

        log2.clear();
        assert!(log1.is_empty());
        assert_eq!(log1.payload_bytes(), 0);
    }

    #[test]
    fn truncate_respects_utf8() {
        let wide = "\u{1F525}".repeat(100);
        let truncated = truncate_to_bytes(&wide, 50);

        assert!(std::str::from_utf8(truncated.as_bytes()).is_ok());
        assert!(truncated.len() <= 50);
    }

    #[test]
    fn truncate_borrows_when_short() {
        let truncated = truncate_to_bytes("short", 100);
        assert!(matches!(truncated, Cow::Borrowed("short")));
    }

    #[test]
    fn concurrent_recording() {
        use std::thread;

        let log = FailureLog::new(128, 256);
        let mut handles = Vec::new();

        for _ in 0..8 {
            let log = log.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..100 {
                    log.record(&failure(definitions::DXGI_ERROR_DEVICE_RESET, "op"), "device");
                }
            }));
        }

        for handle in handles {
            handle.join().expect("thread panicked");
        }

        assert_eq!(log.len(), 128);
        assert_eq!(log.eviction_count(), 800 - 128);
    }

    #[test]
    fn reads_share_allocations() {
        let log = FailureLog::new(10, 1024);
        log.record(&failure(definitions::E_HANDLE, "release"), "buffer");

        let a = log.get_recent(1)[0].clone();
        let b = log.get_recent(1)[0].clone();

        assert!(Arc::ptr_eq(&a.component, &b.component));
        assert!(Arc::ptr_eq(&a.message, &b.message));
    }
}
