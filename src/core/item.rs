//! Item type carried from submitters to sinks

use std::fmt;

/// A discrete unit of data routed through the pool.
///
/// `length` always equals `payload.len()`; both are fixed at construction.
/// Items are moved by value at every hop (caller, queue, worker, sink), so
/// the payload is freed by whoever holds the item last: the sink that
/// consumed it, or the queue it was still sitting in when dropped.
#[derive(Clone, PartialEq, Eq)]
pub struct Item {
    length: usize,
    payload: Vec<u8>,
}

impl Item {
    /// Create an item that takes ownership of `payload`
    pub fn new(payload: Vec<u8>) -> Self {
        Self {
            length: payload.len(),
            payload,
        }
    }

    /// Create an item by copying `bytes`
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self::new(bytes.to_vec())
    }

    /// Number of payload bytes
    pub fn len(&self) -> usize {
        self.length
    }

    /// Whether the payload is empty
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Borrow the payload
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Take the payload out of the item
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }
}

impl From<Vec<u8>> for Item {
    fn from(payload: Vec<u8>) -> Self {
        Self::new(payload)
    }
}

impl From<&[u8]> for Item {
    fn from(bytes: &[u8]) -> Self {
        Self::from_slice(bytes)
    }
}

impl From<&str> for Item {
    fn from(text: &str) -> Self {
        Self::from_slice(text.as_bytes())
    }
}

impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item").field("length", &self.length).finish()
    }
}
