//! Message payloads and delivered packets.

use std::fmt;
use std::sync::Arc;

use ws_radio::PacketHeader;

/// A user message type.
///
/// Typically an enum of every message kind an algorithm exchanges, matched
/// exhaustively in [`handle_messages`][crate::NodeBehavior::handle_messages].
///
/// Each recipient of a broadcast gets its own clone unless the type declares
/// itself [`READ_ONLY`](Self::READ_ONLY), in which case one allocation is
/// shared by every copy.
pub trait Message: Clone + fmt::Debug + 'static {
    /// Share a single payload across all recipients of a send.
    const READ_ONLY: bool = false;

    /// Size handed to the transmission model.
    fn size(&self) -> usize {
        0
    }
}

impl Message for () {}

impl Message for String {
    fn size(&self) -> usize {
        self.len()
    }
}

impl Message for Vec<u8> {
    fn size(&self) -> usize {
        self.len()
    }
}

/// A packet as handed to a node: the final header and its payload.
#[derive(Clone, Debug)]
pub struct Received<M> {
    pub header: PacketHeader,
    message:    Arc<M>,
}

impl<M: Message> Received<M> {
    pub fn new(header: PacketHeader, message: Arc<M>) -> Self {
        Self { header, message }
    }

    #[inline]
    pub fn message(&self) -> &M {
        &self.message
    }

    /// Take ownership of the payload, cloning only if it is still shared.
    pub fn into_message(self) -> M {
        Arc::try_unwrap(self.message).unwrap_or_else(|shared| (*shared).clone())
    }

    /// The shared payload handle, e.g. to forward without cloning.
    pub fn shared(&self) -> Arc<M> {
        Arc::clone(&self.message)
    }
}
