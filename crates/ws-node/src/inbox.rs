//! Per-node packet inbox.

use std::collections::VecDeque;

use crate::Received;

/// Packets delivered to a node since its last `handle_messages` call,
/// in arrival order.
///
/// The same type backs the NACK inbox: there every entry is a packet the
/// node itself sent that did not arrive.
#[derive(Debug)]
pub struct Inbox<M> {
    packets: VecDeque<Received<M>>,
}

impl<M> Default for Inbox<M> {
    fn default() -> Self {
        Self { packets: VecDeque::new() }
    }
}

impl<M> Inbox<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, packet: Received<M>) {
        self.packets.push_back(packet);
    }

    /// Next packet in arrival order.
    pub fn pop(&mut self) -> Option<Received<M>> {
        self.packets.pop_front()
    }

    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Received<M>> + '_ {
        self.packets.iter()
    }

    /// Remove and yield every packet in arrival order.
    pub fn drain(&mut self) -> impl Iterator<Item = Received<M>> + '_ {
        self.packets.drain(..)
    }

    pub fn clear(&mut self) {
        self.packets.clear();
    }
}

impl<'a, M> IntoIterator for &'a Inbox<M> {
    type Item = &'a Received<M>;
    type IntoIter = std::collections::vec_deque::Iter<'a, Received<M>>;

    fn into_iter(self) -> Self::IntoIter {
        self.packets.iter()
    }
}
