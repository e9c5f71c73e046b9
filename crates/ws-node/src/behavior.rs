//! The `NodeBehavior` trait: the main extension point for user code.

use crate::{Inbox, Message, NodeCtx};

/// Per-node algorithm state and callbacks.
///
/// One value of the implementing type lives in every node.  Callbacks get
/// `&mut self` plus a [`NodeCtx`] for reading the clock and neighborhood and
/// for queuing sends and timers.
///
/// # Call order
///
/// Synchronous mode, once per round for every node in ascending `NodeId`
/// order:
///
/// ```text
/// pre_step → handle_nacks → handle_messages → post_step
/// ```
///
/// Asynchronous mode has no steps: `handle_messages` runs whenever a packet
/// arrives (with an inbox holding that one packet) and `handle_nacks` when a
/// sent packet fails.
///
/// `neighborhood_change` runs after any connectivity pass that added or
/// removed one of the node's outgoing edges.
///
/// # Example
///
/// ```rust,ignore
/// #[derive(Clone, Debug)]
/// enum Flood { Hello(u32) }
/// impl Message for Flood {}
///
/// struct Flooder { seen: bool }
///
/// impl NodeBehavior for Flooder {
///     type Msg = Flood;
///
///     fn handle_messages(&mut self, inbox: &mut Inbox<Flood>, ctx: &mut NodeCtx<'_, Self>) {
///         for packet in inbox.drain() {
///             match packet.message() {
///                 Flood::Hello(hops) if !self.seen => {
///                     self.seen = true;
///                     ctx.broadcast(Flood::Hello(hops + 1));
///                 }
///                 Flood::Hello(_) => {}
///             }
///         }
///     }
/// }
/// ```
pub trait NodeBehavior: Sized + 'static {
    type Msg: Message;

    /// Called once for every node before the first round / event.
    fn init(&mut self, _ctx: &mut NodeCtx<'_, Self>) {}

    /// Synchronous mode: start of this node's step.
    fn pre_step(&mut self, _ctx: &mut NodeCtx<'_, Self>) {}

    /// Packets that arrived for this node.  Packets left in the inbox are
    /// discarded afterwards.
    fn handle_messages(&mut self, inbox: &mut Inbox<Self::Msg>, ctx: &mut NodeCtx<'_, Self>);

    /// Packets this node sent that did not arrive.  Only called when NACKs
    /// are enabled in the configuration.
    fn handle_nacks(&mut self, _nacks: &mut Inbox<Self::Msg>, _ctx: &mut NodeCtx<'_, Self>) {}

    /// Synchronous mode: end of this node's step.
    fn post_step(&mut self, _ctx: &mut NodeCtx<'_, Self>) {}

    /// The node's set of outgoing edges changed.
    fn neighborhood_change(&mut self, _ctx: &mut NodeCtx<'_, Self>) {}
}
