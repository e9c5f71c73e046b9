//! A node that does nothing.

use crate::{Inbox, NodeBehavior, NodeCtx};

/// A [`NodeBehavior`] that discards every message and never sends.
///
/// Useful for topology-only runs and as passive filler in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNode;

impl NodeBehavior for NoopNode {
    type Msg = ();

    fn handle_messages(&mut self, inbox: &mut Inbox<()>, _ctx: &mut NodeCtx<'_, Self>) {
        inbox.clear();
    }
}
