//! One-shot timers.
//!
//! A timer fires at most once.  A periodic timer restarts itself from
//! inside `fire`.  A rejected delay is fatal: the driver aborts the run
//! once `fire` returns, so the error seldom needs handling here.
//!
//! ```rust,ignore
//! struct Beacon { period: f64 }
//!
//! impl Timer<Flooder> for Beacon {
//!     fn fire(self: Box<Self>, _node: &mut Flooder, ctx: &mut NodeCtx<'_, Flooder>) {
//!         ctx.broadcast(Flood::Hello(0));
//!         let period = self.period;
//!         ctx.start_timer_relative(period, *self).expect("period is positive");
//!     }
//! }
//! ```

use crate::{GlobalCtx, NodeBehavior, NodeCtx};

/// A timer bound to one node.  `node` is that node's behavior state,
/// borrowed for the duration of the call.
pub trait Timer<N: NodeBehavior>: 'static {
    fn fire(self: Box<Self>, node: &mut N, ctx: &mut NodeCtx<'_, N>);
}

/// A timer bound to no node.
pub trait GlobalTimer<N: NodeBehavior>: 'static {
    fn fire(self: Box<Self>, ctx: &mut GlobalCtx<'_, N>);
}
