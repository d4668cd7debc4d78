// ── Reactive state primitives ──
//
// Replay cells for server-backed values and action streams for user
// events, all with push-based change notification.

mod action;
mod loadable;
mod replay;

pub(crate) use action::{ActionState, ActionSubject};
pub use loadable::Loadable;
pub(crate) use replay::ReplayCell;
