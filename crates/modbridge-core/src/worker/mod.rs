//! Pure worker logic: session state machine, reconnect backoff, entity-set
//! bookkeeping, and outgoing-stanza pacing. I/O (WebSocket, HTTP, timers)
//! lives in `modbridge-infra` and the worker binary; this module is the
//! testable core they drive.

pub mod backoff;
pub mod classify;
pub mod entity_map;
pub mod outgoing_queue;
pub mod reconciliation;
pub mod room_state;
pub mod state_machine;
