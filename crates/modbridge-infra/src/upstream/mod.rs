//! Upstream XMPP-over-WebSocket transport: room identifier derivation,
//! SASL-PLAIN handshake, stanza construction/classification, and the
//! WebSocket wrapper itself.

pub mod jid;
pub mod sasl;
pub mod stanza;
pub mod transport;

pub use stanza::{Inbound, OutgoingStanza};
pub use transport::{TransportError, UpstreamConnection};
