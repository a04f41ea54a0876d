//! Wire layer for the Clawlink gateway protocol.
//!
//! Pure types and functions only — framing, classification, prompt
//! flattening, and JSON extraction. All I/O lives in `clawlink-client`.

pub mod extract;
pub mod frames;
pub mod prompt;

pub use extract::extract_json;
pub use frames::{classify, ClientFrame, ParseError, TransportEvent, Usage};
pub use prompt::{flatten, ChatMessage, ContentPart, MessageContent, Role};
