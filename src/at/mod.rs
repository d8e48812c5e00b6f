//! AT command layer: exclusive link, response capture, command lines and
//! the timed transport built from them.

pub mod channel;
pub mod commands;
pub mod response;
pub mod transport;

pub use channel::{ReadByte, SerialChannel, SerialGuard};
pub use response::{Capture, Printable};
pub use transport::{AtSession, AtTransport};
