//! Minimal XML-RPC support for talking to Koji hubs.
//!
//! Covers the value types Koji actually sends, including the `<nil/>`
//! extension, and the `__starstar` keyword-argument convention.

pub mod codec;
pub mod value;

pub use codec::{decode_response, encode_call};
pub use value::{KWARGS_MARKER, Value};
