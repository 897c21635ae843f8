//! XML-RPC protocol layer
//!
//! Wire data model, codec, method registry and the request pipeline tying them together.

pub mod codec;
pub mod handler;
pub mod message;
pub mod registry;
pub mod server;
pub mod value;
