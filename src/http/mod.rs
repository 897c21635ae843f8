//! HTTP transport for the XML-RPC endpoint
//!
//! Reads request bodies and hands them to the protocol pipeline; transport failures map to HTTP status codes.

pub mod handlers;
