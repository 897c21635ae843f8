//! Domain method handlers
//!
//! Business logic exposed as XML-RPC methods.

pub mod calls;

use crate::xmlrpc::registry::MethodRegistry;

/// Registers every domain handler shipped with the server.
pub fn register_handlers(registry: &mut MethodRegistry) {
    registry.register(calls::INIT_CALL_IN_METHOD, calls::InitCallInHandler);
}
