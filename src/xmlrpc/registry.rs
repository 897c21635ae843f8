//! Method registry and dispatcher
//!
//! Populated once at startup, then shared read-only behind an `Arc` by every
//! request. Successful results are wrapped as a single struct parameter whose
//! `JsonResult` member holds the handler output serialized as JSON text, so
//! handlers can return arbitrary domain objects without growing [`Value`].

use std::collections::HashMap;

use tracing::{error, info};

use crate::xmlrpc::{
    handler::{CallError, ErasedHandler, MethodHandler},
    message::{MethodCall, MethodResponse, FAULT_INTERNAL, FAULT_UNKNOWN_METHOD},
    value::{Member, Value},
};

/// Name of the struct member carrying the JSON-encoded handler result.
pub const JSON_RESULT_MEMBER: &str = "JsonResult";

#[derive(Default)]
pub struct MethodRegistry {
    handlers: HashMap<String, Box<dyn ErasedHandler>>,
}

impl MethodRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the handler for `name`.
    pub fn register<H: MethodHandler>(&mut self, name: impl Into<String>, handler: H) {
        self.handlers.insert(name.into(), Box::new(handler));
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered method names, sorted.
    pub fn methods(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn dispatch(&self, call: MethodCall) -> MethodResponse {
        let MethodCall {
            method_name,
            params,
        } = call;

        let response = match self.handlers.get(&method_name) {
            None => MethodResponse::fault(
                FAULT_UNKNOWN_METHOD,
                format!("Unknown method: {method_name}"),
            ),
            Some(handler) => match handler.call(&params) {
                Ok(json) => MethodResponse::Success(vec![Value::Struct(vec![Member::new(
                    JSON_RESULT_MEMBER,
                    json,
                )])]),
                Err(CallError::Handler(err)) => MethodResponse::fault(FAULT_INTERNAL, err.message()),
                Err(CallError::Serialize(err)) => {
                    error!(method = %method_name, error = %err, "failed to serialize handler result");
                    MethodResponse::fault(FAULT_INTERNAL, "Failed to create response")
                }
            },
        };

        info!(
            method = %method_name,
            params = params.len(),
            outcome = if response.is_fault() { "fault" } else { "success" },
            "xml-rpc call dispatched"
        );

        response
    }
}

#[cfg(test)]
mod tests {
    use serde::{ser::Error as _, Serialize, Serializer};

    use super::*;
    use crate::xmlrpc::handler::{from_fn, HandlerError};

    #[derive(Serialize)]
    struct CallOutcome {
        status: &'static str,
        call_id: &'static str,
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cannot serialize"))
        }
    }

    fn registry() -> MethodRegistry {
        let mut registry = MethodRegistry::new();
        registry.register(
            "Echo",
            from_fn(|params: &[Value]| {
                params
                    .first()
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| HandlerError::new("expected a string parameter"))
            }),
        );
        registry.register(
            "InitCall",
            from_fn(|_: &[Value]| {
                Ok(CallOutcome {
                    status: "success",
                    call_id: "CALL-1",
                })
            }),
        );
        registry.register("Broken", from_fn(|_: &[Value]| Ok(Unserializable)));
        registry
    }

    fn json_result(response: &MethodResponse) -> Option<&str> {
        match response {
            MethodResponse::Success(params) => match params.as_slice() {
                [value] => value.member(JSON_RESULT_MEMBER).and_then(Value::as_str),
                _ => None,
            },
            MethodResponse::Fault(_) => None,
        }
    }

    #[test]
    fn success_wraps_json_result() {
        let response = registry().dispatch(MethodCall::new("InitCall", vec![]));

        assert_eq!(
            json_result(&response),
            Some(r#"{"status":"success","call_id":"CALL-1"}"#)
        );
    }

    #[test]
    fn unknown_method_is_a_fault_naming_the_method() {
        let response = registry().dispatch(MethodCall::new("DoesNotExist", vec![]));

        assert_eq!(response.fault_code(), Some(FAULT_UNKNOWN_METHOD));
        assert!(response
            .fault_string()
            .is_some_and(|message| message.contains("DoesNotExist")));
    }

    #[test]
    fn handler_failure_is_an_internal_fault() {
        let response = registry().dispatch(MethodCall::new("Echo", vec![Value::from(1)]));

        assert_eq!(response.fault_code(), Some(FAULT_INTERNAL));
        assert_eq!(response.fault_string(), Some("expected a string parameter"));
    }

    #[test]
    fn unserializable_result_degrades_to_fault() {
        let response = registry().dispatch(MethodCall::new("Broken", vec![]));

        assert_eq!(response.fault_code(), Some(FAULT_INTERNAL));
        assert_eq!(response.fault_string(), Some("Failed to create response"));
    }

    #[test]
    fn dispatch_is_deterministic() {
        let registry = registry();
        let call = MethodCall::new("Echo", vec![Value::from("hi")]);

        let first = registry.dispatch(call.clone());
        let second = registry.dispatch(call);

        assert_eq!(first, second);
        assert_eq!(json_result(&first), Some(r#""hi""#));
    }

    #[test]
    fn later_registration_wins() {
        let mut registry = registry();
        registry.register("Echo", from_fn(|_: &[Value]| Ok("replaced")));

        let response = registry.dispatch(MethodCall::new("Echo", vec![]));
        assert_eq!(json_result(&response), Some(r#""replaced""#));
        assert_eq!(registry.methods(), vec!["Broken", "Echo", "InitCall"]);
        assert!(registry.has_method("Echo"));
        assert!(!registry.has_method("echo"));
    }
}
