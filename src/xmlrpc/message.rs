//! Method call and method response envelopes

use crate::xmlrpc::value::{Member, Value};

/// Fault code for requests that could not be decoded.
pub const FAULT_BAD_REQUEST: i64 = 400;
/// Fault code for calls naming a method absent from the registry.
pub const FAULT_UNKNOWN_METHOD: i64 = 404;
/// Fault code for handler failures and unserializable results.
pub const FAULT_INTERNAL: i64 = 500;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub method_name: String,
    pub params: Vec<Value>,
}

impl MethodCall {
    pub fn new(method_name: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            method_name: method_name.into(),
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodResponse {
    Success(Vec<Value>),
    Fault(Value),
}

impl MethodResponse {
    /// Builds the conventional `{faultCode, faultString}` fault struct.
    pub fn fault(code: i64, message: impl Into<String>) -> Self {
        Self::Fault(Value::Struct(vec![
            Member::new("faultCode", code),
            Member::new("faultString", message.into()),
        ]))
    }

    pub fn is_fault(&self) -> bool {
        matches!(self, Self::Fault(_))
    }

    pub fn fault_code(&self) -> Option<i64> {
        match self {
            Self::Fault(value) => value.member("faultCode").and_then(Value::as_int),
            Self::Success(_) => None,
        }
    }

    pub fn fault_string(&self) -> Option<&str> {
        match self {
            Self::Fault(value) => value.member("faultString").and_then(Value::as_str),
            Self::Success(_) => None,
        }
    }
}
