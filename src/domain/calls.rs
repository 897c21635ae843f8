//! `InitCallIn`: starts an inbound call between a call center and a customer
//!
//! The call parameters travel as JSON text inside the `JsonData` member of the
//! first struct parameter.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::xmlrpc::{
    handler::{HandlerError, MethodHandler},
    value::Value,
};

pub const INIT_CALL_IN_METHOD: &str = "InitCallIn";

const CALL_ID_PHONE_PREFIX: usize = 6;

#[derive(Debug, Deserialize)]
pub struct CallParams {
    pub call_center_phone: String,
    pub customer_phone: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct CallResponse {
    pub status: &'static str,
    pub message: &'static str,
    pub call_id: String,
    pub timestamp: String,
}

#[derive(Debug, Default)]
pub struct InitCallInHandler;

impl MethodHandler for InitCallInHandler {
    type Output = CallResponse;

    fn handle(&self, params: &[Value]) -> Result<CallResponse, HandlerError> {
        let call_params = parse_call_params(params)?;
        debug!(
            call_center_phone = %call_params.call_center_phone,
            "initiating inbound call"
        );
        build_call_response(&call_params, Utc::now())
    }
}

pub fn parse_call_params(params: &[Value]) -> Result<CallParams, HandlerError> {
    let Some(first) = params.first().filter(|value| value.as_struct().is_some()) else {
        return Err(HandlerError::new("invalid parameters"));
    };

    let json_data = first
        .member("JsonData")
        .and_then(Value::as_str)
        .filter(|data| !data.is_empty())
        .ok_or_else(|| HandlerError::new("missing JsonData"))?;

    serde_json::from_str(json_data)
        .map_err(|err| HandlerError::new(format!("invalid JSON data: {err}")))
}

pub fn build_call_response(
    params: &CallParams,
    now: DateTime<Utc>,
) -> Result<CallResponse, HandlerError> {
    let prefix: String = params
        .customer_phone
        .chars()
        .take(CALL_ID_PHONE_PREFIX)
        .collect();
    if prefix.chars().count() < CALL_ID_PHONE_PREFIX {
        return Err(HandlerError::new(
            "customer_phone must have at least 6 characters",
        ));
    }

    Ok(CallResponse {
        status: "success",
        message: "Call initiated successfully",
        call_id: format!("CALL-{prefix}-{}", now.timestamp()),
        timestamp: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}
