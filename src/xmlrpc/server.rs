//! Request pipeline: decode, dispatch, encode
//!
//! Every outcome past the HTTP method check is a complete XML-RPC document. The
//! document is built in memory before the transport writes any status line.

use axum::http::Method;
use tracing::{debug, error};

use crate::errors::AppError;
use crate::xmlrpc::{
    codec::{decode_method_call, encode_method_response},
    message::{MethodResponse, FAULT_BAD_REQUEST, FAULT_INTERNAL},
    registry::MethodRegistry,
};

pub fn handle_xml_rpc_request(
    registry: &MethodRegistry,
    method: &Method,
    body: &[u8],
) -> Result<Vec<u8>, AppError> {
    if *method != Method::POST {
        return Err(AppError::method_not_allowed());
    }

    debug!(body = %String::from_utf8_lossy(body), "received request");

    let response = match decode_method_call(body) {
        Ok(call) => registry.dispatch(call),
        Err(err) => {
            error!(error = %err, "failed to decode request");
            MethodResponse::fault(FAULT_BAD_REQUEST, err.to_string())
        }
    };

    encode_response(&response)
}

fn encode_response(response: &MethodResponse) -> Result<Vec<u8>, AppError> {
    match encode_method_response(response) {
        Ok(document) => Ok(document),
        Err(err) => {
            error!(error = %err, "failed to encode response");
            encode_method_response(&MethodResponse::fault(
                FAULT_INTERNAL,
                "Failed to create response",
            ))
            .map_err(|err| AppError::internal(format!("failed to encode fault response: {err}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xmlrpc::codec::decode_method_response;
    use crate::xmlrpc::handler::{from_fn, HandlerError};
    use crate::xmlrpc::registry::JSON_RESULT_MEMBER;
    use crate::xmlrpc::value::Value;

    fn registry() -> MethodRegistry {
        let mut registry = MethodRegistry::new();
        registry.register(
            "Echo",
            from_fn(|params: &[Value]| {
                params
                    .first()
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| HandlerError::new("missing text"))
            }),
        );
        registry
    }

    fn json_result(xml: &str) -> String {
        match decode_method_response(xml.as_bytes()).expect("decode response") {
            MethodResponse::Success(params) => params[0]
                .member(JSON_RESULT_MEMBER)
                .and_then(Value::as_str)
                .expect("json result text")
                .to_string(),
            fault => panic!("unexpected fault: {fault:?}"),
        }
    }

    fn run(body: &str) -> String {
        let document = handle_xml_rpc_request(&registry(), &Method::POST, body.as_bytes())
            .expect("pipeline produces a document");
        String::from_utf8(document).expect("utf8 document")
    }

    #[test]
    fn non_post_is_rejected_before_decoding() {
        let err = handle_xml_rpc_request(&registry(), &Method::GET, b"<methodCall/>")
            .expect_err("GET must be rejected");
        assert!(matches!(err, AppError::MethodNotAllowed { .. }));
    }

    #[test]
    fn echo_call_returns_json_result() {
        let xml = run(
            "<methodCall><methodName>Echo</methodName><params>\
             <param><value><string>hi</string></value></param></params></methodCall>",
        );

        assert_eq!(json_result(&xml), "\"hi\"");
    }

    #[test]
    fn malformed_body_is_a_bad_request_fault() {
        let xml = run("<methodCall>");

        assert!(xml.contains("<fault>"));
        assert!(xml.contains("<int>400</int>"));
        assert!(xml.contains("invalid XML-RPC request"));
    }

    #[test]
    fn empty_value_is_a_bad_request_fault() {
        let xml = run(
            "<methodCall><methodName>X</methodName><params><param><value></value></param></params></methodCall>",
        );

        assert!(xml.contains("<int>400</int>"));
        assert!(xml.contains("value element has no payload"));
    }

    #[test]
    fn deeply_nested_body_is_a_bad_request_fault() {
        let levels = 20_000;
        let mut body = String::from("<methodCall><methodName>Echo</methodName><params><param>");
        for _ in 0..levels {
            body.push_str("<value><struct><member><name>a</name>");
        }
        body.push_str("<value><string>x</string></value>");
        for _ in 0..levels {
            body.push_str("</member></struct></value>");
        }
        body.push_str("</param></params></methodCall>");

        let document = handle_xml_rpc_request(&registry(), &Method::POST, body.as_bytes())
            .expect("pipeline produces a document");
        let response = decode_method_response(&document).expect("decode response");

        assert_eq!(response.fault_code(), Some(FAULT_BAD_REQUEST));
        assert!(response
            .fault_string()
            .is_some_and(|message| message.contains("nesting too deep")));
    }

    #[test]
    fn unknown_method_is_a_fault() {
        let xml = run("<methodCall><methodName>DoesNotExist</methodName></methodCall>");

        assert!(xml.contains("<int>404</int>"));
        assert!(xml.contains("Unknown method: DoesNotExist"));
    }
}
