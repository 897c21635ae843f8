//! Method handler capability
//!
//! A handler receives the decoded parameter list and returns any serializable
//! domain object. The registry only sees the type-erased form, which turns that
//! object into compact JSON text.

use std::marker::PhantomData;

use serde::Serialize;
use thiserror::Error;

use crate::xmlrpc::value::Value;

/// Failure reported by a handler; the message becomes the fault string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub trait MethodHandler: Send + Sync + 'static {
    type Output: Serialize;

    fn handle(&self, params: &[Value]) -> Result<Self::Output, HandlerError>;
}

/// Adapts a plain function or closure into a [`MethodHandler`].
pub struct FnHandler<F, T> {
    func: F,
    _output: PhantomData<fn() -> T>,
}

pub fn from_fn<F, T>(func: F) -> FnHandler<F, T>
where
    F: Fn(&[Value]) -> Result<T, HandlerError> + Send + Sync + 'static,
    T: Serialize + 'static,
{
    FnHandler {
        func,
        _output: PhantomData,
    }
}

impl<F, T> MethodHandler for FnHandler<F, T>
where
    F: Fn(&[Value]) -> Result<T, HandlerError> + Send + Sync + 'static,
    T: Serialize + 'static,
{
    type Output = T;

    fn handle(&self, params: &[Value]) -> Result<T, HandlerError> {
        (self.func)(params)
    }
}

#[derive(Debug)]
pub(crate) enum CallError {
    Handler(HandlerError),
    Serialize(serde_json::Error),
}

pub(crate) trait ErasedHandler: Send + Sync {
    fn call(&self, params: &[Value]) -> Result<String, CallError>;
}

impl<H: MethodHandler> ErasedHandler for H {
    fn call(&self, params: &[Value]) -> Result<String, CallError> {
        let output = self.handle(params).map_err(CallError::Handler)?;
        serde_json::to_string(&output).map_err(CallError::Serialize)
    }
}
