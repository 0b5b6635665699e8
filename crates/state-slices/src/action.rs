//! Action object model
//!
//! Actions follow the Flux Standard Action shape: a `type` tag plus optional
//! `payload` and `meta`, and an `error` flag that is set exactly when the
//! payload is an error value. Here the flag is not stored at all; it is derived
//! from the [`Payload::Error`] variant, so an action cannot disagree with itself.

use std::fmt;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::Result;

/// Error value carried as an action payload.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{message}")]
pub struct ActionError {
    pub message: String,
}

impl ActionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Capture any error as a payload, keeping only its message
    pub fn from_error<E: std::error::Error + ?Sized>(err: &E) -> Self {
        Self::new(err.to_string())
    }

    /// Read an error payload of any shape: a `message` field, a bare string,
    /// or else the serialized value itself (`new Error()` arrives as `{}`)
    pub fn from_payload(value: &Value) -> Self {
        match value {
            Value::String(message) => Self::new(message.as_str()),
            Value::Object(fields) => match fields.get("message") {
                Some(Value::String(message)) => Self::new(message.as_str()),
                _ => Self::new(value.to_string()),
            },
            other => Self::new(other.to_string()),
        }
    }
}

/// Primary value of an action
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Value(Value),
    Error(ActionError),
}

/// A dispatched message describing an intended state transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawAction", into = "RawAction")]
pub struct Action {
    action_type: String,
    payload: Option<Payload>,
    meta: Option<Value>,
}

impl Action {
    pub fn new(action_type: impl Into<String>) -> Self {
        Self {
            action_type: action_type.into(),
            payload: None,
            meta: None,
        }
    }

    /// Attach a value payload. `null` counts as no payload.
    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = (!payload.is_null()).then_some(Payload::Value(payload));
        self
    }

    /// Attach an error payload, which also marks the action as an error
    pub fn with_error(mut self, error: ActionError) -> Self {
        self.payload = Some(Payload::Error(error));
        self
    }

    /// Attach supporting metadata. `null` counts as no meta.
    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = (!meta.is_null()).then_some(meta);
        self
    }

    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    /// Slice name prefix of the type, if the type is namespaced
    pub fn namespace(&self) -> Option<&str> {
        self.action_type.split_once('/').map(|(prefix, _)| prefix)
    }

    pub fn payload(&self) -> Option<&Payload> {
        self.payload.as_ref()
    }

    pub fn payload_value(&self) -> Option<&Value> {
        match &self.payload {
            Some(Payload::Value(value)) => Some(value),
            _ => None,
        }
    }

    pub fn payload_error(&self) -> Option<&ActionError> {
        match &self.payload {
            Some(Payload::Error(error)) => Some(error),
            _ => None,
        }
    }

    /// Deserialize the value payload into `T`.
    ///
    /// Returns `Ok(None)` for actions without a value payload, including error actions.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        match self.payload_value() {
            Some(value) => Ok(Some(T::deserialize(value)?)),
            None => Ok(None),
        }
    }

    pub fn meta(&self) -> Option<&Value> {
        self.meta.as_ref()
    }

    pub fn is_error(&self) -> bool {
        matches!(self.payload, Some(Payload::Error(_)))
    }
}

/// Wire shape of an action
#[derive(Serialize, Deserialize)]
struct RawAction {
    #[serde(rename = "type")]
    action_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meta: Option<Value>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    error: bool,
}

impl From<Action> for RawAction {
    fn from(action: Action) -> Self {
        let error = action.is_error();
        let payload = action.payload.map(|payload| match payload {
            Payload::Value(value) => value,
            Payload::Error(err) => serde_json::json!({ "message": err.message }),
        });

        Self {
            action_type: action.action_type,
            payload,
            meta: action.meta,
            error,
        }
    }
}

impl TryFrom<RawAction> for Action {
    type Error = String;

    fn try_from(raw: RawAction) -> std::result::Result<Self, Self::Error> {
        let payload = match (raw.error, raw.payload) {
            (true, Some(value)) => Some(Payload::Error(ActionError::from_payload(&value))),
            (true, None) => {
                return Err(format!(
                    "action \"{}\" is flagged as error but has no payload",
                    raw.action_type
                ))
            }
            (false, payload) => payload.map(Payload::Value),
        };

        Ok(Self {
            action_type: raw.action_type,
            payload,
            meta: raw.meta,
        })
    }
}

type PayloadFn<T> = Rc<dyn Fn(&T) -> std::result::Result<Value, ActionError>>;
type MetaFn<T> = Rc<dyn Fn(&T) -> Value>;

/// Builds actions of one namespaced type from arguments of type `T`.
///
/// The type string is available without creating an action, so reducers can
/// be keyed on `creator.action_type()`.
pub struct ActionCreator<T = ()> {
    action_type: String,
    payload: Option<PayloadFn<T>>,
    meta: Option<MetaFn<T>>,
}

impl<T> ActionCreator<T> {
    pub(crate) fn new(action_type: String) -> Self {
        Self {
            action_type,
            payload: None,
            meta: None,
        }
    }

    pub fn action_type(&self) -> &str {
        &self.action_type
    }

    /// Derive the payload from the creator arguments
    pub fn with_payload<F>(self, payload: F) -> Self
    where
        F: Fn(&T) -> Value + 'static,
    {
        self.with_fallible_payload(move |args| Ok(payload(args)))
    }

    /// Derive the payload from the creator arguments.
    ///
    /// Returning `Err` is not a failure: the error becomes the payload and the
    /// action is flagged as an error action.
    pub fn with_fallible_payload<F>(mut self, payload: F) -> Self
    where
        F: Fn(&T) -> std::result::Result<Value, ActionError> + 'static,
    {
        self.payload = Some(Rc::new(payload));
        self
    }

    /// Derive the meta value from the creator arguments
    pub fn with_meta<F>(mut self, meta: F) -> Self
    where
        F: Fn(&T) -> Value + 'static,
    {
        self.meta = Some(Rc::new(meta));
        self
    }

    pub fn create(&self, args: T) -> Action {
        let mut action = Action::new(self.action_type.clone());

        if let Some(meta) = &self.meta {
            action = action.with_meta(meta(&args));
        }

        match self.payload.as_ref().map(|payload| payload(&args)) {
            Some(Ok(value)) => action.with_payload(value),
            Some(Err(err)) => action.with_error(err),
            None => action,
        }
    }
}

impl<T> Clone for ActionCreator<T> {
    fn clone(&self) -> Self {
        Self {
            action_type: self.action_type.clone(),
            payload: self.payload.clone(),
            meta: self.meta.clone(),
        }
    }
}

impl<T> fmt::Debug for ActionCreator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionCreator")
            .field("action_type", &self.action_type)
            .field("has_payload", &self.payload.is_some())
            .field("has_meta", &self.meta.is_some())
            .finish()
    }
}

impl<T> fmt::Display for ActionCreator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.action_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn creator<T>(local: &str) -> ActionCreator<T> {
        ActionCreator::new(format!("create-action/{}", local))
    }

    #[test]
    fn test_type_only_action() {
        let action = creator::<()>("type-only").create(());
        assert_eq!(action, Action::new("create-action/type-only"));
        assert!(!action.is_error());
        assert!(action.payload().is_none());
        assert!(action.meta().is_none());
    }

    #[test]
    fn test_creator_type_matches_created_type() {
        let doubled = creator::<i64>("doubled").with_payload(|value| json!(value * 2));
        assert_eq!(doubled.create(2).action_type(), doubled.action_type());
        assert_eq!(doubled.to_string(), "create-action/doubled");
    }

    #[test]
    fn test_payload_creator() {
        let doubled = creator::<i64>("doubled").with_payload(|value| json!(value * 2));
        let action = doubled.create(2);
        assert_eq!(action.payload_value(), Some(&json!(4)));
        assert!(!action.is_error());
    }

    #[test]
    fn test_error_payload_sets_error_flag() {
        let failing = creator::<i64>("failing")
            .with_fallible_payload(|value| Err(ActionError::new(format!("Boom for {}", value * 2))));
        let action = failing.create(2);
        assert!(action.is_error());
        assert_eq!(action.payload_error(), Some(&ActionError::new("Boom for 4")));
        assert_eq!(action.payload_value(), None);
    }

    #[test]
    fn test_meta_only_and_both() {
        let meta_only = creator::<i64>("meta").with_meta(|value| json!(value * 2));
        let action = meta_only.create(2);
        assert_eq!(action.meta(), Some(&json!(4)));
        assert!(action.payload().is_none());

        let both = creator::<(i64, Value)>("both")
            .with_payload(|(value, _)| json!(value * 2))
            .with_meta(|(_, context)| context.clone());
        let action = both.create((2, json!({ "context": "test" })));
        assert_eq!(action.payload_value(), Some(&json!(4)));
        assert_eq!(action.meta(), Some(&json!({ "context": "test" })));
    }

    #[test]
    fn test_null_payload_is_absent() {
        let optional = creator::<Option<i64>>("optional")
            .with_payload(|value| value.map(Value::from).unwrap_or(Value::Null));
        assert!(optional.create(None).payload().is_none());
        assert_eq!(optional.create(Some(5)).payload_as::<i64>().unwrap(), Some(5));
    }

    #[test]
    fn test_namespace() {
        assert_eq!(Action::new("counter/increment").namespace(), Some("counter"));
        assert_eq!(Action::new("UNRELATED").namespace(), None);
    }

    #[test]
    fn test_serializes_to_flux_standard_shape() {
        let action = Action::new("todos/add").with_payload(json!("milk"));
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({ "type": "todos/add", "payload": "milk" })
        );

        let failed = Action::new("todos/add")
            .with_error(ActionError::new("boom"))
            .with_meta(json!(1));
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({ "type": "todos/add", "payload": { "message": "boom" }, "meta": 1, "error": true })
        );
    }

    #[test]
    fn test_deserializes_error_action() {
        let action: Action = serde_json::from_value(json!({
            "type": "todos/add",
            "payload": { "message": "boom" },
            "error": true
        }))
        .unwrap();
        assert!(action.is_error());
        assert_eq!(action.payload_error().map(|e| e.message.as_str()), Some("boom"));
    }

    #[test]
    fn test_deserializes_error_payload_of_any_shape() {
        let empty: Action =
            serde_json::from_str(r#"{"type":"a/b","payload":{},"error":true}"#).unwrap();
        assert!(empty.is_error());
        assert_eq!(empty.payload_error(), Some(&ActionError::new("{}")));

        let text: Action =
            serde_json::from_str(r#"{"type":"a/b","payload":"boom","error":true}"#).unwrap();
        assert_eq!(text.payload_error(), Some(&ActionError::new("boom")));

        let other: Action = serde_json::from_value(json!({
            "type": "a/b",
            "payload": { "code": 7 },
            "error": true
        }))
        .unwrap();
        assert_eq!(other.payload_error(), Some(&ActionError::new(r#"{"code":7}"#)));
    }

    #[test]
    fn test_from_error_keeps_message() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such slice file");
        let failing = creator::<()>("load").with_fallible_payload(move |_| Err(ActionError::from_error(&io)));
        let action = failing.create(());
        assert!(action.is_error());
        assert_eq!(action.payload_error().map(|e| e.message.as_str()), Some("no such slice file"));
    }

    #[test]
    fn test_rejects_error_flag_without_payload() {
        let result = serde_json::from_value::<Action>(json!({ "type": "todos/add", "error": true }));
        assert!(result.is_err());
    }
}
