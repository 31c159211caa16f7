//! JSON response envelope shared by every subcommand.

use serde::Serialize;

/// `{ "success": bool, "data": ..., "message": string }`
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub message: String,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
        }
    }
}

impl Envelope<()> {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
        }
    }
}

/// Renders an envelope as one pretty JSON document.
pub fn render<T: Serialize>(envelope: &Envelope<T>) -> String {
    serde_json::to_string_pretty(envelope).unwrap_or_else(|err| {
        format!(r#"{{"success":false,"data":null,"message":"serialization failed: {err}"}}"#)
    })
}
