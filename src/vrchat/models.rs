use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from the VRChat API. `Display` is the bare detail so it can be
/// echoed to the submitter as-is.
#[derive(Error, Debug)]
pub enum VRChatError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{detail}")]
    Rejected { status: StatusCode, detail: String },

    #[error("Failed to build client: {0}")]
    Client(String),
}

impl VRChatError {
    /// Non-2xx response. The body is the detail; an empty body falls back to
    /// the numeric status code.
    pub fn rejected(status: StatusCode, body: &str) -> Self {
        let detail = if body.trim().is_empty() {
            status.as_u16().to_string()
        } else {
            body.to_string()
        };
        VRChatError::Rejected { status, detail }
    }
}

/// Body of `POST /groups/{groupId}/announcement`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct GroupAnnouncement {
    pub title: String,
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn announcement_serializes_description_as_text() {
        let body = serde_json::to_string(&GroupAnnouncement {
            title: "Maintenance".into(),
            text: "Servers down 5pm UTC".into(),
        })
        .unwrap();
        assert_eq!(body, r#"{"title":"Maintenance","text":"Servers down 5pm UTC"}"#);
    }

    #[test]
    fn rejection_detail_prefers_body_over_status() {
        assert_eq!(VRChatError::rejected(StatusCode::FORBIDDEN, "Forbidden").to_string(), "Forbidden");
        assert_eq!(VRChatError::rejected(StatusCode::BAD_GATEWAY, "").to_string(), "502");
    }
}
