//! Wire types exchanged with the inference service.
//!
//! Outbound: one [`RequestPayload`] per session, serialized as JSON text.
//! Inbound: a sequence of JSON frames parsed into [`StreamFrame`].

use errors::DialogueError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestPayload {
    pub header: RequestHeader,
    pub parameter: RequestParameter,
    pub payload: RequestBody
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestHeader {
    pub app_id: String,
    pub uid: String
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestParameter {
    pub chat: ChatParameter
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatParameter {
    pub domain: String,
    pub temperature: f32,
    pub max_tokens: u32
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    pub message: MessageBody
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageBody {
    pub text: Vec<ChatMessage>
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into()
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into()
        }
    }
}

impl RequestPayload {
    pub fn session_uid(&self) -> &str {
        &self.header.uid
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.payload.message.text
    }

    pub fn to_json(&self) -> Result<String, DialogueError> {
        serde_json::to_string(self)
            .map_err(|e| DialogueError::configuration(format!("failed to encode request payload: {e}")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamStatus {
    InProgress,
    Final
}

impl StreamStatus {
    /// Maps the service's `header.status` value. 0 (first) and 1 (middle)
    /// are both in progress, 2 is the last frame.
    pub fn from_wire(status: i64) -> Option<Self> {
        match status {
            0 | 1 => Some(Self::InProgress),
            2 => Some(Self::Final),
            _ => None
        }
    }
}

/// One parsed inbound frame.
///
/// Rejection frames (`status_code != 0`) carry the service's message and an
/// empty content chunk; their status is reported as [`StreamStatus::Final`]
/// because nothing follows them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamFrame {
    pub status_code: i64,
    pub status: StreamStatus,
    pub content: String,
    pub message: String,
    pub sid: Option<String>,
    pub seq: Option<u64>
}

impl StreamFrame {
    pub fn is_rejection(&self) -> bool {
        self.status_code != 0
    }

    pub fn is_final(&self) -> bool {
        self.status == StreamStatus::Final
    }

    pub fn into_rejection(self) -> DialogueError {
        DialogueError::RemoteRejected {
            code: self.status_code,
            message: self.message,
            sid: self.sid
        }
    }

    /// Parses one text frame.
    ///
    /// Fails with `MalformedFrame` when the text is not JSON, `header.code`
    /// is missing, a success frame lacks a recognized `header.status`, or a
    /// success frame lacks `payload.choices.text[0].content`.
    pub fn parse(raw: &str) -> Result<Self, DialogueError> {
        let wire: WireFrame = serde_json::from_str(raw)
            .map_err(|e| DialogueError::malformed(format!("frame is not valid JSON: {e}")))?;

        let header = wire
            .header
            .ok_or_else(|| DialogueError::malformed("frame has no header"))?;
        let code = header
            .code
            .ok_or_else(|| DialogueError::malformed("frame header has no code"))?;

        if code != 0 {
            return Ok(Self {
                status_code: code,
                status: StreamStatus::Final,
                content: String::new(),
                message: header.message.unwrap_or_default(),
                sid: header.sid,
                seq: None
            });
        }

        let raw_status = header
            .status
            .ok_or_else(|| DialogueError::malformed("frame header has no status"))?;
        let status = StreamStatus::from_wire(raw_status)
            .ok_or_else(|| DialogueError::malformed(format!("unrecognized frame status {raw_status}")))?;

        let choices = wire
            .payload
            .and_then(|p| p.choices)
            .ok_or_else(|| DialogueError::malformed("frame has no payload.choices"))?;
        let content = choices
            .text
            .into_iter()
            .next()
            .and_then(|t| t.content)
            .ok_or_else(|| DialogueError::malformed("frame has no payload.choices.text[0].content"))?;

        Ok(Self {
            status_code: 0,
            status,
            content,
            message: header.message.unwrap_or_default(),
            sid: header.sid,
            seq: choices.seq
        })
    }
}

#[derive(Deserialize)]
struct WireFrame {
    header: Option<WireHeader>,
    payload: Option<WirePayload>
}

#[derive(Deserialize)]
struct WireHeader {
    code: Option<i64>,
    message: Option<String>,
    sid: Option<String>,
    status: Option<i64>
}

#[derive(Deserialize)]
struct WirePayload {
    choices: Option<WireChoices>
}

#[derive(Deserialize)]
struct WireChoices {
    seq: Option<u64>,
    #[serde(default)]
    text: Vec<WireText>
}

#[derive(Deserialize)]
struct WireText {
    content: Option<String>
}

#[cfg(test)]
mod tests {
    use super::*;
    use errors::ErrorKind;

    #[test]
    fn test_parse_progress_frame() {
        let raw = r#"{"header":{"code":0,"message":"Success","sid":"cht000b","status":1},
            "payload":{"choices":{"status":1,"seq":3,"text":[{"content":"学而","role":"assistant","index":0}]}}}"#;
        let frame = StreamFrame::parse(raw).unwrap();
        assert_eq!(frame.status, StreamStatus::InProgress);
        assert_eq!(frame.content, "学而");
        assert_eq!(frame.sid.as_deref(), Some("cht000b"));
        assert_eq!(frame.seq, Some(3));
        assert!(!frame.is_rejection());
    }

    #[test]
    fn test_parse_first_frame_status_zero_is_in_progress() {
        let raw = r#"{"header":{"code":0,"status":0},"payload":{"choices":{"text":[{"content":""}]}}}"#;
        let frame = StreamFrame::parse(raw).unwrap();
        assert_eq!(frame.status, StreamStatus::InProgress);
        assert_eq!(frame.content, "");
    }

    #[test]
    fn test_parse_final_frame() {
        let raw = r#"{"header":{"code":0,"status":2},"payload":{"choices":{"text":[{"content":"end"}]},"usage":{"text":{"total_tokens":9}}}}"#;
        let frame = StreamFrame::parse(raw).unwrap();
        assert!(frame.is_final());
        assert_eq!(frame.content, "end");
    }

    #[test]
    fn test_parse_rejection_ignores_payload() {
        let raw = r#"{"header":{"code":10013,"message":"input content audit failed","sid":"cht01","status":2}}"#;
        let frame = StreamFrame::parse(raw).unwrap();
        assert!(frame.is_rejection());
        let err = frame.into_rejection();
        assert_eq!(
            err,
            DialogueError::RemoteRejected {
                code: 10013,
                message: "input content audit failed".to_string(),
                sid: Some("cht01".to_string())
            }
        );
    }

    #[test]
    fn test_parse_rejection_with_odd_status() {
        let raw = r#"{"header":{"code":4003,"status":9}}"#;
        assert!(StreamFrame::parse(raw).unwrap().is_rejection());
    }

    #[test]
    fn test_unrecognized_status_is_malformed() {
        let raw = r#"{"header":{"code":0,"status":7},"payload":{"choices":{"text":[{"content":"x"}]}}}"#;
        let err = StreamFrame::parse(raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedFrame);
        assert!(err.to_string().contains('7'));
    }

    #[test]
    fn test_malformed_inputs() {
        let cases = [
            "not json",
            "{}",
            r#"{"header":{}}"#,
            r#"{"header":{"code":0}}"#,
            r#"{"header":{"code":0,"status":1}}"#,
            r#"{"header":{"code":0,"status":1},"payload":{"choices":{"text":[]}}}"#,
            r#"{"header":{"code":0,"status":1},"payload":{"choices":{"text":[{"role":"assistant"}]}}}"#,
        ];
        for raw in cases {
            match StreamFrame::parse(raw) {
                Err(err) => assert_eq!(err.kind(), ErrorKind::MalformedFrame, "input {raw}"),
                Ok(frame) => panic!("Expected malformed frame for {raw}, got {frame:?}")
            }
        }
    }

    #[test]
    fn test_payload_wire_shape() {
        let payload = RequestPayload {
            header: RequestHeader {
                app_id: "app".to_string(),
                uid: "0123456789abcdef0123456789abcdef".to_string()
            },
            parameter: RequestParameter {
                chat: ChatParameter {
                    domain: "general".to_string(),
                    temperature: 0.5,
                    max_tokens: 1024
                }
            },
            payload: RequestBody {
                message: MessageBody {
                    text: vec![ChatMessage::user("hi")]
                }
            }
        };
        let value: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();
        assert_eq!(value["header"]["app_id"], "app");
        assert_eq!(value["header"]["uid"], "0123456789abcdef0123456789abcdef");
        assert_eq!(value["parameter"]["chat"]["domain"], "general");
        assert_eq!(value["parameter"]["chat"]["temperature"], 0.5);
        assert_eq!(value["parameter"]["chat"]["max_tokens"], 1024);
        assert_eq!(value["payload"]["message"]["text"][0]["role"], "user");
        assert_eq!(value["payload"]["message"]["text"][0]["content"], "hi");
    }
}
