use serde_json::json;

/// A success frame with an explicit `header.status`.
pub fn frame_with_status(status: i64, content: &str) -> String {
    json!({
        "header": {"code": 0, "message": "Success", "sid": "cht000000@test", "status": status},
        "payload": {
            "choices": {
                "status": status,
                "seq": 0,
                "text": [{"content": content, "role": "assistant", "index": 0}]
            }
        }
    })
    .to_string()
}

pub fn progress_frame(content: &str) -> String {
    frame_with_status(1, content)
}

pub fn final_frame(content: &str) -> String {
    frame_with_status(2, content)
}

/// A rejection frame as sent for auth, quota or audit failures.
pub fn error_frame(code: i64, message: &str) -> String {
    json!({
        "header": {"code": code, "message": message, "sid": "cht000000@test", "status": 2}
    })
    .to_string()
}

/// Progress frames for every chunk, then a final frame for the last one.
pub fn stream_frames(chunks: &[&str]) -> Vec<String> {
    let Some((last, rest)) = chunks.split_last() else {
        return vec![final_frame("")];
    };
    rest.iter()
        .map(|chunk| progress_frame(chunk))
        .chain(std::iter::once(final_frame(last)))
        .collect()
}
