//! Stream fixture helpers for integration tests.

#![allow(dead_code)]

use wiremock::ResponseTemplate;

/// Builds a `data:` line stream body from tokens plus the closing event.
pub fn stream_body(tokens: &[&str], thread_id: &str) -> String {
    let mut body = String::new();
    for token in tokens {
        body.push_str(&format!(
            "data: {{\"type\":\"token\",\"content\":\"{}\"}}\n",
            escape_json(token)
        ));
    }
    body.push_str(&format!(
        "data: {{\"type\":\"done\",\"thread_id\":\"{}\"}}\n",
        escape_json(thread_id)
    ));
    body
}

/// Wraps a stream body in a ResponseTemplate.
pub fn stream_response(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(body.to_string())
}

/// Convenience: token stream wrapped in a ResponseTemplate.
pub fn token_stream_response(tokens: &[&str], thread_id: &str) -> ResponseTemplate {
    stream_response(&stream_body(tokens, thread_id))
}

/// Batch JSON response for `POST /search`.
pub fn batch_response(text: &str, thread_id: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(serde_json::json!({
        "response": text,
        "thread_id": thread_id,
        "citations": [],
    }))
}

/// Escape special characters for JSON string embedding.
fn escape_json(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_body_shape() {
        let body = stream_body(&["Hola", "mundo"], "t1");
        assert!(body.contains(r#"data: {"type":"token","content":"Hola"}"#));
        assert!(body.contains(r#"data: {"type":"done","thread_id":"t1"}"#));
        assert_eq!(body.lines().count(), 3);
    }

    #[test]
    fn test_escaping() {
        let body = stream_body(&["con \"comillas\""], "t1");
        assert!(body.contains(r#"con \"comillas\""#));
    }
}
