use serde_json::Value;

/// Node types whose children render as separate lines.
const BLOCK_NODES: &[&str] = &[
    "paragraph",
    "heading",
    "listItem",
    "blockquote",
    "codeBlock",
    "panel",
    "tableRow",
];

/// Extract plain text from Jira's Atlassian Document Format (ADF).
///
/// Plain strings pass through unchanged, so fields that are sometimes
/// rich text and sometimes not can share this path. Returns `None` when
/// the value holds no text at all.
pub fn extract_text_from_adf(value: &Value) -> Option<String> {
    let mut out = String::new();
    collect(value, &mut out);
    let text = out.trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn collect(value: &Value, out: &mut String) {
    match value {
        Value::String(s) => out.push_str(s),
        Value::Array(nodes) => nodes.iter().for_each(|node| collect(node, out)),
        Value::Object(obj) => {
            let node_type = obj.get("type").and_then(|v| v.as_str()).unwrap_or_default();
            match node_type {
                "text" => {
                    if let Some(text) = obj.get("text").and_then(|v| v.as_str()) {
                        out.push_str(text);
                    }
                }
                "hardBreak" => out.push('\n'),
                _ => {
                    if let Some(content) = obj.get("content") {
                        collect(content, out);
                    }
                    if BLOCK_NODES.contains(&node_type) && !out.ends_with('\n') {
                        out.push('\n');
                    }
                }
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paragraphs_become_lines() {
        let doc = json!({
            "type": "doc",
            "version": 1,
            "content": [
                {"type": "paragraph", "content": [
                    {"type": "text", "text": "Users can "},
                    {"type": "text", "text": "log in", "marks": [{"type": "strong"}]}
                ]},
                {"type": "paragraph", "content": [{"type": "text", "text": "SSO works"}]}
            ]
        });
        assert_eq!(
            extract_text_from_adf(&doc).as_deref(),
            Some("Users can log in\nSSO works")
        );
    }

    #[test]
    fn bullet_list_items_are_separate_lines() {
        let doc = json!({
            "type": "doc",
            "content": [{"type": "bulletList", "content": [
                {"type": "listItem", "content": [
                    {"type": "paragraph", "content": [{"type": "text", "text": "one"}]}
                ]},
                {"type": "listItem", "content": [
                    {"type": "paragraph", "content": [{"type": "text", "text": "two"}]}
                ]}
            ]}]
        });
        assert_eq!(extract_text_from_adf(&doc).as_deref(), Some("one\ntwo"));
    }

    #[test]
    fn hard_break_is_a_newline() {
        let doc = json!({"type": "paragraph", "content": [
            {"type": "text", "text": "a"},
            {"type": "hardBreak"},
            {"type": "text", "text": "b"}
        ]});
        assert_eq!(extract_text_from_adf(&doc).as_deref(), Some("a\nb"));
    }

    #[test]
    fn plain_string_passes_through() {
        assert_eq!(
            extract_text_from_adf(&json!("already plain")).as_deref(),
            Some("already plain")
        );
    }

    #[test]
    fn empty_document_is_none() {
        assert_eq!(extract_text_from_adf(&json!({"type": "doc", "content": []})), None);
        assert_eq!(extract_text_from_adf(&Value::Null), None);
    }
}
