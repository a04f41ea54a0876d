use serde::{Deserialize, Serialize};

/// A single message in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl ChatMessage {
    pub fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: MessageContent::Text(content.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// Message content: a plain string or an ordered list of typed parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// One typed content part. Only `text`-typed parts contribute to the
/// flattened prompt; everything else is dropped silently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub part_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Flatten a conversation into the single text prompt the gateway accepts.
///
/// System messages are collected first (each rendered as `System: <text>`,
/// in encounter order), then user/assistant messages in their original
/// order. Multi-part content joins its text parts with single spaces.
/// Rendered messages are joined with a blank line; messages that render
/// empty are skipped. Never fails — malformed entries are dropped.
pub fn flatten(messages: &[ChatMessage]) -> String {
    let mut rendered: Vec<String> = Vec::new();

    for msg in messages {
        if msg.role != Role::System {
            continue;
        }
        let text = render_content(&msg.content);
        if !text.is_empty() {
            rendered.push(format!("System: {text}"));
        }
    }

    for msg in messages {
        if msg.role == Role::System {
            continue;
        }
        let text = render_content(&msg.content);
        if !text.is_empty() {
            rendered.push(text);
        }
    }

    rendered.join("\n\n")
}

fn render_content(content: &MessageContent) -> String {
    match content {
        MessageContent::Text(s) => s.clone(),
        MessageContent::Parts(parts) => {
            let texts: Vec<&str> = parts
                .iter()
                .filter(|p| p.part_type == "text")
                .filter_map(|p| p.text.as_deref())
                .collect();
            texts.join(" ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn part(part_type: &str, text: Option<&str>) -> ContentPart {
        ContentPart {
            part_type: part_type.to_string(),
            text: text.map(String::from),
        }
    }

    #[test]
    fn system_messages_come_first_in_encounter_order() {
        let messages = vec![
            ChatMessage::text(Role::User, "hi"),
            ChatMessage::text(Role::System, "be brief"),
            ChatMessage::text(Role::Assistant, "hello"),
            ChatMessage::text(Role::System, "be kind"),
        ];
        assert_eq!(
            flatten(&messages),
            "System: be brief\n\nSystem: be kind\n\nhi\n\nhello"
        );
    }

    #[test]
    fn multipart_content_joins_text_parts_with_spaces() {
        let messages = vec![ChatMessage {
            role: Role::User,
            content: MessageContent::Parts(vec![
                part("text", Some("look at")),
                part("image", None),
                part("text", Some("this")),
            ]),
        }];
        assert_eq!(flatten(&messages), "look at this");
    }

    #[test]
    fn non_text_only_message_is_skipped() {
        let messages = vec![
            ChatMessage {
                role: Role::User,
                content: MessageContent::Parts(vec![part("image", None)]),
            },
            ChatMessage::text(Role::User, "caption?"),
        ];
        assert_eq!(flatten(&messages), "caption?");
    }

    #[test]
    fn text_typed_part_without_text_field_is_dropped() {
        let messages = vec![ChatMessage {
            role: Role::User,
            content: MessageContent::Parts(vec![part("text", None), part("text", Some("ok"))]),
        }];
        assert_eq!(flatten(&messages), "ok");
    }

    #[test]
    fn empty_input_yields_empty_string() {
        assert_eq!(flatten(&[]), "");
    }

    #[test]
    fn flattening_is_idempotent_across_calls() {
        let messages = vec![
            ChatMessage::text(Role::System, "sys"),
            ChatMessage::text(Role::User, "question"),
        ];
        assert_eq!(flatten(&messages), flatten(&messages));
    }
}
