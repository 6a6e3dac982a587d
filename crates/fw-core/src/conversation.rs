//! Conversation items: the per-type data behind message nodes.
//!
//! The inspector hands this data (as JSON) to a node's display-name resolver,
//! so tree labels can say "Transfer (mine)" instead of "Message #3".

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Who sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConversationRole {
    Mine,
    Friend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransferStatus {
    Awaiting,
    Accepted,
    Rejected,
    Expired,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RedPacketStatus {
    Awaiting,
    Accepted,
    Expired,
}

/// Message type without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConversationType {
    Text,
    CenterText,
    Image,
    Video,
    Voice,
    Transfer,
    RedPacket,
    PersonalCard,
}

impl ConversationType {
    pub fn label(self) -> &'static str {
        match self {
            Self::Text => "Text",
            Self::CenterText => "Center text",
            Self::Image => "Image",
            Self::Video => "Video",
            Self::Voice => "Voice",
            Self::Transfer => "Transfer",
            Self::RedPacket => "Red packet",
            Self::PersonalCard => "Contact card",
        }
    }
}

/// Type-specific payload of a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ConversationKind {
    Text {
        text_content: String,
        #[serde(default)]
        reference_id: Option<String>,
    },
    CenterText {
        simple_content: String,
    },
    Image {
        #[serde(default)]
        image_info: Option<String>,
    },
    Video {
        #[serde(default)]
        video_info: Option<String>,
    },
    Voice {
        duration: u32,
        #[serde(default)]
        is_read: bool,
        #[serde(default)]
        show_stt: bool,
        #[serde(default)]
        stt: Option<String>,
    },
    Transfer {
        original_sender: ConversationRole,
        amount: String,
        #[serde(default)]
        note: Option<String>,
        transfer_status: TransferStatus,
    },
    RedPacket {
        original_sender: ConversationRole,
        #[serde(default)]
        amount: Option<String>,
        #[serde(default)]
        note: Option<String>,
        red_packet_status: RedPacketStatus,
    },
    PersonalCard {
        nickname: String,
        #[serde(default)]
        avatar_info: Option<String>,
    },
}

impl ConversationKind {
    pub fn conversation_type(&self) -> ConversationType {
        match self {
            Self::Text { .. } => ConversationType::Text,
            Self::CenterText { .. } => ConversationType::CenterText,
            Self::Image { .. } => ConversationType::Image,
            Self::Video { .. } => ConversationType::Video,
            Self::Voice { .. } => ConversationType::Voice,
            Self::Transfer { .. } => ConversationType::Transfer,
            Self::RedPacket { .. } => ConversationType::RedPacket,
            Self::PersonalCard { .. } => ConversationType::PersonalCard,
        }
    }
}

/// One message in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationItem {
    pub id: String,
    /// Center text has no sender.
    #[serde(default)]
    pub role: Option<ConversationRole>,
    #[serde(default)]
    pub upper_text: Option<String>,
    #[serde(default)]
    pub send_timestamp: Option<i64>,
    #[serde(flatten)]
    pub kind: ConversationKind,
}

impl ConversationItem {
    /// Label in the style of the message editor's reference picker:
    /// `Message (Text-mine)`.
    pub fn label(&self) -> String {
        let ty = self.kind.conversation_type().label();
        match self.role {
            Some(ConversationRole::Mine) => format!("Message ({ty}-mine)"),
            Some(ConversationRole::Friend) => format!("Message ({ty}-friend)"),
            None => format!("Message ({ty})"),
        }
    }

    /// Opaque data handed to display-name resolvers.
    pub fn to_data(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn parses_tagged_transfer() {
        let item: ConversationItem = serde_json::from_value(json!({
            "id": "m1",
            "role": "mine",
            "type": "transfer",
            "originalSender": "friend",
            "amount": "12.00",
            "transferStatus": "awaiting"
        }))
        .unwrap();
        assert_eq!(item.kind.conversation_type(), ConversationType::Transfer);
        assert_eq!(item.label(), "Message (Transfer-mine)");
    }

    #[test]
    fn data_keeps_type_tag_flat() {
        let item = ConversationItem {
            id: "m2".into(),
            role: None,
            upper_text: None,
            send_timestamp: None,
            kind: ConversationKind::CenterText {
                simple_content: "You recalled a message".into(),
            },
        };
        let data = item.to_data();
        assert_eq!(data["type"], json!("centerText"));
        assert_eq!(data["simpleContent"], json!("You recalled a message"));
        assert_eq!(item.label(), "Message (Center text)");
    }
}
