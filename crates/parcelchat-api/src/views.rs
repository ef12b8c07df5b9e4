//! Store models to wire views.

use std::fmt::Write;

use chrono::{DateTime, Local, Utc};
use parcelchat_persist::{Message, Thread};
use parcelchat_types::{MessageView, ThreadView};

pub fn message_view(message: Message, format: &str) -> MessageView {
    MessageView {
        id: message.id,
        sender: message.sender,
        text: message.text,
        created_at: display_time(message.created_at, format),
        created_at_iso: message.created_at,
    }
}

pub fn message_views(messages: Vec<Message>, format: &str) -> Vec<MessageView> {
    messages.into_iter().map(|m| message_view(m, format)).collect()
}

pub fn thread_view(thread: Thread, format: &str) -> ThreadView {
    ThreadView {
        id: thread.id,
        first_name: thread.contact.first_name,
        last_name: thread.contact.last_name,
        email: thread.contact.email,
        phone: thread.contact.phone,
        status: thread.status,
        created_at: display_time(thread.created_at, format),
        created_at_iso: thread.created_at,
    }
}

/// Server-local rendering; falls back to RFC 3339 if the pattern cannot be rendered
fn display_time(at: DateTime<Utc>, format: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", at.with_timezone(&Local).format(format)).is_err() {
        return at.to_rfc3339();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use parcelchat_types::Sender;

    #[test]
    fn test_message_view_keeps_iso_timestamp() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 9, 7, 0).unwrap();
        let view = message_view(
            Message {
                id: "m1".to_string(),
                thread_id: "t1".to_string(),
                sender: Sender::Admin,
                text: "We'll check".to_string(),
                seq: 1,
                created_at: at,
            },
            "%d.%m.%Y, %H:%M:%S",
        );

        assert_eq!(view.created_at_iso, at);
        assert_eq!(view.created_at, at.with_timezone(&Local).format("%d.%m.%Y, %H:%M:%S").to_string());
        assert_eq!(view.sender, Sender::Admin);
    }

    #[test]
    fn test_unrenderable_format_falls_back() {
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 9, 7, 0).unwrap();
        assert_eq!(display_time(at, "%Q"), at.to_rfc3339());
    }
}
