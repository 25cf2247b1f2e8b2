use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{Message, User},
};

use studybot_core::{
    commands::{Command, COMMAND_PREFIXES},
    domain::{Attachment, ChatId, Invoker, UserId},
};

use crate::router::AppState;

pub async fn handle_command(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let Some(text) = msg.text().or(msg.caption()) else {
        return Ok(());
    };
    if addressed_to_other_bot(text, state.bot_username.as_deref()) {
        return Ok(());
    }
    let Some(parsed) = Command::parse(text) else {
        return Ok(());
    };

    let is_admin = match &parsed {
        Ok(command) if state.service.needs_admin_check(command) => {
            Some(is_chat_admin(&bot, &msg, user).await)
        }
        _ => None,
    };

    let invoker = Invoker {
        user_id: UserId(user.id.0 as i64),
        name: author_name(user),
        is_admin,
    };
    let attachment = attachment_of(&msg);

    state
        .service
        .handle_command(ChatId(msg.chat.id.0), parsed, &invoker, attachment.as_ref())
        .await;
    Ok(())
}

/// Telegram username, falling back to the display name.
fn author_name(user: &User) -> String {
    user.username
        .clone()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| user.full_name())
}

/// The document on the command message, or on the message it replies to.
fn attachment_of(msg: &Message) -> Option<Attachment> {
    let doc = msg
        .document()
        .or_else(|| msg.reply_to_message().and_then(|r| r.document()))?;
    Some(Attachment {
        reference: doc.file.id.clone(),
        file_name: doc.file_name.clone(),
    })
}

async fn is_chat_admin(bot: &Bot, msg: &Message, user: &User) -> bool {
    if msg.chat.is_private() {
        return false;
    }
    match bot.get_chat_member(msg.chat.id, user.id).await {
        Ok(member) => member.kind.is_privileged(),
        Err(e) => {
            tracing::warn!(chat_id = msg.chat.id.0, error = %e, "chat member lookup failed");
            false
        }
    }
}

/// `/cmd@other_bot` in a group is meant for someone else.
fn addressed_to_other_bot(text: &str, me: Option<&str>) -> bool {
    let Some(me) = me else {
        return false;
    };
    let Some(body) = text.trim_start().strip_prefix(COMMAND_PREFIXES) else {
        return false;
    };
    let first = body.split(char::is_whitespace).next().unwrap_or("");
    match first.split_once('@') {
        Some((_, target)) => !target.eq_ignore_ascii_case(me),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn user(username: Option<&str>) -> Value {
        let mut u = json!({
            "id": 7,
            "is_bot": false,
            "first_name": "Ada",
            "last_name": "Lovelace",
        });
        if let Some(name) = username {
            u["username"] = json!(name);
        }
        u
    }

    fn document(file_id: &str) -> Value {
        json!({
            "file_id": file_id,
            "file_unique_id": format!("u-{file_id}"),
            "file_name": "notes.pdf",
            "mime_type": "application/pdf",
            "file_size": 1024,
        })
    }

    fn message(id: i32, extra: Value) -> Value {
        let mut m = json!({
            "message_id": id,
            "date": 1_700_000_000,
            "chat": { "id": -1001, "type": "supergroup", "title": "Study group" },
            "from": user(Some("ada")),
        });
        for (k, v) in extra.as_object().cloned().unwrap_or_default() {
            m[k] = v;
        }
        m
    }

    fn parse_message(v: Value) -> Message {
        serde_json::from_value(v).expect("valid message fixture")
    }

    #[test]
    fn author_prefers_username() {
        let u: User = serde_json::from_value(user(Some("ada"))).unwrap();
        assert_eq!(author_name(&u), "ada");
    }

    #[test]
    fn author_falls_back_to_full_name() {
        let u: User = serde_json::from_value(user(None)).unwrap();
        assert_eq!(author_name(&u), "Ada Lovelace");
    }

    #[test]
    fn attachment_from_command_message() {
        let msg = parse_message(message(
            10,
            json!({ "document": document("F-own"), "caption": "/suggest_pdf Notes" }),
        ));
        assert_eq!(
            attachment_of(&msg),
            Some(Attachment {
                reference: "F-own".to_string(),
                file_name: Some("notes.pdf".to_string()),
            })
        );
    }

    #[test]
    fn attachment_from_replied_message() {
        let original = message(9, json!({ "document": document("F-reply") }));
        let msg = parse_message(message(
            10,
            json!({ "text": "/suggest_pdf Notes", "reply_to_message": original }),
        ));
        assert_eq!(
            attachment_of(&msg).map(|a| a.reference),
            Some("F-reply".to_string())
        );
    }

    #[test]
    fn no_attachment_without_document() {
        let original = message(9, json!({ "text": "just text" }));
        let msg = parse_message(message(
            10,
            json!({ "text": "/suggest_pdf Notes", "reply_to_message": original }),
        ));
        assert_eq!(attachment_of(&msg), None);
    }

    #[test]
    fn commands_for_other_bots_are_ignored() {
        assert!(addressed_to_other_bot("/ping@other_bot", Some("study_bot")));
        assert!(!addressed_to_other_bot("/ping@Study_Bot", Some("study_bot")));
        assert!(!addressed_to_other_bot("/ping", Some("study_bot")));
        assert!(!addressed_to_other_bot("/ping@other_bot", None));
        assert!(!addressed_to_other_bot("hello@there", Some("study_bot")));
    }
}
