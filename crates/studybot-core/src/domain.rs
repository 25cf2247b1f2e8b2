/// Platform user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

/// Platform chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChatId(pub i64);

/// Platform message id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageId(pub i32);

/// A stable reference to a sent message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// A file that accompanied a command message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attachment {
    /// Platform reference to the file (Telegram `file_id`, a URL, ...).
    pub reference: String,
    pub file_name: Option<String>,
}

/// Who sent a command, and what the platform knows about their role.
#[derive(Clone, Debug)]
pub struct Invoker {
    pub user_id: UserId,
    pub name: String,
    /// `None` when the role was not looked up (enforcement disabled).
    pub is_admin: Option<bool>,
}

/// A member that just joined a chat.
#[derive(Clone, Debug)]
pub struct NewMember {
    pub user_id: UserId,
    pub display_name: String,
    pub is_bot: bool,
}
