use std::sync::Arc;

use teloxide::types::{Message, User};

use studybot_core::domain::{ChatId, NewMember, UserId};

use crate::router::AppState;

pub async fn handle_new_members(
    msg: &Message,
    users: &[User],
    state: Arc<AppState>,
) -> teloxide::prelude::ResponseResult<()> {
    let chat_id = ChatId(msg.chat.id.0);
    for user in users {
        let member = NewMember {
            user_id: UserId(user.id.0 as i64),
            display_name: user.full_name(),
            is_bot: user.is_bot,
        };
        state.service.greet(chat_id, &member).await;
    }
    Ok(())
}
