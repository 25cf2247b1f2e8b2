//! Glue between inbound events, the bot state, and the messaging port.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    audit::AuditLogger,
    bot::{execute, render_usage_error, render_welcome, ApprovalPolicy, BotState},
    commands::{Command, UsageError},
    config::Config,
    domain::{Attachment, ChatId, Invoker, NewMember},
    formatting::split_lines,
    messaging::port::MessagingPort,
};

pub struct BotService {
    state: Mutex<BotState>,
    policy: ApprovalPolicy,
    messenger: Arc<dyn MessagingPort>,
    audit: Option<AuditLogger>,
    safe_limit: usize,
    welcome_chat: Option<ChatId>,
}

impl BotService {
    pub fn new(cfg: &Config, messenger: Arc<dyn MessagingPort>) -> Self {
        Self::with_state(cfg, messenger, BotState::default())
    }

    pub fn with_state(cfg: &Config, messenger: Arc<dyn MessagingPort>, state: BotState) -> Self {
        let safe_limit = cfg
            .telegram_safe_limit
            .min(messenger.capabilities().max_message_len);
        Self {
            state: Mutex::new(state),
            policy: ApprovalPolicy {
                enforce_admin: cfg.enforce_admin_approvals,
            },
            messenger,
            audit: cfg
                .audit_log_path
                .clone()
                .map(|p| AuditLogger::new(p, cfg.audit_log_json)),
            safe_limit,
            welcome_chat: cfg.welcome_chat_id.map(ChatId),
        }
    }

    /// Whether the adapter must look up the invoker's role before `handle_command`.
    pub fn needs_admin_check(&self, command: &Command) -> bool {
        self.policy.enforce_admin && command.requires_admin()
    }

    pub async fn handle_command(
        &self,
        chat_id: ChatId,
        parsed: std::result::Result<Command, UsageError>,
        invoker: &Invoker,
        attachment: Option<&Attachment>,
    ) {
        let command = match parsed {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(user = %invoker.name, error = %e, "rejected command");
                self.deliver(chat_id, &render_usage_error(&e)).await;
                return;
            }
        };

        let name = command.name();
        let outcome = {
            let mut state = self.state.lock().await;
            execute(&mut state, self.policy, command, invoker, attachment)
        };

        if let Some(event) = outcome.audit {
            tracing::info!(
                command = name,
                user = %invoker.name,
                kind = %event.kind,
                description = %event.description,
                "{}",
                event.event
            );
            if let Some(audit) = &self.audit {
                if let Err(e) = audit.write(event) {
                    tracing::warn!(path = %audit.path().display(), error = %e, "audit write failed");
                }
            }
        }

        self.deliver(chat_id, &outcome.reply).await;
    }

    /// Greet a member who just joined `joined_chat`.
    pub async fn greet(&self, joined_chat: ChatId, member: &NewMember) {
        if member.is_bot {
            return;
        }
        let text = {
            let state = self.state.lock().await;
            render_welcome(member, &state.directory)
        };
        let target = self.welcome_chat.unwrap_or(joined_chat);
        tracing::info!(user_id = member.user_id.0, chat_id = target.0, "greeting new member");
        self.deliver(target, &text).await;
    }

    /// Read-only access to the state (diagnostics and tests).
    pub async fn inspect<R>(&self, f: impl FnOnce(&BotState) -> R) -> R {
        let state = self.state.lock().await;
        f(&state)
    }

    /// Send a reply, split to the platform limit. Failures are logged, not retried.
    async fn deliver(&self, chat_id: ChatId, html: &str) {
        for chunk in split_lines(html, self.safe_limit) {
            if let Err(e) = self.messenger.send_html(chat_id, &chunk).await {
                tracing::warn!(chat_id = chat_id.0, error = %e, "failed to send reply");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::TOKEN_VAR, domain::UserId, messaging::port::testing::RecordingMessenger};

    fn config(pairs: &[(&str, &str)]) -> Config {
        let mut all: Vec<(String, String)> = vec![(TOKEN_VAR.to_string(), "t".to_string())];
        all.extend(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        Config::from_lookup(move |k| {
            all.iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.clone())
        })
        .unwrap()
    }

    fn alice() -> Invoker {
        Invoker {
            user_id: UserId(7),
            name: "alice".to_string(),
            is_admin: None,
        }
    }

    async fn send(service: &BotService, text: &str, who: &Invoker) {
        let parsed = Command::parse(text).expect("command");
        service.handle_command(ChatId(1), parsed, who, None).await;
    }

    #[tokio::test]
    async fn commands_reply_in_the_invoking_chat() {
        let messenger = Arc::new(RecordingMessenger::default());
        let service = BotService::new(&config(&[]), messenger.clone());

        send(&service, "/ping", &alice()).await;
        send(&service, "/suggest_link https://example.com Example Site", &alice()).await;
        send(&service, "/approve_link 1", &alice()).await;
        send(&service, "/approve_link 1", &alice()).await;

        let sent = messenger.sent.lock().unwrap().clone();
        let replies: Vec<&str> = sent.iter().map(|(_, s)| s.as_str()).collect();
        assert_eq!(
            replies,
            vec![
                "🏓 Pong!",
                "✅ Link suggestion received: Example Site - https://example.com",
                "✅ Link 'Example Site' has been approved and added.",
                "❌ Invalid link suggestion index.",
            ]
        );
        assert!(sent.iter().all(|(chat, _)| *chat == ChatId(1)));

        let url = service
            .inspect(|s| s.directory.get("Example Site").map(str::to_string))
            .await;
        assert_eq!(url.as_deref(), Some("https://example.com"));
    }

    #[tokio::test]
    async fn usage_errors_are_replied_not_propagated() {
        let messenger = Arc::new(RecordingMessenger::default());
        let service = BotService::new(&config(&[]), messenger.clone());

        send(&service, "/approve_pdf first", &alice()).await;
        send(&service, "/whatever", &alice()).await;

        let sent = messenger.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 2);
        assert!(sent[0].1.starts_with("❌ 'first' is not a number."));
        assert_eq!(sent[1].1, "Unknown command: /whatever");
    }

    #[tokio::test]
    async fn long_listings_are_split() {
        let messenger = Arc::new(RecordingMessenger::default());
        let service = BotService::new(&config(&[("TELEGRAM_SAFE_LIMIT", "200")]), messenger.clone());

        for i in 0..40 {
            let text = format!("/suggest_link https://example.com/{i} Resource number {i}");
            send(&service, &text, &alice()).await;
        }
        messenger.sent.lock().unwrap().clear();

        send(&service, "/list_suggestions", &alice()).await;
        let sent = messenger.sent.lock().unwrap().clone();
        assert!(sent.len() > 1);
        assert!(sent.iter().all(|(_, s)| s.len() <= 200));
        let all = sent
            .iter()
            .map(|(_, s)| s.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        assert!(all.contains("40. Resource number 39 - Suggested by alice"));
    }

    #[tokio::test]
    async fn greeting_goes_to_configured_chat_and_skips_bots() {
        let messenger = Arc::new(RecordingMessenger::default());
        let service = BotService::new(&config(&[("WELCOME_CHAT_ID", "-42")]), messenger.clone());

        let human = NewMember {
            user_id: UserId(5),
            display_name: "Sam".to_string(),
            is_bot: false,
        };
        let robot = NewMember {
            is_bot: true,
            ..human.clone()
        };
        service.greet(ChatId(3), &robot).await;
        service.greet(ChatId(3), &human).await;

        let sent = messenger.sent.lock().unwrap().clone();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ChatId(-42));
        assert!(sent[0].1.contains("Welcome to the server!"));
    }

    #[tokio::test]
    async fn greeting_defaults_to_joined_chat() {
        let messenger = Arc::new(RecordingMessenger::default());
        let service = BotService::new(&config(&[]), messenger.clone());
        let member = NewMember {
            user_id: UserId(5),
            display_name: "Sam".to_string(),
            is_bot: false,
        };
        service.greet(ChatId(3), &member).await;
        assert_eq!(messenger.sent.lock().unwrap()[0].0, ChatId(3));
    }

    #[tokio::test]
    async fn admin_check_only_needed_when_enforced() {
        let messenger = Arc::new(RecordingMessenger::default());
        let open = BotService::new(&config(&[]), messenger.clone());
        let strict = BotService::new(
            &config(&[("ENFORCE_ADMIN_APPROVALS", "true")]),
            messenger.clone(),
        );
        let approve = Command::ApprovePdf { index: 1 };
        assert!(!open.needs_admin_check(&approve));
        assert!(strict.needs_admin_check(&approve));
        assert!(!strict.needs_admin_check(&Command::Ping));
    }

    #[tokio::test]
    async fn approvals_are_audited_when_configured() {
        let path = std::env::temp_dir().join(format!(
            "studybot-service-audit-{}-{}.log",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        let path_str = path.to_string_lossy().to_string();
        let messenger = Arc::new(RecordingMessenger::default());
        let service = BotService::new(
            &config(&[("AUDIT_LOG_PATH", path_str.as_str())]),
            messenger.clone(),
        );

        send(&service, "/suggest_link https://example.com Example", &alice()).await;
        send(&service, "/approve_link 1", &alice()).await;
        send(&service, "/ping", &alice()).await;

        let written = std::fs::read_to_string(&path).unwrap();
        let events: Vec<serde_json::Value> = written
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0]["event"], "suggested");
        assert_eq!(events[1]["event"], "approved");
        assert_eq!(events[1]["reference"], "https://example.com");

        let _ = std::fs::remove_file(&path);
    }
}
