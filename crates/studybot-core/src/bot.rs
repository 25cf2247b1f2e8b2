//! Command execution against explicitly owned bot state.
//!
//! Nothing in here talks to the network: `execute` turns a parsed command
//! into a reply (Telegram HTML) plus an optional audit record, and the
//! adapter decides how to deliver both.

use crate::{
    audit::AuditEvent,
    commands::{Command, UsageError},
    directory::LinkDirectory,
    domain::{Attachment, Invoker, NewMember},
    formatting::{escape_html, mention_html},
    registry::{PendingListing, RegistryError, SuggestionKind, SuggestionRegistry},
};

/// All mutable state of the bot.
#[derive(Clone, Debug)]
pub struct BotState {
    pub registry: SuggestionRegistry,
    pub directory: LinkDirectory,
}

impl Default for BotState {
    fn default() -> Self {
        Self {
            registry: SuggestionRegistry::new(),
            directory: LinkDirectory::with_defaults(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ApprovalPolicy {
    /// When false, approval commands are open to everyone.
    pub enforce_admin: bool,
}

impl ApprovalPolicy {
    pub fn permits(&self, command: &Command, invoker: &Invoker) -> bool {
        !self.enforce_admin || !command.requires_admin() || invoker.is_admin == Some(true)
    }
}

#[derive(Clone, Debug)]
pub struct Outcome {
    pub reply: String,
    pub audit: Option<AuditEvent>,
}

impl Outcome {
    fn reply(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            audit: None,
        }
    }
}

pub const NOT_ADMIN_REPLY: &str = "❌ Only chat administrators can approve suggestions.";

pub fn execute(
    state: &mut BotState,
    policy: ApprovalPolicy,
    command: Command,
    invoker: &Invoker,
    attachment: Option<&Attachment>,
) -> Outcome {
    if !policy.permits(&command, invoker) {
        return Outcome::reply(NOT_ADMIN_REPLY);
    }

    match command {
        Command::Help => Outcome::reply(help_text()),
        Command::Links => Outcome::reply(render_links(&state.directory)),
        Command::Ping => Outcome::reply("🏓 Pong!"),

        Command::SuggestLink { url, description } => {
            let id = state
                .registry
                .submit_link(url.clone(), description.clone(), invoker.name.clone());
            Outcome {
                reply: format!(
                    "✅ Link suggestion received: {} - {}",
                    escape_html(&description),
                    escape_html(&url)
                ),
                audit: Some(AuditEvent::suggested(
                    invoker.user_id.0,
                    &invoker.name,
                    SuggestionKind::Link,
                    &description,
                    &url,
                    id.0,
                )),
            }
        }

        Command::SuggestPdf { description } => {
            let reference = attachment.map(|a| a.reference.clone());
            match state.registry.submit_pdf(
                description.clone(),
                invoker.name.clone(),
                reference.clone(),
            ) {
                Ok(id) => Outcome {
                    reply: format!(
                        "✅ PDF suggestion received: {}",
                        escape_html(&description)
                    ),
                    audit: Some(AuditEvent::suggested(
                        invoker.user_id.0,
                        &invoker.name,
                        SuggestionKind::Pdf,
                        &description,
                        reference.as_deref().unwrap_or_default(),
                        id.0,
                    )),
                },
                Err(e) => Outcome::reply(render_registry_error(&e)),
            }
        }

        Command::ListSuggestions => match state.registry.list() {
            Ok(listing) => Outcome::reply(render_pending(&listing)),
            Err(e) => Outcome::reply(render_registry_error(&e)),
        },

        Command::ApproveLink { index } => {
            match state.registry.approve_link(index, &mut state.directory) {
                Ok(link) => Outcome {
                    reply: format!(
                        "✅ Link '{}' has been approved and added.",
                        escape_html(&link.description)
                    ),
                    audit: Some(AuditEvent::approved(
                        invoker.user_id.0,
                        &invoker.name,
                        SuggestionKind::Link,
                        &link.description,
                        &link.url,
                    )),
                },
                Err(e) => Outcome::reply(render_registry_error(&e)),
            }
        }

        Command::ApprovePdf { index } => match state.registry.approve_pdf(index) {
            Ok(pdf) => Outcome {
                reply: format!(
                    "✅ PDF '{}' has been approved and added.",
                    escape_html(&pdf.description)
                ),
                audit: Some(AuditEvent::approved(
                    invoker.user_id.0,
                    &invoker.name,
                    SuggestionKind::Pdf,
                    &pdf.description,
                    &pdf.file_reference,
                )),
            },
            Err(e) => Outcome::reply(render_registry_error(&e)),
        },
    }
}

pub fn help_text() -> String {
    "🛠️ <b>Available Commands:</b>\n\
<code>/commands</code> - Shows this help message.\n\
<code>/links</code> - Sends useful Python-related links.\n\
<code>/ping</code> - Responds with 'Pong!' to test the bot.\n\
<code>/suggest_link &lt;URL&gt; &lt;Description&gt;</code> - Suggest a link to be added to the material.\n\
<code>/suggest_pdf &lt;Description&gt;</code> - Suggest a PDF to be added to the material (attach the file).\n\
<code>/list_suggestions</code> - List all pending suggestions.\n\
<code>/approve_link &lt;index&gt;</code> - Approve a link suggestion (Admin only).\n\
<code>/approve_pdf &lt;index&gt;</code> - Approve a PDF suggestion (Admin only)."
        .to_string()
}

pub fn render_links(directory: &LinkDirectory) -> String {
    let mut out = String::from("📌 <b>Useful Python Links:</b>");
    for entry in directory.iter() {
        out.push_str(&format!(
            "\n🔗 <b>{}</b>: {}",
            escape_html(&entry.description),
            escape_html(&entry.url)
        ));
    }
    out
}

pub fn render_pending(listing: &PendingListing<'_>) -> String {
    let mut lines = vec!["📋 <b>Pending Suggestions:</b>".to_string()];

    if !listing.links.is_empty() {
        lines.push("\n<b>Links:</b>".to_string());
        for (n, p) in listing.links.iter().enumerate() {
            lines.push(pending_line(n + 1, &p.item.description, &p.item.author));
        }
    }

    if !listing.pdfs.is_empty() {
        lines.push("\n<b>PDFs:</b>".to_string());
        for (n, p) in listing.pdfs.iter().enumerate() {
            lines.push(pending_line(n + 1, &p.item.description, &p.item.author));
        }
    }

    lines.join("\n")
}

fn pending_line(position: usize, description: &str, author: &str) -> String {
    format!(
        "{position}. {} - Suggested by {}",
        escape_html(description),
        escape_html(author)
    )
}

pub fn render_registry_error(err: &RegistryError) -> String {
    match err {
        RegistryError::MissingAttachment => {
            "❌ Please attach a PDF file with your suggestion.".to_string()
        }
        RegistryError::NoPendingSuggestions => "❌ No pending suggestions.".to_string(),
        RegistryError::UnknownSuggestion { kind, .. } => {
            format!("❌ That {kind} suggestion was already handled.")
        }
        RegistryError::IndexOutOfRange { kind, .. } => {
            format!("❌ Invalid {kind} suggestion index.")
        }
    }
}

pub fn render_usage_error(err: &UsageError) -> String {
    match err {
        UsageError::MissingArgument { usage, .. } => {
            format!("❌ Missing argument. Usage: <code>{}</code>", escape_html(usage))
        }
        UsageError::InvalidIndex { usage, raw, .. } => format!(
            "❌ '{}' is not a number. Usage: <code>{}</code>",
            escape_html(raw),
            escape_html(usage)
        ),
        UsageError::UnknownCommand(name) => {
            format!("Unknown command: /{}", escape_html(name))
        }
    }
}

pub fn render_welcome(member: &NewMember, directory: &LinkDirectory) -> String {
    let mut out = format!(
        "👋 Hello, {}! Welcome to the server!\n\n\
Here are some useful Python links to get you started:",
        mention_html(member.user_id, &member.display_name)
    );
    for entry in directory.iter() {
        out.push_str(&format!(
            "\n🔗 {}: {}",
            escape_html(&entry.description),
            escape_html(&entry.url)
        ));
    }
    out
}
