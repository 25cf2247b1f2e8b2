//! Chat command parsing.

/// Prefixes that mark a message as a command.
///
/// `/` is the Telegram convention; `!` is kept for members used to the old bot.
pub const COMMAND_PREFIXES: &[char] = &['/', '!'];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Links,
    Ping,
    SuggestLink { url: String, description: String },
    SuggestPdf { description: String },
    ListSuggestions,
    ApproveLink { index: i64 },
    ApprovePdf { index: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UsageError {
    #[error("missing argument for /{command}")]
    MissingArgument {
        command: &'static str,
        usage: &'static str,
    },

    #[error("/{command} expects a number, got {raw:?}")]
    InvalidIndex {
        command: &'static str,
        usage: &'static str,
        raw: String,
    },

    #[error("unknown command /{0}")]
    UnknownCommand(String),
}

impl Command {
    /// Parse a chat message.
    ///
    /// Returns `None` when the text is not a command at all. Unknown names
    /// behind the legacy `!` prefix are ordinary chatter ("!important ..."),
    /// so only `/` commands report `UnknownCommand`.
    pub fn parse(text: &str) -> Option<std::result::Result<Command, UsageError>> {
        let (name, args) = split_command(text)?;
        match Self::from_parts(&name, &args) {
            Err(UsageError::UnknownCommand(_)) if text.trim_start().starts_with('!') => None,
            parsed => Some(parsed),
        }
    }

    fn from_parts(name: &str, args: &str) -> std::result::Result<Command, UsageError> {
        match name {
            "commands" | "help" | "start" => Ok(Command::Help),
            "links" => Ok(Command::Links),
            "ping" => Ok(Command::Ping),
            "list_suggestions" => Ok(Command::ListSuggestions),

            "suggest_link" => {
                const USAGE: &str = "/suggest_link <URL> <Description>";
                let missing = || UsageError::MissingArgument {
                    command: "suggest_link",
                    usage: USAGE,
                };
                let mut parts = args.splitn(2, char::is_whitespace);
                let url = parts.next().filter(|s| !s.is_empty()).ok_or_else(missing)?;
                let description = parts
                    .next()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(missing)?;
                Ok(Command::SuggestLink {
                    url: url.to_string(),
                    description: description.to_string(),
                })
            }

            "suggest_pdf" => {
                if args.is_empty() {
                    return Err(UsageError::MissingArgument {
                        command: "suggest_pdf",
                        usage: "/suggest_pdf <Description> (with a PDF attached)",
                    });
                }
                Ok(Command::SuggestPdf {
                    description: args.to_string(),
                })
            }

            "approve_link" => {
                let index = parse_index(args, "approve_link", "/approve_link <index>")?;
                Ok(Command::ApproveLink { index })
            }

            "approve_pdf" => {
                let index = parse_index(args, "approve_pdf", "/approve_pdf <index>")?;
                Ok(Command::ApprovePdf { index })
            }

            other => Err(UsageError::UnknownCommand(other.to_string())),
        }
    }

    /// Approval commands are the only ones reserved for chat administrators.
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Command::ApproveLink { .. } | Command::ApprovePdf { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Help => "commands",
            Command::Links => "links",
            Command::Ping => "ping",
            Command::SuggestLink { .. } => "suggest_link",
            Command::SuggestPdf { .. } => "suggest_pdf",
            Command::ListSuggestions => "list_suggestions",
            Command::ApproveLink { .. } => "approve_link",
            Command::ApprovePdf { .. } => "approve_pdf",
        }
    }
}

/// Split `/cmd@botname arg1 ...` into a lowercase command name and the trimmed rest.
pub fn split_command(text: &str) -> Option<(String, String)> {
    let text = text.trim_start();
    let body = text.strip_prefix(COMMAND_PREFIXES)?;

    let mut parts = body.splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("");
    let rest = parts.next().unwrap_or("").trim().to_string();

    let name = first.split('@').next().unwrap_or("").to_lowercase();
    if name.is_empty() {
        return None;
    }
    Some((name, rest))
}

fn parse_index(
    args: &str,
    command: &'static str,
    usage: &'static str,
) -> std::result::Result<i64, UsageError> {
    let Some(raw) = args.split_whitespace().next() else {
        return Err(UsageError::MissingArgument { command, usage });
    };
    raw.parse::<i64>().map_err(|_| UsageError::InvalidIndex {
        command,
        usage,
        raw: raw.to_string(),
    })
}
