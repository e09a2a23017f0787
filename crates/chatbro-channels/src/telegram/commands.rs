//! Bot commands

/// Commands understood by the bot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotCommand {
    /// Forget the conversation
    Reset,
}

impl BotCommand {
    /// Parse a command from message text.
    ///
    /// Matching is case-insensitive and ignores a `@botname` suffix, so
    /// `/reset`, `/RESET` and `/reset@chatbro_bot` are all the same command.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let first = text.trim_start().split_whitespace().next()?;
        let name = first.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);

        if name.eq_ignore_ascii_case("reset") {
            Some(Self::Reset)
        } else {
            None
        }
    }

    /// Description shown in the Telegram command menu
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Reset => "Clear AI chat history",
        }
    }
}
