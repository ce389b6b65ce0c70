//! Command family: `/cmd`, `/cmd args...`, `/cmd@BotName`.

use std::future::Future;

use async_trait::async_trait;
use courier_core::{Bot, Handler, Update};

use crate::{boxed_action, Action};

/// Matches a command token against message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandMatcher {
    command: String,
}

impl CommandMatcher {
    /// `command` includes the leading slash, e.g. `/start`.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    /// Exact token, token followed by a space (arguments), or token followed by `@` (bot mention in groups).
    pub fn matches(&self, text: &str) -> bool {
        match text.strip_prefix(self.command.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with(' ') || rest.starts_with('@'),
            None => false,
        }
    }

    /// Words after the first space; empty when there are none.
    /// Split on any whitespace (tabs and newlines included); runs of whitespace never yield
    /// empty positional arguments. Use [`arguments_text`](Self::arguments_text) for the raw remainder.
    pub fn arguments(text: &str) -> Vec<String> {
        match text.split_once(' ') {
            Some((_, rest)) => rest.split_whitespace().map(str::to_string).collect(),
            None => Vec::new(),
        }
    }

    /// Everything after the first space, trimmed.
    pub fn arguments_text(text: &str) -> String {
        text.split_once(' ')
            .map(|(_, rest)| rest.trim().to_string())
            .unwrap_or_default()
    }
}

/// What a command action receives.
#[derive(Clone)]
pub struct CommandContext {
    pub update: Update,
    pub bot: Bot,
    pub args: Vec<String>,
    pub args_text: String,
}

impl CommandContext {
    pub fn chat_id(&self) -> Option<i64> {
        self.update.chat_id()
    }
}

/// Handles a `message` whose text is the given command.
pub struct CommandHandler {
    matcher: CommandMatcher,
    name: String,
    action: Action<CommandContext>,
}

impl CommandHandler {
    pub fn new<F, Fut>(command: impl Into<String>, action: F) -> Self
    where
        F: Fn(CommandContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let matcher = CommandMatcher::new(command);
        let name = format!("command {}", matcher.command());
        Self {
            matcher,
            name,
            action: boxed_action(action),
        }
    }
}

#[async_trait]
impl Handler for CommandHandler {
    fn supports(&self, update: &Update) -> bool {
        update.text().is_some_and(|text| self.matcher.matches(text))
    }

    async fn handle(&self, update: &Update, bot: &Bot) -> anyhow::Result<()> {
        let text = update.text().unwrap_or_default();
        let ctx = CommandContext {
            args: CommandMatcher::arguments(text),
            args_text: CommandMatcher::arguments_text(text),
            update: update.clone(),
            bot: bot.clone(),
        };
        (self.action)(ctx).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_exact_args_and_mention() {
        let m = CommandMatcher::new("/start");
        assert!(m.matches("/start"));
        assert!(m.matches("/start foo bar"));
        assert!(m.matches("/start@SomeBot"));
        assert!(!m.matches("/started"));
        assert!(!m.matches("start"));
        assert!(!m.matches(" /start"));
        assert!(!m.matches(""));
    }

    #[test]
    fn test_arguments() {
        assert_eq!(CommandMatcher::arguments("/start foo bar"), vec!["foo", "bar"]);
        assert!(CommandMatcher::arguments("/start").is_empty());
        assert!(CommandMatcher::arguments("/start   ").is_empty());
        assert_eq!(CommandMatcher::arguments("/start@Bot x"), vec!["x"]);
        assert_eq!(CommandMatcher::arguments("/cmd a  b"), vec!["a", "b"]);
        assert_eq!(CommandMatcher::arguments("/cmd a\tb\nc"), vec!["a", "b", "c"]);
        assert_eq!(CommandMatcher::arguments_text("/cmd a  b"), "a  b");
    }

    #[test]
    fn test_arguments_text() {
        assert_eq!(CommandMatcher::arguments_text("/say  hello world "), "hello world");
        assert_eq!(CommandMatcher::arguments_text("/say"), "");
    }
}
