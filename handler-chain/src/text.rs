//! Text family: any text, exact text, or regular expression.

use std::future::Future;

use async_trait::async_trait;
use courier_core::{Bot, Handler, Update};
use regex::Regex;

use crate::{boxed_action, Action};

/// The three mutually exclusive text modes.
#[derive(Debug, Clone)]
pub enum TextMatcher {
    /// Any message that has text.
    Any,
    Exact(String),
    Regex(Regex),
}

impl TextMatcher {
    pub fn any() -> Self {
        TextMatcher::Any
    }

    pub fn exact(text: impl Into<String>) -> Self {
        TextMatcher::Exact(text.into())
    }

    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Ok(TextMatcher::Regex(Regex::new(pattern)?))
    }

    pub fn matches(&self, text: &str) -> bool {
        match self {
            TextMatcher::Any => true,
            TextMatcher::Exact(expected) => text == expected,
            TextMatcher::Regex(re) => re.is_match(text),
        }
    }

    /// Capture groups of the first match (index 0 is the whole match; unmatched groups are empty).
    /// Always empty outside regex mode.
    pub fn captures(&self, text: &str) -> Vec<String> {
        let TextMatcher::Regex(re) = self else {
            return Vec::new();
        };
        re.captures(text)
            .map(|caps| {
                caps.iter()
                    .map(|m| m.map(|m| m.as_str().to_string()).unwrap_or_default())
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// What a text action receives.
#[derive(Clone)]
pub struct TextContext {
    pub update: Update,
    pub bot: Bot,
    pub text: String,
    pub captures: Vec<String>,
}

impl TextContext {
    pub fn chat_id(&self) -> Option<i64> {
        self.update.chat_id()
    }
}

/// Handles a `message` whose text satisfies the matcher.
pub struct TextHandler {
    matcher: TextMatcher,
    name: String,
    action: Action<TextContext>,
}

impl TextHandler {
    pub fn new<F, Fut>(matcher: TextMatcher, action: F) -> Self
    where
        F: Fn(TextContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let name = match &matcher {
            TextMatcher::Any => "text *".to_string(),
            TextMatcher::Exact(t) => format!("text {:?}", t),
            TextMatcher::Regex(re) => format!("text /{}/", re.as_str()),
        };
        Self {
            matcher,
            name,
            action: boxed_action(action),
        }
    }
}

#[async_trait]
impl Handler for TextHandler {
    fn supports(&self, update: &Update) -> bool {
        update.text().is_some_and(|text| self.matcher.matches(text))
    }

    async fn handle(&self, update: &Update, bot: &Bot) -> anyhow::Result<()> {
        let text = update.text().unwrap_or_default().to_string();
        let ctx = TextContext {
            captures: self.matcher.captures(&text),
            text,
            update: update.clone(),
            bot: bot.clone(),
        };
        (self.action)(ctx).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
