//! Demo handler chain. Registration order matters: commands and callbacks first, the echo
//! catch-all last.

use anyhow::Result;
use courier_core::{
    AnswerCallbackQuery, EditMessageText, InlineKeyboardButton, InlineKeyboardMarkup, SendMessage,
};
use handler_chain::{
    CallbackHandler, CallbackMatcher, CommandHandler, HandlerChain, TextHandler, TextMatcher,
};
use std::sync::Arc;
use tracing::info;

pub const ITEM_PREFIX: &str = "item:";

const HELP_TEXT: &str = "Commands:\n/start - show the item picker\n/help - this message\n\
ping - liveness check\nAnything else is echoed back.";

pub fn item_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::single_row(
        ["1", "2", "3"]
            .into_iter()
            .map(|id| InlineKeyboardButton::callback(format!("Item {}", id), format!("{}{}", ITEM_PREFIX, id))),
    )
}

/// Builds the demo chain: `/start`, `/help`, `item:` callbacks, `^ping\b`, then echo.
pub fn demo_chain() -> Result<HandlerChain> {
    let chain = HandlerChain::new()
        .add_handler(Arc::new(CommandHandler::new("/start", |ctx| async move {
            let Some(chat_id) = ctx.chat_id() else {
                return Ok(());
            };
            let greeting = match ctx.args_text.as_str() {
                "" => "Welcome! Pick an item:".to_string(),
                payload => format!("Welcome ({})! Pick an item:", payload),
            };
            ctx.bot
                .send(&SendMessage::new(chat_id, greeting).reply_markup(item_keyboard()))
                .await?;
            Ok(())
        })))
        .add_handler(Arc::new(CommandHandler::new("/help", |ctx| async move {
            if let Some(chat_id) = ctx.chat_id() {
                ctx.bot.send(&SendMessage::new(chat_id, HELP_TEXT)).await?;
            }
            Ok(())
        })))
        .add_handler(Arc::new(CallbackHandler::new(
            CallbackMatcher::prefix(ITEM_PREFIX),
            |ctx| async move {
                info!(query_id = %ctx.query.id, item = %ctx.payload, "Item picked");
                ctx.bot
                    .send(&AnswerCallbackQuery::new(ctx.query.id.clone()).text(format!("Item {}", ctx.payload)))
                    .await?;
                if let Some(message) = ctx.query.message.as_ref() {
                    ctx.bot
                        .send(&EditMessageText::new(
                            message.chat.id,
                            message.message_id,
                            format!("You picked item {}", ctx.payload),
                        ))
                        .await?;
                }
                Ok(())
            },
        )))
        .add_handler(Arc::new(TextHandler::new(TextMatcher::regex(r"^ping\b")?, |ctx| async move {
            if let Some(chat_id) = ctx.chat_id() {
                ctx.bot.send(&SendMessage::new(chat_id, "pong")).await?;
            }
            Ok(())
        })))
        .add_handler(Arc::new(TextHandler::new(TextMatcher::any(), |ctx| async move {
            let Some(chat_id) = ctx.chat_id() else {
                return Ok(());
            };
            let mut reply = SendMessage::new(chat_id, ctx.text.clone());
            if let Some(message) = ctx.update.message() {
                reply = reply.reply_to(message.message_id);
            }
            ctx.bot.send(&reply).await?;
            Ok(())
        })));
    Ok(chain)
}
