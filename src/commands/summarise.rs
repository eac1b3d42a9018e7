// summarise.rs - Channel Summary Command Module
// This module implements the summarise command, which reads the most recent
// messages in the channel (before the command itself) and asks the LLM for a
// short summary of them.
//
// Used by: main.rs (command registration)

use super::{bot_services, typing, ChannelReply, CommandTrace};
use crate::error::BotError;
use log::debug;
use serenity::{
    client::Context,
    framework::standard::{macros::command, CommandResult},
    model::channel::Message,
};

#[command]
#[aliases("summarize")]
/// Supports:
///   - /summarise
pub async fn summarise(ctx: &Context, msg: &Message) -> CommandResult {
    let trace = CommandTrace::start("summarise", msg);
    let bot = bot_services(ctx).await?;
    let sink = ChannelReply::new(ctx, msg);
    let _typing = typing(ctx, msg);

    let limit = bot.history_limit();
    let fetched = msg
        .channel_id
        .messages(&ctx.http, |retriever| retriever.before(msg.id).limit(limit))
        .await;

    let result = match fetched {
        Ok(messages) => {
            debug!("📜 Read {} messages from channel {}", messages.len(), msg.channel_id);
            let history = chronological(messages.into_iter().map(|m| m.content).collect());
            bot.summarise(&sink, &history).await
        }
        Err(e) => Err(BotError::from(e)),
    };
    if let Err(err) = result {
        bot.report_failure(&sink, "summarise", err).await;
    }

    trace.finish();
    Ok(())
}

// Discord returns newest first; the prompt reads better oldest first.
// Messages with no text (attachments, embeds) are dropped.
fn chronological(newest_first: Vec<String>) -> Vec<String> {
    newest_first
        .into_iter()
        .rev()
        .filter(|content| !content.trim().is_empty())
        .collect()
}
