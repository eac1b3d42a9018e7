// hello.rs - Hello Command Module
// Replies with a fixed greeting; useful as a connectivity check.

use super::{bot_services, ChannelReply};
use serenity::{
    client::Context,
    framework::standard::{macros::command, CommandResult},
    model::channel::Message,
};

#[command]
/// Supports:
///   - /hello
pub async fn hello(ctx: &Context, msg: &Message) -> CommandResult {
    let bot = bot_services(ctx).await?;
    let sink = ChannelReply::new(ctx, msg);

    if let Err(err) = bot.hello(&sink).await {
        bot.report_failure(&sink, "hello", err).await;
    }
    Ok(())
}
