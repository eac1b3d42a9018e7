// ask.rs - Ask Command Module
// This module implements the ask command: the message text goes to the LLM
// with the assistant persona and the answer is posted back, split to fit
// Discord's message limit.
//
// Used by: main.rs (command registration)

use super::{bot_services, typing, ChannelReply, CommandTrace};
use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::channel::Message,
};

#[command]
#[aliases("llm", "chat")]
/// Main ask command handler
/// Supports:
///   - /ask <message text>
pub async fn ask(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let trace = CommandTrace::start("ask", msg);
    let bot = bot_services(ctx).await?;
    let sink = ChannelReply::new(ctx, msg);

    // Start typing indicator
    let _typing = typing(ctx, msg);

    if let Err(err) = bot.ask(&sink, args.rest()).await {
        bot.report_failure(&sink, "ask", err).await;
    }

    trace.finish();
    Ok(())
}
