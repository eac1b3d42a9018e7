// youtube.rs - YouTube Transcript Command Module
// This module implements the yt_tldr and ideas commands, which work from a
// video's transcript.
//
// Key Features:
// - yt_tldr: bullet-point summary; long transcripts are summarised per chunk
//   with a progress message before each chunk
// - ideas: three key ideas from the whole transcript in one call
//
// Used by: main.rs (command registration)

use super::{bot_services, typing, ChannelReply, CommandTrace};
use serenity::{
    client::Context,
    framework::standard::{macros::command, Args, CommandResult},
    model::channel::Message,
};

#[command]
#[aliases("tldr", "yt")]
/// Supports:
///   - /yt_tldr <youtube-url>
pub async fn yt_tldr(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let trace = CommandTrace::start("yt_tldr", msg);
    let bot = bot_services(ctx).await?;
    let sink = ChannelReply::new(ctx, msg);
    let _typing = typing(ctx, msg);

    let url = args.single::<String>().unwrap_or_default();
    if let Err(err) = bot.yt_tldr(&sink, &url).await {
        bot.report_failure(&sink, "yt_tldr", err).await;
    }

    trace.finish();
    Ok(())
}

#[command]
/// Supports:
///   - /ideas <youtube-url>
pub async fn ideas(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let trace = CommandTrace::start("ideas", msg);
    let bot = bot_services(ctx).await?;
    let sink = ChannelReply::new(ctx, msg);
    let _typing = typing(ctx, msg);

    let url = args.single::<String>().unwrap_or_default();
    if let Err(err) = bot.ideas(&sink, &url).await {
        bot.report_failure(&sink, "ideas", err).await;
    }

    trace.finish();
    Ok(())
}
