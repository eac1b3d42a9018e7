// help.rs - Help Command Module
// Lists the available commands using the configured prefix.

use super::{bot_services, ChannelReply};
use serenity::{
    client::Context,
    framework::standard::{macros::command, CommandResult},
    model::channel::Message,
};

#[command]
#[aliases("h", "commands")]
/// Display help information for all available commands
pub async fn help(ctx: &Context, msg: &Message) -> CommandResult {
    let bot = bot_services(ctx).await?;
    let sink = ChannelReply::new(ctx, msg);

    if let Err(err) = bot.reply(&sink, &help_text(bot.prefix())).await {
        bot.report_failure(&sink, "help", err).await;
    }
    Ok(())
}

fn help_text(prefix: &str) -> String {
    format!(
        "**🦙 Llama Bot - Commands**\n\n\
        • `{0}hello` - Say hello\n\
        • `{0}ask <message>` - Ask the language model a question\n\
        • `{0}summarise` - Summarise the last few messages in this channel\n\
        • `{0}yt_tldr <youtube-url>` - Bullet-point summary of a video (long videos arrive chunk by chunk)\n\
        • `{0}ideas <youtube-url>` - Extract 3 key ideas from a video\n\
        • `{0}help` - Show this message\n\n\
        **Example:** `{0}yt_tldr https://www.youtube.com/watch?v=dQw4w9WgXcQ`",
        prefix
    )
}
