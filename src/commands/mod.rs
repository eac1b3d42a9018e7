// commands/mod.rs - Command Module Registry
// Declares the command modules and the glue they share: the TypeMap key that
// carries the Bot services, the Discord-backed ReplySink and per-command
// logging.

pub mod ask;            // Free-form question to the LLM
pub mod hello;          // Static greeting
pub mod help;           // Command overview
pub mod summarise;      // Summary of recent channel messages
pub mod youtube;        // yt_tldr and ideas over video transcripts

use crate::bot::{Bot, ReplySink};
use crate::error::BotResult;
use async_trait::async_trait;
use log::{info, warn};
use serenity::{
    client::Context,
    framework::standard::CommandError,
    http::{Http, Typing},
    model::{channel::Message, id::ChannelId},
    prelude::TypeMapKey,
};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// TypeMap key for the shared Bot services
pub struct BotKey;
impl TypeMapKey for BotKey {
    type Value = Arc<Bot>;
}

pub async fn bot_services(ctx: &Context) -> Result<Arc<Bot>, CommandError> {
    let data = ctx.data.read().await;
    data.get::<BotKey>()
        .cloned()
        .ok_or_else(|| "bot services are not initialised".into())
}

/// Replies into the channel a command came from.
pub struct ChannelReply {
    http: Arc<Http>,
    channel_id: ChannelId,
}

impl ChannelReply {
    pub fn new(ctx: &Context, msg: &Message) -> Self {
        Self { http: ctx.http.clone(), channel_id: msg.channel_id }
    }
}

#[async_trait]
impl ReplySink for ChannelReply {
    async fn say(&self, text: &str) -> BotResult<()> {
        self.channel_id.say(&self.http, text).await?;
        Ok(())
    }
}

/// Show the typing indicator while a command runs. If it cannot be started
/// the command carries on without it.
pub fn typing(ctx: &Context, msg: &Message) -> Option<Typing> {
    indicator_or_log(ctx.http.start_typing(msg.channel_id.0), msg.channel_id)
}

fn indicator_or_log<T>(result: serenity::Result<T>, channel_id: ChannelId) -> Option<T> {
    match result {
        Ok(indicator) => Some(indicator),
        Err(e) => {
            warn!("⚠️ Could not start typing in channel {}: {}", channel_id, e);
            None
        }
    }
}

/// Start/finish log lines for one command invocation.
pub struct CommandTrace {
    name: &'static str,
    id: Uuid,
    started: Instant,
}

impl CommandTrace {
    pub fn start(name: &'static str, msg: &Message) -> Self {
        let id = Uuid::new_v4();
        info!(
            "📨 {} [{}] by {} ({}) in channel {}",
            name, id, msg.author.name, msg.author.id, msg.channel_id
        );
        Self { name, id, started: Instant::now() }
    }

    pub fn finish(self) {
        info!(
            "⏱️ {} [{}] completed in {:.2}s",
            self.name,
            self.id,
            self.started.elapsed().as_secs_f64()
        );
    }
}
