mod bot;
mod chunking;
mod commands;
mod config;
mod error;
mod llm;
mod prompts;
mod split;
mod transcript;

#[cfg(test)]
mod testing;

use serenity::{
    async_trait,
    client::{Client, Context, EventHandler},
    framework::standard::{
        macros::{group, hook},
        CommandResult, StandardFramework,
    },
    model::{channel::Message, gateway::Ready},
    prelude::GatewayIntents,
};
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use std::sync::Arc;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::mpsc;

use crate::bot::{Bot, BotSettings};
use crate::chunking::TiktokenTokenizer;
use crate::commands::BotKey;
use crate::config::BotConfig;
use crate::error::BotResult;
use crate::llm::LmClient;
use crate::transcript::YoutubeTranscriptClient;

// Import all command constants generated by the #[command] macro
use crate::commands::ask::ASK_COMMAND;
use crate::commands::hello::HELLO_COMMAND;
use crate::commands::help::HELP_COMMAND;
use crate::commands::summarise::SUMMARISE_COMMAND;
use crate::commands::youtube::{IDEAS_COMMAND, YT_TLDR_COMMAND};

/// Encoding used for token budgeting, independent of the serving model.
const TOKENIZER_MODEL: &str = "gpt-3.5-turbo";

// Command group declaration - includes all available commands
#[group]
#[commands(hello, help, ask, summarise, yt_tldr, ideas)]
struct General;

// Event handler implementation
struct Handler;

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, _: Context, ready: Ready) {
        info!("✅ {} has connected to Discord! ({} guilds)", ready.user.name, ready.guilds.len());
    }
}

#[hook]
async fn after(_ctx: &Context, msg: &Message, command_name: &str, result: CommandResult) {
    if let Err(e) = result {
        error!(
            "❌ Command '{}' failed for user {} ({}): {:?}",
            command_name, msg.author.name, msg.author.id, e
        );
    }
}

#[hook]
async fn unrecognised_command(_ctx: &Context, msg: &Message, command_name: &str) {
    debug!("❓ Unrecognised command '{}' from user {} ({})", command_name, msg.author.name, msg.author.id);
}

/// Construct the services every command shares.
fn build_bot(config: &BotConfig) -> BotResult<Bot> {
    let llm = LmClient::new(config.llm.clone())?;
    info!("🧠 LLM backend: {} at {}", llm.model(), config.llm.base_url);
    let transcripts = YoutubeTranscriptClient::new(config.transcript_language.clone())?;
    let tokenizer = TiktokenTokenizer::for_model(TOKENIZER_MODEL)?;

    Ok(Bot::new(
        Arc::new(llm),
        Arc::new(transcripts),
        Arc::new(tokenizer),
        BotSettings::from(config),
    ))
}

// Operator console on stdin for status checks and graceful shutdown
async fn handle_command_line(shutdown_tx: mpsc::Sender<String>, started_at: DateTime<Utc>) {
    use tokio::io::AsyncWriteExt;

    let mut reader = BufReader::new(io::stdin()).lines();
    let mut stdout = io::stdout();

    loop {
        if stdout.write_all(b"> ").await.is_err() || stdout.flush().await.is_err() {
            error!("❌ Failed to write console prompt");
            break;
        }

        match reader.next_line().await {
            Ok(Some(line)) => {
                let command = line.trim().to_lowercase();
                match command.as_str() {
                    "quit" | "q" | "exit" => {
                        println!("⏹️  Shutting down bot...");
                        if shutdown_tx.send(command).await.is_err() {
                            error!("❌ Failed to send shutdown signal");
                        }
                        break;
                    }
                    "help" | "h" => {
                        println!("🤖 Available commands:");
                        println!("  quit, q, exit  - Stop the bot gracefully");
                        println!("  help, h        - Show this help message");
                        println!("  status         - Show bot status");
                    }
                    "status" => {
                        let uptime = Utc::now().signed_duration_since(started_at);
                        println!("🤖 Bot Status: Running");
                        println!(
                            "⏱️ Uptime: {}h {}m {}s",
                            uptime.num_hours(),
                            uptime.num_minutes() % 60,
                            uptime.num_seconds() % 60
                        );
                    }
                    "" => {}
                    _ => {
                        println!("❓ Unknown command: '{}'. Type 'help' for available commands.", command);
                    }
                }
            }
            // EOF: stdin closed, keep the bot running without a console
            Ok(None) => break,
            Err(e) => {
                error!("❌ Error reading command line: {}", e);
                break;
            }
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize logger - must be done before any logging calls
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let started_at = Utc::now();

    let config = match BotConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("❌ {}", e);
            eprintln!("Set DISCORD_BOT_TOKEN in the environment or in botconfig.txt (KEY=VALUE per line).");
            std::process::exit(1);
        }
    };

    let bot = match build_bot(&config) {
        Ok(bot) => Arc::new(bot),
        Err(e) => {
            error!("❌ Failed to initialise services: {}", e);
            std::process::exit(1);
        }
    };

    info!("🤖 Starting bot with prefix: '{}'", config.prefix);
    let framework = StandardFramework::new()
        .configure(|c| c.prefix(&config.prefix).case_insensitivity(true).with_whitespace(true))
        .after(after)
        .unrecognised_command(unrecognised_command)
        .group(&GENERAL_GROUP);

    let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

    let mut client = match Client::builder(&config.discord_token, intents)
        .event_handler(Handler)
        .framework(framework)
        .await
    {
        Ok(client) => client,
        Err(e) => {
            error!("❌ Error creating Discord client: {:?}", e);
            std::process::exit(1);
        }
    };

    {
        let mut data = client.data.write().await;
        data.insert::<BotKey>(bot);
    }

    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<String>(1);
    let cmd_task = tokio::spawn(handle_command_line(shutdown_tx, started_at));

    info!("🚀 Bot is running... Use 'quit' or press Ctrl+C to stop");
    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("⏹️ Received Ctrl+C, stopping bot gracefully...");
        }
        Some(signal) = shutdown_rx.recv() => {
            info!("📡 Received '{}' command, stopping bot gracefully...", signal);
        }
        result = client.start() => {
            if let Err(why) = result {
                error!("❌ Client error: {:?}", why);
            }
        }
    }

    client.shard_manager.lock().await.shutdown_all().await;
    cmd_task.abort();
    info!("✅ Bot stopped");
}
