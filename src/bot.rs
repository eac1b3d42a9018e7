// bot.rs - Command Handlers
// The Bot owns the injected services (LLM backend, transcript source,
// tokenizer) and implements each command as plain orchestration over them.
// Output goes to a ReplySink so the handlers run the same against Discord or a
// test recorder.

use crate::chunking::{chunk_text, Tokenizer};
use crate::config::BotConfig;
use crate::error::{BotError, BotResult};
use crate::llm::ChatBackend;
use crate::prompts;
use crate::split::split_message;
use crate::transcript::{extract_video_id, join_transcript, TranscriptSource};
use async_trait::async_trait;
use log::{debug, error, info, warn};
use std::sync::Arc;

pub const TLDR_STATUS: &str = "Fetching and Summarising the youtube video.....";
pub const IDEAS_STATUS: &str = "Extracting ideas from the youtube video.....";

/// Where a command's replies go, one platform message per call.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn say(&self, text: &str) -> BotResult<()>;
}

#[derive(Debug, Clone)]
pub struct BotSettings {
    pub prefix: String,
    pub chunk_token_budget: usize,
    pub max_message_length: usize,
    pub history_limit: u64,
}

impl From<&BotConfig> for BotSettings {
    fn from(config: &BotConfig) -> Self {
        Self {
            prefix: config.prefix.clone(),
            chunk_token_budget: config.chunk_token_budget,
            max_message_length: config.max_message_length,
            history_limit: config.history_limit,
        }
    }
}

pub struct Bot {
    llm: Arc<dyn ChatBackend>,
    transcripts: Arc<dyn TranscriptSource>,
    tokenizer: Arc<dyn Tokenizer>,
    settings: BotSettings,
}

impl Bot {
    pub fn new(
        llm: Arc<dyn ChatBackend>,
        transcripts: Arc<dyn TranscriptSource>,
        tokenizer: Arc<dyn Tokenizer>,
        settings: BotSettings,
    ) -> Self {
        Self { llm, transcripts, tokenizer, settings }
    }

    pub fn prefix(&self) -> &str {
        &self.settings.prefix
    }

    /// Number of channel messages `summarise` should read.
    pub fn history_limit(&self) -> u64 {
        self.settings.history_limit
    }

    /// Send `text` split into platform-sized pieces, in order.
    pub async fn reply(&self, sink: &dyn ReplySink, text: &str) -> BotResult<()> {
        let pieces = split_message(text, self.settings.max_message_length)?;
        if pieces.len() > 1 {
            debug!("📄 Reply of {} chars split into {} messages", text.chars().count(), pieces.len());
        }
        for piece in pieces {
            sink.say(&piece).await?;
        }
        Ok(())
    }

    /// Log a failed command and tell the user what went wrong.
    pub async fn report_failure(&self, sink: &dyn ReplySink, command: &str, err: BotError) {
        match &err {
            BotError::InvalidUrl(_) | BotError::TranscriptUnavailable(_) | BotError::InvalidArgument(_) => {
                warn!("⚠️ Command '{}' rejected: {}", command, err)
            }
            _ => error!("❌ Command '{}' failed: {}", command, err),
        }
        if let Err(send_err) = self.reply(sink, &err.user_message()).await {
            error!("❌ Could not report failure of '{}' to the channel: {}", command, send_err);
        }
    }

    pub async fn hello(&self, sink: &dyn ReplySink) -> BotResult<()> {
        self.reply(sink, prompts::GREETING).await
    }

    pub async fn ask(&self, sink: &dyn ReplySink, question: &str) -> BotResult<()> {
        let question = question.trim();
        if question.is_empty() {
            let usage = format!("Please provide a question! Usage: `{}ask <message>`", self.prefix());
            return self.reply(sink, &usage).await;
        }

        let answer = self.llm.complete(prompts::ask(question)).await?;
        self.reply(sink, &answer).await
    }

    /// `history` is the recent channel messages, oldest first.
    pub async fn summarise(&self, sink: &dyn ReplySink, history: &[String]) -> BotResult<()> {
        debug!("📝 Summarising {} channel messages", history.len());
        let summary = self.llm.complete(prompts::summarise(history)).await?;
        self.reply(sink, &summary).await
    }

    /// Summarise a video. Long transcripts are summarised chunk by chunk and
    /// every chunk summary is posted as soon as it is ready; there is no final
    /// merge.
    pub async fn yt_tldr(&self, sink: &dyn ReplySink, url: &str) -> BotResult<()> {
        let video_id = extract_video_id(url)?;
        self.reply(sink, TLDR_STATUS).await?;

        let transcript = self.fetch_transcript(&video_id).await?;
        let chunked = chunk_text(self.tokenizer.as_ref(), &transcript, self.settings.chunk_token_budget)?;
        info!(
            "📊 Transcript for {} is {} tokens (budget {})",
            video_id, chunked.token_count, self.settings.chunk_token_budget
        );

        if chunked.fits_in_one() {
            let summary = self.llm.complete(prompts::transcript_summary(&transcript)).await?;
            return self.reply(sink, &summary).await;
        }

        let total = chunked.chunks.len();
        for (index, chunk) in chunked.chunks.iter().enumerate() {
            self.reply(sink, &format!("Processing chunk {} of {}....", index + 1, total)).await?;
            let summary = self.llm.complete(prompts::transcript_chunk_summary(chunk)).await?;
            self.reply(sink, &summary).await?;
        }
        Ok(())
    }

    /// Extract three key ideas from a video in a single call.
    pub async fn ideas(&self, sink: &dyn ReplySink, url: &str) -> BotResult<()> {
        let video_id = extract_video_id(url)?;
        self.reply(sink, IDEAS_STATUS).await?;

        let transcript = self.fetch_transcript(&video_id).await?;
        // Not chunked: long transcripts go to the model whole.
        let token_count = self.tokenizer.encode(&transcript).len();
        if token_count > self.settings.chunk_token_budget {
            warn!(
                "⚠️ Transcript for {} is {} tokens, over the {} budget; sending it unchunked",
                video_id, token_count, self.settings.chunk_token_budget
            );
        }

        let ideas = self.llm.complete(prompts::key_ideas(&transcript)).await?;
        self.reply(sink, &ideas).await
    }

    async fn fetch_transcript(&self, video_id: &str) -> BotResult<String> {
        let segments = self.transcripts.fetch(video_id).await?;
        let transcript = join_transcript(&segments);
        let span = segments
            .last()
            .map(|s| s.start + s.duration.unwrap_or(0.0))
            .unwrap_or(0.0);
        debug!(
            "📄 Transcript for {}: {} segments, {} chars, {:.0}s of video",
            video_id,
            segments.len(),
            transcript.len(),
            span
        );
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::Role;
    use crate::testing::{ByteTokenizer, FakeLlm, FakeTranscripts, RecordingSink};

    fn settings(budget: usize, limit: usize) -> BotSettings {
        BotSettings {
            prefix: "/".to_string(),
            chunk_token_budget: budget,
            max_message_length: limit,
            history_limit: 10,
        }
    }

    fn bot(llm: &Arc<FakeLlm>, transcripts: FakeTranscripts, budget: usize) -> Bot {
        Bot::new(llm.clone(), Arc::new(transcripts), Arc::new(ByteTokenizer), settings(budget, 2000))
    }

    async fn run_tldr(bot: &Bot, sink: &RecordingSink, url: &str) {
        if let Err(err) = bot.yt_tldr(sink, url).await {
            bot.report_failure(sink, "yt_tldr", err).await;
        }
    }

    async fn run_ideas(bot: &Bot, sink: &RecordingSink, url: &str) {
        if let Err(err) = bot.ideas(sink, url).await {
            bot.report_failure(sink, "ideas", err).await;
        }
    }

    #[tokio::test]
    async fn test_hello() {
        let llm = Arc::new(FakeLlm::echoing());
        let bot = bot(&llm, FakeTranscripts::with_text(""), 7000);
        let sink = RecordingSink::default();

        bot.hello(&sink).await.unwrap();
        assert_eq!(sink.messages(), vec!["Hello I am Llama Bot!"]);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_ask_sends_persona_and_question() {
        let llm = Arc::new(FakeLlm::replying("42"));
        let bot = bot(&llm, FakeTranscripts::with_text(""), 7000);
        let sink = RecordingSink::default();

        bot.ask(&sink, "  what is the answer?  ").await.unwrap();

        assert_eq!(sink.messages(), vec!["42"]);
        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][0].role, Role::System);
        assert_eq!(calls[0][1].content, "what is the answer?");
    }

    #[tokio::test]
    async fn test_ask_without_question_shows_usage() {
        let llm = Arc::new(FakeLlm::echoing());
        let bot = bot(&llm, FakeTranscripts::with_text(""), 7000);
        let sink = RecordingSink::default();

        bot.ask(&sink, "   ").await.unwrap();
        assert_eq!(sink.messages(), vec!["Please provide a question! Usage: `/ask <message>`"]);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_ask_failure_reports_single_error() {
        let llm = Arc::new(FakeLlm::failing("connection refused"));
        let bot = bot(&llm, FakeTranscripts::with_text(""), 7000);
        let sink = RecordingSink::default();

        if let Err(err) = bot.ask(&sink, "hello?").await {
            bot.report_failure(&sink, "ask", err).await;
        }

        let messages = sink.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("Error: "));
        assert!(messages[0].contains("connection refused"));
    }

    #[tokio::test]
    async fn test_long_answer_is_split() {
        let llm = Arc::new(FakeLlm::replying(&"z".repeat(4500)));
        let bot = Bot::new(
            llm.clone(),
            Arc::new(FakeTranscripts::with_text("")),
            Arc::new(ByteTokenizer),
            settings(7000, 2000),
        );
        let sink = RecordingSink::default();

        bot.ask(&sink, "long please").await.unwrap();
        let lengths: Vec<usize> = sink.messages().iter().map(|m| m.len()).collect();
        assert_eq!(lengths, vec![2000, 2000, 500]);
    }

    #[tokio::test]
    async fn test_summarise_embeds_history() {
        let llm = Arc::new(FakeLlm::replying("people said hi"));
        let bot = bot(&llm, FakeTranscripts::with_text(""), 7000);
        let sink = RecordingSink::default();
        let history = vec!["hi all".to_string(), "hello!".to_string()];

        bot.summarise(&sink, &history).await.unwrap();

        assert_eq!(sink.messages(), vec!["people said hi"]);
        assert!(llm.calls()[0][1].content.contains("hi all\nhello!"));
    }

    #[tokio::test]
    async fn test_tldr_invalid_url_makes_no_calls() {
        let llm = Arc::new(FakeLlm::echoing());
        let transcripts = FakeTranscripts::with_text("never fetched");
        let fetches = transcripts.fetch_counter();
        let bot = bot(&llm, transcripts, 7000);
        let sink = RecordingSink::default();

        run_tldr(&bot, &sink, "https://youtu.be/dQw4w9WgXcQ").await;

        assert_eq!(sink.messages(), vec!["Invalid YouTube URL!"]);
        assert_eq!(llm.call_count(), 0);
        assert_eq!(fetches.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_tldr_short_transcript_single_call() {
        let llm = Arc::new(FakeLlm::replying("- short summary"));
        let transcript = "t".repeat(3000);
        let bot = bot(&llm, FakeTranscripts::with_text(&transcript), 7000);
        let sink = RecordingSink::default();

        run_tldr(&bot, &sink, "https://www.youtube.com/watch?v=abc").await;

        assert_eq!(sink.messages(), vec![TLDR_STATUS, "- short summary"]);
        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][1].content, transcript);
    }

    #[tokio::test]
    async fn test_tldr_long_transcript_progressive_chunks() {
        let llm = Arc::new(FakeLlm::numbered("summary"));
        let transcript = "q".repeat(15_000);
        let bot = bot(&llm, FakeTranscripts::with_text(&transcript), 7000);
        let sink = RecordingSink::default();

        run_tldr(&bot, &sink, "https://www.youtube.com/watch?v=long").await;

        assert_eq!(
            sink.messages(),
            vec![
                TLDR_STATUS,
                "Processing chunk 1 of 3....",
                "summary 1",
                "Processing chunk 2 of 3....",
                "summary 2",
                "Processing chunk 3 of 3....",
                "summary 3",
            ]
        );

        let calls = llm.calls();
        assert_eq!(calls.len(), 3);
        let chunk_lengths: Vec<usize> = calls
            .iter()
            .map(|call| call[1].content.matches('q').count())
            .collect();
        assert_eq!(chunk_lengths, vec![7000, 7000, 1000]);
        assert!(calls[0][1].content.starts_with("Please provide a summary for the following chunk"));
    }

    #[tokio::test]
    async fn test_tldr_chunk_failure_keeps_sent_results() {
        let llm = Arc::new(FakeLlm::failing_after(1, "model crashed"));
        let bot = bot(&llm, FakeTranscripts::with_text(&"w".repeat(20)), 10);
        let sink = RecordingSink::default();

        run_tldr(&bot, &sink, "https://www.youtube.com/watch?v=x").await;

        let messages = sink.messages();
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[1], "Processing chunk 1 of 2....");
        assert_eq!(messages[3], "Processing chunk 2 of 2....");
        assert!(messages[4].starts_with("Error: "));
        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn test_tldr_unavailable_transcript() {
        let llm = Arc::new(FakeLlm::echoing());
        let bot = bot(&llm, FakeTranscripts::unavailable(), 7000);
        let sink = RecordingSink::default();

        run_tldr(&bot, &sink, "https://www.youtube.com/watch?v=nocaps").await;

        assert_eq!(sink.messages(), vec![TLDR_STATUS, "Transcript not available for this video."]);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_ideas_ignores_budget() {
        let llm = Arc::new(FakeLlm::replying("1. a\n2. b\n3. c"));
        let transcript = "i".repeat(15_000);
        let bot = bot(&llm, FakeTranscripts::with_text(&transcript), 7000);
        let sink = RecordingSink::default();

        bot.ideas(&sink, "https://www.youtube.com/watch?v=ideas").await.unwrap();

        assert_eq!(sink.messages(), vec![IDEAS_STATUS, "1. a\n2. b\n3. c"]);
        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        assert!(calls[0][1].content.starts_with("Extract 3 key ideas"));
        assert!(calls[0][1].content.ends_with(&transcript));
    }

    #[tokio::test]
    async fn test_ideas_invalid_url() {
        let llm = Arc::new(FakeLlm::echoing());
        let bot = bot(&llm, FakeTranscripts::with_text("x"), 7000);
        let sink = RecordingSink::default();

        let err = bot.ideas(&sink, "https://example.com/video").await.unwrap_err();
        assert!(matches!(err, BotError::InvalidUrl(_)));
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn test_ideas_unavailable_transcript() {
        let llm = Arc::new(FakeLlm::echoing());
        let bot = bot(&llm, FakeTranscripts::unavailable(), 7000);
        let sink = RecordingSink::default();

        run_ideas(&bot, &sink, "https://www.youtube.com/watch?v=nocaps").await;

        assert_eq!(sink.messages(), vec![IDEAS_STATUS, "Transcript not available for this video."]);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_ideas_llm_failure_reports_single_error() {
        let llm = Arc::new(FakeLlm::failing("model offline"));
        let bot = bot(&llm, FakeTranscripts::with_text("some words"), 7000);
        let sink = RecordingSink::default();

        run_ideas(&bot, &sink, "https://www.youtube.com/watch?v=ideas").await;

        let messages = sink.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0], IDEAS_STATUS);
        assert!(messages[1].starts_with("Error: "));
        assert!(messages[1].contains("model offline"));
        assert_eq!(llm.call_count(), 1);
    }
}
