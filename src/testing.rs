// testing.rs - In-memory service fakes shared by the unit tests.

use crate::bot::ReplySink;
use crate::chunking::{Token, Tokenizer};
use crate::error::{BotError, BotResult};
use crate::llm::{ChatBackend, ChatMessage};
use crate::transcript::{TranscriptSegment, TranscriptSource};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// One token per byte, so token counts equal byte lengths.
pub struct ByteTokenizer;

impl Tokenizer for ByteTokenizer {
    fn encode(&self, text: &str) -> Vec<Token> {
        text.bytes().map(Token::from).collect()
    }

    fn decode_bytes(&self, tokens: &[Token]) -> Vec<u8> {
        tokens.iter().map(|&t| t as u8).collect()
    }
}

enum Reply {
    Fixed(String),
    Echo,
    Numbered(String),
    FailAfter(usize, String),
}

pub struct FakeLlm {
    reply: Reply,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl FakeLlm {
    fn with(reply: Reply) -> Self {
        Self { reply, calls: Mutex::new(Vec::new()) }
    }

    pub fn replying(text: &str) -> Self {
        Self::with(Reply::Fixed(text.to_string()))
    }

    pub fn echoing() -> Self {
        Self::with(Reply::Echo)
    }

    /// Replies "`label` 1", "`label` 2", ...
    pub fn numbered(label: &str) -> Self {
        Self::with(Reply::Numbered(label.to_string()))
    }

    pub fn failing(message: &str) -> Self {
        Self::with(Reply::FailAfter(0, message.to_string()))
    }

    /// Succeeds `successes` times, then fails every call.
    pub fn failing_after(successes: usize, message: &str) -> Self {
        Self::with(Reply::FailAfter(successes, message.to_string()))
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatBackend for FakeLlm {
    async fn complete(&self, messages: Vec<ChatMessage>) -> BotResult<String> {
        let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        let call_number = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(messages);
            calls.len()
        };

        match &self.reply {
            Reply::Fixed(text) => Ok(text.clone()),
            Reply::Echo => Ok(last),
            Reply::Numbered(label) => Ok(format!("{} {}", label, call_number)),
            Reply::FailAfter(successes, message) => {
                if call_number > *successes {
                    Err(BotError::Llm(message.clone()))
                } else {
                    Ok(format!("ok {}", call_number))
                }
            }
        }
    }
}

pub struct FakeTranscripts {
    result: Result<Vec<TranscriptSegment>, String>,
    fetches: Arc<AtomicUsize>,
}

impl FakeTranscripts {
    pub fn with_text(text: &str) -> Self {
        let segment = TranscriptSegment { text: text.to_string(), start: 0.0, duration: None };
        Self { result: Ok(vec![segment]), fetches: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn unavailable() -> Self {
        Self { result: Err("captions disabled".to_string()), fetches: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn fetch_counter(&self) -> Arc<AtomicUsize> {
        self.fetches.clone()
    }
}

#[async_trait]
impl TranscriptSource for FakeTranscripts {
    async fn fetch(&self, _video_id: &str) -> BotResult<Vec<TranscriptSegment>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.result
            .clone()
            .map_err(BotError::TranscriptUnavailable)
    }
}

#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReplySink for RecordingSink {
    async fn say(&self, text: &str) -> BotResult<()> {
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
