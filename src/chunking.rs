// chunking.rs - Token-Budget Chunking
// Splits a transcript into windows that fit the model's token budget.
// Windows are purely length based: a chunk may end mid-sentence.

use crate::error::{BotError, BotResult};
use tiktoken_rs::CoreBPE;

pub type Token = usize;

/// Text <-> token conversion used for budget accounting.
pub trait Tokenizer: Send + Sync {
    fn encode(&self, text: &str) -> Vec<Token>;

    /// Raw bytes for a token run. A run may end inside a multi-byte character.
    fn decode_bytes(&self, tokens: &[Token]) -> Vec<u8>;
}

/// BPE tokenizer backed by tiktoken.
pub struct TiktokenTokenizer {
    bpe: CoreBPE,
}

impl TiktokenTokenizer {
    pub fn for_model(model: &str) -> BotResult<Self> {
        let bpe = tiktoken_rs::get_bpe_from_model(model)
            .map_err(|e| BotError::Tokenizer(format!("no encoding for {}: {}", model, e)))?;
        Ok(Self { bpe })
    }
}

impl Tokenizer for TiktokenTokenizer {
    fn encode(&self, text: &str) -> Vec<Token> {
        self.bpe.encode_ordinary(text)
    }

    fn decode_bytes(&self, tokens: &[Token]) -> Vec<u8> {
        self.bpe._decode_native(tokens)
    }
}

/// Split `tokens` into consecutive windows of `max_size`; only the last may be
/// shorter. Empty input gives no windows.
pub fn chunk<T>(tokens: &[T], max_size: usize) -> BotResult<Vec<&[T]>> {
    if max_size == 0 {
        return Err(BotError::InvalidArgument(
            "chunk size must be greater than zero".to_string(),
        ));
    }
    Ok(tokens.chunks(max_size).collect())
}

/// Decode each window back to text. Bytes of a character cut at a window edge
/// are carried into the next window, so joining the results gives back the
/// original text.
pub fn decode_chunks(tokenizer: &dyn Tokenizer, chunks: &[&[Token]]) -> Vec<String> {
    let mut texts = Vec::with_capacity(chunks.len());
    let mut pending: Vec<u8> = Vec::new();

    for (index, window) in chunks.iter().enumerate() {
        pending.extend(tokenizer.decode_bytes(window));
        let keep = if index + 1 == chunks.len() {
            pending.len()
        } else {
            complete_utf8_prefix(&pending)
        };
        let tail = pending.split_off(keep);
        texts.push(String::from_utf8_lossy(&pending).into_owned());
        pending = tail;
    }

    texts
}

// Length of the longest prefix that does not end in a truncated character.
fn complete_utf8_prefix(bytes: &[u8]) -> usize {
    match std::str::from_utf8(bytes) {
        Ok(_) => bytes.len(),
        Err(e) if e.error_len().is_none() => e.valid_up_to(),
        Err(_) => bytes.len(),
    }
}

/// A transcript measured against a token budget.
pub struct ChunkedText {
    pub token_count: usize,
    pub chunks: Vec<String>,
}

impl ChunkedText {
    pub fn fits_in_one(&self) -> bool {
        self.chunks.len() <= 1
    }
}

pub fn chunk_text(tokenizer: &dyn Tokenizer, text: &str, budget: usize) -> BotResult<ChunkedText> {
    let tokens = tokenizer.encode(text);
    let windows = chunk(&tokens, budget)?;
    Ok(ChunkedText {
        token_count: tokens.len(),
        chunks: decode_chunks(tokenizer, &windows),
    })
}
