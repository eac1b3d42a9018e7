// split.rs - Outgoing Message Splitting
// Breaks a reply into pieces that fit Discord's per-message limit.
// Splitting is by character count only, so no text is added, trimmed or lost.

use crate::error::{BotError, BotResult};

/// Split `text` into consecutive pieces of at most `limit` characters.
/// An empty input yields no pieces.
pub fn split_message(text: &str, limit: usize) -> BotResult<Vec<String>> {
    if limit == 0 {
        return Err(BotError::InvalidArgument(
            "message limit must be greater than zero".to_string(),
        ));
    }

    let mut pieces = Vec::new();
    let mut start = 0;
    let mut count = 0;

    for (offset, _) in text.char_indices() {
        if count == limit {
            pieces.push(text[start..offset].to_string());
            start = offset;
            count = 0;
        }
        count += 1;
    }
    if start < text.len() {
        pieces.push(text[start..].to_string());
    }

    Ok(pieces)
}
