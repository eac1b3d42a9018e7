// transcript.rs - YouTube Transcript Retrieval
// Resolves a video id from a watch URL, finds the caption track advertised in
// the watch page's player response and parses the timed-text XML into ordered
// segments.

use crate::error::{BotError, BotResult};
use async_trait::async_trait;
use log::{debug, info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

static PLAYER_RESPONSE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)ytInitialPlayerResponse\s*=\s*(\{.+?\})\s*;\s*(?:var\s|</script>)")
        .expect("player response pattern")
});

static TEXT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)<text\b([^>]*)>(.*?)</text>"#).expect("timed text pattern")
});

static START_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"start="([^"]*)""#).expect("start pattern"));
static DUR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"dur="([^"]*)""#).expect("dur pattern"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("tag pattern"));
static NUMERIC_ENTITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&#(x[0-9a-fA-F]+|[0-9]+);").expect("entity pattern"));

/// A timed snippet of spoken content, in video order.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptSegment {
    pub text: String,
    /// Offset from the start of the video, in seconds.
    pub start: f64,
    pub duration: Option<f64>,
}

#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch(&self, video_id: &str) -> BotResult<Vec<TranscriptSegment>>;
}

/// Video id from the `v` query parameter of a watch URL.
pub fn extract_video_id(url: &str) -> BotResult<String> {
    let url = url.trim().trim_start_matches('<').trim_end_matches('>');
    let parsed = Url::parse(url)
        .or_else(|_| Url::parse(&format!("https://{}", url)))
        .map_err(|_| BotError::InvalidUrl(url.to_string()))?;

    parsed
        .query_pairs()
        .find(|(key, _)| key == "v")
        .map(|(_, value)| value.trim().to_string())
        .filter(|id| !id.is_empty())
        .ok_or_else(|| BotError::InvalidUrl(url.to_string()))
}

/// Segments joined with single spaces, the form handed to the tokenizer.
pub fn join_transcript(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|segment| segment.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerResponse {
    playability_status: Option<PlayabilityStatus>,
    captions: Option<Captions>,
}

#[derive(Debug, Deserialize)]
struct PlayabilityStatus {
    status: Option<String>,
    reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Captions {
    player_captions_tracklist_renderer: Option<TracklistRenderer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TracklistRenderer {
    #[serde(default)]
    caption_tracks: Vec<CaptionTrack>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    language_code: Option<String>,
    kind: Option<String>,
}

pub struct YoutubeTranscriptClient {
    http: reqwest::Client,
    language: String,
}

impl YoutubeTranscriptClient {
    pub fn new(language: impl Into<String>) -> BotResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| BotError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { http, language: language.into() })
    }

    async fn get_text(&self, url: &str) -> BotResult<String> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| BotError::Transcript(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BotError::Transcript(format!("HTTP {} fetching {}", status, url)));
        }
        response.text().await.map_err(|e| BotError::Transcript(e.to_string()))
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTranscriptClient {
    async fn fetch(&self, video_id: &str) -> BotResult<Vec<TranscriptSegment>> {
        let watch_url = format!("https://www.youtube.com/watch?v={}", video_id);
        debug!("🎥 Fetching watch page for {}", video_id);
        let html = self.get_text(&watch_url).await?;

        let tracks = caption_tracks(&html)?;
        let track = select_track(&tracks, &self.language)
            .ok_or_else(|| BotError::TranscriptUnavailable(format!("no caption tracks for {}", video_id)))?;
        debug!(
            "📄 Using caption track lang={:?} kind={:?}",
            track.language_code, track.kind
        );

        let xml = self.get_text(&track.base_url).await?;
        let segments = parse_timed_text(&xml);
        if segments.is_empty() {
            warn!("⚠️ Caption track for {} contained no text", video_id);
            return Err(BotError::TranscriptUnavailable(format!("empty transcript for {}", video_id)));
        }

        info!("✅ Fetched {} transcript segments for {}", segments.len(), video_id);
        Ok(segments)
    }
}

fn caption_tracks(html: &str) -> BotResult<Vec<CaptionTrack>> {
    let raw = PLAYER_RESPONSE_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| BotError::Transcript("could not find player response in watch page".to_string()))?;

    let player: PlayerResponse = serde_json::from_str(raw.as_str())
        .map_err(|e| BotError::Transcript(format!("failed to parse player response: {}", e)))?;

    if let Some(status) = &player.playability_status {
        if status.status.as_deref().map_or(false, |s| s != "OK") {
            return Err(BotError::TranscriptUnavailable(
                status.reason.clone().unwrap_or_else(|| "video is unavailable".to_string()),
            ));
        }
    }

    let tracks = player
        .captions
        .and_then(|c| c.player_captions_tracklist_renderer)
        .map(|r| r.caption_tracks)
        .unwrap_or_default();
    if tracks.is_empty() {
        return Err(BotError::TranscriptUnavailable("transcripts are disabled for this video".to_string()));
    }
    Ok(tracks)
}

// Manual captions in the preferred language beat auto-generated ones; any
// language is better than none.
fn select_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    let matches_language = |track: &&CaptionTrack| {
        track
            .language_code
            .as_deref()
            .map_or(false, |code| code == language || code.starts_with(&format!("{}-", language)))
    };
    let is_generated = |track: &&CaptionTrack| track.kind.as_deref() == Some("asr");

    tracks
        .iter()
        .filter(matches_language)
        .find(|track| !is_generated(track))
        .or_else(|| tracks.iter().find(matches_language))
        .or_else(|| tracks.first())
}

fn parse_timed_text(xml: &str) -> Vec<TranscriptSegment> {
    TEXT_RE
        .captures_iter(xml)
        .filter_map(|caps| {
            let attrs = caps.get(1).map_or("", |m| m.as_str());
            let body = caps.get(2).map_or("", |m| m.as_str());

            let text = decode_entities(body).replace('\n', " ");
            let text = TAG_RE.replace_all(&text, "").trim().to_string();
            if text.is_empty() {
                return None;
            }

            let start = START_RE
                .captures(attrs)
                .and_then(|c| c[1].parse::<f64>().ok())
                .unwrap_or(0.0);
            let duration = DUR_RE.captures(attrs).and_then(|c| c[1].parse::<f64>().ok());
            Some(TranscriptSegment { text, start, duration })
        })
        .collect()
}

// Timed text is XML-escaped HTML, so `&amp;#39;` has to come out as `'`.
fn decode_entities(text: &str) -> String {
    let text = text.replace("&amp;", "&");
    let text = NUMERIC_ENTITY_RE.replace_all(&text, |caps: &regex::Captures| {
        let code = &caps[1];
        let value = match code.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => code.parse::<u32>().ok(),
        };
        value
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });

    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
