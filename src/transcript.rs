//! Transcript handling: the two supported input shapes (raw text and
//! time-stamped segments) and the auto-fetch helper that recovers captions
//! for a video identifier.

use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Result, TutorError};

/// One caption line with its offset into the video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub text: String,
}

/// Concatenate segments into one prompt-ready blob, preserving order.
/// Segments are expected to arrive sorted by `start` (non-decreasing).
pub fn flatten_segments(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| s.text.trim())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Render segments with their second offsets, for prompts that want the
/// model to anchor output to timestamps.
pub fn render_timed(segments: &[TranscriptSegment]) -> String {
    segments
        .iter()
        .map(|s| format!("[{:.0}s] {}", s.start, s.text.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Character-boundary-safe prefix, for bounding prompt size.
pub fn char_prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Fetches captions for a video id: transcript mirror first, then the
/// timedtext endpoint directly.
pub struct TranscriptFetcher {
    client: Client,
    mirror_base: String,
    timedtext_base: String,
}

impl TranscriptFetcher {
    pub fn new(timeout_seconds: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            mirror_base: "https://youtubetranscript.com".to_string(),
            timedtext_base: "https://www.youtube.com/api/timedtext".to_string(),
        }
    }

    /// Fetch the transcript for a video id, trying the mirror first and the
    /// timedtext endpoint as fallback.
    pub async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>> {
        info!("Fetching transcript for video: {}", video_id);

        match self.fetch_via_mirror(video_id).await {
            Ok(segments) if !segments.is_empty() => {
                info!("Transcript fetched via mirror: {} lines", segments.len());
                return Ok(segments);
            }
            Ok(_) => debug!("Mirror returned no caption nodes"),
            Err(e) => warn!("Transcript mirror fetch failed: {}", e),
        }

        match self.fetch_via_timedtext(video_id).await {
            Ok(segments) if !segments.is_empty() => {
                info!("Transcript fetched via timedtext: {} lines", segments.len());
                Ok(segments)
            }
            Ok(_) => Err(TutorError::TranscriptNotFound(video_id.to_string())),
            Err(e) => {
                warn!("Direct timedtext fetch failed: {}", e);
                Err(TutorError::TranscriptNotFound(video_id.to_string()))
            }
        }
    }

    async fn fetch_via_mirror(&self, video_id: &str) -> Result<Vec<TranscriptSegment>> {
        let url = format!(
            "{}/?server_vid={}",
            self.mirror_base,
            urlencoding::encode(video_id)
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TutorError::remote(status.as_u16(), &body));
        }

        let html = response.text().await?;
        Ok(parse_caption_markup(&html))
    }

    async fn fetch_via_timedtext(&self, video_id: &str) -> Result<Vec<TranscriptSegment>> {
        let response = self
            .client
            .get(&self.timedtext_base)
            .query(&[("lang", "en"), ("v", video_id)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TutorError::remote(status.as_u16(), &body));
        }

        let xml = response.text().await?;
        Ok(parse_timedtext_xml(&xml))
    }
}

/// Extract `<text start=".." dur="..">..</text>` nodes from the mirror's
/// markup, decoding the handful of entities the pages actually contain.
pub fn parse_caption_markup(html: &str) -> Vec<TranscriptSegment> {
    let mut segments = Vec::new();

    if let Ok(re) = Regex::new(r#"(?s)<text start="([\d.]+)"[^>]*>(.*?)</text>"#) {
        for caps in re.captures_iter(html) {
            let start: f64 = caps[1].parse().unwrap_or(0.0);
            let text = decode_entities(&caps[2]);
            if !text.is_empty() {
                segments.push(TranscriptSegment { start, text });
            }
        }
    }

    segments
}

/// Parse the timedtext XML through the HTML parser; `<text>` elements with a
/// `start` attribute survive the lenient parse intact.
pub fn parse_timedtext_xml(xml: &str) -> Vec<TranscriptSegment> {
    let document = Html::parse_document(xml);
    let selector = match Selector::parse("text") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|el| {
            let start: f64 = el.value().attr("start")?.parse().ok()?;
            let text = el.text().collect::<String>();
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if text.is_empty() {
                None
            } else {
                Some(TranscriptSegment { start, text })
            }
        })
        .collect()
}

fn decode_entities(raw: &str) -> String {
    let text = raw
        .replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&amp;", "&");

    // Remove residual markup inside caption nodes
    let text = if let Ok(re) = Regex::new(r"</?[^>]+(>|$)") {
        re.replace_all(&text, "").to_string()
    } else {
        text
    };

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_preserves_order() {
        let segments = vec![
            TranscriptSegment { start: 0.0, text: "hello".to_string() },
            TranscriptSegment { start: 2.5, text: " world ".to_string() },
            TranscriptSegment { start: 5.0, text: "".to_string() },
        ];
        assert_eq!(flatten_segments(&segments), "hello world");
    }

    #[test]
    fn test_render_timed_includes_offsets() {
        let segments = vec![TranscriptSegment { start: 12.7, text: "intro".to_string() }];
        assert_eq!(render_timed(&segments), "[13s] intro");
    }

    #[test]
    fn test_char_prefix_respects_boundaries() {
        assert_eq!(char_prefix("héllo", 2), "hé");
        assert_eq!(char_prefix("ab", 10), "ab");
    }

    #[test]
    fn test_word_count() {
        assert_eq!(word_count("  one two\nthree  "), 3);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn test_parse_caption_markup() {
        let html = r#"<html><body>
            <text start="0.5" dur="2.1">It&#39;s a &quot;test&quot;</text>
            <text start="3.0" dur="1.0">second <b>line</b></text>
        </body></html>"#;
        let segments = parse_caption_markup(html);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "It's a \"test\"");
        assert_eq!(segments[1].start, 3.0);
        assert_eq!(segments[1].text, "second line");
    }

    #[test]
    fn test_parse_timedtext_xml() {
        let xml = r#"<transcript>
            <text start="1.2" dur="3.4">first  line</text>
            <text start="4.6" dur="2.0">next</text>
        </transcript>"#;
        let segments = parse_timedtext_xml(xml);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].start, 1.2);
        assert_eq!(segments[0].text, "first line");
    }

    #[test]
    fn test_no_captions_yields_empty() {
        assert!(parse_caption_markup("<html><body>nothing here</body></html>").is_empty());
    }
}
