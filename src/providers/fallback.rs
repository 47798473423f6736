//! Static fallback artifacts served when a provider is unreachable.
//!
//! Every generation feature degrades to a canned artifact instead of
//! surfacing a provider error. The catalog is built once at startup and
//! handed to the adapters; operators can replace individual artifact
//! sets through the `[fallbacks]` table of the config file.

use std::collections::HashMap;

use rand::Rng;
use serde::Deserialize;

use super::code;

/// Stock placeholder images (512x512 crops).
const FALLBACK_IMAGES: [&str; 3] = [
    "https://images.unsplash.com/photo-1543053975-9e5f95ee96d7?q=80&w=512&h=512&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1493119508027-2b584f234d6c?q=80&w=512&h=512&auto=format&fit=crop",
    "https://images.unsplash.com/photo-1683099282548-7b789b476588?q=80&w=512&h=512&auto=format&fit=crop",
];

/// Stock placeholder clips.
const FALLBACK_VIDEOS: [&str; 3] = [
    "https://media.giphy.com/media/v1.Y2lkPTc5MGI3NjExdWs1YjBpdWl3ZTVzcGJoZWQ3NTFmMXJ5MG02aWMwc3F2ZHR1ZmVxOCZlcD12MV9pbnRlcm5hbF9naWZfYnlfaWQmY3Q9Zw/3o7bu8sRnYpTOG1p8k/giphy.gif",
    "https://media.giphy.com/media/v1.Y2lkPTc5MGI3NjExYW9jYWFqb202djVleThxZzN3eW5tdW9veGFlYzAyMWdtbWNyaGRzbCZlcD12MV9pbnRlcm5hbF9naWZfYnlfaWQmY3Q9Zw/2wh2oUz1tI4nPpFQo6/giphy.gif",
    "https://media.giphy.com/media/v1.Y2lkPTc5MGI3NjExcjVrc2E5cmVnanJwbXd1NWZjaXF2eWdtaWh1Z21wM2RucjdwZm9haiZlcD12MV9pbnRlcm5hbF9naWZfYnlfaWQmY3Q9Zw/l3vRaLHmbnBINlOF2/giphy.gif",
];

/// Pre-rendered audio clips keyed by style.
const FALLBACK_AUDIO: [(&str, &str); 5] = [
    (
        "cinematic",
        "https://replicate.delivery/pbxt/QkGkOLTwGFYgYQhsmcQAGRYyHAlrlata7kt9qChHKZlMCDFE/audio_out.wav",
    ),
    (
        "acoustic",
        "https://replicate.delivery/pbxt/U3WkhxR8MBptMVaXVll5Vo2oj3qp8LHaLF4bg4CGuZxnPeKEC/audio_out.wav",
    ),
    (
        "electronic",
        "https://replicate.delivery/pbxt/QT0QkwTfIjklWZZ5mTRXV5FQOBT9c41Oig8mB3jUlt0U3prQA/audio_out.wav",
    ),
    (
        "ambient",
        "https://replicate.delivery/pbxt/U3J0iIHaZJdrhFkXjVnlFXMmkXpx75sgJ8zNNj1rf12aPeKEC/audio_out.wav",
    ),
    (
        "lofi",
        "https://replicate.delivery/pbxt/U08ijCYMtlKk9y1jQPnkXHxRbtK5GCo2BzN1NVr6K5VZ5prQA/audio_out.wav",
    ),
];

/// Canned chat replies.
const FALLBACK_REPLIES: [&str; 3] = [
    "I'm here to help! What would you like to know?",
    "Thanks for your message! How can I assist you today?",
    "I'm ready to help. What's on your mind?",
];

/// Apologetic transcripts for failed transcriptions.
const FALLBACK_TRANSCRIPTS: [&str; 3] = [
    "Sorry, I couldn't transcribe that audio properly. Please try again.",
    "The audio couldn't be processed. Please ensure it's clear and try again.",
    "I had trouble understanding that. Could you please try speaking more clearly?",
];

/// Placeholder copy keyed by content type.
const FALLBACK_COPY: [(&str, &str); 4] = [
    (
        "blog",
        "Our content service is temporarily unavailable. Here is a starting outline: open with a hook that names your reader's problem, develop three supporting points with concrete examples, and close with a clear takeaway. Please try again shortly for a full draft.",
    ),
    (
        "marketing",
        "Our content service is temporarily unavailable. In the meantime: lead with the single biggest benefit, back it with one proof point, and end with a direct call to action. Please try again shortly for tailored copy.",
    ),
    (
        "social",
        "Our content service is temporarily unavailable. Quick template: one bold statement, one question to invite replies, and two or three relevant hashtags. Please try again shortly for a tailored post.",
    ),
    (
        "general",
        "Our content service is temporarily unavailable. Please try again in a few minutes.",
    ),
];

/// Catalog of fallback artifacts, one set per generation feature.
///
/// Cloned into each adapter at startup. Lookups never fail: keyed sets
/// fall back to a default entry and random pickers require non-empty
/// lists, which construction guarantees.
#[derive(Debug, Clone)]
pub struct FallbackCatalog {
    images: Vec<String>,
    videos: Vec<String>,
    audio: HashMap<String, String>,
    replies: Vec<String>,
    transcripts: Vec<String>,
    copy: HashMap<String, String>,
    code: HashMap<String, String>,
}

impl Default for FallbackCatalog {
    fn default() -> Self {
        Self {
            images: FALLBACK_IMAGES.iter().map(|s| s.to_string()).collect(),
            videos: FALLBACK_VIDEOS.iter().map(|s| s.to_string()).collect(),
            audio: FALLBACK_AUDIO
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            replies: FALLBACK_REPLIES.iter().map(|s| s.to_string()).collect(),
            transcripts: FALLBACK_TRANSCRIPTS.iter().map(|s| s.to_string()).collect(),
            copy: FALLBACK_COPY
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            code: code::scaffold_snippets(),
        }
    }
}

impl FallbackCatalog {
    /// Build the catalog, replacing artifact sets the operator overrode.
    ///
    /// Empty override lists are ignored so a stray `images = []` in the
    /// config file cannot leave a feature without artifacts.
    pub fn with_overrides(overrides: FallbackOverrides) -> Self {
        let mut catalog = Self::default();

        if let Some(images) = non_empty(overrides.images) {
            catalog.images = images;
        }
        if let Some(videos) = non_empty(overrides.videos) {
            catalog.videos = videos;
        }
        if let Some(audio) = overrides.audio {
            catalog.audio.extend(audio);
        }
        if let Some(replies) = non_empty(overrides.replies) {
            catalog.replies = replies;
        }
        if let Some(transcripts) = non_empty(overrides.transcripts) {
            catalog.transcripts = transcripts;
        }
        if let Some(copy) = overrides.copy {
            catalog.copy.extend(copy);
        }
        if let Some(code) = overrides.code {
            catalog.code.extend(code);
        }

        catalog
    }

    /// Random canned chat reply.
    pub fn reply(&self) -> String {
        pick(&self.replies)
    }

    /// First `amount` placeholder image URLs, capped at the set size.
    pub fn images(&self, amount: usize) -> Vec<String> {
        let n = amount.min(self.images.len());
        self.images[..n].to_vec()
    }

    /// Random placeholder clip URL.
    pub fn video(&self) -> String {
        pick(&self.videos)
    }

    /// Pre-rendered audio for `style`, defaulting to the cinematic clip.
    pub fn audio_for(&self, style: &str) -> String {
        self.audio
            .get(style)
            .or_else(|| self.audio.get("cinematic"))
            .cloned()
            .unwrap_or_default()
    }

    /// Random apologetic transcript.
    pub fn transcript(&self) -> String {
        pick(&self.transcripts)
    }

    /// Placeholder copy for `content_type`, defaulting to the general text.
    pub fn copy_for(&self, content_type: &str) -> String {
        self.copy
            .get(content_type)
            .or_else(|| self.copy.get("general"))
            .cloned()
            .unwrap_or_default()
    }

    /// Example snippet for `language`, defaulting to the JavaScript one.
    pub fn code_for(&self, language: &str) -> String {
        self.code
            .get(language)
            .or_else(|| self.code.get("javascript"))
            .cloned()
            .unwrap_or_default()
    }
}

fn pick(items: &[String]) -> String {
    let mut rng = rand::thread_rng();
    items[rng.gen_range(0..items.len())].clone()
}

fn non_empty(items: Option<Vec<String>>) -> Option<Vec<String>> {
    items.filter(|v| !v.is_empty())
}

/// Operator overrides for the catalog, read from the `[fallbacks]`
/// table of the config file. List overrides replace the stock set;
/// map overrides are merged key by key.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FallbackOverrides {
    pub images: Option<Vec<String>>,
    pub videos: Option<Vec<String>>,
    pub audio: Option<HashMap<String, String>>,
    pub replies: Option<Vec<String>>,
    pub transcripts: Option<Vec<String>>,
    pub copy: Option<HashMap<String, String>>,
    pub code: Option<HashMap<String, String>>,
}
