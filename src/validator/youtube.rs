use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use url::Url;

use super::{encode, VideoValidator};
use crate::storage::VideoRecord;

static VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("valid YouTube id regex"));

/// YouTube validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct YoutubeValidator;

#[async_trait]
impl VideoValidator for YoutubeValidator {
    fn extension(&self) -> &str {
        "youtube"
    }

    /// Accepts a bare 11-character id or a watch/short/embed URL.
    fn online_media_id(&self, video: &VideoRecord) -> Option<String> {
        let source = video.media_source.as_deref()?.trim();
        if VIDEO_ID.is_match(source) {
            return Some(source.to_string());
        }
        id_from_url(source).filter(|id| VIDEO_ID.is_match(id))
    }

    fn build_url(&self, media_id: &str) -> String {
        format!("https://www.youtube.com/watch?v={}", encode(media_id))
    }

    fn oembed_url(&self, media_id: &str, format: &str) -> String {
        format!(
            "https://www.youtube.com/oembed?url={}&format={}",
            encode(&self.build_url(media_id)),
            encode(format)
        )
    }
}

fn id_from_url(source: &str) -> Option<String> {
    let url = Url::parse(source)
        .or_else(|_| Url::parse(&format!("https://{}", source)))
        .ok()?;
    let host = url.host_str()?.trim_start_matches("www.").trim_start_matches("m.");
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    match host {
        "youtu.be" => segments.next().map(str::to_string),
        "youtube.com" | "youtube-nocookie.com" => match segments.next()? {
            "watch" => url
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned()),
            "embed" | "shorts" | "v" => segments.next().map(str::to_string),
            _ => None,
        },
        _ => None,
    }
}
