use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use url::Url;

use super::{encode, VideoValidator};
use crate::storage::VideoRecord;

// Numeric id, optionally followed by the hash of a private video.
static STORED_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)(?:/[A-Za-z0-9]+)?$").expect("valid Vimeo id regex")
});

/// Vimeo validator.
#[derive(Debug, Clone, Copy, Default)]
pub struct VimeoValidator;

#[async_trait]
impl VideoValidator for VimeoValidator {
    fn extension(&self) -> &str {
        "vimeo"
    }

    fn online_media_id(&self, video: &VideoRecord) -> Option<String> {
        let source = video.media_source.as_deref()?.trim();
        if let Some(captures) = STORED_ID.captures(source) {
            return Some(captures[1].to_string());
        }
        id_from_url(source)
    }

    fn build_url(&self, media_id: &str) -> String {
        format!("https://vimeo.com/{}", encode(media_id))
    }

    fn oembed_url(&self, media_id: &str, format: &str) -> String {
        format!(
            "https://vimeo.com/api/oembed.{}?width=2048&url={}",
            encode(format),
            encode(&self.build_url(media_id))
        )
    }
}

fn id_from_url(source: &str) -> Option<String> {
    let url = Url::parse(source)
        .or_else(|_| Url::parse(&format!("https://{}", source)))
        .ok()?;
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    let id = match url.host_str()? {
        "vimeo.com" | "www.vimeo.com" => {
            segments.find(|s| s.bytes().all(|b| b.is_ascii_digit()))?
        }
        "player.vimeo.com" => match segments.next()? {
            "video" => segments.next()?,
            _ => return None,
        },
        _ => return None,
    };

    (!id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())).then(|| id.to_string())
}
