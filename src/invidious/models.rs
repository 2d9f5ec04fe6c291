use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct VideoThumbnail {
    pub quality: Option<String>,
    pub url: Option<String>,
}

/// One element of `/api/v1/search?type=video`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchVideo {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub video_id: Option<String>,
    pub title: Option<String>,
    pub author: Option<String>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub length_seconds: Option<u64>,
    #[serde(default)]
    pub video_thumbnails: Vec<VideoThumbnail>,
}

/// Instances disagree on the type of `lengthSeconds`; accept numbers and
/// numeric strings, and treat anything else as unknown.
fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite() && *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

impl SearchVideo {
    pub fn is_video(&self) -> bool {
        self.kind.as_deref().map_or(true, |k| k == "video")
    }

    /// Prefer the "high" rendition, else the first one listed.
    pub fn thumbnail(&self) -> Option<&str> {
        self.video_thumbnails
            .iter()
            .find(|t| t.quality.as_deref() == Some("high"))
            .or_else(|| self.video_thumbnails.first())
            .and_then(|t| t.url.as_deref())
            .filter(|url| !url.is_empty())
    }
}

/// Per-instance details in the public instance directory.
#[derive(Debug, Clone, Deserialize)]
pub struct InstanceInfo {
    #[serde(default)]
    pub api: Option<bool>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub uri: Option<String>,
}
