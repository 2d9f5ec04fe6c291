use serde::{Deserialize, Serialize};
use std::fmt;

/// Artist name used by search backends when the uploader is unknown.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";

pub const UNKNOWN_TITLE: &str = "Unknown Title";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Stable external identifier (the video id).
    pub id: String,
    pub external_video_id: String,
    pub title: String,
    pub artist: String,
    pub album: String,
    pub artwork_url: String,
    pub duration_seconds: u64,
}

impl Track {
    /// Fallback artwork for a video that came back without thumbnails.
    pub fn fallback_artwork(video_id: &str) -> String {
        format!(
            "https://i.ytimg.com/vi/{}/hqdefault.jpg",
            urlencoding::encode(video_id)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default, alias = "public")]
    pub is_public: bool,
    #[serde(default)]
    pub track_ids: Vec<String>,
    #[serde(default, alias = "coverArt")]
    pub cover_art_url: Option<String>,
}

/// What the caller knows about a user at the time of the request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserHistorySnapshot {
    #[serde(default)]
    pub recently_played_track_ids: Vec<String>,
    #[serde(default)]
    pub user_playlists: Vec<Playlist>,
}

/// Opaque pagination cursor issued by a search backend.
///
/// The recommendation core only ever clones and forwards it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationPage {
    pub tracks: Vec<Track>,
    pub next_continuation_token: Option<ContinuationToken>,
}

impl RecommendationPage {
    /// Empty page with no continuation; the feed has nothing more to give.
    pub fn terminal() -> Self {
        Self::default()
    }

    pub fn is_terminal(&self) -> bool {
        self.next_continuation_token.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_page() {
        let page = RecommendationPage::terminal();
        assert!(page.tracks.is_empty());
        assert!(page.is_terminal());
    }

    #[test]
    fn test_continuation_token_is_transparent() {
        let token = ContinuationToken::new("EgZ2aWRlb3M=");
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, "\"EgZ2aWRlb3M=\"");

        let back: ContinuationToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back.as_str(), "EgZ2aWRlb3M=");
    }

    #[test]
    fn test_playlist_accepts_firestore_field_names() {
        let playlist: Playlist = serde_json::from_value(serde_json::json!({
            "id": "p1",
            "name": "Late Night Lofi",
            "ownerId": "u1",
            "trackIds": ["t1", "t2"],
            "public": true
        }))
        .unwrap();

        assert!(playlist.is_public);
        assert_eq!(playlist.track_ids, vec!["t1", "t2"]);
        assert_eq!(playlist.owner_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_fallback_artwork() {
        assert_eq!(
            Track::fallback_artwork("abc123"),
            "https://i.ytimg.com/vi/abc123/hqdefault.jpg"
        );
    }
}
