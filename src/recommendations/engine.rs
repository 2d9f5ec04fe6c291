//! Recommendation engine implementation.
//!
//! Two feeds share one search backend:
//! 1. `recommend`: a single composed query, paged with the backend's own
//!    continuation token, minus anything recently played
//! 2. `discover`: several profile-derived queries searched at once, merged,
//!    filtered and ranked against the listener's profile
//!
//! The engine holds no per-user state. Everything it needs arrives with the
//! request, so one instance can serve any number of concurrent callers.

use crate::library::dedup::unique_by_id;
use crate::models::{ContinuationToken, Playlist, RecommendationPage, Track, UserHistorySnapshot};
use crate::providers::{SearchError, SearchProvider};
use crate::recommendations::affinity::top_artists;
use crate::recommendations::dna::dna_queries;
use crate::recommendations::errors::RecommendationError;
use crate::recommendations::query::compose;
use crate::recommendations::ranking::rank_and_filter;
use crate::recommendations::types::{DiscoverRequest, DiscoveryPage, RecommendRequest};
use futures_util::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;

/// Artists taken from recent listening when composing a query.
const DEFAULT_ARTIST_COUNT: usize = 3;

/// Community playlists taken from the DNA match when composing a query.
const DEFAULT_DNA_COUNT: usize = 3;

/// Trending tracks shown when a profile produced no queries.
const TRENDING_FALLBACK_LIMIT: usize = 20;

pub struct RecommendationEngine {
    provider: Arc<dyn SearchProvider>,
    artist_count: usize,
    dna_count: usize,
}

impl RecommendationEngine {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self {
            provider,
            artist_count: DEFAULT_ARTIST_COUNT,
            dna_count: DEFAULT_DNA_COUNT,
        }
    }

    /// Compose the fresh-search query for a listener.
    ///
    /// `recent_tracks` are the resolved tracks behind
    /// `history.recently_played_track_ids`. Returns an empty string when
    /// neither affinity nor DNA found anything.
    pub fn query_from_history(
        &self,
        history: &UserHistorySnapshot,
        recent_tracks: &[Track],
        community_playlists: &[Playlist],
    ) -> String {
        let artists = top_artists(recent_tracks, self.artist_count);
        let dna = dna_queries(&history.user_playlists, community_playlists, self.dna_count);

        log::debug!("Query inputs: artists={:?} dna={:?}", artists, dna);
        compose(&artists, &dna)
    }

    /// One page of the recommendation feed.
    ///
    /// With a continuation token the backend resumes its previous search and
    /// its page is returned untouched. Without one, `query` starts a new
    /// search; a missing or blank query yields the terminal page without
    /// touching the network.
    pub async fn recommend(
        &self,
        request: RecommendRequest,
    ) -> Result<RecommendationPage, RecommendationError> {
        if let Some(token) = request.continuation_token {
            log::debug!("Resuming recommendations via {}", self.provider.name());
            return self.search("", Some(&token)).await;
        }

        let query = match request.query.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => q,
            _ => {
                log::debug!("No recommendation query, returning terminal page");
                return Ok(RecommendationPage::terminal());
            }
        };

        log::info!("Fetching recommendations for '{}'", query);
        let page = self.search(query, None).await?;

        let recent: HashSet<&str> = request
            .user_history
            .as_ref()
            .map(|h| h.recently_played_track_ids.iter().map(String::as_str).collect())
            .unwrap_or_default();

        let tracks: Vec<Track> = unique_by_id(page.tracks)
            .into_iter()
            .filter(|t| !recent.contains(t.id.as_str()))
            .collect();

        log::debug!("{} recommendations after filtering", tracks.len());

        Ok(RecommendationPage {
            tracks,
            next_continuation_token: page.next_continuation_token,
        })
    }

    /// One page of the multi-query discovery feed.
    ///
    /// A request carrying both a token and the query that produced it
    /// resumes that query. Otherwise every query is searched concurrently
    /// and the first token found is handed back together with its query.
    /// No queries at all falls back to trending music.
    pub async fn discover(
        &self,
        request: DiscoverRequest,
    ) -> Result<DiscoveryPage, RecommendationError> {
        let DiscoverRequest {
            profile,
            queries,
            seen,
            continuation_token,
            continuation_query,
        } = request;

        if let (Some(token), Some(query)) = (continuation_token, continuation_query) {
            log::debug!("Resuming discovery for '{}'", query);
            let page = self.search(&query, Some(&token)).await?;
            let continuation_query = page.next_continuation_token.as_ref().map(|_| query);

            return Ok(DiscoveryPage {
                tracks: rank_and_filter(page.tracks, &profile, &seen),
                next_continuation_token: page.next_continuation_token,
                continuation_query,
            });
        }

        let queries: Vec<String> = queries
            .into_iter()
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .collect();

        if queries.is_empty() {
            log::info!("No discovery queries, falling back to trending");
            let trending = self.trending().await?;
            let mut tracks = rank_and_filter(trending, &profile, &seen);
            tracks.truncate(TRENDING_FALLBACK_LIMIT);
            return Ok(DiscoveryPage {
                tracks,
                ..DiscoveryPage::default()
            });
        }

        log::info!("Running {} discovery queries", queries.len());
        let pages = join_all(queries.iter().map(|q| self.search(q, None))).await;

        let mut merged = Vec::new();
        let mut next: Option<(ContinuationToken, String)> = None;
        for (query, page) in queries.into_iter().zip(pages) {
            let page = page?;
            if next.is_none() {
                if let Some(token) = page.next_continuation_token {
                    next = Some((token, query));
                }
            }
            merged.extend(page.tracks);
        }

        let tracks = rank_and_filter(merged, &profile, &seen);
        log::debug!("{} discovery tracks after ranking", tracks.len());

        let (next_continuation_token, continuation_query) = match next {
            Some((token, query)) => (Some(token), Some(query)),
            None => (None, None),
        };

        Ok(DiscoveryPage {
            tracks,
            next_continuation_token,
            continuation_query,
        })
    }

    /// Search through the provider, keeping only configuration errors.
    async fn search(
        &self,
        query: &str,
        token: Option<&ContinuationToken>,
    ) -> Result<RecommendationPage, RecommendationError> {
        match self.provider.search(query, token).await {
            Ok(page) => Ok(page),
            Err(e) => absorb(e).map(|_| RecommendationPage::terminal()),
        }
    }

    async fn trending(&self) -> Result<Vec<Track>, RecommendationError> {
        match self.provider.trending().await {
            Ok(tracks) => Ok(tracks),
            Err(e) => absorb(e).map(|_| Vec::new()),
        }
    }
}

fn absorb(e: SearchError) -> Result<(), RecommendationError> {
    match e {
        SearchError::Config(msg) => Err(RecommendationError::Config(msg)),
        other => {
            log::warn!("Search failed, treating as end of results: {}", other);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::types::ProviderId;
    use crate::recommendations::types::{MusicProfile, SeenTracks};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;

    fn track(id: &str, artist: &str) -> Track {
        Track {
            id: id.to_string(),
            external_video_id: id.to_string(),
            title: format!("Song {}", id),
            artist: artist.to_string(),
            album: "YouTube".to_string(),
            artwork_url: Track::fallback_artwork(id),
            duration_seconds: 200,
        }
    }

    enum Reply {
        Page(RecommendationPage),
        Fail(SearchError),
    }

    /// Scripted backend that records every call it receives.
    #[derive(Default)]
    struct MockProvider {
        replies: Mutex<HashMap<String, Reply>>,
        trending: Vec<Track>,
        calls: Mutex<Vec<(String, Option<String>)>>,
    }

    impl MockProvider {
        fn reply(self, key: &str, reply: Reply) -> Self {
            self.replies.lock().insert(key.to_string(), reply);
            self
        }

        fn calls(&self) -> Vec<(String, Option<String>)> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl SearchProvider for MockProvider {
        fn id(&self) -> ProviderId {
            ProviderId::Youtube
        }

        fn name(&self) -> &str {
            "Mock"
        }

        async fn search(
            &self,
            query: &str,
            continuation: Option<&ContinuationToken>,
        ) -> Result<RecommendationPage, SearchError> {
            let token = continuation.map(|t| t.as_str().to_string());
            self.calls.lock().push((query.to_string(), token.clone()));

            let key = token.unwrap_or_else(|| query.to_string());
            match self.replies.lock().remove(&key) {
                Some(Reply::Page(page)) => Ok(page),
                Some(Reply::Fail(e)) => Err(e),
                None => Ok(RecommendationPage::terminal()),
            }
        }

        async fn trending(&self) -> Result<Vec<Track>, SearchError> {
            Ok(self.trending.clone())
        }
    }

    fn page(tracks: Vec<Track>, token: Option<&str>) -> Reply {
        Reply::Page(RecommendationPage {
            tracks,
            next_continuation_token: token.map(ContinuationToken::new),
        })
    }

    fn engine(mock: MockProvider) -> (RecommendationEngine, Arc<MockProvider>) {
        let mock = Arc::new(mock);
        (RecommendationEngine::new(mock.clone()), mock)
    }

    fn ids(tracks: &[Track]) -> Vec<&str> {
        tracks.iter().map(|t| t.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_empty_query_makes_no_search() {
        let (engine, mock) = engine(MockProvider::default());

        let result = engine
            .recommend(RecommendRequest::fresh("", None))
            .await
            .unwrap();
        assert_eq!(result, RecommendationPage::terminal());

        let result = engine.recommend(RecommendRequest::default()).await.unwrap();
        assert_eq!(result, RecommendationPage::terminal());

        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_continuation_forwards_token_unmodified() {
        let mock = MockProvider::default()
            .reply("Arijit Singh", page(vec![track("v1", "Arijit Singh")], Some("T1")))
            .reply("T1", page(vec![track("v2", "Arijit Singh")], None));
        let (engine, mock) = engine(mock);

        let first = engine
            .recommend(RecommendRequest::fresh("Arijit Singh", None))
            .await
            .unwrap();
        assert_eq!(first.next_continuation_token, Some(ContinuationToken::new("T1")));

        let token = first.next_continuation_token.unwrap();
        let second = engine.recommend(RecommendRequest::resume(token)).await.unwrap();
        assert_eq!(ids(&second.tracks), vec!["v2"]);
        assert!(second.is_terminal());

        assert_eq!(
            mock.calls(),
            vec![
                ("Arijit Singh".to_string(), None),
                (String::new(), Some("T1".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn test_fresh_search_drops_recently_played() {
        let mock = MockProvider::default().reply(
            "lofi",
            page(
                vec![track("v1", "A"), track("v3", "B"), track("v4", "C")],
                Some("N"),
            ),
        );
        let (engine, _) = engine(mock);

        let history = UserHistorySnapshot {
            recently_played_track_ids: vec!["v1".to_string(), "v2".to_string()],
            user_playlists: Vec::new(),
        };
        let result = engine
            .recommend(RecommendRequest::fresh("lofi", Some(history)))
            .await
            .unwrap();

        assert_eq!(ids(&result.tracks), vec!["v3", "v4"]);
        assert_eq!(result.next_continuation_token, Some(ContinuationToken::new("N")));
    }

    #[tokio::test]
    async fn test_fresh_search_dedupes_by_id() {
        let mock = MockProvider::default().reply(
            "lofi",
            page(vec![track("v1", "A"), track("v2", "B"), track("v1", "A")], None),
        );
        let (engine, _) = engine(mock);

        let result = engine
            .recommend(RecommendRequest::fresh("lofi", None))
            .await
            .unwrap();
        assert_eq!(ids(&result.tracks), vec!["v1", "v2"]);
    }

    #[tokio::test]
    async fn test_search_failure_becomes_terminal_page() {
        let mock = MockProvider::default()
            .reply("lofi", Reply::Fail(SearchError::Timeout("10s".into())))
            .reply("T9", Reply::Fail(SearchError::Network("HTTP 503".into())));
        let (engine, _) = engine(mock);

        let fresh = engine
            .recommend(RecommendRequest::fresh("lofi", None))
            .await
            .unwrap();
        assert_eq!(fresh, RecommendationPage::terminal());

        let resumed = engine
            .recommend(RecommendRequest::resume(ContinuationToken::new("T9")))
            .await
            .unwrap();
        assert_eq!(resumed, RecommendationPage::terminal());
    }

    #[tokio::test]
    async fn test_config_error_propagates() {
        let mock = MockProvider::default()
            .reply("lofi", Reply::Fail(SearchError::Config("missing API key".into())));
        let (engine, _) = engine(mock);

        let err = engine
            .recommend(RecommendRequest::fresh("lofi", None))
            .await
            .unwrap_err();
        assert!(matches!(err, RecommendationError::Config(_)));
    }

    #[test]
    fn test_query_from_history() {
        let (engine, _) = engine(MockProvider::default());

        let recent = vec![
            track("r1", "Arijit Singh"),
            track("r2", "Arijit Singh"),
            track("r3", "Shreya Ghoshal"),
            track("r4", "Unknown Artist"),
        ];
        let history = UserHistorySnapshot {
            recently_played_track_ids: vec!["r1".into(), "r2".into(), "r3".into()],
            user_playlists: vec![Playlist {
                name: "Mine".into(),
                track_ids: vec!["t1".into(), "t2".into()],
                ..Playlist::default()
            }],
        };
        let community = vec![Playlist {
            name: "Bollywood Hits".into(),
            track_ids: vec!["t1".into(), "t3".into()],
            ..Playlist::default()
        }];

        assert_eq!(
            engine.query_from_history(&history, &recent, &community),
            "Arijit Singh | Shreya Ghoshal | Bollywood Hits"
        );
        assert_eq!(
            engine.query_from_history(&UserHistorySnapshot::default(), &[], &[]),
            ""
        );
    }

    #[tokio::test]
    async fn test_discover_merges_queries_and_keeps_first_token() {
        let mock = MockProvider::default()
            .reply("a similar artists", page(vec![track("x1", "A")], None))
            .reply(
                "lofi vibe songs",
                page(vec![track("x2", "B"), track("x1", "A")], Some("L2")),
            )
            .reply("rain playlist", page(vec![track("x3", "C")], Some("R2")));
        let (engine, mock) = engine(mock);

        let request = DiscoverRequest {
            profile: MusicProfile {
                top_artists: vec!["C".into()],
                ..MusicProfile::default()
            },
            queries: vec![
                "a similar artists".into(),
                "lofi vibe songs".into(),
                "rain playlist".into(),
            ],
            ..DiscoverRequest::default()
        };
        let result = engine.discover(request).await.unwrap();

        assert_eq!(ids(&result.tracks), vec!["x3", "x1", "x2"]);
        assert_eq!(result.next_continuation_token, Some(ContinuationToken::new("L2")));
        assert_eq!(result.continuation_query.as_deref(), Some("lofi vibe songs"));
        assert_eq!(mock.calls().len(), 3);
    }

    #[tokio::test]
    async fn test_discover_resumes_single_query() {
        let mock = MockProvider::default()
            .reply("L2", page(vec![track("y1", "A"), track("seen", "A")], None));
        let (engine, mock) = engine(mock);

        let request = DiscoverRequest {
            seen: SeenTracks {
                recently_played_ids: vec!["seen".into()],
                ..SeenTracks::default()
            },
            continuation_token: Some(ContinuationToken::new("L2")),
            continuation_query: Some("lofi vibe songs".into()),
            ..DiscoverRequest::default()
        };
        let result = engine.discover(request).await.unwrap();

        assert_eq!(ids(&result.tracks), vec!["y1"]);
        assert!(result.next_continuation_token.is_none());
        assert!(result.continuation_query.is_none());
        assert_eq!(
            mock.calls(),
            vec![("lofi vibe songs".to_string(), Some("L2".to_string()))]
        );
    }

    #[tokio::test]
    async fn test_discover_without_queries_uses_trending() {
        let mock = MockProvider {
            trending: (0..30).map(|i| track(&format!("t{}", i), "Chart")).collect(),
            ..MockProvider::default()
        };
        let (engine, mock) = engine(mock);

        let result = engine.discover(DiscoverRequest::default()).await.unwrap();
        assert_eq!(result.tracks.len(), TRENDING_FALLBACK_LIMIT);
        assert_eq!(result.tracks[0].id, "t0");
        assert!(result.next_continuation_token.is_none());
        assert!(mock.calls().is_empty());
    }
}
