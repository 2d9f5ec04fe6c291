use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use streamtune::commands::{self, DiscoverInput, RecommendationsInput};
use streamtune::models::{ContinuationToken, Playlist, UserHistorySnapshot};
use streamtune::playlist::{PlaylistDraft, SongSuggestion};
use streamtune::providers::types::ProviderId;
use streamtune::{AppState, Settings};

/// StreamTune: recommendations from your listening history.
///
/// Results are printed as JSON. `YOUTUBE_API_KEY` must be set.
#[derive(Parser)]
#[command(name = "streamtune", version)]
struct Args {
    /// Search backend, overriding STREAMTUNE_BACKEND
    #[arg(long, global = true)]
    backend: Option<ProviderId>,

    /// Keep caches and search history in memory only
    #[arg(long, global = true)]
    no_cache: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search for tracks
    Search {
        query: String,
        /// Continuation token from a previous page
        #[arg(long)]
        token: Option<String>,
    },
    /// Popular music right now
    Trending,
    /// One page of the recommendation feed
    Recommend {
        /// Use this query instead of composing one from history
        #[arg(long)]
        query: Option<String>,
        #[arg(long)]
        token: Option<String>,
        /// JSON file holding a user history snapshot
        #[arg(long)]
        history: Option<PathBuf>,
        /// JSON file holding community playlists
        #[arg(long)]
        community: Option<PathBuf>,
    },
    /// One page of the multi-query discovery feed
    Discover {
        #[arg(long)]
        history: Option<PathBuf>,
        #[arg(long)]
        community: Option<PathBuf>,
        /// Liked track ids, comma separated
        #[arg(long, value_delimiter = ',')]
        liked: Vec<String>,
        #[arg(long)]
        token: Option<String>,
        /// Query that produced --token
        #[arg(long, requires = "token")]
        continuation_query: Option<String>,
    },
    /// Tracks of a YouTube playlist
    PlaylistTracks { playlist_id: String },
    /// Public playlists of a YouTube channel
    ChannelPlaylists { channel_id: String },
    /// Build a playlist from a JSON list of {title, artist} songs
    GeneratePlaylist {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        songs: PathBuf,
        #[arg(long)]
        public: bool,
    },
    /// Show or clear recent searches
    History {
        #[arg(long)]
        clear: bool,
    },
    /// List registered search backends
    Providers,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

fn read_optional<T: DeserializeOwned + Default>(path: Option<&Path>) -> Result<T> {
    path.map(read_json).transpose().map(Option::unwrap_or_default)
}

fn print<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut settings = Settings::from_env()?;
    if let Some(backend) = args.backend {
        settings.backend = backend;
    }

    let state = if args.no_cache {
        AppState::ephemeral(settings).await?
    } else {
        AppState::init(settings).await?
    };

    match args.command {
        Command::Search { query, token } => {
            let page = commands::search_tracks(&state, &query, token.map(ContinuationToken::new)).await?;
            print(&page)
        }
        Command::Trending => print(&commands::get_trending(&state).await?),
        Command::Recommend {
            query,
            token,
            history,
            community,
        } => {
            let user_history: Option<UserHistorySnapshot> =
                history.as_deref().map(read_json).transpose()?;
            let input = RecommendationsInput {
                query,
                continuation_token: token.map(ContinuationToken::new),
                user_history,
                community_playlists: read_optional::<Vec<Playlist>>(community.as_deref())?,
            };
            print(&commands::get_recommendations(&state, input).await?)
        }
        Command::Discover {
            history,
            community,
            liked,
            token,
            continuation_query,
        } => {
            let input = DiscoverInput {
                user_history: read_optional(history.as_deref())?,
                liked_song_ids: liked,
                community_playlists: read_optional(community.as_deref())?,
                continuation_token: token.map(ContinuationToken::new),
                continuation_query,
            };
            print(&commands::discover(&state, input).await?)
        }
        Command::PlaylistTracks { playlist_id } => {
            print(&commands::get_playlist_tracks(&state, &playlist_id).await?)
        }
        Command::ChannelPlaylists { channel_id } => {
            print(&commands::get_channel_playlists(&state, &channel_id).await?)
        }
        Command::GeneratePlaylist {
            name,
            description,
            songs,
            public,
        } => {
            let songs: Vec<SongSuggestion> = read_json(&songs)?;
            let draft = PlaylistDraft {
                id: format!("ai-{}", chrono::Utc::now().timestamp_millis()),
                name,
                description,
                owner_id: None,
                is_public: public,
            };
            let (playlist, tracks) = commands::generate_playlist(&state, draft, &songs).await?;
            print(&serde_json::json!({ "playlist": playlist, "tracks": tracks }))
        }
        Command::History { clear } => {
            if clear {
                commands::clear_search_history(&state).await?;
            }
            print(&commands::get_search_history(&state).await?)
        }
        Command::Providers => {
            let active = commands::get_active_provider(&state).await;
            print(&serde_json::json!({
                "providers": commands::list_providers(&state).await,
                "active": active,
            }))
        }
    }
}
