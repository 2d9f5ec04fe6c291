//! Taste profile and scoring for the multi-query discovery feed.

use super::affinity::top_artists;
use super::dna::dna_queries;
use super::types::{MusicProfile, SeenTracks};
use crate::library::dedup::unique_by_id;
use crate::models::{Playlist, Track};
use std::collections::{HashMap, HashSet};

pub const PROFILE_ARTIST_COUNT: usize = 3;
pub const PROFILE_KEYWORD_COUNT: usize = 5;
pub const PROFILE_DNA_COUNT: usize = 3;

/// Anything shorter is a short, intro or jingle.
pub const MIN_DURATION_SECONDS: u64 = 60;

/// Titles containing these are rarely the original recording.
pub const TITLE_BLACKLIST: &[&str] = &["karaoke", "instrumental", "cover", "live", "tutorial", "lyrics"];

const KEYWORD_STOPWORDS: &[&str] = &["song", "music", "video", "official", "lyrics", "audio", "hd"];
const MIN_KEYWORD_LEN: usize = 3;

const ARTIST_SCORE: u32 = 4;
const KEYWORD_SCORE: u32 = 3;
const GENRE_SCORE: u32 = 2;

/// Most frequent meaningful words across past searches.
///
/// Words shorter than three characters, plain numbers and filler like
/// "official" or "lyrics" are skipped. Ties keep first-seen order.
pub fn extract_keywords(searches: &[String], count: usize) -> Vec<String> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut tallies: Vec<(String, usize)> = Vec::new();

    for search in searches {
        for word in search.to_lowercase().split_whitespace() {
            if word.chars().count() < MIN_KEYWORD_LEN
                || KEYWORD_STOPWORDS.contains(&word)
                || word.parse::<f64>().is_ok_and(f64::is_finite)
            {
                continue;
            }
            match index.get(word) {
                Some(&i) => tallies[i].1 += 1,
                None => {
                    index.insert(word.to_string(), tallies.len());
                    tallies.push((word.to_string(), 1));
                }
            }
        }
    }

    tallies.sort_by(|a, b| b.1.cmp(&a.1));
    tallies.into_iter().take(count).map(|(w, _)| w).collect()
}

pub fn build_profile(
    recent_tracks: &[Track],
    search_history: &[String],
    user_playlists: &[Playlist],
    community_playlists: &[Playlist],
) -> MusicProfile {
    let top_artists = top_artists(recent_tracks, PROFILE_ARTIST_COUNT);
    let top_keywords = extract_keywords(search_history, PROFILE_KEYWORD_COUNT);
    let dna = dna_queries(user_playlists, community_playlists, PROFILE_DNA_COUNT);

    let mut seen = HashSet::new();
    let dominant_genres = top_keywords
        .iter()
        .chain(dna.iter())
        .filter(|g| seen.insert(g.as_str()))
        .cloned()
        .collect();

    MusicProfile {
        top_artists,
        top_keywords,
        dominant_genres,
    }
}

/// Search queries derived from a profile, without duplicates.
pub fn profile_queries(profile: &MusicProfile) -> Vec<String> {
    let mut queries = Vec::new();

    if let Some(artist) = profile.top_artists.first() {
        queries.push(format!("{} similar artists", artist));
        if let Some(keyword) = profile.top_keywords.first() {
            queries.push(format!("{} {} music", artist, keyword));
        }
    }
    queries.extend(profile.top_keywords.iter().map(|kw| format!("{} vibe songs", kw)));
    queries.extend(profile.dominant_genres.iter().map(|g| format!("{} playlist", g)));

    let mut seen = HashSet::new();
    queries.retain(|q| seen.insert(q.clone()));
    queries
}

fn is_blacklisted(title: &str) -> bool {
    let lower = title.to_lowercase();
    TITLE_BLACKLIST.iter().any(|word| lower.contains(word))
}

fn score(track: &Track, profile: &MusicProfile) -> u32 {
    let title = track.title.to_lowercase();
    let artist = track.artist.to_lowercase();
    let mut score = 0;

    if profile
        .top_artists
        .iter()
        .any(|a| artist.contains(&a.to_lowercase()))
    {
        score += ARTIST_SCORE;
    }
    if profile
        .top_keywords
        .iter()
        .any(|k| title.contains(&k.to_lowercase()))
    {
        score += KEYWORD_SCORE;
    }
    if profile
        .dominant_genres
        .iter()
        .any(|g| title.contains(&g.to_lowercase()))
    {
        score += GENRE_SCORE;
    }

    score
}

/// Drop seen, too-short and blacklisted tracks, then order the rest by how
/// well they match the profile. Equal scores keep their input order.
pub fn rank_and_filter(tracks: Vec<Track>, profile: &MusicProfile, seen: &SeenTracks) -> Vec<Track> {
    let seen_ids: HashSet<&str> = seen
        .recently_played_ids
        .iter()
        .chain(seen.liked_song_ids.iter())
        .map(String::as_str)
        .collect();

    let mut scored: Vec<(u32, Track)> = unique_by_id(tracks)
        .into_iter()
        .filter(|t| {
            !seen_ids.contains(t.id.as_str())
                && t.duration_seconds >= MIN_DURATION_SECONDS
                && !is_blacklisted(&t.title)
        })
        .map(|t| (score(&t, profile), t))
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, t)| t).collect()
}
