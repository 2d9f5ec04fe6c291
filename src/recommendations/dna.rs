//! Playlist DNA: community playlists that share tracks with the user's own.

use crate::models::Playlist;
use std::collections::HashSet;

/// Names of the `count` community playlists sharing the most tracks with
/// `user_playlists`, best match first.
///
/// Playlists with no shared track are dropped. Equal scores keep the order
/// of `community_playlists`.
pub fn dna_queries(
    user_playlists: &[Playlist],
    community_playlists: &[Playlist],
    count: usize,
) -> Vec<String> {
    if user_playlists.is_empty() || community_playlists.is_empty() || count == 0 {
        return Vec::new();
    }

    let user_track_ids: HashSet<&str> = user_playlists
        .iter()
        .flat_map(|p| p.track_ids.iter().map(String::as_str))
        .collect();
    if user_track_ids.is_empty() {
        return Vec::new();
    }

    let mut matches: Vec<(&str, usize)> = community_playlists
        .iter()
        .filter_map(|playlist| {
            let match_count = playlist
                .track_ids
                .iter()
                .filter(|id| user_track_ids.contains(id.as_str()))
                .count();
            (match_count > 0).then_some((playlist.name.as_str(), match_count))
        })
        .collect();

    matches.sort_by(|a, b| b.1.cmp(&a.1));

    log::debug!(
        "Playlist DNA: {} of {} community playlists overlap",
        matches.len(),
        community_playlists.len()
    );

    matches
        .into_iter()
        .take(count)
        .map(|(name, _)| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(name: &str, track_ids: &[&str]) -> Playlist {
        Playlist {
            id: name.to_lowercase().replace(' ', "-"),
            name: name.to_string(),
            track_ids: track_ids.iter().map(|s| s.to_string()).collect(),
            ..Playlist::default()
        }
    }

    #[test]
    fn test_empty_inputs() {
        let community = vec![playlist("P", &["t1"])];
        assert!(dna_queries(&[], &community, 3).is_empty());

        let mine = vec![playlist("Mine", &["t1"])];
        assert!(dna_queries(&mine, &[], 3).is_empty());
    }

    #[test]
    fn test_single_shared_track_matches() {
        let mine = vec![playlist("Mine", &["t1", "t2"])];
        let community = vec![playlist("P", &["t1", "t3"])];
        assert_eq!(dna_queries(&mine, &community, 1), vec!["P"]);
    }

    #[test]
    fn test_ranks_by_match_count() {
        let mine = vec![
            playlist("Gym", &["a", "b", "c"]),
            playlist("Chill", &["d", "e"]),
        ];
        let community = vec![
            playlist("One Match", &["a", "x"]),
            playlist("No Match", &["x", "y"]),
            playlist("Three Matches", &["a", "d", "e", "z"]),
            playlist("Two Matches", &["b", "c"]),
        ];

        assert_eq!(
            dna_queries(&mine, &community, 5),
            vec!["Three Matches", "Two Matches", "One Match"]
        );
        assert_eq!(dna_queries(&mine, &community, 2), vec!["Three Matches", "Two Matches"]);
    }

    #[test]
    fn test_ties_keep_community_order() {
        let mine = vec![playlist("Mine", &["a", "b"])];
        let community = vec![
            playlist("Second", &["b"]),
            playlist("First", &["a"]),
        ];
        assert_eq!(dna_queries(&mine, &community, 2), vec!["Second", "First"]);
    }

    #[test]
    fn test_user_playlists_without_tracks() {
        let mine = vec![playlist("Empty", &[])];
        let community = vec![playlist("P", &["t1"])];
        assert!(dna_queries(&mine, &community, 3).is_empty());
    }
}
