use crate::models::{Track, UNKNOWN_ARTIST};
use std::collections::HashMap;

/// The `count` artists that appear most often in `tracks`.
///
/// Unknown and blank artists are ignored. Artists with the same play count
/// keep the order in which they first appear in `tracks`.
pub fn top_artists(tracks: &[Track], count: usize) -> Vec<String> {
    if count == 0 {
        return Vec::new();
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut tallies: Vec<(&str, usize)> = Vec::new();

    for track in tracks {
        let artist = track.artist.trim();
        if artist.is_empty() || artist == UNKNOWN_ARTIST {
            continue;
        }
        match index.get(artist) {
            Some(&i) => tallies[i].1 += 1,
            None => {
                index.insert(artist, tallies.len());
                tallies.push((artist, 1));
            }
        }
    }

    // Stable: equal counts stay in first-seen order.
    tallies.sort_by(|a, b| b.1.cmp(&a.1));

    tallies
        .into_iter()
        .take(count)
        .map(|(artist, _)| artist.to_string())
        .collect()
}
