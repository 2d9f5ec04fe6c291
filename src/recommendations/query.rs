use std::collections::HashSet;

/// Separator between terms in a composed search query.
pub const QUERY_DELIMITER: &str = " | ";

/// Join artist names and DNA queries into one search query.
///
/// Artists come first, then DNA names; duplicates and blank terms are
/// dropped, keeping the first occurrence. An empty result means there is
/// nothing to search for.
pub fn compose(artists: &[String], dna_queries: &[String]) -> String {
    let mut seen: HashSet<&str> = HashSet::new();

    artists
        .iter()
        .chain(dna_queries)
        .map(|term| term.trim())
        .filter(|term| !term.is_empty() && seen.insert(*term))
        .collect::<Vec<_>>()
        .join(QUERY_DELIMITER)
}
