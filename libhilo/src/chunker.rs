//! Splitting free text into post-sized chunks.

/// Split `text` into chunks of at most `limit` characters.
///
/// Breaks at the last space inside the window whenever possible and falls
/// back to a hard cut when a single run of text is longer than `limit`.
/// Every chunk is trimmed; empty input yields no chunks. Lengths are
/// measured in unicode characters, not bytes.
pub fn split_into_chunks(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut rest = text.trim().to_string();

    while rest.chars().count() > limit {
        // Byte offset just past the first `limit` characters.
        let window_end = rest
            .char_indices()
            .nth(limit)
            .map(|(offset, _)| offset)
            .unwrap_or(rest.len());
        let split_at = rest[..window_end].rfind(' ').unwrap_or(window_end);

        chunks.push(rest[..split_at].trim().to_string());
        rest = rest[split_at..].trim().to_string();
    }

    if !rest.is_empty() {
        chunks.push(rest);
    }
    chunks
}
