//! Parser for the Plain-Thread v1 text format.
//!
//! The format is a sequence of numbered blocks:
//!
//! ```text
//! 1
//!
//! body of the first post
//!
//! 2
//!
//! body of the second post
//! ```
//!
//! A marker is a line of decimal digits followed by exactly one blank line;
//! everything up to the next marker (or the end of the text) is that post's
//! body. Validation is all-or-nothing: any gap, duplicate or out-of-order
//! index, empty body, or over-limit body fails the whole parse.

use crate::error::{FormatError, Result};
use crate::types::MAX_POST_LEN;

struct Marker {
    start: usize,
    body_start: usize,
    index: usize,
}

/// Parse a Plain-Thread v1 string into the ordered post bodies.
pub fn parse_plain_thread(raw: &str) -> Result<Vec<String>> {
    // Normalize line endings and pin a trailing newline so a marker at the
    // end of the text still terminates cleanly.
    let data = format!("{}\n", raw.replace("\r\n", "\n").trim());
    let bytes = data.as_bytes();

    let mut markers: Vec<Marker> = Vec::new();
    let mut line_start = 0;
    while line_start < data.len() {
        let line_end = data[line_start..]
            .find('\n')
            .map(|i| line_start + i)
            .unwrap_or(data.len());
        let line = &data[line_start..line_end];
        if !line.is_empty()
            && line.bytes().all(|b| b.is_ascii_digit())
            && bytes.get(line_end + 1) == Some(&b'\n')
        {
            if let Ok(index) = line.parse::<usize>() {
                markers.push(Marker {
                    start: line_start,
                    body_start: line_end + 2,
                    index,
                });
            }
        }
        line_start = line_end + 1;
    }

    if markers.is_empty() {
        return Err(FormatError::NoMarkers.into());
    }

    let found: Vec<usize> = markers.iter().map(|m| m.index).collect();
    let expected: Vec<usize> = (1..=markers.len()).collect();
    if found != expected {
        return Err(FormatError::BadIndices {
            found,
            expected: markers.len(),
        }
        .into());
    }

    let mut bodies = Vec::with_capacity(markers.len());
    for (i, marker) in markers.iter().enumerate() {
        let body_end = markers
            .get(i + 1)
            .map(|next| next.start)
            .unwrap_or(data.len());
        let body = data[marker.body_start..body_end].trim();
        if body.is_empty() {
            return Err(FormatError::EmptyPost(marker.index).into());
        }
        let length = body.chars().count();
        if length > MAX_POST_LEN {
            return Err(FormatError::TooLong {
                index: marker.index,
                length,
                limit: MAX_POST_LEN,
            }
            .into());
        }
        bodies.push(body.to_string());
    }

    Ok(bodies)
}
