//! Display titles for album keys.
//!
//! Albums are identified by their object prefix in the bucket, e.g.
//! `010-Landscapes/` or `2023/020-Road-Trip/`. The display title follows the
//! `NNN-name` convention: the numeric prefix of the last segment only orders
//! albums in the bucket listing and is not shown.
//!
//! - `010-Landscapes/` → "Landscapes"
//! - `2023/020-Road-Trip/` → "Road Trip"
//! - `wip-drafts` → "wip drafts"
//! - `001` → "001" (a bare number is kept as the title)

/// Last non-empty `/`-separated segment of an album key.
pub fn album_segment(key: &str) -> &str {
    key.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or_default()
}

/// Split an `NNN-name` segment into its number and name.
///
/// Returns `None` for the number when the segment has no numeric prefix.
pub fn split_number_prefix(segment: &str) -> (Option<u32>, &str) {
    match segment.split_once('-') {
        Some((prefix, rest)) if !prefix.is_empty() => match prefix.parse::<u32>() {
            Ok(number) => (Some(number), rest),
            Err(_) => (None, segment),
        },
        _ => (None, segment),
    }
}

/// Human-readable title for an album key.
pub fn display_title(key: &str) -> String {
    let segment = album_segment(key);
    let (_, name) = split_number_prefix(segment);
    if name.is_empty() {
        return segment.trim_end_matches('-').to_string();
    }
    name.replace('-', " ")
}
