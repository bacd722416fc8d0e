//! Decoding of the delimited episode-group encoding.
//!
//! Sources publish episode lists as two parallel strings: a play-from label
//! string and a play-url string. Both use `$$$` between groups; within a
//! group, `#` separates episodes and a single `$` separates an episode's
//! display name from its URL. Group *i* of the label string names group *i*
//! of the URL string. Groups are redundant mirrors across CDNs; exactly one
//! is selected per title.

use serde_json::Value;
use url::Url;

use driftnet_core::urls::absolutize;

use crate::extract::field_string;
use crate::types::Episode;

/// Placeholder name for an episode token without a `$` separator.
pub const DEFAULT_EPISODE_NAME: &str = "Episode 1";

/// Decodes the play-list encoding of a detail item and selects one group.
///
/// Groups whose label mentions `m3u8` (case-insensitive) sort first via a
/// stable sort; the first group that yields at least one episode after
/// parsing wins and later groups are never consulted. When only a URL
/// string exists with no aligned labels it is treated as a single implicit
/// group. Episode URLs are absolutized against the source base.
pub fn decode_play_groups(item: &Value, base: &Url) -> Vec<Episode> {
    let play_from = field_string(item, &["vod_play_from", "play_from", "play_from_name"]);
    let play_url = field_string(item, &["vod_play_url", "play_url", "play_url_name"]);

    let labels = split_groups(&play_from);
    let url_groups = split_groups(&play_url);

    let mut groups: Vec<(String, String)> = labels
        .iter()
        .enumerate()
        .map(|(index, label)| {
            (
                label.to_lowercase(),
                url_groups.get(index).cloned().unwrap_or_default(),
            )
        })
        .collect();

    // No aligned labels at all: fall back to the first URL group alone.
    if groups.iter().all(|(_, raw)| raw.is_empty()) && !url_groups.is_empty() {
        groups = vec![(String::new(), url_groups[0].clone())];
    }

    groups.sort_by_key(|(label, _)| !label.contains("m3u8"));

    for (_, raw) in &groups {
        let episodes = decode_group(raw, base);
        if !episodes.is_empty() {
            return episodes;
        }
    }
    Vec::new()
}

fn split_groups(raw: &str) -> Vec<String> {
    raw.split("$$$")
        .map(str::trim)
        .filter(|group| !group.is_empty())
        .map(str::to_string)
        .collect()
}

fn decode_group(raw: &str, base: &Url) -> Vec<Episode> {
    raw.split('#')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| {
            let (name, url) = match token.find('$') {
                Some(position) => (token[..position].trim(), token[position + 1..].trim()),
                None => ("", token),
            };
            if url.is_empty() {
                return None;
            }
            let name = if name.is_empty() {
                DEFAULT_EPISODE_NAME
            } else {
                name
            };
            Some(Episode {
                name: name.to_string(),
                url: absolutize(url, base),
            })
        })
        .collect()
}
