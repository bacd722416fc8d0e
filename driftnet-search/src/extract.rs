//! Tolerant extraction of catalog entries from heterogeneous upstream JSON.
//!
//! Sources expose unrelated schemas: some answer with a bare array, some
//! wrap it under one of half a dozen keys, and detail endpoints may return a
//! single bare object. Extraction tries an explicit ordered list of
//! candidate shapes and never branches on source identity.

use serde_json::Value;

use driftnet_core::catalog::SourceDefinition;
use driftnet_core::urls::absolutize;

use crate::types::CatalogItem;

/// Keys that may wrap the entry list, tried in order.
const LIST_KEYS: &[&str] = &["list", "data", "result", "res", "vod_list", "vodlist", "vod"];

/// Extracts candidate catalog entries from an upstream search payload.
///
/// Accepts a top-level array, any known wrapper key, or - last resort - the
/// first array-valued field whose elements look like catalog entries by
/// duck-shape (a `name`-like field). Returns an empty vec for anything else.
pub fn extract_entries(payload: &Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items.clone(),
        Value::Object(map) => {
            for key in LIST_KEYS {
                if let Some(Value::Array(items)) = map.get(*key) {
                    return items.clone();
                }
            }
            for value in map.values() {
                if let Value::Array(items) = value {
                    if items.first().is_some_and(looks_like_entry) {
                        return items.clone();
                    }
                }
            }
            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// Extracts the single detail item from a detail payload.
///
/// Supports list-wrapped (`list`/`data`), single-object-wrapped
/// (`vod`/`info`), and bare single-object documents.
pub fn extract_detail_item(payload: &Value) -> Option<Value> {
    for key in ["list", "data"] {
        if let Some(Value::Array(items)) = payload.get(key) {
            if let Some(first) = items.first() {
                return Some(first.clone());
            }
        }
    }
    for key in ["vod", "info"] {
        if let Some(single) = payload.get(key) {
            if single.is_object() {
                return Some(single.clone());
            }
        }
    }
    if payload.get("vod_id").is_some() || payload.get("vod_name").is_some() {
        return Some(payload.clone());
    }
    None
}

fn looks_like_entry(value: &Value) -> bool {
    value.get("vod_name").is_some() || value.get("name").is_some()
}

/// First non-empty value among the candidate keys, coercing numbers to
/// strings the way the upstream schemas mix them.
pub(crate) fn field_string(item: &Value, keys: &[&str]) -> String {
    for key in keys {
        match item.get(*key) {
            Some(Value::String(text)) if !text.is_empty() => return text.clone(),
            Some(Value::Number(number)) => return number.to_string(),
            _ => {}
        }
    }
    String::new()
}

/// Normalizes one raw upstream entry into the shared result shape.
pub fn normalize_entry(item: &Value, source: &SourceDefinition) -> CatalogItem {
    let title = field_string(item, &["name", "vod_name", "title"]);
    let raw_cover = field_string(item, &["pic", "vod_pic", "cover", "img"]);
    let id = {
        let explicit = field_string(item, &["id", "vod_id", "sid"]);
        if explicit.is_empty() {
            format!("{}-{}", source.name, title)
        } else {
            explicit
        }
    };

    CatalogItem {
        source: source.name.clone(),
        title,
        cover: absolutize(&raw_cover, &source.base),
        year: field_string(item, &["year", "vod_year", "publish_year"]),
        category: field_string(item, &["type", "type_name", "vod_class"]),
        remarks: field_string(item, &["note", "vod_remarks", "remarks"]),
        id,
    }
}
