// Query-string codec for dashboard filters and outbound links.
//
// `parse_query` deliberately does NOT percent-decode values; callers that need decoded text
// (UTM source/campaign) go through `decode_component`.

use percent_encoding::percent_decode_str;

/// Ordered flat mapping of query keys to raw values.
pub type QueryMap = Vec<(String, String)>;

/// One fragment passed to `build_query`; `None` removes the key.
pub type QueryFragment = Vec<(String, Option<String>)>;

/// Parse a location search string (`?a=1&b=2`) into key/value pairs.
///
/// Splits on `&`, then on the first `=`; later `=` characters stay in the value. Duplicate keys
/// keep the last value, at the position of their first occurrence.
pub fn parse_query(search: &str) -> QueryMap {
    let qs = search.strip_prefix('?').unwrap_or(search);
    let mut parsed: QueryMap = Vec::new();

    for opt in qs.split('&') {
        if opt.is_empty() {
            continue;
        }
        let (key, value) = match opt.split_once('=') {
            Some((k, v)) => (k, v),
            None => (opt, ""),
        };
        upsert(&mut parsed, key, value.to_string());
    }

    parsed
}

/// Look up one key in a parsed query.
pub fn get<'a>(query: &'a QueryMap, key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

/// Lift a parsed query into a fragment suitable for `merge_query`.
pub fn as_fragment(query: &QueryMap) -> QueryFragment {
    query
        .iter()
        .map(|(k, v)| (k.clone(), Some(v.clone())))
        .collect()
}

/// Merge fragments left to right; later fragments win. Keys whose final value is `None` are
/// dropped.
pub fn merge_query(fragments: &[QueryFragment]) -> QueryMap {
    let mut total: Vec<(String, Option<String>)> = Vec::new();
    for fragment in fragments {
        for (key, value) in fragment {
            match total.iter_mut().find(|(k, _)| k == key) {
                Some(slot) => slot.1 = value.clone(),
                None => total.push((key.clone(), value.clone())),
            }
        }
    }

    total
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k, v)))
        .collect()
}

/// Serialize merged fragments to a location search string (with leading `?`).
pub fn build_query(fragments: &[QueryFragment]) -> String {
    let parts: Vec<String> = merge_query(fragments)
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect();
    format!("?{}", parts.join("&"))
}

/// Host hook for applying a new search string.
///
/// In a browser this is a full page load; the terminal host reloads its filter state.
pub trait QueryNavigator {
    fn navigate(&mut self, search: &str);
}

/// Percent-decode a single query value. Invalid UTF-8 sequences are replaced.
pub fn decode_component(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

fn upsert(map: &mut QueryMap, key: &str, value: String) {
    match map.iter_mut().find(|(k, _)| k == key) {
        Some(slot) => slot.1 = value,
        None => map.push((key.to_string(), value)),
    }
}
