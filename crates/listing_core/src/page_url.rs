use url::{form_urlencoded, Url};

/// Query parameter carrying the 1-based listing page number.
pub const PAGE_PARAM: &str = "page";

/// Computes the URL of the next listing page by incrementing the `page` query
/// parameter.
///
/// A missing, empty or non-numeric `page` counts as page 1. The first `page`
/// parameter is rewritten in place (later duplicates are dropped) and a new one
/// is appended when absent. Path, fragment and every other parameter keep their
/// order and their original encoding. Returns `None` when `current` is not an
/// absolute URL or the rewrite would not change it.
pub fn next_page_url(current: &str) -> Option<String> {
    let mut url = Url::parse(current).ok()?;
    let segments: Vec<&str> = url
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|segment| !segment.is_empty())
        .collect();

    let page = segments
        .iter()
        .filter_map(|segment| decoded_pair(segment))
        .find(|(key, value)| key == PAGE_PARAM && !value.is_empty())
        .and_then(|(_, value)| value.trim().parse::<i64>().ok())
        .unwrap_or(1);
    let next = format!("{PAGE_PARAM}={}", page.checked_add(1)?);

    let mut rewritten = Vec::with_capacity(segments.len() + 1);
    let mut replaced = false;
    for segment in segments {
        let is_page = decoded_pair(segment).is_some_and(|(key, _)| key == PAGE_PARAM);
        if !is_page {
            rewritten.push(segment);
        } else if !replaced {
            rewritten.push(next.as_str());
            replaced = true;
        }
    }
    if !replaced {
        rewritten.push(next.as_str());
    }

    let query = rewritten.join("&");
    url.set_query(Some(&query));
    let next_url = String::from(url);
    (next_url != current).then_some(next_url)
}

/// Decoded key and value of one raw `key=value` query segment.
fn decoded_pair(segment: &str) -> Option<(String, String)> {
    form_urlencoded::parse(segment.as_bytes())
        .next()
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
}
