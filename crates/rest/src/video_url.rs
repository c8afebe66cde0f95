//! Video URL normalization.
//!
//! Known YouTube URL shapes are rewritten to the embeddable
//! `https://www.youtube.com/embed/<id>` form so the frontend can drop them
//! straight into an iframe. Anything unrecognized passes through
//! unchanged.

use url::Url;

fn video_id(parsed: &Url) -> Option<String> {
    let host = parsed.host_str()?.trim_start_matches("www.");
    match host {
        "youtu.be" => parsed
            .path_segments()
            .and_then(|mut segments| segments.next().map(str::to_string))
            .filter(|id| !id.is_empty()),
        "youtube.com" | "m.youtube.com" | "youtube-nocookie.com" => {
            let mut segments = parsed.path_segments()?;
            match segments.next() {
                Some("watch") => parsed
                    .query_pairs()
                    .find(|(k, _)| k == "v")
                    .map(|(_, v)| v.into_owned()),
                Some("embed") | Some("shorts") | Some("v") => {
                    segments.next().map(str::to_string).filter(|id| !id.is_empty())
                }
                _ => None,
            }
        }
        _ => None,
    }
}

/// Rewrites a YouTube URL to its embed form, or returns the input as-is.
pub fn to_youtube_embed(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };
    match video_id(&parsed) {
        Some(id) => format!("https://www.youtube.com/embed/{id}"),
        None => url.to_string(),
    }
}
