//! Trailer URL <-> media center playback URI.
//!
//! Media centers cannot stream YouTube or the hd-trailers hosts directly, so
//! sidecars store a plugin URI instead of the web URL.

const YOUTUBE_PLUGIN: &str = "plugin://plugin.video.youtube/?action=play_video&videoid=";
const HD_TRAILERS_PLUGIN: &str = "plugin://plugin.video.hdtrailers_net/video/";

/// Hosts served by the hd-trailers plugin (subdomains included).
const HD_TRAILER_HOSTS: &[&str] = &[
    "apple.com",
    "yahoo.com",
    "moviefone.com",
    "ign.com",
    "hd-trailers.net",
    "aol.com",
];

const YOUTUBE_HOSTS: &[&str] = &["youtube.com", "youtube-nocookie.com"];

/// Convert a trailer URL to the form stored in sidecars.
///
/// Applying it to its own output returns the output unchanged.
pub fn to_playback_uri(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("plugin://") {
        return url.to_string();
    }
    if let Some(id) = youtube_id(url) {
        return format!("{YOUTUBE_PLUGIN}{id}");
    }
    if let Some(family) = host(url).and_then(|h| hd_trailer_family(&h)) {
        return format!("{HD_TRAILERS_PLUGIN}{family}/{}", urlencoding::encode(url));
    }
    url.to_string()
}

/// Convert a stored sidecar value back to a web URL.
pub fn from_playback_uri(uri: &str) -> String {
    let uri = uri.trim();
    if let Some(id) = uri.strip_prefix(YOUTUBE_PLUGIN) {
        return format!("http://www.youtube.com/watch?v={id}");
    }
    if let Some(rest) = uri.strip_prefix(HD_TRAILERS_PLUGIN)
        && let Some((_, encoded)) = rest.split_once('/')
        && let Ok(decoded) = urlencoding::decode(encoded)
    {
        return decoded.into_owned();
    }
    uri.to_string()
}

/// Lowercased host of an http(s) URL.
fn host(url: &str) -> Option<String> {
    let lower = url.to_ascii_lowercase();
    let rest = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))?;
    let authority = rest.split(['/', '?', '#']).next()?;
    // Drop userinfo and port
    let authority = authority.rsplit('@').next()?;
    let host = authority.split(':').next()?;
    (!host.is_empty()).then(|| host.to_string())
}

fn on_domain(host: &str, domain: &str) -> bool {
    host == domain
        || host
            .strip_suffix(domain)
            .is_some_and(|prefix| prefix.ends_with('.'))
}

fn hd_trailer_family(host: &str) -> Option<&'static str> {
    HD_TRAILER_HOSTS.iter().copied().find(|d| on_domain(host, d))
}

fn is_video_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Video id of a YouTube watch, short-link, shorts or embed URL.
fn youtube_id(url: &str) -> Option<String> {
    let host = host(url)?;
    // Path and query keep their original case
    let after_scheme = &url[url.find("://")? + 3..];
    let path_and_query = after_scheme
        .find('/')
        .map(|i| &after_scheme[i..])
        .unwrap_or("");
    let (path, query) = match path_and_query.split_once('?') {
        Some((p, q)) => (p, q.split('#').next().unwrap_or("")),
        None => (path_and_query.split('#').next().unwrap_or(""), ""),
    };

    let id = if host == "youtu.be" {
        path.trim_start_matches('/').split('/').next()?
    } else if YOUTUBE_HOSTS.iter().any(|d| on_domain(&host, d)) {
        if path == "/watch" || path == "/watch/" {
            query
                .split('&')
                .find_map(|pair| pair.strip_prefix("v="))?
        } else {
            ["/embed/", "/v/", "/shorts/"]
                .iter()
                .find_map(|prefix| path.strip_prefix(prefix))?
                .split('/')
                .next()?
        }
    } else {
        return None;
    };

    is_video_id(id).then(|| id.to_string())
}
