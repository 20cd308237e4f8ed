//! Video URL validation.
//!
//! The conversion service only handles a fixed set of video-host domains.
//! Validation fails closed: input that does not parse as a URL, or whose
//! hostname is not on the allow-list, is rejected. Hostname matching is
//! exact or suffix-based; plain substring checks are spoofable
//! (`evilyoutube.com.attacker.net` contains `youtube.com`) and are
//! deliberately not used.

use url::Url;

/// Hostnames accepted as-is.
const ALLOWED_HOSTS: [&str; 4] = [
    "youtube.com",
    "www.youtube.com",
    "youtu.be",
    "m.youtube.com",
];

/// The short-link host gets no subdomain tolerance; everything else on the
/// allow-list does (`music.youtube.com`, `tv.youtube.com`, ...).
const SHORT_LINK_HOST: &str = "youtu.be";

/// Returns true when `input` parses as a URL and its hostname equals an
/// allow-listed host or is a subdomain of a non-short-link entry.
///
/// Never panics; malformed input is simply classified invalid.
pub fn is_supported_url(input: &str) -> bool {
    let parsed = match Url::parse(input) {
        Ok(u) => u,
        Err(_) => return false,
    };
    match parsed.host_str() {
        Some(host) => host_is_allowed(&host.to_ascii_lowercase()),
        None => false,
    }
}

fn host_is_allowed(host: &str) -> bool {
    if ALLOWED_HOSTS.contains(&host) {
        return true;
    }
    ALLOWED_HOSTS
        .iter()
        .filter(|h| **h != SHORT_LINK_HOST)
        .any(|h| {
            host.len() > h.len() + 1
                && host.ends_with(h)
                && host.as_bytes()[host.len() - h.len() - 1] == b'.'
        })
}
