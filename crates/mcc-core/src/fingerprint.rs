//! Browser-header fingerprint synthesis.
//!
//! The conversion service expects requests that look like they came from a
//! real browser, so every submission carries a fixed-key header map derived
//! from an impersonation profile: user agent, preferred language, screen
//! geometry, timezone, and color depth. Every lookup has a safe fallback;
//! collection is synchronous and never fails.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

/// Desktop Chrome on Linux, used when the profile does not override the UA.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

const DEFAULT_LANGUAGE: &str = "en-US";
const DEFAULT_TIMEZONE: &str = "UTC";
const DEFAULT_SCREEN: (u32, u32) = (1920, 1080);
const DEFAULT_COLOR_DEPTH: u32 = 24;

/// Chromium major version reported when none can be extracted from the UA.
const FALLBACK_MAJOR_VERSION: &str = "120";

static MOBILE_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)mobile|android|iphone|ipad|ipod|blackberry|opera mini|iemobile").unwrap()
});

static EDGE_MAJOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Edg/(\d+)").unwrap());

static CHROME_MAJOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Chrome/(\d+)").unwrap());

/// Impersonation profile the header map is derived from.
///
/// `language` and `timezone` fall back to the process environment when unset
/// (`LC_ALL`/`LANG` and `TZ`/`/etc/timezone` respectively), then to fixed
/// defaults; screen geometry and color depth default to a common desktop.
#[derive(Debug, Clone)]
pub struct FingerprintProfile {
    pub user_agent: String,
    pub language: Option<String>,
    pub timezone: Option<String>,
    pub screen_width: u32,
    pub screen_height: u32,
    pub color_depth: u32,
}

impl Default for FingerprintProfile {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            language: None,
            timezone: None,
            screen_width: DEFAULT_SCREEN.0,
            screen_height: DEFAULT_SCREEN.1,
            color_depth: DEFAULT_COLOR_DEPTH,
        }
    }
}

impl FingerprintProfile {
    /// Builds the fixed-key header map for this profile.
    pub fn collect(&self) -> BTreeMap<String, String> {
        let ua = self.user_agent.as_str();
        let mut headers = BTreeMap::new();
        headers.insert("User-Agent".to_string(), ua.to_string());
        headers.insert(
            "Accept-Language".to_string(),
            self.language.clone().unwrap_or_else(language_from_env),
        );
        headers.insert("Sec-CH-UA".to_string(), sec_ch_ua(ua));
        headers.insert("Sec-CH-UA-Mobile".to_string(), mobile_flag(ua).to_string());
        headers.insert(
            "Sec-CH-UA-Platform".to_string(),
            platform_label(ua).to_string(),
        );
        headers.insert(
            "Screen-Resolution".to_string(),
            format!("{}x{}", self.screen_width, self.screen_height),
        );
        headers.insert(
            "Timezone".to_string(),
            self.timezone.clone().unwrap_or_else(timezone_from_env),
        );
        headers.insert("Color-Depth".to_string(), self.color_depth.to_string());
        headers
    }
}

/// Synthesizes a `Sec-CH-UA` value from the user-agent string.
///
/// Chromium-family browsers (Edge before Chrome, since Edge UAs contain both
/// tokens) get a quoted brand list with the major version extracted from the
/// UA (or a fixed fallback). Firefox and Safari do not emit this header
/// natively, so they yield an empty string, as does anything unrecognized.
pub fn sec_ch_ua(user_agent: &str) -> String {
    if user_agent.contains("Edg/") {
        let v = EDGE_MAJOR
            .captures(user_agent)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .unwrap_or(FALLBACK_MAJOR_VERSION);
        return format!(
            "\"Not_A Brand\";v=\"8\", \"Chromium\";v=\"{v}\", \"Microsoft Edge\";v=\"{v}\""
        );
    }
    if user_agent.contains("Chrome/") {
        let v = CHROME_MAJOR
            .captures(user_agent)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
            .unwrap_or(FALLBACK_MAJOR_VERSION);
        return format!(
            "\"Not_A Brand\";v=\"8\", \"Chromium\";v=\"{v}\", \"Google Chrome\";v=\"{v}\""
        );
    }
    // Firefox, Safari, and anything else: no client hints.
    String::new()
}

/// `Sec-CH-UA-Mobile` flag: `"?1"` when the UA carries a known mobile token.
pub fn mobile_flag(user_agent: &str) -> &'static str {
    if MOBILE_TOKENS.is_match(user_agent) {
        "?1"
    } else {
        "?0"
    }
}

/// `Sec-CH-UA-Platform` label (quoted, as browsers send it).
///
/// Android UAs also contain "Linux", so Android is checked first.
pub fn platform_label(user_agent: &str) -> &'static str {
    if user_agent.contains("Windows") {
        "\"Windows\""
    } else if user_agent.contains("Mac OS X") || user_agent.contains("Macintosh") {
        "\"macOS\""
    } else if user_agent.contains("Android") {
        "\"Android\""
    } else if user_agent.contains("iPhone")
        || user_agent.contains("iPad")
        || user_agent.contains("iPod")
    {
        "\"iOS\""
    } else if user_agent.contains("CrOS") {
        "\"Chrome OS\""
    } else if user_agent.contains("Linux") {
        "\"Linux\""
    } else {
        "\"Unknown\""
    }
}

/// Preferred language from `LC_ALL`/`LANG` (`en_US.UTF-8` → `en-US`), else
/// the fixed default.
fn language_from_env() -> String {
    std::env::var("LC_ALL")
        .ok()
        .filter(|v| !v.is_empty())
        .or_else(|| std::env::var("LANG").ok().filter(|v| !v.is_empty()))
        .and_then(|v| normalize_locale(&v))
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())
}

fn normalize_locale(raw: &str) -> Option<String> {
    let tag = raw.split('.').next().unwrap_or("").trim();
    if tag.is_empty() || tag.eq_ignore_ascii_case("c") || tag.eq_ignore_ascii_case("posix") {
        return None;
    }
    Some(tag.replace('_', "-"))
}

/// IANA timezone name from `TZ` (leading `:` stripped), then `/etc/timezone`,
/// else UTC.
fn timezone_from_env() -> String {
    if let Ok(tz) = std::env::var("TZ") {
        let tz = tz.trim_start_matches(':').trim();
        if !tz.is_empty() {
            return tz.to_string();
        }
    }
    if let Ok(contents) = std::fs::read_to_string("/etc/timezone") {
        let tz = contents.trim();
        if !tz.is_empty() {
            return tz.to_string();
        }
    }
    DEFAULT_TIMEZONE.to_string()
}
