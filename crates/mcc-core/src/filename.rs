//! Local filenames for fetched conversions.
//!
//! Name preference: the server's `Content-Disposition` filename, then the
//! video title from the conversion response, then the last URL path segment.
//! The result is sanitized for Linux filesystems (no `/`, NUL, or control
//! characters; no leading/trailing dots or spaces; bounded length).

/// Used when no usable name can be derived from any source.
const DEFAULT_FILENAME: &str = "conversion.bin";

/// Linux NAME_MAX.
const MAX_NAME_BYTES: usize = 255;

/// Derives a safe filename for saving a fetched conversion.
pub fn derive_filename(
    url: &str,
    content_disposition: Option<&str>,
    title: Option<&str>,
) -> String {
    let candidate = [
        content_disposition.and_then(disposition_filename),
        title.map(str::to_string),
        last_path_segment(url),
    ]
    .into_iter()
    .flatten()
    .find(|s| !s.trim().is_empty());

    let raw = match candidate {
        Some(c) => c,
        None => return DEFAULT_FILENAME.to_string(),
    };

    let sanitized = sanitize(&raw);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_FILENAME.to_string()
    } else {
        sanitized
    }
}

/// Extracts the filename from a `Content-Disposition` value.
///
/// `filename*=UTF-8''…` (RFC 5987, percent-decoded) takes precedence over a
/// plain `filename=` token or quoted string.
fn disposition_filename(value: &str) -> Option<String> {
    let mut plain: Option<String> = None;
    for param in value.split(';').map(str::trim) {
        let Some((name, v)) = param.split_once('=') else {
            continue;
        };
        let v = v.trim();
        if name.trim().eq_ignore_ascii_case("filename*") {
            if let Some(encoded) = v
                .strip_prefix("UTF-8''")
                .or_else(|| v.strip_prefix("utf-8''"))
            {
                let decoded = percent_decode(encoded);
                if !decoded.is_empty() {
                    return Some(decoded);
                }
            }
        } else if name.trim().eq_ignore_ascii_case("filename") {
            let unquoted = v.trim_matches('"');
            if !unquoted.is_empty() {
                plain = Some(unquoted.replace("\\\"", "\""));
            }
        }
    }
    plain
}

fn percent_decode(input: &str) -> String {
    let mut out = Vec::with_capacity(input.len());
    let mut bytes = input.bytes();
    while let Some(b) = bytes.next() {
        if b == b'%' {
            let hi = bytes.next().and_then(hex_value);
            let lo = bytes.next().and_then(hex_value);
            match (hi, lo) {
                (Some(hi), Some(lo)) => out.push((hi << 4) | lo),
                _ => out.push(b'%'),
            }
        } else {
            out.push(b);
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

fn last_path_segment(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

/// Sanitizes a candidate filename for Linux.
///
/// - NUL, `/`, `\`, control characters, and whitespace become `_`
/// - consecutive `_` collapse to one
/// - leading/trailing spaces, dots, and underscores are trimmed
/// - the result is cut at a char boundary below `MAX_NAME_BYTES`
pub fn sanitize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut last_was_filler = false;
    for c in name.chars() {
        let mapped = if c == '\0' || c == '/' || c == '\\' || c.is_control() || c.is_whitespace() {
            '_'
        } else {
            c
        };
        if mapped == '_' {
            if !last_was_filler {
                out.push('_');
            }
            last_was_filler = true;
        } else {
            out.push(mapped);
            last_was_filler = false;
        }
    }

    let trimmed = out.trim_matches(|c| c == '.' || c == '_' || c == ' ');
    if trimmed.len() <= MAX_NAME_BYTES {
        return trimmed.to_string();
    }
    let mut cut = MAX_NAME_BYTES;
    while cut > 0 && !trimmed.is_char_boundary(cut) {
        cut -= 1;
    }
    trimmed[..cut].to_string()
}
