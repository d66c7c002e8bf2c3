//! Filename resolution and sanitization for staged downloads.
//!
//! Resolution order, first usable name wins:
//! 1. `Content-Disposition` header (`filename*=` then `filename=`)
//! 2. Last URL path segment (query and fragment excluded)
//! 3. [`FALLBACK_FILENAME`]

use std::path::{Component, Path};

use reqwest::header::{CONTENT_DISPOSITION, HeaderMap};
use tracing::debug;
use url::Url;

use super::constants::FALLBACK_FILENAME;

/// Resolves the destination filename for `url` given response headers.
///
/// The result is never empty and is safe to join onto a directory.
#[must_use]
pub fn resolve_filename(url: &Url, headers: &HeaderMap) -> String {
    let from_header = headers
        .get(CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_content_disposition)
        .and_then(|name| usable(&name));
    if let Some(name) = from_header {
        debug!(filename = %name, "filename from Content-Disposition");
        return name;
    }

    if let Some(name) = filename_from_url(url).and_then(|name| usable(&name)) {
        debug!(filename = %name, "filename from URL path");
        return name;
    }

    debug!(filename = FALLBACK_FILENAME, "filename fallback");
    FALLBACK_FILENAME.to_string()
}

fn usable(name: &str) -> Option<String> {
    let sanitized = sanitize_filename(name.trim());
    (!sanitized.trim_matches('_').is_empty()).then_some(sanitized)
}

/// Last path segment of `url`, percent-decoded. `None` when empty.
pub(crate) fn filename_from_url(url: &Url) -> Option<String> {
    let last = url.path_segments()?.next_back()?;
    if last.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(last).map_or_else(
        |e| {
            debug!(segment = %last, error = %e, "URL decoding failed, using raw segment");
            last.to_string()
        },
        std::borrow::Cow::into_owned,
    );
    Some(decoded)
}

/// Extracts the filename parameter from a `Content-Disposition` value.
///
/// The extended `filename*=charset'lang'value` form wins over plain
/// `filename=`. Parameter names are case-insensitive; blank values count as
/// absent.
pub(crate) fn parse_content_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;

    for (name, value) in disposition_parameters(header) {
        match name.as_str() {
            "filename*" => extended = decode_extended(&value).or(extended),
            "filename" if !value.is_empty() => plain = Some(value),
            _ => {}
        }
    }

    extended.or(plain)
}

/// Splits the parameters after the disposition type into lowercased
/// `(name, value)` pairs. Quoted values may contain `;` and `\"` escapes.
fn disposition_parameters(header: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let Some((_, mut rest)) = header.split_once(';') else {
        return params;
    };

    loop {
        rest = rest.trim_start_matches([' ', '\t', ';']);
        if rest.is_empty() {
            break;
        }
        let name_end = rest.find(['=', ';']).unwrap_or(rest.len());
        let name = rest[..name_end].trim().to_ascii_lowercase();
        rest = &rest[name_end..];

        // Bare token without a value
        let Some(raw_value) = rest.strip_prefix('=') else {
            continue;
        };
        let raw_value = raw_value.trim_start();
        let (value, remainder) = match raw_value.strip_prefix('"') {
            Some(quoted) => take_quoted(quoted),
            None => {
                let end = raw_value.find(';').unwrap_or(raw_value.len());
                (raw_value[..end].trim().to_string(), &raw_value[end..])
            }
        };
        params.push((name, value));
        rest = remainder;
    }

    params
}

/// Reads a quoted-string body up to its closing quote. An unterminated
/// string runs to the end of the header.
fn take_quoted(input: &str) -> (String, &str) {
    let mut value = String::new();
    let mut escaped = false;
    for (index, c) in input.char_indices() {
        match c {
            _ if escaped => {
                value.push(c);
                escaped = false;
            }
            '\\' => escaped = true,
            '"' => return (value, &input[index + 1..]),
            _ => value.push(c),
        }
    }
    (value, "")
}

/// Decodes an RFC 5987 `charset'lang'pct-encoded` value.
fn decode_extended(value: &str) -> Option<String> {
    let (_, encoded) = value.split_once("''")?;
    let decoded = urlencoding::decode(encoded.trim()).ok()?;
    (!decoded.is_empty()).then(|| decoded.into_owned())
}

/// Characters no common filesystem accepts inside a name.
const RESERVED: [char; 9] = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// Makes `name` safe to join onto the staging directory.
///
/// Reserved and control characters become `_`. A name that would still act
/// as a path component (`.`, `..`) has its dots replaced too.
pub(crate) fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if RESERVED.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    match cleaned.as_str() {
        "" => "_".to_string(),
        _ if is_plain_component(&cleaned) => cleaned,
        _ => cleaned.replace('.', "_"),
    }
}

fn is_plain_component(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    fn url(raw: &str) -> Url {
        Url::parse(raw).unwrap()
    }

    fn disposition(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_DISPOSITION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_resolve_filename_strips_query_string() {
        let name = resolve_filename(
            &url("https://cdn.example.com/files/name.ext?token=abc&x=1"),
            &HeaderMap::new(),
        );
        assert_eq!(name, "name.ext");
    }

    #[test]
    fn test_resolve_filename_strips_fragment() {
        let name = resolve_filename(
            &url("https://cdn.example.com/a/clip.mov#t=10"),
            &HeaderMap::new(),
        );
        assert_eq!(name, "clip.mov");
    }

    #[test]
    fn test_resolve_filename_trailing_slash_uses_fallback() {
        let name = resolve_filename(&url("https://cdn.example.com/files/"), &HeaderMap::new());
        assert_eq!(name, FALLBACK_FILENAME);
    }

    #[test]
    fn test_resolve_filename_bare_host_uses_fallback() {
        let name = resolve_filename(&url("https://cdn.example.com"), &HeaderMap::new());
        assert_eq!(name, FALLBACK_FILENAME);
    }

    #[test]
    fn test_resolve_filename_header_wins_over_url() {
        let name = resolve_filename(
            &url("https://cdn.example.com/files/video.mp4"),
            &disposition(r#"attachment; filename="report.pdf""#),
        );
        assert_eq!(name, "report.pdf");
    }

    #[test]
    fn test_resolve_filename_malformed_header_falls_back_to_url() {
        let name = resolve_filename(
            &url("https://cdn.example.com/files/video.mp4"),
            &disposition("attachment"),
        );
        assert_eq!(name, "video.mp4");
    }

    #[test]
    fn test_resolve_filename_empty_header_value_falls_back_to_url() {
        let name = resolve_filename(
            &url("https://cdn.example.com/files/video.mp4"),
            &disposition(r#"attachment; filename="""#),
        );
        assert_eq!(name, "video.mp4");
    }

    #[test]
    fn test_resolve_filename_malformed_header_and_trailing_slash_uses_fallback() {
        let name = resolve_filename(
            &url("https://cdn.example.com/files/"),
            &disposition("inline"),
        );
        assert_eq!(name, FALLBACK_FILENAME);
    }

    #[test]
    fn test_resolve_filename_decodes_percent_encoding() {
        let name = resolve_filename(
            &url("https://cdn.example.com/my%20holiday.jpg"),
            &HeaderMap::new(),
        );
        assert_eq!(name, "my holiday.jpg");
    }

    #[test]
    fn test_resolve_filename_neutralizes_header_traversal() {
        let name = resolve_filename(
            &url("https://cdn.example.com/files/video.mp4"),
            &disposition(r#"attachment; filename="../../etc/passwd""#),
        );
        assert!(!name.contains('/'), "{name}");
        let has_parent = Path::new(&name)
            .components()
            .any(|c| c == Component::ParentDir);
        assert!(!has_parent, "{name}");
    }

    #[test]
    fn test_resolve_filename_dot_segment_header_falls_through() {
        let name = resolve_filename(
            &url("https://cdn.example.com/files/video.mp4"),
            &disposition("attachment; filename=.."),
        );
        assert_eq!(name, "video.mp4");
    }

    #[test]
    fn test_content_disposition_quoted_and_bare_values() {
        assert_eq!(
            parse_content_disposition(r#"attachment; filename="clip 01.mov""#).as_deref(),
            Some("clip 01.mov")
        );
        assert_eq!(
            parse_content_disposition("attachment; filename=clip.mov").as_deref(),
            Some("clip.mov")
        );
    }

    #[test]
    fn test_content_disposition_ignores_trailing_parameters() {
        let header = r#"attachment; filename="song.mp3"; size=4096; creation-date="x""#;
        assert_eq!(parse_content_disposition(header).as_deref(), Some("song.mp3"));
    }

    #[test]
    fn test_content_disposition_extended_form_is_decoded() {
        let header = "inline; filename*=UTF-8''holiday%20photo.jpg";
        assert_eq!(
            parse_content_disposition(header).as_deref(),
            Some("holiday photo.jpg")
        );
    }

    #[test]
    fn test_content_disposition_extended_form_wins_in_any_order() {
        let header = r#"attachment; filename="fallback.pdf"; filename*=UTF-8''r%C3%A9sum%C3%A9.pdf"#;
        assert_eq!(parse_content_disposition(header).as_deref(), Some("résumé.pdf"));

        let header = r#"attachment; filename*=UTF-8''r%C3%A9sum%C3%A9.pdf; filename="fallback.pdf""#;
        assert_eq!(parse_content_disposition(header).as_deref(), Some("résumé.pdf"));
    }

    #[test]
    fn test_content_disposition_malformed_extended_uses_plain() {
        let header = r#"attachment; filename*=no-quotes.pdf; filename="plain.pdf""#;
        assert_eq!(parse_content_disposition(header).as_deref(), Some("plain.pdf"));
    }

    #[test]
    fn test_content_disposition_parameter_name_case() {
        let header = r#"Attachment; FileName="Upper.PDF""#;
        assert_eq!(parse_content_disposition(header).as_deref(), Some("Upper.PDF"));
    }

    #[test]
    fn test_content_disposition_without_filename() {
        assert_eq!(parse_content_disposition("attachment"), None);
        assert_eq!(parse_content_disposition("inline; size=10"), None);
        assert_eq!(parse_content_disposition(r#"attachment; filename="""#), None);
    }

    #[test]
    fn test_content_disposition_quoted_value_keeps_semicolons() {
        let header = r#"attachment; filename="Q1; final.pdf"; size=10"#;
        assert_eq!(
            parse_content_disposition(header).as_deref(),
            Some("Q1; final.pdf")
        );
    }

    #[test]
    fn test_content_disposition_quoted_value_unescapes_quotes() {
        let header = r#"attachment; filename="say \"hi\".txt""#;
        assert_eq!(
            parse_content_disposition(header).as_deref(),
            Some(r#"say "hi".txt"#)
        );
    }

    #[test]
    fn test_resolve_filename_quoted_semicolon_keeps_extension() {
        let name = resolve_filename(
            &url("https://cdn.example.com/files/video.mp4"),
            &disposition(r#"attachment; filename="Q1; final.pdf""#),
        );
        assert_eq!(name, "Q1; final.pdf");
        assert_eq!(crate::mime::classify_mime(&name), "application/pdf");
    }

    #[test]
    fn test_sanitize_replaces_reserved_characters() {
        assert_eq!(sanitize_filename("a/b\\c.mp4"), "a_b_c.mp4");
        assert_eq!(sanitize_filename("what?<now>.txt"), "what__now_.txt");
        assert_eq!(sanitize_filename("tab\there|.log"), "tab_here_.log");
    }

    #[test]
    fn test_sanitize_neutralizes_dot_components() {
        assert_eq!(sanitize_filename("."), "_");
        assert_eq!(sanitize_filename(".."), "__");
        assert_eq!(sanitize_filename(""), "_");
    }

    #[test]
    fn test_sanitize_keeps_ordinary_names() {
        assert_eq!(sanitize_filename("Track 07 (live).flac"), "Track 07 (live).flac");
        assert_eq!(sanitize_filename(".env"), ".env");
        assert_eq!(sanitize_filename("日本語.pdf"), "日本語.pdf");
    }
}
