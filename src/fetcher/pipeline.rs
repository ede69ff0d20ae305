use encoding_rs::Encoding;
use regex::Regex;
use std::sync::LazyLock;
use tracing::warn;

// Meta tags past this point are not looked at.
const META_SCAN_BYTES: usize = 4096;

static CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)charset\s*=\s*["']?([^"'\s;]+)"#).unwrap());

static META_CHARSET_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)<meta\s+[^>]*?charset\s*=\s*["']?([^"'\s/>]+)"#).unwrap());

static META_HTTP_EQUIV_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta\s+[^>]*?http-equiv\s*=\s*["']?content-type["']?[^>]*?content\s*=\s*["']?[^"'>]*?charset\s*=\s*([^"'\s;/>]+)"#).unwrap()
});

/// Pick the body encoding: header first, then meta tags, then a guess.
pub fn detect_encoding(content_type: &str, body: &[u8]) -> &'static Encoding {
    let head_bytes = &body[..body.len().min(META_SCAN_BYTES)];
    let head = String::from_utf8_lossy(head_bytes);

    encoding_from(&CHARSET_REGEX, content_type)
        .or_else(|| encoding_from(&META_CHARSET_REGEX, &head))
        .or_else(|| encoding_from(&META_HTTP_EQUIV_REGEX, &head))
        .unwrap_or_else(|| {
            let mut detector = chardetng::EncodingDetector::new();
            detector.feed(head_bytes, false);
            detector.guess(None, true)
        })
}

fn encoding_from(regex: &Regex, haystack: &str) -> Option<&'static Encoding> {
    let label = regex.captures(haystack)?.get(1)?;
    Encoding::for_label(label.as_str().as_bytes())
}

/// Decode the body into UTF-8.
///
/// Malformed sequences become U+FFFD instead of failing the whole page; a
/// single bad byte should not cost a section all of its questions.
pub fn decode_body(body: &[u8], encoding: &'static Encoding) -> String {
    let (decoded, actual, had_errors) = encoding.decode(body);
    if had_errors {
        warn!(
            encoding = actual.name(),
            "page contained malformed byte sequences"
        );
    }
    decoded.into_owned()
}
