// src/links/normalize.rs
// =============================================================================
// Turns a raw href into the canonical absolute URL we use as a page identity.
//
//   base = "https://example.com/docs/intro"
//   "../api#top"          -> "https://example.com/api"
//   "//example.com/x"     -> "https://example.com/x"
//   "#section"            -> "https://example.com/docs/intro"
//   "my page.html"        -> "https://example.com/docs/my%20page.html"
//   "mailto:me@x.com"     -> Err(Opaque)
//   "/a%zzb"              -> Err(BadEscape)
//
// `Url::join` already removes dot segments and lowercases scheme and host,
// so two hrefs that point at the same page end up as the same string.
// =============================================================================

use url::Url;

use crate::error::NormalizeError;

pub fn normalize(base: &Url, raw_href: &str) -> Result<Url, NormalizeError> {
    // Markup in the wild is full of unescaped spaces
    let href = raw_href.replace(' ', "%20");
    if !has_valid_escapes(&href) {
        return Err(NormalizeError::BadEscape(raw_href.to_string()));
    }

    let mut resolved = base
        .join(&href)
        .map_err(|source| NormalizeError::Unparseable {
            href: raw_href.to_string(),
            source,
        })?;

    if resolved.cannot_be_a_base() {
        return Err(NormalizeError::Opaque(raw_href.to_string()));
    }

    // Fragments never identify a different page
    resolved.set_fragment(None);
    Ok(resolved)
}

// Every '%' must start a "%XY" escape with two hex digits
fn has_valid_escapes(href: &str) -> bool {
    let bytes = href.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            match bytes.get(i + 1..i + 3) {
                Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => i += 3,
                _ => return false,
            }
        } else {
            i += 1;
        }
    }
    true
}
