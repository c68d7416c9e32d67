//! HTML entity decoding and CDATA unwrapping for extracted text.
//!
//! Both functions are pure and total: text that does not decode is left
//! in place, never rejected. Feeds embed entities inconsistently enough
//! that a strict decoder would throw away more content than it fixes.

use std::borrow::Cow;

/// Named entities recognized by [`decode_entities`].
const NAMED_ENTITIES: &[(&str, char)] = &[
    ("lt", '<'),
    ("gt", '>'),
    ("amp", '&'),
    ("quot", '"'),
    ("apos", '\''),
    ("nbsp", '\u{a0}'),
    ("copy", '\u{a9}'),
    ("reg", '\u{ae}'),
    ("trade", '\u{2122}'),
    ("mdash", '\u{2014}'),
    ("ndash", '\u{2013}'),
    ("lsquo", '\u{2018}'),
    ("rsquo", '\u{2019}'),
    ("ldquo", '\u{201c}'),
    ("rdquo", '\u{201d}'),
    ("bull", '\u{2022}'),
    ("hellip", '\u{2026}'),
];

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

/// Strips `<![CDATA[ ... ]]>` wrappers, splicing the enclosed text in
/// verbatim. All occurrences are unwrapped, not just the first. Returns
/// the input borrowed when no wrapper is present.
///
/// An unterminated wrapper keeps its content and drops the open marker.
pub fn strip_cdata(text: &str) -> Cow<'_, str> {
    if !text.contains(CDATA_OPEN) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find(CDATA_OPEN) {
        out.push_str(&rest[..start]);
        let inner = &rest[start + CDATA_OPEN.len()..];
        match inner.find(CDATA_CLOSE) {
            Some(end) => {
                out.push_str(&inner[..end]);
                rest = &inner[end + CDATA_CLOSE.len()..];
            }
            None => {
                out.push_str(inner);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Decodes HTML character entities and strips CDATA wrappers.
///
/// CDATA is unwrapped first: its content arrives verbatim from the wire
/// format and is not itself entity-encoded, but decoding still runs over
/// the whole result to catch entities outside the wrappers.
///
/// Recognized forms are the named table above and decimal numeric
/// references (`&#NNN;`). A reference that is unknown, malformed, or
/// names an invalid code point is left unmodified.
pub fn decode_entities(text: &str) -> String {
    let text = strip_cdata(text);

    let mut out = String::with_capacity(text.len());
    let mut rest: &str = &text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match decode_one(tail) {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Tries to decode the entity at the start of `s` (which begins with
/// `&`). Returns the decoded character and the byte length consumed.
fn decode_one(s: &str) -> Option<(char, usize)> {
    let semi = s[1..].find(';')? + 1;
    let body = &s[1..semi];

    if let Some(digits) = body.strip_prefix('#') {
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let code: u32 = digits.parse().ok()?;
        let ch = char::from_u32(code)?;
        return Some((ch, semi + 1));
    }

    NAMED_ENTITIES
        .iter()
        .find(|(name, _)| *name == body)
        .map(|&(_, ch)| (ch, semi + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn decodes_named_entities() {
        assert_eq!(decode_entities("&lt;b&gt;"), "<b>");
        assert_eq!(decode_entities("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(decode_entities("&ldquo;hi&rdquo;"), "\u{201c}hi\u{201d}");
        assert_eq!(decode_entities("a&nbsp;b"), "a\u{a0}b");
        assert_eq!(decode_entities("&copy; 2024 &mdash; Corp&trade;"), "\u{a9} 2024 \u{2014} Corp\u{2122}");
    }

    #[test]
    fn decodes_decimal_numeric_references() {
        assert_eq!(decode_entities("&#39;"), "'");
        assert_eq!(decode_entities("&#8212;"), "\u{2014}");
        assert_eq!(decode_entities("it&#39;s &#65;"), "it's A");
    }

    #[test]
    fn invalid_numeric_references_are_left_unmodified() {
        // Out of Unicode range
        assert_eq!(decode_entities("&#99999999;"), "&#99999999;");
        // Surrogate code point
        assert_eq!(decode_entities("&#55296;"), "&#55296;");
        // Not decimal digits
        assert_eq!(decode_entities("&#x27;"), "&#x27;");
        assert_eq!(decode_entities("&#;"), "&#;");
    }

    #[test]
    fn unknown_entities_and_bare_ampersands_pass_through() {
        assert_eq!(decode_entities("AT&T"), "AT&T");
        assert_eq!(decode_entities("&bogus;"), "&bogus;");
        assert_eq!(decode_entities("a & b; c"), "a & b; c");
        assert_eq!(decode_entities("&"), "&");
    }

    #[test]
    fn strips_single_cdata_wrapper() {
        assert_eq!(
            strip_cdata("<![CDATA[<p>hello</p>]]>"),
            "<p>hello</p>"
        );
    }

    #[test]
    fn strips_every_cdata_occurrence() {
        let input = "a <![CDATA[one]]> b <![CDATA[two]]> c";
        assert_eq!(strip_cdata(input), "a one b two c");
    }

    #[test]
    fn unterminated_cdata_keeps_content() {
        assert_eq!(strip_cdata("<![CDATA[dangling"), "dangling");
    }

    #[test]
    fn clean_text_is_borrowed() {
        let input = "no wrappers here";
        assert!(matches!(strip_cdata(input), Cow::Borrowed(_)));
    }

    #[test]
    fn decode_runs_over_text_outside_cdata() {
        // Entities outside the wrapper decode; CDATA content is spliced
        // verbatim first, then the single decode pass sees everything.
        assert_eq!(
            decode_entities("&lt;![CDATA[x]]&gt; and <![CDATA[&literal]]>"),
            "<![CDATA[x]]> and &literal"
        );
    }

    proptest! {
        // Entity-free text decodes to itself.
        #[test]
        fn identity_without_ampersands(s in "[^&]*") {
            prop_assume!(!s.contains("<!["));
            prop_assert_eq!(decode_entities(&s), s);
        }
    }
}
