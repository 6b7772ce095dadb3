//! HTML sanitization policy for snippet bodies and model output.
//!
//! Saving a snippet runs two stages:
//!
//! 1. **Reject.** If any disallow-listed tag is opened anywhere in the input
//!    (`<script`, `<IFRAME `, …, matched case-insensitively up to a word
//!    boundary) the whole submission is refused with a [`PolicyViolation`]
//!    naming the tag. Nothing is written.
//! 2. **Filter.** The input is run through an [`AllowList`] built from the
//!    rich-content tag set minus the disallow-list. Permitted tags are kept
//!    byte-for-byte, unknown tags and attributes are dropped, stray angle
//!    brackets are escaped.
//!
//! Model completions skip stage 1 and are filtered with a smaller removal set,
//! [`COMPLETION_STRIPPED_TAGS`]. See [`clean_completion`].

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::PolicyViolation;

/// Tags refused outright in snippet bodies, in reporting order.
pub const DISALLOWED_TAGS: &[&str] = &[
    "html", "body", "script", "link", "footer", "iframe", "object", "form", "style", "head",
    "meta", "embed", "applet", "frameset", "noscript", "noframes", "xml", "base", "math",
];

/// Tags removed from the rich-content allow-list when filtering completions.
pub const COMPLETION_STRIPPED_TAGS: &[&str] = &["html", "script", "link", "footer", "body"];

/// Attributes permitted on every allowed tag.
const GLOBAL_ATTRIBUTES: &[&str] = &[
    "class", "dir", "hidden", "id", "lang", "role", "style", "title", "xml:lang",
];

/// Attributes whose values are URLs and must use a safe scheme.
const URL_ATTRIBUTES: &[&str] = &["action", "background", "cite", "href", "poster", "src", "srcset"];

const SAFE_PROTOCOLS: &[&str] = &[
    "http", "https", "ftp", "ftps", "mailto", "news", "irc", "irc6", "ircs", "gopher", "nntp",
    "feed", "telnet", "mms", "rtsp", "sms", "svn", "tel", "fax", "xmpp", "webcal", "urn",
];

const ALIGN: &[&str] = &["align"];
const TABLE_SECTION: &[&str] = &["align", "char", "charoff", "valign"];
const TABLE_CELL: &[&str] = &[
    "abbr", "align", "axis", "bgcolor", "char", "charoff", "colspan", "headers", "height",
    "nowrap", "rowspan", "scope", "valign", "width",
];

/// The broad "post content" tag set and the attributes each tag accepts on
/// top of [`GLOBAL_ATTRIBUTES`].
const RICH_CONTENT: &[(&str, &[&str])] = &[
    ("a", &["href", "rel", "rev", "name", "target", "download", "hreflang", "type"]),
    ("abbr", &[]),
    ("acronym", &[]),
    ("address", &[]),
    ("area", &["alt", "coords", "href", "nohref", "shape", "target"]),
    ("article", ALIGN),
    ("aside", ALIGN),
    ("audio", &["autoplay", "controls", "loop", "muted", "preload", "src"]),
    ("b", &[]),
    ("bdo", &[]),
    ("big", &[]),
    ("blockquote", &["cite"]),
    ("br", &[]),
    ("button", &["disabled", "name", "type", "value"]),
    ("caption", ALIGN),
    ("cite", &[]),
    ("code", &[]),
    ("col", &["align", "char", "charoff", "span", "valign", "width"]),
    ("colgroup", &["align", "char", "charoff", "span", "valign", "width"]),
    ("dd", &[]),
    ("del", &["datetime"]),
    ("details", &["align", "open"]),
    ("dfn", &[]),
    ("div", ALIGN),
    ("dl", &[]),
    ("dt", &[]),
    ("em", &[]),
    ("fieldset", &[]),
    ("figcaption", ALIGN),
    ("figure", ALIGN),
    ("font", &["color", "face", "size"]),
    ("footer", ALIGN),
    ("h1", ALIGN),
    ("h2", ALIGN),
    ("h3", ALIGN),
    ("h4", ALIGN),
    ("h5", ALIGN),
    ("h6", ALIGN),
    ("header", ALIGN),
    ("hgroup", ALIGN),
    ("hr", &["align", "noshade", "size", "width"]),
    ("i", &[]),
    (
        "img",
        &[
            "alt", "align", "border", "decoding", "height", "hspace", "loading", "longdesc",
            "sizes", "src", "srcset", "usemap", "vspace", "width",
        ],
    ),
    ("ins", &["datetime", "cite"]),
    ("kbd", &[]),
    ("label", &["for"]),
    ("legend", ALIGN),
    ("li", &["align", "value"]),
    ("main", ALIGN),
    ("map", &["name"]),
    ("mark", &[]),
    ("menu", &["type"]),
    ("nav", ALIGN),
    ("object", &["data", "type"]),
    ("ol", &["start", "type", "reversed"]),
    ("p", ALIGN),
    ("pre", &["width"]),
    ("q", &["cite"]),
    ("rb", &[]),
    ("rp", &[]),
    ("rt", &[]),
    ("rtc", &[]),
    ("ruby", &[]),
    ("s", &[]),
    ("samp", &[]),
    ("section", ALIGN),
    ("small", &[]),
    ("span", ALIGN),
    ("strike", &[]),
    ("strong", &[]),
    ("sub", &[]),
    ("summary", ALIGN),
    ("sup", &[]),
    (
        "table",
        &[
            "align", "bgcolor", "border", "cellpadding", "cellspacing", "rules", "summary",
            "width",
        ],
    ),
    ("tbody", TABLE_SECTION),
    ("td", TABLE_CELL),
    ("textarea", &["cols", "rows", "disabled", "name", "readonly"]),
    ("tfoot", TABLE_SECTION),
    ("th", TABLE_CELL),
    ("thead", TABLE_SECTION),
    ("title", &[]),
    ("tr", &["align", "bgcolor", "char", "charoff", "valign"]),
    ("track", &["default", "kind", "label", "src", "srclang"]),
    ("tt", &[]),
    ("u", &[]),
    ("ul", &["type"]),
    ("var", &[]),
    (
        "video",
        &[
            "autoplay", "controls", "height", "loop", "muted", "playsinline", "poster",
            "preload", "src", "width",
        ],
    ),
];

static OPENING_TAGS: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    DISALLOWED_TAGS
        .iter()
        .map(|tag| {
            let pattern = Regex::new(&format!(r"(?i-u:<{tag}\b)")).expect("tag names are plain words");
            (*tag, pattern)
        })
        .collect()
});

static CHAR_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)&#(x[0-9a-f]+|[0-9]+);?|&(colon|tab|newline);").expect("static pattern")
});

static SNIPPET_ALLOW_LIST: LazyLock<AllowList> =
    LazyLock::new(|| AllowList::rich_content().without(DISALLOWED_TAGS));

static COMPLETION_ALLOW_LIST: LazyLock<AllowList> =
    LazyLock::new(|| AllowList::rich_content().without(COMPLETION_STRIPPED_TAGS));

/// Markup that has passed [`sanitize_snippet`].
///
/// The snippet store only accepts this type, so stored bodies are never
/// re-validated downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedHtml(String);

impl SanitizedHtml {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl AsRef<str> for SanitizedHtml {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Refuse input that opens any disallow-listed tag.
pub fn check_disallowed(raw: &str) -> Result<(), PolicyViolation> {
    match OPENING_TAGS.iter().find(|(_, pattern)| pattern.is_match(raw)) {
        Some((tag, _)) => Err(PolicyViolation { tag: *tag }),
        None => Ok(()),
    }
}

/// Check a submitted snippet body and filter it down to permitted markup.
pub fn sanitize_snippet(raw: &str) -> Result<SanitizedHtml, PolicyViolation> {
    check_disallowed(raw)?;
    Ok(SanitizedHtml(SNIPPET_ALLOW_LIST.clean(raw)))
}

/// Filter model output before it is handed back to the editor.
pub fn clean_completion(text: &str) -> String {
    COMPLETION_ALLOW_LIST.clean(text)
}

/// Tag → permitted attribute names.
#[derive(Debug, Clone)]
pub struct AllowList {
    tags: HashMap<&'static str, &'static [&'static str]>,
}

impl AllowList {
    pub fn rich_content() -> Self {
        Self {
            tags: RICH_CONTENT.iter().copied().collect(),
        }
    }

    pub fn without(mut self, tags: &[&str]) -> Self {
        for tag in tags {
            self.tags.remove(*tag);
        }
        self
    }

    pub fn allows_tag(&self, tag: &str) -> bool {
        self.tags.contains_key(tag.to_ascii_lowercase().as_str())
    }

    /// Filter markup down to this allow-list.
    ///
    /// Allowed tags whose attributes all pass are copied verbatim; other
    /// allowed tags are rebuilt from their surviving attributes. Tags outside
    /// the list and comments are dropped while their text content stays.
    pub fn clean(&self, input: &str) -> String {
        let bytes = input.as_bytes();
        let mut out = String::with_capacity(input.len());
        let mut text_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'<' => {
                    out.push_str(&input[text_start..i]);
                    if input[i..].starts_with("<!--") {
                        i = match input[i + 4..].find("-->") {
                            Some(end) => i + 4 + end + 3,
                            None => bytes.len(),
                        };
                    } else if let Some(tag) = Tag::parse(input, i) {
                        self.emit(&tag, &mut out);
                        i = tag.end;
                    } else {
                        out.push_str("&lt;");
                        i += 1;
                    }
                    text_start = i;
                }
                b'>' => {
                    out.push_str(&input[text_start..i]);
                    out.push_str("&gt;");
                    i += 1;
                    text_start = i;
                }
                _ => i += 1,
            }
        }
        out.push_str(&input[text_start..]);
        out
    }

    fn emit(&self, tag: &Tag<'_>, out: &mut String) {
        let name = tag.name.to_ascii_lowercase();
        let Some(allowed) = self.tags.get(name.as_str()) else {
            return;
        };

        if tag.closing {
            if tag.attrs.is_empty() && tag.well_formed {
                out.push_str(tag.raw);
            } else {
                out.push_str("</");
                out.push_str(tag.name);
                out.push('>');
            }
            return;
        }

        let kept: Vec<&Attr<'_>> = tag
            .attrs
            .iter()
            .filter(|attr| attribute_allowed(allowed, attr))
            .collect();

        if tag.well_formed && kept.len() == tag.attrs.len() {
            out.push_str(tag.raw);
            return;
        }

        out.push('<');
        out.push_str(tag.name);
        for attr in kept {
            out.push(' ');
            out.push_str(attr.raw);
        }
        if tag.self_closing {
            out.push_str(" /");
        }
        out.push('>');
    }
}

/// One parsed `<...>` token borrowed from the input.
#[derive(Debug)]
struct Tag<'a> {
    raw: &'a str,
    name: &'a str,
    closing: bool,
    self_closing: bool,
    attrs: Vec<Attr<'a>>,
    /// False when bytes were skipped while parsing, so `raw` can't be reused.
    well_formed: bool,
    end: usize,
}

#[derive(Debug)]
struct Attr<'a> {
    raw: &'a str,
    name: &'a str,
    value: Option<&'a str>,
}

impl<'a> Tag<'a> {
    /// Parse the tag starting at `start` (which holds `<`). Returns `None`
    /// when the bracket does not open a tag or the tag is never closed.
    fn parse(input: &'a str, start: usize) -> Option<Self> {
        let bytes = input.as_bytes();
        let len = bytes.len();
        let mut i = start + 1;

        let closing = bytes.get(i) == Some(&b'/');
        if closing {
            i += 1;
        }
        if !bytes.get(i).is_some_and(u8::is_ascii_alphabetic) {
            return None;
        }
        let name_start = i;
        while i < len && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-' || bytes[i] == b':')
        {
            i += 1;
        }
        let name = &input[name_start..i];

        let mut attrs = Vec::new();
        let mut self_closing = false;
        let mut well_formed = true;

        loop {
            while i < len && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            match *bytes.get(i)? {
                b'>' => {
                    i += 1;
                    break;
                }
                b'/' => {
                    if self_closing {
                        well_formed = false;
                    }
                    self_closing = true;
                    i += 1;
                }
                _ => {
                    if self_closing {
                        // A slash that did not end the tag.
                        well_formed = false;
                        self_closing = false;
                    }
                    let attr_start = i;
                    while i < len
                        && !bytes[i].is_ascii_whitespace()
                        && !matches!(bytes[i], b'=' | b'>' | b'/')
                    {
                        i += 1;
                    }
                    if i == attr_start {
                        // Stray `=`.
                        well_formed = false;
                        i += 1;
                        continue;
                    }
                    let attr_name = &input[attr_start..i];

                    let mut j = i;
                    while j < len && bytes[j].is_ascii_whitespace() {
                        j += 1;
                    }
                    let mut value = None;
                    if bytes.get(j) == Some(&b'=') {
                        j += 1;
                        while j < len && bytes[j].is_ascii_whitespace() {
                            j += 1;
                        }
                        match *bytes.get(j)? {
                            quote @ (b'"' | b'\'') => {
                                let value_start = j + 1;
                                let close = input[value_start..].find(quote as char)?;
                                value = Some(&input[value_start..value_start + close]);
                                j = value_start + close + 1;
                            }
                            _ => {
                                let value_start = j;
                                while j < len
                                    && !bytes[j].is_ascii_whitespace()
                                    && bytes[j] != b'>'
                                {
                                    j += 1;
                                }
                                value = Some(&input[value_start..j]);
                            }
                        }
                        i = j;
                    }

                    attrs.push(Attr {
                        raw: &input[attr_start..i],
                        name: attr_name,
                        value,
                    });
                }
            }
        }

        if closing && self_closing {
            well_formed = false;
        }

        Some(Tag {
            raw: &input[start..i],
            name,
            closing,
            self_closing,
            attrs,
            well_formed,
            end: i,
        })
    }
}

fn attribute_allowed(allowed: &[&str], attr: &Attr<'_>) -> bool {
    let name = attr.name.to_ascii_lowercase();
    let permitted = allowed.contains(&name.as_str())
        || GLOBAL_ATTRIBUTES.contains(&name.as_str())
        || is_custom_attribute(&name, "data-")
        || is_custom_attribute(&name, "aria-");
    if !permitted {
        return false;
    }

    match attr.value {
        None => true,
        Some(value) if URL_ATTRIBUTES.contains(&name.as_str()) => {
            if name == "srcset" {
                value
                    .split(',')
                    .all(|candidate| has_safe_protocol(candidate.trim()))
            } else {
                has_safe_protocol(value)
            }
        }
        Some(value) if name == "style" => is_safe_style(value),
        Some(_) => true,
    }
}

fn is_custom_attribute(name: &str, prefix: &str) -> bool {
    name.strip_prefix(prefix).is_some_and(|rest| {
        !rest.is_empty()
            && rest
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    })
}

/// Relative URLs pass; absolute URLs must use a scheme from
/// [`SAFE_PROTOCOLS`]. Character references and whitespace are removed
/// before looking for the scheme.
fn has_safe_protocol(value: &str) -> bool {
    let decoded = decode_char_refs(value);
    let normalized: String = decoded
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();

    let scheme_end = normalized.find(|c: char| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(pos) if normalized[pos..].starts_with(':') => {
            SAFE_PROTOCOLS.contains(&&normalized[..pos])
        }
        _ => true,
    }
}

fn is_safe_style(value: &str) -> bool {
    let decoded = decode_char_refs(value).to_ascii_lowercase();
    let compact: String = decoded.chars().filter(|c| !c.is_whitespace()).collect();
    !["expression(", "javascript:", "vbscript:", "-moz-binding", "behavior:"]
        .iter()
        .any(|needle| compact.contains(needle))
}

fn decode_char_refs(value: &str) -> String {
    CHAR_REF
        .replace_all(value, |caps: &regex::Captures<'_>| {
            if let Some(named) = caps.get(2) {
                return match named.as_str().to_ascii_lowercase().as_str() {
                    "colon" => ":".to_string(),
                    "tab" => "\t".to_string(),
                    _ => "\n".to_string(),
                };
            }
            let code = &caps[1];
            let parsed = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok(),
                None => code.parse::<u32>().ok(),
            };
            parsed
                .and_then(char::from_u32)
                .map(String::from)
                .unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_every_disallowed_tag_case_insensitively() {
        for tag in DISALLOWED_TAGS {
            let upper = format!("<div><{}>x</div>", tag.to_uppercase());
            assert_eq!(
                check_disallowed(&upper),
                Err(PolicyViolation { tag: *tag }),
                "{tag} should be rejected"
            );
        }
        assert_eq!(
            check_disallowed("<ScRiPt src=x>"),
            Err(PolicyViolation { tag: "script" })
        );
    }

    #[test]
    fn rejection_requires_word_boundary() {
        assert!(check_disallowed("<header>hi</header>").is_ok());
        assert!(check_disallowed("<bodyguard>").is_ok());
        assert!(check_disallowed("<base>").is_err());
        assert!(check_disallowed("<head>").is_err());
    }

    #[test]
    fn word_boundary_is_ascii_only() {
        assert_eq!(
            check_disallowed("<scriptä>alert(1)</scriptä>"),
            Err(PolicyViolation { tag: "script" })
        );
        assert!(check_disallowed("<bodyä>").is_err());
    }

    #[test]
    fn without_drops_the_named_tags() {
        let owned = String::from("section");
        let list = AllowList::rich_content().without(&[owned.as_str(), "p"]);
        assert!(!list.allows_tag("section"));
        assert!(!list.allows_tag("P"));
        assert!(list.allows_tag("div"));
    }

    #[test]
    fn reports_tags_in_list_order() {
        let err = check_disallowed("<script></script><html>").unwrap_err();
        assert_eq!(err.tag, "html");
        assert_eq!(err.to_string(), "The <html> tag is not allowed in snippets.");
    }

    #[test]
    fn keeps_permitted_markup_byte_for_byte() {
        let raw = r#"<div class="p-4  bg-white" data-id='7'>
  <h2 ALIGN=center>Title</h2><br/><img src="/a.png" alt="">
</div>"#;
        assert_eq!(sanitize_snippet(raw).unwrap().as_str(), raw);
    }

    #[test]
    fn drops_unknown_tags_but_keeps_text() {
        let cleaned = sanitize_snippet("<div><blink>hey</blink> <svg><g/></svg>there</div>").unwrap();
        assert_eq!(cleaned.as_str(), "<div>hey there</div>");
    }

    #[test]
    fn drops_event_handlers_and_rebuilds_tag() {
        let cleaned = sanitize_snippet(r#"<a href="/x" onclick="steal()" class=btn>go</a>"#).unwrap();
        assert_eq!(cleaned.as_str(), r#"<a href="/x" class=btn>go</a>"#);
    }

    #[test]
    fn drops_unsafe_urls() {
        let cleaned = sanitize_snippet(r#"<a href="javascript:alert(1)">x</a>"#).unwrap();
        assert_eq!(cleaned.as_str(), "<a>x</a>");

        let encoded = sanitize_snippet(r#"<a href="jav&#x61;script:alert(1)">x</a>"#).unwrap();
        assert_eq!(encoded.as_str(), "<a>x</a>");

        let ok = sanitize_snippet(r#"<a href="https://example.com/a:b">x</a>"#).unwrap();
        assert_eq!(ok.as_str(), r#"<a href="https://example.com/a:b">x</a>"#);
    }

    #[test]
    fn drops_scripted_styles() {
        let cleaned = sanitize_snippet(r#"<p style="width: expression(alert(1))">x</p>"#).unwrap();
        assert_eq!(cleaned.as_str(), "<p>x</p>");
    }

    #[test]
    fn strips_comments_and_escapes_stray_brackets() {
        let cleaned = sanitize_snippet("<p>1 < 2 > 0<!-- note --></p>").unwrap();
        assert_eq!(cleaned.as_str(), "<p>1 &lt; 2 &gt; 0</p>");
    }

    #[test]
    fn unterminated_tag_is_escaped() {
        let cleaned = sanitize_snippet("<div class=\"x").unwrap();
        assert_eq!(cleaned.as_str(), "&lt;div class=\"x");
    }

    #[test]
    fn snippet_list_removes_footer_and_object() {
        let list = AllowList::rich_content().without(DISALLOWED_TAGS);
        assert!(!list.allows_tag("footer"));
        assert!(!list.allows_tag("object"));
        assert!(list.allows_tag("section"));
    }

    #[test]
    fn completion_filter_uses_smaller_removal_set() {
        let output = clean_completion(
            r#"<section class="p-2"><script>x()</script><footer>f</footer><object data="a.swf"></object></section>"#,
        );
        assert_eq!(
            output,
            r#"<section class="p-2">x()f<object data="a.swf"></object></section>"#
        );
    }

    #[test]
    fn keeps_non_ascii_text() {
        let raw = "<p>Crème brûlée: 10 €</p>";
        assert_eq!(sanitize_snippet(raw).unwrap().as_str(), raw);
    }
}
