//! Plain-text field cleanup for titles, keys and prompts.

use std::sync::LazyLock;

use regex::Regex;

static SCRIPT_OR_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script[^>]*>.*?</script\s*>|<style[^>]*>.*?</style\s*>")
        .expect("static pattern")
});

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[A-Za-z/!?][^>]*>").expect("static pattern"));

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n\t ]+").expect("static pattern"));

static PERCENT_OCTET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%[A-Fa-f0-9]{2}").expect("static pattern"));

/// Remove every tag, dropping `<script>`/`<style>` elements with their content.
pub fn strip_tags(input: &str) -> String {
    let without_blocks = SCRIPT_OR_STYLE.replace_all(input, "");
    TAG.replace_all(&without_blocks, "").into_owned()
}

/// Single-line field: tags stripped, line breaks and tabs folded into single
/// spaces, percent-encoded octets removed, trimmed.
pub fn sanitize_text_field(input: &str) -> String {
    sanitize(input, false)
}

/// Multi-line field: like [`sanitize_text_field`] but newlines survive.
pub fn sanitize_textarea_field(input: &str) -> String {
    sanitize(input, true)
}

fn sanitize(input: &str, keep_newlines: bool) -> String {
    let mut text = if input.contains('<') {
        strip_tags(input)
    } else {
        input.to_string()
    };

    if !keep_newlines {
        text = WHITESPACE_RUN.replace_all(&text, " ").into_owned();
    }

    let mut text = text.trim().to_string();
    // Removing one octet can expose another ("%%4141").
    while PERCENT_OCTET.is_match(&text) {
        text = PERCENT_OCTET.replace_all(&text, "").trim().to_string();
    }
    text
}
