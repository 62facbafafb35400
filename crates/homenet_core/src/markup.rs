//! Text renderer: turns a raw AI answer into a display-safe HTML fragment.
//!
//! The renderer is an ordered list of pure passes. Every pass after the first
//! only ever sees escaped text plus markup emitted by earlier passes, so raw
//! input can never introduce structure of its own.

use std::sync::LazyLock;

use engine_logging::{engine_debug, engine_trace};
use regex::{Captures, Regex};

/// Explicit line-break marker emitted for every newline.
pub const LINE_BREAK: &str = "<br>";

const STRONG_OPEN: &str = r#"<strong class="font-bold text-white">"#;
const EM_OPEN: &str = r#"<em class="italic">"#;
const CODE_OPEN: &str = r#"<code class="bg-gray-800 px-2 py-1 rounded text-green-400 text-sm">"#;
const LINK_ATTRS: &str =
    r#"target="_blank" rel="noopener noreferrer" class="text-blue-400 hover:text-blue-300 underline""#;

static CHAR_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"^&(?:[A-Za-z][A-Za-z0-9]{1,31}|#[0-9]{1,7}|#[xX][0-9A-Fa-f]{1,6});")
});
static BOLD_STARS: LazyLock<Regex> = LazyLock::new(|| compile(r"\*\*(.*?)\*\*"));
static BOLD_UNDERSCORES: LazyLock<Regex> = LazyLock::new(|| compile(r"__(.*?)__"));
static ITALIC_STAR: LazyLock<Regex> = LazyLock::new(|| compile(r"\*(.*?)\*"));
static ITALIC_UNDERSCORE: LazyLock<Regex> = LazyLock::new(|| compile(r"_(.*?)_"));
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| compile(r"`([^`]+)`"));
static HEADING: LazyLock<Regex> = LazyLock::new(|| compile(r"^(#{1,3}) (.*)$"));
static MARKDOWN_LINK: LazyLock<Regex> = LazyLock::new(|| compile(r"\[([^\]]+)\]\(([^)]+)\)"));
static ANCHOR_ELEMENT: LazyLock<Regex> = LazyLock::new(|| compile(r"(?s)<a\s[^>]*>.*?</a>"));
static STRICT_URL: LazyLock<Regex> = LazyLock::new(|| {
    compile(
        r"https?://(?:www\.)?[-a-zA-Z0-9@:%._+~#=]{1,256}\.[a-zA-Z0-9()]{1,6}\b(?:&amp;|[-a-zA-Z0-9()@:%_+.~#?/=])*",
    )
});
static PERMISSIVE_URL: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"https?://(?:&amp;|[^\s<>"'&])+"#));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("renderer pattern is a valid regex")
}

type Pass = fn(&str) -> String;

/// Passes in application order. Later passes rely on earlier ones having run.
const PASSES: [(&str, Pass); 8] = [
    ("escape", escape_html),
    ("line_breaks", convert_line_breaks),
    ("bold", apply_bold),
    ("italic", apply_italic),
    ("inline_code", apply_inline_code),
    ("headings", apply_headings),
    ("links", apply_markdown_links),
    ("bare_urls", link_bare_urls),
];

/// Renders raw response text into an HTML fragment.
pub fn render(raw: &str) -> String {
    engine_debug!("Formatting response text, length: {}", raw.len());
    let rendered = PASSES.iter().fold(raw.to_string(), |text, (name, pass)| {
        let next = pass(&text);
        engine_trace!("Render pass {} produced {} bytes", name, next.len());
        next
    });
    engine_debug!("Response formatting completed");
    rendered
}

/// Escapes `&`, `<`, `>` and `"`.
///
/// An ampersand that already starts a character reference is kept, which
/// makes the function idempotent: `escape_html(escape_html(x)) == escape_html(x)`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for (idx, ch) in text.char_indices() {
        match ch {
            '&' if CHAR_REFERENCE.is_match(&text[idx..]) => out.push('&'),
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn convert_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', LINE_BREAK)
}

/// `**x**` and `__x__`, shortest match.
pub fn apply_bold(text: &str) -> String {
    let replacement = format!("{STRONG_OPEN}$1</strong>");
    let text = BOLD_STARS.replace_all(text, replacement.as_str());
    BOLD_UNDERSCORES
        .replace_all(&text, replacement.as_str())
        .into_owned()
}

/// `*x*` and `_x_`, shortest match. Must run after [`apply_bold`].
pub fn apply_italic(text: &str) -> String {
    let replacement = format!("{EM_OPEN}$1</em>");
    let text = ITALIC_STAR.replace_all(text, replacement.as_str());
    ITALIC_UNDERSCORE
        .replace_all(&text, replacement.as_str())
        .into_owned()
}

pub fn apply_inline_code(text: &str) -> String {
    let replacement = format!("{CODE_OPEN}$1</code>");
    INLINE_CODE
        .replace_all(text, replacement.as_str())
        .into_owned()
}

/// `#`, `##` and `###` at the start of a line.
///
/// Newlines are already `<br>` markers here, so a line is whatever sits
/// between two markers.
pub fn apply_headings(text: &str) -> String {
    text.split(LINE_BREAK)
        .map(|line| {
            HEADING
                .replace(line, |caps: &Captures| {
                    let level = caps[1].len();
                    let size = match level {
                        1 => "text-3xl",
                        2 => "text-2xl",
                        _ => "text-xl",
                    };
                    format!(
                        r#"<h{level} class="{size} font-bold text-white mb-4">{}</h{level}>"#,
                        &caps[2]
                    )
                })
                .into_owned()
        })
        .collect::<Vec<_>>()
        .join(LINE_BREAK)
}

/// `[label](target)`; unsafe targets stay literal text.
pub fn apply_markdown_links(text: &str) -> String {
    MARKDOWN_LINK
        .replace_all(text, |caps: &Captures| {
            let label = &caps[1];
            let target = caps[2].trim();
            if is_safe_link_target(target) {
                anchor(target, label)
            } else {
                engine_debug!("Leaving link with unsafe target as text: {}", target);
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Links bare URLs outside anchors built by earlier passes.
///
/// The strict pattern is used when it matches anywhere in the text; only when
/// it matches nowhere does the permissive pattern get a turn. The choice is
/// made once for the whole text, not per URL.
pub fn link_bare_urls(text: &str) -> String {
    let plain = plain_segments(text);
    let pattern: &Regex = if plain.iter().any(|segment| STRICT_URL.is_match(segment)) {
        &*STRICT_URL
    } else if plain.iter().any(|segment| PERMISSIVE_URL.is_match(segment)) {
        engine_debug!("Found URLs with simple pattern only");
        &*PERMISSIVE_URL
    } else {
        return text.to_string();
    };

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for existing in ANCHOR_ELEMENT.find_iter(text) {
        out.push_str(&link_segment(&text[last..existing.start()], pattern));
        out.push_str(existing.as_str());
        last = existing.end();
    }
    out.push_str(&link_segment(&text[last..], pattern));
    out
}

fn plain_segments(text: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut last = 0;
    for existing in ANCHOR_ELEMENT.find_iter(text) {
        segments.push(&text[last..existing.start()]);
        last = existing.end();
    }
    segments.push(&text[last..]);
    segments
}

fn link_segment(segment: &str, pattern: &Regex) -> String {
    pattern
        .replace_all(segment, |caps: &Captures| anchor(&caps[0], &caps[0]))
        .into_owned()
}

fn anchor(href: &str, label: &str) -> String {
    format!(r#"<a href="{href}" {LINK_ATTRS}>{label}</a>"#)
}

/// Web and mail links, plus relative references without a scheme.
///
/// Targets containing markup from earlier passes are rejected so the `href`
/// attribute can never be broken open. An `&` outside a leading web prefix
/// could spell an encoded `:`, so it disqualifies a relative target too.
fn is_safe_link_target(target: &str) -> bool {
    if target.contains('<') || target.contains('>') {
        return false;
    }
    let lower = target.to_ascii_lowercase();
    const ALLOWED_PREFIXES: [&str; 8] =
        ["http://", "https://", "mailto:", "/", "#", "?", "./", "../"];
    if ALLOWED_PREFIXES.iter().any(|prefix| lower.starts_with(prefix)) {
        return true;
    }
    !lower.contains(':') && !lower.contains('&')
}
