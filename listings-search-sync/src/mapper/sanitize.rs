//! Rich-text description sanitization.
//!
//! Descriptions arrive as user-authored HTML. The index only ever stores
//! plain text. Entities are decoded first, then dangerous elements are
//! dropped with their content, every remaining tag is stripped and
//! whitespace is collapsed.

use std::sync::LazyLock;

use regex::Regex;
use unicode_segmentation::UnicodeSegmentation;

/// Appended to a truncated description.
pub const ELLIPSIS: char = '…';

/// Elements removed together with everything they enclose.
const DANGEROUS_ELEMENTS: [&str; 5] = ["script", "style", "iframe", "object", "embed"];

static DANGEROUS_BLOCKS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    DANGEROUS_ELEMENTS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</\s*{tag}\s*>"))
                .expect("static element pattern")
        })
        .collect()
});

/// Unclosed or self-closing dangerous tags.
static DANGEROUS_TAGS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)</?\s*(script|style|iframe|object|embed)\b[^>]*>").expect("static tag pattern")
});

static EVENT_HANDLERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\s+on[a-z]+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).expect("static handler pattern")
});

static DANGEROUS_URLS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(javascript|vbscript)\s*:|data\s*:\s*text/html").expect("static url pattern")
});

static COMMENTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("static comment pattern"));

static TAGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)</?[a-zA-Z!][^>]*>").expect("static markup pattern"));

static ENTITIES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(#[0-9]{1,7}|#[xX][0-9a-fA-F]{1,6}|[a-zA-Z]{2,8});").expect("static entity pattern")
});

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("static whitespace pattern"));

/// Turn an HTML description into plain text of at most `budget` characters
/// plus the ellipsis.
///
/// # Arguments
///
/// * `html` - The raw description
/// * `budget` - Maximum number of characters kept before truncating
///
/// # Returns
///
/// The sanitized text. Text at or under the budget is returned whole.
pub fn sanitize_description(html: &str, budget: usize) -> String {
    truncate_chars(&to_plain_text(html), budget)
}

/// Decode entities, strip dangerous content and all markup, collapse whitespace.
///
/// Stripping repeats until the text stops changing, so fragments that only
/// form a tag or a scheme once an inner match is removed are caught too.
pub fn to_plain_text(html: &str) -> String {
    let mut text = decode_entities(html);
    loop {
        let stripped = strip_pass(&text);
        if stripped == text {
            break;
        }
        text = stripped;
    }
    WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

/// One round of removals. Every replacement is shorter than what it
/// replaces, so repeated rounds reach a fixed point.
fn strip_pass(input: &str) -> String {
    let mut text = COMMENTS.replace_all(input, " ").into_owned();
    for block in DANGEROUS_BLOCKS.iter() {
        text = block.replace_all(&text, " ").into_owned();
    }
    text = DANGEROUS_TAGS.replace_all(&text, " ").into_owned();
    text = EVENT_HANDLERS.replace_all(&text, "").into_owned();
    text = TAGS.replace_all(&text, " ").into_owned();
    DANGEROUS_URLS.replace_all(&text, "").into_owned()
}

/// Decode named entities commonly found in rich text, plus numeric ones.
/// Unknown entities are left as written.
pub fn decode_entities(text: &str) -> String {
    ENTITIES
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let entity = &caps[1];
            decode_entity(entity)
                .map(String::from)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }

    let decoded = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "ndash" => '–',
        "mdash" => '—',
        "hellip" => '…',
        "rsquo" => '’',
        "lsquo" => '‘',
        "rdquo" => '”',
        "ldquo" => '“',
        "euro" => '€',
        "copy" => '©',
        "reg" => '®',
        _ => return None,
    };
    Some(decoded)
}

/// Keep at most `budget` characters, appending `…` when anything was cut.
///
/// The cut backs off to the previous grapheme boundary so a base character
/// never loses its combining marks or joined sequence.
pub fn truncate_chars(text: &str, budget: usize) -> String {
    let Some((limit, _)) = text.char_indices().nth(budget) else {
        return text.to_string();
    };
    let cut = text
        .grapheme_indices(true)
        .map(|(start, _)| start)
        .take_while(|start| *start <= limit)
        .last()
        .unwrap_or(0);

    let mut truncated = text[..cut].trim_end().to_string();
    truncated.push(ELLIPSIS);
    truncated
}
