// src/entity/markup.rs
//! Text extraction and small edits over the HTML-like note body.

/// Body of a freshly created note
pub const EMPTY_DOCUMENT: &str =
    "<html dir=\"ltr\"><head></head><body contenteditable=\"true\"></body></html>\n";

/// Tags that separate words when the markup is flattened to text
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "blockquote", "body", "br", "dd", "div", "dl", "dt", "h1", "h2", "h3",
    "h4", "h5", "h6", "head", "hr", "html", "li", "ol", "p", "pre", "section", "table", "td",
    "th", "title", "tr", "ul",
];

/// Flatten markup to its text content.
///
/// Tags are removed, block-level tags act as word separators, character
/// references are decoded and runs of whitespace collapse to a single space.
pub fn plain_text(markup: &str) -> String {
    let mut raw = String::with_capacity(markup.len());
    let mut rest = markup;

    while let Some(lt) = rest.find('<') {
        raw.push_str(&rest[..lt]);
        let after = &rest[lt + 1..];

        if !starts_tag(after) {
            raw.push('<');
            rest = after;
            continue;
        }

        match after.find('>') {
            Some(gt) => {
                if is_block_tag(&after[..gt]) {
                    raw.push(' ');
                }
                rest = &after[gt + 1..];
            }
            None => {
                rest = "";
            }
        }
    }
    raw.push_str(rest);

    collapse_whitespace(&decode_entities(&raw))
}

fn starts_tag(s: &str) -> bool {
    matches!(s.chars().next(), Some(c) if c.is_ascii_alphabetic() || c == '/' || c == '!' || c == '?')
}

fn is_block_tag(tag: &str) -> bool {
    let name: String = tag
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    BLOCK_TAGS.contains(&name.as_str())
}

fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];

        let decoded = after
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&after[..semi]).map(|c| (c, semi)));

        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Set the background colour of the `<body>` element.
///
/// Inserts `style='background-color: <color>;'` right after `<body` when the
/// tag has no style attribute, otherwise replaces the existing attribute's
/// value. Markup without a complete `<body>` opening tag, or whose style
/// value is missing its closing quote, is returned unchanged.
pub fn with_background_color(markup: &str, color: &str) -> String {
    let style = format!("'background-color: {};'", color);

    let Some(tag_start) = find_body_tag(markup) else {
        tracing::warn!("no <body> tag found, leaving markup unchanged");
        return markup.to_string();
    };
    let name_end = tag_start + "<body".len();
    let Some(tag_len) = markup[name_end..].find('>') else {
        tracing::warn!("unterminated <body> tag, leaving markup unchanged");
        return markup.to_string();
    };
    let tag_end = name_end + tag_len;

    match find_style_attr(&markup[name_end..tag_end]) {
        StyleAttr::Value(value_start, value_end) => {
            let value_start = name_end + value_start;
            let value_end = name_end + value_end;
            format!("{}{}{}", &markup[..value_start], style, &markup[value_end..])
        }
        StyleAttr::Missing => {
            format!("{} style={}{}", &markup[..name_end], style, &markup[name_end..])
        }
        StyleAttr::Unterminated => {
            tracing::warn!("unterminated style attribute on <body>, leaving markup unchanged");
            markup.to_string()
        }
    }
}

fn find_body_tag(markup: &str) -> Option<usize> {
    let lower = markup.to_ascii_lowercase();
    let mut offset = 0;
    while let Some(pos) = lower[offset..].find("<body") {
        let start = offset + pos;
        let next = lower[start + "<body".len()..].chars().next();
        if matches!(next, Some(c) if c.is_whitespace() || c == '>' || c == '/') {
            return Some(start);
        }
        offset = start + "<body".len();
    }
    None
}

enum StyleAttr {
    Missing,
    /// Byte range of the value, quotes included
    Value(usize, usize),
    /// A quoted value with no closing quote
    Unterminated,
}

/// Locate the `style` attribute's value within the attribute text of a tag.
fn find_style_attr(attrs: &str) -> StyleAttr {
    let lower = attrs.to_ascii_lowercase();
    let mut offset = 0;
    while let Some(pos) = lower[offset..].find("style") {
        let start = offset + pos;
        offset = start + "style".len();

        let preceded_by_space = lower[..start]
            .chars()
            .next_back()
            .is_some_and(char::is_whitespace);
        if !preceded_by_space {
            continue;
        }

        let after_name = &attrs[offset..];
        let trimmed = after_name.trim_start();
        let Some(value) = trimmed.strip_prefix('=') else {
            continue;
        };
        let value_trimmed = value.trim_start();
        let value_start = attrs.len() - value_trimmed.len();

        let value_len = match value_trimmed.chars().next() {
            Some(q @ ('\'' | '"')) => match value_trimmed[1..].find(q) {
                Some(end) => end + 2,
                None => return StyleAttr::Unterminated,
            },
            Some(_) => value_trimmed
                .find(char::is_whitespace)
                .unwrap_or(value_trimmed.len()),
            None => 0,
        };
        return StyleAttr::Value(value_start, value_start + value_len);
    }
    StyleAttr::Missing
}
