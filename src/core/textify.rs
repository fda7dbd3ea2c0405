use crate::core::epub::resolve_href;
use crate::domain::model::{Chapter, ImageRef};
use regex::Regex;
use std::sync::LazyLock;

static BODY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<body\b[^>]*>(.*?)(?:</body\s*>|\z)").unwrap());

static MARKUP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--.*?(?:-->|\z)|<!\[CDATA\[.*?\]\]>|<![^>]*>|<\?.*?\?>|<(/?)([A-Za-z][A-Za-z0-9:_.-]*)((?:[^>\x22']|\x22[^\x22]*\x22|'[^']*')*)>")
        .unwrap()
});

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>/]+))"#).unwrap()
});

static IMAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\[img="([^"]+)" "([^"]*)"\]"#).unwrap());

/// The content of `<body>`, or the whole document when it has none.
pub fn chapter_body(html: &str) -> &str {
    BODY_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(html)
}

fn attribute(attrs: &str, wanted: &str) -> Option<String> {
    ATTR_RE.captures_iter(attrs).find_map(|caps| {
        let name = caps.get(1)?.as_str();
        if !name.eq_ignore_ascii_case(wanted) {
            return None;
        }
        let value = caps.get(2).or_else(|| caps.get(3)).or_else(|| caps.get(4))?;
        Some(html_escape::decode_html_entities(value.as_str()).into_owned())
    })
}

/// Text dump of an HTML fragment.
///
/// Tags are dropped and character data kept as-is with entities decoded.
/// `<br>` becomes a line break, `<script>`/`<style>` content is skipped and
/// images become `[img="path" "alt"]` markers with `path` resolved against
/// `base_dir`. Lines longer than `maxcol` are wrapped when it is set.
pub fn textify(html: &str, base_dir: &str, maxcol: Option<usize>) -> String {
    let mut out = String::with_capacity(html.len());
    let mut skipping: Option<String> = None;
    let mut last = 0;

    for caps in MARKUP_RE.captures_iter(html) {
        let Some(whole) = caps.get(0) else { continue };
        if skipping.is_none() {
            out.push_str(&html_escape::decode_html_entities(&html[last..whole.start()]));
        }
        last = whole.end();

        let Some(tag) = caps.get(2) else { continue };
        let tag = tag.as_str().to_ascii_lowercase();
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let attrs = caps.get(3).map(|m| m.as_str()).unwrap_or("");

        if let Some(skipped) = &skipping {
            if closing && *skipped == tag {
                skipping = None;
            }
            continue;
        }

        match tag.as_str() {
            "script" | "style" if !closing && !attrs.trim_end().ends_with('/') => {
                skipping = Some(tag);
            }
            "br" => out.push('\n'),
            "img" | "image" if !closing => {
                let src = attribute(attrs, "src")
                    .or_else(|| attribute(attrs, "href"))
                    .unwrap_or_default();
                if !src.is_empty() {
                    let alt = attribute(attrs, "alt").unwrap_or_default();
                    out.push_str(&format!(
                        "[img=\"{}\" \"{}\"]",
                        resolve_href(base_dir, &src),
                        alt.replace('"', "'")
                    ));
                }
            }
            _ => {}
        }
    }

    if skipping.is_none() {
        out.push_str(&html_escape::decode_html_entities(&html[last..]));
    }

    match maxcol {
        Some(maxcol) => wrap_text(&out, maxcol),
        None => out,
    }
}

fn wrap_segment(segment: &str, maxcol: usize, wrapped: &mut Vec<String>) {
    let mut rest: Vec<char> = segment.chars().collect();
    while rest.len() > maxcol {
        let split = rest[..=maxcol]
            .iter()
            .rposition(|c| c.is_whitespace())
            .filter(|&idx| idx > 0);

        match split {
            Some(idx) => {
                wrapped.push(rest[..idx].iter().collect::<String>().trim_end().to_string());
                rest.drain(..=idx);
            }
            None => {
                wrapped.push(rest[..maxcol].iter().collect());
                rest.drain(..maxcol);
            }
        }
    }
    wrapped.push(rest.into_iter().collect());
}

/// Break every line longer than `maxcol` characters, preferring whitespace.
///
/// Image markers are never split: a long line carrying a marker is cut
/// around it and the marker gets a line of its own.
pub fn wrap_text(text: &str, maxcol: usize) -> String {
    let maxcol = maxcol.max(1);
    let mut wrapped: Vec<String> = Vec::new();

    for line in text.split('\n') {
        if line.chars().count() <= maxcol || !IMAGE_RE.is_match(line) {
            wrap_segment(line, maxcol, &mut wrapped);
            continue;
        }

        let mut last = 0;
        for marker in IMAGE_RE.find_iter(line) {
            let before = line[last..marker.start()].trim();
            if !before.is_empty() {
                wrap_segment(before, maxcol, &mut wrapped);
            }
            wrapped.push(marker.as_str().to_string());
            last = marker.end();
        }
        let after = line[last..].trim();
        if !after.is_empty() {
            wrap_segment(after, maxcol, &mut wrapped);
        }
    }

    wrapped.join("\n")
}

/// Split rendered text into display lines and index the image markers by line.
pub fn render_chapter(text: &str) -> Chapter {
    let lines: Vec<String> = text.split('\n').map(str::to_string).collect();
    let images = lines
        .iter()
        .enumerate()
        .flat_map(|(row, line)| image_refs(line).into_iter().map(move |image| (row, image)))
        .collect();
    Chapter::new(lines, images)
}

/// Image markers on one rendered line.
pub fn image_refs(line: &str) -> Vec<ImageRef> {
    IMAGE_RE
        .captures_iter(line)
        .map(|caps| ImageRef {
            path: caps[1].to_string(),
            alt: caps[2].to_string(),
        })
        .collect()
}
