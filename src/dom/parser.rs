//! Lenient HTML parser building a [`Document`].
//!
//! Handles comments, doctypes, void elements, raw-text elements and the common
//! character references. Content is routed into `<head>` until the first
//! element or text that belongs in the body. Unclosed elements are closed at
//! end of input; stray end tags are ignored.

use crate::dom::document::{Document, NodeId};

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose content is not parsed as markup.
const RAW_TEXT_TAGS: &[&str] = &["script", "style", "textarea", "title", "xmp"];

/// Elements allowed in `<head>`; anything else before `<body>` opens the body.
const HEAD_TAGS: &[&str] = &[
    "base", "link", "meta", "noscript", "script", "style", "template", "title",
];

/// Start tags that implicitly close an open `<p>`.
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "div", "dl", "fieldset", "footer", "form",
    "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "main", "nav", "ol", "p", "pre",
    "section", "table", "ul",
];

/// Parses `html` into a document with the given URL.
pub fn parse_html(html: &str, url: &str) -> Document {
    let mut builder = TreeBuilder::new(url);
    let mut pos = 0;

    while pos < html.len() {
        let rest = &html[pos..];

        if let Some(after) = rest.strip_prefix("<!--") {
            let (text, consumed) = match after.find("-->") {
                Some(end) => (&after[..end], 4 + end + 3),
                None => (after, rest.len()),
            };
            builder.comment(text);
            pos += consumed;
            continue;
        }

        if rest.starts_with("<!") || rest.starts_with("<?") {
            pos += rest.find('>').map(|i| i + 1).unwrap_or(rest.len());
            continue;
        }

        if rest.starts_with("</") {
            if let Some((name, consumed)) = parse_end_tag(rest) {
                builder.end_tag(&name);
                pos += consumed;
                continue;
            }
        }

        if rest.starts_with('<') {
            if let Some(tag) = parse_start_tag(rest) {
                pos += tag.consumed;
                let is_raw = RAW_TEXT_TAGS.contains(&tag.name.as_str());
                builder.start_tag(&tag.name, &tag.attributes, tag.self_closing);
                if is_raw && !tag.self_closing {
                    let body = &html[pos..];
                    let closing = format!("</{}", tag.name);
                    let end = body.to_ascii_lowercase().find(&closing);
                    let raw = match end {
                        Some(end) => &body[..end],
                        None => body,
                    };
                    if !raw.is_empty() {
                        if tag.name == "script" || tag.name == "style" || tag.name == "xmp" {
                            builder.text(raw);
                        } else {
                            builder.text(&decode_entities(raw));
                        }
                    }
                    builder.end_tag(&tag.name);
                    pos += match end {
                        Some(end) => {
                            let after_name = &body[end..];
                            end + after_name.find('>').map(|i| i + 1).unwrap_or(after_name.len())
                        }
                        None => body.len(),
                    };
                }
                continue;
            }
        }

        // Plain text up to the next '<' (always consuming at least one char).
        let first_len = rest.chars().next().map(char::len_utf8).unwrap_or(1);
        let next = rest[first_len..]
            .find('<')
            .map(|i| i + first_len)
            .unwrap_or(rest.len());
        builder.text(&decode_entities(&rest[..next]));
        pos += next;
    }

    builder.finish()
}

struct StartTag {
    name: String,
    attributes: Vec<(String, String)>,
    self_closing: bool,
    consumed: usize,
}

fn parse_start_tag(input: &str) -> Option<StartTag> {
    let bytes = input.as_bytes();
    if bytes.len() < 2 || !bytes[1].is_ascii_alphabetic() {
        return None;
    }
    let mut i = 1;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-' || bytes[i] == b':') {
        i += 1;
    }
    let name = input[1..i].to_ascii_lowercase();
    let mut attributes = Vec::new();

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            return None;
        }
        match bytes[i] {
            b'>' => {
                return Some(StartTag {
                    name,
                    attributes,
                    self_closing: false,
                    consumed: i + 1,
                })
            }
            b'/' if bytes.get(i + 1) == Some(&b'>') => {
                return Some(StartTag {
                    name,
                    attributes,
                    self_closing: true,
                    consumed: i + 2,
                })
            }
            _ => {}
        }

        let name_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        if i == name_start {
            // Stray '/' or similar; skip it.
            i += 1;
            continue;
        }
        let attr_name = input[name_start..i].to_ascii_lowercase();

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            let value = if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
                let quote = bytes[i];
                let value_start = i + 1;
                let value_end = input[value_start..]
                    .bytes()
                    .position(|b| b == quote)
                    .map(|p| value_start + p)
                    .unwrap_or(bytes.len());
                i = (value_end + 1).min(bytes.len());
                &input[value_start..value_end]
            } else {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                &input[value_start..i]
            };
            push_attribute(&mut attributes, attr_name, decode_entities(value));
        } else {
            push_attribute(&mut attributes, attr_name, String::new());
        }
    }
}

/// The first occurrence of an attribute wins, as in browsers.
fn push_attribute(attributes: &mut Vec<(String, String)>, name: String, value: String) {
    if !attributes.iter().any(|(n, _)| *n == name) {
        attributes.push((name, value));
    }
}

fn parse_end_tag(input: &str) -> Option<(String, usize)> {
    let bytes = input.as_bytes();
    if bytes.len() < 3 || !bytes[2].is_ascii_alphabetic() {
        return None;
    }
    let mut i = 2;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-' || bytes[i] == b':') {
        i += 1;
    }
    let name = input[2..i].to_ascii_lowercase();
    let consumed = input[i..]
        .find('>')
        .map(|p| i + p + 1)
        .unwrap_or(input.len());
    Some((name, consumed))
}

/// Decodes the character references that show up in article text.
pub fn decode_entities(input: &str) -> String {
    if !input.contains('&') {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|&semi| semi > 0 && semi <= 10)
            .and_then(|semi| decode_reference(&after[..semi]).map(|c| (c, semi)));
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

fn decode_reference(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix('x').or_else(|| num.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "hellip" => '\u{2026}',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        "copy" => '\u{a9}',
        "reg" => '\u{ae}',
        "trade" => '\u{2122}',
        "middot" => '\u{b7}',
        "laquo" => '\u{ab}',
        "raquo" => '\u{bb}',
        _ => return None,
    };
    Some(c)
}

// === Tree construction ===

struct TreeBuilder {
    doc: Document,
    html: NodeId,
    head: NodeId,
    body: NodeId,
    /// Open elements; index 0 is `<html>`, index 1 is `<head>` or `<body>`.
    stack: Vec<NodeId>,
    in_body: bool,
}

impl TreeBuilder {
    fn new(url: &str) -> Self {
        let doc = Document::new(url);
        // The skeleton always exists in a fresh document.
        let html = doc.document_element().unwrap_or(0);
        let head = doc.head().unwrap_or(html);
        let body = doc.body().unwrap_or(html);
        Self {
            doc,
            html,
            head,
            body,
            stack: vec![html, head],
            in_body: false,
        }
    }

    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(self.body)
    }

    fn enter_body(&mut self) {
        if !self.in_body {
            self.in_body = true;
            self.stack = vec![self.html, self.body];
        }
    }

    fn copy_attributes(&mut self, target: NodeId, attributes: &[(String, String)]) {
        for (name, value) in attributes {
            if self.doc.attribute(target, name).is_none() {
                self.doc.set_attribute(target, name, value);
            }
        }
    }

    fn start_tag(&mut self, name: &str, attributes: &[(String, String)], self_closing: bool) {
        match name {
            "html" => {
                self.copy_attributes(self.html, attributes);
                return;
            }
            "head" => {
                self.copy_attributes(self.head, attributes);
                return;
            }
            "body" => {
                self.enter_body();
                self.copy_attributes(self.body, attributes);
                return;
            }
            _ => {}
        }

        if !self.in_body && !HEAD_TAGS.contains(&name) {
            self.enter_body();
        }

        if self.in_body {
            if CLOSES_P.contains(&name) {
                self.close_if_open("p");
            }
            if name == "li" {
                self.close_if_open("li");
            }
        }

        let parent = self.current();
        let id = self.doc.create_element(name);
        for (attr, value) in attributes {
            self.doc.set_attribute(id, attr, value);
        }
        self.doc.append_child(parent, id);

        if !self_closing && !VOID_TAGS.contains(&name) {
            self.stack.push(id);
        }
    }

    /// Pops `tag` if it is the innermost open element.
    fn close_if_open(&mut self, tag: &str) {
        if self.stack.len() > 2 && self.doc.tag_name(self.current()) == Some(tag) {
            self.stack.pop();
        }
    }

    fn end_tag(&mut self, name: &str) {
        if matches!(name, "html" | "head" | "body") {
            return;
        }
        let found = self
            .stack
            .iter()
            .enumerate()
            .skip(2)
            .rev()
            .find(|(_, &id)| self.doc.tag_name(id) == Some(name))
            .map(|(idx, _)| idx);
        if let Some(idx) = found {
            self.stack.truncate(idx);
        }
    }

    fn text(&mut self, text: &str) {
        if !self.in_body && self.stack.len() <= 2 {
            if text.trim().is_empty() {
                return;
            }
            self.enter_body();
        }
        let parent = self.current();
        self.doc.append_text_merged(parent, text);
    }

    fn comment(&mut self, text: &str) {
        let parent = self.current();
        let id = self.doc.create_comment(text);
        self.doc.append_child(parent, id);
    }

    fn finish(self) -> Document {
        self.doc
    }
}
