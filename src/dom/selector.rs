//! A small CSS selector engine.
//!
//! Supports selector lists, type and universal selectors, `.class`, `#id`,
//! attribute selectors (`[a]`, `=`, `*=`, `^=`, `$=`, `~=`, `|=`, with an
//! optional `i` flag), and the descendant and child combinators. Anything else
//! (pseudo-classes, sibling combinators, namespaces) is rejected with
//! `SelectorError::Unsupported`.

use crate::dom::document::{Document, NodeId};
use crate::types::errors::SelectorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Equals,
    Contains,
    Prefix,
    Suffix,
    Includes,
    DashMatch,
}

#[derive(Debug, Clone, PartialEq)]
struct AttrSelector {
    name: String,
    op: Option<(AttrOp, String)>,
    case_insensitive: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
}

/// Compounds from left to right; each carries the combinator linking it to the previous one.
#[derive(Debug, Clone, PartialEq)]
struct Complex {
    parts: Vec<(Combinator, Compound)>,
}

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let source = input.trim().to_string();
        if source.is_empty() {
            return Err(SelectorError::Empty);
        }
        let mut parser = Parser {
            chars: source.chars().collect(),
            pos: 0,
            source: &source,
        };
        let alternatives = parser.parse_list()?;
        Ok(Self {
            source: source.clone(),
            alternatives,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True when the node is an element matched by any selector in the list.
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        self.alternatives
            .iter()
            .any(|complex| complex_matches(doc, id, &complex.parts))
    }
}

// === Matching ===

fn complex_matches(doc: &Document, id: NodeId, parts: &[(Combinator, Compound)]) -> bool {
    let Some(((combinator, last), rest)) = parts.split_last() else {
        return false;
    };
    compound_matches(doc, id, last) && rest_matches(doc, id, rest, *combinator)
}

/// Matches `remaining` against the ancestors of `id`, where `combinator` links
/// `id` to the last compound in `remaining`.
fn rest_matches(
    doc: &Document,
    id: NodeId,
    remaining: &[(Combinator, Compound)],
    combinator: Combinator,
) -> bool {
    let Some(((next_combinator, compound), rest)) = remaining.split_last() else {
        return true;
    };
    match combinator {
        Combinator::Child => match element_parent(doc, id) {
            Some(parent) => {
                compound_matches(doc, parent, compound)
                    && rest_matches(doc, parent, rest, *next_combinator)
            }
            None => false,
        },
        Combinator::Descendant => {
            let mut current = element_parent(doc, id);
            while let Some(ancestor) = current {
                if compound_matches(doc, ancestor, compound)
                    && rest_matches(doc, ancestor, rest, *next_combinator)
                {
                    return true;
                }
                current = element_parent(doc, ancestor);
            }
            false
        }
    }
}

fn element_parent(doc: &Document, id: NodeId) -> Option<NodeId> {
    doc.parent(id).filter(|&p| doc.element(p).is_some())
}

fn compound_matches(doc: &Document, id: NodeId, compound: &Compound) -> bool {
    let Some(el) = doc.element(id) else {
        return false;
    };
    if let Some(tag) = &compound.tag {
        if el.tag() != tag.as_str() {
            return false;
        }
    }
    if !compound.ids.iter().all(|id| el.id() == Some(id.as_str())) {
        return false;
    }
    if !compound.classes.iter().all(|c| el.has_class(c)) {
        return false;
    }
    compound.attrs.iter().all(|attr| {
        let Some(actual) = el.attribute(&attr.name) else {
            return false;
        };
        let Some((op, expected)) = &attr.op else {
            return true;
        };
        let (actual, expected) = if attr.case_insensitive {
            (actual.to_lowercase(), expected.to_lowercase())
        } else {
            (actual.to_string(), expected.clone())
        };
        match op {
            AttrOp::Equals => actual == expected,
            AttrOp::Contains => !expected.is_empty() && actual.contains(&expected),
            AttrOp::Prefix => !expected.is_empty() && actual.starts_with(&expected),
            AttrOp::Suffix => !expected.is_empty() && actual.ends_with(&expected),
            AttrOp::Includes => actual.split_whitespace().any(|w| w == expected),
            AttrOp::DashMatch => {
                actual == expected || actual.starts_with(&format!("{}-", expected))
            }
        }
    })
}

// === Parsing ===

struct Parser<'a> {
    chars: Vec<char>,
    pos: usize,
    source: &'a str,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    /// Skips whitespace and reports whether any was skipped.
    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn unexpected(&self) -> SelectorError {
        match self.peek() {
            Some(found) => SelectorError::Unexpected {
                selector: self.source.to_string(),
                position: self.pos,
                found,
            },
            None => SelectorError::Unterminated {
                selector: self.source.to_string(),
                what: "selector",
            },
        }
    }

    fn unsupported(&self, feature: &str) -> SelectorError {
        SelectorError::Unsupported {
            selector: self.source.to_string(),
            feature: feature.to_string(),
        }
    }

    fn parse_list(&mut self) -> Result<Vec<Complex>, SelectorError> {
        let mut list = Vec::new();
        loop {
            self.skip_ws();
            list.push(self.parse_complex()?);
            self.skip_ws();
            match self.peek() {
                None => return Ok(list),
                Some(',') => self.pos += 1,
                Some(_) => return Err(self.unexpected()),
            }
        }
    }

    fn parse_complex(&mut self) -> Result<Complex, SelectorError> {
        let mut parts = Vec::new();
        let mut combinator = Combinator::Descendant;
        loop {
            let compound = self.parse_compound()?;
            parts.push((combinator, compound));
            let had_ws = self.skip_ws();
            match self.peek() {
                None | Some(',') => return Ok(Complex { parts }),
                Some('>') => {
                    self.pos += 1;
                    self.skip_ws();
                    combinator = Combinator::Child;
                }
                Some('+') | Some('~') => return Err(self.unsupported("sibling combinator")),
                Some(_) if had_ws => combinator = Combinator::Descendant,
                Some(_) => return Err(self.unexpected()),
            }
        }
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let start = self.pos;
        let mut compound = Compound::default();
        match self.peek() {
            Some('*') => {
                self.pos += 1;
                if self.peek() == Some('|') {
                    return Err(self.unsupported("namespace prefix"));
                }
            }
            Some(c) if is_ident_char(c) => {
                let tag = self.ident();
                if self.peek() == Some('|') {
                    return Err(self.unsupported("namespace prefix"));
                }
                compound.tag = Some(tag.to_ascii_lowercase());
            }
            _ => {}
        }
        loop {
            match self.peek() {
                Some('.') => {
                    self.pos += 1;
                    let name = self.ident();
                    if name.is_empty() {
                        return Err(self.unexpected());
                    }
                    compound.classes.push(name);
                }
                Some('#') => {
                    self.pos += 1;
                    let name = self.ident();
                    if name.is_empty() {
                        return Err(self.unexpected());
                    }
                    compound.ids.push(name);
                }
                Some('[') => {
                    let attr = self.parse_attr()?;
                    compound.attrs.push(attr);
                }
                Some(':') => {
                    let feature = if self.peek_at(1) == Some(':') {
                        "pseudo-element"
                    } else {
                        "pseudo-class"
                    };
                    return Err(self.unsupported(feature));
                }
                _ => break,
            }
        }
        if self.pos == start {
            return Err(self.unexpected());
        }
        Ok(compound)
    }

    fn parse_attr(&mut self) -> Result<AttrSelector, SelectorError> {
        // Caller saw '['.
        self.pos += 1;
        self.skip_ws();
        let name = self.ident().to_ascii_lowercase();
        if name.is_empty() {
            return Err(self.unexpected());
        }
        self.skip_ws();
        let op = match (self.peek(), self.peek_at(1)) {
            (Some(']'), _) => {
                self.pos += 1;
                return Ok(AttrSelector {
                    name,
                    op: None,
                    case_insensitive: false,
                });
            }
            (Some('='), _) => {
                self.pos += 1;
                AttrOp::Equals
            }
            (Some(c), Some('=')) => {
                let op = match c {
                    '*' => AttrOp::Contains,
                    '^' => AttrOp::Prefix,
                    '$' => AttrOp::Suffix,
                    '~' => AttrOp::Includes,
                    '|' => AttrOp::DashMatch,
                    _ => return Err(self.unexpected()),
                };
                self.pos += 2;
                op
            }
            (None, _) => {
                return Err(SelectorError::Unterminated {
                    selector: self.source.to_string(),
                    what: "attribute selector",
                })
            }
            _ => return Err(self.unexpected()),
        };
        self.skip_ws();
        let value = match self.peek() {
            Some(quote @ ('"' | '\'')) => self.quoted(quote)?,
            Some(c) if is_ident_char(c) => self.ident(),
            _ => return Err(self.unexpected()),
        };
        self.skip_ws();
        let mut case_insensitive = false;
        if let Some(flag @ ('i' | 'I' | 's' | 'S')) = self.peek() {
            case_insensitive = flag.eq_ignore_ascii_case(&'i');
            self.pos += 1;
            self.skip_ws();
        }
        match self.peek() {
            Some(']') => {
                self.pos += 1;
                Ok(AttrSelector {
                    name,
                    op: Some((op, value)),
                    case_insensitive,
                })
            }
            None => Err(SelectorError::Unterminated {
                selector: self.source.to_string(),
                what: "attribute selector",
            }),
            Some(_) => Err(self.unexpected()),
        }
    }

    fn quoted(&mut self, quote: char) -> Result<String, SelectorError> {
        self.pos += 1;
        let mut value = String::new();
        while let Some(c) = self.peek() {
            self.pos += 1;
            match c {
                '\\' => {
                    if let Some(escaped) = self.peek() {
                        value.push(escaped);
                        self.pos += 1;
                    }
                }
                c if c == quote => return Ok(value),
                c => value.push(c),
            }
        }
        Err(SelectorError::Unterminated {
            selector: self.source.to_string(),
            what: "string",
        })
    }

    fn ident(&mut self) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                if let Some(escaped) = self.peek_at(1) {
                    out.push(escaped);
                    self.pos += 2;
                    continue;
                }
                break;
            }
            if !is_ident_char(c) {
                break;
            }
            out.push(c);
            self.pos += 1;
        }
        out
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_' || !c.is_ascii()
}
