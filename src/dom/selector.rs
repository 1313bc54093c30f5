//! A small CSS selector subset: type, `#id`, `.class`, `[attr]`, `[attr="v"]`,
//! `[attr^="v"]` compounds joined by the descendant combinator.

use crate::dom::document::{Document, NodeId};
use crate::utils::error::{Result, SiteError};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrCondition {
    Exists(String),
    Equals(String, String),
    StartsWith(String, String),
}

impl AttrCondition {
    fn matches(&self, value: Option<&str>) -> bool {
        match (self, value) {
            (AttrCondition::Exists(_), Some(_)) => true,
            (AttrCondition::Equals(_, expected), Some(actual)) => actual == expected,
            (AttrCondition::StartsWith(_, prefix), Some(actual)) => actual.starts_with(prefix),
            (_, None) => false,
        }
    }

    fn name(&self) -> &str {
        match self {
            AttrCondition::Exists(name)
            | AttrCondition::Equals(name, _)
            | AttrCondition::StartsWith(name, _) => name,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrCondition>,
}

impl Compound {
    fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(element) = doc.element(node) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if !element.tag_name().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.attr("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|class| element.has_class(class)) {
            return false;
        }
        self.attrs
            .iter()
            .all(|condition| condition.matches(element.attr(condition.name())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    // 由左到右，以後代組合子串接
    parts: Vec<Compound>,
}

impl Selector {
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some((last, ancestors)) = self.parts.split_last() else {
            return false;
        };
        if !last.matches(doc, node) {
            return false;
        }

        let mut remaining = ancestors.iter().rev().peekable();
        let mut current = doc.parent(node);
        while let Some(compound) = remaining.peek() {
            let Some(candidate) = current else {
                return false;
            };
            if compound.matches(doc, candidate) {
                remaining.next();
            }
            current = doc.parent(candidate);
        }
        true
    }
}

impl FromStr for Selector {
    type Err = SiteError;

    fn from_str(source: &str) -> Result<Self> {
        let parts = source
            .split_whitespace()
            .map(|chunk| parse_compound(source, chunk))
            .collect::<Result<Vec<_>>>()?;

        if parts.is_empty() {
            return Err(unsupported(source, "empty selector"));
        }

        Ok(Self { parts })
    }
}

fn unsupported(selector: &str, reason: &str) -> SiteError {
    SiteError::UnsupportedSelector {
        selector: selector.to_string(),
        reason: reason.to_string(),
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &[char], pos: &mut usize) -> String {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos]) {
        *pos += 1;
    }
    chars[start..*pos].iter().collect()
}

fn parse_compound(selector: &str, chunk: &str) -> Result<Compound> {
    let chars: Vec<char> = chunk.chars().collect();
    let mut compound = Compound::default();
    let mut pos = 0;

    let tag = take_ident(&chars, &mut pos);
    if !tag.is_empty() {
        compound.tag = Some(tag.to_ascii_lowercase());
    } else if chars.first() == Some(&'*') {
        pos += 1;
    }

    while pos < chars.len() {
        match chars[pos] {
            '#' => {
                pos += 1;
                let id = take_ident(&chars, &mut pos);
                if id.is_empty() {
                    return Err(unsupported(selector, "empty id"));
                }
                compound.id = Some(id);
            }
            '.' => {
                pos += 1;
                let class = take_ident(&chars, &mut pos);
                if class.is_empty() {
                    return Err(unsupported(selector, "empty class name"));
                }
                compound.classes.push(class);
            }
            '[' => {
                pos += 1;
                compound.attrs.push(parse_attr(selector, &chars, &mut pos)?);
            }
            other => {
                return Err(unsupported(
                    selector,
                    &format!("unexpected character '{}'", other),
                ))
            }
        }
    }

    Ok(compound)
}

fn parse_attr(selector: &str, chars: &[char], pos: &mut usize) -> Result<AttrCondition> {
    let name = take_ident(chars, pos);
    if name.is_empty() {
        return Err(unsupported(selector, "empty attribute name"));
    }

    let prefix_match = match chars.get(*pos) {
        Some(']') => {
            *pos += 1;
            return Ok(AttrCondition::Exists(name));
        }
        Some('^') if chars.get(*pos + 1) == Some(&'=') => {
            *pos += 2;
            true
        }
        Some('=') => {
            *pos += 1;
            false
        }
        _ => return Err(unsupported(selector, "unsupported attribute operator")),
    };

    let value = match chars.get(*pos) {
        Some(&quote) if quote == '"' || quote == '\'' => {
            *pos += 1;
            let start = *pos;
            while *pos < chars.len() && chars[*pos] != quote {
                *pos += 1;
            }
            if *pos >= chars.len() {
                return Err(unsupported(selector, "unterminated attribute value"));
            }
            let value: String = chars[start..*pos].iter().collect();
            *pos += 1;
            value
        }
        _ => take_ident(chars, pos),
    };

    if chars.get(*pos) != Some(&']') {
        return Err(unsupported(selector, "missing ']'"));
    }
    *pos += 1;

    Ok(if prefix_match {
        AttrCondition::StartsWith(name, value)
    } else {
        AttrCondition::Equals(name, value)
    })
}
