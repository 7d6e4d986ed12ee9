//! CSS Selectors
//!
//! The subset merchants use to point at field containers and that the
//! library needs internally: compound selectors (`tag`, `#id`, `.class`,
//! `[attr]`, `[attr="v"]`, `[attr^="v"]`, `[attr$="v"]`, `[attr*="v"]`)
//! joined by descendant combinators.

use crate::{DomError, DomResult, DomTree, NodeId};

/// Parsed selector: compounds separated by descendant combinators
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    compounds: Vec<Compound>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatcher>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatcher {
    name: String,
    op: AttrOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals(String),
    Prefix(String),
    Suffix(String),
    Substring(String),
}

impl AttrOp {
    fn matches(&self, value: &str) -> bool {
        match self {
            AttrOp::Exists => true,
            AttrOp::Equals(v) => value == v,
            AttrOp::Prefix(v) => !v.is_empty() && value.starts_with(v.as_str()),
            AttrOp::Suffix(v) => !v.is_empty() && value.ends_with(v.as_str()),
            AttrOp::Substring(v) => !v.is_empty() && value.contains(v.as_str()),
        }
    }
}

impl Selector {
    /// Parse a selector string
    pub fn parse(input: &str) -> DomResult<Self> {
        let invalid = |reason: &str| DomError::InvalidSelector {
            selector: input.to_string(),
            reason: reason.to_string(),
        };

        let parts = split_compounds(input).map_err(|r| invalid(r))?;
        if parts.is_empty() {
            return Err(invalid("empty selector"));
        }

        let compounds = parts
            .iter()
            .map(|p| parse_compound(p).map_err(|r| invalid(r)))
            .collect::<DomResult<Vec<_>>>()?;
        Ok(Self { compounds })
    }

    /// Whether `node` matches this selector within `tree`
    pub fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some((last, rest)) = self.compounds.split_last() else {
            return false;
        };
        if !last.matches(tree, node) {
            return false;
        }

        // Greedy right-to-left walk is exact for descendant-only chains.
        let mut ancestors = tree.ancestors(node);
        for compound in rest.iter().rev() {
            if !ancestors.any(|a| compound.matches(tree, a)) {
                return false;
            }
        }
        true
    }
}

impl Compound {
    fn matches(&self, tree: &DomTree, node: NodeId) -> bool {
        let Some(el) = tree.element(node) else {
            return false;
        };
        if let Some(tag) = &self.tag {
            if el.tag_name() != tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.attribute("id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| el.class_list().contains(c)) {
            return false;
        }
        self.attrs.iter().all(|m| {
            let value = if m.name == "class" {
                Some(el.class_list().value())
            } else {
                el.attribute(&m.name).map(str::to_string)
            };
            value.is_some_and(|v| m.op.matches(&v))
        })
    }
}

/// Split on whitespace outside of `[...]` and quotes
fn split_compounds(input: &str) -> Result<Vec<String>, &'static str> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_brackets = false;
    let mut quote: Option<char> = None;

    for ch in input.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => {
                quote = None;
                current.push(c);
            }
            (Some(_), c) => current.push(c),
            (None, '"' | '\'') if in_brackets => {
                quote = Some(ch);
                current.push(ch);
            }
            (None, '[') => {
                in_brackets = true;
                current.push(ch);
            }
            (None, ']') => {
                in_brackets = false;
                current.push(ch);
            }
            (None, c) if c.is_whitespace() && !in_brackets => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            (None, '>' | '+' | '~' | ',') if !in_brackets => {
                return Err("only descendant combinators are supported");
            }
            (None, c) => current.push(c),
        }
    }

    if quote.is_some() {
        return Err("unterminated string");
    }
    if in_brackets {
        return Err("unterminated attribute selector");
    }
    if !current.is_empty() {
        parts.push(current);
    }
    Ok(parts)
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &[char], pos: &mut usize) -> Result<String, &'static str> {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos]) {
        *pos += 1;
    }
    if *pos == start {
        return Err("expected identifier");
    }
    Ok(chars[start..*pos].iter().collect())
}

fn parse_compound(part: &str) -> Result<Compound, &'static str> {
    let chars: Vec<char> = part.chars().collect();
    let mut pos = 0;
    let mut compound = Compound::default();

    if chars.first() == Some(&'*') {
        pos = 1;
    } else if chars.first().is_some_and(|&c| is_ident_char(c)) {
        compound.tag = Some(take_ident(&chars, &mut pos)?.to_ascii_lowercase());
    }

    while pos < chars.len() {
        match chars[pos] {
            '#' => {
                pos += 1;
                compound.id = Some(take_ident(&chars, &mut pos)?);
            }
            '.' => {
                pos += 1;
                compound.classes.push(take_ident(&chars, &mut pos)?);
            }
            '[' => {
                pos += 1;
                compound.attrs.push(parse_attr(&chars, &mut pos)?);
            }
            _ => return Err("unexpected character"),
        }
    }
    Ok(compound)
}

fn parse_attr(chars: &[char], pos: &mut usize) -> Result<AttrMatcher, &'static str> {
    let name = take_ident(chars, pos)?.to_ascii_lowercase();

    let op_kind = match chars.get(*pos) {
        Some(']') => {
            *pos += 1;
            return Ok(AttrMatcher { name, op: AttrOp::Exists });
        }
        Some('=') => {
            *pos += 1;
            '='
        }
        Some(&c @ ('^' | '$' | '*')) if chars.get(*pos + 1) == Some(&'=') => {
            *pos += 2;
            c
        }
        _ => return Err("malformed attribute selector"),
    };

    let value = match chars.get(*pos) {
        Some(&q @ ('"' | '\'')) => {
            *pos += 1;
            let start = *pos;
            while *pos < chars.len() && chars[*pos] != q {
                *pos += 1;
            }
            if *pos >= chars.len() {
                return Err("unterminated string");
            }
            let value: String = chars[start..*pos].iter().collect();
            *pos += 1;
            value
        }
        _ => take_ident(chars, pos)?,
    };

    if chars.get(*pos) != Some(&']') {
        return Err("expected ']'");
    }
    *pos += 1;

    let op = match op_kind {
        '^' => AttrOp::Prefix(value),
        '$' => AttrOp::Suffix(value),
        '*' => AttrOp::Substring(value),
        _ => AttrOp::Equals(value),
    };
    Ok(AttrMatcher { name, op })
}
