use std::fmt;

use super::{Document, NodeId};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unexpected character {found:?} in {source_text:?}")]
    Unexpected {
        found: char,
        /// Byte offset inside the offending compound selector.
        at: usize,
        source_text: String,
    },

    #[error("unterminated attribute selector in {0:?}")]
    UnterminatedAttribute(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum AttrMatch {
    Exists(String),
    Equals(String, String),
}

/// `tag.class#id[attr=value]`
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.ids.is_empty() && self.classes.is_empty() && self.attrs.is_empty()
    }

    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        if !doc.exists(id) {
            return false;
        }
        if let Some(tag) = &self.tag {
            if tag != "*" && doc.tag(id).as_deref() != Some(tag.as_str()) {
                return false;
            }
        }
        if !self
            .ids
            .iter()
            .all(|want| doc.attribute(id, "id").as_deref() == Some(want.as_str()))
        {
            return false;
        }
        if !self.classes.iter().all(|c| doc.has_class(id, c)) {
            return false;
        }
        self.attrs.iter().all(|attr| match attr {
            AttrMatch::Exists(name) => doc.attribute(id, name).is_some(),
            AttrMatch::Equals(name, value) => {
                doc.attribute(id, name).as_deref() == Some(value.as_str())
            }
        })
    }
}

/// Compounds joined by descendant combinators, stored right-to-left.
#[derive(Clone, Debug, PartialEq, Eq)]
struct Complex {
    parts: Vec<Compound>,
}

impl Complex {
    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some((subject, ancestors)) = self.parts.split_first() else {
            return false;
        };
        if !subject.matches(doc, id) {
            return false;
        }

        // Greedy ancestor walk: correct for descendant-only combinators.
        let mut current = doc.parent(id);
        for part in ancestors {
            loop {
                let Some(candidate) = current else {
                    return false;
                };
                current = doc.parent(candidate);
                if part.matches(doc, candidate) {
                    break;
                }
            }
        }
        true
    }
}

/// A parsed selector list, e.g. `"li.item, .card [data-drag]"`.
///
/// Supported syntax: type selectors (and `*`), `.class`, `#id`, `[attr]`, `[attr=value]`
/// (value optionally quoted), the descendant combinator, and comma-separated lists.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selector {
    source: String,
    alternatives: Vec<Complex>,
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, SelectorError> {
        let mut alternatives = Vec::new();
        for group in split_unquoted(source, |c| c == ',') {
            alternatives.push(parse_complex(source, group)?);
        }
        Ok(Self {
            source: source.trim().to_owned(),
            alternatives,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        self.alternatives.iter().any(|c| c.matches(doc, id))
    }
}

/// `"a b"` or `'a b'` to `a b`; anything else is returned as is.
fn unquote(value: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = value
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    value
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

/// Splits at every `separator` outside attribute brackets and quoted values.
fn split_unquoted(text: &str, separator: impl Fn(char) -> bool) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut in_brackets = false;
    let mut quote = None;
    for (at, c) in text.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if in_brackets && (c == '"' || c == '\'') => quote = Some(c),
            None if c == '[' => in_brackets = true,
            None if c == ']' => in_brackets = false,
            None if !in_brackets && separator(c) => {
                pieces.push(&text[start..at]);
                start = at + c.len_utf8();
            }
            None => {}
        }
    }
    pieces.push(&text[start..]);
    pieces
}

/// Index of the `]` closing the bracket opened at `open`, skipping quoted values.
fn attribute_end(chars: &[(usize, char)], open: usize) -> Option<usize> {
    let mut quote = None;
    for (i, &(_, c)) in chars.iter().enumerate().skip(open + 1) {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if c == ']' => return Some(i),
            None => {}
        }
    }
    None
}

fn parse_complex(full: &str, group: &str) -> Result<Complex, SelectorError> {
    let mut parts = Vec::new();
    for word in split_unquoted(group, char::is_whitespace) {
        if !word.is_empty() {
            parts.push(parse_compound(full, word)?);
        }
    }
    if parts.is_empty() {
        return Err(SelectorError::Empty);
    }
    parts.reverse();
    Ok(Complex { parts })
}

fn parse_compound(full: &str, word: &str) -> Result<Compound, SelectorError> {
    let unexpected = |found: char, at: usize| SelectorError::Unexpected {
        found,
        at,
        source_text: full.to_owned(),
    };

    let mut compound = Compound::default();
    let chars: Vec<(usize, char)> = word.char_indices().collect();
    let mut i = 0;

    let take_ident = |mut i: usize| -> (String, usize) {
        let mut ident = String::new();
        while let Some(&(_, c)) = chars.get(i) {
            if !is_ident_char(c) {
                break;
            }
            ident.push(c);
            i += 1;
        }
        (ident, i)
    };

    if let Some(&(_, '*')) = chars.first() {
        compound.tag = Some("*".to_owned());
        i = 1;
    } else if chars.first().is_some_and(|&(_, c)| is_ident_char(c)) {
        let (ident, next) = take_ident(0);
        compound.tag = Some(ident.to_ascii_lowercase());
        i = next;
    }

    while let Some(&(at, c)) = chars.get(i) {
        match c {
            '.' | '#' => {
                let (ident, next) = take_ident(i + 1);
                if ident.is_empty() {
                    return Err(unexpected(c, at));
                }
                if c == '.' {
                    compound.classes.push(ident);
                } else {
                    compound.ids.push(ident);
                }
                i = next;
            }
            '[' => {
                let Some(close) = attribute_end(&chars, i) else {
                    return Err(SelectorError::UnterminatedAttribute(full.to_owned()));
                };
                let inner: String = chars[i + 1..close].iter().map(|&(_, c)| c).collect();
                let attr = match inner.split_once('=') {
                    Some((name, value)) => {
                        AttrMatch::Equals(name.trim().to_owned(), unquote(value.trim()).to_owned())
                    }
                    None => AttrMatch::Exists(inner.trim().to_owned()),
                };
                if matches!(&attr, AttrMatch::Exists(n) | AttrMatch::Equals(n, _) if n.is_empty()) {
                    return Err(unexpected(c, at));
                }
                compound.attrs.push(attr);
                i = close + 1;
            }
            _ => return Err(unexpected(c, at)),
        }
    }

    if compound.is_empty() {
        return Err(SelectorError::Empty);
    }
    Ok(compound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_list() -> (Document, NodeId, NodeId, NodeId) {
        let doc = Document::new();
        let ul = doc.create_element("ul");
        doc.add_class(ul, "list");
        doc.set_attribute(ul, "id", "inventory");
        let li = doc.create_element("LI");
        doc.add_class(li, "item");
        doc.set_attribute(li, "data-item-id", "abc");
        let input = doc.create_element("input");
        doc.append_child(doc.root(), ul).unwrap();
        doc.append_child(ul, li).unwrap();
        doc.append_child(li, input).unwrap();
        (doc, ul, li, input)
    }

    #[test]
    fn compound_selectors() {
        let (doc, ul, li, input) = doc_with_list();
        let s = Selector::parse("li.item[data-item-id]").unwrap();
        assert!(s.matches(&doc, li));
        assert!(!s.matches(&doc, ul));

        let s = Selector::parse("#inventory.list").unwrap();
        assert!(s.matches(&doc, ul));

        let s = Selector::parse("[data-item-id='abc']").unwrap();
        assert!(s.matches(&doc, li));
        let s = Selector::parse("[data-item-id=xyz]").unwrap();
        assert!(!s.matches(&doc, li));

        let s = Selector::parse("*").unwrap();
        assert!(s.matches(&doc, input));
    }

    #[test]
    fn descendant_and_lists() {
        let (doc, ul, li, input) = doc_with_list();
        let s = Selector::parse(".list input").unwrap();
        assert!(s.matches(&doc, input));
        assert!(!s.matches(&doc, li));

        let s = Selector::parse("body .item").unwrap();
        assert!(s.matches(&doc, li));

        let s = Selector::parse("input, ul").unwrap();
        assert!(s.matches(&doc, ul));
        assert!(s.matches(&doc, input));
        assert!(!s.matches(&doc, li));
    }

    #[test]
    fn quoted_values_may_contain_separators() {
        let (doc, _ul, li, input) = doc_with_list();
        doc.set_attribute(input, "data-role", "text input");
        doc.set_attribute(li, "title", "a,b");

        let s = Selector::parse("[data-role=\"text input\"]").unwrap();
        assert!(s.matches(&doc, input));
        assert!(!s.matches(&doc, li));

        let s = Selector::parse("[title='a,b']").unwrap();
        assert!(s.matches(&doc, li));

        let s = Selector::parse("ul [title='a,b'], input[data-role='text input']").unwrap();
        assert!(s.matches(&doc, li));
        assert!(s.matches(&doc, input));

        let s = Selector::parse("li [data-role = 'text input']").unwrap();
        assert!(s.matches(&doc, input));

        let s = Selector::parse("[title=']']").unwrap();
        assert!(!s.matches(&doc, li));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(Selector::parse(""), Err(SelectorError::Empty));
        assert_eq!(Selector::parse("li,"), Err(SelectorError::Empty));
        assert!(matches!(
            Selector::parse("li > a"),
            Err(SelectorError::Unexpected { found: '>', .. })
        ));
        assert!(matches!(
            Selector::parse("li."),
            Err(SelectorError::Unexpected { found: '.', .. })
        ));
        assert_eq!(
            Selector::parse("[open"),
            Err(SelectorError::UnterminatedAttribute("[open".to_owned()))
        );
        assert_eq!(
            Selector::parse("[title='a]"),
            Err(SelectorError::UnterminatedAttribute("[title='a]".to_owned()))
        );
    }
}
