//! A small CSS selector engine for the in-memory document.
//!
//! Supports the subset the behavior configuration uses:
//!
//! ```text
//! section[id]                  type + attribute presence
//! .nav-menu a[href^="#"]       descendant combinator + prefix match
//! .section:not(.hero)          negation of a simple selector
//! #gallery-modal, .slide       selector lists
//! ```
//!
//! Child, sibling and pseudo-class selectors other than `:not` are rejected
//! with [`SelectorError`] rather than silently matching nothing.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,
    #[error("unsupported syntax {found:?} in selector {selector:?}")]
    Unsupported { selector: String, found: String },
    #[error("malformed selector {0:?}")]
    Malformed(String),
}

/// Attribute test inside `[...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrMatch {
    Present,
    Equals(String),
    Prefix(String),
}

/// One simple selector: a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Simple {
    Tag(String),
    Id(String),
    Class(String),
    Attr { name: String, test: AttrMatch },
    Not(Box<Simple>),
}

/// A sequence of simple selectors that must all hold for one element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound(pub Vec<Simple>);

/// Compounds joined by descendant combinators, outermost ancestor first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Complex(pub Vec<Compound>);

/// A parsed selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Complex>,
}

/// Read-only view of an element, enough to evaluate a selector.
pub trait Matchable {
    fn tag(&self) -> &str;
    fn id(&self) -> Option<&str>;
    fn has_class(&self, class: &str) -> bool;
    fn attribute(&self, name: &str) -> Option<&str>;
}

impl Simple {
    fn matches<M: Matchable + ?Sized>(&self, el: &M) -> bool {
        match self {
            Simple::Tag(tag) => tag == "*" || el.tag().eq_ignore_ascii_case(tag),
            Simple::Id(id) => el.id() == Some(id.as_str()),
            Simple::Class(class) => el.has_class(class),
            Simple::Attr { name, test } => match (el.attribute(name), test) {
                (None, _) => false,
                (Some(_), AttrMatch::Present) => true,
                (Some(value), AttrMatch::Equals(expected)) => value == expected,
                (Some(value), AttrMatch::Prefix(prefix)) => value.starts_with(prefix.as_str()),
            },
            Simple::Not(inner) => !inner.matches(el),
        }
    }
}

impl Compound {
    pub fn matches<M: Matchable + ?Sized>(&self, el: &M) -> bool {
        self.0.iter().all(|s| s.matches(el))
    }
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let mut alternatives = Vec::new();
        for part in split_list(input)? {
            alternatives.push(parse_complex(part, input)?);
        }
        if alternatives.is_empty() {
            return Err(SelectorError::Empty);
        }
        Ok(Self { alternatives })
    }

    /// Test an element given its ancestor chain, nearest ancestor first.
    pub fn matches<M: Matchable + ?Sized>(&self, el: &M, ancestors: &[&M]) -> bool {
        self.alternatives
            .iter()
            .any(|complex| matches_complex(complex, el, ancestors))
    }
}

fn matches_complex<M: Matchable + ?Sized>(complex: &Complex, el: &M, ancestors: &[&M]) -> bool {
    let Some((subject, rest)) = complex.0.split_last() else {
        return false;
    };
    if !subject.matches(el) {
        return false;
    }
    // Greedy walk outward: each remaining compound must match some ancestor
    // further out than the previous one.
    let mut remaining = rest.iter().rev();
    let mut wanted = remaining.next();
    for ancestor in ancestors {
        match wanted {
            Some(compound) if compound.matches(*ancestor) => wanted = remaining.next(),
            Some(_) => {}
            None => break,
        }
    }
    wanted.is_none()
}

/// Split on top-level commas, ignoring commas inside quotes, brackets or parens.
fn split_list(input: &str) -> Result<Vec<&str>, SelectorError> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[' | '(') => depth += 1,
            (None, ']' | ')') => depth -= 1,
            (None, ',') if depth == 0 => {
                parts.push(input[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    if quote.is_some() || depth != 0 {
        return Err(SelectorError::Malformed(input.to_string()));
    }
    parts.push(input[start..].trim());
    if parts.iter().any(|p| p.is_empty()) {
        return Err(SelectorError::Empty);
    }
    Ok(parts)
}

fn parse_complex(part: &str, full: &str) -> Result<Complex, SelectorError> {
    let mut cursor = Cursor {
        chars: part.chars().collect(),
        pos: 0,
        full,
    };
    let mut compounds = Vec::new();
    loop {
        cursor.skip_whitespace();
        if cursor.done() {
            break;
        }
        compounds.push(cursor.compound()?);
    }
    if compounds.is_empty() {
        return Err(SelectorError::Empty);
    }
    Ok(Complex(compounds))
}

struct Cursor<'a> {
    chars: Vec<char>,
    pos: usize,
    full: &'a str,
}

impl Cursor<'_> {
    fn done(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn malformed(&self) -> SelectorError {
        SelectorError::Malformed(self.full.to_string())
    }

    fn unsupported(&self, found: impl Into<String>) -> SelectorError {
        SelectorError::Unsupported {
            selector: self.full.to_string(),
            found: found.into(),
        }
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(self.malformed());
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn compound(&mut self) -> Result<Compound, SelectorError> {
        let mut parts = Vec::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                break;
            }
            parts.push(self.simple()?);
        }
        Ok(Compound(parts))
    }

    fn simple(&mut self) -> Result<Simple, SelectorError> {
        match self.peek() {
            Some('#') => {
                self.pos += 1;
                Ok(Simple::Id(self.ident()?))
            }
            Some('.') => {
                self.pos += 1;
                Ok(Simple::Class(self.ident()?))
            }
            Some('[') => {
                self.pos += 1;
                self.attribute()
            }
            Some(':') => {
                self.pos += 1;
                let name = self.ident()?;
                if name != "not" {
                    return Err(self.unsupported(format!(":{name}")));
                }
                if self.peek() != Some('(') {
                    return Err(self.malformed());
                }
                self.pos += 1;
                self.skip_whitespace();
                let inner = self.simple()?;
                self.skip_whitespace();
                if self.peek() != Some(')') {
                    return Err(self.unsupported(":not() with more than one simple selector"));
                }
                self.pos += 1;
                Ok(Simple::Not(Box::new(inner)))
            }
            Some('*') => {
                self.pos += 1;
                Ok(Simple::Tag("*".to_string()))
            }
            Some(c @ ('>' | '+' | '~')) => Err(self.unsupported(c.to_string())),
            Some(_) => Ok(Simple::Tag(self.ident()?)),
            None => Err(self.malformed()),
        }
    }

    fn attribute(&mut self) -> Result<Simple, SelectorError> {
        self.skip_whitespace();
        let name = self.ident()?;
        self.skip_whitespace();
        let test = match self.peek() {
            Some(']') => AttrMatch::Present,
            Some('=') => {
                self.pos += 1;
                AttrMatch::Equals(self.attr_value()?)
            }
            Some('^') => {
                self.pos += 1;
                if self.peek() != Some('=') {
                    return Err(self.malformed());
                }
                self.pos += 1;
                AttrMatch::Prefix(self.attr_value()?)
            }
            Some(c) => return Err(self.unsupported(format!("{c}= attribute operator"))),
            None => return Err(self.malformed()),
        };
        self.skip_whitespace();
        if self.peek() != Some(']') {
            return Err(self.malformed());
        }
        self.pos += 1;
        Ok(Simple::Attr { name, test })
    }

    fn attr_value(&mut self) -> Result<String, SelectorError> {
        self.skip_whitespace();
        match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != q) {
                    self.pos += 1;
                }
                if self.done() {
                    return Err(self.malformed());
                }
                let value = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                Ok(value)
            }
            _ => self.ident(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct El {
        tag: &'static str,
        id: Option<&'static str>,
        classes: Vec<&'static str>,
        attrs: Vec<(&'static str, &'static str)>,
    }

    impl Matchable for El {
        fn tag(&self) -> &str {
            self.tag
        }
        fn id(&self) -> Option<&str> {
            self.id
        }
        fn has_class(&self, class: &str) -> bool {
            self.classes.contains(&class)
        }
        fn attribute(&self, name: &str) -> Option<&str> {
            if name == "id" {
                return self.id;
            }
            self.attrs.iter().find(|(n, _)| *n == name).map(|(_, v)| *v)
        }
    }

    fn el(tag: &'static str) -> El {
        El {
            tag,
            id: None,
            classes: vec![],
            attrs: vec![],
        }
    }

    #[test]
    fn parses_default_nav_link_selector() {
        let sel = Selector::parse(".nav-menu a[href^=\"#\"]").unwrap();
        let mut menu = el("ul");
        menu.classes = vec!["nav-menu"];
        let li = el("li");
        let mut link = el("a");
        link.attrs = vec![("href", "#about")];

        assert!(sel.matches(&link, &[&li, &menu]));
        // Not inside the menu
        assert!(!sel.matches(&link, &[&li]));

        let mut external = el("a");
        external.attrs = vec![("href", "https://example.com")];
        assert!(!sel.matches(&external, &[&menu]));
    }

    #[test]
    fn attribute_presence_requires_the_attribute() {
        let sel = Selector::parse("section[id]").unwrap();
        let mut with_id = el("section");
        with_id.id = Some("about");
        assert!(sel.matches(&with_id, &[]));
        assert!(!sel.matches(&el("section"), &[]));
        assert!(!sel.matches(&el("div"), &[]));
    }

    #[test]
    fn negation_excludes_class() {
        let sel = Selector::parse(".section:not(.hero)").unwrap();
        let mut plain = el("section");
        plain.classes = vec!["section"];
        let mut hero = el("section");
        hero.classes = vec!["section", "hero"];
        assert!(sel.matches(&plain, &[]));
        assert!(!sel.matches(&hero, &[]));
    }

    #[test]
    fn selector_lists_match_any_alternative() {
        let sel = Selector::parse("#gallery-modal, .slide").unwrap();
        let mut modal = el("div");
        modal.id = Some("gallery-modal");
        let mut slide = el("div");
        slide.classes = vec!["slide"];
        assert!(sel.matches(&modal, &[]));
        assert!(sel.matches(&slide, &[]));
        assert!(!sel.matches(&el("div"), &[]));
    }

    #[test]
    fn tag_match_is_case_insensitive() {
        let sel = Selector::parse("IMG").unwrap();
        assert!(sel.matches(&el("img"), &[]));
    }

    #[test]
    fn rejects_unsupported_combinators() {
        assert!(matches!(
            Selector::parse("ul > li"),
            Err(SelectorError::Unsupported { .. })
        ));
        assert!(matches!(
            Selector::parse("a:hover"),
            Err(SelectorError::Unsupported { .. })
        ));
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(Selector::parse("   "), Err(SelectorError::Empty));
        assert_eq!(Selector::parse(".a,"), Err(SelectorError::Empty));
        assert!(matches!(
            Selector::parse("[href^=\"#]"),
            Err(SelectorError::Malformed(_))
        ));
        assert!(matches!(Selector::parse("."), Err(SelectorError::Malformed(_))));
    }
}
