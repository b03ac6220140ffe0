//! CSS selector subset used by [`super::MemoryDom`].
//!
//! Supported: type and universal selectors, `#id`, `.class`, `[attr]`,
//! `[attr=value]` (quoted or bare), `:not(<compound>)`, the descendant and
//! child combinators, and comma-separated lists. Tag and attribute names are
//! matched case-insensitively, values case-sensitively.

use super::DomError;

/// What the matcher needs to know about an element
pub trait SelectorElement: Sized {
    /// Lowercase tag name
    fn local_name(&self) -> String;
    fn attribute(&self, name: &str) -> Option<String>;
    fn parent_element(&self) -> Option<Self>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList(Vec<Complex>);

#[derive(Debug, Clone, PartialEq)]
struct Complex {
    /// Left to right; the combinator links a compound to the one before it
    parts: Vec<(Combinator, Compound)>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Default)]
struct Compound {
    universal: bool,
    tag: Option<String>,
    filters: Vec<Filter>,
}

#[derive(Debug, Clone, PartialEq)]
enum Filter {
    Id(String),
    Class(String),
    Attribute { name: String, value: Option<String> },
    Not(Compound),
}

impl SelectorList {
    pub fn parse(selector: &str) -> Result<Self, DomError> {
        let invalid = |reason: &str| DomError::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        };

        let mut list = Vec::new();
        for part in split_top_level(selector, ',') {
            let mut cursor = Cursor::new(part);
            let complex = cursor.complex().map_err(|r| invalid(&r))?;
            if !cursor.at_end() {
                return Err(invalid("unexpected trailing input"));
            }
            list.push(complex);
        }
        if list.is_empty() {
            return Err(invalid("empty selector"));
        }
        Ok(Self(list))
    }

    pub fn matches<E: SelectorElement>(&self, element: &E) -> bool {
        self.0.iter().any(|complex| complex.matches(element))
    }
}

impl Complex {
    fn matches<E: SelectorElement>(&self, element: &E) -> bool {
        match self.parts.len() {
            0 => false,
            n => self.matches_at(n - 1, element),
        }
    }

    fn matches_at<E: SelectorElement>(&self, idx: usize, element: &E) -> bool {
        let (combinator, compound) = &self.parts[idx];
        if !compound.matches(element) {
            return false;
        }
        if idx == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => element
                .parent_element()
                .is_some_and(|parent| self.matches_at(idx - 1, &parent)),
            Combinator::Descendant => {
                let mut ancestor = element.parent_element();
                while let Some(current) = ancestor {
                    if self.matches_at(idx - 1, &current) {
                        return true;
                    }
                    ancestor = current.parent_element();
                }
                false
            }
        }
    }
}

impl Compound {
    fn is_empty(&self) -> bool {
        !self.universal && self.tag.is_none() && self.filters.is_empty()
    }

    fn matches<E: SelectorElement>(&self, element: &E) -> bool {
        if let Some(tag) = &self.tag {
            if *tag != element.local_name() {
                return false;
            }
        }
        self.filters.iter().all(|filter| match filter {
            Filter::Id(id) => element.attribute("id").as_deref() == Some(id.as_str()),
            Filter::Class(class) => element
                .attribute("class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == class)),
            Filter::Attribute { name, value } => match (element.attribute(name), value) {
                (Some(_), None) => true,
                (Some(actual), Some(expected)) => actual == *expected,
                (None, _) => false,
            },
            Filter::Not(inner) => !inner.matches(element),
        })
    }
}

fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '(' | '[') => depth += 1,
            (None, ')' | ']') => depth = depth.saturating_sub(1),
            (None, c) if c == separator && depth == 0 => {
                parts.push(input[start..i].trim());
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(input[start..].trim());
    parts
}

struct Cursor {
    chars: Vec<char>,
    pos: usize,
}

impl Cursor {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn ident(&mut self) -> Result<String, String> {
        let mut ident = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                ident.push(c);
                self.pos += 1;
            } else {
                break;
            }
        }
        if ident.is_empty() {
            Err(format!("expected identifier at position {}", self.pos))
        } else {
            Ok(ident)
        }
    }

    fn complex(&mut self) -> Result<Complex, String> {
        let mut parts = Vec::new();
        let mut combinator = Combinator::Descendant;
        self.skip_whitespace();
        loop {
            let compound = self.compound()?;
            if compound.is_empty() {
                return Err(format!("expected selector at position {}", self.pos));
            }
            parts.push((combinator, compound));

            let had_space = self.skip_whitespace();
            if self.at_end() {
                break;
            }
            if self.eat('>') {
                combinator = Combinator::Child;
                self.skip_whitespace();
            } else if had_space {
                combinator = Combinator::Descendant;
            } else {
                return Err(format!("unexpected `{}`", self.peek().unwrap_or(' ')));
            }
        }
        Ok(Complex { parts })
    }

    fn compound(&mut self) -> Result<Compound, String> {
        let mut compound = Compound::default();
        if self.eat('*') {
            compound.universal = true;
        } else if self.peek().is_some_and(|c| c.is_alphabetic()) {
            compound.tag = Some(self.ident()?.to_ascii_lowercase());
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.pos += 1;
                    compound.filters.push(Filter::Id(self.ident()?));
                }
                Some('.') => {
                    self.pos += 1;
                    compound.filters.push(Filter::Class(self.ident()?));
                }
                Some('[') => {
                    self.pos += 1;
                    compound.filters.push(self.attribute()?);
                }
                Some(':') => {
                    self.pos += 1;
                    let pseudo = self.ident()?.to_ascii_lowercase();
                    if pseudo != "not" || !self.eat('(') {
                        return Err(format!("unsupported pseudo-class `:{pseudo}`"));
                    }
                    self.skip_whitespace();
                    let inner = self.compound()?;
                    self.skip_whitespace();
                    if inner.is_empty() || !self.eat(')') {
                        return Err("malformed :not()".to_string());
                    }
                    compound.filters.push(Filter::Not(inner));
                }
                _ => break,
            }
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> Result<Filter, String> {
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();
        let value = if self.eat('=') {
            self.skip_whitespace();
            let value = match self.peek() {
                Some(quote @ ('"' | '\'')) => {
                    self.pos += 1;
                    let mut value = String::new();
                    loop {
                        match self.peek() {
                            None => return Err("unterminated string".to_string()),
                            Some(c) => {
                                self.pos += 1;
                                if c == quote {
                                    break;
                                }
                                value.push(c);
                            }
                        }
                    }
                    value
                }
                _ => self.ident()?,
            };
            self.skip_whitespace();
            Some(value)
        } else {
            None
        };
        if !self.eat(']') {
            return Err("expected `]`".to_string());
        }
        Ok(Filter::Attribute { name, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Element in a flat test tree: (tag, attributes, parent index)
    #[derive(Clone)]
    struct TestElement<'a> {
        tree: &'a [(&'a str, HashMap<&'a str, &'a str>, Option<usize>)],
        idx: usize,
    }

    impl SelectorElement for TestElement<'_> {
        fn local_name(&self) -> String {
            self.tree[self.idx].0.to_string()
        }

        fn attribute(&self, name: &str) -> Option<String> {
            self.tree[self.idx].1.get(name).map(|v| v.to_string())
        }

        fn parent_element(&self) -> Option<Self> {
            self.tree[self.idx].2.map(|idx| TestElement { tree: self.tree, idx })
        }
    }

    fn attrs<'a>(pairs: &[(&'a str, &'a str)]) -> HashMap<&'a str, &'a str> {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_default_focusable_selectors_parse() {
        for selector in contracts::modal::options::DEFAULT_FOCUSABLE_SELECTORS {
            assert!(SelectorList::parse(selector).is_ok(), "{selector}");
        }
        let joined = contracts::modal::options::DEFAULT_FOCUSABLE_SELECTORS.join(",");
        assert!(SelectorList::parse(&joined).is_ok());
    }

    #[test]
    fn test_compound_matching() {
        let tree = vec![
            ("div", attrs(&[("class", "modal open"), ("id", "m")]), None),
            ("a", attrs(&[("href", "#"), ("tabindex", "-1")]), Some(0)),
            ("a", attrs(&[("href", "#")]), Some(0)),
        ];
        let el = |idx| TestElement { tree: &tree, idx };

        let sel = SelectorList::parse(r#"a[href]:not([tabindex="-1"])"#).unwrap();
        assert!(!sel.matches(&el(1)));
        assert!(sel.matches(&el(2)));

        assert!(SelectorList::parse("div.modal#m").unwrap().matches(&el(0)));
        assert!(SelectorList::parse(".open").unwrap().matches(&el(0)));
        assert!(!SelectorList::parse(".closed").unwrap().matches(&el(0)));
        assert!(SelectorList::parse("*").unwrap().matches(&el(1)));
    }

    #[test]
    fn test_combinators() {
        let tree = vec![
            ("section", attrs(&[("class", "outer")]), None),
            ("div", attrs(&[]), Some(0)),
            ("button", attrs(&[]), Some(1)),
        ];
        let button = TestElement { tree: &tree, idx: 2 };

        assert!(SelectorList::parse(".outer button").unwrap().matches(&button));
        assert!(SelectorList::parse("div > button").unwrap().matches(&button));
        assert!(!SelectorList::parse(".outer > button").unwrap().matches(&button));
        assert!(SelectorList::parse("section div>button").unwrap().matches(&button));
    }

    #[test]
    fn test_attribute_names_case_insensitive() {
        let tree = vec![("div", attrs(&[("contenteditable", "true")]), None)];
        let div = TestElement { tree: &tree, idx: 0 };
        assert!(SelectorList::parse("[contentEditable=true]").unwrap().matches(&div));
        assert!(!SelectorList::parse("[contentEditable=false]").unwrap().matches(&div));
    }

    #[test]
    fn test_selector_list() {
        let tree = vec![("input", attrs(&[("disabled", "")]), None)];
        let input = TestElement { tree: &tree, idx: 0 };
        assert!(!SelectorList::parse("input:not([disabled])").unwrap().matches(&input));
        assert!(SelectorList::parse("input:not([disabled]), [disabled]").unwrap().matches(&input));
    }

    #[test]
    fn test_invalid_selectors() {
        for selector in ["", "div >", ".", "a:hover", "[href", "a,,b", "a:not()"] {
            assert!(
                matches!(SelectorList::parse(selector), Err(DomError::InvalidSelector { .. })),
                "{selector:?} should be rejected"
            );
        }
    }
}
