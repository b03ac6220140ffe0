//! Minimal HTML fragment parser feeding [`super::MemoryDom`].
//!
//! Handles elements, quoted and bare attributes, void and self-closing
//! elements, comments and the common character entities. Unclosed elements
//! are closed at the end of the fragment; stray end tags are dropped.

#[derive(Debug, Clone, PartialEq)]
pub enum HtmlNode {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<HtmlNode>,
    },
    Text(String),
}

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

struct OpenElement {
    tag: String,
    attributes: Vec<(String, String)>,
    children: Vec<HtmlNode>,
}

impl OpenElement {
    fn into_node(self) -> HtmlNode {
        HtmlNode::Element {
            tag: self.tag,
            attributes: self.attributes,
            children: self.children,
        }
    }
}

/// Parse an HTML fragment into a list of top-level nodes
pub fn parse_fragment(input: &str) -> Vec<HtmlNode> {
    let mut parser = Parser {
        chars: input.chars().collect(),
        pos: 0,
    };
    let mut top: Vec<HtmlNode> = Vec::new();
    let mut stack: Vec<OpenElement> = Vec::new();

    fn push(node: HtmlNode, stack: &mut [OpenElement], top: &mut Vec<HtmlNode>) {
        match stack.last_mut() {
            Some(open) => open.children.push(node),
            None => top.push(node),
        }
    }

    while !parser.at_end() {
        if parser.starts_with("<!--") {
            parser.skip_comment();
        } else if parser.starts_with("</") {
            let tag = parser.read_end_tag();
            if let Some(idx) = stack.iter().rposition(|open| open.tag == tag) {
                while stack.len() > idx {
                    if let Some(open) = stack.pop() {
                        let node = open.into_node();
                        push(node, &mut stack, &mut top);
                    }
                }
            }
        } else if parser.starts_with("<")
            && parser.peek_at(1).is_some_and(|c| c.is_ascii_alphabetic())
        {
            let (tag, attributes, self_closing) = parser.read_start_tag();
            if self_closing || is_void_element(&tag) {
                push(
                    HtmlNode::Element {
                        tag,
                        attributes,
                        children: Vec::new(),
                    },
                    &mut stack,
                    &mut top,
                );
            } else {
                stack.push(OpenElement {
                    tag,
                    attributes,
                    children: Vec::new(),
                });
            }
        } else {
            let text = parser.read_text();
            if !text.is_empty() {
                push(HtmlNode::Text(decode_entities(&text)), &mut stack, &mut top);
            }
        }
    }

    while let Some(open) = stack.pop() {
        let node = open.into_node();
        push(node, &mut stack, &mut top);
    }

    top
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn starts_with(&self, s: &str) -> bool {
        s.chars()
            .enumerate()
            .all(|(i, c)| self.peek_at(i) == Some(c))
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn skip_comment(&mut self) {
        self.pos += 4;
        while !self.at_end() && !self.starts_with("-->") {
            self.pos += 1;
        }
        self.pos = (self.pos + 3).min(self.chars.len());
    }

    fn read_name(&mut self) -> String {
        let mut name = String::new();
        while let Some(c) = self.peek() {
            if c.is_whitespace() || c == '>' || c == '/' || c == '=' {
                break;
            }
            name.push(c.to_ascii_lowercase());
            self.pos += 1;
        }
        name
    }

    fn read_end_tag(&mut self) -> String {
        self.pos += 2;
        let tag = self.read_name();
        while let Some(c) = self.peek() {
            self.pos += 1;
            if c == '>' {
                break;
            }
        }
        tag
    }

    fn read_start_tag(&mut self) -> (String, Vec<(String, String)>, bool) {
        self.pos += 1;
        let tag = self.read_name();
        let mut attributes: Vec<(String, String)> = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some('>') => {
                    self.pos += 1;
                    break;
                }
                Some('/') => {
                    self.pos += 1;
                    if self.peek() == Some('>') {
                        self_closing = true;
                    }
                }
                Some(_) => {
                    let name = self.read_name();
                    if name.is_empty() {
                        // Unparseable character inside the tag
                        self.pos += 1;
                        continue;
                    }
                    self.skip_whitespace();
                    let value = if self.peek() == Some('=') {
                        self.pos += 1;
                        self.skip_whitespace();
                        self.read_attribute_value()
                    } else {
                        String::new()
                    };
                    if !attributes.iter().any(|(n, _)| *n == name) {
                        attributes.push((name, decode_entities(&value)));
                    }
                }
            }
        }

        (tag, attributes, self_closing)
    }

    fn read_attribute_value(&mut self) -> String {
        let mut value = String::new();
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                while let Some(c) = self.peek() {
                    self.pos += 1;
                    if c == quote {
                        break;
                    }
                    value.push(c);
                }
            }
            _ => {
                while let Some(c) = self.peek() {
                    if c.is_whitespace() || c == '>' {
                        break;
                    }
                    value.push(c);
                    self.pos += 1;
                }
            }
        }
        value
    }

    fn at_markup(&self) -> bool {
        self.starts_with("</")
            || self.starts_with("<!--")
            || (self.peek() == Some('<') && self.peek_at(1).is_some_and(|c| c.is_ascii_alphabetic()))
    }

    fn read_text(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if self.at_markup() {
                break;
            }
            text.push(c);
            self.pos += 1;
        }
        text
    }
}

pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tag: &str, attributes: &[(&str, &str)], children: Vec<HtmlNode>) -> HtmlNode {
        HtmlNode::Element {
            tag: tag.to_string(),
            attributes: attributes
                .iter()
                .map(|(n, v)| (n.to_string(), v.to_string()))
                .collect(),
            children,
        }
    }

    #[test]
    fn test_nested_elements_and_text() {
        let nodes = parse_fragment(r#"<div class="a b"><h1 id=t>Title</h1>text</div>"#);
        assert_eq!(
            nodes,
            vec![element(
                "div",
                &[("class", "a b")],
                vec![
                    element("h1", &[("id", "t")], vec![HtmlNode::Text("Title".into())]),
                    HtmlNode::Text("text".into()),
                ]
            )]
        );
    }

    #[test]
    fn test_void_and_self_closing() {
        let nodes = parse_fragment(r#"<input disabled><br/><span/>x"#);
        assert_eq!(
            nodes,
            vec![
                element("input", &[("disabled", "")], vec![]),
                element("br", &[], vec![]),
                element("span", &[], vec![]),
                HtmlNode::Text("x".into()),
            ]
        );
    }

    #[test]
    fn test_attribute_names_lowercased() {
        let nodes = parse_fragment(r#"<DIV contentEditable='true'></DIV>"#);
        assert_eq!(nodes, vec![element("div", &[("contenteditable", "true")], vec![])]);
    }

    #[test]
    fn test_comments_skipped_and_entities_decoded() {
        let nodes = parse_fragment("<!-- note --><p>a &amp; b &lt;c&gt;</p>");
        assert_eq!(
            nodes,
            vec![element("p", &[], vec![HtmlNode::Text("a & b <c>".into())])]
        );
    }

    #[test]
    fn test_unclosed_and_stray_tags() {
        let nodes = parse_fragment("<div><p>one</span>two");
        assert_eq!(
            nodes,
            vec![element(
                "div",
                &[],
                vec![element(
                    "p",
                    &[],
                    vec![HtmlNode::Text("one".into()), HtmlNode::Text("two".into())]
                )]
            )]
        );
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        assert_eq!(parse_fragment("1 < 2"), vec![HtmlNode::Text("1 < 2".into())]);
    }
}
