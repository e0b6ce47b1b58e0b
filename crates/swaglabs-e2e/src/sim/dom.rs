//! Virtual DOM and the CSS subset used to query it.
//!
//! Supported selector grammar: compound selectors made of an optional tag
//! (or `*`), `#id`, any number of `.class` and `[attr]` / `[attr="value"]`
//! parts, joined by the descendant combinator (whitespace).

use crate::result::{E2eError, E2eResult};

/// What a click on a node does to the application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    OpenMenu,
    CloseMenu,
    AllItems,
    About,
    Logout,
    ResetAppState,
    OpenCart,
    AddToCart(u32),
    RemoveFromCart(u32),
    ContinueShopping,
    Checkout,
    CancelInformation,
    ContinueInformation,
    CancelOverview,
    Finish,
    BackHome,
}

/// Application state a form control is bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Binding {
    Username,
    Password,
    FirstName,
    LastName,
    PostalCode,
    Sort,
}

/// A rendered element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    pub tag: &'static str,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub attrs: Vec<(String, String)>,
    pub text: String,
    pub hidden: bool,
    pub action: Option<Action>,
    pub binding: Option<Binding>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            ..Self::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add whitespace-separated classes
    pub fn class(mut self, classes: &str) -> Self {
        self.classes
            .extend(classes.split_whitespace().map(str::to_string));
        self
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.push((name.to_string(), value.into()));
        self
    }

    pub fn test_id(self, value: impl Into<String>) -> Self {
        self.attr(crate::locator::TEST_ID_ATTRIBUTE, value)
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub const fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub const fn on_click(mut self, action: Action) -> Self {
        self.action = Some(action);
        self
    }

    pub const fn bind(mut self, binding: Binding) -> Self {
        self.binding = Some(binding);
        self
    }

    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    pub fn children(mut self, children: impl IntoIterator<Item = Self>) -> Self {
        self.children.extend(children);
        self
    }

    /// Attribute value by name
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        match name {
            "id" => self.id.as_deref(),
            _ => self
                .attrs
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.as_str()),
        }
    }

    /// `textContent`: own text followed by descendants' text
    pub fn text_content(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.children {
            out.push_str(&child.text_content());
        }
        out
    }
}

/// A query hit with its effective visibility
#[derive(Debug, Clone, Copy)]
pub struct Match<'a> {
    pub node: &'a Node,
    pub visible: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct AttrTest {
    name: String,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty()
    }

    fn matches(&self, node: &Node) -> bool {
        self.tag.as_deref().map_or(true, |tag| tag == node.tag)
            && self
                .id
                .as_deref()
                .map_or(true, |id| node.id.as_deref() == Some(id))
            && self.classes.iter().all(|c| node.classes.contains(c))
            && self.attrs.iter().all(|test| match node.get_attr(&test.name) {
                Some(actual) => test.value.as_deref().map_or(true, |v| v == actual),
                None => false,
            })
    }
}

/// Parsed descendant-combinator chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssSelector {
    chain: Vec<Compound>,
}

impl CssSelector {
    pub fn parse(source: &str) -> E2eResult<Self> {
        let invalid = |reason: &str| E2eError::InvalidSelector {
            selector: source.to_string(),
            reason: reason.to_string(),
        };

        let mut chain = Vec::new();
        let mut current = Compound::default();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                c if c.is_whitespace() => {
                    if !current.is_empty() {
                        chain.push(std::mem::take(&mut current));
                    }
                }
                '.' => current.classes.push(read_ident(&mut chars).ok_or_else(|| invalid("empty class"))?),
                '#' => current.id = Some(read_ident(&mut chars).ok_or_else(|| invalid("empty id"))?),
                '[' => current.attrs.push(read_attr(&mut chars).ok_or_else(|| invalid("malformed attribute"))?),
                '*' if current.is_empty() => {}
                c if is_ident_char(c) && current.is_empty() => {
                    let mut tag = c.to_string();
                    if let Some(rest) = read_ident(&mut chars) {
                        tag.push_str(&rest);
                    }
                    current.tag = Some(tag.to_ascii_lowercase());
                }
                other => return Err(invalid(&format!("unsupported character '{other}'"))),
            }
        }
        if !current.is_empty() {
            chain.push(current);
        }
        if chain.is_empty() {
            return Err(invalid("empty selector"));
        }
        Ok(Self { chain })
    }

    /// All matches under `root` in document order
    pub fn query_all<'a>(&self, root: &'a Node) -> Vec<Match<'a>> {
        let mut out = Vec::new();
        let mut ancestors = Vec::new();
        self.walk(root, true, &mut ancestors, &mut out);
        out
    }

    fn walk<'a>(
        &self,
        node: &'a Node,
        parent_visible: bool,
        ancestors: &mut Vec<&'a Node>,
        out: &mut Vec<Match<'a>>,
    ) {
        let visible = parent_visible && !node.hidden;
        if self.matches_at(node, ancestors) {
            out.push(Match { node, visible });
        }
        ancestors.push(node);
        for child in &node.children {
            self.walk(child, visible, ancestors, out);
        }
        ancestors.pop();
    }

    fn matches_at(&self, node: &Node, ancestors: &[&Node]) -> bool {
        let Some((last, rest)) = self.chain.split_last() else {
            return false;
        };
        if !last.matches(node) {
            return false;
        }
        // Right-to-left, each remaining compound must match some strictly
        // higher ancestor than the previous one.
        let mut remaining = ancestors.len();
        for compound in rest.iter().rev() {
            match ancestors[..remaining].iter().rposition(|a| compound.matches(a)) {
                Some(pos) => remaining = pos,
                None => return false,
            }
        }
        true
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<String> {
    let mut ident = String::new();
    while let Some(&c) = chars.peek() {
        if !is_ident_char(c) {
            break;
        }
        ident.push(c);
        chars.next();
    }
    (!ident.is_empty()).then_some(ident)
}

fn read_attr(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<AttrTest> {
    let name = read_ident(chars)?;
    match chars.next()? {
        ']' => Some(AttrTest { name, value: None }),
        '=' => {
            let value = match chars.peek().copied()? {
                quote @ ('"' | '\'') => {
                    chars.next();
                    let mut value = String::new();
                    loop {
                        let c = chars.next()?;
                        if c == quote {
                            break;
                        }
                        value.push(c);
                    }
                    value
                }
                _ => read_ident(chars)?,
            };
            (chars.next()? == ']').then_some(AttrTest {
                name,
                value: Some(value),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn tree() -> Node {
        Node::new("div").id("root").child(
            Node::new("div")
                .class("inventory_list")
                .child(
                    Node::new("div")
                        .class("inventory_item")
                        .child(Node::new("div").class("inventory_item_name").text("Backpack"))
                        .child(Node::new("button").test_id("add-to-cart-backpack").text("Add to cart")),
                )
                .child(
                    Node::new("div")
                        .class("inventory_item")
                        .hidden(true)
                        .child(Node::new("div").class("inventory_item_name").text("Onesie"))
                        .child(Node::new("button").test_id("remove-onesie").text("Remove")),
                ),
        )
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn test_parse_compound_with_attribute() {
            let selector = CssSelector::parse("input[data-test=\"username\"]").unwrap();
            assert_eq!(selector.chain.len(), 1);
            assert_eq!(selector.chain[0].tag.as_deref(), Some("input"));
            assert_eq!(selector.chain[0].attrs[0].value.as_deref(), Some("username"));
        }

        #[test]
        fn test_parse_descendant_chain() {
            let selector = CssSelector::parse(".cart_item  .inventory_item_name").unwrap();
            assert_eq!(selector.chain.len(), 2);
        }

        #[test]
        fn test_parse_rejects_unsupported_combinator() {
            assert!(matches!(
                CssSelector::parse(".a > .b"),
                Err(E2eError::InvalidSelector { .. })
            ));
            assert!(CssSelector::parse("").is_err());
            assert!(CssSelector::parse("[data-test=\"x\"").is_err());
        }
    }

    mod query_tests {
        use super::*;

        #[test]
        fn test_descendant_query_in_document_order() {
            let root = tree();
            let hits = CssSelector::parse(".inventory_item button").unwrap().query_all(&root);
            assert_eq!(hits.len(), 2);
            assert_eq!(hits[0].node.text, "Add to cart");
            assert_eq!(hits[1].node.text, "Remove");
        }

        #[test]
        fn test_hidden_ancestor_makes_descendants_invisible() {
            let root = tree();
            let hits = CssSelector::parse(".inventory_item_name").unwrap().query_all(&root);
            assert!(hits[0].visible);
            assert!(!hits[1].visible);
        }

        #[test]
        fn test_attribute_presence_and_id() {
            let root = tree();
            assert_eq!(CssSelector::parse("[data-test]").unwrap().query_all(&root).len(), 2);
            assert_eq!(CssSelector::parse("#root").unwrap().query_all(&root).len(), 1);
            assert_eq!(CssSelector::parse("div#root .inventory_list").unwrap().query_all(&root).len(), 1);
        }

        #[test]
        fn test_text_content_concatenates_descendants() {
            let root = tree();
            let item = CssSelector::parse(".inventory_item").unwrap().query_all(&root)[0].node;
            assert_eq!(item.text_content(), "BackpackAdd to cart");
        }
    }
}
