//! Minimal XML reader producing an element arena.
//!
//! Covers what packed netlists use: elements, attributes, character data, entity and character references,
//! comments, CDATA sections, processing instructions and a document type declaration. Namespaces are not
//! interpreted; a prefixed name is just a name containing `:`.

use std::ops::Index;

use yap::{types::WithContext, IntoTokens, TokenLocation, Tokens};

use crate::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementIndex(usize);

#[derive(Debug, Clone)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    text: String,
    parent: Option<ElementIndex>,
    children: Vec<ElementIndex>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|(attr_name, _)| attr_name == name).map(|(_, value)| value.as_str())
    }

    /// Character data directly inside this element, with surrounding whitespace removed.
    pub fn text(&self) -> &str {
        self.text.trim()
    }

    pub fn parent(&self) -> Option<ElementIndex> {
        self.parent
    }

    pub fn children(&self) -> &[ElementIndex] {
        &self.children
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
}

impl Document {
    pub fn parse(source: &str) -> Result<Document, ParseError> {
        let mut tokens = source.into_tokens().with_context(Context { elements: vec![] });
        let parsed = parse_document(&mut tokens);
        let (mut tokens, context) = tokens.into_parts();
        if parsed.is_none() || !tokens.eof() {
            return Err(ParseError::new("XML", source, tokens.location().offset()));
        }
        Ok(Document { elements: context.elements })
    }

    pub fn root(&self) -> ElementIndex {
        ElementIndex(0)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Children of `index` with the element name `name`.
    pub fn children_named<'a>(&'a self, index: ElementIndex, name: &'a str) -> impl Iterator<Item = ElementIndex> + 'a {
        self[index].children.iter().copied().filter(move |&child| self[child].name == name)
    }

    /// All elements below `index` in document order, not including `index` itself.
    pub fn descendants(&self, index: ElementIndex) -> Vec<ElementIndex> {
        let mut result = vec![];
        let mut stack = Vec::from_iter(self[index].children.iter().rev().copied());
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self[current].children.iter().rev().copied());
        }
        result
    }

    pub fn iter(&self) -> impl Iterator<Item = ElementIndex> {
        (0..self.elements.len()).map(ElementIndex)
    }
}

impl Index<ElementIndex> for Document {
    type Output = Element;

    fn index(&self, index: ElementIndex) -> &Element {
        &self.elements[index.0]
    }
}

#[derive(Debug)]
struct Context {
    elements: Vec<Element>,
}

impl Context {
    fn add_element(&mut self, name: String, attributes: Vec<(String, String)>, parent: Option<ElementIndex>) -> ElementIndex {
        let index = ElementIndex(self.elements.len());
        self.elements.push(Element { name, attributes, text: String::new(), parent, children: vec![] });
        if let Some(parent) = parent {
            self.elements[parent.0].children.push(index);
        }
        index
    }
}

fn parse_space(t: &mut WithContext<impl Tokens<Item = char>, Context>) -> bool {
    t.skip_while(|c| c.is_whitespace()) > 0
}

#[must_use]
fn parse_symbol(t: &mut WithContext<impl Tokens<Item = char>, Context>, symbol: char) -> Option<()> {
    if !t.token(symbol) {
        return None;
    }
    Some(())
}

#[must_use]
fn parse_literal(t: &mut WithContext<impl Tokens<Item = char>, Context>, literal: &str) -> Option<()> {
    if !t.tokens(literal.chars()) {
        return None;
    }
    Some(())
}

// Consumes everything up to and including `terminator`.
fn parse_until(t: &mut WithContext<impl Tokens<Item = char>, Context>, terminator: &str) -> Option<String> {
    let mut text = String::new();
    loop {
        if t.tokens(terminator.chars()) {
            return Some(text);
        }
        text.push(t.next()?);
    }
}

fn parse_comment(t: &mut WithContext<impl Tokens<Item = char>, Context>) -> Option<()> {
    parse_literal(t, "<!--")?;
    parse_until(t, "-->")?;
    Some(())
}

fn parse_processing_instruction(t: &mut WithContext<impl Tokens<Item = char>, Context>) -> Option<()> {
    parse_literal(t, "<?")?;
    parse_until(t, "?>")?;
    Some(())
}

fn parse_doctype(t: &mut WithContext<impl Tokens<Item = char>, Context>) -> Option<()> {
    parse_literal(t, "<!DOCTYPE")?;
    parse_until(t, ">")?;
    Some(())
}

fn parse_cdata(t: &mut WithContext<impl Tokens<Item = char>, Context>) -> Option<String> {
    parse_literal(t, "<![CDATA[")?;
    parse_until(t, "]]>")
}

fn parse_misc(t: &mut WithContext<impl Tokens<Item = char>, Context>) -> bool {
    let space = parse_space(t);
    let markup = t.optional(|t| parse_comment(t)).is_some()
        || t.optional(|t| parse_processing_instruction(t)).is_some()
        || t.optional(|t| parse_doctype(t)).is_some();
    space || markup
}

fn parse_name(t: &mut WithContext<impl Tokens<Item = char>, Context>) -> Option<String> {
    let name: String = t.take_while(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.')).collect();
    if name.is_empty() {
        return None;
    }
    Some(name)
}

fn parse_reference(t: &mut WithContext<impl Tokens<Item = char>, Context>) -> Option<char> {
    parse_symbol(t, '&')?;
    let name: String = t.take_while(|c| c.is_alphanumeric() || *c == '#').collect();
    parse_symbol(t, ';')?;
    match name.as_str() {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x") {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}

fn parse_char_data(t: &mut WithContext<impl Tokens<Item = char>, Context>, delimiter: char) -> Option<char> {
    match t.peek()? {
        '&' => parse_reference(t),
        '<' => None,
        char if char == delimiter => None,
        _ => t.next(),
    }
}

fn parse_attribute(t: &mut WithContext<impl Tokens<Item = char>, Context>) -> Option<(String, String)> {
    parse_space(t);
    let name = parse_name(t)?;
    parse_space(t);
    parse_symbol(t, '=')?;
    parse_space(t);
    let quote = match t.next()? {
        quote @ ('"' | '\'') => quote,
        _ => return None,
    };
    let value = t.many(|t| parse_char_data(t, quote)).collect::<String>();
    parse_symbol(t, quote)?;
    Some((name, value))
}

fn parse_end_tag(t: &mut WithContext<impl Tokens<Item = char>, Context>, expected: &str) -> Option<()> {
    let name = parse_name(t)?;
    if name != expected {
        return None;
    }
    parse_space(t);
    parse_symbol(t, '>')
}

fn parse_content(t: &mut WithContext<impl Tokens<Item = char>, Context>, parent: ElementIndex) -> Option<()> {
    loop {
        if t.tokens("</".chars()) {
            return Some(());
        }
        if t.optional(|t| parse_comment(t)).is_some() || t.optional(|t| parse_processing_instruction(t)).is_some() {
            continue;
        }
        if let Some(text) = t.optional(|t| parse_cdata(t)) {
            t.context_mut().elements[parent.0].text.push_str(&text);
            continue;
        }
        match t.peek()? {
            '<' => {
                parse_element(t, Some(parent))?;
            }
            _ => {
                let text = t.many(|t| parse_char_data(t, '<')).collect::<String>();
                if text.is_empty() {
                    return None;
                }
                t.context_mut().elements[parent.0].text.push_str(&text);
            }
        }
    }
}

// Elements are only added once their start tag is complete; any later failure aborts the whole document.
fn parse_element(t: &mut WithContext<impl Tokens<Item = char>, Context>, parent: Option<ElementIndex>) -> Option<ElementIndex> {
    parse_symbol(t, '<')?;
    let name = parse_name(t)?;
    let attributes = Vec::from_iter(t.many(|t| parse_attribute(t)).as_iter());
    parse_space(t);
    let empty = t.token('/');
    parse_symbol(t, '>')?;
    let index = t.context_mut().add_element(name.clone(), attributes, parent);
    if !empty {
        parse_content(t, index)?;
        parse_end_tag(t, &name)?;
    }
    Some(index)
}

fn parse_document(t: &mut WithContext<impl Tokens<Item = char>, Context>) -> Option<ElementIndex> {
    t.skip_while(|c| *c == '\u{feff}');
    while parse_misc(t) {}
    let root = parse_element(t, None)?;
    while parse_misc(t) {}
    Some(root)
}
