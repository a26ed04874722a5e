use std::collections::BTreeSet;

use yap::{types::WithContext, IntoTokens, TokenLocation, Tokens};

use crate::ParseError;

/// Top-level ports of an (extended) BLIF netlist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IoList {
    pub inputs: BTreeSet<String>,
    pub outputs: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct Context {
    io_list: IoList,
    in_model: bool,
    done: bool,
}

impl Context {
    fn handle_directive(&mut self, directive: &str, args: &[String]) {
        if self.done {
            return;
        }
        match directive {
            ".model" => self.in_model = true,
            ".inputs" => self.io_list.inputs.extend(args.iter().cloned()),
            ".outputs" => self.io_list.outputs.extend(args.iter().cloned()),
            // Only the first model is the top level.
            ".end" if self.in_model => self.done = true,
            _ => (),
        }
    }
}

fn parse_space(t: &mut WithContext<impl Tokens<Item = char>, Context>) -> bool {
    let mut any = false;
    loop {
        if t.skip_while(|c| *c == ' ' || *c == '\t' || *c == '\r') > 0
            || t.tokens("\\\n".chars())
            || t.tokens("\\\r\n".chars())
        {
            any = true;
        } else {
            return any;
        }
    }
}

fn parse_comment(t: &mut WithContext<impl Tokens<Item = char>, Context>) -> bool {
    if !t.token('#') {
        return false;
    }
    t.skip_while(|c| *c != '\n');
    true
}

fn parse_blank(t: &mut WithContext<impl Tokens<Item = char>, Context>) -> bool {
    let space = parse_space(t);
    let comment = parse_comment(t);
    space || comment
}

fn parse_word(t: &mut WithContext<impl Tokens<Item = char>, Context>) -> Option<String> {
    let mut word = String::new();
    loop {
        match t.peek() {
            Some('\\') if t.optional(|t| parse_space(t).then_some(())).is_some() => break,
            Some(char) if char.is_whitespace() || char == '#' => break,
            Some(char) => {
                t.next();
                word.push(char);
            }
            None => break,
        }
    }
    if word.is_empty() {
        return None;
    }
    Some(word)
}

fn parse_line(t: &mut WithContext<impl Tokens<Item = char>, Context>) -> bool {
    parse_blank(t);
    let words = Vec::from_iter(
        t.many(|t| {
            parse_blank(t);
            parse_word(t)
        })
        .as_iter(),
    );
    parse_blank(t);
    let newline = t.token('\n');
    if let Some((directive, args)) = words.split_first() {
        t.context_mut().handle_directive(directive, args);
    }
    newline || !words.is_empty()
}

impl IoList {
    pub fn parse(source: &str) -> Result<IoList, ParseError> {
        let mut tokens = source.into_tokens().with_context(Context::default());
        while parse_line(&mut tokens) {}
        let (mut tokens, context) = tokens.into_parts();
        if !tokens.eof() {
            return Err(ParseError::new("BLIF", source, tokens.location().offset()));
        }
        Ok(context.io_list)
    }
}
