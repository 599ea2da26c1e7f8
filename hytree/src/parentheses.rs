//! Parentheses notation for trees: `value(child,child,...)`.
//!
//! Grammar
//! ```text
//! tree    := literal? ( "(" tree ( "," tree )* ")" )?
//! literal := ( escaped | plain )+
//! escaped := "\" ( "(" | ")" | "," | "\" )
//! ```
//! Reserved characters inside a literal are escaped with `\` (see [`crate::escape`]).
//! Whitespace is trimmed at the outer boundary of the input only; inside the tree it
//! belongs to the literals. A node without literal, as in `f(,x)`, gets the empty
//! string as value.
//!
//! Two stages:
//! 1) Tokenisation with chumsky into separators and unescaped literals.
//! 2) A single pass over the tokens that keeps an explicit stack of open parents
//!    instead of recursing, so nesting depth is only bounded by memory.
//!
//! Errors carry the byte offset of the offending character in the untrimmed input:
//! `a(b` fails with unbalanced parentheses at 1 (the unclosed `(`), `a,b` with a
//! missing open parent at 1 (the `,`).

use std::fmt;
use std::ops::Range;

use chumsky::prelude::*;
use log::trace;

use crate::error::{ParseError, ParseResult};
use crate::escape::{ESCAPE_CHAR, RESERVED_CHARS, escape};
use crate::node::{NodeId, TreeNode};
use crate::tree::Tree;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    Open,
    Close,
    Comma,
    /// Literal with its escapes already removed.
    Literal(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Open => write!(f, "("),
            Token::Close => write!(f, ")"),
            Token::Comma => write!(f, ","),
            Token::Literal(literal) => write!(f, "{}", escape(literal)),
        }
    }
}

// ---------------- Lexer ----------------

fn lexer<'a>() -> impl Parser<'a, &'a str, Vec<(Token, SimpleSpan)>, extra::Err<Rich<'a, char>>> {
    let escaped = just(ESCAPE_CHAR).ignore_then(one_of(RESERVED_CHARS));
    let plain = none_of(RESERVED_CHARS);
    // A backslash in front of a plain character is kept as is.
    let dangling = just(ESCAPE_CHAR);

    let literal = choice((escaped, plain, dangling))
        .repeated()
        .at_least(1)
        .collect::<String>()
        .map(Token::Literal);

    let separator = choice((
        just('(').to(Token::Open),
        just(')').to(Token::Close),
        just(',').to(Token::Comma),
    ));

    choice((separator, literal))
        .map_with(|token, e| (token, e.span()))
        .repeated()
        .collect()
        .then_ignore(end())
}

/// Splits `src` into tokens with their byte ranges. No trimming is applied.
pub fn tokenize(src: &str) -> ParseResult<Vec<(Token, Range<usize>)>> {
    lexer()
        .parse(src)
        .into_result()
        .map(|tokens| {
            tokens
                .into_iter()
                .map(|(token, span)| (token, span.start..span.end))
                .collect()
        })
        .map_err(|errors| match errors.into_iter().next() {
            Some(error) => ParseError::Lexer {
                message: error.to_string(),
                position: error.span().start,
            },
            None => ParseError::Lexer {
                message: "unknown lexing failure".into(),
                position: 0,
            },
        })
}

// ---------------- Parser ----------------

/// Parses the parentheses notation into a tree of strings.
///
/// ```
/// use hytree::parentheses::parse;
/// use hytree::tree::Tree;
///
/// let tree = parse("mul(div(cos(1.0),cos(π)),sin(mul(1.0,z)))").unwrap();
/// assert_eq!(tree.size(), 10);
/// assert_eq!(tree.root().to_parentheses_string(), "mul(div(cos(1.0),cos(π)),sin(mul(1.0,z)))");
/// ```
pub fn parse(src: &str) -> ParseResult<TreeNode<String>> {
    let offset = src.len() - src.trim_start().len();
    build(src.trim()).map_err(|error| error.shifted(offset))
}

/// Parses the parentheses notation, converting every literal with `mapper`.
pub fn parse_with<V, F>(src: &str, mut mapper: F) -> ParseResult<TreeNode<V>>
where
    F: FnMut(&str) -> V,
{
    Ok(parse(src)?.map(|literal| mapper(literal)))
}

/// Parses the parentheses notation with a fallible literal conversion, e.g.
/// `str::parse::<i32>`. Grammar errors are converted into `E`.
pub fn try_parse_with<V, E, F>(src: &str, mut mapper: F) -> Result<TreeNode<V>, E>
where
    E: From<ParseError>,
    F: FnMut(&str) -> Result<V, E>,
{
    parse(src)?.try_map(|literal| mapper(literal))
}

fn new_child(tree: &mut TreeNode<String>, parent: NodeId) -> NodeId {
    let child = tree.create(String::new());
    tree.push_child(parent, child);
    child
}

fn build(src: &str) -> ParseResult<TreeNode<String>> {
    let tokens = tokenize(src)?;

    let mut tree = TreeNode::new(String::new());
    // Open parents with the offset of their '('.
    let mut parents: Vec<(NodeId, usize)> = Vec::new();
    // Node expecting a literal; `None` right after a ')'.
    let mut current = Some(tree.root_id());
    let mut has_value = false;

    for (token, span) in tokens {
        let position = span.start;
        trace!("parentheses token `{token}` at {position}");

        match token {
            Token::Literal(literal) => match current {
                Some(node) if !has_value => {
                    if let Some(value) = tree.value_mut(node) {
                        *value = literal;
                    }
                    has_value = true;
                }
                // Layout whitespace between a ')' and the next separator.
                None if literal.trim().is_empty() => {}
                _ => return Err(ParseError::UnexpectedLiteral { literal, position }),
            },
            Token::Open => {
                let Some(node) = current else {
                    return Err(ParseError::UnexpectedToken {
                        token: "(".into(),
                        position,
                    });
                };
                parents.push((node, position));
                current = Some(new_child(&mut tree, node));
                has_value = false;
            }
            Token::Comma => {
                let Some(&(parent, _)) = parents.last() else {
                    return Err(ParseError::MissingOpenParent { position });
                };
                current = Some(new_child(&mut tree, parent));
                has_value = false;
            }
            Token::Close => {
                if parents.pop().is_none() {
                    return Err(ParseError::UnbalancedParentheses { position });
                }
                current = None;
            }
        }
    }

    if let Some(&(_, position)) = parents.last() {
        return Err(ParseError::UnbalancedParentheses { position });
    }
    Ok(tree)
}

// ---------------- Printer ----------------

enum Frame<T> {
    Enter(T),
    Comma,
    Close,
}

/// Parentheses notation of `tree`, values rendered with [`Display`](fmt::Display).
pub fn to_parentheses_string<T>(tree: &T) -> String
where
    T: Tree,
    T::Value: fmt::Display,
{
    to_parentheses_string_with(tree, |value| value.to_string())
}

/// Parentheses notation of `tree`, values rendered with `format`. Reserved characters
/// of the rendered values are escaped.
pub fn to_parentheses_string_with<T, F>(tree: &T, mut format: F) -> String
where
    T: Tree,
    F: FnMut(&T::Value) -> String,
{
    let mut out = String::new();
    let mut stack = vec![Frame::Enter(tree.clone())];

    while let Some(frame) = stack.pop() {
        match frame {
            Frame::Enter(node) => {
                out.push_str(&escape(&format(node.value())));
                let count = node.child_count();
                if count == 0 {
                    continue;
                }
                out.push('(');
                stack.push(Frame::Close);
                for (index, child) in node.children().enumerate().rev() {
                    stack.push(Frame::Enter(child));
                    if index > 0 {
                        stack.push(Frame::Comma);
                    }
                }
            }
            Frame::Comma => out.push(','),
            Frame::Close => out.push(')'),
        }
    }
    out
}
