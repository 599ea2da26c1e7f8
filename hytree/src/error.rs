//! Error types shared by the tree, grammar, pattern and rewriting modules.
//!
//! Absent values (no parent, no sibling, no shared ancestor) are reported as `None`
//! by the query methods; the enums below only cover operations that can genuinely
//! fail.

use strum::EnumIs;
use thiserror::Error;

use crate::node::NodeId;

/// Structural violations raised by tree queries and mutations.
#[derive(Debug, Clone, PartialEq, Eq, EnumIs, Error)]
pub enum TreeError {
    /// A child was requested outside of `[0, child_count)`.
    #[error("Child index {index} is out of bounds for a node with {count} children.")]
    ChildIndexOutOfBounds { index: usize, count: usize },

    /// The inserted node is the target itself or one of its ancestors.
    #[error(
        "The new child is an ancestor of the node it is inserted into. Inserting it would make the tree cyclic."
    )]
    CyclicInsertion,

    /// The node passed to a sibling query is not a child of the receiver.
    #[error("The given node is not a child of this node.")]
    NotAChild,

    /// The node passed as ancestor of a path is not on the parent chain.
    #[error("The given node is not an ancestor of the descendant node.")]
    NotAnAncestor,

    /// The handle does not refer to a live node of the arena.
    #[error("The node handle `{0:?}` does not refer to a live node of this tree.")]
    UnknownNode(NodeId),

    /// Deleting the subtree would delete the node the tree is anchored at.
    #[error("The root of the tree cannot be deleted or replaced by one of its own descendants.")]
    RootRemoval,

    /// Flattened arrays that do not describe a breadth-first tree layout.
    #[error("Invalid flattened tree layout: {0}")]
    InvalidFlatLayout(String),
}

/// Grammar violations of the parentheses notation. Every variant carries the byte
/// offset of the offending character in the parsed input.
#[derive(Debug, Clone, PartialEq, Eq, EnumIs, Error)]
pub enum ParseError {
    /// A `)` without matching `(`, or input ending while a `(` is still open.
    #[error("Unbalanced parentheses at position {position}.")]
    UnbalancedParentheses { position: usize },

    /// A `,` that does not sit inside any open parent.
    #[error("Expected '(' before the ',' at position {position}. Siblings need an enclosing parent.")]
    MissingOpenParent { position: usize },

    /// A separator that cannot appear at this point, e.g. `(` after a closed root.
    #[error("Unexpected token `{token}` at position {position}.")]
    UnexpectedToken { token: String, position: usize },

    /// A second literal for the same node, or a literal after the root was closed.
    #[error(
        "Unexpected literal `{literal}` at position {position}. A node carries exactly one value and a tree has a single root."
    )]
    UnexpectedLiteral { literal: String, position: usize },

    /// The lexer rejected the input.
    #[error("Lexing error at position {position}: {message}")]
    Lexer { message: String, position: usize },
}

impl ParseError {
    /// Byte offset of the offending character in the parsed input, so that
    /// `&src[..position]` is always a valid slice. On non-ASCII input this differs
    /// from the character index: `parse("π(b")` reports 2, not 1.
    pub fn position(&self) -> usize {
        match self {
            ParseError::UnbalancedParentheses { position }
            | ParseError::MissingOpenParent { position }
            | ParseError::UnexpectedToken { position, .. }
            | ParseError::UnexpectedLiteral { position, .. }
            | ParseError::Lexer { position, .. } => *position,
        }
    }

    pub(crate) fn shifted(self, offset: usize) -> Self {
        match self {
            ParseError::UnbalancedParentheses { position } => ParseError::UnbalancedParentheses {
                position: position + offset,
            },
            ParseError::MissingOpenParent { position } => ParseError::MissingOpenParent {
                position: position + offset,
            },
            ParseError::UnexpectedToken { token, position } => ParseError::UnexpectedToken {
                token,
                position: position + offset,
            },
            ParseError::UnexpectedLiteral { literal, position } => ParseError::UnexpectedLiteral {
                literal,
                position: position + offset,
            },
            ParseError::Lexer { message, position } => ParseError::Lexer {
                message,
                position: position + offset,
            },
        }
    }
}

/// Errors raised while compiling a tree pattern.
#[derive(Debug, Clone, PartialEq, Eq, EnumIs, Error)]
pub enum PatternError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Variables stand for whole subtrees and therefore cannot have children.
    #[error("The variable `<{name}>` must be a leaf node, but it has children: `{subtree}`.")]
    VariableNotLeaf { name: String, subtree: String },

    /// Variable names are identifiers: a letter or `_`, then alphanumeric characters or `_`.
    #[error(
        "Invalid variable name `{0}`. Names must start with a letter or '_' and only contain alphanumeric characters or '_'."
    )]
    InvalidVariableName(String),
}

/// Errors raised while building a rewrite rule.
#[derive(Debug, Clone, PartialEq, Eq, EnumIs, Error)]
pub enum RuleError {
    /// The rule text has no `->` separator.
    #[error("Missing '->' separator in rewrite rule `{0}`.")]
    MissingSeparator(String),

    /// The rule text has more than one `->` separator.
    #[error("Rewrite rule `{rule}` contains {count} '->' separators, exactly one is expected.")]
    TooManySeparators { count: usize, rule: String },

    /// The substitution uses variables that the match pattern does not bind.
    #[error(
        "The substitution of rule `{rule}` uses variables {variables:?} which are not defined in the match pattern."
    )]
    UndefinedVariables { rule: String, variables: Vec<String> },

    #[error(transparent)]
    Pattern(#[from] PatternError),
}

impl From<ParseError> for RuleError {
    fn from(value: ParseError) -> Self {
        RuleError::Pattern(PatternError::Parse(value))
    }
}

/// Errors raised while reading or writing the persisted binary form.
#[cfg(feature = "borsh")]
#[derive(Debug, EnumIs, Error)]
pub enum SerialError {
    #[error("I/O error while reading or writing a tree: {0}")]
    Io(#[from] std::io::Error),

    /// The leading discriminator byte is not a known tree kind.
    #[error("Unknown tree kind discriminator `{0}`.")]
    UnknownTag(u8),

    #[error("Persisted tree has an invalid layout: {0}")]
    Layout(#[from] TreeError),
}

#[cfg(feature = "borsh")]
impl From<SerialError> for std::io::Error {
    fn from(value: SerialError) -> Self {
        match value {
            SerialError::Io(error) => error,
            other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
        }
    }
}

pub type TreeResult<T> = Result<T, TreeError>;
pub type ParseResult<T> = Result<T, ParseError>;
