use std::error::Error;

use hytree::error::ParseError;
use hytree::escape::{escape, unescape};
use hytree::node::TreeNode;
use hytree::parentheses::{parse, parse_with, to_parentheses_string, try_parse_with};
use hytree::tree::Tree;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

const ALPHABET: [char; 8] = ['a', 'b', '(', ')', ',', '\\', 'x', '1'];

fn random_value(rng: &mut ChaCha20Rng) -> String {
    (0..rng.random_range(0..4))
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())])
        .collect()
}

fn random_tree(rng: &mut ChaCha20Rng, size: usize) -> TreeNode<String> {
    let mut tree = TreeNode::new(random_value(rng));
    let mut ids = vec![tree.root_id()];
    for _ in 1..size {
        let parent = ids[rng.random_range(0..ids.len())];
        let value = random_value(rng);
        ids.push(tree.attach_value(parent, value).unwrap());
    }
    tree
}

#[test]
fn prints_and_parses_the_reference_expression() {
    let src = "mul(div(cos(1.0),cos(π)),sin(mul(1.0,z)))";
    let tree = parse(src).unwrap();

    assert_eq!(tree.size(), 10);
    assert_eq!(tree.root().child_count(), 2);
    assert_eq!(tree.root().first_leaf().value(), "1.0");
    assert_eq!(to_parentheses_string(&tree.root()), src);
}

#[test]
fn round_trip_of_random_trees() {
    let mut rng = ChaCha20Rng::seed_from_u64(0x5eed);
    for _ in 0..50 {
        let size = rng.random_range(1..40);
        let tree = random_tree(&mut rng, size);
        let text = tree.to_string();
        let parsed = parse(&text).unwrap_or_else(|error| panic!("`{text}`: {error}"));
        assert_eq!(parsed, tree, "`{text}`");
    }
}

#[test]
fn reserved_characters_are_escaped() {
    let mut tree = TreeNode::new("f(x)".to_string());
    let root = tree.root_id();
    tree.attach_values(root, [r"a,b".to_string(), r"c\d".to_string()]).unwrap();

    let text = tree.to_string();
    assert_eq!(text, r"f\(x\)(a\,b,c\\d)");
    assert_eq!(parse(&text).unwrap(), tree);
}

#[test]
fn escape_round_trip() {
    let mut rng = ChaCha20Rng::seed_from_u64(11);
    for _ in 0..200 {
        let value: String = (0..rng.random_range(0..12))
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())])
            .collect();
        assert_eq!(unescape(&escape(&value)), value);
    }
    assert_eq!(escape("a(b,c)"), r"a\(b\,c\)");
}

#[test]
fn whitespace() {
    let tree = parse("  f( a , b )\n").unwrap();
    let children: Vec<&str> = tree.root().children().map(|node| node.get().as_str()).collect();
    assert_eq!(tree.root().value(), "f");
    assert_eq!(children, [" a ", " b "]);

    // Layout whitespace between a ')' and the next separator is ignored.
    assert_eq!(parse("f(g(x) ,y)").unwrap().to_string(), "f(g(x),y)");
}

#[test]
fn empty_values() {
    assert_eq!(parse("f(,x)").unwrap().root().child(0).unwrap().value(), "");
    let single = parse("").unwrap();
    assert_eq!(single.size(), 1);
    assert_eq!(single.root().value(), "");
    assert_eq!(parse("f()").unwrap().root().child_count(), 1);
}

#[test]
fn grammar_errors_carry_positions() {
    assert_eq!(
        parse("a(b").unwrap_err(),
        ParseError::UnbalancedParentheses { position: 1 }
    );
    assert_eq!(
        parse("a,b").unwrap_err(),
        ParseError::MissingOpenParent { position: 1 }
    );
    assert_eq!(
        parse("a(b))").unwrap_err(),
        ParseError::UnbalancedParentheses { position: 4 }
    );
    assert_eq!(
        parse("a(b(c)").unwrap_err(),
        ParseError::UnbalancedParentheses { position: 1 }
    );
    assert_eq!(
        parse("a(b)c").unwrap_err(),
        ParseError::UnexpectedLiteral {
            literal: "c".into(),
            position: 4
        }
    );
    assert_eq!(
        parse("a(b)(c)").unwrap_err(),
        ParseError::UnexpectedToken {
            token: "(".into(),
            position: 4
        }
    );
    // Offsets refer to the untrimmed input.
    assert_eq!(parse("  a(b").unwrap_err().position(), 3);

    // Offsets are in bytes, always on a character boundary.
    let src = "π(b";
    let error = parse(src).unwrap_err();
    assert_eq!(error, ParseError::UnbalancedParentheses { position: 2 });
    assert_eq!(&src[error.position()..], "(b");
}

#[test]
fn typed_parsing() {
    let tree = parse_with("1(2,3(4))", |literal| literal.len() as u8).unwrap();
    assert_eq!(tree.size(), 4);

    let numbers: TreeNode<i64> =
        try_parse_with("1(2,3(4))", |literal| literal.parse::<i64>().map_err(Box::<dyn Error>::from))
            .unwrap();
    let sum: i64 = numbers.root().breadth_first().map(|node| *node.value()).sum();
    assert_eq!(sum, 10);

    let failure = try_parse_with::<i64, Box<dyn Error>, _>("1(x)", |literal| Ok(literal.parse::<i64>()?));
    assert!(failure.is_err());
    let grammar = try_parse_with::<i64, Box<dyn Error>, _>("1(2", |literal| Ok(literal.parse::<i64>()?));
    assert!(grammar.unwrap_err().to_string().contains("position 1"));
}
