use std::collections::BTreeMap;

use hytree::error::{ParseError, PatternError, RuleError};
use hytree::node::TreeNode;
use hytree::pattern::{PatternNode, TreePattern};
use hytree::rewrite::{RuleTreeRewriter, TreeRewriteRule, TreeRewriter};
use hytree::tree::Tree;

fn tree(src: &str) -> TreeNode<String> {
    TreeNode::parse(src).unwrap()
}

fn pattern(src: &str) -> TreePattern {
    TreePattern::compile(src).unwrap()
}

// ======================== Patterns ========================

#[test]
fn compile_collects_sorted_variables() {
    let compiled = pattern("f(<y>,g(<x>,1),<y>)");
    let names: Vec<&str> = compiled.variables().iter().map(String::as_str).collect();
    assert_eq!(names, ["x", "y"]);
    assert_eq!(compiled.root().value(), &PatternNode::Val("f".into()));
    assert_eq!(compiled.to_string(), "f(<y>,g(<x>,1),<y>)");
}

#[test]
fn compile_errors() {
    assert_eq!(
        TreePattern::compile("f(<x>(a),b)").unwrap_err(),
        PatternError::VariableNotLeaf {
            name: "x".into(),
            subtree: "<x>(a)".into()
        }
    );
    assert_eq!(
        TreePattern::compile("f(<>)").unwrap_err(),
        PatternError::InvalidVariableName(String::new())
    );
    assert_eq!(
        TreePattern::compile("f(<a b>)").unwrap_err(),
        PatternError::InvalidVariableName("a b".into())
    );
    assert_eq!(
        TreePattern::compile("f(<1x>)").unwrap_err(),
        PatternError::InvalidVariableName("1x".into())
    );
    assert!(TreePattern::compile("f(<_x1>)").is_ok());
    assert_eq!(
        TreePattern::compile("f(<x>").unwrap_err(),
        PatternError::Parse(ParseError::UnbalancedParentheses { position: 1 })
    );
}

// ======================== Matching ========================

#[test]
fn matches_and_binds_variables() {
    let add = pattern("add(<x>,0)");

    let concrete = tree("add(z,0)");
    let result = add.match_tree(&concrete.root()).unwrap();
    assert_eq!(result.get("x").unwrap().to_string(), "z");
    assert!(result.node().identical(&concrete.root()));

    assert!(add.matches(&tree("add(mul(a,b),0)").root()));
    assert!(!add.matches(&tree("add(z,1)").root()));
    assert!(!add.matches(&tree("add(z,0,0)").root()));
    assert!(!add.matches(&tree("sub(z,0)").root()));
}

#[test]
fn repeated_variables_are_independent_wildcards() {
    let square = pattern("mul(<x>,<x>)");
    let different = tree("mul(a,b)");

    // Repetitions are not checked for equality; the first occurrence wins.
    let result = square.match_tree(&different.root()).unwrap();
    assert_eq!(result.get("x").unwrap().to_string(), "a");

    let consistent = square.matcher(different.root()).consistent();
    assert!(!consistent.matches());

    let equal = tree("mul(f(a),f(a))");
    let consistent = square.matcher(equal.root()).consistent();
    assert!(consistent.matches());
    assert_eq!(consistent.first().unwrap().get("x").unwrap().to_string(), "f(a)");
}

#[test]
fn results_enumerate_matches_breadth_first() {
    let add = pattern("add(<x>,0)");
    let concrete = tree("mul(add(a,0),sub(add(add(b,0),0),c))");

    let matcher = add.matcher(concrete.root());
    let bound: Vec<String> = matcher
        .results()
        .map(|result| result.get("x").unwrap().to_string())
        .collect();
    assert_eq!(bound, ["a", "add(b,0)", "b"]);
    assert!(!matcher.matches());

    let first = matcher.first().unwrap();
    assert_eq!(first.node().path().as_slice(), [0]);
    assert_eq!(first.to_string(), "add(a,0) {x: a}");
}

#[test]
fn custom_value_predicate() {
    let add = pattern("add(<x>,0)");
    let concrete = TreeNode::new("ADD").with_value("y").with_value("0");

    assert!(!add.matcher(concrete.root()).matches());
    let matcher = add.matcher_with(concrete.root(), |value: &&str, literal: &str| {
        value.eq_ignore_ascii_case(literal)
    });
    assert!(matcher.matches());
}

#[test]
fn matches_flat_trees() {
    use hytree::flat::FlatTreeNode;

    let flat = FlatTreeNode::of_tree(&tree("sin(add(x,0))").root());
    let result = pattern("add(<x>,0)").matcher(flat.clone()).first().unwrap();
    assert_eq!(result.node().index(), 1);
    assert_eq!(result.get("x").unwrap().value(), "x");
}

// ======================== Expansion ========================

#[test]
fn expand_substitutes_bound_subtrees() {
    let source = tree("pair(a(1),b)");
    let root = source.root();
    let mut bindings = BTreeMap::new();
    bindings.insert("x".to_string(), root.child(0).unwrap());
    bindings.insert("y".to_string(), root.child(1).unwrap());

    let expanded = pattern("f(<y>,g(<x>),<x>)").expand(&bindings, str::to_owned);
    assert_eq!(expanded.to_string(), "f(b,g(a(1)),a(1))");

    // Unbound variables disappear, except at the root.
    let expanded = pattern("f(<x>,<z>)").expand(&bindings, str::to_owned);
    assert_eq!(expanded.to_string(), "f(a(1))");
    let expanded = pattern("<z>").expand(&bindings, str::to_owned);
    assert_eq!(expanded.to_string(), "z");
}

#[test]
fn expand_in_copies_within_the_arena() {
    let mut target = tree("h(u(v),w)");
    let u = target.root().child(0).unwrap().id();
    let bindings = BTreeMap::from([("x".to_string(), u)]);

    let id = pattern("k(<x>,<x>)").expand_in(&mut target, &bindings, str::to_owned).unwrap();
    assert_eq!(target.node(id).unwrap().to_string(), "k(u(v),u(v))");
    assert_eq!(target.to_string(), "h(u(v),w)");
    assert_eq!(target.garbage_size(), 5);
}

// ======================== Rules ========================

#[test]
fn rule_parsing() {
    let rule = TreeRewriteRule::parse("add(<x>,0) -> <x>").unwrap();
    assert_eq!(rule.to_string(), "add(<x>,0) -> <x>");
    assert_eq!(rule.left().to_string(), "add(<x>,0)");
    assert_eq!(rule.right().to_string(), "<x>");
    assert_eq!("add(<x>,0) -> <x>".parse::<TreeRewriteRule>().unwrap(), rule);

    assert_eq!(
        TreeRewriteRule::parse("add(<x>,0)").unwrap_err(),
        RuleError::MissingSeparator("add(<x>,0)".into())
    );
    assert!(matches!(
        TreeRewriteRule::parse("a -> b -> c").unwrap_err(),
        RuleError::TooManySeparators { count: 2, .. }
    ));
    assert!(TreeRewriteRule::parse("add(<x> -> <x>").unwrap_err().is_pattern());
}

#[test]
fn rule_rejects_unbound_substitution_variables() {
    let error = TreeRewriteRule::parse("add(<x>,0) -> mul(<x>,<y>,<z>)").unwrap_err();
    match error {
        RuleError::UndefinedVariables { variables, .. } => assert_eq!(variables, ["y", "z"]),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn rewrite_converges_in_two_steps() {
    let rule = TreeRewriteRule::parse("add(<x>,0) -> <x>").unwrap();
    let mut target = tree("add(add(y,0),0)");

    assert_eq!(rule.rewrite_limited(&mut target, usize::MAX).unwrap(), 2);
    assert_eq!(target.to_string(), "y");
    assert!(!rule.rewrite(&mut target).unwrap());
    assert_eq!(target.garbage_size(), 0);
}

#[test]
fn rewrite_inner_nodes() {
    let rule = TreeRewriteRule::parse("mul(<x>,1) -> <x>").unwrap();
    let mut target = tree("sin(add(mul(a,1),mul(b(c),1)))");

    assert!(rule.rewrite(&mut target).unwrap());
    assert_eq!(target.to_string(), "sin(add(a,b(c)))");
    assert_eq!(target.garbage_size(), 0);
}

#[test]
fn rewrite_limit() {
    let rule = TreeRewriteRule::parse("s(<x>) -> s(s(<x>))").unwrap();
    let mut target = tree("s(0)");

    // This rule never terminates on its own.
    assert_eq!(rule.rewrite_limited(&mut target, 3).unwrap(), 3);
    assert_eq!(target.to_string(), "s(s(s(s(0))))");
}

#[test]
fn rule_systems_apply_round_robin() {
    let rewriter = RuleTreeRewriter::parse_strings([
        "add(<x>,0) -> <x>",
        "mul(<x>,1) -> <x>",
        "mul(<x>,0) -> 0",
    ])
    .unwrap();
    assert_eq!(rewriter.rules().len(), 3);

    // The first round leaves `add(x,0)`, which the second round rewrites.
    let mut target = tree("add(mul(add(x,0),1),mul(y,0))");
    assert_eq!(rewriter.rewrite_limited(&mut target, usize::MAX).unwrap(), 4);
    assert_eq!(target.to_string(), "x");

    let mut target = tree("add(mul(add(x,0),1),0)");
    assert_eq!(rewriter.rewrite_limited(&mut target, 10).unwrap(), 3);
    assert_eq!(target.to_string(), "x");

    let rules: Vec<TreeRewriteRule> = vec![
        "add(<x>,0) -> <x>".parse().unwrap(),
        "mul(<x>,1) -> <x>".parse().unwrap(),
    ];
    let mut target = tree("mul(add(z,0),1)");
    assert_eq!(rules.rewrite_limited(&mut target, usize::MAX).unwrap(), 2);
    assert_eq!(target.to_string(), "z");
}

#[test]
fn typed_rewriting() {
    let rewriter = RuleTreeRewriter::new(
        [TreeRewriteRule::parse("neg(neg(<x>)) -> <x>").unwrap()],
        |value: &i64, literal: &str| match literal {
            "neg" => *value < 0,
            _ => literal.parse::<i64>() == Ok(*value),
        },
        |literal: &str| literal.parse::<i64>().unwrap_or(-1),
    );

    let mut target = TreeNode::new(-1i64).with_child(TreeNode::new(-1).with_value(42));
    assert!(rewriter.rewrite(&mut target).unwrap());
    assert_eq!(target.to_string(), "42");
}
