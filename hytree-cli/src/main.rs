use std::fmt;
use std::io::Write;

use ariadne::{ColorGenerator, Label, Report, Source};
use clap::{Parser as ClapParser, Subcommand, ValueEnum};
use hytree::{
    error::{PatternError, RuleError},
    format::{DEFAULT_WIDTH, TreeFormatter, write_lisp},
    node::TreeNode,
    pattern::TreePattern,
    rewrite::{RULE_SEPARATOR, TreeRewriteRule, TreeRewriter},
    tree::Tree,
};
use log::info;
use termcolor::{ColorChoice, StandardStream};

mod logger;

#[derive(ClapParser)]
#[command(version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    command: Command,

    /// Output layout of printed trees
    #[arg(short, long, value_enum, default_value_t = Format::Parentheses, global = true)]
    format: Format,

    /// Render width of the lisp layout (defaults to the terminal width)
    #[arg(short, long, global = true)]
    width: Option<usize>,

    /// Increase logging verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Re-print a parentheses tree
    Format {
        /// Tree in parentheses notation, e.g. `add(x,0)`
        tree: String,
    },
    /// List every match of a pattern in a tree, breadth-first
    Match {
        /// Pattern with `<name>` variables, e.g. `add(<x>,0)`
        pattern: String,
        /// Tree in parentheses notation
        tree: String,
        /// Require repeated variables to bind equal subtrees
        #[arg(long)]
        consistent: bool,
    },
    /// Apply rewrite rules until none matches
    Rewrite {
        /// Rule of the form `left -> right` (repeatable, applied round-robin)
        #[arg(short, long = "rule", required = true)]
        rules: Vec<String>,
        /// Tree in parentheses notation
        tree: String,
        /// Maximum number of rewrites
        #[arg(short, long)]
        limit: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Parentheses,
    Tree,
    Lisp,
    Dot,
}

/// Prints an error located at byte `position` of `source` and exits.
fn report_at(name: &str, source: &str, position: usize, message: impl fmt::Display) -> ! {
    // ariadne counts characters, the parser counts bytes.
    let start = source
        .get(..position)
        .map_or(position, |prefix| prefix.chars().count());
    let end = (start + 1).min(source.chars().count()).max(start);
    let span = (name.to_string(), start..end);

    let mut colors = ColorGenerator::new();
    let a = colors.next();

    let printed = Report::build(ariadne::ReportKind::Error, span.clone())
        .with_message(message.to_string())
        .with_label(Label::new(span).with_message("The error occurred here").with_color(a))
        .finish()
        .eprint((name.to_string(), Source::from(source)));
    if printed.is_err() {
        eprintln!("Error in {name} at position {position}: {message}");
    }
    std::process::exit(1)
}

fn fail(message: impl fmt::Display) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1)
}

fn parse_tree(source: &str) -> TreeNode<String> {
    TreeNode::parse(source).unwrap_or_else(|error| report_at("<tree>", source, error.position(), &error))
}

fn compile_pattern(source: &str) -> TreePattern {
    TreePattern::compile(source).unwrap_or_else(|error| match &error {
        PatternError::Parse(parse) => report_at("<pattern>", source, parse.position(), &error),
        _ => fail(&error),
    })
}

fn parse_rule(source: &str) -> TreeRewriteRule {
    TreeRewriteRule::parse(source).unwrap_or_else(|error| match &error {
        RuleError::Pattern(PatternError::Parse(parse)) => {
            // Positions are relative to the side that failed.
            let offset = match source.find(RULE_SEPARATOR) {
                Some(index) if TreePattern::compile(&source[..index]).is_ok() => {
                    index + RULE_SEPARATOR.len()
                }
                _ => 0,
            };
            report_at("<rule>", source, offset + parse.position(), &error)
        }
        _ => fail(&error),
    })
}

fn formatter(format: Format, width: usize) -> TreeFormatter {
    match format {
        Format::Parentheses => TreeFormatter::Parentheses,
        Format::Tree => TreeFormatter::Tree,
        Format::Lisp => TreeFormatter::Lisp { width },
        Format::Dot => TreeFormatter::dot("tree"),
    }
}

fn print_tree<T>(tree: &T, format: Format, width: usize)
where
    T: Tree,
    T::Value: fmt::Display,
{
    if format == Format::Lisp {
        let stdout = StandardStream::stdout(ColorChoice::Auto);
        let mut stdout = stdout.lock();
        let written = write_lisp(tree, width, &mut stdout)
            .and_then(|_| writeln!(stdout))
            .and_then(|_| stdout.flush());
        if let Err(error) = written {
            fail(error);
        }
    } else {
        let text = formatter(format, width).format(tree);
        println!("{}", text.trim_end_matches('\n'));
    }
}

fn main() {
    let args = Arguments::parse();
    logger::init(args.verbose);

    let width = args
        .width
        .or_else(|| term_size::dimensions().map(|(columns, _)| columns))
        .unwrap_or(DEFAULT_WIDTH);

    match &args.command {
        Command::Format { tree } => {
            let tree = parse_tree(tree);
            info!("parsed a tree of {} nodes", tree.size());
            print_tree(&tree.root(), args.format, width);
        }
        Command::Match {
            pattern,
            tree,
            consistent,
        } => {
            let pattern = compile_pattern(pattern);
            let tree = parse_tree(tree);
            let matcher = pattern.matcher(tree.root());

            let results: Vec<_> = if *consistent {
                matcher.consistent().results().collect()
            } else {
                matcher.results().collect()
            };
            info!("`{pattern}` matched {} time(s)", results.len());

            for result in &results {
                println!("{} {result}", result.node().path());
            }
            if results.is_empty() {
                std::process::exit(1);
            }
        }
        Command::Rewrite { rules, tree, limit } => {
            let rules: Vec<TreeRewriteRule> = rules.iter().map(|rule| parse_rule(rule)).collect();
            let mut tree = parse_tree(tree);

            let count = rules
                .rewrite_limited(&mut tree, limit.unwrap_or(usize::MAX))
                .unwrap_or_else(|error| fail(error));
            info!("applied {count} rewrite(s), {} node(s) left", tree.size());

            print_tree(&tree.root(), args.format, width);
            println!("{count} rewrite(s)");
        }
    }
}
