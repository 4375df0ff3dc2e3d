//! Bramble CLI
//!
//! Parse a file or an inline string, print the resulting tree, and run
//! `find` queries against it.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use bramble_common::source::SourceFile;
use bramble_common::warning::clear_warnings;
use bramble_dom::{DomTree, NodeId, NodeType};
use bramble_html::{Document, ParseOptions};
use clap::Parser;
use owo_colors::OwoColorize;
use serde_json::{Map, Value, json};

/// Bramble: inspect how markup is parsed
#[derive(Parser, Debug)]
#[command(name = "bramble")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the tree of a file
    bramble ./index.html

    # Parse inline markup
    bramble --html '<ul><li>a<li>b</ul>'

    # List every external link
    bramble ./index.html --find 'a[href^=http]'

    # Only the last paragraph
    bramble ./index.html --find p --index -1

    # Re-serialize the parsed document
    bramble ./index.html --render
"#)]
struct Cli {
    /// Path to an HTML file
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Parse this HTML string instead of a file
    #[arg(long, value_name = "HTML")]
    html: Option<String>,

    /// Print the outer HTML of every element matching SELECTOR
    #[arg(short, long, value_name = "SELECTOR")]
    find: Option<String>,

    /// With --find, print only the N-th match (negative counts from the end)
    #[arg(short, long, value_name = "N", allow_negative_numbers = true, requires = "find")]
    index: Option<isize>,

    /// Print the re-serialized document
    #[arg(short, long)]
    render: bool,

    /// Print the tree as JSON
    #[arg(long)]
    json: bool,

    /// Keep line breaks in the input
    #[arg(long)]
    keep_linebreaks: bool,

    /// Keep tag and attribute names as written
    #[arg(long)]
    keep_case: bool,

    /// Load parse options from a JSON file before applying flags
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let options = load_options(&cli)?;
    let mut doc = load_doc(&cli, options)?;
    clear_warnings();
    doc.parse().with_context(|| {
        format!(
            "failed to parse {}",
            doc.location().unwrap_or("inline HTML")
        )
    })?;

    if let Some(selector) = &cli.find {
        let matches = match cli.index {
            Some(index) => doc.find_nth(selector, index).into_iter().collect(),
            None => doc.find(selector),
        };
        if matches.is_empty() {
            eprintln!("{}", format!("no match for '{selector}'").yellow());
        }
        for id in matches {
            println!("{}", doc.tree().to_html(id));
        }
        return Ok(());
    }

    if cli.render {
        println!("{doc}");
        return Ok(());
    }

    if cli.json {
        let dump = node_to_json(doc.tree(), doc.root());
        println!("{}", serde_json::to_string_pretty(&dump)?);
        return Ok(());
    }

    print_document(&doc);
    Ok(())
}

/// Options from `--config`, then overridden by flags.
fn load_options(cli: &Cli) -> Result<ParseOptions> {
    let mut options = match &cli.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            serde_json::from_str(&raw)
                .with_context(|| format!("invalid config {}", path.display()))?
        }
        None => ParseOptions::default(),
    };
    if cli.keep_linebreaks {
        options = options.with_linebreaks();
    }
    if cli.keep_case {
        options = options.with_case_preserved();
    }
    Ok(options)
}

/// Load document from CLI arguments
fn load_doc(cli: &Cli, options: ParseOptions) -> Result<Document> {
    if let Some(html) = &cli.html {
        Ok(Document::with_options(html.as_str(), options))
    } else if let Some(path) = &cli.path {
        let source = SourceFile::load(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        Ok(Document::from_source(source, options))
    } else {
        anyhow::bail!("expected a file path or --html")
    }
}

fn print_document(doc: &Document) {
    println!("{}", "=== DOM Tree ===".bold());
    print_tree(doc.tree(), doc.root(), 0);

    println!("\n{}", "=== Head ===".bold());
    println!("charset: {}", doc.charset());
    println!("{} meta, {} link", doc.meta_nodes().len(), doc.link_nodes().len());

    if !doc.issues().is_empty() {
        println!("\n{}", "=== Recovered ===".bold());
        for issue in doc.issues() {
            println!("{} {}", format!("@{}", issue.offset).dimmed(), issue.message.yellow());
        }
    }
}

/// Print a node tree for debugging.
fn print_tree(tree: &DomTree, id: NodeId, indent: usize) {
    let prefix = "  ".repeat(indent);
    let Some(node) = tree.get(id) else {
        return;
    };
    match &node.node_type {
        NodeType::Document => println!("{prefix}{}", "Document".bold()),
        NodeType::Element(data) | NodeType::SelfClosing(data) => {
            let close = if matches!(node.node_type, NodeType::SelfClosing(_)) {
                "/>"
            } else {
                ">"
            };
            println!(
                "{prefix}{}{}{}",
                format!("<{}", data.tag_name).cyan(),
                data.attrs.to_string().yellow(),
                close.cyan()
            );
        }
        NodeType::Text(text) => {
            let display = text.replace('\n', "\\n").replace(' ', "\u{00B7}");
            println!("{prefix}{}", format!("\"{display}\"").green());
        }
        NodeType::Comment(content) => {
            println!("{prefix}{}", format!("<!--{content}-->").dimmed());
        }
        NodeType::Doctype(content) => {
            println!("{prefix}{}", format!("<!{content}>").magenta());
        }
    }
    for &child in tree.children(id) {
        print_tree(tree, child, indent + 1);
    }
}

fn node_to_json(tree: &DomTree, id: NodeId) -> Value {
    let Some(node) = tree.get(id) else {
        return Value::Null;
    };
    let children: Vec<Value> = tree
        .children(id)
        .iter()
        .map(|&child| node_to_json(tree, child))
        .collect();

    match &node.node_type {
        NodeType::Document => json!({ "type": "document", "children": children }),
        NodeType::Element(data) | NodeType::SelfClosing(data) => {
            let attributes: Map<String, Value> = data
                .attrs
                .iter()
                .map(|(name, value)| (name.to_string(), Value::String(value.to_string())))
                .collect();
            json!({
                "type": node.node_type.kind().to_string(),
                "tagName": data.tag_name,
                "attributes": attributes,
                "start": node.start,
                "end": node.end,
                "children": children,
            })
        }
        NodeType::Text(text) => json!({ "type": "text", "content": text }),
        NodeType::Comment(content) => json!({ "type": "comment", "content": content }),
        NodeType::Doctype(content) => json!({ "type": "doctype", "content": content }),
    }
}
