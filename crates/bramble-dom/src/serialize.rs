//! Markup serialization and text extraction.

use crate::{DomTree, NodeId, NodeType};

impl DomTree {
    /// Render a node and its subtree back to markup.
    ///
    /// - elements: `<tag attrs>children</tag>`
    /// - self-closing elements: `<tag attrs/>`
    /// - text: verbatim
    /// - comments: `<!--content-->`
    /// - declarations: `<!content>`
    ///
    /// The document node renders as its children. Stale handles render as
    /// the empty string.
    #[must_use]
    pub fn to_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    /// Render only the children of a node.
    #[must_use]
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_html(child, &mut out);
        }
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };
        match &node.node_type {
            NodeType::Document => {
                for &child in &node.children {
                    self.write_html(child, out);
                }
            }
            NodeType::Element(data) => {
                out.push('<');
                out.push_str(&data.tag_name);
                out.push_str(&data.attrs.to_string());
                out.push('>');
                for &child in &node.children {
                    self.write_html(child, out);
                }
                out.push_str("</");
                out.push_str(&data.tag_name);
                out.push('>');
            }
            NodeType::SelfClosing(data) => {
                out.push('<');
                out.push_str(&data.tag_name);
                out.push_str(&data.attrs.to_string());
                out.push_str("/>");
            }
            NodeType::Text(text) => out.push_str(text),
            NodeType::Comment(content) => {
                out.push_str("<!--");
                out.push_str(content);
                out.push_str("-->");
            }
            NodeType::Doctype(content) => {
                out.push_str("<!");
                out.push_str(content);
                out.push('>');
            }
        }
    }

    /// Concatenated character data of a subtree.
    ///
    /// Each `br` element contributes `line_break`; comments and declarations
    /// contribute nothing.
    #[must_use]
    pub fn text_content(&self, id: NodeId, line_break: &str) -> String {
        let mut out = String::new();
        self.write_text(id, line_break, &mut out);
        out
    }

    fn write_text(&self, id: NodeId, line_break: &str, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };
        match &node.node_type {
            NodeType::Text(text) => out.push_str(text),
            NodeType::SelfClosing(data) | NodeType::Element(data) if data.is("br") => {
                out.push_str(line_break);
            }
            NodeType::Document | NodeType::Element(_) => {
                for &child in &node.children {
                    self.write_text(child, line_break, out);
                }
            }
            NodeType::SelfClosing(_) | NodeType::Comment(_) | NodeType::Doctype(_) => {}
        }
    }
}
