// src/core/dom.rs
//! Flat, read-only node tree built from a parsed HTML document.
//!
//! Nodes are stored in pre-order, so a node's index *is* its document
//! position and every subtree is the contiguous range `id..end`.
//! The page readers in `specs` only ever see this type.

use scraper::Html;

use super::sanitize::normalize_ws;

pub type NodeId = usize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element { tag: String, attrs: Vec<(String, String)> },
    Text(String),
}

#[derive(Clone, Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    end: NodeId,
}

#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        Self::from_html(&Html::parse_document(html))
    }

    pub fn from_html(html: &Html) -> Self {
        let mut nodes: Vec<Node> = Vec::new();
        let mut stack = vec![(html.tree.root(), None::<NodeId>)];

        while let Some((node, parent)) = stack.pop() {
            let kind = match node.value() {
                scraper::Node::Document | scraper::Node::Fragment => NodeKind::Document,
                scraper::Node::Element(el) => NodeKind::Element {
                    tag: el.name().to_ascii_lowercase(),
                    attrs: el.attrs().map(|(k, v)| (s!(k), s!(v))).collect(),
                },
                scraper::Node::Text(t) => {
                    let text: &str = t;
                    NodeKind::Text(s!(text))
                }
                // doctype, comments, processing instructions
                _ => continue,
            };

            let id = nodes.len();
            nodes.push(Node { kind, parent, children: Vec::new(), end: id + 1 });
            if let Some(p) = parent {
                nodes[p].children.push(id);
            }

            let kids: Vec<_> = node.children().collect();
            for kid in kids.into_iter().rev() {
                stack.push((kid, Some(id)));
            }
        }

        // Children always sit after their parent, so one reverse sweep fixes subtree ends.
        for id in (0..nodes.len()).rev() {
            let end = nodes[id]
                .children
                .last()
                .map(|&c| nodes[c].end)
                .unwrap_or(id + 1);
            nodes[id].end = end;
        }

        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes.get(id)?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn is_tag(&self, id: NodeId, name: &str) -> bool {
        self.tag(id) == Some(name)
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match &self.nodes.get(id)?.kind {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .map(|c| c.split_ascii_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    /// Parent, grandparent, … up to the document node.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
    }

    /// Every node strictly inside `id`, in document order.
    pub fn descendants(&self, id: NodeId) -> std::ops::Range<NodeId> {
        match self.nodes.get(id) {
            Some(n) => id + 1..n.end,
            None => 0..0,
        }
    }

    pub fn contains(&self, outer: NodeId, inner: NodeId) -> bool {
        self.descendants(outer).contains(&inner)
    }

    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .filter(move |&c| self.tag(c).is_some())
    }

    /// Descendant elements named `tag`, in document order.
    pub fn find_all<'a>(&'a self, id: NodeId, tag: &'a str) -> impl Iterator<Item = NodeId> + 'a {
        self.descendants(id).filter(move |&d| self.is_tag(d, tag))
    }

    pub fn find(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        self.find_all(id, tag).next()
    }

    pub fn find_with_class(&self, id: NodeId, tag: &str, class: &str) -> Option<NodeId> {
        self.find_all(id, tag).find(|&d| self.has_class(d, class))
    }

    /// Any ancestor satisfying `pred`.
    pub fn has_ancestor(&self, id: NodeId, pred: impl Fn(NodeId) -> bool) -> bool {
        self.ancestors(id).any(pred)
    }

    /// Nearest element named `tag` that starts before `id` in document order.
    pub fn preceding(&self, id: NodeId, tag: &str) -> Option<NodeId> {
        (0..id.min(self.nodes.len())).rev().find(|&p| self.is_tag(p, tag))
    }

    /// Rendered text of the subtree, whitespace collapsed.
    pub fn text(&self, id: NodeId) -> String {
        let mut raw = s!();
        if let NodeKind::Text(t) = &self.nodes[id].kind {
            raw.push_str(t);
        }
        for d in self.descendants(id) {
            if let NodeKind::Text(t) = &self.nodes[d].kind {
                raw.push_str(t);
            }
        }
        normalize_ws(&raw)
    }
}
