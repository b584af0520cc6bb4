//! A small arena DOM for tag-soup HTML.
//!
//! html5ever parses into this tree through [`sink::HtmlSink`]; the HTML input format and the
//! HTML→Markdown converter both walk it. Nodes live in one contiguous vector and link to each
//! other by index.

mod sink;

use html5ever::tendril::TendrilSink;
use html5ever::QualName;

/// Index of a node in the [`Dom`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct DomId(u32);

impl DomId {
    /// Sentinel for "no node".
    const NONE: DomId = DomId(u32::MAX);

    fn is_some(self) -> bool {
        self.0 != u32::MAX
    }

    fn is_none(self) -> bool {
        self.0 == u32::MAX
    }
}

#[derive(Debug, Clone)]
pub(crate) enum DomData {
    Document,
    Element { name: QualName, attrs: Vec<DomAttribute> },
    Text(String),
    Comment,
}

#[derive(Debug, Clone)]
pub(crate) struct DomAttribute {
    pub name: QualName,
    pub value: String,
}

#[derive(Debug)]
struct DomNode {
    data: DomData,
    parent: DomId,
    first_child: DomId,
    last_child: DomId,
    prev_sibling: DomId,
    next_sibling: DomId,
}

impl DomNode {
    fn new(data: DomData) -> Self {
        Self {
            data,
            parent: DomId::NONE,
            first_child: DomId::NONE,
            last_child: DomId::NONE,
            prev_sibling: DomId::NONE,
            next_sibling: DomId::NONE,
        }
    }
}

pub(crate) struct Dom {
    nodes: Vec<DomNode>,
    document: DomId,
}

impl Dom {
    /// Parses HTML into a DOM. Malformed input never fails; html5ever recovers the way a browser
    /// would and we ignore its parse errors.
    pub fn parse(html: &str) -> Dom {
        let sink = sink::HtmlSink::new();
        html5ever::parse_document(sink, html5ever::ParseOpts::default())
            .from_utf8()
            .one(html.as_bytes())
            .into_dom()
    }

    fn new() -> Self {
        let mut dom = Self {
            nodes: Vec::new(),
            document: DomId::NONE,
        };
        dom.document = dom.alloc(DomNode::new(DomData::Document));
        dom
    }

    fn alloc(&mut self, node: DomNode) -> DomId {
        let id = DomId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn document(&self) -> DomId {
        self.document
    }

    fn get(&self, id: DomId) -> Option<&DomNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get(id.0 as usize)
    }

    fn get_mut(&mut self, id: DomId) -> Option<&mut DomNode> {
        if id.is_none() {
            return None;
        }
        self.nodes.get_mut(id.0 as usize)
    }

    pub fn data(&self, id: DomId) -> Option<&DomData> {
        self.get(id).map(|node| &node.data)
    }

    fn create_element(&mut self, name: QualName, attrs: Vec<DomAttribute>) -> DomId {
        self.alloc(DomNode::new(DomData::Element { name, attrs }))
    }

    fn create_text(&mut self, text: String) -> DomId {
        self.alloc(DomNode::new(DomData::Text(text)))
    }

    fn create_comment(&mut self) -> DomId {
        self.alloc(DomNode::new(DomData::Comment))
    }

    fn append(&mut self, parent: DomId, child: DomId) {
        let last_child = self.get(parent).map(|n| n.last_child).unwrap_or(DomId::NONE);

        if let Some(child_node) = self.get_mut(child) {
            child_node.parent = parent;
            child_node.prev_sibling = last_child;
            child_node.next_sibling = DomId::NONE;
        }
        if last_child.is_some() {
            if let Some(last_node) = self.get_mut(last_child) {
                last_node.next_sibling = child;
            }
        }
        if let Some(parent_node) = self.get_mut(parent) {
            if parent_node.first_child.is_none() {
                parent_node.first_child = child;
            }
            parent_node.last_child = child;
        }
    }

    /// Appends text to `parent`, merging into a trailing text node when there is one.
    fn append_text(&mut self, parent: DomId, text: &str) {
        let last_child = self.get(parent).map(|n| n.last_child).unwrap_or(DomId::NONE);
        if let Some(DomNode {
            data: DomData::Text(existing),
            ..
        }) = self.get_mut(last_child)
        {
            existing.push_str(text);
            return;
        }
        let text_node = self.create_text(text.to_string());
        self.append(parent, text_node);
    }

    fn insert_before(&mut self, sibling: DomId, new_node: DomId) {
        let (parent, prev) = match self.get(sibling) {
            Some(node) => (node.parent, node.prev_sibling),
            None => return,
        };

        if let Some(new) = self.get_mut(new_node) {
            new.parent = parent;
            new.prev_sibling = prev;
            new.next_sibling = sibling;
        }
        if let Some(sibling_node) = self.get_mut(sibling) {
            sibling_node.prev_sibling = new_node;
        }
        if prev.is_some() {
            if let Some(prev_node) = self.get_mut(prev) {
                prev_node.next_sibling = new_node;
            }
        } else if let Some(parent_node) = self.get_mut(parent) {
            parent_node.first_child = new_node;
        }
    }

    fn remove_from_parent(&mut self, target: DomId) {
        let (parent, prev, next) = match self.get(target) {
            Some(node) => (node.parent, node.prev_sibling, node.next_sibling),
            None => return,
        };

        if prev.is_some() {
            if let Some(prev_node) = self.get_mut(prev) {
                prev_node.next_sibling = next;
            }
        } else if let Some(parent_node) = self.get_mut(parent) {
            parent_node.first_child = next;
        }
        if next.is_some() {
            if let Some(next_node) = self.get_mut(next) {
                next_node.prev_sibling = prev;
            }
        } else if let Some(parent_node) = self.get_mut(parent) {
            parent_node.last_child = prev;
        }

        if let Some(target_node) = self.get_mut(target) {
            target_node.parent = DomId::NONE;
            target_node.prev_sibling = DomId::NONE;
            target_node.next_sibling = DomId::NONE;
        }
    }

    fn reparent_children(&mut self, from: DomId, to: DomId) {
        let children: Vec<DomId> = self.children(from).collect();
        for child in &children {
            if let Some(child_node) = self.get_mut(*child) {
                child_node.parent = DomId::NONE;
                child_node.prev_sibling = DomId::NONE;
                child_node.next_sibling = DomId::NONE;
            }
        }
        if let Some(from_node) = self.get_mut(from) {
            from_node.first_child = DomId::NONE;
            from_node.last_child = DomId::NONE;
        }
        for child in children {
            self.append(to, child);
        }
    }

    pub fn children(&self, id: DomId) -> DomChildren<'_> {
        DomChildren {
            dom: self,
            next: self.get(id).map(|n| n.first_child).unwrap_or(DomId::NONE),
        }
    }

    /// The element's lowercase local tag name, or `None` for non-elements.
    pub fn tag_name(&self, id: DomId) -> Option<&str> {
        match self.data(id)? {
            DomData::Element { name, .. } => Some(name.local.as_ref()),
            _ => None,
        }
    }

    pub fn attr(&self, id: DomId, attr_name: &str) -> Option<&str> {
        match self.data(id)? {
            DomData::Element { attrs, .. } => attrs
                .iter()
                .find(|a| a.name.local.as_ref() == attr_name)
                .map(|a| a.value.as_str()),
            _ => None,
        }
    }

    /// Depth-first search for the first element with the given tag name.
    pub fn find_first(&self, from: DomId, tag: &str) -> Option<DomId> {
        if self.tag_name(from) == Some(tag) {
            return Some(from);
        }
        for child in self.children(from) {
            if let Some(found) = self.find_first(child, tag) {
                return Some(found);
            }
        }
        None
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, id: DomId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: DomId, out: &mut String) {
        match self.data(id) {
            Some(DomData::Text(text)) => out.push_str(text),
            Some(_) => {
                for child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
            None => {}
        }
    }
}

pub(crate) struct DomChildren<'a> {
    dom: &'a Dom,
    next: DomId,
}

impl Iterator for DomChildren<'_> {
    type Item = DomId;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next.is_none() {
            return None;
        }
        let current = self.next;
        self.next = self.dom.get(current).map(|n| n.next_sibling).unwrap_or(DomId::NONE);
        Some(current)
    }
}
