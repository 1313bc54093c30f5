use crate::dom::selector::Selector;
use crate::domain::model::{ScrollBehavior, ScrollRequest};
use crate::utils::error::Result;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// An element's own state. Children live in the owning [`Document`].
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag_name: String,
    attrs: BTreeMap<String, String>,
    classes: Vec<String>,
    value: String,
    disabled: bool,
    offset_top: f64,
}

impl Element {
    pub fn new(tag_name: &str) -> Self {
        Self {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            classes: Vec::new(),
            value: String::new(),
            disabled: false,
            offset_top: 0.0,
        }
    }

    pub fn with_class(mut self, class: &str) -> Self {
        self.add_class(class);
        self
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    /// Layout offset from the top of the document, as computed by the host.
    pub fn with_offset_top(mut self, offset_top: f64) -> Self {
        self.offset_top = offset_top;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// `class` is kept as a class list, not as a plain attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        match name {
            "class" => {
                self.classes.clear();
                for class in value.split_whitespace() {
                    self.add_class(class);
                }
            }
            "disabled" => self.disabled = true,
            "value" => self.value = value.to_string(),
            _ => {
                self.attrs.insert(name.to_string(), value.to_string());
            }
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn offset_top(&self) -> f64 {
        self.offset_top
    }

    fn is_form_control(&self) -> bool {
        matches!(self.tag_name.as_str(), "input" | "textarea" | "select")
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

/// Viewport and scroll state of the hosting window.
#[derive(Debug, Clone, Default)]
pub struct Window {
    inner_width: u32,
    scroll_y: f64,
    scroll_log: Vec<ScrollRequest>,
    location_hash: Option<String>,
    native_submissions: Vec<NodeId>,
}

impl Window {
    pub fn inner_width(&self) -> u32 {
        self.inner_width
    }

    /// Hosts call this on resize. Nothing re-reads the width after install.
    pub fn set_inner_width(&mut self, width: u32) {
        self.inner_width = width;
    }

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    pub fn scroll_to(&mut self, request: ScrollRequest) {
        self.scroll_y = request.top.max(0.0);
        self.scroll_log.push(request);
    }

    /// Every scroll request in the order it was issued.
    pub fn scroll_log(&self) -> &[ScrollRequest] {
        &self.scroll_log
    }

    pub fn location_hash(&self) -> Option<&str> {
        self.location_hash.as_deref()
    }

    /// Forms that fell through to the browser's own submission.
    pub fn native_submissions(&self) -> &[NodeId] {
        &self.native_submissions
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    body: NodeId,
    window: Window,
}

impl Document {
    pub fn new(inner_width: u32) -> Self {
        let mut doc = Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
            body: NodeId(0),
            window: Window {
                inner_width,
                ..Window::default()
            },
        };
        let root = doc.root;
        doc.body = doc.append(root, Element::new("body"));
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut Window {
        &mut self.window
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(id.0)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0)?.parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    /// Creates a detached element.
    pub fn create_element(&mut self, element: Element) -> NodeId {
        self.create_node(NodeKind::Element(element))
    }

    /// Moves `child` under `parent`. Ids from another document are ignored.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent.0 >= self.nodes.len() || parent == child {
            return;
        }
        let Some(old_parent) = self.nodes.get_mut(child.0).map(|node| node.parent.take()) else {
            return;
        };
        if let Some(old) = old_parent.and_then(|id| self.nodes.get_mut(id.0)) {
            old.children.retain(|c| *c != child);
        }
        if let Some(node) = self.nodes.get_mut(child.0) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.push(child);
        }
    }

    pub fn append(&mut self, parent: NodeId, element: Element) -> NodeId {
        let id = self.create_element(element);
        self.append_child(parent, id);
        id
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.create_node(NodeKind::Text(text.to_string()));
        self.append_child(parent, id);
        id
    }

    pub fn remove_children(&mut self, id: NodeId) {
        let children = self
            .nodes
            .get_mut(id.0)
            .map(|node| std::mem::take(&mut node.children))
            .unwrap_or_default();
        for child in children {
            if let Some(node) = self.nodes.get_mut(child.0) {
                node.parent = None;
            }
        }
    }

    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        self.remove_children(id);
        if !text.is_empty() {
            self.append_text(id, text);
        }
    }

    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id.0) else {
            return;
        };
        if let NodeKind::Text(text) = &node.kind {
            out.push_str(text);
        }
        for child in &node.children {
            self.collect_text(*child, out);
        }
    }

    /// Pre-order descendants of `id`, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    pub fn query_selector_all_within(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>> {
        let selector: Selector = selector.parse()?;
        Ok(self
            .descendants(scope)
            .into_iter()
            .filter(|node| selector.matches(self, *node))
            .collect())
    }

    pub fn query_selector_within(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>> {
        let selector: Selector = selector.parse()?;
        Ok(self
            .descendants(scope)
            .into_iter()
            .find(|node| selector.matches(self, *node)))
    }

    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.query_selector_all_within(self.root, selector)
    }

    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        self.query_selector_within(self.root, selector)
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|node| self.element(*node).and_then(|e| e.attr("id")) == Some(id))
    }

    /// `node` itself or its nearest ancestor with the given tag.
    pub fn closest(&self, node: NodeId, tag_name: &str) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if self
                .element(candidate)
                .is_some_and(|e| e.tag_name() == tag_name)
            {
                return Some(candidate);
            }
            current = self.parent(candidate);
        }
        None
    }

    /// Named, enabled form controls of `form` in document order. Later duplicates win.
    pub fn form_data(&self, form: NodeId) -> BTreeMap<String, String> {
        let mut data = BTreeMap::new();
        for node in self.descendants(form) {
            let Some(element) = self.element(node) else {
                continue;
            };
            if !element.is_form_control() || element.is_disabled() {
                continue;
            }
            if let Some(name) = element.attr("name").filter(|n| !n.is_empty()) {
                data.insert(name.to_string(), element.value().to_string());
            }
        }
        data
    }

    /// Equivalent of `getBoundingClientRect().top` for a laid-out element.
    pub fn bounding_client_top(&self, id: NodeId) -> f64 {
        let offset = self.element(id).map(Element::offset_top).unwrap_or(0.0);
        offset - self.window.scroll_y
    }

    /// The browser's own handling of a fragment link: jump, no animation.
    pub fn navigate_to_fragment(&mut self, href: &str) {
        self.window.location_hash = Some(href.to_string());
        let top = match href.strip_prefix('#') {
            Some("") => Some(0.0),
            Some(id) => self.get_element_by_id(id).map(|target| {
                self.bounding_client_top(target) - self.bounding_client_top(self.body)
            }),
            None => None,
        };
        if let Some(top) = top {
            self.window.scroll_to(ScrollRequest {
                top,
                behavior: ScrollBehavior::Instant,
            });
        }
    }

    pub fn record_native_submission(&mut self, form: NodeId) {
        self.window.native_submissions.push(form);
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id.0) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) => out.push_str(&escape_html(text)),
            NodeKind::Document => {
                for child in &node.children {
                    self.write_html(*child, out);
                }
            }
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(element.tag_name());
                if !element.classes.is_empty() {
                    out.push_str(&format!(" class=\"{}\"", element.classes.join(" ")));
                }
                for (name, value) in &element.attrs {
                    out.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
                }
                if element.is_disabled() {
                    out.push_str(" disabled");
                }
                out.push('>');
                for child in &node.children {
                    self.write_html(*child, out);
                }
                out.push_str(&format!("</{}>", element.tag_name()));
            }
        }
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_list_operations() {
        let mut element = Element::new("div").with_attr("class", "slide  featured");
        assert_eq!(element.classes(), ["slide", "featured"]);
        element.add_class("active");
        assert!(element.has_class("active"));
        element.remove_class("active");
        assert!(!element.has_class("active"));
        element.add_class("slide");
        assert_eq!(element.classes().len(), 2);
    }

    #[test]
    fn test_foreign_node_ids_are_ignored() {
        let mut big = Document::new(1280);
        let body = big.body();
        let mut deep = body;
        for _ in 0..8 {
            deep = big.append(deep, Element::new("div"));
        }

        let mut small = Document::new(1280);
        let before = small.outer_html(small.root());
        small.append_child(deep, small.body());
        small.append_child(small.body(), deep);
        small.remove_children(deep);
        small.set_text_content(deep, "ignored");

        assert_eq!(small.text_content(deep), "");
        assert_eq!(small.outer_html(deep), "");
        assert_eq!(small.outer_html(small.root()), before);
    }

    #[test]
    fn test_text_content_and_replacement() {
        let mut doc = Document::new(1280);
        let body = doc.body();
        let button = doc.append(body, Element::new("button"));
        doc.set_text_content(button, "Send Inquiry");
        assert_eq!(doc.text_content(button), "Send Inquiry");

        doc.set_text_content(button, "Sending Message...");
        assert_eq!(doc.text_content(button), "Sending Message...");
        assert_eq!(doc.children(button).len(), 1);
    }

    #[test]
    fn test_form_data_skips_disabled_and_unnamed_controls() {
        let mut doc = Document::new(1280);
        let body = doc.body();
        let form = doc.append(body, Element::new("form"));
        doc.append(form, Element::new("input").with_attr("name", "name").with_value("Ada"));
        doc.append(form, Element::new("textarea").with_attr("name", "message").with_value("Hi"));
        doc.append(form, Element::new("input").with_value("no name"));
        doc.append(
            form,
            Element::new("input")
                .with_attr("name", "coupon")
                .with_value("X")
                .disabled(),
        );
        doc.append(form, Element::new("button").with_attr("name", "go"));

        let data = doc.form_data(form);
        assert_eq!(data.len(), 2);
        assert_eq!(data["name"], "Ada");
        assert_eq!(data["message"], "Hi");
    }

    #[test]
    fn test_moving_node_detaches_from_old_parent() {
        let mut doc = Document::new(1280);
        let body = doc.body();
        let a = doc.append(body, Element::new("div"));
        let b = doc.append(body, Element::new("div"));
        let child = doc.append(a, Element::new("span"));

        doc.append_child(b, child);
        assert!(doc.children(a).is_empty());
        assert_eq!(doc.children(b), [child]);
        assert_eq!(doc.parent(child), Some(b));
    }

    #[test]
    fn test_removed_children_are_disconnected() {
        let mut doc = Document::new(1280);
        let body = doc.body();
        let form = doc.append(body, Element::new("form"));
        let input = doc.append(form, Element::new("input"));
        assert!(doc.is_connected(input));

        doc.remove_children(form);
        assert!(!doc.is_connected(input));
        assert!(doc.is_connected(form));
    }

    #[test]
    fn test_fragment_navigation_jumps_without_animation() {
        let mut doc = Document::new(1280);
        let body = doc.body();
        doc.append(
            body,
            Element::new("section")
                .with_attr("id", "pricing")
                .with_offset_top(1200.0),
        );

        doc.navigate_to_fragment("#pricing");
        assert_eq!(doc.window().location_hash(), Some("#pricing"));
        assert_eq!(doc.window().scroll_y(), 1200.0);

        doc.navigate_to_fragment("#");
        assert_eq!(doc.window().scroll_y(), 0.0);
        assert!(doc
            .window()
            .scroll_log()
            .iter()
            .all(|r| r.behavior == ScrollBehavior::Instant));
    }

    #[test]
    fn test_outer_html_escapes_text() {
        let mut doc = Document::new(1280);
        let body = doc.body();
        let p = doc.append(body, Element::new("p").with_class("note"));
        doc.append_text(p, "Tom & <Jerry>");
        assert_eq!(doc.outer_html(p), "<p class=\"note\">Tom &amp; &lt;Jerry&gt;</p>");
    }
}
