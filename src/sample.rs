//! The RacketPro landing page markup, built as a [`Document`]. Used by the CLI
//! and as a realistic fixture.

use crate::dom::{Document, Element, NodeId, Page};

pub const SECTIONS: [(&str, f64); 4] = [
    ("services", 720.0),
    ("pricing", 1480.0),
    ("testimonials", 2210.0),
    ("contact", 2960.0),
];

pub struct SamplePage {
    pub page: Page,
    pub nav_links: NodeId,
    pub nav_anchors: Vec<NodeId>,
    pub back_to_top: NodeId,
    pub form: NodeId,
    pub submit_button: NodeId,
    pub slides: Vec<NodeId>,
}

/// Builds the landing page for a viewport `width` wide with `slides` testimonials.
pub fn landing_page(width: u32, slides: usize) -> SamplePage {
    let mut doc = Document::new(width);
    let body = doc.body();

    let navbar = doc.append(body, Element::new("nav").with_class("navbar"));
    let container = doc.append(navbar, Element::new("div").with_class("container"));
    let logo = doc.append(
        container,
        Element::new("a").with_class("logo").with_attr("href", "#"),
    );
    doc.append_text(logo, "RacketPro");
    let nav_links = doc.append(container, Element::new("ul").with_class("nav-links"));
    let nav_anchors = SECTIONS
        .iter()
        .map(|(id, _)| {
            let item = doc.append(nav_links, Element::new("li"));
            let anchor = doc.append(item, Element::new("a").with_attr("href", &format!("#{}", id)));
            doc.append_text(anchor, id);
            anchor
        })
        .collect();

    let mut section_nodes = Vec::new();
    for (id, offset) in SECTIONS {
        let section = doc.append(
            body,
            Element::new("section")
                .with_attr("id", id)
                .with_offset_top(offset),
        );
        section_nodes.push(section);
    }

    let slides = (0..slides)
        .map(|index| {
            let slide = doc.append(
                section_nodes[2],
                Element::new("blockquote").with_class("testimonial-slide"),
            );
            doc.append_text(slide, &format!("Testimonial #{}", index + 1));
            slide
        })
        .collect();

    let form = doc.append(
        section_nodes[3],
        Element::new("form")
            .with_attr("id", "contact-form")
            .with_attr("action", "/contact"),
    );
    doc.append(
        form,
        Element::new("input")
            .with_attr("name", "name")
            .with_attr("type", "text"),
    );
    doc.append(
        form,
        Element::new("input")
            .with_attr("name", "email")
            .with_attr("type", "email"),
    );
    doc.append(form, Element::new("textarea").with_attr("name", "message"));
    let submit_button = doc.append(form, Element::new("button").with_attr("type", "submit"));
    doc.append_text(submit_button, "Send Inquiry");

    let footer = doc.append(body, Element::new("footer"));
    let back_to_top = doc.append(footer, Element::new("a").with_attr("href", "#"));
    doc.append_text(back_to_top, "Back to top");

    SamplePage {
        page: Page::new(doc),
        nav_links,
        nav_anchors,
        back_to_top,
        form,
        submit_button,
        slides,
    }
}

impl SamplePage {
    /// Sets a named control's value, adding a hidden input for unknown names.
    pub fn set_field(&self, name: &str, value: &str) {
        let form = self.form;
        let button = self.submit_button;
        self.page.with_document(|doc| {
            let existing = doc.descendants(form).into_iter().find(|node| {
                doc.element(*node).and_then(|e| e.attr("name")) == Some(name)
            });
            match existing {
                Some(node) => {
                    if let Some(element) = doc.element_mut(node) {
                        element.set_value(value);
                    }
                }
                None => {
                    let input = doc.create_element(
                        Element::new("input")
                            .with_attr("type", "hidden")
                            .with_attr("name", name)
                            .with_value(value),
                    );
                    doc.append_child(form, input);
                    // 送出按鈕保持在最後
                    doc.append_child(form, button);
                }
            }
        });
    }

    pub fn fill_contact_form(&self, name: &str, email: &str, message: &str) {
        self.set_field("name", name);
        self.set_field("email", email);
        self.set_field("message", message);
    }

    pub fn form_html(&self) -> String {
        self.page.with_document(|doc| doc.outer_html(self.form))
    }
}
