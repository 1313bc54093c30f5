use crate::config::NavigationConfig;
use crate::dom::{Document, Element, EventKind, NodeId, Page, Subscription};
use crate::domain::model::MenuState;
use crate::utils::error::{Result, SiteError};
use std::sync::{Arc, Mutex, PoisonError};

const LINKS_SELECTOR: &str = ".nav-links";
const LINK_ANCHORS_SELECTOR: &str = ".nav-links a";
const CONTAINER_SELECTOR: &str = ".navbar .container";

const LINKS_OPEN_CLASS: &str = "active";
const TOGGLE_OPEN_CLASS: &str = "open";

/// Mobile menu: a toggle button flips the menu, any nav link closes it.
///
/// The menu state lives here and is projected onto the DOM; classes are never
/// read back.
pub struct NavigationController {
    shared: Arc<NavShared>,
    subscriptions: Vec<Subscription>,
}

struct NavShared {
    links: NodeId,
    toggle: NodeId,
    injected: bool,
    state: Mutex<MenuState>,
}

impl NavShared {
    fn set_state(&self, page: &Page, next: MenuState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = next;
        // 兩個 class 在同一次文件更新中寫入
        page.with_document(|doc| self.project(doc, next));
    }

    fn toggle(&self, page: &Page) {
        let next = self
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .toggled();
        self.set_state(page, next);
    }

    fn project(&self, doc: &mut Document, state: MenuState) {
        let open = state.is_open();
        for (node, class) in [(self.links, LINKS_OPEN_CLASS), (self.toggle, TOGGLE_OPEN_CLASS)] {
            if let Some(element) = doc.element_mut(node) {
                if open {
                    element.add_class(class);
                } else {
                    element.remove_class(class);
                }
            }
        }
    }
}

fn create_toggle(doc: &mut Document) -> NodeId {
    let toggle = doc.create_element(
        Element::new("button")
            .with_class("mobile-menu-btn")
            .with_attr("aria-label", "Toggle Navigation"),
    );
    for _ in 0..3 {
        doc.append(toggle, Element::new("span"));
    }
    toggle
}

impl NavigationController {
    pub fn install(page: &Page, config: &NavigationConfig) -> Result<Self> {
        let (links, anchors, toggle, injected) = page.with_document(|doc| -> Result<_> {
            let links = doc
                .query_selector(LINKS_SELECTOR)?
                .ok_or_else(|| SiteError::ElementNotFound {
                    selector: LINKS_SELECTOR.to_string(),
                })?;
            let anchors = doc.query_selector_all(LINK_ANCHORS_SELECTOR)?;

            let toggle = create_toggle(doc);
            // 視窗寬度只在安裝時檢查一次，之後縮放不會再增減按鈕
            let width = doc.window().inner_width();
            let mut injected = false;
            if width <= config.mobile_breakpoint_px {
                match doc.query_selector(CONTAINER_SELECTOR)? {
                    Some(container) => {
                        doc.append_child(container, toggle);
                        injected = true;
                    }
                    None => tracing::warn!(
                        "Viewport {}px is mobile but `{}` is missing; menu toggle not added",
                        width,
                        CONTAINER_SELECTOR
                    ),
                }
            }
            Ok((links, anchors, toggle, injected))
        })?;

        let shared = Arc::new(NavShared {
            links,
            toggle,
            injected,
            state: Mutex::new(MenuState::Closed),
        });

        let mut subscriptions = Vec::with_capacity(anchors.len() + 1);
        let on_toggle = shared.clone();
        subscriptions.push(page.add_listener(toggle, EventKind::Click, move |page, _| {
            on_toggle.toggle(page);
        }));

        for anchor in anchors {
            let on_link = shared.clone();
            subscriptions.push(page.add_listener(anchor, EventKind::Click, move |page, _| {
                on_link.set_state(page, MenuState::Closed);
            }));
        }

        tracing::debug!(
            "Navigation installed (toggle injected: {}, {} links)",
            injected,
            subscriptions.len() - 1
        );

        Ok(Self {
            shared,
            subscriptions,
        })
    }

    pub fn menu_state(&self) -> MenuState {
        *self
            .shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// The toggle button, if it was placed in the page.
    pub fn toggle_button(&self) -> Option<NodeId> {
        self.shared.injected.then_some(self.shared.toggle)
    }

    pub fn links_container(&self) -> NodeId {
        self.shared.links
    }

    pub fn dispose(self) {
        for subscription in self.subscriptions {
            subscription.dispose();
        }
    }
}
