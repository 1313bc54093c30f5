use crate::dom::document::{Document, Element, NodeId};
use crate::dom::events::{Event, EventKind, ListenerId, ListenerStore};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Shared handle to a live page: the document plus its registered listeners.
///
/// Cloning is cheap and every clone sees the same page. Listeners run with no
/// lock held, so a handler may freely call [`Page::with_document`], register
/// new listeners or dispose existing ones.
#[derive(Clone)]
pub struct Page {
    document: Arc<Mutex<Document>>,
    listeners: Arc<Mutex<ListenerStore>>,
}

/// Disposer returned by [`Page::add_listener`].
#[must_use = "dropping a Subscription leaves the listener registered; call dispose() to remove it"]
pub struct Subscription {
    listeners: Weak<Mutex<ListenerStore>>,
    node: NodeId,
    kind: EventKind,
    id: ListenerId,
}

impl Subscription {
    /// Removes the listener. Returns false if it was already gone or the page was dropped.
    pub fn dispose(self) -> bool {
        match self.listeners.upgrade() {
            Some(listeners) => listeners
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(self.node, self.kind, self.id),
            None => false,
        }
    }
}

enum DefaultAction {
    FollowFragment(String),
    SubmitForm(NodeId),
    Nothing,
}

impl Page {
    pub fn new(document: Document) -> Self {
        Self {
            document: Arc::new(Mutex::new(document)),
            listeners: Arc::new(Mutex::new(ListenerStore::default())),
        }
    }

    pub fn with_document<R>(&self, f: impl FnOnce(&mut Document) -> R) -> R {
        let mut guard = self.document.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    fn store(&self) -> MutexGuard<'_, ListenerStore> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_listener<F>(&self, node: NodeId, kind: EventKind, handler: F) -> Subscription
    where
        F: Fn(&Page, &mut Event) + Send + Sync + 'static,
    {
        let id = self.store().add(node, kind, Arc::new(handler));
        Subscription {
            listeners: Arc::downgrade(&self.listeners),
            node,
            kind,
            id,
        }
    }

    pub fn listener_count(&self) -> usize {
        self.store().len()
    }

    /// Runs listeners from `target` up to the document root, then the default
    /// action unless a listener prevented it.
    pub fn dispatch(&self, target: NodeId, kind: EventKind) -> Event {
        let path = self.with_document(|doc| {
            let mut path = Vec::new();
            let mut current = Some(target);
            while let Some(node) = current {
                path.push(node);
                current = doc.parent(node);
            }
            path
        });

        tracing::trace!("dispatching {} on {:?}", kind.as_str(), target);
        let mut event = Event::new(kind, target);
        for node in path {
            let handlers = self.store().get(node, kind);
            event.set_current_target(node);
            for handler in handlers {
                handler(self, &mut event);
            }
            if event.propagation_stopped() {
                break;
            }
        }

        if !event.default_prevented() {
            self.run_default_action(&event);
        }
        event
    }

    /// User click. Disabled controls swallow the click and no event fires.
    pub fn click(&self, target: NodeId) -> Option<Event> {
        let disabled =
            self.with_document(|doc| doc.element(target).is_some_and(Element::is_disabled));
        if disabled {
            tracing::trace!("click on disabled element {:?} ignored", target);
            return None;
        }
        Some(self.dispatch(target, EventKind::Click))
    }

    pub fn submit(&self, form: NodeId) -> Event {
        self.dispatch(form, EventKind::Submit)
    }

    pub fn fire_dom_content_loaded(&self) -> Event {
        let root = self.with_document(|doc| doc.root());
        self.dispatch(root, EventKind::DomContentLoaded)
    }

    fn run_default_action(&self, event: &Event) {
        match event.kind() {
            EventKind::Click => {
                let action = self.with_document(|doc| {
                    if let Some(anchor) = doc.closest(event.target(), "a") {
                        if let Some(href) = doc.element(anchor).and_then(|e| e.attr("href")) {
                            if href.starts_with('#') {
                                return DefaultAction::FollowFragment(href.to_string());
                            }
                        }
                    }
                    if let Some(button) = doc.closest(event.target(), "button") {
                        let submits = doc
                            .element(button)
                            .is_some_and(|e| matches!(e.attr("type"), None | Some("submit")));
                        if submits {
                            if let Some(form) = doc.closest(button, "form") {
                                return DefaultAction::SubmitForm(form);
                            }
                        }
                    }
                    DefaultAction::Nothing
                });

                match action {
                    DefaultAction::FollowFragment(href) => {
                        self.with_document(|doc| doc.navigate_to_fragment(&href));
                    }
                    DefaultAction::SubmitForm(form) => {
                        self.submit(form);
                    }
                    DefaultAction::Nothing => {}
                }
            }
            EventKind::Submit => {
                self.with_document(|doc| doc.record_native_submission(event.target()));
            }
            EventKind::DomContentLoaded => {}
        }
    }
}
