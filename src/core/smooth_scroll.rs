use crate::config::ScrollConfig;
use crate::dom::{Document, EventKind, Page, Subscription};
use crate::domain::model::{ScrollBehavior, ScrollRequest};
use crate::utils::error::Result;

const FRAGMENT_ANCHORS_SELECTOR: &str = "a[href^=\"#\"]";

/// Intercepts in-page anchor clicks and animates to the target instead of jumping.
pub struct SmoothScrollController {
    subscriptions: Vec<Subscription>,
}

/// Where a click on `href` should scroll to, or `None` to leave the click to the browser.
///
/// The target offset is measured the way a browser lays it out: the target's
/// client rect relative to the body's client rect, minus the fixed header.
pub fn scroll_target(doc: &Document, href: &str, header_offset: f64) -> Option<f64> {
    let id = href.strip_prefix('#').filter(|id| !id.is_empty())?;
    let target = doc.get_element_by_id(id)?;
    let body_top = doc.bounding_client_top(doc.body());
    let element_top = doc.bounding_client_top(target);
    Some(element_top - body_top - header_offset)
}

impl SmoothScrollController {
    pub fn install(page: &Page, config: &ScrollConfig) -> Result<Self> {
        let anchors = page.with_document(|doc| doc.query_selector_all(FRAGMENT_ANCHORS_SELECTOR))?;
        let header_offset = config.header_offset_px;

        let subscriptions: Vec<Subscription> = anchors
            .into_iter()
            .map(|anchor| {
                page.add_listener(anchor, EventKind::Click, move |page, event| {
                    page.with_document(|doc| {
                        let Some(href) = doc
                            .element(anchor)
                            .and_then(|e| e.attr("href"))
                            .map(str::to_string)
                        else {
                            return;
                        };
                        match scroll_target(doc, &href, header_offset) {
                            Some(top) => {
                                event.prevent_default();
                                tracing::debug!("Smooth scrolling to {} (top = {})", href, top);
                                doc.window_mut().scroll_to(ScrollRequest {
                                    top,
                                    behavior: ScrollBehavior::Smooth,
                                });
                            }
                            None => {
                                tracing::trace!("No scroll target for {}, using default", href)
                            }
                        }
                    });
                })
            })
            .collect();

        tracing::debug!("Smooth scroll installed on {} anchors", subscriptions.len());
        Ok(Self { subscriptions })
    }

    pub fn anchor_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn dispose(self) {
        for subscription in self.subscriptions {
            subscription.dispose();
        }
    }
}
