use crate::config::SiteConfig;
use crate::core::{
    ContactFormController, LeadGateway, NavigationController, Notifier, SmoothScrollController,
    TestimonialCarousel,
};
use crate::dom::{EventKind, Page, Subscription};
use crate::utils::error::{ErrorCategory, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The four page components, each installed independently. A component whose
/// markup is missing is simply absent.
pub struct Site {
    navigation: Option<NavigationController>,
    smooth_scroll: Option<SmoothScrollController>,
    contact_form: Option<ContactFormController>,
    carousel: Option<TestimonialCarousel>,
}

fn installed<T>(component: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(installed) => Some(installed),
        Err(e) if e.category() == ErrorCategory::Resolution => {
            tracing::debug!("⏭️ Skipping {}: {}", component, e);
            None
        }
        Err(e) => {
            tracing::warn!("❌ {} failed to install: {}", component, e);
            None
        }
    }
}

impl Site {
    pub fn init(
        page: &Page,
        config: &SiteConfig,
        gateway: Arc<dyn LeadGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        tracing::info!("🚀 Initializing {} interactions", config.site.name);

        let navigation = installed(
            "navigation",
            NavigationController::install(page, &config.navigation),
        );
        let smooth_scroll = installed(
            "smooth scroll",
            SmoothScrollController::install(page, &config.scroll),
        );
        let contact_form = installed(
            "contact form",
            ContactFormController::install(page, &config.contact_form, gateway, notifier),
        );
        let mut carousel = installed("carousel", TestimonialCarousel::install(page));

        if let Some(carousel) = carousel.as_mut() {
            if config.carousel.autoplay {
                if let Err(e) = carousel.start(config.carousel.interval()) {
                    tracing::warn!("⚠️ Carousel autoplay not started: {}", e);
                }
            }
        }

        let site = Self {
            navigation,
            smooth_scroll,
            contact_form,
            carousel,
        };
        tracing::info!(
            "✅ Site ready (navigation: {}, smooth scroll: {}, contact form: {}, carousel: {})",
            site.navigation.is_some(),
            site.smooth_scroll.is_some(),
            site.contact_form.is_some(),
            site.carousel.as_ref().is_some_and(|c| !c.is_inert()),
        );
        site
    }

    pub fn navigation(&self) -> Option<&NavigationController> {
        self.navigation.as_ref()
    }

    pub fn smooth_scroll(&self) -> Option<&SmoothScrollController> {
        self.smooth_scroll.as_ref()
    }

    pub fn contact_form(&self) -> Option<&ContactFormController> {
        self.contact_form.as_ref()
    }

    pub fn carousel(&self) -> Option<&TestimonialCarousel> {
        self.carousel.as_ref()
    }

    pub fn carousel_mut(&mut self) -> Option<&mut TestimonialCarousel> {
        self.carousel.as_mut()
    }

    /// Removes every listener and stops the carousel timer.
    pub fn teardown(self) {
        if let Some(navigation) = self.navigation {
            navigation.dispose();
        }
        if let Some(smooth_scroll) = self.smooth_scroll {
            smooth_scroll.dispose();
        }
        if let Some(contact_form) = self.contact_form {
            contact_form.dispose();
        }
        if let Some(mut carousel) = self.carousel {
            carousel.stop();
        }
        tracing::debug!("Site torn down");
    }
}

/// A [`Site`] that initializes itself when the page fires `DOMContentLoaded`.
pub struct DeferredSite {
    slot: Arc<Mutex<Option<Site>>>,
    subscription: Subscription,
}

impl DeferredSite {
    pub fn on_dom_content_loaded(
        page: &Page,
        config: SiteConfig,
        gateway: Arc<dyn LeadGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let slot: Arc<Mutex<Option<Site>>> = Arc::new(Mutex::new(None));
        let root = page.with_document(|doc| doc.root());

        let target = slot.clone();
        let subscription = page.add_listener(root, EventKind::DomContentLoaded, move |page, _| {
            let mut slot = target.lock().unwrap_or_else(PoisonError::into_inner);
            if slot.is_some() {
                tracing::debug!("DOMContentLoaded fired again; site already initialized");
                return;
            }
            *slot = Some(Site::init(page, &config, gateway.clone(), notifier.clone()));
        });

        Self { slot, subscription }
    }

    fn slot(&self) -> MutexGuard<'_, Option<Site>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_loaded(&self) -> bool {
        self.slot().is_some()
    }

    pub fn with_site<R>(&self, f: impl FnOnce(&Site) -> R) -> Option<R> {
        self.slot().as_ref().map(f)
    }

    /// Stops waiting for the load event and hands back the site, if it was built.
    pub fn into_site(self) -> Option<Site> {
        let DeferredSite { slot, subscription } = self;
        subscription.dispose();
        let site = slot.lock().unwrap_or_else(PoisonError::into_inner).take();
        site
    }
}
