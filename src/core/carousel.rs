use crate::config::CarouselConfig;
use crate::dom::{NodeId, Page};
use crate::utils::error::{Result, SiteError};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

const SLIDE_SELECTOR: &str = ".testimonial-slide";
const ACTIVE_CLASS: &str = "active";
const MIN_SLIDES: usize = 2;

/// Testimonial rotation. With two or more slides exactly one carries `active`
/// from install onwards; with fewer the carousel never touches the page.
pub struct TestimonialCarousel {
    shared: Arc<CarouselShared>,
    ticker: Option<JoinHandle<()>>,
}

struct CarouselShared {
    page: Page,
    slides: Vec<NodeId>,
    cursor: Mutex<usize>,
}

impl CarouselShared {
    fn is_inert(&self) -> bool {
        self.slides.len() < MIN_SLIDES
    }

    fn advance(&self) -> Option<usize> {
        if self.is_inert() {
            return None;
        }
        let mut cursor = self.cursor.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = *cursor;
        let next = (previous + 1) % self.slides.len();
        self.page.with_document(|doc| {
            if let Some(slide) = doc.element_mut(self.slides[previous]) {
                slide.remove_class(ACTIVE_CLASS);
            }
            if let Some(slide) = doc.element_mut(self.slides[next]) {
                slide.add_class(ACTIVE_CLASS);
            }
        });
        *cursor = next;
        tracing::trace!("Testimonial slide {} -> {}", previous, next);
        Some(next)
    }
}

impl TestimonialCarousel {
    pub fn install(page: &Page) -> Result<Self> {
        let slides = page.with_document(|doc| doc.query_selector_all(SLIDE_SELECTOR))?;
        let shared = Arc::new(CarouselShared {
            page: page.clone(),
            slides,
            cursor: Mutex::new(0),
        });

        if shared.is_inert() {
            tracing::debug!(
                "Carousel inert: {} slide(s), needs at least {}",
                shared.slides.len(),
                MIN_SLIDES
            );
        } else {
            page.with_document(|doc| {
                for (index, node) in shared.slides.iter().enumerate() {
                    if let Some(slide) = doc.element_mut(*node) {
                        if index == 0 {
                            slide.add_class(ACTIVE_CLASS);
                        } else {
                            slide.remove_class(ACTIVE_CLASS);
                        }
                    }
                }
            });
            tracing::debug!("Carousel installed with {} slides", shared.slides.len());
        }

        Ok(Self {
            shared,
            ticker: None,
        })
    }

    /// Installs and, when configured, starts autoplay.
    pub fn install_with_config(page: &Page, config: &CarouselConfig) -> Result<Self> {
        let mut carousel = Self::install(page)?;
        if config.autoplay {
            carousel.start(config.interval())?;
        }
        Ok(carousel)
    }

    pub fn is_inert(&self) -> bool {
        self.shared.is_inert()
    }

    pub fn slide_count(&self) -> usize {
        self.shared.slides.len()
    }

    pub fn active_index(&self) -> Option<usize> {
        if self.is_inert() {
            None
        } else {
            Some(*self.shared.cursor.lock().unwrap_or_else(PoisonError::into_inner))
        }
    }

    /// Moves `active` to the next slide, wrapping after the last. `None` when inert.
    pub fn advance(&self) -> Option<usize> {
        self.shared.advance()
    }

    /// Advances every `period`, first after one full period. Restarts if already running.
    pub fn start(&mut self, period: Duration) -> Result<()> {
        if self.is_inert() {
            return Ok(());
        }
        if period.is_zero() {
            return Err(SiteError::InvalidConfigValueError {
                field: "carousel.interval_ms".to_string(),
                value: "0".to_string(),
                reason: "Interval must be positive".to_string(),
            });
        }
        let handle = Handle::try_current().map_err(|e| SiteError::RuntimeUnavailable {
            message: e.to_string(),
        })?;

        self.stop();
        let shared = self.shared.clone();
        self.ticker = Some(handle.spawn(async move {
            let mut ticks = interval_at(Instant::now() + period, period);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                shared.advance();
            }
        }));
        tracing::debug!("Carousel autoplay every {:?}", period);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.ticker.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Drop for TestimonialCarousel {
    fn drop(&mut self) {
        self.stop();
    }
}
