pub mod carousel;
pub mod contact_form;
pub mod navigation;
pub mod smooth_scroll;

pub use crate::domain::model::{Lead, MenuState, SubmissionOutcome, SubmissionState};
pub use crate::domain::ports::{LeadGateway, Notifier};
pub use crate::utils::error::Result;
pub use carousel::TestimonialCarousel;
pub use contact_form::ContactFormController;
pub use navigation::NavigationController;
pub use smooth_scroll::SmoothScrollController;
