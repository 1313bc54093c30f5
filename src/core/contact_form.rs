use crate::config::ContactFormConfig;
use crate::dom::{Element, EventKind, NodeId, Page, Subscription};
use crate::domain::model::{Lead, SubmissionOutcome, SubmissionState};
use crate::domain::ports::{LeadGateway, Notifier};
use crate::utils::error::{Result, SiteError};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

const FORM_SELECTOR: &str = "#contact-form";
const SUBMIT_BUTTON_SELECTOR: &str = "button[type=\"submit\"]";

/// Lead capture form.
///
/// Idle → Submitting → Succeeded, or Submitting → Failed → Idle. The native
/// submission is always prevented; the controller owns the request.
pub struct ContactFormController {
    page: Page,
    shared: Arc<FormShared>,
    subscription: Subscription,
}

struct FormShared {
    form: NodeId,
    submit_button: Option<NodeId>,
    gateway: Arc<dyn LeadGateway>,
    notifier: Arc<dyn Notifier>,
    config: ContactFormConfig,
    /// Button label captured at install, restored after a failure.
    idle_label: Option<String>,
    state: Mutex<SubmissionState>,
    /// Submissions between `begin` and resolution; the button stays locked while non-zero.
    pending: Mutex<usize>,
    in_flight: Mutex<Vec<JoinHandle<SubmissionOutcome>>>,
}

impl FormShared {
    fn set_state(&self, state: SubmissionState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }

    /// Synchronous half of a submit: validate, then lock the button.
    fn begin(&self, page: &Page) -> std::result::Result<Lead, SubmissionOutcome> {
        let data = page.with_document(|doc| doc.form_data(self.form));

        let lead = match Lead::from_form_data(data, &self.config.required_fields) {
            Ok(lead) => lead,
            Err(err) => {
                tracing::debug!("Contact form rejected: {}", err);
                self.notifier.alert(&self.config.validation_alert);
                let missing = match err {
                    SiteError::MissingFields { fields } => fields,
                    _ => Vec::new(),
                };
                return Err(SubmissionOutcome::Rejected { missing });
            }
        };

        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) += 1;
        if let Some(button) = self.submit_button {
            page.with_document(|doc| {
                if let Some(element) = doc.element_mut(button) {
                    element.set_disabled(true);
                }
                doc.set_text_content(button, &self.config.busy_label);
            });
        }
        self.set_state(SubmissionState::Submitting);

        Ok(lead)
    }

    /// Marks one submission resolved and returns how many are still pending.
    fn resolve_one(&self) -> usize {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        *pending = pending.saturating_sub(1);
        *pending
    }

    async fn complete(&self, page: &Page, lead: Lead) -> SubmissionOutcome {
        let result = self.gateway.submit(&lead).await;
        let remaining = self.resolve_one();
        match result {
            Ok(()) => {
                tracing::info!("✅ Lead received for {}", lead.name);
                self.render_success(page, &lead.name);
                self.set_state(SubmissionState::Succeeded);
                SubmissionOutcome::Succeeded { name: lead.name }
            }
            Err(err) => self.fail(page, remaining, err),
        }
    }

    fn render_success(&self, page: &Page, name: &str) {
        page.with_document(|doc| {
            doc.remove_children(self.form);
            let container = doc.append(self.form, Element::new("div").with_class("success-message"));
            let heading = doc.append(container, Element::new("h3"));
            doc.append_text(heading, &self.config.success_heading);
            let body = doc.append(container, Element::new("p"));
            doc.append_text(body, &self.config.success_message(name));
        });
    }

    fn fail(&self, page: &Page, remaining: usize, err: SiteError) -> SubmissionOutcome {
        tracing::error!("Lead submission error: {}", err);
        self.notifier.alert(&self.config.failure_alert);

        // 仍有其他請求在進行時，按鈕維持鎖定
        if remaining > 0 {
            tracing::debug!("{} submission(s) still pending; button stays locked", remaining);
        } else {
            self.set_state(SubmissionState::Failed);
            if let (Some(button), Some(label)) = (self.submit_button, &self.idle_label) {
                page.with_document(|doc| {
                    if let Some(element) = doc.element_mut(button) {
                        element.set_disabled(false);
                    }
                    doc.set_text_content(button, label);
                });
            }
            self.set_state(SubmissionState::Idle);
        }

        SubmissionOutcome::Failed {
            reason: err.to_string(),
        }
    }

    fn on_submit(self: &Arc<Self>, page: &Page) {
        let Ok(lead) = self.begin(page) else {
            return;
        };

        match Handle::try_current() {
            Ok(handle) => {
                let shared = self.clone();
                let page = page.clone();
                let task = handle.spawn(async move { shared.complete(&page, lead).await });
                self.in_flight
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .push(task);
            }
            Err(err) => {
                let err = SiteError::RuntimeUnavailable {
                    message: err.to_string(),
                };
                let remaining = self.resolve_one();
                self.fail(page, remaining, err);
            }
        }
    }
}

impl ContactFormController {
    pub fn install(
        page: &Page,
        config: &ContactFormConfig,
        gateway: Arc<dyn LeadGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let (form, submit_button) = page.with_document(|doc| -> Result<_> {
            let form = doc
                .query_selector(FORM_SELECTOR)?
                .ok_or_else(|| SiteError::ElementNotFound {
                    selector: FORM_SELECTOR.to_string(),
                })?;
            let submit_button = doc.query_selector_within(form, SUBMIT_BUTTON_SELECTOR)?;
            Ok((form, submit_button))
        })?;
        let idle_label =
            submit_button.map(|button| page.with_document(|doc| doc.text_content(button)));

        if submit_button.is_none() {
            tracing::warn!("Contact form has no submit button; button state will not be managed");
        }

        let shared = Arc::new(FormShared {
            form,
            submit_button,
            gateway,
            notifier,
            config: config.clone(),
            idle_label,
            state: Mutex::new(SubmissionState::Idle),
            pending: Mutex::new(0),
            in_flight: Mutex::new(Vec::new()),
        });

        let on_submit = shared.clone();
        let subscription = page.add_listener(form, EventKind::Submit, move |page, event| {
            event.prevent_default();
            on_submit.on_submit(page);
        });

        tracing::debug!("Contact form installed");
        Ok(Self {
            page: page.clone(),
            shared,
            subscription,
        })
    }

    pub fn form(&self) -> NodeId {
        self.shared.form
    }

    pub fn submit_button(&self) -> Option<NodeId> {
        self.shared.submit_button
    }

    pub fn state(&self) -> SubmissionState {
        *self
            .shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs one submission to completion without going through event dispatch.
    pub async fn submit(&self) -> SubmissionOutcome {
        match self.shared.begin(&self.page) {
            Ok(lead) => self.shared.complete(&self.page, lead).await,
            Err(outcome) => outcome,
        }
    }

    /// Waits for every submission started from a submit event, oldest first.
    pub async fn settle(&self) -> Vec<SubmissionOutcome> {
        let mut outcomes = Vec::new();
        loop {
            let tasks: Vec<_> = std::mem::take(
                &mut *self
                    .shared
                    .in_flight
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner),
            );
            if tasks.is_empty() {
                return outcomes;
            }
            for task in tasks {
                outcomes.push(task.await.unwrap_or_else(|e| SubmissionOutcome::Failed {
                    reason: format!("submission task failed: {}", e),
                }));
            }
        }
    }

    pub fn dispose(self) {
        self.subscription.dispose();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::RecordingNotifier;
    use crate::dom::Document;
    use async_trait::async_trait;
    use tokio::sync::Semaphore;

    #[derive(Clone, Copy)]
    enum Reply {
        Accept,
        Reject(u16),
    }

    struct MockGateway {
        reply: Reply,
        leads: Mutex<Vec<Lead>>,
        release: Option<Arc<Semaphore>>,
    }

    impl MockGateway {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                leads: Mutex::new(Vec::new()),
                release: None,
            }
        }

        fn gated(reply: Reply, release: Arc<Semaphore>) -> Self {
            Self {
                release: Some(release),
                ..Self::new(reply)
            }
        }

        fn calls(&self) -> usize {
            self.leads.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl LeadGateway for MockGateway {
        async fn submit(&self, lead: &Lead) -> Result<()> {
            self.leads.lock().unwrap().push(lead.clone());
            if let Some(release) = &self.release {
                release
                    .acquire()
                    .await
                    .expect("test semaphore closed")
                    .forget();
            }
            match self.reply {
                Reply::Accept => Ok(()),
                Reply::Reject(status) => Err(SiteError::SubmissionRejected { status }),
            }
        }
    }

    struct Fixture {
        page: Page,
        form: NodeId,
        button: NodeId,
        inputs: [NodeId; 3],
    }

    fn fixture(name: &str, email: &str, message: &str) -> Fixture {
        let mut doc = Document::new(1280);
        let body = doc.body();
        let form = doc.append(body, Element::new("form").with_attr("id", "contact-form"));
        let inputs = [
            doc.append(form, Element::new("input").with_attr("name", "name").with_value(name)),
            doc.append(form, Element::new("input").with_attr("name", "email").with_value(email)),
            doc.append(
                form,
                Element::new("textarea")
                    .with_attr("name", "message")
                    .with_value(message),
            ),
        ];
        let button = doc.append(form, Element::new("button").with_attr("type", "submit"));
        doc.append_text(button, "Send Inquiry");
        Fixture {
            page: Page::new(doc),
            form,
            button,
            inputs,
        }
    }

    fn install(
        f: &Fixture,
        gateway: Arc<MockGateway>,
        notifier: Arc<RecordingNotifier>,
    ) -> ContactFormController {
        ContactFormController::install(&f.page, &ContactFormConfig::default(), gateway, notifier)
            .unwrap()
    }

    fn button_state(f: &Fixture) -> (bool, String) {
        f.page.with_document(|doc| {
            (
                doc.element(f.button).unwrap().is_disabled(),
                doc.text_content(f.button),
            )
        })
    }

    #[tokio::test]
    async fn test_blank_fields_are_rejected_without_request() {
        for (name, email, message) in [("", "a@b.c", "hi"), ("Ada", "", "hi"), ("Ada", "a@b.c", "  \n")] {
            let f = fixture(name, email, message);
            let gateway = Arc::new(MockGateway::new(Reply::Accept));
            let notifier = Arc::new(RecordingNotifier::new());
            let controller = install(&f, gateway.clone(), notifier.clone());

            f.page.click(f.button);
            assert!(controller.settle().await.is_empty());

            assert_eq!(gateway.calls(), 0);
            assert_eq!(notifier.alerts(), vec!["Please fill in all required fields."]);
            assert_eq!(button_state(&f), (false, "Send Inquiry".to_string()));
            assert_eq!(controller.state(), SubmissionState::Idle);
            assert!(f.page.with_document(|doc| doc.window().native_submissions().is_empty()));
        }
    }

    #[tokio::test]
    async fn test_button_locked_until_response() {
        let f = fixture("Ada Lovelace", "ada@example.com", "Restring my Pure Aero");
        let release = Arc::new(Semaphore::new(0));
        let gateway = Arc::new(MockGateway::gated(Reply::Accept, release.clone()));
        let notifier = Arc::new(RecordingNotifier::new());
        let controller = install(&f, gateway.clone(), notifier.clone());

        let event = f.page.click(f.button).unwrap();
        assert!(!event.default_prevented());
        assert_eq!(button_state(&f), (true, "Sending Message...".to_string()));
        assert_eq!(controller.state(), SubmissionState::Submitting);

        // 按鈕停用時重複點擊不會觸發第二次送出
        assert!(f.page.click(f.button).is_none());

        release.add_permits(1);
        let outcomes = controller.settle().await;
        assert_eq!(
            outcomes,
            vec![SubmissionOutcome::Succeeded {
                name: "Ada Lovelace".to_string()
            }]
        );
        assert_eq!(gateway.calls(), 1);
        assert!(notifier.alerts().is_empty());
        assert_eq!(controller.state(), SubmissionState::Succeeded);
    }

    #[tokio::test]
    async fn test_success_replaces_form_content() {
        let f = fixture("Ada Lovelace", "ada@example.com", "Restring my Pure Aero");
        let gateway = Arc::new(MockGateway::new(Reply::Accept));
        let notifier = Arc::new(RecordingNotifier::new());
        let controller = install(&f, gateway, notifier);

        assert!(controller.submit().await.is_success());

        f.page.with_document(|doc| {
            let text = doc.text_content(f.form);
            assert!(text.contains("Inquiry Received!"));
            assert!(text.contains("Thanks Ada Lovelace, our professional stringing team"));
            assert!(doc.query_selector_within(f.form, ".success-message").unwrap().is_some());
            assert!(!doc.is_connected(f.button));
            assert!(f.inputs.iter().all(|input| !doc.is_connected(*input)));
        });
    }

    #[tokio::test]
    async fn test_rejected_response_restores_button() {
        let f = fixture("Ada", "ada@example.com", "Hi");
        let gateway = Arc::new(MockGateway::new(Reply::Reject(500)));
        let notifier = Arc::new(RecordingNotifier::new());
        let controller = install(&f, gateway.clone(), notifier.clone());

        f.page.click(f.button);
        let outcomes = controller.settle().await;

        assert!(matches!(outcomes.as_slice(), [SubmissionOutcome::Failed { .. }]));
        assert_eq!(gateway.calls(), 1);
        assert_eq!(
            notifier.alerts(),
            vec!["Something went wrong. Please try calling us directly."]
        );
        assert_eq!(button_state(&f), (false, "Send Inquiry".to_string()));
        assert_eq!(controller.state(), SubmissionState::Idle);
        assert!(f.page.with_document(|doc| doc.is_connected(f.button)));
    }

    #[tokio::test]
    async fn test_direct_submit_event_while_in_flight_sends_again() {
        let f = fixture("Ada", "ada@example.com", "Hi");
        let release = Arc::new(Semaphore::new(0));
        let gateway = Arc::new(MockGateway::gated(Reply::Accept, release.clone()));
        let controller = install(&f, gateway.clone(), Arc::new(RecordingNotifier::new()));

        f.page.click(f.button);
        f.page.submit(f.form);

        release.add_permits(2);
        let outcomes = controller.settle().await;
        assert_eq!(outcomes.len(), 2);
        assert_eq!(gateway.calls(), 2);
    }

    #[tokio::test]
    async fn test_overlapping_failures_restore_idle_label_once_all_resolve() {
        let f = fixture("Ada", "ada@example.com", "Hi");
        let release = Arc::new(Semaphore::new(0));
        let gateway = Arc::new(MockGateway::gated(Reply::Reject(503), release.clone()));
        let notifier = Arc::new(RecordingNotifier::new());
        let controller = install(&f, gateway.clone(), notifier.clone());

        f.page.click(f.button);
        f.page.submit(f.form);
        while gateway.calls() < 2 {
            tokio::task::yield_now().await;
        }

        // 第一個請求失敗，第二個仍在進行
        release.add_permits(1);
        while notifier.alerts().is_empty() {
            tokio::task::yield_now().await;
        }
        assert_eq!(button_state(&f), (true, "Sending Message...".to_string()));
        assert_eq!(controller.state(), SubmissionState::Submitting);

        release.add_permits(1);
        let outcomes = controller.settle().await;
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes
            .iter()
            .all(|o| matches!(o, SubmissionOutcome::Failed { .. })));
        assert_eq!(notifier.alerts().len(), 2);
        assert_eq!(button_state(&f), (false, "Send Inquiry".to_string()));
        assert_eq!(controller.state(), SubmissionState::Idle);

        // 恢復後可再次點擊送出
        assert!(f.page.click(f.button).is_some());
        assert_eq!(button_state(&f), (true, "Sending Message...".to_string()));
        release.add_permits(1);
        controller.settle().await;
        assert_eq!(button_state(&f), (false, "Send Inquiry".to_string()));
    }

    fn fixture_without_button() -> (Page, NodeId) {
        let mut doc = Document::new(1280);
        let body = doc.body();
        let form = doc.append(body, Element::new("form").with_attr("id", "contact-form"));
        for (name, value) in [("name", "Ada"), ("email", "ada@example.com"), ("message", "Hi")] {
            doc.append(form, Element::new("input").with_attr("name", name).with_value(value));
        }
        (Page::new(doc), form)
    }

    #[tokio::test]
    async fn test_form_without_submit_button_still_submits() {
        let (page, form) = fixture_without_button();
        let gateway = Arc::new(MockGateway::new(Reply::Accept));
        let controller = ContactFormController::install(
            &page,
            &ContactFormConfig::default(),
            gateway.clone(),
            Arc::new(RecordingNotifier::new()),
        )
        .unwrap();
        assert!(controller.submit_button().is_none());

        let event = page.submit(form);
        assert!(event.default_prevented());
        let outcomes = controller.settle().await;

        assert_eq!(
            outcomes,
            vec![SubmissionOutcome::Succeeded {
                name: "Ada".to_string()
            }]
        );
        assert_eq!(gateway.calls(), 1);
        assert!(page.with_document(|doc| doc.window().native_submissions().is_empty()));
    }

    #[tokio::test]
    async fn test_form_without_submit_button_fails_cleanly() {
        let (page, form) = fixture_without_button();
        let notifier = Arc::new(RecordingNotifier::new());
        let controller = ContactFormController::install(
            &page,
            &ContactFormConfig::default(),
            Arc::new(MockGateway::new(Reply::Reject(500))),
            notifier.clone(),
        )
        .unwrap();

        page.submit(form);
        let outcomes = controller.settle().await;

        assert!(matches!(outcomes.as_slice(), [SubmissionOutcome::Failed { .. }]));
        assert_eq!(notifier.alerts().len(), 1);
        assert_eq!(controller.state(), SubmissionState::Idle);
    }

    #[test]
    fn test_without_runtime_submission_fails_cleanly() {
        let f = fixture("Ada", "ada@example.com", "Hi");
        let gateway = Arc::new(MockGateway::new(Reply::Accept));
        let notifier = Arc::new(RecordingNotifier::new());
        let controller = install(&f, gateway.clone(), notifier.clone());

        f.page.click(f.button);

        assert_eq!(gateway.calls(), 0);
        assert_eq!(notifier.alerts().len(), 1);
        assert_eq!(button_state(&f), (false, "Send Inquiry".to_string()));
        assert_eq!(controller.state(), SubmissionState::Idle);
    }

    #[test]
    fn test_direct_submit_reports_missing_fields() {
        let f = fixture("Ada", "", "");
        let gateway = Arc::new(MockGateway::new(Reply::Accept));
        let controller = install(&f, gateway.clone(), Arc::new(RecordingNotifier::new()));

        let outcome = tokio_test::block_on(controller.submit());
        assert_eq!(
            outcome,
            SubmissionOutcome::Rejected {
                missing: vec!["email".to_string(), "message".to_string()]
            }
        );
        assert_eq!(gateway.calls(), 0);
    }

    #[test]
    fn test_missing_form_is_resolution_error() {
        let page = Page::new(Document::new(1280));
        let result = ContactFormController::install(
            &page,
            &ContactFormConfig::default(),
            Arc::new(MockGateway::new(Reply::Accept)),
            Arc::new(RecordingNotifier::new()),
        );
        assert!(matches!(result, Err(SiteError::ElementNotFound { .. })));
    }

    #[tokio::test]
    async fn test_extra_fields_are_forwarded() {
        let f = fixture("Ada", "ada@example.com", "Hi");
        f.page.with_document(|doc| {
            doc.append(
                f.form,
                Element::new("select")
                    .with_attr("name", "service")
                    .with_value("restring"),
            );
        });
        let gateway = Arc::new(MockGateway::new(Reply::Accept));
        let controller = install(&f, gateway.clone(), Arc::new(RecordingNotifier::new()));

        controller.submit().await;
        let leads = gateway.leads.lock().unwrap();
        assert_eq!(leads[0].extra.get("service").map(String::as_str), Some("restring"));
    }
}
