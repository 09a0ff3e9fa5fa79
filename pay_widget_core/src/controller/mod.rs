// Payment widget controller
// Drives the load -> secret -> init -> mount -> submit -> result sequence
// through explicit events. State lives behind a RefCell that is never
// borrowed across an await.

use crate::config::{Configuration, WidgetSettings};
use crate::error::{SdkError, WidgetError, WidgetResult};
use crate::lifetime::Lifetime;
use crate::ports::{
    BridgeMessage, HostBridge, Notifier, Scheduler, ScriptCallbacks, ScriptSpec, SecretSource,
    View, ViewModel,
};
use crate::query::QueryParams;
use crate::sdk::{PayForm, PaySdk, SdkFactory, WalletEvent, WalletSink};
use crate::state::{LifecycleFlags, Phase, PhaseChange, PhaseHistory};
use crate::style::{hex_color, ButtonStyle};
use log::{debug, error, info, warn};
use std::cell::RefCell;
use std::rc::{Rc, Weak};


pub const SECRET_TIMEOUT_MESSAGE: &str = "Payment session could not be started";
pub const COMPLETE_MESSAGE: &str = "Payment complete";

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The page is ready; inject the SDK script and look for a secret.
    Mounted,
    LibraryLoaded,
    LibraryFailed(String),
    SecretResolved(String),
    SecretTimedOut,
    SubmitClicked,
    Wallet(WalletEvent),
    Teardown,
}

/// External collaborators used by the controller.
pub struct Ports {
    pub sdk_factory: Rc<dyn SdkFactory>,
    pub view: Rc<dyn View>,
    pub notifier: Rc<dyn Notifier>,
    pub bridge: Rc<dyn HostBridge>,
    pub secret_source: Option<Rc<dyn SecretSource>>,
    pub scheduler: Rc<dyn Scheduler>,
}

struct WidgetState {
    phase: Phase,
    flags: LifecycleFlags,
    configuration: Configuration,
    button_style: ButtonStyle,
    live_mode: bool,
    mounted: bool,
    sdk: Option<Rc<dyn PaySdk>>,
    form: Option<Box<dyn PayForm>>,
    initialized_secret: Option<String>,
    secret_timed_out: bool,
    attempt: u64,
    last_error: Option<SdkError>,
    history: PhaseHistory,
}

impl WidgetState {
    fn transition(&mut self, to: Phase) {
        if self.phase != to {
            debug!("Phase {} -> {}", self.phase, to);
            self.history.record(self.phase, to);
            self.phase = to;
        }
    }
}

struct Inner {
    settings: WidgetSettings,
    query: QueryParams,
    ports: Ports,
    lifetime: Lifetime,
    state: RefCell<WidgetState>,
}

/// Cloneable handle to a single widget instance.
#[derive(Clone)]
pub struct Controller {
    inner: Rc<Inner>,
}

/// Posts events back into a controller from SDK and DOM callbacks.
/// Holds a weak handle, so it never keeps a torn-down widget alive.
#[derive(Clone)]
pub struct EventSender {
    inner: Weak<Inner>,
}

impl EventSender {
    pub fn send(&self, event: Event) {
        let Some(inner) = self.inner.upgrade() else {
            debug!("Dropping {:?}: widget is gone", event);
            return;
        };
        let scheduler = inner.ports.scheduler.clone();
        let controller = Controller { inner };
        scheduler.spawn(Box::pin(async move {
            controller.dispatch(event).await;
        }));
    }
}

impl Controller {
    pub fn new(settings: WidgetSettings, query: QueryParams, ports: Ports) -> Self {
        let live_mode = query.live_mode().unwrap_or(settings.live_mode);
        let state = WidgetState {
            phase: Phase::Idle,
            flags: LifecycleFlags::default(),
            configuration: settings.configuration.clone(),
            button_style: settings.effective_button_style(),
            live_mode,
            mounted: false,
            sdk: None,
            form: None,
            initialized_secret: None,
            secret_timed_out: false,
            attempt: 0,
            last_error: None,
            history: PhaseHistory::default(),
        };
        Self {
            inner: Rc::new(Inner {
                settings,
                query,
                ports,
                lifetime: Lifetime::new(),
                state: RefCell::new(state),
            }),
        }
    }

    pub fn sender(&self) -> EventSender {
        EventSender {
            inner: Rc::downgrade(&self.inner),
        }
    }

    pub fn phase(&self) -> Phase {
        self.inner.state.borrow().phase
    }

    pub fn flags(&self) -> LifecycleFlags {
        self.inner.state.borrow().flags
    }

    pub fn configuration(&self) -> Configuration {
        self.inner.state.borrow().configuration.clone()
    }

    pub fn button_style(&self) -> ButtonStyle {
        self.inner.state.borrow().button_style.clone()
    }

    pub fn live_mode(&self) -> bool {
        self.inner.state.borrow().live_mode
    }

    pub fn last_error(&self) -> Option<SdkError> {
        self.inner.state.borrow().last_error.clone()
    }

    pub fn history(&self) -> Vec<PhaseChange> {
        self.inner.state.borrow().history.entries()
    }

    pub fn is_form_mounted(&self) -> bool {
        self.inner.state.borrow().form.is_some()
    }

    pub fn is_alive(&self) -> bool {
        self.inner.lifetime.is_alive()
    }

    pub fn view_model(&self) -> ViewModel {
        let settings = &self.inner.settings;
        let state = self.inner.state.borrow();
        let flags = state.flags;
        ViewModel {
            phase: state.phase,
            overlay_visible: flags.submitting_overlay,
            form_visible: flags.pay_request_ready,
            button_label: settings.effective_button_label(),
            button_disabled: flags.submitting,
            button_css: state.button_style.to_css_text(),
            loading: flags.loading,
            spinner_color: self.inner.query.button_background_color().and_then(hex_color),
            error_banner: state
                .last_error
                .as_ref()
                .filter(|e| e.error_type.is_some())
                .map(SdkError::banner_text),
            complete_message: (settings.effective_show_complete_message() && flags.pay_complete)
                .then(|| COMPLETE_MESSAGE.to_string()),
        }
    }

    /// Apply one event. Events arriving after teardown are ignored.
    pub async fn dispatch(&self, event: Event) {
        if !self.is_alive() {
            debug!("Ignoring {:?} after teardown", event);
            return;
        }
        debug!("Dispatching {:?} in phase {}", event, self.phase());
        match event {
            Event::Mounted => self.on_mounted().await,
            Event::LibraryLoaded => self.on_library_loaded().await,
            Event::LibraryFailed(reason) => self.on_library_failed(&reason),
            Event::SecretResolved(secret) => self.on_secret_resolved(secret).await,
            Event::SecretTimedOut => self.on_secret_timed_out(),
            Event::SubmitClicked => self.submit_pay_form().await,
            Event::Wallet(wallet_event) => self.on_wallet_event(wallet_event).await,
            Event::Teardown => self.teardown(),
        }
    }

    fn update<R>(&self, f: impl FnOnce(&mut WidgetState) -> R) -> R {
        let result = {
            let mut state = self.inner.state.borrow_mut();
            f(&mut state)
        };
        self.render();
        result
    }

    fn render(&self) {
        if self.is_alive() {
            let model = self.view_model();
            self.inner.ports.view.render(&model);
        }
    }

    fn toast(&self, message: &str) {
        warn!("{}", message);
        self.inner.ports.notifier.toast_error(message);
    }

    /// Still the same widget and the same pay request attempt.
    fn is_current(&self, attempt: u64) -> bool {
        self.is_alive() && self.inner.state.borrow().attempt == attempt
    }

    async fn on_mounted(&self) {
        if self.inner.state.borrow().mounted {
            debug!("Widget already mounted");
            return;
        }
        let settings = &self.inner.settings;
        let script = ScriptSpec::new(&settings.script_id, &settings.script_src);
        let on_load = self.sender();
        let on_error = self.sender();
        let callbacks = ScriptCallbacks {
            on_load: Box::new(move || on_load.send(Event::LibraryLoaded)),
            on_error: Box::new(move |reason| on_error.send(Event::LibraryFailed(reason))),
        };

        let query = &self.inner.query;
        self.update(|s| {
            s.mounted = true;
            let applied = s.button_style.apply_query_overrides(query);
            if applied > 0 {
                debug!("Applied {} button style override(s)", applied);
            }
            s.flags.loading = true;
            s.transition(Phase::LibraryLoading);
        });

        info!("Injecting payment library from {}", script.src);
        if let Err(e) = self.inner.ports.view.inject_script(&script, callbacks) {
            self.toast(&e.to_string());
            self.update(|s| {
                s.flags.loading = false;
                s.transition(Phase::Failed);
            });
            return;
        }

        self.resolve_secret().await;
    }

    async fn resolve_secret(&self) {
        let preset = self.inner.state.borrow().configuration.has_pay_secret();
        if preset {
            let secret = self.inner.state.borrow().configuration.pay_secret.clone();
            self.on_secret_resolved(secret).await;
            return;
        }

        if let Some(secret) = self.inner.query.pay_secret() {
            self.on_secret_resolved(secret.to_string()).await;
            return;
        }

        let endpoint = self.inner.settings.secret_endpoint.clone();
        let source = self.inner.ports.secret_source.clone();
        match (endpoint, source) {
            (Some(endpoint), Some(source)) => {
                self.schedule_secret_timeout();
                self.update(|s| s.flags.fetching_pay_secret = true);
                let fetched = source.fetch_secret(&endpoint).await;
                if !self.is_alive() {
                    return;
                }
                self.update(|s| s.flags.fetching_pay_secret = false);
                match fetched {
                    Ok(secret) => self.on_secret_resolved(secret).await,
                    Err(e) => {
                        error!("Failed to fetch pay secret: {}", e);
                        self.toast(&e.to_string());
                    }
                }
            }
            _ => {
                warn!("No pay secret available, waiting for one");
                self.schedule_secret_timeout();
            }
        }
    }

    fn schedule_secret_timeout(&self) {
        let Some(ms) = self.inner.settings.secret_timeout_ms else {
            return;
        };
        let delay = self.inner.ports.scheduler.delay(ms);
        let sender = self.sender();
        self.inner.ports.scheduler.spawn(Box::pin(async move {
            delay.await;
            sender.send(Event::SecretTimedOut);
        }));
    }

    async fn on_library_loaded(&self) {
        let has_secret = {
            let mut state = self.inner.state.borrow_mut();
            if state.flags.library_ready {
                debug!("Payment library already loaded");
                return;
            }
            state.flags.library_ready = true;
            if state.secret_timed_out {
                return;
            }
            state.configuration.has_pay_secret()
        };
        info!("Payment library loaded");
        if has_secret {
            self.init_pay_request().await;
        } else {
            self.update(|s| s.transition(Phase::SecretPending));
        }
    }

    fn on_library_failed(&self, reason: &str) {
        if self.inner.state.borrow().flags.library_ready {
            return;
        }
        error!("Payment library failed to load: {}", reason);
        self.toast(&format!("Failed to load payment library: {}", reason));
        self.update(|s| {
            s.flags.loading = false;
            s.transition(Phase::Failed);
        });
    }

    async fn on_secret_resolved(&self, secret: String) {
        let secret = secret.trim().to_string();
        if secret.is_empty() {
            warn!("Ignoring empty pay secret");
            return;
        }
        let library_ready = {
            let mut state = self.inner.state.borrow_mut();
            if state.secret_timed_out {
                warn!("Ignoring pay secret that arrived after the timeout");
                return;
            }
            if state.initialized_secret.as_deref() == Some(secret.as_str()) {
                debug!("Pay request already initialized for this secret");
                return;
            }
            state.configuration = state.configuration.with_pay_secret(&secret);
            state.flags.library_ready
        };
        if library_ready {
            self.init_pay_request().await;
        } else {
            debug!("Pay secret stored, waiting for library");
        }
    }

    fn on_secret_timed_out(&self) {
        let waiting = {
            let state = self.inner.state.borrow();
            !state.configuration.has_pay_secret()
                && matches!(state.phase, Phase::LibraryLoading | Phase::SecretPending)
        };
        if !waiting {
            return;
        }
        self.toast(SECRET_TIMEOUT_MESSAGE);
        self.update(|s| {
            s.secret_timed_out = true;
            s.flags.loading = false;
            s.flags.fetching_pay_secret = false;
            s.transition(Phase::Failed);
        });
    }

    /// Create the SDK instance and load the pay request for the current secret.
    async fn init_pay_request(&self) {
        let live_mode = self.live_mode();
        let (secret, attempt) = self.update(|s| {
            s.flags.reset_for_request();
            s.attempt += 1;
            s.initialized_secret = Some(s.configuration.pay_secret.clone());
            s.form = None;
            s.sdk = None;
            s.transition(Phase::RequestInitializing);
            (s.configuration.pay_secret.clone(), s.attempt)
        });

        let sdk = match self.inner.ports.sdk_factory.create(live_mode) {
            Ok(sdk) => sdk,
            Err(e) => return self.fail_request(&WidgetError::Sdk(e)),
        };
        self.inner.state.borrow_mut().sdk = Some(sdk.clone());

        info!("Initializing pay request (live_mode={})", live_mode);
        let result = sdk.init(&secret).await;
        if !self.is_current(attempt) {
            debug!("Discarding stale pay request init");
            return;
        }
        if let Err(e) = result {
            return self.fail_request(&WidgetError::Sdk(e));
        }

        self.inner.ports.view.clear_mount_point(self.inner.settings.mount_id());
        self.update(|s| {
            s.flags.pay_request_ready = true;
            s.transition(Phase::FormMounting);
        });
        self.init_pay_form(attempt).await;
    }

    fn fail_request(&self, err: &WidgetError) {
        error!("Pay request initialization failed: {}", err);
        self.toast(&err.to_string());
        self.update(|s| {
            s.flags.loading = false;
            s.transition(Phase::Failed);
        });
    }

    async fn init_pay_form(&self, attempt: u64) {
        let sdk = {
            let mut state = self.inner.state.borrow_mut();
            if !state.flags.can_mount_form() {
                debug!("Skipping form mount: {:?}", state.flags);
                return;
            }
            state.flags.pay_form_ready = false;
            state.flags.submitting = false;
            state.sdk.clone()
        };

        let settings = &self.inner.settings;
        if !self.inner.ports.view.clear_mount_point(settings.mount_id()) {
            return self.fail_mount(&WidgetError::MountPointMissing(settings.mount_selector.clone()));
        }
        let Some(sdk) = sdk else {
            return self.fail_mount(&WidgetError::NoSdkInstance);
        };

        let configuration = self.configuration();
        let created = sdk.create_pay_form(&configuration).await;
        if !self.is_current(attempt) {
            debug!("Discarding stale pay form");
            return;
        }
        let mut form = match created {
            Ok(form) => form,
            Err(e) => return self.fail_mount(&WidgetError::Sdk(e)),
        };

        let sender = self.sender();
        let sink: WalletSink = Rc::new(move |event| sender.send(Event::Wallet(event)));
        if let Err(e) = form.set_wallet_listeners(sink) {
            return self.fail_mount(&WidgetError::Sdk(e));
        }
        if let Err(e) = form.inject(&settings.mount_selector) {
            return self.fail_mount(&WidgetError::Sdk(e));
        }

        info!("Pay form mounted into {}", settings.mount_selector);
        self.update(|s| {
            s.form = Some(form);
            s.flags.pay_form_ready = true;
            s.flags.loading = false;
            s.transition(Phase::AwaitingSubmission);
        });
    }

    fn fail_mount(&self, err: &WidgetError) {
        error!("Pay form mount failed: {}", err);
        self.toast(&err.to_string());
        self.update(|s| {
            s.flags.loading = false;
            s.transition(Phase::Failed);
        });
    }

    async fn submit_pay_form(&self) {
        let (sdk, attempt) = {
            let state = self.inner.state.borrow();
            if !state.flags.can_submit() {
                debug!("Submit ignored in phase {} ({:?})", state.phase, state.flags);
                return;
            }
            match state.sdk.clone() {
                Some(sdk) => (sdk, state.attempt),
                None => return,
            }
        };

        self.update(|s| {
            s.last_error = None;
            s.flags.submitting = true;
            s.flags.loading = true;
            s.transition(Phase::Submitting);
        });

        let submitted = sdk.submit_pay().await;
        if !self.is_current(attempt) {
            debug!("Discarding stale submit result");
            return;
        }
        if let Err(e) = submitted {
            return self.report_payment_failure(WidgetError::Sdk(e));
        }

        if let Err(e) = self.get_payment_result(attempt).await {
            self.report_payment_failure(e);
        }
    }

    /// Fetch the pay request and relay success to the host.
    async fn get_payment_result(&self, attempt: u64) -> WidgetResult<()> {
        if self.flags().pay_complete {
            debug!("Payment already reported to host");
            return Ok(());
        }
        let sdk = self.update(|s| {
            s.transition(Phase::ResultPolling);
            s.sdk.clone()
        });
        let sdk = sdk.ok_or(WidgetError::NoSdkInstance)?;

        let fetched = sdk.fetch_pay_request().await;
        if !self.is_current(attempt) {
            return Err(WidgetError::Cancelled);
        }
        let request = fetched?;
        if !request.status.is_success() {
            return Err(WidgetError::PaymentNotSuccessful(request.status.to_string()));
        }

        if self.flags().pay_complete {
            return Ok(());
        }
        info!("Payment succeeded");
        let message = BridgeMessage::success(self.inner.settings.effective_bridge_payload(), &request);
        if let Err(e) = message.to_wire().and_then(|wire| self.inner.ports.bridge.post_message(&wire)) {
            error!("Failed to notify host: {}", e);
            self.toast(&e.to_string());
        }
        self.update(|s| {
            s.flags.pay_complete = true;
            s.flags.submitting = false;
            s.flags.loading = false;
            s.flags.submitting_overlay = false;
            s.transition(Phase::Complete);
        });
        Ok(())
    }

    fn report_payment_failure(&self, err: WidgetError) {
        match err {
            WidgetError::Cancelled => return,
            WidgetError::Sdk(e) if e.is_ignorable_validation() => {
                debug!("Validation error shown inline: {}", e.message);
            }
            WidgetError::Sdk(e) => {
                self.toast(&e.to_string());
                if e.error_type.is_some() {
                    self.inner.state.borrow_mut().last_error = Some(e);
                }
            }
            other => self.toast(&other.to_string()),
        }
        self.update(|s| {
            s.flags.submitting = false;
            s.flags.loading = false;
            s.flags.submitting_overlay = false;
            // A mounted form stays usable for another attempt
            let next = if s.flags.pay_form_ready { Phase::AwaitingSubmission } else { Phase::Failed };
            s.transition(next);
        });
    }

    async fn on_wallet_event(&self, event: WalletEvent) {
        let (form_ready, attempt) = {
            let state = self.inner.state.borrow();
            (state.flags.pay_form_ready, state.attempt)
        };
        if !form_ready {
            warn!("Ignoring wallet event without a mounted form: {:?}", event);
            return;
        }
        match event {
            WalletEvent::Begin(kind) => {
                info!("Wallet payment started: {:?}", kind);
                self.update(|s| s.flags.submitting_overlay = true);
            }
            WalletEvent::Cancelled(kind) => {
                info!("Wallet payment cancelled: {:?}", kind);
                self.update(|s| s.flags.submitting_overlay = false);
            }
            WalletEvent::Complete(kind, Some(e)) => {
                warn!("Wallet payment failed: {:?}", kind);
                self.toast(&e.to_string());
                self.update(|s| s.flags.submitting_overlay = false);
            }
            WalletEvent::Complete(kind, None) => {
                info!("Wallet payment completed: {:?}", kind);
                if let Err(e) = self.get_payment_result(attempt).await {
                    self.report_payment_failure(e);
                }
            }
        }
    }

    fn teardown(&self) {
        info!("Tearing down payment widget");
        self.inner.lifetime.cancel();
        let mut state = self.inner.state.borrow_mut();
        state.form = None;
        state.sdk = None;
    }
}
