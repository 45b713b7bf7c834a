//! Lifecycle controller
//!
//! Owns all state for one visit and sequences auth, consent, launch and the
//! usage timer. Every input returns the events the rendering layer must apply.

use chrono::{DateTime, Local};
use cvm_api::{
    AuthMode, AuthRequest, Credential, Endpoint, LAUNCH_FAILURE_MESSAGE, LifecyclePhase,
    Notification, ScreenLayout, SessionDescriptor,
};
use cvm_config::Settings;
use cvm_host_api::{AccountBackend, EmbedSdk, SdkEvent, SessionBackend};
use cvm_store::{CredentialStore, PersistedCredential, save_account_grant};
use cvm_util::{CvmError, Result, VisitId, format_countdown};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::{
    EndpointSelector, LaunchConfig, LaunchedSession, LifecycleEvent, Presentation, SessionLauncher,
    TickSource, TimerEvent, TimerState, UsageTimer, credential_from, quota_for, resolve,
};

const MISSING_FIELDS_MESSAGE: &str = "Please fill in both fields.";

/// External collaborators the controller talks to
#[derive(Clone)]
pub struct Collaborators {
    pub store: Arc<dyn CredentialStore>,
    pub account: Arc<dyn AccountBackend>,
    pub session: Arc<dyn SessionBackend>,
    pub sdk: Arc<dyn EmbedSdk>,
}

/// The session lifecycle state machine
pub struct LifecycleController {
    visit: VisitId,
    settings: Settings,
    store: Arc<dyn CredentialStore>,
    account: Arc<dyn AccountBackend>,
    launcher: SessionLauncher,
    selector: EndpointSelector,
    phase: LifecyclePhase,
    auth_mode: AuthMode,
    credential: Option<Credential>,
    consent_acknowledged: bool,
    launch_started: bool,
    unload_guard: bool,
    session: Option<LaunchedSession>,
    timer: Option<UsageTimer>,
    layout: ScreenLayout,
    active_seconds: u64,
    black_screen_prompted: bool,
}

impl LifecycleController {
    /// Create a controller in `Unauthenticated`
    ///
    /// Fails with a configuration error when an endpoint list has no
    /// selected entry.
    pub fn new(settings: Settings, collaborators: Collaborators) -> Result<Self> {
        let selector = EndpointSelector::new(settings.endpoints_for(false).to_vec());
        selector.current()?;
        EndpointSelector::new(settings.endpoints_for(true).to_vec()).current()?;

        let launcher = SessionLauncher::new(
            collaborators.session,
            collaborators.sdk,
            LaunchConfig::from_settings(&settings.session),
        );
        let visit = VisitId::new();

        info!(
            visit = %visit,
            endpoint_count = selector.list().len(),
            strategy = ?settings.session.launch_strategy,
            "Lifecycle controller initialized"
        );

        Ok(Self {
            visit,
            settings,
            store: collaborators.store,
            account: collaborators.account,
            launcher,
            selector,
            phase: LifecyclePhase::Unauthenticated,
            auth_mode: AuthMode::default(),
            credential: None,
            consent_acknowledged: false,
            launch_started: false,
            unload_guard: false,
            session: None,
            timer: None,
            layout: ScreenLayout::windowed(),
            active_seconds: 0,
            black_screen_prompted: false,
        })
    }

    pub fn visit_id(&self) -> VisitId {
        self.visit
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    pub fn auth_mode(&self) -> AuthMode {
        self.auth_mode
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        self.selector.list()
    }

    pub fn selected_endpoint(&self) -> Option<&Endpoint> {
        self.selector.current().ok()
    }

    pub fn can_confirm(&self) -> bool {
        self.phase == LifecyclePhase::AwaitingConsent
            && self.consent_acknowledged
            && !self.launch_started
    }

    pub fn descriptor(&self) -> Option<&SessionDescriptor> {
        self.session.as_ref().map(|s| &s.descriptor)
    }

    pub fn timer_state(&self) -> Option<TimerState> {
        self.timer.as_ref().map(|t| *t.state())
    }

    pub fn timer_running(&self) -> bool {
        self.timer.as_ref().is_some_and(UsageTimer::is_running)
    }

    pub fn layout(&self) -> ScreenLayout {
        self.layout
    }

    pub fn unload_guard_installed(&self) -> bool {
        self.unload_guard
    }

    /// Theme and greeting, resolved from the store on every call
    pub fn presentation(&self, now: &DateTime<Local>) -> Presentation {
        let persisted = self.load_persisted();
        Presentation::for_entitlement(resolve(&persisted), persisted.username.as_deref(), now)
    }

    /// Diagnostic stream of the live view; available once per session
    pub fn take_sdk_events(&mut self) -> Option<mpsc::UnboundedReceiver<SdkEvent>> {
        self.session.as_mut().and_then(|s| s.handle.take_events())
    }

    /// Skip the auth UI when a token was persisted by an earlier visit
    pub fn boot(&mut self) -> Vec<LifecycleEvent> {
        let mut events = Vec::new();
        if self.phase != LifecyclePhase::Unauthenticated {
            return events;
        }

        let persisted = self.load_persisted();
        if persisted.has_token() {
            info!(visit = %self.visit, "Resuming with persisted credential");
            self.finish_auth(credential_from(&persisted), &mut events);
        }
        events
    }

    /// Continue without an account
    pub fn enter_as_guest(&mut self) -> Vec<LifecycleEvent> {
        let mut events = Vec::new();
        if self.phase != LifecyclePhase::Unauthenticated {
            debug!(visit = %self.visit, phase = ?self.phase, "Ignoring guest entry");
            return events;
        }

        info!(visit = %self.visit, "Entering as guest");
        self.finish_auth(Credential::guest(), &mut events);
        events
    }

    /// Switch between login and signup
    pub fn toggle_auth_mode(&mut self) -> Vec<LifecycleEvent> {
        if self.phase != LifecyclePhase::Unauthenticated {
            return Vec::new();
        }
        self.auth_mode = self.auth_mode.toggled();
        debug!(visit = %self.visit, mode = ?self.auth_mode, "Auth mode toggled");
        vec![LifecycleEvent::AuthModeChanged {
            mode: self.auth_mode,
        }]
    }

    /// Submit the auth form in the current mode
    pub async fn submit_credentials(
        &mut self,
        identifier: &str,
        secret: &str,
    ) -> Vec<LifecycleEvent> {
        let mut events = Vec::new();
        if self.phase != LifecyclePhase::Unauthenticated {
            debug!(visit = %self.visit, phase = ?self.phase, "Ignoring credential submission");
            return events;
        }

        let identifier = identifier.trim();
        let missing = identifier.is_empty()
            || (self.auth_mode == AuthMode::Signup && secret.is_empty());
        if missing {
            events.push(LifecycleEvent::Notify(Notification::AuthError {
                message: MISSING_FIELDS_MESSAGE.to_string(),
            }));
            return events;
        }

        let mode = self.auth_mode;
        self.transition(LifecyclePhase::Authenticating, &mut events);

        let request = AuthRequest {
            username: identifier.to_string(),
            password: secret.to_string(),
        };
        let granted = match self.account.authenticate(mode, &request).await {
            Ok(response) => {
                let username = response
                    .username
                    .as_deref()
                    .filter(|name| !name.is_empty())
                    .unwrap_or(identifier)
                    .to_string();
                save_account_grant(
                    self.store.as_ref(),
                    &response.token,
                    &username,
                    response.premium,
                )
                .map_err(CvmError::from)
            }
            Err(e) => Err(e),
        };

        match granted {
            Ok(()) => {
                info!(visit = %self.visit, mode = ?mode, username = %identifier, "Authenticated");
                let credential = credential_from(&self.load_persisted());
                self.finish_auth(credential, &mut events);
            }
            Err(e) => {
                warn!(visit = %self.visit, mode = ?mode, error = %e, "Authentication failed");
                self.transition(LifecyclePhase::Unauthenticated, &mut events);
                events.push(LifecycleEvent::Notify(Notification::AuthError {
                    message: e.auth_message(),
                }));
            }
        }
        events
    }

    /// Consent checkbox changed
    pub fn set_consent_acknowledged(&mut self, acknowledged: bool) -> Vec<LifecycleEvent> {
        if self.phase != LifecyclePhase::AwaitingConsent || self.launch_started {
            return Vec::new();
        }
        self.consent_acknowledged = acknowledged;
        vec![LifecycleEvent::ConsentChanged {
            can_confirm: self.can_confirm(),
        }]
    }

    /// Select the endpoint the next launch will use
    pub fn select_endpoint(&mut self, url: &str) -> Vec<LifecycleEvent> {
        if self.phase.is_terminal() {
            debug!(visit = %self.visit, phase = ?self.phase, "Ignoring endpoint selection");
            return Vec::new();
        }

        let before = self.selected_endpoint().map(|e| e.url.clone());
        self.selector.select(url);
        let after = self.selected_endpoint().map(|e| e.url.clone());

        match after {
            Some(url) if before.as_deref() != Some(url.as_str()) => {
                vec![LifecycleEvent::EndpointSelected { url }]
            }
            _ => Vec::new(),
        }
    }

    /// Confirm consent and launch. Only the first effective call does anything.
    pub async fn confirm_consent(&mut self) -> Vec<LifecycleEvent> {
        let mut events = Vec::new();
        if self.launch_started || self.phase != LifecyclePhase::AwaitingConsent {
            debug!(visit = %self.visit, phase = ?self.phase, "Ignoring duplicate consent confirm");
            return events;
        }
        if !self.consent_acknowledged {
            debug!(visit = %self.visit, "Consent not acknowledged");
            return events;
        }

        self.launch_started = true;
        events.push(LifecycleEvent::ConsentAccepted);
        self.transition(LifecyclePhase::Launching, &mut events);

        let endpoint = match self.selector.current() {
            Ok(endpoint) => endpoint.clone(),
            Err(e) => {
                self.fail_launch(None, e, &mut events);
                return events;
            }
        };
        events.push(LifecycleEvent::EndpointSelected {
            url: endpoint.url.clone(),
        });

        let credential = self.credential.clone().unwrap_or_else(Credential::guest);
        match self.launcher.launch(&endpoint, &credential).await {
            Ok(launched) => self.activate(launched, &mut events),
            Err(e) => self.fail_launch(Some(&endpoint), e, &mut events),
        }
        events
    }

    /// Apply `elapsed_seconds` of wall-clock time to the running session
    pub fn on_tick(&mut self, elapsed_seconds: u64) -> Vec<LifecycleEvent> {
        let mut events = Vec::new();
        if self.phase != LifecyclePhase::Active {
            return events;
        }
        let Some(timer) = self.timer.as_mut() else {
            return events;
        };

        let mut expired = false;
        for event in timer.advance(elapsed_seconds) {
            match event {
                TimerEvent::Tick { remaining_seconds } => {
                    events.push(LifecycleEvent::TimerText {
                        text: format_countdown(remaining_seconds),
                    });
                }
                TimerEvent::LowTime { remaining_seconds } => {
                    info!(visit = %self.visit, remaining_seconds, "Low time warning");
                    events.push(LifecycleEvent::Notify(Notification::LowTime {
                        remaining_seconds,
                    }));
                }
                TimerEvent::Expired => expired = true,
            }
        }

        if expired {
            self.expire(&mut events);
            return events;
        }

        self.active_seconds += elapsed_seconds;
        if let Some(hint) = self.settings.timer.black_screen_hint_seconds
            && !self.black_screen_prompted
            && self.active_seconds >= hint
        {
            self.black_screen_prompted = true;
            events.push(LifecycleEvent::Notify(Notification::BlackScreenPrompt));
        }
        events
    }

    /// Drive the timer from `ticks` until it stops
    pub async fn run_timer<T, F>(&mut self, ticks: &mut T, mut on_event: F)
    where
        T: TickSource + ?Sized,
        F: FnMut(&LifecycleEvent),
    {
        while self.timer_running() {
            let elapsed = ticks.next_tick().await;
            for event in self.on_tick(elapsed) {
                on_event(&event);
            }
        }
    }

    /// Answer to the black-screen prompt
    pub fn respond_black_screen(&mut self, saw_black_screen: bool) -> Vec<LifecycleEvent> {
        if !self.black_screen_prompted {
            return Vec::new();
        }
        info!(visit = %self.visit, saw_black_screen, "Black screen prompt answered");
        if saw_black_screen {
            vec![LifecycleEvent::Notify(Notification::ConnectivityHelp)]
        } else {
            Vec::new()
        }
    }

    /// Document fullscreen state changed
    pub fn on_fullscreen_changed(&mut self, fullscreen: bool) -> Vec<LifecycleEvent> {
        let layout = if fullscreen {
            ScreenLayout::fullscreen()
        } else {
            ScreenLayout::windowed()
        };
        if layout == self.layout {
            return Vec::new();
        }
        self.layout = layout;
        vec![LifecycleEvent::LayoutChanged(layout)]
    }

    /// Collapse or expand the fullscreen timer
    pub fn toggle_aux_timer(&mut self) -> Vec<LifecycleEvent> {
        if !self.layout.fullscreen {
            return Vec::new();
        }
        self.layout.aux_timer_expanded = !self.layout.aux_timer_expanded;
        vec![LifecycleEvent::LayoutChanged(self.layout)]
    }

    /// Stop the timer without expiring (process shutdown)
    pub fn cancel_timer(&mut self) -> Vec<LifecycleEvent> {
        match self.timer.as_mut() {
            Some(timer) if timer.is_running() => {
                timer.cancel();
                info!(visit = %self.visit, "Usage timer cancelled");
                vec![LifecycleEvent::TimerCancelled]
            }
            _ => Vec::new(),
        }
    }

    fn transition(&mut self, to: LifecyclePhase, events: &mut Vec<LifecycleEvent>) {
        let from = self.phase;
        if from == to {
            return;
        }
        self.phase = to;
        info!(visit = %self.visit, from = ?from, to = ?to, "Phase changed");
        events.push(LifecycleEvent::PhaseChanged { from, to });
    }

    fn load_persisted(&self) -> PersistedCredential {
        PersistedCredential::load(self.store.as_ref()).unwrap_or_else(|e| {
            warn!(visit = %self.visit, error = %e, "Credential store unreadable, continuing as guest");
            PersistedCredential::default()
        })
    }

    fn finish_auth(&mut self, credential: Credential, events: &mut Vec<LifecycleEvent>) {
        if credential.entitlement.is_premium() {
            let mut premium = EndpointSelector::new(self.settings.endpoints_for(true).to_vec());
            if let Ok(current) = self.selector.current() {
                premium.select(&current.url);
            }
            self.selector = premium;
        }

        events.push(LifecycleEvent::Authenticated {
            identifier: credential.identifier.clone(),
            entitlement: credential.entitlement,
        });
        self.credential = Some(credential);

        self.transition(LifecyclePhase::AwaitingConsent, events);
        self.unload_guard = true;
        events.push(LifecycleEvent::UnloadGuardInstalled);

        self.consent_acknowledged = false;
        events.push(LifecycleEvent::ConsentChanged { can_confirm: false });
    }

    fn activate(&mut self, launched: LaunchedSession, events: &mut Vec<LifecycleEvent>) {
        events.push(LifecycleEvent::SessionAttached {
            descriptor: launched.descriptor.clone(),
        });
        self.session = Some(launched);
        self.transition(LifecyclePhase::Active, events);

        let entitlement = resolve(&self.load_persisted());
        let quota = quota_for(entitlement, &self.settings.timer);
        let timer = UsageTimer::start(quota, self.settings.timer.warning_seconds);
        info!(
            visit = %self.visit,
            entitlement = ?entitlement,
            quota_seconds = quota,
            "Usage timer started"
        );

        events.push(LifecycleEvent::TimerStarted {
            quota_seconds: quota,
        });
        events.push(LifecycleEvent::TimerText {
            text: timer.display(),
        });
        self.timer = Some(timer);
        self.active_seconds = 0;
    }

    fn fail_launch(
        &mut self,
        endpoint: Option<&Endpoint>,
        err: CvmError,
        events: &mut Vec<LifecycleEvent>,
    ) {
        error!(
            visit = %self.visit,
            endpoint = endpoint.map(|e| e.url.as_str()),
            error = %err,
            error_detail = ?err,
            "Launch failed"
        );
        self.transition(LifecyclePhase::LaunchFailed, events);
        events.push(LifecycleEvent::Notify(Notification::LaunchFailed {
            message: LAUNCH_FAILURE_MESSAGE.to_string(),
        }));
    }

    fn expire(&mut self, events: &mut Vec<LifecycleEvent>) {
        info!(visit = %self.visit, "Usage quota exhausted");
        events.push(LifecycleEvent::Notify(Notification::SessionEnded));
        self.transition(LifecyclePhase::Expired, events);
        self.session = None;

        self.unload_guard = false;
        events.push(LifecycleEvent::UnloadGuardRemoved);
        events.push(LifecycleEvent::NavigateTo {
            url: self.settings.landing_url().to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ManualTicks;
    use cvm_api::{Entitlement, PREMIUM_KEY, TOKEN_KEY, USERNAME_KEY};
    use cvm_host_api::{MockAccountBackend, MockSdk, MockSessionBackend};
    use cvm_store::{MemoryStore, StoreError, StoreResult};
    use serde_json::json;

    struct Harness {
        store: Arc<MemoryStore>,
        account: Arc<MockAccountBackend>,
        session: Arc<MockSessionBackend>,
        sdk: Arc<MockSdk>,
    }

    impl Harness {
        fn new() -> Self {
            Self::with_store(MemoryStore::new())
        }

        fn with_store(store: MemoryStore) -> Self {
            Self {
                store: Arc::new(store),
                account: Arc::new(MockAccountBackend::granting("tok-1", false)),
                session: Arc::new(MockSessionBackend::responding(
                    json!({ "embed_url": "https://hb.example.net/s/abc" }),
                )),
                sdk: Arc::new(MockSdk::new()),
            }
        }

        fn controller(&self) -> LifecycleController {
            self.controller_with(Settings::default())
        }

        fn controller_with(&self, settings: Settings) -> LifecycleController {
            LifecycleController::new(
                settings,
                Collaborators {
                    store: self.store.clone(),
                    account: self.account.clone(),
                    session: self.session.clone(),
                    sdk: self.sdk.clone(),
                },
            )
            .unwrap()
        }
    }

    fn premium_store() -> MemoryStore {
        MemoryStore::with_values([
            (TOKEN_KEY, "tok-9"),
            (USERNAME_KEY, "alice"),
            (PREMIUM_KEY, "1"),
        ])
    }

    fn count(events: &[LifecycleEvent], wanted: impl Fn(&LifecycleEvent) -> bool) -> usize {
        events.iter().filter(|e| wanted(e)).count()
    }

    async fn launch_as_guest(controller: &mut LifecycleController) -> Vec<LifecycleEvent> {
        controller.enter_as_guest();
        controller.set_consent_acknowledged(true);
        controller.confirm_consent().await
    }

    #[test]
    fn test_new_requires_selected_endpoint() {
        let harness = Harness::new();
        let mut settings = Settings::default();
        for endpoint in &mut settings.endpoints {
            endpoint.is_selected = false;
        }

        let result = LifecycleController::new(
            settings,
            Collaborators {
                store: harness.store.clone(),
                account: harness.account.clone(),
                session: harness.session.clone(),
                sdk: harness.sdk.clone(),
            },
        );
        assert!(matches!(result, Err(CvmError::Configuration(_))));
    }

    #[test]
    fn test_boot_without_token_stays_unauthenticated() {
        let harness = Harness::new();
        let mut controller = harness.controller();

        assert!(controller.boot().is_empty());
        assert_eq!(controller.phase(), LifecyclePhase::Unauthenticated);
        assert!(!controller.unload_guard_installed());
    }

    #[test]
    fn test_boot_with_persisted_token() {
        let harness = Harness::with_store(premium_store());
        let mut controller = harness.controller();

        let events = controller.boot();

        assert_eq!(controller.phase(), LifecyclePhase::AwaitingConsent);
        assert!(controller.unload_guard_installed());
        assert!(events.contains(&LifecycleEvent::Authenticated {
            identifier: "alice".into(),
            entitlement: Entitlement::Premium,
        }));
        assert!(events.contains(&LifecycleEvent::UnloadGuardInstalled));
    }

    #[test]
    fn test_guest_entry() {
        let harness = Harness::new();
        let mut controller = harness.controller();

        let events = controller.enter_as_guest();

        assert_eq!(
            events[1],
            LifecycleEvent::PhaseChanged {
                from: LifecyclePhase::Unauthenticated,
                to: LifecyclePhase::AwaitingConsent,
            }
        );
        assert!(controller.credential().unwrap().is_guest());
        assert!(!controller.can_confirm());

        // Entering twice does nothing
        assert!(controller.enter_as_guest().is_empty());
    }

    #[test]
    fn test_toggle_auth_mode() {
        let harness = Harness::new();
        let mut controller = harness.controller();

        assert_eq!(
            controller.toggle_auth_mode(),
            vec![LifecycleEvent::AuthModeChanged {
                mode: AuthMode::Signup
            }]
        );
        assert_eq!(controller.auth_mode(), AuthMode::Signup);
        controller.toggle_auth_mode();
        assert_eq!(controller.auth_mode(), AuthMode::Login);
    }

    #[tokio::test]
    async fn test_login_persists_grant() {
        let harness = Harness::new();
        harness.account.set_result(Ok(cvm_api::AuthResponse {
            token: "tok-7".into(),
            premium: true,
            username: None,
        }));
        let mut controller = harness.controller();

        let events = controller.submit_credentials("  alice ", "pw").await;

        assert!(events.contains(&LifecycleEvent::PhaseChanged {
            from: LifecyclePhase::Unauthenticated,
            to: LifecyclePhase::Authenticating,
        }));
        assert_eq!(controller.phase(), LifecyclePhase::AwaitingConsent);
        assert_eq!(harness.store.get(TOKEN_KEY).unwrap().as_deref(), Some("tok-7"));
        assert_eq!(harness.store.get(USERNAME_KEY).unwrap().as_deref(), Some("alice"));
        assert_eq!(harness.store.get(PREMIUM_KEY).unwrap().as_deref(), Some("1"));

        let (mode, request) = &harness.account.calls()[0];
        assert_eq!(*mode, AuthMode::Login);
        assert_eq!(request.username, "alice");
        assert_eq!(request.password, "pw");
    }

    #[tokio::test]
    async fn test_login_failure_shows_backend_message() {
        let harness = Harness::new();
        harness.account.set_result(Err(CvmError::Remote {
            status: 401,
            status_text: "Unauthorized".into(),
            message: Some("Invalid credentials".into()),
        }));
        let mut controller = harness.controller();

        let events = controller.submit_credentials("alice", "wrong").await;

        assert_eq!(controller.phase(), LifecyclePhase::Unauthenticated);
        assert_eq!(
            events.last(),
            Some(&LifecycleEvent::Notify(Notification::AuthError {
                message: "Invalid credentials".into()
            }))
        );
        assert_eq!(harness.store.get(TOKEN_KEY).unwrap(), None);
        assert!(!controller.unload_guard_installed());
    }

    /// Store whose writes always fail
    struct ReadOnlyStore(MemoryStore);

    impl CredentialStore for ReadOnlyStore {
        fn get(&self, key: &str) -> StoreResult<Option<String>> {
            self.0.get(key)
        }

        fn set_many(&self, _pairs: &[(&str, &str)]) -> StoreResult<()> {
            Err(StoreError::Database("disk I/O error".into()))
        }
    }

    #[tokio::test]
    async fn test_unpersisted_grant_is_not_resumed() {
        let harness = Harness::new();
        let collaborators = Collaborators {
            store: Arc::new(ReadOnlyStore(MemoryStore::new())),
            account: harness.account.clone(),
            session: harness.session.clone(),
            sdk: harness.sdk.clone(),
        };
        let mut controller =
            LifecycleController::new(Settings::default(), collaborators.clone()).unwrap();

        let events = controller.submit_credentials("alice", "pw").await;

        assert_eq!(controller.phase(), LifecyclePhase::Unauthenticated);
        assert!(!controller.unload_guard_installed());
        assert!(events.contains(&LifecycleEvent::Notify(Notification::AuthError {
            message: "Store error: Database error: disk I/O error".into()
        })));
        assert_eq!(collaborators.store.get(TOKEN_KEY).unwrap(), None);

        // A later visit finds nothing to resume
        let mut next = LifecycleController::new(Settings::default(), collaborators).unwrap();
        assert!(next.boot().is_empty());
        assert_eq!(next.phase(), LifecyclePhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_login_failure_without_message() {
        let harness = Harness::new();
        harness
            .account
            .set_result(Err(CvmError::remote(500, "Internal Server Error")));
        let mut controller = harness.controller();

        let events = controller.submit_credentials("alice", "pw").await;

        assert!(events.contains(&LifecycleEvent::Notify(Notification::AuthError {
            message: "Unknown error".into()
        })));
    }

    #[tokio::test]
    async fn test_signup_requires_both_fields() {
        let harness = Harness::new();
        let mut controller = harness.controller();
        controller.toggle_auth_mode();

        let events = controller.submit_credentials("alice", "").await;

        assert_eq!(
            events,
            vec![LifecycleEvent::Notify(Notification::AuthError {
                message: MISSING_FIELDS_MESSAGE.into()
            })]
        );
        assert!(harness.account.calls().is_empty());
        assert_eq!(controller.phase(), LifecyclePhase::Unauthenticated);
    }

    #[tokio::test]
    async fn test_login_requires_identifier() {
        let harness = Harness::new();
        let mut controller = harness.controller();

        controller.submit_credentials("   ", "pw").await;
        assert!(harness.account.calls().is_empty());

        // Login accepts an empty secret locally
        controller.submit_credentials("alice", "").await;
        assert_eq!(harness.account.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_confirm_requires_acknowledgement() {
        let harness = Harness::new();
        let mut controller = harness.controller();
        controller.enter_as_guest();

        assert!(controller.confirm_consent().await.is_empty());
        assert_eq!(harness.session.call_count(), 0);
        assert_eq!(controller.phase(), LifecyclePhase::AwaitingConsent);

        let events = controller.set_consent_acknowledged(true);
        assert_eq!(events, vec![LifecycleEvent::ConsentChanged { can_confirm: true }]);
    }

    #[tokio::test]
    async fn test_double_confirm_launches_once() {
        let harness = Harness::new();
        let mut controller = harness.controller();
        controller.enter_as_guest();
        controller.set_consent_acknowledged(true);

        let first = controller.confirm_consent().await;
        let second = controller.confirm_consent().await;

        assert!(first.contains(&LifecycleEvent::ConsentAccepted));
        assert!(second.is_empty());
        assert_eq!(harness.session.call_count(), 1);
        assert_eq!(harness.sdk.attached_urls().len(), 1);
        assert_eq!(
            count(&first, |e| matches!(e, LifecycleEvent::TimerStarted { .. })),
            1
        );
    }

    #[tokio::test]
    async fn test_launch_success_starts_free_timer() {
        let harness = Harness::new();
        let mut controller = harness.controller();

        let events = launch_as_guest(&mut controller).await;

        assert_eq!(controller.phase(), LifecyclePhase::Active);
        assert!(events.contains(&LifecycleEvent::TimerStarted { quota_seconds: 1200 }));
        assert!(events.contains(&LifecycleEvent::TimerText {
            text: "20:00".into()
        }));
        assert_eq!(
            controller.descriptor().unwrap().embed_url,
            "https://hb.example.net/s/abc"
        );
        assert!(controller.take_sdk_events().is_some());
        assert!(controller.take_sdk_events().is_none());
    }

    #[tokio::test]
    async fn test_launch_failure_is_terminal() {
        let harness = Harness::new();
        harness
            .session
            .push_response(Err(CvmError::remote(429, "Too Many Requests")));
        let mut controller = harness.controller();

        let events = launch_as_guest(&mut controller).await;

        assert_eq!(controller.phase(), LifecyclePhase::LaunchFailed);
        assert!(events.contains(&LifecycleEvent::Notify(Notification::LaunchFailed {
            message: LAUNCH_FAILURE_MESSAGE.into()
        })));
        assert!(controller.timer_state().is_none());
        assert!(controller.descriptor().is_none());

        // No retry on a second confirm
        assert!(controller.confirm_consent().await.is_empty());
        assert_eq!(harness.session.call_count(), 1);
        assert!(controller.on_tick(1).is_empty());
        assert!(controller.select_endpoint("https://api-1.cvm.rest/").is_empty());
    }

    #[tokio::test]
    async fn test_attach_failure_fails_launch() {
        let harness = Harness::new();
        *harness.sdk.fail_attach.lock().unwrap() = true;
        let mut controller = harness.controller();

        let events = launch_as_guest(&mut controller).await;

        assert_eq!(controller.phase(), LifecyclePhase::LaunchFailed);
        assert!(events.contains(&LifecycleEvent::Notify(Notification::LaunchFailed {
            message: LAUNCH_FAILURE_MESSAGE.into()
        })));
        assert_eq!(
            count(&events, |e| matches!(e, LifecycleEvent::TimerStarted { .. })),
            0
        );
        assert!(controller.timer_state().is_none());
        assert!(controller.descriptor().is_none());
        assert_eq!(harness.session.call_count(), 1);
    }

    #[tokio::test]
    async fn test_quota_fixed_once_active() {
        let harness = Harness::with_store(premium_store());
        let mut controller = harness.controller();
        controller.boot();
        controller.set_consent_acknowledged(true);
        controller.confirm_consent().await;

        // Entitlement drops mid-session
        harness.store.set_many(&[(PREMIUM_KEY, "0")]).unwrap();
        let events = controller.on_tick(1);

        assert_eq!(controller.timer_state().unwrap().remaining_seconds, 2399);
        assert_eq!(events[0], LifecycleEvent::TimerText { text: "39:59".into() });
    }

    #[tokio::test]
    async fn test_malformed_locator_fails_launch() {
        let harness = Harness::new();
        harness
            .session
            .push_response(Ok(json!({ "embed_url": "ftp://x" })));
        let mut controller = harness.controller();

        launch_as_guest(&mut controller).await;

        assert_eq!(controller.phase(), LifecyclePhase::LaunchFailed);
        assert!(harness.sdk.attached_urls().is_empty());
    }

    #[tokio::test]
    async fn test_selected_endpoint_is_used() {
        let harness = Harness::new();
        let mut controller = harness.controller();
        controller.enter_as_guest();

        let events = controller.select_endpoint("https://api-1.cvm.rest/");
        assert_eq!(
            events,
            vec![LifecycleEvent::EndpointSelected {
                url: "https://api-1.cvm.rest/".into()
            }]
        );
        assert!(controller.select_endpoint("https://unknown.example/").is_empty());

        controller.set_consent_acknowledged(true);
        controller.confirm_consent().await;

        assert_eq!(harness.session.calls()[0].0, "https://api-1.cvm.rest/");
    }

    #[tokio::test]
    async fn test_premium_gets_longer_quota_and_premium_endpoints() {
        let harness = Harness::with_store(premium_store());
        let mut settings = Settings::default();
        settings.premium_endpoints = vec![Endpoint {
            url: "https://api-premium.cvm.rest/".into(),
            label: "Premium".into(),
            is_selected: true,
        }];
        let mut controller = harness.controller_with(settings);

        controller.boot();
        assert_eq!(controller.endpoints().len(), 1);
        controller.set_consent_acknowledged(true);
        let events = controller.confirm_consent().await;

        assert!(events.contains(&LifecycleEvent::TimerStarted { quota_seconds: 2400 }));
        assert_eq!(harness.session.calls()[0].0, "https://api-premium.cvm.rest/");
    }

    #[tokio::test]
    async fn test_full_session_expires_once() {
        let harness = Harness::new();
        let mut controller = harness.controller();
        launch_as_guest(&mut controller).await;

        let mut warnings_at = Vec::new();
        let mut navigations_at = Vec::new();
        let mut last_tick_events = Vec::new();

        for tick in 1..=1200u64 {
            let events = controller.on_tick(1);
            for event in &events {
                match event {
                    LifecycleEvent::Notify(Notification::LowTime { remaining_seconds }) => {
                        assert_eq!(*remaining_seconds, 60);
                        warnings_at.push(tick);
                    }
                    LifecycleEvent::NavigateTo { url } => {
                        assert_eq!(url, "https://cvm.rest/");
                        navigations_at.push(tick);
                    }
                    _ => {}
                }
            }
            last_tick_events = events;
        }

        assert_eq!(warnings_at, vec![1140]);
        assert_eq!(navigations_at, vec![1200]);
        assert_eq!(controller.phase(), LifecyclePhase::Expired);
        assert!(!controller.unload_guard_installed());

        // Guard removal immediately precedes navigation
        let n = last_tick_events.len();
        assert_eq!(last_tick_events[n - 2], LifecycleEvent::UnloadGuardRemoved);
        assert!(matches!(last_tick_events[n - 1], LifecycleEvent::NavigateTo { .. }));

        // Nothing after expiry
        assert!(controller.on_tick(1).is_empty());
        let state = controller.timer_state().unwrap();
        assert!(state.expired);
        assert_eq!(state.remaining_seconds, 0);
    }

    #[tokio::test]
    async fn test_run_timer_with_skipped_ticks() {
        let harness = Harness::new();
        let mut settings = Settings::default();
        settings.timer.free_quota_seconds = 70;
        settings.timer.black_screen_hint_seconds = None;
        let mut controller = harness.controller_with(settings);
        launch_as_guest(&mut controller).await;

        let mut ticks = ManualTicks::from_steps([9, 3]);
        let mut seen = Vec::new();
        controller
            .run_timer(&mut ticks, |event| seen.push(event.clone()))
            .await;

        // 70 -> 61 -> 58: the warning lands on the skipped tick
        assert_eq!(
            seen[2],
            LifecycleEvent::Notify(Notification::LowTime {
                remaining_seconds: 58
            })
        );
        assert_eq!(
            count(&seen, |e| matches!(e, LifecycleEvent::Notify(Notification::LowTime { .. }))),
            1
        );
        assert_eq!(
            count(&seen, |e| matches!(e, LifecycleEvent::NavigateTo { .. })),
            1
        );
        assert_eq!(controller.phase(), LifecyclePhase::Expired);
    }

    #[tokio::test]
    async fn test_black_screen_prompt_once() {
        let harness = Harness::new();
        let mut controller = harness.controller();
        launch_as_guest(&mut controller).await;

        let prompt = LifecycleEvent::Notify(Notification::BlackScreenPrompt);
        let mut prompted_at = Vec::new();
        for tick in 1..=20u64 {
            if controller.on_tick(1).contains(&prompt) {
                prompted_at.push(tick);
            }
        }
        assert_eq!(prompted_at, vec![5]);

        assert_eq!(
            controller.respond_black_screen(true),
            vec![LifecycleEvent::Notify(Notification::ConnectivityHelp)]
        );
        assert!(controller.respond_black_screen(false).is_empty());
    }

    #[test]
    fn test_fullscreen_layout() {
        let harness = Harness::new();
        let mut controller = harness.controller();

        assert!(controller.toggle_aux_timer().is_empty());

        let events = controller.on_fullscreen_changed(true);
        assert_eq!(events, vec![LifecycleEvent::LayoutChanged(ScreenLayout::fullscreen())]);
        assert!(!controller.layout().bottom_bar_visible);

        controller.toggle_aux_timer();
        assert!(!controller.layout().aux_timer_expanded);
        assert!(controller.layout().aux_timer_wrapper_visible);

        controller.on_fullscreen_changed(false);
        assert_eq!(controller.layout(), ScreenLayout::windowed());

        // Re-entering always expands
        controller.on_fullscreen_changed(true);
        assert!(controller.layout().aux_timer_expanded);
    }

    #[tokio::test]
    async fn test_cancel_timer() {
        let harness = Harness::new();
        let mut controller = harness.controller();
        launch_as_guest(&mut controller).await;

        assert_eq!(controller.cancel_timer(), vec![LifecycleEvent::TimerCancelled]);
        assert!(controller.cancel_timer().is_empty());
        assert!(controller.on_tick(5).is_empty());
        assert!(!controller.timer_state().unwrap().expired);
        assert_eq!(controller.phase(), LifecyclePhase::Active);
    }

    #[test]
    fn test_presentation_follows_store() {
        use chrono::TimeZone;

        let harness = Harness::with_store(premium_store());
        let controller = harness.controller();
        let morning = Local.with_ymd_and_hms(2026, 5, 2, 9, 0, 0).unwrap();

        let presentation = controller.presentation(&morning);
        assert_eq!(presentation.theme, cvm_api::Theme::Premium);
        assert_eq!(presentation.greeting.as_deref(), Some("Good morning, alice"));
        assert!(presentation.premium_notice);

        harness.store.set_many(&[(PREMIUM_KEY, "0")]).unwrap();
        let presentation = controller.presentation(&morning);
        assert!(presentation.greeting.is_none());
        assert!(!presentation.premium_notice);
    }
}
