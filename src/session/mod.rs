//! Navigation/session state machine.
//!
//! `SessionState` is the single source of truth for "what is on screen" and
//! "how did we get here". All transitions are pure (no I/O); the coordinator
//! owns the only mutable instance and publishes bus events for the side
//! effects (scroll reset, teardown calls) the transitions report.

use serde::Serialize;

use crate::models::{ClientAccount, PlanTier, Principal, StaffUser};

mod screen;

pub use screen::{NavParams, NavTarget, Screen};

/// Result of a navigation transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    /// The screen changed; the viewport scroll must be reset.
    Changed,
    /// No-op: the requested screen was already displayed.
    Unchanged,
}

impl NavOutcome {
    pub fn changed(self) -> bool {
        matches!(self, NavOutcome::Changed)
    }
}

/// Serializable snapshot of the session for the UI shell.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub screen: Screen,
    pub history: Vec<Screen>,
    pub params: Option<NavParams>,
    pub staff: Option<StaffUser>,
    pub client: Option<ClientAccount>,
    pub selected_plan: Option<PlanTier>,
    pub auth_loading: bool,
}

/// The session state machine. Created at application start on the home
/// screen with empty history; mutated only through the transition methods.
#[derive(Debug, Clone)]
pub struct SessionState {
    screen: Screen,
    history: Vec<Screen>,
    params: Option<NavParams>,
    staff: Option<StaffUser>,
    client: Option<ClientAccount>,
    selected_plan: Option<PlanTier>,
    /// True while the auth provider is still resolving the stored session;
    /// the anonymous-on-gated-screen redirect must not fire before this
    /// settles, or a page refresh would bounce a logged-in user home.
    auth_loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            screen: Screen::Home,
            history: Vec::new(),
            params: None,
            staff: None,
            client: None,
            selected_plan: None,
            auth_loading: true,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn history(&self) -> &[Screen] {
        &self.history
    }

    pub fn params(&self) -> Option<&NavParams> {
        self.params.as_ref()
    }

    pub fn selected_plan(&self) -> Option<PlanTier> {
        self.selected_plan
    }

    pub fn staff(&self) -> Option<&StaffUser> {
        self.staff.as_ref()
    }

    pub fn client(&self) -> Option<&ClientAccount> {
        self.client.as_ref()
    }

    /// The active principal, if any. At most one slot is ever occupied.
    pub fn principal(&self) -> Option<Principal> {
        if let Some(staff) = &self.staff {
            Some(Principal::Staff(staff.clone()))
        } else {
            self.client.clone().map(Principal::Client)
        }
    }

    pub fn auth_loading(&self) -> bool {
        self.auth_loading
    }

    pub fn set_auth_loading(&mut self, loading: bool) {
        self.auth_loading = loading;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            screen: self.screen,
            history: self.history.clone(),
            params: self.params.clone(),
            staff: self.staff.clone(),
            client: self.client.clone(),
            selected_plan: self.selected_plan,
            auth_loading: self.auth_loading,
        }
    }

    /// Navigate to a target screen.
    ///
    /// Navigating to the currently displayed screen is a no-op: no history
    /// push, no scroll reset. Otherwise the current screen is pushed onto
    /// history before switching, so the top of history is always the screen
    /// the user came from.
    ///
    /// The upgrade pseudo-target selects the default upsell plan and routes
    /// to payment; the plan literal lives in [`PlanTier::DEFAULT_UPSELL`]
    /// so call sites never duplicate it.
    pub fn navigate(&mut self, target: NavTarget, params: Option<NavParams>) -> NavOutcome {
        let (screen, params) = match target {
            NavTarget::Screen(screen) => (screen, params),
            NavTarget::UpgradeToBusinessPlan => {
                // Plan selection is part of the rewrite, not the screen
                // switch: it applies even when already on payment.
                let plan = PlanTier::DEFAULT_UPSELL;
                self.selected_plan = Some(plan);
                (Screen::Payment, Some(NavParams::Payment { plan }))
            }
        };

        if screen == self.screen {
            return NavOutcome::Unchanged;
        }

        self.history.push(self.screen);
        self.screen = screen;
        self.params = params;
        NavOutcome::Changed
    }

    /// Pop the last history entry and return to it. With empty history this
    /// falls back to the home screen without growing the stack; it never
    /// panics.
    pub fn go_back(&mut self) -> NavOutcome {
        match self.history.pop() {
            Some(previous) => {
                self.screen = previous;
                self.params = None;
                NavOutcome::Changed
            }
            None => {
                if self.screen == Screen::Home {
                    return NavOutcome::Unchanged;
                }
                self.screen = Screen::Home;
                self.params = None;
                NavOutcome::Changed
            }
        }
    }

    /// Apply the role-based redirect rules after a principal change.
    ///
    /// Redirects fire only from entry screens (or, for the logged-out case,
    /// gated screens); a principal change mid-checkout or mid-scheduling
    /// leaves the user where they are.
    pub fn sync_principal(&mut self) -> NavOutcome {
        if self.staff.is_some() && self.screen.is_entry() {
            self.navigate(NavTarget::Screen(Screen::Dashboard), None)
        } else if self.client.is_some() && self.screen.is_entry() {
            self.navigate(NavTarget::Screen(Screen::ClientApp), None)
        } else if self.staff.is_none()
            && self.client.is_none()
            && !self.auth_loading
            && self.screen.is_gated()
        {
            self.navigate(NavTarget::Screen(Screen::Home), None)
        } else {
            NavOutcome::Unchanged
        }
    }

    /// Handle a successful login: classify the principal, occupy exactly one
    /// slot, clear history and land on the role's home screen.
    pub fn on_login_success(&mut self, principal: Principal) -> Screen {
        self.auth_loading = false;
        self.history.clear();
        self.params = None;
        match principal {
            Principal::Client(account) => {
                self.staff = None;
                self.client = Some(account);
                self.screen = Screen::ClientApp;
            }
            Principal::Staff(user) => {
                self.client = None;
                self.staff = Some(user);
                self.screen = Screen::Dashboard;
            }
        }
        self.screen
    }

    /// Handle logout: clear both principal slots and return to the home
    /// screen with a fresh history. The provider teardown call is the
    /// coordinator's job.
    pub fn on_logout(&mut self) -> NavOutcome {
        self.staff = None;
        self.client = None;
        self.auth_loading = false;
        self.history.clear();
        self.params = None;
        if self.screen == Screen::Home {
            NavOutcome::Unchanged
        } else {
            self.screen = Screen::Home;
            NavOutcome::Changed
        }
    }

    /// Replace the principal slots without navigating. Used when a stored
    /// session is restored at startup; the caller follows up with
    /// [`Self::sync_principal`] so the redirect rules decide whether to
    /// move.
    pub fn set_principal(&mut self, principal: Option<Principal>) {
        match principal {
            Some(Principal::Staff(user)) => {
                self.client = None;
                self.staff = Some(user);
            }
            Some(Principal::Client(account)) => {
                self.staff = None;
                self.client = Some(account);
            }
            None => {
                self.staff = None;
                self.client = None;
            }
        }
    }

    /// Pre-select a plan for the payment screen (used by pricing call
    /// sites before routing to checkout).
    pub fn select_plan(&mut self, plan: PlanTier) {
        self.selected_plan = Some(plan);
    }
}
