//! Screen enumeration and typed navigation parameters.
//!
//! Screens are a closed set; raw names coming from the UI shell are parsed
//! through [`NavTarget::from_raw`], which fails closed to the home screen
//! instead of panicking on caller error.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::PlanTier;

/// One named, mutually exclusive view of the application.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    Home,
    Login,
    ClientLogin,
    Signup,
    Trial,
    Payment,
    UpdatePaymentMethod,
    ContractSignature,
    Privacy,
    Dashboard,
    ClientApp,
    Scheduling,
    ClientScheduling,
    Cancellation,
}

impl Screen {
    /// Entry screens are reachable anonymously; they are the only screens a
    /// role-based redirect may fire from.
    pub fn is_entry(self) -> bool {
        matches!(
            self,
            Screen::Home | Screen::Login | Screen::ClientLogin | Screen::Signup
        )
    }

    /// Principal-gated screens require an authenticated principal; logout
    /// from one of these forces navigation back home.
    pub fn is_gated(self) -> bool {
        matches!(
            self,
            Screen::Dashboard | Screen::ClientApp | Screen::Scheduling | Screen::ClientScheduling
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Screen::Home => "home",
            Screen::Login => "login",
            Screen::ClientLogin => "client_login",
            Screen::Signup => "signup",
            Screen::Trial => "trial",
            Screen::Payment => "payment",
            Screen::UpdatePaymentMethod => "update_payment_method",
            Screen::ContractSignature => "contract_signature",
            Screen::Privacy => "privacy",
            Screen::Dashboard => "dashboard",
            Screen::ClientApp => "client_app",
            Screen::Scheduling => "scheduling",
            Screen::ClientScheduling => "client_scheduling",
            Screen::Cancellation => "cancellation",
        }
    }
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Typed navigation parameters, keyed by the screen that consumes them.
///
/// Replaces the untyped parameter bag of the legacy client: a screen can only
/// receive the variant it knows how to read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "screen", rename_all = "snake_case")]
pub enum NavParams {
    Scheduling {
        #[serde(default)]
        client_id: Option<i64>,
    },
    ClientScheduling {
        #[serde(default)]
        professional_id: Option<i64>,
    },
    Payment {
        plan: PlanTier,
    },
    Cancellation {
        appointment_id: i64,
    },
}

/// A navigation request target: either a concrete screen or the
/// upgrade-to-a-business-plan pseudo-target, which pre-selects the default
/// upsell plan and routes to payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavTarget {
    Screen(Screen),
    UpgradeToBusinessPlan,
}

impl NavTarget {
    /// Parse a raw screen name from the UI shell.
    ///
    /// Unrecognized names are a caller error; fail closed to home rather
    /// than returning an error the shell cannot act on.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim() {
            "home" => Self::Screen(Screen::Home),
            "login" => Self::Screen(Screen::Login),
            "client_login" => Self::Screen(Screen::ClientLogin),
            "signup" => Self::Screen(Screen::Signup),
            "trial" => Self::Screen(Screen::Trial),
            "payment" => Self::Screen(Screen::Payment),
            "update_payment_method" => Self::Screen(Screen::UpdatePaymentMethod),
            "contract_signature" => Self::Screen(Screen::ContractSignature),
            "privacy" => Self::Screen(Screen::Privacy),
            "dashboard" => Self::Screen(Screen::Dashboard),
            "client_app" => Self::Screen(Screen::ClientApp),
            "scheduling" => Self::Screen(Screen::Scheduling),
            "client_scheduling" => Self::Screen(Screen::ClientScheduling),
            "cancellation" => Self::Screen(Screen::Cancellation),
            "upgrade_to_empresa" => Self::UpgradeToBusinessPlan,
            _ => Self::Screen(Screen::Home),
        }
    }
}
