// gate.rs — Access gate evaluation.
//
// Every navigation passes through `decide()`, which applies these rules in
// order and stops at the first match:
//
// 1. No session, protected path              → redirect to the entry point
// 2. Session, public-only path               → redirect to the default destination
// 3. Password not changed, not on that page  → redirect to password change
// 4. Onboarding incomplete, not on the
//    onboarding or password-change page      → redirect to onboarding
// 5. Otherwise                               → allow
//
// Rule 3 runs before rule 4: an actor with neither flag set is
// always sent to change their password first.
//
// `decide()` is pure and holds no state, so a flag flip is visible on the
// very next call. `decide_for()` reads the flags itself and fails closed:
// if the lookup fails the flags are treated as unset.

use glob::{MatchOptions, Pattern};
use serde::{Deserialize, Serialize};

use ap_store::{Actor, ActorDirectory};

use crate::config::GateConfig;

/// The gate's answer for one navigation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    Allow,
    Redirect { to: String },
}

impl GateDecision {
    pub fn is_allow(&self) -> bool {
        matches!(self, GateDecision::Allow)
    }
}

impl std::fmt::Display for GateDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateDecision::Allow => write!(f, "allow"),
            GateDecision::Redirect { to } => write!(f, "redirect {}", to),
        }
    }
}

/// How far along onboarding a session is. Each state requires everything
/// the previous one did.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    Unauthenticated,
    PasswordChangeRequired,
    OnboardingRequired,
    Active,
}

impl GateState {
    /// Classify a session (`None` means not signed in).
    pub fn of(session: Option<&Actor>) -> Self {
        match session {
            None => GateState::Unauthenticated,
            Some(actor) if !actor.password_changed => GateState::PasswordChangeRequired,
            Some(actor) if !actor.onboarding_complete => GateState::OnboardingRequired,
            Some(_) => GateState::Active,
        }
    }
}

impl std::fmt::Display for GateState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            GateState::Unauthenticated => "unauthenticated",
            GateState::PasswordChangeRequired => "password_change_required",
            GateState::OnboardingRequired => "onboarding_required",
            GateState::Active => "active",
        };
        f.write_str(label)
    }
}

/// One rule check performed during evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GateStep {
    /// Which rule was checked (e.g. "authentication", "password_change").
    pub check: String,
    /// What it found (e.g. "passed", "redirect: /onboarding").
    pub outcome: String,
    /// Whether this step decided the outcome.
    pub terminal: bool,
}

/// A decision together with the rule checks that produced it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GateTrace {
    pub decision: GateDecision,
    pub state: GateState,
    pub steps: Vec<GateStep>,
}

/// Decides, per navigation, where a session is allowed to go.
#[derive(Debug, Clone, Default)]
pub struct AccessGate {
    config: GateConfig,
}

impl AccessGate {
    pub fn new(config: GateConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Allow or redirect `session` asking for `path`.
    pub fn decide(&self, session: Option<&Actor>, path: &str) -> GateDecision {
        self.decide_with_trace(session, path).decision
    }

    /// Like [`decide`](Self::decide), recording every rule check.
    pub fn decide_with_trace(&self, session: Option<&Actor>, path: &str) -> GateTrace {
        let path = normalize(path);
        let state = GateState::of(session);
        let mut steps = Vec::new();

        let decision = self.evaluate(session, &path, &mut steps);
        tracing::debug!(path = %path, %state, %decision, "gate evaluated");
        GateTrace {
            decision,
            state,
            steps,
        }
    }

    fn evaluate(
        &self,
        session: Option<&Actor>,
        path: &str,
        steps: &mut Vec<GateStep>,
    ) -> GateDecision {
        let public = self.is_public(path);

        // Rule 1
        let actor = match session {
            Some(actor) => {
                steps.push(step("authentication", "passed".to_string(), false));
                actor
            }
            None if public => {
                steps.push(step(
                    "authentication",
                    "anonymous on public path".to_string(),
                    true,
                ));
                return GateDecision::Allow;
            }
            None => return self.redirect(steps, "authentication", &self.config.entry_point),
        };

        // Rule 2
        if public {
            return self.redirect(steps, "public_only", &self.config.default_destination);
        }
        steps.push(step("public_only", "passed".to_string(), false));

        // Rule 3
        let on_password_page = on_surface(path, &self.config.password_change_path);
        if !actor.password_changed && !on_password_page {
            return self.redirect(steps, "password_change", &self.config.password_change_path);
        }
        steps.push(step("password_change", "passed".to_string(), false));

        // Rule 4
        let on_onboarding_page = on_surface(path, &self.config.onboarding_path);
        if !actor.onboarding_complete && !on_onboarding_page && !on_password_page {
            return self.redirect(steps, "onboarding", &self.config.onboarding_path);
        }
        steps.push(step("onboarding", "passed".to_string(), false));

        // Rule 5
        steps.push(step("default", "allow".to_string(), true));
        GateDecision::Allow
    }

    fn redirect(&self, steps: &mut Vec<GateStep>, check: &str, to: &str) -> GateDecision {
        steps.push(step(check, format!("redirect: {}", to), true));
        GateDecision::Redirect { to: to.to_string() }
    }

    fn is_public(&self, path: &str) -> bool {
        if path == normalize(&self.config.entry_point) {
            return true;
        }
        let opts = MatchOptions {
            require_literal_separator: true,
            ..Default::default()
        };
        self.config
            .public_patterns
            .iter()
            .any(|p| Pattern::new(p).map_or(false, |p| p.matches_with(path, opts)))
    }

    /// Look up `actor_id`'s flags and decide. Fails closed on lookup errors.
    pub async fn decide_for(
        &self,
        directory: &dyn ActorDirectory,
        actor_id: Option<&str>,
        path: &str,
    ) -> GateDecision {
        self.trace_for(directory, actor_id, path).await.decision
    }

    /// Like [`decide_for`](Self::decide_for), with the evaluation trace. A
    /// `flag_lookup` step is prepended when the lookup did not succeed.
    pub async fn trace_for(
        &self,
        directory: &dyn ActorDirectory,
        actor_id: Option<&str>,
        path: &str,
    ) -> GateTrace {
        let Some(actor_id) = actor_id else {
            return self.decide_with_trace(None, path);
        };

        let (actor, lookup) = match directory.actor(actor_id).await {
            Ok(Some(actor)) => (Some(actor), None),
            Ok(None) => {
                tracing::warn!(
                    actor_id,
                    "gate: session actor not in directory; treating as signed out"
                );
                (None, Some("unknown actor: treated as unauthenticated".to_string()))
            }
            Err(e) => {
                tracing::warn!(actor_id, "gate: flag lookup failed, failing closed: {}", e);
                // Both requirements unmet.
                (
                    Some(Actor::new(actor_id, "")),
                    Some(format!("failed: {}; flags treated as unset", e)),
                )
            }
        };

        let mut trace = self.decide_with_trace(actor.as_ref(), path);
        if let Some(outcome) = lookup {
            trace.steps.insert(0, step("flag_lookup", outcome, false));
        }
        trace
    }
}

fn step(check: &str, outcome: String, terminal: bool) -> GateStep {
    GateStep {
        check: check.to_string(),
        outcome,
        terminal,
    }
}

/// Drop query string, fragment and trailing slash; the empty path is "/".
fn normalize(path: &str) -> String {
    let end = path.find(|c| c == '?' || c == '#').unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

/// `path` is `surface` or lies beneath it.
fn on_surface(path: &str, surface: &str) -> bool {
    let surface = normalize(surface);
    if path == surface {
        return true;
    }
    surface != "/"
        && path
            .strip_prefix(surface.as_str())
            .map_or(false, |rest| rest.starts_with('/'))
}
