//! Confinement integration for GPUI.
//!
//! This module keeps one confinement in GPUI's context:
//!
//! - [`GlobalConfinement`]: stored as a GPUI `Global`. It owns the
//!   [`MemoryHistory`] host and the [`GuardController`] mounted on it.
//!
//! - [`Confinement`]: static methods (`Confinement::navigate`,
//!   `Confinement::back`, …) that read/write the `GlobalConfinement`
//!   through `cx` and refresh windows afterwards.
//!
//! # Initialization
//!
//! ```ignore
//! use nav_confine::{init_confinement, ConfinementConfig, MemoryHistory};
//!
//! init_confinement(cx, &ConfinementConfig::new("/flow/{id}"), MemoryHistory::new("/flow/abc"))?;
//! ```

use crate::config::ConfinementConfig;
use crate::controller::{GuardController, GuardPhase};
use crate::error::{ConfigError, NavigationResult};
use crate::history::{Correction, MemoryHistory, NavigationHost};
use crate::location::Location;
use crate::state::GuardState;
use crate::{debug_log, info_log, warn_log};
use gpui::{App, BorrowAppContext, Global};

// ============================================================================
// GlobalConfinement
// ============================================================================

/// A mounted confinement and the host it guards.
pub struct GlobalConfinement {
    host: MemoryHistory,
    controller: Option<GuardController>,
}

impl Global for GlobalConfinement {}

impl GlobalConfinement {
    /// Mount `config` on `host`.
    pub fn new(config: &ConfinementConfig, mut host: MemoryHistory) -> Result<Self, ConfigError> {
        let controller = GuardController::mount(config, &mut host)?;
        Ok(Self {
            host,
            controller: Some(controller),
        })
    }

    /// The guarded host.
    pub fn host(&self) -> &MemoryHistory {
        &self.host
    }

    /// Mutable access to the host, e.g. to simulate native navigation.
    pub fn host_mut(&mut self) -> &mut MemoryHistory {
        &mut self.host
    }

    /// `None` once torn down.
    pub fn controller(&self) -> Option<&GuardController> {
        self.controller.as_ref()
    }

    /// The visible path of the host.
    pub fn current_path(&self) -> &str {
        self.host.current_path()
    }

    /// Phase of the visible location. [`GuardPhase::Free`] after teardown.
    pub fn phase(&self) -> GuardPhase {
        self.controller
            .as_ref()
            .map_or(GuardPhase::Free, |controller| {
                controller.phase(self.host.current_path())
            })
    }

    /// Run the controller's safety net against the host.
    pub fn reconcile(&mut self) -> Correction {
        let Self { host, controller } = self;
        let Some(controller) = controller.as_ref() else {
            return Correction::Accept;
        };
        match host.history() {
            Some(history) => controller.reconcile(history),
            None => Correction::Accept,
        }
    }

    /// Unmount the controller. The host keeps working unguarded.
    pub fn teardown(&mut self) {
        if let Some(controller) = self.controller.take() {
            info_log!("Tearing down confinement at '{}'", self.host.current_path());
            controller.unmount();
        }
    }
}

impl std::fmt::Debug for GlobalConfinement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlobalConfinement")
            .field("host", &self.host)
            .field("controller", &self.controller)
            .finish()
    }
}

// ============================================================================
// init_confinement
// ============================================================================

/// Mount `config` on `host` and store it as the global confinement.
///
/// A confinement already stored is torn down and replaced.
pub fn init_confinement(
    cx: &mut App,
    config: &ConfinementConfig,
    host: MemoryHistory,
) -> Result<(), ConfigError> {
    let confinement = GlobalConfinement::new(config, host)?;
    if cx.has_global::<GlobalConfinement>() {
        cx.update_global::<GlobalConfinement, _>(|previous, _| previous.teardown());
    }
    cx.set_global(confinement);
    Ok(())
}

/// Run the safety net of the global confinement, if there is one.
pub fn reconcile_global(cx: &mut App) -> Correction {
    if !cx.has_global::<GlobalConfinement>() {
        return Correction::Accept;
    }
    cx.update_global::<GlobalConfinement, _>(|confinement, _| confinement.reconcile())
}

// ============================================================================
// Confinement
// ============================================================================

/// Navigation API over the global confinement.
///
/// In-app navigation (`navigate`, `replace`) is vetoed when it would leave
/// the confinement. `back`, `forward` and `external_push` behave like the
/// platform's own controls and are corrected after the fact.
///
/// # Example
///
/// ```ignore
/// use nav_confine::Confinement;
///
/// Confinement::navigate(cx, "/flow/def");
/// Confinement::back(cx);
/// ```
pub struct Confinement;

impl Confinement {
    /// In-app navigation to `path`.
    pub fn navigate(cx: &mut App, path: impl Into<Location>) -> NavigationResult {
        let path = path.into();
        debug_log!("Confinement::navigate: '{}'", path);
        Self::update(cx, |host| host.navigate(path))
    }

    /// In-app replacement of the current entry.
    pub fn replace(cx: &mut App, path: impl Into<Location>) -> NavigationResult {
        let path = path.into();
        Self::update(cx, |host| host.redirect(path))
    }

    /// Native back button.
    pub fn back(cx: &mut App) -> NavigationResult {
        Self::update(cx, MemoryHistory::back)
    }

    /// Native forward button.
    pub fn forward(cx: &mut App) -> NavigationResult {
        Self::update(cx, MemoryHistory::forward)
    }

    /// A location change the router did not mediate, such as an edited address.
    pub fn external_push(cx: &mut App, path: impl Into<Location>) -> NavigationResult {
        let path = path.into();
        Self::update(cx, |host| host.external_push(path))
    }

    /// Get current path.
    pub fn current_path(cx: &App) -> String {
        cx.try_global::<GlobalConfinement>()
            .map(|confinement| confinement.current_path().to_string())
            .unwrap_or_default()
    }

    /// Phase of the visible location.
    pub fn phase(cx: &App) -> GuardPhase {
        cx.try_global::<GlobalConfinement>()
            .map_or(GuardPhase::Free, GlobalConfinement::phase)
    }

    /// Snapshot of the guard state, if a confinement is mounted.
    pub fn state(cx: &App) -> Option<GuardState> {
        cx.try_global::<GlobalConfinement>()
            .and_then(GlobalConfinement::controller)
            .map(GuardController::state)
    }

    /// Unmount the global confinement.
    pub fn teardown(cx: &mut App) {
        if cx.has_global::<GlobalConfinement>() {
            cx.update_global::<GlobalConfinement, _>(|confinement, _| confinement.teardown());
            cx.refresh_windows();
        }
    }

    fn update(
        cx: &mut App,
        f: impl FnOnce(&mut MemoryHistory) -> NavigationResult,
    ) -> NavigationResult {
        if !cx.has_global::<GlobalConfinement>() {
            warn_log!("No confinement initialized; call init_confinement first");
            return NavigationResult::Unchanged;
        }
        let result = cx.update_global::<GlobalConfinement, _>(|confinement, _| f(confinement.host_mut()));
        cx.refresh_windows();
        result
    }
}
