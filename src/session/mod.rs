//! Interactive configuration session.
//!
//! Tracks the interface being viewed, publishes its effective configuration
//! to subscribers and funnels edits through validation and the gateway.
//! Gateway failures never end a session: they degrade it to an empty
//! interface list plus a [`Notice`].

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;

use crate::gateway::{ConfigurationGateway, GatewayError};
use crate::network::{IpConfiguration, LinkProvider};
use crate::reconcile::{ConfigurationState, Reconciler};
use crate::validate::{FormErrors, StaticForm, validate_static_form};

/// A non-fatal condition worth telling the user about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The configuration service refused access; nothing can be listed or changed.
    GatewayUnavailable {
        /// The underlying failure, for display.
        reason: String,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GatewayUnavailable { reason } => {
                write!(f, "Ethernet configuration is unavailable on this device ({reason})")
            }
        }
    }
}

/// A configuration the user asked to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationForm {
    /// Switch to DHCP.
    Dhcp,
    /// Apply the static parameters in the form, after validation.
    Static(StaticForm),
}

/// Why a submission was not applied.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// No interface is selected.
    #[error("No interface selected")]
    NoInterface,

    /// The form failed validation; nothing was written.
    #[error("Invalid configuration: {0}")]
    Invalid(#[source] FormErrors),

    /// The gateway refused or failed the write.
    #[error("Failed to apply configuration: {0}")]
    Gateway(#[source] GatewayError),
}

/// One user's view of the Ethernet configuration.
pub struct Session<G, L> {
    reconciler: Arc<Reconciler<G, L>>,
    interfaces: Vec<String>,
    active: Option<String>,
    state: watch::Sender<ConfigurationState>,
    notices: Vec<Notice>,
}

impl<G, L> Session<G, L>
where
    G: ConfigurationGateway,
    L: LinkProvider,
{
    /// Opens a session, listing interfaces and selecting the first one.
    pub fn open(reconciler: Arc<Reconciler<G, L>>) -> Self {
        let (state, _) = watch::channel(ConfigurationState::Unavailable);
        let mut session = Self {
            reconciler,
            interfaces: Vec::new(),
            active: None,
            state,
            notices: Vec::new(),
        };

        match session.reconciler.list_interfaces() {
            Ok(interfaces) => session.interfaces = interfaces,
            Err(e) => session.degrade(&e),
        }
        tracing::debug!("Available interfaces: {:?}", session.interfaces);

        if let Some(first) = session.interfaces.first().cloned() {
            session.select_interface(&first);
        }
        session
    }

    /// Interfaces that can be selected. Empty when the gateway is unavailable.
    #[must_use]
    pub fn available_interfaces(&self) -> &[String] {
        &self.interfaces
    }

    /// The selected interface, if any.
    #[must_use]
    pub fn active_interface(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// The last published configuration state.
    #[must_use]
    pub fn current(&self) -> ConfigurationState {
        self.state.borrow().clone()
    }

    /// A receiver notified whenever the published state changes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ConfigurationState> {
        self.state.subscribe()
    }

    /// Non-fatal messages collected so far, each reported once.
    #[must_use]
    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Selects `interface` and publishes its effective configuration.
    ///
    /// An interface outside [`available_interfaces`](Self::available_interfaces)
    /// clears the selection and publishes `Unavailable`.
    pub fn select_interface(&mut self, interface: &str) -> ConfigurationState {
        if self.interfaces.iter().any(|known| known == interface) {
            self.active = Some(interface.to_string());
        } else {
            tracing::debug!("Interface {interface} is not available");
            self.active = None;
        }
        self.refresh()
    }

    /// Re-reads the active interface and publishes the result.
    pub fn refresh(&mut self) -> ConfigurationState {
        let state = match self.active.clone() {
            Some(interface) => self.read(&interface),
            None => ConfigurationState::Unavailable,
        };
        self.publish(state)
    }

    /// Validates and applies `form` to the active interface.
    ///
    /// On success the configuration is re-read and published.
    ///
    /// # Errors
    ///
    /// Returns [`SubmitError`] if no interface is selected, the form is
    /// invalid or the gateway write fails. Nothing is published on error,
    /// except that access denial degrades the session and publishes
    /// `Unavailable`.
    pub fn submit(&mut self, form: &ConfigurationForm) -> Result<ConfigurationState, SubmitError> {
        let interface = self.active.clone().ok_or(SubmitError::NoInterface)?;

        let config = match form {
            ConfigurationForm::Dhcp => IpConfiguration::dhcp(),
            ConfigurationForm::Static(form) => {
                validate_static_form(form).map_err(SubmitError::Invalid)?
            }
        };

        if let Err(e) = self.reconciler.apply_configuration(&interface, &config) {
            if e.is_access_denied() {
                self.degrade(&e);
                self.publish(ConfigurationState::Unavailable);
            }
            return Err(SubmitError::Gateway(e));
        }

        Ok(self.refresh())
    }

    fn read(&mut self, interface: &str) -> ConfigurationState {
        match self.reconciler.read_effective_configuration(interface) {
            Ok(state) => state,
            Err(GatewayError::InterfaceNotFound { .. }) => ConfigurationState::Unavailable,
            Err(e) => {
                self.degrade(&e);
                ConfigurationState::Unavailable
            }
        }
    }

    /// Access denial leaves the session with no interfaces; other errors are only logged.
    fn degrade(&mut self, error: &GatewayError) {
        if error.is_access_denied() {
            self.interfaces.clear();
            self.active = None;
            self.notify(Notice::GatewayUnavailable {
                reason: error.to_string(),
            });
        } else {
            tracing::warn!("Configuration service error: {error}");
        }
    }

    fn notify(&mut self, notice: Notice) {
        if self
            .notices
            .iter()
            .any(|existing| std::mem::discriminant(existing) == std::mem::discriminant(&notice))
        {
            return;
        }
        tracing::warn!("{notice}");
        self.notices.push(notice);
    }

    fn publish(&self, state: ConfigurationState) -> ConfigurationState {
        self.state.send_replace(state.clone());
        state
    }
}

impl<G, L> fmt::Debug for Session<G, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("interfaces", &self.interfaces)
            .field("active", &self.active)
            .field("notices", &self.notices)
            .finish_non_exhaustive()
    }
}
