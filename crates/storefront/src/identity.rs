//! Authentication state shared between the identity provider and the cart
//! store.
//!
//! The provider owns the value; any number of [`AuthSignal`]s observe it. A
//! change is only published when the value actually flips.

use tokio::sync::watch;

/// Publishes whether the session has a verified identity.
#[derive(Debug)]
pub struct IdentityProvider {
    tx: watch::Sender<bool>,
}

impl IdentityProvider {
    #[must_use]
    pub fn new(authenticated: bool) -> Self {
        let (tx, _rx) = watch::channel(authenticated);
        Self { tx }
    }

    /// A new observer of the authentication state.
    #[must_use]
    pub fn signal(&self) -> AuthSignal {
        AuthSignal {
            rx: self.tx.subscribe(),
        }
    }

    pub fn sign_in(&self) {
        self.set(true);
    }

    pub fn sign_out(&self) {
        self.set(false);
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        *self.tx.borrow()
    }

    fn set(&self, authenticated: bool) {
        let changed = self.tx.send_if_modified(|current| {
            if *current == authenticated {
                false
            } else {
                *current = authenticated;
                true
            }
        });
        if changed {
            tracing::info!(authenticated, "Authentication state changed");
        }
    }
}

/// Read side of the authentication state.
#[derive(Debug, Clone)]
pub struct AuthSignal {
    rx: watch::Receiver<bool>,
}

impl AuthSignal {
    /// A signal that never changes, for sessions whose identity is fixed up
    /// front (the CLI).
    #[must_use]
    pub fn fixed(authenticated: bool) -> Self {
        let (_tx, rx) = watch::channel(authenticated);
        Self { rx }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait for the next change and return the new value.
    ///
    /// Returns `None` once the provider has been dropped.
    pub async fn changed(&mut self) -> Option<bool> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_signal_observes_sign_in() {
        let provider = IdentityProvider::new(false);
        let mut signal = provider.signal();
        assert!(!signal.is_authenticated());

        provider.sign_in();
        assert_eq!(signal.changed().await, Some(true));
        assert!(signal.is_authenticated());
    }

    #[tokio::test]
    async fn test_repeated_value_is_not_a_change() {
        let provider = IdentityProvider::new(true);
        let mut signal = provider.signal();

        provider.sign_in();
        provider.sign_out();
        assert_eq!(signal.changed().await, Some(false));
    }

    #[tokio::test]
    async fn test_dropped_provider_ends_signal() {
        let provider = IdentityProvider::new(false);
        let mut signal = provider.signal();
        drop(provider);
        assert_eq!(signal.changed().await, None);
    }

    #[test]
    fn test_fixed_signal_keeps_value() {
        assert!(AuthSignal::fixed(true).is_authenticated());
        assert!(!AuthSignal::fixed(false).is_authenticated());
    }
}
