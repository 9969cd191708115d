use std::collections::HashMap;
use std::sync::Arc;

use auth_session::{Realm, SessionServices};

use super::config::realms_from_env;

/// Router state: the shared session services and the realms being served.
#[derive(Clone)]
pub struct AuthSessionState {
    pub services: SessionServices,
    realms: Arc<HashMap<String, Realm>>,
}

impl AuthSessionState {
    pub fn new(services: SessionServices, realms: impl IntoIterator<Item = Realm>) -> Self {
        let realms = realms
            .into_iter()
            .map(|realm| (realm.name.clone(), realm))
            .collect();
        Self {
            services,
            realms: Arc::new(realms),
        }
    }

    /// State serving the realms named by `AUTH_SESSION_REALMS`.
    pub fn from_env(services: SessionServices) -> Self {
        Self::new(services, realms_from_env())
    }

    pub fn realm(&self, name: &str) -> Option<&Realm> {
        self.realms.get(name)
    }

    pub fn realms(&self) -> impl Iterator<Item = &Realm> {
        self.realms.values()
    }
}
