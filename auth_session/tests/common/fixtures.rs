use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use auth_session::{
    AuthSessionStore, ClientConnection, Clock, InMemoryAuthSessionStore, Realm,
    RouteSuffixEncoder, SessionServices, TokenCodec,
};

pub const START: i64 = 1_700_000_000;

/// A clock the test moves by hand.
#[derive(Debug)]
pub struct ManualClock(AtomicI64);

impl ManualClock {
    pub fn new(now: i64) -> Self {
        Self(AtomicI64::new(now))
    }

    pub fn advance(&self, seconds: i64) {
        self.0.fetch_add(seconds, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// One cluster node: its own route, sharing the store and signing key with
/// every other node.
pub struct Node {
    pub services: SessionServices,
    pub clock: Arc<ManualClock>,
}

pub struct Cluster {
    pub store: Arc<dyn AuthSessionStore>,
    pub clock: Arc<ManualClock>,
}

impl Cluster {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryAuthSessionStore::new()),
            clock: Arc::new(ManualClock::new(START)),
        }
    }

    pub fn node(&self, route: Option<&str>) -> Node {
        let services = SessionServices::new(
            self.store.clone(),
            Arc::new(RouteSuffixEncoder::new(route.map(str::to_string))),
            TokenCodec::new(b"integration-secret"),
            self.clock.clone(),
        );
        Node {
            services,
            clock: self.clock.clone(),
        }
    }
}

pub fn test_realm() -> Realm {
    Realm::new("integration")
}

pub fn remote_client() -> ClientConnection {
    ClientConnection::new(Some(IpAddr::V4(Ipv4Addr::new(198, 51, 100, 20))))
}
