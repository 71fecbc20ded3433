/// The boolean "is logged in" signal checkout entry consults.
/// Unauthenticated users are turned away before a session exists.
pub trait AuthGate: Send + Sync {
    fn is_authenticated(&self) -> bool;
}

/// Fixed-answer gate for tests and the demo binary.
pub struct StaticAuthGate {
    authenticated: bool,
}

impl StaticAuthGate {
    pub fn new(authenticated: bool) -> Self {
        Self { authenticated }
    }
}

impl AuthGate for StaticAuthGate {
    fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}
