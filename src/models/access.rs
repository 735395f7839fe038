//! Roles held by identities and capabilities required by routes.

/// Role granted to a configured identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Any authenticated caller.
    User,
    /// May mutate storage.
    Admin,
}

/// What a route demands of the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    /// No credentials required.
    Public,
    /// Valid credentials, any role.
    Authenticated,
    /// Valid credentials with the admin role.
    Admin,
}

impl Role {
    /// Whether this role satisfies a capability requirement.
    pub fn grants(self, capability: Capability) -> bool {
        match capability {
            Capability::Public | Capability::Authenticated => true,
            Capability::Admin => self == Role::Admin,
        }
    }
}
