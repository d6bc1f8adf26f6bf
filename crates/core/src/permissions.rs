//! Static access policy.
//!
//! Every request is decided by [`authorize`] from the caller's role (if any),
//! the resource class, whether the caller owns the target and the action.
//! There is no state machine: the same inputs always give the same answer.

use crate::roles::Role;

/// What a request does to a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Read,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn is_read(self) -> bool {
        self == Action::Read
    }
}

/// Resource classes with distinct access rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Categories, genres and titles.
    Catalog,
    /// Reviews and comments, which carry an author.
    Authored,
    /// The admin-only `/users` collection.
    UserAccount,
    /// The caller's own profile at `/users/me`.
    OwnProfile,
}

/// Outcome of a policy decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    /// No credentials were presented and the action needs some.
    Unauthenticated,
    /// Credentials were presented but the role/ownership is insufficient.
    Forbidden,
}

impl Access {
    pub fn is_granted(self) -> bool {
        self == Access::Granted
    }
}

/// Decide whether `caller` may perform `action` on `resource`.
///
/// `is_owner` is only consulted for [`Resource::Authored`]; pass `false`
/// everywhere else.
pub fn authorize(caller: Option<Role>, resource: Resource, is_owner: bool, action: Action) -> Access {
    let role = match (caller, resource, action) {
        (_, Resource::Catalog | Resource::Authored, Action::Read) => return Access::Granted,
        (None, _, _) => return Access::Unauthenticated,
        (Some(role), _, _) => role,
    };

    let allowed = match (resource, action) {
        (Resource::Catalog | Resource::UserAccount, _) => role.is_admin(),
        (Resource::Authored, Action::Create) => true,
        (Resource::Authored, _) => is_owner || role.moderates_content(),
        (Resource::OwnProfile, Action::Read | Action::Update) => true,
        (Resource::OwnProfile, Action::Create | Action::Delete) => false,
    };

    if allowed {
        Access::Granted
    } else {
        Access::Forbidden
    }
}
