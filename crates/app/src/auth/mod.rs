//! Sessions
//!
//! Authentication happens outside the storefront; callers hand in an explicit [`Session`].

use storefront::ids::TypedUuid;
use thiserror::Error;

/// User marker
#[derive(Debug)]
pub struct User;

/// User UUID
pub type UserUuid = TypedUuid<User>;

/// What an authenticated user may do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Shops and checks out their own cart
    Customer,

    /// Also manages promotions and order fulfilment
    Admin,
}

/// Who is making a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Session {
    /// No signed-in user
    Anonymous,

    /// A signed-in user
    Authenticated {
        /// Signed-in user
        user: UserUuid,

        /// Their role
        role: Role,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("sign in to continue")]
    Unauthenticated,

    #[error("admin access required")]
    Forbidden,
}

impl Session {
    /// Session for a customer.
    #[must_use]
    pub fn customer(user: UserUuid) -> Self {
        Self::Authenticated {
            user,
            role: Role::Customer,
        }
    }

    /// Session for an administrator.
    #[must_use]
    pub fn admin(user: UserUuid) -> Self {
        Self::Authenticated {
            user,
            role: Role::Admin,
        }
    }

    /// Signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<UserUuid> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated { user, .. } => Some(*user),
        }
    }

    /// The signed-in user.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthenticated`] for anonymous sessions.
    pub fn require_user(&self) -> Result<UserUuid, AuthError> {
        self.user().ok_or(AuthError::Unauthenticated)
    }

    /// The signed-in administrator.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthenticated`] for anonymous sessions and [`AuthError::Forbidden`]
    /// for customers.
    pub fn require_admin(&self) -> Result<UserUuid, AuthError> {
        match self {
            Self::Anonymous => Err(AuthError::Unauthenticated),
            Self::Authenticated {
                role: Role::Customer,
                ..
            } => Err(AuthError::Forbidden),
            Self::Authenticated {
                user,
                role: Role::Admin,
            } => Ok(*user),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_sessions_have_no_user() {
        assert_eq!(Session::Anonymous.user(), None);
        assert_eq!(
            Session::Anonymous.require_user(),
            Err(AuthError::Unauthenticated)
        );
    }

    #[test]
    fn customers_are_not_admins() {
        let user = UserUuid::new();

        assert_eq!(Session::customer(user).require_user(), Ok(user));
        assert_eq!(
            Session::customer(user).require_admin(),
            Err(AuthError::Forbidden)
        );
        assert_eq!(Session::admin(user).require_admin(), Ok(user));
    }
}
