//! Session slice
//!
//! No action leads back to `Unknown`: once the first session check or
//! login settles the status is either authenticated or not.

use crate::store::actions::{Action, Phase};
use crate::store::state::{AuthState, AuthorizationStatus};

pub fn reduce(state: AuthState, action: &Action) -> AuthState {
    match action {
        Action::CheckAuth(Phase::Fulfilled(user)) | Action::Login(Phase::Fulfilled(user)) => AuthState {
            authorization_status: AuthorizationStatus::Authenticated,
            user: Some(user.clone()),
        },

        Action::CheckAuth(Phase::Rejected(_)) | Action::Login(Phase::Rejected(_)) | Action::Logout => {
            AuthState {
                authorization_status: AuthorizationStatus::Unauthenticated,
                user: None,
            }
        }

        _ => state,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures;

    fn authenticated() -> AuthState {
        AuthState {
            authorization_status: AuthorizationStatus::Authenticated,
            user: Some(fixtures::auth_info()),
        }
    }

    #[test]
    fn test_check_auth_fulfilled() {
        let state = reduce(
            AuthState::default(),
            &Action::CheckAuth(Phase::Fulfilled(fixtures::auth_info())),
        );
        assert_eq!(state, authenticated());
    }

    #[test]
    fn test_check_auth_rejected_after_authenticated() {
        let state = reduce(
            authenticated(),
            &Action::CheckAuth(Phase::Rejected("Server error: 401".to_string())),
        );
        assert_eq!(state.authorization_status, AuthorizationStatus::Unauthenticated);
        assert!(state.user.is_none());
    }

    #[test]
    fn test_login_rejected() {
        let state = reduce(
            AuthState::default(),
            &Action::Login(Phase::Rejected("Incorrect email or password".to_string())),
        );
        assert_eq!(state.authorization_status, AuthorizationStatus::Unauthenticated);
    }

    #[test]
    fn test_logout() {
        let state = reduce(authenticated(), &Action::Logout);
        assert_eq!(state.authorization_status, AuthorizationStatus::Unauthenticated);
        assert!(state.user.is_none());
    }

    #[test]
    fn test_unknown_never_reentered() {
        let actions = [
            Action::CheckAuth(Phase::Pending),
            Action::Login(Phase::Pending),
            Action::CheckAuth(Phase::Aborted),
            Action::Login(Phase::Aborted),
            Action::SetCity("Paris".to_string()),
        ];

        for action in &actions {
            let state = reduce(authenticated(), action);
            assert_eq!(state, authenticated(), "{}", action);

            let signed_out = AuthState {
                authorization_status: AuthorizationStatus::Unauthenticated,
                user: None,
            };
            let state = reduce(signed_out.clone(), action);
            assert_eq!(state, signed_out, "{}", action);
        }
    }
}
