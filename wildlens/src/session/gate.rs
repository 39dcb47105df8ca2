//! Authorization gate for role-protected views.
//!
//! A pure decision function with no state. It must be re-evaluated on
//! every navigation; the outcome is never cached.

use super::store::{Role, Session};

/// Outcome of an authorization check for a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// The view may proceed.
    Allow,
    /// No session present: send the visitor to the login view.
    RedirectToLogin,
    /// Authenticated but the wrong role: send the user to their home view.
    /// Never rendered as error text.
    RedirectToDefault,
}

/// Decides whether a view may proceed for the given session and role
/// requirement.
pub fn decide(session: Option<&Session>, required: Option<Role>) -> RouteDecision {
    let Some(session) = session else {
        return RouteDecision::RedirectToLogin;
    };

    match required {
        Some(role) if session.role != role => RouteDecision::RedirectToDefault,
        _ => RouteDecision::Allow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(role: Role) -> Session {
        Session {
            user_id: "u-1".to_string(),
            role,
            token: "tok".to_string(),
        }
    }

    #[test]
    fn absent_session_redirects_to_login() {
        assert_eq!(decide(None, None), RouteDecision::RedirectToLogin);
        assert_eq!(
            decide(None, Some(Role::Admin)),
            RouteDecision::RedirectToLogin
        );
    }

    #[test]
    fn role_mismatch_redirects_to_default() {
        let user = session(Role::User);
        assert_eq!(
            decide(Some(&user), Some(Role::Admin)),
            RouteDecision::RedirectToDefault
        );
    }

    #[test]
    fn matching_role_allows() {
        let admin = session(Role::Admin);
        assert_eq!(decide(Some(&admin), Some(Role::Admin)), RouteDecision::Allow);
    }

    #[test]
    fn no_requirement_allows_any_session() {
        let user = session(Role::User);
        let admin = session(Role::Admin);
        assert_eq!(decide(Some(&user), None), RouteDecision::Allow);
        assert_eq!(decide(Some(&admin), None), RouteDecision::Allow);
    }
}
