//! Screen routes and the signed-in guard.

use crate::session::Session;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Donate,
    Donations,
    DonationDetail(String),
    VolunteerSignup,
    Tasks,
    Emergency,
    UrgentDonations,
    Map,
}

impl Route {
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let route = match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["donate"] => Route::Donate,
            ["donations"] => Route::Donations,
            ["donations", id] => Route::DonationDetail((*id).to_string()),
            ["volunteer", "signup"] => Route::VolunteerSignup,
            ["volunteer", "tasks"] => Route::Tasks,
            ["emergency"] => Route::Emergency,
            ["urgent-donations"] => Route::UrgentDonations,
            ["map"] => Route::Map,
            _ => return None,
        };
        Some(route)
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Donate => "/donate".to_string(),
            Route::Donations => "/donations".to_string(),
            Route::DonationDetail(id) => format!("/donations/{}", id),
            Route::VolunteerSignup => "/volunteer/signup".to_string(),
            Route::Tasks => "/volunteer/tasks".to_string(),
            Route::Emergency => "/emergency".to_string(),
            Route::UrgentDonations => "/urgent-donations".to_string(),
            Route::Map => "/map".to_string(),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Route::Home => "Home",
            Route::Login => "Login",
            Route::Donate => "Create Food Donation",
            Route::Donations => "Food Donations",
            Route::DonationDetail(_) => "Donation",
            Route::VolunteerSignup => "Volunteer Registration",
            Route::Tasks => "Task Assignment",
            Route::Emergency => "Emergency Mode",
            Route::UrgentDonations => "Urgent Donations",
            Route::Map => "Donation Map",
        }
    }

    pub fn requires_auth(&self) -> bool {
        !matches!(self, Route::Home | Route::Login)
    }
}

/// Protected routes without a credential land on the login screen.
pub fn guard(route: Route, session: &Session) -> Route {
    if route.requires_auth() && !session.is_authenticated() {
        log::debug!("Redirecting {} to login", route.path());
        Route::Login
    } else {
        route
    }
}

/// Navigation entries for the header.
pub fn navbar(session: &Session) -> Vec<Route> {
    if session.is_authenticated() {
        vec![Route::Donations, Route::Tasks, Route::Emergency]
    } else {
        vec![Route::Login]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryTokenStore;
    use std::sync::Arc;

    fn session(token: Option<&str>) -> Session {
        let store = token.map(MemoryTokenStore::with_token).unwrap_or_default();
        Session::restore(Arc::new(store)).unwrap()
    }

    #[test]
    fn paths_round_trip() {
        for route in [
            Route::Home,
            Route::Login,
            Route::Donate,
            Route::Donations,
            Route::DonationDetail("65f0c1".into()),
            Route::VolunteerSignup,
            Route::Tasks,
            Route::Emergency,
            Route::UrgentDonations,
            Route::Map,
        ] {
            assert_eq!(Route::parse(&route.path()), Some(route));
        }
        assert_eq!(Route::parse("/donations/abc?tab=map"), Some(Route::DonationDetail("abc".into())));
        assert_eq!(Route::parse("/nowhere"), None);
    }

    #[test]
    fn guard_redirects_without_credential() {
        let anon = session(None);
        assert_eq!(guard(Route::Emergency, &anon), Route::Login);
        assert_eq!(guard(Route::Home, &anon), Route::Home);

        let signed_in = session(Some("t"));
        assert_eq!(guard(Route::Emergency, &signed_in), Route::Emergency);
    }

    #[test]
    fn navbar_depends_on_presence() {
        assert_eq!(navbar(&session(None)), vec![Route::Login]);
        assert_eq!(
            navbar(&session(Some("t"))),
            vec![Route::Donations, Route::Tasks, Route::Emergency]
        );
    }
}
