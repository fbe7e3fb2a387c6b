use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Login,
    Register,
    Dashboard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEvent {
    RequestRegister,
    RequestLogin,
    RegistrationSucceeded,
    LoginSucceeded,
    Logout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidTransition {
    pub from: View,
    pub event: ViewEvent,
}

impl fmt::Display for InvalidTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} is not allowed from the {:?} view", self.event, self.from)
    }
}

impl std::error::Error for InvalidTransition {}

impl View {
    pub fn transition(self, event: ViewEvent) -> Result<View, InvalidTransition> {
        use ViewEvent::*;

        match (self, event) {
            (View::Login, RequestRegister) => Ok(View::Register),
            (View::Register, RequestLogin | RegistrationSucceeded) => Ok(View::Login),
            (View::Login, LoginSucceeded) => Ok(View::Dashboard),
            (View::Dashboard, Logout) => Ok(View::Login),
            (from, event) => Err(InvalidTransition { from, event }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            View::Login => "login",
            View::Register => "register",
            View::Dashboard => "dashboard",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_login() {
        assert_eq!(View::default(), View::Login);
    }

    #[test]
    fn allowed_transitions() {
        assert_eq!(View::Login.transition(ViewEvent::RequestRegister), Ok(View::Register));
        assert_eq!(View::Register.transition(ViewEvent::RequestLogin), Ok(View::Login));
        assert_eq!(
            View::Register.transition(ViewEvent::RegistrationSucceeded),
            Ok(View::Login)
        );
        assert_eq!(View::Login.transition(ViewEvent::LoginSucceeded), Ok(View::Dashboard));
        assert_eq!(View::Dashboard.transition(ViewEvent::Logout), Ok(View::Login));
    }

    #[test]
    fn everything_else_is_rejected() {
        let rejected = [
            (View::Login, ViewEvent::Logout),
            (View::Login, ViewEvent::RequestLogin),
            (View::Login, ViewEvent::RegistrationSucceeded),
            (View::Register, ViewEvent::LoginSucceeded),
            (View::Register, ViewEvent::Logout),
            (View::Dashboard, ViewEvent::RequestRegister),
            (View::Dashboard, ViewEvent::LoginSucceeded),
        ];
        for (from, event) in rejected {
            assert_eq!(from.transition(event), Err(InvalidTransition { from, event }));
        }
    }
}
