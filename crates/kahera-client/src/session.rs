//! Signed-in cashier session.

use kahera_core::Cashier;

/// Credentials for backend calls plus the cashier at the register.
///
/// Passed explicitly to the backend; nothing reads it from global state.
#[derive(Debug, Clone, Default)]
pub struct Session {
    token: Option<String>,
    cashier: Option<Cashier>,
}

impl Session {
    pub fn new(token: Option<String>) -> Self {
        Session {
            token: token.filter(|t| !t.trim().is_empty()),
            cashier: None,
        }
    }

    /// Attaches the signed-in cashier, used when the backend omits one.
    pub fn with_cashier(mut self, cashier: Cashier) -> Self {
        self.cashier = Some(cashier);
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn cashier(&self) -> Option<&Cashier> {
        self.cashier.as_ref()
    }

    /// `Authorization` header value, if signed in.
    pub fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer() {
        assert_eq!(Session::new(Some("abc".into())).bearer().as_deref(), Some("Bearer abc"));
        assert_eq!(Session::new(Some("  ".into())).bearer(), None);
        assert_eq!(Session::default().bearer(), None);
    }
}
