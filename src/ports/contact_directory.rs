//! Contact directory port - identity lookup by phone number.

use async_trait::async_trait;

use crate::domain::admission::KnownContact;
use crate::domain::foundation::DomainError;

/// Looks up who a phone number belongs to.
#[async_trait]
pub trait ContactDirectory: Send + Sync {
    /// Guardian rows are checked first, then student contact rows
    /// (`mobile` or `mobile2`).
    async fn lookup(&self, phone: &str) -> Result<Option<KnownContact>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contact_directory_is_object_safe() {
        fn _accepts_dyn(_dir: &dyn ContactDirectory) {}
    }
}
