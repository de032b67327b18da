//! Request context carrying the caller's identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use marquee_core::error::AppError;
use marquee_core::result::AppResult;
use marquee_core::types::id::CustomerId;

/// Context for the current request.
///
/// Extracted by the (out-of-scope) transport layer and passed into service
/// methods so that every operation knows *who* is acting. Authentication
/// mechanics live outside the booking core; here a caller either carries a
/// verified customer identity or does not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The authenticated customer's ID, if any.
    pub customer_id: Option<CustomerId>,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context for an authenticated customer.
    pub fn authenticated(customer_id: CustomerId) -> Self {
        Self {
            customer_id: Some(customer_id),
            request_time: Utc::now(),
        }
    }

    /// Creates a context with no caller identity.
    pub fn anonymous() -> Self {
        Self {
            customer_id: None,
            request_time: Utc::now(),
        }
    }

    /// Returns the authenticated customer or an authentication error.
    pub fn require_customer(&self) -> AppResult<CustomerId> {
        self.customer_id
            .ok_or_else(|| AppError::authentication("Please sign in to book or manage tickets"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marquee_core::error::ErrorKind;

    #[test]
    fn test_require_customer() {
        let customer = CustomerId::new();
        assert_eq!(
            RequestContext::authenticated(customer)
                .require_customer()
                .unwrap(),
            customer
        );

        let err = RequestContext::anonymous().require_customer().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }
}
