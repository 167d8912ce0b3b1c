//! Time-based downgrade of unresolved requests.

use chrono::{DateTime, Utc};

use crate::models::RescheduleRequest;

/// A request lapses once its deadline passes while it is still
/// unresolved. Terminal requests never lapse; whatever ended them stands.
pub fn is_expired(request: &RescheduleRequest, now: DateTime<Utc>) -> bool {
    !request.status.is_terminal() && now > request.expires_at
}
