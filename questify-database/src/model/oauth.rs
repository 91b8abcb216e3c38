use serde::{Deserialize, Serialize};

use crate::model::calendar::CalendarProvider;

/// Authorization started but not yet completed, keyed by its state token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAuthorization {
    pub provider: CalendarProvider,
    pub user_id: i64,
    pub verifier: String,
}
