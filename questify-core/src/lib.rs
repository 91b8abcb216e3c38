use std::sync::Arc;

use questify_database::Database;
use questify_oauth::OAuthService;
use questify_progression::{AccountStore, ProgressionEngine};

/// State shared by every request handler.
#[derive(Clone)]
pub struct Data {
    pub db: Database,
    pub accounts: Arc<dyn AccountStore>,
    pub engine: ProgressionEngine,
    pub oauth: OAuthService,
}

pub type AppState = Arc<Data>;
