use serde::{Deserialize, Serialize};

use questify_progression::Character;

/// Public identity returned by signup and login.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    pub id: i64,
    pub email: String,
    pub display_name: String,
}

/// Identity plus the stored bcrypt hash, used only for credential checks.
#[derive(Clone, Debug)]
pub struct UserCredentials {
    pub identity: UserIdentity,
    pub pass_hash: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub display_name: String,
    pub user_class: Option<String>,
    pub guild_rank: Option<String>,
    pub guild_streak: i64,
    pub diamonds: i64,
    pub last_rollover: Option<String>,
    #[serde(flatten)]
    pub character: Character,
}
