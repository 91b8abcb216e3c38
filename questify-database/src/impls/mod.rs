pub mod calendar;
pub mod characters;
pub mod oauth_state;
pub mod quests;
pub mod tasks;
pub mod users;
