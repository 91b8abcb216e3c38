pub mod calendar;
pub mod oauth;
pub mod quest;
pub mod task;
pub mod user;
