/// Pure parser helpers.
pub mod parse;
/// PKCE verifier/challenge and state token generation.
pub mod pkce;
/// Shared time helpers.
pub mod time;
