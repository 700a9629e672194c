//! # Portero
//!
//! `portero` is a small registration and login backend. It exposes two JSON
//! endpoints backed by a PostgreSQL `users` table:
//!
//! - `POST /api/register` creates a user. Registering with the `Admin` role
//!   requires the configured admin secret in `adminKey`.
//! - `POST /api/login` checks an email/password pair and returns the public
//!   profile (`name`, `email`, `role`) of the matching user.
//!
//! Passwords are stored as Argon2id PHC strings, never in plain text. Every
//! store failure is logged server-side and answered with a generic message.

pub mod cli;
pub mod portero;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
