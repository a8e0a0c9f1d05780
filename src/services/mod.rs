// src/services/mod.rs

pub mod admin_invites;
pub mod password;
pub mod token_service;

pub use admin_invites::AdminInviteCodes;
pub use token_service::{AuthContext, TokenService};
