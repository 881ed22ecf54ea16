//! API route handlers

pub mod health;
pub mod matches;
pub mod participants;
pub mod tournaments;
