//! clicker-core: game-state engine and progress sync for the clicker game.
//!
//! Leaf-first: `economy` and `achievement` are pure rules, `engine` applies
//! them to a `GameState`, `session` serializes every mutation through one
//! task, and `scheduler`, `auth`, `sync` and `runtime` drive that session.

pub mod achievement;
pub mod auth;
pub mod catalog;
pub mod command;
pub mod config;
pub mod economy;
pub mod engine;
pub mod error;
pub mod event;
pub mod hooks;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod state;
pub mod store;
pub mod sync;
pub mod types;
