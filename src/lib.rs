//! Sorts a flat folder of loosely named episodes into a
//! `<library>/<title>/Season N/<title> - SxxEyy.ext` layout that media players
//! pick up without metadata lookups.

pub mod config;
pub mod coordinator;
pub mod episode;
pub mod error;
pub mod rename_engine;
pub mod transfer;
pub mod tui;
