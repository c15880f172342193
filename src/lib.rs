pub mod config;
pub mod error;
pub mod game;
pub mod outcome;
pub mod output;
pub mod report;
pub mod runner;
pub mod stats;
