pub mod actions;
pub mod analysis;
pub mod catalog;
mod cli;
pub mod completion;
mod config;
mod entry;
mod handlers;
pub mod hover;
pub mod navigation;
mod state;
mod text;
pub mod utils;

pub use entry::run;
