//! Command implementations for hapticctl CLI

pub mod run;

pub use run::RunArgs;
