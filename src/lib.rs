pub mod card;
pub mod cli;
pub mod config;
pub mod dom;
pub mod engine;
pub mod extract;
pub mod net;

// Simplified/Traditional text toggle, independent of card resolution
pub mod convert;
