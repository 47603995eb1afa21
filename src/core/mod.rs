pub mod config;
pub mod morphology;
pub mod orthography;
pub mod pipeline;
pub mod syntax;
