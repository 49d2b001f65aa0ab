//! Terminal front end for the gallery: text rendering and the browse loop.
pub mod render;
pub mod repl;
