// Application layer: what the CLI commands do, and how their results are printed.

pub mod catalog_app;
pub mod render;
