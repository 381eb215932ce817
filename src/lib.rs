pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use app::catalog_app::CatalogApp;
pub use config::{cli::LocalStorage, toml_config::TomlConfig};
pub use core::pipeline::{advance, derive, paginate, restrict, sort, ListQuery, Page};
pub use domain::model::{CatalogRecord, FavoriteSet, Notice, SortMode, VisibleWindow};
pub use utils::error::{CatalogError, Result};
