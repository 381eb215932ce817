pub mod favorites;
pub mod listing;
pub mod pipeline;
pub mod session;

pub use crate::domain::model::{
    CatalogRecord, FavoriteSet, Notice, NoticeLevel, SortMode, Toggle, UserSession, VisibleWindow,
};
pub use crate::domain::ports::{AuthProvider, ConfigProvider, FavoriteStore, RecordSource, Storage};
pub use crate::utils::error::Result;
