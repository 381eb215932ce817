use crate::core::pipeline::{self, derive, ListQuery, Page};
use crate::core::{CatalogRecord, FavoriteSet, Notice, RecordSource, SortMode, VisibleWindow};
use crate::core::UserSession;
use crate::utils::error::{CatalogError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CatalogOrigin {
    Remote,
    Fallback,
}

/// Records resolved for one view mount.
#[derive(Debug, Clone)]
pub struct CatalogLoad {
    pub records: Vec<CatalogRecord>,
    pub origin: CatalogOrigin,
    pub notice: Option<Notice>,
}

/// Fetches from `source` once; on any failure, or an empty catalog, uses `fallback` instead.
pub async fn load_catalog<S, F>(source: &S, fallback: &F) -> CatalogLoad
where
    S: RecordSource + ?Sized,
    F: RecordSource + ?Sized,
{
    match source.fetch_all().await {
        Ok(records) if !records.is_empty() => {
            tracing::info!("📥 Loaded {} psychologists from the document store", records.len());
            return CatalogLoad {
                records,
                origin: CatalogOrigin::Remote,
                notice: None,
            };
        }
        Ok(_) => tracing::warn!("Document store returned no psychologists, using built-in data"),
        Err(e) => tracing::warn!("⚠️ {} - using built-in data", e),
    }

    let records = fallback.fetch_all().await.unwrap_or_default();
    CatalogLoad {
        records,
        origin: CatalogOrigin::Fallback,
        notice: Some(Notice::info("Showing the offline catalog")),
    }
}

/// The paginated psychologists listing.
#[derive(Debug, Clone)]
pub struct ListingView {
    records: Vec<CatalogRecord>,
    mode: SortMode,
    window: VisibleWindow,
    initial: VisibleWindow,
    step: usize,
}

impl ListingView {
    pub fn new(initial_count: usize, step: usize) -> Self {
        let initial = VisibleWindow::new(initial_count);
        Self {
            records: Vec::new(),
            mode: SortMode::Default,
            window: initial,
            initial,
            step,
        }
    }

    /// Swaps in a new snapshot and resets the window.
    pub fn replace_records(&mut self, records: Vec<CatalogRecord>) {
        self.records = records;
        self.window = self.initial;
    }

    /// Changing the order keeps the current window.
    pub fn set_mode(&mut self, mode: SortMode) {
        self.mode = mode;
    }

    pub fn mode(&self) -> SortMode {
        self.mode
    }

    pub fn window(&self) -> VisibleWindow {
        self.window
    }

    pub fn has_more(&self) -> bool {
        self.window.count < self.records.len()
    }

    /// Shows `step` more records; returns false when everything is already visible.
    pub fn load_more(&mut self) -> bool {
        if !self.has_more() {
            return false;
        }
        self.window = pipeline::advance(self.window, self.step);
        true
    }

    pub fn page(&self) -> Page {
        derive(&self.records, &ListQuery::new(self.mode).windowed(self.window))
    }

    pub fn find(&self, identity: &str) -> Option<&CatalogRecord> {
        self.records.iter().find(|r| r.identity() == identity)
    }
}

impl Default for ListingView {
    fn default() -> Self {
        Self::new(VisibleWindow::INITIAL_COUNT, VisibleWindow::STEP)
    }
}

/// The signed-in user's favorites, sorted but not paginated.
#[derive(Debug, Clone, Default)]
pub struct FavoritesView {
    records: Vec<CatalogRecord>,
    mode: SortMode,
}

impl FavoritesView {
    pub fn new(records: Vec<CatalogRecord>) -> Self {
        Self {
            records,
            mode: SortMode::Default,
        }
    }

    pub fn set_mode(&mut self, mode: SortMode) {
        self.mode = mode;
    }

    pub fn page(&self, session: Option<&UserSession>, favorites: &FavoriteSet) -> Result<Page> {
        if session.is_none() {
            return Err(CatalogError::Unauthenticated);
        }
        Ok(derive(
            &self.records,
            &ListQuery::new(self.mode).restricted_to(favorites),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fallback::BuiltinRecordSource;
    use async_trait::async_trait;

    struct FailingSource;

    #[async_trait]
    impl RecordSource for FailingSource {
        async fn fetch_all(&self) -> Result<Vec<CatalogRecord>> {
            Err(CatalogError::SourceUnavailable {
                message: "connection refused".to_string(),
            })
        }
    }

    struct FixedSource(Vec<CatalogRecord>);

    #[async_trait]
    impl RecordSource for FixedSource {
        async fn fetch_all(&self) -> Result<Vec<CatalogRecord>> {
            Ok(self.0.clone())
        }
    }

    fn session() -> UserSession {
        UserSession {
            uid: "u1".into(),
            email: Some("anna@example.com".into()),
            display_name: Some("Anna".into()),
            id_token: "token".into(),
            refresh_token: None,
            expires_at: None,
        }
    }

    fn builtin() -> Vec<CatalogRecord> {
        BuiltinRecordSource::records()
    }

    #[tokio::test]
    async fn test_load_catalog_falls_back_on_failure() {
        let load = load_catalog(&FailingSource, &BuiltinRecordSource).await;
        assert_eq!(load.origin, CatalogOrigin::Fallback);
        assert_eq!(load.records.len(), 8);
        assert!(load.notice.is_some());
    }

    #[tokio::test]
    async fn test_load_catalog_falls_back_on_empty_catalog() {
        let load = load_catalog(&FixedSource(vec![]), &BuiltinRecordSource).await;
        assert_eq!(load.origin, CatalogOrigin::Fallback);
    }

    #[tokio::test]
    async fn test_load_catalog_prefers_remote() {
        let remote = builtin().into_iter().take(2).collect::<Vec<_>>();
        let load = load_catalog(&FixedSource(remote), &BuiltinRecordSource).await;
        assert_eq!(load.origin, CatalogOrigin::Remote);
        assert_eq!(load.records.len(), 2);
        assert!(load.notice.is_none());
    }

    #[test]
    fn test_listing_load_more_until_exhausted() {
        let mut view = ListingView::default();
        view.replace_records(builtin());

        let page = view.page();
        assert_eq!(page.items.len(), 3);
        assert!(page.has_more);

        assert!(view.load_more());
        assert_eq!(view.page().items.len(), 6);
        assert!(view.load_more());
        let page = view.page();
        assert_eq!(page.items.len(), 8);
        assert!(!page.has_more);
        assert!(!view.load_more());
        assert_eq!(view.window().count, 9);
    }

    #[test]
    fn test_listing_window_resets_on_new_records_only() {
        let mut view = ListingView::default();
        view.replace_records(builtin());
        view.load_more();

        view.set_mode(SortMode::PriceDesc);
        assert_eq!(view.window().count, 6);
        assert_eq!(view.page().items[0].name, "Dr. Michael Carter");

        view.replace_records(builtin());
        assert_eq!(view.window().count, 3);
        assert_eq!(view.mode(), SortMode::PriceDesc);
    }

    #[test]
    fn test_favorites_view_requires_session() {
        let view = FavoritesView::new(builtin());
        let favorites = FavoriteSet::new();
        assert!(matches!(
            view.page(None, &favorites),
            Err(CatalogError::Unauthenticated)
        ));
    }

    #[test]
    fn test_favorites_view_sorts_members_only() {
        let mut view = FavoritesView::new(builtin());
        view.set_mode(SortMode::NameAsc);
        let favorites: FavoriteSet = ["Dr. Sarah Davis", "Dr. John Smith"].into_iter().collect();

        let page = view.page(Some(&session()), &favorites).unwrap();
        let names: Vec<_> = page.items.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Dr. John Smith", "Dr. Sarah Davis"]);
        assert!(!page.has_more);

        let empty = view.page(Some(&session()), &FavoriteSet::new()).unwrap();
        assert!(empty.items.is_empty());
    }
}
