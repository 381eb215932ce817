use crate::core::pipeline::Page;
use crate::core::{FavoriteSet, Notice, NoticeLevel, UserSession};
use crate::domain::forms::TIME_SLOTS;
use crate::utils::error::{CatalogError, Result};
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Csv,
}

pub fn render_page(page: &Page, format: OutputFormat, favorites: &FavoriteSet) -> Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(page, favorites)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(page)?),
        OutputFormat::Csv => render_csv(page, favorites),
    }
}

fn render_table(page: &Page, favorites: &FavoriteSet) -> String {
    if page.items.is_empty() {
        return "No psychologists to show.\n".to_string();
    }

    let mut out = format!("Sorted by: {}\n\n", page.mode);
    for (index, record) in page.items.iter().enumerate() {
        let heart = if favorites.contains(record.identity()) {
            "♥"
        } else {
            " "
        };
        let _ = writeln!(
            out,
            "{:>2}. {} {}  ★ {:.2}  ${}/h  [{}]",
            index + 1,
            heart,
            record.name,
            record.rating_score(),
            record.hourly_rate(),
            record.identity()
        );
        if !record.specialization.is_empty() {
            let _ = writeln!(out, "      {} · {}", record.specialization, record.experience);
        }
    }

    let _ = writeln!(out, "\nShowing {} of {}", page.items.len(), page.total);
    if page.has_more {
        out.push_str("More available: pass --more to load more\n");
    }
    out
}

fn render_csv(page: &Page, favorites: &FavoriteSet) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "identity",
        "name",
        "price_per_hour",
        "rating",
        "experience",
        "specialization",
        "favorite",
    ])?;

    for record in &page.items {
        writer.write_record([
            record.identity().to_string(),
            record.name.clone(),
            record.hourly_rate().to_string(),
            record.rating_score().to_string(),
            record.experience.clone(),
            record.specialization.clone(),
            favorites.contains(record.identity()).to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CatalogError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| CatalogError::ConfigError {
        message: format!("CSV output is not UTF-8: {}", e),
    })
}

pub fn render_notice(notice: &Notice) -> String {
    let marker = match notice.level {
        NoticeLevel::Success => "✅",
        NoticeLevel::Error => "❌",
        NoticeLevel::Info => "ℹ️ ",
    };
    format!("{} {}", marker, notice.message)
}

pub fn render_session(session: Option<&UserSession>) -> String {
    match session {
        Some(session) => format!(
            "[{}] {} <{}>",
            session.initial(),
            session.display_name.as_deref().unwrap_or("Unnamed"),
            session.email.as_deref().unwrap_or("no email")
        ),
        None => "Not signed in".to_string(),
    }
}

pub fn render_slots() -> String {
    TIME_SLOTS.join("\n")
}
