use serde::{Deserialize, Serialize};
use sqlx::prelude::Type;
use uuid::Uuid;

pub mod handler;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "media_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    /// Classify an upload by its declared content type.
    pub fn from_content_type(content_type: Option<&str>) -> Self {
        match content_type {
            Some(ct) if ct.starts_with("image/") => MediaType::Image,
            _ => MediaType::Video,
        }
    }
}

#[derive(Debug, Serialize, sqlx::FromRow)]
pub struct MediaResponse {
    pub media_type: MediaType,
    pub file_path: String,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub user: String,
    pub content: String,
    pub created_at: String,
    pub media: Vec<MediaResponse>,
}

#[derive(Debug, Deserialize)]
pub struct EditContentForm {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub page: Option<String>,
}

pub fn format_timestamp(dt: chrono::DateTime<chrono::Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Fixed-size pagination over a descending feed.
///
/// Page selection is forgiving: a page value that is not an integer falls
/// back to the first page, and a value outside the valid range clamps to the
/// last page. There is always at least one page, possibly empty.
#[derive(Debug, PartialEq, Eq)]
pub struct Pager {
    pub page: i64,
    pub pages: i64,
    pub offset: i64,
}

impl Pager {
    pub const PAGE_SIZE: i64 = 10;

    pub fn locate(total: i64, requested: Option<&str>) -> Self {
        let pages = (total.max(1) + Self::PAGE_SIZE - 1) / Self::PAGE_SIZE;

        let page = match requested.and_then(|raw| raw.parse::<i64>().ok()) {
            None => 1,
            Some(n) if n < 1 || n > pages => pages,
            Some(n) => n,
        };

        Pager {
            page,
            pages,
            offset: (page - 1) * Self::PAGE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn image_content_types_map_to_image() {
        assert_eq!(
            MediaType::from_content_type(Some("image/png")),
            MediaType::Image
        );
        assert_eq!(
            MediaType::from_content_type(Some("image/jpeg")),
            MediaType::Image
        );
    }

    #[test]
    fn everything_else_maps_to_video() {
        assert_eq!(
            MediaType::from_content_type(Some("video/mp4")),
            MediaType::Video
        );
        assert_eq!(
            MediaType::from_content_type(Some("application/pdf")),
            MediaType::Video
        );
        assert_eq!(MediaType::from_content_type(None), MediaType::Video);
    }

    #[test]
    fn empty_feed_still_has_one_page() {
        let pager = Pager::locate(0, None);
        assert_eq!(pager, Pager { page: 1, pages: 1, offset: 0 });
    }

    #[test]
    fn fifteen_items_split_ten_and_five() {
        assert_eq!(Pager::locate(15, Some("1")).offset, 0);
        let second = Pager::locate(15, Some("2"));
        assert_eq!(second.page, 2);
        assert_eq!(second.pages, 2);
        assert_eq!(second.offset, 10);
    }

    #[test]
    fn non_integer_page_falls_back_to_first() {
        let pager = Pager::locate(15, Some("abc"));
        assert_eq!(pager.page, 1);
    }

    #[test]
    fn out_of_range_page_clamps_to_last() {
        assert_eq!(Pager::locate(15, Some("99")).page, 2);
        assert_eq!(Pager::locate(15, Some("0")).page, 2);
        assert_eq!(Pager::locate(15, Some("-3")).page, 2);
    }

    #[test]
    fn timestamps_render_without_timezone_suffix() {
        let dt = chrono::Utc.with_ymd_and_hms(2024, 3, 11, 9, 30, 5).unwrap();
        assert_eq!(format_timestamp(dt), "2024-03-11 09:30:05");
    }
}
