//! Response resolution
//!
//! Turns the decoded `generator=search` body into [`ImageRecord`]s. The
//! interesting path is `query.pages.*.imageinfo[0]`; every field below the
//! container is optional and degrades to a default instead of failing.

use serde_json::Value;
use std::fmt;

use crate::error::{ImagesError, ImagesResult};
use crate::types::ImageRecord;

/// Namespace label prefixed to every file title
const FILE_PREFIX: &str = "File:";

/// Only first image-info entries with this MIME prefix produce records
const IMAGE_MIME_PREFIX: &str = "image/";

/// Why a resolution produced no records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyReason {
    /// The body had no `query.pages` container (the service omits it on zero matches)
    NoSearchContainer,
    /// Pages were returned but none carried a raster image
    NoImages,
}

impl fmt::Display for EmptyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSearchContainer => write!(f, "No images found"),
            Self::NoImages => write!(f, "No raster images among the matched files"),
        }
    }
}

/// Outcome of resolving a well-formed body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(Vec<ImageRecord>),
    Empty(EmptyReason),
}

impl Resolution {
    pub fn records(&self) -> &[ImageRecord] {
        match self {
            Self::Found(records) => records,
            Self::Empty(_) => &[],
        }
    }

    pub fn into_records(self) -> Vec<ImageRecord> {
        match self {
            Self::Found(records) => records,
            Self::Empty(_) => Vec::new(),
        }
    }

    pub fn empty_reason(&self) -> Option<EmptyReason> {
        match self {
            Self::Found(_) => None,
            Self::Empty(reason) => Some(*reason),
        }
    }
}

/// Resolve a decoded response body into image records
///
/// # Errors
///
/// Returns [`ImagesError::MalformedResponse`] if the body is not a JSON
/// object, or if `query.pages` exists but is not an object.
pub fn resolve(raw: &Value) -> ImagesResult<Resolution> {
    let body = raw.as_object().ok_or_else(|| {
        ImagesError::MalformedResponse(format!("expected a JSON object, got {}", type_name(raw)))
    })?;

    let pages = match body.get("query").and_then(|q| q.get("pages")) {
        Some(pages) => pages,
        None => return Ok(Resolution::Empty(EmptyReason::NoSearchContainer)),
    };

    let pages = pages.as_object().ok_or_else(|| {
        ImagesError::MalformedResponse(format!(
            "expected query.pages to be an object, got {}",
            type_name(pages)
        ))
    })?;

    let records: Vec<ImageRecord> = pages.values().filter_map(resolve_page).collect();

    if records.is_empty() {
        Ok(Resolution::Empty(EmptyReason::NoImages))
    } else {
        Ok(Resolution::Found(records))
    }
}

/// A record for one page, or `None` if it has no raster image info
fn resolve_page(page: &Value) -> Option<ImageRecord> {
    // Only the first entry: the service lists the primary rendition first
    let info = page.get("imageinfo")?.as_array()?.first()?;

    let mime = info.get("mime").and_then(Value::as_str)?;
    if !mime.starts_with(IMAGE_MIME_PREFIX) {
        return None;
    }

    let title = page.get("title").and_then(Value::as_str).unwrap_or_default();

    Some(ImageRecord {
        title: strip_namespace(title).to_string(),
        full_url: string_field(info, "url"),
        thumb_url: string_field(info, "thumburl"),
    })
}

fn string_field(info: &Value, key: &str) -> String {
    info.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn strip_namespace(title: &str) -> &str {
    title.strip_prefix(FILE_PREFIX).unwrap_or(title)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn titles(resolution: &Resolution) -> Vec<&str> {
        resolution.records().iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn test_polar_bear_scenario() {
        let raw = json!({"query": {"pages": {"1": {
            "title": "File:Polar_bear.jpg",
            "imageinfo": [{
                "url": "https://x/full.jpg",
                "thumburl": "https://x/thumb.jpg",
                "mime": "image/jpeg"
            }]
        }}}});

        let resolution = resolve(&raw).unwrap();
        assert_eq!(
            resolution,
            Resolution::Found(vec![ImageRecord {
                title: "Polar_bear.jpg".to_string(),
                full_url: "https://x/full.jpg".to_string(),
                thumb_url: "https://x/thumb.jpg".to_string(),
            }])
        );
    }

    #[test]
    fn test_non_image_mime_dropped() {
        let raw = json!({"query": {"pages": {"1": {"imageinfo": [{"mime": "application/pdf"}]}}}});
        let resolution = resolve(&raw).unwrap();
        assert!(resolution.records().is_empty());
        assert_eq!(resolution.empty_reason(), Some(EmptyReason::NoImages));
    }

    #[test]
    fn test_missing_container_is_empty_not_error() {
        let resolution = resolve(&json!({})).unwrap();
        assert_eq!(resolution, Resolution::Empty(EmptyReason::NoSearchContainer));

        let resolution = resolve(&json!({"query": {}})).unwrap();
        assert_eq!(resolution, Resolution::Empty(EmptyReason::NoSearchContainer));

        let resolution = resolve(&json!({"batchcomplete": "", "query": {"searchinfo": {}}})).unwrap();
        assert!(resolution.into_records().is_empty());
    }

    #[test]
    fn test_non_object_body_is_malformed() {
        for raw in [json!([]), json!("nope"), json!(null), json!(42)] {
            let err = resolve(&raw).unwrap_err();
            assert!(matches!(err, ImagesError::MalformedResponse(_)), "{:?}", raw);
        }
    }

    #[test]
    fn test_pages_of_wrong_type_is_malformed() {
        let err = resolve(&json!({"query": {"pages": [1, 2]}})).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_only_first_imageinfo_inspected() {
        let raw = json!({"query": {"pages": {
            "1": {"title": "File:Doc.pdf", "imageinfo": [
                {"mime": "application/pdf", "url": "https://x/doc.pdf"},
                {"mime": "image/png", "url": "https://x/page1.png"}
            ]},
            "2": {"title": "File:Cub.png", "imageinfo": [
                {"mime": "image/png", "url": "https://x/cub.png"},
                {"mime": "application/pdf"}
            ]}
        }}});

        let resolution = resolve(&raw).unwrap();
        assert_eq!(titles(&resolution), vec!["Cub.png"]);
        assert_eq!(resolution.records()[0].full_url, "https://x/cub.png");
    }

    #[test]
    fn test_field_defaults() {
        let raw = json!({"query": {"pages": {"7": {"imageinfo": [{"mime": "image/gif"}]}}}});
        let records = resolve(&raw).unwrap().into_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "");
        assert_eq!(records[0].full_url, "");
        assert_eq!(records[0].thumb_url, "");
    }

    #[test]
    fn test_pages_without_usable_imageinfo_skipped() {
        let raw = json!({"query": {"pages": {
            "1": {"title": "File:NoInfo.jpg"},
            "2": {"title": "File:EmptyInfo.jpg", "imageinfo": []},
            "3": {"title": "File:NoMime.jpg", "imageinfo": [{"url": "https://x/a.jpg"}]},
            "4": {"title": "File:BadMime.jpg", "imageinfo": [{"mime": 5}]},
            "5": "not a page",
            "6": {"title": "File:Kept.jpg", "imageinfo": [{"mime": "image/jpeg"}]}
        }}});

        let resolution = resolve(&raw).unwrap();
        assert_eq!(titles(&resolution), vec!["Kept.jpg"]);
    }

    #[test]
    fn test_order_follows_document() {
        let raw: Value = serde_json::from_str(
            r#"{"query":{"pages":{
                "30":{"title":"File:C.jpg","imageinfo":[{"mime":"image/jpeg"}]},
                "10":{"title":"File:A.jpg","imageinfo":[{"mime":"image/jpeg"}]},
                "20":{"title":"File:B.jpg","imageinfo":[{"mime":"image/jpeg"}]}
            }}}"#,
        )
        .unwrap();

        let resolution = resolve(&raw).unwrap();
        assert_eq!(titles(&resolution), vec!["C.jpg", "A.jpg", "B.jpg"]);
    }

    #[test]
    fn test_only_leading_prefix_stripped() {
        assert_eq!(strip_namespace("File:Example.jpg"), "Example.jpg");
        assert_eq!(strip_namespace("Example File:Two.jpg"), "Example File:Two.jpg");
        assert_eq!(strip_namespace("Example.jpg"), "Example.jpg");
    }

    #[test]
    fn test_mime_prefix_is_literal() {
        let raw = json!({"query": {"pages": {
            "1": {"title": "File:Upper.jpg", "imageinfo": [{"mime": "IMAGE/JPEG"}]},
            "2": {"title": "File:Svg.svg", "imageinfo": [{"mime": "image/svg+xml"}]}
        }}});
        assert_eq!(titles(&resolve(&raw).unwrap()), vec!["Svg.svg"]);
    }
}
