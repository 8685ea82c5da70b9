//! HTML rendering for the directory browser.

use askama::Template;

use crate::file::{FileEntry, Listing};

/// Directory listing page, rendered from `templates/listing.html`.
///
/// Every interpolated value is HTML-escaped by the template engine.
#[derive(Template)]
#[template(path = "listing.html")]
pub struct ListingTemplate {
    pub crumbs: Vec<Crumb>,
    pub parent_href: Option<String>,
    pub rows: Vec<EntryRow>,
    pub show_upload_hint: bool,
}

/// One breadcrumb below "Home".
#[derive(Debug, Clone)]
pub struct Crumb {
    pub name: String,
    pub href: String,
}

/// One table row of the listing.
#[derive(Debug, Clone)]
pub struct EntryRow {
    pub label: String,
    pub href: String,
    pub size: String,
}

/// Link to the browser page for a relative directory path.
pub fn browse_href(relative: &str) -> String {
    if relative.is_empty() {
        "/".to_string()
    } else {
        format!("/?path={}", urlencoding::encode(relative))
    }
}

/// Link to the download endpoint for a relative file path.
///
/// Each segment is percent-encoded on its own so the separators survive.
pub fn download_href(relative: &str) -> String {
    let encoded: Vec<String> = relative
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("/download/{}", encoded.join("/"))
}

/// Format a byte count with thousands separators, e.g. `1,234 bytes`.
pub fn format_size(size: u64) -> String {
    let digits = size.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{grouped} bytes")
}

fn breadcrumbs(path: &str) -> Vec<Crumb> {
    let mut running: Vec<&str> = Vec::new();
    path.split('/')
        .filter(|p| !p.is_empty())
        .map(|part| {
            running.push(part);
            Crumb {
                name: part.to_string(),
                href: browse_href(&running.join("/")),
            }
        })
        .collect()
}

fn parent_href(path: &str) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    let parent = path.rsplit_once('/').map_or("", |(parent, _)| parent);
    Some(browse_href(parent))
}

impl From<&FileEntry> for EntryRow {
    fn from(entry: &FileEntry) -> Self {
        if entry.is_dir {
            EntryRow {
                label: format!("{}/", entry.name),
                href: browse_href(&entry.relative_path),
                size: "--".to_string(),
            }
        } else {
            EntryRow {
                label: entry.name.clone(),
                href: download_href(&entry.relative_path),
                size: entry.size.map_or_else(|| "--".to_string(), format_size),
            }
        }
    }
}

impl From<&Listing> for ListingTemplate {
    /// The root page carries an upload usage hint. The hint shows a
    /// placeholder rather than the live token, which is only published
    /// through the log.
    fn from(listing: &Listing) -> Self {
        ListingTemplate {
            crumbs: breadcrumbs(&listing.path),
            parent_href: parent_href(&listing.path),
            rows: listing.entries.iter().map(EntryRow::from).collect(),
            show_upload_hint: listing.path.is_empty(),
        }
    }
}
