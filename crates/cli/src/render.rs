//! Plain-text rendering of gallery state for the terminal.

use chrono::{TimeZone, Utc};
use gallery_core::{DirectoryView, ImageDescriptor};
use std::fmt::Write;
use storage::BookmarkNode;

/// `/` for the root, otherwise `/ A / B / Current`.
pub fn breadcrumb(path: &[BookmarkNode], current: Option<&BookmarkNode>) -> String {
    let titles: Vec<&str> = path
        .iter()
        .chain(current)
        .filter(|n| n.id != storage::ROOT_ID)
        .map(|n| display_title(n))
        .collect();
    if titles.is_empty() {
        "/".to_string()
    } else {
        format!("/ {}", titles.join(" / "))
    }
}

pub fn format_date(millis: Option<i64>) -> Option<String> {
    let added = Utc.timestamp_millis_opt(millis?).single()?;
    Some(added.format("%Y-%m-%d").to_string())
}

fn display_title(node: &BookmarkNode) -> &str {
    if node.title.is_empty() {
        node.url.as_deref().unwrap_or(&node.id)
    } else {
        &node.title
    }
}

fn leaf_line(out: &mut String, prefix: &str, node: &BookmarkNode) {
    let _ = write!(out, "{}[{}] {}", prefix, node.id, display_title(node));
    if let Some(url) = node.url.as_deref().filter(|u| *u != display_title(node)) {
        let _ = write!(out, "  {}", url);
    }
    if let Some(date) = format_date(node.date_added) {
        let _ = write!(out, "  ({})", date);
    }
    out.push('\n');
}

pub fn render_view(view: &DirectoryView, current: Option<&BookmarkNode>) -> String {
    let mut out = String::new();
    match &view.search {
        Some(query) => {
            let _ = writeln!(out, "search: {}", query);
        }
        None => {
            let _ = writeln!(out, "{}", breadcrumb(&view.ancestor_path, current));
        }
    }
    let _ = writeln!(out, "directories ({})", view.directories.len());
    for dir in &view.directories {
        let _ = writeln!(out, "  [{}] {}/", dir.id, display_title(dir));
    }
    let _ = writeln!(out, "links ({})", view.links.len());
    for link in &view.links {
        leaf_line(&mut out, "  ", link);
    }
    let _ = writeln!(out, "images ({})", view.images.len());
    for (i, image) in view.images.iter().enumerate() {
        leaf_line(&mut out, &format!("  {}. ", i + 1), image);
    }
    out
}

pub fn render_image(image: &ImageDescriptor) -> String {
    let mut out = format!("{} [{}]\n", image.title, image.scheme);
    let _ = writeln!(out, "  full:    {}", image.canonical_url);
    if let Some(preview) = &image.preview_url {
        let _ = writeln!(out, "  preview: {}", preview);
    }
    if let (Some(w), Some(h)) = (image.width, image.height) {
        let _ = writeln!(out, "  size:    {}x{}", w, h);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::ROOT_ID;

    #[test]
    fn breadcrumb_runs_root_to_current() {
        let a = BookmarkNode::directory("1", ROOT_ID, "Art");
        let b = BookmarkNode::directory("2", "1", "Sketches");
        assert_eq!(breadcrumb(&[a.clone()], Some(&b)), "/ Art / Sketches");
        assert_eq!(breadcrumb(&[], None), "/");
        let root = BookmarkNode {
            id: ROOT_ID.into(),
            parent_id: None,
            url: None,
            title: String::new(),
            date_added: None,
        };
        assert_eq!(breadcrumb(&[], Some(&root)), "/");
    }

    #[test]
    fn dates_are_days() {
        assert_eq!(format_date(Some(1_600_526_400_000)).as_deref(), Some("2020-09-19"));
        assert_eq!(format_date(None), None);
    }

    #[test]
    fn view_lists_every_bucket() {
        let mut link = BookmarkNode::link("2", ROOT_ID, "site", "https://example.com");
        link.date_added = Some(1_600_526_400_000);
        let view = DirectoryView {
            directory_id: ROOT_ID.into(),
            search: None,
            ancestor_path: vec![],
            directories: vec![BookmarkNode::directory("1", ROOT_ID, "dirA")],
            links: vec![link],
            images: vec![BookmarkNode::link("3", ROOT_ID, "", "https://x.com/a.jpg")],
        };
        let text = render_view(&view, None);
        assert_eq!(
            text,
            "/\n\
             directories (1)\n  [1] dirA/\n\
             links (1)\n  [2] site  https://example.com  (2020-09-19)\n\
             images (1)\n  1. [3] https://x.com/a.jpg\n"
        );
    }
}
