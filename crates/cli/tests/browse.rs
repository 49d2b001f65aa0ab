use cli::repl;
use gallery_core::{Gallery, Resolver, TreeProvider};
use providers::noop::OfflineHttp;
use providers::StaticCredentials;
use std::sync::Arc;
use storage::{BookmarkNode, ChromeBookmarks, MemoryStore, ROOT_ID};
use tokio::io::BufReader;

fn offline_gallery(store: Arc<dyn storage::TreeStore>) -> Gallery {
    let resolver = Resolver::new(Arc::new(OfflineHttp), Arc::new(StaticCredentials::new()));
    Gallery::new(TreeProvider::new(store), resolver)
}

async fn session(gallery: &mut Gallery, script: &str) -> String {
    let mut out = Vec::new();
    repl::run(gallery, BufReader::new(script.as_bytes()), &mut out)
        .await
        .unwrap();
    String::from_utf8(out).unwrap()
}

fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_nodes([
        BookmarkNode::directory("1", ROOT_ID, "Art"),
        BookmarkNode::directory("2", ROOT_ID, "Music"),
        BookmarkNode::link("3", "1", "sunset", "https://x.com/sunset.jpg"),
        BookmarkNode::link("4", "1", "anim", "https://x.com/loop.gifv"),
        BookmarkNode::link("5", "1", "blog", "https://example.com/post"),
    ]))
}

#[tokio::test]
async fn walk_open_and_page() {
    let mut g = offline_gallery(store());
    g.enter(ROOT_ID).await.unwrap();

    let out = session(&mut g, "cd 1\nopen 2\nnext\nclose\nright\nup\nquit\n").await;

    assert!(out.starts_with("/\ndirectories (2)\n"));
    assert!(out.contains("/ Art\n"));
    assert!(out.contains("images (2)\n  1. [3] sunset  https://x.com/sunset.jpg\n"));
    assert!(out.contains("  full:    https://x.com/loop.gif\n"));
    assert!(out.contains("  full:    https://x.com/sunset.jpg\n"));
    assert!(out.contains("/ Music\n"));
    assert_eq!(g.cursor().current_directory_id, ROOT_ID);
    assert!(g.active_image().is_none());
}

#[tokio::test]
async fn errors_keep_the_session_going() {
    let mut g = offline_gallery(store());
    g.enter("1").await.unwrap();

    let out = session(&mut g, "cd 99\ncd 3\nfly\nopen 7\nleft\nbroken 3\nls\n").await;

    assert!(out.contains("error: bookmark not found: 99"));
    assert!(out.contains("error: bookmark 3 is not a directory"));
    assert!(out.contains("unknown command: fly"));
    assert!(out.contains("no image 7"));
    assert!(out.contains("no directory that way"));
    assert!(out.contains("* [3] moved to links"));
    assert_eq!(g.cursor().current_directory_id, "1");
    assert_eq!(g.view().images.len(), 1);
}

#[tokio::test]
async fn search_results_replace_the_listing() {
    let mut g = offline_gallery(store());
    g.enter(ROOT_ID).await.unwrap();

    let out = session(&mut g, "search sun\nsearch\nq\n").await;

    assert!(out.contains("search: sun\n"));
    assert!(out.contains("images (1)\n  1. [3] sunset"));
    assert_eq!(g.view().search, None);
}

#[tokio::test]
async fn browse_a_chrome_bookmarks_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Bookmarks");
    std::fs::write(
        &path,
        r#"{"roots": {
            "bookmark_bar": {"id": "1", "name": "Bookmarks bar", "type": "folder", "children": [
                {"id": "7", "name": "kitten", "type": "url", "url": "https://x.com/kitten.png"}
            ]},
            "other": {"id": "2", "name": "Other bookmarks", "type": "folder", "children": []}
        }}"#,
    )
    .unwrap();
    let chrome = ChromeBookmarks::open(&path).unwrap();
    let mut g = offline_gallery(Arc::new(chrome));
    g.start(Some("?id=1")).await.unwrap();

    let out = session(&mut g, "open 7\nright\n").await;

    assert!(out.starts_with("/ Bookmarks bar\n"));
    assert!(out.contains("kitten [direct]\n"));
    assert!(out.contains("/ Other bookmarks\n"));
}
