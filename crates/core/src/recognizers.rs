//! Url-shape predicates, one per hosting scheme. Pure and synchronous.

use providers::Scheme;

const IMAGE_EXTENSIONS: [&str; 5] = [".jpeg", ".jpg", ".gif", ".png", ".svg"];

type Recognizer = fn(&str) -> bool;

/// Tested top to bottom; the first match wins. Some urls satisfy several
/// predicates (an imgur link ending in `.jpg` is a direct image).
pub const RECOGNIZERS: [(Scheme, Recognizer); 9] = [
    (Scheme::Direct, is_direct_image),
    (Scheme::DeviantArt, is_deviantart),
    (Scheme::Pixiv, is_pixiv),
    (Scheme::Instagram, is_instagram),
    (Scheme::Flickr, is_flickr),
    (Scheme::Tumblr, is_tumblr),
    (Scheme::Imgur, is_imgur),
    (Scheme::Reddit, is_reddit_post),
    (Scheme::Twitter, is_twitter),
];

pub fn recognize(url: &str) -> Scheme {
    RECOGNIZERS
        .iter()
        .find(|(_, matches)| matches(url))
        .map(|(scheme, _)| *scheme)
        .unwrap_or(Scheme::Generic)
}

/// True when some recognizer claims `url`. No network involved.
pub fn is_any_image(url: &str) -> bool {
    recognize(url) != Scheme::Generic
}

pub fn is_direct_image(url: &str) -> bool {
    let lower = url.to_ascii_lowercase();
    IMAGE_EXTENSIONS.iter().any(|ext| lower.contains(ext))
}

pub fn is_deviantart(url: &str) -> bool {
    url.contains("deviantart.com/")
}

pub fn is_pixiv(url: &str) -> bool {
    url.contains("pixiv.net") && (url.contains("illust_id=") || url.contains("/artworks/"))
}

pub fn is_instagram(url: &str) -> bool {
    url.contains("instagram.com/p/")
}

pub fn is_flickr(url: &str) -> bool {
    url.contains("flickr.com/photos/")
}

pub fn is_tumblr(url: &str) -> bool {
    url.contains(".tumblr.com/post/")
}

pub fn is_imgur(url: &str) -> bool {
    url.contains("imgur.com/")
}

pub fn is_reddit_post(url: &str) -> bool {
    url.contains("reddit.com/r/") && url.contains("/comments/")
}

pub fn is_twitter(url: &str) -> bool {
    url.contains("twitter.com/") && url.contains("/status/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_each_scheme() {
        let cases = [
            ("https://x.com/a.jpg", Scheme::Direct),
            ("https://i.imgur.com/abc.gifv", Scheme::Direct),
            ("https://example.com/PHOTO.PNG", Scheme::Direct),
            ("https://www.deviantart.com/someone/art/Piece-1", Scheme::DeviantArt),
            (
                "https://www.pixiv.net/member_illust.php?mode=medium&illust_id=12345678",
                Scheme::Pixiv,
            ),
            ("https://www.pixiv.net/en/artworks/12345678", Scheme::Pixiv),
            ("https://www.instagram.com/p/B1a2C3d4E5f/", Scheme::Instagram),
            ("https://www.flickr.com/photos/owner/123/", Scheme::Flickr),
            ("https://blog.tumblr.com/post/123/slug", Scheme::Tumblr),
            ("https://imgur.com/gallery/abc", Scheme::Imgur),
            ("https://www.reddit.com/r/pics/comments/abc/title/", Scheme::Reddit),
            ("https://twitter.com/someone/status/123", Scheme::Twitter),
            ("https://example.com", Scheme::Generic),
        ];
        for (url, expected) in cases {
            assert_eq!(recognize(url), expected, "{}", url);
        }
    }

    #[test]
    fn priority_order_breaks_ties() {
        // Matches both the direct-image and imgur predicates.
        assert_eq!(recognize("https://i.imgur.com/abc.png"), Scheme::Direct);
        // A reddit listing page is not a post.
        assert_eq!(recognize("https://www.reddit.com/r/pics/"), Scheme::Generic);
        // pixiv without a work id is just a page.
        assert!(!is_any_image("https://www.pixiv.net/en/users/1"));
    }

    #[test]
    fn extension_must_appear_in_the_url() {
        // Only the query names the format, so a content-type probe decides.
        assert_eq!(
            recognize("https://pbs.twimg.com/media/Ec?format=jpg&name=4096x4096"),
            Scheme::Generic
        );
        assert_eq!(
            recognize("https://pbs.twimg.com/media/Ec.jpg?format=jpg&name=4096x4096"),
            Scheme::Direct
        );
    }
}
