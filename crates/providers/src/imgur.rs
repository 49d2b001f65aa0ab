use crate::{dimension, str_at, strip_query, Auth, HostImage, HttpClient, ProviderError};

const API_ENDPOINT: &str = "https://api.imgur.com/3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImgurRef {
    Image(String),
    Album(String),
}

/// Classifies an imgur url as a single image or a gallery/album.
pub fn parse(url: &str) -> Option<ImgurRef> {
    let url = strip_query(url).trim_end_matches('/');
    let id = url.rsplit('/').next().filter(|id| !id.is_empty())?;
    // Direct links like i.imgur.com/<id>.gifv carry an extension.
    let id = id.split('.').next().unwrap_or(id).to_string();
    if url.contains("/gallery/") || url.contains("/a/") {
        Some(ImgurRef::Album(id))
    } else {
        Some(ImgurRef::Image(id))
    }
}

pub fn api_url(reference: &ImgurRef) -> String {
    match reference {
        ImgurRef::Album(id) => format!("{}/album/{}/images", API_ENDPOINT, id),
        ImgurRef::Image(id) => format!("{}/image/{}", API_ENDPOINT, id),
    }
}

/// `https://i.imgur.com/abc.jpg` -> `https://i.imgur.com/abcl.jpg`, the large
/// thumbnail imgur serves for every image.
pub fn large_thumbnail(link: &str) -> Option<String> {
    let name_start = link.rfind('/').map(|i| i + 1).unwrap_or(0);
    let dot = link[name_start..].rfind('.')? + name_start;
    Some(format!("{}l{}", &link[..dot], &link[dot..]))
}

pub async fn fetch(
    http: &dyn HttpClient,
    page_url: &str,
    title: &str,
    client_id: &str,
) -> Result<HostImage, ProviderError> {
    let reference =
        parse(page_url).ok_or_else(|| ProviderError::malformed(page_url, "no image id"))?;
    let endpoint = api_url(&reference);
    let resp = http
        .get_json(&endpoint, Some(&Auth::ClientId(client_id.to_string())))
        .await?;
    let body = &resp.body;
    if body.get("success").and_then(|s| s.as_bool()) != Some(true) {
        return Err(ProviderError::rejected(&endpoint, body));
    }
    let data = body
        .get("data")
        .ok_or_else(|| ProviderError::decode(&endpoint, "no data"))?;
    let (image, is_album) = match data.as_array() {
        Some(images) => (
            images
                .first()
                .ok_or_else(|| ProviderError::rejected(&endpoint, body))?,
            true,
        ),
        None => (data, false),
    };
    let link = str_at(image, "/link").ok_or_else(|| ProviderError::decode(&endpoint, "no link"))?;
    let name = str_at(image, "/title")
        .filter(|t| !t.is_empty())
        .unwrap_or(title);
    Ok(HostImage {
        url: link.to_string(),
        preview_url: large_thumbnail(link),
        title: if is_album {
            format!("Album: {}", name)
        } else {
            name.to_string()
        },
        width: dimension(image.get("width")),
        height: dimension(image.get("height")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedHttp;
    use serde_json::json;

    #[test]
    fn parses_album_and_image_urls() {
        assert_eq!(
            parse("https://imgur.com/a/f5z8Y/"),
            Some(ImgurRef::Album("f5z8Y".into()))
        );
        assert_eq!(
            parse("https://imgur.com/gallery/xyz?ref=share"),
            Some(ImgurRef::Album("xyz".into()))
        );
        assert_eq!(
            parse("https://imgur.com/AbCdEf1"),
            Some(ImgurRef::Image("AbCdEf1".into()))
        );
    }

    #[test]
    fn thumbnail_marker_goes_before_extension() {
        assert_eq!(
            large_thumbnail("https://i.imgur.com/AbCdEf1.jpg").as_deref(),
            Some("https://i.imgur.com/AbCdEf1l.jpg")
        );
        assert_eq!(large_thumbnail("https://i.imgur.com/noext"), None);
    }

    #[tokio::test]
    async fn album_uses_first_image() {
        let http = ScriptedHttp::new().with_json(
            &api_url(&ImgurRef::Album("f5z8Y".into())),
            json!({
                "success": true,
                "status": 200,
                "data": [
                    {"link": "https://i.imgur.com/one.png", "title": null, "width": 10, "height": 20},
                    {"link": "https://i.imgur.com/two.png"}
                ]
            }),
        );
        let image = fetch(&http, "https://imgur.com/a/f5z8Y/", "Trip", "cid")
            .await
            .unwrap();
        assert_eq!(image.url, "https://i.imgur.com/one.png");
        assert_eq!(image.preview_url.as_deref(), Some("https://i.imgur.com/onel.png"));
        assert_eq!(image.title, "Album: Trip");
        assert_eq!(
            http.calls(),
            vec![format!(
                "GET {} client-id=cid",
                api_url(&ImgurRef::Album("f5z8Y".into()))
            )]
        );
    }

    #[tokio::test]
    async fn success_false_is_rejected() {
        let http = ScriptedHttp::new().with_json(
            &api_url(&ImgurRef::Image("gone".into())),
            json!({"success": false, "status": 404, "data": {"error": "Unable to find an image with the id, gone"}}),
        );
        match fetch(&http, "https://imgur.com/gone", "", "cid").await {
            Err(ProviderError::Rejected { body, .. }) => assert!(body.contains("Unable to find")),
            other => panic!("unexpected {:?}", other),
        }
    }
}
