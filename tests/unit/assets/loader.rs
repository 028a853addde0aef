use std::io::Cursor;

use super::*;
use crate::assets::fetch::MemoryFetcher;

fn png(rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(1, 1, rgba.to_vec()).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[tokio::test]
async fn loads_in_request_order() {
    let fetcher = MemoryFetcher::new()
        .with("a.png", png([255, 0, 0, 255]))
        .with("b.png", png([0, 255, 0, 255]));
    let loader = AssetLoader::new(Arc::new(fetcher));

    let images = loader
        .load_all(
            &SurfaceId::from("s"),
            &[
                AssetRequest::new("second", "b.png"),
                AssetRequest::new("first", "a.png"),
            ],
        )
        .await
        .unwrap();

    let ids: Vec<&str> = images.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, ["second", "first"]);
    assert_eq!(images[0].pixel(0, 0), Some([0, 255, 0, 255]));
}

#[tokio::test]
async fn empty_manifest_is_ok() {
    let loader = AssetLoader::new(Arc::new(MemoryFetcher::new()));
    let images = loader.load_all(&SurfaceId::from("s"), &[]).await.unwrap();
    assert!(images.is_empty());
}

#[tokio::test]
async fn failure_names_the_request() {
    let fetcher = MemoryFetcher::new()
        .with("a.png", png([1, 2, 3, 255]))
        .with("broken.png", b"not a png".to_vec());
    let loader = AssetLoader::new(Arc::new(fetcher));

    let err = loader
        .load_all(
            &SurfaceId::from("s"),
            &[
                AssetRequest::new("ok", "a.png"),
                AssetRequest::new("bad", "broken.png"),
                AssetRequest::new("never", "missing.png"),
            ],
        )
        .await
        .unwrap_err();

    match err {
        StageError::AssetLoadFailed {
            surface,
            asset,
            url,
            cause,
        } => {
            assert_eq!(surface.as_str(), "s");
            assert_eq!(asset.as_str(), "bad");
            assert_eq!(url, "broken.png");
            assert!(cause.contains("decode image"), "{cause}");
        }
        other => panic!("unexpected error {other:?}"),
    }
}
