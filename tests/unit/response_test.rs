//! Unit tests for response handlers

use image_creator::response::{base64, FileHandler};

#[test]
fn test_base64_encode_decode() {
    let original = b"Hello, World!";
    let encoded = base64::encode(original);
    let decoded = base64::decode(&encoded).unwrap();

    assert_eq!(original.as_slice(), decoded.as_slice());
}

#[test]
fn test_base64_decode_data_url() {
    let data_url = "data:image/png;base64,SGVsbG8sIFdvcmxkIQ==";
    let decoded = base64::decode(data_url).unwrap();

    assert_eq!(b"Hello, World!", decoded.as_slice());
}

#[test]
fn test_base64_decode_rejects_garbage() {
    assert!(base64::decode("not valid base64!!!").is_err());
}

#[test]
fn test_strip_data_url_prefix_keeps_plain_payload() {
    assert_eq!(
        base64::strip_data_url_prefix("data:image/jpeg;base64,/9j/4AAQ"),
        "/9j/4AAQ"
    );
    assert_eq!(base64::strip_data_url_prefix("/9j/4AAQ"), "/9j/4AAQ");
}

#[test]
fn test_download_file_names() {
    let handler = FileHandler::new("out", "image-creator");
    let name = handler.file_name(1_717_171_717_000, 1);

    assert_eq!(name, "image-creator-1717171717000-1.png");
}

#[tokio::test]
async fn test_download_writes_decoded_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("nested");
    let handler = FileHandler::new(&out_dir, "image-creator");

    let path = handler
        .download(&base64::encode(b"\x89PNG fake"), 3)
        .await
        .unwrap();

    assert!(path.starts_with(&out_dir));
    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("image-creator-"));
    assert!(name.ends_with("-3.png"));
    assert_eq!(std::fs::read(&path).unwrap(), b"\x89PNG fake");
}

#[tokio::test]
async fn test_download_all_numbers_from_one() {
    let dir = tempfile::tempdir().unwrap();
    let handler = FileHandler::new(dir.path(), "image-creator");
    let images: Vec<String> = (0..4u8).map(|i| base64::encode(&[i; 8])).collect();

    let paths = handler.download_all(&images).await.unwrap();

    assert_eq!(paths.len(), 4);
    for (i, path) in paths.iter().enumerate() {
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.ends_with(&format!("-{}.png", i + 1)));
        assert_eq!(std::fs::read(path).unwrap(), vec![i as u8; 8]);
    }
}

#[tokio::test]
async fn test_download_rejects_invalid_payload() {
    let dir = tempfile::tempdir().unwrap();
    let handler = FileHandler::new(dir.path(), "image-creator");

    assert!(handler.download("%%%", 1).await.is_err());
}
