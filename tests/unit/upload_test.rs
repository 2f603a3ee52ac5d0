//! Unit tests for reading and encoding reference images

use std::path::{Path, PathBuf};

use image_creator::error::AppError;
use image_creator::response::base64;
use image_creator::upload::{encode_file, encode_files};

const PNG_BYTES: &[u8] = &[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x01];
const JPEG_BYTES: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];

fn write(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}

#[tokio::test]
async fn test_encode_png() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "hero.png", PNG_BYTES);

    let image = encode_file(&path).await.unwrap();

    assert_eq!(image.file_name, "hero.png");
    assert_eq!(image.media_type, "image/png");
    assert!(!image.encoded_data.starts_with("data:"));
    assert_eq!(base64::decode(&image.encoded_data).unwrap(), PNG_BYTES);
}

#[tokio::test]
async fn test_magic_bytes_win_over_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "mislabeled.png", JPEG_BYTES);

    let image = encode_file(&path).await.unwrap();

    assert_eq!(image.media_type, "image/jpeg");
}

#[tokio::test]
async fn test_extension_used_when_bytes_unknown() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "sketch.webp", b"not really an image");

    let image = encode_file(&path).await.unwrap();

    assert_eq!(image.media_type, "image/webp");
}

#[tokio::test]
async fn test_unsupported_type_is_a_read_failure() {
    let dir = tempfile::tempdir().unwrap();
    let path = write(dir.path(), "notes.txt", b"hello");

    let err = encode_file(&path).await.unwrap_err();

    assert!(matches!(err, AppError::FileRead(_)));
    assert_eq!(err.to_string(), "Failed to read one or more image files.");
}

#[tokio::test]
async fn test_batch_preserves_order() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        write(dir.path(), "b.jpg", JPEG_BYTES),
        write(dir.path(), "a.png", PNG_BYTES),
    ];

    let images = encode_files(&paths).await.unwrap();

    let names: Vec<_> = images.iter().map(|i| i.file_name.as_str()).collect();
    assert_eq!(names, ["b.jpg", "a.png"]);
}

#[tokio::test]
async fn test_batch_fails_if_any_file_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let paths = vec![
        write(dir.path(), "a.png", PNG_BYTES),
        dir.path().join("missing.png"),
    ];

    let err = encode_files(&paths).await.unwrap_err();

    assert!(matches!(err, AppError::FileRead(_)));
}
