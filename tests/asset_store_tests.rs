use exam_archive::asset_store::{AssetStore, AssetStoreError};
use tokio::io::AsyncReadExt;

#[tokio::test]
async fn test_fetch_existing_asset() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("physics_unit3.pdf"), b"%PDF-1.4 unit3").unwrap();
    let store = AssetStore::new(dir.path()).unwrap();

    let mut asset = store.fetch("physics_unit3.pdf").await.unwrap();
    assert_eq!(asset.byte_size, 14);

    let mut contents = Vec::new();
    asset.file.read_to_end(&mut contents).await.unwrap();
    assert_eq!(contents, b"%PDF-1.4 unit3");
}

#[tokio::test]
async fn test_fetch_missing_asset() {
    let dir = tempfile::tempdir().unwrap();
    let store = AssetStore::new(dir.path()).unwrap();

    let result = store.fetch("missing.pdf").await;
    assert!(matches!(result, Err(AssetStoreError::NotFound(_))));
}

#[tokio::test]
async fn test_fetch_rejects_parent_traversal() {
    let parent = tempfile::tempdir().unwrap();
    let base = parent.path().join("pdfs");
    // The escape target exists, so only the prefix check can stop this.
    std::fs::write(parent.path().join("secret.pdf"), b"top secret").unwrap();
    let store = AssetStore::new(&base).unwrap();

    let result = store.fetch("../secret.pdf").await;
    assert!(matches!(result, Err(AssetStoreError::NotFound(_))));
}

#[tokio::test]
async fn test_fetch_rejects_absolute_path() {
    let dir = tempfile::tempdir().unwrap();
    let outside = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(outside.path(), b"outside").unwrap();
    let store = AssetStore::new(dir.path()).unwrap();

    let result = store.fetch(&outside.path().to_string_lossy()).await;
    assert!(matches!(result, Err(AssetStoreError::NotFound(_))));
}

#[tokio::test]
async fn test_fetch_rejects_directories() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("not_a_file")).unwrap();
    let store = AssetStore::new(dir.path()).unwrap();

    let result = store.fetch("not_a_file").await;
    assert!(matches!(result, Err(AssetStoreError::NotFound(_))));
}

#[test]
fn test_new_creates_missing_base_directory() {
    let parent = tempfile::tempdir().unwrap();
    let base = parent.path().join("pdfs");
    assert!(!base.exists());

    AssetStore::new(&base).unwrap();
    assert!(base.is_dir());
}
