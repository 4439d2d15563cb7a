use std::fs;
use std::sync::Arc;

use assert_fs::TempDir;
use imvec::Ingestor;
use imvec::ingest::IngestError;
use imvec::store::{ClassSchema, ImageRecord, MemoryStore};
use imvec::utils::encode_image;
use rstest::*;

const CLASS: &str = "Employee";

#[fixture]
fn image_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("jane_doe.png"), b"jane").unwrap();
    fs::write(dir.path().join("alice.jpg"), b"alice").unwrap();
    fs::write(dir.path().join("john_quincy_adams.jpeg"), b"john").unwrap();
    // 子目录不会被导入
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested").join("skip.png"), b"skip").unwrap();
    dir
}

#[fixture]
fn store() -> Arc<MemoryStore> {
    Arc::new(MemoryStore::new().with_class(ClassSchema::employee(CLASS)))
}

#[rstest]
#[tokio::test]
async fn one_insert_per_file(image_dir: TempDir, store: Arc<MemoryStore>) {
    let report = Ingestor::new(store.clone(), CLASS)
        .ingest_directory(image_dir.path())
        .await
        .unwrap();

    assert_eq!(report.ensure_complete().unwrap(), 3);
    assert_eq!(store.insert_calls(), 3);

    let mut labels = store.records(CLASS).await.into_iter().map(|r| r.text).collect::<Vec<_>>();
    labels.sort();
    assert_eq!(labels, vec!["alice", "jane doe", "john quincy adams"]);

    let labels = report.outcomes.iter().map(|o| o.label.as_str()).collect::<Vec<_>>();
    assert_eq!(labels, vec!["alice", "jane doe", "john quincy adams"]);
}

#[rstest]
#[tokio::test]
async fn stores_base64_content(image_dir: TempDir, store: Arc<MemoryStore>) {
    Ingestor::new(store.clone(), CLASS).ingest_directory(image_dir.path()).await.unwrap();

    let records = store.records(CLASS).await;
    let alice = records.iter().find(|r| r.text == "alice").unwrap();
    assert_eq!(alice.image, encode_image(b"alice"));
}

#[rstest]
#[tokio::test]
async fn single_failure_rejects_batch(image_dir: TempDir) {
    let store = Arc::new(
        MemoryStore::new().with_class(ClassSchema::employee(CLASS)).fail_insert_label("jane doe"),
    );

    let report = Ingestor::new(store.clone(), CLASS)
        .ingest_directory(image_dir.path())
        .await
        .unwrap();

    assert_eq!(store.insert_calls(), 3);
    assert_eq!(report.succeeded(), 2);
    let failed = report.failures().map(|o| o.label.as_str()).collect::<Vec<_>>();
    assert_eq!(failed, vec!["jane doe"]);
    assert!(matches!(
        report.ensure_complete(),
        Err(IngestError::Incomplete { failed: 1, total: 3 })
    ));
}

#[rstest]
#[case(1)]
#[case(2)]
#[case(4)]
#[tokio::test]
async fn respects_concurrency_limit(store: Arc<MemoryStore>, #[case] concurrency: usize) {
    let dir = TempDir::new().unwrap();
    for i in 0..20 {
        fs::write(dir.path().join(format!("person_{i}.png")), format!("img{i}")).unwrap();
    }

    let report = Ingestor::new(store.clone(), CLASS)
        .concurrency(concurrency)
        .ingest_directory(dir.path())
        .await
        .unwrap();

    assert_eq!(report.ensure_complete().unwrap(), 20);
    assert!(store.max_in_flight() <= concurrency);
}

#[rstest]
#[tokio::test]
async fn missing_directory_is_error(store: Arc<MemoryStore>) {
    let dir = TempDir::new().unwrap();
    let result = Ingestor::new(store.clone(), CLASS).ingest_directory(&dir.path().join("nope")).await;

    assert!(matches!(result, Err(IngestError::ReadDir { .. })));
    assert_eq!(store.insert_calls(), 0);
}

#[rstest]
#[tokio::test]
async fn empty_directory(store: Arc<MemoryStore>) {
    let dir = TempDir::new().unwrap();
    let report = Ingestor::new(store.clone(), CLASS).ingest_directory(dir.path()).await.unwrap();
    assert_eq!(report.ensure_complete().unwrap(), 0);
}

#[cfg(unix)]
#[rstest]
#[tokio::test]
async fn follows_symlinked_files(store: Arc<MemoryStore>) {
    use std::os::unix::fs::symlink;

    let outside = TempDir::new().unwrap();
    let target = outside.path().join("photo.png");
    fs::write(&target, b"jane").unwrap();

    let dir = TempDir::new().unwrap();
    symlink(&target, dir.path().join("jane_doe.png")).unwrap();
    // 指向不存在文件的链接会被跳过
    symlink(outside.path().join("gone.png"), dir.path().join("ghost.png")).unwrap();

    let report = Ingestor::new(store.clone(), CLASS).ingest_directory(dir.path()).await.unwrap();

    assert_eq!(report.ensure_complete().unwrap(), 1);
    assert_eq!(store.insert_calls(), 1);
    assert_eq!(
        store.records(CLASS).await,
        vec![ImageRecord { image: encode_image(b"jane"), text: "jane doe".to_string() }]
    );
}
