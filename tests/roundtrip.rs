use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use colsnap::model::{records_to_table, Post, User};
use colsnap::store::SnapshotStore;
use colsnap::StoreError;

#[test]
fn roundtrip_preserves_rows_and_unicode() -> Result<()> {
    let root = unique_root("rt");
    let store = SnapshotStore::open_or_create(&root)?;

    let users = vec![
        User {
            id: 1,
            name: "Анна Каренина".into(),
            username: "anna".into(),
            email: "anna@example.com".into(),
        },
        User {
            id: 2,
            name: "李白".into(),
            username: "libai".into(),
            email: "li@example.com".into(),
        },
    ];
    store.write("users", &records_to_table(&users))?;

    let t = store.read("users")?;
    assert_eq!(t.rows(), 2);
    assert_eq!(t.i64_col("id")?, &[1, 2]);
    assert_eq!(
        t.str_col("name")?,
        &["Анна Каренина".to_string(), "李白".to_string()]
    );
    assert_eq!(t.str_col("email")?[1], "li@example.com");
    Ok(())
}

#[test]
fn repeated_reads_are_identical() -> Result<()> {
    let root = unique_root("reread");
    let store = SnapshotStore::open_or_create(&root)?;
    store.write_records("posts", &sample_posts())?;

    let a = store.read("posts")?;
    let b = store.read("posts")?;
    let c = store.read("posts")?;
    assert_eq!(a, b);
    assert_eq!(b, c);
    Ok(())
}

#[test]
fn overwrite_fully_supersedes() -> Result<()> {
    let root = unique_root("overwrite");
    let store = SnapshotStore::open_or_create(&root)?;

    store.write_records("posts", &sample_posts())?;
    let replacement = vec![Post {
        id: 99,
        user_id: 7,
        title: "only one".into(),
        body: "short".into(),
    }];
    store.write_records("posts", &replacement)?;

    let t = store.read("posts")?;
    assert_eq!(t.rows(), 1);
    assert_eq!(t.i64_col("id")?, &[99]);
    Ok(())
}

#[test]
fn empty_write_keeps_existing_snapshot() -> Result<()> {
    let root = unique_root("empty-keep");
    let store = SnapshotStore::open_or_create(&root)?;

    store.write_records("posts", &sample_posts())?;
    let none: Vec<Post> = Vec::new();
    store.write_records("posts", &none)?; // no-op

    let t = store.read("posts")?;
    assert_eq!(t.rows(), sample_posts().len());
    Ok(())
}

#[test]
fn empty_write_without_prior_snapshot_fails() -> Result<()> {
    let root = unique_root("empty-fail");
    let store = SnapshotStore::open_or_create(&root)?;

    let none: Vec<Post> = Vec::new();
    let err = store.write_records("posts", &none).unwrap_err();
    assert!(matches!(err, StoreError::Write { .. }), "got: {}", err);
    Ok(())
}

#[test]
fn read_missing_table_is_not_found() -> Result<()> {
    let root = unique_root("missing");
    let store = SnapshotStore::open_or_create(&root)?;

    let err = store.read("users").unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }), "got: {}", err);
    Ok(())
}

#[test]
fn flipped_byte_reads_as_corrupt() -> Result<()> {
    let root = unique_root("corrupt-flip");
    let store = SnapshotStore::open_or_create(&root)?;
    store.write_records("posts", &sample_posts())?;

    let path = root.join("posts").join("table.col");
    let mut bytes = fs::read(&path)?;
    let mid = bytes.len() / 2;
    bytes[mid] ^= 0xFF;
    fs::write(&path, &bytes)?;

    let err = store.read("posts").unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }), "got: {}", err);
    Ok(())
}

#[test]
fn truncated_file_reads_as_corrupt() -> Result<()> {
    let root = unique_root("corrupt-trunc");
    let store = SnapshotStore::open_or_create(&root)?;
    store.write_records("posts", &sample_posts())?;

    let path = root.join("posts").join("table.col");
    let bytes = fs::read(&path)?;
    fs::write(&path, &bytes[..bytes.len() / 2])?;

    let err = store.read("posts").unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { .. }), "got: {}", err);
    Ok(())
}

#[test]
fn bad_table_names_rejected() -> Result<()> {
    let root = unique_root("names");
    let store = SnapshotStore::open_or_create(&root)?;

    for name in ["", "a/b", "a\\b", ".hidden"] {
        let err = store.write_records(name, &sample_posts()).unwrap_err();
        assert!(matches!(err, StoreError::Write { .. }), "name {:?}", name);
    }
    Ok(())
}

#[test]
fn tables_and_manifest_reflect_store_state() -> Result<()> {
    let root = unique_root("manifest");
    let store = SnapshotStore::open_or_create(&root)?;
    store.write_records("posts", &sample_posts())?;

    assert_eq!(store.tables()?, vec!["posts".to_string()]);
    let m = store.read_manifest("posts")?;
    assert_eq!(m.version, 1);
    assert_eq!(m.table, "posts");
    assert_eq!(m.rows, sample_posts().len() as u64);
    assert_eq!(m.columns.len(), 4);
    assert_eq!(m.columns[1].name, "userId");
    assert_eq!(m.columns[1].ty, "i64");
    Ok(())
}

fn sample_posts() -> Vec<Post> {
    vec![
        Post {
            id: 1,
            user_id: 1,
            title: "hello".into(),
            body: "first body".into(),
        },
        Post {
            id: 2,
            user_id: 1,
            title: "ещё пост".into(),
            body: "тело с юникодом".into(),
        },
        Post {
            id: 3,
            user_id: 2,
            title: "third".into(),
            body: "".into(),
        },
    ]
}

fn unique_root(prefix: &str) -> PathBuf {
    let pid = std::process::id();
    let t = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("colsnap-{}-{}-{}", prefix, pid, t))
}
