use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use colsnap::config::Config;
use colsnap::consts::{TABLE_POSTS, TABLE_USERS};
use colsnap::fetch::fetch_all;
use colsnap::model::{Post, User};
use colsnap::store::SnapshotStore;

pub fn exec(
    path: Option<PathBuf>,
    base_url: Option<String>,
    users_file: Option<PathBuf>,
    posts_file: Option<PathBuf>,
) -> Result<()> {
    let mut cfg = Config::from_env();
    if let Some(p) = path {
        cfg.store_dir = p;
    }
    if let Some(u) = base_url {
        cfg.base_url = u.trim_end_matches('/').to_string();
    }

    // Оба источника должны успешно отдаться до первой записи.
    let (users, posts) = match (users_file, posts_file) {
        (Some(uf), Some(pf)) => load_local(&uf, &pf)?,
        (None, None) => fetch_all(&cfg)?,
        _ => bail!("--users-file and --posts-file must be given together"),
    };

    let store = SnapshotStore::open_or_create(&cfg.store_dir)?;
    store.write_records(TABLE_USERS, &users)?;
    store.write_records(TABLE_POSTS, &posts)?;

    println!(
        "Ingested {} users and {} posts into {}",
        users.len(),
        posts.len(),
        cfg.store_dir.display()
    );
    Ok(())
}

fn load_local(users_file: &Path, posts_file: &Path) -> Result<(Vec<User>, Vec<Post>)> {
    let ub = std::fs::read(users_file)
        .with_context(|| format!("read {}", users_file.display()))?;
    let users: Vec<User> = serde_json::from_slice(&ub)
        .with_context(|| format!("parse {}", users_file.display()))?;

    let pb = std::fs::read(posts_file)
        .with_context(|| format!("read {}", posts_file.display()))?;
    let posts: Vec<Post> = serde_json::from_slice(&pb)
        .with_context(|| format!("parse {}", posts_file.display()))?;

    Ok((users, posts))
}
