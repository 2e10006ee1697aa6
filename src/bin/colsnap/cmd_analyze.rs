use anyhow::Result;
use std::path::PathBuf;

use colsnap::agg::analyze;
use colsnap::config::Config;
use colsnap::store::SnapshotStore;

use crate::util::render_table;

pub fn exec(path: Option<PathBuf>) -> Result<()> {
    let mut cfg = Config::from_env();
    if let Some(p) = path {
        cfg.store_dir = p;
    }

    let store = SnapshotStore::open_or_create(&cfg.store_dir)?;
    let analysis = analyze(&store)?;

    println!("Posts per user:");
    println!("{}", render_table(&analysis.posts_per_user));

    println!("User with longest post:");
    println!("{}", render_table(&analysis.longest_post));

    println!("Average post length per user:");
    println!("{}", render_table(&analysis.avg_post_length));

    for w in &analysis.warnings {
        eprintln!("warning: {}", w);
    }
    Ok(())
}
