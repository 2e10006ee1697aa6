use anyhow::Result;
use std::path::PathBuf;

use colsnap::config::Config;
use colsnap::store::SnapshotStore;

pub fn exec(path: Option<PathBuf>) -> Result<()> {
    let mut cfg = Config::from_env();
    if let Some(p) = path {
        cfg.store_dir = p;
    }

    let store = SnapshotStore::open_or_create(&cfg.store_dir)?;
    let tables = store.tables()?;
    if tables.is_empty() {
        println!("No snapshots at {}", cfg.store_dir.display());
        return Ok(());
    }

    println!("Store at {}:", cfg.store_dir.display());
    for table in tables {
        match store.read_manifest(&table) {
            Ok(m) => {
                let cols: Vec<String> = m
                    .columns
                    .iter()
                    .map(|c| format!("{}:{}", c.name, c.ty))
                    .collect();
                println!(
                    "  {:10} {:>6} rows  {:>8} B  [{}]",
                    m.table,
                    m.rows,
                    m.file_bytes,
                    cols.join(", ")
                );
            }
            // снапшот есть, манифест потерян/битый — не валим status
            Err(e) => println!("  {:10} (manifest unreadable: {:#})", table, e),
        }
    }
    Ok(())
}
