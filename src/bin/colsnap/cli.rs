use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "colsnap",
    version,
    about = "Columnar snapshot store with group-by/join analytics",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Загрузить users/posts (HTTP или локальные JSON) и записать снапшоты.
    Ingest {
        /// Корень хранилища (иначе COLSNAP_DIR, иначе ./tables).
        #[arg(long)]
        path: Option<PathBuf>,
        /// База источника (иначе COLSNAP_BASE_URL).
        #[arg(long)]
        base_url: Option<String>,
        /// Локальный JSON с массивом users (вместо HTTP).
        #[arg(long)]
        users_file: Option<PathBuf>,
        /// Локальный JSON с массивом posts (вместо HTTP).
        #[arg(long)]
        posts_file: Option<PathBuf>,
    },
    /// Выполнить три запроса и напечатать результаты.
    Analyze {
        #[arg(long)]
        path: Option<PathBuf>,
    },
    /// Показать таблицы хранилища и их манифесты.
    Status {
        #[arg(long)]
        path: Option<PathBuf>,
    },
}
