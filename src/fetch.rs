//! Загрузка исходных данных по HTTP (вне ядра хранилища).
//!
//! Два запроса (/users, /posts) идут параллельно на scoped-потоках;
//! запись в хранилище начинается только когда оба завершились успешно.
//! Любая ошибка любого запроса валит весь fetch целиком.

use anyhow::{Context, Result};
use log::info;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::config::Config;
use crate::model::{Post, User};

/// Получить и десериализовать обе коллекции. Всё или ничего.
pub fn fetch_all(cfg: &Config) -> Result<(Vec<User>, Vec<Post>)> {
    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_millis(cfg.http_timeout_ms))
        .build()
        .context("build http client")?;

    let (users, posts) = std::thread::scope(|s| {
        let hu = s.spawn(|| fetch_endpoint::<User>(&client, &cfg.base_url, "users"));
        let hp = s.spawn(|| fetch_endpoint::<Post>(&client, &cfg.base_url, "posts"));
        let users = hu.join().unwrap_or_else(|_| Err(anyhow::anyhow!("users fetch thread panicked")));
        let posts = hp.join().unwrap_or_else(|_| Err(anyhow::anyhow!("posts fetch thread panicked")));
        (users, posts)
    });
    let (users, posts) = (users?, posts?);

    info!(
        "fetched {} users, {} posts from {}",
        users.len(),
        posts.len(),
        cfg.base_url
    );
    Ok((users, posts))
}

fn fetch_endpoint<T: DeserializeOwned>(
    client: &reqwest::blocking::Client,
    base_url: &str,
    endpoint: &str,
) -> Result<Vec<T>> {
    let url = format!("{}/{}", base_url.trim_end_matches('/'), endpoint);
    let resp = client
        .get(&url)
        .send()
        .with_context(|| format!("GET {}", url))?
        .error_for_status()
        .with_context(|| format!("GET {}", url))?;
    resp.json::<Vec<T>>()
        .with_context(|| format!("decode {} response", url))
}
