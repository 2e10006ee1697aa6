//! agg — три аналитических запроса поверх снапшотов users/posts.
//!
//! Каждый запрос — чистая функция от двух входных таблиц, без общего
//! изменяемого состояния; analyze() читает обе таблицы заново из
//! хранилища и прогоняет конвейеры независимо.
//!
//! Семантика join — inner: посты без подходящего пользователя
//! выпадают из всех трёх результатов, пользователи без постов не
//! появляются (источник группировки — posts).
//!
//! Детерминизм (решения по неопределённым в источнике местам):
//! - порядок групп = первое вхождение userId в posts;
//! - ничья по длине поста решается меньшим id поста;
//! - ничья по средней длине решается именем пользователя по возрастанию.
//!
//! body_length считает Unicode scalar values (chars), не байты.

use anyhow::Result;
use log::warn;
use std::collections::HashMap;

use crate::consts::{TABLE_POSTS, TABLE_USERS};
use crate::errors::DataQuality;
use crate::store::SnapshotStore;
use crate::table::{ColumnBuilder, ColumnType, Table};

pub const POSTS_PER_USER_SCHEMA: &[(&str, ColumnType)] =
    &[("name", ColumnType::Str), ("post_count", ColumnType::I64)];

pub const LONGEST_POST_SCHEMA: &[(&str, ColumnType)] = &[
    ("name", ColumnType::Str),
    ("title", ColumnType::Str),
    ("body_length", ColumnType::I64),
];

pub const AVG_POST_LENGTH_SCHEMA: &[(&str, ColumnType)] = &[
    ("name", ColumnType::Str),
    ("avg_post_length", ColumnType::F64),
];

/// Результат analyze(): три таблицы плюс нефатальные сигналы.
#[derive(Debug)]
pub struct Analysis {
    pub posts_per_user: Table,
    pub longest_post: Table,
    pub avg_post_length: Table,
    pub warnings: Vec<DataQuality>,
}

/// Прочитать users/posts из хранилища и выполнить все три запроса.
///
/// Ошибки хранилища фатальны и уходят наружу как есть; пустые входы и
/// пустой join дают корректные пустые таблицы и warning.
pub fn analyze(store: &SnapshotStore) -> Result<Analysis> {
    let users = store.read(TABLE_USERS)?;
    let posts = store.read(TABLE_POSTS)?;

    let mut warnings = Vec::new();
    for (name, t) in [(TABLE_USERS, &users), (TABLE_POSTS, &posts)] {
        if t.rows() == 0 {
            let w = DataQuality::EmptyInput {
                table: name.to_string(),
            };
            warn!("{}", w);
            warnings.push(w);
        }
    }

    let posts_per_user = posts_per_user(&users, &posts)?;
    let longest_post = longest_post(&users, &posts)?;
    let avg_post_length = avg_post_length(&users, &posts)?;

    if users.rows() > 0 && posts.rows() > 0 {
        for (query, t) in [
            ("posts_per_user", &posts_per_user),
            ("longest_post", &longest_post),
            ("avg_post_length", &avg_post_length),
        ] {
            if t.rows() == 0 {
                let w = DataQuality::JoinKeyMismatch {
                    query: query.to_string(),
                };
                warn!("{}", w);
                warnings.push(w);
            }
        }
    }

    Ok(Analysis {
        posts_per_user,
        longest_post,
        avg_post_length,
        warnings,
    })
}

/// id -> name по таблице users.
fn user_names(users: &Table) -> Result<HashMap<i64, String>> {
    let ids = users.i64_col("id")?;
    let names = users.str_col("name")?;
    let mut map = HashMap::with_capacity(ids.len());
    for (id, name) in ids.iter().zip(names) {
        map.insert(*id, name.clone());
    }
    Ok(map)
}

/// Запрос 1: число постов на пользователя.
/// group by userId -> count, inner join users, проекция (name, post_count).
pub fn posts_per_user(users: &Table, posts: &Table) -> Result<Table> {
    let names = user_names(users)?;
    let uids = posts.i64_col("userId")?;

    // Группы в порядке первого вхождения userId.
    let mut order: Vec<i64> = Vec::new();
    let mut counts: HashMap<i64, i64> = HashMap::new();
    for &uid in uids {
        let c = counts.entry(uid).or_insert_with(|| {
            order.push(uid);
            0
        });
        *c += 1;
    }

    let mut name_col = ColumnBuilder::new("name", ColumnType::Str);
    let mut count_col = ColumnBuilder::new("post_count", ColumnType::I64);
    for uid in order {
        if let Some(name) = names.get(&uid) {
            name_col.push_str(name);
            count_col.push_i64(counts[&uid]);
        }
    }
    Ok(Table::from_builders(vec![name_col, count_col]))
}

/// Запрос 2: самый длинный пост (top-1 по body_length, ничья — меньший
/// id поста), проекция (name, title, body_length).
pub fn longest_post(users: &Table, posts: &Table) -> Result<Table> {
    let names = user_names(users)?;
    let ids = posts.i64_col("id")?;
    let uids = posts.i64_col("userId")?;
    let titles = posts.str_col("title")?;
    let bodies = posts.str_col("body")?;

    // (len, post_id, row) лучшего подходящего поста
    let mut best: Option<(i64, i64, usize)> = None;
    for row in 0..posts.rows() {
        if !names.contains_key(&uids[row]) {
            continue;
        }
        let len = bodies[row].chars().count() as i64;
        let id = ids[row];
        let better = match best {
            None => true,
            Some((blen, bid, _)) => len > blen || (len == blen && id < bid),
        };
        if better {
            best = Some((len, id, row));
        }
    }

    let mut name_col = ColumnBuilder::new("name", ColumnType::Str);
    let mut title_col = ColumnBuilder::new("title", ColumnType::Str);
    let mut len_col = ColumnBuilder::new("body_length", ColumnType::I64);
    if let Some((len, _, row)) = best {
        name_col.push_str(&names[&uids[row]]);
        title_col.push_str(&titles[row]);
        len_col.push_i64(len);
    }
    Ok(Table::from_builders(vec![name_col, title_col, len_col]))
}

/// Запрос 3: средняя длина поста на пользователя, по убыванию среднего
/// (ничья — имя по возрастанию), проекция (name, avg_post_length).
pub fn avg_post_length(users: &Table, posts: &Table) -> Result<Table> {
    let names = user_names(users)?;
    let uids = posts.i64_col("userId")?;
    let bodies = posts.str_col("body")?;

    let mut order: Vec<i64> = Vec::new();
    let mut acc: HashMap<i64, (u64, u64)> = HashMap::new(); // (sum, count)
    for (uid, body) in uids.iter().zip(bodies) {
        let e = acc.entry(*uid).or_insert_with(|| {
            order.push(*uid);
            (0, 0)
        });
        e.0 += body.chars().count() as u64;
        e.1 += 1;
    }

    // Среднее без округления сверх точности f64.
    let mut rows: Vec<(&String, f64)> = Vec::new();
    for uid in &order {
        if let Some(name) = names.get(uid) {
            let (sum, count) = acc[uid];
            rows.push((name, sum as f64 / count as f64));
        }
    }
    rows.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let mut name_col = ColumnBuilder::new("name", ColumnType::Str);
    let mut avg_col = ColumnBuilder::new("avg_post_length", ColumnType::F64);
    for (name, avg) in rows {
        name_col.push_str(name);
        avg_col.push_f64(avg);
    }
    Ok(Table::from_builders(vec![name_col, avg_col]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{records_to_table, Post, User};

    fn user(id: i64, name: &str) -> User {
        User {
            id,
            name: name.into(),
            username: name.to_ascii_lowercase(),
            email: format!("{}@example.com", name.to_ascii_lowercase()),
        }
    }

    fn post(id: i64, user_id: i64, body: &str) -> Post {
        Post {
            id,
            user_id,
            title: format!("post {}", id),
            body: body.into(),
        }
    }

    #[test]
    fn group_order_is_first_occurrence() {
        let users = records_to_table(&[user(1, "A"), user(2, "B")]);
        let posts = records_to_table(&[
            post(10, 2, "x"),
            post(11, 1, "y"),
            post(12, 2, "z"),
        ]);
        let t = posts_per_user(&users, &posts).unwrap();
        assert_eq!(t.str_col("name").unwrap(), &["B".to_string(), "A".to_string()]);
        assert_eq!(t.i64_col("post_count").unwrap(), &[2, 1]);
    }

    #[test]
    fn longest_post_tie_breaks_on_lowest_id() {
        let users = records_to_table(&[user(1, "A")]);
        let posts = records_to_table(&[post(5, 1, "abcd"), post(3, 1, "wxyz")]);
        let t = longest_post(&users, &posts).unwrap();
        assert_eq!(t.rows(), 1);
        assert_eq!(t.str_col("title").unwrap()[0], "post 3");
        assert_eq!(t.i64_col("body_length").unwrap(), &[4]);
    }

    #[test]
    fn body_length_counts_chars_not_bytes() {
        let users = records_to_table(&[user(1, "A")]);
        // 6 chars, 12 bytes in UTF-8
        let posts = records_to_table(&[post(1, 1, "привет")]);
        let t = longest_post(&users, &posts).unwrap();
        assert_eq!(t.i64_col("body_length").unwrap(), &[6]);
    }

    #[test]
    fn avg_ties_order_by_name() {
        let users = records_to_table(&[user(2, "Zoe"), user(1, "Ann")]);
        let posts = records_to_table(&[post(1, 2, "aa"), post(2, 1, "bb")]);
        let t = avg_post_length(&users, &posts).unwrap();
        assert_eq!(
            t.str_col("name").unwrap(),
            &["Ann".to_string(), "Zoe".to_string()]
        );
    }
}
