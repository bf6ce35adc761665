use sql_mapper::prelude::*;

mod common;
use common::{User, sqlite_pool, user};

#[tokio::test]
async fn save_find_update_remove() -> Result<(), SqlMapperError> {
    let dir = tempfile::tempdir()?;
    let pool = sqlite_pool(&dir, |cfg| cfg).await?;

    let mut ada = user("ada", "ada@example.com", true, 30);
    let outcome = ada.save(&pool).await?;
    assert!(outcome.is_exact());

    // the generated key was stored on the record by save
    let id = ada.get("id")?;
    assert!(ada.is_set("id"));
    assert_eq!(id.as_text().map(str::len), Some(50));

    let loaded = Record::<User>::find(&pool, id.clone())
        .await?
        .expect("saved user should be found");
    assert_eq!(loaded.get("name")?.as_text(), Some("ada"));
    assert_eq!(loaded.get("admin")?.as_bool(), Some(true));
    assert_eq!(loaded.get("score")?.as_int(), Some(30));

    ada.set("name", "ada lovelace")?;
    assert!(ada.update(&pool).await?.is_exact());
    let loaded = Record::<User>::find(&pool, id.clone()).await?.unwrap();
    assert_eq!(loaded.get("name")?.as_text(), Some("ada lovelace"));

    assert!(ada.remove(&pool).await?.is_exact());
    assert!(Record::<User>::find(&pool, id).await?.is_none());

    // a second removal matches nothing; reported, not raised
    let outcome = ada.remove(&pool).await?;
    assert_eq!(outcome.rows_affected, 0);
    assert!(!outcome.is_exact());
    Ok(())
}

#[tokio::test]
async fn update_of_missing_row_is_not_an_error() -> Result<(), SqlMapperError> {
    let dir = tempfile::tempdir()?;
    let pool = sqlite_pool(&dir, |cfg| cfg).await?;

    let mut ghost = user("ghost", "ghost@example.com", false, 0);
    ghost.set("id", "no-such-id")?;
    let outcome = ghost.update(&pool).await?;
    assert_eq!(outcome.rows_affected, 0);
    Ok(())
}

#[tokio::test]
async fn find_all_filter_order_and_limit() -> Result<(), SqlMapperError> {
    let dir = tempfile::tempdir()?;
    let pool = sqlite_pool(&dir, |cfg| cfg).await?;

    for (name, admin, score) in [("a", true, 10), ("b", false, 20), ("c", true, 30)] {
        let outcome = user(name, &format!("{name}@example.com"), admin, score)
            .save(&pool)
            .await?;
        assert!(outcome.is_exact());
    }

    let all = Record::<User>::find_all(&pool, &FindOptions::new()).await?;
    assert_eq!(all.len(), 3);

    let admins = Record::<User>::find_all(
        &pool,
        &FindOptions::new()
            .filter("`admin`=?", vec![true.into()])
            .order_by("`score` desc"),
    )
    .await?;
    let names: Vec<String> = admins
        .iter()
        .map(|u| u.get("name").unwrap().as_text().unwrap().to_string())
        .collect();
    assert_eq!(names, ["c", "a"]);

    let top = Record::<User>::find_all(
        &pool,
        &FindOptions::new().order_by("`score` desc").limit(1_u64),
    )
    .await?;
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].get("name")?.as_text(), Some("c"));

    // page 2 of size 2 over 3 rows holds the last one
    let page = Page::new(3, 2, 2);
    let rest = Record::<User>::find_all(
        &pool,
        &FindOptions::new().order_by("`score`").limit(&page),
    )
    .await?;
    assert_eq!(rest.len(), 1);
    assert_eq!(rest[0].get("score")?.as_int(), Some(30));

    let none = Record::<User>::find_all(
        &pool,
        &FindOptions::new().filter("`name`=?", vec!["zed".into()]),
    )
    .await?;
    assert!(none.is_empty());
    Ok(())
}

#[tokio::test]
async fn find_number_aggregates() -> Result<(), SqlMapperError> {
    let dir = tempfile::tempdir()?;
    let pool = sqlite_pool(&dir, |cfg| cfg).await?;

    assert_eq!(
        Record::<User>::find_number(&pool, "count(`id`)", None, &[]).await?,
        RowValues::Int(0)
    );

    for score in [5, 15, 25] {
        let _ = user("n", "n@example.com", false, score).save(&pool).await?;
    }

    let count = Record::<User>::find_number(&pool, "count(`id`)", None, &[]).await?;
    assert_eq!(count.as_int(), Some(3));

    let above = Record::<User>::find_number(
        &pool,
        "count(`id`)",
        Some("`score` > ?"),
        &[RowValues::Int(10)],
    )
    .await?;
    assert_eq!(above.as_int(), Some(2));

    // no row at all
    let missing = Record::<User>::find_number(
        &pool,
        "`score`",
        Some("`id`=?"),
        &["nope".into()],
    )
    .await?;
    assert!(missing.is_null());
    Ok(())
}

#[tokio::test]
async fn explicit_transactions_commit_and_roll_back() -> Result<(), SqlMapperError> {
    let dir = tempfile::tempdir()?;
    let pool = sqlite_pool(&dir, |cfg| cfg.with_autocommit(false)).await?;
    assert!(!pool.autocommit()?);

    let mut first = user("first", "f@example.com", false, 1);
    assert!(first.save(&pool).await?.is_exact());

    // same primary key again: the insert fails and is rolled back
    let mut clash = user("clash", "c@example.com", false, 2);
    clash.set("id", first.get("id")?)?;
    let err = clash.save(&pool).await.unwrap_err();
    assert!(matches!(err, SqlMapperError::SqliteError(_)), "{err:?}");

    // the connection is usable again and only the first row exists
    let mut second = user("second", "s@example.com", false, 3);
    assert!(second.save(&pool).await?.is_exact());
    let count = Record::<User>::find_number(&pool, "count(`id`)", None, &[]).await?;
    assert_eq!(count.as_int(), Some(2));
    Ok(())
}

#[tokio::test]
async fn select_size_caps_rows() -> Result<(), SqlMapperError> {
    let dir = tempfile::tempdir()?;
    let pool = sqlite_pool(&dir, |cfg| cfg).await?;
    for i in 0..4 {
        let _ = user("x", "x@example.com", false, i).save(&pool).await?;
    }

    let rows = pool.select("select `score` from `users` order by `score`", &[], Some(2)).await?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].get("score"), Some(&RowValues::Int(1)));

    let rows = pool.select("select `score` from `users`", &[], None).await?;
    assert_eq!(rows.len(), 4);
    Ok(())
}

#[tokio::test]
async fn pool_lifecycle_errors() -> Result<(), SqlMapperError> {
    let pool = ConnectionPool::new();
    assert!(!pool.is_initialized());
    assert!(pool.state().is_none());
    assert!(matches!(
        Record::<User>::find(&pool, "x").await,
        Err(SqlMapperError::PoolUninitialized)
    ));
    assert!(matches!(
        pool.execute("delete from `users`", &[], true).await,
        Err(SqlMapperError::PoolUninitialized)
    ));
    assert!(matches!(pool.acquire().await, Err(SqlMapperError::PoolUninitialized)));

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("lifecycle.db");
    let config = PoolConfig::new("www", "www", &path.to_string_lossy()).with_sizes(2, 4);
    pool.init(&config).await?;
    assert!(pool.is_initialized());
    assert!(pool.state().is_some_and(|s| s.connections >= 2));

    // a second initialisation is rejected and leaves the pool working
    assert!(matches!(
        pool.init(&config).await,
        Err(SqlMapperError::ConfigError(_))
    ));
    let conn = pool.acquire().await?;
    pool.release(conn);
    assert!(pool.state().is_some_and(|s| s.idle_connections >= 1));
    let rows = pool.select("select 1 as one", &[], None).await?;
    assert_eq!(rows[0].get("one"), Some(&RowValues::Int(1)));
    Ok(())
}

#[tokio::test]
async fn invalid_pool_config_is_rejected() {
    let pool = ConnectionPool::new();
    let bad = PoolConfig::new("www", "www", "x.db").with_sizes(5, 2);
    assert!(matches!(
        pool.init(&bad).await,
        Err(SqlMapperError::ConfigError(_))
    ));
    assert!(!pool.is_initialized());
}
