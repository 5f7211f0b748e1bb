use futures::StreamExt;
use ibylin_core::{
    Database, DbError, RepoError, RepoResult, SqliteUserDao, User, UserDao, UserListStream,
};
use std::time::Duration;

fn dao() -> SqliteUserDao {
    SqliteUserDao::try_new(Database::open_in_memory().unwrap()).unwrap()
}

async fn next_snapshot(stream: &mut UserListStream) -> Vec<User> {
    let item: Option<RepoResult<Vec<User>>> =
        tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("stream should emit within timeout");
    let mut users = item.expect("stream should stay open").unwrap();
    users.sort_by_key(|user| user.id);
    users
}

async fn count_rows(dao: &SqliteUserDao) -> usize {
    let mut stream = dao.get_all_users();
    next_snapshot(&mut stream).await.len()
}

#[tokio::test]
async fn insert_then_get_returns_equal_record() {
    let dao = dao();
    let user = User::new(7, "Ada", "ada@x.com").with_avatar("content://avatars/7.png");

    dao.insert_user(&user).await.unwrap();

    let loaded = dao.get_user_by_id(7).await.unwrap();
    assert_eq!(loaded, Some(user));
}

#[tokio::test]
async fn insert_with_existing_id_replaces_all_fields() {
    let dao = dao();
    dao.insert_user(&User::new(1, "A", "a@x.com").with_avatar("a.png"))
        .await
        .unwrap();
    dao.insert_user(&User::new(1, "B", "b@x.com")).await.unwrap();

    let loaded = dao.get_user_by_id(1).await.unwrap().unwrap();
    assert_eq!(loaded, User::new(1, "B", "b@x.com"));
    assert!(loaded.avatar.is_none(), "replace must not merge old fields");
    assert_eq!(count_rows(&dao).await, 1);
}

#[tokio::test]
async fn get_unknown_id_returns_none() {
    let dao = dao();
    dao.insert_user(&User::new(1, "A", "a@x.com")).await.unwrap();

    assert!(dao.get_user_by_id(2).await.unwrap().is_none());
    assert!(dao.get_user_by_id(-1).await.unwrap().is_none());
    assert!(dao.get_user_by_id(i64::MAX).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_matches_by_id_only() {
    let dao = dao();
    dao.insert_user(&User::new(3, "C", "c@x.com")).await.unwrap();

    // Other fields of the argument are ignored.
    dao.delete_user(&User::new(3, "stale", "stale@x.com"))
        .await
        .unwrap();
    assert!(dao.get_user_by_id(3).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_absent_record_is_noop() {
    let dao = dao();
    dao.insert_user(&User::new(1, "A", "a@x.com")).await.unwrap();
    dao.insert_user(&User::new(2, "B", "b@x.com")).await.unwrap();

    dao.delete_user(&User::new(99, "Z", "z@x.com")).await.unwrap();
    assert_eq!(count_rows(&dao).await, 2);
}

#[tokio::test]
async fn delete_all_clears_every_row() {
    let dao = dao();
    let users = [User::new(1, "A", "a@x.com"), User::new(2, "B", "b@x.com")];
    for user in &users {
        dao.insert_user(user).await.unwrap();
    }

    dao.delete_all_users().await.unwrap();

    for user in &users {
        assert!(dao.get_user_by_id(user.id).await.unwrap().is_none());
    }
    assert_eq!(count_rows(&dao).await, 0);
}

#[tokio::test]
async fn stream_emits_current_snapshot_first() {
    let dao = dao();
    dao.insert_user(&User::new(1, "A", "a@x.com")).await.unwrap();

    let mut stream = dao.get_all_users();
    assert_eq!(next_snapshot(&mut stream).await, vec![User::new(1, "A", "a@x.com")]);
}

#[tokio::test]
async fn stream_emits_new_snapshot_after_each_write() {
    let dao = dao();
    let mut stream = dao.get_all_users();
    assert!(next_snapshot(&mut stream).await.is_empty());

    dao.insert_user(&User::new(1, "A", "a@x.com")).await.unwrap();
    assert_eq!(next_snapshot(&mut stream).await.len(), 1);

    dao.insert_user(&User::new(1, "A2", "a2@x.com")).await.unwrap();
    assert_eq!(
        next_snapshot(&mut stream).await,
        vec![User::new(1, "A2", "a2@x.com")]
    );
}

#[tokio::test]
async fn stream_emits_empty_list_after_delete_all() {
    let dao = dao();
    let mut stream = dao.get_all_users();
    assert!(next_snapshot(&mut stream).await.is_empty());

    dao.insert_user(&User::new(1, "A", "a@x.com")).await.unwrap();
    dao.insert_user(&User::new(2, "B", "b@x.com")).await.unwrap();
    let populated = next_snapshot(&mut stream).await;
    assert_eq!(populated.len(), 2, "writes are coalesced into one snapshot");

    dao.delete_all_users().await.unwrap();
    assert!(next_snapshot(&mut stream).await.is_empty());
}

#[tokio::test]
async fn noop_delete_does_not_wake_subscribers() {
    let dao = dao();
    let mut stream = dao.get_all_users();
    assert!(next_snapshot(&mut stream).await.is_empty());

    dao.delete_user(&User::new(5, "E", "e@x.com")).await.unwrap();
    let pending = tokio::time::timeout(Duration::from_millis(100), stream.next()).await;
    assert!(pending.is_err(), "no row changed, no snapshot expected");
}

#[tokio::test]
async fn independent_subscribers_each_receive_updates() {
    let dao = dao();
    let mut first = dao.get_all_users();
    let mut second = dao.get_all_users();
    next_snapshot(&mut first).await;
    next_snapshot(&mut second).await;

    dao.insert_user(&User::new(4, "D", "d@x.com")).await.unwrap();
    assert_eq!(next_snapshot(&mut first).await.len(), 1);

    drop(first);
    dao.insert_user(&User::new(5, "E", "e@x.com")).await.unwrap();
    assert_eq!(next_snapshot(&mut second).await.len(), 2);
}

#[tokio::test]
async fn storage_failures_propagate_unchanged() {
    let database = Database::open_in_memory().unwrap();
    let dao = SqliteUserDao::try_new(database.clone()).unwrap();
    database
        .with_connection(|conn| {
            conn.execute_batch("DROP TABLE users;")
                .map_err(DbError::from)
        })
        .unwrap();

    let err = dao.get_user_by_id(1).await.unwrap_err();
    assert!(matches!(err, RepoError::Db(DbError::Sqlite(_))));

    let err = dao
        .insert_user(&User::new(1, "A", "a@x.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Db(DbError::Sqlite(_))));
}

#[test]
fn try_new_rejects_database_without_users_table() {
    let database = Database::open_in_memory().unwrap();
    database
        .with_connection(|conn| {
            conn.execute_batch("DROP TABLE users;")
                .map_err(DbError::from)
        })
        .unwrap();

    let err = SqliteUserDao::try_new(database).err().unwrap();
    assert!(matches!(err, RepoError::Db(DbError::MissingTable("users"))));
}
