use async_trait::async_trait;
use futures::StreamExt;
use ibylin_core::{
    Database, RepoResult, SqliteUserDao, User, UserDao, UserId, UserListStream, UserRepository,
    UserRepositoryImpl,
};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

/// In-memory stand-in used to check that the repository only forwards.
#[derive(Default)]
struct FakeUserDao {
    rows: Mutex<BTreeMap<UserId, User>>,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeUserDao {
    fn record(&self, call: &'static str) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl UserDao for FakeUserDao {
    fn get_all_users(&self) -> UserListStream {
        self.record("get_all_users");
        let snapshot: RepoResult<Vec<User>> =
            Ok(self.rows.lock().unwrap().values().cloned().collect());
        Box::pin(futures::stream::iter([snapshot]))
    }

    async fn get_user_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        self.record("get_user_by_id");
        Ok(self.rows.lock().unwrap().get(&id).cloned())
    }

    async fn insert_user(&self, user: &User) -> RepoResult<()> {
        self.record("insert_user");
        self.rows.lock().unwrap().insert(user.id, user.clone());
        Ok(())
    }

    async fn delete_user(&self, user: &User) -> RepoResult<()> {
        self.record("delete_user");
        self.rows.lock().unwrap().remove(&user.id);
        Ok(())
    }

    async fn delete_all_users(&self) -> RepoResult<()> {
        self.record("delete_all_users");
        self.rows.lock().unwrap().clear();
        Ok(())
    }
}

#[tokio::test]
async fn repository_forwards_each_call_to_dao() {
    let dao = Arc::new(FakeUserDao::default());
    let repo = UserRepositoryImpl::new(Arc::clone(&dao));
    let user = User::new(1, "A", "a@x.com");

    repo.insert_user(&user).await.unwrap();
    assert_eq!(repo.get_user_by_id(1).await.unwrap(), Some(user.clone()));
    let listed = repo.get_users().next().await.unwrap().unwrap();
    assert_eq!(listed, vec![user.clone()]);
    repo.delete_user(&user).await.unwrap();

    assert_eq!(
        dao.calls(),
        ["insert_user", "get_user_by_id", "get_all_users", "delete_user"]
    );
    assert!(dao.rows.lock().unwrap().is_empty());
}

#[tokio::test]
async fn repository_works_as_trait_object_over_sqlite() {
    let database = Database::open_in_memory().unwrap();
    let dao = Arc::new(SqliteUserDao::try_new(database).unwrap());
    let repo: Arc<dyn UserRepository> = Arc::new(UserRepositoryImpl::new(dao));

    let mut users = repo.get_users();
    assert!(users.next().await.unwrap().unwrap().is_empty());

    repo.insert_user(&User::new(1, "A", "a@x.com")).await.unwrap();
    repo.insert_user(&User::new(1, "B", "b@x.com")).await.unwrap();
    assert_eq!(
        repo.get_user_by_id(1).await.unwrap(),
        Some(User::new(1, "B", "b@x.com"))
    );

    let latest = users.next().await.unwrap().unwrap();
    assert_eq!(latest, vec![User::new(1, "B", "b@x.com")]);
}
