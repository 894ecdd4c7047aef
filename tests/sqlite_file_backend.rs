//! SeaORM backend on a file database with a multi-connection pool.

use std::sync::Arc;

use conduit::domain::{ArticleDraft, DomainError, NewUser, RepositoryProvider, User};
use conduit::infrastructure::database::migrator::Migrator;
use conduit::{init_database, DatabaseConfig, SeaOrmRepositoryProvider};
use sea_orm_migration::MigratorTrait;
use tempfile::TempDir;

type Repos = Arc<dyn RepositoryProvider>;

async fn file_repos(dir: &TempDir) -> Repos {
    let path = dir.path().join("conduit.db");
    let mut config = DatabaseConfig::sqlite(&path.to_string_lossy());
    config.max_connections = 10;

    let db = init_database(&config).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    Arc::new(SeaOrmRepositoryProvider::new(db))
}

async fn user(repos: &Repos, name: &str) -> User {
    repos
        .users()
        .create(NewUser {
            username: name.to_string(),
            email: format!("{}@x.com", name),
            password_hash: "hash".to_string(),
        })
        .await
        .unwrap()
}

fn draft(title: &str) -> ArticleDraft {
    ArticleDraft {
        title: title.to_string(),
        description: "description".to_string(),
        body: "body".to_string(),
        tags: ["shared".to_string()].into_iter().collect(),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_writers_all_succeed() {
    let dir = tempfile::tempdir().unwrap();
    let repos = file_repos(&dir).await;
    let author = user(&repos, "author").await;
    repos.articles().create(author.id, draft("Target")).await.unwrap();

    let mut readers = Vec::new();
    for i in 0..16 {
        readers.push(user(&repos, &format!("reader{}", i)).await);
    }

    let mut tasks = Vec::new();
    for (i, reader) in readers.iter().enumerate() {
        let repos = repos.clone();
        let reader_id = reader.id;
        let author_id = author.id;
        tasks.push(tokio::spawn(async move {
            repos.articles().add_favorite("target", reader_id).await?;
            repos
                .articles()
                .add_comment("target", reader_id, "same here")
                .await?;
            repos
                .articles()
                .create(author_id, draft(&format!("Post {}", i)))
                .await?;
            Ok::<_, DomainError>(())
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let target = repos.articles().get("target").await.unwrap();
    assert_eq!(target.favorites_count(), 16);
    assert_eq!(repos.articles().comments("target").await.unwrap().len(), 16);
    let all = repos
        .articles()
        .list(conduit::shared::ListParams { offset: 0, limit: 100 })
        .await
        .unwrap();
    assert_eq!(all.total, 17);
    assert_eq!(repos.articles().tags().await.unwrap(), vec!["shared".to_string()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_follows_keep_both_sides() {
    let dir = tempfile::tempdir().unwrap();
    let repos = file_repos(&dir).await;
    let star = user(&repos, "star").await;

    let mut fans = Vec::new();
    for i in 0..12 {
        fans.push(user(&repos, &format!("fan{}", i)).await);
    }

    let mut tasks = Vec::new();
    for fan in &fans {
        let repos = repos.clone();
        let (fan_id, star_id) = (fan.id, star.id);
        tasks.push(tokio::spawn(async move {
            repos.users().add_follower(fan_id, star_id).await
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let star = repos.users().get_by_id(star.id).await.unwrap();
    assert_eq!(star.followers.len(), 12);
    for fan in &fans {
        let fan = repos.users().get_by_id(fan.id).await.unwrap();
        assert!(fan.followings.contains(&star.id));
    }
}

#[tokio::test]
async fn rows_for_missing_users_are_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let repos = file_repos(&dir).await;
    let author = user(&repos, "author").await;
    let ghost = author.id + 1000;

    let err = repos.articles().create(ghost, draft("Haunted")).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity: "user", .. }), "{:?}", err);

    repos.articles().create(author.id, draft("Real")).await.unwrap();
    let err = repos.articles().add_favorite("real", ghost).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity: "user", .. }), "{:?}", err);
    let err = repos.articles().add_comment("real", ghost, "boo").await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity: "user", .. }), "{:?}", err);
}
