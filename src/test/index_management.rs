use pretty_assertions::assert_eq;

use crate::{
    bson::doc,
    options::IndexOptions,
    test::util::MockPool,
    IndexModel,
};

fn xy_index() -> IndexModel {
    IndexModel::builder().keys(doc! { "x": 1, "y": 1 }).build()
}

#[tokio::test]
async fn ensure_index_creates_once() {
    let pool = MockPool::new();
    let coll = pool.collection();

    coll.ensure_index(xy_index()).await.unwrap();
    coll.ensure_index(xy_index()).await.unwrap();

    assert_eq!(
        pool.commands_named("createIndexes"),
        vec![doc! {
            "createIndexes": "coll",
            "indexes": [{ "key": { "x": 1, "y": 1 }, "name": "x_1_y_1" }],
        }]
    );
    assert!(coll.index_cache().contains("x_1_y_1").await);
}

#[tokio::test]
async fn clones_share_the_cache() {
    let pool = MockPool::new();
    let coll = pool.collection();

    coll.ensure_index(xy_index()).await.unwrap();
    coll.clone().ensure_index(xy_index()).await.unwrap();

    assert_eq!(pool.commands_named("createIndexes").len(), 1);
}

#[tokio::test]
async fn drop_index_clears_cache() {
    let pool = MockPool::new();
    let coll = pool.collection();

    coll.ensure_index(xy_index()).await.unwrap();
    coll.drop_index("x_1_y_1").await.unwrap();
    coll.ensure_index(xy_index()).await.unwrap();

    assert_eq!(pool.commands_named("createIndexes").len(), 2);
    assert_eq!(
        pool.commands_named("dropIndexes"),
        vec![doc! { "dropIndexes": "coll", "index": "x_1_y_1" }]
    );
}

#[tokio::test]
async fn drop_by_keys_and_drop_all() {
    let pool = MockPool::new();
    let coll = pool.collection();

    coll.drop_index_by_keys(&doc! { "a": 1, "b": -1 })
        .await
        .unwrap();
    coll.drop_indexes().await.unwrap();

    assert_eq!(
        pool.commands_named("dropIndexes"),
        vec![
            doc! { "dropIndexes": "coll", "index": "a_1_b_-1" },
            doc! { "dropIndexes": "coll", "index": "*" },
        ]
    );
}

#[tokio::test]
async fn failed_drop_still_clears_cache() {
    let pool = MockPool::new();
    let coll = pool.collection();

    coll.ensure_index(xy_index()).await.unwrap();
    pool.set_command_error(Some(doc! { "ok": 0, "errmsg": "index not found", "code": 27 }));
    assert!(coll.drop_index("x_1_y_1").await.is_err());
    assert!(!coll.index_cache().contains("x_1_y_1").await);

    pool.set_command_error(None);
    coll.ensure_index(xy_index()).await.unwrap();
    assert_eq!(pool.commands_named("createIndexes").len(), 2);
}

#[tokio::test]
async fn failed_create_is_not_cached() {
    let pool = MockPool::new();
    let coll = pool.collection();

    pool.set_command_error(Some(doc! { "ok": 0, "errmsg": "bad index", "code": 67 }));
    assert!(coll.ensure_index(xy_index()).await.is_err());
    assert!(!coll.index_cache().contains("x_1_y_1").await);

    pool.set_command_error(None);
    coll.ensure_index(xy_index()).await.unwrap();
    assert_eq!(pool.commands_named("createIndexes").len(), 2);
    assert_eq!(pool.check_outs(), pool.check_ins());
}

#[tokio::test]
async fn create_index_bypasses_cache() {
    let pool = MockPool::new();
    let coll = pool.collection();

    let reply = coll.create_index(xy_index()).await.unwrap();
    assert_eq!(reply, doc! { "ok": 1.0 });
    assert!(!coll.index_cache().contains("x_1_y_1").await);

    coll.ensure_index(xy_index()).await.unwrap();
    coll.create_index(xy_index()).await.unwrap();
    assert_eq!(pool.commands_named("createIndexes").len(), 3);
}

#[tokio::test]
async fn explicit_name_is_the_cache_key() {
    let pool = MockPool::new();
    let coll = pool.collection();
    let named = IndexModel::builder()
        .keys(doc! { "x": 1, "y": 1 })
        .options(
            IndexOptions::builder()
                .name("by_xy".to_string())
                .unique(true)
                .build(),
        )
        .build();

    coll.ensure_index(named.clone()).await.unwrap();
    coll.ensure_index(xy_index()).await.unwrap();
    coll.ensure_index(named).await.unwrap();

    let creates = pool.commands_named("createIndexes");
    assert_eq!(creates.len(), 2);
    assert_eq!(
        creates[0],
        doc! {
            "createIndexes": "coll",
            "indexes": [{ "key": { "x": 1, "y": 1 }, "name": "by_xy", "unique": true }],
        }
    );
}

#[tokio::test]
async fn concurrent_ensure_index_creates_once() {
    let pool = MockPool::new();
    let coll = pool.collection();

    let (first, second, third) = futures::join!(
        coll.ensure_index(xy_index()),
        coll.ensure_index(xy_index()),
        coll.ensure_index(xy_index())
    );
    first.unwrap();
    second.unwrap();
    third.unwrap();

    assert_eq!(pool.commands_named("createIndexes").len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ensure_index_across_tasks() {
    let pool = MockPool::new();
    let coll = pool.collection();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let coll = coll.clone();
            tokio::spawn(async move { coll.ensure_index(xy_index()).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(pool.commands_named("createIndexes").len(), 1);
}

#[tokio::test]
async fn index_exists_lists_indexes() {
    let pool = MockPool::new();
    pool.set_indexes(&["_id_", "x_1_y_1"]);
    let coll = pool.collection();

    assert!(coll.index_exists("x_1_y_1").await.unwrap());
    assert!(!coll.index_exists("z_1").await.unwrap());
    assert!(!coll.index_cache().contains("x_1_y_1").await);
    assert_eq!(
        pool.commands_named("listIndexes"),
        vec![doc! { "listIndexes": "coll" }; 2]
    );
}

#[tokio::test]
async fn reset_and_drop_clear_cache() {
    let pool = MockPool::new();
    let coll = pool.collection();

    coll.ensure_index(xy_index()).await.unwrap();
    coll.reset_index_cache().await;
    assert!(!coll.index_cache().contains("x_1_y_1").await);

    coll.ensure_index(xy_index()).await.unwrap();
    let reply = coll.drop().await.unwrap();
    assert_eq!(reply, doc! { "ok": 1.0 });
    assert!(!coll.index_cache().contains("x_1_y_1").await);
    assert_eq!(pool.commands_named("drop"), vec![doc! { "drop": "coll" }]);
}
