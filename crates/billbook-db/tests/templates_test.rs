//! Integration tests for recurring template CRUD.
//!
//! Each test runs against its own migrated database on the shared test
//! server (see `billbook-test-utils`).

use rust_decimal_macros::dec;

use billbook_db::models::Category;
use billbook_db::queries::templates::{self, NewTemplate, TemplateChanges};
use billbook_test_utils::TestDb;

fn rent() -> NewTemplate<'static> {
    NewTemplate {
        title: "Rent",
        category: Category::Housing,
        default_amount: dec!(1200.00),
        due_day: 5,
        active: true,
    }
}

#[tokio::test]
async fn insert_and_get_template() {
    let db = TestDb::create().await;

    let inserted = templates::insert_template(&db.pool, &rent())
        .await
        .expect("insert should succeed");
    assert_eq!(inserted.title, "Rent");
    assert_eq!(inserted.category, Category::Housing);
    assert_eq!(inserted.default_amount, dec!(1200.00));
    assert_eq!(inserted.due_day, 5);
    assert!(inserted.active);

    let fetched = templates::get_template(&db.pool, inserted.id)
        .await
        .expect("get should succeed")
        .expect("template should exist");
    assert_eq!(fetched, inserted);

    db.drop_db().await;
}

#[tokio::test]
async fn list_includes_inactive_templates() {
    let db = TestDb::create().await;

    templates::insert_template(&db.pool, &rent()).await.unwrap();
    let gym = NewTemplate {
        title: "Gym",
        category: Category::Leisure,
        default_amount: dec!(89.90),
        due_day: 10,
        active: false,
    };
    templates::insert_template(&db.pool, &gym).await.unwrap();

    let all = templates::list_templates(&db.pool).await.unwrap();
    let titles: Vec<&str> = all.iter().map(|t| t.title.as_str()).collect();
    assert_eq!(titles, vec!["Gym", "Rent"]);

    db.drop_db().await;
}

#[tokio::test]
async fn partial_update_touches_only_given_fields() {
    let db = TestDb::create().await;

    let t = templates::insert_template(&db.pool, &rent()).await.unwrap();
    let changes = TemplateChanges {
        default_amount: Some(dec!(1250.50)),
        active: Some(false),
        ..Default::default()
    };
    let found = templates::update_template(&db.pool, t.id, &changes)
        .await
        .unwrap();
    assert!(found);

    let after = templates::get_template(&db.pool, t.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.title, "Rent");
    assert_eq!(after.due_day, 5);
    assert_eq!(after.default_amount, dec!(1250.50));
    assert!(!after.active);

    db.drop_db().await;
}

#[tokio::test]
async fn update_and_delete_missing_id_report_false() {
    let db = TestDb::create().await;

    let missing = uuid::Uuid::new_v4();
    let changes = TemplateChanges {
        title: Some("Nothing"),
        ..Default::default()
    };
    assert!(!templates::update_template(&db.pool, missing, &changes).await.unwrap());
    assert!(!templates::delete_template(&db.pool, missing).await.unwrap());

    db.drop_db().await;
}

#[tokio::test]
async fn check_constraints_reject_bad_rows() {
    let db = TestDb::create().await;

    let bad_day = NewTemplate {
        due_day: 32,
        ..rent()
    };
    assert!(templates::insert_template(&db.pool, &bad_day).await.is_err());

    let bad_amount = NewTemplate {
        default_amount: dec!(0.00),
        ..rent()
    };
    assert!(templates::insert_template(&db.pool, &bad_amount).await.is_err());

    db.drop_db().await;
}
