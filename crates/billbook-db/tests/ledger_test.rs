//! Integration tests for bills and generation markers.

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use billbook_db::models::{BillStatus, Category};
use billbook_db::queries::bills::{self, BillChanges, NewBill};
use billbook_db::queries::markers;
use billbook_db::queries::templates::{self, NewTemplate};
use billbook_test_utils::TestDb;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn water(due_date: NaiveDate) -> NewBill<'static> {
    NewBill {
        title: "Water",
        category: Category::Water,
        amount: dec!(64.10),
        due_date,
        status: BillStatus::Pending,
        origin_template_id: None,
    }
}

#[tokio::test]
async fn insert_update_delete_bill() {
    let db = TestDb::create().await;

    let bill = bills::insert_bill(&db.pool, &water(date(2024, 3, 10)))
        .await
        .expect("insert should succeed");
    assert_eq!(bill.status, BillStatus::Pending);
    assert_eq!(bill.origin_template_id, None);

    let changes = BillChanges {
        status: Some(BillStatus::Paid),
        ..Default::default()
    };
    assert!(bills::update_bill(&db.pool, bill.id, &changes).await.unwrap());

    let after = bills::get_bill(&db.pool, bill.id).await.unwrap().unwrap();
    assert_eq!(after.status, BillStatus::Paid);
    assert_eq!(after.amount, dec!(64.10));

    assert!(bills::delete_bill(&db.pool, bill.id).await.unwrap());
    assert!(!bills::delete_bill(&db.pool, bill.id).await.unwrap());

    db.drop_db().await;
}

#[tokio::test]
async fn list_bills_newest_first() {
    let db = TestDb::create().await;

    bills::insert_bill(&db.pool, &water(date(2024, 1, 10))).await.unwrap();
    bills::insert_bill(&db.pool, &water(date(2024, 3, 10))).await.unwrap();
    bills::insert_bill(&db.pool, &water(date(2024, 2, 10))).await.unwrap();

    let dates: Vec<NaiveDate> = bills::list_bills(&db.pool)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.due_date)
        .collect();
    assert_eq!(dates, vec![date(2024, 3, 10), date(2024, 2, 10), date(2024, 1, 10)]);

    db.drop_db().await;
}

#[tokio::test]
async fn marker_upsert_never_duplicates() {
    let db = TestDb::create().await;
    let template_id = uuid::Uuid::new_v4();

    assert!(markers::get_marker(&db.pool, template_id, "2024-02").await.unwrap().is_none());

    let first = markers::upsert_marker(&db.pool, template_id, "2024-02", dec!(100.00))
        .await
        .unwrap();
    assert!(first.generated);

    let second = markers::upsert_marker(&db.pool, template_id, "2024-02", dec!(150.00))
        .await
        .unwrap();
    assert_eq!(second.amount, dec!(150.00));

    let all = markers::list_markers(&db.pool).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].amount, dec!(150.00));

    db.drop_db().await;
}

#[tokio::test]
async fn marker_amount_update_requires_generated_row() {
    let db = TestDb::create().await;
    let template_id = uuid::Uuid::new_v4();

    let missing = markers::update_marker_amount(&db.pool, template_id, "2024-05", dec!(80.00))
        .await
        .unwrap();
    assert!(!missing);
    assert!(markers::get_marker(&db.pool, template_id, "2024-05").await.unwrap().is_none());

    markers::upsert_marker(&db.pool, template_id, "2024-05", dec!(70.00))
        .await
        .unwrap();
    let updated = markers::update_marker_amount(&db.pool, template_id, "2024-05", dec!(80.00))
        .await
        .unwrap();
    assert!(updated);

    let marker = markers::get_marker(&db.pool, template_id, "2024-05")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(marker.amount, dec!(80.00));
    assert!(marker.generated);

    db.drop_db().await;
}

#[tokio::test]
async fn marker_rejects_malformed_month() {
    let db = TestDb::create().await;

    let result = markers::upsert_marker(&db.pool, uuid::Uuid::new_v4(), "2024-13", dec!(1.00)).await;
    assert!(result.is_err());

    db.drop_db().await;
}

#[tokio::test]
async fn deleting_template_keeps_bills_and_clears_origin() {
    let db = TestDb::create().await;

    let template = templates::insert_template(
        &db.pool,
        &NewTemplate {
            title: "Internet",
            category: Category::Internet,
            default_amount: dec!(99.90),
            due_day: 15,
            active: true,
        },
    )
    .await
    .unwrap();

    let generated = NewBill {
        title: "Internet",
        category: Category::Internet,
        amount: dec!(99.90),
        due_date: date(2024, 4, 15),
        status: BillStatus::Pending,
        origin_template_id: Some(template.id),
    };
    let bill = bills::insert_bill(&db.pool, &generated).await.unwrap();
    markers::upsert_marker(&db.pool, template.id, "2024-04", dec!(99.90))
        .await
        .unwrap();

    let linked =
        bills::find_by_origin_in_range(&db.pool, template.id, date(2024, 4, 1), date(2024, 4, 30))
            .await
            .unwrap();
    assert_eq!(linked.len(), 1);

    assert!(templates::delete_template(&db.pool, template.id).await.unwrap());

    let after = bills::get_bill(&db.pool, bill.id).await.unwrap().expect("bill survives");
    assert_eq!(after.origin_template_id, None);
    assert!(markers::get_marker(&db.pool, template.id, "2024-04").await.unwrap().is_some());

    let by_identity =
        bills::find_by_identity(&db.pool, "Internet", Category::Internet, date(2024, 4, 15))
            .await
            .unwrap();
    assert_eq!(by_identity.len(), 1);

    db.drop_db().await;
}

#[tokio::test]
async fn delete_all_empties_each_table() {
    let db = TestDb::create().await;

    let template = templates::insert_template(
        &db.pool,
        &NewTemplate {
            title: "Water",
            category: Category::Water,
            default_amount: dec!(64.10),
            due_day: 10,
            active: true,
        },
    )
    .await
    .unwrap();
    bills::insert_bill(&db.pool, &water(date(2024, 6, 10))).await.unwrap();
    bills::insert_bill(&db.pool, &water(date(2024, 7, 10))).await.unwrap();
    markers::upsert_marker(&db.pool, template.id, "2024-06", dec!(64.10))
        .await
        .unwrap();

    let mut tx = db.pool.begin().await.unwrap();
    assert_eq!(markers::delete_all_markers(&mut *tx).await.unwrap(), 1);
    assert_eq!(bills::delete_all_bills(&mut *tx).await.unwrap(), 2);
    assert_eq!(templates::delete_all_templates(&mut *tx).await.unwrap(), 1);
    tx.commit().await.unwrap();

    assert!(markers::list_markers(&db.pool).await.unwrap().is_empty());
    assert!(bills::list_bills(&db.pool).await.unwrap().is_empty());
    assert!(templates::list_templates(&db.pool).await.unwrap().is_empty());
    assert_eq!(bills::delete_all_bills(&db.pool).await.unwrap(), 0);

    db.drop_db().await;
}
