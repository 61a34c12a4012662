//! End-to-end generation against PostgreSQL through `PgLedger`.

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use billbook_core::executor::{generate_month, update_generated_amount};
use billbook_core::maintenance::{reset_all, seed_sample_data};
use billbook_core::planner::{AmountEdit, PlanSession, build_plan};
use billbook_core::registry::TemplateRegistry;
use billbook_core::store::{
    BillDraft, BillRepository, ClearedCounts, MarkerRepository, PgLedger, TemplateDraft,
    TemplateRepository,
};
use billbook_core::{EngineError, Month};
use billbook_db::models::{BillStatus, Category};
use billbook_test_utils::TestDb;

fn month(s: &str) -> Month {
    s.parse().unwrap()
}

#[tokio::test]
async fn generate_twice_creates_once() {
    let db = TestDb::create().await;
    let store = PgLedger::new(db.pool.clone());
    let registry = TemplateRegistry::new(&store);

    let rent = registry
        .create(TemplateDraft {
            title: "Rent".into(),
            category: Category::Housing,
            default_amount: dec!(1200),
            due_day: 5,
            active: true,
        })
        .await
        .unwrap();
    let card = registry
        .create(TemplateDraft {
            title: "Card".into(),
            category: Category::CreditCard,
            default_amount: dec!(430.90),
            due_day: 31,
            active: true,
        })
        .await
        .unwrap();
    let feb = month("2024-02");

    let plan = build_plan(&store, feb).await.unwrap();
    assert_eq!(generate_month(&store, feb, &plan).await.unwrap(), 2);

    let plan = build_plan(&store, feb).await.unwrap();
    assert!(plan.iter().all(|r| r.already_generated));
    assert_eq!(generate_month(&store, feb, &plan).await.unwrap(), 0);

    let bills = store.list_bills().await.unwrap();
    assert_eq!(bills.len(), 2);
    let card_bill = bills
        .iter()
        .find(|b| b.origin_template_id == Some(card.id))
        .unwrap();
    assert_eq!(card_bill.due_date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    assert_eq!(card_bill.amount, dec!(430.90));

    let marker = store.get_marker(rent.id, feb).await.unwrap().unwrap();
    assert!(marker.generated);
    assert_eq!(marker.amount, dec!(1200));
    assert_eq!(store.list_markers().await.unwrap().len(), 2);

    db.drop_db().await;
}

#[tokio::test]
async fn session_edits_reach_bill_and_marker() {
    let db = TestDb::create().await;
    let store = PgLedger::new(db.pool.clone());
    let power = TemplateRegistry::new(&store)
        .create(TemplateDraft {
            title: "Power".into(),
            category: Category::Electricity,
            default_amount: dec!(100),
            due_day: 12,
            active: true,
        })
        .await
        .unwrap();
    let m = month("2024-07");

    let mut session = PlanSession::open(&store, m).await.unwrap();
    assert_eq!(session.set_amount(power.id, dec!(150)).await.unwrap(), AmountEdit::Held);
    assert_eq!(session.generate().await.unwrap(), 1);

    assert_eq!(
        session.set_amount(power.id, dec!(162.37)).await.unwrap(),
        AmountEdit::WrittenThrough
    );

    let marker = store.get_marker(power.id, m).await.unwrap().unwrap();
    assert_eq!(marker.amount, dec!(162.37));
    let bills = store.list_bills().await.unwrap();
    assert_eq!(bills.len(), 1);
    assert_eq!(bills[0].amount, dec!(162.37));
    assert_eq!(bills[0].status, BillStatus::Pending);

    db.drop_db().await;
}

#[tokio::test]
async fn ambiguous_legacy_bills_leave_marker_untouched() {
    let db = TestDb::create().await;
    let store = PgLedger::new(db.pool.clone());
    let water = TemplateRegistry::new(&store)
        .create(TemplateDraft {
            title: "Water".into(),
            category: Category::Water,
            default_amount: dec!(60),
            due_day: 10,
            active: true,
        })
        .await
        .unwrap();
    let m = month("2024-08");

    let legacy = BillDraft {
        title: "Water".into(),
        category: Category::Water,
        amount: dec!(60),
        due_date: NaiveDate::from_ymd_opt(2024, 8, 10).unwrap(),
        status: BillStatus::Pending,
        origin_template_id: None,
    };
    store.create_bill(&legacy).await.unwrap();
    store.create_bill(&legacy).await.unwrap();
    store.upsert_marker(water.id, m, dec!(60)).await.unwrap();

    let result = update_generated_amount(&store, water.id, m, dec!(75)).await;
    assert!(matches!(
        result,
        Err(EngineError::AmbiguousMatch { candidates: 2, .. })
    ));

    let marker = store.get_marker(water.id, m).await.unwrap().unwrap();
    assert_eq!(marker.amount, dec!(60));
    assert!(store.list_bills().await.unwrap().iter().all(|b| b.amount == dec!(60)));

    db.drop_db().await;
}

#[tokio::test]
async fn seed_then_reset_empties_every_table() {
    let db = TestDb::create().await;
    let store = PgLedger::new(db.pool.clone());
    let today = NaiveDate::from_ymd_opt(2024, 9, 20).unwrap();

    let seeded = seed_sample_data(&store, today).await.unwrap();
    assert_eq!((seeded.bills, seeded.templates), (8, 3));
    let sep = month("2024-09");
    let plan = build_plan(&store, sep).await.unwrap();
    assert_eq!(generate_month(&store, sep, &plan).await.unwrap(), 3);

    let cleared = reset_all(&store).await.unwrap();
    assert_eq!(
        cleared,
        ClearedCounts {
            bills: 11,
            templates: 3,
            markers: 3,
        }
    );
    assert!(store.list_bills().await.unwrap().is_empty());
    assert!(store.list_templates().await.unwrap().is_empty());
    assert!(store.list_markers().await.unwrap().is_empty());

    db.drop_db().await;
}
