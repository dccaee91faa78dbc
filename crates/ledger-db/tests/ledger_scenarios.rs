//! End-to-end ledger scenarios against an in-memory database, through the
//! public API only.

use chrono::NaiveDate;
use ledger_core::{
    AgentInput, CoreError, CustomerInput, CustomerKind, DriverInput, ListQuery, Money, Product,
    ProductInput, PurchaseInput, Quantity, SalaryPaymentInput, SaleInput, StockPolicy,
    SupplierInput, TransportJobInput, TruckInput,
};
use ledger_db::{Database, DbConfig, DbError};

// =============================================================================
// Fixture
// =============================================================================

struct Ledger {
    db: Database,
    maize: Product,
    agent_id: String,
    supplier_id: String,
    customer_id: String,
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
}

fn units(n: i64) -> Quantity {
    Quantity::from_units(n)
}

impl Ledger {
    async fn open(policy: StockPolicy) -> Self {
        Self::open_with(DbConfig::in_memory().stock_policy(policy)).await
    }

    async fn open_with(config: DbConfig) -> Self {
        let db = Database::new(config).await.unwrap();

        let maize = db
            .products()
            .create(&ProductInput {
                name: "Maize".to_string(),
                description: None,
                average_purchase_price: Money::from_major(8),
                sale_price: Money::from_major(10),
            })
            .await
            .unwrap();
        let agent = db
            .agents()
            .create(&AgentInput {
                last_name: "Bio".to_string(),
                first_name: "Safi".to_string(),
                phone: "97000000".to_string(),
                address: "Parakou".to_string(),
                position: "Buyer".to_string(),
                hire_date: day(1),
                base_salary: Money::from_major(50_000),
            })
            .await
            .unwrap();
        let supplier = db
            .suppliers()
            .create(&SupplierInput {
                last_name: "Dossou".to_string(),
                village: "Kalalé".to_string(),
                phone: "97111111".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let customer = db
            .customers()
            .create(&CustomerInput {
                last_name: "Agro Nord".to_string(),
                kind: CustomerKind::Enterprise,
                phone: "21000000".to_string(),
                address: "Cotonou".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        Ledger {
            db,
            maize,
            agent_id: agent.id,
            supplier_id: supplier.id,
            customer_id: customer.id,
        }
    }

    fn purchase(&self, quantity: i64) -> PurchaseInput {
        PurchaseInput {
            reference: None,
            product_id: self.maize.id.clone(),
            supplier_id: self.supplier_id.clone(),
            agent_id: self.agent_id.clone(),
            quantity: units(quantity),
            unit_price: Money::from_major(8),
            transport_cost: Money::zero(),
            purchase_date: day(2),
            distance_to_hub: None,
            notes: None,
        }
    }

    fn sale(&self, quantity: i64, received: i64) -> SaleInput {
        SaleInput {
            reference: None,
            product_id: self.maize.id.clone(),
            customer_id: self.customer_id.clone(),
            agent_id: self.agent_id.clone(),
            quantity: units(quantity),
            unit_price: Money::from_major(10),
            amount_received: Money::from_major(received),
            sale_date: day(3),
            notes: None,
        }
    }

    async fn stock(&self) -> Quantity {
        self.db
            .products()
            .get_by_id(&self.maize.id)
            .await
            .unwrap()
            .unwrap()
            .stock_quantity
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn purchase_then_sale_then_settle() {
    for (policy, stock_after_edit) in [
        (StockPolicy::Incremental, 70),
        (StockPolicy::Immutable, 70),
        (StockPolicy::Reapply, 40),
    ] {
        let ledger = Ledger::open(policy).await;
        assert!(ledger.stock().await.is_zero());

        ledger.db.purchases().create(&ledger.purchase(100)).await.unwrap();
        assert_eq!(ledger.stock().await, units(100));

        let sale = ledger.db.sales().create(&ledger.sale(30, 250)).await.unwrap();
        assert_eq!(ledger.stock().await, units(70));
        assert_eq!(sale.total(), Money::from_major(300));
        assert_eq!(sale.balance_due, Money::from_major(50));

        let settled = ledger
            .db
            .sales()
            .update(&sale.id, &ledger.sale(30, 300))
            .await
            .unwrap();
        assert!(settled.balance_due.is_zero(), "policy {policy}");
        assert_eq!(ledger.stock().await, units(stock_after_edit), "policy {policy}");

        let report = ledger.db.products().reconcile_stock(&ledger.maize.id).await.unwrap();
        assert_eq!(report.is_consistent(), policy != StockPolicy::Reapply);
    }
}

#[tokio::test]
async fn stock_tracks_history_through_edits_and_deletes() {
    let ledger = Ledger::open(StockPolicy::Incremental).await;

    let first = ledger.db.purchases().create(&ledger.purchase(100)).await.unwrap();
    let second = ledger.db.purchases().create(&ledger.purchase(40)).await.unwrap();
    let sale = ledger.db.sales().create(&ledger.sale(30, 0)).await.unwrap();

    ledger.db.purchases().update(&first.id, &ledger.purchase(80)).await.unwrap();
    ledger.db.sales().update(&sale.id, &ledger.sale(45, 0)).await.unwrap();
    ledger.db.purchases().delete(&second.id).await.unwrap();

    // 80 purchased, 45 sold
    assert_eq!(ledger.stock().await, units(35));
    assert!(ledger
        .db
        .products()
        .reconcile_stock(&ledger.maize.id)
        .await
        .unwrap()
        .is_consistent());
}

#[tokio::test]
async fn immutable_policy_freezes_quantity() {
    let ledger = Ledger::open(StockPolicy::Immutable).await;
    let sale = ledger.db.sales().create(&ledger.sale(30, 250)).await.unwrap();

    let err = ledger
        .db
        .sales()
        .update(&sale.id, &ledger.sale(31, 250))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::Core(CoreError::StockFieldsLocked { .. })));

    // The rejected edit left the row alone
    let stored = ledger.db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
    assert_eq!(stored.quantity, units(30));
    assert_eq!(ledger.stock().await, units(-30));
}

#[tokio::test]
async fn duplicate_references_fail_in_every_table() {
    let ledger = Ledger::open(StockPolicy::Incremental).await;
    let db = &ledger.db;

    let mut purchase = ledger.purchase(10);
    purchase.reference = Some("REF-1".to_string());
    db.purchases().create(&purchase).await.unwrap();
    assert!(db.purchases().create(&purchase).await.unwrap_err().is_unique_violation());
    // The failed insert did not touch stock
    assert_eq!(ledger.stock().await, units(10));

    let mut sale = ledger.sale(5, 50);
    sale.reference = Some("REF-1".to_string());
    db.sales().create(&sale).await.unwrap();
    assert!(db.sales().create(&sale).await.unwrap_err().is_unique_violation());
    assert_eq!(ledger.stock().await, units(5));

    let driver = db
        .drivers()
        .create(&DriverInput {
            last_name: "Gado".to_string(),
            first_name: "Issa".to_string(),
            phone: "95000000".to_string(),
            city: "Parakou".to_string(),
        })
        .await
        .unwrap();
    let truck = db
        .trucks()
        .create(&TruckInput {
            plate: "AB 1234 RB".to_string(),
            capacity_tons: units(30),
            ..Default::default()
        })
        .await
        .unwrap();
    let transport = TransportJobInput {
        reference: Some("REF-1".to_string()),
        truck_id: truck.id.clone(),
        driver_id: driver.id.clone(),
        transport_date: day(4),
        destination: "Cotonou".to_string(),
        price_paid: Money::from_major(40_000),
        purchase_id: None,
        sale_id: None,
        notes: None,
    };
    db.transports().create(&transport).await.unwrap();
    assert!(db.transports().create(&transport).await.unwrap_err().is_unique_violation());

    let salary = SalaryPaymentInput {
        reference: Some("REF-1".to_string()),
        agent_id: ledger.agent_id.clone(),
        period_start: day(1),
        period_end: day(31),
        amount: Money::from_major(50_000),
        payment_date: day(31),
    };
    db.salary_payments().create(&salary).await.unwrap();
    assert!(db.salary_payments().create(&salary).await.unwrap_err().is_unique_violation());
}

#[tokio::test]
async fn product_delete_cascades_to_trades() {
    let ledger = Ledger::open(StockPolicy::Incremental).await;
    let db = &ledger.db;

    db.purchases().create(&ledger.purchase(100)).await.unwrap();
    db.sales().create(&ledger.sale(30, 250)).await.unwrap();

    db.products().delete(&ledger.maize.id).await.unwrap();

    assert!(db.purchases().list(&ListQuery::new()).await.unwrap().is_empty());
    assert!(db.sales().list(&ListQuery::new()).await.unwrap().is_empty());
    assert!(db.sales().outstanding_balances().await.unwrap().is_empty());
}

#[tokio::test]
async fn party_deletes_keep_stock_consistent() {
    let ledger = Ledger::open(StockPolicy::Incremental).await;
    let db = &ledger.db;

    db.purchases().create(&ledger.purchase(100)).await.unwrap();
    db.sales().create(&ledger.sale(30, 250)).await.unwrap();

    db.customers().delete(&ledger.customer_id).await.unwrap();
    assert_eq!(ledger.stock().await, units(100));

    db.suppliers().delete(&ledger.supplier_id).await.unwrap();
    assert!(ledger.stock().await.is_zero());

    let report = db.products().reconcile_stock(&ledger.maize.id).await.unwrap();
    assert!(report.is_consistent());
    assert!(report.purchased.is_zero());
}

#[tokio::test]
async fn dangling_references_are_rejected() {
    let ledger = Ledger::open(StockPolicy::Incremental).await;

    let mut sale = ledger.sale(5, 0);
    sale.customer_id = "550e8400-e29b-41d4-a716-446655440000".to_string();

    let err = ledger.db.sales().create(&sale).await.unwrap_err();
    assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    assert!(ledger.stock().await.is_zero());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_edits_on_a_file_database_all_commit() {
    let dir = tempfile::tempdir().unwrap();
    let ledger = Ledger::open_with(DbConfig::new(dir.path().join("ledger.db"))).await;

    let mut purchase_ids = Vec::new();
    for _ in 0..5 {
        let purchase = ledger.db.purchases().create(&ledger.purchase(100)).await.unwrap();
        purchase_ids.push(purchase.id);
    }
    let mut sale_ids = Vec::new();
    for _ in 0..5 {
        let sale = ledger.db.sales().create(&ledger.sale(10, 0)).await.unwrap();
        sale_ids.push(sale.id);
    }

    let mut tasks = Vec::new();
    for n in 0..100 {
        let db = ledger.db.clone();
        let id = sale_ids[n % sale_ids.len()].clone();
        let input = ledger.sale(10 + (n % 7) as i64, 0);
        tasks.push(tokio::spawn(async move { db.sales().update(&id, &input).await.map(|_| ()) }));
    }
    // Deletes read the row before writing too
    for id in purchase_ids.iter().skip(3).cloned() {
        let db = ledger.db.clone();
        tasks.push(tokio::spawn(async move { db.purchases().delete(&id).await }));
    }

    let mut failures = Vec::new();
    for task in tasks {
        if let Err(e) = task.await.unwrap() {
            failures.push(e.to_string());
        }
    }
    assert!(failures.is_empty(), "{} saves failed: {:?}", failures.len(), failures.first());

    let mut sold = Quantity::zero();
    for id in &sale_ids {
        sold += ledger.db.sales().get_by_id(id).await.unwrap().unwrap().quantity;
    }
    assert_eq!(ledger.stock().await, units(300) - sold);

    let report = ledger.db.products().reconcile_stock(&ledger.maize.id).await.unwrap();
    assert!(report.is_consistent());

    ledger.db.close().await;
}
