//! # Demo Data Seeder
//!
//! Populates a ledger database with a small demo data set, then prints a
//! short report: product stock and margins, balances owed by customers and
//! the most recent purchases.
//!
//! ## Usage
//! ```bash
//! # Seed ./ledger.db (or LEDGER_DB_PATH)
//! cargo run -p ledger-db --bin seed
//!
//! # Another file and stock policy
//! cargo run -p ledger-db --bin seed -- --db ./data/demo.db --policy reapply
//!
//! # Machine-readable report
//! cargo run -p ledger-db --bin seed -- --json
//! ```
//!
//! A database that already has products is not seeded again; the report is
//! printed either way.

use chrono::{Duration, NaiveDate, Utc};
use ledger_core::{
    AgentInput, CustomerInput, CustomerKind, DriverInput, ListQuery, Money, MoneyRange,
    ProductInput, PurchaseInput, Quantity, SalaryPaymentInput, SaleInput, StockPolicy,
    SupplierInput, TransportJobInput, TruckInput, TruckStatus,
};
use ledger_db::{Database, DbConfig};
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// (name, average purchase price, sale price)
const PRODUCTS: &[(&str, i64, i64)] = &[
    ("Maize", 180, 250),
    ("Soy", 260, 340),
    ("Cashew nuts", 550, 700),
    ("Shea butter", 900, 1_150),
];

/// (last name, first name, village)
const SUPPLIERS: &[(&str, Option<&str>, &str)] = &[
    ("Dossou", Some("Koffi"), "Kalalé"),
    ("Yarou", None, "Nikki"),
    ("Sabi", Some("Mariam"), "Bembèrèkè"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut config = DbConfig::from_env()?;
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    config.database_path = args[i + 1].clone().into();
                    i += 1;
                }
            }
            "--policy" | "-p" => {
                if i + 1 < args.len() {
                    config = config.stock_policy(args[i + 1].parse::<StockPolicy>()?);
                    i += 1;
                }
            }
            "--json" => json = true,
            "--help" | "-h" => {
                println!("Trade Ledger Demo Seeder");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>       Database file path (default: $LEDGER_DB_PATH or ./ledger.db)");
                println!("  -p, --policy <NAME>   Stock policy: incremental, reapply, immutable");
                println!("      --json            Print the report as JSON");
                println!("  -h, --help            Show this help message");
                return Ok(());
            }
            other => {
                eprintln!("Ignoring unknown argument: {}", other);
            }
        }
        i += 1;
    }

    init_tracing();

    let db = Database::new(config.clone()).await?;
    info!(
        path = %config.database_path.display(),
        policy = %db.stock_policy(),
        "Connected"
    );

    let existing = db.products().count().await?;
    if existing > 0 {
        info!(products = existing, "Database already populated, skipping seed");
    } else {
        let start = std::time::Instant::now();
        seed(&db).await?;
        info!(elapsed = ?start.elapsed(), "Seed complete");
    }

    report(&db, json).await?;

    db.close().await;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,ledger_db=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Inserts the demo data set through the repositories, so stock and
/// balances come out exactly as a user would have produced them.
async fn seed(db: &Database) -> Result<(), Box<dyn std::error::Error>> {
    let today = Utc::now().date_naive();
    let days_ago = |n: i64| today - Duration::days(n);

    let mut products = Vec::with_capacity(PRODUCTS.len());
    for (name, average, sale) in PRODUCTS {
        let product = db
            .products()
            .create(&ProductInput {
                name: name.to_string(),
                description: None,
                average_purchase_price: Money::from_major(*average),
                sale_price: Money::from_major(*sale),
            })
            .await?;
        products.push(product);
    }

    let buyer = db
        .agents()
        .create(&AgentInput {
            last_name: "Bio".to_string(),
            first_name: "Safi".to_string(),
            phone: "97000001".to_string(),
            address: "Parakou".to_string(),
            position: "Buyer".to_string(),
            hire_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap_or(today),
            base_salary: Money::from_major(85_000),
        })
        .await?;
    let seller = db
        .agents()
        .create(&AgentInput {
            last_name: "Chabi".to_string(),
            first_name: "Rachida".to_string(),
            phone: "97000002".to_string(),
            address: "Cotonou".to_string(),
            position: "Seller".to_string(),
            hire_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap_or(today),
            base_salary: Money::from_major(75_000),
        })
        .await?;

    let mut suppliers = Vec::with_capacity(SUPPLIERS.len());
    for (n, (last_name, first_name, village)) in SUPPLIERS.iter().enumerate() {
        let supplier = db
            .suppliers()
            .create(&SupplierInput {
                last_name: last_name.to_string(),
                first_name: first_name.map(str::to_string),
                village: village.to_string(),
                phone: format!("9611{:04}", n),
                notes: None,
                distance_to_hub: Some(Quantity::from_units(40 + 25 * n as i64)),
            })
            .await?;
        suppliers.push(supplier);
    }

    let agro = db
        .customers()
        .create(&CustomerInput {
            last_name: "Agro Nord".to_string(),
            first_name: None,
            kind: CustomerKind::Enterprise,
            phone: "21300000".to_string(),
            address: "Zone industrielle, Cotonou".to_string(),
            interested_product_id: Some(products[2].id.clone()),
        })
        .await?;
    let awa = db
        .customers()
        .create(&CustomerInput {
            last_name: "Sani".to_string(),
            first_name: Some("Awa".to_string()),
            kind: CustomerKind::Individual,
            phone: "96000001".to_string(),
            address: "Parakou".to_string(),
            interested_product_id: None,
        })
        .await?;

    let driver = db
        .drivers()
        .create(&DriverInput {
            last_name: "Gado".to_string(),
            first_name: "Issa".to_string(),
            phone: "95000001".to_string(),
            city: "Parakou".to_string(),
        })
        .await?;
    let truck = db
        .trucks()
        .create(&TruckInput {
            plate: "AB 1234 RB".to_string(),
            driver_id: Some(driver.id.clone()),
            capacity_tons: Quantity::from_units(30),
            status: TruckStatus::Available,
        })
        .await?;
    db.trucks()
        .create(&TruckInput {
            plate: "CD 5678 RB".to_string(),
            driver_id: None,
            capacity_tons: Quantity::from_units(12),
            status: TruckStatus::InMaintenance,
        })
        .await?;

    // Purchases: every supplier delivers every other product
    let mut first_purchase = None;
    for (n, supplier) in suppliers.iter().enumerate() {
        for product in products.iter().skip(n % 2).step_by(2) {
            let purchase = db
                .purchases()
                .create(&PurchaseInput {
                    reference: None,
                    product_id: product.id.clone(),
                    supplier_id: supplier.id.clone(),
                    agent_id: buyer.id.clone(),
                    quantity: Quantity::from_units(200 + 50 * n as i64),
                    unit_price: product.average_purchase_price,
                    transport_cost: Money::from_major(5_000),
                    purchase_date: days_ago(20 - 3 * n as i64),
                    distance_to_hub: supplier.distance_to_hub,
                    notes: None,
                })
                .await?;
            first_purchase.get_or_insert(purchase.id);
        }
    }

    // Sales: one settled, two with a balance due
    let sales = [
        (&agro, &products[2], 120, 84_000),
        (&agro, &products[0], 150, 30_000),
        (&awa, &products[1], 40, 10_000),
    ];
    let mut first_sale = None;
    for (n, (customer, product, quantity, received)) in sales.into_iter().enumerate() {
        let sale = db
            .sales()
            .create(&SaleInput {
                reference: None,
                product_id: product.id.clone(),
                customer_id: customer.id.clone(),
                agent_id: seller.id.clone(),
                quantity: Quantity::from_units(quantity),
                unit_price: product.sale_price,
                amount_received: Money::from_major(received),
                sale_date: days_ago(8 - 2 * n as i64),
                notes: None,
            })
            .await?;
        first_sale.get_or_insert(sale.id);
    }

    for (purchase_id, sale_id, destination, days) in [
        (first_purchase, None, "Parakou hub", 18),
        (None, first_sale, "Cotonou", 7),
    ] {
        db.transports()
            .create(&TransportJobInput {
                reference: None,
                truck_id: truck.id.clone(),
                driver_id: driver.id.clone(),
                transport_date: days_ago(days),
                destination: destination.to_string(),
                price_paid: Money::from_major(45_000),
                purchase_id,
                sale_id,
                notes: None,
            })
            .await?;
    }

    let period_end = days_ago(1);
    for agent in [&buyer, &seller] {
        db.salary_payments()
            .create(&SalaryPaymentInput {
                reference: None,
                agent_id: agent.id.clone(),
                period_start: period_end - Duration::days(29),
                period_end,
                amount: agent.base_salary,
                payment_date: today,
            })
            .await?;
    }

    Ok(())
}

async fn report(db: &Database, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let products = db.products().list(&ListQuery::new(), &MoneyRange::default()).await?;
    let balances = db.sales().outstanding_balances().await?;
    let purchases = db.purchases().list(&ListQuery::new().limit(5)).await?;
    let drift: Vec<_> = db
        .products()
        .reconcile_all()
        .await?
        .into_iter()
        .filter(|r| !r.is_consistent())
        .collect();

    if json {
        let report = serde_json::json!({
            "stock_policy": db.stock_policy(),
            "products": products,
            "outstanding_balances": balances,
            "recent_purchases": purchases,
            "stock_discrepancies": drift,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!();
    println!("📦 Products");
    for product in &products {
        println!(
            "  {:<14} stock {:>10}  margin {:>8} ({:.1}%)",
            product.name,
            product.stock_quantity,
            product.calculate_margin(),
            product.calculate_margin_percentage()
        );
    }

    println!();
    println!("💰 Balances owed");
    if balances.is_empty() {
        println!("  (none)");
    }
    for balance in &balances {
        println!(
            "  {:<24} {:>12}  ({} open sales)",
            balance.customer, balance.balance_due, balance.open_sales
        );
    }

    println!();
    println!("🚚 Recent purchases");
    for row in &purchases {
        println!(
            "  {} {}  {:<12} {:>8} from {}",
            row.purchase_date,
            row.reference,
            row.product,
            row.quantity,
            row.supplier
        );
    }

    if !drift.is_empty() {
        println!();
        println!("⚠ Stock differs from purchase/sale history:");
        for report in &drift {
            println!("  {:<14} off by {}", report.product, report.discrepancy());
        }
    }

    Ok(())
}
