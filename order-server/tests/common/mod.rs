//! Test harness: order-server state wired to an in-process bank-mock and a
//! pinned clock.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bank_mock::{Account, BankState};
use chrono::{NaiveDate, NaiveDateTime};
use order_server::core::config::DEV_RESTAURANT_ACCOUNT;
use order_server::db::DbService;
use order_server::payment::{BankTransferGateway, PaymentGateway};
use order_server::utils::FixedClock;
use order_server::{Config, ServerState};
use shared::models::{
    ContactInfo, IngredientCategory, IngredientCreate, IngredientUnit, MenuItemCreate,
    OrderCreate, OrderItemInput, RecipeIngredient,
};

pub const ALICE: &str = "1234567890";
pub const BOB: &str = "2345678901";

pub struct Harness {
    pub state: ServerState,
    pub bank: Arc<BankState>,
    pub clock: FixedClock,
    pub bank_url: String,
}

pub fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

pub fn accounts() -> Vec<Account> {
    vec![
        Account::new(DEV_RESTAURANT_ACCOUNT, "Restaurant", 0.0),
        Account::new(ALICE, "Alice Nguyen", 1_000.0),
        Account::new(BOB, "Bob Tran", 20.0),
    ]
}

pub async fn spawn_bank() -> (Arc<BankState>, String) {
    let bank = Arc::new(BankState::with_accounts(accounts()));
    let addr = bank_mock::spawn(bank.clone(), SocketAddr::from(([127, 0, 0, 1], 0)))
        .await
        .unwrap();
    (bank, format!("http://{addr}/api"))
}

/// Harness backed by an in-memory database
pub async fn harness() -> Harness {
    let db = DbService::in_memory().await.unwrap();
    harness_with_db(db).await
}

pub async fn harness_with_db(db: DbService) -> Harness {
    let (bank, bank_url) = spawn_bank().await;
    let config = Config::for_tests(bank_url.clone());
    let gateway = BankTransferGateway::new(
        bank_url.clone(),
        DEV_RESTAURANT_ACCOUNT,
        Duration::from_secs(2),
    )
    .unwrap();
    let clock = FixedClock::new(noon(2024, 5, 1));
    let state =
        ServerState::with_components(config, db, Arc::new(gateway), Arc::new(clock.clone()));
    Harness {
        state,
        bank,
        clock,
        bank_url,
    }
}

/// State whose payments go through `gateway` instead of the bank-mock.
/// The workflow allows each attempt twice `bank_timeout_ms`.
pub async fn state_with_gateway(
    gateway: Arc<dyn PaymentGateway>,
    bank_timeout_ms: u64,
) -> ServerState {
    let db = DbService::in_memory().await.unwrap();
    let mut config = Config::for_tests("http://127.0.0.1:9/api");
    config.bank_timeout_ms = bank_timeout_ms;
    ServerState::with_components(
        config,
        db,
        gateway,
        Arc::new(FixedClock::new(noon(2024, 5, 1))),
    )
}

pub fn line(id: Option<i64>, name: &str, price: f64, qty: i32) -> OrderItemInput {
    OrderItemInput {
        id,
        name: name.into(),
        price,
        qty,
    }
}

pub fn order(items: Vec<OrderItemInput>) -> OrderCreate {
    OrderCreate {
        items,
        contact: ContactInfo {
            name: "Alice".into(),
            phone: Some("0901234567".into()),
            email: None,
        },
    }
}

pub fn ingredient(name: &str, stock: f64, min: f64) -> IngredientCreate {
    IngredientCreate {
        name: name.into(),
        category: IngredientCategory::Meat,
        current_stock: stock,
        unit: IngredientUnit::Kg,
        min_stock_level: min,
        max_stock_level: None,
        cost_per_unit: 10.0,
        expiry_date: None,
    }
}

pub fn dish(name: &str, price: f64, recipe: &[(i64, f64)]) -> MenuItemCreate {
    MenuItemCreate {
        name: name.into(),
        price,
        category: None,
        ingredients: recipe
            .iter()
            .map(|&(ingredient_id, quantity)| RecipeIngredient {
                ingredient_id,
                quantity,
                unit: None,
            })
            .collect(),
        is_available: None,
        auto_availability: None,
    }
}
