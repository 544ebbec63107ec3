//! Server state
//!
//! Every component gets its repositories and collaborators injected here,
//! once, at startup. Handlers only see this struct.

use std::sync::Arc;

use shared::error::AppError;

use crate::core::Config;
use crate::db::DbService;
use crate::db::repository::{
    IngredientRepository, MenuItemRepository, OrderRepository, SequenceRepository,
};
use crate::inventory::{AvailabilityRecalculator, StockLedger};
use crate::notify::{BroadcastNotifier, SharedNotifier};
use crate::orders::{ConsumptionProcess, OrderWorkflow};
use crate::payment::{BankTransferGateway, PaymentGateway};
use crate::sequence::SequenceAllocator;
use crate::utils::{Clock, SystemClock};

#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub orders: OrderWorkflow,
    pub ledger: StockLedger,
    pub availability: AvailabilityRecalculator,
    pub menu_items: MenuItemRepository,
    /// Real-time event bus; socket sessions subscribe here
    pub events: BroadcastNotifier,
}

impl ServerState {
    /// Open the database and build the bank client from `config`
    pub async fn initialize(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.database_path).await?;
        let gateway = BankTransferGateway::new(
            config.bank_api_url.clone(),
            config.restaurant_account_number.clone(),
            config.bank_timeout(),
        )
        .map_err(|e| AppError::internal(format!("Failed to build bank client: {e}")))?;

        Ok(Self::with_components(
            config.clone(),
            db,
            Arc::new(gateway),
            Arc::new(SystemClock),
        ))
    }

    /// Wire the components around an existing database and gateway
    pub fn with_components(
        config: Config,
        db: DbService,
        gateway: Arc<dyn PaymentGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let pool = db.pool.clone();
        let events = BroadcastNotifier::new(config.event_channel_capacity);
        let notifier: SharedNotifier = Arc::new(events.clone());

        let ingredients = IngredientRepository::new(pool.clone());
        let menu_items = MenuItemRepository::new(pool.clone());

        let availability =
            AvailabilityRecalculator::new(menu_items.clone(), ingredients.clone(), clock.clone());
        let ledger = StockLedger::new(
            ingredients,
            menu_items.clone(),
            availability.clone(),
            notifier.clone(),
            clock.clone(),
        );
        let sequence = SequenceAllocator::new(SequenceRepository::new(pool.clone()), clock.clone());
        let consumption = ConsumptionProcess::new(menu_items.clone(), ledger.clone());
        // The gateway's own client timeout covers each request; this bounds
        // the whole lookup + transfer exchange. A claim outlives any attempt
        // still running against the bank.
        let payment_timeout = config.bank_timeout() * 2;
        let orders = OrderWorkflow::new(
            OrderRepository::new(pool).with_claim_ttl(payment_timeout * 2),
            sequence,
            gateway,
            consumption,
            notifier,
            clock,
            payment_timeout,
        );

        Self {
            config,
            db,
            orders,
            ledger,
            availability,
            menu_items,
            events,
        }
    }
}
