use std::sync::Arc;

use pe_engine::config::StrategyConfig;
use pe_engine::data::Timeframe;
use pe_engine::exchange::{OrderExecutor, PaperExecutor};
use pe_engine::notify::{LogNotifier, Notifier};
use pe_engine::orchestrator::Orchestrator;
use shared::Config;

use crate::services::{FyersClient, TelegramNotifier};

#[derive(Clone)]
pub struct AppState {
    pub schedule_secs: u64,
    pub notifier: Arc<dyn Notifier>,
    pub orchestrator: Arc<Orchestrator>,
}

impl AppState {
    pub fn new() -> Result<Self, anyhow::Error> {
        let config = Config::from_env()?;
        let strategy = strategy_config(&config)?;

        let fyers = Arc::new(FyersClient::new(
            config.fyers_api_base.clone(),
            config.fyers_client_id.clone(),
            config.fyers_access_token.clone(),
        ));

        let orders: Arc<dyn OrderExecutor> = if config.dry_run {
            tracing::warn!("🧪 DRY_RUN enabled: orders are paper-filled");
            Arc::new(PaperExecutor::new())
        } else {
            fyers.clone()
        };

        let notifier: Arc<dyn Notifier> = match (&config.bot_token, config.chat_id) {
            (Some(token), Some(chat_id)) => Arc::new(TelegramNotifier::new(token, chat_id)),
            _ => {
                tracing::warn!("BOT_TOKEN/CHAT_ID not set, notifications go to the log only");
                Arc::new(LogNotifier)
            }
        };

        tracing::info!(
            "Trading {} ({}) expiry {} qty {}",
            strategy.index_name,
            strategy.index_symbol,
            strategy.option_expiry,
            strategy.quantity
        );

        let orchestrator = Arc::new(Orchestrator::new(strategy, fyers, orders, notifier.clone()));

        Ok(AppState {
            schedule_secs: config.schedule_secs,
            notifier,
            orchestrator,
        })
    }
}

/// Engine configuration from the environment, on top of the NIFTY defaults
pub fn strategy_config(config: &Config) -> Result<StrategyConfig, anyhow::Error> {
    if config.order_qty == 0 {
        anyhow::bail!("ORDER_QTY must be at least 1");
    }

    let mut strategy = StrategyConfig::new(config.option_expiry.clone());
    strategy.index_name = config.index_name.clone();
    strategy.index_symbol = config.index_symbol.clone();
    strategy.quantity = config.order_qty;
    strategy.detector.htf_timeframes = Timeframe::parse_list(&config.htf_timeframes)?;
    strategy.detector.ltf_timeframes = Timeframe::parse_list(&config.ltf_timeframes)?;
    strategy.exit.poll_interval_secs = config.exit_poll_secs;
    Ok(strategy)
}
