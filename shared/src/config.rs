use anyhow::Context;
use dotenv::dotenv;

pub struct Config {
    pub fyers_client_id: String,
    pub fyers_access_token: String,
    pub fyers_api_base: String,
    /// Telegram bot token; notifications go to the log when unset
    pub bot_token: Option<String>,
    pub chat_id: Option<i64>,
    pub index_name: String,
    pub index_symbol: String,
    /// Expiry code inserted into option symbols (e.g., "24JUL")
    pub option_expiry: String,
    pub order_qty: u32,
    pub schedule_secs: u64,
    pub exit_poll_secs: u64,
    /// Comma separated, longest first (e.g., "1D,240")
    pub htf_timeframes: String,
    pub ltf_timeframes: String,
    /// Paper fills instead of live orders
    pub dry_run: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenv().ok();

        Ok(Config {
            fyers_client_id: std::env::var("FYERS_CLIENT_ID").context("FYERS_CLIENT_ID is not set")?,
            fyers_access_token: std::env::var("FYERS_ACCESS_TOKEN").context("FYERS_ACCESS_TOKEN is not set")?,
            fyers_api_base: std::env::var("FYERS_API_BASE")
                .unwrap_or_else(|_| "https://api.fyers.in".to_string()),
            bot_token: std::env::var("BOT_TOKEN").ok().filter(|s| !s.is_empty()),
            chat_id: match std::env::var("CHAT_ID") {
                Ok(id) if !id.is_empty() => Some(id.parse().context("CHAT_ID must be a number")?),
                _ => None,
            },
            index_name: std::env::var("INDEX").unwrap_or_else(|_| "NIFTY".to_string()),
            index_symbol: std::env::var("INDEX_SYMBOL")
                .unwrap_or_else(|_| "NSE:NIFTY50-INDEX".to_string()),
            option_expiry: std::env::var("OPTION_EXPIRY").context("OPTION_EXPIRY is not set (e.g. 24JUL)")?,
            order_qty: std::env::var("ORDER_QTY")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .context("ORDER_QTY must be a positive integer")?,
            schedule_secs: std::env::var("SCHEDULE_SECS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .context("SCHEDULE_SECS must be a number of seconds")?,
            exit_poll_secs: std::env::var("EXIT_POLL_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .context("EXIT_POLL_SECS must be a number of seconds")?,
            htf_timeframes: std::env::var("HTF_TIMEFRAMES").unwrap_or_else(|_| "1D,240".to_string()),
            ltf_timeframes: std::env::var("LTF_TIMEFRAMES").unwrap_or_else(|_| "30,15,10".to_string()),
            dry_run: std::env::var("DRY_RUN")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
        })
    }
}
