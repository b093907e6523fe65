pub mod fyers;
pub mod telegram;

pub use fyers::FyersClient;
pub use telegram::TelegramNotifier;
