pub mod amount;
pub mod filter;
pub mod record;

pub use amount::Amount;
pub use filter::FilterSelection;
pub use record::SpendRecord;
