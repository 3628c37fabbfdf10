// src/events/topics.rs - Event bus topic names
pub const TRANSACTIONS_RAW: &str = "rs.transactions.raw";
pub const TRANSACTIONS_SCORED: &str = "rs.transactions.scored";
pub const ALERTS: &str = "rs.alerts";
