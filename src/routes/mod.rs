// src/routes/mod.rs - Route modules
pub mod alerts;
pub mod dashboard;
pub mod rules;
pub mod transactions;
