// src/analytics/mod.rs - Velocity and anomaly signal producers
#![allow(dead_code)]

pub mod anomaly;
pub mod velocity;

pub use anomaly::{compute_anomaly, AnomalyDetail, AnomalyResult, AnomalyThresholds};
pub use velocity::{compute_velocity, VelocityDetail, VelocityResult, VelocityThresholds};
