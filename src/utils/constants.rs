// src/utils/constants.rs - Application constants
pub const API_VERSION: &str = "v1";
pub const MAX_REQUEST_SIZE: usize = 1024 * 1024; // 1MB
pub const DEFAULT_RATE_LIMIT: u32 = 100;
pub const JWT_EXPIRATION_HOURS: u64 = 24;