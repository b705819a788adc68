pub mod order_service;
pub mod token_service;
pub mod download_service;
pub mod storage_service;
