pub mod email;
pub mod http;
pub mod kv;
pub mod persistence;
pub mod store;
