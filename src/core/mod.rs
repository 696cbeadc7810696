pub mod appearance;
pub mod articles;
pub mod auth;
pub mod catalog;
pub mod chat;
pub mod chat_stream;
pub mod config;
pub mod keyring;
pub mod locale;
pub mod message;
pub mod mock_reply;
pub mod routes;
pub mod storage;
pub mod theme;
