pub mod config;
pub mod export;
pub mod feed;
pub mod figure;
pub mod fotmob_fetch;
pub mod http_client;
pub mod pitch;
pub mod ratings;
pub mod shotmap;
pub mod state;
