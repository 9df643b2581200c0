pub mod app;
pub mod config;
pub mod error;
pub mod models {
    pub mod document;
}
pub mod api {
    pub mod documents;
    pub mod errors;
    pub mod search;
    pub mod suggest;
    pub mod upload;
}
pub mod db {
    pub mod memory;
    pub mod models;
    pub mod repository;
}
pub mod extraction {
    pub mod client;
}
pub mod search {
    pub mod filter;
    pub mod suggest;
}
pub mod storage {
    pub mod filename;
    pub mod staging;
}
