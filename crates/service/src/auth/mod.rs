//! Registration, login and token issuance for donors and administrators.

pub mod domain;
pub mod errors;
pub mod repo;
pub mod repository;
pub mod service;
