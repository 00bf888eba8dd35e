//! Book catalog: donation intake, approval workflow, listings and search.

pub mod domain;
pub mod repo;
pub mod repository;
pub mod service;
