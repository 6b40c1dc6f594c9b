pub mod adapters;
pub mod commands;
pub mod config;
pub mod error;
pub mod quiz;
pub mod web;
