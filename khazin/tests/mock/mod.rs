//! Fixture application shared by the integration tests.

#![allow(dead_code)]

pub mod config;
pub mod contracts;
pub mod mock_user_repository;
pub mod singleton_test;
pub mod user_controller;
pub mod user_service;
