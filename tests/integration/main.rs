//! Integration tests for the task client
//!
//! These tests use wiremock to stand in for the task backend and exercise
//! the client over real HTTP.

mod common;
mod poll_tests;
