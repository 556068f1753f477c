// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth;
pub mod google;
pub mod trainings;
pub mod users;

pub use google::{GoogleUser, GoogleUserInfoClient};
