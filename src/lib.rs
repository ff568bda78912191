// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Hyrox-Tracker: log Hyrox training sessions and follow progress
//!
//! This crate provides the backend API for athlete accounts, performance
//! logging and the progress dashboard.

pub mod config;
pub mod db;
pub mod error;
pub mod i18n;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{IdentityService, PerformanceService, SessionHub};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub identity: IdentityService,
    pub performances: PerformanceService,
    pub sessions: SessionHub,
}

impl AppState {
    pub fn new(config: Config, db: FirestoreDb, identity: IdentityService) -> Self {
        Self {
            performances: PerformanceService::new(db.clone()),
            sessions: SessionHub::new(),
            config,
            db,
            identity,
        }
    }
}
