// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod identity;
pub mod normalize;
pub mod performance;
pub mod session;

pub use identity::{Identity, IdentityService};
pub use normalize::{FormBody, LoginRequest, NewAccount, RawForm, SignupRequest};
pub use performance::{Dashboard, PerformanceService, SubmitResult};
pub use session::{SessionHub, SessionState, SessionSubscription};
