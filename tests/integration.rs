//! Integration tests for the RecipeHub real-time core.
//!
//! The whole suite runs against an in-process stack: the database pool is
//! created lazily and never queried, and reconciliation state goes through
//! in-memory stores. No external infrastructure is required.

mod integration {
    pub mod helpers;

    mod api_test;
    mod realtime_test;
    mod reconcile_test;
}
