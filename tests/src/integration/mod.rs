//! Cross-crate integration flows.

pub mod e2e_flows;
