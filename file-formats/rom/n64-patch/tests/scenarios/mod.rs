//! Level 3: End-to-End Scenario Tests

pub mod pipeline;
