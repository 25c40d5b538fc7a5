//! Configuration record contract tests
//!
//! These tests pin the JSON shape of the configuration records so task
//! sets produced by external tooling keep parsing across releases.

// ===== Canonical Configuration Fixture =====

/// A kernel configuration as external tooling emits it: no explicit
/// priorities, no time resolution (defaults to seconds)
pub const CANONICAL_KERNEL_CONFIG: &str = r#"{
    "name": "ecu1",
    "policy": "EarliestDeadlineFirst",
    "core_count": 2,
    "tasks": [
        {
            "kind": "Periodic",
            "name": "tau_1",
            "inter_arrival_time": 0.1,
            "relative_deadline": 0.1,
            "phase": 0.0
        },
        {
            "kind": "Aperiodic",
            "name": "tau_2",
            "inter_arrival_time": 0.2,
            "relative_deadline": 0.2,
            "phase": 0.0
        }
    ]
}"#;

// ===== Contract Tests =====
