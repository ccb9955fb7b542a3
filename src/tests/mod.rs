//! Cross-module scenarios and property tests for the race-data pipeline.

mod pipeline_tests;
