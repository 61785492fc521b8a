//! Unit tests for the execution dispatch module.
