//! Step definitions for execution dispatch behaviour tests.

mod given;
mod then;
