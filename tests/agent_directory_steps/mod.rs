//! Step definitions for agent directory behaviour tests.

mod when;
