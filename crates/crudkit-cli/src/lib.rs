//! Library components of the `crudkit` command line tool.

pub mod logging;
pub mod report;
