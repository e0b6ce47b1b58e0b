//! Command handlers, one module per subcommand

pub mod config;
pub mod list;
pub mod report;
pub mod run;

pub use config::{execute_config, render_config};
pub use list::{catalog_lines, execute_list, CatalogEntry};
pub use report::{execute_report, load_results};
pub use run::{ensure_passed, execute_test, scenario_filter, select_scenarios, suite_config};
