//! # CLI Module
//!
//! Command-line interface for the `polyserve` binary.
//!
//! ```bash
//! # Serve the component in the working directory on the first free port
//! polyserve
//!
//! # Fixed port, open the demo page in two browsers
//! polyserve --port 8000 --open-path demo/index.html -b firefox -b chromium
//!
//! # Disable caching while iterating
//! polyserve --header "Cache-Control: no-cache"
//! ```
//!
//! `--port` and `--hostname` can also come from `POLYSERVE_PORT` and
//! `POLYSERVE_HOST`.

mod commands;


pub use commands::{parse_header, run_cli, Cli};
