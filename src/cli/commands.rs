use crate::logging::{init_logging_with_config, LogConfig};
use crate::options::{Page, ServerOptions};
use crate::proxy::ProxyTarget;
use crate::runtime_config::RuntimeConfig;
use crate::start::start_server;
use anyhow::{anyhow, bail, Context};
use clap::Parser;
use std::path::PathBuf;

/// Command-line interface for polyserve
///
/// Serves the component in the working directory under
/// `/components/<package>/` and its dependencies under
/// `/components/<dependency>/`.
#[derive(Parser, Debug)]
#[command(name = "polyserve")]
#[command(about = "Development server for web components", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Port to listen on (default: first free port in 8080-8179)
    #[arg(short, long, env = "POLYSERVE_PORT")]
    pub port: Option<u16>,

    /// Host name to bind (default: localhost)
    #[arg(short = 'H', long, env = "POLYSERVE_HOST")]
    pub hostname: Option<String>,

    /// Directory holding dependencies (default: bower_components)
    #[arg(short, long)]
    pub component_dir: Option<String>,

    /// Name the package is served under (default: bower.json name, then directory name)
    #[arg(short = 'n', long)]
    pub package_name: Option<String>,

    /// Package root (default: working directory)
    #[arg(long)]
    pub root: Option<PathBuf>,

    /// Open index.html in a browser once listening
    #[arg(short, long, default_value_t = false)]
    pub open: bool,

    /// Page to open, relative to the package's base URL (implies --open)
    #[arg(long, value_name = "PAGE")]
    pub open_path: Option<String>,

    /// Browser to open the page in (repeatable)
    #[arg(short, long, value_name = "NAME")]
    pub browser: Vec<String>,

    /// Extra response header for served files, as "Name: value" (repeatable)
    #[arg(long = "header", value_name = "NAME: VALUE")]
    pub headers: Vec<String>,

    /// Host of the API backend
    #[arg(long, default_value = "localhost")]
    pub api_host: String,

    /// Port of the API backend
    #[arg(long, default_value_t = 8421)]
    pub api_port: u16,

    /// Serve API-looking paths as files instead of forwarding them
    #[arg(long, default_value_t = false)]
    pub no_api_proxy: bool,
}

/// Parse a `Name: value` header argument.
pub fn parse_header(raw: &str) -> anyhow::Result<(String, String)> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| anyhow!("header '{raw}' must look like 'Name: value'"))?;
    let (name, value) = (name.trim(), value.trim());
    if http::HeaderName::from_bytes(name.as_bytes()).is_err() {
        bail!("header '{}' has an invalid name", raw.escape_debug());
    }
    if http::HeaderValue::from_str(value).is_err() {
        bail!("header '{}' has an invalid value", raw.escape_debug());
    }
    Ok((name.to_string(), value.to_string()))
}

impl Cli {
    pub fn page(&self) -> Option<Page> {
        match &self.open_path {
            Some(path) => Some(Page::Path(path.clone())),
            None if self.open => Some(Page::Index),
            None => None,
        }
    }

    pub fn into_options(self) -> anyhow::Result<ServerOptions> {
        let page = self.page();
        let headers = self
            .headers
            .iter()
            .map(|raw| parse_header(raw))
            .collect::<anyhow::Result<Vec<_>>>()?;
        let proxy = (!self.no_api_proxy).then(|| ProxyTarget::new(self.api_host, self.api_port));
        Ok(ServerOptions {
            port: self.port,
            host: self.hostname,
            page,
            browser: self.browser,
            component_dir: self.component_dir,
            package_name: self.package_name,
            root: self.root,
            headers,
            proxy,
        })
    }
}

/// Entry point for the `polyserve` binary.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging_with_config(&LogConfig::from_env())?;
    RuntimeConfig::from_env().apply();

    let options = cli.into_options()?;
    let server = start_server(&options).context("Failed to start server")?;
    server
        .join()
        .map_err(|e| anyhow!("server stopped unexpectedly: {e:?}"))?;
    Ok(())
}
