mod catalog;
mod company;
mod state;

pub use catalog::CatalogItem;
pub use company::{
    BankDetails, Company, Config, InvoiceSettings, LimitSettings, NotifySettings, PdfSettings,
};
pub use state::{Counter, State};

use crate::error::{Result, SolarError};
use directories::ProjectDirs;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (XDG-style, falling back to ~/.solarbook/)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "solarbook") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        SolarError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".solarbook"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Relative output directories live inside the config directory.
pub fn resolve_output_dir(output_dir: &str, cfg_dir: &Path) -> PathBuf {
    let expanded = expand_path(output_dir);
    if expanded.is_absolute() {
        expanded
    } else {
        cfg_dir.join(expanded)
    }
}

fn read_toml<T: serde::de::DeserializeOwned>(path: PathBuf) -> Result<T> {
    if !path.exists() {
        return Err(SolarError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| SolarError::ConfigParse { path, source: e })
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    let config: Config = read_toml(config_dir.join("config.toml"))?;
    config.limits.validate()?;
    Ok(config)
}

/// Load catalog.toml keyed by item id
pub fn load_catalog(config_dir: &Path) -> Result<BTreeMap<String, CatalogItem>> {
    read_toml(config_dir.join("catalog.toml"))
}

/// Load state.toml (empty state if missing)
pub fn load_state(config_dir: &Path) -> Result<State> {
    let path = config_dir.join("state.toml");
    if !path.exists() {
        return Ok(State::default());
    }
    let mut state: State = read_toml(path)?;
    state.normalize();
    Ok(state)
}

/// Save state.toml
pub fn save_state(config_dir: &Path, state: &State) -> Result<()> {
    let path = config_dir.join("state.toml");
    let content = toml::to_string_pretty(state).map_err(|e| SolarError::StateWrite {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    fs::write(&path, content)?;
    tracing::debug!(path = %path.display(), "state saved");
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[company]
name = "Your Solar Company"
tagline = "Total Energy Independence"
address = "Main Road"
city = "Your City, State 000000"
phone = "+91 90000 00000"
email = "office@yoursolar.example"
gstin = "00AAAAA0000A1Z5"
# upi_id = "yourname@bank"             # optional, printed on invoices
# website = "https://yoursolar.example" # optional, linked from lead emails

# [company.bank]                       # optional, printed on invoices
# account_name = "Your Solar Company"
# bank = "State Bank of India"
# account = "000000000000"
# ifsc = "SBIN0000000"
# branch = "Main Branch"

[invoice]
due_days = 14
currency_symbol = "₹"

[limits]
max_requests = 5   # lead submissions per caller...
window_secs = 60   # ...within this many seconds

[notify]
enabled = false
from = "Your Solar Company <onboarding@resend.dev>"
admin_email = "office@yoursolar.example"
api_key_env = "RESEND_API_KEY"
endpoint = "https://api.resend.com/emails"

[pdf]
output_dir = "output"   # relative paths are inside this config directory
"#;

/// Template content for catalog.toml
pub const CATALOG_TEMPLATE: &str = r#"# Products and services that can be billed by id.
#
# Example:
#   solarbook create --name "..." ... --item panel-440w:6 --item inverter-3kw:1

[panel-440w]
name = "Loom Solar 440W Mono PERC Panel"
hsn = "85414011"
rate = 18500.0

[panel-540w]
name = "Loom Solar 540W Bi-Facial Panel"
hsn = "85414011"
rate = 22000.0

[inverter-3kw]
name = "Growatt 3kW On-Grid Inverter"
hsn = "85044090"
rate = 32000.0

[inverter-5kw]
name = "Growatt 5kW On-Grid Inverter"
hsn = "85044090"
rate = 45000.0

[inverter-10kw]
name = "Growatt 10kW On-Grid Inverter"
hsn = "85044090"
rate = 78000.0

[inverter-offgrid-3kva]
name = "Luminous 3kVA Off-Grid Inverter"
hsn = "85044090"
rate = 28000.0

[battery-150ah]
name = "Luminous 150Ah Tall Tubular Battery"
hsn = "85072090"
rate = 14500.0

[structure]
name = "Panel Mounting Structure (GI)"
hsn = "76109090"
rate = 12000.0

[installation]
name = "Installation & Wiring Charges"
hsn = "998314"
rate = 15000.0

[cable-kit]
name = "DC Cable, MC4, ACDB/DCDB Kit"
hsn = "85444999"
rate = 8000.0

[earthing]
name = "Earthing Kit (GI Pipe + Wire)"
hsn = "73079990"
rate = 3500.0

[net-meter]
name = "Net Meter Application Charges"
hsn = "998314"
rate = 5000.0

[amc]
name = "Annual Maintenance Contract (AMC)"
hsn = "998714"
rate = 6000.0
"#;
