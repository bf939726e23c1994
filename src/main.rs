use std::path::{Path, PathBuf};

use chrono::{Datelike, Local, Utc};
use clap::{Parser, Subcommand};
use tabled::{settings::Style, Table, Tabled};
use tracing_subscriber::EnvFilter;

use solarbook::billing::{
    self, build_items, create_invoice, existing_invoice_pdf, format_quantity, invoice_pdf_path,
    parse_date, render_invoice, Customer, InvoiceDraft, InvoiceStatus, MAX_SEQUENCE,
};
use solarbook::config::{
    config_dir, load_catalog, load_config, load_state, save_state, Config, State,
    CATALOG_TEMPLATE, CONFIG_TEMPLATE,
};
use solarbook::error::{Result, SolarError};
use solarbook::estimator::{self, CalculatorInput};
use solarbook::format::{format_compact, format_money, format_number};
use solarbook::leads::{self, LeadSource, LeadStats, LeadStatus, NewLead};
use solarbook::notify::notifier_from_settings;

#[derive(Parser)]
#[command(name = "solarbook")]
#[command(version, about = "Rooftop solar estimates, GST invoices and leads", long_about = None)]
struct Cli {
    /// Path to config directory (default: XDG config dir)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with template files
    Init,

    /// Estimate system size, subsidy and savings from an electricity bill
    Estimate {
        /// Average monthly electricity bill in rupees
        #[arg(short, long)]
        bill: f64,

        /// Electricity tariff in rupees per unit
        #[arg(short, long, default_value_t = 8.0)]
        rate: f64,

        /// Shadow-free roof area in square feet
        #[arg(long, default_value_t = 200.0)]
        roof: f64,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Spell an amount in Indian-scale words
    Words {
        /// Amount in rupees
        #[arg(allow_negative_numbers = true)]
        amount: f64,
    },

    /// List catalog items available for invoices
    Catalog,

    /// Show store summary
    Status,

    /// Create a new draft invoice
    Create {
        /// Customer name
        #[arg(long)]
        name: String,

        /// Customer street address
        #[arg(long, default_value = "")]
        address: String,

        /// Customer city
        #[arg(long, default_value = "")]
        city: String,

        /// Customer phone
        #[arg(long, default_value = "")]
        phone: String,

        /// Customer email
        #[arg(long, default_value = "")]
        email: String,

        /// Customer GSTIN (business customers)
        #[arg(long)]
        gstin: Option<String>,

        /// Catalog items in format "item:quantity" (can be repeated)
        #[arg(short, long, value_name = "ITEM:QTY")]
        item: Vec<String>,

        /// Custom lines in format "NAME;HSN;QTY;RATE" (can be repeated)
        #[arg(short, long, value_name = "NAME;HSN;QTY;RATE")]
        line: Vec<String>,

        /// Invoice date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,

        /// Due date (YYYY-MM-DD, default: date + due_days)
        #[arg(long)]
        due: Option<String>,

        /// Notes printed on the invoice
        #[arg(long, default_value = "")]
        notes: String,

        /// Also render the PDF
        #[arg(long)]
        pdf: bool,

        /// Render the PDF and open it with the system viewer
        #[arg(long)]
        open: bool,
    },

    /// List invoices, newest first
    List {
        /// Only invoices with this status
        #[arg(short, long)]
        status: Option<InvoiceStatus>,

        /// Only invoices whose number or customer name contains this text
        #[arg(long)]
        search: Option<String>,

        /// Number of invoices to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Show one invoice in full
    Show {
        /// Invoice number or index from 'list' (e.g., 1 or RS-2026-0417)
        invoice: String,
    },

    /// Replace an invoice's line items
    Edit {
        /// Invoice number or index from 'list' (e.g., 1 or RS-2026-0417)
        invoice: String,

        /// Catalog items in format "item:quantity" (replaces existing items)
        #[arg(short, long, value_name = "ITEM:QTY")]
        item: Vec<String>,

        /// Custom lines in format "NAME;HSN;QTY;RATE"
        #[arg(short, long, value_name = "NAME;HSN;QTY;RATE")]
        line: Vec<String>,
    },

    /// Change an invoice's status (draft, sent, paid, overdue, cancelled)
    SetStatus {
        /// Invoice number or index from 'list'
        invoice: String,

        /// New status
        status: InvoiceStatus,
    },

    /// Mark sent invoices past their due date as overdue
    MarkOverdue,

    /// Delete an invoice and its PDF
    Delete {
        /// Invoice number or index from 'list'
        invoice: String,
    },

    /// Render (or re-render) an invoice PDF
    Pdf {
        /// Invoice number or index from 'list'
        invoice: String,

        /// Open generated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// Open an invoice PDF
    Open {
        /// Invoice number or index from 'list'
        invoice: String,
    },

    /// Manage leads from the site forms
    #[command(subcommand)]
    Lead(LeadCommands),
}

#[derive(Subcommand)]
enum LeadCommands {
    /// Record a lead submission
    Add {
        /// Form the lead came from (contact, referral, calculator, exit_popup)
        #[arg(long, default_value = "contact")]
        source: LeadSource,

        /// Name (the referrer, for referrals)
        #[arg(long, default_value = "")]
        name: String,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, default_value = "")]
        phone: String,

        #[arg(long)]
        message: Option<String>,

        /// Service of interest
        #[arg(long)]
        service: Option<String>,

        /// Referred friend's name
        #[arg(long)]
        referred_name: Option<String>,

        /// Referred friend's phone
        #[arg(long)]
        referred_phone: Option<String>,

        /// Referred friend's email
        #[arg(long)]
        referred_email: Option<String>,

        /// Quoted system size, e.g. "4 kW"
        #[arg(long)]
        system_size: Option<String>,

        /// Monthly electricity bill in rupees
        #[arg(long)]
        monthly_bill: Option<f64>,

        /// Read the submission from a JSON file instead of flags
        #[arg(long, value_name = "FILE", conflicts_with_all = ["name", "email", "phone"])]
        json: Option<PathBuf>,

        /// Caller address used for rate limiting
        #[arg(long, default_value = "cli")]
        caller: String,
    },

    /// List leads, newest first
    List {
        #[arg(short, long)]
        status: Option<LeadStatus>,

        #[arg(long)]
        source: Option<LeadSource>,

        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },

    /// Change a lead's status (new, contacted, qualified, converted, lost)
    SetStatus { id: u32, status: LeadStatus },

    /// Replace a lead's admin notes
    Note { id: u32, notes: String },

    /// Delete a lead
    Delete { id: u32 },

    /// Lead dashboard numbers
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();
    dotenvy::dotenv().ok();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    // Determine config directory
    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Estimate {
            bill,
            rate,
            roof,
            json,
        } => cmd_estimate(CalculatorInput::new(bill, rate, roof), json),
        Commands::Words { amount } => cmd_words(amount),
        Commands::Catalog => cmd_catalog(&cfg_dir),
        Commands::Status => cmd_status(&cfg_dir),
        Commands::Create {
            name,
            address,
            city,
            phone,
            email,
            gstin,
            item,
            line,
            date,
            due,
            notes,
            pdf,
            open,
        } => {
            let customer = Customer {
                name,
                address,
                city,
                phone,
                email,
                gstin: gstin.filter(|g| !g.trim().is_empty()),
            };
            cmd_create(&cfg_dir, customer, &item, &line, date, due, notes, pdf || open, open)
        }
        Commands::List {
            status,
            search,
            limit,
        } => cmd_list(&cfg_dir, status, search.as_deref(), limit),
        Commands::Show { invoice } => cmd_show(&cfg_dir, &invoice),
        Commands::Edit {
            invoice,
            item,
            line,
        } => cmd_edit(&cfg_dir, &invoice, &item, &line),
        Commands::SetStatus { invoice, status } => cmd_set_status(&cfg_dir, &invoice, status),
        Commands::MarkOverdue => cmd_mark_overdue(&cfg_dir),
        Commands::Delete { invoice } => cmd_delete(&cfg_dir, &invoice),
        Commands::Pdf { invoice, open } => cmd_pdf(&cfg_dir, &invoice, open),
        Commands::Open { invoice } => cmd_open(&cfg_dir, &invoice),
        Commands::Lead(command) => run_lead(&cfg_dir, command),
    }
}

fn run_lead(cfg_dir: &Path, command: LeadCommands) -> Result<()> {
    match command {
        LeadCommands::Add {
            source,
            name,
            email,
            phone,
            message,
            service,
            referred_name,
            referred_phone,
            referred_email,
            system_size,
            monthly_bill,
            json,
            caller,
        } => {
            let new_lead = match json {
                Some(path) => read_lead_json(&path)?,
                None => NewLead {
                    name,
                    email,
                    phone,
                    source,
                    message,
                    service,
                    referred_name,
                    referred_phone,
                    referred_email,
                    system_size,
                    monthly_bill,
                },
            };
            cmd_lead_add(cfg_dir, new_lead, &caller)
        }
        LeadCommands::List {
            status,
            source,
            limit,
        } => cmd_lead_list(cfg_dir, status, source, limit),
        LeadCommands::SetStatus { id, status } => cmd_lead_set_status(cfg_dir, id, status),
        LeadCommands::Note { id, notes } => cmd_lead_note(cfg_dir, id, notes),
        LeadCommands::Delete { id } => cmd_lead_delete(cfg_dir, id),
        LeadCommands::Stats { json } => cmd_lead_stats(cfg_dir, json),
    }
}

fn ensure_initialized(cfg_dir: &Path) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(SolarError::ConfigNotFound(cfg_dir.to_path_buf()));
    }
    Ok(())
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &Path) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(SolarError::AlreadyInitialized(cfg_dir.to_path_buf()));
    }

    // Create directories
    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;

    // Write template files
    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    fs::write(cfg_dir.join("catalog.toml"), CATALOG_TEMPLATE)?;

    println!("Initialized solarbook at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your company, GSTIN and bank details:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!(
        "  2. Review products and rates:                  $EDITOR {}/catalog.toml",
        cfg_dir.display()
    );
    println!();
    println!("Then create your first invoice:");
    println!("  solarbook create --name <customer> --item <item>:<quantity>");

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct CatalogRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "HSN")]
    hsn: String,
    #[tabled(rename = "RATE")]
    rate: String,
}

#[derive(Tabled)]
struct InvoiceRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "NUMBER")]
    number: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "CUSTOMER")]
    customer: String,
}

#[derive(Tabled)]
struct LineRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "DESCRIPTION")]
    name: String,
    #[tabled(rename = "HSN")]
    hsn: String,
    #[tabled(rename = "QTY")]
    quantity: String,
    #[tabled(rename = "RATE")]
    rate: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

#[derive(Tabled)]
struct LeadRow {
    #[tabled(rename = "ID")]
    id: u32,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "PHONE")]
    phone: String,
    #[tabled(rename = "SOURCE")]
    source: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "DETAIL")]
    detail: String,
}

fn format_whole_money(value: f64, currency_symbol: &str) -> String {
    format!("{:>10}", format_money(value.round(), currency_symbol))
}

/// Append summary rows under the TOTAL column of a rounded invoice table.
fn add_summary_footer(table: &str, rows: &[(&str, String)]) -> String {
    let lines: Vec<&str> = table.lines().collect();
    if lines.len() < 4 || rows.is_empty() {
        return table.to_string();
    }

    // Column widths come from the top border
    let Some(inner) = lines[0]
        .strip_prefix('╭')
        .and_then(|s| s.strip_suffix('╮'))
    else {
        return table.to_string();
    };
    let widths: Vec<usize> = inner.split('┬').map(|p| p.chars().count()).collect();
    if widths.len() != 6 {
        return table.to_string();
    }

    // #, NUMBER and DATE merge into the label cell; STATUS and CUSTOMER close off
    let label_width = widths[0] + widths[1] + widths[2] + 2;
    let value_width = widths[3];

    let mut out = lines[..lines.len() - 1].join("\n");
    out.push('\n');
    out.push_str(&format!(
        "├{}┴{}┴{}┼{}┼{}┴{}╯\n",
        "─".repeat(widths[0]),
        "─".repeat(widths[1]),
        "─".repeat(widths[2]),
        "─".repeat(value_width),
        "─".repeat(widths[4]),
        "─".repeat(widths[5]),
    ));

    for (idx, (label, value)) in rows.iter().enumerate() {
        out.push_str(&format!(
            "│ {:>label_w$} │ {:>value_w$} │\n",
            label,
            value,
            label_w = label_width - 2,
            value_w = value_width - 2
        ));
        if idx + 1 < rows.len() {
            out.push_str(&format!(
                "├{}┼{}┤\n",
                "─".repeat(label_width),
                "─".repeat(value_width)
            ));
        }
    }

    out.push_str(&format!(
        "╰{}┴{}╯",
        "─".repeat(label_width),
        "─".repeat(value_width)
    ));
    out
}

/// Estimate a rooftop system from a monthly bill
fn cmd_estimate(input: CalculatorInput, json: bool) -> Result<()> {
    let result = estimator::estimate(&input)?;

    if json {
        let out = serde_json::to_string_pretty(&result)
            .map_err(|e| SolarError::invalid("estimate", e.to_string()))?;
        println!("{out}");
        return Ok(());
    }

    let r = "₹";
    println!("Solar Estimate");
    println!("{}", "-".repeat(50));
    println!(
        "Consumption:       {} units/month ({} units/year)",
        format_number(result.monthly_units),
        format_number(result.yearly_units)
    );
    println!("Recommended size:  {} kW", result.recommended_capacity_kw);
    println!(
        "Generation:        {} units/year ({}% of your usage)",
        format_number(result.yearly_generation_units),
        result.coverage_percent
    );
    println!();
    println!("System cost:       {}", format_compact(result.system_cost, r));
    println!("Subsidy:           {}", format_money(result.subsidy_amount, r));
    println!("Net cost:          {}", format_compact(result.net_cost, r));
    println!();
    println!(
        "Monthly savings:   {}",
        format_money(result.monthly_savings().round(), r)
    );
    println!(
        "Yearly savings:    {}",
        format_money(result.yearly_savings.round(), r)
    );
    println!(
        "25-year savings:   {}",
        format_compact(result.total_savings_25_years, r)
    );
    if result.payback_within_horizon {
        println!("Payback:           {} years", result.payback_years);
    } else {
        println!(
            "Payback:           more than {} years",
            estimator::PROJECTION_YEARS
        );
    }
    println!();
    println!(
        "CO2 avoided:       {:.1} tonnes over {} years (about {} trees)",
        result.co2_saved_tonnes,
        estimator::PROJECTION_YEARS,
        format_number(result.equivalent_trees as f64)
    );

    Ok(())
}

fn cmd_words(amount: f64) -> Result<()> {
    println!("{}", billing::number_to_words(amount)?);
    Ok(())
}

/// List catalog items
fn cmd_catalog(cfg_dir: &Path) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let catalog = load_catalog(cfg_dir)?;

    if catalog.is_empty() {
        println!("No catalog items configured.");
        println!("Add items to: {}/catalog.toml", cfg_dir.display());
        return Ok(());
    }

    let rows: Vec<CatalogRow> = catalog
        .iter()
        .map(|(id, item)| CatalogRow {
            id: id.clone(),
            name: item.name.clone(),
            hsn: item.hsn.clone(),
            rate: format_money(item.rate, &config.invoice.currency_symbol),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Show store summary
fn cmd_status(cfg_dir: &Path) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let catalog = load_catalog(cfg_dir)?;
    let state = load_state(cfg_dir)?;
    let symbol = &config.invoice.currency_symbol;
    let today = Local::now().date_naive();

    let outstanding: f64 = state
        .invoices
        .iter()
        .filter(|i| matches!(i.status, InvoiceStatus::Sent | InvoiceStatus::Overdue))
        .map(|i| i.total)
        .sum();
    let past_due = state.invoices.iter().filter(|i| i.is_past_due(today)).count();
    let used_this_year = state
        .invoices
        .iter()
        .filter(|i| {
            billing::parse_invoice_number(&i.invoice_number)
                .is_some_and(|(year, _)| year == today.year())
        })
        .count();
    let new_leads = state
        .leads
        .iter()
        .filter(|l| l.status == LeadStatus::New)
        .count();

    println!("Solarbook Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("Company:          {}", config.company.name);
    println!("GSTIN:            {}", config.company.gstin);
    println!("Catalog items:    {}", catalog.len());
    println!(
        "Invoices:         {} ({}/{} numbers used in {})",
        state.invoices.len(),
        used_this_year,
        MAX_SEQUENCE,
        today.year()
    );
    println!("Outstanding:      {}", format_money(outstanding, symbol));
    if past_due > 0 {
        println!(
            "Past due:         {past_due} (run 'solarbook mark-overdue' to flag them)"
        );
    }
    println!("Leads:            {} ({} new)", state.leads.len(), new_leads);
    println!(
        "Email:            {}",
        if config.notify.enabled {
            "enabled"
        } else {
            "disabled"
        }
    );

    let recent = state.invoices_newest_first();
    if !recent.is_empty() {
        println!();
        println!("Recent invoices:");
        for invoice in recent.iter().take(5) {
            println!(
                "  {} - {} - {} - {}",
                invoice.invoice_number,
                invoice.customer.name,
                format_money(invoice.total, symbol),
                invoice.status
            );
        }
    }

    Ok(())
}

fn parse_optional_date(input: Option<String>) -> Result<Option<chrono::NaiveDate>> {
    input.as_deref().map(parse_date).transpose()
}

/// Create a new invoice
#[allow(clippy::too_many_arguments)]
fn cmd_create(
    cfg_dir: &Path,
    customer: Customer,
    item_inputs: &[String],
    line_inputs: &[String],
    date: Option<String>,
    due: Option<String>,
    notes: String,
    pdf: bool,
    open: bool,
) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    if item_inputs.is_empty() && line_inputs.is_empty() {
        return Err(SolarError::NoItems);
    }

    let config = load_config(cfg_dir)?;
    let catalog = load_catalog(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;

    let draft = InvoiceDraft {
        customer,
        items: build_items(&catalog, item_inputs, line_inputs)?,
        date: parse_optional_date(date)?,
        due_date: parse_optional_date(due)?,
        notes,
    };

    let invoice = create_invoice(
        &mut state,
        &config.invoice,
        draft,
        Local::now().date_naive(),
        Utc::now(),
        &mut rand::rng(),
    )?
    .clone();
    save_state(cfg_dir, &state)?;

    let symbol = &config.invoice.currency_symbol;
    println!("Created {}", invoice.invoice_number);
    println!("  Customer: {}", invoice.customer.name);
    println!("  Subtotal: {}", format_money(invoice.subtotal, symbol));
    println!(
        "  GST:      {} (CGST {} + SGST {})",
        format_money(invoice.cgst + invoice.sgst, symbol),
        format_money(invoice.cgst, symbol),
        format_money(invoice.sgst, symbol)
    );
    println!("  Total:    {}", format_money(invoice.total, symbol));
    println!("  Due:      {}", invoice.due_date);

    if pdf {
        let pdf_path = render_invoice(cfg_dir, &config, &invoice)?;
        println!("  Saved:    {}", pdf_path.display());
        if open {
            open_path(&pdf_path)?;
        }
    }

    Ok(())
}

/// List invoices, newest first
fn cmd_list(
    cfg_dir: &Path,
    status: Option<InvoiceStatus>,
    search: Option<&str>,
    limit: Option<usize>,
) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let state = load_state(cfg_dir)?;
    let symbol = &config.invoice.currency_symbol;
    let today = Local::now().date_naive();

    if state.invoices.is_empty() {
        println!("No invoices created yet.");
        return Ok(());
    }

    // Indexes refer to the unfiltered order so they stay valid for other commands
    let mut invoices: Vec<_> = state
        .invoices_newest_first()
        .into_iter()
        .enumerate()
        .filter(|(_, invoice)| status.map_or(true, |s| invoice.status == s))
        .filter(|(_, invoice)| search.map_or(true, |q| invoice.matches_search(q)))
        .collect();
    if let Some(n) = limit {
        invoices.truncate(n);
    }

    if invoices.is_empty() {
        println!("No matching invoices.");
        return Ok(());
    }

    let rows: Vec<InvoiceRow> = invoices
        .iter()
        .map(|(idx, invoice)| InvoiceRow {
            index: idx + 1,
            number: invoice.invoice_number.clone(),
            date: invoice.date.to_string(),
            total: format_whole_money(invoice.total, symbol),
            status: if invoice.is_past_due(today) {
                format!("{} (overdue)", invoice.status)
            } else {
                invoice.status.to_string()
            },
            customer: invoice.customer.name.clone(),
        })
        .collect();

    let billed: f64 = invoices
        .iter()
        .filter(|(_, i)| i.status != InvoiceStatus::Cancelled)
        .map(|(_, i)| i.total)
        .sum();
    let paid: f64 = invoices
        .iter()
        .filter(|(_, i)| i.status == InvoiceStatus::Paid)
        .map(|(_, i)| i.total)
        .sum();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    let table = add_summary_footer(
        &table,
        &[
            ("BILLED", format_whole_money(billed, symbol)),
            ("(-) PAID", format_whole_money(paid, symbol)),
            ("(=) OUTSTANDING", format_whole_money(billed - paid, symbol)),
        ],
    );
    println!("{table}");

    println!();
    println!("Total: {} invoices", state.invoices.len());
    println!("Use index number with show/edit/set-status/pdf/open/delete (e.g., 'solarbook show 1')");

    Ok(())
}

/// Show one invoice
fn cmd_show(cfg_dir: &Path, reference: &str) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let state = load_state(cfg_dir)?;
    let number = state.resolve_invoice(reference)?;
    let invoice = state.invoice(&number)?;
    let symbol = &config.invoice.currency_symbol;

    println!("Invoice {}", invoice.invoice_number);
    println!("{}", "-".repeat(50));
    println!("Status:    {}", invoice.status.label());
    if invoice.is_past_due(Local::now().date_naive()) {
        println!("           past due");
    }
    println!("Date:      {}", invoice.date.format("%d %B %Y"));
    println!("Due:       {}", invoice.due_date.format("%d %B %Y"));
    println!();
    println!("Bill to:   {}", invoice.customer.name);
    for detail in [
        &invoice.customer.address,
        &invoice.customer.city,
        &invoice.customer.phone,
        &invoice.customer.email,
    ] {
        if !detail.is_empty() {
            println!("           {detail}");
        }
    }
    if let Some(gstin) = &invoice.customer.gstin {
        println!("GSTIN:     {gstin}");
    }
    println!();

    let rows: Vec<LineRow> = invoice
        .items
        .iter()
        .enumerate()
        .map(|(i, item)| LineRow {
            index: i + 1,
            name: item.name().to_string(),
            hsn: item.hsn().to_string(),
            quantity: format_quantity(item.quantity()),
            rate: format_money(item.rate(), symbol),
            amount: format_money(item.amount(), symbol),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()));

    println!();
    println!("Subtotal:  {}", format_money(invoice.subtotal, symbol));
    println!("CGST 9%:   {}", format_money(invoice.cgst, symbol));
    println!("SGST 9%:   {}", format_money(invoice.sgst, symbol));
    println!("Total:     {}", format_money(invoice.total, symbol));
    println!("In words:  {}", billing::number_to_words(invoice.total)?);
    if !invoice.notes.is_empty() {
        println!();
        println!("Notes:     {}", invoice.notes);
    }

    Ok(())
}

/// Replace an invoice's line items
fn cmd_edit(
    cfg_dir: &Path,
    reference: &str,
    item_inputs: &[String],
    line_inputs: &[String],
) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    if item_inputs.is_empty() && line_inputs.is_empty() {
        return Err(SolarError::NoItems);
    }

    let config = load_config(cfg_dir)?;
    let catalog = load_catalog(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;
    let number = state.resolve_invoice(reference)?;
    let items = build_items(&catalog, item_inputs, line_inputs)?;

    let invoice = state.invoice_mut(&number)?;
    invoice.replace_items(items, Utc::now());
    let total = invoice.total;
    let line_count = invoice.items.len();
    save_state(cfg_dir, &state)?;

    println!("Updated {number}");
    println!("  Lines:  {line_count}");
    println!(
        "  Total:  {}",
        format_money(total, &config.invoice.currency_symbol)
    );
    if invoice_pdf_path(cfg_dir, &config, &number).exists() {
        println!("  Run 'solarbook pdf {number}' to refresh the PDF.");
    }

    Ok(())
}

/// Change an invoice's status
fn cmd_set_status(cfg_dir: &Path, reference: &str, status: InvoiceStatus) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let mut state = load_state(cfg_dir)?;
    let number = state.resolve_invoice(reference)?;
    let previous = state.set_invoice_status(&number, status, Utc::now())?;
    save_state(cfg_dir, &state)?;

    println!("{number}: {previous} -> {status}");
    Ok(())
}

/// Flag sent invoices whose due date has passed
fn cmd_mark_overdue(cfg_dir: &Path) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let mut state = load_state(cfg_dir)?;
    let changed = state.mark_overdue(Local::now().date_naive(), Utc::now());

    if changed.is_empty() {
        println!("No sent invoices are past due.");
        return Ok(());
    }

    save_state(cfg_dir, &state)?;
    println!("Marked {} invoice(s) overdue:", changed.len());
    for number in changed {
        println!("  {number}");
    }
    Ok(())
}

/// Delete an invoice
fn cmd_delete(cfg_dir: &Path, reference: &str) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let mut state = load_state(cfg_dir)?;
    let number = state.resolve_invoice(reference)?;
    let removed = state.remove_invoice(&number)?;
    save_state(cfg_dir, &state)?;

    let pdf_path = invoice_pdf_path(cfg_dir, &config, &number);
    if pdf_path.exists() {
        std::fs::remove_file(&pdf_path)?;
    }

    println!(
        "Deleted {} ({})",
        removed.invoice_number, removed.customer.name
    );
    Ok(())
}

/// Render an invoice PDF
fn cmd_pdf(cfg_dir: &Path, reference: &str, open: bool) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let state = load_state(cfg_dir)?;
    let number = state.resolve_invoice(reference)?;
    let pdf_path = render_invoice(cfg_dir, &config, state.invoice(&number)?)?;

    println!("Generated {number}");
    println!("  Saved: {}", pdf_path.display());
    if open {
        open_path(&pdf_path)?;
    }
    Ok(())
}

/// Open an invoice PDF
fn cmd_open(cfg_dir: &Path, reference: &str) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let config = load_config(cfg_dir)?;
    let state = load_state(cfg_dir)?;
    let number = state.resolve_invoice(reference)?;
    let pdf_path = existing_invoice_pdf(cfg_dir, &config, &number)?;

    open_path(&pdf_path)?;

    println!("Opened {}", pdf_path.display());
    Ok(())
}

fn open_path(pdf_path: &Path) -> Result<()> {
    // Open with system default viewer
    #[cfg(target_os = "macos")]
    std::process::Command::new("open").arg(pdf_path).spawn()?;

    #[cfg(target_os = "linux")]
    std::process::Command::new("xdg-open").arg(pdf_path).spawn()?;

    #[cfg(target_os = "windows")]
    std::process::Command::new("cmd")
        .args(["/C", "start", ""])
        .arg(pdf_path)
        .spawn()?;

    Ok(())
}

fn read_lead_json(path: &Path) -> Result<NewLead> {
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| SolarError::InvalidLead(e.to_string()))
}

/// Record a lead submission
fn cmd_lead_add(cfg_dir: &Path, new_lead: NewLead, caller: &str) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let config: Config = load_config(cfg_dir)?;
    let mut state: State = load_state(cfg_dir)?;
    let notifier = notifier_from_settings(&config.notify);

    let outcome = leads::submit_lead(
        &mut state,
        &config,
        notifier.as_ref(),
        new_lead,
        caller,
        Utc::now(),
    );
    // Refused and invalid submissions still count against the caller's window
    save_state(cfg_dir, &state)?;
    let lead = outcome?;

    println!("Recorded lead #{} ({})", lead.id, lead.source.label());
    println!("  Name:  {}", lead.name);
    println!("  Phone: {}", lead.phone);
    if let Some(friend) = &lead.referred_name {
        println!("  Referred: {friend}");
    }
    Ok(())
}

fn lead_detail(lead: &solarbook::Lead) -> String {
    if let Some(friend) = &lead.referred_name {
        return format!("-> {friend}");
    }
    match (&lead.service, &lead.system_size) {
        (Some(service), _) => service.clone(),
        (None, Some(size)) => format!("{size} quote"),
        (None, None) => String::new(),
    }
}

/// List leads
fn cmd_lead_list(
    cfg_dir: &Path,
    status: Option<LeadStatus>,
    source: Option<LeadSource>,
    limit: usize,
) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let state = load_state(cfg_dir)?;
    let leads = state.query_leads(status, source, limit);

    if leads.is_empty() {
        println!("No leads found.");
        return Ok(());
    }

    let rows: Vec<LeadRow> = leads
        .iter()
        .map(|lead| LeadRow {
            id: lead.id,
            date: lead
                .created_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
                .to_string(),
            name: lead.name.clone(),
            phone: lead.phone.clone(),
            source: lead.source.to_string(),
            status: lead.status.to_string(),
            detail: lead_detail(lead),
        })
        .collect();

    println!("{}", Table::new(rows).with(Style::rounded()));
    println!();
    println!("Showing {} of {} leads", leads.len(), state.leads.len());
    Ok(())
}

fn cmd_lead_set_status(cfg_dir: &Path, id: u32, status: LeadStatus) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let mut state = load_state(cfg_dir)?;
    let lead = state.lead_mut(id)?;
    let previous = std::mem::replace(&mut lead.status, status);
    save_state(cfg_dir, &state)?;

    tracing::info!(id, from = %previous, to = %status, "lead status changed");
    println!("Lead #{id}: {previous} -> {status}");
    Ok(())
}

fn cmd_lead_note(cfg_dir: &Path, id: u32, notes: String) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let mut state = load_state(cfg_dir)?;
    let lead = state.lead_mut(id)?;
    lead.notes = Some(notes).filter(|n| !n.trim().is_empty());
    save_state(cfg_dir, &state)?;

    println!("Updated notes for lead #{id}");
    Ok(())
}

fn cmd_lead_delete(cfg_dir: &Path, id: u32) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let mut state = load_state(cfg_dir)?;
    let removed = state.remove_lead(id)?;
    save_state(cfg_dir, &state)?;

    println!("Deleted lead #{} ({})", removed.id, removed.name);
    Ok(())
}

/// Lead dashboard numbers
fn cmd_lead_stats(cfg_dir: &Path, json: bool) -> Result<()> {
    ensure_initialized(cfg_dir)?;

    let state = load_state(cfg_dir)?;
    let stats = LeadStats::compute(&state.leads, Utc::now());

    if json {
        let out = serde_json::to_string_pretty(&stats)
            .map_err(|e| SolarError::invalid("stats", e.to_string()))?;
        println!("{out}");
        return Ok(());
    }

    println!("Lead Stats");
    println!("{}", "-".repeat(50));
    println!("Total:              {}", stats.total);
    println!("This week:          {}", stats.this_week);
    println!("This month:         {}", stats.this_month);
    println!(
        "Converted:          {} ({}%)",
        stats.converted, stats.conversion_rate
    );
    println!(
        "Est. revenue:       {}",
        format_compact(stats.estimated_revenue, "₹")
    );
    println!();
    println!("By status:");
    for (status, count) in &stats.by_status {
        println!("  {:<12} {count}", status.as_str());
    }
    println!("By source:");
    for (source, count) in &stats.by_source {
        println!("  {:<12} {count}", source.as_str());
    }
    Ok(())
}
