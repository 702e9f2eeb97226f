//! Command-line front end for the order platform.
//!
//! Stands in for the web portal's pages:
//! - `whoami` - Show the logged-in profile
//! - `products ...` - Browse and manage the catalogue
//! - `orders ...` - Buyer orders, approvals and the tracking timeline
//! - `users ...` - Admin user management
//! - `dashboard` - Role statistics
//! - `theme ...` - Light/dark preference
//! - `route <path>` - What a page shows for the current session
//! - `config check` - Validate configuration file

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::models::{OrderStatus, ProductFilter, Role, TrackingEvent, TrackingStage, UserFilter};
use crate::routes::{self, Resolution};
use crate::theme::Theme;
use crate::tracking::Timeline;
use crate::Portal;

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "garmentflow")]
#[command(author, version, about = "Storefront, bookings and order tracking for the garments platform", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "garmentflow.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// API URL to connect to (overrides the configured profile)
    #[arg(long, env = "GARMENTFLOW_API_URL")]
    pub api_url: Option<String>,

    /// Access token (can also be set via GARMENTFLOW_TOKEN env var)
    #[arg(long, env = "GARMENTFLOW_TOKEN")]
    pub token: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the profile behind the token
    Whoami,

    /// Product catalogue commands
    #[command(subcommand)]
    Products(ProductsCommands),

    /// Order commands
    #[command(subcommand)]
    Orders(OrdersCommands),

    /// User management commands (admin)
    #[command(subcommand)]
    Users(UsersCommands),

    /// Show dashboard statistics for your role
    Dashboard,

    /// Theme preference commands
    #[command(subcommand)]
    Theme(ThemeCommands),

    /// Show how a portal path resolves for the current session
    Route {
        /// Path such as /dashboard/manage-users
        path: String,
    },

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Products subcommands
#[derive(Subcommand, Debug)]
pub enum ProductsCommands {
    /// List products page by page
    List {
        #[arg(short, long, default_value = "1")]
        page: u32,
        #[arg(short, long, default_value = "9")]
        limit: u32,
        /// Search by name
        #[arg(short, long)]
        search: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Show details for a product
    Show { id: String },
    /// Products featured on the home page
    Home,
    /// Products you manage (manager)
    Mine,
    /// Delete a product (manager/admin)
    Delete { id: String },
    /// Feature a product on the home page (admin)
    Feature {
        id: String,
        /// Remove it from the home page instead
        #[arg(long)]
        off: bool,
    },
}

/// Orders subcommands
#[derive(Subcommand, Debug)]
pub enum OrdersCommands {
    /// Your orders (buyer)
    Mine,
    /// All orders (admin / manager)
    All {
        /// pending, approved, rejected, cancelled or delivered
        #[arg(short, long)]
        status: Option<OrderStatus>,
    },
    /// Show an order with its timeline
    Show { id: String },
    /// Show the tracking timeline of an order
    Track { id: String },
    /// Approve a pending order (manager)
    Approve { id: String },
    /// Reject a pending order (manager)
    Reject { id: String },
    /// Cancel one of your pending orders (buyer)
    Cancel { id: String },
    /// Add a tracking event (manager)
    AddTracking {
        id: String,
        /// Stage name, e.g. "Sewing Started"
        status: String,
        #[arg(long)]
        location: Option<String>,
        #[arg(long)]
        note: Option<String>,
    },
}

/// Users subcommands
#[derive(Subcommand, Debug)]
pub enum UsersCommands {
    /// List users
    List {
        #[arg(short, long)]
        search: Option<String>,
        #[arg(short, long)]
        role: Option<Role>,
    },
    /// Change a user's role
    SetRole { id: String, role: Role },
    /// Suspend a user
    Suspend {
        id: String,
        #[arg(long)]
        reason: String,
        #[arg(long)]
        feedback: String,
    },
    /// Reactivate a suspended user
    Activate { id: String },
}

/// Theme subcommands
#[derive(Subcommand, Debug)]
pub enum ThemeCommands {
    /// Print the current theme
    Show,
    /// Set the theme (light or dark)
    Set { theme: Theme },
    /// Switch between light and dark
    Toggle,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

// ============================================================================
// CLI Command Handlers
// ============================================================================

/// Build the portal and resolve the session if a token was given
async fn connect(cli: &Cli, mut config: Config) -> Result<Portal> {
    if let Some(url) = &cli.api_url {
        config.api.base_url = Some(url.clone());
    }
    let portal = Portal::new(config, cli.token.clone()).context("Failed to create API client")?;
    if cli.token.is_some() {
        portal
            .restore_session()
            .await
            .context("Failed to restore session. Check --token or GARMENTFLOW_TOKEN")?;
    }
    Ok(portal)
}

/// Run a CLI command
pub async fn run_command(cli: &Cli, config: Config) -> Result<()> {
    if let Commands::Config(ConfigCommands::Check) = &cli.command {
        return cmd_config_check(cli);
    }

    let portal = connect(cli, config).await?;
    match &cli.command {
        Commands::Whoami => cmd_whoami(&portal),
        Commands::Products(cmd) => cmd_products(&portal, cmd).await,
        Commands::Orders(cmd) => cmd_orders(&portal, cmd).await,
        Commands::Users(cmd) => cmd_users(&portal, cmd).await,
        Commands::Dashboard => cmd_dashboard(&portal).await,
        Commands::Theme(cmd) => cmd_theme(&portal, cmd),
        Commands::Route { path } => cmd_route(&portal, path),
        Commands::Config(ConfigCommands::Check) => Ok(()),
    }
}

fn cmd_whoami(portal: &Portal) -> Result<()> {
    let user = portal
        .session
        .user()
        .context("Not logged in. Use --token or set GARMENTFLOW_TOKEN environment variable.")?;

    println!();
    println!("Name:    {}", user.display_name);
    println!("Email:   {}", user.email);
    println!("Role:    {}", user.role);
    if user.is_suspended() {
        println!("Status:  suspended");
        if let Some(reason) = &user.suspend_reason {
            println!("Reason:  {}", reason);
        }
    } else {
        println!("Status:  active");
    }
    println!();
    Ok(())
}

async fn cmd_products(portal: &Portal, cmd: &ProductsCommands) -> Result<()> {
    match cmd {
        ProductsCommands::List {
            page,
            limit,
            search,
            category,
        } => {
            let filter = ProductFilter {
                page: *page,
                limit: *limit,
                search: search.clone(),
                category: category.clone(),
            };
            let result = portal.products(&filter).await?;
            print_products(&result.products);
            println!(
                "Page {} of {} ({} products)",
                filter.page,
                result.page_count(filter.limit).max(1),
                result.total
            );
            Ok(())
        }
        ProductsCommands::Show { id } => {
            let product = portal.product(id).await?;
            println!();
            println!("=== Product: {} ===", product.name);
            println!();
            println!("ID:          {}", product.id);
            println!("Category:    {}", product.category);
            println!("Price:       {:.2}", product.price);
            println!("Available:   {}", product.available_quantity);
            println!("Min. order:  {}", product.moq);
            println!("Payment:     {}", product.payment_option);
            println!("On home:     {}", if product.show_on_home { "yes" } else { "no" });
            if let Some(image) = product.cover_image() {
                println!("Image:       {}", image);
            }
            if let Some(video) = &product.demo_video {
                println!("Demo video:  {}", video);
            }
            println!();
            println!("{}", product.description);
            println!();
            Ok(())
        }
        ProductsCommands::Home => {
            print_products(&portal.home_products().await?);
            Ok(())
        }
        ProductsCommands::Mine => {
            print_products(&portal.my_products().await?);
            Ok(())
        }
        ProductsCommands::Delete { id } => {
            portal.delete_product(id).await?;
            println!("Deleted product {}", id);
            Ok(())
        }
        ProductsCommands::Feature { id, off } => {
            portal.set_show_on_home(id, !off).await?;
            if *off {
                println!("Product {} removed from the home page", id);
            } else {
                println!("Product {} is now featured on the home page", id);
            }
            Ok(())
        }
    }
}

fn print_products(products: &[crate::models::Product]) {
    if products.is_empty() {
        println!("No products found.");
        return;
    }

    println!();
    println!(
        "{:<24}  {:<28}  {:<12}  {:>10}  {:>9}  {:>6}  {:<16}",
        "ID", "NAME", "CATEGORY", "PRICE", "AVAILABLE", "MOQ", "PAYMENT"
    );
    println!("{}", "-".repeat(118));
    for p in products {
        println!(
            "{:<24}  {:<28}  {:<12}  {:>10.2}  {:>9}  {:>6}  {:<16}",
            truncate(&p.id, 24),
            truncate(&p.name, 28),
            truncate(&p.category, 12),
            p.price,
            p.available_quantity,
            p.moq,
            p.payment_option
        );
    }
    println!();
}

async fn cmd_orders(portal: &Portal, cmd: &OrdersCommands) -> Result<()> {
    match cmd {
        OrdersCommands::Mine => {
            print_orders(&portal.my_orders().await?);
            Ok(())
        }
        OrdersCommands::All { status } => {
            print_orders(&portal.orders(*status).await?);
            Ok(())
        }
        OrdersCommands::Show { id } => {
            let order = portal.order(id).await?;
            println!();
            println!("=== Order: {} ===", order.tracking_id);
            println!();
            println!("ID:          {}", order.id);
            println!("Buyer:       {}", order.buyer_email);
            println!("Product:     {}", order.product_label());
            println!("Quantity:    {}", order.quantity);
            println!("Price:       {:.2}", order.order_price);
            println!("Payment:     {} ({:?})", order.payment_option, order.payment_status);
            println!("Status:      {}", order.status);
            println!("Address:     {}", order.delivery_address);
            if !order.additional_notes.is_empty() {
                println!("Notes:       {}", order.additional_notes);
            }
            print_timeline(&Timeline::from_order(&order));
            Ok(())
        }
        OrdersCommands::Track { id } => {
            let timeline = portal.timeline(id).await?;
            println!();
            println!("=== Tracking: {} ===", timeline.tracking_id);
            print_timeline(&timeline);
            Ok(())
        }
        OrdersCommands::Approve { id } => {
            portal.approve_order(id).await?;
            println!("Order {} approved", id);
            Ok(())
        }
        OrdersCommands::Reject { id } => {
            portal.reject_order(id).await?;
            println!("Order {} rejected", id);
            Ok(())
        }
        OrdersCommands::Cancel { id } => {
            portal.cancel_order(id).await?;
            println!("Order {} cancelled", id);
            Ok(())
        }
        OrdersCommands::AddTracking {
            id,
            status,
            location,
            note,
        } => {
            if !TrackingStage::all().iter().any(|s| s.label() == status) {
                tracing::warn!(status = %status, "Not one of the standard production stages");
            }
            let event = TrackingEvent {
                status: status.clone(),
                date: Some(chrono::Utc::now().to_rfc3339()),
                location: location.clone(),
                note: note.clone(),
            };
            portal.add_tracking(id, &event).await?;
            println!("Tracking event '{}' added to order {}", status, id);
            Ok(())
        }
    }
}

fn print_orders(orders: &[crate::models::Order]) {
    if orders.is_empty() {
        println!("No orders found.");
        return;
    }

    println!();
    println!(
        "{:<24}  {:<14}  {:<24}  {:>8}  {:>10}  {:<10}  {:<16}",
        "ID", "TRACKING", "PRODUCT", "QTY", "PRICE", "STATUS", "PAYMENT"
    );
    println!("{}", "-".repeat(118));
    for o in orders {
        println!(
            "{:<24}  {:<14}  {:<24}  {:>8}  {:>10.2}  {:<10}  {:<16}",
            truncate(&o.id, 24),
            truncate(&o.tracking_id, 14),
            truncate(&o.product_label(), 24),
            o.quantity,
            o.order_price,
            o.status,
            o.payment_option
        );
    }
    println!();
}

fn print_timeline(timeline: &Timeline) {
    println!();
    if timeline.is_empty() {
        println!("No tracking updates yet.");
        println!();
        return;
    }
    for entry in &timeline.entries {
        let when = entry
            .at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "(no date)".to_string());
        let mut line = format!("{:<16}  [{:<8}]  {}", when, entry.source.as_str(), entry.status);
        if let Some(location) = &entry.location {
            line.push_str(&format!(" @ {}", location));
        }
        if let Some(note) = &entry.note {
            line.push_str(&format!(" - {}", note));
        }
        println!("{}", line);
    }
    println!();
}

async fn cmd_users(portal: &Portal, cmd: &UsersCommands) -> Result<()> {
    match cmd {
        UsersCommands::List { search, role } => {
            let users = portal
                .users(&UserFilter {
                    search: search.clone(),
                    role: *role,
                })
                .await?;
            if users.is_empty() {
                println!("No users found.");
                return Ok(());
            }
            println!();
            println!(
                "{:<24}  {:<24}  {:<32}  {:<8}  {:<10}",
                "ID", "NAME", "EMAIL", "ROLE", "STATUS"
            );
            println!("{}", "-".repeat(106));
            for u in users {
                println!(
                    "{:<24}  {:<24}  {:<32}  {:<8}  {:<10}",
                    truncate(&u.id, 24),
                    truncate(&u.display_name, 24),
                    truncate(&u.email, 32),
                    u.role,
                    if u.is_suspended() { "suspended" } else { "active" }
                );
            }
            println!();
            Ok(())
        }
        UsersCommands::SetRole { id, role } => {
            portal.update_role(id, *role).await?;
            println!("User {} is now {}", id, role);
            Ok(())
        }
        UsersCommands::Suspend {
            id,
            reason,
            feedback,
        } => {
            portal.suspend_user(id, reason, feedback).await?;
            println!("User {} suspended", id);
            Ok(())
        }
        UsersCommands::Activate { id } => {
            portal.activate_user(id).await?;
            println!("User {} activated", id);
            Ok(())
        }
    }
}

async fn cmd_dashboard(portal: &Portal) -> Result<()> {
    let stats = portal.dashboard().await?;
    let role = portal.session.role().map(|r| r.as_str()).unwrap_or("-");

    println!();
    println!("=== Dashboard ({}) ===", role);
    println!();
    for (label, value) in stats.rows() {
        println!("  {:<12} {}", format!("{}:", label), value);
    }
    for (name, value) in &stats.extra {
        println!("  {:<12} {}", format!("{}:", name), value);
    }
    if !stats.chart.is_empty() {
        println!();
        for point in &stats.chart {
            println!("  {:<10} {:>10.0}", truncate(&point.label, 10), point.value);
        }
    }
    println!();
    Ok(())
}

fn cmd_theme(portal: &Portal, cmd: &ThemeCommands) -> Result<()> {
    let theme = match cmd {
        ThemeCommands::Show => portal.theme.current(),
        ThemeCommands::Set { theme } => portal.theme.set(*theme)?,
        ThemeCommands::Toggle => portal.theme.toggle()?,
    };
    println!("Theme: {}", theme);
    Ok(())
}

fn cmd_route(portal: &Portal, path: &str) -> Result<()> {
    let state = portal.session.state();
    match routes::resolve(path, state) {
        Resolution::Render(route) => {
            println!("[OK] {} renders {:?}", route.path(), route);
            let menu = routes::dashboard_menu(state);
            if !menu.is_empty() {
                println!();
                println!("Dashboard menu:");
                for item in menu {
                    println!("  {}", item.path());
                }
            }
        }
        Resolution::Pending => println!("[..] Session is still loading"),
        Resolution::Forbidden(route) => {
            println!("[!!] {} is forbidden for this session", route.path())
        }
        Resolution::RedirectToLogin { return_to } => {
            println!("[->] Redirect to {}?from={}", routes::LOGIN_PATH, return_to)
        }
        Resolution::NotFound => println!("[!!] No page at {}", path),
    }
    Ok(())
}

fn cmd_config_check(cli: &Cli) -> Result<()> {
    let config_path = &cli.config;

    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!(
            "[!!] Configuration file not found: {}",
            config_path.display()
        );
        println!();
        println!("Defaults will be used (local API at http://localhost:3000).");
        return Ok(());
    }

    match Config::load(config_path) {
        Ok(mut config) => {
            if let Some(url) = &cli.api_url {
                config.api.base_url = Some(url.clone());
            }
            println!("[OK] Configuration file is valid!");
            println!();
            println!("=== Configuration Summary ===");
            println!();
            println!("API:");
            println!("  Profile:      {:?}", config.api.profile);
            println!("  Base URL:     {}", config.api.resolved_base_url());
            println!("  Timeout:      {}s", config.api.timeout_secs);
            println!();
            println!("Cache:");
            println!("  Capacity:     {}", config.cache.capacity);
            println!("  TTL:          {}s", config.cache.ttl_secs);
            println!();
            println!("Storage:");
            println!("  State Dir:    {}", config.storage.state_dir.display());
            println!();
            println!("Logging:");
            println!("  Level:        {}", config.logging.level);
            println!();
            Ok(())
        }
        Err(e) => {
            println!("[!!] Configuration file is invalid!");
            println!();
            println!("Error: {:#}", e);
            anyhow::bail!("Invalid configuration")
        }
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Polo Shirt", 20), "Polo Shirt");
        assert_eq!(truncate("Heavyweight Denim Jacket", 10), "Heavywe...");
        assert_eq!(truncate("Ärmelloses Shirt", 8), "Ärmel...");
    }

    #[test]
    fn test_parse_orders_all_with_status() {
        let cli = Cli::try_parse_from(["garmentflow", "orders", "all", "--status", "approved"]).unwrap();
        match cli.command {
            Commands::Orders(OrdersCommands::All { status }) => {
                assert_eq!(status, Some(OrderStatus::Approved))
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_set_role_rejects_unknown_role() {
        assert!(Cli::try_parse_from(["garmentflow", "users", "set-role", "u3", "owner"]).is_err());
        let cli = Cli::try_parse_from(["garmentflow", "users", "set-role", "u3", "manager"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Users(UsersCommands::SetRole { role: Role::Manager, .. })
        ));
    }

    #[test]
    fn test_parse_theme_set() {
        let cli = Cli::try_parse_from(["garmentflow", "--token", "t", "theme", "set", "dark"]).unwrap();
        assert_eq!(cli.token.as_deref(), Some("t"));
        assert!(matches!(
            cli.command,
            Commands::Theme(ThemeCommands::Set { theme: Theme::Dark })
        ));
    }
}
