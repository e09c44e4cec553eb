use clap::{Args, Parser, Subcommand};
use nutbasket_app::context::AppContext;

mod coupon;
mod db;
mod logging;
mod order;
mod product;
mod settings;

pub(crate) use logging::LoggingConfig;

#[derive(Debug, Parser)]
#[command(name = "nutbasket", about = "Nutbasket storefront admin", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub(crate) logging: LoggingConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Db(db::DbCommand),
    Order(order::OrderCommand),
    Coupon(coupon::CouponCommand),
    Settings(settings::SettingsCommand),
    Product(product::ProductCommand),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        match self.command {
            Commands::Db(command) => db::run(command).await,
            Commands::Order(command) => order::run(command).await,
            Commands::Coupon(command) => coupon::run(command).await,
            Commands::Settings(command) => settings::run(command).await,
            Commands::Product(command) => product::run(command).await,
        }
    }
}

/// Connection settings shared by every command that talks to the store.
#[derive(Debug, Args)]
pub(crate) struct StoreArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Webhook notified of placed orders; placed orders are only logged when unset
    #[arg(long, env = "ORDER_WEBHOOK_URL")]
    order_webhook_url: Option<String>,
}

impl StoreArgs {
    pub(crate) async fn connect(self) -> Result<AppContext, String> {
        AppContext::from_database_url(&self.database_url, self.order_webhook_url)
            .await
            .map_err(|error| format!("failed to connect to database: {error}"))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_nested_commands_with_logging_flags() -> TestResult {
        let cli = Cli::try_parse_from([
            "nutbasket",
            "--log-format",
            "json",
            "coupon",
            "check",
            "--database-url",
            "postgres://localhost/nutbasket",
            "--code",
            "save10",
            "--subtotal",
            "300",
        ])?;

        assert!(matches!(cli.logging.log_format, logging::LogFormat::Json));
        assert!(matches!(cli.command, Commands::Coupon(_)));

        Ok(())
    }

    #[test]
    fn rejects_unknown_order_status() {
        let result = Cli::try_parse_from([
            "nutbasket",
            "order",
            "status",
            "--database-url",
            "postgres://localhost/nutbasket",
            "--order",
            "0195f3c8-7b1e-7c8a-9d3e-5f2a1b4c6d7e",
            "--status",
            "lost",
        ]);

        assert!(result.is_err(), "expected a parse error, got {result:?}");
    }
}
