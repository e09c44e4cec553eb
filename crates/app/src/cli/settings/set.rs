use clap::Args;
use nutbasket::pricing::PricingSettings;
use nutbasket_app::domain::settings::SettingsService;
use rust_decimal::Decimal;

use crate::cli::StoreArgs;

#[derive(Debug, Args)]
pub(crate) struct SetSettingsArgs {
    #[command(flatten)]
    store: StoreArgs,

    /// Tax rate as a percentage of the subtotal
    #[arg(long)]
    tax_rate: Option<Decimal>,

    /// Flat shipping charge below the free shipping threshold
    #[arg(long)]
    shipping_amount: Option<Decimal>,

    /// Subtotal from which shipping is free
    #[arg(long)]
    free_shipping_amount: Option<Decimal>,
}

#[derive(Debug, Clone, Copy, Default)]
struct SettingsChange {
    tax_rate: Option<Decimal>,
    shipping_amount: Option<Decimal>,
    free_shipping_amount: Option<Decimal>,
}

impl SettingsChange {
    fn apply_to(self, current: PricingSettings) -> PricingSettings {
        PricingSettings {
            tax_rate: self.tax_rate.unwrap_or(current.tax_rate),
            shipping_flat: self.shipping_amount.unwrap_or(current.shipping_flat),
            free_shipping_threshold: self
                .free_shipping_amount
                .unwrap_or(current.free_shipping_threshold),
        }
    }
}

pub(crate) async fn run(args: SetSettingsArgs) -> Result<(), String> {
    let change = SettingsChange {
        tax_rate: args.tax_rate,
        shipping_amount: args.shipping_amount,
        free_shipping_amount: args.free_shipping_amount,
    };
    let context = args.store.connect().await?;

    let saved = update(context.settings.as_ref(), change).await?;

    println!("tax_rate: {}", saved.tax_rate);
    println!("shipping_amount: {}", saved.shipping_flat);
    println!("free_shipping_amount: {}", saved.free_shipping_threshold);

    Ok(())
}

async fn update(
    settings: &dyn SettingsService,
    change: SettingsChange,
) -> Result<PricingSettings, String> {
    let current = settings
        .pricing_settings()
        .await
        .map_err(|error| format!("failed to read settings: {error}"))?;

    settings
        .update_pricing_settings(change.apply_to(current))
        .await
        .map_err(|error| format!("failed to save settings: {error}"))
}
