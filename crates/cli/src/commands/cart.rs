//! Cart commands.

use std::io::Write;

use vitrine_core::{CurrencyCode, ProductId};
use vitrine_storefront::cart::storage::KeyValueStore;
use vitrine_storefront::cart::{CartProduct, CartStore};
use vitrine_storefront::catalog::CatalogSource;
use vitrine_storefront::notify::Notifier;

use super::{CliError, Format, write_json};

/// Look up a product and add it to the cart.
pub async fn add<S, N>(
    cart: &mut CartStore<S, N>,
    catalog: &impl CatalogSource,
    id: &str,
    quantity: u32,
) -> Result<(), CliError>
where
    S: KeyValueStore,
    N: Notifier,
{
    let detail = catalog.get_product(&ProductId::new(id)).await?;
    cart.add_item(&CartProduct::from(&detail.product), quantity)?;
    Ok(())
}

/// Print the cart contents and total.
pub fn list<S, N>(
    cart: &CartStore<S, N>,
    currency: CurrencyCode,
    format: Format,
    out: &mut impl Write,
) -> Result<(), CliError>
where
    S: KeyValueStore,
    N: Notifier,
{
    if format == Format::Json {
        return write_json(
            out,
            &serde_json::json!({
                "items": cart.items(),
                "total": cart.total(),
                "item_count": cart.item_count(),
            }),
        );
    }
    if cart.is_empty() {
        writeln!(out, "Cart is empty")?;
        return Ok(());
    }
    for item in cart.items() {
        writeln!(
            out,
            "{:>4}  {:<28} {:>3} x {:>12} = {:>12}",
            item.id,
            item.name,
            item.quantity,
            currency.format(item.price.amount()),
            currency.format(item.line_total()),
        )?;
    }
    writeln!(
        out,
        "{} items, total {}",
        cart.item_count(),
        cart.formatted_total(currency)
    )?;
    Ok(())
}

/// Summarise and clear the cart.
pub fn checkout<S, N>(
    cart: &mut CartStore<S, N>,
    currency: CurrencyCode,
    format: Format,
    out: &mut impl Write,
) -> Result<(), CliError>
where
    S: KeyValueStore,
    N: Notifier,
{
    let Some(order) = cart.checkout() else {
        writeln!(out, "Cart is empty")?;
        return Ok(());
    };
    if format == Format::Json {
        return write_json(out, &order);
    }
    writeln!(out, "Order {}", order.reference)?;
    for item in &order.items {
        writeln!(out, "  {} x {}", item.quantity, item.name)?;
    }
    writeln!(
        out,
        "{} items, total {}",
        order.item_count,
        currency.format(order.total)
    )?;
    Ok(())
}
