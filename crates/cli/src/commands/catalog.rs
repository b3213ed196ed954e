//! Catalog browsing commands.

use std::io::Write;

use vitrine_core::{CategoryId, CurrencyCode, ProductId, SortOrder};
use vitrine_storefront::browse::BrowseController;
use vitrine_storefront::catalog::{CatalogSource, Product, ProductFilter};
use vitrine_storefront::config::StorefrontConfig;
use vitrine_storefront::notify::TracingNotifier;

use super::{CliError, Format, write_json};

/// List every category.
pub async fn categories(
    catalog: &impl CatalogSource,
    format: Format,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let categories = catalog.list_categories().await?;
    if format == Format::Json {
        return write_json(out, &categories);
    }
    for category in &categories {
        writeln!(out, "{:>4}  {}", category.id, category.name)?;
    }
    Ok(())
}

/// List products, optionally within one category.
pub async fn products<C: CatalogSource>(
    catalog: C,
    config: &StorefrontConfig,
    category: Option<String>,
    sort: SortOrder,
    format: Format,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mut browse = BrowseController::new(catalog, TracingNotifier, config);
    browse
        .set_filter(ProductFilter {
            category_id: category.map(CategoryId::from),
            sort,
        })
        .await?;

    if format == Format::Json {
        return write_json(out, browse.products());
    }
    write_products(out, browse.products(), config.currency)?;
    if browse.has_more() {
        writeln!(out, "More products available")?;
    }
    Ok(())
}

/// Products whose name, code or description contains `term`.
pub async fn search<C: CatalogSource>(
    catalog: C,
    config: &StorefrontConfig,
    term: &str,
    format: Format,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let mut browse = BrowseController::new(catalog, TracingNotifier, config);
    browse.load_products().await?;
    let results = browse.search(term);

    if format == Format::Json {
        return write_json(out, &*results);
    }
    if results.is_empty() {
        writeln!(out, "No products match \"{}\"", term.trim())?;
        return Ok(());
    }
    write_products(out, &results, config.currency)
}

/// One product with its category.
pub async fn show<C: CatalogSource>(
    catalog: C,
    config: &StorefrontConfig,
    id: &str,
    format: Format,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let browse = BrowseController::new(catalog, TracingNotifier, config);
    let detail = browse.product_detail(&ProductId::new(id)).await?;

    if format == Format::Json {
        return write_json(out, &detail);
    }
    let product = &detail.product;
    writeln!(out, "{}", product.name)?;
    writeln!(out, "  Price:    {}", config.currency.format(product.price.amount()))?;
    if let Some(code) = &product.code {
        writeln!(out, "  Code:     {code}")?;
    }
    if !detail.category_name.is_empty() {
        writeln!(out, "  Category: {}", detail.category_name)?;
    }
    if let Some(stock) = product.stock {
        writeln!(out, "  Stock:    {stock}")?;
    }
    if let Some(description) = &product.description {
        writeln!(out, "\n{description}")?;
    }
    Ok(())
}

pub(crate) fn write_products(
    out: &mut impl Write,
    products: &[Product],
    currency: CurrencyCode,
) -> Result<(), CliError> {
    for product in products {
        writeln!(
            out,
            "{:>4}  {:<28} {:>12}  {}",
            product.id,
            product.name,
            currency.format(product.price.amount()),
            product.code.as_deref().unwrap_or("-"),
        )?;
    }
    Ok(())
}
