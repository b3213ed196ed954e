//! Preview of the windowed product list.

use std::io::Write;

use serde::Serialize;
use vitrine_storefront::catalog::{CatalogSource, Product, ProductFilter};
use vitrine_storefront::config::WindowConfig;
use vitrine_storefront::virtual_scroll::{RenderMode, RenderTarget, VirtualList, WindowFrame};

use super::{CliError, Format, write_json};

/// Keeps the most recent frame as plain rows.
#[derive(Debug, Default)]
struct TextTarget {
    rows: Vec<String>,
    offset: u64,
    total_height: u64,
}

impl RenderTarget<Product> for TextTarget {
    fn render(&mut self, frame: WindowFrame<'_, Product>) {
        self.offset = frame.offset;
        self.total_height = frame.total_height;
        self.rows = frame
            .items
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{:>5}  {}", frame.start + i, p.name))
            .collect();
    }
}

#[derive(Debug, Serialize)]
struct Preview<'a> {
    mode: &'a str,
    start: usize,
    end: usize,
    offset: u64,
    total_height: u64,
    rows: &'a [String],
}

/// Render the product list at `offset` and print the visible rows.
pub async fn preview(
    catalog: &impl CatalogSource,
    config: &WindowConfig,
    offset: u64,
    viewport: u32,
    format: Format,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let products = catalog.list_products(&ProductFilter::default()).await?;
    let total = products.len();
    let mode = RenderMode::for_len(total, config.threshold);

    let (start, end, target) = match mode {
        RenderMode::Direct => {
            let mut target = TextTarget::default();
            target.render(WindowFrame {
                items: &products,
                start: 0,
                offset: 0,
                total_height: u64::from(config.item_height)
                    .saturating_mul(u64::try_from(total).unwrap_or(u64::MAX)),
            });
            (0, total, target)
        }
        RenderMode::Windowed => {
            let mut list = VirtualList::with_config(products, TextTarget::default(), config);
            list.init(viewport);
            list.on_scroll(offset);
            let range = list.range().unwrap_or_default();
            (range.start, range.end, list.into_target())
        }
    };

    let preview = Preview {
        mode: match mode {
            RenderMode::Direct => "direct",
            RenderMode::Windowed => "windowed",
        },
        start,
        end,
        offset: target.offset,
        total_height: target.total_height,
        rows: &target.rows,
    };
    if format == Format::Json {
        return write_json(out, &preview);
    }

    writeln!(
        out,
        "Rows {}..{} of {} ({} rendering), offset {}px, height {}px",
        preview.start,
        preview.end,
        total,
        preview.mode,
        preview.offset,
        preview.total_height,
    )?;
    for row in preview.rows {
        writeln!(out, "{row}")?;
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use vitrine_core::{Price, ProductId};
    use vitrine_storefront::catalog::MockCatalog;

    use super::*;

    fn many(n: usize) -> MockCatalog {
        let products = (0..n)
            .map(|i| Product {
                id: ProductId::new(i.to_string()),
                name: format!("Item {i}"),
                price: Price::ZERO,
                image_url: None,
                code: None,
                category_id: None,
                description: None,
                stock: None,
                created_at: None,
            })
            .collect();
        MockCatalog::new(Vec::new(), products)
    }

    #[tokio::test]
    async fn test_preview_window() {
        let config = WindowConfig {
            threshold: 50,
            item_height: 400,
            overscan: 2,
        };
        let mut out = Vec::new();
        preview(&many(1000), &config, 4000, 600, Format::Text, &mut out)
            .await
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Rows 8..14 of 1000 (windowed rendering), offset 3200px, height 400000px"
        );
        assert_eq!(lines.count(), 6);
        assert!(text.contains("Item 8"));
        assert!(!text.contains("Item 14"));
    }

    #[tokio::test]
    async fn test_preview_short_list_renders_every_row() {
        let mut out = Vec::new();
        preview(
            &many(40),
            &WindowConfig::default(),
            4000,
            600,
            Format::Json,
            &mut out,
        )
        .await
        .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["mode"], "direct");
        assert_eq!(value["start"], 0);
        assert_eq!(value["end"], 40);
        assert_eq!(value["offset"], 0);
        assert_eq!(value["rows"].as_array().unwrap().len(), 40);
    }

    #[tokio::test]
    async fn test_preview_json_small_list() {
        let mut out = Vec::new();
        preview(
            &many(3),
            &WindowConfig::default(),
            0,
            600,
            Format::Json,
            &mut out,
        )
        .await
        .unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["mode"], "direct");
        assert_eq!(value["end"], 3);
    }
}
