//! Sale generation priced from the persisted catalog.

use rust_decimal::Decimal;
use time::PrimitiveDateTime;
use time::macros::datetime;

use super::{RowGenerator, require_pool};
use crate::error::PopulateError;
use crate::money;
use crate::rng::SeedStream;

/// A persisted product identity with its unit price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricedProduct {
    pub id: i64,
    pub price: Decimal,
}

/// Generated sale ready for database insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSale {
    pub product_id: i64,
    pub customer_id: i64,
    pub sale_date: PrimitiveDateTime,
    pub quantity: i32,
    pub total_amount: Decimal,
}

/// Configuration for sale generation.
#[derive(Debug, Clone)]
pub struct SaleGenConfig {
    pub window_start: PrimitiveDateTime,
    pub window_days: i64,
    /// Inclusive quantity bounds.
    pub quantity_range: (i32, i32),
}

impl Default for SaleGenConfig {
    fn default() -> Self {
        Self {
            window_start: datetime!(2015-01-01 0:00),
            window_days: 3650,
            quantity_range: (1, 10),
        }
    }
}

/// Generates sales referencing persisted products and customers.
pub struct SaleGenerator<'a> {
    config: SaleGenConfig,
    products: &'a [PricedProduct],
    customer_ids: &'a [i64],
}

impl<'a> SaleGenerator<'a> {
    /// Creates a generator over persisted product and customer identities.
    pub fn new(
        products: &'a [PricedProduct],
        customer_ids: &'a [i64],
    ) -> Result<Self, PopulateError> {
        Self::with_config(SaleGenConfig::default(), products, customer_ids)
    }

    /// Creates a generator with custom configuration.
    pub fn with_config(
        config: SaleGenConfig,
        products: &'a [PricedProduct],
        customer_ids: &'a [i64],
    ) -> Result<Self, PopulateError> {
        require_pool(products, "sales", "products")?;
        require_pool(customer_ids, "sales", "customers")?;
        if config.quantity_range.0 < 1 || config.quantity_range.0 > config.quantity_range.1 {
            return Err(PopulateError::InvalidConfig(format!(
                "sale quantity range {:?} must be positive and non-empty",
                config.quantity_range
            )));
        }
        Ok(Self {
            config,
            products,
            customer_ids,
        })
    }

    /// Generates one sale.
    pub fn generate(&self, rng: &mut SeedStream) -> GeneratedSale {
        let product = self.products[rng.index(self.products.len())];
        let customer_id = self.customer_ids[rng.index(self.customer_ids.len())];
        let sale_date = rng.moment_after(self.config.window_start, self.config.window_days);
        let (min_qty, max_qty) = self.config.quantity_range;
        let quantity = rng.int_in(min_qty..=max_qty);
        let multiplier = money::sample_multiplier(rng);

        GeneratedSale {
            product_id: product.id,
            customer_id,
            sale_date,
            quantity,
            total_amount: money::sale_total(product.price, quantity.unsigned_abs(), multiplier),
        }
    }

    /// Generates `count` sales.
    pub fn generate_batch(&self, count: usize, rng: &mut SeedStream) -> Vec<GeneratedSale> {
        (0..count).map(|_| self.generate(rng)).collect()
    }
}

impl RowGenerator for SaleGenerator<'_> {
    type Row = GeneratedSale;

    fn generate_row(
        &mut self,
        _index: usize,
        rng: &mut SeedStream,
    ) -> Result<GeneratedSale, PopulateError> {
        Ok(self.generate(rng))
    }
}
