//! Catalog product generation.

use rust_decimal::Decimal;

use super::RowGenerator;
use crate::error::PopulateError;
use crate::money;
use crate::rng::SeedStream;

/// Product category as stored in the `category` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Electronics,
    Clothing,
    Books,
    Home,
    Toys,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Electronics,
        Category::Clothing,
        Category::Books,
        Category::Home,
        Category::Toys,
    ];

    /// Returns the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Electronics => "Electronics",
            Category::Clothing => "Clothing",
            Category::Books => "Books",
            Category::Home => "Home",
            Category::Toys => "Toys",
        }
    }
}

/// Generated product ready for database insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedProduct {
    pub name: String,
    pub category: Category,
    pub price: Decimal,
}

/// Generates catalog products.
#[derive(Debug, Default)]
pub struct ProductGenerator;

impl ProductGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generates the product at `index` (0-based).
    pub fn generate(&self, index: usize, rng: &mut SeedStream) -> GeneratedProduct {
        let category = Category::ALL[rng.index(Category::ALL.len())];
        let price = money::sample_price(rng);

        GeneratedProduct {
            name: format!("Product_{}", index + 1),
            category,
            price,
        }
    }

    /// Generates `count` products.
    pub fn generate_batch(&self, count: usize, rng: &mut SeedStream) -> Vec<GeneratedProduct> {
        (0..count).map(|i| self.generate(i, rng)).collect()
    }
}

impl RowGenerator for ProductGenerator {
    type Row = GeneratedProduct;

    fn generate_row(
        &mut self,
        index: usize,
        rng: &mut SeedStream,
    ) -> Result<GeneratedProduct, PopulateError> {
        Ok(self.generate(index, rng))
    }
}
