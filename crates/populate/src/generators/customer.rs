//! Customer generation with run-unique email addresses.

use time::Date;
use time::macros::date;

use super::RowGenerator;
use crate::error::PopulateError;
use crate::resolver::{EmailResolver, Resolution};
use crate::rng::SeedStream;

/// Generated customer ready for database insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCustomer {
    pub name: String,
    pub email: String,
    pub signup_date: Date,
}

/// Configuration for customer generation.
#[derive(Debug, Clone)]
pub struct CustomerGenConfig {
    pub signup_window_start: Date,
    pub signup_window_days: i64,
}

impl Default for CustomerGenConfig {
    fn default() -> Self {
        Self {
            signup_window_start: date!(2010 - 01 - 01),
            signup_window_days: 5000,
        }
    }
}

/// Generates customers. Holds the run's used-address set, so one generator
/// must produce every customer of a run.
pub struct CustomerGenerator {
    config: CustomerGenConfig,
    resolver: EmailResolver,
}

impl CustomerGenerator {
    pub fn new() -> Self {
        Self::with_resolver(CustomerGenConfig::default(), EmailResolver::new())
    }

    /// Creates a generator with custom configuration and resolver.
    pub fn with_resolver(config: CustomerGenConfig, resolver: EmailResolver) -> Self {
        Self { config, resolver }
    }

    /// Generates the customer at `index` (0-based).
    ///
    /// Fails with [`PopulateError::UniquenessExhausted`] when no unique
    /// address can be found; the whole run is expected to abort.
    pub fn generate(
        &mut self,
        index: usize,
        rng: &mut SeedStream,
    ) -> Result<GeneratedCustomer, PopulateError> {
        let sequence = index + 1;
        let email = match self.resolver.resolve(sequence, rng) {
            Resolution::Resolved(email) => email,
            Resolution::Exhausted { attempts } => {
                return Err(PopulateError::UniquenessExhausted { sequence, attempts });
            }
        };
        let signup_date = rng.days_after(
            self.config.signup_window_start,
            self.config.signup_window_days,
        );

        Ok(GeneratedCustomer {
            name: format!("Customer_{sequence}"),
            email,
            signup_date,
        })
    }

    /// Generates `count` customers.
    pub fn generate_batch(
        &mut self,
        count: usize,
        rng: &mut SeedStream,
    ) -> Result<Vec<GeneratedCustomer>, PopulateError> {
        (0..count).map(|i| self.generate(i, rng)).collect()
    }

    /// The resolver's view of addresses used so far.
    pub fn resolver(&self) -> &EmailResolver {
        &self.resolver
    }
}

impl Default for CustomerGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl RowGenerator for CustomerGenerator {
    type Row = GeneratedCustomer;

    fn generate_row(
        &mut self,
        index: usize,
        rng: &mut SeedStream,
    ) -> Result<GeneratedCustomer, PopulateError> {
        self.generate(index, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_batch() {
        let mut customer_gen = CustomerGenerator::new();
        let mut rng = SeedStream::new(42);

        let customers = customer_gen.generate_batch(2000, &mut rng).unwrap();

        assert_eq!(customers.len(), 2000);
        assert_eq!(customers[0].email, "customer1@example.com");
        assert_eq!(customers[0].name, "Customer_1");

        let emails: HashSet<_> = customers.iter().map(|c| c.email.as_str()).collect();
        assert_eq!(emails.len(), 2000);

        for customer in &customers {
            assert!(customer.signup_date >= date!(2010 - 01 - 01));
            assert!(customer.signup_date <= date!(2023 - 09 - 10));
        }
    }

    #[test]
    fn test_exhaustion_aborts() {
        let mut resolver = EmailResolver::with_max_attempts(1);
        resolver.reserve("customer1@example.com");
        let mut customer_gen =
            CustomerGenerator::with_resolver(CustomerGenConfig::default(), resolver);
        let mut rng = SeedStream::new(42);

        let result = customer_gen.generate_batch(5, &mut rng);
        assert!(matches!(
            result,
            Err(PopulateError::UniquenessExhausted {
                sequence: 1,
                attempts: 1
            })
        ));
    }
}
