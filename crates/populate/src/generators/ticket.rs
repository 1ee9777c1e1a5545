//! Support ticket generation.

use time::macros::datetime;
use time::{Duration, PrimitiveDateTime};

use super::{RowGenerator, require_pool};
use crate::error::PopulateError;
use crate::rng::SeedStream;

/// Ticket status matching the `status` column values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TicketStatus {
    Open,
    Closed,
    Pending,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 3] = [
        TicketStatus::Open,
        TicketStatus::Closed,
        TicketStatus::Pending,
    ];

    /// Returns the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::Closed => "closed",
            TicketStatus::Pending => "pending",
        }
    }
}

/// Generated support ticket ready for database insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSupportTicket {
    pub customer_id: i64,
    pub created_at: PrimitiveDateTime,
    pub resolved_at: Option<PrimitiveDateTime>,
    pub status: TicketStatus,
    pub subject: String,
    pub description: String,
}

/// Configuration for ticket generation.
#[derive(Debug, Clone)]
pub struct TicketGenConfig {
    pub window_start: PrimitiveDateTime,
    pub window_days: i64,
    /// Probability that a ticket has a resolution time.
    pub resolved_probability: f64,
    /// Maximum whole days between creation and resolution.
    pub max_resolution_days: i64,
}

impl Default for TicketGenConfig {
    fn default() -> Self {
        Self {
            window_start: datetime!(2016-01-01 0:00),
            window_days: 2000,
            resolved_probability: 0.8,
            max_resolution_days: 30,
        }
    }
}

/// Generates support tickets opened by persisted customers.
pub struct SupportTicketGenerator<'a> {
    config: TicketGenConfig,
    customer_ids: &'a [i64],
}

impl<'a> SupportTicketGenerator<'a> {
    pub fn new(customer_ids: &'a [i64]) -> Result<Self, PopulateError> {
        Self::with_config(TicketGenConfig::default(), customer_ids)
    }

    pub fn with_config(
        config: TicketGenConfig,
        customer_ids: &'a [i64],
    ) -> Result<Self, PopulateError> {
        require_pool(customer_ids, "support tickets", "customers")?;
        Ok(Self {
            config,
            customer_ids,
        })
    }

    /// Generates one ticket. A resolution time, when present, is never
    /// earlier than the creation time.
    pub fn generate(&self, rng: &mut SeedStream) -> GeneratedSupportTicket {
        let customer_id = self.customer_ids[rng.index(self.customer_ids.len())];
        let created_at = rng.moment_after(self.config.window_start, self.config.window_days);
        let resolved_at = if rng.chance(self.config.resolved_probability) {
            let days = rng.int_in(0..=self.config.max_resolution_days);
            Some(created_at.saturating_add(Duration::days(days)))
        } else {
            None
        };
        let status = TicketStatus::ALL[rng.index(TicketStatus::ALL.len())];
        let subject = format!("Issue {}", rng.alphanumeric(10));
        let description = format!("Description {}", rng.alphanumeric(50));

        GeneratedSupportTicket {
            customer_id,
            created_at,
            resolved_at,
            status,
            subject,
            description,
        }
    }

    pub fn generate_batch(
        &self,
        count: usize,
        rng: &mut SeedStream,
    ) -> Vec<GeneratedSupportTicket> {
        (0..count).map(|_| self.generate(rng)).collect()
    }
}

impl RowGenerator for SupportTicketGenerator<'_> {
    type Row = GeneratedSupportTicket;

    fn generate_row(
        &mut self,
        _index: usize,
        rng: &mut SeedStream,
    ) -> Result<GeneratedSupportTicket, PopulateError> {
        Ok(self.generate(rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_never_precedes_creation() {
        let customers = [7_i64, 8, 9];
        let ticket_gen = SupportTicketGenerator::new(&customers).unwrap();
        let mut rng = SeedStream::new(42);

        let tickets = ticket_gen.generate_batch(2_000, &mut rng);
        let resolved = tickets.iter().filter(|t| t.resolved_at.is_some()).count();

        for ticket in &tickets {
            assert!(customers.contains(&ticket.customer_id));
            if let Some(resolved_at) = ticket.resolved_at {
                assert!(resolved_at >= ticket.created_at);
                assert!(resolved_at - ticket.created_at <= Duration::days(30));
            }
            assert!(ticket.subject.starts_with("Issue "));
            assert_eq!(ticket.subject.len(), "Issue ".len() + 10);
            assert_eq!(ticket.description.len(), "Description ".len() + 50);
        }

        // Roughly 80% resolved; allow generous variance
        assert!(
            (1_400..=1_800).contains(&resolved),
            "Expected ~80% resolved, got {resolved}/2000"
        );
    }

    #[test]
    fn test_status_values() {
        let names: Vec<_> = TicketStatus::ALL.iter().map(TicketStatus::as_str).collect();
        assert_eq!(names, vec!["open", "closed", "pending"]);
    }

    #[test]
    fn test_empty_customers_fail_fast() {
        assert!(matches!(
            SupportTicketGenerator::new(&[]),
            Err(PopulateError::EmptyParentPool { .. })
        ));
    }
}
