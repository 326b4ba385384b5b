//! Service categories.
//!
//! The bookable catalog: companion services billed hourly and errand services
//! billed at a flat rate. The selected category is encoded into a trip's
//! free-text special requests, so it can be recovered when re-deriving
//! pricing later.

use rust_decimal::Decimal;

/// Prefix used to encode the selected category into special requests.
const SERVICE_PREFIX: &str = "Service: ";

/// A bookable service category and its pricing metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceCategory {
    id: &'static str,
    name: &'static str,
    deposit_dollars: u32,
    is_hourly: bool,
}

impl ServiceCategory {
    const fn new(
        id: &'static str,
        name: &'static str,
        deposit_dollars: u32,
        is_hourly: bool,
    ) -> Self {
        Self {
            id,
            name,
            deposit_dollars,
            is_hourly,
        }
    }

    /// Stable identifier of the category.
    pub fn id(&self) -> &'static str {
        self.id
    }

    /// Customer-facing name of the category.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Upfront deposit charged for this category, in dollars.
    pub fn deposit(&self) -> Decimal {
        Decimal::from(self.deposit_dollars)
    }

    /// Whether the service fee is billed per hour rather than flat.
    pub fn is_hourly(&self) -> bool {
        self.is_hourly
    }

    /// Renders the free-text special requests for a booking of this category.
    ///
    /// Matches the shape written at booking time: the service name, optional
    /// customer notes, and the estimated hours for hourly categories.
    pub fn special_requests(
        &self,
        notes: Option<&str>,
        estimated_hours: Option<Decimal>,
    ) -> String {
        let mut text = format!("{SERVICE_PREFIX}{}", self.name);

        if let Some(notes) = notes.filter(|n| !n.trim().is_empty()) {
            text.push_str("\nNotes: ");
            text.push_str(notes);
        }

        if self.is_hourly {
            if let Some(hours) = estimated_hours {
                text.push_str(&format!("\nEstimated hours: {hours}"));
            }
        }

        text
    }
}

/// All bookable service categories.
pub const CATALOG: [ServiceCategory; 7] = [
    ServiceCategory::new("party", "Companion to a Party", 20, true),
    ServiceCategory::new("hospital", "Companion to Hospital", 20, true),
    ServiceCategory::new("meeting", "Companion to Meeting", 20, true),
    ServiceCategory::new("general", "Companion (general)", 20, true),
    ServiceCategory::new("shopping-with", "Companion to Go Shopping With", 20, true),
    ServiceCategory::new("shopping-for", "Shopping for Them", 10, false),
    ServiceCategory::new("pickup", "Pick Up an Item for Them", 10, false),
];

/// Looks a category up by its stable identifier.
pub fn find_category(id: &str) -> Option<&'static ServiceCategory> {
    CATALOG.iter().find(|category| category.id == id)
}

/// Recovers the booked category from a trip's free-text special requests.
///
/// Returns `None` if the text does not start with a known service line.
pub fn category_from_special_requests(special_requests: &str) -> Option<&'static ServiceCategory> {
    let first_line = special_requests.lines().next()?;
    let name = first_line.strip_prefix(SERVICE_PREFIX)?;

    CATALOG.iter().find(|category| category.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_hourly_and_flat_categories() {
        assert!(CATALOG.iter().any(ServiceCategory::is_hourly));
        assert!(CATALOG.iter().any(|category| !category.is_hourly()));
    }

    #[test]
    fn find_category_by_id() {
        let category = find_category("hospital");

        assert_eq!(category.map(ServiceCategory::name), Some("Companion to Hospital"));
    }

    #[test]
    fn hourly_categories_charge_twenty_dollar_deposit() {
        for category in CATALOG.iter().filter(|c| c.is_hourly()) {
            assert_eq!(category.deposit(), Decimal::from(20), "category {}", category.id());
        }
    }

    #[test]
    fn flat_categories_charge_ten_dollar_deposit() {
        for category in CATALOG.iter().filter(|c| !c.is_hourly()) {
            assert_eq!(category.deposit(), Decimal::from(10), "category {}", category.id());
        }
    }

    #[test]
    fn special_requests_round_trips_through_parser() {
        let category = ServiceCategory::new("party", "Companion to a Party", 20, true);
        let text = category.special_requests(Some("Black tie event"), Some(Decimal::from(3)));

        assert_eq!(
            text,
            "Service: Companion to a Party\nNotes: Black tie event\nEstimated hours: 3"
        );
        assert_eq!(category_from_special_requests(&text).map(ServiceCategory::id), Some("party"));
    }

    #[test]
    fn special_requests_without_notes_or_hours() {
        let category = ServiceCategory::new("pickup", "Pick Up an Item for Them", 10, false);

        let text = category.special_requests(None, None);

        assert_eq!(text, "Service: Pick Up an Item for Them");
    }

    #[test]
    fn unknown_special_requests_parse_to_none() {
        assert_eq!(category_from_special_requests("please hurry"), None);
    }
}
