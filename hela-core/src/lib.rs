//! hela-core: Core types and utilities for the Hela finance tracker

pub mod budget;
pub mod error;
pub mod finance;
pub mod goals;
pub mod income;
pub mod summary;
pub mod time;

pub use budget::{Budget, BudgetPeriod, BudgetStatus};
pub use error::ValidationError;
pub use finance::{
    Category, MAX_AMOUNT, NewTransaction, PaymentChannel, TransactionPatch, TransactionRecord, check_magnitude,
};
pub use goals::SavingsGoal;
pub use income::{Frequency, IncomeStream, projected_monthly_income};
pub use summary::{CategoryTotal, MonthlyTotals, Summary};

/// Utility for categorizing transaction descriptions
pub mod categorizer {
    use super::Category;

    /// Suggest a category for a description using keyword rules.
    /// First matching rule wins; `Other` when nothing matches.
    pub fn categorize(description: &str) -> Category {
        let desc = description.to_lowercase();

        // Airtime / bundles (before utilities: "safaricom" shows up in both)
        if desc.contains("airtime")
            || desc.contains("bundles")
            || desc.contains("data bundle") {
            return Category::Airtime;
        }

        // Utilities
        if desc.contains("kplc")
            || desc.contains("prepaid")
            || desc.contains("token")
            || desc.contains("water")
            || desc.contains("zuku")
            || desc.contains("safaricom home")
            || desc.contains("dstv")
            || desc.contains("gotv") {
            return Category::Utilities;
        }

        // Rent / housing
        if desc.contains("rent")
            || desc.contains("landlord")
            || desc.contains("apartment")
            || desc.contains("housing") {
            return Category::Housing;
        }

        // Transport
        if desc.contains("uber")
            || desc.contains("bolt")
            || desc.contains("little cab")
            || desc.contains("matatu")
            || desc.contains("fuel")
            || desc.contains("petrol")
            || desc.contains("shell")
            || desc.contains("total energies")
            || desc.contains("rubis")
            || desc.contains("sgr") {
            return Category::Transport;
        }

        // Food
        if desc.contains("naivas")
            || desc.contains("quickmart")
            || desc.contains("carrefour")
            || desc.contains("supermarket")
            || desc.contains("butchery")
            || desc.contains("restaurant")
            || desc.contains("hotel")
            || desc.contains("cafe")
            || desc.contains("java house")
            || desc.contains("kfc")
            || desc.contains("food") {
            return Category::Food;
        }

        // Health
        if desc.contains("pharmacy")
            || desc.contains("chemist")
            || desc.contains("hospital")
            || desc.contains("clinic")
            || desc.contains("nhif") {
            return Category::Health;
        }

        // Education
        if desc.contains("school")
            || desc.contains("fees")
            || desc.contains("university")
            || desc.contains("college")
            || desc.contains("helb") {
            return Category::Education;
        }

        // Entertainment
        if desc.contains("netflix")
            || desc.contains("showmax")
            || desc.contains("spotify")
            || desc.contains("cinema")
            || desc.contains("betting")
            || desc.contains("sportpesa") {
            return Category::Entertainment;
        }

        // Savings
        if desc.contains("m-shwari")
            || desc.contains("mshwari")
            || desc.contains("lock savings")
            || desc.contains("sacco")
            || desc.contains("savings") {
            return Category::Savings;
        }

        // Salary
        if desc.contains("salary")
            || desc.contains("payroll")
            || desc.contains("stipend") {
            return Category::Salary;
        }

        // Shopping
        if desc.contains("jumia")
            || desc.contains("kilimall")
            || desc.contains("shop")
            || desc.contains("store") {
            return Category::Shopping;
        }

        Category::Other
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_categorize_utilities() {
            assert_eq!(categorize("Pay bill: KPLC PREPAID (account 54410022)"), Category::Utilities);
        }

        #[test]
        fn test_categorize_airtime_before_utilities() {
            assert_eq!(categorize("Safaricom airtime purchase"), Category::Airtime);
        }

        #[test]
        fn test_categorize_food() {
            assert_eq!(categorize("Paid to NAIVAS WESTLANDS"), Category::Food);
        }

        #[test]
        fn test_categorize_transport() {
            assert_eq!(categorize("Paid to RUBIS KILIMANI"), Category::Transport);
        }

        #[test]
        fn test_categorize_salary() {
            assert_eq!(categorize("Received from ACME LTD salary"), Category::Salary);
        }

        #[test]
        fn test_categorize_fallback() {
            assert_eq!(categorize("Sent to JOHN DOE"), Category::Other);
        }
    }
}

pub use categorizer::categorize;
