/// Formats an amount in minor currency units, e.g. `31500` -> `"315.00 SAR"`.
pub fn format_minor_units(amount: u64, currency: &str) -> String {
    format!("{}.{:02} {}", amount / 100, amount % 100, currency)
}

/// Same as [`format_minor_units`] with a `/month` suffix for recurring prices.
pub fn format_monthly(amount: u64, currency: &str) -> String {
    format!("{}/month", format_minor_units(amount, currency))
}
