use crate::core::selection::Selection;
use crate::utils::money::{format_minor_units, format_monthly};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub name: String,
    pub price: u64,
}

/// What the review panel shows next to the confirm button.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionSummary {
    pub pet_name: Option<String>,
    pub plan_name: Option<String>,
    pub base_price: u64,
    pub add_ons: Vec<SummaryLine>,
    pub total_price: u64,
}

impl SelectionSummary {
    pub fn from_selection(selection: &Selection) -> Self {
        Self {
            pet_name: selection.pet().map(|pet| pet.name.clone()),
            plan_name: selection.plan().map(|plan| plan.name.clone()),
            base_price: selection.plan().map_or(0, |plan| plan.monthly_price),
            add_ons: selection
                .add_ons()
                .iter()
                .map(|add_on| SummaryLine {
                    name: add_on.name.clone(),
                    price: add_on.price,
                })
                .collect(),
            total_price: selection.total_price(),
        }
    }

    pub fn render(&self, currency: &str) -> String {
        let mut lines = vec![
            format!("Pet: {}", self.pet_name.as_deref().unwrap_or("-")),
            format!("Plan: {}", self.plan_name.as_deref().unwrap_or("-")),
            format!("Base price: {}", format_monthly(self.base_price, currency)),
        ];
        if !self.add_ons.is_empty() {
            lines.push("Add-ons:".to_string());
            for line in &self.add_ons {
                lines.push(format!("  {}: {}", line.name, format_monthly(line.price, currency)));
            }
        }
        lines.push(format!(
            "Total monthly price: {}",
            format_minor_units(self.total_price, currency)
        ));
        lines.join("\n")
    }
}
