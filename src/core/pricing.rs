use crate::domain::model::{AddOn, Plan};

/// Largest plan or add-on price the catalog may carry, in minor units.
///
/// Any realistic selection of prices within this bound sums without overflow.
pub const MAX_CATALOG_PRICE: u64 = u32::MAX as u64;

/// Monthly total in minor currency units: plan price plus every add-on.
///
/// Without a plan there is nothing to price and the total is 0, whatever add-ons
/// are held. A total that does not fit in `u64` saturates at `u64::MAX`.
pub fn price(plan: Option<&Plan>, add_ons: &[AddOn]) -> u64 {
    checked_price(plan, add_ons).unwrap_or(u64::MAX)
}

/// Same as [`price`], but `None` when the total overflows.
pub fn checked_price(plan: Option<&Plan>, add_ons: &[AddOn]) -> Option<u64> {
    match plan {
        Some(plan) => add_ons
            .iter()
            .try_fold(plan.monthly_price, |total, add_on| total.checked_add(add_on.price)),
        None => Some(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{AddOnId, PlanId};

    fn plan(monthly_price: u64) -> Plan {
        Plan {
            id: PlanId(1),
            name: "Premium".to_string(),
            monthly_price,
            features: vec!["Monthly delivery".to_string()],
        }
    }

    fn add_on(id: i64, price: u64) -> AddOn {
        AddOn {
            id: AddOnId(id),
            name: format!("Add-on {}", id),
            price,
            description: None,
        }
    }

    #[test]
    fn test_premium_with_treats_and_toys() {
        let add_ons = vec![add_on(1, 1500), add_on(2, 2000)];
        assert_eq!(price(Some(&plan(28000)), &add_ons), 31500);
    }

    #[test]
    fn test_no_plan_prices_at_zero() {
        assert_eq!(price(None, &[]), 0);
        assert_eq!(price(None, &[add_on(1, 1500)]), 0);
    }

    #[test]
    fn test_price_is_plan_plus_sum_of_add_ons() {
        let catalog: Vec<AddOn> = (1..=6).map(|i| add_on(i, (i as u64) * 750)).collect();
        for monthly in [0, 21000, 28000, 35000] {
            for take in 0..=catalog.len() {
                let selected = &catalog[..take];
                let expected = monthly + selected.iter().map(|a| a.price).sum::<u64>();
                assert_eq!(price(Some(&plan(monthly)), selected), expected);
            }
        }
    }

    #[test]
    fn test_overflowing_total_saturates_instead_of_panicking() {
        let huge = plan(u64::MAX);
        let add_ons = vec![add_on(1, 1)];

        assert_eq!(checked_price(Some(&huge), &add_ons), None);
        assert_eq!(price(Some(&huge), &add_ons), u64::MAX);
        assert_eq!(checked_price(Some(&plan(28000)), &add_ons), Some(28001));
    }

    #[test]
    fn test_add_on_order_does_not_change_price() {
        let forward = vec![add_on(1, 1500), add_on(2, 2000), add_on(3, 999)];
        let mut reversed = forward.clone();
        reversed.reverse();
        assert_eq!(
            price(Some(&plan(21000)), &forward),
            price(Some(&plan(21000)), &reversed)
        );
    }
}
