use crate::core::selection::Step;
use crate::domain::model::Pet;
use url::form_urlencoded;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardTab {
    Profile,
    Subscription,
}

impl DashboardTab {
    /// `newSubscription=true` in the dashboard query focuses the subscription tab.
    pub fn from_query(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let focus_subscription = form_urlencoded::parse(query.as_bytes())
            .any(|(key, value)| key == "newSubscription" && value == "true");
        if focus_subscription {
            Self::Subscription
        } else {
            Self::Profile
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    PetProfile,
    Subscription,
    Dashboard(DashboardTab),
}

impl Destination {
    pub fn path(&self) -> &'static str {
        match self {
            Self::PetProfile => "/pet-profile",
            Self::Subscription => "/subscription",
            Self::Dashboard(DashboardTab::Profile) => "/dashboard",
            Self::Dashboard(DashboardTab::Subscription) => "/dashboard?newSubscription=true",
        }
    }
}

/// Users need a pet profile before they can subscribe.
pub fn entry_destination(pets: &[Pet]) -> Destination {
    if pets.is_empty() {
        Destination::PetProfile
    } else {
        Destination::Subscription
    }
}

/// Where the caller should go once the workflow reaches `step`, if anywhere.
pub fn after_step(step: Step) -> Option<Destination> {
    step.is_terminal().then_some(Destination::Dashboard(DashboardTab::Subscription))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{PetId, UserId};

    #[test]
    fn test_entry_requires_pet_profile() {
        assert_eq!(entry_destination(&[]), Destination::PetProfile);

        let pet = Pet {
            id: PetId(1),
            user_id: UserId(7),
            name: "Luna".to_string(),
            species: None,
            breed: None,
        };
        assert_eq!(entry_destination(&[pet]), Destination::Subscription);
    }

    #[test]
    fn test_success_lands_on_subscription_tab() {
        let destination = after_step(Step::Succeeded).unwrap();
        assert_eq!(destination.path(), "/dashboard?newSubscription=true");
        for step in [Step::PlanAndPet, Step::AddOns, Step::Submitting, Step::Failed] {
            assert_eq!(after_step(step), None);
        }

        let query = destination.path().split_once('?').map(|(_, q)| q).unwrap();
        assert_eq!(DashboardTab::from_query(query), DashboardTab::Subscription);
    }

    #[test]
    fn test_dashboard_tab_defaults_to_profile() {
        assert_eq!(DashboardTab::from_query(""), DashboardTab::Profile);
        assert_eq!(DashboardTab::from_query("?newSubscription=false"), DashboardTab::Profile);
        assert_eq!(DashboardTab::from_query("?tab=x&newSubscription=true"), DashboardTab::Subscription);
    }
}
