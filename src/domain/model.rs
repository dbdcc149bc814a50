use crate::core::pricing;
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

macro_rules! numeric_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

numeric_id!(UserId);
numeric_id!(PetId);
numeric_id!(PlanId);
numeric_id!(AddOnId);

/// Opaque identifier handed back by the storefront for a created subscription.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    /// Returns `None` for blank identifiers.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.trim().is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// The storefront issues serial ids; accept either a JSON number or a string.
impl<'de> Deserialize<'de> for SubscriptionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(i64),
        }

        let text = match RawId::deserialize(deserializer)? {
            RawId::Text(text) => text,
            RawId::Number(number) => number.to_string(),
        };
        Self::new(text).ok_or_else(|| de::Error::custom("subscription id cannot be blank"))
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The signed-in user the workflow acts for. Injected at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub display_name: Option<String>,
}

impl Session {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            display_name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    pub id: PetId,
    pub user_id: UserId,
    pub name: String,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(default)]
    pub breed: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: PlanId,
    pub name: String,
    /// Minor currency units (halalas, cents).
    pub monthly_price: u64,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOn {
    pub id: AddOnId,
    pub name: String,
    /// Minor currency units.
    pub price: u64,
    #[serde(default)]
    pub description: Option<String>,
}

/// Add-on as captured at submission time; later catalog changes do not reach it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddOnLine {
    pub id: AddOnId,
    pub name: String,
    pub price: u64,
}

impl From<&AddOn> for AddOnLine {
    fn from(add_on: &AddOn) -> Self {
        Self {
            id: add_on.id,
            name: add_on.name.clone(),
            price: add_on.price,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Paused,
    Cancelled,
}

/// Write-once snapshot of a completed selection, sent to `POST /api/subscriptions`.
///
/// Fields are private so the only way to obtain one is through the selection
/// machine, which enforces that pet and plan are set and that the total matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionRequest {
    user_id: UserId,
    pet_id: PetId,
    plan_id: PlanId,
    status: SubscriptionStatus,
    start_date: DateTime<Utc>,
    add_ons: Vec<AddOnLine>,
    total_price: u64,
}

impl SubscriptionRequest {
    pub(crate) fn capture(
        user_id: UserId,
        pet: &Pet,
        plan: &Plan,
        add_ons: &[AddOn],
        start_date: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            pet_id: pet.id,
            plan_id: plan.id,
            status: SubscriptionStatus::Active,
            start_date,
            add_ons: add_ons.iter().map(AddOnLine::from).collect(),
            total_price: pricing::price(Some(plan), add_ons),
        }
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn pet_id(&self) -> PetId {
        self.pet_id
    }

    pub fn plan_id(&self) -> PlanId {
        self.plan_id
    }

    pub fn status(&self) -> SubscriptionStatus {
        self.status
    }

    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    pub fn add_ons(&self) -> &[AddOnLine] {
        &self.add_ons
    }

    pub fn total_price(&self) -> u64 {
        self.total_price
    }
}

/// An existing subscription as listed on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscription {
    pub id: SubscriptionId,
    pub pet_id: PetId,
    pub plan_id: PlanId,
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub add_ons: Vec<AddOnLine>,
    pub total_price: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscription_id_rejects_blank() {
        assert!(SubscriptionId::new("").is_none());
        assert!(SubscriptionId::new("   ").is_none());
        assert_eq!(SubscriptionId::new("42").unwrap().as_str(), "42");
    }

    #[test]
    fn test_subscription_id_accepts_number_or_string() {
        let from_number: SubscriptionId = serde_json::from_str("17").unwrap();
        let from_text: SubscriptionId = serde_json::from_str("\"sub_17\"").unwrap();
        assert_eq!(from_number.as_str(), "17");
        assert_eq!(from_text.as_str(), "sub_17");
        assert!(serde_json::from_str::<SubscriptionId>("\"\"").is_err());
    }

    #[test]
    fn test_request_serializes_with_storefront_field_names() {
        let pet = Pet {
            id: PetId(3),
            user_id: UserId(7),
            name: "Mishmish".to_string(),
            species: Some("cat".to_string()),
            breed: None,
        };
        let plan = Plan {
            id: PlanId(2),
            name: "Premium".to_string(),
            monthly_price: 28000,
            features: vec![],
        };
        let treats = AddOn {
            id: AddOnId(1),
            name: "Treats".to_string(),
            price: 1500,
            description: None,
        };
        let start = DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let request = SubscriptionRequest::capture(UserId(7), &pet, &plan, &[treats], start);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["userId"], 7);
        assert_eq!(json["petId"], 3);
        assert_eq!(json["planId"], 2);
        assert_eq!(json["status"], "active");
        assert_eq!(json["addOns"][0]["name"], "Treats");
        assert_eq!(json["totalPrice"], 29500);
    }

    #[test]
    fn test_pet_tolerates_missing_optional_attributes() {
        let pet: Pet = serde_json::from_value(serde_json::json!({
            "id": 1, "userId": 9, "name": "Luna"
        }))
        .unwrap();
        assert_eq!(pet.name, "Luna");
        assert!(pet.breed.is_none());
    }
}
