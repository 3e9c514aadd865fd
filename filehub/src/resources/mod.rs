//! Resource implementations

pub mod as2_partner;
pub mod as2_station;
pub mod automation;
pub mod behavior;
pub mod group;
pub mod group_user;
pub mod remote_server;
pub mod share_group;
pub mod sync;
pub mod user;

pub use as2_partner::As2PartnerResource;
pub use as2_station::As2StationResource;
pub use automation::AutomationResource;
pub use behavior::BehaviorResource;
pub use group::GroupResource;
pub use group_user::GroupUserResource;
pub use remote_server::RemoteServerResource;
pub use share_group::ShareGroupResource;
pub use sync::SyncResource;
pub use user::UserResource;

use tfkit::types::{AttributePath, Dynamic, DynamicValue};

/// Read a list-of-number attribute as identifiers, if present.
pub(crate) fn ids_from_list(value: &DynamicValue, path: &AttributePath) -> Option<Vec<i64>> {
    let items = value.get_list(path).ok()?;
    let mut ids = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Dynamic::Number(n) => ids.push(n as i64),
            _ => return None,
        }
    }
    Some(ids)
}

/// Render identifiers as a list-of-number attribute value.
pub(crate) fn ids_to_dynamic(ids: &[i64]) -> Dynamic {
    Dynamic::List(ids.iter().map(|id| Dynamic::Number(*id as f64)).collect())
}
