//! Data source implementations

pub mod automation;
pub mod behavior;
pub mod group;
pub mod remote_server;
pub mod sync;
pub mod user;

pub use automation::AutomationDataSource;
pub use behavior::BehaviorDataSource;
pub use group::GroupDataSource;
pub use remote_server::RemoteServerDataSource;
pub use sync::SyncDataSource;
pub use user::UserDataSource;
