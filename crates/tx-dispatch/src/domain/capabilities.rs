//! Dispatcher capability check.

use super::entities::Account;
use super::value_objects::Capabilities;

/// Derive what the active account may use from its permission flags.
///
/// The managed relay needs both an enabled profile manager and protocol
/// sponsorship; broadcasting a signed payload needs sponsorship only. No
/// account means no capabilities.
pub fn check_capabilities(account: Option<&Account>) -> Capabilities {
    match account {
        Some(account) => {
            let permissions = account.permissions;
            Capabilities {
                can_use_managed_relay: permissions.signless && permissions.sponsor,
                can_broadcast_meta_transaction: permissions.sponsor,
            }
        }
        None => Capabilities::default(),
    }
}
