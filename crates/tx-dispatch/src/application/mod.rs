//! # Application Layer
//!
//! Dispatcher, per-kind protocols, session and the network guard.

pub mod actions;
pub mod dispatcher;
pub mod network_guard;
pub mod protocols;
pub mod session;

pub use actions::SocialActions;
pub use dispatcher::{DispatchAttempt, DispatchPorts, DispatchReport, TransactionDispatcher};
pub use network_guard::WrongNetworkGuard;
pub use protocols::{
    ActionProtocol, FollowProtocol, LinkHandleProtocol, PublicationProtocol, UnfollowProtocol,
};
pub use session::DispatchSession;
