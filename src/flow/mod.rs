//! Data Flow Control
//!
//! Decides which controller owns a transfer process and, through it, which
//! data plane moves the bytes.
//!
//! # Flow
//!
//! ```text
//! TransferProcess → DataFlowManager.dispatch ─(first can_handle)→ controller
//!   initiate:   selector.select(src, dst) → factory.create_client → transfer
//!   terminate:  selector.get_all() → terminate on each → merge
//! ```

pub mod callback;
pub mod controller;
pub mod manager;
pub mod push;


pub use callback::{ControlApiUrl, StaticControlApiUrl};
pub use controller::DataFlowController;
pub use manager::DataFlowManager;
pub use push::PushDataFlowController;
