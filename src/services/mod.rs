//! # Services
//!
//! Transactional entity resolution, link registration and the read-side
//! roster and recipient queries built on the repositories.

pub mod classroom;
pub mod entity_resolver;
pub mod link_registrar;
pub mod mentions;
pub mod recipients;
pub mod roster;
pub mod unit_of_work;

pub use classroom::ClassroomService;
pub use entity_resolver::{EntityResolver, Resolved};
pub use link_registrar::{LinkRegistrar, Registration};
pub use recipients::RecipientResolver;
pub use roster::RosterQuery;
pub use unit_of_work::{TxScope, UnitOfWork};
