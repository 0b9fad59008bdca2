//! Write operations and the unit of work handed to the store.

mod unit_of_work;
mod write_op;

pub use unit_of_work::UnitOfWork;
pub use write_op::{WriteAction, WriteKind, WriteOp};
