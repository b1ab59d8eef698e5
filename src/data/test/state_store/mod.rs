use crate::data::state_store::StateStore;
use test_utils::{builder::TestBuilder, error::TestError, fixture};

mod load;
mod reconcile;
mod save;
