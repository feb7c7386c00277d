mod filter;
mod model;
mod objective;

pub use filter::{filter_mask, Filter, FilterOp};
pub use model::{
    apply_model, GridDistanceModel, GridTown, HouseholdModel, HouseholdTown, Model, ModelKind,
    ModelResult, Pars, TestModel, TestTown, PROFIT_COLUMN,
};
pub use objective::{apply_objective, objective, ObjectiveInputs, ObjectiveWeights};
