//! Fit model implementations.
//!
//! Each model is a small, pure function of `(x, params)` plus a deterministic
//! guess heuristic, so the fitting code can stay generic over [`FitModel`].

pub mod cosine;
pub mod exp_decay;
pub mod gaussian;
pub mod linear;
pub mod model;

use std::sync::Arc;

use crate::domain::ModelKind;

pub use cosine::CosineModel;
pub use exp_decay::ExpDecayModel;
pub use gaussian::GaussianModel;
pub use linear::LinearModel;
pub use model::*;

/// Instantiate the bundled model for `kind`.
pub fn build_model(kind: ModelKind) -> Arc<dyn FitModel> {
    match kind {
        ModelKind::Cosine => Arc::new(CosineModel),
        ModelKind::Linear => Arc::new(LinearModel),
        ModelKind::ExpDecay => Arc::new(ExpDecayModel),
        ModelKind::Gaussian => Arc::new(GaussianModel),
    }
}
