//! Setup errors
//!
//! Everything here is raised while registering spells or finalizing the
//! simulation. Once setup succeeds the calc/deal pipeline is total and
//! never returns an error.

use crate::types::{ActionId, UnitIndex};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SetupError {
    #[error("Unknown proc mask on {action}")]
    UnknownProcMask { action: ActionId },

    #[error("Cost set for spell {action} but no resource type")]
    CostWithoutResource { action: ActionId },

    #[error("Resource type set for spell {action} but no cost")]
    ResourceWithoutCost { action: ActionId },

    #[error(
        "Over {limit} registered spells on {unit} when registering {action}; \
         a spell is probably being registered every iteration"
    )]
    TooManySpells {
        unit: UnitIndex,
        action: ActionId,
        limit: usize,
    },

    #[error("{action} has non-default {field} during finalize")]
    NonDefaultAtFinalize {
        action: ActionId,
        field: &'static str,
    },

    #[error("No unit at {0}")]
    UnknownUnit(UnitIndex),
}
