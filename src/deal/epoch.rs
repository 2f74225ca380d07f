// Copyright 2019-2026 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use super::errors::DealError;
use crate::shim::clock::{ChainEpoch, EPOCHS_IN_DAY};

/// Default deal duration, 180 days.
pub const DEFAULT_DEAL_DURATION: ChainEpoch = 180 * EPOCHS_IN_DAY;
/// Offset from the chain head used when no start epoch is given, 2 days.
pub const DEFAULT_START_EPOCH_OFFSET: ChainEpoch = 2 * EPOCHS_IN_DAY;

/// How the caller asked for the deal start epoch to be chosen. Zero means
/// unset, as on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StartEpochSpec {
    pub head_offset: ChainEpoch,
    pub explicit_start: ChainEpoch,
}

impl StartEpochSpec {
    /// Rejects requests that set both the head offset and the explicit start.
    /// Needs no chain access so it can run before any query.
    pub fn check(&self) -> Result<(), DealError> {
        if self.head_offset > 0 && self.explicit_start > 0 {
            return Err(DealError::ConflictingStartEpoch);
        }
        Ok(())
    }

    /// Whether resolving the start epoch needs the current chain head.
    pub fn needs_head(&self) -> bool {
        self.explicit_start <= 0 || self.head_offset > 0
    }

    pub fn resolve_start(&self, head: ChainEpoch) -> Result<ChainEpoch, DealError> {
        self.check()?;
        if self.head_offset > 0 {
            add_epochs(head, self.head_offset)
        } else if self.explicit_start > 0 {
            Ok(self.explicit_start)
        } else {
            add_epochs(head, DEFAULT_START_EPOCH_OFFSET)
        }
    }
}

fn add_epochs(base: ChainEpoch, offset: ChainEpoch) -> Result<ChainEpoch, DealError> {
    base.checked_add(offset)
        .ok_or(DealError::EpochOverflow { base, offset })
}

/// Start and end epoch of a deal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DealEpochs {
    pub start: ChainEpoch,
    pub end: ChainEpoch,
}

pub fn resolve_epochs(
    spec: StartEpochSpec,
    duration: ChainEpoch,
    head: ChainEpoch,
) -> Result<DealEpochs, DealError> {
    if duration <= 0 {
        return Err(DealError::InvalidDuration(duration));
    }
    let start = spec.resolve_start(head)?;
    Ok(DealEpochs {
        start,
        end: add_epochs(start, duration)?,
    })
}
