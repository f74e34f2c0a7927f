/// ==============================================================================================
/// ======================================= Restart Setup ===========================================
/// ==============================================================================================
///
/// The only setup that samples by cell index rather than coordinate,
/// per spec.md §4.8: "the driver constructs a restart setup that
/// sources cells by index". Backed directly by a loaded
/// `CheckpointRecord`.

use crate::constants::{TIdx, TReal};
use crate::io::checkpoint::CheckpointRecord;

pub struct RestartSetup {
    record: CheckpointRecord,
}

impl RestartSetup {
    pub fn new(record: CheckpointRecord) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &CheckpointRecord {
        &self.record
    }

    pub fn into_record(self) -> CheckpointRecord {
        self.record
    }

    fn index(&self, ix: TIdx, iy: TIdx) -> usize {
        iy * self.record.nx + ix
    }

    pub fn height_at(&self, ix: TIdx, iy: TIdx) -> TReal {
        self.record.h[self.index(ix, iy)]
    }

    pub fn momentum_x_at(&self, ix: TIdx, iy: TIdx) -> TReal {
        self.record.hu[self.index(ix, iy)]
    }

    pub fn momentum_y_at(&self, ix: TIdx, iy: TIdx) -> TReal {
        self.record.hv[self.index(ix, iy)]
    }

    pub fn bathymetry_at(&self, ix: TIdx, iy: TIdx) -> TReal {
        self.record.b[self.index(ix, iy)]
    }
}
