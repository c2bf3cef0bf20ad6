//! Outbound transfer interface to the external currency ledger.
//!
//! # Invariants
//! - Transfers are handed to a sink only after the originating operation
//!   committed; aborted operations never reach the sink.

use crate::model::account::AccountName;
use crate::model::quantity::Quantity;
use log::info;
use std::cell::RefCell;
use std::rc::Rc;

/// One outbound `transfer(from, to, quantity, memo)` action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    pub from: AccountName,
    pub to: AccountName,
    pub quantity: Quantity,
    pub memo: String,
}

/// Fire-and-forget delivery of transfers to the ledger.
pub trait TransferSink {
    fn send_transfer(&mut self, transfer: &Transfer);
}

/// Sink that only logs each transfer.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogTransferSink;

impl TransferSink for LogTransferSink {
    fn send_transfer(&mut self, transfer: &Transfer) {
        info!(
            "event=transfer_sent module=ledger status=ok from={} to={} amount={}",
            transfer.from, transfer.to, transfer.quantity
        );
    }
}

/// In-memory outbox; clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransferSink {
    sent: Rc<RefCell<Vec<Transfer>>>,
}

impl RecordingTransferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every transfer sent so far, in order.
    pub fn sent(&self) -> Vec<Transfer> {
        self.sent.borrow().clone()
    }

    /// Removes and returns the buffered transfers.
    pub fn drain(&self) -> Vec<Transfer> {
        std::mem::take(&mut *self.sent.borrow_mut())
    }
}

impl TransferSink for RecordingTransferSink {
    fn send_transfer(&mut self, transfer: &Transfer) {
        self.sent.borrow_mut().push(transfer.clone());
    }
}
