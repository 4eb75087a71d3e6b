//! Per-auction refundable balance tracking.
//!
//! Credits come from successful reveals, debits from leader reservations and
//! withdrawals. The ledger also keeps running totals so the deposit
//! conservation invariant can be checked at any point: withdrawn +
//! outstanding + beneficiary payout never exceeds deposits received.

use std::collections::HashMap;

use market_types::Address;

/// Escrow ledger embedded in one auction instance.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EscrowLedger {
    pending: HashMap<Address, u64>,
    total_deposited: u64,
    total_withdrawn: u64,
    paid_out: u64,
}

impl EscrowLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a deposit arriving with a sealed bid.
    pub fn record_deposit(&mut self, amount: u64) {
        self.total_deposited += amount;
    }

    /// Credit a bidder's refundable balance.
    pub fn credit(&mut self, bidder: Address, amount: u64) {
        *self.pending.entry(bidder).or_insert(0) += amount;
    }

    /// Debit a bidder's refundable balance, e.g. to reserve the leading bid's
    /// value for the beneficiary. Fails (false) rather than going negative.
    pub fn debit(&mut self, bidder: &Address, amount: u64) -> bool {
        if let Some(balance) = self.pending.get_mut(bidder) {
            if *balance >= amount {
                *balance -= amount;
                return true;
            }
        }
        false
    }

    /// Current refundable balance for a bidder.
    pub fn pending_of(&self, bidder: &Address) -> u64 {
        self.pending.get(bidder).copied().unwrap_or(0)
    }

    /// Zero the bidder's balance and return what must now be paid out.
    ///
    /// The balance is cleared before any payment happens, so a reentrant
    /// caller observes zero rather than a stale balance.
    pub fn take_all(&mut self, bidder: &Address) -> u64 {
        let amount = self.pending.remove(bidder).unwrap_or(0);
        self.total_withdrawn += amount;
        amount
    }

    /// Record the beneficiary payout at settlement.
    pub fn record_payout(&mut self, amount: u64) {
        self.paid_out += amount;
    }

    /// Sum of all refundable balances still outstanding.
    pub fn outstanding(&self) -> u64 {
        self.pending.values().sum()
    }

    pub fn total_deposited(&self) -> u64 {
        self.total_deposited
    }

    pub fn total_withdrawn(&self) -> u64 {
        self.total_withdrawn
    }

    pub fn paid_out(&self) -> u64 {
        self.paid_out
    }

    /// Deposit conservation: money out (withdrawn, outstanding, paid to the
    /// beneficiary) never exceeds money in.
    pub fn conserves_deposits(&self) -> bool {
        self.total_withdrawn + self.outstanding() + self.paid_out <= self.total_deposited
    }
}
