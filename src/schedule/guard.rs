//! Balance guard
//!
//! Refuses a transfer unless the amount plus a reserve of the current
//! balance fits within that balance. The reserve is a rough allowance for
//! network fees, not a fee estimate.

use tracing::debug;

/// Default reserve: 5% of the current balance
pub const DEFAULT_RESERVE_BPS: u32 = 500;

const BPS_DENOMINATOR: u128 = 10_000;

/// Outcome of an admission check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Admit,
    Deny { shortfall: u128 },
}

impl GuardDecision {
    pub fn is_admitted(&self) -> bool {
        matches!(self, GuardDecision::Admit)
    }

    /// Amount missing to satisfy the guard (zero when admitted)
    pub fn shortfall(&self) -> u128 {
        match self {
            GuardDecision::Admit => 0,
            GuardDecision::Deny { shortfall } => *shortfall,
        }
    }
}

/// Admission control for outgoing transfers
#[derive(Debug, Clone, Copy)]
pub struct BalanceGuard {
    reserve_bps: u32,
}

impl BalanceGuard {
    pub fn new() -> Self {
        Self::with_reserve_bps(DEFAULT_RESERVE_BPS)
    }

    pub fn with_reserve_bps(reserve_bps: u32) -> Self {
        Self { reserve_bps }
    }

    pub fn reserve_bps(&self) -> u32 {
        self.reserve_bps
    }

    /// Reserve kept back from `balance`
    pub fn reserve(&self, balance: u128) -> u128 {
        // floor(balance * bps / 10_000) without overflowing on large balances;
        // at 500 bps this is exactly balance / 20
        let bps = self.reserve_bps as u128;
        (balance / BPS_DENOMINATOR)
            .saturating_mul(bps)
            .saturating_add((balance % BPS_DENOMINATOR) * bps / BPS_DENOMINATOR)
    }

    /// Decide whether `amount` may be sent out of `balance`
    pub fn admit(&self, balance: u128, amount: u128) -> GuardDecision {
        let required = amount.saturating_add(self.reserve(balance));
        if balance < required {
            let shortfall = required - balance;
            debug!(
                "Guard denied transfer: balance={} amount={} shortfall={}",
                balance, amount, shortfall
            );
            GuardDecision::Deny { shortfall }
        } else {
            GuardDecision::Admit
        }
    }
}

impl Default for BalanceGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_boundary_admits() {
        let guard = BalanceGuard::new();
        // reserve 5, 95 + 5 = 100 <= 100
        assert_eq!(guard.admit(100, 95), GuardDecision::Admit);
    }

    #[test]
    fn test_one_over_boundary_denies() {
        let guard = BalanceGuard::new();
        // 96 + 5 = 101 > 100
        assert_eq!(guard.admit(100, 96), GuardDecision::Deny { shortfall: 1 });
    }

    #[test]
    fn test_zero_balance() {
        let guard = BalanceGuard::new();
        assert!(guard.admit(0, 0).is_admitted());
        assert_eq!(guard.admit(0, 10).shortfall(), 10);
    }

    #[test]
    fn test_reserve_uses_integer_division() {
        let guard = BalanceGuard::new();
        assert_eq!(guard.reserve(19), 0);
        assert_eq!(guard.reserve(39), 1);
        // reserve 0: the whole 19 is spendable
        assert!(guard.admit(19, 19).is_admitted());
    }

    #[test]
    fn test_huge_amount_saturates() {
        let guard = BalanceGuard::new();
        let decision = guard.admit(1_000, u128::MAX);
        assert!(!decision.is_admitted());
    }

    #[test]
    fn test_matches_policy_formula() {
        let guard = BalanceGuard::new();
        for balance in [0u128, 1, 20, 99, 100, 1_000, 123_456_789] {
            for amount in [0u128, 1, 50, 95, 96, 1_000, 200_000_000] {
                let expected = amount + balance / 20 <= balance;
                assert_eq!(guard.admit(balance, amount).is_admitted(), expected);
            }
        }
    }

    #[test]
    fn test_custom_reserve() {
        let guard = BalanceGuard::with_reserve_bps(1_000);
        assert_eq!(guard.reserve(100), 10);
        assert!(guard.admit(100, 90).is_admitted());
        assert!(!guard.admit(100, 91).is_admitted());

        let none = BalanceGuard::with_reserve_bps(0);
        assert!(none.admit(100, 100).is_admitted());
    }
}
