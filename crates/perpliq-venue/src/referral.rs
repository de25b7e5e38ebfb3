//! Referral storage interface.

use perpliq_core::{Address, B256};

pub trait ReferralStorage: Send + Sync {
    fn trader_referral_code(&self, account: &Address) -> Option<B256>;
}
