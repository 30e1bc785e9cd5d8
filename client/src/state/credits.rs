//! Credits balance, ledger, packages, and action prices.
//!
//! DESIGN
//! ======
//! Each resource has its own freshness window: the balance and transactions go
//! stale within a minute, packages in five, action costs in an hour.
//!
//! Ledger pages are cached per `(limit, offset)`, so a fresh first page never
//! answers for another one.
//!
//! Purchases patch the cached balance from the purchase response (`balance`
//! and `last_updated` only; the totals are left for the next balance fetch),
//! mark every cached ledger page stale, and force-refresh the first page.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use wire::{ActionCheck, CreditBalance, CreditCost, CreditPackage, PurchaseResponse, TransactionPage};

use super::resource::{Cached, FetchStatus, KeyedCache};
use crate::config::Freshness;
use crate::net::api::ApiClient;
use crate::net::endpoints;
use crate::notify::{Toast, report_failure};
use crate::util::clock::now_rfc3339;

/// Default page size for `GET /credits/transactions`.
pub const DEFAULT_TRANSACTIONS_LIMIT: u32 = 20;

const PURCHASE_FAILED: &str = "Purchase failed";

/// Window into the ledger, as sent in the `limit`/`offset` query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub limit: u32,
    pub offset: u32,
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.offset, self.limit)
    }
}

#[derive(Clone)]
pub struct CreditsStore {
    api: ApiClient,
    balance: Cached<CreditBalance>,
    transactions: KeyedCache<PageKey, TransactionPage>,
    last_page: Arc<Mutex<Option<PageKey>>>,
    packages: Cached<Vec<CreditPackage>>,
    costs: Cached<Vec<CreditCost>>,
}

impl CreditsStore {
    #[must_use]
    pub fn new(api: ApiClient, freshness: &Freshness) -> Self {
        let reset = freshness.error_reset;
        Self {
            api,
            balance: Cached::new("credits/balance", freshness.balance, reset),
            transactions: KeyedCache::new("credits/transactions", freshness.transactions, reset),
            last_page: Arc::new(Mutex::new(None)),
            packages: Cached::new("credits/packages", freshness.packages, reset),
            costs: Cached::new("credits/costs", freshness.costs, reset),
        }
    }

    // =========================================================================
    // FETCHES
    // =========================================================================

    pub async fn fetch_balance(&self, force: bool) -> Option<CreditBalance> {
        let api = self.api.clone();
        self.balance
            .load(force, self.api.notifier(), "Failed to load balance", || async move {
                api.get(endpoints::CREDITS_BALANCE).await
            })
            .await
    }

    /// Fetch one page of the ledger. Each `(limit, offset)` has its own
    /// freshness window.
    pub async fn fetch_transactions(&self, limit: u32, offset: u32, force: bool) -> Option<TransactionPage> {
        let key = PageKey { limit, offset };
        *self.last_page.lock().unwrap_or_else(PoisonError::into_inner) = Some(key);
        let api = self.api.clone();
        let query = [("limit", limit.to_string()), ("offset", offset.to_string())];
        self.transactions
            .entry(&key)
            .load(force, self.api.notifier(), "Failed to load transactions", || async move {
                api.get_query(endpoints::CREDITS_TRANSACTIONS, &query).await
            })
            .await
    }

    pub async fn fetch_packages(&self, force: bool) -> Option<Vec<CreditPackage>> {
        let api = self.api.clone();
        self.packages
            .load(force, self.api.notifier(), "Failed to load credit packages", || async move {
                api.get_list(endpoints::CREDITS_PACKAGES, &[]).await
            })
            .await
    }

    pub async fn fetch_costs(&self, force: bool) -> Option<Vec<CreditCost>> {
        let api = self.api.clone();
        self.costs
            .load(force, self.api.notifier(), "Failed to load action costs", || async move {
                api.get_list(endpoints::CREDITS_COSTS, &[]).await
            })
            .await
    }

    // =========================================================================
    // MUTATIONS
    // =========================================================================

    /// Buy a package via `POST /credits/packages/{id}/purchase`.
    ///
    /// Returns the backend response only when it reports success.
    pub async fn purchase_package(&self, package_id: &str) -> Option<PurchaseResponse> {
        let response = match self
            .api
            .post_empty::<PurchaseResponse>(&endpoints::purchase_package(package_id))
            .await
        {
            Ok(response) => response,
            Err(err) => {
                report_failure(self.api.notifier(), PURCHASE_FAILED, &err);
                return None;
            }
        };
        if !response.success {
            let reason = response
                .message
                .clone()
                .unwrap_or_else(|| "The purchase was not completed.".to_owned());
            tracing::warn!(package_id, %reason, "purchase rejected");
            self.api.notifier().toast(Toast::error(PURCHASE_FAILED, reason));
            return None;
        }

        let stamp = now_rfc3339();
        self.balance.update(|balance| {
            if let Some(balance) = balance {
                balance.balance = response.new_balance;
                balance.last_updated = Some(stamp);
            }
        });
        tracing::info!(package_id, new_balance = response.new_balance, "credits purchased");
        self.api.notifier().toast(Toast::success(
            response
                .message
                .clone()
                .unwrap_or_else(|| "Credits added".to_owned()),
        ));
        self.transactions.invalidate_all();
        self.fetch_transactions(DEFAULT_TRANSACTIONS_LIMIT, 0, true).await;
        Some(response)
    }

    /// Ask the backend whether `action_type` is affordable right now.
    ///
    /// Uncached: the answer depends on the live balance.
    pub async fn check_action(&self, action_type: &str) -> Option<ActionCheck> {
        match self.api.get(&endpoints::check_action(action_type)).await {
            Ok(check) => Some(check),
            Err(err) => {
                report_failure(self.api.notifier(), "Failed to check credits", &err);
                None
            }
        }
    }

    // =========================================================================
    // SNAPSHOTS
    // =========================================================================

    /// Price of `action_type` from the cached cost table.
    #[must_use]
    pub fn cost_of(&self, action_type: &str) -> Option<i64> {
        self.costs
            .data()?
            .into_iter()
            .find(|c| c.action_type == action_type)
            .map(|c| c.cost)
    }

    #[must_use]
    pub fn balance(&self) -> Option<CreditBalance> {
        self.balance.data()
    }

    #[must_use]
    pub fn balance_status(&self) -> FetchStatus {
        self.balance.status()
    }

    /// The most recently requested ledger page, if it has loaded.
    #[must_use]
    pub fn transactions(&self) -> Option<TransactionPage> {
        let key = (*self.last_page.lock().unwrap_or_else(PoisonError::into_inner))?;
        self.transactions.data(&key)
    }

    #[must_use]
    pub fn packages(&self) -> Vec<CreditPackage> {
        self.packages.data().unwrap_or_default()
    }

    #[must_use]
    pub fn costs(&self) -> Vec<CreditCost> {
        self.costs.data().unwrap_or_default()
    }
}

#[cfg(test)]
#[path = "credits_test.rs"]
mod tests;
