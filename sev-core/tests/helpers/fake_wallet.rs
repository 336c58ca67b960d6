//! Fake wallet provider

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use sev_core::error::WalletError;
use sev_core::wallet::{WalletMethod, WalletProvider};

pub struct FakeWallet {
    authorised: Mutex<Vec<String>>,
    request_result: Mutex<Result<Vec<String>, WalletError>>,
    request_delay: Duration,
    calls: Mutex<Vec<WalletMethod>>,
}

impl FakeWallet {
    /// Provider with no authorised accounts that grants `account` on request
    pub fn granting(account: &str) -> Self {
        Self {
            authorised: Mutex::new(Vec::new()),
            request_result: Mutex::new(Ok(vec![account.to_string()])),
            request_delay: Duration::ZERO,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Provider whose account request is rejected
    pub fn rejecting(reason: &str) -> Self {
        let wallet = Self::granting("");
        *wallet.request_result.lock().unwrap() = Err(WalletError::Rejected(reason.to_string()));
        wallet
    }

    /// Account already authorised before mount
    pub fn with_authorised(self, account: &str) -> Self {
        self.authorised.lock().unwrap().push(account.to_string());
        self
    }

    /// Hold the account request open for `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<WalletMethod> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn request(&self, method: WalletMethod) -> Result<Vec<String>, WalletError> {
        self.calls.lock().unwrap().push(method);
        match method {
            WalletMethod::Accounts => Ok(self.authorised.lock().unwrap().clone()),
            WalletMethod::RequestAccounts => {
                if !self.request_delay.is_zero() {
                    tokio::time::sleep(self.request_delay).await;
                }
                self.request_result.lock().unwrap().clone()
            }
        }
    }
}
