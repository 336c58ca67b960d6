//! Wallet connect control
//!
//! Talks to an injected Web3 provider. A missing provider is a normal
//! condition that opens an install prompt; request failures open an error
//! modal. Neither is propagated past this component.

use crate::error::WalletError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Provider RPC methods used by the control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletMethod {
    /// Already-authorised accounts, never prompts
    Accounts,
    /// Ask the user to authorise an account
    RequestAccounts,
}

impl WalletMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            WalletMethod::Accounts => "eth_accounts",
            WalletMethod::RequestAccounts => "eth_requestAccounts",
        }
    }
}

impl std::fmt::Display for WalletMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Injected wallet capability
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Issue an account request, returning account addresses
    async fn request(&self, method: WalletMethod) -> Result<Vec<String>, WalletError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalKind {
    WalletNotFound,
    ConnectionError,
}

impl ModalKind {
    pub fn title(&self) -> &'static str {
        match self {
            ModalKind::WalletNotFound => "Wallet Not Found",
            ModalKind::ConnectionError => "Connection Error",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            ModalKind::WalletNotFound => {
                "Please install MetaMask or another Web3 wallet extension."
            }
            ModalKind::ConnectionError => "Failed to connect to wallet. Please try again.",
        }
    }
}

/// User-visible modal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modal {
    pub kind: ModalKind,
    pub title: String,
    pub message: String,
}

impl From<ModalKind> for Modal {
    fn from(kind: ModalKind) -> Self {
        Self {
            kind,
            title: kind.title().to_string(),
            message: kind.message().to_string(),
        }
    }
}

#[derive(Debug, Default)]
struct WalletState {
    account: Option<String>,
    connecting: bool,
    modal: Option<Modal>,
}

pub struct WalletConnect {
    provider: Option<Arc<dyn WalletProvider>>,
    state: Mutex<WalletState>,
}

impl WalletConnect {
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        Self {
            provider,
            state: Mutex::new(WalletState::default()),
        }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub async fn account(&self) -> Option<String> {
        self.state.lock().await.account.clone()
    }

    /// Label shown for the connected account
    pub async fn display_address(&self) -> Option<String> {
        self.state
            .lock()
            .await
            .account
            .as_deref()
            .map(format_address)
    }

    pub async fn is_connecting(&self) -> bool {
        self.state.lock().await.connecting
    }

    pub async fn modal(&self) -> Option<Modal> {
        self.state.lock().await.modal.clone()
    }

    /// Silent check for an already-authorised account (runs on mount)
    pub async fn check_connection(&self) -> Option<String> {
        let provider = self.provider.as_ref()?;
        match provider.request(WalletMethod::Accounts).await {
            Ok(accounts) => {
                let account = accounts.into_iter().next()?;
                debug!(account = %format_address(&account), "Wallet already connected");
                self.state.lock().await.account = Some(account.clone());
                Some(account)
            }
            Err(e) => {
                error!(error = %e, "Error checking connection");
                None
            }
        }
    }

    /// Ask the provider for an account
    ///
    /// Refused with [`WalletError::Pending`] while a request is already in flight.
    pub async fn connect(&self) -> Result<String, WalletError> {
        let Some(provider) = self.provider.as_ref() else {
            self.state.lock().await.modal = Some(ModalKind::WalletNotFound.into());
            return Err(WalletError::MissingCapability);
        };

        {
            let mut state = self.state.lock().await;
            if state.connecting {
                return Err(WalletError::Pending);
            }
            state.connecting = true;
        }

        let result = provider
            .request(WalletMethod::RequestAccounts)
            .await
            .and_then(|accounts| accounts.into_iter().next().ok_or(WalletError::NoAccounts));

        let mut state = self.state.lock().await;
        state.connecting = false;
        match result {
            Ok(account) => {
                info!(account = %format_address(&account), "Wallet connected");
                state.account = Some(account.clone());
                Ok(account)
            }
            Err(e) => {
                error!(error = %e, "Error connecting wallet");
                state.modal = Some(ModalKind::ConnectionError.into());
                Err(e)
            }
        }
    }

    /// Forget the account locally (providers have no disconnect call)
    pub async fn disconnect(&self) {
        self.state.lock().await.account = None;
    }

    pub async fn close_modal(&self) {
        self.state.lock().await.modal = None;
    }
}

/// Shorten an address to its first six and last four characters
pub fn format_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    let head: String = chars.iter().take(6).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{}...{}", head, tail)
}
